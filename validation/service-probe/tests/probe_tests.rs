//! ServiceProbe against the in-process mock OGC server.

use service_probe::{ErrorKind, KilobyteRounding, ProbeConfig, ProbeError, ServiceProbe};
use test_utils::{bbox, crs, refused_url, MockLayer, MockOgcServer, MockOgcService};

fn probe_for(server: &MockOgcServer) -> ServiceProbe {
    let config = ProbeConfig {
        service_url: server.ows_url(),
        timeout_secs: 5,
        ..Default::default()
    };
    ServiceProbe::new(config).unwrap()
}

fn radar_service() -> MockOgcService {
    MockOgcService::default().with_layers(vec![
        MockLayer::new("radar"),
        MockLayer::new("temperature").with_bbox(crs::EPSG_4326, bbox::CONUS),
        MockLayer::new("wind").with_crs(&[crs::EPSG_3857, crs::EPSG_4326]),
    ])
}

// ============================================================================
// Connectivity
// ============================================================================

#[tokio::test]
async fn test_connect_to_url_ok() {
    let server = MockOgcServer::start(MockOgcService::default()).await;
    let mut probe = probe_for(&server);
    probe.connect_to_url(&server.base_url()).await.unwrap();
}

#[tokio::test]
async fn test_connect_to_url_non_200() {
    for status in [204, 404, 500] {
        let server = MockOgcServer::start(MockOgcService::default().with_root_status(status)).await;
        let mut probe = probe_for(&server);

        let err = probe.connect_to_url(&server.base_url()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connectivity, "status {status}");
        assert!(err.to_string().contains(&status.to_string()));
    }
}

#[tokio::test]
async fn test_connect_to_url_refused() {
    let mut probe = ServiceProbe::new(ProbeConfig::default()).unwrap();
    let err = probe.connect_to_url(&refused_url()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

// ============================================================================
// WFS
// ============================================================================

#[tokio::test]
async fn test_wfs_layer_count_and_membership() {
    let names = ["topp:states", "sf:roads", "sf:streams", "tiger:poi"];
    let server = MockOgcServer::start(MockOgcService::default().with_feature_types(&names)).await;
    let mut probe = probe_for(&server);

    assert_eq!(probe.get_number_of_wfs_layers().await.unwrap(), 4);
    for name in names {
        assert!(probe.check_for_wfs_layer(name).await.unwrap(), "{name}");
    }
    assert!(!probe.check_for_wfs_layer("topp:countries").await.unwrap());
    assert!(!probe.check_for_wfs_layer("Topp:States").await.unwrap());
}

#[tokio::test]
async fn test_wfs_empty_service() {
    let server = MockOgcServer::start(MockOgcService::default()).await;
    let mut probe = probe_for(&server);

    assert_eq!(probe.get_number_of_wfs_layers().await.unwrap(), 0);
    probe.result_should_be("0").unwrap();
}

#[tokio::test]
async fn test_set_service_url_affects_later_queries_only() {
    let first = MockOgcServer::start(MockOgcService::default().with_feature_types(&["a"])).await;
    let second = MockOgcServer::start(MockOgcService::default().with_feature_types(&["a", "b"])).await;
    let mut probe = probe_for(&first);

    assert_eq!(probe.get_number_of_wfs_layers().await.unwrap(), 1);
    probe.set_service_url(&second.ows_url());
    assert_eq!(probe.get_number_of_wfs_layers().await.unwrap(), 2);

    assert_eq!(first.requests().len(), 1);
    assert_eq!(second.requests().len(), 1);
}

#[tokio::test]
async fn test_protocol_version_is_sent() {
    let server = MockOgcServer::start(MockOgcService::default()).await;
    let mut probe = probe_for(&server);

    probe.get_number_of_wfs_layers().await.unwrap();
    probe.set_protocol_version("1.0.0");
    probe.get_number_of_wfs_layers().await.unwrap();

    let versions: Vec<String> = server
        .requests()
        .iter()
        .filter_map(|r| r.param("VERSION").map(str::to_string))
        .collect();
    assert_eq!(versions, vec!["1.1.0", "1.0.0"]);
}

#[tokio::test]
async fn test_capabilities_server_error() {
    let server = MockOgcServer::start(MockOgcService::default().with_capabilities_status(500)).await;
    let mut probe = probe_for(&server);

    let err = probe.get_number_of_wfs_layers().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connectivity);
}

#[tokio::test]
async fn test_invalid_service_url() {
    let mut probe = ServiceProbe::new(ProbeConfig::default()).unwrap();
    probe.set_service_url("not a url");

    let err = probe.get_number_of_wfs_layers().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

// ============================================================================
// WMS
// ============================================================================

#[tokio::test]
async fn test_wms_layer_membership() {
    let server = MockOgcServer::start(radar_service()).await;
    let mut probe = probe_for(&server);

    assert!(probe.check_for_wms_layer("radar").await.unwrap());
    assert!(probe.check_for_wms_layer("wind").await.unwrap());
    assert!(!probe.check_for_wms_layer("Radar").await.unwrap());
    assert!(!probe.check_for_wms_layer("Mock root").await.unwrap());
}

#[tokio::test]
async fn test_advertised_layers_all_render() {
    let server = MockOgcServer::start(radar_service()).await;
    let mut probe = probe_for(&server);

    assert_eq!(probe.check_advertised_wms_layers().await.unwrap(), 3);
    assert_eq!(server.getmap_layers(), vec!["radar", "temperature", "wind"]);

    let maps: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|r| r.request() == Some("GetMap"))
        .collect();
    assert_eq!(maps[1].param("BBOX"), Some("-130,20,-60,55"));
    assert_eq!(maps[2].param("SRS"), Some(crs::EPSG_3857));
    assert!(maps.iter().all(|m| m.param("WIDTH") == Some("300") && m.param("HEIGHT") == Some("300")));
    assert!(maps.iter().all(|m| m.param("FORMAT") == Some("image/png")));
}

#[tokio::test]
async fn test_advertised_layers_stop_at_first_failure() {
    let server = MockOgcServer::start(radar_service().with_failing_layer("temperature")).await;
    let mut probe = probe_for(&server);

    let err = probe.check_advertised_wms_layers().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AssertionMismatch);
    assert!(matches!(&err, ProbeError::LayerRequest { layer, .. } if layer == "temperature"));
    assert_eq!(server.getmap_layers(), vec!["radar", "temperature"]);
}

#[tokio::test]
async fn test_advertised_layers_first_format() {
    let service = radar_service().with_formats(&["image/jpeg", "image/png"]);
    let server = MockOgcServer::start(service).await;
    let mut probe = probe_for(&server);

    probe.check_advertised_wms_layers().await.unwrap();
    assert!(server
        .requests()
        .iter()
        .filter(|r| r.request() == Some("GetMap"))
        .all(|r| r.param("FORMAT") == Some("image/jpeg")));
}

#[tokio::test]
async fn test_wms_1_3_0() {
    let server = MockOgcServer::start(radar_service()).await;
    let config = ProbeConfig {
        service_url: server.ows_url(),
        wms_version: "1.3.0".to_string(),
        ..Default::default()
    };
    let mut probe = ServiceProbe::new(config).unwrap();

    probe.check_advertised_wms_layers().await.unwrap();
    let first_map = server
        .requests()
        .into_iter()
        .find(|r| r.request() == Some("GetMap"))
        .unwrap();
    assert_eq!(first_map.param("VERSION"), Some("1.3.0"));
    assert_eq!(first_map.param("CRS"), Some(crs::EPSG_4326));
}

#[tokio::test]
async fn test_image_size_ceil_and_floor() {
    let server = MockOgcServer::start(radar_service().with_image_len(5500)).await;
    let mut probe = probe_for(&server);

    let size = probe
        .get_wms_image_size("radar", "EPSG:4326", "-180", "-90", "180", "90")
        .await
        .unwrap();
    assert_eq!(size, 6);
    probe.result_should_be("6").unwrap();

    let config = ProbeConfig {
        service_url: server.ows_url(),
        image_size_rounding: KilobyteRounding::Floor,
        ..Default::default()
    };
    let mut floor = ServiceProbe::new(config).unwrap();
    let size = floor
        .get_wms_image_size("radar", "EPSG:4326", "-180", "-90", "180", "90")
        .await
        .unwrap();
    assert_eq!(size, 5);
}

#[tokio::test]
async fn test_image_size_unknown_layer() {
    let server = MockOgcServer::start(radar_service()).await;
    let mut probe = probe_for(&server);

    let err = probe
        .get_wms_image_size("missing", "EPSG:4326", "-180", "-90", "180", "90")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Protocol);
    assert!(err.to_string().contains("LayerNotDefined"));
}

#[tokio::test]
async fn test_check_get_png_image() {
    let server = MockOgcServer::start(radar_service().with_formats(&["image/jpeg"])).await;
    let mut probe = probe_for(&server);

    assert_eq!(probe.check_get_png_image().await.unwrap(), 5500);
    let map = server
        .requests()
        .into_iter()
        .find(|r| r.request() == Some("GetMap"))
        .unwrap();
    assert_eq!(map.param("LAYERS"), Some("radar"));
    assert_eq!(map.param("FORMAT"), Some("image/png"));
}

#[tokio::test]
async fn test_layer_without_extent_fails_smoke_test() {
    let service = MockOgcService::default()
        .with_layers(vec![MockLayer::new("radar"), MockLayer::new("bare").without_bbox()]);
    let server = MockOgcServer::start(service).await;
    let mut probe = probe_for(&server);

    let err = probe.check_advertised_wms_layers().await.unwrap_err();
    assert!(matches!(err, ProbeError::LayerIncomplete { missing: "bounding box", .. }));
    assert_eq!(server.getmap_layers(), vec!["radar"]);
}

#[tokio::test]
async fn test_advertised_layers_svg_first_service() {
    let service = radar_service().with_formats(&["image/svg+xml", "image/png"]);
    let server = MockOgcServer::start(service).await;
    let mut probe = probe_for(&server);

    assert_eq!(probe.check_advertised_wms_layers().await.unwrap(), 3);
    assert!(server
        .requests()
        .iter()
        .filter(|r| r.request() == Some("GetMap"))
        .all(|r| r.param("FORMAT") == Some("image/svg+xml")));
}

#[tokio::test]
async fn test_svg_first_service_still_reports_exceptions() {
    let service = radar_service()
        .with_formats(&["image/svg+xml"])
        .with_failing_layer("radar");
    let server = MockOgcServer::start(service).await;
    let mut probe = probe_for(&server);

    let err = probe.check_advertised_wms_layers().await.unwrap_err();
    assert!(matches!(&err, ProbeError::LayerRequest { layer, .. } if layer == "radar"));
    assert_eq!(server.getmap_layers(), vec!["radar"]);
}

// ============================================================================
// Advertised GetMap endpoint
// ============================================================================

async fn advertising_pair() -> (MockOgcServer, MockOgcServer) {
    let renderer = MockOgcServer::start(radar_service()).await;
    let front = MockOgcServer::start(radar_service().with_getmap_url(&renderer.ows_url())).await;
    (front, renderer)
}

#[tokio::test]
async fn test_advertised_getmap_url_ignored_by_default() {
    let (front, renderer) = advertising_pair().await;
    let mut probe = probe_for(&front);

    probe.check_advertised_wms_layers().await.unwrap();
    assert_eq!(front.getmap_layers(), vec!["radar", "temperature", "wind"]);
    assert!(renderer.requests().is_empty());
}

#[tokio::test]
async fn test_follow_advertised_getmap_url() {
    let (front, renderer) = advertising_pair().await;
    let config = ProbeConfig {
        service_url: front.ows_url(),
        follow_advertised_getmap_url: true,
        ..Default::default()
    };
    let mut probe = ServiceProbe::new(config).unwrap();

    probe.check_advertised_wms_layers().await.unwrap();
    probe.check_get_png_image().await.unwrap();
    let size = probe
        .get_wms_image_size("wind", "EPSG:4326", "-180", "-90", "180", "90")
        .await
        .unwrap();
    assert_eq!(size, 6);

    assert!(front.getmap_layers().is_empty());
    assert_eq!(
        renderer.getmap_layers(),
        vec!["radar", "temperature", "wind", "radar", "wind"]
    );
    // Capabilities still come from the service URL
    assert!(renderer.requests().iter().all(|r| r.request() == Some("GetMap")));
}

#[tokio::test]
async fn test_follow_without_advertised_url_uses_service_url() {
    let server = MockOgcServer::start(radar_service()).await;
    let config = ProbeConfig {
        service_url: server.ows_url(),
        follow_advertised_getmap_url: true,
        ..Default::default()
    };
    let mut probe = ServiceProbe::new(config).unwrap();

    probe.check_advertised_wms_layers().await.unwrap();
    assert_eq!(server.getmap_layers(), vec!["radar", "temperature", "wind"]);
}

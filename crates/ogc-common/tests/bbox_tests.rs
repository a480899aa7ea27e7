//! Tests for BoundingBox parsing and formatting.

use ogc_common::bbox::{BboxParseError, BoundingBox};

// ============================================================================
// from_edges tests
// ============================================================================

#[test]
fn test_from_edges_integer() {
    let bbox = BoundingBox::from_edges("0", "0", "100", "100").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_from_edges_floating() {
    let bbox = BoundingBox::from_edges("-125.5", "24.75", "-66.25", "50.125").unwrap();
    assert!((bbox.min_x - (-125.5)).abs() < 0.001);
    assert!((bbox.min_y - 24.75).abs() < 0.001);
    assert!((bbox.max_x - (-66.25)).abs() < 0.001);
    assert!((bbox.max_y - 50.125).abs() < 0.001);
}

#[test]
fn test_from_edges_scientific_notation() {
    let bbox = BoundingBox::from_edges("1e-6", "2e-6", "1e6", "2e6").unwrap();
    assert!((bbox.min_x - 1e-6).abs() < 1e-10);
    assert!((bbox.max_x - 1e6).abs() < 0.001);
}

#[test]
fn test_from_edges_trims_whitespace() {
    let bbox = BoundingBox::from_edges(" -180", "-90 ", "\t180", "90\n").unwrap();
    assert_eq!(bbox, BoundingBox::new(-180.0, -90.0, 180.0, 90.0));
}

#[test]
fn test_from_edges_names_the_bad_edge() {
    let err = BoundingBox::from_edges("0", "0", "east", "10").unwrap_err();
    let BboxParseError::InvalidNumber { edge, value } = err;
    assert_eq!(edge, "maxx");
    assert_eq!(value, "east");
}

#[test]
fn test_from_edges_empty_edge() {
    let result = BoundingBox::from_edges("", "0", "10", "10");
    assert!(matches!(
        result,
        Err(BboxParseError::InvalidNumber { edge: "minx", .. })
    ));
}

// ============================================================================
// KVP formatting
// ============================================================================

#[test]
fn test_to_wms_param_keeps_edge_order() {
    let bbox = BoundingBox::from_edges("-10.5", "20", "30.25", "40").unwrap();
    assert_eq!(bbox.to_wms_param(), "-10.5,20,30.25,40");
}

#[test]
fn test_to_wms_param_web_mercator() {
    let bbox = BoundingBox::from_edges(
        "-20037508.34",
        "-20037508.34",
        "20037508.34",
        "20037508.34",
    )
    .unwrap();
    assert_eq!(
        bbox.to_wms_param(),
        "-20037508.34,-20037508.34,20037508.34,20037508.34"
    );
}

#[test]
fn test_inverted_bbox_is_passed_through() {
    // Inverted edges are the server's problem to reject
    let bbox = BoundingBox::new(10.0, 10.0, 0.0, 0.0);
    assert_eq!(bbox.to_wms_param(), "10,10,0,0");
}

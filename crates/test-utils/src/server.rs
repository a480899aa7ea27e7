//! In-process mock OGC server.
//!
//! Serves on `127.0.0.1` with an ephemeral port:
//! - `GET /` answers with the configured root status
//! - `GET /ows` handles WFS/WMS GetCapabilities and WMS GetMap
//!
//! Every request is recorded so tests can assert on what was (and was not)
//! asked for.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::task::JoinHandle;

use crate::fixtures::{service_exception_xml, wfs_capabilities_xml, wms_capabilities_xml, MockLayer};
use crate::generators::fake_png;

/// What the mock server advertises and how it behaves.
#[derive(Debug, Clone)]
pub struct MockOgcService {
    /// Status for `GET /`
    pub root_status: u16,
    /// Status for GetCapabilities; anything but 200 returns an empty body
    pub capabilities_status: u16,
    pub feature_types: Vec<String>,
    pub layers: Vec<MockLayer>,
    pub formats: Vec<String>,
    /// Size of every GetMap image
    pub image_len: usize,
    /// Layers whose GetMap answers with a service exception
    pub failing_layers: HashSet<String>,
    /// GetMap endpoint advertised in WMS capabilities
    pub getmap_url: Option<String>,
}

impl Default for MockOgcService {
    fn default() -> Self {
        Self {
            root_status: 200,
            capabilities_status: 200,
            feature_types: Vec::new(),
            layers: Vec::new(),
            formats: vec!["image/png".to_string(), "image/jpeg".to_string()],
            image_len: 5500,
            failing_layers: HashSet::new(),
            getmap_url: None,
        }
    }
}

impl MockOgcService {
    pub fn with_feature_types(mut self, names: &[&str]) -> Self {
        self.feature_types = names.iter().map(|n| n.to_string()).collect();
        self
    }

    pub fn with_layers(mut self, layers: Vec<MockLayer>) -> Self {
        self.layers = layers;
        self
    }

    pub fn with_formats(mut self, formats: &[&str]) -> Self {
        self.formats = formats.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_image_len(mut self, len: usize) -> Self {
        self.image_len = len;
        self
    }

    pub fn with_root_status(mut self, status: u16) -> Self {
        self.root_status = status;
        self
    }

    pub fn with_capabilities_status(mut self, status: u16) -> Self {
        self.capabilities_status = status;
        self
    }

    pub fn with_getmap_url(mut self, url: &str) -> Self {
        self.getmap_url = Some(url.to_string());
        self
    }

    pub fn with_failing_layer(mut self, name: &str) -> Self {
        self.failing_layers.insert(name.to_string());
        self
    }
}

/// A request as the mock server saw it. Parameter keys are upper-cased.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub params: HashMap<String, String>,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
    }

    /// The `REQUEST` parameter, e.g. "GetMap".
    pub fn request(&self) -> Option<&str> {
        self.param("REQUEST")
    }
}

struct MockState {
    service: Mutex<MockOgcService>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockState {
    fn record(&self, path: &str, params: HashMap<String, String>) {
        self.requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(RecordedRequest {
                path: path.to_string(),
                params,
            });
    }

    fn service(&self) -> MockOgcService {
        self.service.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

/// Handle to a running mock server; the server stops when this is dropped.
pub struct MockOgcServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockOgcServer {
    pub async fn start(service: MockOgcService) -> Self {
        let state = Arc::new(MockState {
            service: Mutex::new(service),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/", get(root))
            .route("/ows", get(ows))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock OGC server");
        let addr = listener.local_addr().expect("mock server address");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// The OGC endpoint, `http://127.0.0.1:<port>/ows`.
    pub fn ows_url(&self) -> String {
        format!("{}/ows", self.base_url())
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// `LAYERS` of every GetMap received, in arrival order.
    pub fn getmap_layers(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter(|r| r.request() == Some("GetMap"))
            .filter_map(|r| r.param("LAYERS").map(str::to_string))
            .collect()
    }
}

impl Drop for MockOgcServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn root(State(state): State<Arc<MockState>>) -> Response {
    state.record("/", HashMap::new());
    let status = StatusCode::from_u16(state.service().root_status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, "mock OGC server").into_response()
}

async fn ows(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let params: HashMap<String, String> = params
        .into_iter()
        .map(|(k, v)| (k.to_ascii_uppercase(), v))
        .collect();
    state.record("/ows", params.clone());

    let service = state.service();
    let param = |key: &str| params.get(key).map(String::as_str).unwrap_or("");

    match param("REQUEST") {
        r if r.eq_ignore_ascii_case("GetCapabilities") => {
            if service.capabilities_status != 200 {
                let status = StatusCode::from_u16(service.capabilities_status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return status.into_response();
            }
            match param("SERVICE").to_ascii_uppercase().as_str() {
                "WFS" => {
                    let version = non_empty(param("VERSION"), "1.1.0");
                    let names: Vec<&str> = service.feature_types.iter().map(String::as_str).collect();
                    xml_response(wfs_capabilities_xml(version, &names))
                }
                "WMS" => {
                    let version = non_empty(param("VERSION"), "1.1.1");
                    let formats: Vec<&str> = service.formats.iter().map(String::as_str).collect();
                    xml_response(wms_capabilities_xml(
                        version,
                        &service.layers,
                        &formats,
                        service.getmap_url.as_deref(),
                    ))
                }
                other => exception_response(
                    "InvalidParameterValue",
                    &format!("Unknown service '{}'", other),
                ),
            }
        }
        r if r.eq_ignore_ascii_case("GetMap") => {
            let layer = param("LAYERS");
            if service.failing_layers.contains(layer) {
                return exception_response("NoApplicableCode", &format!("Rendering {} failed", layer));
            }
            if !service.layers.iter().any(|l| l.name == layer) {
                return exception_response("LayerNotDefined", &format!("Unknown layer {}", layer));
            }
            let format = non_empty(param("FORMAT"), "image/png").to_string();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, format)],
                fake_png(service.image_len),
            )
                .into_response()
        }
        other => exception_response(
            "OperationNotSupported",
            &format!("Request '{}' is not supported", other),
        ),
    }
}

fn non_empty<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn xml_response(body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        body,
    )
        .into_response()
}

// OGC servers report exceptions with HTTP 200
fn exception_response(code: &str, message: &str) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/vnd.ogc.se_xml")],
        service_exception_xml(code, message),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_root_status_is_configurable() {
        let server = MockOgcServer::start(MockOgcService::default().with_root_status(503)).await;
        let resp = reqwest::get(format!("{}/", server.base_url())).await.unwrap();
        assert_eq!(resp.status().as_u16(), 503);
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_getmap_records_layers() {
        let service = MockOgcService::default()
            .with_layers(vec![MockLayer::new("a")])
            .with_image_len(100);
        let server = MockOgcServer::start(service).await;

        let url = format!("{}?service=WMS&request=GetMap&layers=a&format=image/png", server.ows_url());
        let body = reqwest::get(url).await.unwrap().bytes().await.unwrap();

        assert_eq!(body.len(), 100);
        assert_eq!(server.getmap_layers(), vec!["a".to_string()]);
    }
}

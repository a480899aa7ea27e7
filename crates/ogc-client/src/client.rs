//! OGC client trait and its HTTP implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client, Url};
use tracing::{debug, info, warn};

use ogc_common::{WfsVersion, WmsVersion};

use crate::capabilities::{
    parse_wfs_capabilities, parse_wms_capabilities, WfsCapabilities, WmsCapabilities,
};
use crate::error::{OgcError, OgcResult};
use crate::exceptions::{parse_exception_report, NO_APPLICABLE_CODE};
use crate::getmap::GetMapRequest;
use crate::kvp::{build_request_url, capabilities_params};
use crate::session::HttpSession;

/// Operations the service probe needs from an OGC endpoint.
///
/// Every call takes the endpoint explicitly; implementations hold no
/// per-service state apart from HTTP sessions.
#[async_trait]
pub trait OgcClient: Send + Sync {
    /// Open (or reuse) a session on `url` and GET its root. Returns the status code.
    async fn root_status(&self, url: &str) -> OgcResult<u16>;

    async fn wfs_capabilities(&self, url: &str, version: WfsVersion) -> OgcResult<WfsCapabilities>;

    async fn wms_capabilities(&self, url: &str, version: WmsVersion) -> OgcResult<WmsCapabilities>;

    /// Issue GetMap and return the raw image bytes.
    async fn get_map(
        &self,
        url: &str,
        version: WmsVersion,
        request: &GetMapRequest,
    ) -> OgcResult<Bytes>;
}

/// `OgcClient` over reqwest.
pub struct HttpOgcClient {
    client: Client,
    sessions: Mutex<HashMap<String, HttpSession>>,
}

impl HttpOgcClient {
    pub fn new(timeout: Duration) -> OgcResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ogc-probe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(OgcError::ClientBuild)?;

        Ok(Self {
            client,
            sessions: Mutex::new(HashMap::new()),
        })
    }

    /// Session for `url`, created on first use.
    pub fn session(&self, url: &str) -> OgcResult<HttpSession> {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(session) = sessions.get(url) {
            debug!(url = %url, "Reusing HTTP session");
            return Ok(session.clone());
        }

        let session = HttpSession::open(self.client.clone(), url)?;
        debug!(url = %url, "Opened HTTP session");
        sessions.insert(url.to_string(), session.clone());
        Ok(session)
    }

    async fn fetch(&self, url: Url) -> OgcResult<reqwest::Response> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| OgcError::Http {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "OGC request failed");
            return Err(OgcError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn fetch_text(&self, url: Url) -> OgcResult<String> {
        let response = self.fetch(url.clone()).await?;
        response.text().await.map_err(|source| OgcError::Http {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl OgcClient for HttpOgcClient {
    async fn root_status(&self, url: &str) -> OgcResult<u16> {
        let session = self.session(url)?;
        let status = session.get_status("/").await?;
        info!(url = %url, status = status, "Connectivity check");
        Ok(status)
    }

    async fn wfs_capabilities(&self, url: &str, version: WfsVersion) -> OgcResult<WfsCapabilities> {
        let request = build_request_url(url, &capabilities_params("WFS", version.as_str()))?;
        debug!(url = %request, "Requesting WFS capabilities");

        let xml = self.fetch_text(request).await?;
        let caps = parse_wfs_capabilities(&xml)?;
        info!(
            url = %url,
            version = %version,
            feature_types = caps.layer_count(),
            "Fetched WFS capabilities"
        );
        Ok(caps)
    }

    async fn wms_capabilities(&self, url: &str, version: WmsVersion) -> OgcResult<WmsCapabilities> {
        let request = build_request_url(url, &capabilities_params("WMS", version.as_str()))?;
        debug!(url = %request, "Requesting WMS capabilities");

        let xml = self.fetch_text(request).await?;
        let caps = parse_wms_capabilities(&xml)?;
        info!(
            url = %url,
            version = %version,
            layers = caps.layer_count(),
            "Fetched WMS capabilities"
        );
        Ok(caps)
    }

    async fn get_map(
        &self,
        url: &str,
        version: WmsVersion,
        request: &GetMapRequest,
    ) -> OgcResult<Bytes> {
        let map_url = build_request_url(url, &request.to_params(version))?;
        debug!(url = %map_url, layer = %request.layer, "Requesting map");

        let response = self.fetch(map_url.clone()).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        let body = response.bytes().await.map_err(|source| OgcError::Http {
            url: map_url.to_string(),
            source,
        })?;

        if let Some(err) = map_error(&content_type, &request.format, &body) {
            warn!(layer = %request.layer, error = %err, "GetMap returned an exception");
            return Err(err);
        }

        debug!(layer = %request.layer, bytes = body.len(), content_type = %content_type, "Map received");
        Ok(body)
    }
}

/// Decide whether a GetMap body is an error rather than a map.
///
/// Servers answer failed GetMaps with HTTP 200 and an XML exception report,
/// so an XML content type alone proves nothing: SVG and KML maps are XML too.
/// The body must parse as an exception report, or the XML content type must
/// differ from the requested format.
fn map_error(content_type: &str, requested: &str, body: &[u8]) -> Option<OgcError> {
    if !content_type.contains("xml") {
        return None;
    }
    if let Some(err) = parse_exception_report(&String::from_utf8_lossy(body)) {
        return Some(err);
    }
    if mime_essence(content_type) != mime_essence(requested) {
        return Some(OgcError::ServiceException {
            code: NO_APPLICABLE_CODE.to_string(),
            message: format!("expected {}, got {}", requested, content_type),
        });
    }
    None
}

/// `type/subtype` without parameters, lowercased.
fn mime_essence(mime: &str) -> String {
    mime.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

//! The service probe: OGC checks as sequential, stateful test steps.

use ogc_client::{GetMapRequest, HttpOgcClient, OgcClient, WmsCapabilities, WmsLayer};
use ogc_common::{BoundingBox, WfsVersion, WmsVersion};
use tracing::{debug, info, warn};

use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeResult};
use crate::keywords::StepValue;

/// Pixel size of every map the probe requests.
pub const MAP_SIZE: (u32, u32) = (300, 300);

/// Format for the image size and PNG checks, whatever the service prefers.
pub const PNG_FORMAT: &str = "image/png";

/// Holds the state a suite builds up step by step: service URL, protocol
/// version and the last query result.
///
/// Steps take `&mut self` and are awaited one at a time; the probe never
/// has more than one request in flight.
pub struct ServiceProbe<C: OgcClient = HttpOgcClient> {
    client: C,
    config: ProbeConfig,
    last_result: StepValue,
}

impl ServiceProbe<HttpOgcClient> {
    /// Probe over HTTP with the configured timeout.
    pub fn new(config: ProbeConfig) -> ProbeResult<Self> {
        let client = HttpOgcClient::new(config.timeout())?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: OgcClient> ServiceProbe<C> {
    /// Probe over any `OgcClient`; `new` picks the HTTP one.
    pub fn with_client(config: ProbeConfig, client: C) -> Self {
        Self {
            client,
            config,
            last_result: StepValue::Count(0),
        }
    }

    /// Current settings, including URL and version changes made by steps.
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn service_url(&self) -> &str {
        &self.config.service_url
    }

    pub fn protocol_version(&self) -> &str {
        &self.config.protocol_version
    }

    /// Value cached by the last successful query step.
    pub fn last_result(&self) -> &StepValue {
        &self.last_result
    }

    /// Version used by later WFS queries. Not validated until then.
    pub fn set_protocol_version(&mut self, version: &str) {
        debug!(version = %version, "Protocol version set");
        self.config.protocol_version = version.to_string();
    }

    /// Endpoint used by later WFS/WMS queries. No network call.
    pub fn set_service_url(&mut self, url: &str) {
        debug!(url = %url, "Service URL set");
        self.config.service_url = url.to_string();
    }

    /// GET the root of `url` and fail unless it answers 200.
    pub async fn connect_to_url(&mut self, url: &str) -> ProbeResult<()> {
        let status = self.client.root_status(url).await?;
        if status != 200 {
            warn!(url = %url, status = status, "Connectivity check failed");
            return Err(ProbeError::UnexpectedStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(())
    }

    /// Number of distinct feature types in the WFS capabilities.
    pub async fn get_number_of_wfs_layers(&mut self) -> ProbeResult<usize> {
        let (url, version) = self.wfs_target()?;
        let caps = self.client.wfs_capabilities(&url, version).await?;
        let count = caps.layer_count();
        self.last_result = StepValue::Count(count);
        Ok(count)
    }

    /// Exact, case-sensitive feature type lookup.
    pub async fn check_for_wfs_layer(&mut self, name: &str) -> ProbeResult<bool> {
        let (url, version) = self.wfs_target()?;
        let caps = self.client.wfs_capabilities(&url, version).await?;
        let found = caps.contains(name);
        debug!(layer = %name, found = found, "WFS layer lookup");
        self.last_result = StepValue::Bool(found);
        Ok(found)
    }

    /// Exact, case-sensitive named layer lookup.
    pub async fn check_for_wms_layer(&mut self, name: &str) -> ProbeResult<bool> {
        let (url, version) = self.wms_target()?;
        let caps = self.client.wms_capabilities(&url, version).await?;
        let found = caps.contains(name);
        debug!(layer = %name, found = found, "WMS layer lookup");
        self.last_result = StepValue::Bool(found);
        Ok(found)
    }

    /// GetMap every named layer in document order, in the service's first
    /// advertised format. Stops at the first failure.
    pub async fn check_advertised_wms_layers(&mut self) -> ProbeResult<usize> {
        let (url, version) = self.wms_target()?;
        let caps = self.client.wms_capabilities(&url, version).await?;
        let format = caps.first_getmap_format().unwrap_or(PNG_FORMAT).to_string();
        let endpoint = self.map_endpoint(&url, &caps);

        for layer in &caps.layers {
            let request = map_request(layer, &format)?;
            self.client
                .get_map(&endpoint, version, &request)
                .await
                .map_err(|source| ProbeError::LayerRequest {
                    layer: layer.name.clone(),
                    source,
                })?;
            debug!(layer = %layer.name, "Layer rendered");
        }

        info!(layers = caps.layers.len(), format = %format, "All advertised WMS layers rendered");
        Ok(caps.layers.len())
    }

    /// Size in kilobytes of a 300x300 PNG map of `layer`.
    pub async fn get_wms_image_size(
        &mut self,
        layer: &str,
        srs: &str,
        min_x: &str,
        min_y: &str,
        max_x: &str,
        max_y: &str,
    ) -> ProbeResult<u64> {
        let bbox = BoundingBox::from_edges(min_x, min_y, max_x, max_y)?;
        let (url, version) = self.wms_target()?;
        let endpoint = if self.config.follow_advertised_getmap_url {
            let caps = self.client.wms_capabilities(&url, version).await?;
            self.map_endpoint(&url, &caps)
        } else {
            url
        };

        let request = GetMapRequest::new(layer, srs, bbox, MAP_SIZE, PNG_FORMAT);
        let body = self.client.get_map(&endpoint, version, &request).await?;

        let size = self.config.image_size_rounding.kilobytes(body.len());
        info!(layer = %layer, bytes = body.len(), kilobytes = size, "Measured map size");
        self.last_result = StepValue::Kilobytes(size);
        Ok(size)
    }

    /// Compare the cached result with `expected` as strings.
    pub fn result_should_be(&self, expected: &str) -> ProbeResult<()> {
        let actual = self.last_result.to_string();
        if actual != expected {
            return Err(ProbeError::Mismatch {
                expected: expected.to_string(),
                actual,
            });
        }
        Ok(())
    }

    /// PNG map of the first named layer. Returns the image size in bytes.
    pub async fn check_get_png_image(&mut self) -> ProbeResult<usize> {
        let (url, version) = self.wms_target()?;
        let caps = self.client.wms_capabilities(&url, version).await?;
        let layer = caps.layers.first().ok_or(ProbeError::NoNamedLayers)?;

        let request = map_request(layer, PNG_FORMAT)?;
        let endpoint = self.map_endpoint(&url, &caps);
        let body = self
            .client
            .get_map(&endpoint, version, &request)
            .await
            .map_err(|source| ProbeError::LayerRequest {
                layer: layer.name.clone(),
                source,
            })?;

        info!(layer = %layer.name, bytes = body.len(), "PNG map received");
        Ok(body.len())
    }

    /// Where GetMap goes: the advertised endpoint when following it is
    /// enabled and one is advertised, otherwise the service URL.
    fn map_endpoint(&self, url: &str, caps: &WmsCapabilities) -> String {
        match (&caps.getmap_url, self.config.follow_advertised_getmap_url) {
            (Some(advertised), true) if !advertised.trim().is_empty() => {
                debug!(url = %advertised, "Using advertised GetMap endpoint");
                advertised.trim().to_string()
            }
            _ => url.to_string(),
        }
    }

    fn require_url(&self) -> ProbeResult<String> {
        let url = self.config.service_url.trim();
        if url.is_empty() {
            return Err(ProbeError::ServiceUrlNotSet);
        }
        Ok(url.to_string())
    }

    fn wfs_target(&self) -> ProbeResult<(String, WfsVersion)> {
        let url = self.require_url()?;
        let version = self.config.protocol_version.parse()?;
        Ok((url, version))
    }

    fn wms_target(&self) -> ProbeResult<(String, WmsVersion)> {
        let url = self.require_url()?;
        let version = self.config.wms_version.parse()?;
        Ok((url, version))
    }
}

/// Map request for `layer` using its first CRS and extent.
fn map_request(layer: &WmsLayer, format: &str) -> ProbeResult<GetMapRequest> {
    let crs = layer.first_crs().ok_or_else(|| ProbeError::LayerIncomplete {
        layer: layer.name.clone(),
        missing: "CRS",
    })?;
    let bbox = layer.map_extent().ok_or_else(|| ProbeError::LayerIncomplete {
        layer: layer.name.clone(),
        missing: "bounding box",
    })?;
    Ok(GetMapRequest::new(&layer.name, crs, bbox, MAP_SIZE, format))
}

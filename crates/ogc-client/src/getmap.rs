//! WMS GetMap request parameters.

use serde::Serialize;

use ogc_common::{BoundingBox, WmsVersion};

/// Parameters for a single-layer GetMap request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GetMapRequest {
    /// Layer name as advertised in capabilities
    pub layer: String,
    /// Style name; empty selects the default style
    pub style: String,
    /// Reference system code (e.g. "EPSG:4326")
    pub crs: String,
    pub bbox: BoundingBox,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Output MIME type (e.g. "image/png")
    pub format: String,
}

impl GetMapRequest {
    /// Request with the default style.
    pub fn new(
        layer: impl Into<String>,
        crs: impl Into<String>,
        bbox: BoundingBox,
        (width, height): (u32, u32),
        format: impl Into<String>,
    ) -> Self {
        Self {
            layer: layer.into(),
            style: String::new(),
            crs: crs.into(),
            bbox,
            width,
            height,
            format: format.into(),
        }
    }

    /// KVP parameters for this request.
    ///
    /// Exceptions are requested as XML so failures can be told apart from
    /// images by content type.
    pub fn to_params(&self, version: WmsVersion) -> Vec<(&'static str, String)> {
        let exceptions = match version {
            WmsVersion::V1_1_1 => "application/vnd.ogc.se_xml",
            WmsVersion::V1_3_0 => "XML",
        };

        vec![
            ("SERVICE", "WMS".to_string()),
            ("VERSION", version.as_str().to_string()),
            ("REQUEST", "GetMap".to_string()),
            ("LAYERS", self.layer.clone()),
            ("STYLES", self.style.clone()),
            (version.crs_param(), self.crs.clone()),
            ("BBOX", self.bbox.to_wms_param()),
            ("WIDTH", self.width.to_string()),
            ("HEIGHT", self.height.to_string()),
            ("FORMAT", self.format.clone()),
            ("EXCEPTIONS", exceptions.to_string()),
        ]
    }
}

//! OGC WFS and WMS client.
//!
//! Supports:
//! - WFS 1.0.0, 1.1.0 and 2.0.0 GetCapabilities (feature type listing)
//! - WMS 1.1.1 and 1.3.0 GetCapabilities (named layers, CRS, bounding boxes, formats)
//! - WMS GetMap over KVP, with service exception detection
//! - A plain HTTP session used for connectivity checks

pub mod capabilities;
pub mod client;
pub mod error;
pub mod exceptions;
pub mod getmap;
pub mod kvp;
pub mod session;
mod xml;

pub use capabilities::{
    parse_wfs_capabilities, parse_wms_capabilities, FeatureType, LayerBoundingBox,
    WfsCapabilities, WmsCapabilities, WmsLayer,
};
pub use client::{HttpOgcClient, OgcClient};
pub use error::{OgcError, OgcResult};
pub use getmap::GetMapRequest;
pub use session::HttpSession;

pub use ogc_common::{BoundingBox, WfsVersion, WmsVersion};

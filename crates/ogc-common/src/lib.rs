//! Common types shared by the OGC client and the service probe.

pub mod bbox;
pub mod version;

pub use bbox::{BboxParseError, BoundingBox};
pub use version::{VersionParseError, WfsVersion, WmsVersion};

//! Capabilities document models and parsers.

mod wfs;
mod wms;

pub use wfs::{parse_wfs_capabilities, FeatureType, WfsCapabilities};
pub use wms::{parse_wms_capabilities, LayerBoundingBox, WmsCapabilities, WmsLayer};

use crate::error::{OgcError, OgcResult};
use crate::exceptions::{is_exception_report, parse_exception_report};
use crate::xml::root_element;

/// Check the root element, turning exception reports into errors.
fn expect_root(xml: &str, document: &'static str, expected: &[&str]) -> OgcResult<()> {
    let root = root_element(xml, document)?;
    if expected.iter().any(|e| *e == root) {
        return Ok(());
    }
    if is_exception_report(&root) {
        if let Some(err) = parse_exception_report(xml) {
            return Err(err);
        }
    }
    Err(OgcError::UnexpectedDocument {
        expected: expected.join("|"),
        found: root,
    })
}

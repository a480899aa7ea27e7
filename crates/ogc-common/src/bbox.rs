//! Bounding box types and KVP formatting.

use serde::{Deserialize, Serialize};

/// A bounding box in the coordinate units of whatever SRS it is paired with.
///
/// No axis swapping is done here: the edges go onto the wire in the order
/// they were supplied or advertised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Build a bbox from four separately supplied string edges.
    ///
    /// Surrounding whitespace is ignored, so `" 10.5"` parses as `10.5`.
    pub fn from_edges(
        min_x: &str,
        min_y: &str,
        max_x: &str,
        max_y: &str,
    ) -> Result<Self, BboxParseError> {
        Ok(Self {
            min_x: parse_edge("minx", min_x)?,
            min_y: parse_edge("miny", min_y)?,
            max_x: parse_edge("maxx", max_x)?,
            max_y: parse_edge("maxy", max_y)?,
        })
    }

    /// Format as a KVP `BBOX` value.
    pub fn to_wms_param(&self) -> String {
        format!("{},{},{},{}", self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

fn parse_edge(edge: &'static str, value: &str) -> Result<f64, BboxParseError> {
    value
        .trim()
        .parse()
        .map_err(|_| BboxParseError::InvalidNumber {
            edge,
            value: value.to_string(),
        })
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid number for {edge}: '{value}'")]
    InvalidNumber { edge: &'static str, value: String },
}

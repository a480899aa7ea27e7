//! Probe errors.

use ogc_client::OgcError;
use ogc_common::{BboxParseError, VersionParseError};
use serde::Serialize;
use thiserror::Error;

pub type ProbeResult<T> = Result<T, ProbeError>;

/// Broad class of a failed step, as shown in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The service could not be reached or answered with a bad status
    Connectivity,
    /// The service answered, but not with what the step expected
    AssertionMismatch,
    /// The service answered with something unusable
    Protocol,
    /// The step itself was wrong: missing URL, bad arguments
    Configuration,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("url: {url} Status {status} Can't connect")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Result should be '{expected}' but was '{actual}'")]
    Mismatch { expected: String, actual: String },

    #[error("GetMap for layer '{layer}' failed: {source}")]
    LayerRequest {
        layer: String,
        #[source]
        source: OgcError,
    },

    #[error("Layer '{layer}' advertises no {missing}")]
    LayerIncomplete {
        layer: String,
        missing: &'static str,
    },

    #[error("Service advertises no named WMS layers")]
    NoNamedLayers,

    #[error("Service URL is not set")]
    ServiceUrlNotSet,

    #[error("Invalid bounding box: {0}")]
    InvalidBbox(#[from] BboxParseError),

    #[error(transparent)]
    Version(#[from] VersionParseError),

    #[error("Unknown keyword '{0}'")]
    UnknownKeyword(String),

    #[error("{keyword} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        keyword: &'static str,
        expected: String,
        actual: usize,
    },

    #[error(transparent)]
    Ogc(#[from] OgcError),
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::UnexpectedStatus { .. } => ErrorKind::Connectivity,
            ProbeError::Mismatch { .. }
            | ProbeError::LayerRequest { .. }
            | ProbeError::LayerIncomplete { .. }
            | ProbeError::NoNamedLayers => ErrorKind::AssertionMismatch,
            ProbeError::Version(_) => ErrorKind::Protocol,
            ProbeError::ServiceUrlNotSet
            | ProbeError::InvalidBbox(_)
            | ProbeError::UnknownKeyword(_)
            | ProbeError::ArgumentCount { .. } => ErrorKind::Configuration,
            ProbeError::Ogc(err) => match err {
                e if e.is_connectivity() => ErrorKind::Connectivity,
                OgcError::InvalidUrl { .. } | OgcError::ClientBuild(_) => ErrorKind::Configuration,
                _ => ErrorKind::Protocol,
            },
        }
    }
}

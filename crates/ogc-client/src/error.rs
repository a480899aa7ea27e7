//! Error types for OGC client operations.

use thiserror::Error;

/// Result type alias using OgcError.
pub type OgcResult<T> = Result<T, OgcError>;

/// Failures surfaced by the OGC client.
#[derive(Debug, Error)]
pub enum OgcError {
    // === Request construction ===
    #[error("Invalid service URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    // === Transport ===
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    // === Documents ===
    #[error("Malformed XML in {document}: {message}")]
    Xml {
        document: &'static str,
        message: String,
    },

    #[error("Expected <{expected}> document, got <{found}>")]
    UnexpectedDocument { expected: String, found: String },

    #[error("Service exception [{code}]: {message}")]
    ServiceException { code: String, message: String },
}

impl OgcError {
    /// True when the failure happened before a usable response arrived.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, OgcError::Http { .. } | OgcError::Status { .. })
    }

    /// OGC exception code, when the server reported one.
    pub fn exception_code(&self) -> Option<&str> {
        match self {
            OgcError::ServiceException { code, .. } => Some(code),
            _ => None,
        }
    }
}

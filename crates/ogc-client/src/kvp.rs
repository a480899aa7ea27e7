//! KVP (key-value pair) request URL construction.

use reqwest::Url;

use crate::error::{OgcError, OgcResult};

/// Parse a service endpoint, rejecting anything that is not an absolute http(s) URL.
pub fn parse_service_url(url: &str) -> OgcResult<Url> {
    let parsed = Url::parse(url.trim()).map_err(|e| OgcError::InvalidUrl {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(OgcError::InvalidUrl {
            url: url.to_string(),
            message: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// Append OGC parameters to a service URL.
///
/// Vendor parameters already on the URL (e.g. `map=/path/to.map`) are kept.
/// Any existing parameter whose key matches one of `params`, compared
/// case-insensitively, is replaced.
pub fn build_request_url(base: &str, params: &[(&str, String)]) -> OgcResult<Url> {
    let mut url = parse_service_url(base)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(p, _)| p.eq_ignore_ascii_case(k)))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }

    Ok(url)
}

/// Standard GetCapabilities parameters for a service.
pub fn capabilities_params(service: &str, version: &str) -> Vec<(&'static str, String)> {
    vec![
        ("SERVICE", service.to_string()),
        ("REQUEST", "GetCapabilities".to_string()),
        ("VERSION", version.to_string()),
    ]
}

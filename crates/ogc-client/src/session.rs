//! Plain HTTP session used for connectivity checks.

use reqwest::{Client, Url};
use tracing::debug;

use crate::error::{OgcError, OgcResult};
use crate::kvp::parse_service_url;

/// A base URL bound to a shared HTTP client.
///
/// Cloning is cheap; clones share the client's connection pool.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: Client,
    base: Url,
}

impl HttpSession {
    pub fn open(client: Client, url: &str) -> OgcResult<Self> {
        Ok(Self {
            client,
            base: parse_service_url(url)?,
        })
    }

    /// Resolve `path` against the session base by plain concatenation.
    ///
    /// `http://host/geoserver` + `/` gives `http://host/geoserver/`, not
    /// `http://host/`.
    pub fn url_for(&self, path: &str) -> OgcResult<Url> {
        let base = self.base.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let joined = format!("{}/{}", base, path);
        Url::parse(&joined).map_err(|e| OgcError::InvalidUrl {
            url: joined.clone(),
            message: e.to_string(),
        })
    }

    /// GET `path` and return the status code, whatever it is.
    pub async fn get_status(&self, path: &str) -> OgcResult<u16> {
        let url = self.url_for(path)?;
        debug!(url = %url, "Session GET");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| OgcError::Http {
                url: url.to_string(),
                source,
            })?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_keeps_base_path() {
        let session = HttpSession::open(Client::new(), "http://host:8080/geoserver").unwrap();
        assert_eq!(
            session.url_for("/").unwrap().as_str(),
            "http://host:8080/geoserver/"
        );
    }

    #[test]
    fn test_trailing_slash_not_doubled() {
        let session = HttpSession::open(Client::new(), "http://host/").unwrap();
        assert_eq!(session.url_for("/").unwrap().as_str(), "http://host/");
        assert_eq!(
            session.url_for("status").unwrap().as_str(),
            "http://host/status"
        );
    }
}

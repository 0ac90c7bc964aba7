// Page fetchers
//
// The analysis engine only needs "give me the markup for this URL or tell
// me you couldn't". `PageFetcher` is that seam; `HttpFetcher` goes to the
// site directly, `ProxyFetcher` goes through a JSON envelope proxy for
// sites that block direct retrieval.

use futures_util::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Default public envelope proxy.
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/get";

/// Retrieves raw page markup for a URL.
///
/// Implementations must never return an empty body as success: an empty
/// response is reported as [`Error::EmptyBody`].
pub trait PageFetcher: Send + Sync {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, Error>>;
}

fn non_empty(body: String, url: &Url) -> Result<String, Error> {
    if body.trim().is_empty() {
        return Err(Error::EmptyBody {
            url: url.to_string(),
        });
    }
    Ok(body)
}

// ── Direct ──────────────────────────────────────────────────────────

/// Fetches pages with a plain GET against the site itself.
pub struct HttpFetcher {
    http: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Create a fetcher with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn get(&self, url: &Url) -> Result<String, Error> {
        debug!(%url, "fetching page");
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let body = resp.text().await?;
        trace!(%url, bytes = body.len(), "page fetched");
        non_empty(body, url)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, Error>> {
        Box::pin(self.get(url))
    }
}

// ── Proxied ─────────────────────────────────────────────────────────

/// Envelope returned by allorigins-style proxies.
#[derive(Debug, Deserialize)]
struct ProxyEnvelope {
    contents: Option<String>,
    status: Option<ProxyStatus>,
}

#[derive(Debug, Deserialize)]
struct ProxyStatus {
    http_code: Option<u16>,
}

/// Fetches pages through a JSON envelope proxy: `GET {proxy}?url={target}`
/// answering `{"contents": "<html>..."}`.
pub struct ProxyFetcher {
    http: reqwest::Client,
    proxy_url: Url,
}

impl ProxyFetcher {
    pub fn new(proxy_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            proxy_url,
        })
    }

    /// Create a proxy fetcher with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, proxy_url: Url) -> Self {
        Self { http, proxy_url }
    }

    /// The proxy endpoint.
    pub fn proxy_url(&self) -> &Url {
        &self.proxy_url
    }

    fn request_url(&self, target: &Url) -> Url {
        let mut url = self.proxy_url.clone();
        url.query_pairs_mut().append_pair("url", target.as_str());
        url
    }

    async fn get(&self, target: &Url) -> Result<String, Error> {
        let url = self.request_url(target);
        debug!(%target, proxy = %self.proxy_url, "fetching page via proxy");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: self.proxy_url.to_string(),
            });
        }

        let body = resp.text().await?;
        let envelope: ProxyEnvelope =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: body.clone(),
            })?;

        if let Some(code) = envelope.status.and_then(|s| s.http_code) {
            if !(200..300).contains(&code) {
                return Err(Error::Status {
                    status: code,
                    url: target.to_string(),
                });
            }
        }

        let Some(contents) = envelope.contents else {
            return Err(Error::Proxy {
                message: format!("no contents returned for {target}"),
            });
        };
        non_empty(contents, target)
    }
}

impl PageFetcher for ProxyFetcher {
    fn fetch<'a>(&'a self, url: &'a Url) -> BoxFuture<'a, Result<String, Error>> {
        Box::pin(self.get(url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn proxy_request_url_encodes_target() {
        let fetcher = ProxyFetcher::with_client(
            reqwest::Client::new(),
            Url::parse(DEFAULT_PROXY_URL).unwrap(),
        );
        let target = Url::parse("https://example.com/a?b=c&d=e").unwrap();
        let url = fetcher.request_url(&target);

        assert_eq!(url.host_str(), Some("api.allorigins.win"));
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "url");
        assert_eq!(value, "https://example.com/a?b=c&d=e");
    }

    #[test]
    fn whitespace_body_is_empty() {
        let url = Url::parse("https://example.com").unwrap();
        let err = non_empty("  \n ".into(), &url).unwrap_err();
        assert!(matches!(err, Error::EmptyBody { .. }));
        assert!(err.is_unreachable());
    }
}

//! HTTP client implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::{HttpRequest, HttpResponse};
use reqwest::Client;
use tracing::{debug, trace};
use url::Url;

/// HTTP client trait used by virtual users to reach the target API
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a request and return the status and body.
    ///
    /// Any status code is returned as `Ok`; `Err` is reserved for transport
    /// failures (connect, timeout, DNS, body read).
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// reqwest-backed client owning its own connection pool and cookie jar.
///
/// The target API identifies participants by cookie, so every virtual user
/// gets its own `ReqwestClient` and therefore its own participant.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    base_url: Url,
}

impl ReqwestClient {
    /// Create a client for `base_url` with the given configuration
    pub fn new(base_url: &str, config: &HttpConfig) -> Result<Self, HttpError> {
        let parsed =
            Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(HttpError::InvalidUrl(format!(
                "{}: cannot be used as a base URL",
                base_url
            )));
        }

        debug!(
            "Creating HTTP client for {} with {}s timeout",
            base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    /// Append the segments of `path` to the base URL's path.
    ///
    /// Any path prefix on the base URL is kept, and each segment is
    /// percent-encoded on its own.
    pub fn url_for(&self, path: &str) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                HttpError::InvalidUrl(format!("{}: cannot be used as a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let url = self.url_for(&request.path)?;
        trace!("{} {} ({})", request.method, url, request.name);

        let mut builder = self
            .client
            .request(reqwest::Method::from(request.method), url.clone());

        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        trace!("{} {} -> {} ({} bytes)", request.method, url, status, body.len());

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

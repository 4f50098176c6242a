use crate::error::{FetchError, Result};
use crate::headers::RequestProfile;
use async_trait::async_trait;
use lookout_core::ProbingConfig;
use reqwest::redirect::Policy;
use reqwest::Client;
use url::Url;

/// A fully read HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// HTTP status code
    pub status: u16,
    /// URL after redirects
    pub final_url: String,
    /// `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Decoded body text
    pub body: String,
}

impl FetchedPage {
    /// Build a page directly, mostly useful for stubs.
    pub fn new(status: u16, final_url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            final_url: final_url.into(),
            content_type: None,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Capability for issuing GET requests.
///
/// Probes depend on this trait rather than on a concrete client so the
/// aggregation pipeline can be exercised without network access.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url`, following redirects, and read the whole body.
    async fn get(&self, url: &str) -> Result<FetchedPage>;
}

/// [`HttpFetcher`] backed by a pooled `reqwest` client.
///
/// One instance is shared by every probe of every request; the underlying
/// client keeps its own connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    /// Build a fetcher with headers, timeout and redirect limit from `config`.
    pub fn from_config(config: &ProbingConfig) -> Result<Self> {
        let profile = RequestProfile::from_config(config);
        let client = Client::builder()
            .default_headers(profile.header_map()?)
            .timeout(config.timeout())
            .redirect(Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client. URL checks still apply to every request.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchedPage> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme {:?} in {url}",
                parsed.scheme()
            )));
        }

        tracing::debug!(url, "GET");

        let response = self.client.get(parsed).send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        tracing::trace!(url, status, bytes = body.len(), "Response received");

        Ok(FetchedPage {
            status,
            final_url,
            content_type,
            body,
        })
    }
}

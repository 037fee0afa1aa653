use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::proxy::sources::DEFAULT_USER_AGENT;

const DEFAULT_DOCUMENT_TIMEOUT: Duration = Duration::from_secs(30);

const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Identity and time limits applied to outbound requests.
#[derive(Clone, Debug)]
pub struct FetchConfig {
    user_agent: String,
    document_timeout: Duration,
    lookup_timeout: Duration,
}

impl FetchConfig {
    pub fn new(user_agent: impl Into<String>, document_timeout: Duration, lookup_timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            document_timeout,
            lookup_timeout,
        }
    }

    /// Limit for fetching whole documents (proxied pages, portal, candidate pages).
    pub fn document_timeout(&self) -> Duration {
        self.document_timeout
    }

    /// Limit for small auxiliary requests such as search suggestions.
    pub fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT, DEFAULT_DOCUMENT_TIMEOUT, DEFAULT_LOOKUP_TIMEOUT)
    }
}

/// The raw outcome of a single successful request.
#[derive(Clone, Debug)]
pub struct UpstreamResult {
    final_url: Url,
    status: u16,
    content_type: Option<String>,
    body: Bytes,
}

impl UpstreamResult {
    pub fn new(final_url: Url, status: u16, content_type: Option<String>, body: Bytes) -> Self {
        Self {
            final_url,
            status,
            content_type,
            body,
        }
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Where the response actually came from once all redirects were followed.
    pub fn final_url(&self) -> &Url {
        &self.final_url
    }

    pub fn into_parts(self) -> (Option<String>, Bytes) {
        (self.content_type, self.body)
    }

    pub fn status(&self) -> u16 {
        self.status
    }
}

/// A single outbound GET. Implementations follow redirects, never retry, and report any status
/// outside of the 2xx range as [`FetchError::UpstreamNon2xx`].
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<UpstreamResult, FetchError>;
}

/// The production fetcher, a thin wrapper around a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(FetchError::ClientBuild)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<UpstreamResult, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(FetchError::from_transport)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(FetchError::UpstreamNon2xx(status));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let body = response.bytes().await.map_err(FetchError::from_transport)?;

        tracing::debug!(%final_url, status, bytes = body.len(), "upstream fetch complete");

        Ok(UpstreamResult::new(final_url, status, content_type, body))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("unable to build the upstream http client: {0}")]
    ClientBuild(reqwest::Error),

    #[error("connection to the upstream failed: {0}")]
    ConnectionFailed(String),

    #[error("upstream did not respond in time")]
    Timeout,

    #[error("upstream responded with status {0}")]
    UpstreamNon2xx(u16),
}

impl FetchError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }

        Self::ConnectionFailed(err.to_string())
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::proxy::{Fetch, FetchError, UpstreamResult};

/// A [`Fetch`] implementation that replays canned outcomes keyed by the exact requested URL and
/// remembers every URL it was asked for. Each outcome is handed out once, anything unscripted
/// behaves like an unreachable host.
#[derive(Default)]
pub(crate) struct ScriptedFetcher {
    outcomes: Mutex<HashMap<String, Result<UpstreamResult, FetchError>>>,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("lock").clone()
    }

    pub(crate) fn respond(self, url: &str, outcome: Result<UpstreamResult, FetchError>) -> Self {
        self.outcomes
            .lock()
            .expect("lock")
            .insert(url.to_string(), outcome);

        self
    }
}

#[async_trait]
impl Fetch for ScriptedFetcher {
    async fn fetch(&self, url: &Url, _timeout: Duration) -> Result<UpstreamResult, FetchError> {
        self.requested.lock().expect("lock").push(url.to_string());

        self.outcomes
            .lock()
            .expect("lock")
            .remove(url.as_str())
            .unwrap_or_else(|| Err(FetchError::ConnectionFailed(format!("nothing scripted for {url}"))))
    }
}

pub(crate) fn html_result(final_url: &str, body: &str) -> UpstreamResult {
    upstream_result(
        final_url,
        Some("text/html; charset=utf-8"),
        body.as_bytes().to_vec(),
    )
}

pub(crate) fn upstream_result(final_url: &str, content_type: Option<&str>, body: Vec<u8>) -> UpstreamResult {
    UpstreamResult::new(
        Url::parse(final_url).expect("valid test url"),
        200,
        content_type.map(String::from),
        Bytes::from(body),
    )
}

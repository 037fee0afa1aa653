use std::time::Duration;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::proxy::sources::CandidateTemplate;
use crate::proxy::{Fetch, ProxyError, UpstreamResult};

/// Characters that can't appear raw inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// The first candidate that served a named asset.
#[derive(Debug)]
pub struct MatchedAsset {
    asset_base: String,
    result: UpstreamResult,
}

impl MatchedAsset {
    /// Directory the winning page's relative references resolve against.
    pub fn asset_base(&self) -> &str {
        &self.asset_base
    }

    pub fn into_result(self) -> UpstreamResult {
        self.result
    }

    pub fn result(&self) -> &UpstreamResult {
        &self.result
    }
}

/// Tries each candidate in order and returns the first one answering with a plain `200`. Failures
/// of individual candidates are only logged, the caller learns about them solely through
/// [`ProxyError::AssetNotFound`] once the list is exhausted. Candidates are never fetched
/// concurrently.
pub async fn resolve_named_asset(
    fetcher: &dyn Fetch,
    name: &str,
    candidates: &[CandidateTemplate],
    timeout: Duration,
) -> Result<MatchedAsset, ProxyError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ProxyError::InvalidInput("a game name is required".to_string()));
    }

    let segment = utf8_percent_encode(name, PATH_SEGMENT).to_string();

    for (idx, candidate) in candidates.iter().enumerate() {
        let page = candidate.page(&segment);

        let url = match Url::parse(&page) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!(candidate = idx, %page, "skipping unparsable candidate: {err}");
                continue;
            }
        };

        match fetcher.fetch(&url, timeout).await {
            Ok(result) if result.status() == 200 => {
                tracing::debug!(candidate = idx, %url, "named asset located");

                return Ok(MatchedAsset {
                    asset_base: candidate.asset_base(&segment),
                    result,
                });
            }
            Ok(result) => {
                tracing::debug!(candidate = idx, %url, status = result.status(), "candidate did not match");
            }
            Err(err) => {
                tracing::debug!(candidate = idx, %url, "candidate fetch failed: {err}");
            }
        }
    }

    Err(ProxyError::AssetNotFound(name.to_string()))
}

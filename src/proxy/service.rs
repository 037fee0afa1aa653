use std::sync::Arc;

use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use encoding_rs::{Encoding, UTF_8};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

use crate::proxy::candidates::resolve_named_asset;
use crate::proxy::rewrite::{prefix_relative_references, Rewriter};
use crate::proxy::sources::{
    CandidateTemplate, GAME_CANDIDATES, MAX_SUGGESTIONS, PORTAL_ORIGIN, SUGGESTION_TEMPLATE,
};
use crate::proxy::{Fetch, FetchConfig, FetchError, HttpFetcher, ProxyError, ResolvedTarget, UpstreamResult};

/// Assumed when an upstream doesn't bother to tell us what it sent.
const DEFAULT_CONTENT_TYPE: &str = "text/html";

/// A fetched body ready to be handed back to the client under its upstream content type.
#[derive(Debug)]
pub struct ProxiedDocument {
    content_type: String,
    body: Bytes,
}

impl ProxiedDocument {
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    fn from_upstream(result: UpstreamResult, rewrite: impl FnOnce(&str) -> String) -> Self {
        let (content_type, body) = result.into_parts();
        let content_type = content_type.unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        if !content_type.contains("text/html") {
            return Self { content_type, body };
        }

        let body = reencode_rewritten(&body, declared_encoding(&content_type), rewrite).unwrap_or(body);

        Self { content_type, body }
    }
}

/// Decodes `body`, applies `rewrite`, and encodes the result back into the charset it arrived in.
/// Returns `None` when the rewrite left the document as it was so the original bytes can be used.
fn reencode_rewritten(
    body: &[u8],
    encoding: &'static Encoding,
    rewrite: impl FnOnce(&str) -> String,
) -> Option<Bytes> {
    let (html, actual_encoding, malformed) = encoding.decode(body);
    if malformed {
        tracing::debug!(charset = actual_encoding.name(), "document contained malformed sequences");
    }

    let rewritten = rewrite(&html);
    if rewritten == html {
        return None;
    }

    // Served back under the upstream content type, so the charset it declares has to hold
    let (encoded, _, _) = actual_encoding.output_encoding().encode(&rewritten);
    Some(Bytes::from(encoded.into_owned()))
}

/// The encoding named by the `charset` parameter of a content type, UTF-8 when it is missing or
/// unknown.
fn declared_encoding(content_type: &str) -> &'static Encoding {
    content_type
        .split(';')
        .skip(1)
        .filter_map(|param| param.split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("charset"))
        .and_then(|(_, label)| Encoding::for_label(label.trim().trim_matches('"').as_bytes()))
        .unwrap_or(UTF_8)
}

impl IntoResponse for ProxiedDocument {
    fn into_response(self) -> Response {
        ([(CONTENT_TYPE, self.content_type)], self.body).into_response()
    }
}

/// Ties target resolution, fetching, and rewriting together for the proxy routes. Cheap to clone,
/// every request works on its own data and nothing is cached between requests.
#[derive(Clone)]
pub struct ProxyService {
    config: FetchConfig,
    fetcher: Arc<dyn Fetch>,
}

impl ProxyService {
    pub fn new(config: FetchConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self { config, fetcher }
    }

    pub fn from_config(config: FetchConfig) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&config)?;
        Ok(Self::new(config, Arc::new(fetcher)))
    }

    /// Serves a single game by trying each of the known mirrors in turn.
    pub async fn named_asset(&self, name: &str) -> Result<ProxiedDocument, ProxyError> {
        self.named_asset_from(name, GAME_CANDIDATES).await
    }

    pub async fn named_asset_from(
        &self,
        name: &str,
        candidates: &[CandidateTemplate],
    ) -> Result<ProxiedDocument, ProxyError> {
        let matched = resolve_named_asset(
            self.fetcher.as_ref(),
            name,
            candidates,
            self.config.document_timeout(),
        )
        .await?;

        let asset_base = matched.asset_base().to_string();
        let result = matched.into_result();

        Ok(ProxiedDocument::from_upstream(result, |html| {
            prefix_relative_references(html, &asset_base)
        }))
    }

    /// Serves the game portal as a whole.
    pub async fn portal(&self) -> Result<ProxiedDocument, ProxyError> {
        let target = ResolvedTarget::from_url_input(PORTAL_ORIGIN)?;
        self.proxy(&target, Rewriter::enhanced()).await
    }

    /// Fetches `target` and, for HTML, rewrites its root-relative references against the origin
    /// the content was finally served from.
    pub async fn proxy(&self, target: &ResolvedTarget, rewriter: Rewriter) -> Result<ProxiedDocument, ProxyError> {
        tracing::debug!(target = target.absolute_url(), "proxying");

        let result = self
            .fetcher
            .fetch(target.url(), self.config.document_timeout())
            .await?;

        let origin = result.final_url().origin().ascii_serialization();

        Ok(ProxiedDocument::from_upstream(result, |html| {
            rewriter.rewrite(html, &origin)
        }))
    }

    /// Autocomplete candidates for a partial search phrase. This is a convenience for the client
    /// so any failure at all just produces an empty list.
    pub async fn suggestions(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();
        let url = match Url::parse(&SUGGESTION_TEMPLATE.replace("{}", &encoded)) {
            Ok(url) => url,
            Err(err) => {
                tracing::warn!("unable to build suggestion url: {err}");
                return Vec::new();
            }
        };

        let result = match self.fetcher.fetch(&url, self.config.lookup_timeout()).await {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!("suggestion lookup failed: {err}");
                return Vec::new();
            }
        };

        parse_suggestions(result.body())
    }
}

fn parse_suggestions(body: &[u8]) -> Vec<String> {
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(val) => val,
        Err(err) => {
            tracing::debug!("suggestion response wasn't json: {err}");
            return Vec::new();
        }
    };

    payload
        .get(1)
        .and_then(serde_json::Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(serde_json::Value::as_str)
                .take(MAX_SUGGESTIONS)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

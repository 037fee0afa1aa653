use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

use crate::proxy::sources::SEARCH_TEMPLATE;
use crate::proxy::ProxyError;

/// An absolute http(s) URL the fetcher is allowed to request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedTarget {
    url: Url,
}

impl ResolvedTarget {
    pub fn absolute_url(&self) -> &str {
        self.url.as_str()
    }

    /// Parses user input that is always meant to be a URL, assuming `https` when no scheme was
    /// provided.
    pub fn from_url_input(input: &str) -> Result<Self, ProxyError> {
        let input = input.trim();

        if has_http_scheme(input) {
            return Self::parse(input);
        }

        Self::parse(&format!("https://{input}"))
    }

    /// `scheme://host[:port]`, default ports are omitted.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn parse(raw: &str) -> Result<Self, ProxyError> {
        let url = Url::parse(raw).map_err(|err| ProxyError::InvalidInput(format!("{raw}: {err}")))?;
        Self::try_from(url)
    }
}

impl TryFrom<Url> for ResolvedTarget {
    type Error = ProxyError;

    fn try_from(url: Url) -> Result<Self, Self::Error> {
        match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(Self { url }),
            _ => Err(ProxyError::InvalidInput(format!(
                "{url} is not an absolute http(s) URL"
            ))),
        }
    }
}

/// Turns whatever a user typed into something fetchable. Explicit http(s) URLs are kept, inputs
/// that look like a host get `https://` prepended, everything else becomes a search.
///
/// The host check is a heuristic and phrases such as `e.g.` will be treated as hosts. That is
/// accepted behavior, it is not worth guessing what a user meant.
pub fn resolve(input: &str) -> Result<ResolvedTarget, ProxyError> {
    let input = input.trim();

    if has_http_scheme(input) || looks_like_host(input) {
        return ResolvedTarget::from_url_input(input);
    }

    let phrase = utf8_percent_encode(input, NON_ALPHANUMERIC).to_string();
    ResolvedTarget::parse(&SEARCH_TEMPLATE.replace("{}", &phrase))
}

fn has_http_scheme(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

fn looks_like_host(input: &str) -> bool {
    if input.starts_with("www.") {
        return true;
    }

    input.contains('.')
        && !input.chars().any(char::is_whitespace)
        && input.split('.').count() >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_urls_are_kept() {
        let target = resolve("http://example.com:8080/a/b?c=d").unwrap();
        assert_eq!(target.absolute_url(), "http://example.com:8080/a/b?c=d");
        assert_eq!(target.scheme(), "http");
        assert_eq!(target.origin(), "http://example.com:8080");

        let target = resolve("https://example.com/path").unwrap();
        assert_eq!(target.absolute_url(), "https://example.com/path");
        assert_eq!(target.origin(), "https://example.com");
    }

    #[test]
    fn test_hosts_get_https() {
        assert_eq!(resolve("example.org").unwrap().absolute_url(), "https://example.org/");
        assert_eq!(
            resolve("www.example").unwrap().absolute_url(),
            "https://www.example/"
        );
        assert_eq!(
            resolve("news.example.co.uk/story").unwrap().origin(),
            "https://news.example.co.uk"
        );
    }

    #[test]
    fn test_phrases_become_searches() {
        let target = resolve("rust borrow checker").unwrap();

        assert_eq!(
            target.absolute_url(),
            "https://www.google.com/search?q=rust%20borrow%20checker"
        );
        assert_eq!(target.origin(), "https://www.google.com");

        let target = resolve("weather").unwrap();
        assert!(target.absolute_url().ends_with("?q=weather"));
    }

    #[test]
    fn test_phrases_with_dots_and_spaces_are_searches() {
        let target = resolve("version 1.2 release").unwrap();
        assert!(target.absolute_url().contains("version%201%2E2%20release"));
    }

    // Known limitation of the host heuristic: a dotted token without spaces is always a host.
    #[test]
    fn test_dotted_words_are_treated_as_hosts() {
        let target = resolve("e.g.").unwrap();
        assert_eq!(target.scheme(), "https");
        assert!(!target.absolute_url().contains("google.com/search"));
    }

    #[test]
    fn test_plain_url_input_always_prefixes() {
        let target = ResolvedTarget::from_url_input("  example.org/about ").unwrap();
        assert_eq!(target.absolute_url(), "https://example.org/about");
    }

    #[test]
    fn test_unusable_input_is_rejected() {
        assert!(matches!(
            ResolvedTarget::from_url_input(""),
            Err(ProxyError::InvalidInput(_))
        ));
        assert!(matches!(
            ResolvedTarget::try_from(Url::parse("ftp://example.com/").unwrap()),
            Err(ProxyError::InvalidInput(_))
        ));
    }
}

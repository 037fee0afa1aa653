//! Textual reference rewriting for proxied HTML.
//!
//! This intentionally does not parse the document. Markup is rewritten with plain pattern
//! substitution, which copes with broken pages but will also rewrite text that merely looks like
//! an attribute (inside a `<script>` string literal or a comment for instance). Only the rules
//! below are applied: CSS `url()` values, `style` attributes and document-relative paths are left
//! alone on the proxied routes.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// `attr="/path"` where the path does not start with a second slash. The value is captured
/// without its leading slash.
static DOUBLE_ROOT_RELATIVE_PATTERN: &str = r#"(href|src|action)="/([^/"][^"]*)?""#;

static SINGLE_ROOT_RELATIVE_PATTERN: &str = r#"(href|src)='/([^/'][^']*)?'"#;

static PROTOCOL_RELATIVE_PATTERN: &str = r#"(href|src)=(["'])//"#;

static ANY_REFERENCE_PATTERN: &str = r#"(href|src)=(?:"([^"]*)"|'([^']*)')"#;

static URL_SCHEME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9+.\-]*:";

static DOUBLE_ROOT_RELATIVE: OnceLock<Regex> = OnceLock::new();

static SINGLE_ROOT_RELATIVE: OnceLock<Regex> = OnceLock::new();

static PROTOCOL_RELATIVE: OnceLock<Regex> = OnceLock::new();

static ANY_REFERENCE: OnceLock<Regex> = OnceLock::new();

static URL_SCHEME: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static rewrite patterns to compile"))
}

/// Which of the origin rewrite rules are active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rewriter {
    form_actions: bool,
    protocol_relative: bool,
}

impl Rewriter {
    /// Root-relative `href` and `src` values in either quote style.
    pub const fn basic() -> Self {
        Self {
            form_actions: false,
            protocol_relative: false,
        }
    }

    /// Everything [`Rewriter::basic`] does, plus double quoted form `action` targets and
    /// normalization of protocol-relative `href`/`src` values to `https://`.
    pub const fn enhanced() -> Self {
        Self {
            form_actions: true,
            protocol_relative: true,
        }
    }

    /// Rewrites root-relative references so they point at `origin`. The output contains no
    /// `attr="/..."` references the active rules match, so running it again is a no-op.
    pub fn rewrite(&self, html: &str, origin: &str) -> String {
        let double = compiled(&DOUBLE_ROOT_RELATIVE, DOUBLE_ROOT_RELATIVE_PATTERN);
        let out = double.replace_all(html, |caps: &Captures| {
            let attr = &caps[1];
            let path = caps.get(2).map_or("", |m| m.as_str());

            if attr == "action" && !self.form_actions {
                return caps[0].to_string();
            }

            format!(r#"{attr}="{origin}/{path}""#)
        });

        let single = compiled(&SINGLE_ROOT_RELATIVE, SINGLE_ROOT_RELATIVE_PATTERN);
        let out = replace_owned(out, single, |caps: &Captures| {
            let path = caps.get(2).map_or("", |m| m.as_str());
            format!("{}='{origin}/{path}'", &caps[1])
        });

        if !self.protocol_relative {
            return out.into_owned();
        }

        let protocol = compiled(&PROTOCOL_RELATIVE, PROTOCOL_RELATIVE_PATTERN);
        replace_owned(out, protocol, |caps: &Captures| {
            format!("{}={}https://", &caps[1], &caps[2])
        })
        .into_owned()
    }
}

/// Prefixes document-relative `href`/`src` values with `base`. Values that carry a scheme, are
/// protocol- or root-relative, are empty, or are fragment links are left as they are.
pub fn prefix_relative_references(html: &str, base: &str) -> String {
    let references = compiled(&ANY_REFERENCE, ANY_REFERENCE_PATTERN);

    references
        .replace_all(html, |caps: &Captures| {
            let attr = &caps[1];
            let (value, quote) = match (caps.get(2), caps.get(3)) {
                (Some(m), _) => (m.as_str(), '"'),
                (None, Some(m)) => (m.as_str(), '\''),
                (None, None) => return caps[0].to_string(),
            };

            if !is_document_relative(value) {
                return caps[0].to_string();
            }

            format!("{attr}={quote}{base}{value}{quote}")
        })
        .into_owned()
}

fn is_document_relative(value: &str) -> bool {
    if value.is_empty() || value.starts_with('/') || value.starts_with('#') {
        return false;
    }

    !compiled(&URL_SCHEME, URL_SCHEME_PATTERN).is_match(value)
}

fn replace_owned<'a>(
    input: Cow<'a, str>,
    regex: &Regex,
    replacer: impl FnMut(&Captures) -> String,
) -> Cow<'a, str> {
    match input {
        Cow::Borrowed(text) => regex.replace_all(text, replacer),
        Cow::Owned(text) => Cow::Owned(regex.replace_all(&text, replacer).into_owned()),
    }
}

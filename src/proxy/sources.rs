//! Static upstream locations. Nothing in here carries behavior, the resolution logic in
//! [`crate::proxy::candidates`] and [`crate::proxy::service`] only ever reads these tables.

/// Fixed browser identity sent with every upstream request. Plenty of origins refuse to serve
/// clients that don't look like a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Search results page used when the smart proxy decides its input is a phrase rather than a
/// host. The `{}` is replaced with the percent-encoded phrase.
pub const SEARCH_TEMPLATE: &str = "https://www.google.com/search?q={}";

/// Autocomplete endpoint queried by the suggestion lookup. The firefox client returns a plain
/// JSON array of `[query, [suggestion, ...], ...]`.
pub const SUGGESTION_TEMPLATE: &str =
    "https://suggestqueries.google.com/complete/search?client=firefox&q={}";

/// Upper bound on the number of suggestions handed back to a client.
pub const MAX_SUGGESTIONS: usize = 5;

/// The game portal served whole by the portal endpoint.
pub const PORTAL_ORIGIN: &str = "https://gn-math.dev/";

/// One possible home of a named game. Both fields contain a single `{}` placeholder that is
/// replaced with the (path encoded) game name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidateTemplate {
    page: &'static str,
    asset_base: &'static str,
}

impl CandidateTemplate {
    pub const fn new(page: &'static str, asset_base: &'static str) -> Self {
        Self { page, asset_base }
    }

    /// Directory that document-relative references on the page resolve against.
    pub fn asset_base(&self, name: &str) -> String {
        self.asset_base.replace("{}", name)
    }

    pub fn page(&self, name: &str) -> String {
        self.page.replace("{}", name)
    }
}

/// Mirrors of the game collection, tried strictly in this order.
pub static GAME_CANDIDATES: &[CandidateTemplate] = &[
    CandidateTemplate::new(
        "https://gn-math.github.io/games/{}/index.html",
        "https://gn-math.github.io/games/{}/",
    ),
    CandidateTemplate::new(
        "https://cdn.jsdelivr.net/gh/gn-math/html@main/games/{}/index.html",
        "https://cdn.jsdelivr.net/gh/gn-math/html@main/games/{}/",
    ),
    CandidateTemplate::new(
        "https://raw.githack.com/gn-math/html/main/games/{}/index.html",
        "https://raw.githack.com/gn-math/html/main/games/{}/",
    ),
];

/// Game names known to exist on at least one mirror, advertised to clients as-is.
pub static KNOWN_GAMES: &[&str] = &[
    "2048",
    "slope",
    "retro-bowl",
    "cookie-clicker",
    "geometry-dash",
    "subway-surfers",
    "tunnel-rush",
    "run-3",
    "drift-hunters",
    "moto-x3m",
    "paper-io-2",
    "snake",
];

mod database;
mod fetcher;
mod router;

pub(crate) use database::test_database;
pub(crate) use fetcher::{html_result, upstream_result, ScriptedFetcher};
pub(crate) use router::{send, test_router};

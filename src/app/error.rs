use crate::database::DatabaseSetupError;
use crate::proxy::FetchError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to parse program command lines")]
    ArgumentError(#[from] pico_args::Error),

    #[error("failed to initialize the database: {0}")]
    DatabaseFailure(#[from] DatabaseSetupError),

    #[error("environment file was present but could not be loaded: {0}")]
    EnvironmentFile(dotenvy::Error),

    #[error("upstream http client could not be created: {0}")]
    HttpClientFailure(#[from] FetchError),

    #[error("environment variable {0} has an invalid value")]
    InvalidEnvironment(&'static str),

    #[error("unrecognized arguments provided: {0:?}")]
    UnknownArguments(Vec<std::ffi::OsString>),

    #[error("the {0} timeout must be at least one second")]
    ZeroTimeout(&'static str),
}

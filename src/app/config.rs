use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use pico_args::Arguments;
use tracing::Level;

use crate::app::Error;
use crate::proxy::sources::DEFAULT_USER_AGENT;
use crate::proxy::FetchConfig;

const DEFAULT_DB_URL: &str = "sqlite::memory:";

const DEFAULT_DOCUMENT_TIMEOUT_SECS: u64 = 30;

const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug)]
pub struct Config {
    listen_addr: SocketAddr,
    log_level: Level,

    db_url: String,
    cors_origins: Vec<String>,

    fetch: FetchConfig,
}

impl Config {
    /// Origins allowed to call us from a browser. An empty list allows any origin.
    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn db_url(&self) -> &str {
        &self.db_url
    }

    pub fn fetch(&self) -> &FetchConfig {
        &self.fetch
    }

    /// Loads an optional `.env` file, then reads command line arguments. Anything not provided on
    /// the command line falls back to the environment before falling back to a default.
    pub fn from_env_and_args() -> Result<Self, Error> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = ?path, "loaded environment file"),
            Err(err) if err.not_found() => (),
            Err(err) => return Err(Error::EnvironmentFile(err)),
        }

        Self::parse_cli_arguments(Arguments::from_env())
    }

    pub fn listen_addr(&self) -> &SocketAddr {
        &self.listen_addr
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    pub fn parse_cli_arguments(mut args: Arguments) -> Result<Self, Error> {
        let listen_addr = args
            .opt_value_from_str("--listen")?
            .or(env_value("LISTEN_ADDR")?)
            .unwrap_or(SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 3000));

        let log_level = args
            .opt_value_from_str("--log-level")?
            .or(env_value("LOG_LEVEL")?)
            .unwrap_or(Level::INFO);

        let db_url: String = args
            .opt_value_from_str("--db-url")?
            .or(env_value("DATABASE_URL")?)
            .unwrap_or_else(|| DEFAULT_DB_URL.to_string());

        let cors_origins: String = args
            .opt_value_from_str("--cors-origins")?
            .or(env_value("CORS_ORIGINS")?)
            .unwrap_or_else(|| "*".to_string());

        let user_agent: String = args
            .opt_value_from_str("--user-agent")?
            .or(env_value("UPSTREAM_USER_AGENT")?)
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let document_timeout: u64 = args
            .opt_value_from_str("--document-timeout")?
            .or(env_value("DOCUMENT_TIMEOUT_SECS")?)
            .unwrap_or(DEFAULT_DOCUMENT_TIMEOUT_SECS);

        let lookup_timeout: u64 = args
            .opt_value_from_str("--lookup-timeout")?
            .or(env_value("LOOKUP_TIMEOUT_SECS")?)
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS);

        if document_timeout == 0 {
            return Err(Error::ZeroTimeout("document"));
        }

        if lookup_timeout == 0 {
            return Err(Error::ZeroTimeout("lookup"));
        }

        let remaining = args.finish();
        if !remaining.is_empty() {
            return Err(Error::UnknownArguments(remaining));
        }

        let fetch = FetchConfig::new(
            user_agent,
            Duration::from_secs(document_timeout),
            Duration::from_secs(lookup_timeout),
        );

        Ok(Config {
            listen_addr,
            log_level,
            db_url,
            cors_origins: parse_origins(&cors_origins),
            fetch,
        })
    }
}

fn env_value<T: FromStr>(key: &'static str) -> Result<Option<T>, Error> {
    let raw = match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(None),
    };

    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| Error::InvalidEnvironment(key))
}

fn parse_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect();

    if origins.iter().any(|origin| origin == "*") {
        return Vec::new();
    }

    origins
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::ffi::OsString;

    fn args(list: &[&str]) -> Arguments {
        Arguments::from_vec(list.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_arguments_override_defaults() {
        let config = Config::parse_cli_arguments(args(&[
            "--listen",
            "127.0.0.1:8080",
            "--log-level",
            "debug",
            "--db-url",
            "sqlite://./data/catalog.db",
            "--cors-origins",
            "https://a.test, https://b.test",
            "--user-agent",
            "agent/1.0",
            "--document-timeout",
            "12",
            "--lookup-timeout",
            "3",
        ]))
        .unwrap();

        assert_eq!(config.listen_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level(), Level::DEBUG);
        assert_eq!(config.db_url(), "sqlite://./data/catalog.db");
        assert_eq!(config.cors_origins(), ["https://a.test", "https://b.test"]);
        assert_eq!(config.fetch().user_agent(), "agent/1.0");
        assert_eq!(config.fetch().document_timeout(), Duration::from_secs(12));
        assert_eq!(config.fetch().lookup_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_unknown_arguments_are_rejected() {
        let result = Config::parse_cli_arguments(args(&["--db-url", "sqlite::memory:", "--bogus"]));
        assert!(matches!(result, Err(Error::UnknownArguments(_))));
    }

    #[test]
    fn test_zero_timeouts_are_rejected() {
        let result = Config::parse_cli_arguments(args(&["--document-timeout", "0"]));
        assert!(matches!(result, Err(Error::ZeroTimeout("document"))));

        let result = Config::parse_cli_arguments(args(&["--lookup-timeout", "0"]));
        assert!(matches!(result, Err(Error::ZeroTimeout("lookup"))));
    }

    #[test]
    fn test_wildcard_origins_allow_everything() {
        assert!(parse_origins("*").is_empty());
        assert!(parse_origins("https://a.test,*").is_empty());
        assert_eq!(parse_origins(" https://a.test ,,"), ["https://a.test"]);
    }
}

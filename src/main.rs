use std::time::Duration;

use tokio::time::timeout;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use access_anywhere::app::Config;

const FINAL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    let config = match Config::from_env_and_args() {
        Ok(c) => c,
        Err(err) => {
            println!("failed to load config: {err}");
            std::process::exit(2);
        }
    };

    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(std::io::stdout());
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level().into())
        .from_env_lossy();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(non_blocking_writer)
        .with_filter(env_filter);

    tracing_subscriber::registry().with(stdout_layer).init();

    access_anywhere::register_panic_logger();
    access_anywhere::report_version();

    let (graceful_waiter, shutdown_rx) = match access_anywhere::graceful_shutdown_blocker() {
        Ok(pair) => pair,
        Err(err) => {
            tracing::error!("unable to install signal handlers: {err}");
            std::process::exit(2);
        }
    };

    let mut http_handle = access_anywhere::http_server(config, shutdown_rx).await;

    tokio::select! {
        _ = graceful_waiter => (),
        _ = &mut http_handle => {
            tracing::error!("http server stopped without being asked to");
            std::process::exit(1);
        }
    }

    if timeout(FINAL_SHUTDOWN_TIMEOUT, http_handle).await.is_err() {
        tracing::error!("hit final shutdown timeout. exiting with remaining work in progress");
        std::process::exit(3);
    }
}

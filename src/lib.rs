use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub mod app;
pub mod catalog;
mod database;
mod extractors;
mod health_check;
pub mod http_server;
pub mod proxy;
pub mod status;

/// Installs the SIGINT and SIGTERM handlers and returns a receiver that fires once either of them
/// has been received. Everything that needs to wind down cleanly (currently only the HTTP server)
/// holds a clone of the receiver.
///
/// SIGTERM is what an orchestrator sends when it wants us gone, SIGINT comes from someone running
/// the server locally. Both shut the server down immediately, in-flight requests are allowed to
/// complete by the server's own graceful shutdown.
pub fn graceful_shutdown_blocker() -> std::io::Result<(JoinHandle<()>, watch::Receiver<()>)> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let (tx, rx) = tokio::sync::watch::channel(());

    let handle = tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => tracing::debug!("gracefully exiting immediately on SIGINT"),
            _ = sigterm.recv() => tracing::debug!("initiating graceful shutdown on SIGTERM"),
        }

        // Time to start signaling any services that care about gracefully shutting down that the
        // time is at hand.
        let _ = tx.send(());
    });

    Ok((handle, rx))
}

pub async fn http_server(config: app::Config, shutdown_rx: watch::Receiver<()>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match http_server::run(config, shutdown_rx).await {
            Ok(_) => tracing::info!("shutting down normally"),
            Err(err) => tracing::error!("http server exited with an error: {err}"),
        }
    })
}

/// Sets up system panics to use the tracing infrastructure to log reported issues. This doesn't
/// prevent the panic from taking out the service but ensures that it and any available information
/// is properly reported using the standard logging mechanism.
pub fn register_panic_logger() {
    std::panic::set_hook(Box::new(|panic| match panic.location() {
        Some(loc) => {
            tracing::error!(
                message = %panic,
                panic.file = loc.file(),
                panic.line = loc.line(),
                panic.column = loc.column(),
            );
        }
        None => tracing::error!(message = %panic),
    }));
}

pub fn report_version() {
    let version = app::Version::new();
    tracing::info!(
        build_profile = version.build_profile,
        name = version.name,
        version = version.version,
        "service starting up"
    );
}

#[cfg(test)]
mod tests;

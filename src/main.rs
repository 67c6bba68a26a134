use std::future::IntoFuture;
use std::net::SocketAddr;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use visitor_session::api::axum::{AppState, app};
use visitor_session::logging::init_logging;
use visitor_session::session::join_sweeper;
use visitor_session::{AppConfig, InMemorySessionStore, SessionNegotiator, SessionSweeper};

/// Session-aware HTTP front end.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Interface to bind (overrides SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env()?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    tracing::info!(environment = %config.environment, "configuration loaded");

    let store = InMemorySessionStore::new();
    let shutdown = CancellationToken::new();

    let sweeper = SessionSweeper::new(
        store.clone(),
        config.session.max_age,
        config.session.cleanup_interval,
    )
    .spawn(shutdown.clone());
    if sweeper.is_none() {
        tracing::info!("session sweeper disabled");
    }

    let state = AppState::new(SessionNegotiator::new(store, config.session.clone()));
    let router = app(state, &config.server);

    let listener = TcpListener::bind(config.server_addr()).await?;
    tracing::info!(address = %listener.local_addr()?, "starting server");

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown.clone().cancelled_owned());
    let mut server = tokio::spawn(server.into_future());

    let shutdown_timeout = config.server.shutdown_timeout.to_std().unwrap_or_default();

    tokio::select! {
        result = &mut server => {
            shutdown.cancel();
            result??;
        }
        () = shutdown_signal() => {
            tracing::info!("shutting down server");
            shutdown.cancel();

            match tokio::time::timeout(shutdown_timeout, &mut server).await {
                Ok(result) => result??,
                Err(_) => {
                    tracing::error!("server forced to shutdown");
                    server.abort();
                    return Err("graceful shutdown timed out".into());
                }
            }
        }
    }

    if let Some(sweeper) = sweeper {
        // already logged
        let _ = join_sweeper(sweeper).await;
    }

    tracing::info!("server exited");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

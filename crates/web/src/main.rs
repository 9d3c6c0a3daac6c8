mod handlers;
mod payload;

use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use argp::FromArgs;
use axum::{Router, extract::FromRef};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use worktree_relay_core::{
    config::{Config, ServerConfig},
    logging,
};
use worktree_relay_trigger::{Dispatcher, templates};

use crate::handlers::build_router;

const CONFIG_PATH: &str = "config.yml";

#[derive(Clone, FromRef)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
}

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Receive workflow stage webhooks and trigger the next stage.
struct Args {
    #[argp(positional)]
    /// port to listen on (default: 8080)
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argp::parse_args_or_exit(argp::DEFAULT);
    let mut config = Config::load(CONFIG_PATH)?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    logging::init(&config.log);

    let scripts_dir = config.trigger.resolve_scripts_dir();
    if config.trigger.write_scripts {
        templates::install(&scripts_dir).context("Failed to create workflow scripts")?;
    }
    let dispatcher = Dispatcher::from_config(&config.trigger, scripts_dir);
    tracing::debug!("Trigger chain: {}", dispatcher.strategy_names().join(" -> "));

    let router = app(AppState { dispatcher: Arc::new(dispatcher) });

    let addr = SocketAddr::new(config.server.host, config.server.port);
    let listener =
        TcpListener::bind(addr).await.with_context(|| format!("Failed to bind {addr}"))?;
    print_endpoints(&config);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;
    tracing::info!("Server stopped");
    Ok(())
}

fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new().layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
    );
    build_router().with_state(state).layer(middleware)
}

fn base_url(server: &ServerConfig) -> String {
    if server.host.is_loopback() {
        format!("http://localhost:{}", server.port)
    } else {
        format!("http://{}", SocketAddr::new(server.host, server.port))
    }
}

fn print_endpoints(config: &Config) {
    let base = base_url(&config.server);
    tracing::info!("Webhook server started on port {}", config.server.port);
    tracing::info!("Health check: {base}/health");
    tracing::info!("Webhook endpoints:");
    for path in handlers::WEBHOOK_PATHS {
        tracing::info!("   POST {base}{path}");
    }
    tracing::info!("Logs: {}", config.log.path.display());
    tracing::info!("Press Ctrl+C to stop the server");
}

async fn shutdown_signal() {
    match shutdown_signal_io().await {
        Ok(()) => tracing::info!("Shutting down webhook server..."),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

async fn shutdown_signal_io() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        signal::ctrl_c().await
    }
}

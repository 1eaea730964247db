//! parley gateway entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, resolves configuration, initializes the selected
//! backend, then serves the HTTP gateway until Ctrl+C or SIGTERM.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use parley_api::cli::{Cli, Commands, ServeArgs};
use parley_api::http::router::build_router;
use parley_api::state::AppState;
use parley_infra::backend::create_backend;
use parley_infra::config::load_gateway_config;
use parley_observe::tracing_setup::{
    directive_for_verbosity, init_tracing, shutdown_tracing, TracingOptions,
};
use parley_types::config::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need logging or a backend
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(&TracingOptions {
        default_directive: directive_for_verbosity(cli.verbose, cli.quiet).to_string(),
        json: cli.log_json,
        otel: cli.otel,
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = resolve_config(args).await;

    let backend = create_backend(&config)
        .await
        .with_context(|| format!("failed to initialize {} backend", config.backend))?;
    let state = AppState::new(backend);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, backend = %config.backend, "server is running");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Defaults, then the config file (if any), then CLI flags and env vars.
async fn resolve_config(mut args: ServeArgs) -> GatewayConfig {
    let file_config = match args.config.take() {
        Some(path) => load_gateway_config(&path).await,
        None => {
            let default_path = PathBuf::from("parley.toml");
            load_gateway_config(&default_path).await
        }
    };
    args.apply(file_config)
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {e}");
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
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

//! AHKFlow backend server.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use ahkflow::{config::Config, create_app_with_config, logging, state::AppState, tls, version};

/// AHKFlow - web API backend
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on (overrides config files)
    #[arg(short, long, env = "AHKFLOW_PORT")]
    port: Option<u16>,

    /// TLS certificate (PEM); enables HTTPS together with --tls-key
    #[arg(long, env = "AHKFLOW_TLS_CERT")]
    tls_cert: Option<PathBuf>,

    /// TLS private key (PEM)
    #[arg(long, env = "AHKFLOW_TLS_KEY")]
    tls_key: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_figment(args.port, args.tls_cert, args.tls_key)?;

    // Keep the guard alive until exit so file logs are flushed
    let _log_guard = logging::init(config.log_level.as_deref(), config.log_file.as_deref())?;

    info!(
        "Starting AHKFlow backend version {}",
        version::informational_version()
    );
    if !version::has_embedded_version() {
        info!("No version metadata embedded in this build");
    }

    run(config)
}

#[tokio::main]
async fn run(config: Config) -> anyhow::Result<()> {
    let state = AppState::default();
    let app = create_app_with_config(state, &config.cors_allowed_origins);

    let addr = config.socket_addr();

    match config.tls {
        Some(ref tls_paths) => {
            let rustls_config = tls::load_rustls_config(tls_paths).await?;
            tls::spawn_cert_watcher(tls_paths, rustls_config.clone())?;

            let handle = axum_server::Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(Some(Duration::from_secs(10)));
            });

            info!("Server listening on https://{}", addr);
            axum_server::bind_rustls(addr, rustls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            info!("Server listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }
    }

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully...");
}

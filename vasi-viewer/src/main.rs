//! vasi-viewer - Virtual appliance sizing information viewer
//!
//! Loads the per-platform sizing workbooks and note files in the background
//! and serves a tabbed, filterable view of them over HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vasi_common::config::{self, CliOverrides, ResourceSource, ViewerConfig};
use vasi_common::fetch::{FileFetcher, HttpFetcher, ResourceFetcher};
use vasi_common::workbook::CalamineParser;
use vasi_common::{PlatformStore, ResourceCatalog, ResourceLoader};
use vasi_viewer::{build_router, AppState};

/// Command-line arguments for vasi-viewer
#[derive(Parser, Debug)]
#[command(name = "vasi-viewer")]
#[command(about = "Virtual appliance sizing information viewer")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Prefix prepended to every resource locator (e.g. /sizing)
    #[arg(short, long)]
    base_path: Option<String>,

    /// HTTP origin or local folder holding data/ and the notes files
    #[arg(short, long)]
    source: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    request_timeout_secs: Option<u64>,

    /// Config file (defaults to <config dir>/vasi/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn into_overrides(self) -> CliOverrides {
        CliOverrides {
            base_path: self.base_path,
            source: self.source,
            request_timeout_secs: self.request_timeout_secs,
            port: self.port,
            config_file: self.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let overrides = Args::parse().into_overrides();

    // Config file is read before tracing init so its log level applies
    let toml = config::load_toml_config(overrides.config_file.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                let level = &toml.config.logging.level;
                format!("vasi_viewer={level},vasi_common={level},tower_http=info").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting VASI viewer (vasi-viewer) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Some(warning) = &toml.warning {
        warn!("{}", warning);
    }
    if let Some(path) = &toml.path {
        info!("Config file: {}", path.display());
    }

    let config = ViewerConfig::resolve(&overrides, &toml.config)
        .context("Failed to resolve configuration")?;

    let fetcher: Arc<dyn ResourceFetcher> = match &config.source {
        ResourceSource::Http(origin) => {
            info!("Resource origin: {}", origin);
            Arc::new(
                HttpFetcher::new(origin, config.request_timeout)
                    .context("Failed to create HTTP client")?,
            )
        }
        ResourceSource::Directory(root) => {
            info!("Resource folder: {}", root.display());
            if !root.is_dir() {
                warn!(
                    "Resource folder {} does not exist; every resource will report missing",
                    root.display()
                );
            }
            Arc::new(FileFetcher::new(root.clone(), &config.base_path))
        }
    };
    info!("Base path: '{}'", config.base_path);

    let loader = Arc::new(ResourceLoader::new(
        ResourceCatalog::new(&config.base_path),
        fetcher,
        Arc::new(CalamineParser),
        Arc::new(PlatformStore::new()),
    ));

    // Serve immediately; handlers show whatever has settled so far
    let background = Arc::clone(&loader);
    tokio::spawn(async move {
        background.load_everything().await;
    });

    let app = build_router(AppState::new(loader));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("vasi-viewer listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

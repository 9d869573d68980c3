//! filesvc server
//!
//! Serves file metadata and content over REST and gRPC from one
//! in-process metadata store.

use anyhow::Result;
use clap::Parser;
use filesvc_server::config::Config;
use filesvc_server::{build_file_service, serve_grpc, serve_rest};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filesvc-server")]
#[command(about = "filesvc REST and gRPC file server")]
#[command(version)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "/etc/filesvc/server.toml")]
    config: PathBuf,

    /// Listen address for REST (overrides config)
    #[arg(long)]
    rest_listen: Option<String>,

    /// Listen address for gRPC (overrides config)
    #[arg(long)]
    grpc_listen: Option<String>,

    /// Bytes per gRPC read reply (overrides config)
    #[arg(long)]
    chunk_size: Option<usize>,

    /// gRPC requests served at once across all connections (overrides config)
    #[arg(long)]
    max_concurrent_requests: Option<usize>,

    /// Base directory for relative file paths (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (overrides config)
    #[arg(long)]
    log_level: Option<String>,
}

async fn wait_for(mut rx: watch::Receiver<bool>) {
    // A dropped sender also means shut down
    let _ = rx.wait_for(|stop| *stop).await;
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    if let Some(listen) = args.rest_listen {
        config.server.rest_listen = listen;
    }
    if let Some(listen) = args.grpc_listen {
        config.server.grpc_listen = listen;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.server.chunk_size = chunk_size;
    }
    if let Some(limit) = args.max_concurrent_requests {
        config.server.max_concurrent_requests = limit;
    }
    if let Some(dir) = args.data_dir {
        config.server.data_dir = dir;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting filesvc server");
    if !args.config.exists() {
        info!("No config file at {}, using defaults", args.config.display());
    }

    let server = config.server;
    let files = Arc::new(build_file_service(config.files, &server.data_dir));

    let rest_listener = TcpListener::bind(&server.rest_listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind REST on {}: {}", server.rest_listen, e))?;
    let grpc_listener = TcpListener::bind(&server.grpc_listen)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind gRPC on {}: {}", server.grpc_listen, e))?;
    info!("REST listening on {}", rest_listener.local_addr()?);
    info!(
        "gRPC listening on {} (chunk size {}, {} concurrent requests)",
        grpc_listener.local_addr()?,
        server.chunk_size,
        server.max_concurrent_requests
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Shutting down...");
        let _ = shutdown_tx.send(true);
    });

    tokio::try_join!(
        async {
            serve_rest(rest_listener, files.clone(), wait_for(shutdown_rx.clone()))
                .await
                .map_err(anyhow::Error::from)
        },
        async {
            serve_grpc(grpc_listener, files.clone(), &server, wait_for(shutdown_rx.clone()))
                .await
                .map_err(anyhow::Error::from)
        },
    )?;

    info!("filesvc server shut down gracefully");

    Ok(())
}

//! filesvc CLI
//!
//! Stat or download a file from a filesvc server over REST or gRPC.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use filesvc_client::FileClient;
use filesvc_common::{ClientConfig, FileContent, FileMetadata};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "filesvc-cli")]
#[command(about = "filesvc command line client")]
#[command(version)]
struct Args {
    /// Transport to use (rest or grpc)
    #[arg(long, env = "BACKEND", default_value = "rest")]
    backend: String,

    /// REST server base URL
    #[arg(long, env = "REST_URL", default_value = "http://localhost:5000")]
    base_url: String,

    /// gRPC server address (host:port)
    #[arg(long, env = "GRPC_SERVER", default_value = "localhost:50051")]
    grpc_server: String,

    /// Where `read` writes the content; `-` for standard output
    #[arg(short, long, default_value = "-")]
    output: String,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print file metadata
    Stat {
        /// File identifier
        uuid: String,
    },
    /// Download file content
    Read {
        /// File identifier
        uuid: String,
    },
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            backend: self.backend.clone(),
            base_url: self.base_url.clone(),
            grpc_server: self.grpc_server.clone(),
            timeout: (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs)),
        }
    }
}

fn print_metadata(metadata: &FileMetadata) {
    println!("Name: {}", metadata.name);
    println!("Size: {} bytes", metadata.size);
    println!("Created: {}", metadata.create_datetime);
    println!("MIME Type: {}", metadata.mimetype);
}

fn write_content(output: &str, content: &FileContent) -> Result<()> {
    if output == "-" {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&content.data)?;
        stdout.flush()?;
    } else {
        let path = PathBuf::from(output);
        std::fs::write(&path, &content.data)
            .with_context(|| format!("failed to write {}", path.display()))?;
        eprintln!(
            "Wrote {} bytes of {} to {}",
            content.data.len(),
            content.name,
            path.display()
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Logs go to stderr so `read` output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let client = FileClient::new(&args.client_config())?;
    debug!("Using {} backend", client.backend_kind());

    match &args.command {
        Commands::Stat { uuid } => {
            let metadata = client.stat(uuid).await?;
            print_metadata(&metadata);
        }
        Commands::Read { uuid } => {
            let content = client.read(uuid).await?;
            write_content(&args.output, &content)?;
        }
    }

    Ok(())
}

//! engram-server: hosts the loopback memory search service.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use engram::MemoryEngine;
use engram_core::config::EngramConfig;

#[derive(Parser, Debug)]
#[command(name = "engram-server", about = "Persistent memory service for a coding assistant")]
struct Args {
    /// Path to a TOML config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the service port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the data directory holding memory.db.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngramConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngramConfig::default(),
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data_dir) = args.data_dir {
        config.paths.data_dir = data_dir;
    }

    let pid_file = write_pid_file(&config)?;
    let port = config.server.port;
    let engine = Arc::new(MemoryEngine::open(config).context("opening memory engine")?);

    let listener = TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("binding 127.0.0.1:{port}"))?;

    let result = engram::serve(engine, listener).await;

    let _ = std::fs::remove_file(pid_file);
    info!("memory service stopped");
    result.context("serving")
}

/// Drop a pid file in the scratch directory so operators can find the
/// running instance.
fn write_pid_file(config: &EngramConfig) -> anyhow::Result<PathBuf> {
    let dir = &config.paths.scratch_dir;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating scratch dir {}", dir.display()))?;
    let path = dir.join("engram-server.pid");
    std::fs::write(&path, std::process::id().to_string())
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

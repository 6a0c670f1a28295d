//! Diligent Web Server
//!
//! Backend for the Diligent configuration UI and IDE plugin.

use anyhow::Context;
use clap::Parser;
use diligent_web::server::DiligentServerBuilder;
use diligent_web::{init_logging, WebConfig};
use tracing::{info, warn};

/// Diligent Web Server - directory login and check configurations
#[derive(Parser)]
#[command(name = "diligent-web")]
#[command(about = "HTTP backend for Diligent")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Built frontend to serve next to the API
    #[arg(long)]
    static_dir: Option<String>,

    /// Backend configuration file (TOML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    // Environment first, command line on top
    let mut config = WebConfig::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.dev_mode |= args.dev;
    if args.static_dir.is_some() {
        config.static_dir = args.static_dir;
    }
    if args.config.is_some() {
        config.config_path = args.config;
    }

    let settings = config.load_settings();
    match &settings {
        Ok(settings) => {
            if let Err(e) = diligent_core::init_logging(&settings.logging) {
                init_logging();
                warn!("Invalid logging configuration, using defaults: {}", e);
            }
        }
        Err(_) => init_logging(),
    }
    let settings = settings.context("Failed to load backend configuration")?;

    info!(
        "Directory: {:?} at {}",
        settings.directory.backend, settings.directory.url
    );
    info!("Database: {}", settings.storage.database_url);
    if let Some(static_dir) = &config.static_dir {
        info!("Static files: {}", static_dir);
    }

    let mut builder = DiligentServerBuilder::new()
        .host(config.host.clone())
        .port(config.port)
        .dev_mode(config.dev_mode)
        .settings(settings);
    if let Some(static_dir) = config.static_dir.clone() {
        builder = builder.static_dir(static_dir);
    }

    let server = builder.build().await.context("Failed to build server")?;
    server.start().await.context("Server failed")?;

    Ok(())
}

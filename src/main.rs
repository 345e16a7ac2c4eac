//! Cloud-Init NoCloud metadata server.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────────┐
//!                        │                  NOCLOUD SERVER                   │
//!                        │                                                   │
//!   GET /<path>/meta-data│  ┌─────────┐    ┌──────────────┐   ┌───────────┐  │
//!   ─────────────────────┼─▶│  http   │───▶│   routing    │──▶│  render   │  │
//!                        │  │ server  │    │ first match  │   │ metadata  │  │
//!                        │  └─────────┘    └──────┬───────┘   │ user-data │  │
//!                        │                        │           └───────────┘  │
//!                        │                        ▼                          │
//!                        │               ┌──────────────────┐                │
//!                        │               │  config store    │◀── watcher     │
//!                        │               │ ArcSwap<Snapshot>│◀── SIGHUP      │
//!                        │               └──────────────────┘                │
//!                        └───────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use nocloud_server::config::load_config;
use nocloud_server::lifecycle::startup::{self, Settings};
use nocloud_server::observability::logging::{self, LogFormat, DEFAULT_FILTER};

#[derive(Parser)]
#[command(name = "nocloud-server")]
#[command(about = "Serve Cloud-Init NoCloud meta-data and user-data over HTTP", long_about = None)]
struct Cli {
    /// Path to the config file.
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Log filter, used when RUST_LOG is unset.
    #[arg(long, default_value = DEFAULT_FILTER)]
    log_level: String,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    /// Validate the config file and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    if cli.check {
        return Ok(check(&cli.config));
    }

    tracing::info!("nocloud-server v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(Settings {
        config_path: cli.config,
        metrics_address: cli.metrics_address,
    })
    .await?;

    tracing::info!("Shutdown complete");
    Ok(ExitCode::SUCCESS)
}

fn check(path: &Path) -> ExitCode {
    match load_config(path) {
        Ok(snapshot) => {
            println!(
                "{}: ok, listening on {}:{}",
                path.display(),
                snapshot.listen_address(),
                snapshot.listen_port()
            );
            for rule in snapshot.rules() {
                let patterns: Vec<_> = rule.patterns().collect();
                println!(
                    "  {} [{}] template={}",
                    rule.name(),
                    patterns.join(", "),
                    rule.template().unwrap_or("-")
                );
                if let Some(template) = rule.missing_template() {
                    println!("    warning: template {template:?} not found, user-data will be empty");
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

mod calc;
mod config;
mod hub;
mod ipc;
mod logging;
mod model;
mod seed;
mod store;

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::HubConfig;
use crate::hub::Hub;
use crate::seed::SeedSnapshot;
use crate::store::Latency;

/// ClassHub sidecar: one JSON request per stdin line, one response per
/// stdout line.
#[derive(Debug, Parser)]
#[command(name = "classhubd", version)]
struct Args {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory with seed snapshots; overrides `seed_dir` from the config.
    #[arg(long)]
    seed_dir: Option<PathBuf>,
    /// Answer immediately instead of simulating request latency.
    #[arg(long)]
    no_latency: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => HubConfig::load(path)?,
        None => HubConfig::default(),
    };
    logging::init(config.log_level.as_deref());

    let seed_dir = args.seed_dir.as_deref().or(config.seed_dir.as_deref());
    let seed = SeedSnapshot::load(seed_dir)?;
    let latency = if args.no_latency {
        Latency::none()
    } else {
        Latency::from(&config.latency)
    };
    let state = ipc::AppState {
        hub: Hub::new(seed, latency),
    };
    info!(
        seed_dir = ?seed_dir,
        latency = !args.no_latency,
        "classhubd ready"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(v)) => v,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let resp = match serde_json::from_str::<ipc::Request>(&line) {
            Ok(req) => {
                debug!(id = %req.id, method = %req.method, "request");
                ipc::handle_request(&state, req).await
            }
            // Can't reply with an id; the client matches on order.
            Err(e) => ipc::error::bad_json(&e),
        };

        let mut out = serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string());
        out.push('\n');
        let _ = stdout.write_all(out.as_bytes()).await;
        let _ = stdout.flush().await;
    }

    info!("stdin closed, exiting");
    Ok(())
}

//! grantflow scripted client
//!
//! Replays a scenario file against a running grantflow server and prints one
//! result line per step.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use grantflow_client::{HttpApi, Runner, parse_scenario};
use grantflow_core::tracing_init::init_tracing;

#[derive(Parser, Debug)]
#[command(name = "grantflow")]
#[command(version, about = "grantflow scripted client")]
struct Args {
    /// Scenario file to replay.
    scenario: PathBuf,

    /// Server base URL.
    #[arg(long, default_value = "http://127.0.0.1:8080", env = "GRANTFLOW_SERVER")]
    server: String,

    /// Log level for the client's own diagnostics.
    #[arg(long, default_value = "warn", env = "GRANTFLOW_LOG_LEVEL")]
    log_level: String,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&["grantflow_client"], &args.log_level, args.log_json);

    let text = std::fs::read_to_string(&args.scenario)?;
    let steps = parse_scenario(&text)?;
    info!(steps = steps.len(), server = %args.server, "Replaying scenario");

    let mut runner = Runner::new(HttpApi::new(&args.server)?);
    let mut out = std::io::stdout().lock();
    runner.run_all(&steps, &mut out).await?;
    Ok(())
}

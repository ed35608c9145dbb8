//! grantflow server
//!
//! Authorization server and resource server over JSON/HTTP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use grantflow_core::config::load_config;
use grantflow_core::tracing_init::init_tracing;
use grantflow_server::bootstrap::build_engine;
use grantflow_server::routes::{AppState, build_router};

#[derive(Parser, Debug)]
#[command(name = "grantflow-server")]
#[command(version, about = "grantflow authorization and resource server")]
struct Args {
    /// Users file: a count line followed by one user id per line.
    users_file: Option<PathBuf>,

    /// Resources file: one resource name per line.
    resources_file: Option<PathBuf>,

    /// Approvals file: one recorded end-user decision per line.
    approvals_file: Option<PathBuf>,

    /// Delegated actions an access token authorizes.
    token_ttl: Option<u32>,

    /// Explicit config file (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Write the line-oriented audit log to this file.
    #[arg(long)]
    audit_file: Option<PathBuf>,

    /// Refuse approvals that would create more sessions than this.
    #[arg(long)]
    max_sessions: Option<usize>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(path) = args.users_file {
        config.data.users_file = Some(path);
    }
    if let Some(path) = args.resources_file {
        config.data.resources_file = Some(path);
    }
    if let Some(path) = args.approvals_file {
        config.data.approvals_file = Some(path);
    }
    if let Some(ttl) = args.token_ttl {
        config.tokens.lifetime = ttl;
    }
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    if args.audit_file.is_some() {
        config.data.audit_file = args.audit_file;
    }
    if args.max_sessions.is_some() {
        config.sessions.max_sessions = args.max_sessions;
    }
    config.server.log_json |= args.log_json;

    init_tracing(
        &["grantflow_server", "grantflow_core"],
        &config.server.log_level,
        config.server.log_json,
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        token_lifetime = config.tokens.lifetime,
        "Starting grantflow-server"
    );

    let engine = Arc::new(build_engine(&config)?);
    let app = build_router(AppState { engine });

    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Listening");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Server stopped");
    Ok(())
}

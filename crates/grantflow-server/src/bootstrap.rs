//! Engine construction from resolved configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use tracing::info;

use grantflow_core::audit::{AuditSink, FanoutAudit, FileAudit, TracingAudit};
use grantflow_core::{
    ApprovalQueue, AuthorizationEngine, Config, DigestTokenGenerator, EngineDeps,
    FileApprovalSource, StaticDirectory,
};

/// Load the data files named in `config` and build the engine.
///
/// Every data file must be present. The users and resources files are read
/// here; the approvals file is only checked for existence and read on the
/// first approval.
pub fn build_engine(config: &Config) -> anyhow::Result<AuthorizationEngine> {
    let users_path = required(config.data.users_file.as_ref(), "users")?;
    let resources_path = required(config.data.resources_file.as_ref(), "resources")?;
    let approvals_path = required(config.data.approvals_file.as_ref(), "approvals")?;

    let users = StaticDirectory::load_users(users_path)?;
    let resources = StaticDirectory::load_resources(resources_path)?;
    info!(
        users = users.len(),
        resources = resources.len(),
        approvals = %approvals_path.display(),
        "Loaded data files"
    );

    let deps = EngineDeps {
        users: Arc::new(users),
        resources: Arc::new(resources),
        approvals: ApprovalQueue::new(Arc::new(FileApprovalSource::new(approvals_path))),
        tokens: Arc::new(DigestTokenGenerator::new(config.tokens.salt.clone())),
    };
    let engine = AuthorizationEngine::new(deps, config.engine_settings());

    let audit: Arc<dyn AuditSink> = match &config.data.audit_file {
        Some(path) => {
            let file = FileAudit::create(path)
                .with_context(|| format!("Failed to create audit file {}", path.display()))?;
            info!(path = %path.display(), "Writing audit log");
            Arc::new(
                FanoutAudit::new()
                    .with(Arc::new(TracingAudit))
                    .with(Arc::new(file)),
            )
        }
        None => Arc::new(TracingAudit),
    };

    Ok(engine.with_audit(audit))
}

fn required<'a>(path: Option<&'a PathBuf>, what: &str) -> anyhow::Result<&'a Path> {
    let Some(path) = path else {
        bail!("No {what} file configured");
    };
    if !path.is_file() {
        bail!("{} file not found: {}", capitalize(what), path.display());
    }
    Ok(path)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|c| c.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

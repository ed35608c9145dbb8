//! Configuration resolution for grantflow.
//!
//! Implements hierarchical config resolution:
//! 1. Built-in defaults
//! 2. Global config (~/.config/grantflow/config.json)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables
//! 5. CLI arguments (highest priority, applied by the binaries)

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::engine::EngineSettings;
use crate::error::{Error, Result};

/// Width of the user ids accepted by the authorization server.
pub const DEFAULT_USER_ID_LENGTH: usize = 15;

/// Complete grantflow configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tokens: TokenConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub data: DataConfig,
}

/// Listener and logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

/// Token issuance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Delegated actions an access token authorizes before it expires.
    pub lifetime: u32,
    /// Exact length a user id must have.
    pub user_id_length: usize,
    /// Salt mixed into every derived token.
    pub salt: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            lifetime: 5,
            user_id_length: DEFAULT_USER_ID_LENGTH,
            salt: "grantflow".to_string(),
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Upper bound on stored sessions. `None` means unbounded.
    #[serde(default)]
    pub max_sessions: Option<usize>,
}

/// Data files the server loads at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    #[serde(default)]
    pub users_file: Option<PathBuf>,
    #[serde(default)]
    pub resources_file: Option<PathBuf>,
    #[serde(default)]
    pub approvals_file: Option<PathBuf>,
    /// Where the line-oriented audit log is written, if anywhere.
    #[serde(default)]
    pub audit_file: Option<PathBuf>,
}

impl Config {
    /// Settings the authorization engine needs out of this config.
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            token_lifetime: self.tokens.lifetime,
            user_id_length: self.tokens.user_id_length,
            max_sessions: self.sessions.max_sessions,
        }
    }
}

/// Load configuration with hierarchical resolution.
///
/// A missing global config is ignored; a missing explicit config is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global_path) = global_config_path() {
        if global_path.exists() {
            let global = load_config_file(&global_path)?;
            merge_config(&mut config, global);
        }
    }

    if let Some(path) = explicit {
        let file = load_config_file(path)?;
        merge_config(&mut config, file);
    }

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Get the global config file path.
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("grantflow").join("config.json"))
}

fn load_config_file(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    serde_json::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

fn merge_config(base: &mut Config, overlay: Config) {
    base.server = overlay.server;
    base.tokens = overlay.tokens;

    if overlay.sessions.max_sessions.is_some() {
        base.sessions.max_sessions = overlay.sessions.max_sessions;
    }

    let data = overlay.data;
    if data.users_file.is_some() {
        base.data.users_file = data.users_file;
    }
    if data.resources_file.is_some() {
        base.data.resources_file = data.resources_file;
    }
    if data.approvals_file.is_some() {
        base.data.approvals_file = data.approvals_file;
    }
    if data.audit_file.is_some() {
        base.data.audit_file = data.audit_file;
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(val) = std::env::var("GRANTFLOW_ADDR") {
        if let Ok(addr) = val.parse() {
            config.server.addr = addr;
        }
    }
    if let Ok(val) = std::env::var("GRANTFLOW_LOG_LEVEL") {
        config.server.log_level = val;
    }
    if let Ok(val) = std::env::var("GRANTFLOW_TOKEN_LIFETIME") {
        if let Ok(n) = val.parse() {
            config.tokens.lifetime = n;
        }
    }
    if let Ok(val) = std::env::var("GRANTFLOW_MAX_SESSIONS") {
        if let Ok(n) = val.parse() {
            config.sessions.max_sessions = Some(n);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_accepts_fifteen_char_user_ids() {
        let config = Config::default();
        assert_eq!(config.tokens.user_id_length, 15);
        assert_eq!(config.sessions.max_sessions, None);
    }

    #[test]
    fn engine_settings_follow_config() {
        let mut config = Config::default();
        config.tokens.lifetime = 2;
        config.sessions.max_sessions = Some(100);

        let settings = config.engine_settings();
        assert_eq!(settings.token_lifetime, 2);
        assert_eq!(settings.max_sessions, Some(100));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"tokens":{"lifetime":3,"user_id_length":15,"salt":"s"}}"#)
            .unwrap();

        let config = load_config_file(&path).unwrap();
        assert_eq!(config.tokens.lifetime, 3);
        assert_eq!(config.server.addr.port(), 8080);
    }

    #[test]
    fn merge_keeps_base_data_files_when_overlay_is_silent() {
        let mut base = Config::default();
        base.data.users_file = Some(PathBuf::from("users.db"));

        merge_config(&mut base, Config::default());
        assert_eq!(base.data.users_file, Some(PathBuf::from("users.db")));
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/grantflow.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}

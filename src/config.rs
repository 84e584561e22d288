//! Configuration loading.
//!
//! Herald reads a human-owned `~/.herald/config.toml`. Every section has
//! defaults, so a missing file is not an error. Selected values can be
//! overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `HERALD_SEND_INTERVAL_MS` | `dispatch.send_interval_ms` |
//! | `HERALD_EXPORT_DIR` | `export.dir` |
//! | `HERALD_ALLOWED_USERS` | `telegram.allowed_users` (comma-separated) |
//!
//! Precedence: env vars > config file > defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot and access settings.
    pub telegram: TelegramConfig,
    /// Dispatch pacing.
    pub dispatch: DispatchConfig,
    /// Delivery log export.
    pub export: ExportConfig,
}

/// Telegram-specific configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Credential key holding the bot token.
    pub bot_token_env: String,
    /// Telegram user ids allowed to operate the bot. Empty allows everyone.
    pub allowed_users: Vec<i64>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token_env: "BOT_TOKEN".to_owned(),
            allowed_users: Vec::new(),
        }
    }
}

/// Dispatch pacing configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Pause between two sends of the same run, in milliseconds.
    pub send_interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            send_interval_ms: 400,
        }
    }
}

impl DispatchConfig {
    /// Send interval as a [`Duration`].
    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }
}

/// Export configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory for export files. Defaults to `~/.herald/exports`.
    pub dir: Option<PathBuf>,
}

impl Config {
    /// Apply environment overrides through a resolver function.
    ///
    /// Invalid values are logged and ignored.
    pub fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("HERALD_SEND_INTERVAL_MS") {
            match v.trim().parse() {
                Ok(ms) => self.dispatch.send_interval_ms = ms,
                Err(_) => warn!(
                    var = "HERALD_SEND_INTERVAL_MS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }

        if let Some(v) = env("HERALD_EXPORT_DIR") {
            if !v.trim().is_empty() {
                self.export.dir = Some(PathBuf::from(v));
            }
        }

        if let Some(v) = env("HERALD_ALLOWED_USERS") {
            let parsed: Result<Vec<i64>, _> = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse)
                .collect();
            match parsed {
                Ok(users) => self.telegram.allowed_users = users,
                Err(_) => warn!(
                    var = "HERALD_ALLOWED_USERS",
                    value = %v,
                    "ignoring invalid env override"
                ),
            }
        }
    }

    /// Resolve the export directory against runtime paths.
    pub fn export_dir(&self, paths: &RuntimePaths) -> PathBuf {
        self.export
            .dir
            .clone()
            .unwrap_or_else(|| paths.exports_dir.clone())
    }

    /// Whether `user_id` may operate the bot.
    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.telegram.allowed_users.is_empty() || self.telegram.allowed_users.contains(&user_id)
    }
}

/// Parse a config from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed.
pub fn parse_config(toml_str: &str) -> anyhow::Result<Config> {
    toml::from_str(toml_str).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
}

/// Load config from a TOML file. A missing file yields defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            info!(path = %path.display(), "loading config from file");
            toml::from_str(&contents)
                .map_err(|e| anyhow::anyhow!("failed to parse config at {}: {e}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

/// Load `~/.herald/config.toml` and apply process env overrides.
///
/// # Errors
///
/// Returns an error if paths cannot be resolved or the file is invalid.
pub fn load_default_config() -> anyhow::Result<Config> {
    let paths = runtime_paths()?;
    let mut config = load_config(&paths.config_toml)?;
    config.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(config)
}

/// Resolve the default config directory (`~/.herald/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".herald"))
}

/// Filesystem locations used at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    /// `~/.herald`
    pub root: PathBuf,
    /// `~/.herald/config.toml`
    pub config_toml: PathBuf,
    /// `~/.herald/.env`
    pub env_file: PathBuf,
    /// `~/.herald/logs`
    pub logs_dir: PathBuf,
    /// `~/.herald/exports`
    pub exports_dir: PathBuf,
}

impl RuntimePaths {
    /// Lay out runtime paths under `root`.
    pub fn under(root: PathBuf) -> Self {
        Self {
            config_toml: root.join("config.toml"),
            env_file: root.join(".env"),
            logs_dir: root.join("logs"),
            exports_dir: root.join("exports"),
            root,
        }
    }
}

/// Resolve runtime paths under `~/.herald/`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn runtime_paths() -> anyhow::Result<RuntimePaths> {
    Ok(RuntimePaths::under(config_dir()?))
}

//! Bot token lookup: `.env` file first, process environment second.
//!
//! The file must be readable by its owner only; a group- or world-readable
//! token file is refused rather than silently used.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::config::runtime_paths;

/// Secrets read from a `.env` file.
#[derive(Clone, Default)]
pub struct Credentials {
    entries: BTreeMap<String, String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        f.debug_struct("Credentials")
            .field("keys", &keys)
            .field("values", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Wrap already-parsed entries.
    pub fn from_map(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }

    /// Value from the file only.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value from the file, else from `env`. Blank values count as missing.
    pub fn resolve_with(&self, key: &str, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.get(key)
            .map(str::to_owned)
            .or_else(|| env(key))
            .filter(|v| !v.trim().is_empty())
    }

    /// Value from the file, else from the process environment.
    ///
    /// # Errors
    ///
    /// Fails when the key is missing or blank in both places.
    pub fn require(&self, key: &str) -> anyhow::Result<String> {
        self.resolve_with(key, |k| std::env::var(k).ok())
            .with_context(|| format!("{key} is not set in .env or the environment"))
    }
}

/// Read a `.env` file.
///
/// # Errors
///
/// Fails when the file is missing, readable by group or others, or
/// contains a line dotenvy cannot parse.
pub fn load_credentials(path: &Path) -> anyhow::Result<Credentials> {
    ensure_owner_only(path)?;

    let entries = dotenvy::from_path_iter(path)
        .with_context(|| format!("cannot open {}", path.display()))?
        .collect::<Result<BTreeMap<_, _>, _>>()
        .with_context(|| format!("malformed entry in {}", path.display()))?;

    debug!(path = %path.display(), keys = entries.len(), "credentials loaded");
    Ok(Credentials::from_map(entries))
}

/// Read `~/.herald/.env`, falling back to `./.env`.
///
/// With neither file present the result is empty and every lookup goes to
/// the process environment.
///
/// # Errors
///
/// Fails when a file exists but cannot be loaded.
pub fn load_default_credentials() -> anyhow::Result<Credentials> {
    let paths = runtime_paths()?;
    let found = [paths.env_file.as_path(), Path::new(".env")]
        .into_iter()
        .find(|candidate| candidate.is_file());

    match found {
        Some(path) => load_credentials(path),
        None => {
            info!("no .env file found, using process environment only");
            Ok(Credentials::default())
        }
    }
}

/// Mode bits must be 0600 or stricter.
#[cfg(unix)]
fn ensure_owner_only(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path)
        .with_context(|| format!("cannot stat {}", path.display()))?
        .permissions()
        .mode();
    anyhow::ensure!(
        mode & 0o077 == 0,
        "{} must be 0600 or stricter, found {:o}",
        path.display(),
        mode & 0o777
    );
    Ok(())
}

#[cfg(not(unix))]
fn ensure_owner_only(path: &Path) -> anyhow::Result<()> {
    anyhow::ensure!(path.is_file(), "{} does not exist", path.display());
    Ok(())
}

//! Environment file loading
//!
//! For a mode `m`, candidate files under the env directory are, in
//! increasing precedence:
//!
//! 1. `.env`
//! 2. `.env.local`
//! 3. `.env.m`
//! 4. `.env.m.local`
//!
//! Only variables whose names start with one of the configured prefixes
//! are exposed, so unrelated secrets never reach the define table.

use crate::{Error, Mode, Result};
use kiln_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prefix applied when the user does not configure `envPrefix`.
pub const DEFAULT_ENV_PREFIX: &str = "KILN_";

/// `envPrefix` accepts a single prefix or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvPrefix {
    Single(String),
    Many(Vec<String>),
}

impl EnvPrefix {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            EnvPrefix::Single(prefix) => vec![prefix.clone()],
            EnvPrefix::Many(prefixes) => prefixes.clone(),
        }
    }
}

impl Default for EnvPrefix {
    fn default() -> Self {
        EnvPrefix::Single(DEFAULT_ENV_PREFIX.to_string())
    }
}

/// Variables and the files they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedEnv {
    /// Prefix-filtered variables
    pub vars: BTreeMap<String, String>,
    /// Env files that exist, sorted
    pub files: Vec<String>,
}

/// Candidate env file paths for `mode`, lowest precedence first.
pub fn env_files_for_mode(mode: Mode, env_dir: &NormalizedPath) -> Vec<NormalizedPath> {
    vec![
        env_dir.join(".env"),
        env_dir.join(".env.local"),
        env_dir.join(&format!(".env.{mode}")),
        env_dir.join(&format!(".env.{mode}.local")),
    ]
}

/// Load prefix-filtered variables from the env files for `mode`.
///
/// Missing files are skipped. Lines that fail to parse are skipped with a
/// warning.
pub fn load_env(mode: Mode, env_dir: &NormalizedPath, prefixes: &[String]) -> Result<LoadedEnv> {
    check_prefixes(prefixes)?;

    let mut parsed: BTreeMap<String, String> = BTreeMap::new();
    let mut files = Vec::new();

    for file in env_files_for_mode(mode, env_dir) {
        if !file.is_file() {
            continue;
        }
        tracing::debug!(%file, "Loading env file");

        let entries = dotenvy::from_path_iter(file.to_native()).map_err(|e| {
            Error::invalid(format!("could not read env file {file}: {e}"))
        })?;
        for entry in entries {
            match entry {
                Ok((key, value)) => {
                    parsed.insert(key, value);
                }
                Err(e) => tracing::warn!(%file, error = %e, "Skipping malformed env line"),
            }
        }
        files.push(file.as_str().to_string());
    }

    files.sort();

    let vars = parsed
        .into_iter()
        .filter(|(key, _)| matches_prefix(key, prefixes))
        .collect();

    Ok(LoadedEnv { vars, files })
}

/// Layer host environment variables matching a prefix over `vars`.
pub fn apply_host_overrides(
    vars: &mut BTreeMap<String, String>,
    host: &BTreeMap<String, String>,
    prefixes: &[String],
) {
    for (key, value) in host {
        if matches_prefix(key, prefixes) {
            vars.insert(key.clone(), value.clone());
        }
    }
}

fn matches_prefix(key: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
}

fn check_prefixes(prefixes: &[String]) -> Result<()> {
    if prefixes.iter().any(|p| p.is_empty()) {
        return Err(Error::invalid(
            "envPrefix must not contain an empty string, it would expose every variable",
        ));
    }
    Ok(())
}

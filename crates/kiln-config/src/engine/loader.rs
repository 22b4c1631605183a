//! Default module importer

use super::ModuleLoader;
use crate::{Error, Result};
use async_trait::async_trait;
use kiln_fs::{ConfigStore, NormalizedPath};
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;

/// Extensions imported by running the script runtime.
pub const SCRIPT_EXTENSIONS: &[&str] = &["js", "mjs", "cjs"];

/// Prints the default export of `process.argv[1]` as JSON.
const EXPORT_SHIM: &str = "import { pathToFileURL } from 'node:url'; \
const mod = await import(pathToFileURL(process.argv[1]).href); \
process.stdout.write(JSON.stringify(mod.default ?? {}));";

/// Loads data files directly and script modules through a runtime executable.
#[derive(Debug, Clone, Default)]
pub struct DefaultModuleLoader {
    store: ConfigStore,
    script_runtime: Option<PathBuf>,
}

impl DefaultModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `runtime` to import script modules.
    pub fn with_script_runtime(mut self, runtime: impl Into<PathBuf>) -> Self {
        self.script_runtime = Some(runtime.into());
        self
    }

    async fn import_script(&self, path: &NormalizedPath) -> Result<Value> {
        let runtime = self.script_runtime.as_ref().ok_or_else(|| Error::Import {
            path: path.to_native(),
            message: "no script runtime configured".into(),
        })?;

        tracing::debug!(%path, runtime = %runtime.display(), "Importing script module");

        let output = tokio::process::Command::new(runtime)
            .arg("--input-type=module")
            .arg("-e")
            .arg(EXPORT_SHIM)
            .arg(path.to_native())
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::Import {
                path: path.to_native(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| Error::Import {
            path: path.to_native(),
            message: format!("default export is not serializable: {e}"),
        })
    }
}

#[async_trait]
impl ModuleLoader for DefaultModuleLoader {
    async fn import_default(&self, path: &NormalizedPath) -> Result<Value> {
        if ConfigStore::supports(path) {
            return Ok(self.store.load_value(path)?);
        }

        match path.extension() {
            Some(ext) if SCRIPT_EXTENSIONS.contains(&ext) => self.import_script(path).await,
            _ => Err(Error::UnsupportedConfigFormat {
                path: path.to_native(),
            }),
        }
    }
}

//! Defaulting rules applied while building the compilation config
//!
//! Each rule is a free function so it can be tested on its own;
//! [`crate::ConfigResolver::normalize_compilation`] strings them together.

pub mod cache;
pub mod output;

pub use cache::{CacheInputs, normalize_persistent_cache};
pub use output::normalize_output;

use crate::schema::Toggle;
use crate::schema::compilation::{
    HMR_HOST_DEFINE, HMR_PATH_DEFINE, HMR_PORT_DEFINE, PROCESS_ENV_DEFINE, RuntimeConfig,
};
use crate::schema::user::{CompilationOptions, TargetEnv};
use crate::server::HmrConfig;
use crate::{Mode, Result};
use kiln_fs::NormalizedPath;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

/// The base layer user compilation options are merged onto.
pub fn compilation_skeleton() -> Value {
    json!({
        "input": { "index": "./index.html" },
        "output": {
            "path": output::DEFAULT_OUTPUT_PATH,
            "publicPath": output::DEFAULT_PUBLIC_PATH
        },
        "sourcemap": true
    })
}

/// Prefix bare relative entries with `./` so they are not taken for packages.
pub fn normalize_input(input: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    input
        .iter()
        .map(|(name, entry)| {
            let entry = if kiln_fs::path::is_absolute_str(entry) || entry.starts_with("./") {
                entry.clone()
            } else {
                format!("./{entry}")
            };
            (name.clone(), entry)
        })
        .collect()
}

/// Assemble the define table.
///
/// The full env map always sits under a single internal key. Browser
/// output also gets one `process.env.KEY` entry per variable. User defines
/// are layered last and win.
pub fn build_define(
    env: &BTreeMap<String, String>,
    target_env: TargetEnv,
    user_define: Option<&Map<String, Value>>,
) -> Result<Map<String, Value>> {
    let mut define = Map::new();
    define.insert(PROCESS_ENV_DEFINE.to_string(), serde_json::to_value(env)?);

    if !target_env.is_host() {
        for (key, value) in env {
            define.insert(format!("process.env.{key}"), Value::String(value.clone()));
        }
    }

    if let Some(user_define) = user_define {
        for (key, value) in user_define {
            define.insert(key.clone(), value.clone());
        }
    }

    Ok(define)
}

/// Mode-dependent feature switches.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFlags {
    pub lazy_compilation: bool,
    pub tree_shaking: bool,
    pub minify: bool,
    pub preset_env: Toggle<Map<String, Value>>,
}

pub fn derive_feature_flags(
    options: &CompilationOptions,
    mode: Mode,
    target_env: TargetEnv,
) -> FeatureFlags {
    let production = mode.is_production();

    let lazy_compilation = if production {
        false
    } else {
        options.lazy_compilation.unwrap_or(mode.is_development())
    };

    let preset_env = options
        .preset_env
        .clone()
        .unwrap_or(Toggle::Flag(production && !target_env.is_host()));

    FeatureFlags {
        lazy_compilation,
        tree_shaking: options.tree_shaking.unwrap_or(production),
        minify: options.minify.unwrap_or(production),
        preset_env,
    }
}

/// Append the HMR client and import-meta runtime plugins.
///
/// Each plugin is added at most once. The HMR connection defines are
/// written whenever HMR is active, including when the client plugin was
/// already listed, so applying this to a normalized runtime changes nothing.
pub fn inject_runtime_plugins(
    runtime: &mut RuntimeConfig,
    define: &mut Map<String, Value>,
    hmr: Option<&HmrConfig>,
    target_env: TargetEnv,
    hmr_client_plugin: &str,
    import_meta_plugin: &str,
) -> Result<()> {
    if let Some(hmr) = hmr.filter(|_| !target_env.is_host()) {
        if !runtime.plugins.iter().any(|p| p == hmr_client_plugin) {
            runtime.plugins.push(hmr_client_plugin.to_string());
        }
        define.insert(HMR_PORT_DEFINE.to_string(), Value::String(hmr.port.to_string()));
        define.insert(HMR_HOST_DEFINE.to_string(), serde_json::to_value(&hmr.host)?);
        define.insert(HMR_PATH_DEFINE.to_string(), Value::String(hmr.path.clone()));
    }

    if !runtime.plugins.iter().any(|p| p == import_meta_plugin) {
        runtime.plugins.push(import_meta_plugin.to_string());
    }

    Ok(())
}

/// Stable runtime namespace: digest of the `name` in `<root>/package.json`.
///
/// `None` when there is no package.json or it has no string `name`.
pub fn runtime_namespace(root: &NormalizedPath) -> Result<Option<String>> {
    let Some(content) = kiln_fs::io::read_text_if_exists(&root.join("package.json"))? else {
        return Ok(None);
    };
    let manifest: Value = serde_json::from_str(&content)?;
    Ok(manifest
        .get("name")
        .and_then(Value::as_str)
        .map(kiln_fs::checksum::content_digest))
}

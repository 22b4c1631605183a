//! User-authored configuration
//!
//! Every field is optional. A config file and the inline (CLI) options share
//! this shape; [`crate::merge`] layers the latter over the former.

use super::Toggle;
use super::plugin::PluginSpec;
use crate::env::EnvPrefix;
use crate::server::UserServerConfig;
use crate::{Command, Mode};
use kiln_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Configuration as authored in a config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clear_screen: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_prefix: Option<EnvPrefix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compilation: Option<CompilationOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<UserServerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<PluginSpec>>,
}

/// Options supplied on the command line. Highest precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InlineOptions {
    #[serde(flatten)]
    pub config: UserConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
}

/// The user config after merging inline options and locating the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedUserConfig {
    pub config: UserConfig,
    /// Absolute, normalized project root
    pub root: NormalizedPath,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_config_path: Option<NormalizedPath>,
    /// Files the config file imports, sorted; used for cache invalidation
    pub config_file_dependencies: Vec<String>,
    pub command: Command,
    pub is_build: bool,
    pub mode: Mode,
    /// Inline options this config was produced from, kept for restarts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_config: Option<InlineOptions>,
}

impl ResolvedUserConfig {
    /// A resolved config with nothing but a root, as used for nested resolutions.
    pub fn from_config(config: UserConfig, root: NormalizedPath) -> Self {
        Self {
            config,
            root,
            resolved_config_path: None,
            config_file_dependencies: Vec::new(),
            command: Command::Build,
            is_build: true,
            mode: Mode::Development,
            inline_config: None,
        }
    }
}

/// Compilation options as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolveOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub define: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watch: Option<Toggle<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetsOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<Toggle<SourcemapKind>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_bundling: Option<PartialBundlingOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lazy_compilation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree_shaking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset_env: Option<Toggle<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_cache: Option<Toggle<PersistentCacheOptions>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_files: Option<Vec<String>>,
    /// Engine options this layer does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetEnv {
    #[default]
    Browser,
    Node,
}

impl TargetEnv {
    /// Whether output runs on the host runtime rather than in a browser.
    pub fn is_host(&self) -> bool {
        matches!(self, TargetEnv::Node)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleFormat {
    #[default]
    Esm,
    Cjs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourcemapKind {
    #[serde(rename = "inline")]
    Inline,
    #[serde(rename = "all")]
    All,
    #[serde(rename = "all-inline")]
    AllInline,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_env: Option<TargetEnv>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ModuleFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
}

/// Module resolution options; passed to the engine as declared.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symlinks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_exports: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_external_failed_resolve: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuntimeOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swc_helpers_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AssetsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialBundlingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_concurrent_requests: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_max_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<BundleGroup>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_resources: Option<Vec<EnforceResource>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_target_concurrent_requests: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enforce_target_min_size: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub immutable_modules: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleGroup {
    pub name: String,
    pub test: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

/// Forces every module matching `test` into the resource named `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforceResource {
    pub name: String,
    pub test: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistentCacheOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_dependencies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_cache_key_strategy: Option<CacheKeyStrategyOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub envs: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheKeyStrategyOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<bool>,
}

//! The normalized configuration consumed by the compilation engine
//!
//! Unlike [`super::user::CompilationOptions`], every field the engine relies
//! on is populated. A value of this type is only ever produced by
//! [`crate::ConfigResolver::normalize_compilation`].

use super::Toggle;
use super::plugin::{NativePlugin, ScriptPlugin};
use super::user::{
    ModuleFormat, PartialBundlingOptions, ResolveOptions, SourcemapKind, TargetEnv,
};
use crate::Mode;
use kiln_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Define key that always carries the full environment map.
pub const PROCESS_ENV_DEFINE: &str = "KILN_PROCESS_ENV";
/// Define keys carrying the HMR client connection settings.
pub const HMR_PORT_DEFINE: &str = "KILN_HMR_PORT";
pub const HMR_HOST_DEFINE: &str = "KILN_HMR_HOST";
pub const HMR_PATH_DEFINE: &str = "KILN_HMR_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilationConfig {
    pub root: NormalizedPath,
    pub mode: Mode,
    /// Path of the engine library, not part of the user-facing schema
    pub core_lib_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_file_path: Option<NormalizedPath>,
    pub input: BTreeMap<String, String>,
    pub output: OutputConfig,
    pub resolve: ResolveOptions,
    pub env: BTreeMap<String, String>,
    pub env_files: Vec<String>,
    pub define: Map<String, Value>,
    pub external: Vec<String>,
    pub runtime: RuntimeConfig,
    pub watch: Toggle<Map<String, Value>>,
    pub assets: AssetsConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<Value>,
    pub sourcemap: Toggle<SourcemapKind>,
    pub partial_bundling: PartialBundlingOptions,
    pub lazy_compilation: bool,
    pub tree_shaking: bool,
    pub minify: bool,
    pub record: bool,
    pub preset_env: Toggle<Map<String, Value>>,
    pub persistent_cache: Toggle<PersistentCacheConfig>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub entry_filename: String,
    pub filename: String,
    pub path: String,
    pub public_path: String,
    pub assets_filename: String,
    pub target_env: TargetEnv,
    pub format: ModuleFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
}

/// The support runtime linked into build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub path: String,
    pub plugins: Vec<String>,
    pub swc_helpers_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetsConfig {
    pub include: Vec<String>,
    /// Absolute public directory; internal, not part of the user schema
    pub public_dir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentCacheConfig {
    pub namespace: String,
    pub cache_dir: String,
    pub build_dependencies: Vec<String>,
    pub module_cache_key_strategy: CacheKeyStrategy,
    pub envs: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKeyStrategy {
    pub timestamp: bool,
    pub hash: bool,
}

/// What the compilation engine receives: the config plus both plugin lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedCompilation {
    pub config: CompilationConfig,
    #[serde(rename = "jsPlugins")]
    pub script_plugins: Vec<ScriptPlugin>,
    /// `[pluginPath, jsonOptions]` pairs
    #[serde(rename = "rustPlugins")]
    pub native_plugins: Vec<NativePlugin>,
}

//! Loading config files that must be compiled first
//!
//! A `kiln.config.ts` cannot be imported as is. It is compiled by the same
//! engine it configures, using an inert sub-configuration:
//!
//! - a single entry (the config file) bundled into one CommonJS file
//! - output under `<config dir>/node_modules/.kiln` with a unique name
//! - host-runtime target, host built-ins external, local files bundled
//! - watch, sourcemaps, tree shaking, minify, preset env, lazy compilation,
//!   persistent cache and HMR all off
//!
//! The bundle is imported, its default export becomes the user config, and
//! the bundle is removed again whatever the outcome of the import.

use crate::resolver::ConfigResolver;
use crate::schema::Toggle;
use crate::schema::user::{
    CompilationOptions, EnforceResource, ModuleFormat, OutputOptions, PartialBundlingOptions,
    ResolvedUserConfig, TargetEnv, UserConfig,
};
use crate::server::UserServerConfig;
use crate::{Error, Mode, Result};
use chrono::Utc;
use kiln_fs::NormalizedPath;
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Config file extensions that need compiling before import.
pub const PRECOMPILE_EXTENSIONS: &[&str] = &["ts", "mts", "cts"];

/// Modules provided by the host runtime; never bundled.
pub const HOST_BUILTIN_MODULES: &[&str] = &[
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Externalizes everything that is not a relative or absolute path.
const NON_LOCAL_EXTERNAL: &str = r"!^(\./|\.\./|[A-Za-z]:\\|/).*";

/// Whether `path` must be compiled before it can be imported.
pub fn requires_precompile(path: &NormalizedPath) -> bool {
    path.extension()
        .map(|ext| PRECOMPILE_EXTENSIONS.contains(&ext))
        .unwrap_or(false)
}

/// Private directory the bundled config is written to.
pub fn bundle_output_dir(config_path: &NormalizedPath) -> NormalizedPath {
    let dir = config_path
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."));
    dir.join("node_modules/.kiln")
}

/// A bundle file name unique across concurrent bootstraps.
pub fn bundle_file_name() -> String {
    format!(
        "kiln.config.bundle-{}-{}.cjs",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// External patterns for host built-ins, plain and `node:`-prefixed.
pub fn bootstrap_externals() -> Vec<String> {
    HOST_BUILTIN_MODULES
        .iter()
        .map(|m| format!("^{}$", regex::escape(m)))
        .chain(
            HOST_BUILTIN_MODULES
                .iter()
                .map(|m| format!("^node:{}$", regex::escape(m))),
        )
        .chain(std::iter::once(NON_LOCAL_EXTERNAL.to_string()))
        .collect()
}

/// The inert sub-configuration that compiles `config_path` alone.
pub fn bootstrap_config(
    config_path: &NormalizedPath,
    output_dir: &NormalizedPath,
    file_name: &str,
) -> UserConfig {
    let compilation = CompilationOptions {
        input: Some(BTreeMap::from([(
            file_name.to_string(),
            config_path.to_string(),
        )])),
        output: Some(OutputOptions {
            entry_filename: Some("[entryName]".into()),
            path: Some(output_dir.to_string()),
            format: Some(ModuleFormat::Cjs),
            target_env: Some(TargetEnv::Node),
            ..Default::default()
        }),
        external: Some(bootstrap_externals()),
        partial_bundling: Some(PartialBundlingOptions {
            enforce_resources: Some(vec![EnforceResource {
                name: file_name.to_string(),
                test: vec![".+".into()],
            }]),
            ..Default::default()
        }),
        watch: Some(Toggle::Flag(false)),
        sourcemap: Some(Toggle::Flag(false)),
        tree_shaking: Some(false),
        minify: Some(false),
        preset_env: Some(Toggle::Flag(false)),
        lazy_compilation: Some(false),
        persistent_cache: Some(Toggle::Flag(false)),
        ..Default::default()
    };

    UserConfig {
        compilation: Some(compilation),
        server: Some(UserServerConfig {
            hmr: Some(Toggle::Flag(false)),
            ..Default::default()
        }),
        ..Default::default()
    }
}

impl ConfigResolver {
    /// Compile `config_path` with the engine and import the bundle's default export.
    pub(crate) async fn compile_and_import(&self, config_path: &NormalizedPath) -> Result<Value> {
        let factory = self
            .compiler_factory()
            .ok_or_else(|| Error::CompilerUnavailable {
                path: config_path.to_native(),
            })?;

        let output_dir = bundle_output_dir(config_path);
        let file_name = bundle_file_name();
        let bundle = output_dir.join(&file_name);
        tracing::debug!(%config_path, %bundle, "Compiling config file");

        let root = config_path
            .parent()
            .unwrap_or_else(|| output_dir.clone());
        let sub_config = ResolvedUserConfig::from_config(
            bootstrap_config(config_path, &output_dir, &file_name),
            root,
        );
        let compilation = self
            .normalize_compilation(None, &sub_config, Mode::Development)
            .await?;

        let compile_error = |e: Error| Error::BootstrapCompile {
            path: config_path.to_native(),
            message: e.to_string(),
        };
        let mut compiler = factory.create(compilation).await.map_err(compile_error)?;
        compiler.compile().await.map_err(compile_error)?;
        compiler.write_resources_to_disk().await.map_err(compile_error)?;

        let imported = self.module_loader().import_default(&bundle).await;
        kiln_fs::io::remove_best_effort(&bundle);
        imported
    }
}

//! Configuration resolution
//!
//! The `ConfigResolver` locates and loads the user's config file, layers the
//! inline (CLI) options over it and normalizes the result into the
//! configuration the compilation engine consumes.
//!
//! ```text
//! inline options ─┐
//!                 ├─ merge ─ ResolvedUserConfig ─ normalize ─ plugins ─ ResolvedCompilation
//! config file ────┘
//! ```

use crate::bootstrap::requires_precompile;
use crate::deps::trace_dependencies;
use crate::engine::{CompilerFactory, DefaultModuleLoader, ModuleLoader};
use crate::env::{apply_host_overrides, load_env};
use crate::merge::merge_typed;
use crate::normalize::{
    CacheInputs, compilation_skeleton, derive_feature_flags, inject_runtime_plugins,
    normalize_input, normalize_output, normalize_persistent_cache, runtime_namespace,
};
use crate::paths::{normalize_public_dir, normalize_public_path};
use crate::plugins::{DefaultPluginResolver, PluginResolver};
use crate::runtime::{RestartContext, RuntimePaths};
use crate::schema::Toggle;
use crate::schema::compilation::{
    AssetsConfig, CompilationConfig, ResolvedCompilation, RuntimeConfig,
};
use crate::schema::user::{CompilationOptions, InlineOptions, ResolvedUserConfig, UserConfig};
use crate::server::{UserServerConfig, normalize_dev_server_options, resolve_port_conflict};
use crate::{Command, Error, Mode, Result};
use kiln_fs::NormalizedPath;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::{IsTerminal, Write};
use std::sync::Arc;

/// Config file names searched for, in order.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &[
    "kiln.config.ts",
    "kiln.config.js",
    "kiln.config.mjs",
    "kiln.config.json",
    "kiln.config.toml",
    "kiln.config.yaml",
];

/// The outcome of a resolution pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    /// User config as merged, kept for restarts
    pub user_config: ResolvedUserConfig,
    /// What the compilation engine receives
    pub compilation: ResolvedCompilation,
}

/// Resolves user configuration into engine configuration.
pub struct ConfigResolver {
    /// Directory relative roots are resolved against
    cwd: NormalizedPath,
    runtime: RuntimePaths,
    compiler_factory: Option<Arc<dyn CompilerFactory>>,
    module_loader: Arc<dyn ModuleLoader>,
    plugin_resolver: Arc<dyn PluginResolver>,
    restart: RestartContext,
    /// Snapshot of the host process environment
    host_env: BTreeMap<String, String>,
}

impl ConfigResolver {
    /// Create a resolver rooted at `cwd`.
    ///
    /// # Arguments
    ///
    /// * `cwd` - Absolute directory used when no root is configured
    /// * `runtime` - Locations of the engine library and runtime assets
    pub fn new(cwd: NormalizedPath, runtime: RuntimePaths) -> Self {
        Self {
            cwd,
            runtime,
            compiler_factory: None,
            module_loader: Arc::new(DefaultModuleLoader::new()),
            plugin_resolver: Arc::new(DefaultPluginResolver),
            restart: RestartContext::default(),
            host_env: std::env::vars().collect(),
        }
    }

    /// Engine used to compile config files that cannot be imported directly.
    pub fn with_compiler_factory(mut self, factory: Arc<dyn CompilerFactory>) -> Self {
        self.compiler_factory = Some(factory);
        self
    }

    pub fn with_module_loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.module_loader = loader;
        self
    }

    pub fn with_plugin_resolver(mut self, resolver: Arc<dyn PluginResolver>) -> Self {
        self.plugin_resolver = resolver;
        self
    }

    pub fn with_restart_context(mut self, restart: RestartContext) -> Self {
        self.restart = restart;
        self
    }

    /// Replace the host environment snapshot.
    pub fn with_host_env(mut self, host_env: BTreeMap<String, String>) -> Self {
        self.host_env = host_env;
        self
    }

    pub(crate) fn compiler_factory(&self) -> Option<&dyn CompilerFactory> {
        self.compiler_factory.as_deref()
    }

    pub(crate) fn module_loader(&self) -> &dyn ModuleLoader {
        self.module_loader.as_ref()
    }

    /// Resolve the full configuration for `command`.
    ///
    /// The mode is picked once, in this order: inline `mode`, the config's
    /// `compilation.mode`, `mode`, and finally the command's default.
    pub async fn resolve_config(
        &self,
        inline: InlineOptions,
        command: Command,
        mode: Option<Mode>,
    ) -> Result<ResolvedConfig> {
        if inline.config.clear_screen.unwrap_or(false) && !self.restart.restarting {
            clear_screen();
        }

        let search_root = inline
            .config
            .root
            .as_deref()
            .map(|root| self.cwd.join(root))
            .unwrap_or_else(|| self.cwd.clone());

        let config_file = match &inline.config_path {
            Some(path) => {
                let normalized = NormalizedPath::new(path);
                if !normalized.is_absolute() {
                    return Err(Error::ConfigPathNotAbsolute { path: path.clone() });
                }
                if normalized.is_dir() {
                    find_config_file(&normalized)
                } else {
                    normalized.is_file().then_some(normalized)
                }
            }
            None => find_config_file(&search_root),
        };

        let file_config = match &config_file {
            Some(path) => {
                let value = self.load_config_file(path).await?;
                parse_user_config(path, value)?
            }
            None => {
                tracing::debug!(dir = %search_root, "No config file found, using defaults");
                UserConfig::default()
            }
        };

        let mut config = merge_typed(&file_config, &inline.config)?;

        let root = config
            .root
            .as_deref()
            .map(|root| self.cwd.join(root))
            .unwrap_or_else(|| self.cwd.clone());

        let config_file_dependencies = match &config_file {
            Some(path) => trace_dependencies(path)?,
            None => Vec::new(),
        };

        let targets_host = config
            .compilation
            .as_ref()
            .and_then(|c| c.output.as_ref())
            .and_then(|o| o.target_env)
            .is_some_and(|target| target.is_host());
        if !(targets_host || command.is_build()) {
            let server = config.server.get_or_insert_with(UserServerConfig::default);
            resolve_port_conflict(server).await?;
        }

        let mode = inline
            .mode
            .or_else(|| config.compilation.as_ref().and_then(|c| c.mode))
            .or(mode)
            .unwrap_or_else(|| command.default_mode());

        tracing::debug!(%root, %command, %mode, "Resolved user config");

        let user_config = ResolvedUserConfig {
            config,
            root,
            resolved_config_path: config_file,
            config_file_dependencies,
            command,
            is_build: command.is_build(),
            mode,
            inline_config: Some(inline.clone()),
        };

        let compilation = self.normalize_with_mode(&user_config, mode).await?;

        Ok(ResolvedConfig {
            user_config,
            compilation,
        })
    }

    /// Build the engine configuration from a resolved user config.
    ///
    /// The mode is the inline `mode`, then the config's `compilation.mode`,
    /// then `mode`. Every field of the result is populated; see the
    /// [`crate::normalize`] rules for the individual defaults.
    pub async fn normalize_compilation(
        &self,
        inline: Option<&InlineOptions>,
        user: &ResolvedUserConfig,
        mode: Mode,
    ) -> Result<ResolvedCompilation> {
        let mode = inline
            .and_then(|inline| inline.mode)
            .or_else(|| user.config.compilation.as_ref().and_then(|c| c.mode))
            .unwrap_or(mode);
        self.normalize_with_mode(user, mode).await
    }

    /// Normalize with a mode that has already been picked.
    async fn normalize_with_mode(
        &self,
        user: &ResolvedUserConfig,
        mode: Mode,
    ) -> Result<ResolvedCompilation> {
        let config = &user.config;
        let mut user_compilation = config.compilation.clone().unwrap_or_default();

        if let Some(public_path) = user_compilation
            .output
            .as_mut()
            .and_then(|output| output.public_path.as_mut())
            .filter(|public_path| !public_path.is_empty())
        {
            *public_path = normalize_public_path(public_path, true).emit();
        }

        let skeleton: CompilationOptions = serde_json::from_value(compilation_skeleton())?;
        let mut options = merge_typed(&skeleton, &user_compilation)?;

        let user_root = if user.root.is_absolute() {
            user.root.clone()
        } else {
            self.cwd.join(user.root.as_str())
        };
        let root = match options.root.as_deref() {
            Some(root) => user_root.join(root),
            None => user_root,
        };

        // The entry map is replaced, never merged with the default entry
        let input = match user_compilation.input.as_ref().filter(|input| !input.is_empty()) {
            Some(input) => normalize_input(input),
            None => options.input.take().unwrap_or_default(),
        };

        let env_dir = config
            .env_dir
            .as_deref()
            .map(|dir| root.join(dir))
            .unwrap_or_else(|| root.clone());
        let prefixes = config.env_prefix.clone().unwrap_or_default().to_vec();
        let loaded = load_env(mode, &env_dir, &prefixes)?;
        let mut env = loaded.vars;
        apply_host_overrides(&mut env, &self.host_env, &prefixes);
        env.insert("NODE_ENV".to_string(), mode.as_str().to_string());

        let mut env_files = options.env_files.take().unwrap_or_default();
        for file in loaded.files {
            if !env_files.contains(&file) {
                env_files.push(file);
            }
        }

        let output = normalize_output(options.output.as_ref(), mode);

        let public_dir = match options
            .assets
            .as_ref()
            .and_then(|assets| assets.public_dir.as_deref())
        {
            Some(dir) => root.join(dir),
            None => normalize_public_dir(&root, config.public_dir.as_deref()),
        };

        let mut define =
            crate::normalize::build_define(&env, output.target_env, options.define.as_ref())?;

        let persistent_cache = normalize_persistent_cache(
            options.persistent_cache.as_ref(),
            CacheInputs {
                root: &root,
                config_file: user.resolved_config_path.as_ref(),
                config_file_dependencies: &user.config_file_dependencies,
                env_files: &env_files,
                env: &env,
            },
        );

        let user_runtime = options.runtime.take().unwrap_or_default();
        let namespace = match user_runtime.namespace {
            Some(namespace) => Some(namespace),
            None => runtime_namespace(&root)?,
        };
        let mut runtime = RuntimeConfig {
            path: user_runtime
                .path
                .unwrap_or_else(|| self.runtime.runtime_entry.to_string()),
            plugins: user_runtime.plugins.unwrap_or_default(),
            swc_helpers_path: user_runtime
                .swc_helpers_path
                .unwrap_or_else(|| self.runtime.helpers_dir.to_string()),
            namespace,
        };

        let flags = derive_feature_flags(&options, mode, output.target_env);

        let server = normalize_dev_server_options(config.server.as_ref(), mode)?;
        inject_runtime_plugins(
            &mut runtime,
            &mut define,
            server.hmr.as_ref(),
            output.target_env,
            self.runtime.hmr_client_plugin.as_str(),
            self.runtime.import_meta_plugin.as_str(),
        )?;

        let assets = options.assets.take().unwrap_or_default();
        let compilation = CompilationConfig {
            root,
            mode,
            core_lib_path: self.runtime.core_lib.to_string(),
            config_file_path: user.resolved_config_path.clone(),
            input,
            output,
            resolve: options.resolve.unwrap_or_default(),
            env,
            env_files,
            define,
            external: options.external.unwrap_or_default(),
            runtime,
            watch: options.watch.unwrap_or(Toggle::Flag(false)),
            assets: AssetsConfig {
                include: assets.include.unwrap_or_default(),
                public_dir: public_dir.to_string(),
            },
            script: options.script,
            css: options.css,
            html: options.html,
            sourcemap: options.sourcemap.unwrap_or(Toggle::Flag(true)),
            partial_bundling: options.partial_bundling.unwrap_or_default(),
            lazy_compilation: flags.lazy_compilation,
            tree_shaking: flags.tree_shaking,
            minify: flags.minify,
            record: options.record.unwrap_or(false),
            preset_env: flags.preset_env,
            persistent_cache,
            extra: options.extra,
        };

        let resolution = self.plugin_resolver.resolve(compilation, user).await?;

        Ok(ResolvedCompilation {
            config: resolution.config,
            script_plugins: resolution.script_plugins,
            native_plugins: resolution.native_plugins,
        })
    }

    async fn load_config_file(&self, path: &NormalizedPath) -> Result<Value> {
        if !self.restart.restarting {
            tracing::info!("Using config file at {path}");
        }

        if requires_precompile(path) {
            self.compile_and_import(path).await
        } else {
            self.module_loader.import_default(path).await
        }
    }
}

/// First default-named config file in `dir`.
pub fn find_config_file(dir: &NormalizedPath) -> Option<NormalizedPath> {
    DEFAULT_CONFIG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

fn parse_user_config(path: &NormalizedPath, value: Value) -> Result<UserConfig> {
    if value.is_null() {
        return Ok(UserConfig::default());
    }
    serde_json::from_value(value).map_err(|e| Error::invalid(format!("{path}: {e}")))
}

fn clear_screen() {
    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = stdout.write_all(b"\x1B[2J\x1B[3J\x1B[H");
        let _ = stdout.flush();
    }
}

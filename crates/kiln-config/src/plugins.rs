//! Plugin resolution
//!
//! Turns the user's `plugins` list into the two lists the engine consumes.
//! Declaration order is hook execution order and is never changed here.

use crate::Result;
use crate::schema::compilation::CompilationConfig;
use crate::schema::plugin::{NativePlugin, PluginOptions, PluginSpec, ScriptPlugin};
use crate::schema::user::ResolvedUserConfig;
use async_trait::async_trait;
use kiln_fs::NormalizedPath;

/// Output of plugin resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginResolution {
    pub script_plugins: Vec<ScriptPlugin>,
    pub native_plugins: Vec<NativePlugin>,
    /// The compilation config, possibly adjusted by plugins
    pub config: CompilationConfig,
}

#[async_trait]
pub trait PluginResolver: Send + Sync {
    async fn resolve(
        &self,
        config: CompilationConfig,
        user_config: &ResolvedUserConfig,
    ) -> Result<PluginResolution>;
}

/// Splits declared plugins without running any plugin code.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPluginResolver;

#[async_trait]
impl PluginResolver for DefaultPluginResolver {
    async fn resolve(
        &self,
        config: CompilationConfig,
        user_config: &ResolvedUserConfig,
    ) -> Result<PluginResolution> {
        let mut script_plugins = Vec::new();
        let mut native_plugins = Vec::new();

        for spec in user_config.config.plugins.iter().flatten() {
            match spec {
                PluginSpec::Native(path) => {
                    native_plugins.push(native_plugin(&config.root, path, &PluginOptions::Unset)?);
                }
                PluginSpec::NativeWithOptions(path, options) => {
                    native_plugins.push(native_plugin(&config.root, path, options)?);
                }
                PluginSpec::Script(plugin) => script_plugins.push(plugin.clone()),
            }
        }

        tracing::debug!(
            script = script_plugins.len(),
            native = native_plugins.len(),
            "Resolved plugins"
        );

        Ok(PluginResolution {
            script_plugins,
            native_plugins,
            config,
        })
    }
}

fn native_plugin(root: &NormalizedPath, path: &str, options: &PluginOptions) -> Result<NativePlugin> {
    let path = if path.starts_with("./") || path.starts_with("../") {
        root.join(path).to_string()
    } else {
        path.to_string()
    };
    Ok(NativePlugin(path, options.to_json_string()?))
}

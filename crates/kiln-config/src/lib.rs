//! Configuration resolution for kiln
//!
//! Turns a user's config file, command-line options and env files into the
//! fully defaulted configuration handed to the compilation engine.
//!
//! # Overview
//!
//! - [`merge`]: deep merge of partial configuration trees
//! - [`env`]: mode-specific `.env` loading under a prefix filter
//! - [`paths`]: `publicPath` and `publicDir` normalization
//! - [`server`]: dev server and HMR option normalization, port probing
//! - [`bootstrap`]: compiling config files that cannot be imported directly
//! - [`resolver`]: the [`ConfigResolver`] that ties everything together
//! - [`plugins`]: splitting declared plugins into native and script lists
//! - [`engine`]: boundary traits for the compilation engine and importer

pub mod bootstrap;
pub mod deps;
pub mod engine;
pub mod env;
pub mod error;
pub mod merge;
pub mod mode;
pub mod normalize;
pub mod paths;
pub mod plugins;
pub mod resolver;
pub mod runtime;
pub mod schema;
pub mod server;

pub use engine::{
    Compiler, CompilerFactory, DefaultModuleLoader, ModuleLoader, ProcessCompilerFactory,
};
pub use error::{Error, Result};
pub use merge::merge_configuration;
pub use mode::{Command, Mode};
pub use plugins::{DefaultPluginResolver, PluginResolution, PluginResolver};
pub use resolver::{ConfigResolver, DEFAULT_CONFIG_NAMES, ResolvedConfig};
pub use runtime::{RestartContext, RuntimePaths};
pub use schema::Toggle;
pub use schema::compilation::{CompilationConfig, ResolvedCompilation};
pub use schema::plugin::{NativePlugin, PluginOptions, PluginSpec, ScriptPlugin};
pub use schema::user::{InlineOptions, ResolvedUserConfig, UserConfig};
pub use server::{DevServerConfig, HmrConfig, normalize_dev_server_options};

//! Boundary to the external compilation engine and module importer
//!
//! The resolver never parses or bundles modules itself. It hands a
//! [`ResolvedCompilation`] to a [`CompilerFactory`] and imports built or
//! data config files through a [`ModuleLoader`]. Both are traits so the
//! engine can be swapped for an in-process binding or a test double.

mod loader;
mod process;

pub use loader::DefaultModuleLoader;
pub use process::{ProcessCompiler, ProcessCompilerFactory};

use crate::Result;
use crate::schema::compilation::ResolvedCompilation;
use async_trait::async_trait;
use kiln_fs::NormalizedPath;
use serde_json::Value;

/// A single compilation run.
#[async_trait]
pub trait Compiler: Send {
    /// Run the compilation to completion.
    async fn compile(&mut self) -> Result<()>;

    /// Flush the compiled resources into the output directory.
    async fn write_resources_to_disk(&mut self) -> Result<()>;
}

/// Creates compilers for a normalized configuration.
#[async_trait]
pub trait CompilerFactory: Send + Sync {
    async fn create(&self, compilation: ResolvedCompilation) -> Result<Box<dyn Compiler>>;
}

/// Imports a module and returns its default export as a JSON tree.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn import_default(&self, path: &NormalizedPath) -> Result<Value>;
}

//! In-process stand-ins for the compilation engine and module importer.
//!
//! The fake engine "compiles" a module whose default export is a JSON
//! object literal (`export default { ... };`) by writing that JSON to the
//! entry's output file. [`JsonModuleLoader`] reads such files back.

use async_trait::async_trait;
use kiln_config::{Compiler, CompilerFactory, Error, ModuleLoader, ResolvedCompilation, Result};
use kiln_fs::NormalizedPath;
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// The default export of a module written as a JSON literal.
///
/// Everything up to `export default` (or `module.exports =`) is ignored, so
/// import statements above it are allowed.
pub fn module_body(source: &str) -> &str {
    let body = ["export default", "module.exports ="]
        .iter()
        .find_map(|marker| source.rfind(marker).map(|idx| &source[idx + marker.len()..]))
        .unwrap_or(source);
    body.trim().trim_end_matches(';').trim()
}

/// Compiler factory that records every compilation it is asked for.
#[derive(Clone, Default)]
pub struct RecordingCompilerFactory {
    created: Arc<Mutex<Vec<ResolvedCompilation>>>,
    failure: Option<String>,
}

impl RecordingCompilerFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose compilers always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Compilations created so far.
    pub fn created(&self) -> Vec<ResolvedCompilation> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompilerFactory for RecordingCompilerFactory {
    async fn create(&self, compilation: ResolvedCompilation) -> Result<Box<dyn Compiler>> {
        self.created.lock().unwrap().push(compilation.clone());
        Ok(Box::new(FakeCompiler {
            compilation,
            failure: self.failure.clone(),
            resources: Vec::new(),
        }))
    }
}

struct FakeCompiler {
    compilation: ResolvedCompilation,
    failure: Option<String>,
    resources: Vec<(String, String)>,
}

#[async_trait]
impl Compiler for FakeCompiler {
    async fn compile(&mut self) -> Result<()> {
        if let Some(message) = &self.failure {
            return Err(Error::engine(message.clone()));
        }
        let config = &self.compilation.config;
        for (name, entry) in &config.input {
            let source = kiln_fs::io::read_text(&config.root.join(entry))?;
            let body: Value = serde_json::from_str(module_body(&source))?;
            self.resources.push((name.clone(), serde_json::to_string(&body)?));
        }
        Ok(())
    }

    async fn write_resources_to_disk(&mut self) -> Result<()> {
        let config = &self.compilation.config;
        let output_dir = config.root.join(&config.output.path);
        for (name, content) in self.resources.drain(..) {
            kiln_fs::io::write_atomic(&output_dir.join(&name), content.as_bytes())?;
        }
        Ok(())
    }
}

/// Imports files whose body is a JSON literal, recording each path.
#[derive(Clone, Default)]
pub struct JsonModuleLoader {
    imported: Arc<Mutex<Vec<NormalizedPath>>>,
}

impl JsonModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn imported(&self) -> Vec<NormalizedPath> {
        self.imported.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModuleLoader for JsonModuleLoader {
    async fn import_default(&self, path: &NormalizedPath) -> Result<Value> {
        self.imported.lock().unwrap().push(path.clone());
        let source = kiln_fs::io::read_text(path)?;
        serde_json::from_str(module_body(&source)).map_err(|e| Error::Import {
            path: path.to_native(),
            message: e.to_string(),
        })
    }
}

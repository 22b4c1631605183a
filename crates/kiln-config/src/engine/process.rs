//! Compilation through an external engine executable
//!
//! `<engine> compile` reads a serialized [`ResolvedCompilation`] on stdin and
//! answers with a JSON object mapping resource names to their contents.

use super::{Compiler, CompilerFactory};
use crate::schema::compilation::ResolvedCompilation;
use crate::{Error, Result};
use async_trait::async_trait;
use kiln_fs::NormalizedPath;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;

/// Spawns one engine process per compilation.
#[derive(Debug, Clone)]
pub struct ProcessCompilerFactory {
    engine: PathBuf,
}

impl ProcessCompilerFactory {
    pub fn new(engine: impl Into<PathBuf>) -> Self {
        Self {
            engine: engine.into(),
        }
    }
}

#[async_trait]
impl CompilerFactory for ProcessCompilerFactory {
    async fn create(&self, compilation: ResolvedCompilation) -> Result<Box<dyn Compiler>> {
        Ok(Box::new(ProcessCompiler {
            engine: self.engine.clone(),
            compilation,
            resources: None,
        }))
    }
}

pub struct ProcessCompiler {
    engine: PathBuf,
    compilation: ResolvedCompilation,
    resources: Option<BTreeMap<String, String>>,
}

impl ProcessCompiler {
    fn output_dir(&self) -> NormalizedPath {
        let config = &self.compilation.config;
        config.root.join(&config.output.path)
    }
}

#[async_trait]
impl Compiler for ProcessCompiler {
    async fn compile(&mut self) -> Result<()> {
        let payload = serde_json::to_vec(&self.compilation)?;

        let mut child = tokio::process::Command::new(&self.engine)
            .arg("compile")
            .current_dir(self.compilation.config.root.to_native())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // stdin is fed while stdout drains; the engine may write before it finishes reading
        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                stdin.write_all(&payload).await?;
            }
            Ok::<_, std::io::Error>(())
        };
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::engine(format!(
                "engine exited with code {code}: {}",
                stderr.trim()
            )));
        }

        if let Err(e) = fed {
            tracing::debug!(error = %e, "Engine closed stdin before reading the whole payload");
        }

        let resources: BTreeMap<String, String> = serde_json::from_slice(&output.stdout)
            .map_err(|e| Error::engine(format!("unreadable engine output: {e}")))?;
        tracing::debug!(count = resources.len(), "Engine produced resources");
        self.resources = Some(resources);
        Ok(())
    }

    async fn write_resources_to_disk(&mut self) -> Result<()> {
        let resources = self
            .resources
            .take()
            .ok_or_else(|| Error::engine("write_resources_to_disk called before compile"))?;

        let output_dir = self.output_dir();
        for (name, content) in resources {
            let target = output_dir.join(&name);
            tracing::debug!(%target, "Writing resource");
            kiln_fs::io::write_atomic(&target, content.as_bytes())?;
        }
        Ok(())
    }
}

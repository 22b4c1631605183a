//! `kiln resolve`: print the effective configuration

use std::sync::Arc;

use colored::Colorize;
use kiln_config::{
    ConfigResolver, DefaultModuleLoader, InlineOptions, ProcessCompilerFactory, RestartContext,
    RuntimePaths, UserConfig,
};
use kiln_fs::NormalizedPath;

use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};

/// Install directory used when neither `--runtime-dir` nor `KILN_HOME` is set.
const DEFAULT_INSTALL_DIR: &str = "node_modules/kiln";

/// Resolve configuration from `cwd` and print or write it.
pub async fn run_resolve(cwd: NormalizedPath, args: ResolveArgs) -> Result<()> {
    let install_dir = match &args.runtime_dir {
        Some(dir) => cwd.join(&dir.to_string_lossy()),
        None => cwd.join(DEFAULT_INSTALL_DIR),
    };

    let mut loader = DefaultModuleLoader::new();
    if let Some(runtime) = &args.script_runtime {
        loader = loader.with_script_runtime(runtime);
    }

    let mut resolver = ConfigResolver::new(cwd.clone(), RuntimePaths::from_install_dir(&install_dir))
        .with_module_loader(Arc::new(loader));
    if let Some(engine) = &args.engine {
        resolver = resolver.with_compiler_factory(Arc::new(ProcessCompilerFactory::new(engine)));
    }
    if args.restarting {
        resolver = resolver.with_restart_context(RestartContext::restarting());
    }

    let inline = InlineOptions {
        config: UserConfig {
            root: args.root.clone(),
            clear_screen: args.clear_screen.then_some(true),
            ..Default::default()
        },
        mode: args.mode,
        config_path: args.config.clone(),
    };

    let resolved = resolver
        .resolve_config(inline, args.command, args.mode)
        .await?;
    let rendered = serde_json::to_string_pretty(&resolved)?;

    match &args.out {
        Some(out) => {
            let target = cwd.join(&out.to_string_lossy());
            if target.is_dir() {
                return Err(CliError::user(format!("{target} is a directory")));
            }
            kiln_fs::io::write_atomic(&target, rendered.as_bytes())?;
            eprintln!(
                "{} Wrote resolved config to {}",
                "OK".green().bold(),
                target.as_str().cyan()
            );
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

//! Loading config files that need compiling first.
//!
//! The engine and importer are the in-process fakes from kiln-test-utils;
//! everything else runs for real against a temporary project.

use kiln_config::schema::user::{ModuleFormat, TargetEnv};
use kiln_config::{
    Command, ConfigResolver, Error, InlineOptions, RuntimePaths, Toggle,
};
use kiln_fs::NormalizedPath;
use kiln_test_utils::{JsonModuleLoader, RecordingCompilerFactory, TestProject};
use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use std::sync::Arc;

const BUNDLE_DIR: &str = "node_modules/.kiln";

fn resolver(
    project: &TestProject,
    factory: &RecordingCompilerFactory,
    loader: &JsonModuleLoader,
) -> ConfigResolver {
    ConfigResolver::new(
        project.normalized_root(),
        RuntimePaths::from_install_dir(&NormalizedPath::new("/opt/kiln")),
    )
    .with_compiler_factory(Arc::new(factory.clone()))
    .with_module_loader(Arc::new(loader.clone()))
    .with_host_env(BTreeMap::new())
}

#[tokio::test]
async fn typescript_config_is_compiled_loaded_and_cleaned_up() {
    let project = TestProject::new().with_file(
        "kiln.config.ts",
        r#"export default { "compilation": { "minify": false, "external": ["lodash"] } };"#,
    );
    let factory = RecordingCompilerFactory::new();
    let loader = JsonModuleLoader::new();

    let resolved = resolver(&project, &factory, &loader)
        .resolve_config(InlineOptions::default(), Command::Build, None)
        .await
        .unwrap();

    assert!(!resolved.compilation.config.minify);
    assert_eq!(resolved.compilation.config.external, vec!["lodash"]);
    assert_eq!(
        resolved.user_config.resolved_config_path,
        Some(project.path("kiln.config.ts"))
    );

    // The bundle was imported, then removed
    let imported = loader.imported();
    assert_eq!(imported.len(), 1);
    assert!(imported[0].as_str().contains("/node_modules/.kiln/kiln.config.bundle-"));
    assert!(project.list_dir(BUNDLE_DIR).is_empty());
}

#[tokio::test]
async fn bootstrap_compilation_is_inert() {
    let project = TestProject::new().with_file("kiln.config.ts", "export default {};");
    let factory = RecordingCompilerFactory::new();
    let loader = JsonModuleLoader::new();

    resolver(&project, &factory, &loader)
        .resolve_config(InlineOptions::default(), Command::Serve, None)
        .await
        .unwrap();

    let created = factory.created();
    assert_eq!(created.len(), 1);
    let sub = &created[0].config;

    assert_eq!(sub.root, project.normalized_root());
    assert_eq!(sub.output.target_env, TargetEnv::Node);
    assert_eq!(sub.output.format, ModuleFormat::Cjs);
    assert_eq!(sub.output.entry_filename, "[entryName]");
    assert_eq!(sub.output.path, project.path(BUNDLE_DIR).to_string());
    assert_eq!(sub.persistent_cache, Toggle::Flag(false));
    assert_eq!(sub.watch, Toggle::Flag(false));
    assert_eq!(sub.preset_env, Toggle::Flag(false));
    assert!(!sub.lazy_compilation && !sub.minify && !sub.tree_shaking);
    assert_eq!(sub.runtime.plugins, vec!["/opt/kiln/runtime/plugins/import-meta.js"]);

    let (entry_name, entry) = sub.input.iter().next().unwrap();
    assert!(entry_name.starts_with("kiln.config.bundle-"));
    assert_eq!(entry, project.path("kiln.config.ts").as_str());

    let enforced = sub.partial_bundling.enforce_resources.as_ref().unwrap();
    assert_eq!(enforced[0].name, *entry_name);
    assert_eq!(enforced[0].test, vec![".+"]);

    assert!(sub.external.contains(&"^fs$".to_string()));
    assert!(sub.external.contains(&"^node:fs$".to_string()));
    assert!(!sub.define.keys().any(|key| key.starts_with("KILN_HMR")));
}

#[tokio::test]
async fn failed_compile_aborts_resolution() {
    let project = TestProject::new().with_file("kiln.config.ts", "export default {};");
    let factory = RecordingCompilerFactory::failing("unexpected token");
    let loader = JsonModuleLoader::new();

    let result = resolver(&project, &factory, &loader)
        .resolve_config(InlineOptions::default(), Command::Build, None)
        .await;

    match result {
        Err(Error::BootstrapCompile { message, .. }) => {
            assert!(message.contains("unexpected token"))
        }
        other => panic!("expected bootstrap failure, got {other:?}"),
    }
    assert!(loader.imported().is_empty());
    assert!(project.list_dir(BUNDLE_DIR).is_empty());
}

#[tokio::test]
async fn concurrent_bootstraps_do_not_collide() {
    let project = TestProject::new().with_file(
        "kiln.config.ts",
        r#"export default { "compilation": { "record": true } };"#,
    );
    let factory = RecordingCompilerFactory::new();
    let loader = JsonModuleLoader::new();
    let first_resolver = resolver(&project, &factory, &loader);
    let second_resolver = resolver(&project, &factory, &loader);

    let (first, second) = tokio::join!(
        first_resolver.resolve_config(InlineOptions::default(), Command::Build, None),
        second_resolver.resolve_config(InlineOptions::default(), Command::Build, None),
    );

    assert!(first.unwrap().compilation.config.record);
    assert!(second.unwrap().compilation.config.record);

    let imported = loader.imported();
    assert_eq!(imported.len(), 2);
    assert_ne!(imported[0], imported[1]);
    assert!(project.list_dir(BUNDLE_DIR).is_empty());
}

#[tokio::test]
async fn explicit_directory_prefers_typescript_config() {
    let project = TestProject::new()
        .with_file("config/kiln.config.ts", r#"export default { "compilation": { "minify": false } };"#)
        .with_file("config/kiln.config.json", r#"{ "compilation": { "minify": true } }"#);
    let factory = RecordingCompilerFactory::new();
    let loader = JsonModuleLoader::new();

    let inline = InlineOptions {
        config_path: Some(project.root().join("config")),
        ..Default::default()
    };
    let resolved = resolver(&project, &factory, &loader)
        .resolve_config(inline, Command::Build, None)
        .await
        .unwrap();

    assert!(!resolved.compilation.config.minify);
    assert_eq!(
        resolved.user_config.resolved_config_path,
        Some(project.path("config/kiln.config.ts"))
    );
    assert!(project.list_dir("config/node_modules/.kiln").is_empty());
}

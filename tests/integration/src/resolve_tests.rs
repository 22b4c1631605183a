//! End-to-end configuration resolution scenarios.

use kiln_config::schema::compilation::{HMR_HOST_DEFINE, HMR_PATH_DEFINE, HMR_PORT_DEFINE};
use kiln_config::{
    Command, ConfigResolver, Error, InlineOptions, Mode, PluginSpec, RestartContext,
    RuntimePaths, Toggle,
};
use kiln_fs::NormalizedPath;
use kiln_test_utils::{JsonModuleLoader, RecordingCompilerFactory, TestProject};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

fn resolver(project: &TestProject) -> ConfigResolver {
    ConfigResolver::new(
        project.normalized_root(),
        RuntimePaths::from_install_dir(&NormalizedPath::new("/opt/kiln")),
    )
    .with_host_env(BTreeMap::new())
}

fn inline(value: serde_json::Value) -> InlineOptions {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn production_with_empty_config_file() {
    let project = TestProject::new().with_file("kiln.config.json", "{}");

    let resolved = resolver(&project)
        .resolve_config(inline(json!({ "mode": "production" })), Command::Build, None)
        .await
        .unwrap();
    let config = &resolved.compilation.config;

    assert_eq!(config.mode, Mode::Production);
    assert!(config.output.path.ends_with("dist"));
    assert_eq!(
        config.input,
        BTreeMap::from([("index".to_string(), "./index.html".to_string())])
    );
    let node_env: Vec<_> = config
        .define
        .keys()
        .filter(|key| *key == "process.env.NODE_ENV")
        .collect();
    assert_eq!(node_env.len(), 1);
    assert_eq!(config.env["NODE_ENV"], "production");
    assert_eq!(config.output.filename, "[resourceName].[contentHash].[ext]");
    assert!(config.preset_env.is_enabled());
    assert_eq!(config.assets.public_dir, project.path("public").to_string());
    assert_eq!(config.core_lib_path, "/opt/kiln/binding/kiln.node");
    assert_eq!(config.config_file_path, Some(project.path("kiln.config.json")));
}

#[tokio::test]
async fn plugin_lists_union_in_declaration_order() {
    let project = TestProject::new().with_file(
        "kiln.config.json",
        r#"{ "plugins": [
            { "name": "a" },
            ["./native.so", { "level": 1 }],
            { "name": "b", "options": { "x": 1 } }
        ] }"#,
    );

    let resolved = resolver(&project)
        .resolve_config(
            inline(json!({
                "plugins": [
                    { "name": "b", "options": { "x": 1 } },
                    { "name": "b", "options": { "x": 2 } },
                    { "name": "c" }
                ]
            })),
            Command::Build,
            None,
        )
        .await
        .unwrap();

    let declared = resolved.user_config.config.plugins.as_ref().unwrap();
    assert_eq!(declared.len(), 5);
    assert!(matches!(&declared[1], PluginSpec::NativeWithOptions(..)));

    let names: Vec<_> = resolved
        .compilation
        .script_plugins
        .iter()
        .map(|plugin| plugin.name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "b", "c"]);

    let native = &resolved.compilation.native_plugins;
    assert_eq!(native.len(), 1);
    assert_eq!(native[0].path(), project.path("native.so").as_str());
    assert_eq!(native[0].options(), r#"{"level":1}"#);
}

#[tokio::test]
async fn config_dependencies_feed_the_persistent_cache() {
    let project = TestProject::new()
        .with_file(
            "kiln.config.ts",
            "import { shared } from './config/shared';\nexport default {};",
        )
        .with_file("config/shared.ts", "export const shared = {};")
        .with_file("package.json", r#"{ "name": "demo" }"#)
        .with_file(".env", "KILN_TOKEN=abc\n");
    let factory = RecordingCompilerFactory::new();
    let loader = JsonModuleLoader::new();

    let resolved = resolver(&project)
        .with_compiler_factory(Arc::new(factory))
        .with_module_loader(Arc::new(loader))
        .resolve_config(InlineOptions::default(), Command::Build, None)
        .await
        .unwrap();

    let expected_deps = vec![
        project.path("config/shared.ts").to_string(),
        project.path("kiln.config.ts").to_string(),
    ];
    assert_eq!(resolved.user_config.config_file_dependencies, expected_deps);

    let cache = resolved.compilation.config.persistent_cache.options().unwrap();
    assert_eq!(
        cache.build_dependencies,
        vec![
            project.path(".env").to_string(),
            project.path("config/shared.ts").to_string(),
            project.path("kiln.config.ts").to_string(),
            project.path("package.json").to_string(),
        ]
    );
    assert_eq!(cache.envs["KILN_TOKEN"], "abc");
    assert!(resolved.compilation.config.runtime.namespace.is_some());
}

#[tokio::test]
async fn env_dir_and_prefix_list_are_honored() {
    let project = TestProject::new()
        .with_file("env/.env", "APP_NAME=demo\nKILN_A=1\nOTHER=x\n")
        .with_file("env/.env.development.local", "APP_NAME=local\n");

    let resolved = resolver(&project)
        .resolve_config(
            inline(json!({
                "envDir": "env",
                "envPrefix": ["APP_", "KILN_"],
                "compilation": { "output": { "targetEnv": "node" } }
            })),
            Command::Serve,
            None,
        )
        .await
        .unwrap();
    let config = &resolved.compilation.config;

    assert_eq!(config.env["APP_NAME"], "local");
    assert_eq!(config.env["KILN_A"], "1");
    assert!(!config.env.contains_key("OTHER"));
    assert_eq!(
        config.env_files,
        vec![
            project.path("env/.env").to_string(),
            project.path("env/.env.development.local").to_string(),
        ]
    );
}

#[tokio::test]
async fn serve_in_browser_wires_hmr() {
    let project = TestProject::new();

    let resolved = resolver(&project)
        .resolve_config(
            inline(json!({ "server": { "hmr": { "path": "/ws" } } })),
            Command::Serve,
            None,
        )
        .await
        .unwrap();
    let config = &resolved.compilation.config;

    assert_eq!(config.mode, Mode::Development);
    assert!(config.lazy_compilation);
    assert!(!config.minify);
    assert_eq!(
        config.runtime.plugins,
        vec![
            "/opt/kiln/runtime/plugins/hmr.js".to_string(),
            "/opt/kiln/runtime/plugins/import-meta.js".to_string(),
        ]
    );
    assert_eq!(config.define[HMR_PATH_DEFINE], json!("/ws"));
    assert_eq!(config.define[HMR_HOST_DEFINE], json!(true));

    let port = resolved.user_config.config.server.as_ref().unwrap().port.unwrap();
    assert_eq!(config.define[HMR_PORT_DEFINE], json!(port.to_string()));
}

#[tokio::test]
async fn strict_port_conflict_is_fatal() {
    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let project = TestProject::new();

    let result = resolver(&project)
        .resolve_config(
            inline(json!({
                "server": { "host": "127.0.0.1", "port": port, "strictPort": true }
            })),
            Command::Serve,
            None,
        )
        .await;

    assert!(matches!(result, Err(Error::PortUnavailable { .. })));
}

#[tokio::test]
async fn restart_keeps_inline_options_for_next_pass() {
    let project = TestProject::new().with_file(
        "kiln.config.json",
        r#"{ "compilation": { "persistentCache": false } }"#,
    );
    let options = inline(json!({
        "configPath": project.root(),
        "mode": "production",
        "clearScreen": true
    }));

    let first = resolver(&project)
        .resolve_config(options.clone(), Command::Build, None)
        .await
        .unwrap();
    let recorded = first.user_config.inline_config.clone().unwrap();
    assert_eq!(recorded, options);

    let second = resolver(&project)
        .with_restart_context(RestartContext::restarting())
        .resolve_config(recorded, Command::Build, None)
        .await
        .unwrap();

    assert_eq!(second.compilation, first.compilation);
    assert_eq!(second.compilation.config.persistent_cache, Toggle::Flag(false));
}

#[tokio::test]
async fn non_absolute_config_path_is_a_user_error() {
    let project = TestProject::new();

    let result = resolver(&project)
        .resolve_config(
            inline(json!({ "configPath": "relative/kiln.config.ts" })),
            Command::Build,
            None,
        )
        .await;

    assert!(matches!(result, Err(Error::ConfigPathNotAbsolute { .. })));
}

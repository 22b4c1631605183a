//! Plugin descriptors
//!
//! A `plugins` entry in user config takes one of three shapes:
//!
//! ```json
//! "./plugins/native-svg.so"
//! ["@kiln/plugin-sass", { "implementation": "dart" }]
//! { "name": "inline-env", "options": { "debug": true }, "filters": { "moduleTypes": ["ts"] } }
//! ```
//!
//! The first two are native plugins; the last is a script plugin.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    Native(String),
    NativeWithOptions(String, PluginOptions),
    Script(ScriptPlugin),
}

/// A plugin implemented in the scripting language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptPlugin {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default)]
    pub options: PluginOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<PluginFilters>,
}

/// Restricts which modules a plugin's hooks see.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PluginFilters {
    /// Regex patterns matched against resolved paths
    pub resolved_paths: Vec<String>,
    pub module_types: Vec<String>,
}

/// Free-form plugin options.
///
/// Known shapes are spelled out; anything structured lands in `Map` or
/// `List` as untyped JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginOptions {
    Unset,
    Flag(bool),
    Number(Number),
    Text(String),
    List(Vec<Value>),
    Map(Map<String, Value>),
}

impl Default for PluginOptions {
    fn default() -> Self {
        PluginOptions::Map(Map::new())
    }
}

impl PluginOptions {
    /// The language-neutral string handed to native plugins.
    pub fn to_json_string(&self) -> crate::Result<String> {
        match self {
            PluginOptions::Unset => Ok("{}".to_string()),
            other => Ok(serde_json::to_string(other)?),
        }
    }
}

/// A native plugin as the engine receives it: path plus serialized options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativePlugin(pub String, pub String);

impl NativePlugin {
    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn options(&self) -> &str {
        &self.1
    }
}

//! Install-relative runtime assets and restart state

use kiln_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

/// Locations of the engine library and the support runtime linked into
/// build output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimePaths {
    /// Native engine library
    pub core_lib: NormalizedPath,
    /// Runtime entry module
    pub runtime_entry: NormalizedPath,
    /// Directory holding the transform helper library
    pub helpers_dir: NormalizedPath,
    pub hmr_client_plugin: NormalizedPath,
    pub import_meta_plugin: NormalizedPath,
}

impl RuntimePaths {
    /// Derive every path from a kiln install directory.
    ///
    /// ```text
    /// <install>/binding/kiln.node
    /// <install>/runtime/index.js
    /// <install>/runtime/helpers/
    /// <install>/runtime/plugins/hmr.js
    /// <install>/runtime/plugins/import-meta.js
    /// ```
    pub fn from_install_dir(install_dir: &NormalizedPath) -> Self {
        let runtime = install_dir.join("runtime");
        Self {
            core_lib: install_dir.join("binding/kiln.node"),
            runtime_entry: runtime.join("index.js"),
            helpers_dir: runtime.join("helpers"),
            hmr_client_plugin: runtime.join("plugins/hmr.js"),
            import_meta_plugin: runtime.join("plugins/import-meta.js"),
        }
    }
}

/// Whether resolution runs as part of a dev server restart.
///
/// A restart suppresses screen clearing and the "using config file" line
/// so the terminal is not wiped on every config edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestartContext {
    pub restarting: bool,
}

impl RestartContext {
    pub fn restarting() -> Self {
        Self { restarting: true }
    }
}

//! Output descriptor defaults

use crate::Mode;
use crate::schema::compilation::OutputConfig;
use crate::schema::user::OutputOptions;

pub const DEFAULT_OUTPUT_PATH: &str = "./dist";
pub const DEFAULT_PUBLIC_PATH: &str = "/";
pub const DEFAULT_ENTRY_FILENAME: &str = "[entryName].[ext]";

const HASHED_FILENAME: &str = "[resourceName].[contentHash].[ext]";
const PLAIN_FILENAME: &str = "[resourceName].[ext]";

/// Fill every unset output field.
///
/// Production output gets content-hashed resource names.
pub fn normalize_output(options: Option<&OutputOptions>, mode: Mode) -> OutputConfig {
    let options = options.cloned().unwrap_or_default();
    let resource_filename = if mode.is_production() {
        HASHED_FILENAME
    } else {
        PLAIN_FILENAME
    };

    OutputConfig {
        entry_filename: options
            .entry_filename
            .unwrap_or_else(|| DEFAULT_ENTRY_FILENAME.to_string()),
        filename: options
            .filename
            .unwrap_or_else(|| resource_filename.to_string()),
        path: options
            .path
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string()),
        public_path: options
            .public_path
            .unwrap_or_else(|| DEFAULT_PUBLIC_PATH.to_string()),
        assets_filename: options
            .assets_filename
            .unwrap_or_else(|| resource_filename.to_string()),
        target_env: options.target_env.unwrap_or_default(),
        format: options.format.unwrap_or_default(),
        clean: options.clean,
    }
}

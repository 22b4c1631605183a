//! Configuration data model
//!
//! - [`user`]: the as-authored configuration, inline (CLI) options and the
//!   resolved user configuration
//! - [`compilation`]: the fully defaulted configuration handed to the
//!   compilation engine
//! - [`plugin`]: plugin descriptors

pub mod compilation;
pub mod plugin;
pub mod user;

use serde::{Deserialize, Serialize};

/// An option that is either a plain on/off flag or a structured value.
///
/// `persistentCache: false`, `watch: { ... }` and `sourcemap: "inline"` all
/// take this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle<T> {
    Flag(bool),
    Options(T),
}

impl<T> Toggle<T> {
    /// Anything but an explicit `false` counts as enabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Toggle::Flag(false))
    }

    pub fn options(&self) -> Option<&T> {
        match self {
            Toggle::Options(options) => Some(options),
            Toggle::Flag(_) => None,
        }
    }
}

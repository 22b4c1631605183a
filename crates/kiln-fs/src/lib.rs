//! Filesystem primitives for kiln
//!
//! Provides normalized path handling, small I/O helpers and a
//! format-agnostic loader for data configuration files.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::NormalizedPath;

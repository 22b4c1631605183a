//! Shared test utilities for the kiln workspace.
//!
//! Test-only; never published.
//!
//! # Modules
//!
//! - [`project`]: [`TestProject`] temp-dir builder
//! - [`engine`]: in-process fakes for the compilation engine and importer

pub mod engine;
pub mod project;

pub use engine::{JsonModuleLoader, RecordingCompilerFactory};
pub use project::TestProject;

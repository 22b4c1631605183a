//! Command implementations for kiln-cli

pub mod resolve;

pub use resolve::run_resolve;

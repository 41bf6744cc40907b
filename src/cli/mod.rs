//! Command-line interface module.

mod args;
pub mod build;
pub mod clean;
pub mod manifest;
pub mod revisions;

pub use args::{BuildArgs, Cli, Commands};

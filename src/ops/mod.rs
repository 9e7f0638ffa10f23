//! High-level operations backing the CLI commands.

pub mod drydock_build;

pub use drydock_build::{build, BuildOptions, BuildSummary};

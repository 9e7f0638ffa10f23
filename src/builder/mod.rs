//! Containerized RPM build pipeline.
//!
//! This module implements the per-target build flow: context staging,
//! image build, container run, streaming artifact extraction, and the
//! unconditional cleanup phase.

pub mod cleanup;
pub mod context;
pub mod errors;
pub mod events;
pub mod extract;
pub mod pipeline;
pub mod scripts;

pub use cleanup::BuildHandles;
pub use context::StagedContext;
pub use errors::BuildError;
pub use events::{BuildEvent, MessageFormat, Reporter};
pub use pipeline::TargetBuilder;

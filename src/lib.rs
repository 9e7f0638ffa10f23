//! Drydock - build RPM packages inside Docker containers
//!
//! Given an RPM spec file and its sources, drydock stages a Docker build
//! context, builds a throwaway image, runs it to completion, and recovers
//! the built `.rpm` files from a streamed export of the container's
//! filesystem. Docker gives every build a consistent environment; drydock
//! guarantees the transient image and container are removed on every exit
//! path.

pub mod builder;
pub mod core;
pub mod engine;
pub mod ops;
pub mod util;

pub use builder::{BuildError, MessageFormat, Reporter, TargetBuilder};
pub use core::{Platform, RpmTarget};
pub use engine::Docker;
pub use util::Config;

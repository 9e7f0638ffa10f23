//! Core data structures for drydock.
//!
//! - Platform table and resolution
//! - RPM target descriptions
//! - Spec file scanning

pub mod platform;
pub mod spec;
pub mod target;

pub use platform::{Platform, PlatformSpec};
pub use target::{RemoteSource, RpmTarget};

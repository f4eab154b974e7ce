//! `artifactkit_manifest`:
//! configuration surface of the copy-file step.
//!
//! - `conf` : property keys
//! - `spec` : manifest models, project context and errors

pub mod conf;
pub mod spec;

pub use spec::{ManifestError, SpecCopyFileConfig, SpecManifest, SpecProjectContext};

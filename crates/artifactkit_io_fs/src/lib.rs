//! `artifactkit_io_fs` v1:
//! Rust-side copy-file step for build pipelines.
//!
//! Modules:
//! - `copy`   : copy orchestration
//! - `spec`   : request/options, artifact provider, errors
//! - `report` : run-time report model
//! - `util`   : shared helper functions

pub mod copy;
pub mod report;
pub mod spec;
mod util;

pub use copy::copy_file;
pub use report::{EnumCopyFileStatus, ReportCopyFile};
pub use spec::{
    ArtifactPathProvider, C_GUIDANCE_MISSING_ARTIFACT, CopyFileError,
    EnumCopyFileConflictStrategy, SpecArtifactFile, SpecCopyFileRequest,
};

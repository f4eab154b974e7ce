//! Copy request models, artifact provider seam and top-level error types.

use std::io;
use std::path::PathBuf;

////////////////////////////////////////////////////////////////////////////////
// #region EnumsInit

/// Existing destination file conflict policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyFileConflictStrategy {
    /// Replace destination file with source file.
    Overwrite,
    /// Fail and leave the destination file untouched.
    Error,
}

impl From<bool> for EnumCopyFileConflictStrategy {
    fn from(if_overwrite: bool) -> Self {
        if if_overwrite {
            Self::Overwrite
        } else {
            Self::Error
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Request

/// Input of one [`crate::copy_file`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyFileRequest {
    /// File to copy. Falls back to the project artifact when unset.
    pub path_src: Option<PathBuf>,
    /// Copy target. Required unless `if_skip`.
    pub path_dst: Option<PathBuf>,
    /// Replace an existing destination file.
    pub if_overwrite: bool,
    /// Bypass execution entirely.
    pub if_skip: bool,
    /// Carry timestamps and extended attributes over to the destination.
    pub if_preserve_metadata: bool,
}

impl Default for SpecCopyFileRequest {
    fn default() -> Self {
        Self {
            path_src: None,
            path_dst: None,
            if_overwrite: true,
            if_skip: false,
            if_preserve_metadata: false,
        }
    }
}

impl SpecCopyFileRequest {
    /// Request copying `path_src` to `path_dst` with default policies.
    pub fn new(path_src: impl Into<PathBuf>, path_dst: impl Into<PathBuf>) -> Self {
        Self {
            path_src: Some(path_src.into()),
            path_dst: Some(path_dst.into()),
            ..Self::default()
        }
    }

    /// Conflict behavior derived from `if_overwrite`.
    pub fn rule_conflict_file(&self) -> EnumCopyFileConflictStrategy {
        EnumCopyFileConflictStrategy::from(self.if_overwrite)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ArtifactProvider

/// Supplies the default source file: the project's built artifact.
///
/// Returns `None` while the artifact has not been produced yet.
pub trait ArtifactPathProvider {
    /// Path of the built artifact, if any.
    fn artifact_path(&self) -> Option<PathBuf>;
}

impl<F> ArtifactPathProvider for F
where
    F: Fn() -> Option<PathBuf>,
{
    fn artifact_path(&self) -> Option<PathBuf> {
        self()
    }
}

/// Artifact path as known by the build host, which may not be built yet.
///
/// Yields the path only once it exists as a file, so an unbuilt artifact
/// surfaces as [`CopyFileError::MissingArtifact`] rather than an I/O failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecArtifactFile {
    /// Expected artifact location.
    pub path_artifact: Option<PathBuf>,
}

impl SpecArtifactFile {
    /// Artifact expected at `path_artifact`.
    pub fn new(path_artifact: Option<PathBuf>) -> Self {
        Self { path_artifact }
    }
}

impl ArtifactPathProvider for SpecArtifactFile {
    fn artifact_path(&self) -> Option<PathBuf> {
        let path_artifact = self.path_artifact.as_ref()?;
        if path_artifact.is_file() {
            return Some(path_artifact.clone());
        }
        log::debug!(
            "Project artifact {} has not been built",
            path_artifact.display()
        );
        None
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Remediation text attached to [`CopyFileError::MissingArtifact`].
pub const C_GUIDANCE_MISSING_ARTIFACT: &str = "Either run this step after the main artifact \
     is built, or specify the 'sourceFile' parameter";

/// Failures of one copy call. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum CopyFileError {
    /// Destination path not supplied while the step is not skipped.
    #[error("The destFile parameter is not set but is required")]
    MissingDestination,
    /// No explicit source and the project has no built artifact.
    #[error("The main artifact has not been built yet, cannot copy it.")]
    MissingArtifact {
        /// What the caller can do about it.
        guidance: String,
    },
    /// Overwrite disabled and something already exists at the destination.
    #[error("Destination already exists: {}", path.display())]
    DestinationExists {
        /// Existing destination path.
        path: PathBuf,
    },
    /// Filesystem failure while creating directories or copying.
    #[error("Failed to copy {} to {}: {error}", path_src.display(), path_dst.display())]
    CopyIo {
        /// Resolved source path.
        path_src: PathBuf,
        /// Requested destination path.
        path_dst: PathBuf,
        /// Underlying cause.
        #[source]
        error: io::Error,
    },
}

impl CopyFileError {
    pub(crate) fn missing_artifact() -> Self {
        Self::MissingArtifact {
            guidance: C_GUIDANCE_MISSING_ARTIFACT.to_string(),
        }
    }

    /// Remediation text, when the error carries one.
    pub fn guidance(&self) -> Option<&str> {
        match self {
            Self::MissingArtifact { guidance } => Some(guidance),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

//! Manifest models: project context and copy-file step parameters.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use artifactkit_io_fs::{ArtifactPathProvider, SpecArtifactFile, SpecCopyFileRequest};
use log::warn;
use serde::Deserialize;

use crate::conf::{
    C_PROPERTY_DEST_FILE, C_PROPERTY_OVERWRITE, C_PROPERTY_PREFIX, C_PROPERTY_PRESERVE_METADATA,
    C_PROPERTY_PROJECT_ARTIFACT, C_PROPERTY_SKIP, C_PROPERTY_SOURCE_FILE, TUP_PROPERTY_KEYS,
};

////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures while loading or overriding the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Manifest file could not be read.
    #[error("Failed to read manifest {}: {error}", path.display())]
    Read {
        /// Manifest path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        error: io::Error,
    },
    /// Manifest is not valid TOML or has unexpected keys.
    #[error("Invalid manifest: {0}")]
    Parse(#[from] toml::de::Error),
    /// Property value has the wrong shape.
    #[error("Invalid value for property `{key}`: `{value}` (expected `true` or `false`)")]
    InvalidProperty {
        /// Property key.
        key: String,
        /// Rejected value.
        value: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Models

/// `[project]` table: what the build host knows about the project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecProjectContext {
    /// Path of the main artifact once built.
    pub artifact: Option<PathBuf>,
}

impl ArtifactPathProvider for SpecProjectContext {
    /// The configured artifact, only once it exists as a file.
    fn artifact_path(&self) -> Option<PathBuf> {
        SpecArtifactFile::new(self.artifact.clone()).artifact_path()
    }
}

/// `[copyFile]` table: parameters of the copy-file step.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct SpecCopyFileConfig {
    /// File to copy. Defaults to the project artifact.
    pub source_file: Option<PathBuf>,
    /// Copy target. Required unless `skip`.
    pub dest_file: Option<PathBuf>,
    /// Replace an existing destination.
    pub overwrite: bool,
    /// Skip the step.
    pub skip: bool,
    /// Carry timestamps and extended attributes.
    pub preserve_metadata: bool,
}

impl Default for SpecCopyFileConfig {
    fn default() -> Self {
        Self {
            source_file: None,
            dest_file: None,
            overwrite: true,
            skip: false,
            preserve_metadata: false,
        }
    }
}

impl SpecCopyFileConfig {
    /// Build the request consumed by [`artifactkit_io_fs::copy_file`].
    pub fn to_request(&self) -> SpecCopyFileRequest {
        SpecCopyFileRequest {
            path_src: self.source_file.clone(),
            path_dst: self.dest_file.clone(),
            if_overwrite: self.overwrite,
            if_skip: self.skip,
            if_preserve_metadata: self.preserve_metadata,
        }
    }
}

/// A whole manifest file.
///
/// ```toml
/// [project]
/// artifact = "target/app.jar"
///
/// [copyFile]
/// destFile = "dist/app.jar"
/// overwrite = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecManifest {
    /// Project context.
    pub project: SpecProjectContext,
    /// Copy-file step parameters.
    #[serde(rename = "copyFile")]
    pub copy_file: SpecCopyFileConfig,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Loading

impl SpecManifest {
    /// Parse manifest text. Relative paths are kept as written.
    pub fn from_toml_str(txt: &str) -> Result<Self, ManifestError> {
        Ok(toml::from_str(txt)?)
    }

    /// Read a manifest file. Relative paths resolve against its directory.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let txt = fs::read_to_string(path).map_err(|error| ManifestError::Read {
            path: path.to_path_buf(),
            error,
        })?;
        let mut manifest = Self::from_toml_str(&txt)?;
        if let Some(path_dir_base) = path.parent() {
            manifest.resolve_relative_paths(path_dir_base);
        }
        Ok(manifest)
    }

    fn resolve_relative_paths(&mut self, path_dir_base: &Path) {
        for path_slot in [
            &mut self.project.artifact,
            &mut self.copy_file.source_file,
            &mut self.copy_file.dest_file,
        ] {
            if let Some(path) = path_slot.as_mut() {
                if path.is_relative() {
                    *path = path_dir_base.join(&*path);
                }
            }
        }
    }

    /// Override parameters from build-host properties.
    ///
    /// Keys outside the `artifactkit.` prefix are ignored. An empty path value
    /// unsets that parameter.
    pub fn apply_properties<I, K, V>(&mut self, properties: I) -> Result<(), ManifestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref().trim());
            if !key.starts_with(C_PROPERTY_PREFIX) {
                continue;
            }
            match key {
                C_PROPERTY_SOURCE_FILE => self.copy_file.source_file = parse_path(value),
                C_PROPERTY_DEST_FILE => self.copy_file.dest_file = parse_path(value),
                C_PROPERTY_OVERWRITE => self.copy_file.overwrite = parse_bool(key, value)?,
                C_PROPERTY_SKIP => self.copy_file.skip = parse_bool(key, value)?,
                C_PROPERTY_PRESERVE_METADATA => {
                    self.copy_file.preserve_metadata = parse_bool(key, value)?
                }
                C_PROPERTY_PROJECT_ARTIFACT => self.project.artifact = parse_path(value),
                _ => warn!(
                    "Ignoring unknown property `{key}`. Expected one of: {TUP_PROPERTY_KEYS:?}"
                ),
            }
        }
        Ok(())
    }
}

fn parse_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ManifestError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ManifestError::InvalidProperty {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

//! Property keys of the copy-file step.

/// Prefix shared by all build-host properties of this workspace.
pub const C_PROPERTY_PREFIX: &str = "artifactkit.";

/// File to copy.
pub const C_PROPERTY_SOURCE_FILE: &str = "artifactkit.copyFile.sourceFile";
/// Copy target.
pub const C_PROPERTY_DEST_FILE: &str = "artifactkit.copyFile.destFile";
/// Replace an existing destination.
pub const C_PROPERTY_OVERWRITE: &str = "artifactkit.copyFile.overwrite";
/// Skip the step.
pub const C_PROPERTY_SKIP: &str = "artifactkit.copyFile.skip";
/// Carry timestamps and extended attributes.
pub const C_PROPERTY_PRESERVE_METADATA: &str = "artifactkit.copyFile.preserveMetadata";
/// Path of the project's built artifact.
pub const C_PROPERTY_PROJECT_ARTIFACT: &str = "artifactkit.project.artifact";

/// All keys understood by [`crate::SpecManifest::apply_properties`].
pub const TUP_PROPERTY_KEYS: [&str; 6] = [
    C_PROPERTY_SOURCE_FILE,
    C_PROPERTY_DEST_FILE,
    C_PROPERTY_OVERWRITE,
    C_PROPERTY_SKIP,
    C_PROPERTY_PRESERVE_METADATA,
    C_PROPERTY_PROJECT_ARTIFACT,
];

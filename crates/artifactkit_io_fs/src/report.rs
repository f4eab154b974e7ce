//! Copy report model.

use std::fmt;
use std::path::PathBuf;

/// What one copy call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCopyFileStatus {
    /// Bytes were committed to the destination.
    Copied,
    /// The step was skipped; nothing was touched.
    Skipped,
}

impl EnumCopyFileStatus {
    /// Lower-case status label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copied => "copied",
            Self::Skipped => "skipped",
        }
    }
}

/// Outcome of one successful [`crate::copy_file`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportCopyFile {
    /// Copied or skipped.
    pub status: EnumCopyFileStatus,
    /// Canonical source path. `None` when skipped.
    pub path_src: Option<PathBuf>,
    /// Canonical destination path. `None` when skipped.
    pub path_dst: Option<PathBuf>,
    /// Number of bytes written to the destination.
    pub n_bytes_copied: u64,
    /// An existing destination file was replaced.
    pub if_replaced: bool,
}

impl ReportCopyFile {
    pub(crate) fn skipped() -> Self {
        Self {
            status: EnumCopyFileStatus::Skipped,
            path_src: None,
            path_dst: None,
            n_bytes_copied: 0,
            if_replaced: false,
        }
    }

    /// `true` when the step was skipped.
    pub fn is_skipped(&self) -> bool {
        self.status == EnumCopyFileStatus::Skipped
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        match (&self.path_src, &self.path_dst) {
            (Some(path_src), Some(path_dst)) => format!(
                "{prefix} status={} bytes={} replaced={} src={} dst={}",
                self.status.as_str(),
                self.n_bytes_copied,
                self.if_replaced,
                path_src.display(),
                path_dst.display()
            ),
            _ => format!("{prefix} status={}", self.status.as_str()),
        }
    }
}

impl fmt::Display for ReportCopyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[COPY_FILE]"))
    }
}

use std::fs::{self, File, Metadata};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::spec::EnumCopyFileConflictStrategy;

const C_PREFIX_TEMP_FILE: &str = ".artifactkit-copy-";

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

fn _absolutize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

/// Canonical form of `path`, or its absolute form when it cannot be resolved.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    _absolutize_path(path)
}

/// Directory that will hold `path_dst`. A bare file name lives in `.`.
pub(crate) fn derive_parent_dir(path_dst: &Path) -> PathBuf {
    match path_dst.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Whether anything (file, directory, dangling symlink) occupies `path`.
pub(crate) fn is_path_occupied(path: &Path) -> io::Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CopyStages

/// Open the source for reading; it must resolve to a regular file.
pub(crate) fn open_source_file(path_file_src: &Path) -> io::Result<(File, Metadata)> {
    let file_src = File::open(path_file_src)?;
    let meta_src = file_src.metadata()?;
    if !meta_src.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Source is not a regular file: {}", path_file_src.display()),
        ));
    }
    Ok((file_src, meta_src))
}

/// Stream `file_src` into a fresh temporary file inside `path_dir_dst`.
///
/// The temporary file is removed on drop unless persisted.
pub(crate) fn write_temp_copy(
    file_src: &mut File,
    path_dir_dst: &Path,
) -> io::Result<(NamedTempFile, u64)> {
    let mut file_tmp = tempfile::Builder::new()
        .prefix(C_PREFIX_TEMP_FILE)
        .tempfile_in(path_dir_dst)?;
    let n_bytes = io::copy(file_src, file_tmp.as_file_mut())?;
    file_tmp.as_file_mut().flush()?;
    Ok((file_tmp, n_bytes))
}

/// Give the staged copy the source's metadata, then flush it to disk.
///
/// Permission bits are always carried over (same as `std::fs::copy`).
/// Timestamps and extended attributes only when `if_preserve_metadata`.
pub(crate) fn finalize_temp_copy(
    file_tmp: &NamedTempFile,
    path_file_src: &Path,
    meta_src: &Metadata,
    if_preserve_metadata: bool,
) -> io::Result<()> {
    if if_preserve_metadata {
        copy_xattrs(path_file_src, file_tmp.path());
        apply_file_times(meta_src, file_tmp.path())?;
    }
    file_tmp.as_file().set_permissions(meta_src.permissions())?;
    file_tmp.as_file().sync_all()?;
    Ok(())
}

/// Move the staged copy onto `path_file_dst` according to the conflict rule.
///
/// `Error` uses a no-clobber rename: a destination created after the
/// existence check still fails with `AlreadyExists`.
pub(crate) fn commit_temp_copy(
    file_tmp: NamedTempFile,
    path_file_dst: &Path,
    rule_conflict: EnumCopyFileConflictStrategy,
) -> io::Result<()> {
    let res_persist = match rule_conflict {
        EnumCopyFileConflictStrategy::Overwrite => file_tmp.persist(path_file_dst),
        EnumCopyFileConflictStrategy::Error => file_tmp.persist_noclobber(path_file_dst),
    };
    res_persist.map(|_| ()).map_err(|e| e.error)
}

fn apply_file_times(meta_src: &Metadata, path_file_dst: &Path) -> io::Result<()> {
    use filetime::{FileTime, set_file_times};

    let file_time_access = FileTime::from_last_access_time(meta_src);
    let file_time_modify = FileTime::from_last_modification_time(meta_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

/// Best-effort; failures are logged, never returned.
#[cfg(target_os = "linux")]
fn copy_xattrs(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(e) => {
            log::debug!(
                "Cannot list extended attributes of {}: {e}",
                path_file_src.display()
            );
            return;
        }
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        if let Err(e) = xattr::set(path_file_dst, &name, &raw_value) {
            log::warn!(
                "Cannot copy extended attribute {} to {}: {e}",
                name.to_string_lossy(),
                path_file_dst.display()
            );
        }
    }
}

#[cfg(not(target_os = "linux"))]
fn copy_xattrs(path_file_src: &Path, path_file_dst: &Path) {
    log::debug!(
        "Extended attributes of {} not copied to {}: unsupported platform",
        path_file_src.display(),
        path_file_dst.display()
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

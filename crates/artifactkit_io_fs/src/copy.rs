//! Single-file copy orchestration.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::report::{EnumCopyFileStatus, ReportCopyFile};
use crate::spec::{
    ArtifactPathProvider, CopyFileError, EnumCopyFileConflictStrategy, SpecCopyFileRequest,
};
use crate::util::{
    commit_temp_copy, derive_parent_dir, finalize_temp_copy, is_path_occupied, normalize_path,
    open_source_file, write_temp_copy,
};

/// Copy one file, usually the project's built artifact, to a destination.
///
/// Steps, in order:
/// 1. `if_skip` returns a skipped report without touching the filesystem.
/// 2. The source is `path_src`, or else `provider`'s artifact path
///    ([`CopyFileError::MissingArtifact`] when neither exists).
/// 3. `path_dst` must be set ([`CopyFileError::MissingDestination`]).
/// 4. Missing ancestors of the destination are created.
/// 5. Bytes are staged in a temporary file next to the destination and
///    renamed into place, so a failed copy never leaves a partial file.
///    With overwrite disabled an occupied destination fails with
///    [`CopyFileError::DestinationExists`] and is left untouched.
///
/// Every filesystem failure is reported as [`CopyFileError::CopyIo`],
/// including a missing source file.
pub fn copy_file<A>(
    spec_request: &SpecCopyFileRequest,
    provider: &A,
) -> Result<ReportCopyFile, CopyFileError>
where
    A: ArtifactPathProvider + ?Sized,
{
    if spec_request.if_skip {
        info!("Copy is skipped");
        return Ok(ReportCopyFile::skipped());
    }

    let path_file_src = resolve_source_path(spec_request, provider)?;
    let Some(path_file_dst) = spec_request.path_dst.clone() else {
        return Err(CopyFileError::MissingDestination);
    };

    let rule_conflict = spec_request.rule_conflict_file();
    let wrap_io = |error: io::Error| CopyFileError::CopyIo {
        path_src: path_file_src.clone(),
        path_dst: path_file_dst.clone(),
        error,
    };

    let path_dir_dst = derive_parent_dir(&path_file_dst);
    fs::create_dir_all(&path_dir_dst).map_err(wrap_io)?;

    let if_occupied = is_path_occupied(&path_file_dst).map_err(wrap_io)?;
    if if_occupied && rule_conflict == EnumCopyFileConflictStrategy::Error {
        return Err(CopyFileError::DestinationExists {
            path: path_file_dst.clone(),
        });
    }

    let n_bytes_copied = stage_and_commit(
        &path_file_src,
        &path_file_dst,
        &path_dir_dst,
        rule_conflict,
        spec_request.if_preserve_metadata,
    )
    .map_err(|error| {
        if error.kind() == io::ErrorKind::AlreadyExists
            && rule_conflict == EnumCopyFileConflictStrategy::Error
        {
            CopyFileError::DestinationExists {
                path: path_file_dst.clone(),
            }
        } else {
            wrap_io(error)
        }
    })?;

    let path_src_canonical = normalize_path(&path_file_src);
    let path_dst_canonical = normalize_path(&path_file_dst);
    info!(
        "Copying {} to {}",
        path_src_canonical.display(),
        path_dst_canonical.display()
    );

    Ok(ReportCopyFile {
        status: EnumCopyFileStatus::Copied,
        path_src: Some(path_src_canonical),
        path_dst: Some(path_dst_canonical),
        n_bytes_copied,
        if_replaced: if_occupied,
    })
}

fn resolve_source_path<A>(
    spec_request: &SpecCopyFileRequest,
    provider: &A,
) -> Result<PathBuf, CopyFileError>
where
    A: ArtifactPathProvider + ?Sized,
{
    if let Some(path_src) = &spec_request.path_src {
        return Ok(path_src.clone());
    }
    match provider.artifact_path() {
        Some(path_artifact) => {
            debug!(
                "No source file set, using project artifact {}",
                path_artifact.display()
            );
            Ok(path_artifact)
        }
        None => Err(CopyFileError::missing_artifact()),
    }
}

fn stage_and_commit(
    path_file_src: &Path,
    path_file_dst: &Path,
    path_dir_dst: &Path,
    rule_conflict: EnumCopyFileConflictStrategy,
    if_preserve_metadata: bool,
) -> io::Result<u64> {
    let (mut file_src, meta_src) = open_source_file(path_file_src)?;
    let (file_tmp, n_bytes) = write_temp_copy(&mut file_src, path_dir_dst)?;
    finalize_temp_copy(&file_tmp, path_file_src, &meta_src, if_preserve_metadata)?;
    commit_temp_copy(file_tmp, path_file_dst, rule_conflict)?;
    Ok(n_bytes)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use super::copy_file;
    use crate::report::EnumCopyFileStatus;
    use crate::spec::{CopyFileError, SpecArtifactFile, SpecCopyFileRequest};

    struct CaptureLogger {
        l_messages: Mutex<Vec<String>>,
    }

    impl log::Log for CaptureLogger {
        fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
            metadata.level() <= log::Level::Info
        }

        fn log(&self, record: &log::Record<'_>) {
            if !self.enabled(record.metadata()) {
                return;
            }
            if let Ok(mut l_messages) = self.l_messages.lock() {
                l_messages.push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER_CAPTURE: CaptureLogger = CaptureLogger {
        l_messages: Mutex::new(Vec::new()),
    };

    fn captured_messages() -> Vec<String> {
        LOGGER_CAPTURE
            .l_messages
            .lock()
            .map(|l_messages| l_messages.clone())
            .unwrap_or_default()
    }

    fn no_artifact() -> Option<PathBuf> {
        None
    }

    fn write_bytes(path: &Path, raw: &[u8]) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, raw).expect("write bytes");
    }

    fn list_names(path_dir: &Path) -> Vec<String> {
        let mut l_names = std::fs::read_dir(path_dir)
            .expect("read dir")
            .map(|entry| {
                entry
                    .expect("dir entry")
                    .file_name()
                    .to_string_lossy()
                    .to_string()
            })
            .collect::<Vec<_>>();
        l_names.sort();
        l_names
    }

    #[test]
    fn copy_file_creates_nested_parents() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("a/app.jar");
        let dst = tmp.path().join("b/c/app-out.jar");
        write_bytes(&src, b"0123456789");

        let report = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect("copy file");

        assert!(tmp.path().join("b/c").is_dir());
        assert_eq!(std::fs::read(&dst).expect("read dst"), b"0123456789");
        assert_eq!(report.status, EnumCopyFileStatus::Copied);
        assert_eq!(report.n_bytes_copied, 10);
        assert!(!report.if_replaced);
        assert_eq!(
            report.path_dst,
            Some(std::fs::canonicalize(&dst).expect("canonicalize"))
        );
    }

    #[test]
    fn copy_file_round_trips_binary_content() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.bin");
        let dst = tmp.path().join("dst.bin");
        let raw = (0..64 * 1024).map(|n| (n % 251) as u8).collect::<Vec<_>>();
        write_bytes(&src, &raw);

        copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact).expect("copy file");
        assert_eq!(std::fs::read(&dst).expect("read dst"), raw);
    }

    #[test]
    fn copy_file_copies_empty_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("empty");
        let dst = tmp.path().join("out/empty");
        write_bytes(&src, b"");

        let report = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect("copy file");
        assert_eq!(report.n_bytes_copied, 0);
        assert!(dst.is_file());
    }

    #[test]
    fn copy_file_skip_never_touches_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dst = tmp.path().join("out/app.jar");
        let provider_called = std::cell::Cell::new(false);
        let provider = || -> Option<PathBuf> {
            provider_called.set(true);
            None
        };

        let spec_request = SpecCopyFileRequest {
            path_src: Some(tmp.path().join("missing.jar")),
            path_dst: Some(dst.clone()),
            if_skip: true,
            ..SpecCopyFileRequest::default()
        };
        let report = copy_file(&spec_request, &provider).expect("skip");

        assert!(report.is_skipped());
        assert!(!tmp.path().join("out").exists());
        assert!(!provider_called.get());

        let spec_request = SpecCopyFileRequest {
            if_skip: true,
            ..SpecCopyFileRequest::default()
        };
        assert!(copy_file(&spec_request, &provider).expect("skip").is_skipped());
    }

    #[test]
    fn copy_file_without_destination_fails_before_filesystem_access() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("app.jar");
        write_bytes(&src, b"payload");
        let l_names_before = list_names(tmp.path());

        let spec_request = SpecCopyFileRequest {
            path_src: Some(src),
            ..SpecCopyFileRequest::default()
        };
        let err = copy_file(&spec_request, &no_artifact).expect_err("must fail");

        assert!(matches!(err, CopyFileError::MissingDestination));
        assert_eq!(list_names(tmp.path()), l_names_before);
    }

    #[test]
    fn copy_file_without_source_or_artifact_fails() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let spec_request = SpecCopyFileRequest {
            path_dst: Some(tmp.path().join("out/app.jar")),
            ..SpecCopyFileRequest::default()
        };

        let err = copy_file(&spec_request, &no_artifact).expect_err("must fail");
        assert!(matches!(err, CopyFileError::MissingArtifact { .. }));
        assert!(err.guidance().is_some());
        assert!(!tmp.path().join("out").exists());
    }

    #[test]
    fn copy_file_uses_artifact_when_source_unset() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifact = tmp.path().join("target/app-1.0.jar");
        let dst = tmp.path().join("dist/app.jar");
        write_bytes(&artifact, b"artifact");

        let provider = || Some(artifact.clone());
        let spec_request = SpecCopyFileRequest {
            path_dst: Some(dst.clone()),
            ..SpecCopyFileRequest::default()
        };
        copy_file(&spec_request, &provider).expect("copy artifact");
        assert_eq!(std::fs::read(&dst).expect("read dst"), b"artifact");
    }

    #[test]
    fn copy_file_explicit_source_wins_over_artifact() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("explicit.txt");
        let artifact = tmp.path().join("artifact.txt");
        let dst = tmp.path().join("dst.txt");
        write_bytes(&src, b"explicit");
        write_bytes(&artifact, b"artifact");

        let provider = || Some(artifact.clone());
        copy_file(&SpecCopyFileRequest::new(&src, &dst), &provider).expect("copy file");
        assert_eq!(std::fs::read(&dst).expect("read dst"), b"explicit");
    }

    #[test]
    fn copy_file_conflict_keeps_existing_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        write_bytes(&src, b"X");
        write_bytes(&dst, b"Y");

        let spec_request = SpecCopyFileRequest {
            if_overwrite: false,
            ..SpecCopyFileRequest::new(&src, &dst)
        };
        let err = copy_file(&spec_request, &no_artifact).expect_err("must fail");

        assert!(matches!(err, CopyFileError::DestinationExists { ref path } if *path == dst));
        assert_eq!(std::fs::read(&dst).expect("read dst"), b"Y");
        assert_eq!(list_names(tmp.path()), vec!["dst.txt", "src.txt"]);
    }

    #[test]
    fn copy_file_overwrite_replaces_existing_destination() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        write_bytes(&src, b"new");
        write_bytes(&dst, b"old content that is longer");

        let report = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect("copy file");

        assert!(report.if_replaced);
        assert_eq!(std::fs::read(&dst).expect("read dst"), b"new");
        assert_eq!(list_names(tmp.path()), vec!["dst.txt", "src.txt"]);
    }

    #[test]
    fn copy_file_missing_source_is_io_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("missing.jar");
        let dst = tmp.path().join("out/app.jar");

        let err = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect_err("must fail");

        match err {
            CopyFileError::CopyIo {
                path_src,
                path_dst,
                error,
            } => {
                assert_eq!(path_src, src);
                assert_eq!(path_dst, dst);
                assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!dst.exists());
    }

    #[test]
    fn copy_file_directory_source_is_io_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("dir_src");
        std::fs::create_dir_all(&src).expect("mkdir src");
        let dst = tmp.path().join("out/dst");

        let err = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect_err("must fail");
        assert!(matches!(err, CopyFileError::CopyIo { .. }));
        assert!(!dst.exists());
        assert!(list_names(&tmp.path().join("out")).is_empty());
    }

    #[test]
    fn copy_file_parent_is_a_file_is_io_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.txt");
        let blocker = tmp.path().join("blocker");
        write_bytes(&src, b"x");
        write_bytes(&blocker, b"not a dir");

        let err = copy_file(
            &SpecCopyFileRequest::new(&src, blocker.join("dst.txt")),
            &no_artifact,
        )
        .expect_err("must fail");
        assert!(matches!(err, CopyFileError::CopyIo { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn copy_file_carries_permission_bits() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("run.sh");
        let dst = tmp.path().join("bin/run.sh");
        write_bytes(&src, b"#!/bin/sh\n");
        std::fs::set_permissions(&src, std::fs::Permissions::from_mode(0o750))
            .expect("set permissions");

        copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact).expect("copy file");
        let n_mode = std::fs::metadata(&dst).expect("meta").permissions().mode() & 0o777;
        assert_eq!(n_mode, 0o750);
    }

    #[test]
    fn copy_file_preserves_times_when_requested() {
        use filetime::{FileTime, set_file_times};

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        write_bytes(&src, b"stamp");
        let file_time = FileTime::from_unix_time(1_600_000_000, 0);
        set_file_times(&src, file_time, file_time).expect("set times");

        let spec_request = SpecCopyFileRequest {
            if_preserve_metadata: true,
            ..SpecCopyFileRequest::new(&src, &dst)
        };
        copy_file(&spec_request, &no_artifact).expect("copy file");

        let meta_dst = std::fs::metadata(&dst).expect("meta");
        assert_eq!(FileTime::from_last_modification_time(&meta_dst), file_time);
    }

    #[test]
    fn copy_file_reports_canonical_paths() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("a/app.jar");
        write_bytes(&src, b"jar");
        let dst = tmp.path().join("a/../b/app.jar");

        let report = copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact)
            .expect("copy file");

        let path_root = std::fs::canonicalize(tmp.path()).expect("canonicalize");
        assert_eq!(report.path_src, Some(path_root.join("a/app.jar")));
        assert_eq!(report.path_dst, Some(path_root.join("b/app.jar")));
    }

    #[test]
    fn copy_file_logs_canonical_paths_on_success() {
        let _ = log::set_logger(&LOGGER_CAPTURE);
        log::set_max_level(log::LevelFilter::Info);

        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("a/app.jar");
        write_bytes(&src, b"jar");
        let dst = tmp.path().join("a/../logged/app.jar");

        copy_file(&SpecCopyFileRequest::new(&src, &dst), &no_artifact).expect("copy file");

        let path_root = std::fs::canonicalize(tmp.path()).expect("canonicalize");
        let txt_expected = format!(
            "Copying {} to {}",
            path_root.join("a/app.jar").display(),
            path_root.join("logged/app.jar").display()
        );
        assert!(
            captured_messages().contains(&txt_expected),
            "missing log line: {txt_expected}"
        );
    }

    #[test]
    fn copy_file_unbuilt_artifact_is_missing_artifact() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let artifact = SpecArtifactFile::new(Some(tmp.path().join("target/missing.jar")));
        let spec_request = SpecCopyFileRequest {
            path_dst: Some(tmp.path().join("out.jar")),
            ..SpecCopyFileRequest::default()
        };

        let err = copy_file(&spec_request, &artifact).expect_err("must fail");
        assert!(matches!(err, CopyFileError::MissingArtifact { .. }));
        assert!(err.guidance().is_some());
        assert!(!tmp.path().join("out.jar").exists());
    }

    #[test]
    fn copy_file_uses_built_artifact_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path_artifact = tmp.path().join("target/app.jar");
        write_bytes(&path_artifact, b"built");
        let artifact = SpecArtifactFile::new(Some(path_artifact));
        let spec_request = SpecCopyFileRequest {
            path_dst: Some(tmp.path().join("dist/app.jar")),
            ..SpecCopyFileRequest::default()
        };

        copy_file(&spec_request, &artifact).expect("copy artifact");
        assert_eq!(
            std::fs::read(tmp.path().join("dist/app.jar")).expect("read dst"),
            b"built"
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn copy_file_carries_xattrs_when_requested() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src.txt");
        let dst = tmp.path().join("dst.txt");
        write_bytes(&src, b"attrs");
        if xattr::set(&src, "user.artifactkit", b"kept").is_err() {
            // filesystem without user xattrs
            return;
        }

        let spec_request = SpecCopyFileRequest {
            if_preserve_metadata: true,
            ..SpecCopyFileRequest::new(&src, &dst)
        };
        copy_file(&spec_request, &no_artifact).expect("copy file");

        let raw_value = xattr::get(&dst, "user.artifactkit").expect("get xattr");
        assert_eq!(raw_value, Some(b"kept".to_vec()));
    }
}

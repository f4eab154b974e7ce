use std::path::PathBuf;

use artifactkit_io_fs::{
    CopyFileError, ReportCopyFile, SpecArtifactFile, SpecCopyFileRequest, copy_file,
};
use pyo3::exceptions::{PyFileExistsError, PyOSError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "artifactkit.fs.copy_file.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportCopyFile")]
#[derive(Debug, Clone)]
struct PyReportCopyFile {
    #[pyo3(get)]
    status: String,
    #[pyo3(get)]
    path_src: Option<String>,
    #[pyo3(get)]
    path_dst: Option<String>,
    #[pyo3(get)]
    n_bytes_copied: u64,
    #[pyo3(get)]
    if_replaced: bool,
    summary: String,
}

impl From<ReportCopyFile> for PyReportCopyFile {
    fn from(report_copy: ReportCopyFile) -> Self {
        Self {
            status: report_copy.status.as_str().to_string(),
            path_src: report_copy
                .path_src
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            path_dst: report_copy
                .path_dst
                .as_ref()
                .map(|p| p.to_string_lossy().to_string()),
            n_bytes_copied: report_copy.n_bytes_copied,
            if_replaced: report_copy.if_replaced,
            summary: report_copy.to_string(),
        }
    }
}

#[pymethods]
impl PyReportCopyFile {
    #[getter]
    fn is_skipped(&self) -> bool {
        self.status == "skipped"
    }

    fn __str__(&self) -> String {
        self.summary.clone()
    }
}

fn map_copy_file_error(exception: CopyFileError) -> PyErr {
    match exception {
        CopyFileError::MissingDestination => PyValueError::new_err(exception.to_string()),
        CopyFileError::MissingArtifact { ref guidance } => {
            PyRuntimeError::new_err(format!("{exception} {guidance}"))
        }
        CopyFileError::DestinationExists { .. } => {
            PyFileExistsError::new_err(exception.to_string())
        }
        CopyFileError::CopyIo { .. } => PyOSError::new_err(exception.to_string()),
    }
}

#[pyfunction(name = "copy_file")]
#[pyo3(signature = (
    dest_file = None,
    source_file = None,
    artifact_file = None,
    overwrite = true,
    skip = false,
    preserve_metadata = false
))]
fn copy_file_py(
    py: Python<'_>,
    dest_file: Option<String>,
    source_file: Option<String>,
    artifact_file: Option<String>,
    overwrite: bool,
    skip: bool,
    preserve_metadata: bool,
) -> PyResult<PyReportCopyFile> {
    let spec_request = SpecCopyFileRequest {
        path_src: source_file.map(PathBuf::from),
        path_dst: dest_file.map(PathBuf::from),
        if_overwrite: overwrite,
        if_skip: skip,
        if_preserve_metadata: preserve_metadata,
    };
    let artifact = SpecArtifactFile::new(artifact_file.map(PathBuf::from));

    let report_copy = py.allow_threads(|| copy_file(&spec_request, &artifact));
    let report_copy = report_copy.map_err(map_copy_file_error)?;
    Ok(PyReportCopyFile::from(report_copy))
}

#[pymodule]
fn _artifactkit_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportCopyFile>()?;
    module.add_function(wrap_pyfunction!(copy_file_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}

use std::path::PathBuf;
use std::process::ExitCode;

use artifactkit_io_fs::{CopyFileError, ReportCopyFile, copy_file};
use artifactkit_log::init_logging;
use artifactkit_manifest::{ManifestError, SpecManifest};
use clap::{ArgAction, Parser};
use log::{debug, error, info};

/// Copy a file, or the project's main artifact, to a location.
///
/// Parameters come from the manifest, then `-D` properties, then flags;
/// later sources win.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Manifest with `[project]` and `[copyFile]` tables
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// File to copy (defaults to the project artifact)
    #[arg(long)]
    source_file: Option<PathBuf>,

    /// Copy target
    #[arg(long)]
    dest_file: Option<PathBuf>,

    /// Path of the project's built artifact
    #[arg(long)]
    artifact_file: Option<PathBuf>,

    /// Replace an existing destination file (default: true)
    #[arg(long, value_name = "BOOL")]
    overwrite: Option<bool>,

    /// Skip the step
    #[arg(long)]
    skip: bool,

    /// Carry timestamps and extended attributes over to the destination
    #[arg(long)]
    preserve_metadata: bool,

    /// Build-host property, e.g. `-D artifactkit.copyFile.skip=true`
    #[arg(short = 'D', long = "define", value_name = "KEY=VALUE", value_parser = parse_property)]
    properties: Vec<(String, String)>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, thiserror::Error)]
enum StepError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    #[error(transparent)]
    Copy(#[from] CopyFileError),
}

impl StepError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Manifest(_) => ExitCode::from(2),
            Self::Copy(_) => ExitCode::FAILURE,
        }
    }
}

fn parse_property(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got `{raw}`")),
    }
}

fn build_manifest(cli: &Cli) -> Result<SpecManifest, ManifestError> {
    let mut manifest = match &cli.manifest {
        Some(path_manifest) => {
            debug!("Loading manifest {}", path_manifest.display());
            SpecManifest::from_toml_file(path_manifest)?
        }
        None => SpecManifest::default(),
    };
    manifest.apply_properties(cli.properties.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

    if let Some(path_artifact) = &cli.artifact_file {
        manifest.project.artifact = Some(path_artifact.clone());
    }
    if let Some(path_src) = &cli.source_file {
        manifest.copy_file.source_file = Some(path_src.clone());
    }
    if let Some(path_dst) = &cli.dest_file {
        manifest.copy_file.dest_file = Some(path_dst.clone());
    }
    if let Some(if_overwrite) = cli.overwrite {
        manifest.copy_file.overwrite = if_overwrite;
    }
    if cli.skip {
        manifest.copy_file.skip = true;
    }
    if cli.preserve_metadata {
        manifest.copy_file.preserve_metadata = true;
    }
    Ok(manifest)
}

fn run(cli: &Cli) -> Result<ReportCopyFile, StepError> {
    let manifest = build_manifest(cli)?;
    let spec_request = manifest.copy_file.to_request();
    Ok(copy_file(&spec_request, &manifest.project)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            debug!("{report}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            if let StepError::Copy(copy_err) = &err {
                if let Some(guidance) = copy_err.guidance() {
                    info!("{guidance}");
                }
            }
            err.exit_code()
        }
    }
}

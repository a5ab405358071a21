//! Folder walking and the best-effort batch driver.
//!
//! ## Layout
//!
//! Single-folder mode reads images directly inside the input folder and writes
//! next to them:
//!
//! ```text
//! photos/
//! ├── beach.jpg
//! ├── notes.txt            # ignored: not an image
//! ├── raw/                 # ignored: subfolders are not descended into
//! └── output/              # created on demand
//!     └── beach.webp
//! ```
//!
//! Multi-folder mode applies the same to every immediate subfolder of a parent:
//!
//! ```text
//! trips/
//! ├── 2023-rome/
//! │   ├── 01.jpg
//! │   └── output/01.webp
//! └── 2024-oslo/
//!     ├── 01.png
//!     └── output/01.webp
//! ```
//!
//! ## Failure policy
//!
//! - A missing or non-folder input path is rejected before anything is written.
//! - A file that fails to decode or encode is logged, recorded in
//!   [`RunSummary::errors`], and skipped. So is a directory entry that cannot
//!   be read, such as a dangling symlink.
//! - An `output` folder that cannot be created stops that folder only. In
//!   multi-folder mode the remaining subfolders still run.
//!
//! Files are handled one at a time in file-name order.

use crate::config::{JobConfig, Mode};
use crate::imaging::{ImageBackend, RustBackend, optimize_image};
use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Input extensions picked up by the scan (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Name of the folder that receives optimized images.
pub const OUTPUT_DIR_NAME: &str = "output";

/// Extension of every written file.
pub const OUTPUT_EXTENSION: &str = "webp";

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Input folder not found: {0}")]
    InputNotFound(PathBuf),
    #[error("Input path is not a folder: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot create output folder {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot read folder {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// One file (or folder) that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileError {
    pub path: PathBuf,
    pub message: String,
}

/// Entries found directly inside a folder, plus the ones that could not be read.
#[derive(Debug, Default)]
pub struct FolderScan {
    pub paths: Vec<PathBuf>,
    pub unreadable: Vec<FileError>,
}

/// Outcome of one run, returned once the whole batch is done.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub images_processed: usize,
    pub folders_processed: usize,
    pub errors: Vec<FileError>,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn merge(&mut self, other: RunSummary) {
        self.images_processed += other.images_processed;
        self.folders_processed += other.folders_processed;
        self.errors.extend(other.errors);
    }
}

/// Run the batch in the mode the config asks for.
pub fn optimize(input: &Path, config: &JobConfig) -> Result<RunSummary, BatchError> {
    match config.mode {
        Mode::Single => optimize_single_folder(input, config),
        Mode::Multi => optimize_multiple_folders(input, config),
    }
}

/// Optimize every image directly inside `input_folder` into `input_folder/output`.
pub fn optimize_single_folder(
    input_folder: &Path,
    config: &JobConfig,
) -> Result<RunSummary, BatchError> {
    optimize_single_folder_with_backend(&RustBackend::new(), input_folder, config)
}

/// Optimize each immediate subfolder of `parent_folder` into its own `output` folder.
pub fn optimize_multiple_folders(
    parent_folder: &Path,
    config: &JobConfig,
) -> Result<RunSummary, BatchError> {
    optimize_multiple_folders_with_backend(&RustBackend::new(), parent_folder, config)
}

/// Single-folder run with a specific backend (allows testing with mock).
pub fn optimize_single_folder_with_backend(
    backend: &impl ImageBackend,
    input_folder: &Path,
    config: &JobConfig,
) -> Result<RunSummary, BatchError> {
    check_input_folder(input_folder)?;
    process_folder(backend, input_folder, config)
}

/// Multi-folder run with a specific backend (allows testing with mock).
pub fn optimize_multiple_folders_with_backend(
    backend: &impl ImageBackend,
    parent_folder: &Path,
    config: &JobConfig,
) -> Result<RunSummary, BatchError> {
    check_input_folder(parent_folder)?;

    let scan = collect_subfolders(parent_folder)?;
    let mut summary = RunSummary::default();
    record_unreadable(&mut summary, scan.unreadable);

    for folder in scan.paths {
        match process_folder(backend, &folder, config) {
            Ok(folder_summary) => summary.merge(folder_summary),
            Err(e) => {
                warn!(folder = %folder.display(), error = %e, "skipping folder");
                summary.errors.push(FileError {
                    path: folder,
                    message: e.to_string(),
                });
            }
        }
    }
    Ok(summary)
}

fn check_input_folder(path: &Path) -> Result<(), BatchError> {
    if !path.exists() {
        return Err(BatchError::InputNotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(BatchError::NotADirectory(path.to_path_buf()));
    }
    Ok(())
}

/// Optimize the images of one folder. Per-file failures land in the summary.
fn process_folder(
    backend: &impl ImageBackend,
    folder: &Path,
    config: &JobConfig,
) -> Result<RunSummary, BatchError> {
    let scan = collect_images(folder)?;

    let output_dir = folder.join(OUTPUT_DIR_NAME);
    fs::create_dir_all(&output_dir).map_err(|source| BatchError::OutputDir {
        path: output_dir.clone(),
        source,
    })?;

    info!(folder = %folder.display(), images = scan.paths.len(), "optimizing folder");

    let mut summary = RunSummary {
        folders_processed: 1,
        ..RunSummary::default()
    };
    record_unreadable(&mut summary, scan.unreadable);
    // Output name → the source that claimed it first
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for source in scan.paths {
        let output = output_path(&output_dir, &source);

        if let Some(first) = claimed.get(&output) {
            let message = format!(
                "output {} already written from {}",
                output.display(),
                first.display()
            );
            warn!(file = %source.display(), "{message}");
            summary.errors.push(FileError {
                path: source,
                message,
            });
            continue;
        }
        claimed.insert(output.clone(), source.clone());

        let params = config.optimize_params(source.clone(), output.clone());
        match optimize_image(backend, &params) {
            Ok(result) => {
                debug!(
                    file = %source.display(),
                    output = %output.display(),
                    from = %format!("{}x{}", result.original.width, result.original.height),
                    to = %format!("{}x{}", result.output.width, result.output.height),
                    bytes = result.bytes_written,
                    "optimized"
                );
                summary.images_processed += 1;
            }
            Err(e) => {
                warn!(file = %source.display(), error = %e, "failed to optimize image");
                summary.errors.push(FileError {
                    path: source,
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(summary)
}

fn record_unreadable(summary: &mut RunSummary, unreadable: Vec<FileError>) {
    for error in unreadable {
        warn!(file = %error.path.display(), error = %error.message, "cannot read entry");
        summary.errors.push(error);
    }
}

/// Image files directly inside `folder`, sorted by file name.
///
/// Unreadable entries with an image extension are returned in
/// [`FolderScan::unreadable`]; other unreadable entries are ignored like any
/// non-image file.
pub fn collect_images(folder: &Path) -> Result<FolderScan, BatchError> {
    let mut scan = FolderScan::default();
    for entry in list_dir(folder) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && is_image(entry.path()) {
                    scan.paths.push(entry.into_path());
                }
            }
            Err(err) => {
                let unreadable = entry_error(folder, err)?;
                if is_image(&unreadable.path) {
                    scan.unreadable.push(unreadable);
                }
            }
        }
    }
    Ok(scan)
}

/// Immediate subfolders of `parent`, sorted by name.
pub fn collect_subfolders(parent: &Path) -> Result<FolderScan, BatchError> {
    let mut scan = FolderScan::default();
    for entry in list_dir(parent) {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_dir() {
                    scan.paths.push(entry.into_path());
                }
            }
            Err(err) => scan.unreadable.push(entry_error(parent, err)?),
        }
    }
    Ok(scan)
}

/// A failure on one entry becomes a [`FileError`]. Failing to open `folder`
/// itself is fatal.
fn entry_error(folder: &Path, err: walkdir::Error) -> Result<FileError, BatchError> {
    if err.depth() == 0 {
        return Err(BatchError::ReadDir {
            path: folder.to_path_buf(),
            source: err,
        });
    }
    let path = err
        .path()
        .map_or_else(|| folder.to_path_buf(), Path::to_path_buf);
    Ok(FileError {
        path,
        message: err.to_string(),
    })
}

fn list_dir(path: &Path) -> walkdir::IntoIter {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
}

/// Whether the path has one of the accepted image extensions.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// `output_dir/<stem>.webp`, keeping any dots inside the stem.
pub fn output_path(output_dir: &Path, source: &Path) -> PathBuf {
    let mut name = source
        .file_stem()
        .map(OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".");
    name.push(OUTPUT_EXTENSION);
    output_dir.join(name)
}

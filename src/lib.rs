//! # Folder Optimizer
//!
//! Batch-resize the images in a folder and re-encode them as WebP.
//!
//! Point it at a folder and every JPEG, PNG, WebP, and BMP directly inside is
//! scaled to fit the configured limits, optionally stripped of metadata, and
//! written to an `output/` folder next to the originals. Point it at a parent
//! folder in multi-folder mode and the same happens inside each subfolder.
//!
//! ```text
//! optimize_single_folder(photos/, config)      photos/output/*.webp
//! optimize_multiple_folders(trips/, config)    trips/*/output/*.webp
//! ```
//!
//! Both return a [`batch::RunSummary`] with the number of images written and
//! the files that were skipped, and why.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`batch`] | Folder scan and the best-effort driver behind both entry points |
//! | [`imaging`] | Dimension fitting, the [`imaging::ImageBackend`] trait, the WebP backend |
//! | [`config`] | [`config::JobConfig`], TOML loading and validation |
//! | [`output`] | Summary formatting for the CLI |
//! | [`logging`] | `tracing` subscriber setup for the binary |
//!
//! # Design Decisions
//!
//! ## Best-Effort Batches
//!
//! One unreadable file never stops a run. Failures are logged as they happen
//! and collected into the summary, so callers can show them or ignore them.
//! Only an invalid input path aborts, and it does so before anything is
//! written.
//!
//! ## Counts Are Return Values
//!
//! Each call owns its own tally and hands it back. Nothing is global, so two
//! runs never see each other's numbers.
//!
//! ## Deterministic Order
//!
//! Folders and files are processed in file-name order, not in whatever order
//! the filesystem lists them, so runs and logs are reproducible.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod logging;
pub mod output;

pub use batch::{
    BatchError, FileError, RunSummary, optimize, optimize_multiple_folders, optimize_single_folder,
};
pub use config::{JobConfig, Mode};

#[cfg(test)]
pub(crate) mod test_helpers;

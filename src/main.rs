use clap::{Parser, Subcommand};
use folder_optimizer::config::{self, ConfigError, JobConfig, Mode};
use folder_optimizer::{batch, logging, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folder-optimizer")]
#[command(version)]
#[command(about = "Batch-resize images and re-encode them as WebP")]
#[command(long_about = "\
Batch-resize images and re-encode them as WebP

Every .jpg, .jpeg, .png, .webp and .bmp file directly inside the folder is
scaled, optionally stripped of metadata, and written to an output/ folder
beside the originals with a .webp extension. Other files and subfolders are
left alone.

  photos/                 folder-optimizer single photos/
  ├── beach.jpg
  ├── notes.txt           (ignored)
  └── output/
      └── beach.webp

  trips/                  folder-optimizer multi trips/
  ├── rome/output/*.webp
  └── oslo/output/*.webp

Sizing (aspect ratio is always kept):
  --max-width only        every image becomes exactly that wide
  --max-height only       every image becomes exactly that tall
  both                    images are fitted inside the box
  neither                 original size

Files that fail are reported at the end; the rest of the batch still runs.

Run 'folder-optimizer gen-config' for a documented config file.")]
struct Cli {
    /// TOML file with job defaults (flags override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// WebP quality, 0-100 [default: 85]
    #[arg(short, long, global = true, value_parser = clap::value_parser!(u32).range(0..=100))]
    quality: Option<u32>,

    /// Maximum output width in pixels
    #[arg(long, global = true)]
    max_width: Option<u32>,

    /// Maximum output height in pixels
    #[arg(long, global = true)]
    max_height: Option<u32>,

    /// Keep EXIF and ICC profile data instead of stripping it
    #[arg(long, global = true, conflicts_with = "strip_metadata")]
    keep_metadata: bool,

    /// Strip EXIF and ICC profile data even if the config file keeps it
    #[arg(long, global = true)]
    strip_metadata: bool,

    /// Write lossless WebP (quality is ignored)
    #[arg(long, global = true)]
    lossless: bool,

    /// Print the summary as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log every file, not just folders and failures
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize the images in one folder
    Single {
        /// Folder containing the images
        folder: PathBuf,
    },
    /// Optimize the images in every immediate subfolder
    Multi {
        /// Folder whose subfolders contain the images
        parent: PathBuf,
    },
    /// Print a config file with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let (input, mode) = match &cli.command {
        Command::Single { folder } => (folder.clone(), Mode::Single),
        Command::Multi { parent } => (parent.clone(), Mode::Multi),
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            return Ok(());
        }
    };

    logging::init(cli.verbose);

    let job = build_config(&cli, mode)?;
    let summary = batch::optimize(&input, &job)?;

    if cli.json {
        println!("{}", output::format_summary_json(&summary)?);
    } else {
        output::print_summary(&summary, &input);
    }

    Ok(())
}

/// Layer CLI flags over the config file (or stock defaults).
fn build_config(cli: &Cli, mode: Mode) -> Result<JobConfig, ConfigError> {
    let mut job = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => JobConfig::default(),
    };

    if let Some(quality) = cli.quality {
        job.quality = quality;
    }
    if cli.max_width.is_some() {
        job.max_width = cli.max_width;
    }
    if cli.max_height.is_some() {
        job.max_height = cli.max_height;
    }
    if cli.keep_metadata {
        job.strip_metadata = false;
    }
    if cli.strip_metadata {
        job.strip_metadata = true;
    }
    if cli.lossless {
        job.lossless = true;
    }
    job.mode = mode;

    job.validate()?;
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "folder-optimizer",
            "single",
            "photos",
            "-q",
            "70",
            "--max-width",
            "600",
            "--keep-metadata",
        ]);
        let job = build_config(&cli, Mode::Single).unwrap();
        assert_eq!(job.quality, 70);
        assert_eq!(job.max_width, Some(600));
        assert_eq!(job.max_height, None);
        assert!(!job.strip_metadata);
        assert!(!job.lossless);
    }

    #[test]
    fn flags_override_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("job.toml");
        std::fs::write(&path, "quality = 60\nmax_height = 300\nlossless = true\n").unwrap();

        let cli = Cli::parse_from([
            "folder-optimizer",
            "multi",
            "trips",
            "--config",
            path.to_str().unwrap(),
            "--max-height",
            "500",
        ]);
        let job = build_config(&cli, Mode::Multi).unwrap();
        assert_eq!(job.quality, 60);
        assert_eq!(job.max_height, Some(500));
        assert!(job.lossless);
        assert_eq!(job.mode, Mode::Multi);
    }

    #[test]
    fn strip_flag_overrides_config_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("job.toml");
        std::fs::write(&path, "strip_metadata = false\n").unwrap();
        let config = path.to_str().unwrap();

        let cli = Cli::parse_from(["folder-optimizer", "single", "photos", "--config", config]);
        assert!(!build_config(&cli, Mode::Single).unwrap().strip_metadata);

        let cli = Cli::parse_from([
            "folder-optimizer",
            "single",
            "photos",
            "--config",
            config,
            "--strip-metadata",
        ]);
        assert!(build_config(&cli, Mode::Single).unwrap().strip_metadata);
    }

    #[test]
    fn keep_and_strip_metadata_conflict() {
        let result = Cli::try_parse_from([
            "folder-optimizer",
            "single",
            "photos",
            "--keep-metadata",
            "--strip-metadata",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quality_out_of_range_rejected_by_parser() {
        let result = Cli::try_parse_from(["folder-optimizer", "single", "photos", "-q", "101"]);
        assert!(result.is_err());
    }
}

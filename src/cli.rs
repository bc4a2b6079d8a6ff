use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which of the three canonical crops to emit, as passed on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ModeArg {
    /// Center crop only (one output per image)
    #[value(name = "1", alias = "center")]
    CenterOnly,
    /// Start and end crops only (two outputs per image)
    #[value(name = "2", alias = "edges")]
    Edges,
    /// All three crops (three outputs per image)
    #[value(name = "3", alias = "all")]
    All,
}

#[derive(Parser, Debug)]
#[command(
    name = "trainset-processor",
    about = "Batch converter producing fixed 512x512 square training samples",
    long_about = "
Trainset Processor - Square Crop Generator

Converts every PNG/JPEG in the `raw` subdirectory of the batch root into
square 512x512 PNG samples. Vertical images yield start/center/end crops
(suffixes _S/_C/_E), horizontal images yield left/center/right crops
(suffixes _L/_C/_R); each crop is letterboxed onto a black square canvas
before the final resize. Outputs land in the batch root, next to `raw`.

Example Usage:
  # All three crops per image, reading ./raw, writing to .
  trainset-processor 3

  # Center crop only, 4 workers, explicit batch root
  trainset-processor 1 --workers 4 --input-dir ~/datasets/landscapes

  # Edge crops only, honoring EXIF rotation of phone photos
  trainset-processor 2 --exif-rotate --verbose"
)]
pub struct Args {
    /// Crop selection mode: 1 (center only), 2 (edges only), 3 (all three)
    #[arg(value_name = "MODE")]
    pub mode: ModeArg,

    /// Number of parallel workers (0 = auto-detect CPU cores)
    #[arg(short = 'w', long = "workers", default_value = "0", value_name = "N")]
    pub workers: usize,

    /// Batch root containing the `raw` input subdirectory (default: current directory)
    #[arg(short = 'i', long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Apply EXIF orientation to each image before choosing crop direction
    #[arg(long = "exif-rotate")]
    pub exif_rotate: bool,

    /// Enable verbose output with per-file progress information
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl Args {
    /// Resolved worker count: 0 means one worker per CPU core.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            num_cpus::get()
        } else {
            self.workers
        }
    }
}

#[cfg(test)]
impl Args {
    pub fn for_tests() -> Self {
        Self {
            mode: ModeArg::All,
            workers: 0,
            input_dir: None,
            exif_rotate: false,
            verbose: false,
        }
    }
}

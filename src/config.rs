//! Run configuration.
//!
//! A `FeedConfig` is resolved once at startup and is immutable for the run.
//! Values come from three layers, strongest first: command-line flags,
//! environment variables (handled by the CLI layer), and an optional JSON
//! config file. Anything still unset falls back to built-in defaults.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{FeedError, Result};

pub const DEFAULT_WIDTH: u32 = 640;
pub const DEFAULT_HEIGHT: u32 = 360;
pub const DEFAULT_DETECT_RATE: u32 = 10;

/// Frame pixel layout. Both variants are 4:2:0 chroma-subsampled, so a frame
/// occupies `width * height * 3 / 2` bytes.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    #[default]
    Nv12,
    I420,
}

impl PixelFormat {
    pub fn frame_bytes(&self, width: u32, height: u32) -> usize {
        match self {
            PixelFormat::Nv12 | PixelFormat::I420 => (width as usize * height as usize * 3) / 2,
        }
    }
}

/// How many loop iterations to run before a normal exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterationBudget {
    Unbounded,
    Frames(u64),
}

impl IterationBudget {
    /// True while another iteration fits in the budget.
    pub fn allows(&self, iterations_done: u64) -> bool {
        match self {
            IterationBudget::Unbounded => true,
            IterationBudget::Frames(limit) => iterations_done < *limit,
        }
    }

    /// Config-file encoding: any negative count means unbounded.
    pub fn from_file_value(raw: i64) -> Self {
        if raw < 0 {
            IterationBudget::Unbounded
        } else {
            IterationBudget::Frames(raw as u64)
        }
    }
}

impl FromStr for IterationBudget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "unbounded" | "inf" => Ok(IterationBudget::Unbounded),
            other => other
                .parse::<u64>()
                .map(IterationBudget::Frames)
                .map_err(|_| format!("expected a frame count, 'unbounded', or 'inf': {s:?}")),
        }
    }
}

impl fmt::Display for IterationBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IterationBudget::Unbounded => write!(f, "unbounded"),
            IterationBudget::Frames(limit) => write!(f, "{limit}"),
        }
    }
}

/// Where frame bytes come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSelect {
    /// One fixed file, reused every iteration.
    File(PathBuf),
    /// A directory of frame files, consumed round-robin.
    Directory(PathBuf),
}

/// Result sink encoding when an output path is configured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResultFormat {
    #[default]
    Text,
    Json,
}

/// Optional JSON config file. Every field may be omitted.
#[derive(Debug, Deserialize, Default)]
pub struct FeedConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    pixel_format: Option<PixelFormat>,
    detect_rate: Option<u32>,
    /// Frame count; negative means unbounded.
    count: Option<i64>,
    path: Option<PathBuf>,
    directory: Option<PathBuf>,
    result_output: Option<PathBuf>,
    result_format: Option<ResultFormat>,
}

/// Command-line values layered over the config file. `None` means the flag
/// was not given (and no environment variable supplied it).
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub pixel_format: Option<PixelFormat>,
    pub detect_rate: Option<u32>,
    pub count: Option<IterationBudget>,
    pub path: Option<PathBuf>,
    pub directory: Option<PathBuf>,
    pub result_output: Option<PathBuf>,
    pub result_format: Option<ResultFormat>,
}

#[derive(Clone, Debug)]
pub struct FeedConfig {
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub detect_rate: u32,
    /// `None` defers to the per-mode default: one frame in single-file mode,
    /// one full pass over the scanned list in directory mode.
    pub count: Option<IterationBudget>,
    pub input: InputSelect,
    pub result_output: Option<PathBuf>,
    pub result_format: ResultFormat,
}

impl FeedConfig {
    /// Merge CLI overrides onto an optional config file and validate. The
    /// input selection is taken as a unit: a CLI path or directory replaces
    /// whichever the file configured.
    pub fn resolve(cli: CliOverrides, file: FeedConfigFile) -> Result<Self> {
        let cli_input = select_input(cli.path, cli.directory)?;
        let input = match cli_input {
            Some(input) => Some(input),
            None => select_input(file.path, file.directory)?,
        };
        let Some(input) = input else {
            return Err(FeedError::Config(
                "either an input path or an input directory is required".to_string(),
            ));
        };

        let cfg = Self {
            width: cli.width.or(file.width).unwrap_or(DEFAULT_WIDTH),
            height: cli.height.or(file.height).unwrap_or(DEFAULT_HEIGHT),
            pixel_format: cli.pixel_format.or(file.pixel_format).unwrap_or_default(),
            detect_rate: cli
                .detect_rate
                .or(file.detect_rate)
                .unwrap_or(DEFAULT_DETECT_RATE),
            count: cli
                .count
                .or(file.count.map(IterationBudget::from_file_value)),
            input,
            result_output: cli.result_output.or(file.result_output),
            result_format: cli.result_format.or(file.result_format).unwrap_or_default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(FeedError::Config(format!(
                "frame dimensions must be non-zero (got {}x{})",
                self.width, self.height
            )));
        }
        if self.detect_rate == 0 {
            return Err(FeedError::InvalidRate(self.detect_rate));
        }
        Ok(())
    }

    /// Size of one frame in bytes for the configured geometry.
    pub fn frame_bytes(&self) -> usize {
        self.pixel_format.frame_bytes(self.width, self.height)
    }
}

fn select_input(path: Option<PathBuf>, directory: Option<PathBuf>) -> Result<Option<InputSelect>> {
    match (path, directory) {
        (Some(path), None) => Ok(Some(InputSelect::File(path))),
        (None, Some(dir)) => Ok(Some(InputSelect::Directory(dir))),
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(FeedError::Config(
            "input path and input directory are mutually exclusive".to_string(),
        )),
    }
}

pub fn read_config_file(path: &Path) -> Result<FeedConfigFile> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        FeedError::Config(format!("failed to read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw)
        .map_err(|e| FeedError::Config(format!("invalid config file {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_parses_counts_and_sentinels() {
        assert_eq!(
            "unbounded".parse::<IterationBudget>().unwrap(),
            IterationBudget::Unbounded
        );
        assert_eq!(
            "inf".parse::<IterationBudget>().unwrap(),
            IterationBudget::Unbounded
        );
        assert_eq!(
            "7".parse::<IterationBudget>().unwrap(),
            IterationBudget::Frames(7)
        );
        assert!("minus-one".parse::<IterationBudget>().is_err());
    }

    #[test]
    fn budget_allows_counts_below_limit() {
        let budget = IterationBudget::Frames(3);
        assert!(budget.allows(0));
        assert!(budget.allows(2));
        assert!(!budget.allows(3));
        assert!(IterationBudget::Unbounded.allows(u64::MAX - 1));
        assert!(!IterationBudget::Frames(0).allows(0));
    }

    #[test]
    fn negative_file_count_means_unbounded() {
        assert_eq!(
            IterationBudget::from_file_value(-1),
            IterationBudget::Unbounded
        );
        assert_eq!(
            IterationBudget::from_file_value(5),
            IterationBudget::Frames(5)
        );
    }

    #[test]
    fn frame_bytes_matches_chroma_subsampled_layout() {
        assert_eq!(PixelFormat::Nv12.frame_bytes(640, 360), 345_600);
        assert_eq!(PixelFormat::I420.frame_bytes(2, 2), 6);
    }

    #[test]
    fn resolve_applies_cli_over_file_over_default() {
        let file: FeedConfigFile = serde_json::from_str(
            r#"{ "width": 720, "detect_rate": 25, "path": "frames/a.yuv", "count": -1 }"#,
        )
        .unwrap();
        let cli = CliOverrides {
            detect_rate: Some(5),
            ..CliOverrides::default()
        };
        let cfg = FeedConfig::resolve(cli, file).unwrap();
        assert_eq!(cfg.width, 720);
        assert_eq!(cfg.height, DEFAULT_HEIGHT);
        assert_eq!(cfg.detect_rate, 5);
        assert_eq!(cfg.count, Some(IterationBudget::Unbounded));
        assert_eq!(cfg.input, InputSelect::File(PathBuf::from("frames/a.yuv")));
    }

    #[test]
    fn resolve_rejects_ambiguous_or_missing_input() {
        let both = CliOverrides {
            path: Some(PathBuf::from("a.yuv")),
            directory: Some(PathBuf::from("frames")),
            ..CliOverrides::default()
        };
        assert!(matches!(
            FeedConfig::resolve(both, FeedConfigFile::default()),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            FeedConfig::resolve(CliOverrides::default(), FeedConfigFile::default()),
            Err(FeedError::Config(_))
        ));
    }

    #[test]
    fn resolve_rejects_zero_rate_and_zero_dimensions() {
        let zero_rate = CliOverrides {
            path: Some(PathBuf::from("a.yuv")),
            detect_rate: Some(0),
            ..CliOverrides::default()
        };
        assert!(matches!(
            FeedConfig::resolve(zero_rate, FeedConfigFile::default()),
            Err(FeedError::InvalidRate(0))
        ));

        let zero_width = CliOverrides {
            path: Some(PathBuf::from("a.yuv")),
            width: Some(0),
            ..CliOverrides::default()
        };
        assert!(matches!(
            FeedConfig::resolve(zero_width, FeedConfigFile::default()),
            Err(FeedError::Config(_))
        ));
    }
}

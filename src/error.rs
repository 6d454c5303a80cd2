use std::path::PathBuf;
use thiserror::Error;

/// Fatal error classes for a feed run.
///
/// Per-frame I/O failures are intentionally absent: an unreadable frame file
/// is absorbed by substituting a blank frame and never stops the loop.
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("input path not found: {0}")]
    NotFound(PathBuf),

    #[error("no frame files found in directory: {0}")]
    EmptyDirectory(PathBuf),

    #[error("detect rate must be at least 1 frame/sec (got {0})")]
    InvalidRate(u32),

    #[error("frame buffer allocation of {0} bytes failed")]
    Allocation(usize),

    #[error("frame buffer used after release")]
    BufferReleased,

    #[error("frame buffer lock poisoned by engine worker")]
    BufferPoisoned,

    #[error("engine failed to start: {0}")]
    EngineStart(String),

    #[error("engine rejected frame {frame_id}: {reason}")]
    EngineSubmission { frame_id: u64, reason: String },

    #[error("feed loop thread panicked")]
    LoopPanicked,
}

/// Result type for feed operations.
pub type Result<T> = std::result::Result<T, FeedError>;

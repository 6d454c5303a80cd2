//! Frame input sources.
//!
//! A `FrameSource` decides which file supplies the next frame's bytes. Two
//! policies exist:
//! - single-file: one fixed path, reused indefinitely
//! - directory: a scanned, sorted list of frame files, consumed round-robin
//!
//! Selection is pure: `next_path` only moves the cursor. Reading the bytes is
//! the frame buffer's job.

use std::path::{Path, PathBuf};

use crate::error::{FeedError, Result};

/// File-extension suffixes that qualify as frame files, matched
/// case-insensitively during a directory scan.
pub const FRAME_FILE_EXTENSIONS: &[&str] = &["yuv"];

#[derive(Debug)]
pub struct FrameSource {
    policy: SourcePolicy,
}

#[derive(Debug)]
enum SourcePolicy {
    Single { path: PathBuf },
    Directory { files: Vec<PathBuf>, cursor: usize },
}

impl FrameSource {
    /// Open a single-file source. The path must exist and be a regular file.
    pub fn open_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(FeedError::NotFound(path));
        }
        Ok(Self {
            policy: SourcePolicy::Single { path },
        })
    }

    /// Scan `dir` for qualifying frame files and open a round-robin source.
    ///
    /// The list is collected once, sorted by path so the feed order is
    /// deterministic, and immutable afterwards.
    pub fn open_directory(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let entries = std::fs::read_dir(&dir).map_err(|_| FeedError::NotFound(dir.clone()))?;

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|_| FeedError::NotFound(dir.clone()))?;
            let path = entry.path();
            if path.is_file() && is_frame_file(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            return Err(FeedError::EmptyDirectory(dir));
        }
        files.sort();
        log::info!("found {} frame files in {}", files.len(), dir.display());

        Ok(Self {
            policy: SourcePolicy::Directory { files, cursor: 0 },
        })
    }

    /// Path to read for this iteration. Directory mode advances the cursor,
    /// wrapping modulo the list length; the sequence never exhausts.
    pub fn next_path(&mut self) -> &Path {
        match &mut self.policy {
            SourcePolicy::Single { path } => path,
            SourcePolicy::Directory { files, cursor } => {
                let index = *cursor;
                *cursor = (index + 1) % files.len();
                &files[index]
            }
        }
    }

    /// Number of distinct files this source cycles through.
    pub fn len(&self) -> usize {
        match &self.policy {
            SourcePolicy::Single { .. } => 1,
            SourcePolicy::Directory { files, .. } => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        // Construction rejects empty sources, so this never holds.
        self.len() == 0
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.policy, SourcePolicy::Directory { .. })
    }
}

fn is_frame_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    FRAME_FILE_EXTENSIONS
        .iter()
        .any(|candidate| ext.eq_ignore_ascii_case(candidate))
}

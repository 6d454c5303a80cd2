//! Single-slot reusable frame buffer.
//!
//! One region, sized to exactly one frame, is allocated before the loop
//! starts and overwritten every iteration. The completion gate guarantees the
//! engine has finished with the previous contents before the next `fill`, so
//! the region itself needs no per-frame allocation and no copying.

use std::io::Read;
use std::path::Path;

use crate::error::{FeedError, Result};

/// What `fill` put into the region for this iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillOutcome {
    /// `n` bytes were read from the file.
    Loaded(usize),
    /// The file could not be opened or read; the region was zero-filled.
    Blank,
}

pub struct FrameBuffer {
    region: Option<Vec<u8>>,
}

impl FrameBuffer {
    /// Allocate one region of exactly `size` bytes. Allocation failure is
    /// reported rather than aborting the process.
    pub fn acquire(size: usize) -> Result<Self> {
        let mut region = Vec::new();
        region
            .try_reserve_exact(size)
            .map_err(|_| FeedError::Allocation(size))?;
        region.resize(size, 0);
        Ok(Self {
            region: Some(region),
        })
    }

    /// Overwrite the region with the contents of `path`.
    ///
    /// An unopenable or unreadable file zero-fills the region and yields
    /// `Blank`; the caller logs it and the iteration proceeds. A read shorter
    /// than the region leaves the tail bytes from the previous iteration in
    /// place. This matches the long-standing behavior of the tool this
    /// replaces and is deliberate (see DESIGN.md).
    pub fn fill(&mut self, path: &Path) -> Result<FillOutcome> {
        let region = self.region.as_mut().ok_or(FeedError::BufferReleased)?;

        let mut file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(_) => {
                region.fill(0);
                return Ok(FillOutcome::Blank);
            }
        };
        match file.read(region) {
            Ok(n) => Ok(FillOutcome::Loaded(n)),
            Err(_) => {
                region.fill(0);
                Ok(FillOutcome::Blank)
            }
        }
    }

    /// Current frame bytes, `None` once released.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.region.as_deref()
    }

    /// Region size in bytes; zero once released.
    pub fn len(&self) -> usize {
        self.region.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the region to the allocator. Idempotent: extra calls are no-ops.
    pub fn release(&mut self) {
        self.region = None;
    }

    pub fn is_released(&self) -> bool {
        self.region.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn fill_reads_file_contents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.yuv");
        std::fs::write(&path, [7u8; 6]).expect("write fixture");

        let mut buf = FrameBuffer::acquire(6).expect("acquire");
        assert_eq!(buf.fill(&path).unwrap(), FillOutcome::Loaded(6));
        assert_eq!(buf.bytes().unwrap(), &[7u8; 6]);
    }

    #[test]
    fn short_read_leaves_previous_tail_in_place() {
        let dir = tempfile::tempdir().expect("tempdir");
        let full = dir.path().join("full.yuv");
        let short = dir.path().join("short.yuv");
        std::fs::write(&full, [0xAAu8; 8]).expect("write fixture");
        let mut f = std::fs::File::create(&short).expect("create fixture");
        f.write_all(&[0x11u8; 3]).expect("write fixture");

        let mut buf = FrameBuffer::acquire(8).expect("acquire");
        assert_eq!(buf.fill(&full).unwrap(), FillOutcome::Loaded(8));
        assert_eq!(buf.fill(&short).unwrap(), FillOutcome::Loaded(3));
        // First 3 bytes replaced, remaining 5 still from the previous frame.
        assert_eq!(buf.bytes().unwrap(), &[0x11, 0x11, 0x11, 0xAA, 0xAA, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn unreadable_path_zero_fills() {
        let dir = tempfile::tempdir().expect("tempdir");
        let full = dir.path().join("full.yuv");
        std::fs::write(&full, [0xAAu8; 4]).expect("write fixture");

        let mut buf = FrameBuffer::acquire(4).expect("acquire");
        assert_eq!(buf.fill(&full).unwrap(), FillOutcome::Loaded(4));
        assert_eq!(
            buf.fill(&dir.path().join("absent.yuv")).unwrap(),
            FillOutcome::Blank
        );
        assert_eq!(buf.bytes().unwrap(), &[0u8; 4]);
    }

    #[test]
    fn release_is_idempotent() {
        let mut buf = FrameBuffer::acquire(4).expect("acquire");
        assert!(!buf.is_released());
        buf.release();
        assert!(buf.is_released());
        assert_eq!(buf.bytes(), None);
        buf.release();
        assert!(buf.is_released());
    }

    #[test]
    fn fill_after_release_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.yuv");
        std::fs::write(&path, [1u8; 2]).expect("write fixture");

        let mut buf = FrameBuffer::acquire(2).expect("acquire");
        buf.release();
        assert!(matches!(buf.fill(&path), Err(FeedError::BufferReleased)));
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::buffer::FrameBuffer;
use crate::config::PixelFormat;
use crate::engine::result::FrameReport;

/// Shared handle to the single frame slot. The engine reads through it on its
/// own thread; ordering is enforced by the completion gate, so the lock is
/// uncontended in normal operation.
pub type FrameHandle = Arc<Mutex<FrameBuffer>>;

/// Everything the engine needs to interpret one submission, including the
/// originating file path so results can be attributed without shared state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Monotonically increasing, starting at 1 for the first frame.
    pub frame_id: u64,
    pub width: u32,
    pub height: u32,
    pub pixel_format: PixelFormat,
    pub source: PathBuf,
}

/// Hooks the engine invokes from its callback thread.
///
/// `on_release` is the buffer-reuse permission: it must do nothing but raise
/// the completion gate, and must never block on anything the feed loop
/// controls. `on_result` delivers the frame's report to the result sink.
pub struct EngineCallbacks {
    pub on_result: Box<dyn FnMut(FrameReport) + Send>,
    pub on_release: Box<dyn Fn() + Send>,
}

/// Asynchronous image-analysis engine seam.
///
/// Implementations own their callback-delivery thread. After a successful
/// `submit` they hold a reference to the frame until they have invoked
/// `on_result` and then `on_release` for it, exactly once each.
pub trait AnalysisEngine: Send {
    /// Engine identifier for logs.
    fn name(&self) -> &'static str;

    /// Bring the engine up and hand over the callbacks. Called once, before
    /// the first submission.
    fn start(&mut self, callbacks: EngineCallbacks) -> Result<()>;

    /// Queue one frame for analysis. Returns as soon as the frame is
    /// accepted; completion is reported through the callbacks. A submission
    /// error is fatal to the run.
    fn submit(&mut self, frame: FrameHandle, descriptor: FrameDescriptor) -> Result<()>;

    /// Tear the engine down, joining any outstanding callback delivery.
    fn shutdown(&mut self) -> Result<()>;
}

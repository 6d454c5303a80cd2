//! framepump
//!
//! A single-stream frame-feeding harness that drives an asynchronous
//! image-analysis engine at a bounded rate.
//!
//! # Architecture
//!
//! The harness enforces one invariant by construction: **at most one frame in
//! flight**. A single reusable buffer is filled, submitted, and not touched
//! again until the engine's release callback raises the completion gate. The
//! producer thread is the only one that ever blocks (in the gate wait and
//! the pacing sleep); the engine's callback thread only ever signals.
//!
//! # Module Structure
//!
//! - `config`: run configuration (geometry, rate, budget, input selection)
//! - `source`: input policies (fixed file vs. round-robin directory)
//! - `buffer`: the single-slot reusable frame buffer
//! - `gate`: completion gate between producer and callback thread
//! - `pace`: inter-frame pacing toward a target rate
//! - `engine`: the asynchronous engine seam, result model, and stub engine
//! - `sink`: result sinks (text report, JSON lines, log)
//! - `feed`: the orchestrating loop, its handle, and the stop flag

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod gate;
pub mod pace;
pub mod sink;
pub mod source;

pub use buffer::{FillOutcome, FrameBuffer};
pub use config::{
    CliOverrides, FeedConfig, FeedConfigFile, InputSelect, IterationBudget, PixelFormat,
    ResultFormat,
};
pub use engine::{
    AnalysisEngine, Corner, Detection, EngineCallbacks, EngineStatus, FrameDescriptor, FrameHandle,
    FrameReport, ObjectClass, StubEngine,
};
pub use error::FeedError;
pub use feed::{FeedHandle, FeedLoop, FeedOutcome, FeedSummary, RunState};
pub use gate::CompletionGate;
pub use pace::Pacer;
pub use sink::{JsonLinesSink, LogSink, ResultSink, TextFileSink};
pub use source::FrameSource;

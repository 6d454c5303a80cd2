//! Feed loop orchestration.
//!
//! `FeedLoop` ties the pieces together: pull the next path from the source,
//! fill the single frame slot, submit it to the engine, block on the
//! completion gate, pace, repeat, all under a shared stop flag and an
//! iteration budget. One frame is in flight at any time by construction:
//! the slot is not rewritten until the engine's release callback has raised
//! the gate.
//!
//! The loop passes through four phases: starting (allocate the slot, start
//! the engine), running (the iteration loop), stopping (engine shutdown joins
//! the outstanding callback, the slot is released), stopped (summary or fatal
//! error returned).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::buffer::{FillOutcome, FrameBuffer};
use crate::config::{FeedConfig, IterationBudget};
use crate::engine::{AnalysisEngine, EngineCallbacks, FrameDescriptor, FrameHandle};
use crate::error::{FeedError, Result};
use crate::gate::CompletionGate;
use crate::pace::Pacer;
use crate::sink::ResultSink;
use crate::source::FrameSource;

/// Shared run/stop control. Cloned into signal handlers and the loop thread;
/// once stop is requested, no further frames are submitted.
#[derive(Clone, Debug, Default)]
pub struct RunState {
    stop: Arc<AtomicBool>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Async-signal-friendly stop request: a single atomic store.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Why a run ended normally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedOutcome {
    BudgetExhausted,
    StopRequested,
}

#[derive(Clone, Debug)]
pub struct FeedSummary {
    pub frames_submitted: u64,
    pub outcome: FeedOutcome,
}

pub struct FeedLoop {
    config: FeedConfig,
    source: FrameSource,
    engine: Box<dyn AnalysisEngine>,
    sink: Box<dyn ResultSink>,
    run: RunState,
    pacer: Pacer,
    budget: IterationBudget,
}

impl FeedLoop {
    /// Assemble a loop. When the config leaves the budget unset, single-file
    /// mode defaults to one frame and directory mode to one full pass over
    /// the scanned list.
    pub fn new(
        config: FeedConfig,
        source: FrameSource,
        engine: Box<dyn AnalysisEngine>,
        sink: Box<dyn ResultSink>,
        run: RunState,
    ) -> Result<Self> {
        let pacer = Pacer::new(config.detect_rate)?;
        let budget = config.count.unwrap_or_else(|| {
            if source.is_directory() {
                IterationBudget::Frames(source.len() as u64)
            } else {
                IterationBudget::Frames(1)
            }
        });
        Ok(Self {
            config,
            source,
            engine,
            sink,
            run,
            pacer,
            budget,
        })
    }

    /// Run to completion on the calling thread.
    pub fn run(self) -> Result<FeedSummary> {
        let FeedLoop {
            config,
            mut source,
            mut engine,
            mut sink,
            run,
            pacer,
            budget,
        } = self;

        log::info!(
            "starting: {}x{} {:?}, {} files, rate {}/s (interval {} ms), budget {}",
            config.width,
            config.height,
            config.pixel_format,
            source.len(),
            config.detect_rate,
            pacer.interval().as_millis(),
            budget
        );

        let buffer: FrameHandle = Arc::new(Mutex::new(FrameBuffer::acquire(config.frame_bytes())?));
        let gate = Arc::new(CompletionGate::new());

        let release_gate = gate.clone();
        let callbacks = EngineCallbacks {
            on_result: Box::new(move |report| {
                if let Err(err) = sink.record(&report) {
                    log::warn!("result sink error: {err:#}");
                }
            }),
            // The release callback's whole job: grant the next buffer reuse.
            on_release: Box::new(move || release_gate.signal()),
        };
        engine
            .start(callbacks)
            .map_err(|e| FeedError::EngineStart(format!("{e:#}")))?;
        log::info!("running with engine '{}'", engine.name());

        let mut iterations_done: u64 = 0;
        let mut fatal: Option<FeedError> = None;

        while !run.stop_requested() && budget.allows(iterations_done) {
            let started = Instant::now();
            let frame_id = iterations_done + 1;
            let path = source.next_path().to_path_buf();

            match buffer.lock() {
                Ok(mut slot) => match slot.fill(&path) {
                    Ok(FillOutcome::Loaded(n)) => {
                        log::debug!("frame {frame_id}: read {n} bytes from {}", path.display());
                    }
                    Ok(FillOutcome::Blank) => {
                        log::warn!(
                            "frame {frame_id}: cannot read {}, feeding blank frame",
                            path.display()
                        );
                    }
                    Err(err) => {
                        fatal = Some(err);
                        break;
                    }
                },
                Err(_) => {
                    fatal = Some(FeedError::BufferPoisoned);
                    break;
                }
            }

            let descriptor = FrameDescriptor {
                frame_id,
                width: config.width,
                height: config.height,
                pixel_format: config.pixel_format,
                source: path,
            };
            if let Err(err) = engine.submit(buffer.clone(), descriptor) {
                fatal = Some(FeedError::EngineSubmission {
                    frame_id,
                    reason: format!("{err:#}"),
                });
                break;
            }

            // One wait per submission; the buffer is not touched again until
            // the engine's release callback has fired.
            gate.wait();

            pacer.pace(started);
            iterations_done += 1;
        }

        log::info!("stopping after {iterations_done} frame(s)");
        if let Err(err) = engine.shutdown() {
            log::warn!("engine shutdown: {err:#}");
        }
        buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .release();

        if let Some(err) = fatal {
            log::error!("feed loop failed: {err}");
            return Err(err);
        }

        let outcome = if run.stop_requested() && budget.allows(iterations_done) {
            FeedOutcome::StopRequested
        } else {
            FeedOutcome::BudgetExhausted
        };
        log::info!("stopped: {outcome:?}");
        Ok(FeedSummary {
            frames_submitted: iterations_done,
            outcome,
        })
    }

    /// Run on a dedicated thread; the handle stops and joins it.
    pub fn spawn(self) -> FeedHandle {
        let run = self.run.clone();
        let join = std::thread::spawn(move || self.run());
        FeedHandle {
            run,
            join: Some(join),
        }
    }
}

pub struct FeedHandle {
    run: RunState,
    join: Option<JoinHandle<Result<FeedSummary>>>,
}

impl FeedHandle {
    /// Request a stop; the loop honors it at the top of the next iteration.
    pub fn stop(&self) {
        self.run.request_stop();
    }

    /// Wait for the loop to finish and return its result.
    pub fn join(mut self) -> Result<FeedSummary> {
        match self.join.take() {
            Some(join) => join.join().map_err(|_| FeedError::LoopPanicked)?,
            None => Err(FeedError::LoopPanicked),
        }
    }
}

//! Stub analysis engine.
//!
//! Stands in for a vendor detection engine in tests and bench runs. It is a
//! real asynchronous consumer: submissions are queued to a worker thread that
//! optionally sleeps a configured latency, hashes the frame bytes to decide
//! whether the scene changed, synthesizes deterministic detections, and then
//! invokes the result and release callbacks in order, with the same thread
//! discipline a hardware engine's callback thread has.

use anyhow::{anyhow, bail, Result};
use sha2::{Digest, Sha256};
use std::sync::mpsc;
use std::sync::PoisonError;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::engine::contract::{AnalysisEngine, EngineCallbacks, FrameDescriptor, FrameHandle};
use crate::engine::result::{Corner, Detection, EngineStatus, FrameReport, ObjectClass};

pub struct StubEngine {
    latency: Duration,
    reject_after: Option<u64>,
    tx: Option<mpsc::Sender<Job>>,
    worker: Option<JoinHandle<()>>,
}

struct Job {
    frame: FrameHandle,
    descriptor: FrameDescriptor,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            reject_after: None,
            tx: None,
            worker: None,
        }
    }

    /// Simulated per-frame processing time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Reject any frame with an id greater than `frames`. Exercises the
    /// fatal-submission path.
    pub fn rejecting_after(mut self, frames: u64) -> Self {
        self.reject_after = Some(frames);
        self
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisEngine for StubEngine {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn start(&mut self, callbacks: EngineCallbacks) -> Result<()> {
        if self.worker.is_some() {
            bail!("stub engine already started");
        }
        let (tx, rx) = mpsc::channel::<Job>();
        let latency = self.latency;
        let worker = std::thread::spawn(move || worker_loop(rx, callbacks, latency));
        self.tx = Some(tx);
        self.worker = Some(worker);
        Ok(())
    }

    fn submit(&mut self, frame: FrameHandle, descriptor: FrameDescriptor) -> Result<()> {
        if let Some(limit) = self.reject_after {
            if descriptor.frame_id > limit {
                bail!("frame {} exceeds configured acceptance limit", descriptor.frame_id);
            }
        }
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| anyhow!("stub engine not started"))?;
        tx.send(Job { frame, descriptor })
            .map_err(|_| anyhow!("stub engine worker is gone"))
    }

    fn shutdown(&mut self) -> Result<()> {
        // Dropping the sender ends the worker loop once the queue drains.
        self.tx = None;
        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| anyhow!("stub engine worker panicked"))?;
        }
        Ok(())
    }
}

fn worker_loop(rx: mpsc::Receiver<Job>, mut callbacks: EngineCallbacks, latency: Duration) {
    let mut last_digest: Option<[u8; 32]> = None;
    while let Ok(job) = rx.recv() {
        if !latency.is_zero() {
            std::thread::sleep(latency);
        }
        let report = analyze(&job, &mut last_digest);
        (callbacks.on_result)(report);
        (callbacks.on_release)();
    }
}

fn analyze(job: &Job, last_digest: &mut Option<[u8; 32]>) -> FrameReport {
    let guard = job.frame.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(bytes) = guard.bytes() else {
        log::warn!("frame {} submitted on a released buffer", job.descriptor.frame_id);
        return FrameReport {
            descriptor: job.descriptor.clone(),
            status: EngineStatus::Failed,
            detections: Vec::new(),
        };
    };
    let digest: [u8; 32] = Sha256::digest(bytes).into();
    drop(guard);

    // Same trick as a hash-based motion stub: a changed digest means the
    // scene moved, which is when a detector would report an object.
    let moved = last_digest.is_some_and(|prev| prev != digest);
    *last_digest = Some(digest);

    let detections = if moved {
        vec![synthesize_detection(&digest, &job.descriptor)]
    } else {
        Vec::new()
    };
    FrameReport {
        descriptor: job.descriptor.clone(),
        status: EngineStatus::Completed,
        detections,
    }
}

fn synthesize_detection(digest: &[u8; 32], descriptor: &FrameDescriptor) -> Detection {
    let width = (descriptor.width as i32).max(2);
    let height = (descriptor.height as i32).max(2);
    let x0 = i32::from(digest[0]) % (width / 2);
    let y0 = i32::from(digest[1]) % (height / 2);
    let x1 = x0 + 1 + i32::from(digest[2]) % (width - x0 - 1).max(1);
    let y1 = y0 + 1 + i32::from(digest[3]) % (height - y0 - 1).max(1);

    Detection {
        top_left: Corner { x: x0, y: y0 },
        bottom_right: Corner { x: x1, y: y1 },
        object_id: u32::from(digest[4]),
        frame_id: descriptor.frame_id,
        score: u32::from(digest[5]) % 101,
        class: ObjectClass::from_code(1 + u32::from(digest[6]) % 11)
            .unwrap_or(ObjectClass::Person),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::FrameBuffer;
    use crate::config::PixelFormat;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    fn handle_with(bytes: &[u8]) -> FrameHandle {
        let mut buffer = FrameBuffer::acquire(bytes.len()).expect("acquire");
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("frame.yuv");
        std::fs::write(&path, bytes).expect("write fixture");
        buffer.fill(&path).expect("fill");
        Arc::new(Mutex::new(buffer))
    }

    fn descriptor(frame_id: u64) -> FrameDescriptor {
        FrameDescriptor {
            frame_id,
            width: 64,
            height: 48,
            pixel_format: PixelFormat::Nv12,
            source: PathBuf::from("frame.yuv"),
        }
    }

    #[test]
    fn changed_frames_produce_a_detection() {
        let mut last = None;
        let first = analyze(
            &Job {
                frame: handle_with(&[1u8; 16]),
                descriptor: descriptor(1),
            },
            &mut last,
        );
        assert_eq!(first.status, EngineStatus::Completed);
        assert!(first.detections.is_empty());

        let second = analyze(
            &Job {
                frame: handle_with(&[2u8; 16]),
                descriptor: descriptor(2),
            },
            &mut last,
        );
        assert_eq!(second.detections.len(), 1);
        let det = &second.detections[0];
        assert_eq!(det.frame_id, 2);
        assert!(det.score <= 100);
        assert!(det.bottom_right.x > det.top_left.x);
        assert!(det.bottom_right.y > det.top_left.y);
    }

    #[test]
    fn unchanged_frames_stay_quiet() {
        let mut last = None;
        for id in 1..=3 {
            let report = analyze(
                &Job {
                    frame: handle_with(&[9u8; 16]),
                    descriptor: descriptor(id),
                },
                &mut last,
            );
            assert!(report.detections.is_empty());
        }
    }

    #[test]
    fn submit_before_start_fails() {
        let mut engine = StubEngine::new();
        let err = engine
            .submit(handle_with(&[0u8; 4]), descriptor(1))
            .unwrap_err();
        assert!(err.to_string().contains("not started"));
    }

    #[test]
    fn rejection_knob_fails_late_frames() {
        let mut engine = StubEngine::new().rejecting_after(2);
        assert!(engine.submit(handle_with(&[0u8; 4]), descriptor(3)).is_err());
    }
}

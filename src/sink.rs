//! Result sinks.
//!
//! The engine's result callback hands each completed frame's report to a
//! sink. Sinks run on the engine's callback thread, so they must be quick and
//! must never block on the feed loop; a sink error is logged by the caller
//! and never stops the run.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::engine::{EngineStatus, FrameReport};

pub trait ResultSink: Send {
    fn record(&mut self, report: &FrameReport) -> Result<()>;
}

/// Plain-text report file, one block per frame.
///
/// The layout (a `File:` line, an `Object count:` line, one `Object i:` line
/// per detection, blank separator) is what downstream score-analysis tooling
/// parses, so the field order and the `code(LABEL)` class rendering are part
/// of the contract. Flushed per frame so a run cut short still leaves
/// complete blocks behind.
pub struct TextFileSink {
    out: BufWriter<File>,
}

impl TextFileSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to open result output {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }
}

impl ResultSink for TextFileSink {
    fn record(&mut self, report: &FrameReport) -> Result<()> {
        writeln!(self.out, "File: {}", report.descriptor.source.display())?;
        if report.detections.is_empty() {
            writeln!(self.out, "Object count: 0, not detected")?;
        } else {
            writeln!(self.out, "Object count: {}, detected", report.detections.len())?;
        }
        for (i, det) in report.detections.iter().enumerate() {
            writeln!(
                self.out,
                "Object {}: topLeft:[{},{}], bottomRight:[{},{}], objId: {}, frameId: {}, score: {}, type: {}({})",
                i,
                det.top_left.x,
                det.top_left.y,
                det.bottom_right.x,
                det.bottom_right.y,
                det.object_id,
                det.frame_id,
                det.score,
                det.class.code(),
                det.class.label(),
            )?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// One JSON object per completed frame, newline-delimited.
pub struct JsonLinesSink {
    out: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("failed to open result output {}", path.display()))?;
        Ok(Self {
            out: BufWriter::new(file),
        })
    }
}

impl ResultSink for JsonLinesSink {
    fn record(&mut self, report: &FrameReport) -> Result<()> {
        serde_json::to_writer(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Default sink when no output path is configured: reports go to the log.
pub struct LogSink;

impl ResultSink for LogSink {
    fn record(&mut self, report: &FrameReport) -> Result<()> {
        log::info!(
            "frame {} ({}): {} object(s), status {:?}",
            report.descriptor.frame_id,
            report.descriptor.source.display(),
            report.detections.len(),
            report.status
        );
        for det in &report.detections {
            log::debug!(
                "  objId {} type {} score {} box [{},{}]..[{},{}]",
                det.object_id,
                det.class.label(),
                det.score,
                det.top_left.x,
                det.top_left.y,
                det.bottom_right.x,
                det.bottom_right.y
            );
        }
        if report.status == EngineStatus::Failed {
            log::warn!("frame {} analysis failed", report.descriptor.frame_id);
        }
        Ok(())
    }
}

//! Progress hooks for the copy loop.
//!
//! The splitter never prints. Front-ends pass a [`ProgressSink`]; every hook has
//! a no-op default so sinks only implement what they display.

use tracing::{debug, info};

use crate::options::MIB;
use crate::resume::ResumeState;
use crate::splitter::SplitReport;

/// Snapshot taken after every block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockProgress {
    /// Part that received the last byte of the block.
    pub part: u32,
    /// Bytes in that part so far.
    pub part_bytes: u64,
    /// Bytes consumed from the source, including earlier runs.
    pub total_bytes: u64,
    pub source_len: u64,
}

pub trait ProgressSink {
    fn on_resume(&mut self, _state: &ResumeState, _source_len: u64) {}
    fn on_block(&mut self, _progress: &BlockProgress) {}
    fn on_part_complete(&mut self, _part: u32, _size: u64) {}
    fn on_finish(&mut self, _report: &SplitReport) {}
}

pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Reports through `tracing` events instead of a terminal UI.
#[derive(Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn on_resume(&mut self, state: &ResumeState, source_len: u64) {
        info!(
            resume_offset = state.resume_offset,
            part = state.current_part,
            source_len,
            "resuming from byte {} (part {:02})",
            state.resume_offset,
            state.current_part
        );
    }

    fn on_block(&mut self, p: &BlockProgress) {
        debug!(
            part = p.part,
            part_bytes = p.part_bytes,
            total_bytes = p.total_bytes,
            "part {:02}: {} copied",
            p.part,
            human_bytes(p.part_bytes)
        );
    }

    fn on_part_complete(&mut self, part: u32, size: u64) {
        info!(part, size, "part {:02} ready ({})", part, human_bytes(size));
    }

    fn on_finish(&mut self, report: &SplitReport) {
        info!(
            outcome = ?report.outcome,
            bytes_copied = report.bytes_copied,
            total_bytes = report.total_bytes,
            "split finished"
        );
    }
}

/// Size in MiB with two decimals, e.g. `12.50 MB`.
pub fn human_bytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / MIB as f64)
}

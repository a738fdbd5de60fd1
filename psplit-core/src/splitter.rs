//! Resumable, size-bounded copy of one source file into numbered parts.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::error::{Result, SplitError};
use crate::naming::PartNaming;
use crate::options::SplitOptions;
use crate::part::PartWriter;
use crate::progress::{BlockProgress, ProgressSink};
use crate::resume;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SplitOutcome {
    /// Source exhausted, every part flushed and closed.
    Completed,
    /// Existing parts already cover the source; nothing was written.
    AlreadyComplete,
    /// Stopped between blocks; the open part was flushed and closed.
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitReport {
    pub outcome: SplitOutcome,
    pub source_len: u64,
    pub resume_offset: u64,
    /// Bytes copied during this run.
    pub bytes_copied: u64,
    /// Bytes consumed from the source across all runs.
    pub total_bytes: u64,
    /// Parts closed during this run (full parts plus the final one).
    pub parts_completed: u32,
    pub last_part: Option<u32>,
}

/// Where the next byte goes. The writer is opened on first write so a run
/// with nothing to copy never touches the output directory.
struct Cursor {
    number: u32,
    len: u64,
    append: bool,
    writer: Option<PartWriter>,
}

pub struct Splitter {
    opts: SplitOptions,
    naming: PartNaming,
    cancel: CancelFlag,
}

impl Splitter {
    pub fn new(opts: SplitOptions) -> Self {
        let naming = opts.naming();
        Self {
            opts,
            naming,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn options(&self) -> &SplitOptions {
        &self.opts
    }

    pub fn run(&self, sink: &mut dyn ProgressSink) -> Result<SplitReport> {
        self.opts.validate()?;
        let max = self.opts.max_part_bytes;
        let source = &self.opts.source;
        let out_dir = &self.opts.output_dir;

        let mut src = File::open(source).map_err(|e| SplitError::source_file(source, e))?;
        let md = src
            .metadata()
            .map_err(|e| SplitError::source_file(source, e))?;
        if !md.is_file() {
            return Err(SplitError::source_file(
                source,
                std::io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let source_len = md.len();

        fs::create_dir_all(out_dir).map_err(|e| SplitError::output(out_dir, e))?;

        let mut state = resume::scan(out_dir, &self.naming, max, self.opts.strict_resume)?;
        debug!(
            parts = state.parts.len(),
            resume_offset = state.resume_offset,
            current_part = state.current_part,
            current_part_len = state.current_part_len,
            "scanned output directory"
        );

        if state.resume_offset > source_len {
            return Err(SplitError::InconsistentState(format!(
                "existing parts hold {} bytes but the source is only {} bytes",
                state.resume_offset, source_len
            )));
        }

        if state.resume_offset == source_len {
            drop_empty_trailing_part(&mut state)?;
        }
        sink.on_resume(&state, source_len);

        let mut report = SplitReport {
            outcome: SplitOutcome::Completed,
            source_len,
            resume_offset: state.resume_offset,
            bytes_copied: 0,
            total_bytes: state.resume_offset,
            parts_completed: 0,
            last_part: state.parts.last().map(|p| p.number),
        };

        if state.resume_offset == source_len {
            info!(source_len, "all bytes already split, nothing to do");
            report.outcome = SplitOutcome::AlreadyComplete;
            sink.on_finish(&report);
            return Ok(report);
        }

        src.seek(SeekFrom::Start(state.resume_offset))
            .map_err(|e| SplitError::source_file(source, e))?;

        let mut cur = Cursor {
            number: state.current_part,
            len: state.current_part_len,
            append: state.continues_last_part(),
            writer: None,
        };
        let mut buf = vec![0u8; self.opts.block_size];

        loop {
            if self.cancel.is_cancelled() {
                if let Some(w) = cur.writer.take() {
                    let size = w.finish()?;
                    debug!(part = cur.number, size, "closed open part on cancel");
                }
                warn!(total_bytes = report.total_bytes, "split cancelled");
                report.outcome = SplitOutcome::Cancelled;
                sink.on_finish(&report);
                return Ok(report);
            }

            let n = read_block(&mut src, &mut buf).map_err(|e| SplitError::source_file(source, e))?;
            if n == 0 {
                break;
            }

            let mut block = &buf[..n];
            let mut last = (cur.number, cur.len);
            while !block.is_empty() {
                let space = max - cur.len;
                let take = space.min(block.len() as u64) as usize;
                self.writer_for(&mut cur)?.write_all(&block[..take])?;
                cur.len += take as u64;
                block = &block[take..];
                report.bytes_copied += take as u64;
                report.total_bytes += take as u64;
                last = (cur.number, cur.len);

                if cur.len == max {
                    self.close_part(&mut cur, sink, &mut report)?;
                    cur.number += 1;
                    cur.len = 0;
                    cur.append = false;
                }
            }

            sink.on_block(&BlockProgress {
                part: last.0,
                part_bytes: last.1,
                total_bytes: report.total_bytes,
                source_len,
            });
        }

        if cur.writer.is_some() {
            self.close_part(&mut cur, sink, &mut report)?;
        }
        info!(
            bytes_copied = report.bytes_copied,
            parts_completed = report.parts_completed,
            "splitting completed"
        );
        sink.on_finish(&report);
        Ok(report)
    }

    fn writer_for<'a>(&self, cur: &'a mut Cursor) -> Result<&'a mut PartWriter> {
        match cur.writer {
            Some(ref mut w) => Ok(w),
            None => {
                let path = self.opts.output_dir.join(self.naming.file_name(cur.number));
                let w = if cur.append {
                    debug!(part = cur.number, len = cur.len, "reopening part for append");
                    PartWriter::open_append(&path, cur.number, cur.len)?
                } else {
                    debug!(part = cur.number, "starting part");
                    PartWriter::create(&path, cur.number)?
                };
                Ok(cur.writer.insert(w))
            }
        }
    }

    fn close_part(
        &self,
        cur: &mut Cursor,
        sink: &mut dyn ProgressSink,
        report: &mut SplitReport,
    ) -> Result<()> {
        if let Some(w) = cur.writer.take() {
            let number = w.number();
            let size = w.finish()?;
            sink.on_part_complete(number, size);
            report.parts_completed += 1;
            report.last_part = Some(number);
        }
        Ok(())
    }
}

/// A zero-length last part left behind by an interrupted run holds no data.
/// Once the source is fully covered it would only break the size bound, so
/// it is removed.
fn drop_empty_trailing_part(state: &mut resume::ResumeState) -> Result<()> {
    if let Some(last) = state.parts.last().filter(|p| p.len == 0) {
        fs::remove_file(&last.path).map_err(|e| SplitError::output(&last.path, e))?;
        info!(part = last.number, path = %last.path.display(), "removed empty trailing part");
        let number = last.number;
        state.parts.pop();
        state.current_part = number;
        state.current_part_len = 0;
    }
    Ok(())
}

/// Fill `buf` from `r`, stopping early only at end of input.
fn read_block<R: Read>(r: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(k) => filled += k,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

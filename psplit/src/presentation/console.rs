use indicatif::{ProgressBar, ProgressStyle};
use psplit_core::progress::human_bytes;
use psplit_core::{BlockProgress, ProgressSink, ResumeState, SplitOutcome, SplitReport};

/// Terminal progress: one bar over the whole source plus a line per finished part.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({percent}%) {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_resume(&mut self, state: &ResumeState, source_len: u64) {
        self.bar.set_length(source_len);
        self.bar.set_position(state.resume_offset);
        if !state.is_fresh() {
            self.bar.println(format!(
                "resuming from byte {} (part {:02}, {} parts complete)",
                state.resume_offset,
                state.current_part,
                state.completed_parts()
            ));
        }
    }

    fn on_block(&mut self, p: &BlockProgress) {
        self.bar.set_position(p.total_bytes);
        self.bar
            .set_message(format!("part {:02}: {} copied", p.part, human_bytes(p.part_bytes)));
    }

    fn on_part_complete(&mut self, part: u32, size: u64) {
        self.bar
            .println(format!("part {:02} ready ({})", part, human_bytes(size)));
    }

    fn on_finish(&mut self, report: &SplitReport) {
        self.bar.finish_and_clear();
        match report.outcome {
            SplitOutcome::Completed => println!(
                "splitting completed: {} copied, {} parts total",
                human_bytes(report.bytes_copied),
                report.last_part.unwrap_or(0)
            ),
            SplitOutcome::AlreadyComplete => println!(
                "nothing to do: all {} bytes already split into {} parts",
                report.source_len,
                report.last_part.unwrap_or(0)
            ),
            SplitOutcome::Cancelled => println!(
                "cancelled at byte {} of {}; run again to resume",
                report.total_bytes, report.source_len
            ),
        }
    }
}

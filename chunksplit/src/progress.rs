use std::time::Duration;

use chunksplit_core::{ChunkOutput, LogProgress, ProgressReporter, SplitReport};
use indicatif::{HumanDuration, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Terminal progress bar counting exported chunks.
///
/// Log lines are forwarded to [`LogProgress`] while the bar is suspended so
/// the two never interleave on stderr.
pub struct BarProgress {
    bar: ProgressBar,
    log: LogProgress,
}

impl BarProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_draw_target(ProgressDrawTarget::stderr());
        Self {
            bar,
            log: LogProgress,
        }
    }
}

impl ProgressReporter for BarProgress {
    fn start(&mut self, chunk_count: usize, source_duration: Duration) {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());

        self.bar.set_style(style);
        self.bar.set_length(chunk_count as u64);
        self.bar
            .set_message(format!("of {}", HumanDuration(source_duration)));
        self.bar.enable_steady_tick(Duration::from_millis(100));

        let log = &mut self.log;
        self.bar
            .suspend(|| log.start(chunk_count, source_duration));
    }

    fn chunk_written(&mut self, chunk: &ChunkOutput, chunk_count: usize) {
        let log = &mut self.log;
        self.bar.suspend(|| log.chunk_written(chunk, chunk_count));
        self.bar.inc(1);
    }

    fn finish(&mut self, report: &SplitReport) {
        self.bar.finish_and_clear();
        self.log.finish(report);
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

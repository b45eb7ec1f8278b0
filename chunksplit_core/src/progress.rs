use std::time::Duration;

use log::info;

use crate::{ChunkOutput, SplitReport};

/// Observer notified as a split advances.
///
/// Every method has an empty default, so reporters only implement the events
/// they care about.
pub trait ProgressReporter {
    /// Called once the input is decoded and the output directory exists.
    fn start(&mut self, _chunk_count: usize, _source_duration: Duration) {}

    /// Called after each chunk has been written to disk.
    fn chunk_written(&mut self, _chunk: &ChunkOutput, _chunk_count: usize) {}

    /// Called after the last chunk. Not called when the split fails.
    fn finish(&mut self, _report: &SplitReport) {}
}

/// Reporter that writes one `info` line per exported chunk.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn start(&mut self, chunk_count: usize, source_duration: Duration) {
        info!(
            "splitting {:.3}s of audio into {chunk_count} chunk(s)",
            source_duration.as_secs_f64()
        );
    }

    fn chunk_written(&mut self, chunk: &ChunkOutput, chunk_count: usize) {
        info!(
            "exported chunk {}/{chunk_count}: {}",
            chunk.index(),
            chunk.path.display()
        );
    }

    fn finish(&mut self, report: &SplitReport) {
        if report.chunks.is_empty() {
            info!("input is empty; no chunks were written");
        }
    }
}

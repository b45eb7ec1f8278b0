use std::time::Duration;

use crate::{AudioSplitError, OUTPUT_EXTENSION};

/// Half-open `[start_ms, end_ms)` interval of the source, numbered from 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkSpan {
    pub index: usize,
    pub start_ms: u64,
    pub end_ms: u64,
}

impl ChunkSpan {
    pub fn start(&self) -> Duration {
        Duration::from_millis(self.start_ms)
    }

    pub fn end(&self) -> Duration {
        Duration::from_millis(self.end_ms)
    }

    pub fn length(&self) -> Duration {
        Duration::from_millis(self.end_ms - self.start_ms)
    }
}

/// Partition `[0, total)` into consecutive spans of `chunk_length`.
///
/// Both durations are truncated to whole milliseconds. The last span is
/// shorter when `total` is not a multiple of `chunk_length`; an exact multiple
/// never produces an empty trailing span. An empty `total` yields no spans.
pub fn plan_chunks(
    total: Duration,
    chunk_length: Duration,
) -> Result<Vec<ChunkSpan>, AudioSplitError> {
    let chunk_ms = duration_to_millis(chunk_length);
    if chunk_ms == 0 {
        return Err(AudioSplitError::InvalidChunkLength);
    }

    let total_ms = duration_to_millis(total);
    let count = total_ms.div_ceil(chunk_ms);

    Ok((0..count)
        .map(|i| {
            let start_ms = i * chunk_ms;
            ChunkSpan {
                index: i as usize + 1,
                start_ms,
                end_ms: start_ms.saturating_add(chunk_ms).min(total_ms),
            }
        })
        .collect())
}

/// File name for chunk `index` of `total`: `<prefix>_<NN>.mp3`.
///
/// The index is zero padded to two digits, or wider when `total` needs more.
pub fn chunk_file_name(prefix: &str, index: usize, total: usize) -> String {
    let width = num_width(total as u64).max(2);
    format!("{prefix}_{index:0width$}.{OUTPUT_EXTENSION}")
}

fn duration_to_millis(duration: Duration) -> u64 {
    duration
        .as_millis()
        .min(u128::from(u64::MAX))
        .try_into()
        .unwrap_or(u64::MAX)
}

fn num_width(mut value: u64) -> usize {
    if value == 0 {
        return 1;
    }

    let mut width = 0;
    while value > 0 {
        value /= 10;
        width += 1;
    }
    width
}

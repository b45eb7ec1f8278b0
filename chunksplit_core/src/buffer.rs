use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Duration;

use log::debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};

use crate::{AudioSplitError, ChunkSpan};

/// Fully decoded audio held as interleaved `f32` samples.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
}

impl AudioBuffer {
    /// Wrap interleaved samples. Trailing samples that do not fill a whole
    /// frame are dropped.
    pub fn new(mut samples: Vec<f32>, sample_rate: u32, channels: usize) -> Self {
        let channels = channels.max(1);
        samples.truncate(samples.len() - samples.len() % channels);
        Self {
            samples,
            sample_rate: sample_rate.max(1),
            channels,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Length of the buffer, truncated to whole milliseconds.
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms())
    }

    fn duration_ms(&self) -> u64 {
        (self.frames() as u128 * 1_000 / u128::from(self.sample_rate)) as u64
    }

    /// Frame index at `ms`, clamped to the buffer.
    fn frame_at(&self, ms: u64) -> usize {
        let frame = u128::from(ms) * u128::from(self.sample_rate) / 1_000;
        frame.min(self.frames() as u128) as usize
    }

    /// Borrow the frames covered by `span`.
    ///
    /// Adjacent spans map to adjacent frame ranges. A span reaching the end
    /// of the buffer also takes the sub-millisecond remainder that
    /// [`AudioBuffer::duration`] truncates away.
    pub fn slice(&self, span: &ChunkSpan) -> AudioSlice<'_> {
        let start = self.frame_at(span.start_ms);
        let end = if span.end_ms >= self.duration_ms() {
            self.frames()
        } else {
            self.frame_at(span.end_ms)
        };
        let start = start.min(end);

        AudioSlice {
            samples: &self.samples[start * self.channels..end * self.channels],
            sample_rate: self.sample_rate,
            channels: self.channels,
        }
    }
}

/// Borrowed frame range of an [`AudioBuffer`].
#[derive(Clone, Copy, Debug)]
pub struct AudioSlice<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    channels: usize,
}

impl<'a> AudioSlice<'a> {
    /// Interleaved samples of the slice.
    pub fn samples(&self) -> &'a [f32] {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels
    }
}

/// Decode the first audio track of `path` into memory.
///
/// Packets the codec reports as corrupt are skipped; any other decoder or
/// container error aborts.
pub fn decode_file(path: &Path) -> Result<AudioBuffer, AudioSplitError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            AudioSplitError::InputNotFound(path.to_path_buf())
        }
        _ => AudioSplitError::Io(err),
    })?;

    let mut hint = Hint::new();
    if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
        hint.with_extension(extension);
    }

    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| match err {
            SymphoniaError::Unsupported(_) => AudioSplitError::UnsupportedFormat,
            other => AudioSplitError::from(other),
        })?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(AudioSplitError::MissingAudioTrack)?;
    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or(AudioSplitError::MissingSampleRate)?;
    let mut channels = params.channels.map(|channels| channels.count());

    let mut decoder = get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|err| match err {
            SymphoniaError::Unsupported(_) => AudioSplitError::UnsupportedCodec,
            other => AudioSplitError::from(other),
        })?;

    let mut samples = Vec::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(err)) if err.kind() == io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(err.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let needed = decoded.capacity() * spec.channels.count();
                channels.get_or_insert(spec.channels.count());

                if scratch.as_ref().map_or(true, |buf| buf.capacity() < needed) {
                    scratch = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = scratch.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                debug!("skipping undecodable packet: {reason}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    Ok(AudioBuffer::new(samples, sample_rate, channels.unwrap_or(1)))
}

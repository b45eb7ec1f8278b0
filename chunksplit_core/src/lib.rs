//! Decode an audio file and export it as a sequence of fixed-length MP3 chunks.
//!
//! The pipeline is synchronous: the whole input is decoded into an
//! [`AudioBuffer`], partitioned with [`plan_chunks`], and every chunk is
//! encoded to `<output_dir>/<prefix>_<NN>.mp3` in order.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use symphonia::core::errors::Error as SymphoniaError;
use thiserror::Error;

mod buffer;
mod encode;
mod plan;
mod progress;

pub use buffer::{decode_file, AudioBuffer, AudioSlice};
pub use encode::{encode_mp3, DEFAULT_BITRATE_KBPS, SUPPORTED_BITRATES_KBPS};
pub use plan::{chunk_file_name, plan_chunks, ChunkSpan};
pub use progress::{LogProgress, ProgressReporter};

/// Prefix used for generated file names unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "part";

/// Extension of every generated chunk, independent of the input format.
pub const OUTPUT_EXTENSION: &str = "mp3";

/// Errors that can occur while splitting audio files.
#[derive(Debug, Error)]
pub enum AudioSplitError {
    /// The input file is missing or cannot be opened for reading.
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Wrapper around errors produced by the Symphonia decoding library.
    #[error(transparent)]
    Symphonia(#[from] SymphoniaError),

    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No registered demuxer recognised the input container.
    #[error("input format is not supported")]
    UnsupportedFormat,

    /// The container does not expose any decodable audio track.
    #[error("input stream does not contain a decodable audio track")]
    MissingAudioTrack,

    /// The codec of the audio track cannot be handled.
    #[error("unsupported codec")]
    UnsupportedCodec,

    /// The decoder track lacks a sample rate.
    #[error("input stream does not advertise a sample rate")]
    MissingSampleRate,

    /// Chunks shorter than one millisecond cannot be planned.
    #[error("chunk length must be at least one millisecond")]
    InvalidChunkLength,

    /// The requested MP3 bitrate is not one LAME can produce.
    #[error("unsupported MP3 bitrate: {0} kbps")]
    UnsupportedBitrate(u32),

    /// The file name prefix is empty or would escape the output directory.
    #[error("invalid file name prefix '{0}'")]
    InvalidPrefix(String),

    /// The output path exists but is not a directory.
    #[error("output path is not a directory: {}", .0.display())]
    OutputNotDirectory(PathBuf),

    /// The MP3 encoder rejected its parameters or the samples.
    #[error("mp3 encoding failed: {0}")]
    Encode(String),
}

/// Coarse classification of [`AudioSplitError`] for presentation layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input file is missing or unreadable.
    InputNotFound,
    /// Any decode, slice, encode or export failure.
    Processing,
}

impl AudioSplitError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AudioSplitError::InputNotFound(_) => ErrorKind::InputNotFound,
            _ => ErrorKind::Processing,
        }
    }
}

/// Parameters of one split job.
#[derive(Clone, Debug)]
pub struct Config {
    /// Source file to split.
    pub input_path: PathBuf,
    /// Directory receiving the chunks. Created on demand.
    pub output_dir: PathBuf,
    /// Maximum length of every chunk. The final chunk may be shorter.
    pub chunk_length: Duration,
    /// Constant MP3 bitrate in kbps.
    pub bitrate_kbps: u32,
    /// Leading part of every generated file name.
    pub prefix: String,
}

impl Config {
    /// Construct a [`Config`] with the default bitrate and prefix.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        chunk_length: Duration,
    ) -> Result<Self, AudioSplitError> {
        Self::builder(input, output, chunk_length).build()
    }

    pub fn builder<P: AsRef<Path>, Q: AsRef<Path>>(
        input: P,
        output: Q,
        chunk_length: Duration,
    ) -> ConfigBuilder {
        ConfigBuilder {
            input_path: input.as_ref().to_path_buf(),
            output_dir: output.as_ref().to_path_buf(),
            chunk_length,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
            prefix: DEFAULT_PREFIX.to_owned(),
        }
    }

    /// Path of the chunk with the given 1-based `index` out of `total`.
    pub fn chunk_path(&self, index: usize, total: usize) -> PathBuf {
        self.output_dir
            .join(chunk_file_name(&self.prefix, index, total))
    }
}

/// Builder for [`Config`]; validation happens in [`ConfigBuilder::build`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    input_path: PathBuf,
    output_dir: PathBuf,
    chunk_length: Duration,
    bitrate_kbps: u32,
    prefix: String,
}

impl ConfigBuilder {
    pub fn bitrate(mut self, kbps: u32) -> Self {
        self.bitrate_kbps = kbps;
        self
    }

    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<Config, AudioSplitError> {
        if self.chunk_length < Duration::from_millis(1) {
            return Err(AudioSplitError::InvalidChunkLength);
        }

        if !SUPPORTED_BITRATES_KBPS.contains(&self.bitrate_kbps) {
            return Err(AudioSplitError::UnsupportedBitrate(self.bitrate_kbps));
        }

        if self.prefix.is_empty()
            || self.prefix.contains(['/', '\\'])
            || self.prefix == "."
            || self.prefix == ".."
        {
            return Err(AudioSplitError::InvalidPrefix(self.prefix));
        }

        Ok(Config {
            input_path: self.input_path,
            output_dir: self.output_dir,
            chunk_length: self.chunk_length,
            bitrate_kbps: self.bitrate_kbps,
            prefix: self.prefix,
        })
    }
}

/// One exported (or, for a dry run, planned) chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkOutput {
    pub span: ChunkSpan,
    pub path: PathBuf,
}

impl ChunkOutput {
    pub fn index(&self) -> usize {
        self.span.index
    }
}

/// Summary of a completed split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitReport {
    /// Duration of the decoded input, truncated to whole milliseconds.
    pub source_duration: Duration,
    /// Chunks in index order.
    pub chunks: Vec<ChunkOutput>,
}

/// Split `config.input_path`, logging one line per exported chunk.
pub fn run(config: Config) -> Result<SplitReport, AudioSplitError> {
    run_with_progress(config, &mut LogProgress)
}

/// Split `config.input_path`, reporting every exported chunk to `progress`.
///
/// The input is checked and decoded before the output directory is touched,
/// so a missing input leaves the file system unchanged. A failure midway
/// leaves the chunks written so far in place.
pub fn run_with_progress<R>(config: Config, progress: &mut R) -> Result<SplitReport, AudioSplitError>
where
    R: ProgressReporter + ?Sized,
{
    let buffer = load_input(&config.input_path)?;
    let source_duration = buffer.duration();
    let spans = plan_chunks(source_duration, config.chunk_length)?;
    let total = spans.len();

    prepare_output_dir(&config.output_dir)?;
    progress.start(total, source_duration);

    let mut chunks = Vec::with_capacity(total);
    for span in spans {
        let path = config.chunk_path(span.index, total);
        let slice = buffer.slice(&span);
        debug!(
            "encoding chunk {} ({} frames) to '{}'",
            span.index,
            slice.frames(),
            path.display()
        );
        encode_mp3(&slice, config.bitrate_kbps, &path)?;

        let output = ChunkOutput { span, path };
        progress.chunk_written(&output, total);
        chunks.push(output);
    }

    let report = SplitReport {
        source_duration,
        chunks,
    };
    progress.finish(&report);

    Ok(report)
}

/// Decode the input and list the chunks a split would write, without writing
/// anything or creating the output directory.
pub fn plan_outputs(config: &Config) -> Result<Vec<ChunkOutput>, AudioSplitError> {
    let buffer = load_input(&config.input_path)?;
    let spans = plan_chunks(buffer.duration(), config.chunk_length)?;
    let total = spans.len();

    Ok(spans
        .into_iter()
        .map(|span| ChunkOutput {
            path: config.chunk_path(span.index, total),
            span,
        })
        .collect())
}

fn load_input(path: &Path) -> Result<AudioBuffer, AudioSplitError> {
    if !path.is_file() {
        return Err(AudioSplitError::InputNotFound(path.to_path_buf()));
    }

    let buffer = decode_file(path)?;
    debug!(
        "decoded '{}': {} frames, {} Hz, {} channel(s)",
        path.display(),
        buffer.frames(),
        buffer.sample_rate(),
        buffer.channels()
    );
    Ok(buffer)
}

fn prepare_output_dir(dir: &Path) -> Result<(), AudioSplitError> {
    if dir.exists() && !dir.is_dir() {
        return Err(AudioSplitError::OutputNotDirectory(dir.to_path_buf()));
    }

    fs::create_dir_all(dir)?;
    Ok(())
}

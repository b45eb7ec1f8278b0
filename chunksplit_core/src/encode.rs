use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mp3lame_encoder::{
    max_required_buffer_size, Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality,
};

use crate::{AudioSlice, AudioSplitError};

/// Bitrate used when none is configured.
pub const DEFAULT_BITRATE_KBPS: u32 = 128;

/// Constant bitrates accepted by the encoder, in kbps.
pub const SUPPORTED_BITRATES_KBPS: [u32; 16] = [
    8, 16, 24, 32, 40, 48, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320,
];

// Upper bound LAME documents for the bytes emitted by a flush.
const FLUSH_RESERVE: usize = 7_200;

/// Encode `slice` as a constant bitrate MP3 at `path`, replacing any existing
/// file.
///
/// Mono input stays mono; anything wider is written as stereo from its first
/// two channels.
pub fn encode_mp3(slice: &AudioSlice<'_>, bitrate_kbps: u32, path: &Path) -> Result<(), AudioSplitError> {
    let bitrate = bitrate_from_kbps(bitrate_kbps)?;
    let channels = slice.channels().min(2);

    let mut builder = Builder::new()
        .ok_or_else(|| AudioSplitError::Encode("failed to allocate LAME encoder".to_owned()))?;
    builder.set_num_channels(channels as u8).map_err(encode_error)?;
    builder
        .set_sample_rate(slice.sample_rate())
        .map_err(encode_error)?;
    builder.set_brate(bitrate).map_err(encode_error)?;
    builder.set_quality(Quality::Good).map_err(encode_error)?;
    let mut encoder = builder.build().map_err(encode_error)?;

    let pcm = to_pcm_i16(slice, channels);
    let mut mp3 = Vec::with_capacity(max_required_buffer_size(pcm.len()) + FLUSH_RESERVE);

    if channels == 1 {
        encoder.encode_to_vec(MonoPcm(&pcm), &mut mp3)
    } else {
        encoder.encode_to_vec(InterleavedPcm(&pcm), &mut mp3)
    }
    .map_err(encode_error)?;

    mp3.reserve(FLUSH_RESERVE);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut mp3)
        .map_err(encode_error)?;

    let mut output = BufWriter::new(File::create(path)?);
    output.write_all(&mp3)?;
    output.flush()?;

    Ok(())
}

fn bitrate_from_kbps(kbps: u32) -> Result<Bitrate, AudioSplitError> {
    let bitrate = match kbps {
        8 => Bitrate::Kbps8,
        16 => Bitrate::Kbps16,
        24 => Bitrate::Kbps24,
        32 => Bitrate::Kbps32,
        40 => Bitrate::Kbps40,
        48 => Bitrate::Kbps48,
        64 => Bitrate::Kbps64,
        80 => Bitrate::Kbps80,
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => return Err(AudioSplitError::UnsupportedBitrate(other)),
    };
    Ok(bitrate)
}

/// Interleaved 16-bit PCM holding the first `channels` channels of every frame.
fn to_pcm_i16(slice: &AudioSlice<'_>, channels: usize) -> Vec<i16> {
    let source_channels = slice.channels();
    let mut pcm = Vec::with_capacity(slice.frames() * channels);

    for frame in slice.samples().chunks_exact(source_channels) {
        pcm.extend(frame[..channels].iter().map(|sample| sample_to_i16(*sample)));
    }
    pcm
}

fn sample_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}

fn encode_error<E: fmt::Display>(err: E) -> AudioSplitError {
    AudioSplitError::Encode(err.to_string())
}

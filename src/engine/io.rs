//! Audio file decoding for Promptmix
//!
//! Opens input files and converts them to the mixing format. WAV is read
//! with hound; everything else (MP3, FLAC, AAC/M4A, Ogg Vorbis) goes through
//! symphonia.
//!
//! Decoded audio is converted to the target channel layout first, then
//! resampled with linear interpolation. Resampler quality is not a concern
//! of the mixing pipeline.

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use hound::{SampleFormat, WavReader};
use log::debug;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::engine::format::AudioFormat;
use crate::engine::source::DecodedSource;
use crate::error::{MixError, Result};

/// Native properties of an audio file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInfo {
    /// Format as stored in the file
    pub format: AudioFormat,
    /// Duration at the native rate
    pub duration: Duration,
}

/// Interleaved samples exactly as decoded from the file
struct RawAudio {
    samples: Vec<f32>,
    format: AudioFormat,
}

/// Open an audio file and convert it to `target`
///
/// # Arguments
/// * `path` - Path to the audio file
/// * `target` - Sample rate and channel count the pipeline mixes at
///
/// # Errors
/// * `InputNotFound` - If the file is missing, unreadable, or undecodable
pub fn try_open(path: &Path, target: AudioFormat) -> Result<DecodedSource> {
    let raw = decode_file(path)?;
    debug!(
        "Decoded {} ({}, {} samples), converting to {}",
        path.display(),
        raw.format,
        raw.samples.len(),
        target
    );

    let mapped = convert_channels(&raw.samples, raw.format.channels, target.channels);
    let resampled = if raw.format.sample_rate != target.sample_rate {
        resample_interleaved(
            &mapped,
            target.channels,
            raw.format.sample_rate,
            target.sample_rate,
        )
    } else {
        mapped
    };

    Ok(DecodedSource::new(resampled, target))
}

/// Read an audio file's native format and duration
pub fn probe(path: &Path) -> Result<SourceInfo> {
    let raw = decode_file(path)?;
    let duration = raw.format.duration_of(raw.samples.len() as u64);
    Ok(SourceInfo {
        format: raw.format,
        duration,
    })
}

// ============================================================================
// Decoding
// ============================================================================

fn decode_file(path: &Path) -> Result<RawAudio> {
    if !path.is_file() {
        return Err(not_found(path, "no such file"));
    }

    let is_wav = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav") || e.eq_ignore_ascii_case("wave"))
        .unwrap_or(false);

    let raw = if is_wav {
        decode_wav(path)?
    } else {
        decode_compressed(path)?
    };

    if raw.format.channels == 0 || raw.format.sample_rate == 0 {
        return Err(not_found(path, "file reports no channels or zero sample rate"));
    }

    Ok(raw)
}

fn not_found(path: &Path, reason: impl Into<String>) -> MixError {
    MixError::InputNotFound {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn decode_wav(path: &Path) -> Result<RawAudio> {
    let reader = WavReader::open(path)
        .map_err(|e| not_found(path, format!("failed to open WAV file: {}", e)))?;

    let spec = reader.spec();
    let format = AudioFormat::new(spec.sample_rate, spec.channels);
    let samples = read_samples_as_f32(reader, spec.bits_per_sample, spec.sample_format)
        .map_err(|reason| not_found(path, reason))?;

    Ok(RawAudio { samples, format })
}

/// Read samples from WAV reader and convert to f32
fn read_samples_as_f32<R: std::io::Read>(
    mut reader: WavReader<R>,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> std::result::Result<Vec<f32>, String> {
    let collected: std::result::Result<Vec<f32>, hound::Error> = match (sample_format, bits_per_sample) {
        (SampleFormat::Float, _) => reader.samples::<f32>().collect(),
        (SampleFormat::Int, 1..=8) => {
            let scale = (1_i32 << (bits_per_sample - 1)) as f32;
            reader
                .samples::<i8>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
        (SampleFormat::Int, 9..=16) => {
            let scale = (1_i32 << (bits_per_sample - 1)) as f32;
            reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
        (SampleFormat::Int, 17..=32) => {
            let scale = (1_i64 << (bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
        (SampleFormat::Int, bits) => {
            return Err(format!("{}-bit integer audio is not supported", bits));
        }
    };

    collected.map_err(|e| format!("failed to read {}-bit samples: {}", bits_per_sample, e))
}

fn decode_compressed(path: &Path) -> Result<RawAudio> {
    let file = File::open(path).map_err(|e| not_found(path, e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| not_found(path, format!("unrecognized container: {}", e)))?;
    let mut reader = probed.format;

    let track = reader
        .default_track()
        .ok_or_else(|| not_found(path, "no audio track found"))?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| not_found(path, format!("unsupported codec: {}", e)))?;

    let mut format = AudioFormat::new(
        codec_params.sample_rate.unwrap_or(0),
        codec_params.channels.map(|c| c.count() as u16).unwrap_or(0),
    );
    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(not_found(path, format!("failed to read packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                format = AudioFormat::new(spec.rate, spec.channels.count() as u16);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend_from_slice(buffer.samples());
            }
            // Corrupt packets are skipped, the rest of the stream is still usable
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("Skipping undecodable packet in {}: {}", path.display(), e);
            }
            Err(e) => return Err(not_found(path, format!("decoder failed: {}", e))),
        }
    }

    Ok(RawAudio { samples, format })
}

// ============================================================================
// Format conversion
// ============================================================================

/// Convert interleaved audio between channel counts
///
/// Mono is duplicated into every output channel; when reducing, each output
/// channel averages the input channels that map onto it.
fn convert_channels(samples: &[f32], from: u16, to: u16) -> Vec<f32> {
    if from == to {
        return samples.to_vec();
    }

    let from = from as usize;
    let to = to as usize;
    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if from == 1 {
            out.extend(std::iter::repeat(frame[0]).take(to));
            continue;
        }
        for ch in 0..to {
            let (sum, count) = frame
                .iter()
                .enumerate()
                .filter(|(i, _)| i % to == ch)
                .fold((0.0_f32, 0_u32), |(s, c), (_, v)| (s + v, c + 1));
            out.push(if count == 0 { 0.0 } else { sum / count as f32 });
        }
    }

    out
}

/// Resample interleaved audio by linear interpolation between frames
fn resample_interleaved(samples: &[f32], channels: u16, source_rate: u32, target_rate: u32) -> Vec<f32> {
    let channels = channels as usize;
    let source_frames = samples.len() / channels;
    if source_frames == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let target_frames = ((source_frames as f64) * ratio).round() as usize;
    let mut output = Vec::with_capacity(target_frames * channels);

    for i in 0..target_frames {
        let src_pos = i as f64 / ratio;
        let src_idx = src_pos.floor() as usize;
        let frac = (src_pos - src_idx as f64) as f32;

        for ch in 0..channels {
            let sample = if src_idx + 1 < source_frames {
                let a = samples[src_idx * channels + ch];
                let b = samples[(src_idx + 1) * channels + ch];
                a * (1.0 - frac) + b * frac
            } else if src_idx < source_frames {
                samples[src_idx * channels + ch]
            } else {
                0.0
            };
            output.push(sample);
        }
    }

    output
}

// ============================================================================
// Tests
// ============================================================================

//! WAV encoding
//!
//! Converts the floating-point mix to the profile's bit depth and writes a
//! WAV container (canonical up to 16 bits, WAVE_FORMAT_EXTENSIBLE above).
//! This is the only place samples are clipped.

use std::fs;
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use log::debug;

use crate::engine::{AudioFormat, SampleSource};
use crate::error::{MixError, Result};
use crate::profile::Profile;

/// Frames pulled from the source per write
const BLOCK_FRAMES: usize = 4096;

/// Result of a completed encode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    /// Interleaved samples written
    pub samples_written: u64,
    /// Size of the finished file on disk
    pub bytes: u64,
}

/// Writes a `SampleSource` to a WAV file in a profile's format
#[derive(Debug, Clone)]
pub struct WavEncoder {
    format: AudioFormat,
    bit_depth: u16,
}

impl WavEncoder {
    /// Encoder for the given profile's rate, channels and bit depth
    pub fn new(profile: &Profile) -> Self {
        Self {
            format: profile.format(),
            bit_depth: profile.bit_depth,
        }
    }

    /// The hound spec this encoder writes
    ///
    /// # Errors
    /// * `EncodingFailure` - For bit depths other than 8, 16, 24 or 32
    pub fn spec(&self) -> Result<WavSpec> {
        let sample_format = match self.bit_depth {
            8 | 16 | 24 => SampleFormat::Int,
            32 => SampleFormat::Float,
            other => {
                return Err(MixError::EncodingFailure {
                    reason: format!("{}-bit output is not supported (use 8, 16, 24 or 32)", other),
                    source: None,
                })
            }
        };
        Ok(WavSpec {
            channels: self.format.channels,
            sample_rate: self.format.sample_rate,
            bits_per_sample: self.bit_depth,
            sample_format,
        })
    }

    /// Pull `total_samples` from `source` and write them to `path`
    ///
    /// The file is written next to `path` and renamed into place only when
    /// complete. On any failure the partial file is removed and nothing is
    /// left at `path`.
    ///
    /// # Errors
    /// * `FormatMismatch` - If the source's format differs from the profile's
    /// * `EncodingFailure` - If the file cannot be created or written
    pub fn encode<S>(&self, source: &mut S, total_samples: u64, path: &Path) -> Result<EncodeReport>
    where
        S: SampleSource + ?Sized,
    {
        if source.format() != self.format {
            return Err(MixError::FormatMismatch {
                expected: self.format.to_string(),
                found: source.format().to_string(),
            });
        }
        let spec = self.spec()?;
        let partial = partial_path(path);

        let written = match self.write_file(source, total_samples, &partial, spec) {
            Ok(written) => written,
            Err(e) => {
                let _ = fs::remove_file(&partial);
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, path) {
            let _ = fs::remove_file(&partial);
            return Err(MixError::encoding(
                format!("failed to move output into place at {}", path.display()),
                e,
            ));
        }

        let bytes = fs::metadata(path)
            .map_err(|e| MixError::encoding("failed to stat output file", e))?
            .len();

        debug!(
            "Encoded {} samples to {} ({} bytes)",
            written,
            path.display(),
            bytes
        );

        Ok(EncodeReport {
            samples_written: written,
            bytes,
        })
    }

    fn write_file<S>(&self, source: &mut S, total_samples: u64, path: &Path, spec: WavSpec) -> Result<u64>
    where
        S: SampleSource + ?Sized,
    {
        let mut writer = WavWriter::create(path, spec)
            .map_err(|e| MixError::encoding(format!("failed to create {}", path.display()), e))?;

        let block_len = BLOCK_FRAMES * self.format.channels as usize;
        let mut block = vec![0.0_f32; block_len];
        let mut written = 0_u64;

        while written < total_samples {
            let want = (total_samples - written).min(block_len as u64) as usize;
            let n = source.read(&mut block[..want])?;
            if n == 0 {
                break;
            }
            for &sample in &block[..n] {
                self.write_sample(&mut writer, sample)?;
            }
            written += n as u64;
        }

        writer
            .finalize()
            .map_err(|e| MixError::encoding("failed to finalize WAV header", e))?;
        Ok(written)
    }

    fn write_sample<W>(&self, writer: &mut WavWriter<W>, sample: f32) -> Result<()>
    where
        W: std::io::Write + std::io::Seek,
    {
        let sample = sample.clamp(-1.0, 1.0);
        let result = match self.bit_depth {
            8 => writer.write_sample((sample * 127.0).round() as i8),
            16 => writer.write_sample((sample * 32767.0).round() as i16),
            // 24-bit stored as i32 in hound
            24 => writer.write_sample((sample * 8_388_607.0).round() as i32),
            _ => writer.write_sample(sample),
        };
        result.map_err(|e| MixError::encoding("failed to write sample", e))
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

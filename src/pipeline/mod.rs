//! Mixing Pipeline
//!
//! Orchestrates one voice-over-music job:
//!
//! 1. Validate the request and resolve the profile
//! 2. Decode voice and music at the profile's rate and channel count
//! 3. Target duration = voice duration + buffer
//! 4. Check the music offset against the music length
//! 5. Estimate the output size and check it against the profile limit
//! 6. Skip the music offset, then loop (restarting at the offset) or cap
//!    the music at the target duration
//! 7. Apply voice and music gain
//! 8. Fade the music out over the buffer, if there is one
//! 9. Sum voice and music on a mix bus
//! 10. Encode exactly the target duration to WAV
//! 11. Re-check the real file size (warning only)

mod outcome;
mod request;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::engine::{
    try_open, AudioFormat, DecodedSource, SampleSource, SeekableSource, WavEncoder,
};
use crate::error::{MixError, Result};
use crate::estimate::{bytes_to_mb, check_size, validate_offset, validate_skip};
use crate::stages::{FadeOutStage, LoopStage, MixBus, OffsetStage, VolumeStage};

pub use outcome::{MixReport, MixingOutcome};
pub use request::{MixingRequest, DEFAULT_MUSIC_VOLUME, DEFAULT_VOICE_VOLUME};

/// Run a mixing request, converting every failure into a failed outcome
pub fn mix_audio_files(request: &MixingRequest) -> MixingOutcome {
    match try_mix_audio_files(request) {
        Ok(report) => {
            info!(
                "Mix complete: {} ({} bytes)",
                request.output_path.display(),
                report.output_bytes
            );
            MixingOutcome::succeeded(report)
        }
        Err(e) => {
            warn!("Mix failed [{}]: {}", e.error_code(), e);
            MixingOutcome::failed(&e, request.resolved_profile())
        }
    }
}

/// Run a mixing request, returning the first error encountered
pub fn try_mix_audio_files(request: &MixingRequest) -> Result<MixReport> {
    run(request).map_err(classify)
}

fn run(request: &MixingRequest) -> Result<MixReport> {
    let profile = request.validate()?;
    let format = profile.format();

    info!(
        "Mixing {} over {} -> {} ({})",
        request.voice_path.display(),
        request.music_path.display(),
        request.output_path.display(),
        profile.name
    );

    let voice = try_open(&request.voice_path, format)?;
    let music = try_open(&request.music_path, format)?;

    let voice_duration = voice.total_duration();
    let music_duration = music.total_duration();
    let buffer = request.buffer()?;
    let total_duration = voice_duration
        .checked_add(buffer)
        .ok_or_else(|| MixError::InvalidRequest {
            reason: format!("buffer of {}s is too long", request.buffer_secs),
        })?;
    debug!(
        "Voice {:.3}s, music {:.3}s, target {:.3}s",
        voice_duration.as_secs_f64(),
        music_duration.as_secs_f64(),
        total_duration.as_secs_f64()
    );

    validate_offset(music_duration, request.music_offset_secs)?;
    let offset = request.music_offset()?;
    validate_skip(format, music.total_samples(), offset)?;
    let estimated_bytes = check_size(total_duration, &profile)?;

    let target_samples = format.samples_for(total_duration);
    let (music_chain, loop_counter) = build_music_chain(music, offset, target_samples);

    let music_chain = VolumeStage::new(music_chain, request.music_volume);
    let music_chain: Box<dyn SampleSource> = if buffer > Duration::ZERO {
        Box::new(FadeOutStage::new(music_chain, voice_duration, total_duration))
    } else {
        Box::new(music_chain)
    };
    let voice_chain = VolumeStage::new(voice, request.voice_volume);

    let mut bus = mix_bus(format, Box::new(voice_chain), music_chain)?;

    let encoded = WavEncoder::new(&profile).encode(&mut bus, target_samples, &request.output_path)?;

    let music_loops = loops_done(loop_counter.as_deref());
    let warning = post_encode_warning(encoded.bytes, profile.max_file_size_mb);
    if let Some(message) = &warning {
        warn!("{}", message);
    }

    Ok(MixReport {
        voice_duration,
        total_duration,
        estimated_bytes,
        output_bytes: encoded.bytes,
        samples_written: encoded.samples_written,
        music_loops,
        profile,
        warning,
    })
}

/// Skip the offset, then loop or cap the music at `target_samples`
///
/// Returns the chain and, when it loops, a counter of the rewinds it makes.
fn build_music_chain(
    music: DecodedSource,
    offset: Duration,
    target_samples: u64,
) -> (Box<dyn SampleSource>, Option<Arc<AtomicU32>>) {
    let skipped = OffsetStage::new(music).skip(offset);
    let available = skipped.total_samples();

    if available < target_samples {
        let loops = planned_loops(available, target_samples);
        debug!(
            "Music has {} of {} samples after offset, looping {} times",
            available, target_samples, loops
        );
        // Position 0 of the skipped view is the offset in the music
        let stage = LoopStage::new(skipped, 0, target_samples);
        let counter = stage.restart_counter();
        let looped: Box<dyn SampleSource> = Box::new(stage);
        (looped, Some(counter))
    } else {
        debug!(
            "Music has {} samples after offset, capping at {}",
            available, target_samples
        );
        let capped: Box<dyn SampleSource> = Box::new(skipped.take_samples(target_samples));
        (capped, None)
    }
}

fn loops_done(counter: Option<&AtomicU32>) -> u32 {
    counter.map_or(0, |c| c.load(Ordering::Relaxed))
}

fn planned_loops(available: u64, target: u64) -> u32 {
    if available == 0 || available >= target {
        return 0;
    }
    (target.div_ceil(available) - 1) as u32
}

fn mix_bus(
    format: AudioFormat,
    voice: Box<dyn SampleSource>,
    music: Box<dyn SampleSource>,
) -> Result<MixBus> {
    let mut bus = MixBus::new(format).with_read_fully(true);
    bus.add_input(voice)?;
    bus.add_input(music)?;
    Ok(bus)
}

fn post_encode_warning(bytes: u64, limit_mb: u32) -> Option<String> {
    let actual_mb = bytes_to_mb(bytes);
    if actual_mb > limit_mb as u64 {
        Some(format!(
            "output is {} MB, above the profile limit of {} MB",
            actual_mb, limit_mb
        ))
    } else {
        None
    }
}

/// Fold errors outside the request taxonomy into `Unknown`
fn classify(err: MixError) -> MixError {
    match err {
        MixError::Io(e) => MixError::Unknown {
            reason: e.to_string(),
        },
        MixError::Serialization(e) => MixError::Unknown {
            reason: e.to_string(),
        },
        MixError::FormatMismatch { expected, found } => MixError::Unknown {
            reason: format!("stage format mismatch: expected {}, found {}", expected, found),
        },
        other => other,
    }
}

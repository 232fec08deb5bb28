//! Pipeline Integration Tests
//!
//! End-to-end tests for the mixing pipeline: WAV fixtures in, prompt out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use promptmix::engine::{read_to_end, try_open, AudioFormat, SeekableSource};
use promptmix::estimate::estimate_bytes;
use promptmix::stages::{FadeOutStage, LoopStage, OffsetStage, VolumeStage};
use promptmix::{mix_audio_files, MixingRequest, Profile};
use tempfile::{tempdir, TempDir};
use test_case::test_case;

const RATE: u32 = 8000;

/// Write a mono 16-bit fixture whose sample `i` is `f(i)`
fn write_fixture(dir: &Path, name: &str, secs: f64, f: impl Fn(usize) -> f32) -> PathBuf {
    let path = dir.join(name);
    let spec = WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).unwrap();
    let frames = (secs * RATE as f64).round() as usize;
    for i in 0..frames {
        writer.write_sample((f(i) * 32767.0) as i16).unwrap();
    }
    writer.finalize().unwrap();
    path
}

/// Voice: 300 Hz-ish square wave
fn voice_signal(i: usize) -> f32 {
    if (i / 13) % 2 == 0 {
        0.4
    } else {
        -0.4
    }
}

/// Music: slow sawtooth, distinct from the voice
fn music_signal(i: usize) -> f32 {
    ((i % 400) as f32 / 400.0) - 0.5
}

fn read_output(path: &Path) -> (WavSpec, Vec<i16>) {
    let mut reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    (spec, samples)
}

struct Fixture {
    dir: TempDir,
    voice: PathBuf,
    music: PathBuf,
}

impl Fixture {
    fn new(voice_secs: f64, music_secs: f64) -> Self {
        let dir = tempdir().unwrap();
        let voice = write_fixture(dir.path(), "voice.wav", voice_secs, voice_signal);
        let music = write_fixture(dir.path(), "music.wav", music_secs, music_signal);
        Self { dir, voice, music }
    }

    fn output(&self) -> PathBuf {
        self.dir.path().join("prompt.wav")
    }

    fn request(&self) -> MixingRequest {
        MixingRequest::new(&self.voice, &self.music, self.output())
    }
}

// === End-to-end ===

#[test]
fn test_voice_longer_than_music_loops_and_pads() {
    let fixture = Fixture::new(12.0, 5.0);
    let outcome = mix_audio_files(&fixture.request().with_buffer(3.0));

    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.voice_duration_secs, 12.0);
    assert_eq!(outcome.total_duration_secs, 15.0);
    // 15s from 5s of music: two rewinds
    assert_eq!(outcome.music_loops, 2);
    assert_eq!(
        outcome.output_bytes,
        estimate_bytes(Duration::from_secs(15), &Profile::default_profile())
    );

    let (spec, samples) = read_output(&fixture.output());
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(samples.len(), 15 * 8000);
}

#[test]
fn test_music_only_matches_processed_chain() {
    let fixture = Fixture::new(4.0, 1.5);
    let request = fixture
        .request()
        .with_volumes(0.0, 1.0)
        .with_music_offset(0.25)
        .with_buffer(2.0);
    let outcome = mix_audio_files(&request);
    assert!(outcome.success, "{:?}", outcome.error);

    // Rebuild the music chain by hand
    let format = AudioFormat::mono(RATE);
    let target = format.samples_for(Duration::from_secs(6));
    let music = try_open(&fixture.music, format).unwrap();
    let skipped = OffsetStage::new(music).skip(Duration::from_secs_f64(0.25));
    let looped = VolumeStage::new(LoopStage::new(skipped, 0, target), 1.0);
    let mut faded = FadeOutStage::new(looped, Duration::from_secs(4), Duration::from_secs(6));
    let expected: Vec<i16> = read_to_end(&mut faded)
        .unwrap()
        .into_iter()
        .map(|s| (s.clamp(-1.0, 1.0) * 32767.0).round() as i16)
        .collect();

    let (_, samples) = read_output(&fixture.output());
    assert_eq!(samples.len(), expected.len());
    for (i, (got, want)) in samples.iter().zip(expected.iter()).enumerate() {
        assert!(
            (*got as i32 - *want as i32).abs() <= 1,
            "sample {}: {} vs {}",
            i,
            got,
            want
        );
    }
}

#[test]
fn test_both_volumes_zero_is_silence_of_correct_length() {
    let fixture = Fixture::new(2.0, 3.0);
    let outcome = mix_audio_files(&fixture.request().with_volumes(0.0, 0.0).with_buffer(1.0));
    assert!(outcome.success, "{:?}", outcome.error);

    let (_, samples) = read_output(&fixture.output());
    assert_eq!(samples.len(), 3 * 8000);
    assert!(samples.iter().all(|s| *s == 0));
}

#[test]
fn test_voice_only_then_silence_when_music_muted() {
    let fixture = Fixture::new(1.0, 3.0);
    let outcome = mix_audio_files(&fixture.request().with_volumes(1.0, 0.0).with_buffer(0.5));
    assert!(outcome.success, "{:?}", outcome.error);

    let (_, samples) = read_output(&fixture.output());
    assert_eq!(samples.len(), 12_000);
    assert!(samples[..8000].iter().any(|s| *s != 0));
    assert!(samples[8000..].iter().all(|s| *s == 0));
}

#[test]
fn test_buffer_fades_music_to_silence() {
    let fixture = Fixture::new(1.0, 10.0);
    let music_gain_only = fixture.request().with_volumes(0.0, 1.0).with_buffer(2.0);
    let outcome = mix_audio_files(&music_gain_only);
    assert!(outcome.success, "{:?}", outcome.error);

    let (_, samples) = read_output(&fixture.output());
    let peak = |range: std::ops::Range<usize>| {
        samples[range].iter().map(|s| s.unsigned_abs()).max().unwrap()
    };

    let before_fade = peak(0..8000);
    let mid_fade = peak(15_200..16_800);
    let tail = peak(23_900..24_000);
    assert!(mid_fade < before_fade);
    assert!(tail < before_fade / 20);
}

#[test]
fn test_no_buffer_no_fade() {
    let fixture = Fixture::new(2.0, 5.0);
    let outcome = mix_audio_files(&fixture.request().with_volumes(0.0, 1.0));
    assert!(outcome.success, "{:?}", outcome.error);
    assert_eq!(outcome.total_duration_secs, 2.0);
    assert_eq!(outcome.music_loops, 0);

    let (_, samples) = read_output(&fixture.output());
    let expected_last = (music_signal(15_999) * 32767.0) as i16;
    assert!((samples[15_999] as i32 - expected_last as i32).abs() <= 2);
}

#[test]
fn test_stereo_profile_from_mono_inputs() {
    let fixture = Fixture::new(1.0, 1.0);
    let profile = Profile::new("CD Quality", 44100, 16, 2, 50);
    let outcome = mix_audio_files(&fixture.request().with_profile(profile));
    assert!(outcome.success, "{:?}", outcome.error);

    let (spec, samples) = read_output(&fixture.output());
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);
    assert_eq!(samples.len(), 2 * 44100);
}

#[test_case(0.5, 0.0 ; "no buffer")]
#[test_case(1.0, 0.25 ; "quarter second buffer")]
#[test_case(2.5, 4.0 ; "buffer longer than voice")]
fn test_total_duration_is_voice_plus_buffer(voice_secs: f64, buffer_secs: f64) {
    let fixture = Fixture::new(voice_secs, 1.0);
    let outcome = mix_audio_files(&fixture.request().with_buffer(buffer_secs));
    assert!(outcome.success, "{:?}", outcome.error);

    let one_sample = 1.0 / RATE as f64;
    assert!((outcome.total_duration_secs - (voice_secs + buffer_secs)).abs() <= one_sample);

    let (_, samples) = read_output(&fixture.output());
    let expected = ((voice_secs + buffer_secs) * RATE as f64).round() as usize;
    assert_eq!(samples.len(), expected);
}

#[test_case(24, 2 ; "24-bit stereo")]
#[test_case(32, 1 ; "32-bit mono")]
#[test_case(8, 1 ; "8-bit mono")]
fn test_output_size_matches_estimate(bit_depth: u16, channels: u16) {
    let fixture = Fixture::new(1.0, 1.0);
    let profile = Profile::new("Sized", RATE, bit_depth, channels, 10);
    let outcome = mix_audio_files(&fixture.request().with_profile(profile.clone()));
    assert!(outcome.success, "{:?}", outcome.error);

    let on_disk = std::fs::metadata(fixture.output()).unwrap().len();
    assert_eq!(on_disk, outcome.output_bytes);
    assert_eq!(on_disk, estimate_bytes(Duration::from_secs(1), &profile));
}

// === Failure outcomes ===

#[test]
fn test_unrepresentable_buffer_fails_without_panicking() {
    let fixture = Fixture::new(1.0, 1.0);
    let outcome = mix_audio_files(&fixture.request().with_buffer(1e30));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("INVALID_REQUEST"));
    assert!(!fixture.output().exists());
}

#[test]
fn test_huge_buffer_fails_size_check() {
    let fixture = Fixture::new(1.0, 1.0);
    let outcome = mix_audio_files(&fixture.request().with_buffer(1e12));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("SIZE_LIMIT_EXCEEDED"));
    assert!(!fixture.output().exists());
}

#[test]
fn test_offset_rounding_to_music_end_fails() {
    let fixture = Fixture::new(2.0, 1.0);
    // Below 1s, but rounds to a skip of all 8000 frames
    let request = fixture
        .request()
        .with_volumes(0.0, 1.0)
        .with_music_offset(0.99995);
    let outcome = mix_audio_files(&request);

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("INVALID_OFFSET"));
    assert_eq!(outcome.music_loops, 0);
    assert!(!fixture.output().exists());
}

#[test]
fn test_offset_at_music_end_fails() {
    let fixture = Fixture::new(2.0, 3.0);
    let outcome = mix_audio_files(&fixture.request().with_music_offset(3.0));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("INVALID_OFFSET"));
    assert!(!fixture.output().exists());
}

#[test]
fn test_missing_music_fails() {
    let fixture = Fixture::new(2.0, 3.0);
    let request = MixingRequest::new(&fixture.voice, fixture.dir.path().join("gone.wav"), fixture.output());
    let outcome = mix_audio_files(&request);

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("INPUT_NOT_FOUND"));
}

#[test]
fn test_size_limit_exceeded_fails_before_encoding() {
    let fixture = Fixture::new(6.0, 1.0);
    // 48 kHz × 4 bytes × 2 ch = 384,000 B/s; 6s ≈ 2 MB
    let profile = Profile::new("Tiny", 48000, 32, 2, 1);
    let outcome = mix_audio_files(&fixture.request().with_profile(profile.clone()));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("SIZE_LIMIT_EXCEEDED"));
    let error = outcome.error.unwrap();
    assert!(error.contains("2 MB"));
    assert!(error.contains("1 MB"));
    assert_eq!(outcome.used_profile, profile);
    assert!(!fixture.output().exists());
}

#[test]
fn test_invalid_profile_fails() {
    let fixture = Fixture::new(1.0, 1.0);
    let outcome = mix_audio_files(&fixture.request().with_profile(Profile::new("", 0, 16, 1, 10)));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("INVALID_PROFILE"));
    let error = outcome.error.unwrap();
    assert!(error.contains("sample rate"));
    assert!(error.contains("name"));
}

#[test]
fn test_unsupported_bit_depth_leaves_no_output() {
    let fixture = Fixture::new(1.0, 1.0);
    let profile = Profile::new("Twelve", 8000, 12, 1, 10);
    let outcome = mix_audio_files(&fixture.request().with_profile(profile));

    assert!(!outcome.success);
    assert_eq!(outcome.error_code.as_deref(), Some("ENCODING_FAILURE"));
    assert!(!fixture.output().exists());
}

#[test]
fn test_decoded_fixture_duration() {
    let fixture = Fixture::new(1.25, 1.0);
    let voice = try_open(&fixture.voice, AudioFormat::mono(RATE)).unwrap();
    assert_eq!(voice.total_duration(), Duration::from_secs_f64(1.25));
}

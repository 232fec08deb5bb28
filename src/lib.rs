//! Promptmix - Voice-over-Music Prompt Mixer
//!
//! Combines a foreground voice recording and a background music track into
//! a single IVR/PBX prompt file in a caller-chosen output format.
//!
//! # Architecture
//!
//! The core is a single-threaded, pull-based chain of sample transforms:
//! - `engine`: sample sources, decoding, WAV encoding
//! - `stages`: volume, offset, loop, fade-out and the mix bus
//! - `estimate`: output size estimation and pre-flight checks
//! - `pipeline`: request validation and orchestration
//!
//! Profiles (`profile`) describe output formats and can be persisted in a
//! JSON `ProfileStore`; the pipeline only ever reads them.

pub mod cli;
pub mod engine;
pub mod error;
pub mod estimate;
pub mod pipeline;
pub mod profile;
pub mod stages;

pub use error::{MixError, Result};
pub use pipeline::{mix_audio_files, try_mix_audio_files, MixingOutcome, MixingRequest};
pub use profile::{Profile, ProfileStore};

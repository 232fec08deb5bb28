//! Audio Engine Module
//!
//! Core audio plumbing for the mixing pipeline:
//! - Sample formats and duration/sample conversion
//! - The `SampleSource` pull abstraction
//! - File decoding and format conversion
//! - WAV encoding

pub mod encoder;
pub mod format;
pub mod io;
pub mod source;

pub use encoder::{EncodeReport, WavEncoder};
pub use format::AudioFormat;
pub use io::{probe, try_open, SourceInfo};
pub use source::{read_to_end, DecodedSource, SampleSource, SeekableSource};

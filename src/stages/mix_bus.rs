//! Mix Bus
//!
//! Sums same-format sources sample-by-sample. Sums stay in floating point;
//! clipping only happens at final encoding.

use log::debug;

use crate::engine::{AudioFormat, SampleSource};
use crate::error::{MixError, Result};

/// Sums any number of same-format sources into one stream
///
/// Every pull requests the same count from each input. An input that comes
/// up short contributes silence for the rest of that read, so one exhausted
/// input never ends the stream while others are still producing.
pub struct MixBus {
    format: AudioFormat,
    inputs: Vec<Box<dyn SampleSource>>,
    read_fully: bool,
    scratch: Vec<f32>,
}

impl std::fmt::Debug for MixBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixBus")
            .field("format", &self.format)
            .field("inputs", &self.inputs.len())
            .field("read_fully", &self.read_fully)
            .finish()
    }
}

impl MixBus {
    /// Create an empty bus at `format`
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            inputs: Vec::new(),
            read_fully: false,
            scratch: Vec::new(),
        }
    }

    /// Always fill the whole request, padding with silence
    ///
    /// Without this the bus returns the longest input's count, and 0 once
    /// every input is exhausted.
    pub fn with_read_fully(mut self, read_fully: bool) -> Self {
        self.read_fully = read_fully;
        self
    }

    /// Add an input; its format must match the bus
    pub fn add_input(&mut self, input: Box<dyn SampleSource>) -> Result<()> {
        if input.format() != self.format {
            return Err(MixError::FormatMismatch {
                expected: self.format.to_string(),
                found: input.format().to_string(),
            });
        }
        self.inputs.push(input);
        debug!("Mix bus input #{} added ({})", self.inputs.len(), self.format);
        Ok(())
    }

    /// Number of inputs
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }
}

impl SampleSource for MixBus {
    fn format(&self) -> AudioFormat {
        self.format
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        let count = self.format.align(buf.len());
        buf[..count].fill(0.0);

        if self.scratch.len() < count {
            self.scratch.resize(count, 0.0);
        }

        let mut longest = 0;
        for input in self.inputs.iter_mut() {
            let scratch = &mut self.scratch[..count];
            let mut filled = 0;
            // Keep pulling until the input fills the request or reports exhaustion
            while filled < count {
                let n = input.read(&mut scratch[filled..])?;
                if n == 0 {
                    break;
                }
                filled += n;
            }

            for (out, sample) in buf[..filled].iter_mut().zip(scratch[..filled].iter()) {
                *out += *sample;
            }
            longest = longest.max(filled);
        }

        if self.read_fully {
            Ok(count)
        } else {
            Ok(longest)
        }
    }
}

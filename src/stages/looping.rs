//! Loop Stage
//!
//! Extends a bounded source to an exact target length by rewinding it to a
//! restart position whenever it runs dry.
//!
//! States:
//! - Streaming: pull from the source and count emitted samples
//! - Exhausted: the source returned 0 before the target; seek to the
//!   restart position and resume streaming
//! - Finished: `emitted == target`; every further read returns 0
//!
//! Looping requires `SeekableSource`, so a source that cannot be rewound
//! is rejected at compile time instead of being silently truncated.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::engine::{AudioFormat, SampleSource, SeekableSource};
use crate::error::Result;

/// Repeats a seekable source until exactly `target_samples` are emitted
#[derive(Debug)]
pub struct LoopStage<S> {
    source: S,
    restart_position: u64,
    target_samples: u64,
    emitted: u64,
    restarts: Arc<AtomicU32>,
    /// Set when the loop region produced nothing after a restart
    stalled: bool,
}

impl<S: SeekableSource> LoopStage<S> {
    /// Loop `source` to `target_samples`, rewinding to `restart_position`
    ///
    /// # Arguments
    /// * `source` - Seekable source to repeat
    /// * `restart_position` - Sample position (in the source's coordinates)
    ///   to rewind to on exhaustion
    /// * `target_samples` - Exact number of samples to emit
    pub fn new(source: S, restart_position: u64, target_samples: u64) -> Self {
        let restart_position = source.format().align(restart_position as usize) as u64;
        Self {
            source,
            restart_position,
            target_samples,
            emitted: 0,
            restarts: Arc::new(AtomicU32::new(0)),
            stalled: false,
        }
    }

    /// Loop `source` for `target`, rewinding to `restart_at`
    pub fn with_durations(source: S, restart_at: Duration, target: Duration) -> Self {
        let format = source.format();
        Self::new(source, format.samples_for(restart_at), format.samples_for(target))
    }

    /// Samples emitted so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Total samples this stage will emit
    pub fn target_samples(&self) -> u64 {
        self.target_samples
    }

    /// How many times the source has been rewound
    pub fn restarts(&self) -> u32 {
        self.restarts.load(Ordering::Relaxed)
    }

    /// Shared restart count, readable after the stage is moved into a chain
    pub fn restart_counter(&self) -> Arc<AtomicU32> {
        Arc::clone(&self.restarts)
    }

    /// True once the target has been reached or the loop region is empty
    pub fn is_finished(&self) -> bool {
        self.emitted >= self.target_samples || self.stalled
    }

    fn restart(&mut self) -> Result<()> {
        self.source.seek(self.restart_position)?;
        let restarts = self.restarts.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(
            "Loop restart #{} at sample {} ({} of {} emitted)",
            restarts, self.restart_position, self.emitted, self.target_samples
        );
        Ok(())
    }
}

impl<S: SeekableSource> SampleSource for LoopStage<S> {
    fn format(&self) -> AudioFormat {
        self.source.format()
    }

    fn read(&mut self, buf: &mut [f32]) -> Result<usize> {
        if self.is_finished() {
            return Ok(0);
        }

        let remaining = self.target_samples - self.emitted;
        let want = (buf.len() as u64).min(remaining) as usize;
        let mut filled = 0;
        let mut read_since_restart = true;

        while filled < want {
            let n = self.source.read(&mut buf[filled..want])?;
            if n > 0 {
                filled += n;
                read_since_restart = true;
                continue;
            }

            if !read_since_restart {
                warn!(
                    "Loop region starting at sample {} is empty; stopping at {} of {} samples",
                    self.restart_position,
                    self.emitted + filled as u64,
                    self.target_samples
                );
                self.stalled = true;
                break;
            }

            self.restart()?;
            read_since_restart = false;
        }

        self.emitted += filled as u64;
        Ok(filled)
    }
}

//! Audio session settings.
//!
//! Sample rate, frames per period and periods per buffer are fixed for the
//! life of a stream. Settings that are legal but risky produce
//! [`SessionWarning`]s instead of errors.

use std::fmt;
use std::time::Duration;

use crate::validation::{ValidationError, ValidationResult};

/// Lowest accepted sample rate in Hz.
pub const MIN_SAMPLE_RATE: u32 = 44100;
/// Block sizes below this may not suit USB interfaces.
pub const RECOMMENDED_BLOCK_SIZE: usize = 64;
/// Periods per buffer recommended for USB interfaces.
pub const RECOMMENDED_PERIODS: u32 = 3;
/// Just-noticeable round-trip latency in milliseconds.
pub const MAX_LATENCY_MS: f32 = 6.0;

/// Interface settings for one stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Frames per period; every stage processes blocks of this length.
    pub block_size: usize,
    /// Periods per device buffer.
    pub periods: u32,
    /// Input device name, or the host default.
    pub input_device: Option<String>,
    /// Output device name, or the host default.
    pub output_device: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            block_size: 64,
            periods: RECOMMENDED_PERIODS,
            input_device: None,
            output_device: None,
        }
    }
}

/// Legal settings worth telling the operator about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionWarning {
    /// Block shorter than the recommended size.
    SmallBlock(usize),
    /// Period count other than the recommended one.
    Periods(u32),
    /// Sample rate other than 44.1 or 48 kHz.
    UnusualSampleRate(u32),
    /// Buffer latency above the just-noticeable difference.
    HighLatency(f32),
}

impl fmt::Display for SessionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionWarning::SmallBlock(n) => write!(
                f,
                "check current block length ({n} frames) is compatible with the audio interface"
            ),
            SessionWarning::Periods(p) => write!(
                f,
                "{RECOMMENDED_PERIODS} periods recommended for USB audio interfaces (currently set at {p})"
            ),
            SessionWarning::UnusualSampleRate(fs) => write!(
                f,
                "check current sampling rate ({fs} Hz) is compatible with the audio interface"
            ),
            SessionWarning::HighLatency(ms) => write!(
                f,
                "latency ({ms:.2} ms) is more than the just noticeable difference ({MAX_LATENCY_MS} ms); possible audible lag"
            ),
        }
    }
}

impl SessionConfig {
    /// Reject settings no stream can run with.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.sample_rate < MIN_SAMPLE_RATE {
            return Err(ValidationError::InvalidSession {
                param: "sample_rate",
                reason: format!("{} Hz is below the {MIN_SAMPLE_RATE} Hz minimum", self.sample_rate),
            });
        }
        if self.block_size < 1 {
            return Err(ValidationError::InvalidSession {
                param: "block_size",
                reason: "must be at least 1 frame".to_string(),
            });
        }
        if self.periods < 1 {
            return Err(ValidationError::InvalidSession {
                param: "periods",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Buffer latency `1000 · block_size · periods / sample_rate` in ms.
    pub fn latency_ms(&self) -> f32 {
        1000.0 * self.block_size as f32 * self.periods as f32 / self.sample_rate as f32
    }

    /// Time available to process one block.
    pub fn block_period(&self) -> Duration {
        Duration::from_secs_f64(self.block_size as f64 / f64::from(self.sample_rate))
    }

    /// Operator warnings for legal but risky settings.
    pub fn warnings(&self) -> Vec<SessionWarning> {
        let mut warnings = Vec::new();
        if self.block_size < RECOMMENDED_BLOCK_SIZE {
            warnings.push(SessionWarning::SmallBlock(self.block_size));
        }
        if self.periods != RECOMMENDED_PERIODS {
            warnings.push(SessionWarning::Periods(self.periods));
        }
        if !matches!(self.sample_rate, 44100 | 48000) {
            warnings.push(SessionWarning::UnusualSampleRate(self.sample_rate));
        }
        let latency = self.latency_ms();
        if latency > MAX_LATENCY_MS {
            warnings.push(SessionWarning::HighLatency(latency));
        }
        warnings
    }
}

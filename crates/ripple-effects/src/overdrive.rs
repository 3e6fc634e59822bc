//! Overdrive with a peak-normalized waveshaper.
//!
//! Each block is processed in two phases:
//!
//! 1. **Peak tracking** - the block's peak goes into a [`PeakWindow`]
//!    spanning `window_t` seconds. When the tracked maximum moves, a
//!    per-sample envelope ramps from the previous maximum to the new one,
//!    upward following the running max of `|x|`, downward linearly.
//! 2. **Waveshaping** - every sample is normalized by the envelope times
//!    `drive_coeff` and passed through a symmetric piecewise curve.
//!
//! Because the curve input is normalized to the recent peak level, the
//! amount of distortion depends on `drive` rather than on the input level.
//!
//! # Curve
//!
//! With `T = 1/3` and `n = x / envelope`:
//!
//! | Region | Output |
//! |--------|--------|
//! | `|n| ≤ T` | `2x` |
//! | `T < |n| ≤ 2T` | `sign(n)·envelope·(3 - (2 - 3|n|)²)/3` |
//! | `|n| > 2T` | `sign(n)·envelope` |
//!
//! The result is divided by `norm_factor`, so a sample at the window peak
//! comes out at the peak level, then multiplied by the makeup gain.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{ceil, floor, powf};
use ripple_core::{
    BuildError, ProcessError, Stage, check_block, db_to_linear, is_anomalous, peak_amplitude,
};

use crate::peak_window::{PeakUpdate, PeakWindow};

/// Knee position of the waveshaping curve, in normalized units.
pub const SHAPE_THRESHOLD: f32 = 1.0 / 3.0;

/// User parameters for the [`Overdrive`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverdriveParams {
    /// Drive amount in `[0, 1]`.
    pub drive: f32,
    /// Length of the peak-tracking window in seconds.
    pub window_s: f32,
    /// Makeup gain in dB.
    pub gain_db: f32,
}

impl Default for OverdriveParams {
    fn default() -> Self {
        Self {
            drive: 0.5,
            window_s: 0.5,
            gain_db: 0.0,
        }
    }
}

/// Apply the piecewise curve to a normalized sample.
///
/// Returns `None` if `norm` lies in no region (NaN). The linear region is
/// `2·norm·envelope`; the per-sample path uses the raw `2·x` there instead.
#[inline]
pub fn shape(norm: f32, envelope: f32) -> Option<f32> {
    let mag = norm.abs();
    if mag <= SHAPE_THRESHOLD {
        Some(2.0 * norm * envelope)
    } else if mag > SHAPE_THRESHOLD && mag <= 2.0 * SHAPE_THRESHOLD {
        let k = 2.0 - 3.0 * mag;
        Some(norm.signum() * envelope * (3.0 - k * k) / 3.0)
    } else if mag > 2.0 * SHAPE_THRESHOLD {
        Some(norm.signum() * envelope)
    } else {
        None
    }
}

/// Drive coefficient `1 + 2·(1 - drive)^2.5`.
#[inline]
pub fn drive_coefficient(drive: f32) -> f32 {
    1.0 + 2.0 * powf(1.0 - drive, 2.5)
}

/// Output normalization so a full-scale peak maps back to itself.
#[inline]
pub fn norm_factor(drive_coeff: f32) -> f32 {
    let inv = 1.0 / drive_coeff;
    if inv < 2.0 * SHAPE_THRESHOLD {
        let k = 2.0 - 3.0 * inv;
        drive_coeff * (3.0 - k * k) / 3.0
    } else {
        drive_coeff
    }
}

/// Number of blocks needed to cover `window_s` seconds, at least one.
pub fn peak_window_blocks(window_s: f32, sample_rate: f32, block_size: usize) -> usize {
    let samples = floor(f64::from(window_s) * f64::from(sample_rate));
    let blocks = ceil(samples / block_size as f64);
    if blocks >= 1.0 { blocks as usize } else { 1 }
}

/// Overdrive engine.
///
/// # Example
///
/// ```rust
/// use ripple_core::Stage;
/// use ripple_effects::{Overdrive, OverdriveParams};
///
/// let mut od = Overdrive::new(&OverdriveParams::default(), 48000.0, 4).unwrap();
/// assert_eq!(od.peak_window(), 6000);
///
/// let mut block = [0.1, -1.0, 0.5, 0.0];
/// od.process_block_inplace(&mut block).unwrap();
/// assert_eq!(od.peak(), 1.0);
/// assert_eq!(od.peak_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Overdrive {
    params: OverdriveParams,
    block_size: usize,
    drive_coeff: f32,
    norm_factor: f32,
    makeup_gain: f32,
    window: PeakWindow,
    /// Intra-block envelope, written only when the tracked peak moves.
    envelope: Vec<f32>,
}

impl Overdrive {
    /// Build an overdrive, sizing the peak window and envelope buffer.
    pub fn new(
        params: &OverdriveParams,
        sample_rate: f32,
        block_size: usize,
    ) -> Result<Self, BuildError> {
        crate::check_session(sample_rate, block_size)?;

        let blocks = peak_window_blocks(params.window_s, sample_rate, block_size);
        let window = PeakWindow::new(blocks)?;

        let mut envelope = Vec::new();
        envelope
            .try_reserve_exact(block_size)
            .map_err(|_| BuildError::Allocation {
                what: "envelope",
                len: block_size,
            })?;
        envelope.resize(block_size, 0.0);

        let drive_coeff = drive_coefficient(params.drive);
        let od = Self {
            params: *params,
            block_size,
            drive_coeff,
            norm_factor: norm_factor(drive_coeff),
            makeup_gain: db_to_linear(params.gain_db),
            window,
            envelope,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            drive_coeff = od.drive_coeff,
            norm_factor = od.norm_factor,
            gain = od.makeup_gain,
            peak_window = blocks,
            "overdrive built"
        );

        Ok(od)
    }

    /// Parameters this engine was built from.
    pub fn params(&self) -> &OverdriveParams {
        &self.params
    }

    /// Current window maximum.
    pub fn peak(&self) -> f32 {
        self.window.peak()
    }

    /// Blocks since the maximum was last confirmed.
    pub fn peak_count(&self) -> usize {
        self.window.peak_count()
    }

    /// Ring slot the next block peak goes to.
    pub fn buffer_count(&self) -> usize {
        self.window.buffer_count()
    }

    /// Window length in blocks.
    pub fn peak_window(&self) -> usize {
        self.window.len()
    }

    /// Stored block peaks.
    pub fn window_store(&self) -> &[f32] {
        self.window.store()
    }

    /// Envelope scale derived from drive.
    pub fn drive_coeff(&self) -> f32 {
        self.drive_coeff
    }

    /// Output normalization divisor.
    pub fn norm_factor(&self) -> f32 {
        self.norm_factor
    }

    /// Linear makeup gain.
    pub fn makeup_gain(&self) -> f32 {
        self.makeup_gain
    }

    fn build_envelope(&mut self, update: PeakUpdate, prev_peak: f32, block: &[f32]) {
        match update {
            PeakUpdate::Rose => {
                let mut running = prev_peak;
                for (env, &x) in self.envelope.iter_mut().zip(block) {
                    running = running.max(x.abs());
                    *env = running;
                }
            }
            PeakUpdate::Expired => {
                let peak = self.window.peak();
                if peak < prev_peak {
                    let step = (prev_peak - peak) / self.block_size as f32;
                    for (i, env) in self.envelope.iter_mut().enumerate() {
                        *env = prev_peak - (i + 1) as f32 * step;
                    }
                }
            }
            PeakUpdate::Held => {}
        }
    }

    #[inline]
    fn shape_sample(&self, x: f32, envelope: f32) -> Result<f32, ProcessError> {
        let norm = x / envelope;
        if is_anomalous(norm) {
            return Ok(0.0);
        }
        let y = if norm.abs() <= SHAPE_THRESHOLD {
            2.0 * x
        } else {
            shape(norm, envelope).ok_or(ProcessError::InvariantViolation {
                stage: "overdrive",
                branch: "waveshaper",
                value: norm,
            })?
        };
        Ok(y / self.norm_factor * self.makeup_gain)
    }
}

impl Stage for Overdrive {
    fn name(&self) -> &'static str {
        "overdrive"
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) -> Result<(), ProcessError> {
        check_block(self.block_size, buffer)?;

        let prev_peak = self.window.peak();
        let update = self.window.push(peak_amplitude(buffer));
        self.build_envelope(update, prev_peak, buffer);

        let peak = self.window.peak();
        let flat = peak == prev_peak;
        for (i, sample) in buffer.iter_mut().enumerate() {
            let level = if flat { peak } else { self.envelope[i] };
            *sample = self.shape_sample(*sample, level * self.drive_coeff)?;
        }

        Ok(())
    }

    fn reset(&mut self) {
        self.window.reset();
        self.envelope.fill(0.0);
    }
}

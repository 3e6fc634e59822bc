//! Mathematical utility functions for the effects engines.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] / [`linear_to_db`] - Convert between dB and linear gain
//!
//! Unlike a metering conversion, [`linear_to_db`] does not clamp its input.
//! The compressor relies on the exact logarithm of every non-zero sample.
//!
//! # Envelope Timing
//!
//! - [`smoothing_coefficient`] - One-pole coefficient for an attack or release time
//!
//! # Sample Classification
//!
//! - [`is_anomalous`] - Zero, NaN or infinite
//! - [`peak_amplitude`] - Largest absolute value in a block

use libm::{expf, log10f, powf};

/// Convert decibels to linear gain: `10^(db/20)`.
///
/// # Example
/// ```rust
/// use ripple_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 1e-6);
/// assert!((db_to_linear(20.0) - 10.0).abs() < 1e-4);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    powf(10.0, db / 20.0)
}

/// Convert linear amplitude to decibels: `20·log10(linear)`.
///
/// Zero maps to negative infinity and NaN stays NaN; callers screen those
/// samples with [`is_anomalous`] first.
///
/// # Example
/// ```rust
/// use ripple_core::linear_to_db;
///
/// assert!((linear_to_db(1.0)).abs() < 1e-6);
/// assert!((linear_to_db(0.1) + 20.0).abs() < 1e-4);
/// ```
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    20.0 * log10f(linear)
}

/// One-pole smoothing coefficient for a time constant in seconds.
///
/// Returns `exp(-log10(9) / (sample_rate * time))`. After `time` seconds a
/// step has `e^(-log10(9))`, about 38.5%, of its distance left to cover. A
/// time of zero (or below) yields 0, meaning the smoother follows its input
/// instantly.
#[inline]
pub fn smoothing_coefficient(time: f32, sample_rate: f32) -> f32 {
    if time > 0.0 {
        const LOG10_9: f32 = 0.954_242_5;
        expf(-LOG10_9 / (sample_rate * time))
    } else {
        0.0
    }
}

/// True for samples that carry no usable level: zero, NaN or infinite.
#[inline]
pub fn is_anomalous(x: f32) -> bool {
    x == 0.0 || !x.is_finite()
}

/// Largest absolute sample value in `block`, or 0 for an empty block.
///
/// NaN samples are ignored by `f32::max`.
#[inline]
pub fn peak_amplitude(block: &[f32]) -> f32 {
    block.iter().fold(0.0_f32, |acc, &x| acc.max(x.abs()))
}

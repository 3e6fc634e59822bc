//! Ripple Effects - the compressor and overdrive engines
//!
//! Both engines implement [`ripple_core::Stage`] and are driven one fixed
//! length block at a time:
//!
//! - [`Compressor`] - Soft-knee compressor with asymmetric log-domain
//!   smoothing and parallel (dry-preserving) mix
//! - [`Overdrive`] - Waveshaper normalized by a sliding-window peak envelope
//! - [`PeakWindow`] - Ring buffer of per-block peaks tracking the trailing maximum
//!
//! Engines are built once from validated parameters plus the session's
//! sample rate and block size. Every working buffer is reserved at
//! construction, so block processing never allocates.
//!
//! ## Example
//!
//! ```rust
//! use ripple_core::Stage;
//! use ripple_effects::{Compressor, CompressorParams, Overdrive, OverdriveParams};
//!
//! let mut comp = Compressor::new(&CompressorParams::default(), 48000.0, 64).unwrap();
//! let mut drive = Overdrive::new(&OverdriveParams::default(), 48000.0, 64).unwrap();
//!
//! let input = [0.25_f32; 64];
//! let mut output = [0.0_f32; 64];
//! comp.process_block(&input, &mut output).unwrap();
//! drive.process_block_inplace(&mut output).unwrap();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod compressor;
pub mod overdrive;
pub mod peak_window;

pub use compressor::{Compressor, CompressorParams, GainComputer};
pub use overdrive::{Overdrive, OverdriveParams, SHAPE_THRESHOLD, shape};
pub use peak_window::{PeakUpdate, PeakWindow};

use ripple_core::BuildError;

/// Reject sample rates and block sizes no engine can run at.
pub(crate) fn check_session(sample_rate: f32, block_size: usize) -> Result<(), BuildError> {
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(BuildError::InvalidSampleRate(sample_rate));
    }
    if block_size == 0 {
        return Err(BuildError::InvalidBlockSize(block_size));
    }
    Ok(())
}

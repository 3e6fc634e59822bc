//! Ripple Core - stage abstraction and DSP math for the ripple effects chain
//!
//! This crate provides the foundational pieces shared by every processing
//! stage, designed for a hard real-time block callback with zero allocation
//! in the audio path.
//!
//! # Core Abstractions
//!
//! - [`Stage`] - Object-safe trait for anything that processes one block
//! - [`ProcessError`] - Fatal runtime failure reported from a block
//! - [`BuildError`] - Failure while constructing a stage
//!
//! ## Utilities
//!
//! - Level conversions: [`db_to_linear`], [`linear_to_db`]
//! - One-pole time constants: [`smoothing_coefficient`]
//! - Sample classification: [`is_anomalous`], [`peak_amplitude`]
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ripple-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust
//! use ripple_core::{ProcessError, Stage};
//!
//! struct Gain(f32, usize);
//!
//! impl Stage for Gain {
//!     fn name(&self) -> &'static str { "gain" }
//!     fn block_size(&self) -> usize { self.1 }
//!     fn process_block_inplace(&mut self, buffer: &mut [f32]) -> Result<(), ProcessError> {
//!         for s in buffer.iter_mut() {
//!             *s *= self.0;
//!         }
//!         Ok(())
//!     }
//!     fn reset(&mut self) {}
//! }
//!
//! let mut gain = Gain(0.5, 4);
//! let mut out = [0.0; 4];
//! gain.process_block(&[1.0, 2.0, 3.0, 4.0], &mut out).unwrap();
//! assert_eq!(out, [0.5, 1.0, 1.5, 2.0]);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod error;
pub mod math;
pub mod stage;

pub use error::{BuildError, ProcessError};
pub use math::{db_to_linear, is_anomalous, linear_to_db, peak_amplitude, smoothing_coefficient};
pub use stage::{Stage, check_block};

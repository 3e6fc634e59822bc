//! Configuration and chain routing for the ripple effects processor.
//!
//! This crate turns operator settings into a ready-to-run processing chain:
//!
//! - **Validation**: Range checks for every compressor and overdrive parameter
//! - **Chain layout**: Which engine goes first, second, or not at all
//! - **Session**: Sample rate, block size and buffering, plus the latency
//!   warnings shown before a stream starts
//! - **Router**: [`EffectChain`], an ordered sequence of stages that is
//!   itself a [`ripple_core::Stage`]
//!
//! Nothing is built until everything validates, so a bad setting never
//! reaches the audio callback.
//!
//! # Example
//!
//! ```rust
//! use ripple_config::{ChainConfig, EffectChain, SessionConfig};
//! use ripple_core::Stage;
//! use ripple_effects::{CompressorParams, OverdriveParams};
//!
//! let layout = ChainConfig::from_effect_names(&["overdrive", "compressor"]).unwrap();
//! let session = SessionConfig::default();
//! let mut chain = EffectChain::build(
//!     &layout,
//!     &CompressorParams::default(),
//!     &OverdriveParams::default(),
//!     &session,
//! )
//! .unwrap();
//! assert_eq!(chain.order(), vec!["overdrive", "compressor"]);
//!
//! let input = vec![0.1_f32; session.block_size];
//! let mut output = vec![0.0_f32; session.block_size];
//! chain.process_block(&input, &mut output).unwrap();
//! ```

mod chain;
mod error;
mod session;

/// Parameter validation.
pub mod validation;

pub use chain::{ChainConfig, ChainPosition, EffectChain, EffectKind, MAX_STAGES};
pub use error::ConfigError;
pub use session::{MAX_LATENCY_MS, MIN_SAMPLE_RATE, SessionConfig, SessionWarning};
pub use validation::{
    ValidationError, ValidationResult, validate_compressor, validate_overdrive,
};

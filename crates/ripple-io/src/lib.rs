//! Audio I/O for the ripple effects processor.
//!
//! Every way audio reaches a [`Stage`](ripple_core::Stage) lives here:
//!
//! - **Block adapter**: [`BlockAdapter`] turns host buffers of any size into
//!   the exact blocks a stage expects
//! - **Offline processing**: [`process_samples`] runs a whole signal through a
//!   stage, and [`read_wav`]/[`write_wav`] load and save it
//! - **Real-time streaming**: [`AudioStream`] runs a stage between an input
//!   and an output device until stopped
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ripple_io::{process_samples, read_wav, write_wav};
//! use ripple_effects::{Compressor, CompressorParams};
//!
//! let (samples, spec) = read_wav("input.wav")?;
//! let mut comp = Compressor::new(&CompressorParams::default(), spec.sample_rate as f32, 64)?;
//! let processed = process_samples(&mut comp, &samples)?;
//! write_wav("output.wav", &processed, spec)?;
//! ```

mod block;
mod engine;
mod stream;
mod wav;

pub use block::BlockAdapter;
pub use engine::{process_samples, process_samples_with};
pub use stream::{
    AudioDevice, AudioStream, StreamConfig, StreamStats, default_device, list_devices,
};
pub use wav::{WavSpec, read_wav, write_wav};

use ripple_core::ProcessError;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// A stage failed mid-stream and the stream was halted.
    #[error("Stream halted: {0}")]
    Fault(#[from] ProcessError),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;

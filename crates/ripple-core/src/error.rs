//! Error types shared by all stages.

use thiserror::Error;

/// Fatal failure raised while processing a block.
///
/// Anomalous samples (zero, NaN, infinite) never produce this error; the
/// engines silence them inline. A `ProcessError` means the stage reached a
/// state its arithmetic should make impossible, and the stream must stop.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProcessError {
    /// A branch selector fell outside every case of a piecewise function.
    #[error("invariant violated in {stage} ({branch}): value {value}")]
    InvariantViolation {
        /// Stage that detected the violation.
        stage: &'static str,
        /// Which piecewise decision failed.
        branch: &'static str,
        /// The offending value.
        value: f32,
    },

    /// A block did not have the length the stage was built for.
    #[error("block length mismatch: expected {expected} samples, got {actual}")]
    BlockLength {
        /// Block length the stage expects.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },
}

/// Failure while constructing a stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Sample rate was zero, negative or not finite.
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),

    /// Block size was zero.
    #[error("invalid block size: {0}")]
    InvalidBlockSize(usize),

    /// A working buffer could not be reserved.
    #[error("failed to allocate {what} ({len} samples)")]
    Allocation {
        /// Which buffer failed.
        what: &'static str,
        /// Requested length in elements.
        len: usize,
    },
}

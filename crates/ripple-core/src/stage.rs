//! The [`Stage`] trait and related helpers.
//!
//! A stage is one link of the effects chain. The chain router owns an
//! ordered sequence of boxed stages and drives each of them once per
//! block, so every engine exposes the same block-level capability.
//!
//! ## Design Decisions
//!
//! - **Block processing**: Stages are driven a whole block at a time. The
//!   overdrive needs the entire block before it can shape a single sample,
//!   so a per-sample interface would not fit.
//!
//! - **Fallible**: Processing returns `Result`. Anomalous samples are handled
//!   inline by each engine; only invariant breaches surface as
//!   [`ProcessError`], and the caller decides to abort the stream.
//!
//! - **Object-safe**: `Box<dyn Stage + Send>` is how the router and the
//!   real-time stream hold stages.
//!
//! - **No allocations**: Every method is callable from the audio callback.

use crate::ProcessError;

/// Core trait for all processing stages.
///
/// Implementors provide in-place block processing; the out-of-place variant
/// has a default that copies and delegates.
pub trait Stage {
    /// Short identifier used in logs and chain listings.
    fn name(&self) -> &'static str;

    /// Block length in samples this stage was constructed for.
    fn block_size(&self) -> usize;

    /// Process one block, reading `input` and writing `output`.
    ///
    /// The default implementation copies `input` into `output` and
    /// processes `output` in place.
    ///
    /// # Errors
    ///
    /// [`ProcessError::BlockLength`] if the buffers differ in length or do
    /// not match [`block_size`](Stage::block_size); any error raised by
    /// [`process_block_inplace`](Stage::process_block_inplace).
    fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ProcessError> {
        if input.len() != output.len() {
            return Err(ProcessError::BlockLength {
                expected: input.len(),
                actual: output.len(),
            });
        }
        output.copy_from_slice(input);
        self.process_block_inplace(output)
    }

    /// Process one block in place.
    fn process_block_inplace(&mut self, buffer: &mut [f32]) -> Result<(), ProcessError>;

    /// Clear all mutable state without touching parameters.
    fn reset(&mut self);
}

/// Verify that a block has the length a stage was built for.
#[inline]
pub fn check_block(expected: usize, buffer: &[f32]) -> Result<(), ProcessError> {
    if buffer.len() == expected {
        Ok(())
    } else {
        Err(ProcessError::BlockLength {
            expected,
            actual: buffer.len(),
        })
    }
}

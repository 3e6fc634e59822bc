//! Fixed-size block adapter.
//!
//! Audio hosts hand out buffers of whatever size they like, while every
//! stage insists on exactly `block_size` samples. [`BlockAdapter`] sits in
//! between: it collects input until a full block is ready, processes it, and
//! plays the result back one sample at a time. The price is one block of
//! latency.

use ripple_core::{ProcessError, Stage};

/// Rechunks a sample stream into exact blocks for a [`Stage`].
///
/// Both buffers are allocated once in [`new`](BlockAdapter::new); pushing
/// never allocates, so the adapter can live inside an audio callback.
///
/// # Example
///
/// ```rust
/// use ripple_core::{ProcessError, Stage};
/// use ripple_io::BlockAdapter;
///
/// struct Double;
///
/// impl Stage for Double {
///     fn name(&self) -> &'static str { "double" }
///     fn block_size(&self) -> usize { 2 }
///     fn process_block_inplace(&mut self, buf: &mut [f32]) -> Result<(), ProcessError> {
///         buf.iter_mut().for_each(|s| *s *= 2.0);
///         Ok(())
///     }
///     fn reset(&mut self) {}
/// }
///
/// let mut stage = Double;
/// let mut adapter = BlockAdapter::new(2);
/// let out: Vec<f32> = [1.0, 2.0, 3.0, 4.0]
///     .iter()
///     .map(|&x| adapter.push(&mut stage, x).unwrap())
///     .collect();
/// assert_eq!(out, vec![0.0, 0.0, 2.0, 4.0]);
/// ```
#[derive(Debug, Clone)]
pub struct BlockAdapter {
    input: Vec<f32>,
    output: Vec<f32>,
    pos: usize,
    blocks: u64,
}

impl BlockAdapter {
    /// Create an adapter for blocks of `block_size` samples (at least one).
    pub fn new(block_size: usize) -> Self {
        let block_size = block_size.max(1);
        Self {
            input: vec![0.0; block_size],
            output: vec![0.0; block_size],
            pos: 0,
            blocks: 0,
        }
    }

    /// Samples per block.
    pub fn block_size(&self) -> usize {
        self.input.len()
    }

    /// Delay in samples between a pushed sample and its processed output.
    pub fn latency(&self) -> usize {
        self.input.len()
    }

    /// Number of blocks processed since construction or the last reset.
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Push one input sample and take one output sample.
    ///
    /// When the pushed sample completes a block, the block is run through
    /// `stage` before returning.
    ///
    /// # Errors
    ///
    /// Whatever the stage reports for the completed block. The block's output
    /// is left as silence in that case.
    #[inline]
    pub fn push<S: Stage + ?Sized>(&mut self, stage: &mut S, sample: f32) -> Result<f32, ProcessError> {
        let out = self.output[self.pos];
        self.input[self.pos] = sample;
        self.pos += 1;

        if self.pos == self.input.len() {
            self.pos = 0;
            self.blocks += 1;
            if let Err(err) = stage.process_block(&self.input, &mut self.output) {
                self.output.fill(0.0);
                return Err(err);
            }
        }

        Ok(out)
    }

    /// Push a buffer of samples, writing the same number to `output`.
    ///
    /// # Errors
    ///
    /// [`ProcessError::BlockLength`] if the slices differ in length, or the
    /// first error any completed block reports.
    pub fn process<S: Stage + ?Sized>(
        &mut self,
        stage: &mut S,
        input: &[f32],
        output: &mut [f32],
    ) -> Result<(), ProcessError> {
        if input.len() != output.len() {
            return Err(ProcessError::BlockLength {
                expected: input.len(),
                actual: output.len(),
            });
        }
        for (&x, y) in input.iter().zip(output.iter_mut()) {
            *y = self.push(stage, x)?;
        }
        Ok(())
    }

    /// Drop any partial block and pending output.
    pub fn reset(&mut self) {
        self.input.fill(0.0);
        self.output.fill(0.0);
        self.pos = 0;
        self.blocks = 0;
    }
}

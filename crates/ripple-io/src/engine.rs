//! Offline processing.
//!
//! Drives a stage over a complete signal the same way a real-time host
//! would: one block at a time, in order, with no gaps.

use ripple_core::{ProcessError, Stage};

/// Run `input` through `stage` and return the processed signal.
///
/// The signal is fed in blocks of [`Stage::block_size`] samples. A final
/// partial block is padded with silence, and the padding is dropped from the
/// result, so the output is exactly as long as the input. Unlike
/// [`BlockAdapter`](crate::BlockAdapter) there is no added latency.
///
/// # Errors
///
/// The first error the stage reports. Processing stops at that block.
pub fn process_samples<S: Stage + ?Sized>(
    stage: &mut S,
    input: &[f32],
) -> Result<Vec<f32>, ProcessError> {
    process_samples_with(stage, input, |_, _| {})
}

/// Like [`process_samples`], calling `progress(done, total)` after each
/// block with sample counts.
pub fn process_samples_with<S, F>(
    stage: &mut S,
    input: &[f32],
    mut progress: F,
) -> Result<Vec<f32>, ProcessError>
where
    S: Stage + ?Sized,
    F: FnMut(usize, usize),
{
    let block_size = stage.block_size().max(1);
    let total = input.len();
    let padded = total.div_ceil(block_size) * block_size;

    let mut output = vec![0.0; padded];
    let mut block = vec![0.0; block_size];
    let mut done = 0;

    for out in output.chunks_mut(block_size) {
        let end = (done + block_size).min(total);
        let valid = end - done;
        block[..valid].copy_from_slice(&input[done..end]);
        block[valid..].fill(0.0);

        stage.process_block(&block, out)?;

        done = end;
        progress(done, total);
    }

    output.truncate(total);
    Ok(output)
}

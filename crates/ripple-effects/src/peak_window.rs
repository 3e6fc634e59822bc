//! Sliding-window maximum over per-block peaks.
//!
//! [`PeakWindow`] keeps the peak amplitude of each of the last `len` blocks
//! in a ring and tracks their maximum without rescanning on every block.
//! A rescan only happens when the block holding the tracked maximum ages
//! out of the window.
//!
//! # Invariant
//!
//! After every [`push`](PeakWindow::push), [`peak`](PeakWindow::peak) equals
//! the maximum of all `len` stored entries.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use ripple_core::BuildError;

/// What a [`PeakWindow::push`] did to the tracked maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakUpdate {
    /// The new block exceeded the previous maximum and replaced it.
    Rose,
    /// The previous maximum left the window; the ring was rescanned.
    Expired,
    /// The previous maximum is still inside the window.
    Held,
}

/// Ring buffer of block peaks with a running maximum.
#[derive(Debug, Clone)]
pub struct PeakWindow {
    store: Vec<f32>,
    /// Next ring slot to write.
    write_index: usize,
    peak: f32,
    /// Age in blocks of the newest block holding `peak`.
    peak_count: usize,
}

impl PeakWindow {
    /// Allocate a window covering `len` blocks (at least one).
    pub fn new(len: usize) -> Result<Self, BuildError> {
        let len = len.max(1);
        let mut store = Vec::new();
        store
            .try_reserve_exact(len)
            .map_err(|_| BuildError::Allocation {
                what: "peak window",
                len,
            })?;
        store.resize(len, 0.0);

        Ok(Self {
            store,
            write_index: 0,
            peak: 0.0,
            peak_count: 0,
        })
    }

    /// Record the peak of the block just received.
    pub fn push(&mut self, block_peak: f32) -> PeakUpdate {
        let len = self.store.len();
        let age = self.peak_count + 1;
        self.store[self.write_index] = block_peak;

        let update = if block_peak > self.peak {
            self.peak = block_peak;
            self.peak_count = 0;
            PeakUpdate::Rose
        } else if age >= len {
            self.rescan();
            PeakUpdate::Expired
        } else {
            self.peak_count = age;
            PeakUpdate::Held
        };

        self.write_index = (self.write_index + 1) % len;
        update
    }

    /// Find the maximum of the whole ring, oldest entry first.
    ///
    /// Ties resolve to the newest slot, so the maximum stays in the window
    /// as long as possible.
    fn rescan(&mut self) {
        let len = self.store.len();
        let mut max = 0.0_f32;
        let mut high = self.write_index;

        for i in 1..=len {
            let j = (self.write_index + i) % len;
            if self.store[j] >= max {
                max = self.store[j];
                high = j;
            }
        }

        self.peak = max;
        self.peak_count = (self.write_index + len - high) % len;
    }

    /// Current window maximum.
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Blocks elapsed since the block holding [`peak`](Self::peak).
    pub fn peak_count(&self) -> usize {
        self.peak_count
    }

    /// Ring slot the next block will be written to.
    pub fn buffer_count(&self) -> usize {
        self.write_index
    }

    /// Window length in blocks.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Always false; a window holds at least one block.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Stored block peaks in ring order.
    pub fn store(&self) -> &[f32] {
        &self.store
    }

    /// Zero the ring and forget the maximum.
    pub fn reset(&mut self) {
        self.store.fill(0.0);
        self.write_index = 0;
        self.peak = 0.0;
        self.peak_count = 0;
    }
}

//! Soft-knee compressor with parallel mix.
//!
//! A feed-forward compressor working sample by sample in the log domain.
//! The compressed signal is blended back onto the dry input, so the output
//! never drops below the original level; the compression amount sets how
//! much of the squashed copy is added.
//!
//! # Signal Flow
//!
//! ```text
//! x → |x| → dB → Gain Computer → gc → Attack/Release Smoother → gs
//!                                                                 ↓
//! out = gain · (comps · x · 10^(gs/20) + x)
//! ```
//!
//! # Parameters
//!
//! | Parameter | Constraint | Default | Description |
//! |-----------|------------|---------|-------------|
//! | Ratio | > 20 | 50 | Slope above the knee |
//! | Knee width | ≥ 0 dB | 10 | Quadratic blend region around the threshold |
//! | Threshold | dB | -60 | Level where compression begins |
//! | Attack | ≥ 0 s | 0.002 | Time constant toward a deeper reduction |
//! | Release | ≥ 0.025 s | 0.3 | Time constant toward less reduction |
//! | Compression | ≥ 0 dB | 6 | Level of the compressed copy in the parallel mix |
//! | Gain | dB | 0 | Static makeup gain |
//!
//! Zero, NaN and infinite samples produce silence. The smoother still
//! advances for them with a gain-computer output of 0 dB, so the envelope
//! stays continuous across the gap.

use ripple_core::{
    BuildError, ProcessError, Stage, check_block, db_to_linear, is_anomalous, linear_to_db,
    smoothing_coefficient,
};

/// User parameters for the [`Compressor`].
///
/// Validation lives in the configuration layer; the engine trusts these.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompressorParams {
    /// Compression ratio above the knee.
    pub ratio: f32,
    /// Knee width in dB.
    pub knee_width_db: f32,
    /// Threshold in dB.
    pub threshold_db: f32,
    /// Attack time in seconds.
    pub attack_s: f32,
    /// Release time in seconds.
    pub release_s: f32,
    /// Level of the compressed copy in the parallel mix, in dB.
    pub compression_db: f32,
    /// Makeup gain in dB.
    pub gain_db: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            ratio: 50.0,
            knee_width_db: 10.0,
            threshold_db: -60.0,
            attack_s: 0.002,
            release_s: 0.3,
            compression_db: 6.0,
            gain_db: 0.0,
        }
    }
}

/// Static three-segment soft-knee curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainComputer {
    threshold_db: f32,
    knee_width_db: f32,
    ratio: f32,
}

impl GainComputer {
    /// Create a gain computer for threshold `T`, knee width `W` and ratio `R`.
    pub fn new(threshold_db: f32, knee_width_db: f32, ratio: f32) -> Self {
        Self {
            threshold_db,
            knee_width_db,
            ratio,
        }
    }

    /// Map an input level in dB onto the compressed level `sc`.
    ///
    /// - below `T - W/2`: unity
    /// - inside the knee: `db + (1/R - 1)(db - T + W/2)² / 2W`
    /// - from `T + W/2` up: `T + (db - T)/R`
    ///
    /// Returns `None` when `db` falls in no segment, which only happens for NaN.
    #[inline]
    pub fn static_curve(&self, db: f32) -> Option<f32> {
        let t = self.threshold_db;
        let half_knee = self.knee_width_db / 2.0;

        if db < t - half_knee {
            Some(db)
        } else if (t - half_knee..t + half_knee).contains(&db) {
            let over = db - t + half_knee;
            Some(db + ((1.0 / self.ratio - 1.0) * over * over) / (2.0 * self.knee_width_db))
        } else if db >= t + half_knee {
            Some(t + (db - t) / self.ratio)
        } else {
            None
        }
    }

    /// Gain reduction `gc = sc - db` for an input level, always ≤ 0.
    #[inline]
    pub fn gain_reduction_db(&self, db: f32) -> Option<f32> {
        self.static_curve(db).map(|sc| sc - db)
    }
}

/// Soft-knee compressor engine.
///
/// # Example
///
/// ```rust
/// use ripple_core::Stage;
/// use ripple_effects::{Compressor, CompressorParams};
///
/// let mut comp = Compressor::new(&CompressorParams::default(), 48000.0, 4).unwrap();
/// let mut block = [0.0_f32; 4];
/// comp.process_block_inplace(&mut block).unwrap();
/// assert_eq!(block, [0.0; 4]);
/// assert_eq!(comp.gain_reduction_db(), 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct Compressor {
    params: CompressorParams,
    block_size: usize,
    gain_computer: GainComputer,
    attack_coeff: f32,
    release_coeff: f32,
    /// `comps`: linear compression level minus one.
    parallel_depth: f32,
    makeup_gain: f32,
    /// Smoothed gain reduction in dB, carried across blocks.
    gain_state_db: f32,
}

impl Compressor {
    /// Build a compressor and derive its coefficients.
    pub fn new(
        params: &CompressorParams,
        sample_rate: f32,
        block_size: usize,
    ) -> Result<Self, BuildError> {
        crate::check_session(sample_rate, block_size)?;

        let comp = Self {
            params: *params,
            block_size,
            gain_computer: GainComputer::new(params.threshold_db, params.knee_width_db, params.ratio),
            attack_coeff: smoothing_coefficient(params.attack_s, sample_rate),
            release_coeff: smoothing_coefficient(params.release_s, sample_rate),
            parallel_depth: db_to_linear(params.compression_db) - 1.0,
            makeup_gain: db_to_linear(params.gain_db),
            gain_state_db: 0.0,
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            att = comp.attack_coeff,
            rel = comp.release_coeff,
            comps = comp.parallel_depth,
            gain = comp.makeup_gain,
            "compressor built"
        );

        Ok(comp)
    }

    /// Current smoothed gain reduction (`gs`) in dB.
    pub fn gain_reduction_db(&self) -> f32 {
        self.gain_state_db
    }

    /// Parameters this engine was built from.
    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    /// The static curve.
    pub fn gain_computer(&self) -> &GainComputer {
        &self.gain_computer
    }

    /// Per-sample attack coefficient.
    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    /// Per-sample release coefficient.
    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Parallel mix depth (`comps`).
    pub fn parallel_depth(&self) -> f32 {
        self.parallel_depth
    }

    /// Linear makeup gain.
    pub fn makeup_gain(&self) -> f32 {
        self.makeup_gain
    }

    /// One step of the asymmetric smoother.
    ///
    /// Attack applies while the demanded reduction is at least as deep as
    /// the current state, release otherwise.
    #[inline]
    pub fn smooth(&self, prev_db: f32, target_db: f32) -> Result<f32, ProcessError> {
        let coeff = if target_db <= prev_db {
            self.attack_coeff
        } else if target_db > prev_db {
            self.release_coeff
        } else {
            return Err(ProcessError::InvariantViolation {
                stage: "compressor",
                branch: "attack/release",
                value: target_db,
            });
        };
        Ok(coeff * prev_db + (1.0 - coeff) * target_db)
    }
}

impl Stage for Compressor {
    fn name(&self) -> &'static str {
        "compressor"
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) -> Result<(), ProcessError> {
        check_block(self.block_size, buffer)?;

        let mut gs = self.gain_state_db;
        for sample in buffer.iter_mut() {
            let x = *sample;

            if is_anomalous(x) {
                gs = self.smooth(gs, 0.0)?;
                *sample = 0.0;
                continue;
            }

            let db = linear_to_db(x.abs());
            let gc = self
                .gain_computer
                .gain_reduction_db(db)
                .ok_or(ProcessError::InvariantViolation {
                    stage: "compressor",
                    branch: "knee",
                    value: db,
                })?;
            gs = self.smooth(gs, gc)?;

            let lin = db_to_linear(gs);
            *sample = (self.parallel_depth * x * lin + x) * self.makeup_gain;
        }
        self.gain_state_db = gs;

        Ok(())
    }

    fn reset(&mut self) {
        self.gain_state_db = 0.0;
    }
}

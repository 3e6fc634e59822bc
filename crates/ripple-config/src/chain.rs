//! Chain layout and the block router.
//!
//! [`ChainConfig`] records where each engine sits. [`EffectChain`] is built
//! from it and holds only the engines in use, in processing order. The
//! first stage reads the raw input block; every later stage works in place
//! on the output buffer.
//!
//! # Example
//!
//! ```rust
//! use ripple_config::{ChainConfig, ChainPosition, EffectKind};
//!
//! let layout = ChainConfig::default();
//! assert_eq!(layout.order().unwrap(), vec![EffectKind::Compressor]);
//!
//! let layout = ChainConfig::new(ChainPosition::Second, ChainPosition::First);
//! assert_eq!(
//!     layout.order().unwrap(),
//!     vec![EffectKind::Overdrive, EffectKind::Compressor]
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use ripple_core::{ProcessError, Stage, check_block};
use ripple_effects::{Compressor, CompressorParams, Overdrive, OverdriveParams};

use crate::error::ConfigError;
use crate::session::SessionConfig;
use crate::validation::{ValidationError, ValidationResult, validate_compressor, validate_overdrive};

/// Number of positions in the chain.
pub const MAX_STAGES: usize = 2;

/// The engines a chain can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Soft-knee parallel compressor.
    Compressor,
    /// Peak-normalized overdrive.
    Overdrive,
}

impl EffectKind {
    /// Every kind, in default priority order.
    pub const ALL: [EffectKind; 2] = [EffectKind::Compressor, EffectKind::Overdrive];

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Compressor => "compressor",
            EffectKind::Overdrive => "overdrive",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EffectKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compressor" | "comp" => Ok(EffectKind::Compressor),
            "overdrive" | "drive" => Ok(EffectKind::Overdrive),
            _ => Err(ValidationError::UnknownEffect(s.to_string())),
        }
    }
}

/// Where an engine sits in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChainPosition {
    /// Not part of the chain.
    #[default]
    Unused,
    /// Reads the raw input block.
    First,
    /// Reads the first stage's output.
    Second,
}

impl fmt::Display for ChainPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChainPosition::Unused => "unused",
            ChainPosition::First => "first",
            ChainPosition::Second => "second",
        })
    }
}

/// Position of each engine.
///
/// With both engines unused the compressor runs alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChainConfig {
    /// Compressor position.
    pub compressor: ChainPosition,
    /// Overdrive position.
    pub overdrive: ChainPosition,
}

impl ChainConfig {
    /// Create a layout from explicit positions.
    pub fn new(compressor: ChainPosition, overdrive: ChainPosition) -> Self {
        Self {
            compressor,
            overdrive,
        }
    }

    /// Build a layout from effect names in processing order.
    ///
    /// The first name goes first and the next goes second. No names gives
    /// the compressor-only default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use ripple_config::{ChainConfig, ChainPosition};
    ///
    /// let layout = ChainConfig::from_effect_names(&["drive", "comp"]).unwrap();
    /// assert_eq!(layout.overdrive, ChainPosition::First);
    /// assert_eq!(layout.compressor, ChainPosition::Second);
    ///
    /// assert!(ChainConfig::from_effect_names(&["overdrive", "overdrive"]).is_err());
    /// ```
    pub fn from_effect_names<S: AsRef<str>>(names: &[S]) -> ValidationResult<Self> {
        if names.len() > MAX_STAGES {
            return Err(ValidationError::TooManyStages {
                count: names.len(),
                max: MAX_STAGES,
            });
        }

        let mut layout = Self::default();
        for (index, name) in names.iter().enumerate() {
            let kind: EffectKind = name.as_ref().parse()?;
            let slot = layout.position_mut(kind);
            if *slot != ChainPosition::Unused {
                return Err(ValidationError::DuplicateEffect(kind));
            }
            *slot = if index == 0 {
                ChainPosition::First
            } else {
                ChainPosition::Second
            };
        }
        Ok(layout)
    }

    /// Position of an engine.
    pub fn position(&self, kind: EffectKind) -> ChainPosition {
        match kind {
            EffectKind::Compressor => self.compressor,
            EffectKind::Overdrive => self.overdrive,
        }
    }

    fn position_mut(&mut self, kind: EffectKind) -> &mut ChainPosition {
        match kind {
            EffectKind::Compressor => &mut self.compressor,
            EffectKind::Overdrive => &mut self.overdrive,
        }
    }

    /// Reject layouts the router cannot run.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.compressor != ChainPosition::Unused && self.compressor == self.overdrive {
            return Err(ValidationError::DuplicatePosition(self.compressor));
        }
        for kind in EffectKind::ALL {
            if self.position(kind) == ChainPosition::Second
                && !EffectKind::ALL
                    .iter()
                    .any(|&other| self.position(other) == ChainPosition::First)
            {
                return Err(ValidationError::MissingFirst(kind));
            }
        }
        Ok(())
    }

    /// Engines in processing order, applying the compressor-only default.
    pub fn order(&self) -> ValidationResult<Vec<EffectKind>> {
        self.validate()?;

        let mut order = Vec::with_capacity(MAX_STAGES);
        for position in [ChainPosition::First, ChainPosition::Second] {
            order.extend(
                EffectKind::ALL
                    .iter()
                    .copied()
                    .filter(|&kind| self.position(kind) == position),
            );
        }
        if order.is_empty() {
            order.push(EffectKind::Compressor);
        }
        Ok(order)
    }
}

/// Ordered sequence of stages processed as one.
///
/// Implements [`Stage`], so a chain can go anywhere a single engine can.
pub struct EffectChain {
    stages: Vec<Box<dyn Stage + Send>>,
    sample_rate: f32,
    block_size: usize,
}

impl EffectChain {
    /// Validate every setting, then construct the engines the layout uses.
    ///
    /// Both parameter sets are checked even if one engine is unused.
    pub fn build(
        layout: &ChainConfig,
        compressor: &CompressorParams,
        overdrive: &OverdriveParams,
        session: &SessionConfig,
    ) -> Result<Self, ConfigError> {
        session.validate()?;
        validate_compressor(compressor)?;
        validate_overdrive(overdrive)?;
        let order = layout.order()?;

        let sample_rate = session.sample_rate as f32;
        let block_size = session.block_size;

        let mut stages: Vec<Box<dyn Stage + Send>> = Vec::with_capacity(order.len());
        for kind in &order {
            let stage: Box<dyn Stage + Send> = match kind {
                EffectKind::Compressor => Box::new(
                    Compressor::new(compressor, sample_rate, block_size)
                        .map_err(|e| ConfigError::build("compressor", e))?,
                ),
                EffectKind::Overdrive => Box::new(
                    Overdrive::new(overdrive, sample_rate, block_size)
                        .map_err(|e| ConfigError::build("overdrive", e))?,
                ),
            };
            stages.push(stage);
        }

        tracing::debug!(?order, sample_rate, block_size, "effect chain built");

        Ok(Self {
            stages,
            sample_rate,
            block_size,
        })
    }

    /// Stage names in processing order.
    pub fn order(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// True if the chain holds no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Session sample rate.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl fmt::Debug for EffectChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectChain")
            .field("order", &self.order())
            .field("sample_rate", &self.sample_rate)
            .field("block_size", &self.block_size)
            .finish()
    }
}

impl Stage for EffectChain {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn block_size(&self) -> usize {
        self.block_size
    }

    fn process_block(&mut self, input: &[f32], output: &mut [f32]) -> Result<(), ProcessError> {
        check_block(self.block_size, input)?;
        check_block(self.block_size, output)?;

        let Some((first, rest)) = self.stages.split_first_mut() else {
            output.copy_from_slice(input);
            return Ok(());
        };
        first.process_block(input, output)?;
        for stage in rest {
            stage.process_block_inplace(output)?;
        }
        Ok(())
    }

    fn process_block_inplace(&mut self, buffer: &mut [f32]) -> Result<(), ProcessError> {
        check_block(self.block_size, buffer)?;
        for stage in &mut self.stages {
            stage.process_block_inplace(buffer)?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }
}

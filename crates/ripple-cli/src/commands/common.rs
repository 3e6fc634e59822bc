//! Arguments shared by the commands that build a chain.

use clap::Args;
use ripple_config::{ChainConfig, EffectChain, SessionConfig};
use ripple_effects::{CompressorParams, OverdriveParams};

/// Which effects run, in order.
#[derive(Args, Debug, Clone)]
pub struct ChainArgs {
    /// Effects in processing order: compressor, overdrive (default: compressor only)
    #[arg(value_name = "EFFECT")]
    pub effects: Vec<String>,
}

impl ChainArgs {
    /// Chain layout from the named effects.
    pub fn layout(&self) -> anyhow::Result<ChainConfig> {
        Ok(ChainConfig::from_effect_names(&self.effects)?)
    }
}

/// Compressor settings.
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Compressor")]
pub struct CompressorArgs {
    /// Compression ratio (more than 20)
    #[arg(long, default_value_t = 50.0, allow_hyphen_values = true)]
    pub ratio: f32,

    /// Knee width in dB
    #[arg(long, alias = "knee_width", default_value_t = 10.0, allow_hyphen_values = true)]
    pub knee_width: f32,

    /// Threshold in dB
    #[arg(long, default_value_t = -60.0, allow_hyphen_values = true)]
    pub threshold: f32,

    /// Attack time in seconds
    #[arg(long, default_value_t = 0.002, allow_hyphen_values = true)]
    pub attack: f32,

    /// Release time in seconds (at least 0.025)
    #[arg(long, default_value_t = 0.3, allow_hyphen_values = true)]
    pub release: f32,

    /// Parallel compression depth in dB
    #[arg(long, default_value_t = 6.0, allow_hyphen_values = true)]
    pub compression: f32,

    /// Compressor makeup gain in dB
    #[arg(long, alias = "comp_gain", default_value_t = 0.0, allow_hyphen_values = true)]
    pub comp_gain: f32,
}

impl CompressorArgs {
    /// Engine parameters.
    pub fn params(&self) -> CompressorParams {
        CompressorParams {
            ratio: self.ratio,
            knee_width_db: self.knee_width,
            threshold_db: self.threshold,
            attack_s: self.attack,
            release_s: self.release,
            compression_db: self.compression,
            gain_db: self.comp_gain,
        }
    }
}

/// Overdrive settings.
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Overdrive")]
pub struct OverdriveArgs {
    /// Drive amount (0 to 1)
    #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
    pub drive: f32,

    /// Peak tracking window in seconds (at most 59)
    #[arg(long, default_value_t = 0.5, allow_hyphen_values = true)]
    pub window: f32,

    /// Overdrive makeup gain in dB
    #[arg(long, alias = "drive_gain", default_value_t = 0.0, allow_hyphen_values = true)]
    pub drive_gain: f32,
}

impl OverdriveArgs {
    /// Engine parameters.
    pub fn params(&self) -> OverdriveParams {
        OverdriveParams {
            drive: self.drive,
            window_s: self.window,
            gain_db: self.drive_gain,
        }
    }
}

/// Interface timing.
#[derive(Args, Debug, Clone)]
#[command(next_help_heading = "Session")]
pub struct SessionArgs {
    /// Sample rate in Hz (at least 44100)
    #[arg(long, alias = "fs", default_value_t = 48000)]
    pub sample_rate: u32,

    /// Frames per period; every block holds this many samples
    #[arg(long, alias = "nframes", default_value_t = 64)]
    pub block_size: usize,

    /// Periods per buffer
    #[arg(long, alias = "nperiods", default_value_t = 3)]
    pub periods: u32,
}

impl SessionArgs {
    /// Session settings without device names.
    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            sample_rate: self.sample_rate,
            block_size: self.block_size,
            periods: self.periods,
            ..SessionConfig::default()
        }
    }
}

/// Validate everything and build the chain.
pub fn build_chain(
    chain: &ChainArgs,
    compressor: &CompressorParams,
    overdrive: &OverdriveParams,
    session: &SessionConfig,
) -> anyhow::Result<EffectChain> {
    let layout = chain.layout()?;
    Ok(EffectChain::build(&layout, compressor, overdrive, session)?)
}

/// Log the operator warnings for a session.
pub fn warn_session(session: &SessionConfig) {
    for warning in session.warnings() {
        tracing::warn!("{warning}");
    }
}

/// Root mean square of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

/// Level in dB for display, floored at -120 dB.
pub fn display_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        -120.0
    } else {
        ripple_core::linear_to_db(linear).max(-120.0)
    }
}

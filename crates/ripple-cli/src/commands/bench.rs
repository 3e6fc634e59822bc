//! Per-block timing harness.
//!
//! Sweeps the main parameter of each engine in the chain and times every
//! block against the deadline the audio interface would impose. Compressor
//! runs sweep the compression depth, overdrive runs sweep the drive.

use super::common::{ChainArgs, CompressorArgs, OverdriveArgs, SessionArgs, build_chain, warn_session};
use clap::Args;
use ripple_config::{EffectKind, SessionConfig};
use ripple_core::Stage;
use ripple_effects::{CompressorParams, OverdriveParams};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Compression depths swept for the compressor, in dB.
const COMPRESSION_SWEEP: [f32; 6] = [0.0, 3.0, 6.0, 9.0, 12.0, 15.0];
/// Drive settings swept for the overdrive.
const DRIVE_SWEEP: [f32; 6] = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];

#[derive(Args)]
pub struct BenchArgs {
    #[command(flatten)]
    chain: ChainArgs,

    #[command(flatten)]
    compressor: CompressorArgs,

    #[command(flatten)]
    overdrive: OverdriveArgs,

    #[command(flatten)]
    session: SessionArgs,

    /// Blocks processed per sweep point
    #[arg(long, default_value_t = 1000)]
    blocks: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Timing for one sweep point.
#[derive(Debug, Serialize)]
struct SweepPoint {
    effect: &'static str,
    param: &'static str,
    value: f32,
    mean_us: f64,
    worst_us: f64,
    overruns: usize,
}

/// Full benchmark report.
#[derive(Debug, Serialize)]
struct Report {
    order: Vec<&'static str>,
    sample_rate: u32,
    block_size: usize,
    blocks: usize,
    deadline_us: f64,
    points: Vec<SweepPoint>,
}

pub fn run(args: BenchArgs) -> anyhow::Result<()> {
    if args.blocks == 0 {
        anyhow::bail!("--blocks must be at least 1");
    }

    let session = args.session.session();
    let compressor = args.compressor.params();
    let overdrive = args.overdrive.params();

    let order = build_chain(&args.chain, &compressor, &overdrive, &session)?.order();
    warn_session(&session);

    let layout = args.chain.layout()?;
    let deadline = session.block_period();
    let input = test_signal(&session, args.blocks);

    let mut points = Vec::new();
    for kind in layout.order()? {
        let sweep = match kind {
            EffectKind::Compressor => COMPRESSION_SWEEP,
            EffectKind::Overdrive => DRIVE_SWEEP,
        };
        for value in sweep {
            let (comp, drive) = swept(kind, value, &compressor, &overdrive);
            let mut chain = build_chain(&args.chain, &comp, &drive, &session)?;
            let (mean, worst, overruns) = time_blocks(&mut chain, &input, deadline)?;
            points.push(SweepPoint {
                effect: kind.name(),
                param: match kind {
                    EffectKind::Compressor => "compression",
                    EffectKind::Overdrive => "drive",
                },
                value,
                mean_us: micros(mean),
                worst_us: micros(worst),
                overruns,
            });
        }
    }

    let report = Report {
        order,
        sample_rate: session.sample_rate,
        block_size: session.block_size,
        blocks: args.blocks,
        deadline_us: micros(deadline),
        points,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn swept(
    kind: EffectKind,
    value: f32,
    compressor: &CompressorParams,
    overdrive: &OverdriveParams,
) -> (CompressorParams, OverdriveParams) {
    match kind {
        EffectKind::Compressor => (
            CompressorParams {
                compression_db: value,
                ..*compressor
            },
            *overdrive,
        ),
        EffectKind::Overdrive => (
            *compressor,
            OverdriveParams {
                drive: value,
                ..*overdrive
            },
        ),
    }
}

/// Low E string with a plucked decay, restruck every half second.
fn test_signal(session: &SessionConfig, blocks: usize) -> Vec<f32> {
    let fs = session.sample_rate as f32;
    let pluck = (fs * 0.5) as usize;
    (0..blocks * session.block_size)
        .map(|i| {
            let t = (i % pluck.max(1)) as f32 / fs;
            0.8 * (-6.0 * t).exp() * (2.0 * std::f32::consts::PI * 41.2 * t).sin()
        })
        .collect()
}

/// Mean and worst block time, and how many blocks missed the deadline.
fn time_blocks<S: Stage + ?Sized>(
    stage: &mut S,
    input: &[f32],
    deadline: Duration,
) -> anyhow::Result<(Duration, Duration, usize)> {
    let block_size = stage.block_size();
    let mut output = vec![0.0; block_size];
    let mut total = Duration::ZERO;
    let mut worst = Duration::ZERO;
    let mut overruns = 0;
    let mut count = 0u32;

    for block in input.chunks_exact(block_size) {
        let start = Instant::now();
        stage.process_block(block, &mut output)?;
        let elapsed = start.elapsed();

        total += elapsed;
        worst = worst.max(elapsed);
        if elapsed > deadline {
            overruns += 1;
        }
        count += 1;
    }

    let mean = if count == 0 { Duration::ZERO } else { total / count };
    Ok((mean, worst, overruns))
}

fn micros(d: Duration) -> f64 {
    d.as_secs_f64() * 1e6
}

fn print_report(report: &Report) {
    println!("Chain: {}", report.order.join(" -> "));
    println!(
        "{} blocks of {} frames at {} Hz, deadline {:.1} us per block\n",
        report.blocks, report.block_size, report.sample_rate, report.deadline_us
    );
    println!(
        "{:<12} {:<12} {:>7} {:>10} {:>10} {:>9}",
        "effect", "param", "value", "mean us", "worst us", "overruns"
    );
    for p in &report.points {
        println!(
            "{:<12} {:<12} {:>7.2} {:>10.2} {:>10.2} {:>9}",
            p.effect, p.param, p.value, p.mean_us, p.worst_us, p.overruns
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_length_and_range() {
        let session = SessionConfig::default();
        let signal = test_signal(&session, 10);
        assert_eq!(signal.len(), 640);
        assert!(signal.iter().all(|s| s.abs() <= 0.8));
    }

    #[test]
    fn test_swept_only_touches_one_engine() {
        let comp = CompressorParams::default();
        let drive = OverdriveParams::default();

        let (c, d) = swept(EffectKind::Compressor, 12.0, &comp, &drive);
        assert_eq!(c.compression_db, 12.0);
        assert_eq!(d, drive);

        let (c, d) = swept(EffectKind::Overdrive, 0.2, &comp, &drive);
        assert_eq!(c, comp);
        assert_eq!(d.drive, 0.2);
    }
}

//! File-based processing command.

use super::common::{ChainArgs, CompressorArgs, OverdriveArgs, build_chain, display_db, rms};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ripple_config::SessionConfig;
use ripple_core::peak_amplitude;
use ripple_io::{WavSpec, process_samples_with, read_wav, write_wav};
use std::path::PathBuf;

#[derive(Args)]
pub struct ProcessArgs {
    /// Input WAV file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    #[command(flatten)]
    chain: ChainArgs,

    #[command(flatten)]
    compressor: CompressorArgs,

    #[command(flatten)]
    overdrive: OverdriveArgs,

    /// Frames per block
    #[arg(long, alias = "nframes", default_value_t = 64)]
    block_size: usize,

    /// Output bit depth (16, 24, or 32)
    #[arg(long, default_value_t = 32, value_parser = parse_bit_depth)]
    bit_depth: u16,
}

fn parse_bit_depth(s: &str) -> Result<u16, String> {
    match s.parse::<u16>() {
        Ok(bits @ (16 | 24 | 32)) => Ok(bits),
        _ => Err(format!("unsupported bit depth '{s}' (expected 16, 24, or 32)")),
    }
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    println!("Reading {}...", args.input.display());
    let (samples, spec) = read_wav(&args.input)?;

    println!(
        "  {} samples, {} Hz, {:.2}s",
        samples.len(),
        spec.sample_rate,
        samples.len() as f32 / spec.sample_rate as f32
    );

    let session = SessionConfig {
        sample_rate: spec.sample_rate,
        block_size: args.block_size,
        ..SessionConfig::default()
    };
    let mut chain = build_chain(
        &args.chain,
        &args.compressor.params(),
        &args.overdrive.params(),
        &session,
    )?;

    println!("Processing: {}", chain.order().join(" -> "));

    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("##-"),
    );

    let output = process_samples_with(&mut chain, &samples, |done, _| {
        pb.set_position(done as u64);
    })?;

    pb.finish_with_message("done");

    println!("\nStats:");
    println!(
        "  Input:  RMS {:.1} dB, Peak {:.1} dB",
        display_db(rms(&samples)),
        display_db(peak_amplitude(&samples))
    );
    println!(
        "  Output: RMS {:.1} dB, Peak {:.1} dB",
        display_db(rms(&output)),
        display_db(peak_amplitude(&output))
    );

    let out_spec = WavSpec {
        channels: 1,
        sample_rate: spec.sample_rate,
        bits_per_sample: args.bit_depth,
    };

    println!("\nWriting {}...", args.output.display());
    write_wav(&args.output, &output, out_spec)?;
    println!("Done!");

    Ok(())
}

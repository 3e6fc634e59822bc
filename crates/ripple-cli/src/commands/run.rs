//! Real-time processing command.

use super::common::{ChainArgs, CompressorArgs, OverdriveArgs, SessionArgs, build_chain, warn_session};
use clap::Args;
use ripple_config::SessionConfig;
use ripple_io::{AudioStream, StreamConfig};
use std::sync::atomic::Ordering;

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    chain: ChainArgs,

    #[command(flatten)]
    compressor: CompressorArgs,

    #[command(flatten)]
    overdrive: OverdriveArgs,

    #[command(flatten)]
    session: SessionArgs,

    /// Input device name or index
    #[arg(long)]
    input_device: Option<String>,

    /// Output device name or index
    #[arg(long)]
    output_device: Option<String>,
}

pub fn run(args: RunArgs) -> anyhow::Result<()> {
    let session = SessionConfig {
        input_device: args.input_device,
        output_device: args.output_device,
        ..args.session.session()
    };

    // Every setting is checked before a device is touched
    let chain = build_chain(
        &args.chain,
        &args.compressor.params(),
        &args.overdrive.params(),
        &session,
    )?;
    warn_session(&session);

    let mut stream = AudioStream::new(StreamConfig {
        sample_rate: session.sample_rate,
        block_size: session.block_size,
        periods: session.periods,
        input_device: session.input_device.clone(),
        output_device: session.output_device.clone(),
    })?;

    println!("Real-time processing: {}", chain.order().join(" -> "));
    println!("  Input:  {}", stream.input_device_name());
    println!("  Output: {}", stream.output_device_name());
    println!("  Sample rate: {} Hz", session.sample_rate);
    println!(
        "  Block size: {} frames x {} periods ({:.2} ms)",
        session.block_size,
        session.periods,
        session.latency_ms()
    );
    println!("\nPress Ctrl+C to stop...\n");

    let stop = stream.stop_flag();
    ctrlc::set_handler(move || {
        stop.store(true, Ordering::SeqCst);
    })?;

    let stats = stream.run(chain)?;

    println!("\nStopped after {} blocks", stats.blocks);
    if stats.overruns > 0 {
        println!("  {} callback(s) missed their deadline", stats.overruns);
    }
    if stats.underruns > 0 {
        println!("  {} frame(s) played without input", stats.underruns);
    }
    if stats.dropped > 0 {
        println!("  {} input frame(s) dropped", stats.dropped);
    }
    Ok(())
}

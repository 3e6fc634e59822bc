//! Audio device listing command.

use clap::Args;
use ripple_io::{default_device, list_devices};

#[derive(Args)]
pub struct DevicesArgs {
    /// Show only the default input and output
    #[arg(long)]
    default: bool,
}

pub fn run(args: DevicesArgs) -> anyhow::Result<()> {
    if args.default {
        let (input, output) = default_device()?;
        match input {
            Some(d) => println!("Default input:  {} ({} Hz)", d.name, d.default_sample_rate),
            None => println!("Default input:  none"),
        }
        match output {
            Some(d) => println!("Default output: {} ({} Hz)", d.name, d.default_sample_rate),
            None => println!("Default output: none"),
        }
        return Ok(());
    }

    let devices = list_devices()?;
    if devices.is_empty() {
        println!("No audio devices found.");
        return Ok(());
    }

    println!("Available Audio Devices");
    println!("=======================\n");

    let inputs: Vec<_> = devices.iter().filter(|d| d.is_input).collect();
    if !inputs.is_empty() {
        println!("Input Devices:");
        for (idx, device) in inputs.iter().enumerate() {
            let also_output = if device.is_output { " (also output)" } else { "" };
            println!(
                "  [{}] {} ({} Hz){}",
                idx, device.name, device.default_sample_rate, also_output
            );
        }
        println!();
    }

    let outputs: Vec<_> = devices.iter().filter(|d| d.is_output).collect();
    if !outputs.is_empty() {
        println!("Output Devices:");
        for (idx, device) in outputs.iter().enumerate() {
            let also_input = if device.is_input { " (also input)" } else { "" };
            println!(
                "  [{}] {} ({} Hz){}",
                idx, device.name, device.default_sample_rate, also_input
            );
        }
        println!();
    }

    println!(
        "Total: {} input(s), {} output(s)",
        inputs.len(),
        outputs.len()
    );
    println!("\nUse a device index or partial name with --input-device/--output-device:");
    println!("  ripple run overdrive compressor --input-device 0 --output-device 0");

    Ok(())
}

//! Fixed scenarios for the compressor and overdrive engines.

use ripple_core::Stage;
use ripple_effects::{Compressor, CompressorParams, Overdrive, OverdriveParams};

const FS: f32 = 48000.0;

fn sine_block(len: usize, freq: f32, amp: f32, offset: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = (i + offset) as f32 / FS;
            amp * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

#[test]
fn silent_block_through_default_compressor() {
    let mut comp = Compressor::new(&CompressorParams::default(), FS, 4).unwrap();
    let input = [0.0_f32; 4];
    let mut output = [1.0_f32; 4];
    comp.process_block(&input, &mut output).unwrap();
    assert_eq!(output, [0.0; 4]);
    assert_eq!(comp.gain_reduction_db(), 0.0);
}

#[test]
fn impulse_after_silence_sets_peak() {
    let mut od = Overdrive::new(&OverdriveParams::default(), FS, 4).unwrap();
    assert_eq!(od.peak_window(), 6000);

    let mut silence = [0.0_f32; 4];
    for _ in 0..500 {
        od.process_block_inplace(&mut silence).unwrap();
    }
    assert_eq!(od.peak(), 0.0);

    let mut block = [0.25, -1.0, 0.5, 0.0];
    od.process_block_inplace(&mut block).unwrap();
    assert_eq!(od.peak(), 1.0);
    assert_eq!(od.peak_count(), 0);
}

#[test]
fn peak_decays_after_window_passes() {
    // 10 ms window at 64-sample blocks: 8 blocks
    let params = OverdriveParams {
        window_s: 0.01,
        ..OverdriveParams::default()
    };
    let mut od = Overdrive::new(&params, FS, 64).unwrap();
    assert_eq!(od.peak_window(), 8);

    let mut loud = vec![0.9_f32; 64];
    od.process_block_inplace(&mut loud).unwrap();

    for i in 1..8 {
        let mut quiet = vec![0.1_f32; 64];
        od.process_block_inplace(&mut quiet).unwrap();
        assert_eq!(od.peak(), 0.9, "loud block dropped early at {i}");
        assert_eq!(od.peak_count(), i);
    }

    let mut quiet = vec![0.1_f32; 64];
    od.process_block_inplace(&mut quiet).unwrap();
    assert!((od.peak() - 0.1).abs() < 1e-7);
}

#[test]
fn overdrive_output_level_follows_drive() {
    // Lower drive gives a larger coefficient and gentler shaping, so the
    // quiet parts of a waveform are scaled up less relative to the peak.
    let input = sine_block(256, 220.0, 0.5, 0);
    let mut hot = Overdrive::new(
        &OverdriveParams {
            drive: 1.0,
            ..OverdriveParams::default()
        },
        FS,
        256,
    )
    .unwrap();
    let mut mild = Overdrive::new(
        &OverdriveParams {
            drive: 0.0,
            ..OverdriveParams::default()
        },
        FS,
        256,
    )
    .unwrap();

    let mut a = input.clone();
    let mut b = input.clone();
    hot.process_block_inplace(&mut a).unwrap();
    mild.process_block_inplace(&mut b).unwrap();

    let energy = |v: &[f32]| v.iter().map(|x| x * x).sum::<f32>();
    assert!(energy(&a) > energy(&b));
}

#[test]
fn stage_order_matters() {
    let input = sine_block(128, 440.0, 0.7, 0);

    let run = |comp_first: bool| -> Vec<f32> {
        let mut comp = Compressor::new(&CompressorParams::default(), FS, 128).unwrap();
        let mut od = Overdrive::new(&OverdriveParams::default(), FS, 128).unwrap();
        let mut out = vec![0.0; 128];
        if comp_first {
            comp.process_block(&input, &mut out).unwrap();
            od.process_block_inplace(&mut out).unwrap();
        } else {
            od.process_block(&input, &mut out).unwrap();
            comp.process_block_inplace(&mut out).unwrap();
        }
        out
    };

    let ab = run(true);
    let ba = run(false);
    assert_eq!(ab, run(true));
    assert!(ab.iter().zip(&ba).any(|(x, y)| (x - y).abs() > 1e-4));
}

#[test]
fn long_run_stays_finite() {
    let mut comp = Compressor::new(&CompressorParams::default(), FS, 64).unwrap();
    let mut od = Overdrive::new(&OverdriveParams::default(), FS, 64).unwrap();
    for n in 0..2000 {
        let amp = if (n / 100) % 2 == 0 { 0.8 } else { 0.01 };
        let mut block = sine_block(64, 330.0, amp, n * 64);
        comp.process_block_inplace(&mut block).unwrap();
        od.process_block_inplace(&mut block).unwrap();
        assert!(block.iter().all(|x| x.is_finite()), "non-finite at block {n}");
        assert!(od.peak_count() < od.peak_window());
    }
}

//! Property-based tests for the compressor and overdrive engines.
//!
//! Covers knee continuity, smoother convergence, the sliding-window peak
//! invariant and waveshaper bounds using proptest for randomized inputs.

use proptest::prelude::*;
use ripple_core::Stage;
use ripple_effects::{
    Compressor, CompressorParams, GainComputer, Overdrive, OverdriveParams, PeakWindow, shape,
};

fn window_max(store: &[f32]) -> f32 {
    store.iter().fold(0.0_f32, |a, &b| a.max(b))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// The static curve matches in value and slope at both knee edges.
    #[test]
    fn knee_continuity(
        threshold in -80.0f32..0.0f32,
        knee in 0.5f32..24.0f32,
        ratio in 20.1f32..200.0f32,
    ) {
        let gc = GainComputer::new(threshold, knee, ratio);
        let h = 1e-2_f32;

        for edge in [threshold - knee / 2.0, threshold + knee / 2.0] {
            let below = gc.static_curve(edge - h).unwrap();
            let at = gc.static_curve(edge).unwrap();
            let above = gc.static_curve(edge + h).unwrap();

            // value: each side within one slope step of the edge
            prop_assert!((at - below).abs() <= h * 1.01 + 1e-3);
            prop_assert!((above - at).abs() <= h * 1.01 + 1e-3);

            // slope: one-sided derivatives agree to within the curvature over h
            let left = (at - below) / h;
            let right = (above - at) / h;
            let curvature = (1.0 - 1.0 / ratio) / knee;
            prop_assert!(
                (left - right).abs() <= curvature * h + 0.05,
                "slope jump at {}: {} vs {}", edge, left, right
            );
        }
    }

    /// Gain reduction is never positive for finite levels.
    #[test]
    fn gain_reduction_non_positive(
        db in -200.0f32..60.0f32,
        threshold in -80.0f32..0.0f32,
        knee in 0.0f32..24.0f32,
        ratio in 20.1f32..200.0f32,
    ) {
        let gc = GainComputer::new(threshold, knee, ratio);
        let r = gc.gain_reduction_db(db).unwrap();
        prop_assert!(r <= 1e-4, "gc {} at {} dB", r, db);
    }

    /// A constant demand pulls the smoothed state monotonically toward it.
    #[test]
    fn smoother_converges_monotonically(
        start in -60.0f32..0.0f32,
        target in -60.0f32..0.0f32,
    ) {
        let params = CompressorParams { release_s: 0.025, ..CompressorParams::default() };
        let comp = Compressor::new(&params, 48000.0, 64).unwrap();
        let mut gs = start;
        let mut dist = (gs - target).abs();
        for _ in 0..20_000 {
            gs = comp.smooth(gs, target).unwrap();
            let d = (gs - target).abs();
            prop_assert!(d <= dist + 1e-5);
            dist = d;
        }
        prop_assert!(dist < 1e-2, "still {} dB away", dist);
    }

    /// Zero, NaN and infinite samples come out silent and drive the
    /// smoother exactly as a 0 dB demand would.
    #[test]
    fn anomalies_silent_and_continuous(
        lead in prop::collection::vec(0.01f32..1.0f32, 16),
        kind in 0usize..4,
    ) {
        let params = CompressorParams::default();
        let mut comp = Compressor::new(&params, 48000.0, 16).unwrap();
        let mut block = [0.0_f32; 16];
        block.copy_from_slice(&lead);
        comp.process_block_inplace(&mut block).unwrap();
        let before = comp.gain_reduction_db();

        let anomaly = [0.0, f32::NAN, f32::INFINITY, f32::NEG_INFINITY][kind];
        let mut block = [anomaly; 16];
        comp.process_block_inplace(&mut block).unwrap();
        prop_assert!(block.iter().all(|&y| y == 0.0));

        let mut expected = before;
        for _ in 0..16 {
            expected = comp.smooth(expected, 0.0).unwrap();
        }
        prop_assert!((comp.gain_reduction_db() - expected).abs() < 1e-5);
    }

    /// After every push the tracked peak equals the ring maximum.
    #[test]
    fn peak_window_invariant(
        len in 1usize..24,
        peaks in prop::collection::vec(prop_oneof![Just(0.0f32), 0.0f32..1.0f32], 1..200),
    ) {
        let mut w = PeakWindow::new(len).unwrap();
        for (i, &p) in peaks.iter().enumerate() {
            w.push(p);
            prop_assert_eq!(w.peak(), window_max(w.store()), "after block {}", i);
            prop_assert!(w.peak_count() < w.len());
        }
    }

    /// The same invariant holds through the full overdrive engine.
    #[test]
    fn overdrive_peak_invariant(
        window_s in 0.0f32..0.01f32,
        blocks in prop::collection::vec(prop::collection::vec(-1.0f32..1.0f32, 32), 1..40),
    ) {
        let params = OverdriveParams { window_s, ..OverdriveParams::default() };
        let mut od = Overdrive::new(&params, 48000.0, 32).unwrap();
        for samples in &blocks {
            let mut block = samples.clone();
            od.process_block_inplace(&mut block).unwrap();
            prop_assert_eq!(od.peak(), window_max(od.window_store()));
        }
    }

    /// The curve never exceeds the envelope for any input.
    #[test]
    fn shape_bounded_by_envelope(
        norm in -10.0f32..10.0f32,
        envelope in 0.0f32..4.0f32,
    ) {
        let y = shape(norm, envelope).unwrap();
        prop_assert!(y.abs() <= envelope * (1.0 + 1e-6));
    }

    /// Samples within the envelope never exceed envelope / norm_factor · gain.
    #[test]
    fn overdrive_output_bounded(
        drive in 0.0f32..=1.0f32,
        gain_db in -12.0f32..12.0f32,
        samples in prop::collection::vec(-1.0f32..1.0f32, 64),
    ) {
        let params = OverdriveParams { drive, window_s: 0.5, gain_db };
        let mut od = Overdrive::new(&params, 48000.0, 64).unwrap();
        let mut block = samples.clone();
        od.process_block_inplace(&mut block).unwrap();

        let bound = od.peak() * od.drive_coeff() / od.norm_factor() * od.makeup_gain();
        for &y in &block {
            prop_assert!(y.is_finite());
            prop_assert!(y.abs() <= bound * (1.0 + 1e-5) + 1e-7, "{} exceeds {}", y, bound);
        }
    }
}

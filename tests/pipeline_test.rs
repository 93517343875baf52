// tests/pipeline_test.rs
//
// End-to-end pipeline tests against synthetic recordings.

use std::f32::consts::PI;

use cardioscan::core::{CycleClassifier, HeartSoundAnalyzer, StandardScaler};
use cardioscan::error::AnalysisError;
use cardioscan::{PipelineConfig, RiskTier};

/// Classifier stub that scores every cycle with a fixed probability
struct ConstantClassifier {
    feature_len: usize,
    probability: f32,
}

impl CycleClassifier for ConstantClassifier {
    fn feature_len(&self) -> usize {
        self.feature_len
    }

    fn predict_probability(&self, _features: &[f32]) -> f32 {
        self.probability
    }
}

fn analyzer_with_probability(probability: f32) -> HeartSoundAnalyzer {
    let feature_len = PipelineConfig::default().feature_len();
    HeartSoundAnalyzer::builder()
        .with_artifacts(
            Box::new(StandardScaler::identity(feature_len)),
            Box::new(ConstantClassifier { feature_len, probability }),
        )
        .build()
        .expect("analyzer with stub artifacts")
}

/// Synthesize a heart-sound-like recording: Gaussian-windowed 60 Hz bursts
/// at a fixed beat interval on an otherwise silent track.
fn pulse_train(n_beats: usize, interval_secs: f32, sample_rate: u32) -> Vec<f32> {
    let interval = (interval_secs * sample_rate as f32) as usize;
    let total = interval * (n_beats + 1);
    let mut signal = vec![0.0f32; total];

    let burst_half = 100usize;
    for b in 0..n_beats {
        let center = interval / 2 + b * interval;
        for i in 0..(2 * burst_half) {
            let t = i as f32 - burst_half as f32;
            let env = (-t * t / (2.0 * 30.0 * 30.0)).exp();
            signal[center + i - burst_half] +=
                env * (2.0 * PI * 60.0 * t / sample_rate as f32).sin();
        }
    }
    signal
}

#[test]
fn five_beats_make_three_cycles_at_sixty_bpm() {
    let analyzer = analyzer_with_probability(0.1);
    let signal = pulse_train(5, 1.0, 1000);

    let result = analyzer.analyze_samples(&signal, 1000).unwrap();

    assert_eq!(result.num_cycles, 3);
    assert_eq!(result.cycles.len(), 3);
    assert!(
        (result.heart_rate - 60.0).abs() < 3.0,
        "expected ~60 BPM, got {}",
        result.heart_rate
    );
    assert_eq!(result.risk_level, RiskTier::Low);
    assert_eq!(result.prediction, "Normal Heart Sound");

    // Consecutive cycles overlap by one beat
    for pair in result.cycles.windows(2) {
        assert!(pair[1].start_secs < pair[0].end_secs);
    }
}

#[test]
fn worst_cycle_decides_the_risk_tier() {
    let analyzer = analyzer_with_probability(0.65);
    let signal = pulse_train(5, 1.0, 1000);

    let result = analyzer.analyze_samples(&signal, 1000).unwrap();
    assert_eq!(result.probability, 0.65);
    assert_eq!(result.risk_level, RiskTier::Critical);
    assert_eq!(result.prediction, "Severe Abnormality");
}

#[test]
fn recording_at_other_rate_is_resampled() {
    let analyzer = analyzer_with_probability(0.1);
    let signal = pulse_train(5, 1.0, 4000);

    let result = analyzer.analyze_samples(&signal, 4000).unwrap();
    assert_eq!(result.num_cycles, 3);
    assert!(
        (result.heart_rate - 60.0).abs() < 3.0,
        "expected ~60 BPM, got {}",
        result.heart_rate
    );
}

#[test]
fn silent_recording_is_rejected() {
    let analyzer = analyzer_with_probability(0.1);
    let err = analyzer.analyze_samples(&vec![0.0; 5000], 1000).unwrap_err();
    assert!(matches!(err, AnalysisError::InvalidAudio(_)));
}

#[test]
fn two_beats_are_not_enough() {
    let analyzer = analyzer_with_probability(0.1);
    let signal = pulse_train(2, 1.0, 1000);

    let err = analyzer.analyze_samples(&signal, 1000).unwrap_err();
    match err {
        AnalysisError::InsufficientBeats { found, needed } => {
            assert_eq!(found, 2);
            assert_eq!(needed, 3);
        }
        other => panic!("expected InsufficientBeats, got {other:?}"),
    }
}

#[test]
fn analysis_is_deterministic() {
    let analyzer = analyzer_with_probability(0.42);
    let signal = pulse_train(6, 0.8, 1000);

    let a = analyzer.analyze_samples(&signal, 1000).unwrap();
    let b = analyzer.analyze_samples(&signal, 1000).unwrap();
    assert_eq!(a, b);
}

#[test]
fn wav_file_round_trip() {
    let analyzer = analyzer_with_probability(0.1);
    let signal = pulse_train(5, 1.0, 4000);

    let path = std::env::temp_dir().join("cardioscan_pipeline_test.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 4000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for &s in &signal {
        writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();

    let result = analyzer.analyze_file(&path).unwrap();
    assert_eq!(result.num_cycles, 3);
    assert!((result.heart_rate - 60.0).abs() < 3.0);
    assert!((result.duration_secs - 6.0).abs() < 0.1);

    let _ = std::fs::remove_file(&path);
}

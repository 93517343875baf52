//! CardioScan - Heart sound screening from phonocardiogram recordings
//!
//! Turns a raw heart sound recording into a screening decision: the signal is
//! resampled and bandpass filtered, heartbeats are located on the analytic
//! envelope, overlapping two-beat cycles are cut out and scored by a
//! pretrained classifier, and the worst cycle decides the risk tier.
//!
//! ## Pipeline
//!
//! 1. Decode and downmix to mono (`core::decoder`)
//! 2. Resample to 1 kHz and peak-normalize (`core::dsp::filters`)
//! 3. Zero-phase Butterworth bandpass, 25-400 Hz (`core::dsp::filters`)
//! 4. Analytic envelope and beat detection (`core::dsp::envelope`)
//! 5. Cycle segmentation and heart rate (`core::analysis::segmentation`)
//! 6. Per-cycle MFCC features (`core::analysis::mfcc`)
//! 7. Scale, classify, aggregate (`core::model`, `detection`)
//!
//! ## Module Structure
//!
//! - `core` - DSP, feature extraction, model loading, and the analyzer
//! - `cli` - Terminal and JSON output formatting
//! - `config` - Pipeline parameters
//! - `detection` - Result and risk-classification types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cardioscan::core::HeartSoundAnalyzer;
//!
//! let analyzer = HeartSoundAnalyzer::builder()
//!     .scaler_path("artifacts/scaler.json")
//!     .model_path("artifacts/model.json")
//!     .build()?;
//!
//! let result = analyzer.analyze_file(path)?;
//! println!("{} ({:.1}%)", result.prediction, result.probability * 100.0);
//! ```

// Core analysis functionality
pub mod core;

// Command-line interface
pub mod cli;

// Pipeline configuration
pub mod config;

// Result types
pub mod detection;

// Error types
pub mod error;

// Re-export commonly used types at crate root for convenience
pub use config::PipelineConfig;
pub use core::{
    AnalyzerBuilder, AudioData, CycleClassifier, CycleSpan, FeatureScaler, HeartSoundAnalyzer,
    LogisticClassifier, MfccExtractor, StandardScaler,
};
pub use detection::{AnalysisResult, CycleScore, HeartRateStatus, RiskTier};
pub use error::AnalysisError;

//! Signal processing pipeline and scoring

pub mod analysis;
pub mod analyzer;
pub mod decoder;
pub mod dsp;
pub mod model;

pub use analysis::{CycleSpan, MfccExtractor};
pub use analyzer::{AnalyzerBuilder, HeartSoundAnalyzer};
pub use decoder::{decode_audio, extract_mono, AudioData};
pub use model::{CycleClassifier, FeatureScaler, LogisticClassifier, StandardScaler};

//! Cycle segmentation and spectral feature extraction

pub mod mfcc;
pub mod segmentation;

pub use mfcc::MfccExtractor;
pub use segmentation::{heart_rate_bpm, segment_cycles, CycleSpan};

//! Pretrained model artifacts
//!
//! The scaler and classifier are opaque inputs to the pipeline: the scorer
//! only sees the two capability traits below, so any compatible artifact
//! format can be substituted. The shipped implementations deserialize JSON
//! artifacts and validate their width against the feature extractor once,
//! at load time.

mod classifier;
mod scaler;

pub use classifier::{CycleClassifier, LogisticClassifier};
pub use scaler::{FeatureScaler, StandardScaler};

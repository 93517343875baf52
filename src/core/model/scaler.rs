// src/core/model/scaler.rs
//
// Pretrained feature scaler: per-feature affine transform fit offline.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Capability interface for the feature scaling artifact
pub trait FeatureScaler: Send + Sync {
    /// Width of the vectors this scaler was fit on
    fn feature_len(&self) -> usize;

    /// Scale one feature vector in place
    fn transform(&self, features: &mut [f32]);
}

/// Standard scaler: `(x - mean) / scale` per feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl StandardScaler {
    /// Load from a JSON artifact and validate against the expected width
    pub fn load(path: &Path, expected_len: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AnalysisError::ModelLoad(format!("cannot open scaler {}: {e}", path.display()))
        })?;

        let scaler: StandardScaler = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                AnalysisError::ModelLoad(format!("cannot parse scaler {}: {e}", path.display()))
            })?;

        scaler.validate(expected_len)?;
        Ok(scaler)
    }

    /// A no-op scaler of the given width (useful for smoke testing)
    pub fn identity(len: usize) -> Self {
        Self {
            mean: vec![0.0; len],
            scale: vec![1.0; len],
        }
    }

    pub fn new(mean: Vec<f32>, scale: Vec<f32>) -> Result<Self> {
        let scaler = Self { mean, scale };
        scaler.validate(scaler.mean.len())?;
        Ok(scaler)
    }

    fn validate(&self, expected_len: usize) -> Result<()> {
        if self.mean.len() != expected_len || self.scale.len() != expected_len {
            return Err(AnalysisError::ModelLoad(format!(
                "scaler width mismatch: mean {} / scale {} vs feature width {}",
                self.mean.len(),
                self.scale.len(),
                expected_len
            )));
        }
        if self.scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(AnalysisError::ModelLoad(
                "scaler contains zero or non-finite scale factors".to_string(),
            ));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(AnalysisError::ModelLoad(
                "scaler contains non-finite means".to_string(),
            ));
        }
        Ok(())
    }
}

impl FeatureScaler for StandardScaler {
    fn feature_len(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, features: &mut [f32]) {
        for ((x, &m), &s) in features.iter_mut().zip(&self.mean).zip(&self.scale) {
            *x = (*x - m) / s;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform() {
        let scaler = StandardScaler::new(vec![1.0, 2.0], vec![2.0, 4.0]).unwrap();
        let mut features = vec![3.0, 10.0];
        scaler.transform(&mut features);
        assert_eq!(features, vec![1.0, 2.0]);
    }

    #[test]
    fn test_identity_is_noop() {
        let scaler = StandardScaler::identity(3);
        let mut features = vec![0.5, -0.25, 2.0];
        scaler.transform(&mut features);
        assert_eq!(features, vec![0.5, -0.25, 2.0]);
    }

    #[test]
    fn test_zero_scale_rejected() {
        assert!(matches!(
            StandardScaler::new(vec![0.0], vec![0.0]),
            Err(AnalysisError::ModelLoad(_))
        ));
    }

    #[test]
    fn test_load_round_trip_and_dimension_check() {
        let dir = std::env::temp_dir();
        let path = dir.join("cardioscan_scaler_test.json");
        let scaler = StandardScaler::identity(4);
        std::fs::write(&path, serde_json::to_string(&scaler).unwrap()).unwrap();

        assert!(StandardScaler::load(&path, 4).is_ok());
        assert!(matches!(
            StandardScaler::load(&path, 8),
            Err(AnalysisError::ModelLoad(_))
        ));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_model_load_error() {
        let path = Path::new("/nonexistent/scaler.json");
        assert!(matches!(
            StandardScaler::load(path, 4),
            Err(AnalysisError::ModelLoad(_))
        ));
    }
}

// src/core/model/classifier.rs
//
// Pretrained binary classifier: scaled cycle features in, abnormality
// probability out.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Capability interface for the classifier artifact
pub trait CycleClassifier: Send + Sync {
    /// Width of the feature vectors this model was fit on
    fn feature_len(&self) -> usize;

    /// Probability of the positive ("abnormal") class, in [0, 1]
    fn predict_probability(&self, features: &[f32]) -> f32;
}

/// Linear logistic model: `sigmoid(w . x + b)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    weights: Vec<f32>,
    bias: f32,
}

impl LogisticClassifier {
    /// Load from a JSON artifact and validate against the expected width
    pub fn load(path: &Path, expected_len: usize) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            AnalysisError::ModelLoad(format!("cannot open model {}: {e}", path.display()))
        })?;

        let model: LogisticClassifier = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| {
                AnalysisError::ModelLoad(format!("cannot parse model {}: {e}", path.display()))
            })?;

        model.validate(expected_len)?;
        Ok(model)
    }

    pub fn new(weights: Vec<f32>, bias: f32) -> Result<Self> {
        let model = Self { weights, bias };
        model.validate(model.weights.len())?;
        Ok(model)
    }

    fn validate(&self, expected_len: usize) -> Result<()> {
        if self.weights.len() != expected_len {
            return Err(AnalysisError::ModelLoad(format!(
                "model width mismatch: {} weights vs feature width {}",
                self.weights.len(),
                expected_len
            )));
        }
        if self.weights.iter().any(|w| !w.is_finite()) || !self.bias.is_finite() {
            return Err(AnalysisError::ModelLoad(
                "model contains non-finite parameters".to_string(),
            ));
        }
        Ok(())
    }
}

impl CycleClassifier for LogisticClassifier {
    fn feature_len(&self) -> usize {
        self.weights.len()
    }

    fn predict_probability(&self, features: &[f32]) -> f32 {
        let logit: f32 = self
            .weights
            .iter()
            .zip(features.iter())
            .map(|(&w, &x)| w * x)
            .sum::<f32>()
            + self.bias;

        1.0 / (1.0 + (-logit).exp())
    }
}

//! Error types for the heart sound analysis pipeline

use thiserror::Error;

/// Errors that can occur while analyzing a recording
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Input waveform is unreadable, empty, or silent
    #[error("Invalid audio input: {0}")]
    InvalidAudio(String),

    /// Fewer than the minimum number of heartbeats were detected.
    /// Usually a non-cardiac, too-short, or too-noisy recording.
    #[error("Not enough heart beats detected: found {found}, need at least {needed}")]
    InsufficientBeats { found: usize, needed: usize },

    /// Pretrained artifact missing, corrupt, or dimensionally incompatible
    /// with the feature extractor. A deployment fault, not an input fault.
    #[error("Model artifact error: {0}")]
    ModelLoad(String),

    /// Audio container/codec could not be decoded
    #[error("Decoding error: {0}")]
    Decode(String),

    /// Numerical or internal processing failure
    #[error("Processing error: {0}")]
    Processing(String),
}

impl AnalysisError {
    /// Whether the error is a per-request input fault (as opposed to a
    /// deployment/configuration fault that should stop the service).
    pub fn is_input_fault(&self) -> bool {
        !matches!(self, AnalysisError::ModelLoad(_))
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_beats_message() {
        let err = AnalysisError::InsufficientBeats { found: 2, needed: 3 };
        let msg = err.to_string();
        assert!(msg.contains("found 2"));
        assert!(msg.contains("at least 3"));
    }

    #[test]
    fn test_fault_classification() {
        assert!(AnalysisError::InvalidAudio("silent".into()).is_input_fault());
        assert!(AnalysisError::InsufficientBeats { found: 0, needed: 3 }.is_input_fault());
        assert!(!AnalysisError::ModelLoad("missing".into()).is_input_fault());
    }
}

// src/config/pipeline.rs
//
// All sample-rate-coupled pipeline constants in one place. The beat
// thresholds were chosen against 1000 Hz recordings and the pretrained
// artifacts were fit on features derived at that rate, so every derived
// parameter (filter band, frame geometry, peak spacing) hangs off the one
// canonical rate and is validated together at startup.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Pipeline configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Canonical analysis sample rate in Hz (default: 1000).
    /// Input at any other rate is resampled to this before filtering.
    pub sample_rate: u32,

    /// Bandpass low cut in Hz (default: 25.0)
    pub band_low_hz: f32,

    /// Bandpass high cut in Hz (default: 400.0)
    pub band_high_hz: f32,

    /// Butterworth filter order (default: 4)
    pub filter_order: usize,

    /// Minimum spacing between detected beats in seconds (default: 0.4).
    /// Policy constant reflecting a physiological ceiling on beat rate.
    pub min_peak_spacing_secs: f32,

    /// Peak height threshold as a multiple of the envelope mean
    /// (default: 1.2). Policy constant, not a derived value.
    pub peak_height_factor: f32,

    /// Minimum number of detected beats required to segment at least one
    /// cardiac cycle (default: 3)
    pub min_peaks: usize,

    /// Number of MFCC coefficients per frame (default: 13)
    pub n_mfcc: usize,

    /// Number of mel filterbank bands (default: 26)
    pub n_mels: usize,

    /// FFT size for the MFCC short-time transform (default: 512)
    pub n_fft: usize,

    /// Hop length between MFCC frames in samples (default: 128)
    pub hop_length: usize,

    /// Frame cap for the fixed-length feature vector (default: 260).
    /// Longer cycles are truncated, shorter ones zero-padded, so every
    /// cycle yields `n_mfcc * max_frames` features.
    pub max_frames: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 1000,
            band_low_hz: 25.0,
            band_high_hz: 400.0,
            filter_order: 4,
            min_peak_spacing_secs: 0.4,
            peak_height_factor: 1.2,
            min_peaks: 3,
            n_mfcc: 13,
            n_mels: 26,
            n_fft: 512,
            hop_length: 128,
            max_frames: 260,
        }
    }
}

impl PipelineConfig {
    /// Length of the flattened per-cycle feature vector.
    /// The scaler and classifier must match this width.
    pub fn feature_len(&self) -> usize {
        self.n_mfcc * self.max_frames
    }

    /// Minimum peak spacing expressed in samples at the canonical rate
    pub fn min_peak_spacing_samples(&self) -> usize {
        (self.min_peak_spacing_secs * self.sample_rate as f32) as usize
    }

    /// Validate internal consistency. Called once when the analyzer is
    /// constructed; a config that fails here is a deployment fault.
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::Processing(
                "sample_rate must be positive".to_string(),
            ));
        }

        let nyquist = self.sample_rate as f32 / 2.0;

        if self.band_low_hz <= 0.0 || self.band_high_hz <= self.band_low_hz {
            return Err(AnalysisError::Processing(format!(
                "invalid passband: {} - {} Hz",
                self.band_low_hz, self.band_high_hz
            )));
        }
        if self.band_high_hz >= nyquist {
            return Err(AnalysisError::Processing(format!(
                "band high cut {} Hz must be below Nyquist ({} Hz)",
                self.band_high_hz, nyquist
            )));
        }
        if self.filter_order == 0 {
            return Err(AnalysisError::Processing(
                "filter_order must be at least 1".to_string(),
            ));
        }
        if self.min_peaks < 3 {
            return Err(AnalysisError::Processing(
                "min_peaks must be at least 3 to form one cycle".to_string(),
            ));
        }
        if self.n_mfcc == 0 || self.n_mfcc > self.n_mels {
            return Err(AnalysisError::Processing(format!(
                "n_mfcc ({}) must be in 1..=n_mels ({})",
                self.n_mfcc, self.n_mels
            )));
        }
        if self.hop_length == 0 || self.hop_length > self.n_fft {
            return Err(AnalysisError::Processing(format!(
                "hop_length ({}) must be in 1..=n_fft ({})",
                self.hop_length, self.n_fft
            )));
        }
        if !self.n_fft.is_power_of_two() {
            return Err(AnalysisError::Processing(format!(
                "n_fft ({}) must be a power of two",
                self.n_fft
            )));
        }
        if self.max_frames == 0 {
            return Err(AnalysisError::Processing(
                "max_frames must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.feature_len(), 13 * 260);
        assert_eq!(config.min_peak_spacing_samples(), 400);
    }

    #[test]
    fn test_band_above_nyquist_rejected() {
        let config = PipelineConfig {
            band_high_hz: 600.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_band_rejected() {
        let config = PipelineConfig {
            band_low_hz: 300.0,
            band_high_hz: 100.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_too_few_min_peaks_rejected() {
        let config = PipelineConfig {
            min_peaks: 2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

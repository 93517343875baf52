// src/core/analyzer.rs
//
// High-level heart sound analysis API with builder pattern.

use std::path::{Path, PathBuf};

use super::analysis::{heart_rate_bpm, segment_cycles, MfccExtractor};
use super::decoder::{decode_audio, extract_mono};
use super::dsp::{analytic_envelope, detect_beats, normalize_peak, resample, BandpassFilter};
use super::model::{CycleClassifier, FeatureScaler, LogisticClassifier, StandardScaler};
use crate::config::PipelineConfig;
use crate::detection::{AnalysisResult, CycleScore};
use crate::error::{AnalysisError, Result};

/// Builder for HeartSoundAnalyzer configuration
pub struct AnalyzerBuilder {
    config: PipelineConfig,
    scaler_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    artifacts: Option<(Box<dyn FeatureScaler>, Box<dyn CycleClassifier>)>,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            scaler_path: None,
            model_path: None,
            artifacts: None,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Path to the JSON scaler artifact
    pub fn scaler_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scaler_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Path to the JSON classifier artifact
    pub fn model_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.model_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Inject preloaded artifacts instead of reading them from disk
    pub fn with_artifacts(
        mut self,
        scaler: Box<dyn FeatureScaler>,
        classifier: Box<dyn CycleClassifier>,
    ) -> Self {
        self.artifacts = Some((scaler, classifier));
        self
    }

    /// Validate the configuration, design the filter, and load the model.
    ///
    /// Artifact width is checked against the feature extractor here so a
    /// mismatched model fails fast rather than mid-recording.
    pub fn build(self) -> Result<HeartSoundAnalyzer> {
        self.config.validate()?;

        let filter = BandpassFilter::new(
            self.config.band_low_hz,
            self.config.band_high_hz,
            self.config.filter_order,
            self.config.sample_rate,
        )?;

        let extractor = MfccExtractor::new(&self.config);
        let feature_len = extractor.feature_len();

        let (scaler, classifier): (Box<dyn FeatureScaler>, Box<dyn CycleClassifier>) =
            match self.artifacts {
                Some(pair) => pair,
                None => {
                    let scaler_path = self.scaler_path.ok_or_else(|| {
                        AnalysisError::ModelLoad("no scaler artifact configured".to_string())
                    })?;
                    let model_path = self.model_path.ok_or_else(|| {
                        AnalysisError::ModelLoad("no model artifact configured".to_string())
                    })?;

                    (
                        Box::new(StandardScaler::load(&scaler_path, feature_len)?),
                        Box::new(LogisticClassifier::load(&model_path, feature_len)?),
                    )
                }
            };

        if scaler.feature_len() != feature_len {
            return Err(AnalysisError::ModelLoad(format!(
                "scaler width {} does not match feature width {}",
                scaler.feature_len(),
                feature_len
            )));
        }
        if classifier.feature_len() != feature_len {
            return Err(AnalysisError::ModelLoad(format!(
                "model width {} does not match feature width {}",
                classifier.feature_len(),
                feature_len
            )));
        }

        Ok(HeartSoundAnalyzer {
            config: self.config,
            filter,
            extractor,
            scaler,
            classifier,
        })
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Heart sound analyzer: recording in, risk decision out
pub struct HeartSoundAnalyzer {
    config: PipelineConfig,
    filter: BandpassFilter,
    extractor: MfccExtractor,
    scaler: Box<dyn FeatureScaler>,
    classifier: Box<dyn CycleClassifier>,
}

impl std::fmt::Debug for HeartSoundAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeartSoundAnalyzer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HeartSoundAnalyzer {
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode a recording from disk and analyze it
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisResult> {
        let audio = decode_audio(path)?;
        let mono = extract_mono(&audio);
        self.analyze_samples(&mono, audio.sample_rate)
    }

    /// Run the full pipeline over raw mono samples
    pub fn analyze_samples(&self, samples: &[f32], sample_rate: u32) -> Result<AnalysisResult> {
        if samples.is_empty() {
            return Err(AnalysisError::InvalidAudio(
                "recording contains no samples".to_string(),
            ));
        }

        let target_rate = self.config.sample_rate;
        let mut signal = if sample_rate == target_rate {
            samples.to_vec()
        } else {
            resample(samples, sample_rate, target_rate)?
        };
        let duration_secs = signal.len() as f64 / target_rate as f64;

        normalize_peak(&mut signal)?;
        let filtered = self.filter.filtfilt(&signal)?;

        let envelope = analytic_envelope(&filtered);
        let peaks = detect_beats(
            &envelope,
            self.config.peak_height_factor,
            self.config.min_peak_spacing_samples(),
        );

        if peaks.len() < self.config.min_peaks {
            return Err(AnalysisError::InsufficientBeats {
                found: peaks.len(),
                needed: self.config.min_peaks,
            });
        }

        let spans = segment_cycles(&peaks, target_rate);
        let heart_rate = heart_rate_bpm(&peaks, target_rate);

        log::debug!(
            "{} peaks, {} cycles, {:.1} BPM over {:.2} s",
            peaks.len(),
            spans.len(),
            heart_rate,
            duration_secs
        );

        let features = self.extractor.extract_batch(&filtered, &spans)?;

        let cycles: Vec<CycleScore> = spans
            .iter()
            .zip(features)
            .map(|(span, mut feature)| {
                self.scaler.transform(&mut feature);
                CycleScore {
                    start_secs: span.start_secs as f64,
                    end_secs: span.end_secs as f64,
                    probability: self.classifier.predict_probability(&feature),
                }
            })
            .collect();

        Ok(AnalysisResult::new(heart_rate as f64, cycles, duration_secs))
    }
}

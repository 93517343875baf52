//! Decision types produced by the analysis pipeline

use serde::Serialize;

/// Heart rate classification bands (BPM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeartRateStatus {
    #[serde(rename = "Severe Bradycardia")]
    SevereBradycardia,
    #[serde(rename = "Mild Bradycardia")]
    MildBradycardia,
    #[serde(rename = "Normal Heart Rate")]
    Normal,
    #[serde(rename = "Mild Tachycardia")]
    MildTachycardia,
    #[serde(rename = "Moderate Tachycardia")]
    ModerateTachycardia,
    #[serde(rename = "Severe Tachycardia")]
    SevereTachycardia,
}

impl HeartRateStatus {
    pub fn from_bpm(bpm: f64) -> Self {
        match bpm {
            b if b < 50.0 => HeartRateStatus::SevereBradycardia,
            b if b < 60.0 => HeartRateStatus::MildBradycardia,
            b if b <= 100.0 => HeartRateStatus::Normal,
            b if b <= 120.0 => HeartRateStatus::MildTachycardia,
            b if b <= 150.0 => HeartRateStatus::ModerateTachycardia,
            _ => HeartRateStatus::SevereTachycardia,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HeartRateStatus::SevereBradycardia => "Severe Bradycardia",
            HeartRateStatus::MildBradycardia => "Mild Bradycardia",
            HeartRateStatus::Normal => "Normal Heart Rate",
            HeartRateStatus::MildTachycardia => "Mild Tachycardia",
            HeartRateStatus::ModerateTachycardia => "Moderate Tachycardia",
            HeartRateStatus::SevereTachycardia => "Severe Tachycardia",
        }
    }
}

/// Risk tier derived from the worst cycle probability
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Tier boundaries are inclusive at the lower bound: a probability of
    /// exactly 0.30 is already medium.
    pub fn from_probability(probability: f32) -> Self {
        match probability {
            p if p < 0.30 => RiskTier::Low,
            p if p < 0.45 => RiskTier::Medium,
            p if p < 0.60 => RiskTier::High,
            _ => RiskTier::Critical,
        }
    }

    /// Human-readable prediction label for the tier
    pub fn prediction(&self) -> &'static str {
        match self {
            RiskTier::Low => "Normal Heart Sound",
            RiskTier::Medium => "Murmur / Borderline",
            RiskTier::High => "Mild Abnormality",
            RiskTier::Critical => "Severe Abnormality",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            RiskTier::Low => "✓",
            RiskTier::Medium => "?",
            RiskTier::High => "⚠",
            RiskTier::Critical => "✗",
        }
    }
}

/// Score for a single segmented cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CycleScore {
    pub start_secs: f64,
    pub end_secs: f64,
    pub probability: f32,
}

/// Complete analysis result for a recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub prediction: &'static str,
    /// Worst per-cycle abnormality probability, rounded to 3 decimals
    pub probability: f32,
    /// Estimated heart rate in BPM, rounded to 1 decimal
    pub heart_rate: f64,
    pub hr_status: HeartRateStatus,
    pub risk_level: RiskTier,
    pub num_cycles: usize,
    pub duration_secs: f64,
    pub cycles: Vec<CycleScore>,
}

impl AnalysisResult {
    /// Aggregate per-cycle scores into the recording-level decision.
    ///
    /// The recording is judged by its worst cycle: a single high-probability
    /// cycle flags the whole recording even if the rest score low.
    pub fn new(heart_rate: f64, cycles: Vec<CycleScore>, duration_secs: f64) -> Self {
        let max_probability = cycles
            .iter()
            .map(|c| c.probability)
            .fold(0.0f32, f32::max);

        let risk_level = RiskTier::from_probability(max_probability);

        Self {
            prediction: risk_level.prediction(),
            probability: (max_probability * 1000.0).round() / 1000.0,
            heart_rate: (heart_rate * 10.0).round() / 10.0,
            hr_status: HeartRateStatus::from_bpm(heart_rate),
            risk_level,
            num_cycles: cycles.len(),
            duration_secs,
            cycles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hr_status_bands() {
        assert_eq!(HeartRateStatus::from_bpm(40.0), HeartRateStatus::SevereBradycardia);
        assert_eq!(HeartRateStatus::from_bpm(50.0), HeartRateStatus::MildBradycardia);
        assert_eq!(HeartRateStatus::from_bpm(60.0), HeartRateStatus::Normal);
        assert_eq!(HeartRateStatus::from_bpm(100.0), HeartRateStatus::Normal);
        assert_eq!(HeartRateStatus::from_bpm(100.1), HeartRateStatus::MildTachycardia);
        assert_eq!(HeartRateStatus::from_bpm(120.5), HeartRateStatus::ModerateTachycardia);
        assert_eq!(HeartRateStatus::from_bpm(160.0), HeartRateStatus::SevereTachycardia);
    }

    #[test]
    fn test_risk_tier_lower_bounds_inclusive() {
        assert_eq!(RiskTier::from_probability(0.29), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.30), RiskTier::Medium);
        assert_eq!(RiskTier::from_probability(0.45), RiskTier::High);
        assert_eq!(RiskTier::from_probability(0.60), RiskTier::Critical);
        assert_eq!(RiskTier::from_probability(1.0), RiskTier::Critical);
    }

    #[test]
    fn test_result_takes_worst_cycle() {
        let cycles = vec![
            CycleScore { start_secs: 0.0, end_secs: 1.6, probability: 0.1 },
            CycleScore { start_secs: 0.8, end_secs: 2.4, probability: 0.72 },
            CycleScore { start_secs: 1.6, end_secs: 3.2, probability: 0.2 },
        ];

        let result = AnalysisResult::new(72.0, cycles, 4.0);
        assert_eq!(result.probability, 0.72);
        assert_eq!(result.risk_level, RiskTier::Critical);
        assert_eq!(result.prediction, "Severe Abnormality");
        assert_eq!(result.num_cycles, 3);
    }

    #[test]
    fn test_result_rounding() {
        let cycles = vec![CycleScore { start_secs: 0.0, end_secs: 1.0, probability: 0.12345 }];
        let result = AnalysisResult::new(61.23456, cycles, 2.0);

        assert_eq!(result.probability, 0.123);
        assert_eq!(result.heart_rate, 61.2);
        assert_eq!(result.hr_status, HeartRateStatus::Normal);
    }

    #[test]
    fn test_empty_cycles_is_low_risk_zero() {
        let result = AnalysisResult::new(0.0, Vec::new(), 0.5);
        assert_eq!(result.probability, 0.0);
        assert_eq!(result.risk_level, RiskTier::Low);
        assert_eq!(result.num_cycles, 0);
    }
}

//! Output formatting for CLI results

use crate::detection::{AnalysisResult, HeartRateStatus, RiskTier};
use crate::error::Result;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn risk_color(tier: RiskTier) -> &'static str {
    match tier {
        RiskTier::Low => "\x1b[32m",      // green
        RiskTier::Medium => "\x1b[33m",   // yellow
        RiskTier::High => "\x1b[33m",     // yellow
        RiskTier::Critical => "\x1b[31m", // red
    }
}

fn hr_color(status: HeartRateStatus) -> &'static str {
    match status {
        HeartRateStatus::Normal => "\x1b[32m",
        HeartRateStatus::MildBradycardia | HeartRateStatus::MildTachycardia => "\x1b[33m",
        _ => "\x1b[31m",
    }
}

/// Format analysis result for terminal output
pub fn format_result(result: &AnalysisResult, file: &str, verbose: bool) -> String {
    let mut output = String::new();

    let color = risk_color(result.risk_level);
    output.push_str(&format!(
        "{}{} {}{}{}\n",
        color,
        result.risk_level.symbol(),
        BOLD,
        file,
        RESET,
    ));

    output.push_str(&format!(
        "  {}{}{} (probability: {:.1}%)\n",
        color,
        result.prediction,
        RESET,
        result.probability * 100.0
    ));

    output.push_str(&format!(
        "  Heart Rate: {:.1} BPM {}({}){}\n",
        result.heart_rate,
        hr_color(result.hr_status),
        result.hr_status.description(),
        RESET
    ));

    output.push_str(&format!(
        "  Cycles: {} over {:.2} s\n",
        result.num_cycles, result.duration_secs
    ));

    if verbose && !result.cycles.is_empty() {
        output.push_str("\n  Per-cycle scores:\n");
        for (i, cycle) in result.cycles.iter().enumerate() {
            let tier = RiskTier::from_probability(cycle.probability);
            output.push_str(&format!(
                "    {}#{:<3}{} {:>6.2}s - {:>6.2}s  {}{:.1}%{}\n",
                DIM,
                i + 1,
                RESET,
                cycle.start_secs,
                cycle.end_secs,
                risk_color(tier),
                cycle.probability * 100.0,
                RESET
            ));
        }
    }

    output
}

/// Format analysis result as JSON
pub fn format_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(result)
        .map_err(|e| crate::error::AnalysisError::Processing(format!("JSON encoding: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::CycleScore;

    fn sample_result() -> AnalysisResult {
        AnalysisResult::new(
            72.0,
            vec![
                CycleScore { start_secs: 0.0, end_secs: 1.6, probability: 0.12 },
                CycleScore { start_secs: 0.8, end_secs: 2.4, probability: 0.08 },
            ],
            3.2,
        )
    }

    #[test]
    fn test_text_output_carries_decision() {
        let text = format_result(&sample_result(), "rec.wav", false);
        assert!(text.contains("rec.wav"));
        assert!(text.contains("Normal Heart Sound"));
        assert!(text.contains("72.0 BPM"));
        assert!(!text.contains("Per-cycle"));
    }

    #[test]
    fn test_verbose_lists_every_cycle() {
        let text = format_result(&sample_result(), "rec.wav", true);
        assert!(text.contains("Per-cycle"));
        assert!(text.contains("#1"));
        assert!(text.contains("#2"));
    }

    #[test]
    fn test_json_round_trips_fields() {
        let json = format_json(&sample_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["prediction"], "Normal Heart Sound");
        assert_eq!(value["risk_level"], "low");
        assert_eq!(value["hr_status"], "Normal Heart Rate");
        assert_eq!(value["num_cycles"], 2);
    }
}

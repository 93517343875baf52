//! Result and risk-classification types

pub mod result;

pub use result::{AnalysisResult, CycleScore, HeartRateStatus, RiskTier};

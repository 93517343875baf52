//! Digital Signal Processing utilities

pub mod envelope;
pub mod filters;
pub mod stats;
pub mod windows;

pub use envelope::{analytic_envelope, detect_beats, find_peaks};
pub use filters::{normalize_peak, resample, BandpassFilter};

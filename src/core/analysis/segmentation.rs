// src/core/analysis/segmentation.rs
//
// Cardiac cycle segmentation from detected beat peaks.
//
// A window of two consecutive inter-peak intervals approximates one full
// S1 -> S2 -> next-S1 cycle without needing to tell S1 from S2, so cycle i
// spans peaks[i]..peaks[i+2] and neighboring cycles overlap by one peak.

/// One cardiac cycle: a sub-range of the filtered signal plus its time span
#[derive(Debug, Clone, PartialEq)]
pub struct CycleSpan {
    /// Start sample index (inclusive)
    pub start: usize,
    /// End sample index (exclusive)
    pub end: usize,
    /// Start time in seconds
    pub start_secs: f32,
    /// End time in seconds
    pub end_secs: f32,
}

/// Build overlapping cycle windows from a strictly increasing peak sequence.
///
/// Yields `peaks.len() - 2` cycles when at least 3 peaks exist, none
/// otherwise.
pub fn segment_cycles(peaks: &[usize], sample_rate: u32) -> Vec<CycleSpan> {
    if peaks.len() < 3 {
        return Vec::new();
    }

    let sr = sample_rate as f32;
    (0..peaks.len() - 2)
        .map(|i| CycleSpan {
            start: peaks[i],
            end: peaks[i + 2],
            start_secs: peaks[i] as f32 / sr,
            end_secs: peaks[i + 2] as f32 / sr,
        })
        .collect()
}

/// Heart rate as `60 / mean(inter-peak interval in seconds)`.
///
/// Returns 0.0 for degenerate peak sequences (fewer than 2 peaks or zero
/// total span); callers reject those earlier via the beat-count check.
pub fn heart_rate_bpm(peaks: &[usize], sample_rate: u32) -> f32 {
    if peaks.len() < 2 {
        return 0.0;
    }

    let span = (peaks[peaks.len() - 1] - peaks[0]) as f32;
    if span <= 0.0 {
        return 0.0;
    }

    // mean(diff) == total span / (count - 1)
    60.0 * sample_rate as f32 * (peaks.len() - 1) as f32 / span
}

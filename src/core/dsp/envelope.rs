//! Analytic-signal envelope and beat peak picking
//!
//! Heartbeats show up as local maxima of the Hilbert envelope of the
//! bandpassed signal. Peak selection applies two policy thresholds: a
//! minimum spacing (physiological ceiling on beat rate) and a minimum
//! height relative to the envelope mean.

use rustfft::{num_complex::Complex, FftPlanner};

use super::stats::mean;

/// Magnitude of the analytic signal (Hilbert transform envelope).
///
/// Output length equals input length.
pub fn analytic_envelope(x: &[f32]) -> Vec<f32> {
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(n);
    let ifft = planner.plan_fft_inverse(n);

    let mut buf: Vec<Complex<f64>> = x.iter().map(|&v| Complex::new(v as f64, 0.0)).collect();
    fft.process(&mut buf);

    // One-sided spectrum: keep DC (and Nyquist for even n), double the
    // positive frequencies, zero the negative ones
    let half = n / 2;
    let positive_end = if n % 2 == 0 { half } else { half + 1 };
    for c in buf.iter_mut().take(positive_end).skip(1) {
        *c *= 2.0;
    }
    for c in buf.iter_mut().skip(half + 1) {
        *c = Complex::new(0.0, 0.0);
    }

    ifft.process(&mut buf);

    // rustfft's inverse is unnormalized
    let scale = 1.0 / n as f64;
    buf.iter().map(|c| (c.norm() * scale) as f32).collect()
}

/// Find local maxima at least `min_height` tall and at least `min_distance`
/// samples apart. When two candidates are too close, the smaller one is
/// dropped. Plateaus count once, at their midpoint.
///
/// Returned indices are strictly increasing.
pub fn find_peaks(x: &[f32], min_height: f32, min_distance: usize) -> Vec<usize> {
    let n = x.len();
    if n < 3 {
        return Vec::new();
    }

    let mut candidates: Vec<usize> = Vec::new();
    let mut i = 1;
    while i < n - 1 {
        if x[i - 1] < x[i] {
            let mut j = i;
            while j < n - 1 && x[j + 1] == x[i] {
                j += 1;
            }
            if j < n - 1 && x[j + 1] < x[i] {
                let mid = (i + j) / 2;
                if x[mid] >= min_height {
                    candidates.push(mid);
                }
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }

    if min_distance <= 1 || candidates.len() < 2 {
        return candidates;
    }

    // Suppress neighbors of taller peaks first
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&p, &q| {
        x[candidates[q]]
            .partial_cmp(&x[candidates[p]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = vec![true; candidates.len()];
    for &idx in &order {
        if !keep[idx] {
            continue;
        }
        let center = candidates[idx];

        let mut k = idx;
        while k > 0 {
            k -= 1;
            if center - candidates[k] < min_distance {
                keep[k] = false;
            } else {
                break;
            }
        }

        for k in idx + 1..candidates.len() {
            if candidates[k] - center < min_distance {
                keep[k] = false;
            } else {
                break;
            }
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

/// Detect beat onsets on the envelope of the filtered signal.
///
/// `height_factor` scales the envelope mean into the height threshold.
pub fn detect_beats(envelope: &[f32], height_factor: f32, min_distance: usize) -> Vec<usize> {
    let threshold = height_factor * mean(envelope);
    let peaks = find_peaks(envelope, threshold, min_distance);
    log::debug!(
        "Beat detection: {} peaks above {:.4} with spacing >= {} samples",
        peaks.len(),
        threshold,
        min_distance
    );
    peaks
}

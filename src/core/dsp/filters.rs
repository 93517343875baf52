//! Signal filtering, resampling, and normalization
//!
//! The bandpass stage is a digital Butterworth filter applied forward and
//! backward (zero phase), so detected beat positions are not shifted in time
//! and `index / sample_rate` stays a valid time offset downstream.

use std::f64::consts::PI;

use num_complex::Complex64;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use super::stats::peak_amplitude;
use crate::error::{AnalysisError, Result};

/// Normalize in place so the maximum absolute sample equals 1.0.
///
/// Empty and silent waveforms are rejected before the division.
pub fn normalize_peak(samples: &mut [f32]) -> Result<()> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidAudio("empty waveform".to_string()));
    }

    let peak = peak_amplitude(samples);
    if peak <= 0.0 {
        return Err(AnalysisError::InvalidAudio(
            "silent waveform (peak amplitude is zero)".to_string(),
        ));
    }

    for s in samples.iter_mut() {
        *s /= peak;
    }
    Ok(())
}

/// Band-limited sinc resampling to the canonical analysis rate.
///
/// Output length is trimmed to `round(len * ratio)` with the resampler's
/// group delay removed, so sample indices map directly to time.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }
    if samples.is_empty() {
        return Err(AnalysisError::InvalidAudio("empty waveform".to_string()));
    }

    let ratio = to_rate as f64 / from_rate as f64;
    log::debug!(
        "Resampling {} samples: {} Hz -> {} Hz (ratio {:.4})",
        samples.len(),
        from_rate,
        to_rate,
        ratio
    );

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    const CHUNK: usize = 1024;
    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK, 1)
        .map_err(|e| AnalysisError::Processing(format!("resampler construction failed: {e}")))?;

    let delay = resampler.output_delay();
    let expected = (samples.len() as f64 * ratio).round() as usize;

    let mut out: Vec<f32> = Vec::with_capacity(delay + expected + CHUNK);
    let mut pos = 0usize;

    // Feed fixed-size chunks, zero-padding past the end until the delayed
    // output covers the expected length.
    while out.len() < delay + expected {
        let mut chunk = vec![0.0f32; CHUNK];
        if pos < samples.len() {
            let n = CHUNK.min(samples.len() - pos);
            chunk[..n].copy_from_slice(&samples[pos..pos + n]);
            pos += n;
        }
        let processed = resampler
            .process(&[chunk], None)
            .map_err(|e| AnalysisError::Processing(format!("resampling failed: {e}")))?;
        out.extend_from_slice(&processed[0]);
    }

    Ok(out[delay..delay + expected].to_vec())
}

/// Zero-phase Butterworth bandpass filter
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    /// Numerator coefficients, a[0]-normalized
    b: Vec<f64>,
    /// Denominator coefficients, a[0] == 1
    a: Vec<f64>,
}

impl BandpassFilter {
    /// Design an order-N Butterworth bandpass for the given passband.
    ///
    /// Analog prototype -> lowpass-to-bandpass transform -> bilinear
    /// transform with frequency pre-warping, yielding a transfer function
    /// of order 2N.
    pub fn new(low_hz: f32, high_hz: f32, order: usize, sample_rate: u32) -> Result<Self> {
        let nyq = sample_rate as f64 / 2.0;
        let wn_low = low_hz as f64 / nyq;
        let wn_high = high_hz as f64 / nyq;

        if !(0.0 < wn_low && wn_low < wn_high && wn_high < 1.0) {
            return Err(AnalysisError::Processing(format!(
                "passband {low_hz} - {high_hz} Hz invalid for sample rate {sample_rate} Hz"
            )));
        }

        // Pre-warp band edges for the bilinear transform (fs = 2 convention)
        let fs = 2.0;
        let w1 = 2.0 * fs * (PI * wn_low / fs).tan();
        let w2 = 2.0 * fs * (PI * wn_high / fs).tan();
        let bw = w2 - w1;
        let wo = (w1 * w2).sqrt();

        // Butterworth analog lowpass prototype: poles evenly spaced on the
        // left half of the unit circle, no finite zeros, unit gain
        let mut proto = Vec::with_capacity(order);
        for k in 0..order {
            let m = (2 * k) as f64 - (order as f64 - 1.0);
            let theta = PI * m / (2.0 * order as f64);
            proto.push(-(Complex64::i() * theta).exp());
        }

        // Lowpass -> bandpass: each pole splits into a pair, N zeros land
        // at the origin, gain scales by bw^N
        let mut apoles = Vec::with_capacity(2 * order);
        let wo2 = Complex64::new(wo * wo, 0.0);
        for &p in &proto {
            let pl = p * (bw / 2.0);
            let d = (pl * pl - wo2).sqrt();
            apoles.push(pl + d);
            apoles.push(pl - d);
        }
        let k_analog = bw.powi(order as i32);

        // Bilinear transform: s = 2*fs*(z-1)/(z+1)
        let fs2 = 2.0 * fs;
        let mut zpoles = Vec::with_capacity(apoles.len());
        let mut denom_gain = Complex64::new(1.0, 0.0);
        for &p in &apoles {
            zpoles.push((Complex64::new(fs2, 0.0) + p) / (Complex64::new(fs2, 0.0) - p));
            denom_gain *= Complex64::new(fs2, 0.0) - p;
        }

        // The N analog zeros at the origin map to z = +1; the remaining N
        // zeros of the digital filter sit at z = -1
        let mut zzeros = Vec::with_capacity(2 * order);
        zzeros.resize(order, Complex64::new(1.0, 0.0));
        zzeros.resize(2 * order, Complex64::new(-1.0, 0.0));

        let numer_gain = Complex64::new(fs2.powi(order as i32), 0.0);
        let k_digital = k_analog * (numer_gain / denom_gain).re;

        let b: Vec<f64> = polynomial_from_roots(&zzeros)
            .iter()
            .map(|c| c.re * k_digital)
            .collect();
        let a: Vec<f64> = polynomial_from_roots(&zpoles).iter().map(|c| c.re).collect();

        // a[0] is 1 by construction but normalize defensively against
        // rounding in the polynomial expansion
        let a0 = a[0];
        let filter = Self {
            b: b.iter().map(|&c| c / a0).collect(),
            a: a.iter().map(|&c| c / a0).collect(),
        };

        if filter.a.iter().chain(filter.b.iter()).any(|c| !c.is_finite()) {
            return Err(AnalysisError::Processing(
                "filter design produced non-finite coefficients".to_string(),
            ));
        }

        Ok(filter)
    }

    /// Number of taps in each coefficient vector (2N + 1)
    pub fn len(&self) -> usize {
        self.a.len().max(self.b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forward-backward ("filtfilt") application: zero phase distortion,
    /// output length equals input length.
    ///
    /// Edges are handled the way scipy does it: the signal is extended on
    /// both sides by `3 * len()` odd-symmetric reflected samples and the
    /// filter state is seeded with the step-response steady state scaled by
    /// the first sample, so startup transients die inside the extension.
    pub fn filtfilt(&self, x: &[f32]) -> Result<Vec<f32>> {
        let padlen = 3 * self.len();
        if x.len() <= padlen {
            return Err(AnalysisError::InvalidAudio(format!(
                "waveform too short to filter: {} samples, need more than {}",
                x.len(),
                padlen
            )));
        }

        let xd: Vec<f64> = x.iter().map(|&v| v as f64).collect();

        // Odd-symmetric extension about the first and last samples
        let mut ext = Vec::with_capacity(xd.len() + 2 * padlen);
        for i in (1..=padlen).rev() {
            ext.push(2.0 * xd[0] - xd[i]);
        }
        ext.extend_from_slice(&xd);
        let last = xd.len() - 1;
        for i in 1..=padlen {
            ext.push(2.0 * xd[last] - xd[last - i]);
        }

        let zi = self.steady_state()?;

        // Forward pass
        let mut y = self.lfilter(&ext, &scale_state(&zi, ext[0]));

        // Backward pass
        y.reverse();
        let mut y = self.lfilter(&y, &scale_state(&zi, y[0]));
        y.reverse();

        Ok(y[padlen..padlen + xd.len()].iter().map(|&v| v as f32).collect())
    }

    /// Direct form II transposed IIR filter with explicit initial state
    fn lfilter(&self, x: &[f64], zi: &[f64]) -> Vec<f64> {
        let n = self.len();
        let mut b = self.b.clone();
        let mut a = self.a.clone();
        b.resize(n, 0.0);
        a.resize(n, 0.0);

        let mut z = zi.to_vec();
        debug_assert_eq!(z.len(), n - 1);

        let mut y = Vec::with_capacity(x.len());
        for &xm in x {
            let ym = b[0] * xm + z[0];
            for i in 0..n - 2 {
                z[i] = b[i + 1] * xm + z[i + 1] - a[i + 1] * ym;
            }
            z[n - 2] = b[n - 1] * xm - a[n - 1] * ym;
            y.push(ym);
        }
        y
    }

    /// Step-response steady state of the filter memory (scipy's lfilter_zi):
    /// solves (I - A^T) zi = B for the companion-form state matrix.
    fn steady_state(&self) -> Result<Vec<f64>> {
        let n = self.len();
        let m = n - 1;
        let mut b = self.b.clone();
        let mut a = self.a.clone();
        b.resize(n, 0.0);
        a.resize(n, 0.0);

        let mut mat = vec![vec![0.0f64; m]; m];
        for (i, row) in mat.iter_mut().enumerate() {
            row[i] += 1.0;
            row[0] += a[i + 1];
            if i + 1 < m {
                row[i + 1] -= 1.0;
            }
        }

        let rhs: Vec<f64> = (1..n).map(|i| b[i] - a[i] * b[0]).collect();
        solve_linear(mat, rhs)
            .ok_or_else(|| AnalysisError::Processing("singular filter state system".to_string()))
    }
}

/// Expand a monic polynomial from its roots
fn polynomial_from_roots(roots: &[Complex64]) -> Vec<Complex64> {
    let mut coeffs = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); coeffs.len() + 1];
        for (i, &c) in coeffs.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        coeffs = next;
    }
    coeffs
}

/// Gaussian elimination with partial pivoting. Returns None if singular.
fn solve_linear(mut mat: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Option<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| {
            mat[i][col]
                .abs()
                .partial_cmp(&mat[j][col].abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;
        if mat[pivot][col].abs() < 1e-300 {
            return None;
        }
        mat.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = mat[row][col] / mat[col][col];
            for k in col..n {
                mat[row][k] -= factor * mat[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut x = vec![0.0f64; n];
    for row in (0..n).rev() {
        let mut acc = rhs[row];
        for k in row + 1..n {
            acc -= mat[row][k] * x[k];
        }
        x[row] = acc / mat[row][row];
    }
    Some(x)
}

fn scale_state(zi: &[f64], x0: f64) -> Vec<f64> {
    zi.iter().map(|&z| z * x0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI as PI32;

    fn default_filter() -> BandpassFilter {
        BandpassFilter::new(25.0, 400.0, 4, 1000).unwrap()
    }

    fn sine(freq: f32, secs: f32, sample_rate: u32) -> Vec<f32> {
        let n = (secs * sample_rate as f32) as usize;
        (0..n)
            .map(|i| (2.0 * PI32 * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn test_design_shape() {
        let f = default_filter();
        // Order-4 bandpass is an order-8 transfer function
        assert_eq!(f.b.len(), 9);
        assert_eq!(f.a.len(), 9);
        assert!((f.a[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dc_and_nyquist_rejection() {
        let f = default_filter();
        // Bandpass zeros at z = 1 and z = -1: B(1) and B(-1) vanish
        let b_dc: f64 = f.b.iter().sum();
        let b_nyq: f64 = f.b.iter().enumerate().map(|(i, &c)| if i % 2 == 0 { c } else { -c }).sum();
        assert!(b_dc.abs() < 1e-8, "DC gain not rejected: {b_dc}");
        assert!(b_nyq.abs() < 1e-8, "Nyquist gain not rejected: {b_nyq}");
    }

    #[test]
    fn test_filtfilt_preserves_length() {
        let f = default_filter();
        let x = sine(100.0, 1.0, 1000);
        let y = f.filtfilt(&x).unwrap();
        assert_eq!(y.len(), x.len());
    }

    #[test]
    fn test_passband_vs_stopband() {
        let f = default_filter();

        let in_band = f.filtfilt(&sine(100.0, 2.0, 1000)).unwrap();
        let below_band = f.filtfilt(&sine(5.0, 2.0, 1000)).unwrap();

        // Compare steady-state RMS away from the edges
        let mid = |v: &[f32]| {
            let q = v.len() / 4;
            crate::core::dsp::stats::rms(&v[q..v.len() - q])
        };

        let kept = mid(&in_band);
        let removed = mid(&below_band);
        assert!(kept > 0.5, "passband tone attenuated: rms {kept}");
        assert!(removed < 0.05, "stopband tone leaked: rms {removed}");
    }

    #[test]
    fn test_filtfilt_rejects_short_input() {
        let f = default_filter();
        let x = vec![0.1f32; 10];
        assert!(f.filtfilt(&x).is_err());
    }

    #[test]
    fn test_normalize_peak() {
        let mut samples = vec![0.1, -0.5, 0.25];
        normalize_peak(&mut samples).unwrap();
        assert!((peak_amplitude(&samples) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_rejects_silence() {
        let mut silent = vec![0.0f32; 1000];
        assert!(matches!(
            normalize_peak(&mut silent),
            Err(AnalysisError::InvalidAudio(_))
        ));

        let mut empty: Vec<f32> = vec![];
        assert!(matches!(
            normalize_peak(&mut empty),
            Err(AnalysisError::InvalidAudio(_))
        ));
    }

    #[test]
    fn test_resample_halves_length() {
        let x = sine(50.0, 2.0, 2000);
        let y = resample(&x, 2000, 1000).unwrap();
        assert_eq!(y.len(), 2000);
    }

    #[test]
    fn test_resample_identity() {
        let x = sine(50.0, 1.0, 1000);
        let y = resample(&x, 1000, 1000).unwrap();
        assert_eq!(x, y);
    }
}

// src/core/analysis/mfcc.rs
//
// Per-cycle MFCC feature extraction.
//
// Each cycle yields a 13 x 260 coefficient matrix flattened to a fixed
// 3380-element f32 vector: the classifier has a fixed input width, so the
// natural frame count is truncated or zero-padded to the frame cap no matter
// how long the cycle really is. All arithmetic stays in single precision to
// match the representation the scaler and model were fit on.

use std::sync::Arc;

use rayon::prelude::*;
use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};

use super::segmentation::CycleSpan;
use crate::config::PipelineConfig;
use crate::core::dsp::windows::{create_window, WindowType};
use crate::error::{AnalysisError, Result};

/// Floor for mel band energies before the log (avoids -inf on empty bands)
const LOG_FLOOR: f32 = 1e-10;

/// MFCC extractor with precomputed window, mel filterbank, and DCT basis
pub struct MfccExtractor {
    n_mfcc: usize,
    n_mels: usize,
    n_fft: usize,
    hop_length: usize,
    max_frames: usize,
    window: Vec<f32>,
    /// `n_mels` rows of `n_fft/2 + 1` triangle weights
    filterbank: Vec<Vec<f32>>,
    /// Orthonormal DCT-II basis, `n_mfcc * n_mels` row-major
    dct_basis: Vec<f32>,
    fft: Arc<dyn RealToComplex<f32>>,
}

impl MfccExtractor {
    pub fn new(config: &PipelineConfig) -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.n_fft);

        Self {
            n_mfcc: config.n_mfcc,
            n_mels: config.n_mels,
            n_fft: config.n_fft,
            hop_length: config.hop_length,
            max_frames: config.max_frames,
            window: create_window(config.n_fft, WindowType::Hann),
            filterbank: mel_filterbank(config.n_mels, config.n_fft, config.sample_rate),
            dct_basis: dct_ortho_basis(config.n_mfcc, config.n_mels),
            fft,
        }
    }

    /// Length of every vector produced by `extract`
    pub fn feature_len(&self) -> usize {
        self.n_mfcc * self.max_frames
    }

    /// Extract the flattened fixed-length MFCC vector for one cycle
    pub fn extract(&self, cycle: &[f32]) -> Result<Vec<f32>> {
        let bins = self.n_fft / 2 + 1;
        let padded = pad_reflect(cycle, self.n_fft / 2);

        let natural_frames = if padded.len() >= self.n_fft {
            1 + (padded.len() - self.n_fft) / self.hop_length
        } else {
            1
        };
        let n_frames = natural_frames.min(self.max_frames);

        let mut out = vec![0.0f32; self.feature_len()];
        let mut frame = vec![0.0f32; self.n_fft];
        let mut spectrum = vec![Complex::new(0.0f32, 0.0); bins];
        let mut mel_db = vec![0.0f32; self.n_mels];

        for t in 0..n_frames {
            let start = t * self.hop_length;
            for i in 0..self.n_fft {
                let v = padded.get(start + i).copied().unwrap_or(0.0);
                frame[i] = v * self.window[i];
            }

            self.fft
                .process(&mut frame, &mut spectrum)
                .map_err(|e| AnalysisError::Processing(format!("STFT failed: {e}")))?;

            for (m, filter) in self.filterbank.iter().enumerate() {
                let energy: f32 = filter
                    .iter()
                    .zip(spectrum.iter())
                    .map(|(&w, c)| w * (c.re * c.re + c.im * c.im))
                    .sum();
                mel_db[m] = 10.0 * energy.max(LOG_FLOOR).log10();
            }

            for k in 0..self.n_mfcc {
                let row = &self.dct_basis[k * self.n_mels..(k + 1) * self.n_mels];
                let coeff: f32 = row.iter().zip(mel_db.iter()).map(|(&d, &e)| d * e).sum();
                out[k * self.max_frames + t] = coeff;
            }
        }

        Ok(out)
    }

    /// Extract features for every cycle of the filtered signal.
    ///
    /// Cycles are independent, so the batch fans out across the rayon pool.
    pub fn extract_batch(&self, signal: &[f32], cycles: &[CycleSpan]) -> Result<Vec<Vec<f32>>> {
        cycles
            .par_iter()
            .map(|c| self.extract(&signal[c.start..c.end.min(signal.len())]))
            .collect()
    }
}

/// Slaney-style mel scale (linear below 1 kHz, logarithmic above)
fn hz_to_mel(hz: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

    if hz < MIN_LOG_HZ {
        hz / F_SP
    } else {
        let logstep = (6.4f32).ln() / 27.0;
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const F_SP: f32 = 200.0 / 3.0;
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = MIN_LOG_HZ / F_SP;

    if mel < MIN_LOG_MEL {
        mel * F_SP
    } else {
        let logstep = (6.4f32).ln() / 27.0;
        MIN_LOG_HZ * ((mel - MIN_LOG_MEL) * logstep).exp()
    }
}

/// Triangular mel filterbank over the one-sided FFT bins, area-normalized
fn mel_filterbank(n_mels: usize, n_fft: usize, sample_rate: u32) -> Vec<Vec<f32>> {
    let bins = n_fft / 2 + 1;
    let f_max = sample_rate as f32 / 2.0;

    let mel_max = hz_to_mel(f_max);
    let band_edges: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let bin_freqs: Vec<f32> = (0..bins)
        .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
        .collect();

    (0..n_mels)
        .map(|m| {
            let (lower, center, upper) = (band_edges[m], band_edges[m + 1], band_edges[m + 2]);
            let norm = 2.0 / (upper - lower);
            bin_freqs
                .iter()
                .map(|&f| {
                    let rising = (f - lower) / (center - lower);
                    let falling = (upper - f) / (upper - center);
                    norm * rising.min(falling).max(0.0)
                })
                .collect()
        })
        .collect()
}

/// Orthonormal DCT-II basis rows (the first `n_mfcc` of `n_mels`)
fn dct_ortho_basis(n_mfcc: usize, n_mels: usize) -> Vec<f32> {
    let n = n_mels as f32;
    let mut basis = Vec::with_capacity(n_mfcc * n_mels);
    for k in 0..n_mfcc {
        let scale = if k == 0 {
            (1.0 / n).sqrt()
        } else {
            (2.0 / n).sqrt()
        };
        for m in 0..n_mels {
            let angle = std::f32::consts::PI * k as f32 * (m as f32 + 0.5) / n;
            basis.push(scale * angle.cos());
        }
    }
    basis
}

/// Center-pad by reflection about the signal edges
fn pad_reflect(x: &[f32], pad: usize) -> Vec<f32> {
    let n = x.len();
    if n == 0 {
        return vec![0.0; 2 * pad];
    }

    let reflect = |i: isize| -> usize {
        if n == 1 {
            return 0;
        }
        let period = 2 * (n as isize - 1);
        let mut k = i.rem_euclid(period);
        if k >= n as isize {
            k = period - k;
        }
        k as usize
    };

    (0..n + 2 * pad)
        .map(|j| x[reflect(j as isize - pad as isize)])
        .collect()
}

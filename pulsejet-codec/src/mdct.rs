//! Direct MDCT and IMDCT kernels.
//!
//! The format pins the transform to the textbook O(S*M) evaluation; an
//! accelerated path is only admissible if it is numerically equivalent
//! within float precision, so none is provided.

use std::f32::consts::PI;

use pulsejet_core::MathOps;

/// MDCT processor for a fixed analysis window size.
pub struct Mdct {
    half_size: usize,
}

impl Mdct {
    /// Create a transform for the given analysis window size.
    pub fn new(window_size: usize) -> Self {
        Self {
            half_size: window_size / 2,
        }
    }

    /// Forward MDCT: `2M` windowed samples into `M` frequency bins.
    ///
    /// `X[k] = sum_n w[n] * cos(pi/M * (n + 0.5 + M/2) * (k + 0.5))`
    pub fn forward<M: MathOps>(&self, math: &M, windowed: &[f32], bins: &mut [f32]) {
        let m = self.half_size;
        let inv_m = PI / m as f32;
        let phase_offset = (m / 2) as f32;
        for (k, bin) in bins[..m].iter_mut().enumerate() {
            let k_plus_half = k as f32 + 0.5;
            let mut acc = 0.0f32;
            for (n, &sample) in windowed[..m * 2].iter().enumerate() {
                acc += sample * math.cos(inv_m * (n as f32 + 0.5 + phase_offset) * k_plus_half);
            }
            *bin = acc;
        }
    }

    /// Inverse MDCT: `M` frequency bins into `2M` aliased time samples.
    ///
    /// `y[n] = sum_k (2/M) * X[k] * cos(pi/M * (n + 0.5 + M/2) * (k + 0.5))`
    ///
    /// The output still carries time-domain aliasing; windowed overlap-add
    /// of adjacent subframes cancels it.
    pub fn inverse<M: MathOps>(&self, math: &M, bins: &[f32], samples: &mut [f32]) {
        let m = self.half_size;
        let inv_m = PI / m as f32;
        let phase_offset = (m / 2) as f32;
        let scale = 2.0 / m as f32;
        for (n, sample) in samples[..m * 2].iter_mut().enumerate() {
            let n_phase = n as f32 + 0.5 + phase_offset;
            let mut acc = 0.0f32;
            for (k, &bin) in bins[..m].iter().enumerate() {
                acc += scale * bin * math.cos(inv_m * n_phase * (k as f32 + 0.5));
            }
            *sample = acc;
        }
    }
}

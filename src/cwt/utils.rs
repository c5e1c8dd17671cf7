//! Utility functions for CWT
//!
//! FFT sizing, FFT plan reuse, and frequency grids.

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::f64::consts::PI;
use std::sync::Arc;

/// Compute next power of 2 (for FFT optimization)
pub fn next_fast_len(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Forward/inverse FFT plans for one padded length
///
/// Both signals of a cross transform share the same padded length, so the
/// plans are built once and handed to each CWT call.
#[derive(Clone)]
pub struct FftPlans {
    pub len: usize,
    pub forward: Arc<dyn Fft<f64>>,
    pub inverse: Arc<dyn Fft<f64>>,
}

impl FftPlans {
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            len,
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
        }
    }

    /// Plans sized for a signal of `signal_len` samples
    pub fn for_signal(signal_len: usize) -> Self {
        Self::new(next_fast_len(signal_len))
    }

    /// Zero-pad a real signal to the plan length and transform it
    pub fn forward_real(&self, signal: &[f64]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
        buffer.resize(self.len, Complex64::new(0.0, 0.0));
        self.forward.process(&mut buffer);
        buffer
    }

    /// Inverse transform in place, normalized by the length
    pub fn inverse_normalized(&self, buffer: &mut [Complex64]) {
        self.inverse.process(buffer);
        let norm = 1.0 / self.len as f64;
        for x in buffer.iter_mut() {
            *x *= norm;
        }
    }
}

/// Angular frequencies of FFT bins (corresponds to `2*pi*numpy.fft.fftfreq(n, dt)`)
///
/// Bins `0..=(n-1)/2` are non-negative, the rest are negative.
pub fn angular_frequencies(n: usize, dt: f64) -> Vec<f64> {
    let step = 2.0 * PI / (n as f64 * dt);
    (0..n)
        .map(|k| {
            if k <= (n - 1) / 2 {
                k as f64 * step
            } else {
                (k as f64 - n as f64) * step
            }
        })
        .collect()
}

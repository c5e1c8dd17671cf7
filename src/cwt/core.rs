//! Core CWT algorithm implementation
//!
//! Implements the continuous wavelet transform in the frequency domain: the
//! zero-padded signal spectrum is multiplied by the conjugate daughter-wavelet
//! spectrum at each scale and transformed back.

use ndarray::{Array1, Array2, ArrayView1};
use num_complex::Complex64;
use rayon::prelude::*;

use super::utils::{angular_frequencies, FftPlans};
use super::wavelets::Mother;
use crate::error::{AnalysisError, Result};

/// Shortest signal the engine accepts
pub const MIN_SIGNAL_LEN: usize = 2;

/// Transform parameters
///
/// Scales are `s0 * 2^(j * dj)` for `j = 0..N`, `N = floor(octaves / dj) + 1`.
/// `octaves / dj` is the sub-octave step count often called `J`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CwtParams {
    /// Sampling interval (seconds)
    pub dt: f64,
    /// Scale spacing in octaves
    pub dj: f64,
    /// Smallest scale
    pub s0: f64,
    /// Total span of the scale set in octaves
    pub octaves: f64,
    pub mother: Mother,
    /// Compute scales on the rayon pool instead of the calling thread
    pub parallel: bool,
}

impl CwtParams {
    /// Defaults: dj = 0.125, s0 = 2*dt, 7 octaves, Morlet(6)
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            dj: 0.125,
            s0: 2.0 * dt,
            octaves: 7.0,
            mother: Mother::default(),
            parallel: false,
        }
    }

    pub fn with_dj(mut self, dj: f64) -> Self {
        self.dj = dj;
        self
    }

    pub fn with_s0(mut self, s0: f64) -> Self {
        self.s0 = s0;
        self
    }

    pub fn with_octaves(mut self, octaves: f64) -> Self {
        self.octaves = octaves;
        self
    }

    pub fn with_mother(mut self, mother: Mother) -> Self {
        self.mother = mother;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether two parameter sets produce the same transform; the execution
    /// mode does not count.
    pub fn same_transform(&self, other: &CwtParams) -> bool {
        self.dt == other.dt
            && self.dj == other.dj
            && self.s0 == other.s0
            && self.octaves == other.octaves
            && self.mother == other.mother
    }

    /// Sub-octave step count `J = octaves / dj`
    pub fn steps(&self) -> f64 {
        self.octaves / self.dj
    }

    pub fn num_scales(&self) -> usize {
        (self.steps() + 1e-9).floor() as usize + 1
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(AnalysisError::invalid_parameter(name, v))
            }
        };
        positive("dt", self.dt)?;
        positive("dj", self.dj)?;
        positive("s0", self.s0)?;
        positive("octaves", self.octaves)?;
        self.mother.validate()
    }

    /// Scale set derived from `(s0, dj, octaves)`
    pub fn scales(&self) -> Array1<f64> {
        Array1::from_iter((0..self.num_scales()).map(|j| self.s0 * 2f64.powf(j as f64 * self.dj)))
    }

    /// Frequency per scale, monotonically decreasing
    pub fn frequencies(&self, scales: &Array1<f64>) -> Array1<f64> {
        scales.mapv(|s| self.mother.scale_to_frequency(s))
    }
}

/// CWT output structure
#[derive(Debug, Clone)]
pub struct CwtOutput {
    /// CWT coefficients matrix (num_scales, signal_length)
    pub coefs: Array2<Complex64>,
    pub scales: Array1<f64>,
    /// Frequencies corresponding to scales
    pub frequencies: Array1<f64>,
    /// Cone of influence, one value per sample
    pub coi: Array1<f64>,
}

impl CwtOutput {
    /// Wavelet power `|W|^2`
    pub fn power(&self) -> Array2<f64> {
        self.coefs.mapv(|c| c.norm_sqr())
    }
}

/// Cone of influence
///
/// `coi[t] = dt * e_folding * min(t + 1, n - t)`, V-shaped from both edges.
pub fn cone_of_influence(n: usize, dt: f64, e_folding: f64) -> Array1<f64> {
    Array1::from_iter((0..n).map(|t| dt * e_folding * ((t + 1).min(n - t)) as f64))
}

/// Reject signals the transform cannot process meaningfully
pub fn validate_signal(signal: &ArrayView1<f64>) -> Result<()> {
    if signal.is_empty() {
        return Err(AnalysisError::invalid_signal("signal is empty"));
    }
    if signal.len() < MIN_SIGNAL_LEN {
        return Err(AnalysisError::invalid_signal(format!(
            "signal has {} samples, need at least {}",
            signal.len(),
            MIN_SIGNAL_LEN
        )));
    }
    if let Some(idx) = signal.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::invalid_signal(format!(
            "non-finite sample at index {}",
            idx
        )));
    }
    Ok(())
}

/// Compute CWT for a single scale
///
/// # Arguments
/// * `signal_ft` - Spectrum of the zero-padded signal
/// * `ang_freqs` - Angular frequency of each spectrum bin
/// * `scale` - Current scale value
/// * `params` - Transform parameters (dt and mother wavelet)
/// * `plans` - FFT plans matching `signal_ft.len()`
/// * `n` - Unpadded signal length
///
/// # Algorithm
/// 1. Daughter spectrum: `sqrt(2*pi*scale/dt) * conj(psi_ft(scale * w))`
/// 2. Multiply with the signal spectrum
/// 3. Inverse FFT and crop to the original length
pub fn cwt_single_scale(
    signal_ft: &[Complex64],
    ang_freqs: &[f64],
    scale: f64,
    params: &CwtParams,
    plans: &FftPlans,
    n: usize,
) -> Array1<Complex64> {
    let norm = (2.0 * std::f64::consts::PI * scale / params.dt).sqrt();

    let mut product: Vec<Complex64> = signal_ft
        .iter()
        .zip(ang_freqs.iter())
        .map(|(&x, &w)| x * params.mother.psi_ft(scale * w).conj() * norm)
        .collect();

    plans.inverse_normalized(&mut product);
    product.truncate(n);

    Array1::from_vec(product)
}

/// Compute CWT with caller-provided FFT plans
///
/// Scales are independent; with `params.parallel` they run on the rayon pool
/// and are reassembled in scale order.
pub fn cwt_with_plans(
    signal: &ArrayView1<f64>,
    params: &CwtParams,
    plans: &FftPlans,
) -> Result<CwtOutput> {
    validate_signal(signal)?;
    params.validate()?;

    let n = signal.len();
    if plans.len < n {
        return Err(AnalysisError::mismatch(format!(
            "FFT length {} shorter than signal length {}",
            plans.len, n
        )));
    }

    let samples: Vec<f64> = signal.iter().copied().collect();
    let signal_ft = plans.forward_real(&samples);
    let ang_freqs = angular_frequencies(plans.len, params.dt);

    let scales = params.scales();
    let single = |&scale: &f64| cwt_single_scale(&signal_ft, &ang_freqs, scale, params, plans, n);
    let rows: Vec<Array1<Complex64>> = if params.parallel {
        scales.to_vec().par_iter().map(single).collect()
    } else {
        scales.iter().map(single).collect()
    };

    let mut coefs = Array2::zeros((scales.len(), n));
    for (i, row) in rows.iter().enumerate() {
        coefs.row_mut(i).assign(row);
    }

    let frequencies = params.frequencies(&scales);
    let coi = cone_of_influence(n, params.dt, params.mother.e_folding());

    Ok(CwtOutput {
        coefs,
        scales,
        frequencies,
        coi,
    })
}

/// Full CWT computation
///
/// Main entry point: validates the signal, pads it to the next power of two,
/// and returns coefficients, scales, frequencies, and cone of influence.
///
/// # Errors
/// `InvalidSignal` for empty, single-sample, or non-finite input;
/// `InvalidParameter` for non-positive transform parameters.
pub fn cwt(signal: &ArrayView1<f64>, params: &CwtParams) -> Result<CwtOutput> {
    validate_signal(signal)?;
    let plans = FftPlans::for_signal(signal.len());
    cwt_with_plans(signal, params, &plans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array1;
    use std::f64::consts::PI;

    fn sine(n: usize, dt: f64, freq: f64) -> Array1<f64> {
        Array1::from_iter((0..n).map(|i| (2.0 * PI * freq * i as f64 * dt).sin()))
    }

    #[test]
    fn test_default_scale_set() {
        let params = CwtParams::new(0.1);
        assert_eq!(params.num_scales(), 57);

        let scales = params.scales();
        assert_relative_eq!(scales[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(scales[8], 0.4, epsilon = 1e-12);
        assert_relative_eq!(scales[56], 0.2 * 128.0, epsilon = 1e-9);
    }

    #[test]
    fn test_output_shapes() {
        let signal = sine(1000, 0.1, 0.1);
        let params = CwtParams::new(0.1);
        let out = cwt(&signal.view(), &params).unwrap();

        assert_eq!(out.coefs.shape(), &[out.scales.len(), 1000]);
        assert_eq!(out.frequencies.len(), out.scales.len());
        assert_eq!(out.coi.len(), 1000);
        assert!(out.scales.iter().all(|&s| s > 0.0));
        assert!(out.frequencies.iter().all(|&f| f > 0.0));
        assert!(out.frequencies.windows(2).into_iter().all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_power_peaks_at_signal_frequency() {
        let dt = 0.1;
        let signal = sine(1024, dt, 0.5);
        let params = CwtParams::new(dt);
        let out = cwt(&signal.view(), &params).unwrap();
        let power = out.power();

        let mid = 512;
        let (best, _) = power
            .column(mid)
            .iter()
            .enumerate()
            .fold((0, f64::MIN), |acc, (i, &p)| if p > acc.1 { (i, p) } else { acc });

        let peak_freq = out.frequencies[best];
        assert!((peak_freq - 0.5).abs() < 0.05, "peak at {} Hz", peak_freq);
    }

    #[test]
    fn test_cone_of_influence_shape() {
        let coi = cone_of_influence(5, 0.1, 2f64.sqrt());
        let s2 = 2f64.sqrt();
        assert_relative_eq!(coi[0], 0.1 * s2, epsilon = 1e-12);
        assert_relative_eq!(coi[2], 0.3 * s2, epsilon = 1e-12);
        assert_relative_eq!(coi[4], 0.1 * s2, epsilon = 1e-12);
        assert!(coi.iter().all(|&c| c > 0.0));
    }

    #[test]
    fn test_empty_signal_rejected() {
        let empty: Array1<f64> = Array1::zeros(0);
        let err = cwt(&empty.view(), &CwtParams::new(0.1)).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSignal { .. }));

        let single = Array1::from_vec(vec![1.0]);
        assert!(matches!(
            cwt(&single.view(), &CwtParams::new(0.1)),
            Err(AnalysisError::InvalidSignal { .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let signal = Array1::from_vec(vec![0.0, f64::NAN, 1.0, 2.0]);
        assert!(matches!(
            cwt(&signal.view(), &CwtParams::new(0.1)),
            Err(AnalysisError::InvalidSignal { .. })
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let signal = sine(64, 0.1, 1.0);
        for params in [
            CwtParams::new(0.1).with_dj(0.0),
            CwtParams::new(0.0),
            CwtParams::new(f64::INFINITY),
            CwtParams::new(0.1).with_s0(f64::NAN),
            CwtParams::new(0.1).with_s0(-0.2),
            CwtParams::new(0.1).with_octaves(f64::NAN),
        ] {
            assert!(
                matches!(
                    cwt(&signal.view(), &params),
                    Err(AnalysisError::InvalidParameter { .. })
                ),
                "accepted {:?}",
                params
            );
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let signal = sine(700, 0.1, 0.4);
        let sequential = CwtParams::new(0.1);
        let parallel = sequential.with_parallel(true);
        assert!(!sequential.parallel);
        assert!(sequential.same_transform(&parallel));

        let a = cwt(&signal.view(), &sequential).unwrap();
        let b = cwt(&signal.view(), &parallel).unwrap();
        assert_eq!(a.coefs, b.coefs);
        assert_eq!(a.scales, b.scales);
    }

    #[test]
    fn test_high_order_mothers_stay_finite() {
        let signal = sine(512, 0.1, 0.5);
        for mother in [Mother::Paul { order: 20 }, Mother::Dog { order: 40 }] {
            let out = cwt(&signal.view(), &CwtParams::new(0.1).with_mother(mother)).unwrap();
            assert!(out.coefs.iter().all(|c| c.re.is_finite() && c.im.is_finite()));
            assert!(out.coefs.iter().any(|c| c.norm() > 0.0), "{} is all zero", mother.name());
        }
    }
}

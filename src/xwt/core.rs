//! Cross wavelet transform
//!
//! `XWT = W1 * conj(W2)` elementwise, where both CWTs come from the same
//! transform parameters. Power is the unsquared magnitude of the cross
//! spectrum, phase is its argument in `[-pi, pi]` (positive when the first
//! signal leads).

use ndarray::{Array1, Array2, ArrayView1, Zip};
use num_complex::Complex64;

use crate::cwt::utils::FftPlans;
use crate::cwt::{cwt_with_plans, CwtOutput, CwtParams};
use crate::error::{AnalysisError, Result};

/// XWT output structure
#[derive(Debug, Clone)]
pub struct XwtOutput {
    /// Complex cross spectrum (num_scales, signal_length)
    pub cross: Array2<Complex64>,
    /// `|W1 * conj(W2)|`
    pub power: Array2<f64>,
    /// `atan2(Im, Re)` of the cross spectrum
    pub phase: Array2<f64>,
    pub scales: Array1<f64>,
    pub frequencies: Array1<f64>,
    pub coi: Array1<f64>,
}

/// Combine two CWTs into a cross wavelet transform
///
/// # Errors
/// `ParameterMismatch` when the two transforms do not share shape, scales,
/// or frequencies.
pub fn cross_spectrum(wave1: &CwtOutput, wave2: &CwtOutput) -> Result<XwtOutput> {
    if wave1.coefs.shape() != wave2.coefs.shape() {
        return Err(AnalysisError::mismatch(format!(
            "coefficient shapes differ: {:?} vs {:?}",
            wave1.coefs.shape(),
            wave2.coefs.shape()
        )));
    }
    if wave1.scales != wave2.scales || wave1.frequencies != wave2.frequencies {
        return Err(AnalysisError::mismatch(
            "transforms were computed with different scale sets",
        ));
    }

    let cross = Zip::from(&wave1.coefs)
        .and(&wave2.coefs)
        .map_collect(|&a, &b| a * b.conj());

    let power = cross.mapv(|c| c.norm());
    let phase = cross.mapv(|c| c.im.atan2(c.re));

    Ok(XwtOutput {
        cross,
        power,
        phase,
        scales: wave1.scales.clone(),
        frequencies: wave1.frequencies.clone(),
        coi: wave1.coi.clone(),
    })
}

/// Compute the cross wavelet transform of two signals
///
/// Callers truncate both signals to a shared length first; unequal lengths
/// are rejected rather than silently cropped.
///
/// # Errors
/// `ParameterMismatch` for unequal lengths, `InvalidSignal` for degenerate
/// input, `InvalidParameter` for bad transform parameters.
pub fn xwt(
    signal1: &ArrayView1<f64>,
    signal2: &ArrayView1<f64>,
    params: &CwtParams,
) -> Result<XwtOutput> {
    if signal1.len() != signal2.len() {
        return Err(AnalysisError::mismatch(format!(
            "signal lengths differ: {} vs {}",
            signal1.len(),
            signal2.len()
        )));
    }

    // Both transforms share one padded length, so the plans are built once
    let plans = FftPlans::for_signal(signal1.len());
    let wave1 = cwt_with_plans(signal1, params, &plans)?;
    let wave2 = cwt_with_plans(signal2, params, &plans)?;

    cross_spectrum(&wave1, &wave2)
}

/// Cross wavelet transform of two signals analyzed with separately supplied
/// parameter sets, which must be identical.
pub fn xwt_checked(
    signal1: &ArrayView1<f64>,
    params1: &CwtParams,
    signal2: &ArrayView1<f64>,
    params2: &CwtParams,
) -> Result<XwtOutput> {
    if !params1.same_transform(params2) {
        return Err(AnalysisError::mismatch(format!(
            "transform parameters differ: {:?} vs {:?}",
            params1, params2
        )));
    }
    xwt(signal1, signal2, params1)
}

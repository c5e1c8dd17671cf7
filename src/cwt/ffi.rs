//! Python FFI bindings for CWT
//!
//! Provides Python-callable functions using PyO3.

use num_complex::Complex64;
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;

use super::core::{cwt, CwtParams};
use super::wavelets::Mother;

/// Python-callable CWT function
///
/// # Arguments
/// * `signal` - Input signal (1D numpy array)
/// * `dt` - Sampling interval (default: 0.1)
/// * `dj` - Scale spacing in octaves (default: 0.125)
/// * `s0` - Smallest scale (default: 2*dt)
/// * `octaves` - Span of the scale set in octaves (default: 7)
/// * `mother` - Mother wavelet name (default: "morlet6")
/// * `parallel` - Compute scales on the rayon pool (default: True)
///
/// # Returns
/// Tuple of (coefs, scales, freqs, coi):
/// - coefs: complex CWT coefficients (num_scales, signal_length)
/// - scales, freqs: one value per scale
/// - coi: cone of influence, one value per sample
///
/// # Example (Python)
/// ```python
/// import _appliance_cwt
/// import numpy as np
///
/// signal = np.sin(2 * np.pi * np.linspace(0, 10, 1000))
/// wave, scales, freqs, coi = _appliance_cwt.cwt_py(signal, 0.1)
/// ```
#[pyfunction]
#[pyo3(signature = (signal, dt=0.1, dj=0.125, s0=None, octaves=7.0, mother="morlet6", parallel=true))]
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn cwt_py<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    dt: f64,
    dj: f64,
    s0: Option<f64>,
    octaves: f64,
    mother: &str,
    parallel: bool,
) -> PyResult<(
    Bound<'py, PyArray2<Complex64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let signal = signal.as_array().to_owned();
    let mother = Mother::from_name(mother)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    let params = CwtParams::new(dt)
        .with_dj(dj)
        .with_s0(s0.unwrap_or(2.0 * dt))
        .with_octaves(octaves)
        .with_mother(mother)
        .with_parallel(parallel);

    // Release the GIL while the scales are computed
    let output = py
        .detach(|| cwt(&signal.view(), &params))
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    Ok((
        output.coefs.into_pyarray(py),
        output.scales.into_pyarray(py),
        output.frequencies.into_pyarray(py),
        output.coi.into_pyarray(py),
    ))
}

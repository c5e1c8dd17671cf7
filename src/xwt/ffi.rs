//! Python FFI bindings for XWT

use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::Bound;

use super::core;
use crate::cwt::{CwtParams, Mother};

/// XWT Python interface
///
/// Both signals must already have the same length.
///
/// # Returns
/// Tuple of (power, phase, scales, freqs, coi)
#[pyfunction]
#[pyo3(signature = (signal1, signal2, dt=0.1, dj=0.125, s0=None, octaves=7.0, mother="morlet6", parallel=true))]
#[allow(clippy::type_complexity, clippy::too_many_arguments)]
pub fn xwt_py<'py>(
    py: Python<'py>,
    signal1: PyReadonlyArray1<f64>,
    signal2: PyReadonlyArray1<f64>,
    dt: f64,
    dj: f64,
    s0: Option<f64>,
    octaves: f64,
    mother: &str,
    parallel: bool,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let signal1 = signal1.as_array().to_owned();
    let signal2 = signal2.as_array().to_owned();
    let mother = Mother::from_name(mother)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    let params = CwtParams::new(dt)
        .with_dj(dj)
        .with_s0(s0.unwrap_or(2.0 * dt))
        .with_octaves(octaves)
        .with_mother(mother)
        .with_parallel(parallel);

    let output = py
        .detach(|| core::xwt(&signal1.view(), &signal2.view(), &params))
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(format!("XWT error: {}", e)))?;

    Ok((
        output.power.into_pyarray(py),
        output.phase.into_pyarray(py),
        output.scales.into_pyarray(py),
        output.frequencies.into_pyarray(py),
        output.coi.into_pyarray(py),
    ))
}

//! Python FFI bindings for signal preprocessing

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use pyo3::Bound;

use super::core;

/// Preprocess Python interface
///
/// # Arguments
/// * `signal` - Raw samples (numpy array)
/// * `normalize` - Divide by the population std (default: True)
/// * `remove_dc` - Subtract the mean (default: True)
#[pyfunction]
#[pyo3(signature = (signal, normalize=true, remove_dc=true))]
pub fn preprocess_py<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<f64>,
    normalize: bool,
    remove_dc: bool,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let out = core::preprocess(&signal.as_array(), normalize, remove_dc)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;
    Ok(out.into_pyarray(py))
}

//! Signal conditioning ahead of the wavelet transform
//!
//! DC removal runs before normalization, so the normalization factor is the
//! spread of the zero-centered signal.

use ndarray::{Array1, ArrayView1};

use crate::error::{AnalysisError, Result};

/// Arithmetic mean; `None` for an empty view
pub fn mean(values: &ArrayView1<f64>) -> Option<f64> {
    values.mean()
}

/// Population standard deviation (ddof = 0)
pub fn population_std(values: &ArrayView1<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.std(0.0))
}

/// Sample standard deviation (ddof = 1); `None` below two values
pub fn sample_std(values: &ArrayView1<f64>) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    Some(values.std(1.0))
}

/// Preprocess a raw signal
///
/// # Arguments
/// * `signal` - Raw samples
/// * `normalize` - Divide by the population standard deviation (ddof = 0)
/// * `remove_dc` - Subtract the arithmetic mean
///
/// # Errors
/// `InvalidSignal` for an empty or non-finite signal, and for a zero-variance
/// signal when `normalize` is requested.
pub fn preprocess(signal: &ArrayView1<f64>, normalize: bool, remove_dc: bool) -> Result<Array1<f64>> {
    if signal.is_empty() {
        return Err(AnalysisError::invalid_signal("signal is empty"));
    }
    if let Some(idx) = signal.iter().position(|x| !x.is_finite()) {
        return Err(AnalysisError::invalid_signal(format!(
            "non-finite sample at index {}",
            idx
        )));
    }

    let mut out = signal.to_owned();

    if remove_dc {
        let m = out.mean().unwrap_or(0.0);
        out.mapv_inplace(|x| x - m);
    }

    if normalize {
        let std = out.std(0.0);
        if !(std.is_finite() && std > 0.0) {
            return Err(AnalysisError::invalid_signal(
                "zero variance, cannot normalize",
            ));
        }
        out.mapv_inplace(|x| x / std);
    }

    Ok(out)
}

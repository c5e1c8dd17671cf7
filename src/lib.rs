//! # Appliance CWT - time-frequency analysis of appliance current signatures
//!
//! Continuous and cross wavelet transforms over recorded appliance currents,
//! with signal conditioning, `.npz` result archives, and scalogram plots.
//! The batch pipeline lives in [`analysis`]; Python bindings are available
//! behind the `python` feature.

pub mod analysis;
pub mod archive;
pub mod config;
pub mod cwt;
pub mod data;
pub mod error;
pub mod plot;
pub mod preprocess;
pub mod xwt;

pub use analysis::{run_batch, Analyzer, ApplianceResult, BatchReport, ComparisonResult};
pub use archive::{ArchiveValue, ResultBundle};
pub use config::AnalysisConfig;
pub use error::{AnalysisError, Result};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition
#[cfg(feature = "python")]
#[pymodule]
fn _appliance_cwt(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(preprocess::preprocess_py, m)?)?;
    m.add_function(wrap_pyfunction!(cwt::cwt_py, m)?)?;
    m.add_function(wrap_pyfunction!(xwt::xwt_py, m)?)?;
    Ok(())
}

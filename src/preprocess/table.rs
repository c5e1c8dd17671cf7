//! Tabular cleaning for raw CSV recordings
//!
//! Operates column-wise on a rows x columns matrix: drop invalid rows, drop
//! z-score outliers, rescale, and cut into overlapping windows.

use ndarray::{s, Array1, Array2, ArrayView1, Axis};
use std::str::FromStr;

use super::core::{mean, sample_std};
use crate::error::{AnalysisError, Result};

/// Numeric table loaded from a CSV file
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    pub headers: Vec<String>,
    /// (rows, columns)
    pub values: Array2<f64>,
}

impl SampleTable {
    pub fn new(headers: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if headers.len() != values.ncols() {
            return Err(AnalysisError::mismatch(format!(
                "{} headers for {} columns",
                headers.len(),
                values.ncols()
            )));
        }
        Ok(Self { headers, values })
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column(&self, idx: usize) -> Option<ArrayView1<'_, f64>> {
        (idx < self.n_cols()).then(|| self.values.column(idx))
    }

    /// Keep the rows whose mask entry is true
    fn select_rows(&self, keep: &[bool]) -> Self {
        let rows: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        Self {
            headers: self.headers.clone(),
            values: self.values.select(Axis(0), &rows),
        }
    }
}

/// Column normalization method
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMethod {
    /// `(x - mean) / sample_std`
    ZScore,
    /// `(x - min) / (max - min)`
    MinMax,
    /// `(x - median) / (q75 - q25)`
    Robust,
}

impl FromStr for NormalizeMethod {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "zscore" => Ok(NormalizeMethod::ZScore),
            "minmax" => Ok(NormalizeMethod::MinMax),
            "robust" => Ok(NormalizeMethod::Robust),
            _ => Err(AnalysisError::invalid_parameter("normalize_method", s)),
        }
    }
}

/// Drop rows with NaN/Inf, then optionally rows where any column has
/// `|z| >= threshold`.
///
/// z-scores use the column mean and sample standard deviation of the rows
/// that survived the finiteness pass. Constant columns never flag a row.
pub fn clean(table: &SampleTable, remove_outliers: bool, threshold: f64) -> SampleTable {
    let finite: Vec<bool> = table
        .values
        .axis_iter(Axis(0))
        .map(|row| row.iter().all(|x| x.is_finite()))
        .collect();
    let cleaned = table.select_rows(&finite);

    if !remove_outliers || cleaned.n_rows() < 2 {
        return cleaned;
    }

    let stats: Vec<(f64, f64)> = cleaned
        .values
        .axis_iter(Axis(1))
        .map(|col| {
            (
                mean(&col).unwrap_or(0.0),
                sample_std(&col).unwrap_or(0.0),
            )
        })
        .collect();

    let keep: Vec<bool> = cleaned
        .values
        .axis_iter(Axis(0))
        .map(|row| {
            row.iter().zip(stats.iter()).all(|(&x, &(m, sd))| {
                if sd > 0.0 {
                    ((x - m) / sd).abs() < threshold
                } else {
                    true
                }
            })
        })
        .collect();

    cleaned.select_rows(&keep)
}

/// Linear-interpolated quantile of sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn normalize_column(col: &ArrayView1<f64>, method: NormalizeMethod) -> Option<Array1<f64>> {
    if col.is_empty() {
        return None;
    }
    let (center, spread) = match method {
        NormalizeMethod::ZScore => (mean(col)?, sample_std(col)?),
        NormalizeMethod::MinMax => {
            let min = col.fold(f64::INFINITY, |a, &b| a.min(b));
            let max = col.fold(f64::NEG_INFINITY, |a, &b| a.max(b));
            (min, max - min)
        }
        NormalizeMethod::Robust => {
            let mut sorted = col.to_vec();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let median = quantile(&sorted, 0.5);
            (median, quantile(&sorted, 0.75) - quantile(&sorted, 0.25))
        }
    };
    if !(spread.is_finite() && spread > 0.0) {
        return None;
    }
    Some(col.mapv(|x| (x - center) / spread))
}

/// Normalize every column independently
///
/// # Errors
/// `InvalidSignal` when a column has no spread under the chosen method.
pub fn normalize(table: &SampleTable, method: NormalizeMethod) -> Result<SampleTable> {
    let mut values = table.values.clone();
    for (idx, mut col) in values.axis_iter_mut(Axis(1)).enumerate() {
        let scaled = normalize_column(&col.view(), method).ok_or_else(|| {
            AnalysisError::invalid_signal(format!(
                "column '{}' has zero spread",
                table.headers.get(idx).map(String::as_str).unwrap_or("?")
            ))
        })?;
        col.assign(&scaled);
    }
    Ok(SampleTable {
        headers: table.headers.clone(),
        values,
    })
}

/// Cut a table into windows of `segment_length` rows
///
/// Consecutive windows start `floor(segment_length * (1 - overlap))` rows
/// apart; a trailing partial window is dropped.
pub fn segment(table: &SampleTable, segment_length: usize, overlap: f64) -> Result<Vec<SampleTable>> {
    if segment_length == 0 {
        return Err(AnalysisError::invalid_parameter("segment_length", segment_length));
    }
    if !(0.0..1.0).contains(&overlap) {
        return Err(AnalysisError::invalid_parameter("overlap", overlap));
    }
    let step = (segment_length as f64 * (1.0 - overlap)) as usize;
    if step == 0 {
        return Err(AnalysisError::invalid_parameter("overlap", overlap));
    }

    let n = table.n_rows();
    if n < segment_length {
        return Ok(Vec::new());
    }

    Ok((0..=n - segment_length)
        .step_by(step)
        .map(|start| SampleTable {
            headers: table.headers.clone(),
            values: table.values.slice(s![start..start + segment_length, ..]).to_owned(),
        })
        .collect())
}

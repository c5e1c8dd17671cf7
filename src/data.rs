//! CSV input and output
//!
//! Recordings are numeric CSV files with an optional header row. With two or
//! more columns, column 1 holds the current; otherwise column 0 does.

use csv::{ReaderBuilder, Trim, WriterBuilder};
use ndarray::{Array1, Array2};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::FileConfig;
use crate::error::{AnalysisError, Result};
use crate::preprocess::{clean, normalize, NormalizeMethod, SampleTable};

/// Z-score threshold used when cleaning recordings
pub const OUTLIER_THRESHOLD: f64 = 3.0;

/// Parse a CSV stream into a numeric table
///
/// The first record is a header when any of its fields is not numeric.
/// Unparseable or missing cells become NaN; extra cells are ignored.
pub fn read_table_from<R: Read>(reader: R) -> Result<SampleTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = rdr.records();
    let first = match records.next() {
        Some(record) => record?,
        None => return Err(AnalysisError::invalid_signal("CSV input has no rows")),
    };

    let parsed_first: Vec<Option<f64>> = first.iter().map(|f| f.parse::<f64>().ok()).collect();
    let has_header = parsed_first.iter().any(Option::is_none);
    let n_cols = first.len();

    let headers: Vec<String> = if has_header {
        first.iter().map(str::to_string).collect()
    } else {
        (0..n_cols).map(|i| format!("column_{}", i)).collect()
    };

    let mut flat: Vec<f64> = Vec::new();
    if !has_header {
        flat.extend(parsed_first.iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    for record in records {
        let record = record?;
        for i in 0..n_cols {
            let value = record
                .get(i)
                .and_then(|f| f.parse::<f64>().ok())
                .unwrap_or(f64::NAN);
            flat.push(value);
        }
    }

    let n_rows = flat.len() / n_cols.max(1);
    let values = Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| AnalysisError::invalid_signal(e.to_string()))?;
    SampleTable::new(headers, values)
}

/// Read a CSV file into a numeric table
pub fn read_table(path: impl AsRef<Path>) -> Result<SampleTable> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let table = read_table_from(file)?;
    debug!(
        path = %path.display(),
        rows = table.n_rows(),
        cols = table.n_cols(),
        "loaded table"
    );
    Ok(table)
}

/// Write a table with its header row
pub fn write_table(table: &SampleTable, path: impl AsRef<Path>) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    wtr.write_record(&table.headers)?;
    for row in table.values.rows() {
        wtr.write_record(row.iter().map(|v| v.to_string()))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Clean and z-score one recording into `<stem>_processed.csv`
///
/// Returns the path of the written file. `output_dir` is created if missing.
pub fn process_csv_file(path: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let output_dir = output_dir.as_ref();

    let table = read_table(path)?;
    let rows_in = table.n_rows();
    let cleaned = clean(&table, true, OUTLIER_THRESHOLD);
    if cleaned.n_rows() == 0 {
        return Err(AnalysisError::invalid_signal(format!(
            "{}: no rows left after cleaning",
            path.display()
        )));
    }
    let normalized = normalize(&cleaned, NormalizeMethod::ZScore)?;

    fs::create_dir_all(output_dir)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    let out_path = output_dir.join(format!("{}_processed.csv", stem));
    write_table(&normalized, &out_path)?;

    info!(
        input = %path.display(),
        output = %out_path.display(),
        rows_in,
        rows_out = normalized.n_rows(),
        "processed recording"
    );
    Ok(out_path)
}

/// Index of the current column for a table of `n_cols` columns
pub fn current_column_index(n_cols: usize) -> usize {
    if n_cols >= 2 {
        1
    } else {
        0
    }
}

/// Extract the current signal, dropping non-finite samples
///
/// # Errors
/// `InvalidSignal` when the table has no columns or no finite samples.
pub fn extract_current(table: &SampleTable) -> Result<Array1<f64>> {
    let idx = current_column_index(table.n_cols());
    let column = table
        .column(idx)
        .ok_or_else(|| AnalysisError::invalid_signal("table has no columns"))?;

    let signal: Array1<f64> = column.iter().copied().filter(|x| x.is_finite()).collect();
    if signal.is_empty() {
        return Err(AnalysisError::invalid_signal(format!(
            "column '{}' has no finite samples",
            table.headers[idx]
        )));
    }
    Ok(signal)
}

/// Load the current signal of one recording
pub fn load_current_signal(path: impl AsRef<Path>) -> Result<Array1<f64>> {
    extract_current(&read_table(path)?)
}

/// Python-style `str.title()`: uppercase the first letter of each run of
/// letters, lowercase the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Display name of an appliance recording (`washing_machine.csv` → `Washing Machine`)
pub fn appliance_name(path: &Path, data_suffix: &str) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(data_suffix).unwrap_or(&file_name);
    title_case(&stem.replace('_', " "))
}

/// List candidate recordings in `dir`, sorted by file name
pub fn discover_files(dir: impl AsRef<Path>, files: &FileConfig) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir.as_ref())? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.ends_with(&files.data_suffix) || name.ends_with(&files.exclude_suffix) {
            continue;
        }
        if files.exclude_contains.iter().any(|p| name.contains(p.as_str())) {
            continue;
        }
        found.push(entry.path());
    }
    found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(found)
}

//! Directory-level batch run
//!
//! Discovers recordings, analyzes the selected ones, compares the configured
//! pairs, and saves every result into one archive. A failing file or pair is
//! logged and skipped; only an empty input directory stops the run.

use ndarray::Array1;
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::core::{Analyzer, ApplianceResult};
use crate::archive::{self, ResultBundle};
use crate::config::AnalysisConfig;
use crate::data::{appliance_name, discover_files, load_current_signal};
use crate::error::{AnalysisError, Result};
use crate::plot::ScalogramSink;

/// Summary of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Every recording found, in run order
    pub discovered: Vec<PathBuf>,
    /// Group names of successful single-appliance analyses
    pub analyzed: Vec<String>,
    /// Group names of successful comparisons
    pub compared: Vec<String>,
    /// Skipped items with the reason
    pub skipped: Vec<(String, String)>,
    /// Aggregated results, one group per item
    pub results: ResultBundle,
    /// Written archive; `None` when nothing succeeded
    pub archive_path: Option<PathBuf>,
}

/// One selected recording; `signal` is `None` when loading failed
struct Recording {
    name: String,
    signal: Option<Array1<f64>>,
}

fn load_signal(path: &Path, config: &AnalysisConfig) -> Result<Array1<f64>> {
    let size = fs::metadata(path)?.len();
    if size > config.max_file_size_bytes() {
        return Err(AnalysisError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "file is {:.1} MB, limit is {} MB",
                size as f64 / (1024.0 * 1024.0),
                config.limits.max_file_size_mb
            ),
        )));
    }
    load_current_signal(path)
}

/// Display names for `paths`, with a numeric suffix on repeats
fn unique_names(paths: &[PathBuf], data_suffix: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(paths.len());
    for path in paths {
        let base = appliance_name(path, data_suffix);
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{} ({})", base, n);
            n += 1;
        }
        if name != base {
            warn!(path = %path.display(), name = %name, "duplicate appliance name");
        }
        names.push(name);
    }
    names
}

/// Run the full analysis over `input_dir`, writing the archive to `output`
///
/// # Errors
/// `Config` when no recordings are found, and any error from saving the
/// archive. Per-file and per-pair failures are reported in
/// [`BatchReport::skipped`]. Nothing is written when every item failed.
pub fn run_batch(
    input_dir: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &AnalysisConfig,
    sink: &mut dyn ScalogramSink,
) -> Result<BatchReport> {
    let input_dir = input_dir.as_ref();
    let analyzer = Analyzer::new(config.clone())?;

    let discovered = discover_files(input_dir, &config.files)?;
    if discovered.is_empty() {
        return Err(AnalysisError::Config(format!(
            "no '{}' files found in {}",
            config.files.data_suffix,
            input_dir.display()
        )));
    }
    info!(count = discovered.len(), dir = %input_dir.display(), "found recordings");

    let mut report = BatchReport {
        discovered: discovered.clone(),
        ..BatchReport::default()
    };

    let selected = &discovered[..discovered.len().min(config.files.max_files)];
    let names = unique_names(selected, &config.files.data_suffix);
    let recordings: Vec<Recording> = selected
        .iter()
        .zip(names)
        .map(|(path, name)| match load_signal(path, config) {
            Ok(signal) => Recording {
                name,
                signal: Some(signal),
            },
            Err(e) => {
                warn!(appliance = %name, path = %path.display(), error = %e, "failed to load");
                report.skipped.push((name.clone(), e.to_string()));
                Recording { name, signal: None }
            }
        })
        .collect();

    let analyze_one = |rec: &Recording| -> Option<Result<ApplianceResult>> {
        rec.signal
            .as_ref()
            .map(|signal| analyzer.analyze(&signal.view(), &rec.name))
    };
    // collect() keeps input order either way
    let analyses: Vec<Option<Result<ApplianceResult>>> = if config.performance.parallel {
        recordings.par_iter().map(analyze_one).collect()
    } else {
        recordings.iter().map(analyze_one).collect()
    };

    for (rec, analysis) in recordings.iter().zip(analyses) {
        match analysis {
            Some(Ok(result)) => {
                info!(appliance = %rec.name, samples = result.signal.len(), "analyzed");
                if let Err(e) = result.render(sink) {
                    warn!(appliance = %rec.name, error = %e, "plot failed");
                }
                report.results.insert(rec.name.clone(), result.to_bundle());
                report.analyzed.push(rec.name.clone());
            }
            Some(Err(e)) => {
                warn!(appliance = %rec.name, error = %e, "skipping appliance");
                report.skipped.push((rec.name.clone(), e.to_string()));
            }
            // load failure, already reported
            None => {}
        }
    }

    for (i, j) in config.files.pair_policy.pairs(recordings.len()) {
        let (a, b) = (&recordings[i], &recordings[j]);
        let key = format!("{}_vs_{}", a.name, b.name);

        let comparison = match (&a.signal, &b.signal) {
            (Some(sa), Some(sb)) => analyzer
                .compare(&sa.view(), &sb.view(), &a.name, &b.name)
                .map_err(|e| e.to_string()),
            (None, _) => Err(format!("input '{}' unavailable", a.name)),
            (_, None) => Err(format!("input '{}' unavailable", b.name)),
        };

        match comparison {
            Ok(result) => {
                info!(pair = %key, samples = result.time.len(), "compared");
                if let Err(e) = result.render(sink) {
                    warn!(pair = %key, error = %e, "plot failed");
                }
                report.results.insert(key.clone(), result.to_bundle());
                report.compared.push(key);
            }
            Err(reason) => {
                warn!(pair = %key, reason = %reason, "skipping comparison");
                report.skipped.push((key, reason));
            }
        }
    }

    if report.results.is_empty() {
        warn!(skipped = report.skipped.len(), "no results, archive not written");
    } else {
        let path = output.as_ref().to_path_buf();
        archive::save(&report.results, &path)?;
        report.archive_path = Some(path);
    }
    info!(
        analyzed = report.analyzed.len(),
        compared = report.compared.len(),
        skipped = report.skipped.len(),
        "batch complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{NoopSink, Scalogram};
    use std::f64::consts::PI;
    use tempfile::tempdir;

    fn write_recording(dir: &Path, name: &str, n: usize, freq: f64) {
        let mut csv = String::from("time,current\n");
        for i in 0..n {
            let t = i as f64 * 0.1;
            csv.push_str(&format!("{},{}\n", t, (2.0 * PI * freq * t).sin() + 1.0));
        }
        fs::write(dir.join(name), csv).unwrap();
    }

    #[derive(Default)]
    struct RecordingSink {
        titles: Vec<String>,
    }

    impl ScalogramSink for RecordingSink {
        fn render(&mut self, plot: &Scalogram<'_>) -> Result<()> {
            self.titles.push(plot.title.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_empty_dir_is_config_error() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("results.npz");
        let err = run_batch(dir.path(), &out, &AnalysisConfig::default(), &mut NoopSink).unwrap_err();
        assert!(matches!(err, AnalysisError::Config(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_bad_file_is_skipped() {
        let dir = tempdir().unwrap();
        write_recording(dir.path(), "a_fan.csv", 300, 0.5);
        write_recording(dir.path(), "b_lamp.csv", 20, 0.5);
        write_recording(dir.path(), "c_kettle.csv", 250, 1.0);
        let out = dir.path().join("results.npz");

        let mut sink = RecordingSink::default();
        let report = run_batch(dir.path(), &out, &AnalysisConfig::default(), &mut sink).unwrap();

        assert_eq!(report.analyzed, vec!["A Fan", "C Kettle"]);
        assert_eq!(report.compared, vec!["A Fan_vs_C Kettle"]);
        let skipped: Vec<_> = report.skipped.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(skipped, vec!["B Lamp", "A Fan_vs_B Lamp", "B Lamp_vs_C Kettle"]);
        assert_eq!(sink.titles.len(), 4);
        assert_eq!(report.archive_path.as_deref(), Some(out.as_path()));
        assert!(out.exists());
    }

    #[test]
    fn test_parallel_keeps_order() {
        let dir = tempdir().unwrap();
        for (name, f) in [("x1.csv", 0.3), ("x2.csv", 0.6), ("x3.csv", 1.2)] {
            write_recording(dir.path(), name, 200, f);
        }
        let mut config = AnalysisConfig::default();
        config.performance.parallel = true;
        config.files.pair_policy = crate::config::PairPolicy::FirstVsRest;

        let out = dir.path().join("results.npz");
        let report = run_batch(dir.path(), &out, &config, &mut NoopSink).unwrap();
        assert_eq!(report.analyzed, vec!["X1", "X2", "X3"]);
        assert_eq!(report.compared, vec!["X1_vs_X2", "X1_vs_X3"]);
        assert_eq!(
            report.results.keys().collect::<Vec<_>>(),
            vec!["X1", "X2", "X3", "X1_vs_X2", "X1_vs_X3"]
        );
    }

    #[test]
    fn test_oversized_file_skipped() {
        let dir = tempdir().unwrap();
        write_recording(dir.path(), "big.csv", 300, 0.5);
        let mut config = AnalysisConfig::default();
        config.limits.max_file_size_mb = 1e-4;

        let out = dir.path().join("results.npz");
        let report = run_batch(dir.path(), &out, &config, &mut NoopSink).unwrap();
        assert!(report.analyzed.is_empty());
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].1.starts_with("IO error:"));
        assert!(report.results.is_empty());
        assert!(report.archive_path.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_load_failures_keep_their_kind() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.csv"), "t,i\n").unwrap();
        fs::write(dir.path().join("b.csv"), [0xff, 0xfe, b',', 0x80, b'\n', b'1', b'\n']).unwrap();
        write_recording(dir.path(), "c.csv", 200, 0.5);

        let out = dir.path().join("results.npz");
        let report = run_batch(dir.path(), &out, &AnalysisConfig::default(), &mut NoopSink).unwrap();
        assert_eq!(report.analyzed, vec!["C"]);

        let reason = |key: &str| {
            report
                .skipped
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, r)| r.clone())
                .unwrap()
        };
        let a = reason("A");
        assert!(a.starts_with("Invalid signal:"));
        assert_eq!(a.matches("Invalid signal").count(), 1);
        assert!(reason("B").starts_with("CSV error:"), "{}", reason("B"));
        assert_eq!(reason("A_vs_B"), "input 'A' unavailable");
        assert_eq!(reason("B_vs_C"), "input 'B' unavailable");
        assert_eq!(report.skipped.len(), 5);
    }

    #[test]
    fn test_all_skipped_writes_no_archive() {
        let dir = tempdir().unwrap();
        write_recording(dir.path(), "tiny.csv", 2, 0.5);

        let out = dir.path().join("results.npz");
        let report = run_batch(dir.path(), &out, &AnalysisConfig::default(), &mut NoopSink).unwrap();
        assert!(report.analyzed.is_empty());
        assert!(report.archive_path.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let dir = tempdir().unwrap();
        write_recording(dir.path(), "Fan.csv", 200, 0.5);
        write_recording(dir.path(), "fan.csv", 200, 0.7);

        let out = dir.path().join("results.npz");
        let report = run_batch(dir.path(), &out, &AnalysisConfig::default(), &mut NoopSink).unwrap();
        assert_eq!(report.analyzed, vec!["Fan", "Fan (2)"]);
        assert_eq!(report.compared, vec!["Fan_vs_Fan (2)"]);
        assert_eq!(report.results.len(), 3);
    }
}

//! Analysis configuration
//!
//! Every tunable of a run lives in [`AnalysisConfig`], passed explicitly to
//! the orchestrator. Defaults reproduce the reference analysis setup, and a
//! TOML file may override any subset of fields.
//!
//! ```toml
//! [transform]
//! dt = 0.05
//! mother = "paul4"
//!
//! [files]
//! max_files = 5
//! pair_policy = "first_vs_rest"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cwt::{CwtParams, Mother};
use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Sampling interval (seconds)
    pub dt: f64,
    /// Scale spacing in octaves
    pub dj: f64,
    /// Smallest scale; `None` means `2 * dt`
    pub s0: Option<f64>,
    /// Span of the scale set in octaves
    pub octaves: f64,
    /// Mother wavelet name, e.g. "morlet6"
    pub mother: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,
            dj: 0.125,
            s0: None,
            octaves: 7.0,
            mother: "morlet6".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    pub normalize: bool,
    pub remove_dc: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            normalize: true,
            remove_dc: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// Figure size in inches (width, height)
    pub figure_size: (f64, f64),
    pub dpi: u32,
    pub colormap: String,
    pub save_plots: bool,
    pub plot_format: String,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            figure_size: (12.0, 6.0),
            dpi: 100,
            colormap: "viridis".to_string(),
            save_plots: true,
            plot_format: "png".to_string(),
        }
    }
}

impl PlotConfig {
    /// Pixel dimensions of a rendered figure
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.figure_size.0 * self.dpi as f64).round() as u32,
            (self.figure_size.1 * self.dpi as f64).round() as u32,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_filename: "appliance_analysis_results.npz".to_string(),
        }
    }
}

/// Which pairs of the selected files are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairPolicy {
    /// Every pair (i, j) with i < j
    AllPairs,
    /// The first file against each of the others
    FirstVsRest,
}

impl PairPolicy {
    /// Index pairs over `n` selected files, in comparison order
    pub fn pairs(&self, n: usize) -> Vec<(usize, usize)> {
        match self {
            PairPolicy::AllPairs => (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .collect(),
            PairPolicy::FirstVsRest => (1..n).map(|j| (0, j)).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Suffix of input data files
    pub data_suffix: String,
    /// Files with this suffix are outputs of the cleaning step
    pub exclude_suffix: String,
    /// Files whose name contains any of these are skipped
    pub exclude_contains: Vec<String>,
    /// Number of files analyzed individually and considered for comparison
    pub max_files: usize,
    pub pair_policy: PairPolicy,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            data_suffix: ".csv".to_string(),
            exclude_suffix: "_processed.csv".to_string(),
            exclude_contains: vec![".git".to_string()],
            max_files: 3,
            pair_policy: PairPolicy::AllPairs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    /// Skip files larger than this
    pub max_file_size_mb: f64,
    pub min_signal_length: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100.0,
            min_signal_length: 100,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Run appliances and transform scales on the rayon pool (results keep
    /// input order)
    pub parallel: bool,
}

/// Configuration for one analysis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub transform: TransformConfig,
    pub preprocess: PreprocessConfig,
    pub plot: PlotConfig,
    pub output: OutputConfig,
    pub files: FileConfig,
    pub limits: LimitConfig,
    pub performance: PerformanceConfig,
}

impl AnalysisConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| AnalysisError::Config(e.to_string()))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let t = &self.transform;
        if !(t.dt.is_finite() && t.dt > 0.0) {
            return Err(AnalysisError::Config("transform.dt must be positive".to_string()));
        }
        if !(t.dj.is_finite() && t.dj > 0.0) {
            return Err(AnalysisError::Config("transform.dj must be positive".to_string()));
        }
        if let Some(s0) = t.s0 {
            if !(s0.is_finite() && s0 > 0.0) {
                return Err(AnalysisError::Config("transform.s0 must be positive".to_string()));
            }
        }
        if !(t.octaves.is_finite() && t.octaves > 0.0) {
            return Err(AnalysisError::Config(
                "transform.octaves must be positive".to_string(),
            ));
        }
        Mother::from_name(&t.mother)
            .map_err(|e| AnalysisError::Config(format!("transform.mother: {}", e)))?;

        if self.plot.dpi == 0 {
            return Err(AnalysisError::Config("plot.dpi must be positive".to_string()));
        }
        let (w, h) = self.plot.figure_size;
        if !(w.is_finite() && w > 0.0 && h.is_finite() && h > 0.0) {
            return Err(AnalysisError::Config(
                "plot.figure_size must be positive".to_string(),
            ));
        }
        if self.limits.min_signal_length < crate::cwt::MIN_SIGNAL_LEN {
            return Err(AnalysisError::Config(format!(
                "limits.min_signal_length must be >= {}",
                crate::cwt::MIN_SIGNAL_LEN
            )));
        }
        let max_mb = self.limits.max_file_size_mb;
        if !(max_mb.is_finite() && max_mb > 0.0) {
            return Err(AnalysisError::Config(
                "limits.max_file_size_mb must be positive".to_string(),
            ));
        }
        if self.files.max_files == 0 {
            return Err(AnalysisError::Config("files.max_files must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Transform parameters derived from the `transform` section
    pub fn cwt_params(&self) -> Result<CwtParams> {
        let t = &self.transform;
        let params = CwtParams::new(t.dt)
            .with_dj(t.dj)
            .with_s0(t.s0.unwrap_or(2.0 * t.dt))
            .with_octaves(t.octaves)
            .with_mother(Mother::from_name(&t.mother)?)
            .with_parallel(self.performance.parallel);
        params.validate()?;
        Ok(params)
    }

    pub fn max_file_size_bytes(&self) -> u64 {
        (self.limits.max_file_size_mb * 1024.0 * 1024.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());

        let params = config.cwt_params().unwrap();
        assert_eq!(params.s0, 0.2);
        assert_eq!(params.num_scales(), 57);
        assert_eq!(config.plot.pixel_size(), (1200, 600));
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [transform]
            dt = 0.05
            mother = "paul4"

            [files]
            pair_policy = "first_vs_rest"
            "#,
        )
        .unwrap();

        assert_eq!(config.transform.dt, 0.05);
        assert_eq!(config.transform.dj, 0.125);
        assert_eq!(config.files.pair_policy, PairPolicy::FirstVsRest);
        assert_eq!(config.cwt_params().unwrap().mother, Mother::Paul { order: 4 });
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.transform.dj = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.transform.mother = "haar".to_string();
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.limits.min_signal_length = 1;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.files.max_files = 0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.transform.mother = "dog200".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_nan_limits() {
        let err = AnalysisConfig::from_toml_str("[limits]\nmax_file_size_mb = nan\n");
        assert!(matches!(err, Err(AnalysisError::Config(_))));

        let err = AnalysisConfig::from_toml_str("[plot]\nfigure_size = [nan, 6.0]\n");
        assert!(matches!(err, Err(AnalysisError::Config(_))));

        let mut config = AnalysisConfig::default();
        config.limits.max_file_size_mb = f64::INFINITY;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parallel_flag_reaches_transform() {
        let mut config = AnalysisConfig::default();
        assert!(!config.cwt_params().unwrap().parallel);
        config.performance.parallel = true;
        assert!(config.cwt_params().unwrap().parallel);
    }

    #[test]
    fn test_from_file_round_trip() {
        let mut config = AnalysisConfig::default();
        config.performance.parallel = true;
        config.transform.s0 = Some(0.5);

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", config.to_toml_string().unwrap()).unwrap();

        let loaded = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_pair_policies() {
        assert_eq!(PairPolicy::AllPairs.pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(PairPolicy::FirstVsRest.pairs(3), vec![(0, 1), (0, 2)]);
        assert!(PairPolicy::AllPairs.pairs(1).is_empty());
    }
}

//! Single-appliance and pairwise analysis

use ndarray::{s, Array1, Array2, ArrayView1};
use tracing::debug;

use crate::archive::ResultBundle;
use crate::config::AnalysisConfig;
use crate::cwt::{cwt, CwtParams};
use crate::error::{AnalysisError, Result};
use crate::plot::{Scalogram, ScalogramKind, ScalogramSink};
use crate::preprocess::preprocess;
use crate::xwt::xwt;

/// Time axis `t[i] = i * dt`
pub fn time_axis(n: usize, dt: f64) -> Array1<f64> {
    Array1::from_iter((0..n).map(|i| i as f64 * dt))
}

/// Output of [`Analyzer::analyze`]
#[derive(Debug, Clone)]
pub struct ApplianceResult {
    pub name: String,
    /// Preprocessed signal
    pub signal: Array1<f64>,
    /// `|W|^2`, (num_scales, signal_length)
    pub power: Array2<f64>,
    pub scales: Array1<f64>,
    pub frequencies: Array1<f64>,
    pub time: Array1<f64>,
    pub coi: Array1<f64>,
}

impl ApplianceResult {
    pub fn to_bundle(&self) -> ResultBundle {
        ResultBundle::new()
            .with("appliance_name", self.name.as_str())
            .with("signal", self.signal.clone())
            .with("cwt_power", self.power.clone())
            .with("scales", self.scales.clone())
            .with("frequencies", self.frequencies.clone())
            .with("time", self.time.clone())
            .with("cone_of_influence", self.coi.clone())
    }

    pub fn render(&self, sink: &mut dyn ScalogramSink) -> Result<()> {
        let title = format!("CWT Scalogram - {}", self.name);
        sink.render(&Scalogram {
            title: &title,
            time: &self.time,
            frequencies: &self.frequencies,
            values: &self.power,
            coi: Some(&self.coi),
            kind: ScalogramKind::Power,
        })
    }
}

/// Output of [`Analyzer::compare`]
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub name1: String,
    pub name2: String,
    /// Preprocessed signals, truncated to a shared length
    pub signal1: Array1<f64>,
    pub signal2: Array1<f64>,
    /// `|W1 * conj(W2)|`
    pub power: Array2<f64>,
    pub phase: Array2<f64>,
    pub scales: Array1<f64>,
    pub frequencies: Array1<f64>,
    pub time: Array1<f64>,
    pub coi: Array1<f64>,
}

impl ComparisonResult {
    /// Archive group name, `"<name1>_vs_<name2>"`
    pub fn key(&self) -> String {
        format!("{}_vs_{}", self.name1, self.name2)
    }

    pub fn to_bundle(&self) -> ResultBundle {
        ResultBundle::new()
            .with("appliance1", self.name1.as_str())
            .with("appliance2", self.name2.as_str())
            .with("signal1", self.signal1.clone())
            .with("signal2", self.signal2.clone())
            .with("xwt_power", self.power.clone())
            .with("xwt_phase", self.phase.clone())
            .with("scales", self.scales.clone())
            .with("frequencies", self.frequencies.clone())
            .with("time", self.time.clone())
            .with("cone_of_influence", self.coi.clone())
    }

    /// Power and phase images
    pub fn render(&self, sink: &mut dyn ScalogramSink) -> Result<()> {
        let power_title = format!("Cross Wavelet Power - {} vs {}", self.name1, self.name2);
        sink.render(&Scalogram {
            title: &power_title,
            time: &self.time,
            frequencies: &self.frequencies,
            values: &self.power,
            coi: Some(&self.coi),
            kind: ScalogramKind::Power,
        })?;

        let phase_title = format!("Cross Wavelet Phase - {} vs {}", self.name1, self.name2);
        sink.render(&Scalogram {
            title: &phase_title,
            time: &self.time,
            frequencies: &self.frequencies,
            values: &self.phase,
            coi: Some(&self.coi),
            kind: ScalogramKind::Phase,
        })
    }
}

/// Pipeline from raw signal to transform results
///
/// Holds the validated configuration and the transform parameters derived
/// from it; every call works on its own copies of the input.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
    params: CwtParams,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let params = config.cwt_params()?;
        Ok(Self { config, params })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn params(&self) -> &CwtParams {
        &self.params
    }

    fn check_length(&self, signal: &ArrayView1<f64>, name: &str) -> Result<()> {
        let min = self.config.limits.min_signal_length;
        if signal.len() < min {
            return Err(AnalysisError::invalid_signal(format!(
                "'{}' has {} samples, need at least {}",
                name,
                signal.len(),
                min
            )));
        }
        Ok(())
    }

    fn prepare(&self, signal: &ArrayView1<f64>, name: &str) -> Result<Array1<f64>> {
        self.check_length(signal, name)?;
        let p = &self.config.preprocess;
        preprocess(signal, p.normalize, p.remove_dc)
    }

    /// Preprocess one signal and compute its wavelet power
    pub fn analyze(&self, signal: &ArrayView1<f64>, name: &str) -> Result<ApplianceResult> {
        debug!(name, samples = signal.len(), "analyzing");
        let signal = self.prepare(signal, name)?;
        let out = cwt(&signal.view(), &self.params)?;
        let power = out.power();

        Ok(ApplianceResult {
            name: name.to_string(),
            time: time_axis(signal.len(), self.params.dt),
            signal,
            power,
            scales: out.scales,
            frequencies: out.frequencies,
            coi: out.coi,
        })
    }

    /// Preprocess two signals, truncate both to the shorter length, and
    /// compute their cross wavelet transform
    pub fn compare(
        &self,
        signal1: &ArrayView1<f64>,
        signal2: &ArrayView1<f64>,
        name1: &str,
        name2: &str,
    ) -> Result<ComparisonResult> {
        debug!(name1, name2, "comparing");
        let a = self.prepare(signal1, name1)?;
        let b = self.prepare(signal2, name2)?;

        let n = a.len().min(b.len());
        let a = a.slice(s![..n]).to_owned();
        let b = b.slice(s![..n]).to_owned();

        let out = xwt(&a.view(), &b.view(), &self.params)?;

        Ok(ComparisonResult {
            name1: name1.to_string(),
            name2: name2.to_string(),
            signal1: a,
            signal2: b,
            power: out.power,
            phase: out.phase,
            scales: out.scales,
            frequencies: out.frequencies,
            time: time_axis(n, self.params.dt),
            coi: out.coi,
        })
    }
}

//! Scalogram rendering
//!
//! Plotting is a presentation sink: the orchestrator hands over time axis,
//! frequency axis, and a (scale, time) matrix, and nothing flows back.

use ndarray::{Array1, Array2};
use plotters::prelude::*;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::PlotConfig;
use crate::error::{AnalysisError, Result};

/// How matrix values map to color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalogramKind {
    /// Non-negative magnitudes, linear colormap over the value range
    Power,
    /// Angles in `[-pi, pi]`, cyclic colormap
    Phase,
}

/// One time-frequency image
#[derive(Debug, Clone, Copy)]
pub struct Scalogram<'a> {
    pub title: &'a str,
    pub time: &'a Array1<f64>,
    /// One frequency per matrix row, decreasing
    pub frequencies: &'a Array1<f64>,
    /// (num_scales, num_samples)
    pub values: &'a Array2<f64>,
    pub coi: Option<&'a Array1<f64>>,
    pub kind: ScalogramKind,
}

/// Consumer of rendered scalograms
pub trait ScalogramSink {
    fn render(&mut self, plot: &Scalogram<'_>) -> Result<()>;
}

/// Discards every plot
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ScalogramSink for NoopSink {
    fn render(&mut self, _plot: &Scalogram<'_>) -> Result<()> {
        Ok(())
    }
}

/// Sequential colormap for power images
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Colormap {
    Viridis,
    Grayscale,
}

impl Colormap {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "viridis" => Ok(Colormap::Viridis),
            "gray" | "grey" | "grayscale" => Ok(Colormap::Grayscale),
            _ => Err(AnalysisError::Config(format!("unsupported colormap '{}'", name))),
        }
    }

    /// Color for `v` in `[0, 1]`
    pub fn color(&self, v: f64) -> RGBColor {
        let v = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Colormap::Viridis => {
                const STOPS: [(f64, f64, f64); 5] = [
                    (68.0, 1.0, 84.0),
                    (59.0, 82.0, 139.0),
                    (33.0, 145.0, 140.0),
                    (94.0, 201.0, 98.0),
                    (253.0, 231.0, 37.0),
                ];
                let pos = v * (STOPS.len() - 1) as f64;
                let i = (pos.floor() as usize).min(STOPS.len() - 2);
                let f = pos - i as f64;
                let (a, b) = (STOPS[i], STOPS[i + 1]);
                let lerp = |x: f64, y: f64| (x + (y - x) * f).round() as u8;
                RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
            }
            Colormap::Grayscale => {
                let g = (v * 255.0).round() as u8;
                RGBColor(g, g, g)
            }
        }
    }
}

/// File-system friendly name for a plot title
pub fn plot_file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    let mut last_sep = true;
    for c in title.chars() {
        if c.is_alphanumeric() {
            stem.extend(c.to_lowercase());
            last_sep = false;
        } else if !last_sep {
            stem.push('_');
            last_sep = true;
        }
    }
    while stem.ends_with('_') {
        stem.pop();
    }
    stem
}

/// Row boundaries halfway between adjacent frequencies
fn row_edges(freqs: &Array1<f64>) -> Vec<(f64, f64)> {
    let n = freqs.len();
    (0..n)
        .map(|j| {
            let upper = if j == 0 {
                freqs[0] + (freqs[0] - freqs.get(1).copied().unwrap_or(freqs[0] * 0.5)) / 2.0
            } else {
                (freqs[j - 1] + freqs[j]) / 2.0
            };
            let lower = if j + 1 == n {
                (freqs[j] - (upper - freqs[j])).max(0.0)
            } else {
                (freqs[j] + freqs[j + 1]) / 2.0
            };
            (lower, upper)
        })
        .collect()
}

/// Writes PNG scalograms into a directory
#[derive(Debug, Clone)]
pub struct PngScalogramWriter {
    dir: PathBuf,
    size: (u32, u32),
    colormap: Colormap,
    written: Vec<PathBuf>,
}

impl PngScalogramWriter {
    pub fn new(dir: impl Into<PathBuf>, config: &PlotConfig) -> Result<Self> {
        if !config.plot_format.eq_ignore_ascii_case("png") {
            return Err(AnalysisError::Config(format!(
                "unsupported plot format '{}'",
                config.plot_format
            )));
        }
        Ok(Self {
            dir: dir.into(),
            size: config.pixel_size(),
            colormap: Colormap::from_name(&config.colormap)?,
            written: Vec::new(),
        })
    }

    /// Paths of every image written so far
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn draw(&self, plot: &Scalogram<'_>, path: &Path) -> Result<()> {
        let plot_err = |e: &dyn std::fmt::Display| AnalysisError::Plot(e.to_string());

        let (n_rows, n_cols) = plot.values.dim();
        if n_rows == 0 || n_cols == 0 || plot.time.len() != n_cols || plot.frequencies.len() != n_rows {
            return Err(AnalysisError::Plot(format!(
                "'{}': matrix {:?} does not match axes ({}, {})",
                plot.title,
                plot.values.dim(),
                plot.frequencies.len(),
                plot.time.len()
            )));
        }

        let dt = if n_cols > 1 { plot.time[1] - plot.time[0] } else { 1.0 };
        let t0 = plot.time[0];
        let t1 = plot.time[n_cols - 1] + dt;
        let edges = row_edges(plot.frequencies);
        let f_max = edges[0].1;
        let f_min = edges[n_rows - 1].0;

        let (v_min, v_max) = plot
            .values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = if v_max > v_min { v_max - v_min } else { 1.0 };

        let root = BitMapBackend::new(path, self.size).into_drawing_area();
        root.fill(&WHITE).map_err(|e| plot_err(&e))?;

        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .build_cartesian_2d(t0..t1, f_min..f_max)
            .map_err(|e| plot_err(&e))?;

        let colormap = self.colormap;
        let kind = plot.kind;
        let cells = plot.values.indexed_iter().map(|((j, i), &v)| {
            let color = match kind {
                ScalogramKind::Power => colormap.color((v - v_min) / span).to_rgba(),
                ScalogramKind::Phase => HSLColor((v + PI) / (2.0 * PI), 0.7, 0.5).to_rgba(),
            };
            let x0 = plot.time[i];
            let (y0, y1) = edges[j];
            Rectangle::new([(x0, y0), (x0 + dt, y1)], color.filled())
        });
        chart.draw_series(cells).map_err(|e| plot_err(&e))?;

        if let Some(coi) = plot.coi {
            // Period-to-frequency: the boundary is drawn at 1/coi
            let line = plot
                .time
                .iter()
                .zip(coi.iter())
                .map(|(&t, &c)| (t, (1.0 / c).clamp(f_min, f_max)));
            chart
                .draw_series(LineSeries::new(line, WHITE.stroke_width(2)))
                .map_err(|e| plot_err(&e))?;
        }

        root.present().map_err(|e| plot_err(&e))?;
        Ok(())
    }
}

impl ScalogramSink for PngScalogramWriter {
    fn render(&mut self, plot: &Scalogram<'_>) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.png", plot_file_stem(plot.title)));
        self.draw(plot, &path)?;
        debug!(path = %path.display(), "scalogram written");
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, Array2};
    use tempfile::tempdir;

    #[test]
    fn test_plot_file_stem() {
        assert_eq!(plot_file_stem("CWT Scalogram - Washing Machine"), "cwt_scalogram_washing_machine");
        assert_eq!(plot_file_stem("A vs B!"), "a_vs_b");
    }

    #[test]
    fn test_colormap_endpoints() {
        let c = Colormap::Viridis;
        assert_eq!(c.color(0.0), RGBColor(68, 1, 84));
        assert_eq!(c.color(1.0), RGBColor(253, 231, 37));
        assert_eq!(c.color(f64::NAN), RGBColor(68, 1, 84));
        assert_eq!(Colormap::Grayscale.color(1.0), RGBColor(255, 255, 255));
        assert!(Colormap::from_name("jet").is_err());
    }

    #[test]
    fn test_row_edges_cover_axis() {
        let freqs = arr1(&[4.0, 2.0, 1.0]);
        let edges = row_edges(&freqs);
        assert_eq!(edges[0], (3.0, 5.0));
        assert_eq!(edges[1], (1.5, 3.0));
        assert_eq!(edges[2], (0.5, 1.5));
    }

    #[test]
    fn test_png_writer_rejects_unknown_format() {
        let config = PlotConfig {
            plot_format: "pdf".to_string(),
            ..PlotConfig::default()
        };
        assert!(PngScalogramWriter::new("plots", &config).is_err());
    }

    #[test]
    fn test_png_writer_writes_file() {
        let dir = tempdir().unwrap();
        let config = PlotConfig {
            figure_size: (2.0, 1.0),
            dpi: 50,
            ..PlotConfig::default()
        };
        let mut sink = PngScalogramWriter::new(dir.path(), &config).unwrap();

        let time = arr1(&[0.0, 0.1, 0.2, 0.3]);
        let freqs = arr1(&[2.0, 1.0]);
        let values = Array2::from_shape_fn((2, 4), |(j, i)| (j * 4 + i) as f64);
        let coi = arr1(&[0.5, 1.0, 1.0, 0.5]);

        sink.render(&Scalogram {
            title: "Test Power",
            time: &time,
            frequencies: &freqs,
            values: &values,
            coi: Some(&coi),
            kind: ScalogramKind::Power,
        })
        .unwrap();

        assert_eq!(sink.written().len(), 1);
        assert!(sink.written()[0].ends_with("test_power.png"));
        assert!(sink.written()[0].exists());
    }

    #[test]
    fn test_shape_mismatch_is_error() {
        let dir = tempdir().unwrap();
        let mut sink = PngScalogramWriter::new(dir.path(), &PlotConfig::default()).unwrap();
        let time = arr1(&[0.0, 0.1]);
        let freqs = arr1(&[1.0]);
        let values = Array2::zeros((1, 3));
        let result = sink.render(&Scalogram {
            title: "bad",
            time: &time,
            frequencies: &freqs,
            values: &values,
            coi: None,
            kind: ScalogramKind::Phase,
        });
        assert!(matches!(result, Err(AnalysisError::Plot(_))));
    }
}

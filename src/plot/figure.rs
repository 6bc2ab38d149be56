use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::color::{Color, Tableau};
use crate::error::{Error, Result};

/// Points per inch.
pub const PT_PER_INCH: f64 = 72.0;

// ---------------------------------------------------------------------------
// Figure model
// ---------------------------------------------------------------------------

/// Dash pattern of a line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
}

/// One drawable data series.
#[derive(Debug, Clone, PartialEq)]
pub enum Series {
    Scatter {
        points: Vec<[f64; 2]>,
        color: Color,
        /// Marker diameter in points.
        marker_size: f64,
        label: Option<String>,
    },
    Line {
        points: Vec<[f64; 2]>,
        color: Color,
        width: f64,
        style: LineStyle,
        label: Option<String>,
    },
}

impl Series {
    pub fn label(&self) -> Option<&str> {
        match self {
            Series::Scatter { label, .. } | Series::Line { label, .. } => label.as_deref(),
        }
    }
}

/// A major tick; `label` is `None` when the label is suppressed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: Option<String>,
}

/// A single set of axes with its series and decorations.
#[derive(Debug, Clone, PartialEq)]
pub struct Axes {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_limits: (f64, f64),
    pub y_limits: (f64, f64),
    pub series: Vec<Series>,
    /// Size of title, axis labels and tick labels.
    pub font_size: f64,
    /// `None` hides the legend.
    pub legend_font_size: Option<f64>,
    /// Hide the label of every second major tick.
    pub alternate_tick_labels: bool,
    pub max_ticks: usize,
}

impl Default for Axes {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            x_limits: (0.0, 1.0),
            y_limits: (0.0, 1.0),
            series: Vec::new(),
            font_size: 10.0,
            legend_font_size: None,
            alternate_tick_labels: false,
            max_ticks: 8,
        }
    }
}

impl Axes {
    pub fn scatter(&mut self, points: Vec<[f64; 2]>, color: Color, label: &str) -> &mut Self {
        self.series.push(Series::Scatter {
            points,
            color,
            marker_size: 6.0,
            label: Some(label.to_string()),
        });
        self
    }

    pub fn line(&mut self, points: Vec<[f64; 2]>, color: Color, style: LineStyle, label: &str) -> &mut Self {
        self.series.push(Series::Line {
            points,
            color,
            width: 1.5,
            style,
            label: Some(label.to_string()),
        });
        self
    }

    pub fn x_ticks(&self) -> Vec<Tick> {
        self.ticks(self.x_limits)
    }

    pub fn y_ticks(&self) -> Vec<Tick> {
        self.ticks(self.y_limits)
    }

    fn ticks(&self, (lo, hi): (f64, f64)) -> Vec<Tick> {
        let values = nice_ticks(lo, hi, self.max_ticks);
        let step = if values.len() > 1 { values[1] - values[0] } else { 1.0 };
        values
            .into_iter()
            .enumerate()
            .map(|(i, value)| Tick {
                value,
                label: (!self.alternate_tick_labels || i % 2 == 0).then(|| format_tick(value, step)),
            })
            .collect()
    }
}

/// A figure holding one [`Axes`], sized in inches.
///
/// The figure is a plain value: building it touches no global state and
/// nothing is written until [`Figure::save_pdf`] is called.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width_in: f64,
    pub height_in: f64,
    pub axes: Axes,
}

impl Figure {
    pub fn new(width_in: f64, height_in: f64) -> Self {
        Self {
            width_in,
            height_in,
            axes: Axes::default(),
        }
    }

    /// Page size in points.
    pub fn size_pt(&self) -> (f64, f64) {
        (self.width_in * PT_PER_INCH, self.height_in * PT_PER_INCH)
    }

    /// Render to an in-memory single-page PDF.
    pub fn to_pdf(&self) -> Vec<u8> {
        super::pdf::render(self)
    }

    /// Write the PDF to `path`, replacing any existing file.
    pub fn save_pdf(&self, path: &Path) -> Result<()> {
        let bytes = self.to_pdf();
        let mut out = BufWriter::new(File::create(path)?);
        out.write_all(&bytes)?;
        out.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

/// Evenly spaced "nice" tick values inside `[lo, hi]`.
///
/// The step is the smallest of 1, 2, 2.5, 5 or 10 times a power of ten that
/// keeps the count at or below `max_ticks`.
pub fn nice_ticks(lo: f64, hi: f64, max_ticks: usize) -> Vec<f64> {
    if !lo.is_finite() || !hi.is_finite() || hi <= lo || max_ticks < 2 {
        return Vec::new();
    }
    let raw = (hi - lo) / (max_ticks - 1) as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw * (1.0 - 1e-12))
        .unwrap_or(10.0 * magnitude);

    let eps = 1e-9;
    let first = (lo / step - eps).ceil() as i64;
    let last = (hi / step + eps).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Format a tick value with as many decimals as `step` needs.
pub fn format_tick(value: f64, step: f64) -> String {
    let decimals = (0..=6)
        .find(|&d| {
            let scaled = step * 10f64.powi(d);
            (scaled - scaled.round()).abs() < 1e-6 * scaled.abs().max(1.0)
        })
        .unwrap_or(6) as usize;
    let text = format!("{value:.decimals$}");
    // Avoid "-0" / "-0.0" for values that round to zero.
    if text.trim_start_matches('-').chars().all(|c| c == '0' || c == '.') {
        text.trim_start_matches('-').to_string()
    } else {
        text
    }
}

// ---------------------------------------------------------------------------
// Predicted-vs-measured chart
// ---------------------------------------------------------------------------

const FONT_SIZE: f64 = 15.0;

/// Square predicted-vs-measured scatter with a dashed identity line.
///
/// Both axes span the combined range of `truth` and `pred`, padded by one
/// unit on each side.
pub fn regression_figure(truth: &[f64], pred: &[f64], model_name: &str) -> Result<Figure> {
    if truth.is_empty() && pred.is_empty() {
        return Err(Error::EmptyInput("nothing to plot"));
    }
    if truth.len() != pred.len() {
        return Err(Error::shape("measured vs estimated", truth.len(), pred.len()));
    }

    let values = truth.iter().chain(pred).copied().filter(|v| v.is_finite());
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() {
        return Err(Error::EmptyInput("no finite values to plot"));
    }
    let (pmin, pmax) = (min - 1.0, max + 1.0);

    let mut figure = Figure::new(5.0, 5.0);
    let axes = &mut figure.axes;
    axes.title = model_name.to_string();
    axes.x_label = "Soil moisture (measured) in %".to_string();
    axes.y_label = "Soil moisture (estimated) in %".to_string();
    axes.x_limits = (pmin, pmax);
    axes.y_limits = (pmin, pmax);
    axes.font_size = FONT_SIZE;
    axes.legend_font_size = Some(FONT_SIZE * 0.8);
    axes.alternate_tick_labels = true;

    let points = truth.iter().zip(pred).map(|(&t, &p)| [t, p]).collect();
    let mut blue = Tableau::Blue.color();
    blue.alpha = 0.3;
    axes.scatter(points, blue, "Datapoints");

    let identity = linspace(pmin, pmax, 20).into_iter().map(|v| [v, v]).collect();
    axes.line(identity, Tableau::Red.color(), LineStyle::Dashed, "Ideal estimation");

    Ok(figure)
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn ticks_use_nice_steps() {
        assert_eq!(nice_ticks(9.0, 41.0, 8), vec![10.0, 15.0, 20.0, 25.0, 30.0, 35.0, 40.0]);
        assert_eq!(nice_ticks(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(nice_ticks(1.0, 1.0, 8).is_empty());
        assert!(nice_ticks(f64::NAN, 1.0, 8).is_empty());
    }

    #[test]
    fn tick_count_is_bounded() {
        for (lo, hi) in [(-3.7, 118.2), (0.001, 0.0093), (24.0, 26.5), (-1.0, 1.0)] {
            let ticks = nice_ticks(lo, hi, 8);
            assert!(!ticks.is_empty() && ticks.len() <= 8, "{lo}..{hi}: {ticks:?}");
            assert!(ticks.iter().all(|t| *t >= lo - 1e-9 && *t <= hi + 1e-9));
        }
    }

    #[test]
    fn tick_labels() {
        assert_eq!(format_tick(35.0, 5.0), "35");
        assert_eq!(format_tick(0.75, 0.25), "0.75");
        assert_eq!(format_tick(2.5, 2.5), "2.5");
        assert_eq!(format_tick(-0.0000001, 0.5), "0.0");
    }

    #[test]
    fn every_other_tick_label_hidden() {
        let fig = regression_figure(&[10.0, 40.0], &[12.0, 38.0], "RF").unwrap();
        let ticks = fig.axes.x_ticks();
        assert!(ticks.len() >= 3);
        for (i, tick) in ticks.iter().enumerate() {
            assert_eq!(tick.label.is_some(), i % 2 == 0);
        }
    }

    #[test]
    fn limits_pad_combined_range() {
        let fig = regression_figure(&[20.0, 30.0, 25.0], &[18.5, 33.0, 26.0], "SVR").unwrap();
        assert_eq!(fig.axes.x_limits, (17.5, 34.0));
        assert_eq!(fig.axes.y_limits, fig.axes.x_limits);
        assert_eq!(fig.size_pt(), (360.0, 360.0));
    }

    #[test]
    fn series_layout() {
        let fig = regression_figure(&[20.0, 30.0], &[21.0, 29.0], "Random Forest").unwrap();
        assert_eq!(fig.axes.title, "Random Forest");
        assert_eq!(fig.axes.series.len(), 2);

        match &fig.axes.series[0] {
            Series::Scatter { points, color, .. } => {
                assert_eq!(points, &vec![[20.0, 21.0], [30.0, 29.0]]);
                assert_relative_eq!(color.alpha, 0.3);
            }
            other => panic!("expected scatter, got {other:?}"),
        }
        match &fig.axes.series[1] {
            Series::Line { points, style, .. } => {
                assert_eq!(points.len(), 20);
                assert_eq!(*style, LineStyle::Dashed);
                assert_eq!(points[0], [19.0, 19.0]);
                assert_relative_eq!(points[19][0], 31.0, epsilon = 1e-12);
            }
            other => panic!("expected line, got {other:?}"),
        }
        assert_eq!(fig.axes.series[1].label(), Some("Ideal estimation"));
    }

    #[test]
    fn empty_and_mismatched_inputs() {
        assert!(matches!(regression_figure(&[], &[], "x"), Err(Error::EmptyInput(_))));
        assert!(matches!(
            regression_figure(&[1.0], &[], "x"),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            regression_figure(&[f64::NAN], &[f64::NAN], "x"),
            Err(Error::EmptyInput(_))
        ));
    }
}

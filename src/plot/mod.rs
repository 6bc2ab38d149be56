//! Predicted-vs-measured plotting.
//!
//! [`figure`] builds an explicit [`Figure`] value; [`pdf`] renders it.
//! Nothing here keeps state between calls.

pub mod figure;
pub mod pdf;

use std::path::{Path, PathBuf};

use log::info;

pub use figure::{regression_figure, Axes, Figure, LineStyle, Series, Tick};

use crate::config::Settings;
use crate::error::Result;

/// File name for a model's chart: `truthestimation_<name>.pdf`, where
/// `<name>` is the model name without spaces, lowercased.
pub fn plot_file_name(model_name: &str) -> String {
    format!("truthestimation_{}.pdf", model_name.replace(' ', "").to_lowercase())
}

/// Plot `pred` against `truth` and save it under `plots/`.
///
/// The `plots/` directory must already exist; an existing file is replaced.
pub fn plot_regression_results(truth: &[f64], pred: &[f64], model_name: &str) -> Result<PathBuf> {
    plot_regression_results_in(&Settings::default().plots_dir, truth, pred, model_name)
}

/// Like [`plot_regression_results`], writing into `dir`.
pub fn plot_regression_results_in(
    dir: &Path,
    truth: &[f64],
    pred: &[f64],
    model_name: &str,
) -> Result<PathBuf> {
    let figure = regression_figure(truth, pred, model_name)?;
    let path = dir.join(plot_file_name(model_name));
    figure.save_pdf(&path)?;
    info!("saved {} points for '{model_name}' to {}", truth.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn file_name_from_model_name() {
        assert_eq!(plot_file_name("Random Forest"), "truthestimation_randomforest.pdf");
        assert_eq!(plot_file_name("SVR"), "truthestimation_svr.pdf");
        assert_eq!(plot_file_name(" k NN "), "truthestimation_knn.pdf");
    }

    #[test]
    fn writes_and_overwrites_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = plot_regression_results_in(dir.path(), &[20.0, 30.0], &[21.0, 28.0], "Random Forest").unwrap();
        assert_eq!(path, dir.path().join("truthestimation_randomforest.pdf"));
        let first = std::fs::read(&path).unwrap();
        assert!(first.starts_with(b"%PDF-"));

        plot_regression_results_in(dir.path(), &[20.0, 30.0, 40.0], &[21.0, 28.0, 41.0], "Random Forest").unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let err = plot_regression_results_in(dir.path(), &[], &[], "Empty").unwrap_err();
        assert!(matches!(err, Error::EmptyInput(_)));
        assert!(!dir.path().join(plot_file_name("Empty")).exists());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = plot_regression_results_in(&dir.path().join("plots"), &[1.0], &[2.0], "x").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

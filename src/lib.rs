//! Helpers for the hyperspectral soil-moisture regression experiments.
//!
//! * [`data`] – fetch the dataset, build random / semi-supervised / shifted splits
//! * [`report`] – score tables and their LaTeX rendering
//! * [`plot`] – predicted-vs-measured charts as PDF
//!
//! Every function is stateless: data is re-fetched and recomputed per call.
//! The crate only logs through the `log` facade; installing a logger is up
//! to the caller.

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod plot;
pub mod report;

pub use config::Settings;
pub use data::loader::{
    fetch_dataset, get_xy, get_xy_with, load_dataset_from_path, load_dataset_from_reader,
};
pub use data::model::{is_band_column, Dataset};
pub use data::split::{
    get_xy_shifted, get_xy_shifted_with, get_xy_split, get_xy_split_with, semi_supervised_split,
    shifted_split, train_test_split,
    SemiSupervisedSplit, ShiftedSplit, SplitParts, TrainTestSplit, DEFAULT_CUT, UNLABELED,
};
pub use error::{Error, Result};
pub use plot::{plot_regression_results, plot_regression_results_in};
pub use report::{write_results_to_latex_table, write_results_to_latex_table_in, ResultsTable};

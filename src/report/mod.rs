//! Results reporting: per-model score tables and their LaTeX rendering.

pub mod latex;
pub mod results;

pub use latex::{render_latex_table, write_results_to_latex_table, write_results_to_latex_table_in};
pub use results::{mean_absolute_error, r2_score, root_mean_squared_error, ResultsTable};

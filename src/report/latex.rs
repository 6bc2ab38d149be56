use std::path::{Path, PathBuf};

use log::info;

use super::results::ResultsTable;
use crate::config::Settings;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Write `table` to `results/<filename>.tex`.
///
/// The `results/` directory must already exist.  Compiling the document to
/// PDF is left to the caller.
pub fn write_results_to_latex_table(table: &ResultsTable, filename: &str) -> Result<PathBuf> {
    write_results_to_latex_table_in(&Settings::default().results_dir, table, filename)
}

/// Write `table` to `<dir>/<filename>.tex`, replacing any existing file.
///
/// The document is rendered before the file is opened, so a ragged table
/// fails without touching the filesystem.
pub fn write_results_to_latex_table_in(
    dir: &Path,
    table: &ResultsTable,
    filename: &str,
) -> Result<PathBuf> {
    let document = render_latex_table(table)?;
    let path = dir.join(format!("{filename}.tex"));
    std::fs::write(&path, document)?;
    info!("wrote {} model rows to {}", table.len(), path.display());
    Ok(path)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render a standalone `article` with one booktabs/siunitx table.
///
/// Columns: model, R² in percent (1 decimal), MAE (2 decimals),
/// RMSE (1 decimal), potential.  Cell text is inserted verbatim, so model
/// names may carry LaTeX markup.
pub fn render_latex_table(table: &ResultsTable) -> Result<String> {
    table.validate()?;

    let mut doc = String::new();
    doc.push_str("\\documentclass{article}\n");
    doc.push_str("\\usepackage{booktabs}\n");
    doc.push_str("\\usepackage{multirow}\n");
    doc.push_str("\\usepackage{siunitx}\n");
    doc.push_str("\\begin{document}\n");
    doc.push_str("\\begin{table}\n");
    doc.push_str("\t\\centering\n");
    doc.push_str("\t\\caption{Regression results for soil moisture.}\n");
    doc.push_str("\t\\begin{tabular}{lSSSl}\n");
    doc.push_str("\t\t\\toprule\n");
    doc.push_str("\t\t Model &{$R^2$ in $\\%$} &{MAE} &{RMSE} & {Potential}\\\\\n");
    doc.push_str("\t\t\\midrule\n");

    for i in 0..table.len() {
        doc.push_str(&format!(
            "\t\t{:<10} & {:.1} & {:.2} & {:.1} & {}\\\\\n",
            table.model[i],
            table.r2[i] * 100.0,
            table.mae[i],
            table.rmse[i],
            table.potential[i],
        ));
    }

    doc.push_str("\t\t\\bottomrule\n");
    doc.push_str("\t\\end{tabular}\n");
    doc.push_str("\t\\label{tab:supervised_results}\n");
    doc.push_str("\\end{table}\n");
    doc.push_str("\\end{document}\n");
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn sample() -> ResultsTable {
        let mut t = ResultsTable::new();
        t.push("RF", 0.9134, 0.94321, 1.2849, "high");
        t.push("SVR", 0.5, 2.0, 3.04, "medium");
        t.push("Linear", -0.021, 4.5612, 5.52, "low");
        t
    }

    fn data_rows(doc: &str) -> Vec<&str> {
        doc.lines()
            .skip_while(|l| !l.contains("\\midrule"))
            .skip(1)
            .take_while(|l| !l.contains("\\bottomrule"))
            .collect()
    }

    #[test]
    fn one_row_per_model() {
        let doc = render_latex_table(&sample()).unwrap();
        assert_eq!(data_rows(&doc).len(), 3);
        assert_eq!(doc.matches("\\begin{document}").count(), 1);
        assert_eq!(doc.matches("\\begin{tabular}{lSSSl}").count(), 1);
        assert!(doc.ends_with("\\end{document}\n"));
    }

    #[test]
    fn row_formatting() {
        let doc = render_latex_table(&sample()).unwrap();
        let rows = data_rows(&doc);
        assert_eq!(rows[0], "\t\tRF         & 91.3 & 0.94 & 1.3 & high\\\\");
        assert_eq!(rows[1], "\t\tSVR        & 50.0 & 2.00 & 3.0 & medium\\\\");
        assert_eq!(rows[2], "\t\tLinear     & -2.1 & 4.56 & 5.5 & low\\\\");
    }

    #[test]
    fn empty_table_has_header_and_footer() {
        let doc = render_latex_table(&ResultsTable::new()).unwrap();
        assert!(data_rows(&doc).is_empty());
        assert!(doc.contains("\\toprule"));
        assert!(doc.contains("\\label{tab:supervised_results}"));
    }

    #[test]
    fn writes_tex_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_results_to_latex_table_in(dir.path(), &sample(), "supervised").unwrap();
        assert_eq!(path, dir.path().join("supervised.tex"));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, render_latex_table(&sample()).unwrap());

        // Second write replaces the file.
        let mut one = ResultsTable::new();
        one.push("PLS", 0.7, 1.5, 2.0, "medium");
        write_results_to_latex_table_in(dir.path(), &one, "supervised").unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(data_rows(&text).len(), 1);
    }

    #[test]
    fn ragged_table_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut t = sample();
        t.potential.pop();
        let err = write_results_to_latex_table_in(dir.path(), &t, "ragged").unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
        assert!(!dir.path().join("ragged.tex").exists());
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_results_to_latex_table_in(&dir.path().join("nope"), &sample(), "x").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

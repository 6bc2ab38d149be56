use std::io::Read;
use std::path::Path;

use log::{debug, info};
use ndarray::{Array1, Array2};

use super::model::{is_band_column, Dataset, TARGET_COLUMN};
use crate::config::Settings;
use crate::error::{Error, Result};

/// Cell spellings read as a missing value, after trimming.
const NA_VALUES: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Fetch the soil-moisture table and return the band matrix and target.
///
/// Every call downloads [`crate::config::DATASET_URL`] again; nothing is
/// cached.
pub fn get_xy() -> Result<(Array2<f64>, Array1<f64>)> {
    get_xy_with(&Settings::default())
}

/// [`get_xy`] reading from `settings.dataset_url`.
pub fn get_xy_with(settings: &Settings) -> Result<(Array2<f64>, Array1<f64>)> {
    Ok(fetch_dataset(&settings.dataset_url)?.into_xy())
}

/// Download a CSV table over HTTP(S) and parse it into a [`Dataset`].
///
/// Non-success status codes are reported as [`Error::Http`].
pub fn fetch_dataset(url: &str) -> Result<Dataset> {
    fetch_with(&reqwest::blocking::Client::new(), url)
}

fn fetch_with(client: &reqwest::blocking::Client, url: &str) -> Result<Dataset> {
    info!("fetching dataset from {url}");
    let body = client.get(url).send()?.error_for_status()?.bytes()?;
    debug!("received {} bytes", body.len());
    load_dataset_from_reader(body.as_ref())
}

/// Parse a dataset CSV stored on disk.
pub fn load_dataset_from_path(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path)?;
    load_dataset_from_reader(file)
}

// ---------------------------------------------------------------------------
// CSV parser
// ---------------------------------------------------------------------------

/// CSV layout: one header row; the first column is the row index.
///
/// Of the remaining columns, those whose header passes [`is_band_column`]
/// become the feature matrix (in file order) and `soil_moisture` becomes the
/// target.  Other columns are ignored.  Empty cells are NaN.
///
/// Band headers are classified as written, so `" 454"` is not a band; only
/// the target lookup ignores surrounding whitespace.
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    // Column 0 is the index and never a feature or the target.
    let band_idx: Vec<usize> = headers
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, h)| is_band_column(h))
        .map(|(i, _)| i)
        .collect();
    let target_idx = headers
        .iter()
        .skip(1)
        .position(|h| h.trim() == TARGET_COLUMN)
        .map(|i| i + 1)
        .ok_or_else(|| Error::MissingColumn(TARGET_COLUMN.to_string()))?;

    let mut index = Vec::new();
    let mut values = Vec::new();
    let mut target = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result?;

        index.push(record.get(0).unwrap_or("").to_string());
        for &col in &band_idx {
            values.push(parse_cell(record.get(col).unwrap_or(""), row_no, &headers[col])?);
        }
        target.push(parse_cell(
            record.get(target_idx).unwrap_or(""),
            row_no,
            TARGET_COLUMN,
        )?);
    }

    let n_rows = target.len();
    let bands: Vec<String> = band_idx.iter().map(|&i| headers[i].clone()).collect();
    let features = Array2::from_shape_vec((n_rows, bands.len()), values)
        .map_err(|_| Error::shape("feature matrix", n_rows * bands.len(), n_rows))?;

    info!("loaded {n_rows} samples with {} bands", bands.len());
    Dataset::new(index, bands, features, Array1::from(target))
}

fn parse_cell(s: &str, row: usize, column: &str) -> Result<f64> {
    let s = s.trim();
    if NA_VALUES.contains(&s) {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|_| Error::Parse {
        row,
        column: column.to_string(),
        value: s.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
,datetime,soil_moisture,soil_temperature,454,458,462
0,2017-05-22 12:36:43,33.51,31.16,0.0825,0.0821,0.0835
1,2017-05-22 12:42:43,33.49,31.20,0.0841,0.0839,0.0853
2,2017-05-22 12:48:43,29.10,31.52,0.0849,0.0846,
";

    #[test]
    fn selects_band_columns_and_target() {
        let ds = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(ds.bands, vec!["454", "458", "462"]);
        assert_eq!(ds.features.dim(), (3, 3));
        assert_eq!(ds.target.len(), 3);
        assert_eq!(ds.index, vec!["0", "1", "2"]);
        assert_eq!(ds.target[2], 29.10);
        assert_eq!(ds.features[[1, 0]], 0.0841);
        assert!(ds.features[[2, 2]].is_nan());
    }

    #[test]
    fn rows_match_between_x_and_y() {
        let (x, y) = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap().into_xy();
        assert_eq!(x.nrows(), y.len());
    }

    #[test]
    fn parsing_twice_is_identical() {
        let a = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();
        let b = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(a.target, b.target);
        assert_eq!(a.bands, b.bands);
        for (p, q) in a.features.iter().zip(b.features.iter()) {
            assert_eq!(p.to_bits(), q.to_bits());
        }
    }

    #[test]
    fn numeric_index_header_is_not_a_band() {
        let csv = "0,soil_moisture,500\na,10.0,0.5\nb,12.0,0.6\n";
        let ds = load_dataset_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.bands, vec!["500"]);
        assert_eq!(ds.index, vec!["a", "b"]);
    }

    #[test]
    fn padded_numeric_header_is_not_a_band() {
        let csv = ", soil_moisture , 454,458\n0,10.0,0.1,0.2\n";
        let ds = load_dataset_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(ds.bands, vec!["458"]);
        assert_eq!(ds.features.dim(), (1, 1));
        assert_eq!(ds.target[0], 10.0);
    }

    #[test]
    fn missing_target_column() {
        let csv = ",454,458\n0,0.1,0.2\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(ref c) if c == "soil_moisture"));
    }

    #[test]
    fn non_numeric_band_value() {
        let csv = ",soil_moisture,454\n0,30.0,bright\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        match err {
            Error::Parse { row, column, value } => {
                assert_eq!(row, 0);
                assert_eq!(column, "454");
                assert_eq!(value, "bright");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn ragged_row_is_a_csv_error() {
        let csv = ",soil_moisture,454\n0,30.0\n";
        let err = load_dataset_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Csv(_)));
    }

    #[test]
    fn reads_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("soil.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let ds = load_dataset_from_path(&path).unwrap();
        assert_eq!(ds.len(), 3);
    }

    /// Answer a single HTTP request on a loopback port with a canned response.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        use std::io::{Read as _, Write as _};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{addr}/soilmoisture_dataset.csv")
    }

    fn local_client() -> reqwest::blocking::Client {
        reqwest::blocking::Client::builder().no_proxy().build().unwrap()
    }

    #[test]
    fn fetches_and_parses_over_http() {
        let url = serve_once("200 OK", SAMPLE);
        let ds = fetch_with(&local_client(), &url).unwrap();
        assert_eq!(ds.bands, vec!["454", "458", "462"]);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.target[0], 33.51);
    }

    #[test]
    fn http_error_status_is_an_error() {
        let url = serve_once("404 Not Found", "missing");
        let err = fetch_with(&local_client(), &url).unwrap_err();
        match err {
            Error::Http(e) => assert_eq!(e.status(), Some(reqwest::StatusCode::NOT_FOUND)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset_from_path(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}

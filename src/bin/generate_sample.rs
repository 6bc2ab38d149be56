//! Writes a synthetic dataset with the same layout as the remote soil-moisture
//! table, for working offline.
//!
//! Usage: `generate_sample [OUTPUT.csv]` (default `sample_soilmoisture.csv`).

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use soilmoisture_utils::config::SEED;
use soilmoisture_utils::load_dataset_from_path;

const N_SAMPLES: usize = 120;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Box-Muller transform for normal distribution
fn gauss(rng: &mut StdRng, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

/// Reflectance of a soil sample; wetter soil is darker and absorbs more
/// strongly near the red edge.
fn reflectance(wavelengths: &[u32], moisture: f64, rng: &mut StdRng) -> Vec<f64> {
    let darkening = 1.0 - 0.012 * moisture;
    wavelengths
        .iter()
        .map(|&nm| {
            let nm = nm as f64;
            let base = 0.05 + 0.25 * (nm - 454.0) / 496.0;
            let absorption = gaussian(nm, 760.0, 40.0, 0.002 * moisture);
            (base * darkening - absorption + gauss(rng, 0.0, 0.002)).max(0.0)
        })
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_soilmoisture.csv"));

    let mut rng = StdRng::seed_from_u64(SEED);

    // Bands: 454 → 950 nm, step 4
    let wavelengths: Vec<u32> = (454..=950).step_by(4).collect();

    let mut writer = csv::Writer::from_path(&output)
        .with_context(|| format!("creating {}", output.display()))?;

    let mut header = vec![
        String::new(),
        "datetime".to_string(),
        "soil_moisture".to_string(),
        "soil_temperature".to_string(),
    ];
    header.extend(wavelengths.iter().map(|w| w.to_string()));
    writer.write_record(&header).context("writing CSV header")?;

    for i in 0..N_SAMPLES {
        // Slow drying curve with noise, as in a field campaign.
        let moisture = 25.0 + 17.0 * (-(i as f64) / 60.0).exp() + gauss(&mut rng, 0.0, 0.8);
        let temperature = 30.0 + 5.0 * (i as f64 / 20.0).sin() + gauss(&mut rng, 0.0, 0.3);
        let minutes = i * 6;

        let mut record = vec![
            i.to_string(),
            format!("2017-05-22 {:02}:{:02}:00", 10 + minutes / 60, minutes % 60),
            format!("{moisture:.2}"),
            format!("{temperature:.2}"),
        ];
        record.extend(
            reflectance(&wavelengths, moisture, &mut rng)
                .into_iter()
                .map(|r| format!("{r:.6}")),
        );
        writer
            .write_record(&record)
            .with_context(|| format!("writing sample {i}"))?;
    }
    writer.flush().context("flushing CSV")?;

    // Read the file back through the library parser as a layout check.
    let dataset = load_dataset_from_path(&output)
        .with_context(|| format!("re-reading {}", output.display()))?;
    info!(
        "wrote {} samples ({} bands) to {}",
        dataset.len(),
        dataset.bands.len(),
        output.display()
    );
    println!(
        "Wrote {} samples ({} bands each) to {}",
        dataset.len(),
        dataset.bands.len(),
        output.display()
    );
    Ok(())
}

//! Lecture de la liste externe depuis un CSV délimité
//!
//! Colonnes attendues (en-têtes): `Station Name`, `Address`, `Latitude`,
//! `Longitude`. Les lignes aux coordonnées malformées sont skippées avec
//! un warning, jamais fatales.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use reconcile::ExternalRecord;

/// Une ligne brute du CSV: les coordonnées restent des chaînes pour que le
/// parsing numérique soit une décision par ligne (skip), pas par fichier
/// (fatal)
#[derive(Debug, Deserialize)]
struct ExternalCsvRow {
    #[serde(rename = "Station Name")]
    name: String,

    #[serde(rename = "Address", default)]
    address: String,

    #[serde(rename = "Latitude")]
    latitude: String,

    #[serde(rename = "Longitude")]
    longitude: String,
}

/// Charge les enregistrements externes depuis un fichier CSV
pub fn load_external_records(path: &Path) -> Result<Vec<ExternalRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open external CSV: {}", path.display()))?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (line, result) in reader.deserialize::<ExternalCsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(line = line + 2, "Skipping malformed CSV row: {}", e);
                skipped += 1;
                continue;
            }
        };

        let (latitude, longitude) = match (
            row.latitude.trim().parse::<f64>(),
            row.longitude.trim().parse::<f64>(),
        ) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => (lat, lon),
            _ => {
                warn!(
                    line = line + 2,
                    name = %row.name,
                    "Skipping row with non-numeric coordinates"
                );
                skipped += 1;
                continue;
            }
        };

        records.push(ExternalRecord {
            name: row.name.trim().to_string(),
            address: row.address.trim().to_string(),
            latitude,
            longitude,
        });
    }

    info!(
        records = records.len(),
        skipped,
        path = %path.display(),
        "External records loaded"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_rows() {
        let path = write_temp_csv(
            "carpark_external_valid.csv",
            "Station Name,Address,Latitude,Longitude\n\
             Central Car Park,1 Connaught Road,22.2819,114.1582\n\
             Ocean Centre,5 Canton Road,22.2955,114.1690\n",
        );

        let records = load_external_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Central Car Park");
        assert!((records[0].latitude - 22.2819).abs() < 1e-9);
        assert!((records[1].longitude - 114.1690).abs() < 1e-9);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_coordinates_skipped_not_fatal() {
        let path = write_temp_csv(
            "carpark_external_malformed.csv",
            "Station Name,Address,Latitude,Longitude\n\
             Good Station,1 First Street,22.28,114.16\n\
             Bad Station,2 Second Street,not-a-number,114.16\n\
             Also Bad,3 Third Street,22.28,\n\
             Another Good,4 Fourth Street,22.29,114.17\n",
        );

        let records = load_external_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "Good Station");
        assert_eq!(records[1].name, "Another Good");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::path::Path::new("/nonexistent/external.csv");
        assert!(load_external_records(path).is_err());
    }
}

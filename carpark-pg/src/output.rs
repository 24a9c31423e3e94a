//! Exports côté appelant: CSV de verdicts et CSV de snapshots
//!
//! Le coeur produit une séquence de verdicts; tout le formatage (console,
//! CSV, JSON) reste ici, hors du moteur.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use reconcile::{Evidence, ExternalRecord, MatchVerdict, StrategyKind};

use crate::providers::postgres::ExportRow;

/// Écrit les verdicts en CSV: un enregistrement externe par ligne, avec
/// l'identifiant canonique retenu (vide si aucun match), le palier de
/// confiance, les stratégies d'accord et la preuve extraite
pub fn write_verdicts_csv(verdicts: &[MatchVerdict], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create verdict CSV: {}", path.display()))?;

    writer.write_record([
        "station_name",
        "station_address",
        "latitude",
        "longitude",
        "park_id",
        "confidence",
        "strategies",
        "distance_m",
        "lexical_score",
        "building_id",
    ])?;

    for verdict in verdicts {
        let strategies = verdict
            .strategies
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("+");

        let distance = match verdict.evidence.get(&StrategyKind::Proximity) {
            Some(Evidence::Distance { meters }) => format!("{:.1}", meters),
            _ => String::new(),
        };
        let lexical_score = match verdict.evidence.get(&StrategyKind::Lexical) {
            Some(Evidence::Similarity { score, .. }) => format!("{:.3}", score),
            _ => String::new(),
        };
        let building_id = match verdict.evidence.get(&StrategyKind::Containment) {
            Some(Evidence::SharedFootprint { footprint_id, .. }) => footprint_id.clone(),
            _ => String::new(),
        };

        let latitude = verdict.external.latitude.to_string();
        let longitude = verdict.external.longitude.to_string();
        writer.write_record([
            verdict.external.name.as_str(),
            verdict.external.address.as_str(),
            latitude.as_str(),
            longitude.as_str(),
            verdict.canonical_id.as_deref().unwrap_or(""),
            verdict.confidence.as_str(),
            strategies.as_str(),
            distance.as_str(),
            lexical_score.as_str(),
            building_id.as_str(),
        ])?;
    }

    writer.flush()?;
    info!(verdicts = verdicts.len(), path = %path.display(), "Verdict CSV written");
    Ok(())
}

/// Écrit le snapshot du registre canonique (`database-carparks.csv`)
pub fn write_database_csv(rows: &[ExportRow], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export CSV: {}", path.display()))?;

    writer.write_record([
        "park_id",
        "name",
        "address",
        "district",
        "latitude",
        "longitude",
    ])?;

    for row in rows {
        let latitude = row.latitude.to_string();
        let longitude = row.longitude.to_string();
        writer.write_record([
            row.park_id.as_str(),
            row.name.as_str(),
            row.address.as_str(),
            row.district.as_str(),
            latitude.as_str(),
            longitude.as_str(),
        ])?;
    }

    writer.flush()?;
    info!(rows = rows.len(), path = %path.display(), "Database snapshot written");
    Ok(())
}

/// Écrit la liste externe reformatée dans la même disposition de colonnes
/// que le snapshot du registre (`connected-carparks-formatted.csv`)
pub fn write_external_formatted_csv(records: &[ExternalRecord], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create export CSV: {}", path.display()))?;

    writer.write_record([
        "park_id",
        "name",
        "address",
        "district",
        "latitude",
        "longitude",
    ])?;

    for record in records {
        let latitude = record.latitude.to_string();
        let longitude = record.longitude.to_string();
        // Pas d'identifiant stable côté externe: colonne vide, disposition
        // identique pour comparaison côte à côte
        writer.write_record([
            "",
            record.name.as_str(),
            record.address.as_str(),
            "",
            latitude.as_str(),
            longitude.as_str(),
        ])?;
    }

    writer.flush()?;
    info!(records = records.len(), path = %path.display(), "Formatted external list written");
    Ok(())
}

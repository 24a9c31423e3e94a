//! Lecture des emprises de bâtiments depuis un GeoJSON
//!
//! Les polygones source arrivent dans un CRS projeté (HK1980 Grid,
//! EPSG:2326 par défaut) et sont reprojetés en lon/lat une seule fois au
//! chargement, avant construction de l'index spatial. Une feature
//! illisible ou intransformable est skippée avec un warning: la stratégie
//! containment perd cette emprise, le run continue.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, Polygon};
use geojson::{FeatureCollection, GeoJson, Value};
use tracing::{info, warn};

use reconcile::reproject::Reprojector;
use reconcile::BuildingFootprint;

/// EPSG cible: coordonnées géographiques WGS84
const TARGET_EPSG: u32 = 4326;

/// Charge et reprojette les emprises depuis un fichier GeoJSON.
///
/// `source_epsg` est le CRS des coordonnées du fichier; 4326 signifie
/// aucune transformation.
pub fn load_footprints(path: &Path, source_epsg: u32) -> Result<Vec<BuildingFootprint>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read footprint GeoJSON: {}", path.display()))?;

    let geojson: GeoJson = content
        .parse()
        .with_context(|| format!("Failed to parse GeoJSON: {}", path.display()))?;

    let collection = FeatureCollection::try_from(geojson)
        .context("Footprint file is not a FeatureCollection")?;

    let reprojector = Reprojector::new(source_epsg, TARGET_EPSG)
        .with_context(|| format!("Cannot reproject EPSG:{} -> EPSG:{}", source_epsg, TARGET_EPSG))?;

    let total = collection.features.len();
    let mut footprints = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for feature in collection.features {
        match build_footprint(&feature, &reprojector) {
            Some(footprint) => footprints.push(footprint),
            None => skipped += 1,
        }
    }

    info!(
        footprints = footprints.len(),
        skipped,
        total,
        source_epsg,
        "Building footprints loaded"
    );

    Ok(footprints)
}

/// Construit une emprise depuis une feature GeoJSON, `None` si la feature
/// est inutilisable (géométrie absente, non-polygone, ou intransformable)
fn build_footprint(feature: &geojson::Feature, reprojector: &Reprojector) -> Option<BuildingFootprint> {
    let id = property_string(feature, "BUILDINGSTRUCTUREID")
        .unwrap_or_else(|| feature.id.as_ref().map(feature_id_string).unwrap_or_default());

    let geometry = match &feature.geometry {
        Some(geometry) => geometry,
        None => {
            warn!(id = %id, "Skipping footprint without geometry");
            return None;
        }
    };

    let rings = match &geometry.value {
        Value::Polygon(rings) => rings,
        other => {
            warn!(id = %id, kind = other.type_name(), "Skipping non-polygon footprint");
            return None;
        }
    };

    let polygon = match polygon_from_rings(rings) {
        Some(polygon) => polygon,
        None => {
            warn!(id = %id, "Skipping footprint with degenerate rings");
            return None;
        }
    };

    let boundary = match reprojector.transform_polygon(&id, &polygon) {
        Ok(boundary) => boundary,
        Err(e) => {
            warn!(id = %id, "Skipping footprint that failed reprojection: {}", e);
            return None;
        }
    };

    Some(BuildingFootprint {
        id,
        name_primary: property_string(feature, "OFFICIALBUILDINGNAMEEN").unwrap_or_default(),
        name_secondary: property_string(feature, "OFFICIALBUILDINGNAMETC"),
        boundary,
    })
}

/// Convertit les anneaux GeoJSON en polygone `geo`. Un anneau extérieur de
/// moins de 4 positions est dégénéré.
fn polygon_from_rings(rings: &[Vec<Vec<f64>>]) -> Option<Polygon<f64>> {
    let exterior = ring_to_linestring(rings.first()?)?;
    if exterior.0.len() < 4 {
        return None;
    }

    let interiors: Vec<LineString<f64>> = rings[1..]
        .iter()
        .filter_map(|ring| ring_to_linestring(ring))
        .collect();

    Some(Polygon::new(exterior, interiors))
}

fn ring_to_linestring(ring: &[Vec<f64>]) -> Option<LineString<f64>> {
    let coords: Option<Vec<Coord<f64>>> = ring
        .iter()
        .map(|position| match position.as_slice() {
            [x, y, ..] => Some(Coord { x: *x, y: *y }),
            _ => None,
        })
        .collect();
    coords.map(LineString::new)
}

/// Propriété de feature en chaîne (les identifiants arrivent parfois en
/// nombre JSON)
fn property_string(feature: &geojson::Feature, key: &str) -> Option<String> {
    match feature.properties.as_ref()?.get(key)? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn feature_id_string(id: &geojson::feature::Id) -> String {
    match id {
        geojson::feature::Id::String(s) => s.clone(),
        geojson::feature::Id::Number(n) => n.to_string(),
    }
}

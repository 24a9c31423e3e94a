//! Reprojection de coordonnées avec PROJ
//!
//! Ce module est disponible uniquement avec le feature `reproject` (activé
//! par défaut). L'ordre des axes est le piège de justesse numéro un de tout
//! le système: `Proj::new_known_crs` normalise les deux CRS en ordre
//! est/nord (équivalent `always_xy`), donc l'entrée et la sortie sont
//! toujours des paires (x=est, y=nord) — (lon, lat) pour EPSG:4326.
//! Un point de contrôle littéral le vérifie en test.

#[cfg(feature = "reproject")]
use geo::{Coord, LineString, Point, Polygon};
#[cfg(feature = "reproject")]
use proj::Proj;

use crate::error::ReconcileError;

/// Reprojection entre deux systèmes de coordonnées
#[cfg(feature = "reproject")]
pub struct Reprojector {
    proj: Proj,
    source_epsg: u32,
    target_epsg: u32,
}

#[cfg(feature = "reproject")]
impl Reprojector {
    /// Crée un reprojector entre deux codes EPSG
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ReconcileError> {
        let source = format!("EPSG:{}", source_epsg);
        let target = format!("EPSG:{}", target_epsg);

        let proj = Proj::new_known_crs(&source, &target, None).map_err(|e| {
            ReconcileError::ReprojectorInit {
                source_epsg,
                target: target_epsg,
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            proj,
            source_epsg,
            target_epsg,
        })
    }

    /// Retourne le code EPSG source
    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    /// Retourne le code EPSG cible
    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    /// Vrai si source et cible sont identiques (aucune transformation)
    pub fn is_identity(&self) -> bool {
        self.source_epsg == self.target_epsg
    }

    /// Transforme un point (x=est, y=nord) -> (x=est, y=nord)
    pub fn transform_point(&self, point: &Point<f64>) -> Result<Point<f64>, ReconcileError> {
        if self.is_identity() {
            return Ok(*point);
        }
        let (x, y) = self.proj.convert((point.x(), point.y())).map_err(|e| {
            ReconcileError::reprojection_failed("point", e.to_string())
        })?;
        Ok(Point::new(x, y))
    }

    /// Transforme un polygone (anneau extérieur + anneaux intérieurs)
    pub fn transform_polygon(
        &self,
        entity_id: &str,
        polygon: &Polygon<f64>,
    ) -> Result<Polygon<f64>, ReconcileError> {
        if self.is_identity() {
            return Ok(polygon.clone());
        }

        let exterior = self.transform_ring(entity_id, polygon.exterior())?;
        let interiors: Result<Vec<LineString<f64>>, ReconcileError> = polygon
            .interiors()
            .iter()
            .map(|ring| self.transform_ring(entity_id, ring))
            .collect();

        Ok(Polygon::new(exterior, interiors?))
    }

    /// Transforme un anneau (batch conversion, plus rapide que point par point)
    fn transform_ring(
        &self,
        entity_id: &str,
        ring: &LineString<f64>,
    ) -> Result<LineString<f64>, ReconcileError> {
        let mut coords: Vec<(f64, f64)> = ring.0.iter().map(|c| (c.x, c.y)).collect();

        self.proj
            .convert_array(&mut coords)
            .map_err(|e| ReconcileError::reprojection_failed(entity_id, e.to_string()))?;

        Ok(LineString::new(
            coords.into_iter().map(|(x, y)| Coord { x, y }).collect(),
        ))
    }
}

/// Vérifie si la reprojection est disponible
pub fn is_available() -> bool {
    cfg!(feature = "reproject")
}

// Implémentation factice quand le feature reproject est désactivé
#[cfg(not(feature = "reproject"))]
pub struct Reprojector {
    source_epsg: u32,
    target_epsg: u32,
}

#[cfg(not(feature = "reproject"))]
impl Reprojector {
    /// Tente de créer un reprojector: n'accepte que l'identité sans le feature
    pub fn new(source_epsg: u32, target_epsg: u32) -> Result<Self, ReconcileError> {
        if source_epsg == target_epsg {
            Ok(Self {
                source_epsg,
                target_epsg,
            })
        } else {
            Err(ReconcileError::ReprojectorInit {
                source_epsg,
                target: target_epsg,
                reason: "reprojection requires the 'reproject' feature".to_string(),
            })
        }
    }

    pub fn source_epsg(&self) -> u32 {
        self.source_epsg
    }

    pub fn target_epsg(&self) -> u32 {
        self.target_epsg
    }

    pub fn is_identity(&self) -> bool {
        true
    }

    /// Retourne le point inchangé (identité uniquement)
    pub fn transform_point(
        &self,
        point: &geo::Point<f64>,
    ) -> Result<geo::Point<f64>, ReconcileError> {
        Ok(*point)
    }

    /// Retourne le polygone inchangé (identité uniquement)
    pub fn transform_polygon(
        &self,
        _entity_id: &str,
        polygon: &geo::Polygon<f64>,
    ) -> Result<geo::Polygon<f64>, ReconcileError> {
        Ok(polygon.clone())
    }
}

#[cfg(feature = "reproject")]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hk1980_to_wgs84_control_point() {
        // Point de contrôle: fausse origine de la grille HK1980
        // (E=836694.05, N=819069.80) correspond à 114°10'42.8"E, 22°18'43.5"N
        // soit environ (114.1786, 22.3121). La tolérance de 0.01° absorbe le
        // décalage de datum HK1980 -> WGS84 (~200 m) tout en détectant
        // immédiatement une inversion d'axes (~92° d'écart).
        let reprojector = Reprojector::new(2326, 4326).unwrap();

        let origin = Point::new(836694.05, 819069.80);
        let geographic = reprojector.transform_point(&origin).unwrap();

        assert!(
            (geographic.x() - 114.1786).abs() < 0.01,
            "Longitude should be ~114.1786, got {}",
            geographic.x()
        );
        assert!(
            (geographic.y() - 22.3121).abs() < 0.01,
            "Latitude should be ~22.3121, got {}",
            geographic.y()
        );
    }

    #[test]
    fn test_identity_transform() {
        let reprojector = Reprojector::new(4326, 4326).unwrap();
        assert!(reprojector.is_identity());

        let point = Point::new(114.16, 22.28);
        let result = reprojector.transform_point(&point).unwrap();
        assert!((result.x() - 114.16).abs() < 1e-9);
        assert!((result.y() - 22.28).abs() < 1e-9);
    }

    #[test]
    fn test_polygon_transform() {
        let reprojector = Reprojector::new(2326, 4326).unwrap();

        // Petit carré autour de la fausse origine HK1980
        let poly = Polygon::new(
            LineString::from(vec![
                (836694.0, 819069.0),
                (836794.0, 819069.0),
                (836794.0, 819169.0),
                (836694.0, 819169.0),
                (836694.0, 819069.0),
            ]),
            vec![],
        );

        let result = reprojector.transform_polygon("test", &poly).unwrap();

        assert_eq!(result.exterior().0.len(), 5);
        let first = &result.exterior().0[0];
        assert!(first.x > 114.0 && first.x < 115.0, "got x={}", first.x);
        assert!(first.y > 22.0 && first.y < 23.0, "got y={}", first.y);
    }

    #[test]
    fn test_invalid_epsg() {
        assert!(Reprojector::new(99999, 4326).is_err());
    }
}

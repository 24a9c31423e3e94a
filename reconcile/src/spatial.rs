//! Index spatial de containment point-dans-polygone
//!
//! Construit une fois à partir des emprises de bâtiments reprojetées en
//! lon/lat, puis lecture seule. Le lookup est un balayage linéaire: aux
//! échelles observées (quelques milliers d'emprises) c'est suffisant, un
//! index grille ou R-tree serait la généralisation si le volume croît de
//! plusieurs ordres de grandeur.

use geo::{Contains, Point};
use tracing::debug;

use crate::types::BuildingFootprint;

/// Collection immuable d'emprises avec lookup de containment
#[derive(Debug)]
pub struct SpatialIndex {
    footprints: Vec<BuildingFootprint>,
}

impl SpatialIndex {
    /// Construit l'index depuis des emprises déjà en coordonnées
    /// géographiques (lon/lat)
    pub fn new(footprints: Vec<BuildingFootprint>) -> Self {
        debug!(count = footprints.len(), "Spatial index built");
        Self { footprints }
    }

    /// Index vide: le matcher containment ne produira jamais de candidat
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Première emprise contenant le point, dans l'ordre d'insertion de la
    /// collection.
    ///
    /// Si un point tombe dans plusieurs emprises (données qui se
    /// chevauchent), le départage premier-rencontré est déterministe mais
    /// essentiellement arbitraire, pas une garantie de justesse.
    pub fn containing_footprint(&self, point: &Point<f64>) -> Option<&BuildingFootprint> {
        self.footprints
            .iter()
            .find(|footprint| footprint.boundary.contains(point))
    }

    /// Nombre d'emprises indexées
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    /// Vrai si aucune emprise n'est indexée
    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

//! Matching par containment dans une emprise de bâtiment
//!
//! L'enregistrement externe est résolu vers son emprise via le
//! [`SpatialIndex`], puis le PREMIER enregistrement canonique (ordre de la
//! collection) dont le point tombe dans la même emprise est accepté.
//! Premier-trouvé, pas meilleur-trouvé: simplification assumée. Dépend
//! d'une reprojection correcte des emprises: une inversion d'axes en amont
//! produit des matches silencieusement faux.

use std::sync::Arc;

use geo::{Contains, Point};

use crate::matcher::Matcher;
use crate::spatial::SpatialIndex;
use crate::types::{CanonicalRecord, Evidence, ExternalRecord, MatchCandidate, StrategyKind};

/// Stratégie de containment spatial
pub struct ContainmentMatcher {
    index: Arc<SpatialIndex>,
}

impl ContainmentMatcher {
    /// Crée la stratégie sur un index d'emprises déjà construit.
    ///
    /// Un index vide (collection d'emprises absente ou illisible) est
    /// valide: la stratégie dégrade en "ne produit jamais de candidat".
    pub fn new(index: Arc<SpatialIndex>) -> Self {
        Self { index }
    }
}

impl Matcher for ContainmentMatcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Containment
    }

    fn candidate(
        &self,
        external: &ExternalRecord,
        canonicals: &[CanonicalRecord],
    ) -> Option<MatchCandidate> {
        let external_point = Point::new(external.longitude, external.latitude);
        let footprint = self.index.containing_footprint(&external_point)?;

        let shared = canonicals.iter().find(|canonical| {
            footprint
                .boundary
                .contains(&Point::new(canonical.longitude, canonical.latitude))
        })?;

        Some(MatchCandidate {
            canonical_id: shared.id.clone(),
            strategy: StrategyKind::Containment,
            score: 1.0,
            evidence: Evidence::SharedFootprint {
                footprint_id: footprint.id.clone(),
                footprint_name: if footprint.name_primary.is_empty() {
                    footprint.name_secondary.clone()
                } else {
                    Some(footprint.name_primary.clone())
                },
            },
        })
    }
}

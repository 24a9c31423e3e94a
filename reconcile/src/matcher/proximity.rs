//! Matching par proximité géométrique
//!
//! Distance haversine minimale vers la collection canonique, acceptée si
//! elle ne dépasse pas le seuil configuré (100 m par défaut). Balayage
//! O(|canonique|) par enregistrement externe: suffisant aux échelles
//! observées (centaines à quelques milliers de chaque côté).

use crate::geomath::haversine_distance_m;
use crate::matcher::Matcher;
use crate::types::{CanonicalRecord, Evidence, ExternalRecord, MatchCandidate, StrategyKind};

/// Stratégie de proximité géométrique
#[derive(Debug)]
pub struct ProximityMatcher {
    threshold_m: f64,
}

impl ProximityMatcher {
    /// Crée la stratégie avec un seuil d'acceptation en mètres
    pub fn new(threshold_m: f64) -> Self {
        Self { threshold_m }
    }
}

impl Matcher for ProximityMatcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Proximity
    }

    fn candidate(
        &self,
        external: &ExternalRecord,
        canonicals: &[CanonicalRecord],
    ) -> Option<MatchCandidate> {
        let mut best: Option<(&CanonicalRecord, f64)> = None;

        for canonical in canonicals {
            let distance = haversine_distance_m(
                external.latitude,
                external.longitude,
                canonical.latitude,
                canonical.longitude,
            );
            if !distance.is_finite() {
                continue;
            }

            // `<` strict: à distance exactement égale, le premier rencontré
            // dans l'ordre de la collection canonique gagne
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((canonical, distance)),
            }
        }

        let (canonical, distance) = best?;
        if distance > self.threshold_m {
            return None;
        }

        Some(MatchCandidate {
            canonical_id: canonical.id.clone(),
            strategy: StrategyKind::Proximity,
            score: distance,
            evidence: Evidence::Distance { meters: distance },
        })
    }
}

//! Les trois stratégies de matching indépendantes
//!
//! Chaque stratégie implémente le même contrat [`Matcher`]: un
//! enregistrement externe contre la collection canonique complète, au plus
//! un candidat en sortie. Les stratégies ne se voient pas entre elles: un
//! enregistrement canonique déjà retenu par l'une reste disponible pour les
//! autres.

pub mod containment;
pub mod lexical;
pub mod proximity;

use std::collections::BTreeMap;
use std::sync::Arc;

pub use containment::ContainmentMatcher;
pub use lexical::LexicalMatcher;
pub use proximity::ProximityMatcher;

use crate::config::MatchConfig;
use crate::spatial::SpatialIndex;
use crate::types::{CanonicalRecord, ExternalRecord, MatchCandidate, StrategyKind};

/// Contrat commun des stratégies.
///
/// `Send + Sync` car la fusion exécute les stratégies en parallèle sur des
/// entrées immuables partagées.
pub trait Matcher: Send + Sync {
    /// Stratégie implémentée
    fn kind(&self) -> StrategyKind;

    /// Meilleur candidat pour `external` dans `canonicals`, ou `None` si
    /// aucun candidat ne franchit le seuil de la stratégie
    fn candidate(
        &self,
        external: &ExternalRecord,
        canonicals: &[CanonicalRecord],
    ) -> Option<MatchCandidate>;
}

/// Construit la table stratégie -> matcher pour les stratégies actives.
///
/// La fusion itère cette table plutôt que trois sites d'appel codés en dur.
pub fn build_matchers(
    config: &MatchConfig,
    index: Arc<SpatialIndex>,
) -> BTreeMap<StrategyKind, Box<dyn Matcher>> {
    let mut matchers: BTreeMap<StrategyKind, Box<dyn Matcher>> = BTreeMap::new();

    for strategy in &config.enabled {
        let matcher: Box<dyn Matcher> = match strategy {
            StrategyKind::Proximity => {
                Box::new(ProximityMatcher::new(config.proximity_threshold_m))
            }
            StrategyKind::Lexical => {
                let (name_weight, addr_weight) = config.weighting.weights();
                Box::new(LexicalMatcher::new(
                    config.lexical_threshold,
                    name_weight,
                    addr_weight,
                ))
            }
            StrategyKind::Containment => Box::new(ContainmentMatcher::new(Arc::clone(&index))),
        };
        matchers.insert(*strategy, matcher);
    }

    matchers
}

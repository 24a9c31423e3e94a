//! Matching par similarité lexicale nom/adresse
//!
//! Score combiné pondéré (voir [`crate::text::combined_score`]) contre
//! chaque enregistrement canonique, maximum retenu s'il franchit le seuil.
//! Une égalité exacte de nom (insensible à la casse) court-circuite la
//! boucle de scoring avec un score de 1.0: une optimisation explicite, pas
//! un algorithme différent.

use crate::matcher::Matcher;
use crate::text::combined_score;
use crate::types::{CanonicalRecord, Evidence, ExternalRecord, MatchCandidate, StrategyKind};

/// Stratégie de similarité lexicale
#[derive(Debug)]
pub struct LexicalMatcher {
    threshold: f64,
    name_weight: f64,
    addr_weight: f64,
}

impl LexicalMatcher {
    /// Crée la stratégie avec son seuil d'acceptation et ses poids
    /// nom/adresse
    pub fn new(threshold: f64, name_weight: f64, addr_weight: f64) -> Self {
        Self {
            threshold,
            name_weight,
            addr_weight,
        }
    }

    fn exact_candidate(&self, canonical: &CanonicalRecord) -> MatchCandidate {
        MatchCandidate {
            canonical_id: canonical.id.clone(),
            strategy: StrategyKind::Lexical,
            score: 1.0,
            evidence: Evidence::Similarity {
                score: 1.0,
                name_score: 1.0,
                address_score: 1.0,
            },
        }
    }
}

impl Matcher for LexicalMatcher {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Lexical
    }

    fn candidate(
        &self,
        external: &ExternalRecord,
        canonicals: &[CanonicalRecord],
    ) -> Option<MatchCandidate> {
        let external_name = external.name.to_lowercase();

        // Court-circuit: nom identique (casse ignorée) -> acceptation
        // immédiate quelle que soit l'adresse
        if let Some(exact) = canonicals
            .iter()
            .find(|c| !external_name.is_empty() && c.name.to_lowercase() == external_name)
        {
            return Some(self.exact_candidate(exact));
        }

        let mut best: Option<(MatchCandidate, f64)> = None;

        for canonical in canonicals {
            let name_score = crate::text::similarity_ratio(&external.name, &canonical.name);
            let score = combined_score(
                &external.name,
                &canonical.name,
                &external.address,
                &canonical.address,
                self.name_weight,
                self.addr_weight,
            );

            // `>` strict: à score exactement égal, le premier rencontré gagne
            let is_better = match best {
                Some((_, best_score)) => score > best_score,
                None => true,
            };
            if is_better {
                // Re-dériver la composante adresse du score combiné évite un
                // deuxième calcul de similarité sur les adresses normalisées
                let address_score = if self.addr_weight > 0.0 {
                    (score - name_score * self.name_weight) / self.addr_weight
                } else {
                    0.0
                };
                best = Some((
                    MatchCandidate {
                        canonical_id: canonical.id.clone(),
                        strategy: StrategyKind::Lexical,
                        score,
                        evidence: Evidence::Similarity {
                            score,
                            name_score,
                            address_score,
                        },
                    },
                    score,
                ));
            }
        }

        let (candidate, score) = best?;
        if score < self.threshold {
            return None;
        }
        Some(candidate)
    }
}

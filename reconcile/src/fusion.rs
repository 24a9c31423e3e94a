//! Fusion des sorties de stratégies en un verdict par enregistrement
//!
//! Chaque stratégie tourne indépendamment sur les collections complètes:
//! la sortie d'une stratégie n'influence jamais l'entrée d'une autre. La
//! fusion est une fonction totale: chaque enregistrement externe reçoit
//! exactement un verdict, dans l'ordre d'entrée, éventuellement sans
//! identifiant canonique.
//!
//! Politique de conflit (les scripts d'origine n'en avaient aucune, celle-ci
//! est documentée et configurable): l'identifiant canonique soutenu par le
//! plus de stratégies l'emporte; les égalités restantes sont départagées par
//! l'ordre de priorité de [`MatchConfig::priority`], par défaut
//! containment > proximity > lexical, le containment étant le signal le
//! plus spécifique sémantiquement.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::debug;

use crate::config::MatchConfig;
use crate::matcher::Matcher;
use crate::types::{
    CanonicalRecord, Confidence, ExternalRecord, MatchCandidate, MatchVerdict, StrategyKind,
};

/// Exécute toutes les stratégies et fusionne leurs candidats.
///
/// Parallèle sur les enregistrements externes (entrées immuables partagées,
/// sorties disjointes, aucun verrou); l'accumulation finale est
/// mono-threadée via le `collect` de rayon qui préserve l'ordre d'entrée.
pub fn fuse(
    externals: &[ExternalRecord],
    canonicals: &[CanonicalRecord],
    matchers: &BTreeMap<StrategyKind, Box<dyn Matcher>>,
    config: &MatchConfig,
) -> Vec<MatchVerdict> {
    let verdicts: Vec<MatchVerdict> = externals
        .par_iter()
        .enumerate()
        .map(|(index, external)| fuse_one(index, external, canonicals, matchers, config))
        .collect();

    debug!(
        externals = externals.len(),
        matched = verdicts.iter().filter(|v| v.is_matched()).count(),
        "Fusion complete"
    );

    verdicts
}

/// Fusionne les candidats d'un seul enregistrement externe
fn fuse_one(
    index: usize,
    external: &ExternalRecord,
    canonicals: &[CanonicalRecord],
    matchers: &BTreeMap<StrategyKind, Box<dyn Matcher>>,
    config: &MatchConfig,
) -> MatchVerdict {
    let candidates: Vec<MatchCandidate> = matchers
        .values()
        .filter_map(|matcher| matcher.candidate(external, canonicals))
        .collect();

    if candidates.is_empty() {
        return MatchVerdict::unmatched(index, external.clone());
    }

    // Soutiens par identifiant canonique
    let mut endorsements: BTreeMap<&str, Vec<StrategyKind>> = BTreeMap::new();
    for candidate in &candidates {
        endorsements
            .entry(candidate.canonical_id.as_str())
            .or_default()
            .push(candidate.strategy);
    }

    // Vainqueur: nombre de soutiens décroissant, puis meilleure priorité de
    // stratégie parmi les soutiens. Deux identifiants ne peuvent pas
    // partager une stratégie, donc le couple (soutiens, rang) est
    // discriminant et le choix déterministe.
    let (winner_id, supporters) = endorsements
        .iter()
        .min_by_key(|(_, strategies)| {
            let best_rank = strategies
                .iter()
                .map(|s| config.priority_rank(*s))
                .min()
                .unwrap_or(usize::MAX);
            (std::cmp::Reverse(strategies.len()), best_rank)
        })
        .map(|(id, strategies)| (id.to_string(), strategies.clone()))
        .expect("candidates is non-empty");

    let strategies: BTreeSet<StrategyKind> = supporters.into_iter().collect();

    // La provenance conserve la preuve de TOUTES les stratégies, y compris
    // celles en désaccord avec le verdict
    let evidence = candidates
        .into_iter()
        .map(|c| (c.strategy, c.evidence))
        .collect();

    let confidence = if strategies.len() >= 2 {
        Confidence::High
    } else {
        Confidence::Medium
    };

    MatchVerdict {
        external_index: index,
        external: external.clone(),
        canonical_id: Some(winner_id),
        strategies,
        evidence,
        confidence,
    }
}

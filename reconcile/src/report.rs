//! Rapport agrégé sur un ensemble de verdicts
//!
//! Consommateur en lecture seule: aucune mutation des données amont. Les
//! pourcentages sur dénominateur vide sont "N/A", jamais une division par
//! zéro.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;

use crate::types::{Confidence, MatchVerdict, StrategyKind};

/// Statistiques agrégées d'un run de résolution
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolutionReport {
    /// Nombre d'enregistrements externes jugés
    pub total_external: usize,

    /// Nombre de verdicts avec identifiant canonique
    pub matched: usize,

    /// Nombre de verdicts sans identifiant canonique
    pub unmatched: usize,

    /// Durée du run en secondes
    pub duration_secs: f64,

    /// Répartition par palier de confiance
    pub by_confidence: BTreeMap<String, usize>,

    /// Nombre de candidats produits par stratégie (provenance, y compris
    /// les candidats dissidents)
    pub by_strategy: BTreeMap<String, usize>,

    /// Répartition des verdicts matchés par combinaison de stratégies
    /// d'accord (ex: "containment+proximity")
    pub by_combination: BTreeMap<String, usize>,

    /// Nombre d'enregistrements externes résolus vers chaque identifiant
    /// canonique
    pub per_canonical: BTreeMap<String, usize>,
}

impl ResolutionReport {
    /// Agrège un ensemble de verdicts
    pub fn from_verdicts(verdicts: &[MatchVerdict]) -> Self {
        let mut report = Self {
            total_external: verdicts.len(),
            ..Default::default()
        };

        for verdict in verdicts {
            *report
                .by_confidence
                .entry(verdict.confidence.as_str().to_string())
                .or_default() += 1;

            for strategy in verdict.evidence.keys() {
                *report
                    .by_strategy
                    .entry(strategy.as_str().to_string())
                    .or_default() += 1;
            }

            match &verdict.canonical_id {
                Some(id) => {
                    report.matched += 1;
                    *report.per_canonical.entry(id.clone()).or_default() += 1;
                    *report
                        .by_combination
                        .entry(combination_label(&verdict.strategies))
                        .or_default() += 1;
                }
                None => report.unmatched += 1,
            }
        }

        report
    }

    /// Définit la durée du run
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Pourcentage d'overlap (matchés / total), `None` si la collection
    /// externe est vide
    pub fn overlap_percent(&self) -> Option<f64> {
        if self.total_external == 0 {
            None
        } else {
            Some(self.matched as f64 / self.total_external as f64 * 100.0)
        }
    }

    /// Identifiants canoniques vers lesquels plusieurs enregistrements
    /// externes ont été résolus (conflits many-to-one à inspecter)
    pub fn multi_resolved(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .per_canonical
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(id, count)| (id.as_str(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("RESOLUTION REPORT");
        println!("{}", "=".repeat(60));

        println!("\nDuration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "External records: {} ({} matched, {} unmatched)",
            self.total_external, self.matched, self.unmatched
        );
        match self.overlap_percent() {
            Some(pct) => println!("Overlap: {:.1}%", pct),
            None => println!("Overlap: N/A (no external records)"),
        }

        if !self.by_confidence.is_empty() {
            println!("\n--- BY CONFIDENCE ---");
            for tier in [Confidence::High, Confidence::Medium, Confidence::None] {
                if let Some(count) = self.by_confidence.get(tier.as_str()) {
                    println!("  {}: {}", tier, count);
                }
            }
        }

        if !self.by_strategy.is_empty() {
            println!("\n--- CANDIDATES BY STRATEGY ---");
            for (strategy, count) in &self.by_strategy {
                println!("  {}: {}", strategy, count);
            }
        }

        if !self.by_combination.is_empty() {
            println!("\n--- MATCHES BY AGREEING COMBINATION ---");
            for (combination, count) in &self.by_combination {
                println!("  {}: {}", combination, count);
            }
        }

        let multi = self.multi_resolved();
        if !multi.is_empty() {
            println!("\n--- MANY-TO-ONE ({}) ---", multi.len());
            for (id, count) in multi.iter().take(10) {
                println!("  {}: {} external records", id, count);
            }
            if multi.len() > 10 {
                println!("  ... and {} more", multi.len() - 10);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        let overlap = self
            .overlap_percent()
            .map(|pct| format!("{:.1}%", pct))
            .unwrap_or_else(|| "N/A".to_string());
        format!(
            "{} external, {} matched, {} unmatched, overlap {}",
            self.total_external, self.matched, self.unmatched, overlap
        )
    }
}

/// Libellé stable d'une combinaison de stratégies (ordre de priorité)
fn combination_label(strategies: &std::collections::BTreeSet<StrategyKind>) -> String {
    strategies
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Evidence, ExternalRecord};
    use std::collections::{BTreeMap, BTreeSet};

    fn external(name: &str) -> ExternalRecord {
        ExternalRecord {
            name: name.to_string(),
            address: String::new(),
            latitude: 22.28,
            longitude: 114.16,
        }
    }

    fn matched_verdict(index: usize, id: &str, strategies: &[StrategyKind]) -> MatchVerdict {
        let strategy_set: BTreeSet<StrategyKind> = strategies.iter().copied().collect();
        let evidence: BTreeMap<StrategyKind, Evidence> = strategies
            .iter()
            .map(|s| (*s, Evidence::Distance { meters: 10.0 }))
            .collect();
        let confidence = if strategy_set.len() >= 2 {
            Confidence::High
        } else {
            Confidence::Medium
        };
        MatchVerdict {
            external_index: index,
            external: external("x"),
            canonical_id: Some(id.to_string()),
            strategies: strategy_set,
            evidence,
            confidence,
        }
    }

    #[test]
    fn test_empty_verdicts() {
        let report = ResolutionReport::from_verdicts(&[]);
        assert_eq!(report.total_external, 0);
        assert_eq!(report.overlap_percent(), None);
        assert!(report.summary().contains("N/A"));
    }

    #[test]
    fn test_counts_and_overlap() {
        let verdicts = vec![
            matched_verdict(0, "c1", &[StrategyKind::Proximity, StrategyKind::Lexical]),
            matched_verdict(1, "c2", &[StrategyKind::Containment]),
            MatchVerdict::unmatched(2, external("lost")),
            MatchVerdict::unmatched(3, external("also lost")),
        ];

        let report = ResolutionReport::from_verdicts(&verdicts);

        assert_eq!(report.total_external, 4);
        assert_eq!(report.matched, 2);
        assert_eq!(report.unmatched, 2);
        assert_eq!(report.overlap_percent(), Some(50.0));
        assert_eq!(report.by_confidence.get("high"), Some(&1));
        assert_eq!(report.by_confidence.get("medium"), Some(&1));
        assert_eq!(report.by_confidence.get("none"), Some(&2));
        assert_eq!(report.by_combination.get("proximity+lexical"), Some(&1));
        assert_eq!(report.by_combination.get("containment"), Some(&1));
    }

    #[test]
    fn test_multi_resolved() {
        let verdicts = vec![
            matched_verdict(0, "popular", &[StrategyKind::Proximity]),
            matched_verdict(1, "popular", &[StrategyKind::Lexical]),
            matched_verdict(2, "lonely", &[StrategyKind::Proximity]),
        ];

        let report = ResolutionReport::from_verdicts(&verdicts);

        assert_eq!(report.per_canonical.get("popular"), Some(&2));
        assert_eq!(report.multi_resolved(), vec![("popular", 2)]);
    }

    #[test]
    fn test_save_to_file() {
        let verdicts = vec![matched_verdict(0, "c1", &[StrategyKind::Proximity])];
        let report = ResolutionReport::from_verdicts(&verdicts);

        let path = std::env::temp_dir().join("reconcile_report_test.json");
        report.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"matched\": 1"));
        assert!(content.contains("\"per_canonical\""));

        std::fs::remove_file(path).ok();
    }
}

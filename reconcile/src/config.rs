//! Configuration du moteur de résolution
//!
//! Seules les erreurs détectées ici sont fatales: une configuration
//! invalide est rejetée avant d'exécuter le moindre matcher.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::types::StrategyKind;

/// Seuil de proximité par défaut (mètres)
pub const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 100.0;

/// Variante de pondération du matcher lexical.
///
/// Les deux variantes existent dans les données d'origine et sont
/// préservées comme configuration, pas fusionnées en une seule pondération.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexicalWeighting {
    /// 0.7 nom / 0.3 adresse, seuil d'acceptation par défaut 0.6
    NameLed,
    /// 0.3 nom / 0.7 adresse, seuil d'acceptation par défaut 0.7
    AddressLed,
}

impl LexicalWeighting {
    /// Poids (nom, adresse) de la variante
    pub fn weights(&self) -> (f64, f64) {
        match self {
            LexicalWeighting::NameLed => (0.7, 0.3),
            LexicalWeighting::AddressLed => (0.3, 0.7),
        }
    }

    /// Seuil d'acceptation par défaut de la variante
    pub fn default_threshold(&self) -> f64 {
        match self {
            LexicalWeighting::NameLed => 0.6,
            LexicalWeighting::AddressLed => 0.7,
        }
    }
}

/// Configuration d'un run de résolution
#[derive(Debug, Clone, Serialize)]
pub struct MatchConfig {
    /// Distance maximale (mètres) pour accepter un candidat par proximité
    pub proximity_threshold_m: f64,

    /// Variante de pondération lexicale
    pub weighting: LexicalWeighting,

    /// Seuil d'acceptation du score lexical combiné, dans [0, 1]
    pub lexical_threshold: f64,

    /// Stratégies actives pour ce run
    pub enabled: BTreeSet<StrategyKind>,

    /// Ordre de priorité pour départager les conflits entre stratégies
    /// (la première l'emporte). Doit couvrir toutes les stratégies actives.
    pub priority: Vec<StrategyKind>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        let weighting = LexicalWeighting::NameLed;
        Self {
            proximity_threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
            weighting,
            lexical_threshold: weighting.default_threshold(),
            enabled: StrategyKind::ALL.into_iter().collect(),
            priority: StrategyKind::ALL.to_vec(),
        }
    }
}

impl MatchConfig {
    /// Configuration par défaut avec la variante lexicale address-led
    /// (0.7 adresse / 0.3 nom, seuil 0.7)
    pub fn address_led() -> Self {
        let weighting = LexicalWeighting::AddressLed;
        Self {
            weighting,
            lexical_threshold: weighting.default_threshold(),
            ..Self::default()
        }
    }

    /// Restreint les stratégies actives
    pub fn with_strategies(mut self, strategies: impl IntoIterator<Item = StrategyKind>) -> Self {
        self.enabled = strategies.into_iter().collect();
        self
    }

    /// Valide la configuration. Toute erreur ici est fatale.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if !self.proximity_threshold_m.is_finite() || self.proximity_threshold_m < 0.0 {
            return Err(ReconcileError::invalid_config(format!(
                "proximity threshold must be a non-negative number of meters, got {}",
                self.proximity_threshold_m
            )));
        }

        if !self.lexical_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.lexical_threshold)
        {
            return Err(ReconcileError::invalid_config(format!(
                "lexical threshold must be within [0, 1], got {}",
                self.lexical_threshold
            )));
        }

        if self.enabled.is_empty() {
            return Err(ReconcileError::invalid_config(
                "at least one strategy must be enabled",
            ));
        }

        let mut seen = BTreeSet::new();
        for strategy in &self.priority {
            if !seen.insert(*strategy) {
                return Err(ReconcileError::invalid_config(format!(
                    "duplicate strategy in priority order: {}",
                    strategy
                )));
            }
        }

        for strategy in &self.enabled {
            if !seen.contains(strategy) {
                return Err(ReconcileError::invalid_config(format!(
                    "enabled strategy {} missing from priority order",
                    strategy
                )));
            }
        }

        Ok(())
    }

    /// Rang de départage d'une stratégie (plus petit = prioritaire)
    pub fn priority_rank(&self, strategy: StrategyKind) -> usize {
        self.priority
            .iter()
            .position(|s| *s == strategy)
            .unwrap_or(usize::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
        assert!(MatchConfig::address_led().validate().is_ok());
    }

    #[test]
    fn test_weighting_variants() {
        assert_eq!(LexicalWeighting::NameLed.weights(), (0.7, 0.3));
        assert_eq!(LexicalWeighting::AddressLed.weights(), (0.3, 0.7));
        assert_eq!(LexicalWeighting::NameLed.default_threshold(), 0.6);
        assert_eq!(LexicalWeighting::AddressLed.default_threshold(), 0.7);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let config = MatchConfig {
            proximity_threshold_m: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = MatchConfig {
            lexical_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MatchConfig {
            lexical_threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_enabled_rejected() {
        let config = MatchConfig::default().with_strategies([]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_priority_rejected() {
        let config = MatchConfig {
            priority: vec![StrategyKind::Proximity, StrategyKind::Proximity],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_enabled_missing_from_priority_rejected() {
        let config = MatchConfig {
            priority: vec![StrategyKind::Proximity],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_priority_rank() {
        let config = MatchConfig::default();
        assert_eq!(config.priority_rank(StrategyKind::Containment), 0);
        assert_eq!(config.priority_rank(StrategyKind::Proximity), 1);
        assert_eq!(config.priority_rank(StrategyKind::Lexical), 2);
    }
}

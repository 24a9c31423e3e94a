//! Types d'erreurs pour le crate reconcile

use thiserror::Error;

/// Erreurs pouvant survenir lors d'un run de résolution.
///
/// Seules les erreurs de configuration sont fatales: les problèmes par
/// enregistrement ou par stratégie sont dégradés en warnings par les
/// fournisseurs de données, jamais remontés ici.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Configuration invalide: rejetée avant d'exécuter le moindre matcher
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Échec de création du transformateur de coordonnées
    #[error("Failed to build reprojector EPSG:{source_epsg} -> EPSG:{target}: {reason}")]
    ReprojectorInit {
        // thiserror treats a field literally named `source` as the error
        // source; `source_epsg` keeps it a plain EPSG code.
        source_epsg: u32,
        target: u32,
        reason: String,
    },

    /// Échec de transformation d'une géométrie
    #[error("Reprojection failed for {entity_id}: {reason}")]
    ReprojectionFailed { entity_id: String, reason: String },
}

impl ReconcileError {
    /// Crée une erreur de configuration
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Crée une erreur de reprojection avec contexte
    pub fn reprojection_failed(entity_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ReprojectionFailed {
            entity_id: entity_id.into(),
            reason: reason.into(),
        }
    }
}

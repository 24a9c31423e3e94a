//! # reconcile
//!
//! Moteur de résolution d'entités pour réconcilier deux catalogues de
//! parkings: un référentiel opérationnel canonique (identifiants stables,
//! données de vacance) et une liste de référence externe (noms de stations,
//! adresses, coordonnées, sans identifiant stable).
//!
//! ## Features
//!
//! - Trois stratégies indépendantes derrière un contrat commun:
//!   proximité (haversine), lexicale (ratio de blocs communs sur noms et
//!   adresses normalisées), containment (même emprise de bâtiment)
//! - Fusion en un verdict par enregistrement avec provenance et palier de
//!   confiance; politique de conflit documentée et configurable
//! - Reprojection CRS des emprises via PROJ (feature `reproject`)
//! - Parallèle sur les enregistrements externes avec `rayon`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use reconcile::{resolve, MatchConfig};
//!
//! let config = MatchConfig::default();
//! let verdicts = resolve(&externals, &canonicals, footprints, &config)?;
//!
//! for verdict in &verdicts {
//!     match &verdict.canonical_id {
//!         Some(id) => println!("{} -> {} ({})", verdict.external.name, id, verdict.confidence),
//!         None => println!("{} -> no match", verdict.external.name),
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod fusion;
pub mod geomath;
pub mod matcher;
pub mod report;
pub mod reproject;
pub mod spatial;
pub mod text;
pub mod types;

pub use config::{LexicalWeighting, MatchConfig};
pub use error::ReconcileError;
pub use report::ResolutionReport;
pub use types::{
    BuildingFootprint, CanonicalRecord, Confidence, Evidence, ExternalRecord, MatchCandidate,
    MatchVerdict, StrategyKind,
};

use std::sync::Arc;

use tracing::{info, warn};

use crate::spatial::SpatialIndex;

/// Point d'entrée unique du moteur: juge chaque enregistrement externe
/// contre la collection canonique et retourne un verdict par
/// enregistrement, dans l'ordre d'entrée.
///
/// Les emprises doivent déjà être en coordonnées géographiques (lon/lat);
/// la reprojection est à la charge du fournisseur de données (voir
/// [`reproject::Reprojector`]).
///
/// # Errors
///
/// Retourne [`ReconcileError::InvalidConfig`] si la configuration est
/// invalide: aucun matcher n'est exécuté dans ce cas. Les collections
/// vides ne sont PAS des erreurs: une collection canonique vide produit
/// des verdicts tous sans match.
pub fn resolve(
    externals: &[ExternalRecord],
    canonicals: &[CanonicalRecord],
    footprints: Vec<BuildingFootprint>,
    config: &MatchConfig,
) -> Result<Vec<MatchVerdict>, ReconcileError> {
    config.validate()?;

    if canonicals.is_empty() {
        warn!("Canonical collection is empty: every verdict will be unmatched");
    }
    if config.enabled.contains(&StrategyKind::Containment) && footprints.is_empty() {
        warn!("No building footprints: containment strategy will never produce a candidate");
    }

    let index = Arc::new(SpatialIndex::new(footprints));
    let matchers = matcher::build_matchers(config, index);

    info!(
        externals = externals.len(),
        canonicals = canonicals.len(),
        strategies = matchers.len(),
        "Starting resolution"
    );

    Ok(fusion::fuse(externals, canonicals, &matchers, config))
}

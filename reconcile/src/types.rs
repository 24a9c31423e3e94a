//! Types de données pour le crate reconcile

use std::collections::{BTreeMap, BTreeSet};

use geo::Polygon;
use serde::Serialize;

/// Un parking du référentiel opérationnel (identifiant stable)
#[derive(Debug, Clone)]
pub struct CanonicalRecord {
    /// Identifiant stable (park_id)
    pub id: String,

    /// Nom du parking
    pub name: String,

    /// Adresse affichée
    pub address: String,

    /// Latitude WGS84 (degrés décimaux)
    pub latitude: f64,

    /// Longitude WGS84 (degrés décimaux)
    pub longitude: f64,
}

/// Un parking de la liste de référence externe (sans identifiant stable).
///
/// L'identité d'un enregistrement externe pendant un run est son index
/// positionnel dans la collection d'entrée, pas son nom.
#[derive(Debug, Clone, Serialize)]
pub struct ExternalRecord {
    /// Nom de la station
    pub name: String,

    /// Adresse
    pub address: String,

    /// Latitude WGS84 (degrés décimaux)
    pub latitude: f64,

    /// Longitude WGS84 (degrés décimaux)
    pub longitude: f64,
}

/// Emprise d'un bâtiment, frontière en coordonnées géographiques (lon/lat).
///
/// Les polygones source arrivent souvent dans un CRS projeté (HK1980 Grid,
/// EPSG:2326) et doivent être reprojetés une seule fois avant construction
/// du [`crate::spatial::SpatialIndex`].
#[derive(Debug, Clone)]
pub struct BuildingFootprint {
    /// Identifiant opaque (BUILDINGSTRUCTUREID)
    pub id: String,

    /// Nom officiel principal
    pub name_primary: String,

    /// Nom officiel secondaire (ex: nom en chinois traditionnel)
    pub name_secondary: Option<String>,

    /// Frontière en lon/lat (x = longitude, y = latitude)
    pub boundary: Polygon<f64>,
}

/// Une stratégie de matching indépendante.
///
/// L'ordre de déclaration est l'ordre de priorité par défaut pour le
/// départage des conflits: containment > proximity > lexical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Containment dans une même emprise de bâtiment
    Containment,
    /// Proximité géométrique (haversine)
    Proximity,
    /// Similarité lexicale nom/adresse
    Lexical,
}

impl StrategyKind {
    /// Les trois stratégies, dans l'ordre de priorité par défaut
    pub const ALL: [StrategyKind; 3] = [
        StrategyKind::Containment,
        StrategyKind::Proximity,
        StrategyKind::Lexical,
    ];

    /// Nom court de la stratégie (stable, utilisé dans les rapports)
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Containment => "containment",
            StrategyKind::Proximity => "proximity",
            StrategyKind::Lexical => "lexical",
        }
    }
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "containment" | "polygon" | "building" => Ok(StrategyKind::Containment),
            "proximity" | "coordinate" | "distance" => Ok(StrategyKind::Proximity),
            "lexical" | "address" | "name" => Ok(StrategyKind::Lexical),
            _ => Err(format!(
                "Unknown strategy: {}. Use: containment, proximity, lexical",
                s
            )),
        }
    }
}

/// Preuve produite par une stratégie pour justifier un candidat
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evidence {
    /// Distance haversine au candidat retenu
    Distance {
        /// Distance en mètres
        meters: f64,
    },
    /// Score de similarité combiné nom + adresse
    Similarity {
        /// Score combiné pondéré
        score: f64,
        /// Composante nom
        name_score: f64,
        /// Composante adresse (après normalisation)
        address_score: f64,
    },
    /// Les deux points tombent dans la même emprise de bâtiment
    SharedFootprint {
        /// Identifiant de l'emprise
        footprint_id: String,
        /// Nom officiel de l'emprise, s'il existe
        footprint_name: Option<String>,
    },
}

/// Candidat produit par une stratégie pour UN enregistrement externe.
///
/// Transient: produit et consommé à l'intérieur d'une invocation de
/// [`crate::fusion::fuse`]. Chaque stratégie produit au plus un candidat
/// par enregistrement externe (best-of, pas multi-candidats).
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    /// Identifiant canonique retenu
    pub canonical_id: String,

    /// Stratégie qui a produit ce candidat
    pub strategy: StrategyKind,

    /// Score ou distance selon la stratégie (mètres pour proximity,
    /// ratio [0,1] pour lexical, 1.0 pour containment)
    pub score: f64,

    /// Preuve détaillée
    pub evidence: Evidence,
}

/// Palier de confiance, fonction déterministe du nombre de stratégies
/// d'accord sur le même identifiant canonique
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Aucune stratégie n'a produit de candidat
    None,
    /// Exactement une stratégie soutient le verdict
    Medium,
    /// Au moins deux stratégies sont d'accord sur le même identifiant
    High,
}

impl Confidence {
    /// Nom court du palier
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::None => "none",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict fusionné pour un enregistrement externe.
///
/// Invariants:
/// - `canonical_id` est `Some` si et seulement si `strategies` est non vide
/// - `strategies` ne contient que les stratégies d'accord sur `canonical_id`
/// - `evidence` conserve la preuve de TOUTES les stratégies ayant produit
///   un candidat, y compris celles en désaccord avec le verdict
#[derive(Debug, Clone, Serialize)]
pub struct MatchVerdict {
    /// Index de l'enregistrement externe dans la collection d'entrée
    pub external_index: usize,

    /// L'enregistrement externe jugé
    pub external: ExternalRecord,

    /// Identifiant canonique retenu, `None` si aucune stratégie n'a accepté
    /// de candidat (état terminal valide, pas une erreur)
    pub canonical_id: Option<String>,

    /// Stratégies soutenant `canonical_id`
    pub strategies: BTreeSet<StrategyKind>,

    /// Preuve par stratégie (provenance complète)
    pub evidence: BTreeMap<StrategyKind, Evidence>,

    /// Palier de confiance
    pub confidence: Confidence,
}

impl MatchVerdict {
    /// Verdict "aucun match" pour un enregistrement externe
    pub fn unmatched(external_index: usize, external: ExternalRecord) -> Self {
        Self {
            external_index,
            external,
            canonical_id: None,
            strategies: BTreeSet::new(),
            evidence: BTreeMap::new(),
            confidence: Confidence::None,
        }
    }

    /// Vrai si un identifiant canonique a été retenu
    pub fn is_matched(&self) -> bool {
        self.canonical_id.is_some()
    }
}

//! Fournisseurs de données pour le moteur de résolution
//!
//! Trois collaborateurs externes, tous chargés entièrement AVANT le
//! matching (le coeur ne fait aucune I/O):
//! - registre canonique depuis PostgreSQL
//! - liste externe depuis un CSV délimité
//! - emprises de bâtiments depuis un GeoJSON, reprojetées en lon/lat
//!
//! Politique commune: un enregistrement malformé est skippé avec un
//! warning, jamais fatal. Une collection entièrement absente dégrade la
//! stratégie concernée, pas le run.

pub mod csv;
pub mod footprints;
pub mod postgres;

//! Pool de connexions PostgreSQL et requête du registre canonique

use anyhow::{Context, Result};
use deadpool_postgres::{Config, Pool, PoolConfig, Runtime, Timeouts};
use std::time::Duration;
use tokio_postgres::NoTls;
use tokio_postgres_rustls::MakeRustlsConnect;
use tracing::warn;

use reconcile::CanonicalRecord;

/// Mode SSL pour la connexion PostgreSQL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    /// Pas de SSL (défaut)
    #[default]
    Disable,
    /// SSL préféré mais non requis
    Prefer,
    /// SSL requis
    Require,
}

impl std::str::FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "disable" | "off" | "false" | "no" => Ok(SslMode::Disable),
            "prefer" => Ok(SslMode::Prefer),
            "require" | "on" | "true" | "yes" => Ok(SslMode::Require),
            _ => Err(format!("Invalid SSL mode: {}. Use: disable, prefer, require", s)),
        }
    }
}

/// Configuration de la base de données
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: Option<String>,
    pub pool_size: usize,
    pub ssl_mode: SslMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 5432,
            dbname: "carparks".into(),
            user: "postgres".into(),
            password: None,
            pool_size: 16,
            ssl_mode: SslMode::Disable,
        }
    }
}

impl DatabaseConfig {
    /// Charge la configuration depuis les variables d'environnement
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("PGHOST").unwrap_or_else(|_| "localhost".into()),
            port: std::env::var("PGPORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5432),
            dbname: std::env::var("PGDATABASE").unwrap_or_else(|_| "carparks".into()),
            user: std::env::var("PGUSER").unwrap_or_else(|_| "postgres".into()),
            password: std::env::var("PGPASSWORD").ok(),
            pool_size: std::env::var("POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16),
            ssl_mode: std::env::var("PGSSLMODE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_default(),
        }
    }
}

/// Crée la configuration TLS pour rustls
fn make_tls_connector() -> Result<MakeRustlsConnect> {
    let root_store =
        rustls::RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(MakeRustlsConnect::new(config))
}

/// Crée un pool de connexions
pub async fn create_pool(config: &DatabaseConfig) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.dbname = Some(config.dbname.clone());
    cfg.user = Some(config.user.clone());
    cfg.password = config.password.clone();

    cfg.pool = Some(PoolConfig {
        max_size: config.pool_size,
        timeouts: Timeouts {
            wait: Some(Duration::from_secs(30)),
            create: Some(Duration::from_secs(10)),
            recycle: Some(Duration::from_secs(30)),
        },
        ..Default::default()
    });

    match config.ssl_mode {
        SslMode::Disable => cfg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .context("Failed to create database pool"),
        SslMode::Prefer | SslMode::Require => {
            let tls = make_tls_connector()?;
            cfg.create_pool(Some(Runtime::Tokio1), tls)
                .context("Failed to create database pool with TLS")
        }
    }
}

/// Teste la connexion à la base
pub async fn test_connection(pool: &Pool) -> Result<()> {
    let client = pool
        .get()
        .await
        .context("Failed to get connection from pool")?;
    client
        .execute("SELECT 1", &[])
        .await
        .context("Connection test failed")?;
    Ok(())
}

/// Charge le snapshot du registre canonique: parkings du type de véhicule
/// demandé avec vacance positive. Le filtre est une politique du
/// collaborateur, pas une logique du coeur.
///
/// Les lignes aux coordonnées non exploitables sont skippées avec un
/// warning (jamais fatal).
pub async fn fetch_canonical_records(
    pool: &Pool,
    vehicle_type: &str,
) -> Result<Vec<CanonicalRecord>> {
    let client = pool
        .get()
        .await
        .context("Failed to get connection from pool")?;

    let rows = client
        .query(
            "SELECT park_id::text, \
                    COALESCE(name, ''), \
                    COALESCE(display_address, ''), \
                    latitude::float8, \
                    longitude::float8 \
             FROM latest_vacancy_with_location \
             WHERE vehicle_type = $1 \
               AND vacancy > 0 \
               AND latitude IS NOT NULL \
               AND longitude IS NOT NULL \
             ORDER BY name",
            &[&vehicle_type],
        )
        .await
        .context("Failed to query canonical carparks")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;

    for row in rows {
        let id: String = row.get(0);
        let latitude: f64 = row.get(3);
        let longitude: f64 = row.get(4);

        if !latitude.is_finite() || !longitude.is_finite() {
            warn!(park_id = %id, "Skipping canonical record with non-finite coordinates");
            skipped += 1;
            continue;
        }

        records.push(CanonicalRecord {
            id,
            name: row.get(1),
            address: row.get(2),
            latitude,
            longitude,
        });
    }

    if skipped > 0 {
        warn!(skipped, "Canonical records skipped");
    }

    Ok(records)
}

/// Une ligne de l'export `database-carparks.csv` (inclut le district,
/// absent du modèle de matching)
#[derive(Debug)]
pub struct ExportRow {
    pub park_id: String,
    pub name: String,
    pub address: String,
    pub district: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Charge les lignes d'export (mêmes filtres que le snapshot canonique,
/// avec la colonne district en plus)
pub async fn fetch_export_rows(pool: &Pool, vehicle_type: &str) -> Result<Vec<ExportRow>> {
    let client = pool
        .get()
        .await
        .context("Failed to get connection from pool")?;

    let rows = client
        .query(
            "SELECT park_id::text, \
                    COALESCE(name, ''), \
                    COALESCE(display_address, ''), \
                    COALESCE(district, ''), \
                    latitude::float8, \
                    longitude::float8 \
             FROM latest_vacancy_with_location \
             WHERE vehicle_type = $1 \
               AND vacancy > 0 \
               AND latitude IS NOT NULL \
               AND longitude IS NOT NULL \
             ORDER BY name",
            &[&vehicle_type],
        )
        .await
        .context("Failed to query carparks for export")?;

    Ok(rows
        .into_iter()
        .map(|row| ExportRow {
            park_id: row.get(0),
            name: row.get(1),
            address: row.get(2),
            district: row.get(3),
            latitude: row.get(4),
            longitude: row.get(5),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssl_mode_from_str() {
        assert_eq!("disable".parse::<SslMode>(), Ok(SslMode::Disable));
        assert_eq!("require".parse::<SslMode>(), Ok(SslMode::Require));
        assert_eq!("PREFER".parse::<SslMode>(), Ok(SslMode::Prefer));
        assert!("sideways".parse::<SslMode>().is_err());
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.ssl_mode, SslMode::Disable);
    }
}

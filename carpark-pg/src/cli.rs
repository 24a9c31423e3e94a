//! Sous-commandes de carpark-pg
//!
//! `resolve` orchestre un run complet: chargement des trois collections,
//! appel au moteur, rapport console et sorties fichier. `export` produit
//! les deux snapshots CSV côte à côte (registre et liste externe).

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use tracing::{info, warn};

use reconcile::{MatchConfig, ResolutionReport, StrategyKind};

use crate::output;
use crate::providers::csv::load_external_records;
use crate::providers::footprints::load_footprints;
use crate::providers::postgres::{
    create_pool, fetch_canonical_records, fetch_export_rows, test_connection, DatabaseConfig,
    SslMode,
};

#[derive(Subcommand)]
pub enum Commands {
    /// Match an external CSV list against the canonical registry
    Resolve(ResolveArgs),

    /// Export registry and external list as side-by-side CSV snapshots
    Export(ExportArgs),
}

/// Overrides de connexion PostgreSQL (prioritaires sur l'environnement)
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Database host (overrides PGHOST)
    #[arg(long)]
    host: Option<String>,

    /// Database port (overrides PGPORT)
    #[arg(long)]
    port: Option<u16>,

    /// Database name (overrides PGDATABASE)
    #[arg(long)]
    database: Option<String>,

    /// Database user (overrides PGUSER)
    #[arg(long)]
    user: Option<String>,

    /// Database password (overrides PGPASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// SSL mode: disable, prefer, require (overrides PGSSLMODE)
    #[arg(long)]
    ssl: Option<SslMode>,
}

impl DatabaseArgs {
    fn apply(&self, mut config: DatabaseConfig) -> DatabaseConfig {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = &self.database {
            config.dbname = database.clone();
        }
        if let Some(user) = &self.user {
            config.user = user.clone();
        }
        if let Some(password) = &self.password {
            config.password = Some(password.clone());
        }
        if let Some(ssl) = self.ssl {
            config.ssl_mode = ssl;
        }
        config
    }
}

#[derive(Args)]
pub struct ResolveArgs {
    /// External carpark list (CSV with Station Name/Address/Latitude/Longitude)
    #[arg(long)]
    pub csv: PathBuf,

    /// Building footprints GeoJSON (enables the containment strategy)
    #[arg(long)]
    pub footprints: Option<PathBuf>,

    /// EPSG code of the footprint coordinates
    #[arg(long, default_value_t = 2326)]
    pub source_epsg: u32,

    /// Maximum distance in meters for a proximity match
    #[arg(long, default_value_t = reconcile::config::DEFAULT_PROXIMITY_THRESHOLD_M)]
    pub proximity_m: f64,

    /// Acceptance threshold for the combined lexical score [0-1]
    /// (defaults to 0.6 name-led, 0.7 address-led)
    #[arg(long)]
    pub lexical_threshold: Option<f64>,

    /// Weight the lexical score toward addresses (0.7) instead of names
    #[arg(long)]
    pub address_led: bool,

    /// Comma-separated strategies to enable (containment,proximity,lexical)
    #[arg(long)]
    pub strategies: Option<String>,

    /// Vehicle type filter on the registry side
    #[arg(long, default_value = "privateCar")]
    pub vehicle_type: String,

    /// Write one CSV row per external record with its verdict
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Write the full resolution report as JSON
    #[arg(long)]
    pub report_json: Option<PathBuf>,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output directory for the CSV snapshots
    #[arg(long, default_value = ".")]
    pub output: PathBuf,

    /// External carpark list to reformat alongside the registry snapshot
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Vehicle type filter on the registry side
    #[arg(long, default_value = "privateCar")]
    pub vehicle_type: String,

    #[command(flatten)]
    pub db: DatabaseArgs,
}

/// Construit la configuration de matching depuis les flags CLI.
///
/// La validation du moteur reste la seule autorité: toute combinaison
/// invalide (seuil hors bornes, aucune stratégie) est rejetée ici, avant
/// la moindre I/O.
fn build_match_config(args: &ResolveArgs) -> Result<MatchConfig> {
    let mut config = if args.address_led {
        MatchConfig::address_led()
    } else {
        MatchConfig::default()
    };

    config.proximity_threshold_m = args.proximity_m;
    if let Some(threshold) = args.lexical_threshold {
        config.lexical_threshold = threshold;
    }

    if let Some(list) = &args.strategies {
        let strategies = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<StrategyKind>().map_err(|e| anyhow!(e)))
            .collect::<Result<Vec<_>>>()?;
        config = config.with_strategies(strategies);
    }

    config.validate()?;
    Ok(config)
}

pub async fn cmd_resolve(args: ResolveArgs) -> Result<()> {
    let match_config = build_match_config(&args)?;

    let db_config = args.db.apply(DatabaseConfig::from_env());
    let pool = create_pool(&db_config).await?;
    test_connection(&pool)
        .await
        .with_context(|| format!("Cannot reach database at {}:{}", db_config.host, db_config.port))?;

    let canonicals = fetch_canonical_records(&pool, &args.vehicle_type).await?;
    info!(
        canonicals = canonicals.len(),
        vehicle_type = %args.vehicle_type,
        "Canonical registry loaded"
    );

    let externals = load_external_records(&args.csv)?;

    // Sans fichier d'emprises le containment dégrade en no-op; le moteur
    // loggue la dégradation lui-même
    let footprints = match &args.footprints {
        Some(path) => load_footprints(path, args.source_epsg)?,
        None => {
            warn!("No footprint file provided");
            Vec::new()
        }
    };

    let start = Instant::now();
    let verdicts = reconcile::resolve(&externals, &canonicals, footprints, &match_config)?;

    let mut report = ResolutionReport::from_verdicts(&verdicts);
    report.set_duration(start.elapsed());
    report.display();

    for (park_id, count) in report.multi_resolved() {
        warn!(park_id, count, "Canonical carpark matched by multiple external records");
    }

    if let Some(path) = &args.output_csv {
        output::write_verdicts_csv(&verdicts, path)?;
    }
    if let Some(path) = &args.report_json {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write report: {}", path.display()))?;
        info!(path = %path.display(), "Report written");
    }

    info!("{}", report.summary());
    Ok(())
}

pub async fn cmd_export(args: ExportArgs) -> Result<()> {
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Cannot create output directory: {}", args.output.display()))?;

    let db_config = args.db.apply(DatabaseConfig::from_env());
    let pool = create_pool(&db_config).await?;
    test_connection(&pool)
        .await
        .with_context(|| format!("Cannot reach database at {}:{}", db_config.host, db_config.port))?;

    let rows = fetch_export_rows(&pool, &args.vehicle_type).await?;
    output::write_database_csv(&rows, &args.output.join("database-carparks.csv"))?;

    if let Some(csv) = &args.csv {
        let externals = load_external_records(csv)?;
        output::write_external_formatted_csv(
            &externals,
            &args.output.join("connected-carparks-formatted.csv"),
        )?;
    }

    Ok(())
}

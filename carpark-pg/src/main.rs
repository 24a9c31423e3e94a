//! Point d'entrée CLI pour carpark-pg

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;
mod output;
mod providers;

use cli::Commands;

/// Réconcilier le registre de parkings PostgreSQL avec des listes externes
#[derive(Parser)]
#[command(name = "carpark-pg")]
#[command(author, version)]
#[command(about = "Match external carpark lists (CSV) against the vacancy registry in PostgreSQL")]
#[command(
    long_about = "Entity resolution between the canonical carpark registry (PostgreSQL, stable \
                  park_ids and live vacancy) and an external reference list (station names, \
                  addresses, coordinates). Three independent strategies (proximity, lexical, \
                  building containment) are fused into one verdict per external record."
)]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Resolve(args) => {
            info!(csv = %args.csv.display(), "Resolve");
            cli::cmd_resolve(args).await?;
        }
        Commands::Export(args) => {
            info!(output = %args.output.display(), "Export");
            cli::cmd_export(args).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}

//! Point d'entrée CLI pour building-footprints

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

use cli::Commands;

/// Reconstruire les emprises de bâtiments OpenStreetMap depuis des réponses Overpass
#[derive(Parser)]
#[command(name = "building-footprints")]
#[command(author, version)]
#[command(about = "Reconstruct OpenStreetMap building footprints from Overpass responses")]
#[command(long_about = "Turns the nodes, ways and multipolygon relations of an Overpass response into closed building rings.\n\nUse 'query' to print the Overpass QL for a location and 'reconstruct' to convert saved responses to GeoJSON or [lat, lon] rings.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    // Configurer le logging (stderr : stdout peut porter les données)
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Reconstruct {
            input,
            output,
            format,
            precision,
            dedupe,
            config,
            report,
        } => {
            info!(input = %input.display(), output = ?output, "Reconstruct footprints");
            let config = cli::load_config(config.as_deref(), format, precision, dedupe, None)?;
            cli::cmd_reconstruct(&input, output.as_deref(), &config, report.as_deref(), cli.quiet)?;
        }
        Commands::Query {
            lat,
            lon,
            radius,
            timeout,
            config,
        } => {
            let config = cli::load_config(config.as_deref(), None, None, false, radius)?;
            cli::cmd_query(lat, lon, config.radius_m, timeout)?;
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
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}

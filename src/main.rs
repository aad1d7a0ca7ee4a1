//! cds-sync: keep the CdsHelper city database, cities.json and the city CSV in step

use anyhow::Result;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use cds_sync::commands;
use cds_sync::config::SyncPaths;

#[derive(Parser)]
#[command(name = "cds-sync")]
#[command(about = "Sync city data between the CdsHelper database, cities.json and the city CSV", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy pixel coordinates and library flags from the database into cities.json
    SyncCities {
        /// SQLite database (default: cds-helper/bin/Debug/net8.0-windows/cdshelper.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// cities.json to rewrite (default: cds-helper/cities.json)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Show what would change without writing the file
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Set the HasGuild column from the city CSV export
    SyncGuild {
        /// City CSV export (default: CdsHelper/도시.csv)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// SQLite database (default: cds-helper/bin/Debug/net8.0-windows/cdshelper.db)
        #[arg(long)]
        db: Option<PathBuf>,

        /// Show what would change without touching the database
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Run sync-guild, then sync-cities
    SyncAll {
        #[arg(long)]
        db: Option<PathBuf>,

        #[arg(long)]
        json: Option<PathBuf>,

        #[arg(long)]
        csv: Option<PathBuf>,

        /// Show what would change without writing anything
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::SyncCities { db, json, dry_run } => {
            let paths = SyncPaths::resolve(db, json, None);
            print_dry_run_banner(dry_run);
            commands::sync_cities::execute(&paths.db, &paths.cities_json, dry_run)?;
        }

        Commands::SyncGuild { csv, db, dry_run } => {
            let paths = SyncPaths::resolve(db, None, csv);
            print_dry_run_banner(dry_run);
            commands::sync_guild::execute(&paths.city_csv, &paths.db, dry_run)?;
        }

        Commands::SyncAll {
            db,
            json,
            csv,
            dry_run,
        } => {
            let paths = SyncPaths::resolve(db, json, csv);
            print_dry_run_banner(dry_run);
            commands::sync_guild::execute(&paths.city_csv, &paths.db, dry_run)?;
            println!();
            commands::sync_cities::execute(&paths.db, &paths.cities_json, dry_run)?;
        }
    }

    Ok(())
}

fn print_dry_run_banner(dry_run: bool) {
    if dry_run {
        println!("{}", "(DRY-RUN MODE - no changes will be made)".blue());
    }
}

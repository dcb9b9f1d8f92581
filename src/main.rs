use clap::{Args, Parser, Subcommand};

mod db;
mod models;
mod sync;

mod tests;

use sync::supabase::{SupabaseConfig, SupabaseFeed};
use sync::Table;

#[derive(Debug, Parser)]
#[command(name = "agency-cms")]
#[command(about = "Content backend for the agency website", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mirror entity tables from Supabase into the local store
    Sync(SyncArgs),
}

#[derive(Debug, Args)]
struct SyncArgs {
    /// Tables to sync (default: all six)
    #[arg(long, num_args = 1..)]
    tables: Vec<String>,
    /// SQLite database path
    #[arg(long, default_value = "data/cms.db")]
    db: String,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync(args) => run_sync(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_sync(args: SyncArgs) -> Result<(), String> {
    let tables: Vec<Table> = if args.tables.is_empty() {
        Table::ALL.to_vec()
    } else {
        args.tables
            .iter()
            .map(|name| {
                Table::parse(name).ok_or_else(|| format!("Unknown table: {}", name))
            })
            .collect::<Result<_, _>>()?
    };

    // Missing configuration aborts before any table is attempted.
    let config = SupabaseConfig::from_env()?;
    let feed = SupabaseFeed::new(config)?;

    let pool = db::init_pool(&args.db).map_err(|e| e.to_string())?;
    db::run_migrations(&pool).map_err(|e| e.to_string())?;

    let report = sync::run(&pool, &feed, &tables);

    // One line per table. Partial failure still exits 0; the per-table
    // lines are the operator's signal.
    for outcome in &report.tables {
        match &outcome.result {
            Ok(stats) => println!(
                "Successfully synced {} ({} synced, {} skipped)",
                outcome.table, stats.synced, stats.skipped
            ),
            Err(e) => println!("Error syncing {}: {}", outcome.table, e),
        }
    }

    Ok(())
}

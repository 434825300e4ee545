use std::error::Error;
use std::path::Path;

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

use invoice_insights::{LoadOptions, initialize_db, load_from_path, local_today};

/// Replace the data in an Invoice Insights database with the invoices in an
/// exported JSON file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the SQLite database. Created if it does not exist.
    #[arg(long, env = "DATABASE_PATH", default_value = "invoice_insights.db")]
    db_path: String,

    /// File path to the JSON export of extracted invoices.
    #[arg(long, short, default_value = "data/Analytics_Test_Data.json")]
    input: String,

    /// Seed for the category picker used when no keyword matches.
    #[arg(long)]
    seed: Option<u64>,

    /// The canonical name of the timezone used for "today", e.g. "Europe/Berlin".
    #[arg(long, env = "LOCAL_TIMEZONE", default_value = "Etc/UTC")]
    timezone: String,
}

/// Load the export into the database.
fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let today = local_today(&args.timezone)?;

    tracing::info!("Opening database at {}", args.db_path);
    let mut conn = Connection::open(&args.db_path)?;
    initialize_db(&conn)?;

    let options = LoadOptions {
        today,
        seed: args.seed,
    };
    let summary = load_from_path(Path::new(&args.input), &mut conn, &options)?;

    tracing::info!(
        "Seeding completed: {} vendors, {} customers, {} invoices, {} skipped",
        summary.vendors,
        summary.customers,
        summary.processed,
        summary.skipped
    );

    Ok(())
}

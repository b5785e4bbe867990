use std::{error::Error, path::PathBuf, process::exit};

use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use comp_dashboard::{RoleCorrections, import_table, initialize_db, read_spreadsheet};

/// Import employees from a spreadsheet into the compensation database.
///
/// Rows are appended to the existing employees. Rows the database rejects are
/// logged and counted, the rest of the spreadsheet is still imported.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The spreadsheet to import (.xlsx, .xls, .ods or .csv).
    input_path: PathBuf,

    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The worksheet to read. Defaults to the first worksheet.
    #[arg(long)]
    sheet: Option<String>,

    /// A JSON file of extra role spelling fixes, e.g. `{"Mangaer": "Manager"}`.
    #[arg(long)]
    role_corrections: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let role_corrections = match &args.role_corrections {
        Some(path) => RoleCorrections::from_json_file(path)?,
        None => RoleCorrections::default(),
    };

    let connection = match Connection::open(&args.db_path) {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("Could not open database at {}: {error}", args.db_path);
            exit(1);
        }
    };
    initialize_db(&connection)?;

    tracing::info!("Reading {}", args.input_path.display());
    let table = read_spreadsheet(&args.input_path, args.sheet.as_deref())?;

    let summary = import_table(&table, &role_corrections, &connection)?;

    println!(
        "Imported {} employees from {}, {} rows failed.",
        summary.inserted,
        args.input_path.display(),
        summary.failed
    );

    Ok(())
}

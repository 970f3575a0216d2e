use anyhow::Context;
use rusqlite::Connection;
use std::env;
use std::fs::File;
use std::io::BufReader;
use wifiloc::config::StoreConfig;
use wifiloc::resolver::sqlite::import_seed;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <csv_file> [db_path]", args[0]);
        eprintln!("\nEach CSV line is: mac,lat,lon,label (header and '#' lines are skipped)");
        eprintln!("If db_path is not provided, it will be read from WIFILOC_STORE_DB_PATH env var (default: wifi_map.db)");
        eprintln!("Table and label column follow WIFILOC_STORE_TABLE and WIFILOC_STORE_LABEL_COLUMN");
        std::process::exit(1);
    }

    dotenvy::dotenv().ok();

    let defaults = StoreConfig::default();
    let config = StoreConfig {
        db_path: args
            .get(2)
            .map(Into::into)
            .or_else(|| env::var("WIFILOC_STORE_DB_PATH").ok().map(Into::into))
            .unwrap_or(defaults.db_path),
        table: env::var("WIFILOC_STORE_TABLE").unwrap_or(defaults.table),
        label_column: env::var("WIFILOC_STORE_LABEL_COLUMN").unwrap_or(defaults.label_column),
    };

    let csv_path = &args[1];
    let file = File::open(csv_path).with_context(|| format!("Failed to open {}", csv_path))?;

    let mut conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;

    let count = import_seed(
        &mut conn,
        &config.table,
        &config.label_column,
        BufReader::new(file),
    )?;

    println!(
        "Imported {} access point{} into {} (table '{}')",
        count,
        if count == 1 { "" } else { "s" },
        config.db_path.display(),
        config.table
    );

    Ok(())
}

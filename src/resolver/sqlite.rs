use super::CoordinateResolver;
use crate::config::StoreConfig;
use crate::error::{Result, WifiLocError};
use crate::model::access_point::{AccessPointRecord, MacAddress};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::PathBuf;
use tracing::{info, warn};

/// True if `name` can be spliced into SQL as a bare identifier
pub fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn check_identifier(name: &str, what: &str) -> Result<()> {
    if is_sql_identifier(name) {
        Ok(())
    } else {
        Err(WifiLocError::ConfigError(format!(
            "{} '{}' is not a valid SQL identifier",
            what, name
        )))
    }
}

/// Create the access-point table if it does not exist
pub fn init_schema(conn: &Connection, table: &str, label_column: &str) -> Result<()> {
    check_identifier(table, "Table name")?;
    check_identifier(label_column, "Label column")?;
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            mac TEXT PRIMARY KEY,
            lat REAL NOT NULL,
            lon REAL NOT NULL,
            {label_column} TEXT
        );"
    ))?;
    Ok(())
}

/// Insert or replace one access point, keyed by its uppercase MAC
pub fn upsert_access_point(
    conn: &Connection,
    table: &str,
    label_column: &str,
    mac: &MacAddress,
    record: &AccessPointRecord,
) -> Result<()> {
    check_identifier(table, "Table name")?;
    check_identifier(label_column, "Label column")?;
    conn.execute(
        &format!("INSERT OR REPLACE INTO {table} (mac, lat, lon, {label_column}) VALUES (?1, ?2, ?3, ?4)"),
        params![mac.to_string(), record.lat, record.lon, record.label],
    )?;
    Ok(())
}

/// Parse one `mac,lat,lon,label` line. Blank lines, `#` comments and a
/// header row starting with `mac` yield `Ok(None)`.
pub fn parse_seed_line(line: &str) -> Result<Option<(MacAddress, AccessPointRecord)>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') || line.to_ascii_lowercase().starts_with("mac,") {
        return Ok(None);
    }

    let fields: Vec<&str> = line.splitn(4, ',').map(str::trim).collect();
    if fields.len() < 3 {
        return Err(WifiLocError::InvalidPayload(format!(
            "expected 'mac,lat,lon[,label]', got '{}'",
            line
        )));
    }

    let mac: MacAddress = fields[0].parse()?;
    let parse_coord = |s: &str, what: &str| {
        s.parse::<f64>()
            .map_err(|e| WifiLocError::InvalidPayload(format!("invalid {} '{}': {}", what, s, e)))
    };

    let record = AccessPointRecord {
        lat: parse_coord(fields[1], "latitude")?,
        lon: parse_coord(fields[2], "longitude")?,
        label: fields.get(3).copied().unwrap_or_default().to_string(),
    };

    Ok(Some((mac, record)))
}

/// Load `mac,lat,lon,label` lines into the table in one transaction.
/// Returns the number of access points written.
pub fn import_seed<R: std::io::BufRead>(
    conn: &mut Connection,
    table: &str,
    label_column: &str,
    reader: R,
) -> Result<usize> {
    init_schema(conn, table, label_column)?;

    let tx = conn.transaction()?;
    let mut count = 0;
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        let parsed = parse_seed_line(&line).map_err(|e| {
            WifiLocError::InvalidPayload(format!("line {}: {}", lineno + 1, e))
        })?;
        if let Some((mac, record)) = parsed {
            upsert_access_point(&tx, table, label_column, &mac, &record)?;
            count += 1;
        }
    }
    tx.commit()?;

    info!(count = count, table = table, "Imported access points");
    Ok(count)
}

/// Reference store backed by a read-only SQLite file.
///
/// The file is opened on first use. While it is missing every lookup
/// reports the store as unavailable, so a database copied into place after
/// start-up is picked up without a restart.
pub struct SqliteResolver {
    path: PathBuf,
    query: String,
    conn: Mutex<Option<Connection>>,
}

impl SqliteResolver {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        check_identifier(&config.table, "Table name")?;
        check_identifier(&config.label_column, "Label column")?;

        let query = format!(
            "SELECT lat, lon, {} FROM {} WHERE mac = ?1",
            config.label_column, config.table
        );

        if config.db_path.exists() {
            info!("Reference store found at {}", config.db_path.display());
        } else {
            warn!(
                "Reference store {} not found; every lookup will miss until it exists",
                config.db_path.display()
            );
        }

        Ok(Self {
            path: config.db_path.clone(),
            query,
            conn: Mutex::new(None),
        })
    }

    fn open(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        info!("Opened reference store {}", self.path.display());
        Ok(conn)
    }
}

impl CoordinateResolver for SqliteResolver {
    fn lookup(&self, key: &str) -> Result<Option<AccessPointRecord>> {
        let mut guard = self.conn.lock();

        if !self.path.exists() {
            *guard = None;
            return Err(WifiLocError::StoreUnavailable(format!(
                "database file {} not found",
                self.path.display()
            )));
        }

        if guard.is_none() {
            *guard = Some(self.open()?);
        }
        let Some(conn) = guard.as_ref() else {
            return Err(WifiLocError::StoreUnavailable(
                "connection not initialised".to_string(),
            ));
        };

        let mut stmt = conn.prepare_cached(&self.query)?;
        let record = stmt
            .query_row(params![key], |row| {
                Ok(AccessPointRecord {
                    lat: row.get(0)?,
                    lon: row.get(1)?,
                    label: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                })
            })
            .optional()?;

        Ok(record)
    }
}

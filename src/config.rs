use crate::error::WifiLocError;
use crate::resolver::sqlite::is_sql_identifier;
use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub enable_tls: bool,
    pub tls_cert: Option<PathBuf>,
    pub tls_key: Option<PathBuf>,
    pub cors_allowed_origins: Vec<String>,
}

/// Location of the access-point reference table
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub table: String,
    pub label_column: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("wifi_map.db"),
            table: "access_points".to_string(),
            label_column: "ssid".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let enable_tls = parse_env("WIFILOC_API_ENABLE_TLS", false)?;

        // Parse CORS allowed origins (comma-separated list)
        let cors_allowed_origins = env::var("WIFILOC_API_CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>();

        let api = ApiConfig {
            bind_addr: parse_env(
                "WIFILOC_API_BIND_ADDR",
                "0.0.0.0:8000".parse().context("Invalid default bind address")?,
            )?,
            enable_tls,
            tls_cert: if enable_tls {
                Some(parse_env_path_required("WIFILOC_API_TLS_CERT")?)
            } else {
                env::var("WIFILOC_API_TLS_CERT").ok().map(PathBuf::from)
            },
            tls_key: if enable_tls {
                Some(parse_env_path_required("WIFILOC_API_TLS_KEY")?)
            } else {
                env::var("WIFILOC_API_TLS_KEY").ok().map(PathBuf::from)
            },
            cors_allowed_origins,
        };

        let defaults = StoreConfig::default();
        let store = StoreConfig {
            db_path: parse_env_path(
                "WIFILOC_STORE_DB_PATH",
                &defaults.db_path.to_string_lossy(),
            )?,
            table: env::var("WIFILOC_STORE_TABLE").unwrap_or(defaults.table),
            label_column: env::var("WIFILOC_STORE_LABEL_COLUMN")
                .unwrap_or(defaults.label_column),
        };

        Ok(Config { api, store })
    }

    pub fn validate(&self) -> Result<()> {
        // The database file itself may be missing: lookups then miss
        if !is_sql_identifier(&self.store.table) {
            return Err(WifiLocError::ConfigError(format!(
                "WIFILOC_STORE_TABLE '{}' is not a valid table name",
                self.store.table
            ))
            .into());
        }
        if !is_sql_identifier(&self.store.label_column) {
            return Err(WifiLocError::ConfigError(format!(
                "WIFILOC_STORE_LABEL_COLUMN '{}' is not a valid column name",
                self.store.label_column
            ))
            .into());
        }

        if self.api.cors_allowed_origins.is_empty() {
            return Err(WifiLocError::ConfigError(
                "WIFILOC_API_CORS_ALLOWED_ORIGINS must list at least one origin or '*'"
                    .to_string(),
            )
            .into());
        }

        // Validate TLS certificate paths exist if TLS is enabled
        if self.api.enable_tls {
            match self.api.tls_cert {
                Some(ref cert) if !cert.exists() => {
                    return Err(WifiLocError::ConfigError(format!(
                        "API TLS certificate not found: {:?}",
                        cert
                    ))
                    .into());
                }
                Some(_) => {}
                None => {
                    return Err(WifiLocError::ConfigError(
                        "TLS enabled but WIFILOC_API_TLS_CERT not set".to_string(),
                    )
                    .into());
                }
            }

            match self.api.tls_key {
                Some(ref key) if !key.exists() => {
                    return Err(WifiLocError::ConfigError(format!(
                        "API TLS key not found: {:?}",
                        key
                    ))
                    .into());
                }
                Some(_) => {}
                None => {
                    return Err(WifiLocError::ConfigError(
                        "TLS enabled but WIFILOC_API_TLS_KEY not set".to_string(),
                    )
                    .into());
                }
            }
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    env::var(key)
        .ok()
        .map(|s| {
            s.parse().map_err(|e| {
                anyhow::anyhow!("Failed to parse {}: {}", key, e)
            })
        })
        .transpose()
        .map(|opt| opt.unwrap_or(default))
}

fn parse_env_path(key: &str, default: &str) -> Result<PathBuf> {
    Ok(env::var(key).unwrap_or_else(|_| default.to_string()).into())
}

fn parse_env_path_required(key: &str) -> Result<PathBuf> {
    env::var(key)
        .context(format!("{} must be set", key))
        .map(PathBuf::from)
}

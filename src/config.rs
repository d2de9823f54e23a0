use std::env;

use chrono::FixedOffset;
use thiserror::Error;

use crate::utils::parse_offset;

const DATABASE_URL_VARS: [&str; 3] = ["DATABASE_PUBLIC_URL", "DATABASE_URL_PUBLIC", "DATABASE_URL"];

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("one of DATABASE_PUBLIC_URL, DATABASE_URL_PUBLIC or DATABASE_URL must be set")]
    MissingDatabaseUrl,
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub db_schema: String,
    pub zone: FixedOffset,
    pub port: u16,
    pub max_connections: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = DATABASE_URL_VARS
            .iter()
            .find_map(|name| value(*name))
            .ok_or(ConfigError::MissingDatabaseUrl)?;

        let db_schema = value("DB_SCHEMA").unwrap_or_else(|| "bd_marcenaria".to_string());
        if !is_identifier(&db_schema) {
            return Err(ConfigError::Invalid {
                name: "DB_SCHEMA",
                value: db_schema,
            });
        }

        let zone = match value("APP_UTC_OFFSET") {
            Some(raw) => parse_offset(&raw).ok_or(ConfigError::Invalid {
                name: "APP_UTC_OFFSET",
                value: raw,
            })?,
            // America/Fortaleza, no daylight saving
            None => FixedOffset::west_opt(3 * 3600).ok_or(ConfigError::Invalid {
                name: "APP_UTC_OFFSET",
                value: "-03:00".to_string(),
            })?,
        };

        let port = parse_number(value("PORT"), "PORT", 3000)?;
        let max_connections = parse_number(value("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5)?;

        Ok(Self {
            database_url,
            db_schema,
            zone,
            port,
            max_connections,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_number<T: std::str::FromStr>(
    raw: Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

/// Schema names are interpolated into SQL, so only plain identifiers pass.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

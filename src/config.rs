//! Runtime configuration, read once before any page is fetched.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use eyre::{bail, eyre, Result};
use tracing::error;

const REQUIRED: [&str; 3] = ["POSTGRES_USER", "POSTGRES_PASSWORD", "POSTGRES_DB"];
const DEFAULT_LOG_FILE: &str = "logs.log";

/// Resolves only the log file path.
///
/// Needs no credentials, so the log can be opened before `Config` is loaded
/// and a configuration failure still ends up in it.
pub fn log_file_from_lookup<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("SCRAPER_LOG_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_host: String,
    pub db_port: u16,
    pub db_max_connections: u32,
    /// File the diagnostic log is appended to.
    pub log_file: PathBuf,
    /// Upper bound on units running at once. `None` runs every URL at once.
    pub concurrency: Option<usize>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// Any missing database credential is an error; the caller is expected
    /// to stop before doing any work.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn log_file_from_env() -> PathBuf {
        log_file_from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env` over an arbitrary key lookup. Failures are logged
    /// before they are returned.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load(&lookup).map_err(|e| {
            error!("Invalid configuration: {e}");
            e
        })
    }

    fn load<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let missing: Vec<&str> = REQUIRED
            .iter()
            .copied()
            .filter(|key| lookup(key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!(
                "One or more environment variables are not set: {}",
                missing.join(", ")
            );
        }
        let required = |key: &str| lookup(key).ok_or_else(|| eyre!("{key} is not set"));

        let concurrency = parse_optional::<usize>(lookup, "SCRAPER_CONCURRENCY")?;
        if concurrency == Some(0) {
            bail!("SCRAPER_CONCURRENCY must be at least 1");
        }

        Ok(Self {
            db_user: required("POSTGRES_USER")?,
            db_password: required("POSTGRES_PASSWORD")?,
            db_name: required("POSTGRES_DB")?,
            db_host: lookup("POSTGRES_HOST").unwrap_or_else(|| "localhost".into()),
            db_port: parse_optional(lookup, "POSTGRES_PORT")?.unwrap_or(5432),
            db_max_connections: parse_optional(lookup, "POSTGRES_MAX_CONNECTIONS")?.unwrap_or(10),
            log_file: log_file_from_lookup(lookup),
            concurrency,
        })
    }
}

fn parse_optional<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| eyre!("{key} has invalid value {raw:?}: {e}"))
        })
        .transpose()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_user", &self.db_user)
            .field("db_password", &"<redacted>")
            .field("db_name", &self.db_name)
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_max_connections", &self.db_max_connections)
            .field("log_file", &self.log_file)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

//! Configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Where listing rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBackend {
    /// Direct PostgreSQL connection (`DATABASE_URL`).
    Postgres,
    /// PostgREST-compatible HTTP API (`DATA_API_URL`).
    Rest,
    /// In-process rows, optionally seeded from `SEED_FILE`.
    Memory,
}

impl FromStr for DataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "rest" | "http" => Ok(Self::Rest),
            "memory" => Ok(Self::Memory),
            other => bail!("unknown data backend '{other}' (expected postgres, rest or memory)"),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Selected data backend. Inferred from the other settings when
    /// `DATA_BACKEND` is unset.
    pub backend: DataBackend,

    /// PostgreSQL connection URL.
    pub database_url: Option<String>,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Base URL of the hosted data API.
    pub data_api_url: Option<String>,

    /// Key sent as `apikey` and bearer token to the data API.
    pub data_api_key: Option<String>,

    /// JSON seed document for the memory backend.
    pub seed_file: Option<PathBuf>,

    /// TOML file with listing overrides.
    pub listings_file: Option<PathBuf>,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url = var("DATABASE_URL").filter(|v| !v.is_empty());

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let data_api_url = var("DATA_API_URL").filter(|v| !v.is_empty());
        let data_api_key = var("DATA_API_KEY").filter(|v| !v.is_empty());
        let seed_file = var("SEED_FILE").filter(|v| !v.is_empty()).map(PathBuf::from);
        let listings_file = var("LISTINGS_FILE")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        let cors_allowed_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|| vec!["*".to_string()]);

        let backend = match var("DATA_BACKEND").filter(|v| !v.is_empty()) {
            Some(name) => name.parse().context("invalid DATA_BACKEND")?,
            None if database_url.is_some() => DataBackend::Postgres,
            None if data_api_url.is_some() => DataBackend::Rest,
            None => DataBackend::Memory,
        };

        match backend {
            DataBackend::Postgres if database_url.is_none() => {
                bail!("DATABASE_URL environment variable is required for the postgres backend")
            }
            DataBackend::Rest if data_api_url.is_none() => {
                bail!("DATA_API_URL environment variable is required for the rest backend")
            }
            _ => {}
        }

        Ok(Self {
            port,
            backend,
            database_url,
            database_max_connections,
            data_api_url,
            data_api_key,
            seed_file,
            listings_file,
            cors_allowed_origins,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_memory() {
        let config = load(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.backend, DataBackend::Memory);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.cors_allowed_origins, vec!["*"]);
    }

    #[test]
    fn backend_is_inferred() {
        let pg = load(&[("DATABASE_URL", "postgres://localhost/trailhub")]).unwrap();
        assert_eq!(pg.backend, DataBackend::Postgres);

        let rest = load(&[("DATA_API_URL", "https://example.com/rest/v1")]).unwrap();
        assert_eq!(rest.backend, DataBackend::Rest);
    }

    #[test]
    fn explicit_backend_requires_its_url() {
        let err = load(&[("DATA_BACKEND", "rest")]).unwrap_err();
        assert!(err.to_string().contains("DATA_API_URL"));

        let err = load(&[("DATA_BACKEND", "mongo")]).unwrap_err();
        assert!(format!("{err:#}").contains("unknown data backend"));
    }

    #[test]
    fn explicit_backend_wins() {
        let config = load(&[
            ("DATA_BACKEND", "memory"),
            ("DATABASE_URL", "postgres://localhost/trailhub"),
            ("SEED_FILE", "seed.json"),
        ])
        .unwrap();
        assert_eq!(config.backend, DataBackend::Memory);
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn invalid_port() {
        assert!(load(&[("PORT", "http")]).is_err());
    }

    #[test]
    fn cors_origins_are_split() {
        let config = load(&[(
            "CORS_ALLOWED_ORIGINS",
            "https://a.example, https://b.example",
        )])
        .unwrap();
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}

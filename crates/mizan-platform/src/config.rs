use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use mizan_core::DEFAULT_COMPANY_ID;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => bail!("unknown STORE_BACKEND '{other}' (expected postgres or memory)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub http_addr: String,
    pub company_id: String,
    pub state_path: PathBuf,
    pub create_tables: bool,
}

impl ServiceConfig {
    pub fn from_env(default_http_addr: &str) -> Result<Self> {
        Self::from_lookup(default_http_addr, |key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(default_http_addr: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store_backend = match lookup("STORE_BACKEND") {
            Some(raw) => raw.parse().context("invalid STORE_BACKEND")?,
            None => StoreBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required for the postgres backend");
        }

        let http_addr = lookup("HTTP_ADDR").unwrap_or_else(|| default_http_addr.to_string());
        let company_id = lookup("COMPANY_ID")
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COMPANY_ID.to_string());
        let state_path = lookup("STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("mizan-state.json"));
        let create_tables = match lookup("CREATE_TABLES") {
            Some(raw) => raw
                .trim()
                .parse::<bool>()
                .context("CREATE_TABLES must be true or false")?,
            None => false,
        };

        Ok(Self {
            store_backend,
            database_url,
            http_addr,
            company_id,
            state_path,
            create_tables,
        })
    }
}

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

/// Which document store the service talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb,
    /// In-process collections, useful for local runs without a database.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(Self::MongoDb),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown store backend '{}' (expected mongodb or memory)", other),
        }
    }
}

/// When the fixture seeding runs relative to the HTTP listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedMode {
    /// Seed on a spawned task while the listener starts.
    Background,
    /// Finish seeding before accepting connections.
    Blocking,
    Skip,
}

impl FromStr for SeedMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "background" => Ok(Self::Background),
            "blocking" => Ok(Self::Blocking),
            "skip" | "off" => Ok(Self::Skip),
            other => anyhow::bail!(
                "unknown seed mode '{}' (expected background, blocking or skip)",
                other
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub mongodb_uri: String,
    pub database_name: String,
    pub host: String,
    pub port: u16,
    pub reviews_fixture: PathBuf,
    pub dealerships_fixture: PathBuf,
    pub store_backend: StoreBackend,
    pub seed_mode: SeedMode,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            mongodb_uri: env_or("MONGODB_URI", "mongodb://mongo_db:27017/"),
            database_name: env_or("MONGODB_DB", "dealershipsDB"),
            host: env_or("HOST", "0.0.0.0"),
            port: env_or("PORT", "3030")
                .parse()
                .context("PORT must be a valid number")?,
            reviews_fixture: env_or("REVIEWS_FIXTURE", "reviews.json").into(),
            dealerships_fixture: env_or("DEALERSHIPS_FIXTURE", "dealerships.json").into(),
            store_backend: env_or("STORE_BACKEND", "mongodb")
                .parse()
                .context("STORE_BACKEND is invalid")?,
            seed_mode: env_or("SEED_MODE", "background")
                .parse()
                .context("SEED_MODE is invalid")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

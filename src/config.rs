use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDb { url: String },
    InMemory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreBackend,
    pub database: String,
    pub collection: String,
    pub upload_dir: PathBuf,
    pub transcriber_url: String,
    pub transcriber_model: String,
    pub transcriber_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let env_string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let bind_addr = env_string("MEETINGS_BIND_ADDR", "127.0.0.1:8000")
            .parse::<SocketAddr>()
            .context("MEETINGS_BIND_ADDR must be a valid host:port")?;

        let store = match env_string("MEETINGS_STORE", "mongodb").trim() {
            "mongodb" => StoreBackend::MongoDb {
                url: lookup("MONGODB_DATASET_URL")
                    .filter(|url| !url.trim().is_empty())
                    .context("MONGODB_DATASET_URL is required when MEETINGS_STORE=mongodb")?,
            },
            "memory" => StoreBackend::InMemory,
            other => bail!("MEETINGS_STORE must be `mongodb` or `memory`, got `{other}`"),
        };

        Ok(Self {
            bind_addr,
            store,
            database: env_string("MEETINGS_DATABASE", "content_db"),
            collection: env_string("MEETINGS_COLLECTION", "meetings_collection"),
            upload_dir: PathBuf::from(env_string("MEETINGS_UPLOAD_DIR", "uploads")),
            transcriber_url: env_string("TRANSCRIBER_URL", "http://127.0.0.1:9000"),
            transcriber_model: env_string("TRANSCRIBER_MODEL", "base"),
            transcriber_api_key: lookup("TRANSCRIBER_API_KEY").filter(|key| !key.is_empty()),
        })
    }
}

use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "snapfeed", about = "A small photo-sharing feed")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Name of the bucket uploaded photos are stored in
    #[arg(long, env = "CLOUD_STORAGE_BUCKET")]
    pub bucket: Option<String>,

    /// API key for the image labeling service
    #[arg(long, env = "VISION_API_KEY", hide_env_values = true)]
    pub vision_api_key: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub labeling: LabelingConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub bucket: String,
    /// Directory holding one sub-directory per bucket
    pub path: Option<PathBuf>,
    pub max_upload_mb: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LabelingConfig {
    pub endpoint: String,
    /// Labeling is disabled when no key is configured
    pub api_key: Option<String>,
    pub max_results: u32,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8083,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: "snapfeed-uploads".to_string(),
            path: None,
            max_upload_mb: 10,
        }
    }
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            api_key: None,
            max_results: 10,
            timeout_secs: 30,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "snapfeed_session".to_string(),
            session_hours: 720,
        }
    }
}

impl Config {
    /// Defaults, then the TOML file, then CLI flags and environment.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        };

        config.apply_cli(cli);
        config.resolve_paths(&data_dir);

        if config.storage.bucket.trim().is_empty() {
            anyhow::bail!("storage.bucket must not be empty");
        }
        Ok(config)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref host) = cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref bucket) = cli.bucket {
            self.storage.bucket = bucket.clone();
        }
        if let Some(ref key) = cli.vision_api_key {
            self.labeling.api_key = Some(key.clone());
        }
    }

    /// Unset paths live under the data directory.
    fn resolve_paths(&mut self, data_dir: &Path) {
        self.database
            .path
            .get_or_insert_with(|| data_dir.join("snapfeed.db"));
        self.storage
            .path
            .get_or_insert_with(|| data_dir.join("buckets"));
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".snapfeed")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("snapfeed.db"))
    }

    pub fn buckets_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("buckets"))
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.storage.max_upload_mb * 1024 * 1024
    }
}

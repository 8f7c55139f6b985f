#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod duration;

pub use app_config::get_config_dir;
pub use args::Args;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    net::{
        IpAddr,
        SocketAddr,
    },
    path::PathBuf,
    time::Duration,
};
use strum::{
    Display,
    EnumIter,
    EnumString,
};
use url::Url;

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub collector: CollectorConfig,
    pub http: HttpConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    pub name: String,
}

impl DatabaseConfig {
    /// HTTP endpoint of the ClickHouse server.
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Default, Clone, Copy, Display, EnumIter, EnumString, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    ClickHouse,
    Memory,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CollectorConfig {
    #[serde(default)]
    pub source_url: Option<Url>,
    #[serde(with = "duration")]
    pub interval: Duration,
    #[serde(with = "duration")]
    pub fetch_timeout: Duration,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl HttpConfig {
    pub fn listen_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Config {
    /// Layers the embedded defaults, the config file and `args` (CLI and
    /// environment), later sources winning.
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let config_file = args
            .config_file
            .clone()
            .unwrap_or_else(|| get_config_dir().join("config.yaml"));
        Self::with_config_file(args, config_file)
    }

    fn with_config_file(args: Args, config_file: PathBuf) -> Result<Self, config::ConfigError> {
        debug!(path = %config_file.display(), "reading config file");

        let required = args.config_file.is_some();
        let cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(
                config::File::from(config_file)
                    .format(config::FileFormat::Yaml)
                    .required(required),
            )
            .add_source(args)
            .build()?
            .try_deserialize()?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        let source_url = self.source_url()?;
        if !matches!(source_url.scheme(), "http" | "https") {
            return Err(config::ConfigError::Message(format!(
                "collector.source_url must be an http(s) URL, got {source_url}"
            )));
        }
        if self.collector.interval.is_zero() {
            return Err(config::ConfigError::Message(
                "collector.interval must be greater than zero".to_string(),
            ));
        }
        if self.collector.fetch_timeout.is_zero() {
            return Err(config::ConfigError::Message(
                "collector.fetch_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn source_url(&self) -> Result<&Url, config::ConfigError> {
        self.collector.source_url.as_ref().ok_or_else(|| {
            config::ConfigError::Message(
                "collector.source_url is required (--source-url or SOURCE_API_URL)".to_string(),
            )
        })
    }
}

use crate::StorageBackend;
use clap::Parser;
use std::{
    net::IpAddr,
    path::PathBuf,
};

/// Records a server's TPS/MSPT history and serves it bucketed over HTTP.
///
/// Every option can also be set through the listed environment variable or
/// through `config.yaml` in the config directory.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Endpoint returning `{tps, mspt, lastUpdated}`.
    #[arg(long, env = "SOURCE_API_URL", value_name = "URL")]
    pub source_url: Option<String>,

    /// Time between two collection cycles (e.g. "10s", "1m").
    #[arg(long, env = "TPS_HISTORY_INTERVAL", value_name = "DURATION")]
    pub interval: Option<String>,

    /// Upper bound for a single source request (e.g. "5s").
    #[arg(long, env = "TPS_HISTORY_FETCH_TIMEOUT", value_name = "DURATION")]
    pub fetch_timeout: Option<String>,

    /// Where samples are kept: "clickhouse" or "memory".
    #[arg(long, env = "TPS_HISTORY_STORAGE")]
    pub storage: Option<StorageBackend>,

    /// ClickHouse host.
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// ClickHouse HTTP port.
    #[arg(long, env = "DB_PORT")]
    pub db_port: Option<u16>,

    /// ClickHouse user.
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// ClickHouse password.
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// ClickHouse database holding the `tps_history` table.
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Address the HTTP API binds to.
    #[arg(long, env = "TPS_HISTORY_HOST")]
    pub host: Option<IpAddr>,

    /// Port the HTTP API listens on.
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Read this file instead of `config.yaml` in the config directory.
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, action)]
    pub verbose: bool,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(source_url) = &self.source_url {
                cache.insert("collector.source_url".to_string(), source_url.clone().into());
            }
            if let Some(interval) = &self.interval {
                cache.insert("collector.interval".to_string(), interval.clone().into());
            }
            if let Some(fetch_timeout) = &self.fetch_timeout {
                cache.insert("collector.fetch_timeout".to_string(), fetch_timeout.clone().into());
            }
            if let Some(storage) = &self.storage {
                cache.insert("storage.backend".to_string(), storage.to_string().into());
            }
            if let Some(db_host) = &self.db_host {
                cache.insert("database.host".to_string(), db_host.clone().into());
            }
            if let Some(db_port) = self.db_port {
                cache.insert("database.port".to_string(), u64::from(db_port).into());
            }
            if let Some(db_user) = &self.db_user {
                cache.insert("database.user".to_string(), db_user.clone().into());
            }
            if let Some(db_password) = &self.db_password {
                cache.insert("database.password".to_string(), db_password.clone().into());
            }
            if let Some(db_name) = &self.db_name {
                cache.insert("database.name".to_string(), db_name.clone().into());
            }
            if let Some(host) = &self.host {
                cache.insert("http.host".to_string(), host.to_string().into());
            }
            if let Some(port) = self.port {
                cache.insert("http.port".to_string(), u64::from(port).into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "{}

Config directory: {config_dir_path}",
        clap::crate_version!()
    )
}

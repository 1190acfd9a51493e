//! Settings for the application.
//!
//! Read from `config/kas.toml` (or the file given with `--config`), then
//! overridden by `KAS_*` environment variables, e.g. `KAS_SERVER__PORT=8080`.
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/kas.toml";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA name of the calendar used for months and display strings.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "Asia/Jakarta".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            database: Database::Memory,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Attachments {
    pub root: String,
    pub public_base_url: String,
    pub upload_preset: String,
    pub max_bytes: u64,
}

impl Default for Attachments {
    fn default() -> Self {
        Self {
            root: "uploads".to_string(),
            public_base_url: "http://127.0.0.1:3000/uploads".to_string(),
            upload_preset: "kas".to_string(),
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub attachments: Attachments,
}

#[derive(Debug, Parser)]
#[command(name = "kas", about = "Cash ledger server")]
struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    config: Option<String>,
    /// Override the listening port.
    #[arg(long)]
    port: Option<u16>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let mut settings = Self::load(args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH))?;
        if let Some(port) = args.port {
            settings.server.port = port;
        }
        Ok(settings)
    }

    fn load(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("KAS")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

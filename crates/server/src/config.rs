use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

pub const CONFIG_VERSION: u32 = 1;
const DEFAULT_PORT: u16 = 8888;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub version: u32,
    pub port: u16,
    pub bind_addr: String,
    pub data_dir: String,
    pub app_dir: String,
    pub index_file: String,
    pub extensions: Vec<String>,
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            port: DEFAULT_PORT,
            bind_addr: "0.0.0.0".to_string(),
            data_dir: "../data".to_string(),
            app_dir: "../app".to_string(),
            index_file: library::DEFAULT_INDEX_FILE.to_string(),
            extensions: vec![
                ".webm".to_string(),
                ".mp4".to_string(),
                ".ogg".to_string(),
                ".mov".to_string(),
            ],
            verbose: false,
        }
    }
}

/// Command-line overrides for the config file.
#[derive(Parser, Debug, Default)]
#[command(name = "vidshelf", about = "Serve a directory of videos with ratings and tags")]
pub struct CliArgs {
    /// Config file (created with defaults when missing)
    #[arg(long, env = "VIDSHELF_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP port
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory holding the media files and the index
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Directory holding the browser UI
    #[arg(long)]
    pub app: Option<PathBuf>,

    /// Log at debug level
    #[arg(long)]
    pub verbose: bool,
}

/// Everything the server needs at startup, assembled once.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub app_dir: PathBuf,
    pub index_file: String,
    pub extensions: Vec<String>,
    pub verbose: bool,
}

impl Settings {
    pub fn resolve(args: &CliArgs, config: &ServerConfig, config_path: &Path) -> Self {
        let port = args
            .port
            .filter(|port| *port != 0)
            .unwrap_or(if config.port == 0 { DEFAULT_PORT } else { config.port });
        let bind_addr = match config.bind_addr.trim() {
            "" => "0.0.0.0".to_string(),
            value => value.to_string(),
        };
        let index_file = match config.index_file.trim() {
            "" => library::DEFAULT_INDEX_FILE.to_string(),
            value => value.to_string(),
        };
        Self {
            port,
            bind_addr,
            data_dir: args
                .data
                .clone()
                .unwrap_or_else(|| resolve_path(config_path, &config.data_dir)),
            app_dir: args
                .app
                .clone()
                .unwrap_or_else(|| resolve_path(config_path, &config.app_dir)),
            index_file,
            extensions: config.extensions.clone(),
            verbose: args.verbose || config.verbose,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "io error: {}", err),
            ConfigError::Yaml(err) => write!(f, "yaml error: {}", err),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Yaml(err)
    }
}

pub fn default_config_path() -> PathBuf {
    match env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(|dir| dir.join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from("config.yaml")),
        Err(_) => PathBuf::from("config.yaml"),
    }
}

pub fn load_or_create_config(path: &Path) -> Result<(ServerConfig, bool), ConfigError> {
    if path.exists() {
        let contents = fs::read_to_string(path)?;
        let mut config: ServerConfig = serde_yaml::from_str(&contents)?;
        if config.version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
        }
        return Ok((config, false));
    }

    let config = ServerConfig::default();
    save_config(path, &config)?;
    Ok((config, true))
}

pub fn save_config(path: &Path, config: &ServerConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_yaml::to_string(config)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn resolve_path(config_path: &Path, value: &str) -> PathBuf {
    let raw = PathBuf::from(value.trim());
    if raw.is_absolute() {
        return raw;
    }
    let base = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    base.join(raw)
}

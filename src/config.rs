// src/config.rs
use serde::{Serialize, Deserialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use log::{info, warn};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Argon2Params {
    pub m_cost: u32, // KiB
    pub t_cost: u32, // iterations
    pub p_cost: u32, // parallelism
}

impl Default for Argon2Params {
    fn default() -> Self {
        Argon2Params {
            m_cost: 19456, // 19 MiB (19 * 1024 KiB)
            t_cost: 2,
            p_cost: 1,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EncodingScheme {
    #[default]
    Base64,
    Sealed,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct EncodingConfig {
    pub scheme: EncodingScheme,
    /// Hex salt for the sealed scheme, generated on first use.
    pub salt: Option<String>,
    /// Argon2id PHC string of the passphrase, generated on first use.
    pub verifier: Option<String>,
    pub argon2_params: Argon2Params,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    pub api: ApiConfig,
    pub encoding: EncodingConfig,
    pub clipboard_clear_time_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api: ApiConfig::default(),
            encoding: EncodingConfig::default(),
            clipboard_clear_time_seconds: 30,
        }
    }
}

pub fn get_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "PassmanRemote", "PassmanRemote").map(|proj_dirs| {
        let config_dir = proj_dirs.config_dir();
        config_dir.join("passman_config.toml")
    })
}

pub fn save_config(config_path: &Path, config: &Config) -> Result<(), String> {
    info!("Attempting to save config to {:?}", config_path);
    if let Some(parent_dir) = config_path.parent() {
        if !parent_dir.exists() {
            fs::create_dir_all(parent_dir)
                .map_err(|e| format!("Failed to create config directory {:?}: {}", parent_dir, e))?;
            info!("Created config directory: {:?}", parent_dir);
        }
    }

    let toml_string = toml::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config to TOML: {}", e))?;

    let mut file = fs::File::create(config_path)
        .map_err(|e| format!("Failed to create config file {:?}: {}", config_path, e))?;

    file.write_all(toml_string.as_bytes())
        .map_err(|e| format!("Failed to write config to {:?}: {}", config_path, e))?;

    info!("Saved configuration to {:?}", config_path);
    Ok(())
}

/// Reads the config at `config_path`, writing defaults there if it is missing.
/// Unreadable or malformed files fall back to defaults.
pub fn load_config_from(config_path: &Path) -> Config {
    if !config_path.exists() {
        info!(
            "Config file not found at {:?}. Creating and using default configuration.",
            config_path
        );
        let default_config = Config::default();
        if let Err(e) = save_config(config_path, &default_config) {
            warn!("Failed to save default configuration: {}", e);
        }
        return default_config;
    }

    info!("Loading configuration from {:?}", config_path);
    match fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(loaded_config) => {
                info!("Configuration loaded successfully.");
                loaded_config
            }
            Err(e) => {
                warn!(
                    "Failed to parse config file at {:?}: {}. Using default configuration.",
                    config_path, e
                );
                Config::default()
            }
        },
        Err(e) => {
            warn!(
                "Failed to read config file at {:?}: {}. Using default configuration.",
                config_path, e
            );
            Config::default()
        }
    }
}

pub fn load_config() -> (Config, Option<PathBuf>) {
    match get_config_path() {
        Some(config_path) => {
            let config = load_config_from(&config_path);
            (config, Some(config_path))
        }
        None => {
            warn!("Could not determine config directory. Using default configuration.");
            (Config::default(), None)
        }
    }
}

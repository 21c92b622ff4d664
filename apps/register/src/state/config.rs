//! # Configuration State
//!
//! Register configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SABORES_*`)
//! 2. Config file (`register.toml` in the platform config directory)
//! 3. Defaults (this file)
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use sabores_core::checkout::DEFAULT_SHIPPING_FEE;
use sabores_core::{Money, StoreInfo};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "register.toml";

/// Narrowest receipt the printer layout supports.
pub const MIN_PAPER_WIDTH: usize = 32;

/// Errors while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Register configuration.
///
/// Every field has a default, so a partial `register.toml` is enough.
/// Unknown keys are rejected. IVA is fixed at 19% and is not a setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct RegisterConfig {
    /// Receipt header
    pub store_name: String,
    pub store_rut: String,
    pub store_address: String,
    pub store_phone: Option<String>,
    pub store_website: Option<String>,

    /// Flat home-delivery fee in pesos
    pub shipping_fee: i64,

    /// Base URL of the REST backend
    pub backend_url: String,

    /// Bearer token for the REST backend. Without one the register runs
    /// its demo against the in-memory backend.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,

    /// Terminal name; its last two characters go into the folio
    pub terminal_name: String,

    /// Receipt width in characters (typically 32, 42 or 48)
    pub paper_width: usize,
}

impl Default for RegisterConfig {
    fn default() -> Self {
        let store = StoreInfo::default();
        RegisterConfig {
            store_name: store.name,
            store_rut: store.rut,
            store_address: store.address,
            store_phone: store.phone,
            store_website: store.website,
            shipping_fee: DEFAULT_SHIPPING_FEE.pesos(),
            backend_url: "http://localhost:8080/api".to_string(),
            access_token: None,
            terminal_name: "CAJA-01".to_string(),
            paper_width: 42,
        }
    }
}

impl RegisterConfig {
    /// Loads configuration from every source and validates it.
    ///
    /// A missing config file is not an error; an unreadable or invalid one is.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            Some(path) => {
                debug!(?path, "No config file, using defaults");
                RegisterConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                RegisterConfig::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        info!(terminal = %config.terminal_name, backend = %config.backend_url, "Configuration loaded");
        Ok(config)
    }

    /// Platform config file location.
    ///
    /// - **Linux**: `~/.config/1000sabores/register.toml`
    /// - **macOS**: `~/Library/Application Support/cl.1000sabores.register/register.toml`
    /// - **Windows**: `%APPDATA%\1000sabores\register\config\register.toml`
    ///
    /// `SABORES_CONFIG` overrides the location.
    pub fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SABORES_CONFIG") {
            return Some(PathBuf::from(path));
        }

        ProjectDirs::from("cl", "1000sabores", "register")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Reads a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&raw)
    }

    /// Parses TOML; absent keys keep their defaults.
    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Overlays `SABORES_*` variables.
    ///
    /// ## Environment Variables
    /// - `SABORES_STORE_NAME`, `SABORES_STORE_RUT`, `SABORES_STORE_ADDRESS`
    /// - `SABORES_BACKEND_URL`, `SABORES_ACCESS_TOKEN`, `SABORES_TERMINAL`
    /// - `SABORES_SHIPPING_FEE`, `SABORES_PAPER_WIDTH`
    ///
    /// Unparseable numbers are logged and ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SABORES_STORE_NAME") {
            self.store_name = v;
        }
        if let Some(v) = lookup("SABORES_STORE_RUT") {
            self.store_rut = v;
        }
        if let Some(v) = lookup("SABORES_STORE_ADDRESS") {
            self.store_address = v;
        }
        if let Some(v) = lookup("SABORES_BACKEND_URL") {
            self.backend_url = v;
        }
        if let Some(v) = lookup("SABORES_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.access_token = Some(v);
        }
        if let Some(v) = lookup("SABORES_TERMINAL") {
            self.terminal_name = v;
        }
        if let Some(v) = parse_env(&lookup, "SABORES_SHIPPING_FEE") {
            self.shipping_fee = v;
        }
        if let Some(v) = parse_env(&lookup, "SABORES_PAPER_WIDTH") {
            self.paper_width = v;
        }
    }

    /// Rejects values the rest of the register cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shipping_fee < 0 {
            return Err(ConfigError::Invalid {
                field: "shipping_fee",
                reason: "must not be negative".to_string(),
            });
        }

        if self.paper_width < MIN_PAPER_WIDTH {
            return Err(ConfigError::Invalid {
                field: "paper_width",
                reason: format!("must be at least {} columns", MIN_PAPER_WIDTH),
            });
        }

        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "backend_url",
                reason: "must not be blank".to_string(),
            });
        }

        if self.store_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "store_name",
                reason: "must not be blank".to_string(),
            });
        }

        Ok(())
    }

    /// Receipt header.
    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            name: self.store_name.clone(),
            rut: self.store_rut.clone(),
            address: self.store_address.clone(),
            phone: self.store_phone.clone(),
            website: self.store_website.clone(),
        }
    }

    pub fn shipping_fee(&self) -> Money {
        Money::from_pesos(self.shipping_fee)
    }
}

fn parse_env<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

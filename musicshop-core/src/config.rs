use std::{
    env::{self, VarError},
    fs::{self, File},
    path::{Path, PathBuf},
    time::Duration,
};

use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};

use crate::{error::Error, product::Price};

const APP_NAME: &str = "MusicShop";
const CONFIG_FILENAME: &str = "config.json";
const CLIENT_ID_ENV_VAR: &str = "SPOTIFY_CLIENT_ID";
const CLIENT_SECRET_ENV_VAR: &str = "SPOTIFY_CLIENT_SECRET";
const PROXY_ENV_VAR: &str = "HTTPS_PROXY";

pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_BASE: &str = "https://api.spotify.com/";

// The catalog carries no pricing or inventory.  Every release is sold at the
// same placeholder price and stock until a real source exists.
pub const PLACEHOLDER_PRICE: Price = Price::from_cents(3500);
pub const PLACEHOLDER_STOCK: u32 = 10;

pub const DEFAULT_RELEASE_LIMIT: usize = 50;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub api_base: String,
    /// Page size of the release listing.  Only the first page is fetched.
    pub release_limit: usize,
    pub pricing: Pricing,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub proxy_url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            release_limit: DEFAULT_RELEASE_LIMIT,
            pricing: Pricing::default(),
            timeout_secs: 5,
            proxy_url: None,
        }
    }
}

impl Config {
    fn app_dirs() -> Option<AppDirs> {
        const USE_XDG_ON_MACOS: bool = false;

        AppDirs::new(Some(APP_NAME), USE_XDG_ON_MACOS)
    }

    pub fn config_dir() -> Option<PathBuf> {
        Self::app_dirs().map(|dirs| dirs.config_dir)
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join(CONFIG_FILENAME))
    }

    /// Loads the config file from the platform config directory, falling back
    /// to defaults when there is none, then applies environment overrides.
    pub fn load() -> Result<Config, Error> {
        let config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Config::default(),
        };
        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &Path) -> Result<Config, Error> {
        log::info!("loading config: {:?}", path);
        let file = File::open(path)?;
        Ok(serde_json::from_reader(file)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), Error> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(id) = read_env(CLIENT_ID_ENV_VAR) {
            self.client_id = id;
        }
        if let Some(secret) = read_env(CLIENT_SECRET_ENV_VAR) {
            self.client_secret = secret;
        }
        if self.proxy_url.is_none() {
            self.proxy_url = read_env(PROXY_ENV_VAR);
        }
        self
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn read_env(name: &str) -> Option<String> {
    env::var(name).map_or_else(
        |err| match err {
            VarError::NotPresent => None,
            VarError::NotUnicode(_) => {
                log::error!("{} is not a valid unicode", name);
                None
            }
        },
        Some,
    )
}

/// Placeholder commercial terms applied to every catalog release.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pricing {
    pub price: Price,
    pub stock: u32,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            price: PLACEHOLDER_PRICE,
            stock: PLACEHOLDER_STOCK,
        }
    }
}

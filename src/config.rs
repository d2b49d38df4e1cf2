use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::app::FormPresentation;
use crate::db::PgStore;
use crate::entities::Coordinates;
use crate::error::{config_error, Error};
use crate::location::LocationSource;
use crate::storage::{DynStore, FileStore, MemoryStore};
use crate::store::DEFAULT_KEY;
use crate::viewport::ViewportConfig;

#[derive(Clone, Debug, PartialEq)]
pub enum StorageConfig {
    Memory,
    File(PathBuf),
    Postgres(String),
}

impl StorageConfig {
    fn parse(raw: &str) -> Result<Self, Error> {
        if raw == "memory" {
            return Ok(Self::Memory);
        }

        if let Some(dir) = raw.strip_prefix("file:") {
            if dir.is_empty() {
                return Err(config_error("PLACEKEEPER_STORAGE: empty file path"));
            }
            return Ok(Self::File(dir.into()));
        }

        if raw.starts_with("postgres://") || raw.starts_with("postgresql://") {
            return Ok(Self::Postgres(raw.into()));
        }

        Err(config_error(format!("PLACEKEEPER_STORAGE: unsupported value {:?}", raw)))
    }

    pub async fn open(&self) -> Result<DynStore, Error> {
        let store: DynStore = match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::File(dir) => Arc::new(FileStore::new(dir.clone()).await?),
            Self::Postgres(uri) => Arc::new(PgStore::new(uri, 5).await?),
        };

        Ok(store)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub storage: StorageConfig,
    pub storage_key: String,
    pub location: LocationSource,
    pub location_timeout: Duration,
    pub save_form: FormPresentation,
    pub viewport: ViewportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::File(".placekeeper".into()),
            storage_key: DEFAULT_KEY.into(),
            location: LocationSource::Simulated,
            location_timeout: Duration::from_secs(10),
            save_form: FormPresentation::Modal,
            viewport: ViewportConfig::default(),
        }
    }
}

impl Config {
    /// Reads `PLACEKEEPER_*` variables, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_vars(|name| env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup("PLACEKEEPER_STORAGE") {
            config.storage = StorageConfig::parse(raw.trim())?;
        }

        if let Some(key) = lookup("PLACEKEEPER_STORAGE_KEY") {
            if key.trim().is_empty() {
                return Err(config_error("PLACEKEEPER_STORAGE_KEY: empty"));
            }
            config.storage_key = key;
        }

        if let Some(raw) = lookup("PLACEKEEPER_LOCATION") {
            config.location = parse_location(raw.trim())?;
        }

        if let Some(raw) = lookup("PLACEKEEPER_LOCATION_TIMEOUT_MS") {
            let ms: u64 = raw
                .trim()
                .parse()
                .map_err(|_| config_error("PLACEKEEPER_LOCATION_TIMEOUT_MS: not a number"))?;
            config.location_timeout = Duration::from_millis(ms);
        }

        if let Some(raw) = lookup("PLACEKEEPER_SAVE_FORM") {
            config.save_form = match raw.trim() {
                "modal" => FormPresentation::Modal,
                "sheet" => FormPresentation::BottomSheet,
                other => {
                    return Err(config_error(format!(
                        "PLACEKEEPER_SAVE_FORM: unsupported value {:?}",
                        other
                    )))
                }
            };
        }

        Ok(config)
    }
}

fn parse_location(raw: &str) -> Result<LocationSource, Error> {
    match raw {
        "simulated" => return Ok(LocationSource::Simulated),
        "google" => return Ok(LocationSource::GoogleGeolocation),
        _ => {}
    }

    let invalid = || config_error(format!("PLACEKEEPER_LOCATION: unsupported value {:?}", raw));

    let pair = raw.strip_prefix("fixed:").ok_or_else(invalid)?;
    let (lat, lon) = pair.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lon: f64 = lon.trim().parse().map_err(|_| invalid())?;

    let coordinates = Coordinates::new(lat, lon);
    if !coordinates.is_valid() {
        return Err(invalid());
    }

    Ok(LocationSource::Fixed(coordinates))
}

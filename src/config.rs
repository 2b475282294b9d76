//! # Configuration Management
//!
//! Loads `sunmap-config.toml`: raster size, ephemeris mode, ASCII preview
//! size, and an optional observer position to mark on the map.

use crate::{Degrees, Observer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sunmap-config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config file format: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialise config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Raster too small to project a terminator onto
    #[error("{section} raster must be at least 2x2, got {width}x{height}")]
    Raster {
        section: &'static str,
        width: u32,
        height: u32,
    },
}

/// Application configuration loaded from sunmap-config.toml
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Raster image output
    pub map: MapConfig,
    /// Terminal preview
    pub ascii: AsciiConfig,
    /// Position marker, usually the last GPS fix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observer: Option<Observer>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MapConfig {
    /// Raster width in pixels (360° of longitude)
    pub width: u32,
    /// Raster height in pixels (180° of latitude)
    pub height: u32,
    /// Apply nutation and aberration (apparent position) instead of the
    /// geometric one
    pub apparent: bool,
    /// Where the PBM image is written
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AsciiConfig {
    pub columns: u32,
    pub rows: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map: MapConfig {
                width: 720,
                height: 360,
                apparent: true,
                output: "sunmap.pbm".to_string(),
            },
            ascii: AsciiConfig {
                columns: 72,
                rows: 36,
            },
            observer: None,
        }
    }
}

impl Config {
    /// Load configuration from sunmap-config.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(config) => {
                log::info!("Loaded configuration from {}", path.display());
                config
            }
            Err(ConfigError::Io(_)) => {
                log::info!(
                    "No config file at {}, using default configuration",
                    path.display()
                );
                Self::default()
            }
            Err(e) => {
                log::warn!("{}: {}", path.display(), e);
                log::warn!("Using default configuration");
                Self::default()
            }
        }
    }

    /// Load and validate, reporting every failure to the caller.
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Both rasters must be at least 2x2.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let rasters = [
            ("map", self.map.width, self.map.height),
            ("ascii", self.ascii.columns, self.ascii.rows),
        ];
        for (section, width, height) in rasters {
            if width < 2 || height < 2 {
                return Err(ConfigError::Raster {
                    section,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }

    /// Save current configuration as pretty TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        log::info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Observer marker, if one is configured with a sane latitude.
    pub fn observer(&self) -> Option<Observer> {
        self.observer
            .filter(|o| (-90.0..=90.0).contains(&o.latitude.0) && o.longitude.0.is_finite())
            .map(|o| Observer {
                latitude: o.latitude,
                // Fold into [-180, 180)
                longitude: Degrees((o.longitude.0 + 180.0).rem_euclid(360.0) - 180.0),
            })
    }
}

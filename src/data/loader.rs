//! RON data loader
//!
//! Loads tuning data from external RON files, with fallback to hardcoded defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use super::bosses::{default_boss_templates, BossTemplates};
use super::config::SimConfig;
use super::enemies::{default_enemy_templates, EnemyTemplates};

pub const CONFIG_FILE: &str = "config.ron";
pub const ENEMIES_FILE: &str = "enemies.ron";
pub const BOSSES_FILE: &str = "bosses.ron";

/// Errors raised while reading or writing data files
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to serialize {name}: {source}")]
    Serialize {
        name: &'static str,
        #[source]
        source: ron::Error,
    },
}

/// Manages all external simulation data
#[derive(Debug, Clone, Default)]
pub struct DataManager {
    pub config: SimConfig,
    pub enemies: EnemyTemplates,
    pub bosses: BossTemplates,
}

impl DataManager {
    /// Load every table from `dir`, falling back per file to defaults
    pub fn load(dir: &Path) -> Self {
        Self {
            config: load_or_default(dir, CONFIG_FILE, SimConfig::default),
            enemies: load_or_default(dir, ENEMIES_FILE, default_enemy_templates),
            bosses: load_or_default(dir, BOSSES_FILE, default_boss_templates),
        }
    }

    /// Parse one RON file strictly
    pub fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
        let content = fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        ron::from_str(&content).map_err(|source| DataError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn enemy_templates(&self) -> &EnemyTemplates {
        &self.enemies
    }

    pub fn boss_templates(&self) -> &BossTemplates {
        &self.bosses
    }
}

fn load_or_default<T: DeserializeOwned>(dir: &Path, file: &str, fallback: impl FnOnce() -> T) -> T {
    let path = dir.join(file);
    if !path.exists() {
        log::debug!("{} not found, using defaults", path.display());
        return fallback();
    }
    match DataManager::read_file(&path) {
        Ok(value) => {
            log::info!("Loaded {}", path.display());
            value
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            fallback()
        }
    }
}

fn write_ron<T: Serialize>(dir: &Path, file: &'static str, value: &T) -> Result<(), DataError> {
    let text = ron::ser::to_string_pretty(value, ron::ser::PrettyConfig::default())
        .map_err(|source| DataError::Serialize { name: file, source })?;
    let path = dir.join(file);
    fs::write(&path, text).map_err(|source| DataError::Io { path, source })
}

/// Export all default data to RON files for easy editing
pub fn export_default_data(dir: &Path) -> Result<(), DataError> {
    fs::create_dir_all(dir).map_err(|source| DataError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    write_ron(dir, CONFIG_FILE, &SimConfig::default())?;
    write_ron(dir, ENEMIES_FILE, &default_enemy_templates())?;
    write_ron(dir, BOSSES_FILE, &default_boss_templates())?;
    Ok(())
}

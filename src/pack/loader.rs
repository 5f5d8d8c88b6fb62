//! Pack configuration loading from JSON.

use super::{is_valid_pack_name, PackConfig};
use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Configuration document as written by the management tool.
///
/// Every key is optional and unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPackConfig {
    selected_pack: Option<String>,
    available_packs: Vec<String>,
    texture_size: HashMap<String, u32>,
    description: HashMap<String, String>,
}

/// An inconsistency found while loading. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// `selected_pack` is not listed in `available_packs`.
    SelectedPackNotAvailable(String),
    /// A pack is listed more than once in `available_packs`.
    DuplicatePack(String),
    /// `texture_size` names a pack that is not available.
    UnknownPackInTextureSize(String),
    /// `description` names a pack that is not available.
    UnknownPackInDescription(String),
    /// A pack declares a texture size of zero; the default applies.
    ZeroTextureSize(String),
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigWarning::SelectedPackNotAvailable(pack) => {
                write!(f, "selected pack {:?} is not in available_packs", pack)
            }
            ConfigWarning::DuplicatePack(pack) => {
                write!(f, "pack {:?} is listed more than once", pack)
            }
            ConfigWarning::UnknownPackInTextureSize(pack) => {
                write!(f, "texture_size references unknown pack {:?}", pack)
            }
            ConfigWarning::UnknownPackInDescription(pack) => {
                write!(f, "description references unknown pack {:?}", pack)
            }
            ConfigWarning::ZeroTextureSize(pack) => {
                write!(f, "pack {:?} declares a texture size of 0", pack)
            }
        }
    }
}

/// Parses configuration sources into [`PackConfig`] snapshots.
pub struct PackConfigLoader;

impl PackConfigLoader {
    /// Parse configuration bytes, logging any warnings.
    pub fn load(data: &[u8]) -> Result<PackConfig, ConfigError> {
        let (config, warnings) = Self::load_with_warnings(data)?;
        for warning in &warnings {
            log::warn!("Pack configuration: {}", warning);
        }
        Ok(config)
    }

    /// Read and parse a configuration file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<PackConfig, ConfigError> {
        let data = std::fs::read(path)?;
        Self::load(&data)
    }

    /// Parse configuration bytes, returning warnings instead of logging them.
    pub fn load_with_warnings(data: &[u8]) -> Result<(PackConfig, Vec<ConfigWarning>), ConfigError> {
        let raw: RawPackConfig = serde_json::from_slice(data)?;
        let mut warnings = Vec::new();

        let selected_pack = raw.selected_pack.filter(|name| !name.is_empty());

        for name in selected_pack.iter().chain(&raw.available_packs) {
            if !is_valid_pack_name(name) {
                return Err(ConfigError::InvalidPackName(name.clone()));
            }
        }

        let mut seen: Vec<&str> = Vec::with_capacity(raw.available_packs.len());
        for name in &raw.available_packs {
            if seen.contains(&name.as_str()) {
                warnings.push(ConfigWarning::DuplicatePack(name.clone()));
            } else {
                seen.push(name);
            }
        }

        if let Some(selected) = &selected_pack {
            if !seen.contains(&selected.as_str()) {
                warnings.push(ConfigWarning::SelectedPackNotAvailable(selected.clone()));
            }
        }

        // Sorted so warnings come out in a stable order
        let mut sized: Vec<_> = raw.texture_size.iter().collect();
        sized.sort();
        for (name, size) in sized {
            if !seen.contains(&name.as_str()) {
                warnings.push(ConfigWarning::UnknownPackInTextureSize(name.clone()));
            }
            if *size == 0 {
                warnings.push(ConfigWarning::ZeroTextureSize(name.clone()));
            }
        }

        let mut described: Vec<_> = raw.description.keys().collect();
        described.sort();
        for name in described {
            if !seen.contains(&name.as_str()) {
                warnings.push(ConfigWarning::UnknownPackInDescription(name.clone()));
            }
        }

        let config = PackConfig::new(
            selected_pack,
            raw.available_packs,
            raw.texture_size,
            raw.description,
        );

        Ok((config, warnings))
    }
}

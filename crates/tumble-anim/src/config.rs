//! Animation session configuration

use crate::policy::CrouchPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tumble_core::{Result, TumbleError};

/// Session-level settings, loaded from an `animation.toml`:
/// ```toml
/// level = 3
/// catalogs = ["hero.anims.toml", "crab.anims.toml"]
///
/// [remap]
/// hero = "hero_alt"
///
/// [crouch.hero]
/// crouch_down = 3
/// stand_up = 5
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Level index used to filter level-gated clips
    #[serde(default)]
    pub level: Option<u32>,
    /// Catalog files, relative to the config file
    #[serde(default)]
    pub catalogs: Vec<PathBuf>,
    /// Suppress effects snapshots
    #[serde(default)]
    pub paused: bool,
    /// Model -> model whose curves are evaluated in its place
    #[serde(default)]
    pub remap: HashMap<String, String>,
    /// Per-model crouch transitions
    #[serde(default)]
    pub crouch: HashMap<String, CrouchPolicy>,
}

impl AnimationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TumbleError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: AnimationConfig = toml::from_str(content)?;
        if let Some(level) = config.level {
            if level >= 64 {
                return Err(TumbleError::ConfigError(format!(
                    "level {} does not fit a 64-level mask",
                    level
                )));
            }
        }
        Ok(config)
    }

    /// Catalog paths resolved against `base`.
    pub fn catalog_paths(&self, base: &Path) -> Vec<PathBuf> {
        self.catalogs.iter().map(|p| base.join(p)).collect()
    }
}

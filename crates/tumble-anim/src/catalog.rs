//! Per-model action table

use crate::clip::{CatalogDef, CatalogEntry, ClipInfo, CurveBinding};
use std::collections::HashSet;
use tumble_core::{ActionId, Result, TumbleError, MAX_ACTIONS};

/// Read-only table mapping each action of one model to its clip.
///
/// Catalogs are sparse: a model need not bind every action, and level-gated
/// clips are left out of catalogs built for other levels.
#[derive(Debug, Clone)]
pub struct AnimationCatalog {
    model: String,
    entries: Vec<Option<CatalogEntry>>,
}

impl AnimationCatalog {
    /// Create an empty catalog for `model`.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            entries: vec![None; MAX_ACTIONS as usize],
        }
    }

    /// Build a catalog from a parsed definition, keeping only the clips
    /// available on `level`.
    pub fn from_def(def: &CatalogDef, level: Option<u32>) -> Result<Self> {
        let mut catalog = Self::new(def.model.clone());
        let mut seen = HashSet::new();
        for clip in &def.clips {
            let name = clip.display_name();
            let action = ActionId::new(clip.action).map_err(|_| TumbleError::InvalidClip {
                model: def.model.clone(),
                clip: name.clone(),
                reason: format!("action {} is not below {}", clip.action, MAX_ACTIONS),
            })?;
            if !seen.insert(action) {
                return Err(TumbleError::DuplicateAction {
                    model: def.model.clone(),
                    action: clip.action,
                });
            }
            validate_clip(&def.model, &name, &clip.info(), &clip.file)?;

            if !clip.available_on(level) {
                log::debug!(
                    "Skipping clip '{}' on model '{}': not available on level {:?}",
                    name,
                    def.model,
                    level
                );
                continue;
            }

            catalog.insert(CatalogEntry {
                action,
                name,
                info: clip.info(),
                curves: clip.curves(),
            });
        }
        Ok(catalog)
    }

    /// Bind an entry. Overwrites any existing entry for the same action.
    pub fn insert(&mut self, entry: CatalogEntry) {
        let index = entry.action.index();
        self.entries[index] = Some(entry);
    }

    /// Clip metadata for `action`, if the model binds one.
    pub fn lookup(&self, action: ActionId) -> Option<&ClipInfo> {
        self.entry(action).map(|e| &e.info)
    }

    /// Full catalog entry for `action`.
    pub fn entry(&self, action: ActionId) -> Option<&CatalogEntry> {
        self.entries.get(action.index()).and_then(|e| e.as_ref())
    }

    /// Curve data bound to `action`.
    pub fn curves(&self, action: ActionId) -> Option<&CurveBinding> {
        self.entry(action).map(|e| &e.curves)
    }

    /// Check if an action is bound.
    pub fn contains(&self, action: ActionId) -> bool {
        self.entry(action).is_some()
    }

    /// Iterate over bound entries in action order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().flatten()
    }

    /// Number of bound actions.
    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn validate_clip(model: &str, name: &str, info: &ClipInfo, file: &str) -> Result<()> {
    let invalid = |reason: String| TumbleError::InvalidClip {
        model: model.to_string(),
        clip: name.to_string(),
        reason,
    };

    if !(info.duration_frames >= 1.0) || !info.duration_frames.is_finite() {
        return Err(invalid(format!(
            "duration must be at least 1.0 frames, got {}",
            info.duration_frames
        )));
    }
    if !info.speed.is_finite() {
        return Err(invalid(format!("speed must be finite, got {}", info.speed)));
    }
    if file.trim().is_empty() {
        return Err(invalid("missing curve file".to_string()));
    }
    Ok(())
}

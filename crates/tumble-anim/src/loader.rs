//! TOML-based catalog loading

use crate::catalog::AnimationCatalog;
use crate::clip::CatalogDef;
use std::path::Path;
use tumble_core::{Result, TumbleError};

/// Load a model's catalog from a `.anims.toml` file.
///
/// The file format mirrors `CatalogDef`:
/// ```toml
/// model = "hero"
///
/// [[clip]]
/// action = 0
/// name = "idle"
/// file = "hero/idle.anm"
/// duration = 30.0
/// speed = 0.5
/// loop = true
/// blend_in = 8
/// blend_out = 8
/// # ...more clips
/// ```
///
/// Only clips available on `level` are kept (every clip when `None`).
pub fn load_catalog_from_file(path: &Path, level: Option<u32>) -> Result<AnimationCatalog> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TumbleError::CatalogError(format!("Failed to read {}: {}", path.display(), e))
    })?;
    load_catalog_from_str(&content, path, level)
}

/// Parse a catalog from a TOML string.
pub fn load_catalog_from_str(
    content: &str,
    path: &Path,
    level: Option<u32>,
) -> Result<AnimationCatalog> {
    let def: CatalogDef = toml::from_str(content).map_err(|e| {
        TumbleError::CatalogError(format!("Failed to parse {}: {}", path.display(), e))
    })?;

    if def.model.trim().is_empty() {
        return Err(TumbleError::CatalogError(format!(
            "{} has an empty model name",
            path.display()
        )));
    }

    let catalog = AnimationCatalog::from_def(&def, level)?;
    log::info!(
        "Loaded catalog '{}' from {} ({} of {} clips bound)",
        catalog.model(),
        path.display(),
        catalog.len(),
        def.clips.len()
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tumble_core::ActionId;

    const HERO: &str = r#"
model = "hero"

[[clip]]
action = 0
name = "idle"
file = "hero/idle.anm"
face = "hero/idle_face.anm"
duration = 30.0
speed = 0.5
loop = true
blend_in = 8
blend_out = 8

[[clip]]
action = 2
name = "run"
file = "hero/run.anm"
duration = 16.0
loop = true
distance_sync = true
blend_in = 4
blend_out = 4
levels = 0x6
"#;

    #[test]
    fn parse_catalog() {
        let catalog =
            load_catalog_from_str(HERO, &PathBuf::from("hero.anims.toml"), None).unwrap();
        assert_eq!(catalog.model(), "hero");
        assert_eq!(catalog.len(), 2);

        let idle = catalog.entry(ActionId::new(0).unwrap()).unwrap();
        assert_eq!(idle.name, "idle");
        assert_eq!(idle.info.speed, 0.5);
        assert!(idle.info.looping);
        assert_eq!(idle.curves.face.as_ref().unwrap().as_str(), "hero/idle_face.anm");

        let run = catalog.lookup(ActionId::new(2).unwrap()).unwrap();
        assert_eq!(run.speed, 1.0);
        assert!(run.distance_synced);
    }

    #[test]
    fn level_filter_applies() {
        let catalog =
            load_catalog_from_str(HERO, &PathBuf::from("hero.anims.toml"), Some(0)).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.lookup(ActionId::new(2).unwrap()).is_none());
    }

    #[test]
    fn reject_missing_duration() {
        let toml_str = r#"
model = "bad"

[[clip]]
action = 0
file = "bad/idle.anm"
"#;
        let result = load_catalog_from_str(toml_str, &PathBuf::from("bad.anims.toml"), None);
        assert!(result.is_err());
    }

    #[test]
    fn reject_sub_frame_duration() {
        let toml_str = r#"
model = "bad"

[[clip]]
action = 0
file = "bad/idle.anm"
duration = 0.0
"#;
        let result = load_catalog_from_str(toml_str, &PathBuf::from("bad.anims.toml"), None);
        assert!(matches!(result, Err(TumbleError::InvalidClip { .. })));
    }

    #[test]
    fn reject_empty_model() {
        let result =
            load_catalog_from_str("model = \"\"", &PathBuf::from("empty.anims.toml"), None);
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_catalog_error() {
        let result = load_catalog_from_file(&PathBuf::from("does/not/exist.anims.toml"), None);
        assert!(matches!(result, Err(TumbleError::CatalogError(_))));
    }
}

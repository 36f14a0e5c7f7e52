//! Clip metadata and curve-data bindings

use serde::{Deserialize, Serialize};
use tumble_core::ActionId;

/// Handle to curve data owned by the asset system (the clip's file path).
///
/// The timeline never looks inside curve data; the handle is only forwarded
/// to the pose evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurveHandle(pub String);

impl CurveHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Playback metadata for one action on one model. Immutable after load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipInfo {
    /// Clip length in frames; sampling is defined on `[1.0, duration_frames]`
    pub duration_frames: f32,
    /// Playback rate multiplier
    pub speed: f32,
    /// Wrap instead of clamp at the end of the clip
    pub looping: bool,
    /// Scale the per-tick advance by the owner's travel distance
    pub distance_synced: bool,
    /// Transition length when this clip is entered
    pub blend_in_frames: u16,
    /// Transition length when this clip is exited
    pub blend_out_frames: u16,
}

impl ClipInfo {
    /// A clip with `blend_in_frames <= 1` always hard-cuts when entered.
    pub fn can_blend_in(&self) -> bool {
        self.blend_in_frames > 1
    }

    /// A clip with `blend_out_frames <= 1` always hard-cuts when exited.
    pub fn can_blend_out(&self) -> bool {
        self.blend_out_frames > 1
    }

    /// Two clips play in phase when both loop and they share speed and length.
    pub fn in_phase_with(&self, other: &ClipInfo) -> bool {
        self.looping
            && other.looping
            && self.speed == other.speed
            && self.duration_frames == other.duration_frames
    }
}

/// Curve data bound to an action: the body layer and an optional face layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveBinding {
    pub body: CurveHandle,
    #[serde(default)]
    pub face: Option<CurveHandle>,
}

/// A catalog entry: clip metadata plus its curve data.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub action: ActionId,
    /// Human-readable name (for tooling and logs)
    pub name: String,
    pub info: ClipInfo,
    pub curves: CurveBinding,
}

/// On-disk clip definition, as written in a `.anims.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipDef {
    pub action: u16,
    #[serde(default)]
    pub name: Option<String>,
    /// Body curve data handle
    pub file: String,
    /// Face curve data handle
    #[serde(default)]
    pub face: Option<String>,
    pub duration: f32,
    #[serde(default = "default_speed")]
    pub speed: f32,
    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub distance_sync: bool,
    #[serde(default)]
    pub blend_in: u16,
    #[serde(default)]
    pub blend_out: u16,
    /// Bitmask of levels this clip is loaded on (absent = every level)
    #[serde(default)]
    pub levels: Option<u64>,
}

fn default_speed() -> f32 {
    1.0
}

impl ClipDef {
    /// Name used in logs and errors; falls back to the action number.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("action_{}", self.action))
    }

    /// Whether the clip is available on `level`. No level means every clip is.
    pub fn available_on(&self, level: Option<u32>) -> bool {
        match (self.levels, level) {
            (Some(mask), Some(level)) => level < 64 && mask & (1u64 << level) != 0,
            _ => true,
        }
    }

    pub fn info(&self) -> ClipInfo {
        ClipInfo {
            duration_frames: self.duration,
            speed: self.speed,
            looping: self.looping,
            distance_synced: self.distance_sync,
            blend_in_frames: self.blend_in,
            blend_out_frames: self.blend_out,
        }
    }

    pub fn curves(&self) -> CurveBinding {
        CurveBinding {
            body: CurveHandle::new(self.file.clone()),
            face: self.face.clone().map(CurveHandle::new),
        }
    }
}

/// A whole `.anims.toml` file: one model's clip definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDef {
    pub model: String,
    #[serde(default, rename = "clip")]
    pub clips: Vec<ClipDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looping(duration: f32, speed: f32) -> ClipInfo {
        ClipInfo {
            duration_frames: duration,
            speed,
            looping: true,
            distance_synced: false,
            blend_in_frames: 4,
            blend_out_frames: 4,
        }
    }

    #[test]
    fn in_phase_requires_matching_loops() {
        let a = looping(20.0, 1.0);
        assert!(a.in_phase_with(&looping(20.0, 1.0)));
        assert!(!a.in_phase_with(&looping(21.0, 1.0)));
        assert!(!a.in_phase_with(&looping(20.0, 0.5)));

        let mut once = looping(20.0, 1.0);
        once.looping = false;
        assert!(!a.in_phase_with(&once));
    }

    #[test]
    fn single_frame_blends_are_not_eligible() {
        let mut clip = looping(10.0, 1.0);
        clip.blend_in_frames = 1;
        clip.blend_out_frames = 0;
        assert!(!clip.can_blend_in());
        assert!(!clip.can_blend_out());
    }

    #[test]
    fn level_mask_filters() {
        let def = ClipDef {
            action: 2,
            name: None,
            file: "hero/run.anm".into(),
            face: None,
            duration: 12.0,
            speed: 1.0,
            looping: true,
            distance_sync: true,
            blend_in: 4,
            blend_out: 4,
            levels: Some(0b0101),
        };
        assert!(def.available_on(None));
        assert!(def.available_on(Some(0)));
        assert!(!def.available_on(Some(1)));
        assert!(def.available_on(Some(2)));
        assert!(!def.available_on(Some(64)));
        assert_eq!(def.display_name(), "action_2");
    }
}

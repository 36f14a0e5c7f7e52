//! Owner-supplied hooks for choosing where a blend's destination starts

use crate::clip::ClipInfo;
use serde::{Deserialize, Serialize};
use tumble_core::ActionId;

/// Per-tick locomotion state supplied by the owning actor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerInput {
    /// Ground distance travelled this tick (drives distance-synced clips)
    #[serde(default)]
    pub travel_distance: f32,
    /// Crouch progress in `[0, 1]`, when the owner tracks one
    #[serde(default)]
    pub crouch_ratio: Option<f32>,
}

/// Everything a policy may look at when a blend begins.
#[derive(Debug, Clone, Copy)]
pub struct BlendStart<'a> {
    pub src_action: ActionId,
    pub dst_action: ActionId,
    pub src_clip: &'a ClipInfo,
    pub dst_clip: &'a ClipInfo,
    /// Destination start chosen by the default rule (in phase or clip start)
    pub default_time: f32,
    pub owner: &'a OwnerInput,
}

/// Overrides the destination start time of particular transitions.
pub trait BlendStartPolicy {
    /// Return `Some(time)` to replace `start.default_time`.
    fn destination_time(&self, start: &BlendStart<'_>) -> Option<f32>;
}

/// Maps the owner's crouch progress onto the crouch-down and stand-up clips,
/// so a crouch interrupted halfway stands up from the matching pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrouchPolicy {
    pub crouch_down: ActionId,
    pub stand_up: ActionId,
}

impl BlendStartPolicy for CrouchPolicy {
    fn destination_time(&self, start: &BlendStart<'_>) -> Option<f32> {
        let ratio = start.owner.crouch_ratio?.clamp(0.0, 1.0);
        let span = start.dst_clip.duration_frames - 1.0;
        if start.dst_action == self.crouch_down {
            Some(ratio * span)
        } else if start.dst_action == self.stand_up {
            Some((1.0 - ratio) * span)
        } else {
            None
        }
    }
}

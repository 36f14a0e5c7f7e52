//! Time-cursor integration with loop/clamp policy

use crate::clip::ClipInfo;
use serde::{Deserialize, Serialize};

/// Multiplier applied to the owner's travel distance for distance-synced clips.
pub const DISTANCE_RATE_SCALE: f32 = 10.0;

/// First sampleable frame of every clip. Clips are sampled on `[1.0, duration]`.
pub const CLIP_START: f32 = 1.0;

/// Clip-boundary outcome of advancing one cursor for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorEvent {
    #[default]
    None,
    /// A non-looping clip reached (or stayed at) its last frame
    Finished,
    /// A looping clip wrapped back into its sampling range
    Looped,
}

impl CursorEvent {
    pub fn is_boundary(&self) -> bool {
        !matches!(self, CursorEvent::None)
    }
}

/// Boundary events of the most recent tick, recorded per cursor.
///
/// When steady, only `destination` is used (the single playing cursor).
/// While blending, `source` is the outgoing clip and `destination` the
/// incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickEvents {
    pub source: CursorEvent,
    pub destination: CursorEvent,
}

impl TickEvents {
    pub fn is_empty(&self) -> bool {
        !self.source.is_boundary() && !self.destination.is_boundary()
    }
}

/// Per-tick advance of a cursor playing `clip`.
pub fn tick_rate(clip: &ClipInfo, dt: f32, travel_distance: f32) -> f32 {
    let mut rate = dt * clip.speed;
    if clip.distance_synced {
        rate *= travel_distance * DISTANCE_RATE_SCALE;
    }
    rate
}

/// Move `cursor` forward by `rate` frames and apply the clip's end policy.
///
/// Looping clips wrap by `duration - 1`, keeping the sub-frame offset past
/// the end; other clips clamp to `duration` and report `Finished` on every
/// tick that pushes against the end.
pub fn integrate(cursor: &mut f32, clip: &ClipInfo, rate: f32) -> CursorEvent {
    *cursor += rate;
    let duration = clip.duration_frames;
    if *cursor <= duration {
        return CursorEvent::None;
    }

    if clip.looping {
        *cursor -= duration - CLIP_START;
        CursorEvent::Looped
    } else {
        *cursor = duration;
        CursorEvent::Finished
    }
}

/// `tick_rate` followed by `integrate`.
pub fn advance_cursor(
    cursor: &mut f32,
    clip: &ClipInfo,
    dt: f32,
    travel_distance: f32,
) -> CursorEvent {
    let rate = tick_rate(clip, dt, travel_distance);
    integrate(cursor, clip, rate)
}

//! Per-actor action timeline: hard cuts, cross-blends and cursor advance

use crate::catalog::AnimationCatalog;
use crate::cursor::{advance_cursor, TickEvents, CLIP_START};
use crate::policy::{BlendStart, BlendStartPolicy, OwnerInput};
use crate::pose::PoseRequest;
use serde::{Deserialize, Serialize};
use tumble_core::ActionId;

/// An in-flight cross-blend between an outgoing and an incoming action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Blend {
    pub src_action: ActionId,
    pub dst_action: ActionId,
    pub src_time: f32,
    pub dst_time: f32,
    /// Ticks elapsed since the blend started; never exceeds `frames`
    pub frame: u16,
    /// Target length of the transition
    pub frames: u16,
}

impl Blend {
    /// Destination weight in `[0, 1]`.
    pub fn weight(&self) -> f32 {
        if self.frames == 0 {
            return 1.0;
        }
        self.frame as f32 / self.frames as f32
    }
}

/// What is playing right now.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Playback {
    /// A single action (or nothing) at one cursor
    Steady {
        action: Option<ActionId>,
        time: f32,
    },
    /// Two actions cross-fading, each with its own cursor
    Blending(Blend),
}

/// Recoverable conditions met while advancing. Informational only: the
/// timeline has already applied the fallback behaviour when one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The action has no clip bound on this model; nothing plays
    CatalogLookupMiss(ActionId),
    /// Blend preconditions were not met; the change was a hard cut
    IneligibleBlend {
        from: Option<ActionId>,
        to: Option<ActionId>,
    },
    /// A blend with zero target length was completed immediately
    InvalidActorState,
}

/// Mutable animation state of one actor.
///
/// Created with [`TimelineState::new`] (a hard reset), then driven once per
/// tick: [`request_action`](Self::request_action) before
/// [`advance`](Self::advance), queries after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    old_action: Option<ActionId>,
    new_action: Option<ActionId>,
    playback: Playback,
    #[serde(skip)]
    events: TickEvents,
}

impl TimelineState {
    pub fn new(action: Option<ActionId>) -> Self {
        Self {
            old_action: action,
            new_action: action,
            playback: Playback::Steady {
                action,
                time: CLIP_START,
            },
            events: TickEvents::default(),
        }
    }

    /// Hard-set every action slot to `action` at the first frame, dropping
    /// any blend and pending events.
    pub fn reset(&mut self, action: Option<ActionId>) {
        *self = Self::new(action);
    }

    /// Set the action the owner wants this tick. Cursors are untouched until
    /// the next `advance`.
    pub fn request_action(&mut self, action: Option<ActionId>) {
        self.new_action = action;
    }

    /// Advance by one tick of `dt` frames.
    pub fn advance(
        &mut self,
        catalog: &AnimationCatalog,
        dt: f32,
        owner: &OwnerInput,
        policy: Option<&dyn BlendStartPolicy>,
    ) -> Option<Fallback> {
        self.events = TickEvents::default();

        let mut fallback = None;
        let mut blend_started = false;

        if self.new_action != self.old_action {
            match self.begin_blend(catalog, owner, policy) {
                Some(blend) => {
                    log::debug!(
                        "Blend {} -> {} over {} frames (dst starts at {:.3})",
                        blend.src_action,
                        blend.dst_action,
                        blend.frames,
                        blend.dst_time
                    );
                    self.playback = Playback::Blending(blend);
                    blend_started = true;
                }
                None => {
                    log::debug!(
                        "Hard cut {:?} -> {:?}",
                        self.old_action,
                        self.new_action
                    );
                    let from = self.old_action;
                    self.playback = Playback::Steady {
                        action: self.new_action,
                        time: CLIP_START,
                    };
                    self.old_action = self.new_action;
                    // The cut tick shows the first frame of the new clip.
                    return match self.new_action {
                        Some(action) if !catalog.contains(action) => {
                            Some(Fallback::CatalogLookupMiss(action))
                        }
                        to => Some(Fallback::IneligibleBlend { from, to }),
                    };
                }
            }
            self.old_action = self.new_action;
        }

        if let Playback::Blending(blend) = self.playback {
            if blend.frames == 0 {
                log::warn!(
                    "Blend {} -> {} has no length; completing immediately",
                    blend.src_action,
                    blend.dst_action
                );
                self.playback = Playback::Steady {
                    action: Some(blend.dst_action),
                    time: blend.dst_time,
                };
                fallback = Some(Fallback::InvalidActorState);
            }
        }

        match &mut self.playback {
            Playback::Steady { action, time } => {
                let Some(action) = *action else {
                    return fallback;
                };
                let Some(clip) = catalog.lookup(action) else {
                    return Some(Fallback::CatalogLookupMiss(action));
                };
                self.events.destination =
                    advance_cursor(time, clip, dt, owner.travel_distance);
            }
            Playback::Blending(blend) => {
                match (
                    catalog.lookup(blend.src_action),
                    catalog.lookup(blend.dst_action),
                ) {
                    (Some(src), Some(dst)) => {
                        self.events.source =
                            advance_cursor(&mut blend.src_time, src, dt, owner.travel_distance);
                        self.events.destination =
                            advance_cursor(&mut blend.dst_time, dst, dt, owner.travel_distance);
                    }
                    // Cursors hold still, but the blend keeps counting down.
                    (src, _) => {
                        let missing = if src.is_some() {
                            blend.dst_action
                        } else {
                            blend.src_action
                        };
                        fallback = Some(Fallback::CatalogLookupMiss(missing));
                    }
                }

                if !blend_started {
                    blend.frame += 1;
                }
            }
        }

        if let Playback::Blending(blend) = self.playback {
            if blend.frame >= blend.frames {
                log::debug!("Blend into {} complete", blend.dst_action);
                self.playback = Playback::Steady {
                    action: Some(blend.dst_action),
                    time: blend.dst_time,
                };
            }
        }

        fallback
    }

    /// Try to set up a cross-blend from the steady old action to the newly
    /// requested one. `None` means the change must be a hard cut.
    fn begin_blend(
        &self,
        catalog: &AnimationCatalog,
        owner: &OwnerInput,
        policy: Option<&dyn BlendStartPolicy>,
    ) -> Option<Blend> {
        let Playback::Steady { time, .. } = self.playback else {
            // Re-targeting an in-flight blend is not supported.
            return None;
        };
        let src_action = self.old_action?;
        let dst_action = self.new_action?;
        let src_clip = catalog.lookup(src_action)?;
        let dst_clip = catalog.lookup(dst_action)?;
        if !src_clip.can_blend_out() || !dst_clip.can_blend_in() {
            return None;
        }

        let default_time = if src_clip.in_phase_with(dst_clip) {
            time
        } else {
            CLIP_START
        };
        let start = BlendStart {
            src_action,
            dst_action,
            src_clip,
            dst_clip,
            default_time,
            owner,
        };
        let dst_time = policy
            .and_then(|p| p.destination_time(&start))
            .unwrap_or(default_time);

        Some(Blend {
            src_action,
            dst_action,
            src_time: time,
            dst_time,
            frame: 0,
            frames: dst_clip.blend_in_frames.min(src_clip.blend_out_frames),
        })
    }

    /// What the pose evaluator should sample this tick.
    pub fn pose_request(&self) -> PoseRequest {
        match self.playback {
            Playback::Steady { action: None, .. } => PoseRequest::Rest,
            Playback::Steady {
                action: Some(action),
                time,
            } => PoseRequest::Steady { action, time },
            Playback::Blending(blend) => PoseRequest::Blend {
                src_action: blend.src_action,
                src_time: blend.src_time,
                dst_action: blend.dst_action,
                dst_time: blend.dst_time,
                weight: blend.weight(),
            },
        }
    }

    /// Boundary events of the last advance. Read-once: the events are cleared.
    pub fn consume_events(&mut self) -> TickEvents {
        std::mem::take(&mut self.events)
    }

    /// Boundary events of the last advance, without clearing them.
    pub fn events(&self) -> TickEvents {
        self.events
    }

    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    pub fn is_blending(&self) -> bool {
        matches!(self.playback, Playback::Blending(_))
    }

    /// The action whose timeline the actor follows: the steady action, or the
    /// destination of an in-flight blend.
    pub fn current_action(&self) -> Option<ActionId> {
        match self.playback {
            Playback::Steady { action, .. } => action,
            Playback::Blending(blend) => Some(blend.dst_action),
        }
    }

    /// Cursor of [`current_action`](Self::current_action).
    pub fn time(&self) -> f32 {
        match self.playback {
            Playback::Steady { time, .. } => time,
            Playback::Blending(blend) => blend.dst_time,
        }
    }

    pub fn requested_action(&self) -> Option<ActionId> {
        self.new_action
    }

    /// The last request the timeline has acted on.
    pub fn tracked_action(&self) -> Option<ActionId> {
        self.old_action
    }
}

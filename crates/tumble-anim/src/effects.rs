//! Timeline snapshots for timeline-keyed debris and particle triggers

use crate::cursor::TickEvents;
use crate::pose::PoseRequest;
use serde::{Deserialize, Serialize};
use tumble_core::{ActionId, ActorId};

/// Where an actor's timeline stood after this tick's pose was evaluated.
///
/// The effects system owns the trigger table; it correlates `action` and
/// `time` against its trigger points and uses `events` to tell whether a
/// clip boundary was crossed this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimSnapshot {
    pub actor: ActorId,
    pub action: ActionId,
    pub time: f32,
    pub events: TickEvents,
}

impl AnimSnapshot {
    /// Build a snapshot from a pose request. `None` at rest.
    pub fn from_request(actor: ActorId, request: &PoseRequest, events: TickEvents) -> Option<Self> {
        let (action, time) = request.snapshot_key()?;
        Some(Self {
            actor,
            action,
            time,
            events,
        })
    }
}

/// Receives snapshots for the effects/debris system.
pub trait EffectsSink {
    fn on_snapshot(&mut self, model: &str, snapshot: &AnimSnapshot);
}

/// Collects snapshots in order (tooling and tests).
#[derive(Debug, Default)]
pub struct SnapshotLog {
    pub snapshots: Vec<(String, AnimSnapshot)>,
}

impl SnapshotLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain all collected snapshots
    pub fn drain(&mut self) -> Vec<(String, AnimSnapshot)> {
        std::mem::take(&mut self.snapshots)
    }
}

impl EffectsSink for SnapshotLog {
    fn on_snapshot(&mut self, model: &str, snapshot: &AnimSnapshot) {
        self.snapshots.push((model.to_string(), *snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorEvent;

    #[test]
    fn rest_has_no_snapshot() {
        let snap = AnimSnapshot::from_request(ActorId::from_raw(1), &PoseRequest::Rest, TickEvents::default());
        assert!(snap.is_none());
    }

    #[test]
    fn snapshot_carries_events() {
        let events = TickEvents {
            source: CursorEvent::None,
            destination: CursorEvent::Finished,
        };
        let request = PoseRequest::Steady {
            action: ActionId::new(6).unwrap(),
            time: 10.0,
        };
        let snap = AnimSnapshot::from_request(ActorId::from_raw(9), &request, events).unwrap();
        assert_eq!(snap.action.raw(), 6);
        assert_eq!(snap.events.destination, CursorEvent::Finished);

        let mut log = SnapshotLog::new();
        log.on_snapshot("hero", &snap);
        let drained = log.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].0, "hero");
        assert!(log.snapshots.is_empty());
    }
}

//! Action indices and stable actor identifiers

use crate::error::{Result, TumbleError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Size of a model's action table. Valid action ids are `0..MAX_ACTIONS`.
pub const MAX_ACTIONS: u16 = 118;

/// Index of an animation action (walk, jump, die, ...) within a model's catalog.
///
/// "No action" is expressed as `Option<ActionId>::None` rather than a `-1`
/// sentinel; `from_raw_signed` converts from the signed on-disk form.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct ActionId(u16);

impl ActionId {
    /// Create an action id, rejecting values outside the action table.
    pub fn new(raw: u16) -> Result<Self> {
        if raw < MAX_ACTIONS {
            Ok(Self(raw))
        } else {
            Err(TumbleError::ActionOutOfRange {
                raw: raw as i64,
                max: MAX_ACTIONS,
            })
        }
    }

    /// Convert a signed id where any negative value means "no action".
    pub fn from_raw_signed(raw: i32) -> Result<Option<Self>> {
        if raw < 0 {
            return Ok(None);
        }
        if raw >= MAX_ACTIONS as i32 {
            return Err(TumbleError::ActionOutOfRange {
                raw: raw as i64,
                max: MAX_ACTIONS,
            });
        }
        Ok(Some(Self(raw as u16)))
    }

    /// Get the raw table index
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Get the raw u16 value
    pub fn raw(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for ActionId {
    type Error = TumbleError;

    fn try_from(raw: u16) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<ActionId> for u16 {
    fn from(id: ActionId) -> Self {
        id.0
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionId({})", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Global counter for generating unique actor IDs
static NEXT_ACTOR: AtomicU64 = AtomicU64::new(1);

/// A stable identifier for an animated actor (creature, vehicle, mask).
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u64);

impl ActorId {
    /// Create a new unique ActorId
    pub fn new() -> Self {
        Self(NEXT_ACTOR.fetch_add(1, Ordering::Relaxed))
    }

    /// Create an ActorId from a raw value (for deserialization/testing)
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActorId({})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

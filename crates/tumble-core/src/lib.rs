//! Tumble Core - Foundational types for the Tumble animation runtime
//!
//! This crate provides the core types that the other Tumble crates depend on:
//! - `ActionId` - Bounded index of an animation action within a model
//! - `ActorId` - Stable identifiers for animated actors
//! - Error types and Result alias

mod error;
mod id;

pub use error::{Result, TumbleError};
pub use id::{ActionId, ActorId, MAX_ACTIONS};

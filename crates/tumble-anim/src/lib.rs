//! Character animation runtime for Tumble
//!
//! Per animated actor, plays a discrete action over time:
//! - **Catalog**: per-model clip metadata and curve handles, loaded from TOML
//! - **Timeline**: hard cuts, cross-blends, loop/clamp and distance-synced advance
//! - **Queries**: pose requests for the evaluator, snapshots for the effects system

pub mod catalog;
pub mod clip;
pub mod config;
pub mod cursor;
pub mod effects;
pub mod loader;
pub mod policy;
pub mod pose;
pub mod timeline;

use std::collections::HashMap;
use std::path::Path;
use tumble_core::{ActionId, ActorId, Result, TumbleError};

pub use catalog::AnimationCatalog;
pub use clip::{CatalogEntry, ClipInfo, CurveBinding, CurveHandle};
pub use config::AnimationConfig;
pub use cursor::{CursorEvent, TickEvents};
pub use effects::{AnimSnapshot, EffectsSink};
pub use policy::{BlendStart, BlendStartPolicy, CrouchPolicy, OwnerInput};
pub use pose::{EvalPose, JointOverride, LayerPose, PoseEvaluator, PoseRequest};
pub use timeline::{Blend, Fallback, Playback, TimelineState};

/// Animation state of one actor.
struct ActorAnim {
    model: String,
    timeline: TimelineState,
    input: OwnerInput,
    policy: Option<Box<dyn BlendStartPolicy>>,
}

/// Registry of model catalogs and per-actor timelines, ticked once per
/// simulation step.
///
/// Per tick: `request_action` / `set_input` for each actor, then `update`,
/// then `draw` (or the raw queries) for each actor.
pub struct AnimationSystem {
    catalogs: HashMap<String, AnimationCatalog>,
    remaps: HashMap<String, String>,
    actors: HashMap<ActorId, ActorAnim>,
    crouch: HashMap<String, CrouchPolicy>,
    paused: bool,
}

impl AnimationSystem {
    pub fn new() -> Self {
        Self {
            catalogs: HashMap::new(),
            remaps: HashMap::new(),
            actors: HashMap::new(),
            crouch: HashMap::new(),
            paused: false,
        }
    }

    /// Build a system from a config, loading its catalogs relative to `base`.
    pub fn from_config(config: &AnimationConfig, base: &Path) -> Result<Self> {
        let mut system = Self::new();
        for path in config.catalog_paths(base) {
            let catalog = loader::load_catalog_from_file(&path, config.level)?;
            system.add_catalog(catalog);
        }
        for (model, target) in &config.remap {
            system.set_remap(model, target);
        }
        system.crouch = config.crouch.clone();
        system.paused = config.paused;
        log::info!(
            "Animation system initialized ({} catalogs, level {:?})",
            system.catalogs.len(),
            config.level
        );
        Ok(system)
    }

    /// Register a catalog. Overwrites any existing catalog for the same model.
    pub fn add_catalog(&mut self, catalog: AnimationCatalog) {
        self.catalogs.insert(catalog.model().to_string(), catalog);
    }

    pub fn catalog(&self, model: &str) -> Option<&AnimationCatalog> {
        self.catalogs.get(model)
    }

    /// Evaluate `model`'s actors against `target`'s curves.
    pub fn set_remap(&mut self, model: &str, target: &str) {
        self.remaps.insert(model.to_string(), target.to_string());
    }

    pub fn clear_remap(&mut self, model: &str) {
        self.remaps.remove(model);
    }

    /// Paused sessions keep drawing but stop emitting effects snapshots.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Create an actor playing `action` on `model`, reset to its first frame.
    ///
    /// Models with a configured crouch pair get a `CrouchPolicy` installed.
    pub fn spawn(&mut self, model: &str, action: Option<ActionId>) -> Result<ActorId> {
        if !self.catalogs.contains_key(model) {
            return Err(TumbleError::ModelNotFound(model.to_string()));
        }
        let id = ActorId::new();
        let policy = self
            .crouch
            .get(model)
            .map(|p| Box::new(*p) as Box<dyn BlendStartPolicy>);
        self.actors.insert(
            id,
            ActorAnim {
                model: model.to_string(),
                timeline: TimelineState::new(action),
                input: OwnerInput::default(),
                policy,
            },
        );
        Ok(id)
    }

    pub fn despawn(&mut self, actor: ActorId) -> bool {
        self.actors.remove(&actor).is_some()
    }

    /// Hard-reset an actor's timeline to `action`.
    pub fn reset(&mut self, actor: ActorId, action: Option<ActionId>) -> Result<()> {
        self.actor_mut(actor)?.timeline.reset(action);
        Ok(())
    }

    /// Set the action an actor wants this tick.
    pub fn request_action(&mut self, actor: ActorId, action: Option<ActionId>) -> Result<()> {
        self.actor_mut(actor)?.timeline.request_action(action);
        Ok(())
    }

    /// Set the locomotion input used by the actor's next advance.
    pub fn set_input(&mut self, actor: ActorId, input: OwnerInput) -> Result<()> {
        self.actor_mut(actor)?.input = input;
        Ok(())
    }

    /// Install (or clear) the actor's blend start policy.
    pub fn set_policy(
        &mut self,
        actor: ActorId,
        policy: Option<Box<dyn BlendStartPolicy>>,
    ) -> Result<()> {
        self.actor_mut(actor)?.policy = policy;
        Ok(())
    }

    /// Advance every actor by one tick of `dt` frames.
    pub fn update(&mut self, dt: f32) {
        for (id, actor) in self.actors.iter_mut() {
            let Some(catalog) = self.catalogs.get(&actor.model) else {
                log::warn!("Actor {} references unknown model '{}'", id, actor.model);
                continue;
            };
            let fallback = actor.timeline.advance(
                catalog,
                dt,
                &actor.input,
                actor.policy.as_deref(),
            );
            if let Some(fallback) = fallback {
                log::trace!("Actor {} ({}): {:?}", id, actor.model, fallback);
            }
        }
    }

    pub fn timeline(&self, actor: ActorId) -> Option<&TimelineState> {
        self.actors.get(&actor).map(|a| &a.timeline)
    }

    pub fn pose_request(&self, actor: ActorId) -> Option<PoseRequest> {
        self.timeline(actor).map(|t| t.pose_request())
    }

    /// Read-once boundary events of the actor's last advance.
    pub fn consume_events(&mut self, actor: ActorId) -> Result<TickEvents> {
        Ok(self.actor_mut(actor)?.timeline.consume_events())
    }

    /// Evaluate the actor's pose and report its timeline to the effects system.
    ///
    /// Body curves come from the remapped model when one is set; face curves
    /// always come from the actor's own model. `overrides` are
    /// forwarded to the evaluator as-is. A snapshot is emitted only when a
    /// pose other than rest was evaluated and the session is not paused.
    pub fn draw(
        &mut self,
        actor: ActorId,
        evaluator: &mut dyn PoseEvaluator,
        overrides: &[JointOverride],
        sink: &mut dyn EffectsSink,
    ) -> Result<Option<AnimSnapshot>> {
        let anim = self
            .actors
            .get_mut(&actor)
            .ok_or_else(|| TumbleError::ActorNotFound(actor.to_string()))?;

        let own_catalog = self
            .catalogs
            .get(&anim.model)
            .ok_or_else(|| TumbleError::ModelNotFound(anim.model.clone()))?;
        let (eval_model, body_catalog) = match self.remaps.get(&anim.model) {
            Some(target) => match self.catalogs.get(target) {
                Some(catalog) => (target.as_str(), catalog),
                None => (anim.model.as_str(), own_catalog),
            },
            None => (anim.model.as_str(), own_catalog),
        };

        let request = anim.timeline.pose_request();
        let pose = request.resolve(body_catalog, own_catalog);
        evaluator.evaluate(eval_model, &pose, overrides);

        if pose.is_rest() || self.paused {
            return Ok(None);
        }
        let events = anim.timeline.consume_events();
        let snapshot = AnimSnapshot::from_request(actor, &request, events);
        if let Some(snapshot) = &snapshot {
            sink.on_snapshot(&anim.model, snapshot);
        }
        Ok(snapshot)
    }

    /// Number of registered catalogs
    pub fn catalog_count(&self) -> usize {
        self.catalogs.len()
    }

    /// Number of live actors
    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    /// Drop all actors for a scene transition. Catalogs are kept.
    pub fn clear(&mut self) {
        self.actors.clear();
    }

    fn actor_mut(&mut self, actor: ActorId) -> Result<&mut ActorAnim> {
        self.actors
            .get_mut(&actor)
            .ok_or_else(|| TumbleError::ActorNotFound(actor.to_string()))
    }
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::SnapshotLog;
    use std::path::PathBuf;

    const HERO: &str = r#"
model = "hero"

[[clip]]
action = 0
name = "idle"
file = "hero/idle.anm"
face = "hero/idle_face.anm"
duration = 30.0
loop = true
blend_in = 4
blend_out = 4

[[clip]]
action = 1
name = "walk"
file = "hero/walk.anm"
duration = 20.0
loop = true
distance_sync = true
blend_in = 4
blend_out = 4

[[clip]]
action = 3
name = "crouch"
file = "hero/crouch.anm"
duration = 11.0
blend_in = 4
blend_out = 4
"#;

    const HERO_ALT: &str = r#"
model = "hero_alt"

[[clip]]
action = 0
name = "idle"
file = "hero_alt/idle.anm"
face = "hero_alt/idle_face.anm"
duration = 30.0
loop = true
"#;

    #[derive(Default)]
    struct RecordingEvaluator {
        calls: Vec<(String, String, usize)>,
        faces: Vec<String>,
    }

    impl PoseEvaluator for RecordingEvaluator {
        fn evaluate(&mut self, model: &str, pose: &EvalPose<'_>, overrides: &[JointOverride]) {
            let desc = match pose.body {
                LayerPose::Rest => "rest".to_string(),
                LayerPose::Single { curves, .. } => curves.as_str().to_string(),
                LayerPose::Blend { src, dst, .. } => {
                    format!("{}+{}", src.as_str(), dst.as_str())
                }
            };
            if let LayerPose::Single { curves, .. } = pose.face {
                self.faces.push(curves.as_str().to_string());
            }
            self.calls.push((model.to_string(), desc, overrides.len()));
        }
    }

    fn action(raw: u16) -> ActionId {
        ActionId::new(raw).unwrap()
    }

    fn system() -> AnimationSystem {
        let mut system = AnimationSystem::new();
        for (src, name) in [(HERO, "hero.anims.toml"), (HERO_ALT, "hero_alt.anims.toml")] {
            let catalog = loader::load_catalog_from_str(src, &PathBuf::from(name), None).unwrap();
            system.add_catalog(catalog);
        }
        system
    }

    #[test]
    fn spawn_requires_known_model() {
        let mut system = system();
        assert!(system.spawn("crab", Some(action(0))).is_err());
        let id = system.spawn("hero", Some(action(0))).unwrap();
        assert_eq!(system.actor_count(), 1);
        assert!(system.despawn(id));
        assert!(system.request_action(id, None).is_err());
    }

    #[test]
    fn update_advances_with_owner_input() {
        let mut system = system();
        let id = system.spawn("hero", Some(action(1))).unwrap();
        system
            .set_input(
                id,
                OwnerInput {
                    travel_distance: 0.2,
                    crouch_ratio: None,
                },
            )
            .unwrap();
        system.update(1.0);
        let time = system.timeline(id).unwrap().time();
        assert!((time - 3.0).abs() < 1e-4);
    }

    #[test]
    fn draw_resolves_and_emits_snapshot() {
        let mut system = system();
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.update(1.0);

        let mut evaluator = RecordingEvaluator::default();
        let mut log = SnapshotLog::new();
        let aim = [JointOverride::rotate(2, [0.0, 0.5, 0.0])];
        let snapshot = system.draw(id, &mut evaluator, &aim, &mut log).unwrap().unwrap();

        assert_eq!(
            evaluator.calls,
            vec![("hero".to_string(), "hero/idle.anm".to_string(), 1)]
        );
        assert_eq!(snapshot.action, action(0));
        assert!((snapshot.time - 2.0).abs() < 1e-5);
        assert_eq!(log.snapshots.len(), 1);
        // overrides never touch the timeline
        assert!((system.timeline(id).unwrap().time() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn draw_during_blend_snapshots_destination() {
        let mut system = system();
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.request_action(id, Some(action(3))).unwrap();
        system.update(1.0);

        let mut evaluator = RecordingEvaluator::default();
        let mut log = SnapshotLog::new();
        let snapshot = system.draw(id, &mut evaluator, &[], &mut log).unwrap().unwrap();
        assert_eq!(evaluator.calls[0].1, "hero/idle.anm+hero/crouch.anm");
        assert_eq!(snapshot.action, action(3));
    }

    #[test]
    fn remap_evaluates_alternate_model() {
        let mut system = system();
        system.set_remap("hero", "hero_alt");
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.update(1.0);

        let mut evaluator = RecordingEvaluator::default();
        let mut log = SnapshotLog::new();
        system.draw(id, &mut evaluator, &[], &mut log).unwrap();
        assert_eq!(evaluator.calls[0].0, "hero_alt");
        assert_eq!(evaluator.calls[0].1, "hero_alt/idle.anm");
        // the face layer stays on the actor's own model
        assert_eq!(evaluator.faces, vec!["hero/idle_face.anm".to_string()]);
        // effects stay keyed on the actor's own model
        assert_eq!(log.snapshots[0].0, "hero");

        // walk is missing on the alternate model: remapped draw falls back to rest
        system.request_action(id, Some(action(1))).unwrap();
        system.update(1.0);
        let snapshot = system.draw(id, &mut evaluator, &[], &mut log).unwrap();
        assert_eq!(evaluator.calls[1].1, "rest");
        assert!(snapshot.is_none());
    }

    #[test]
    fn replaced_catalog_does_not_stall_blend() {
        let mut system = system();
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.request_action(id, Some(action(1))).unwrap();
        system.update(1.0);
        assert!(system.timeline(id).unwrap().is_blending());

        // re-register hero without walk
        let idle_only = HERO.split("[[clip]]\naction = 1").next().unwrap();
        let catalog =
            loader::load_catalog_from_str(idle_only, &PathBuf::from("hero.anims.toml"), None)
                .unwrap();
        assert!(catalog.lookup(action(1)).is_none());
        system.add_catalog(catalog);

        for _ in 0..4 {
            system.update(1.0);
        }
        let timeline = system.timeline(id).unwrap();
        assert!(!timeline.is_blending());
        assert_eq!(timeline.current_action(), Some(action(1)));
    }

    #[test]
    fn paused_draw_suppresses_snapshots() {
        let mut system = system();
        system.set_paused(true);
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.update(1.0);

        let mut evaluator = RecordingEvaluator::default();
        let mut log = SnapshotLog::new();
        assert!(system.draw(id, &mut evaluator, &[], &mut log).unwrap().is_none());
        assert_eq!(evaluator.calls.len(), 1);
        assert!(log.snapshots.is_empty());
    }

    #[test]
    fn configured_crouch_policy_applies() {
        let mut system = system();
        system.crouch.insert(
            "hero".into(),
            CrouchPolicy {
                crouch_down: action(3),
                stand_up: action(5),
            },
        );
        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.request_action(id, Some(action(3))).unwrap();
        system
            .set_input(
                id,
                OwnerInput {
                    travel_distance: 0.0,
                    crouch_ratio: Some(0.4),
                },
            )
            .unwrap();
        system.update(0.0);
        let Some(PoseRequest::Blend { dst_time, .. }) = system.pose_request(id) else {
            panic!("expected a blend");
        };
        assert!((dst_time - 4.0).abs() < 1e-5);
    }

    #[test]
    fn from_config_loads_catalogs_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("hero.anims.toml"), HERO).unwrap();
        std::fs::create_dir(dir.path().join("alt")).unwrap();
        std::fs::write(dir.path().join("alt/hero_alt.anims.toml"), HERO_ALT).unwrap();
        let config_path = dir.path().join("animation.toml");
        std::fs::write(
            &config_path,
            r#"
catalogs = ["hero.anims.toml", "alt/hero_alt.anims.toml"]
paused = true

[remap]
hero = "hero_alt"

[crouch.hero]
crouch_down = 3
stand_up = 5
"#,
        )
        .unwrap();

        let config = AnimationConfig::load(&config_path).unwrap();
        let mut system = AnimationSystem::from_config(&config, dir.path()).unwrap();
        assert_eq!(system.catalog_count(), 2);
        assert!(system.catalog("hero_alt").unwrap().contains(action(0)));
        assert!(system.is_paused());

        let id = system.spawn("hero", Some(action(0))).unwrap();
        system.request_action(id, Some(action(3))).unwrap();
        system
            .set_input(
                id,
                OwnerInput {
                    travel_distance: 0.0,
                    crouch_ratio: Some(0.5),
                },
            )
            .unwrap();
        system.update(0.0);
        let Some(PoseRequest::Blend { dst_time, .. }) = system.pose_request(id) else {
            panic!("expected a blend");
        };
        assert!((dst_time - 5.0).abs() < 1e-5);

        let mut evaluator = RecordingEvaluator::default();
        let mut log = SnapshotLog::default();
        system.draw(id, &mut evaluator, &[], &mut log).unwrap();
        assert_eq!(evaluator.calls[0].0, "hero_alt");
        assert!(log.snapshots.is_empty());
    }

    #[test]
    fn from_config_reports_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let config = AnimationConfig::parse(r#"catalogs = ["absent.anims.toml"]"#).unwrap();
        assert!(AnimationSystem::from_config(&config, dir.path()).is_err());
    }

    #[test]
    fn clear_keeps_catalogs() {
        let mut system = system();
        system.spawn("hero", None).unwrap();
        system.clear();
        assert_eq!(system.actor_count(), 0);
        assert_eq!(system.catalog_count(), 2);
    }
}

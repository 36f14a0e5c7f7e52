//! Scripted timeline replay command

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tumble_anim::loader::load_catalog_from_file;
use tumble_anim::{AnimationConfig, AnimationSystem, CrouchPolicy, CursorEvent, OwnerInput, PoseRequest, TickEvents};
use tumble_core::{ActionId, TumbleError};

pub struct SimulateArgs {
    pub catalog: String,
    pub script: String,
    pub level: Option<u32>,
    pub config: Option<String>,
    pub format: String,
    pub crouch_down: Option<u16>,
    pub stand_up: Option<u16>,
}

/// A tick script:
/// ```toml
/// start = 0
///
/// [[tick]]
/// action = 1     # -1 requests no action; omitted keeps the last request
/// dt = 1.0
/// distance = 0.2
/// repeat = 8
/// ```
#[derive(Debug, Deserialize)]
struct Script {
    #[serde(default = "no_action")]
    start: i32,
    #[serde(default, rename = "tick")]
    ticks: Vec<TickDef>,
}

#[derive(Debug, Deserialize)]
struct TickDef {
    #[serde(default)]
    action: Option<i32>,
    #[serde(default = "default_dt")]
    dt: f32,
    #[serde(default)]
    distance: f32,
    #[serde(default)]
    crouch: Option<f32>,
    #[serde(default = "default_repeat")]
    repeat: u32,
}

fn no_action() -> i32 {
    -1
}

fn default_dt() -> f32 {
    1.0
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Serialize)]
struct TickRecord {
    tick: u32,
    requested: Option<ActionId>,
    pose: PoseRequest,
    events: TickEvents,
}

fn parse_script(content: &str) -> Result<Script, TumbleError> {
    let script: Script = toml::from_str(content)?;
    for (i, tick) in script.ticks.iter().enumerate() {
        if !tick.dt.is_finite() || tick.dt < 0.0 {
            return Err(TumbleError::ScriptError(format!(
                "tick {} has invalid dt {}",
                i, tick.dt
            )));
        }
    }
    Ok(script)
}

/// Build the session: from the config when given, with `catalog` loaded on top.
fn build_system(args: &SimulateArgs) -> Result<(AnimationSystem, String)> {
    let (mut system, level) = match &args.config {
        Some(path) => {
            let path = Path::new(path);
            let mut config = AnimationConfig::load(path)?;
            if args.level.is_some() {
                config.level = args.level;
            }
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            let system = AnimationSystem::from_config(&config, base)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            (system, config.level)
        }
        None => (AnimationSystem::new(), args.level),
    };
    let catalog = load_catalog_from_file(Path::new(&args.catalog), level)?;
    let model = catalog.model().to_string();
    system.add_catalog(catalog);
    Ok((system, model))
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let (mut system, model) = build_system(&args)?;

    let content = std::fs::read_to_string(&args.script)
        .with_context(|| format!("Failed to read script {}", args.script))?;
    let script = parse_script(&content)?;

    let actor = system.spawn(&model, ActionId::from_raw_signed(script.start)?)?;

    if let (Some(down), Some(up)) = (args.crouch_down, args.stand_up) {
        let policy = CrouchPolicy {
            crouch_down: ActionId::new(down)?,
            stand_up: ActionId::new(up)?,
        };
        system.set_policy(actor, Some(Box::new(policy)))?;
    }

    let mut records = Vec::new();
    let mut requested = system.timeline(actor).and_then(|t| t.requested_action());
    let mut tick = 0;
    for def in &script.ticks {
        if let Some(raw) = def.action {
            requested = ActionId::from_raw_signed(raw)?;
        }
        for _ in 0..def.repeat {
            tick += 1;
            system.request_action(actor, requested)?;
            system.set_input(
                actor,
                OwnerInput {
                    travel_distance: def.distance,
                    crouch_ratio: def.crouch,
                },
            )?;
            system.update(def.dt);

            let pose = system
                .pose_request(actor)
                .context("actor vanished during simulation")?;
            let events = system.consume_events(actor)?;
            records.push(TickRecord {
                tick,
                requested,
                pose,
                events,
            });
        }
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for record in &records {
            println!("{}", format_record(record));
        }
    }
    Ok(())
}

fn format_record(record: &TickRecord) -> String {
    let pose = match record.pose {
        PoseRequest::Rest => "rest".to_string(),
        PoseRequest::Steady { action, time } => format!("{} @ {:.3}", action, time),
        PoseRequest::Blend {
            src_action,
            src_time,
            dst_action,
            dst_time,
            weight,
        } => format!(
            "{} @ {:.3} -> {} @ {:.3} (w={:.3})",
            src_action, src_time, dst_action, dst_time, weight
        ),
    };
    let mut line = format!("tick {:>4}: {}", record.tick, pose);
    for (label, event) in [
        ("src", record.events.source),
        ("dst", record.events.destination),
    ] {
        match event {
            CursorEvent::None => {}
            CursorEvent::Finished => line.push_str(&format!(" [{} finished]", label)),
            CursorEvent::Looped => line.push_str(&format!(" [{} looped]", label)),
        }
    }
    line
}

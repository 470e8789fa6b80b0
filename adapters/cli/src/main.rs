#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a scripted Arcane Defence battle.
//!
//! The binary stands in for the surrounding game: it moves enemies along a
//! straight path, collects corpses, schedules upgrades, and prints every
//! event the engine produces.

use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;

use arcane_defence_core::{
    default_roster_config, Command, Event, PathProgress, Position, Roster, RosterConfig, TowerKind,
};
use arcane_defence_engine::Engine;
use arcane_defence_world::{self as world, query, World};

const PATH_LENGTH: f32 = 1000.0;

#[derive(Debug, Parser)]
#[command(name = "arcane-defence")]
#[command(about = "Runs a scripted tower battle and prints the event log")]
struct Args {
    /// Path to a JSON roster configuration; defaults to the built-in tuning.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of frames to simulate.
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 250)]
    frame_ms: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let roster = load_roster(args.config.as_deref())?;
    let dt = Duration::from_millis(args.frame_ms);

    let mut world = World::with_roster(roster);
    let mut engine = Engine::new();
    let mut events = Vec::new();

    let towers: Vec<_> = [
        (TowerKind::Fire, 100.0, 80.0),
        (TowerKind::Water, 250.0, 80.0),
        (TowerKind::Air, 400.0, 80.0),
        (TowerKind::Darkness, 550.0, 80.0),
        (TowerKind::Light, 700.0, 80.0),
        (TowerKind::Life, 620.0, 140.0),
    ]
    .into_iter()
    .map(|(kind, x, y)| {
        events.clear();
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind,
                position: Position::new(x, y),
            },
            &mut events,
        );
        match events[0] {
            Event::TowerPlaced { tower, .. } => tower,
            ref other => unreachable!("placement produced {other:?}"),
        }
    })
    .collect();

    for (x, health, cloaked) in [
        (0.0, 120.0, false),
        (-60.0, 160.0, false),
        (-120.0, 90.0, true),
        (-180.0, 200.0, false),
    ] {
        events.clear();
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                position: Position::new(x, 0.0),
                progress: PathProgress::new((x / PATH_LENGTH).max(0.0)),
                max_health: health,
                speed: 60.0,
                cloaked,
            },
            &mut events,
        );
    }

    // Two upgrade rounds lift every tower to its ability threshold.
    let upgrade_frames = [args.frames / 4, args.frames / 2];

    let mut kills = 0_u32;
    let mut gold = 0_u32;
    for frame in 1..=args.frames {
        let t = f64::from(frame) * dt.as_secs_f64();

        events.clear();
        if upgrade_frames.contains(&frame) {
            for tower in &towers {
                Engine::upgrade(&mut world, *tower, &mut events);
            }
        }
        engine.resolve_combat(&mut world, dt, &mut events);

        for event in &events {
            match event {
                Event::Kill { .. } => kills += 1,
                Event::GoldGranted { amount, .. } => gold += amount,
                _ => {}
            }
            println!("[{t:>6.2}s] {event:?}");
        }

        collect_corpses(&mut world, &events);
        advance_enemies(&mut world, dt);
    }

    println!("-- {kills} kill(s), {gold} gold earned over {} frames", args.frames);
    Ok(())
}

/// Despawns enemies killed this frame, as the surrounding game would.
fn collect_corpses(world: &mut World, events: &[Event]) {
    let mut sink = Vec::new();
    for event in events {
        if let Event::Kill { enemy, .. } = event {
            world::apply(world, Command::DespawnEnemy { enemy: *enemy }, &mut sink);
        }
    }
}

/// Straight-line stand-in for the game's path mover.
///
/// Speeds honour the world's slow and stun ledgers, so whirlpools and
/// shadow grips visibly delay the wave.
fn advance_enemies(world: &mut World, dt: Duration) {
    let view = query::enemy_view(world);
    let mut sink = Vec::new();
    for snapshot in view.iter() {
        let factor = query::speed_factor(world, snapshot.id).unwrap_or(0.0);
        let speed = query::base_speed(world, snapshot.id).unwrap_or(0.0);
        let x = snapshot.position.x() + speed * factor * dt.as_secs_f32();
        world::apply(
            world,
            Command::SyncEnemy {
                enemy: snapshot.id,
                position: Position::new(x, snapshot.position.y()),
                progress: PathProgress::new((x / PATH_LENGTH).clamp(0.0, 1.0)),
            },
            &mut sink,
        );
    }
}

fn load_roster(path: Option<&Path>) -> Result<Roster> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading roster configuration {}", path.display()))?;
            serde_json::from_str::<RosterConfig>(&raw)
                .with_context(|| format!("parsing roster configuration {}", path.display()))?
        }
        None => default_roster_config(),
    };
    config.validate().context("invalid roster configuration")
}

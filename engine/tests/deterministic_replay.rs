use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use arcane_defence_core::{Command, EnemyId, Event, PathProgress, Position, TowerKind};
use arcane_defence_engine::Engine;
use arcane_defence_world::{self as world, World};

#[test]
fn identical_runs_produce_identical_event_streams() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(fingerprint(&first), fingerprint(&second));

    let kills = first
        .iter()
        .filter(|event| matches!(event, Event::Kill { .. }))
        .count();
    assert!(kills >= 1, "the scripted battle downs at least one enemy");

    // A cloaked enemy is only ever hit by the Light tower or after a reveal.
    let cloaked = EnemyId::new(2);
    let reveal_index = first.iter().position(|event| {
        matches!(
            event,
            Event::EffectApplied {
                target: arcane_defence_core::EffectTarget::Enemy(enemy),
                ..
            } if *enemy == cloaked
        )
    });
    let hit_index = first
        .iter()
        .position(|event| matches!(event, Event::Hit { enemy, .. } if *enemy == cloaked));
    if let (Some(hit), Some(reveal)) = (hit_index, reveal_index) {
        assert!(hit <= reveal + 1, "cloaked hits start with the revealer");
    }
}

fn replay() -> Vec<Event> {
    let mut world = World::new();
    let mut engine = Engine::new();
    let mut events = Vec::new();

    for (kind, x, y) in [
        (TowerKind::Fire, 0.0, 0.0),
        (TowerKind::Water, 100.0, 0.0),
        (TowerKind::Darkness, 50.0, 50.0),
        (TowerKind::Light, 150.0, 0.0),
    ] {
        world::apply(
            &mut world,
            Command::PlaceTower {
                kind,
                position: Position::new(x, y),
            },
            &mut events,
        );
    }
    let spawns: [(f32, f32, f32, bool); 3] = [
        (40.0, 0.0, 60.0, false),
        (120.0, 0.0, 80.0, false),
        (140.0, 10.0, 50.0, true),
    ];
    for (x, y, health, cloaked) in spawns {
        world::apply(
            &mut world,
            Command::SpawnEnemy {
                position: Position::new(x, y),
                progress: PathProgress::new(x / 1000.0),
                max_health: health,
                speed: 60.0,
                cloaked,
            },
            &mut events,
        );
    }

    for frame in 0_u32..16 {
        engine.resolve_combat(&mut world, Duration::from_millis(250), &mut events);
        // Deterministic stand-in for the external mover.
        for (index, (x, y, ..)) in spawns.iter().enumerate() {
            let drift = 2.0 * (frame + 1) as f32;
            world::apply(
                &mut world,
                Command::SyncEnemy {
                    enemy: EnemyId::new(index as u32),
                    position: Position::new(x + drift, *y),
                    progress: PathProgress::new((x + drift) / 1000.0),
                },
                &mut events,
            );
        }
    }
    events
}

fn fingerprint(events: &[Event]) -> u64 {
    let mut hasher = DefaultHasher::new();
    format!("{events:?}").hash(&mut hasher);
    hasher.finish()
}

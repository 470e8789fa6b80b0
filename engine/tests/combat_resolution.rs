use std::time::Duration;

use arcane_defence_core::{
    default_roster_config, Command, EnemyId, Event, PathProgress, Position, TowerId, TowerKind,
    UpgradeError,
};
use arcane_defence_engine::Engine;
use arcane_defence_world::{self as world, query, World};

fn place(world: &mut World, kind: TowerKind, x: f32, y: f32) -> TowerId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::PlaceTower {
            kind,
            position: Position::new(x, y),
        },
        &mut events,
    );
    match events[0] {
        Event::TowerPlaced { tower, .. } => tower,
        ref other => panic!("unexpected event {other:?}"),
    }
}

fn spawn(world: &mut World, x: f32, y: f32, health: f32) -> EnemyId {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SpawnEnemy {
            position: Position::new(x, y),
            progress: PathProgress::new(0.5),
            max_health: health,
            speed: 60.0,
            cloaked: false,
        },
        &mut events,
    );
    match events[0] {
        Event::EnemySpawned { enemy, .. } => enemy,
        ref other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn a_level_one_fire_tower_downs_a_25_health_enemy_in_three_timed_hits() {
    let mut config = default_roster_config();
    let fire = config
        .towers
        .get_mut(&TowerKind::Fire)
        .expect("fire config present");
    fire.damage = 10.0;
    fire.cooldown = Duration::from_secs(1);
    let roster = config.validate().expect("roster validates");

    let mut world = World::with_roster(roster);
    let mut engine = Engine::new();
    let tower = place(&mut world, TowerKind::Fire, 0.0, 0.0);
    let enemy = spawn(&mut world, 50.0, 0.0, 25.0);

    let mut hits = Vec::new();
    let mut kills = Vec::new();
    let mut events = Vec::new();
    for frame in 1_u32..=8 {
        events.clear();
        engine.resolve_combat(&mut world, Duration::from_millis(500), &mut events);
        let t = f64::from(frame) * 0.5;
        for event in &events {
            match event {
                Event::Hit { damage, .. } => hits.push((t, *damage)),
                Event::Kill { .. } => kills.push(t),
                _ => {}
            }
        }
    }

    assert_eq!(hits.len(), 3, "hits: {hits:?}");
    assert_eq!(hits.iter().map(|(t, _)| *t).collect::<Vec<_>>(), vec![
        1.0, 2.0, 3.0
    ]);
    assert!(hits.iter().all(|(_, damage)| (*damage - 10.0).abs() < 1e-4));
    assert_eq!(kills, vec![3.0]);

    // The corpse lingers for the external collector but takes no further hits.
    assert!(query::enemy_view(&world).iter().next().is_none());
    let mut events = Vec::new();
    world::apply(&mut world, Command::DespawnEnemy { enemy }, &mut events);
    assert_eq!(events, vec![Event::EnemyDespawned { enemy }]);
    let _ = tower;
}

#[test]
fn reapplied_slows_refresh_instead_of_stacking() {
    let mut world = World::new();
    let mut engine = Engine::new();
    let _water = place(&mut world, TowerKind::Water, 0.0, 0.0);
    let enemy = spawn(&mut world, 50.0, 0.0, 10_000.0);

    let mut events = Vec::new();
    for _ in 0..3 {
        events.clear();
        engine.resolve_combat(&mut world, Duration::from_secs(1), &mut events);
    }

    // Three strikes landed three Slow applications onto one shared entry.
    let factor = query::speed_factor(&world, enemy).expect("enemy is alive");
    assert!((factor - 0.6).abs() < 1e-6, "factor: {factor}");
}

#[test]
fn upgrades_strictly_improve_stats_until_the_cap_rejects_them() {
    let mut world = World::new();
    let tower = place(&mut world, TowerKind::Fire, 0.0, 0.0);
    let max_level = query::roster(&world).tower(TowerKind::Fire).max_level;

    let mut previous = query::tower_view(&world)
        .get(tower)
        .map(|snapshot| snapshot.stats)
        .expect("tower exists");
    let mut events = Vec::new();
    for expected in 2..=max_level {
        events.clear();
        Engine::upgrade(&mut world, tower, &mut events);
        let snapshot = query::tower_view(&world)
            .get(tower)
            .copied()
            .expect("tower exists");
        assert_eq!(snapshot.level, expected);
        assert!(snapshot.stats.damage > previous.damage);
        assert!(snapshot.stats.range > previous.range);
        assert!(snapshot.stats.cooldown < previous.cooldown);
        previous = snapshot.stats;
    }

    events.clear();
    Engine::upgrade(&mut world, tower, &mut events);
    assert_eq!(
        events,
        vec![Event::UpgradeRejected {
            tower,
            reason: UpgradeError::AlreadyMaxLevel,
        }]
    );
}

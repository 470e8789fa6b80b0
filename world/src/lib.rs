#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Arcane Defence.
//!
//! The world owns every tower, enemy, status effect ledger, and hazard zone.
//! All mutation flows through [`apply`], which consumes [`Command`] values and
//! broadcasts [`Event`] values describing what actually changed. Systems and
//! adapters observe the world exclusively through the [`query`] module.

use std::time::Duration;

use arcane_defence_core::{
    scaling, Ability, AbilityTuning, Command, EffectKind, EffectSpec, EffectTarget, EnemyId, Event,
    Position, Roster, StrikeSpec, SupportSpec, TowerId, TowerKind, UpgradeError,
};

mod effects;
mod enemies;
mod hazards;
mod towers;

pub use effects::{Applied, EffectEntry, StatusLedger};

use enemies::{EnemyRegistry, EnemyState};
use hazards::Whirlpool;
use towers::TowerRegistry;

/// Authoritative simulation state.
#[derive(Debug)]
pub struct World {
    roster: Roster,
    towers: TowerRegistry,
    enemies: EnemyRegistry,
    whirlpools: Vec<Whirlpool>,
    tick_index: u64,
    expiry_scratch: Vec<EffectKind>,
}

impl World {
    /// Creates an empty world governed by the default tower roster.
    #[must_use]
    pub fn new() -> Self {
        Self::with_roster(Roster::default())
    }

    /// Creates an empty world governed by the provided roster.
    #[must_use]
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster,
            towers: TowerRegistry::new(),
            enemies: EnemyRegistry::new(),
            whirlpools: Vec::new(),
            tick_index: 0,
            expiry_scratch: Vec::new(),
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a command to the world, appending resulting events to `out_events`.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => tick(world, dt, out_events),
        Command::SpawnEnemy {
            position,
            progress,
            max_health,
            speed,
            cloaked,
        } => {
            let enemy = world
                .enemies
                .insert(position, progress, max_health, speed, cloaked);
            out_events.push(Event::EnemySpawned { enemy, position });
        }
        Command::SyncEnemy {
            enemy,
            position,
            progress,
        } => {
            if let Some(state) = world.enemies.get_mut(enemy) {
                if !state.dead {
                    state.position = position;
                    state.progress = progress;
                }
            }
        }
        Command::DespawnEnemy { enemy } => {
            if world.enemies.remove(enemy) {
                out_events.push(Event::EnemyDespawned { enemy });
            }
        }
        Command::PlaceTower { kind, position } => {
            let tower = world.towers.insert(kind, position, &world.roster);
            out_events.push(Event::TowerPlaced {
                tower,
                kind,
                position,
            });
        }
        Command::UpgradeTower { tower } => upgrade_tower(world, tower, out_events),
        Command::Strike {
            tower,
            strikes,
            surge,
        } => strike(world, tower, &strikes, surge, out_events),
        Command::ApplyEffect {
            source,
            enemy,
            effect,
        } => apply_effect(world, source, enemy, effect, out_events),
        Command::Support {
            tower,
            buffs,
            surge,
        } => support(world, tower, &buffs, surge, out_events),
        Command::OpenWhirlpool { tower, center } => open_whirlpool(world, tower, center),
    }
}

fn tick(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    world.tick_index += 1;
    out_events.push(Event::TimeAdvanced { dt });

    for tower in world.towers.iter_mut() {
        tower.elapsed = tower.elapsed.saturating_add(dt);
    }

    let mut expired = std::mem::take(&mut world.expiry_scratch);
    for enemy in world.enemies.iter_living_mut() {
        expired.clear();
        enemy.ledger.tick(dt, &mut expired);
        for kind in expired.drain(..) {
            out_events.push(Event::EffectExpired {
                target: EffectTarget::Enemy(enemy.id),
                kind,
            });
        }
    }
    for tower in world.towers.iter_mut() {
        expired.clear();
        tower.buffs.tick(dt, &mut expired);
        for kind in expired.drain(..) {
            out_events.push(Event::EffectExpired {
                target: EffectTarget::Tower(tower.id),
                kind,
            });
        }
    }
    world.expiry_scratch = expired;

    advance_whirlpools(world, dt, out_events);
}

fn advance_whirlpools(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    // Expired zones vanish without an event; their opening was announced.
    let mut zones = std::mem::take(&mut world.whirlpools);
    zones.retain_mut(|zone| zone.advance(dt));
    let now = world.tick_index;
    let dps_window = dt.as_secs_f32();
    for zone in &zones {
        let damage = zone.damage_per_second * dps_window;
        for enemy in world.enemies.iter_living_mut() {
            if !zone.covers(enemy.position) {
                continue;
            }
            let applied = enemy.ledger.apply(zone.source, zone.slow, now);
            out_events.push(Event::EffectApplied {
                source: zone.source,
                target: EffectTarget::Enemy(enemy.id),
                kind: zone.slow.kind,
                magnitude: applied.magnitude,
                duration: applied.duration,
            });
            damage_enemy(&world.roster, enemy, zone.source, damage, out_events);
        }
    }
    world.whirlpools = zones;
}

fn upgrade_tower(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
    let Some(state) = world.towers.get_mut(tower) else {
        out_events.push(Event::UpgradeRejected {
            tower,
            reason: UpgradeError::MissingTower,
        });
        return;
    };
    let config = world.roster.tower(state.kind);
    if state.level >= config.max_level {
        out_events.push(Event::UpgradeRejected {
            tower,
            reason: UpgradeError::AlreadyMaxLevel,
        });
        return;
    }
    state.level += 1;
    state.stats = scaling::stats_for(config, state.level);
    out_events.push(Event::TowerUpgraded {
        tower,
        level: state.level,
        stats: state.stats,
    });
}

fn strike(
    world: &mut World,
    tower: TowerId,
    strikes: &[StrikeSpec],
    surge: Option<Ability>,
    out_events: &mut Vec<Event>,
) {
    let Some(state) = world.towers.get_mut(tower) else {
        return;
    };
    state.consume_cooldown();
    let kind = state.kind;
    match kind {
        TowerKind::Fire | TowerKind::Earth => {
            if surge.is_some() {
                state.charge = 0;
            } else {
                state.charge = (state.charge + 1).min(charge_capacity(&world.roster, kind));
            }
        }
        TowerKind::Air | TowerKind::Darkness => {
            if surge.is_some() {
                state.cadence = 0;
            } else {
                state.cadence = wrap_cadence(state.cadence, cadence_period(&world.roster, kind));
            }
        }
        _ => {}
    }
    if let Some(ability) = surge {
        out_events.push(Event::AbilityTriggered { tower, ability });
    }
    for spec in strikes {
        if let Some(enemy) = world.enemies.get_mut(spec.enemy) {
            damage_enemy(&world.roster, enemy, tower, spec.damage, out_events);
        }
    }
}

fn apply_effect(
    world: &mut World,
    source: TowerId,
    enemy: EnemyId,
    effect: EffectSpec,
    out_events: &mut Vec<Event>,
) {
    let Some(state) = world.enemies.get_mut(enemy) else {
        return;
    };
    if state.dead {
        return;
    }
    let applied = state.ledger.apply(source, effect, world.tick_index);
    out_events.push(Event::EffectApplied {
        source,
        target: EffectTarget::Enemy(enemy),
        kind: effect.kind,
        magnitude: applied.magnitude,
        duration: applied.duration,
    });
}

fn support(
    world: &mut World,
    tower: TowerId,
    buffs: &[SupportSpec],
    surge: Option<Ability>,
    out_events: &mut Vec<Event>,
) {
    {
        let Some(state) = world.towers.get_mut(tower) else {
            return;
        };
        state.consume_cooldown();
        if surge.is_some() {
            state.cadence = 0;
        } else {
            state.cadence =
                wrap_cadence(state.cadence, cadence_period(&world.roster, TowerKind::Life));
        }
    }
    if let Some(ability) = surge {
        out_events.push(Event::AbilityTriggered { tower, ability });
        let (gold, lives) = blessing_amounts(&world.roster);
        if gold > 0 {
            out_events.push(Event::GoldGranted {
                tower,
                amount: gold,
            });
        }
        if lives > 0 {
            out_events.push(Event::LifeRestored {
                tower,
                amount: lives,
            });
        }
    }
    let now = world.tick_index;
    for buff in buffs {
        if let Some(ally) = world.towers.get_mut(buff.tower) {
            let applied = ally.buffs.apply(tower, buff.effect, now);
            out_events.push(Event::EffectApplied {
                source: tower,
                target: EffectTarget::Tower(buff.tower),
                kind: buff.effect.kind,
                magnitude: applied.magnitude,
                duration: applied.duration,
            });
        }
    }
}

fn open_whirlpool(world: &mut World, tower: TowerId, center: Position) {
    let config = world.roster.tower(TowerKind::Water);
    let AbilityTuning::Water {
        whirlpool_radius,
        whirlpool_duration,
        whirlpool_damage_per_second,
        whirlpool_slow,
        ..
    } = config.ability
    else {
        return;
    };
    world.whirlpools.push(Whirlpool {
        source: tower,
        center,
        radius: whirlpool_radius,
        remaining: whirlpool_duration,
        damage_per_second: whirlpool_damage_per_second,
        slow: whirlpool_slow,
    });
}

/// Applies damage, reports it, shares drain, and emits a kill exactly once.
fn damage_enemy(
    roster: &Roster,
    enemy: &mut EnemyState,
    tower: TowerId,
    amount: f32,
    out_events: &mut Vec<Event>,
) {
    if enemy.dead || amount <= 0.0 {
        return;
    }
    enemy.health.damage(amount);
    out_events.push(Event::Hit {
        tower,
        enemy: enemy.id,
        damage: amount,
    });
    let cap = drain_cap(roster);
    let mut claimed = 0.0_f32;
    for (source, share) in enemy.ledger.drain_shares() {
        let share = share.min(cap - claimed);
        if share <= 0.0 {
            break;
        }
        claimed += share;
        out_events.push(Event::ResourceDrained {
            tower: source,
            enemy: enemy.id,
            amount: amount * share,
        });
    }
    if enemy.health.is_depleted() {
        enemy.dead = true;
        out_events.push(Event::Kill {
            tower,
            enemy: enemy.id,
        });
    }
}

fn charge_capacity(roster: &Roster, kind: TowerKind) -> u32 {
    match roster.tower(kind).ability {
        AbilityTuning::Fire { orb_capacity, .. } => orb_capacity,
        AbilityTuning::Earth {
            crystal_capacity, ..
        } => crystal_capacity,
        _ => 0,
    }
}

fn cadence_period(roster: &Roster, kind: TowerKind) -> u32 {
    match roster.tower(kind).ability {
        AbilityTuning::Air {
            lightning_cadence, ..
        } => lightning_cadence,
        AbilityTuning::Darkness { stun_cadence, .. } => stun_cadence,
        AbilityTuning::Life {
            blessing_cadence, ..
        } => blessing_cadence,
        _ => 0,
    }
}

fn wrap_cadence(current: u32, period: u32) -> u32 {
    if period == 0 {
        return 0;
    }
    (current + 1) % period
}

fn drain_cap(roster: &Roster) -> f32 {
    match roster.tower(TowerKind::Darkness).ability {
        AbilityTuning::Darkness { drain_cap, .. } => drain_cap,
        _ => 0.0,
    }
}

fn buff_cap(roster: &Roster) -> f32 {
    match roster.tower(TowerKind::Life).ability {
        AbilityTuning::Life { buff_cap, .. } => buff_cap,
        _ => 0.0,
    }
}

fn blessing_amounts(roster: &Roster) -> (u32, u32) {
    match roster.tower(TowerKind::Life).ability {
        AbilityTuning::Life {
            blessing_gold,
            blessing_lives,
            ..
        } => (blessing_gold, blessing_lives),
        _ => (0, 0),
    }
}

/// Read-only access to world state for systems and adapters.
pub mod query {
    use super::{buff_cap, World};
    use arcane_defence_core::{
        EffectKind, EnemyId, EnemySnapshot, EnemyView, Roster, TowerId, TowerSnapshot, TowerView,
    };

    /// Provides read-only access to the tower roster governing this world.
    #[must_use]
    pub fn roster(world: &World) -> &Roster {
        &world.roster
    }

    /// Number of ticks applied to the world since creation.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Captures a read-only view of every tower, sorted by identifier.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        let cap = buff_cap(&world.roster);
        let snapshots: Vec<TowerSnapshot> = world
            .towers
            .iter()
            .map(|tower| TowerSnapshot {
                id: tower.id,
                kind: tower.kind,
                position: tower.position,
                level: tower.level,
                stats: tower.stats,
                ready: tower.ready(),
                charge: tower.charge,
                cadence: tower.cadence,
                buff: tower.buffs.capped_magnitude(EffectKind::DamageBuff, cap),
            })
            .collect();
        TowerView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of every living enemy, sorted by identifier.
    ///
    /// Dead enemies awaiting external collection are excluded.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        let snapshots: Vec<EnemySnapshot> = world
            .enemies
            .iter_living()
            .map(|enemy| EnemySnapshot {
                id: enemy.id,
                position: enemy.position,
                progress: enemy.progress,
                health: enemy.health,
                cloaked: enemy.cloaked,
                revealed: enemy.ledger.has(EffectKind::RevealWeakness),
                stunned: enemy.ledger.has(EffectKind::Stun),
                mark_bonus: enemy.ledger.magnitude_of(EffectKind::Mark),
            })
            .collect();
        EnemyView::from_snapshots(snapshots)
    }

    /// Movement multiplier the external mover should apply to one enemy.
    ///
    /// Returns `None` when the enemy is missing or dead. A stunned enemy
    /// reports `0.0` regardless of any active slow.
    #[must_use]
    pub fn speed_factor(world: &World, enemy: EnemyId) -> Option<f32> {
        let state = world.enemies.get(enemy)?;
        if state.dead {
            return None;
        }
        if state.ledger.has(EffectKind::Stun) {
            return Some(0.0);
        }
        Some(state.ledger.slow_factor())
    }

    /// Baseline speed assigned to an enemy at spawn.
    #[must_use]
    pub fn base_speed(world: &World, enemy: EnemyId) -> Option<f32> {
        world.enemies.get(enemy).map(|state| state.speed)
    }

    /// Tower credited with resource drains on an enemy, in application order.
    #[must_use]
    pub fn drain_sources(world: &World, enemy: EnemyId) -> Vec<TowerId> {
        world
            .enemies
            .get(enemy)
            .map(|state| state.ledger.drain_shares().map(|(id, _)| id).collect())
            .unwrap_or_default()
    }

    /// Number of whirlpool hazards currently open.
    #[must_use]
    pub fn whirlpool_count(world: &World) -> usize {
        world.whirlpools.len()
    }
}

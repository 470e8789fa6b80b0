#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Arcane Defence combat engine.
//!
//! This crate defines the message surface that connects external
//! collaborators, the authoritative world, and pure systems. Collaborators
//! submit [`Command`] values describing desired mutations, the world executes
//! those commands via its `apply` entry point, and then broadcasts [`Event`]
//! values for consumers to react to deterministically. Systems consume
//! immutable snapshot views and respond exclusively with new command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod scaling;

pub use config::{
    default_roster_config, AbilityTuning, ConfigError, GrowthCurve, Roster, RosterConfig,
    TowerConfig,
};

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the enemy identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location expressed in continuous world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position from world-unit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal world-unit coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical world-unit coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to another position.
    ///
    /// Range checks compare squared distances against squared radii so no
    /// square root is taken on the hot path.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Progress along the fixed path, where larger values are closer to breaching.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathProgress(f32);

impl PathProgress {
    /// Creates a new progress marker from the external mover's value.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Retrieves the raw progress value.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }

    /// Total ordering over progress values for deterministic sorting.
    #[must_use]
    pub fn cmp_total(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Hit points of an enemy, clamped between zero and the configured maximum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates a full health pool with the provided maximum.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Removes hit points, clamping at zero.
    pub fn damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    /// Restores hit points, clamping at the maximum.
    pub fn heal(&mut self, amount: f32) {
        self.current = (self.current + amount.max(0.0)).min(self.max);
    }

    /// Reports whether the pool is exhausted.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }
}

/// Elemental schools of tower available to the defender.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Single-target damage that charges orbs toward an area burst.
    Fire,
    /// Single-target damage plus Slow; whirlpool hazards at high level.
    Water,
    /// Multi-target gust; periodic chain lightning at high level.
    Air,
    /// Heavy single-target damage that charges crystals toward an eruption.
    Earth,
    /// No direct damage; buffs allied towers and blesses the defender.
    Life,
    /// Marks enemies for amplified damage; drains and stuns at high level.
    Darkness,
    /// Reveals cloaked enemies and punishes them; radiant bursts at high level.
    Light,
}

impl TowerKind {
    /// Every kind in declaration order, used for roster validation.
    pub const ALL: [TowerKind; 7] = [
        TowerKind::Fire,
        TowerKind::Water,
        TowerKind::Air,
        TowerKind::Earth,
        TowerKind::Life,
        TowerKind::Darkness,
        TowerKind::Light,
    ];
}

/// Magical status effects tracked by per-entity ledgers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Movement speed reduction applied by Water towers and whirlpools.
    Slow,
    /// Shadow mark that amplifies incoming damage from every tower.
    Mark,
    /// Complete immobilization applied by high-level Darkness towers.
    Stun,
    /// Reveals a cloaked enemy and exposes it to bonus Light damage.
    RevealWeakness,
    /// Damage amplification granted to a tower by nearby Life towers.
    DamageBuff,
    /// Converts a fraction of damage dealt to the bearer into tower resource.
    Drain,
}

impl EffectKind {
    /// Stacking policy governing repeated applications of this kind.
    #[must_use]
    pub const fn stacking(self) -> Stacking {
        match self {
            Self::Slow | Self::Mark | Self::Stun | Self::RevealWeakness => Stacking::RefreshMax,
            Self::DamageBuff | Self::Drain => Stacking::PerSource,
        }
    }
}

/// How repeated applications of an effect kind combine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stacking {
    /// A single shared entry; re-application keeps the maximum magnitude and
    /// the longest remaining duration, regardless of source.
    RefreshMax,
    /// One entry per source tower; the effective magnitude is the sum across
    /// entries, capped at a configured total.
    PerSource,
}

/// A concrete effect application: kind, strength, and lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectSpec {
    /// Kind of effect being applied.
    pub kind: EffectKind,
    /// Numeric multiplier or fraction, depending on the kind.
    pub magnitude: f32,
    /// Lifetime of the ledger entry; must be positive.
    pub duration: Duration,
}

/// Derived combat statistics for a tower at a specific level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatBundle {
    /// Damage dealt by a single strike before modifiers.
    pub damage: f32,
    /// Targeting radius in world units.
    pub range: f32,
    /// Minimum simulated time between successive actions.
    pub cooldown: Duration,
}

/// Escalated abilities announced through [`Event::AbilityTriggered`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    /// Fire's accumulated orbs detonating into area damage.
    FlameBurst,
    /// Water's persistent slowing hazard.
    Whirlpool,
    /// Air's bonus lightning strike.
    ChainLightning,
    /// Earth's crystal charge detonating around the tower.
    Eruption,
    /// Life's periodic gold and life grant.
    Blessing,
    /// Darkness's stunning grip.
    ShadowGrip,
    /// Light's burst across revealed enemies.
    RadiantBurst,
}

/// A single enemy struck by a tower, with the fully modified damage amount.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrikeSpec {
    /// Enemy receiving the damage.
    pub enemy: EnemyId,
    /// Damage after every attacker- and target-side modifier.
    pub damage: f32,
}

/// A single allied tower buffed by a Life tower's support action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupportSpec {
    /// Tower receiving the buff.
    pub tower: TowerId,
    /// Buff magnitude and duration; the kind must be `DamageBuff`.
    pub effect: EffectSpec,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the external scheduler's enemy enter the world.
    SpawnEnemy {
        /// Initial location of the enemy.
        position: Position,
        /// Initial progress along the path.
        progress: PathProgress,
        /// Maximum hit points granted to the enemy.
        max_health: f32,
        /// Baseline movement speed consumed by the external mover.
        speed: f32,
        /// Whether the enemy starts cloaked against normal targeting.
        cloaked: bool,
    },
    /// Writes the position computed by the external mover for one enemy.
    SyncEnemy {
        /// Enemy being repositioned.
        enemy: EnemyId,
        /// Updated location of the enemy.
        position: Position,
        /// Updated progress along the path.
        progress: PathProgress,
    },
    /// Removes an enemy that leaked or whose corpse was collected externally.
    DespawnEnemy {
        /// Enemy leaving the world.
        enemy: EnemyId,
    },
    /// Requests construction of a tower at the provided location.
    PlaceTower {
        /// Elemental school of the new tower.
        kind: TowerKind,
        /// Location of the new tower.
        position: Position,
    },
    /// Requests that a tower advance one upgrade level.
    UpgradeTower {
        /// Tower to upgrade.
        tower: TowerId,
    },
    /// Applies a resolved attack to one or more enemies.
    Strike {
        /// Tower performing the attack.
        tower: TowerId,
        /// Enemies struck, in targeting order, with final damage amounts.
        strikes: Vec<StrikeSpec>,
        /// Escalated ability that shaped this strike, if any.
        surge: Option<Ability>,
    },
    /// Applies a status effect to an enemy's ledger.
    ApplyEffect {
        /// Tower responsible for the effect.
        source: TowerId,
        /// Enemy receiving the effect.
        enemy: EnemyId,
        /// Effect kind, magnitude, and duration.
        effect: EffectSpec,
    },
    /// Applies a resolved support action from a Life tower.
    Support {
        /// Life tower performing the action.
        tower: TowerId,
        /// Allied towers buffed by the action, in deterministic order.
        buffs: Vec<SupportSpec>,
        /// Set to [`Ability::Blessing`] when the blessing cadence fires.
        surge: Option<Ability>,
    },
    /// Opens a slowing, damaging hazard zone at a position.
    OpenWhirlpool {
        /// Water tower that opened the zone.
        tower: TowerId,
        /// Center of the hazard.
        center: Position,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an enemy entered the world.
    EnemySpawned {
        /// Identifier assigned to the enemy by the world.
        enemy: EnemyId,
        /// Location the enemy occupies after spawning.
        position: Position,
    },
    /// Confirms that an enemy left the world.
    EnemyDespawned {
        /// Identifier of the removed enemy.
        enemy: EnemyId,
    },
    /// Confirms that a tower was constructed.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Elemental school of the constructed tower.
        kind: TowerKind,
        /// Location of the constructed tower.
        position: Position,
    },
    /// Confirms that a tower advanced one level.
    TowerUpgraded {
        /// Tower that was upgraded.
        tower: TowerId,
        /// Level reached by the upgrade.
        level: u8,
        /// Stats recomputed for the new level.
        stats: StatBundle,
    },
    /// Reports that an upgrade request was rejected.
    UpgradeRejected {
        /// Tower whose upgrade was refused.
        tower: TowerId,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Reports damage landing on an enemy.
    Hit {
        /// Tower that dealt the damage.
        tower: TowerId,
        /// Enemy that received the damage.
        enemy: EnemyId,
        /// Damage applied after clamping.
        damage: f32,
    },
    /// Reports that an enemy's health reached zero.
    Kill {
        /// Tower credited with the kill.
        tower: TowerId,
        /// Enemy that was destroyed.
        enemy: EnemyId,
    },
    /// Confirms that a status effect entered or refreshed a ledger.
    EffectApplied {
        /// Tower responsible for the effect.
        source: TowerId,
        /// Entity carrying the ledger entry.
        target: EffectTarget,
        /// Kind of effect applied.
        kind: EffectKind,
        /// Magnitude now in force for the entry.
        magnitude: f32,
        /// Remaining duration now in force for the entry.
        duration: Duration,
    },
    /// Reports that a ledger entry expired and was removed.
    EffectExpired {
        /// Entity that carried the entry.
        target: EffectTarget,
        /// Kind of effect that expired.
        kind: EffectKind,
    },
    /// Announces that a tower's escalated ability fired.
    AbilityTriggered {
        /// Tower whose ability fired.
        tower: TowerId,
        /// Ability that fired.
        ability: Ability,
    },
    /// Grants gold to the defender from a Life tower blessing.
    GoldGranted {
        /// Life tower responsible for the grant.
        tower: TowerId,
        /// Amount of gold granted.
        amount: u32,
    },
    /// Restores defender lives from a Life tower blessing.
    LifeRestored {
        /// Life tower responsible for the restoration.
        tower: TowerId,
        /// Number of lives restored.
        amount: u32,
    },
    /// Returns resource to a Darkness tower from a drained enemy.
    ResourceDrained {
        /// Darkness tower receiving the resource.
        tower: TowerId,
        /// Enemy whose suffering was converted.
        enemy: EnemyId,
        /// Resource amount returned.
        amount: f32,
    },
}

/// Entity that carries a status effect ledger entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTarget {
    /// The entry lives on an enemy's ledger.
    Enemy(EnemyId),
    /// The entry lives on a tower's ledger.
    Tower(TowerId),
}

/// Reasons an upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// The tower already reached its configured maximum level.
    AlreadyMaxLevel,
    /// No tower with the provided identifier exists.
    MissingTower,
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Elemental school of the tower.
    pub kind: TowerKind,
    /// Location of the tower.
    pub position: Position,
    /// Current upgrade level.
    pub level: u8,
    /// Stats cached for the current level.
    pub stats: StatBundle,
    /// Whether the cooldown has elapsed since the last action.
    pub ready: bool,
    /// Accumulated ability charge (Fire orbs, Earth crystals).
    pub charge: u32,
    /// Actions performed since the last cadence-gated ability.
    pub cadence: u32,
    /// Capped sum of damage buffs currently on the tower.
    pub buff: f32,
}

/// Immutable representation of a single enemy's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemySnapshot {
    /// Identifier allocated to the enemy by the world.
    pub id: EnemyId,
    /// Location written by the external mover.
    pub position: Position,
    /// Progress along the path written by the external mover.
    pub progress: PathProgress,
    /// Remaining and maximum hit points.
    pub health: Health,
    /// Whether the enemy hides from normal targeting.
    pub cloaked: bool,
    /// Whether a reveal effect currently exposes the enemy.
    pub revealed: bool,
    /// Whether a stun currently immobilizes the enemy.
    pub stunned: bool,
    /// Mark bonus currently amplifying incoming damage.
    pub mark_bonus: f32,
}

/// Read-only snapshot describing all towers in the world.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a snapshot by tower identifier.
    #[must_use]
    pub fn get(&self, tower: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&tower, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all living enemies in the world.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured enemy snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

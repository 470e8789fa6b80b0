//! Authoritative tower state management utilities.

use std::collections::BTreeMap;
use std::time::Duration;

use arcane_defence_core::{scaling, Position, Roster, StatBundle, TowerId, TowerKind};

use crate::effects::StatusLedger;

/// A tower stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) position: Position,
    pub(crate) level: u8,
    /// Stats cached for the current level; recomputed only on upgrade.
    pub(crate) stats: StatBundle,
    /// Simulated time accumulated since the last successful action.
    pub(crate) elapsed: Duration,
    /// Ability charge (Fire orbs, Earth crystals), bounded by the capacity.
    pub(crate) charge: u32,
    /// Actions performed since the last cadence-gated ability.
    pub(crate) cadence: u32,
    /// Damage buffs granted by Life towers.
    pub(crate) buffs: StatusLedger,
}

impl TowerState {
    pub(crate) fn ready(&self) -> bool {
        self.elapsed >= self.stats.cooldown
    }

    /// Marks a completed action: the cooldown restarts from zero.
    pub(crate) fn consume_cooldown(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

/// Registry that stores towers and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct TowerRegistry {
    entries: BTreeMap<TowerId, TowerState>,
    next_id: u32,
}

impl TowerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Constructs a tower at level one with stats derived from the roster.
    pub(crate) fn insert(
        &mut self,
        kind: TowerKind,
        position: Position,
        roster: &Roster,
    ) -> TowerId {
        let id = TowerId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let stats = scaling::stats_for(roster.tower(kind), 1);
        let _ = self.entries.insert(
            id,
            TowerState {
                id,
                kind,
                position,
                level: 1,
                stats,
                elapsed: Duration::ZERO,
                charge: 0,
                cadence: 0,
                buffs: StatusLedger::new(),
            },
        );
        id
    }

    pub(crate) fn get_mut(&mut self, id: TowerId) -> Option<&mut TowerState> {
        self.entries.get_mut(&id)
    }

    /// Iterator over towers in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &TowerState> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut TowerState> {
        self.entries.values_mut()
    }
}

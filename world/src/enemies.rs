//! Authoritative enemy state management utilities.
//!
//! Enemies are created only by the external wave scheduler's `SpawnEnemy`
//! commands and removed only by `DespawnEnemy`; combat merely decrements
//! health and mutates ledgers. A killed enemy stays in the registry as a
//! corpse, invisible to targeting, until the external collaborator collects
//! it.

use std::collections::BTreeMap;

use arcane_defence_core::{EnemyId, Health, PathProgress, Position};

use crate::effects::StatusLedger;

/// An enemy stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct EnemyState {
    pub(crate) id: EnemyId,
    /// Location written by the external mover via `SyncEnemy`.
    pub(crate) position: Position,
    /// Progress along the path written by the external mover.
    pub(crate) progress: PathProgress,
    pub(crate) health: Health,
    /// Baseline speed the external mover scales by the slow factor.
    pub(crate) speed: f32,
    /// Whether the enemy hides from normal targeting.
    pub(crate) cloaked: bool,
    /// Set once when health first reaches zero; gates the single Kill event.
    pub(crate) dead: bool,
    pub(crate) ledger: StatusLedger,
}

/// Registry that stores enemies and manages identifier allocation.
#[derive(Debug, Default)]
pub(crate) struct EnemyRegistry {
    entries: BTreeMap<EnemyId, EnemyState>,
    next_id: u32,
}

impl EnemyRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(
        &mut self,
        position: Position,
        progress: PathProgress,
        max_health: f32,
        speed: f32,
        cloaked: bool,
    ) -> EnemyId {
        let id = EnemyId::new(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);

        let _ = self.entries.insert(
            id,
            EnemyState {
                id,
                position,
                progress,
                health: Health::new(max_health),
                speed,
                cloaked,
                dead: false,
                ledger: StatusLedger::new(),
            },
        );
        id
    }

    pub(crate) fn remove(&mut self, id: EnemyId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub(crate) fn get(&self, id: EnemyId) -> Option<&EnemyState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EnemyId) -> Option<&mut EnemyState> {
        self.entries.get_mut(&id)
    }

    /// Iterator over living enemies in ascending identifier order.
    pub(crate) fn iter_living(&self) -> impl Iterator<Item = &EnemyState> {
        self.entries.values().filter(|enemy| !enemy.dead)
    }

    pub(crate) fn iter_living_mut(&mut self) -> impl Iterator<Item = &mut EnemyState> {
        self.entries.values_mut().filter(|enemy| !enemy.dead)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(registry: &mut EnemyRegistry) -> EnemyId {
        registry.insert(
            Position::new(0.0, 0.0),
            PathProgress::new(0.0),
            50.0,
            60.0,
            false,
        )
    }

    #[test]
    fn registry_allocates_ascending_identifiers() {
        let mut registry = EnemyRegistry::new();
        let first = spawn(&mut registry);
        let second = spawn(&mut registry);
        assert!(first < second);
    }

    #[test]
    fn dead_enemies_are_hidden_from_the_living_iterator() {
        let mut registry = EnemyRegistry::new();
        let first = spawn(&mut registry);
        let second = spawn(&mut registry);

        let corpse = registry.get_mut(first).expect("enemy present");
        corpse.health.damage(100.0);
        corpse.dead = true;

        let living: Vec<EnemyId> = registry.iter_living().map(|enemy| enemy.id).collect();
        assert_eq!(living, vec![second]);
        assert!(registry.get(first).is_some(), "corpse remains until despawn");
    }

    #[test]
    fn removal_reports_whether_the_enemy_existed() {
        let mut registry = EnemyRegistry::new();
        let id = spawn(&mut registry);
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic target candidates from world
//! snapshots.
//!
//! For every tower the system emits the full ordered candidate list rather
//! than a single pick, because multi-target schools consume an ordered prefix
//! of it. The ordering is total: farthest path progress first, then nearest
//! distance, then ascending enemy identifier, so any "first K" subset is
//! reproducible across runs.

use arcane_defence_core::{
    AbilityTuning, EnemyId, EnemyView, PathProgress, Position, Roster, TowerId, TowerKind,
    TowerView,
};

/// One enemy reachable by a tower, carrying the fields combat needs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    /// Enemy under consideration.
    pub enemy: EnemyId,
    /// Location of the enemy when the snapshot was taken.
    pub position: Position,
    /// Progress of the enemy along the path.
    pub progress: PathProgress,
    /// Squared distance between the tower and the enemy.
    pub distance_squared: f32,
    /// Whether the enemy is cloaked against normal targeting.
    pub cloaked: bool,
    /// Whether a reveal effect currently overrides the cloak.
    pub revealed: bool,
    /// Summed Mark magnitude amplifying damage against this enemy.
    pub mark_bonus: f32,
}

/// Ordered candidates computed for a single tower.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetList {
    /// Tower the candidates belong to.
    pub tower: TowerId,
    /// Candidates in priority order; never empty.
    pub candidates: Vec<Candidate>,
}

/// Allied towers reachable by a single Life tower's support aura.
#[derive(Clone, Debug, PartialEq)]
pub struct SupportList {
    /// Life tower providing the aura.
    pub tower: TowerId,
    /// Allies in priority order; never empty.
    pub allies: Vec<TowerId>,
}

/// Tower targeting system producing deterministic candidate lists.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    scratch: Vec<Candidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes ordered enemy candidates for every tower in the snapshot.
    ///
    /// The output buffer is cleared before populating it. Towers without a
    /// single reachable candidate contribute no list, and Life towers are
    /// skipped entirely because they act through [`support_targets`]
    /// instead.
    ///
    /// [`support_targets`]: TowerTargeting::support_targets
    pub fn handle(&mut self, towers: &TowerView, enemies: &EnemyView, out: &mut Vec<TargetList>) {
        out.clear();

        for tower in towers.iter() {
            if tower.kind == TowerKind::Life {
                continue;
            }
            let range_squared = tower.stats.range * tower.stats.range;
            let sees_cloaked = tower.kind == TowerKind::Light;

            self.scratch.clear();
            for enemy in enemies.iter() {
                if enemy.cloaked && !sees_cloaked && !enemy.revealed {
                    continue;
                }
                let distance_squared = tower.position.distance_squared(enemy.position);
                if distance_squared > range_squared {
                    continue;
                }
                self.scratch.push(Candidate {
                    enemy: enemy.id,
                    position: enemy.position,
                    progress: enemy.progress,
                    distance_squared,
                    cloaked: enemy.cloaked,
                    revealed: enemy.revealed,
                    mark_bonus: enemy.mark_bonus,
                });
            }
            if self.scratch.is_empty() {
                continue;
            }
            self.scratch.sort_by(|a, b| {
                b.progress
                    .cmp_total(&a.progress)
                    .then_with(|| a.distance_squared.total_cmp(&b.distance_squared))
                    .then_with(|| a.enemy.cmp(&b.enemy))
            });
            out.push(TargetList {
                tower: tower.id,
                candidates: self.scratch.clone(),
            });
        }
    }

    /// Computes the allied towers inside each Life tower's support aura.
    ///
    /// The aura radius comes from the roster rather than the tower's combat
    /// range. The source tower never appears among its own allies, and
    /// allies are ordered by distance with the tower identifier as the
    /// tie-break.
    pub fn support_targets(
        &mut self,
        roster: &Roster,
        towers: &TowerView,
        out: &mut Vec<SupportList>,
    ) {
        out.clear();

        let AbilityTuning::Life { support_radius, .. } =
            roster.tower(TowerKind::Life).ability
        else {
            return;
        };
        let radius_squared = support_radius * support_radius;

        for source in towers.iter() {
            if source.kind != TowerKind::Life {
                continue;
            }
            let mut allies: Vec<(f32, TowerId)> = towers
                .iter()
                .filter(|ally| ally.id != source.id)
                .filter_map(|ally| {
                    let distance_squared = source.position.distance_squared(ally.position);
                    (distance_squared <= radius_squared).then_some((distance_squared, ally.id))
                })
                .collect();
            if allies.is_empty() {
                continue;
            }
            allies.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
            out.push(SupportList {
                tower: source.id,
                allies: allies.into_iter().map(|(_, id)| id).collect(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcane_defence_core::{EnemySnapshot, Health, StatBundle, TowerSnapshot};
    use std::time::Duration;

    fn tower(id: u32, kind: TowerKind, x: f32, y: f32, range: f32) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind,
            position: Position::new(x, y),
            level: 1,
            stats: StatBundle {
                damage: 10.0,
                range,
                cooldown: Duration::from_secs(1),
            },
            ready: true,
            charge: 0,
            cadence: 0,
            buff: 0.0,
        }
    }

    fn enemy(id: u32, x: f32, y: f32, progress: f32) -> EnemySnapshot {
        EnemySnapshot {
            id: EnemyId::new(id),
            position: Position::new(x, y),
            progress: PathProgress::new(progress),
            health: Health::new(100.0),
            cloaked: false,
            revealed: false,
            stunned: false,
            mark_bonus: 0.0,
        }
    }

    fn target_ids(lists: &[TargetList], tower: TowerId) -> Vec<EnemyId> {
        lists
            .iter()
            .find(|list| list.tower == tower)
            .map(|list| list.candidates.iter().map(|c| c.enemy).collect())
            .unwrap_or_default()
    }

    #[test]
    fn candidates_order_by_progress_then_distance_then_id() {
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Fire, 0.0, 0.0, 200.0)]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 100.0, 0.0, 0.4),
            enemy(1, 50.0, 0.0, 0.9),
            // Same progress as enemy 1 but farther from the tower.
            enemy(2, 80.0, 0.0, 0.9),
            // Identical to enemy 2 in both keys; id breaks the tie.
            enemy(3, 0.0, 80.0, 0.9),
        ]);
        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.handle(&towers, &enemies, &mut lists);

        assert_eq!(
            target_ids(&lists, TowerId::new(0)),
            vec![
                EnemyId::new(1),
                EnemyId::new(2),
                EnemyId::new(3),
                EnemyId::new(0)
            ]
        );
    }

    #[test]
    fn enemies_outside_range_are_excluded_and_empty_lists_are_dropped() {
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Fire, 0.0, 0.0, 100.0),
            tower(1, TowerKind::Water, 1000.0, 1000.0, 100.0),
        ]);
        let enemies = EnemyView::from_snapshots(vec![
            enemy(0, 100.0, 0.0, 0.5),
            enemy(1, 101.0, 0.0, 0.5),
        ]);
        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.handle(&towers, &enemies, &mut lists);

        // The range boundary is inclusive; the second tower reaches nothing.
        assert_eq!(lists.len(), 1);
        assert_eq!(target_ids(&lists, TowerId::new(0)), vec![EnemyId::new(0)]);
    }

    #[test]
    fn cloaked_enemies_are_visible_only_to_light_or_while_revealed() {
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Fire, 0.0, 0.0, 200.0),
            tower(1, TowerKind::Light, 0.0, 0.0, 200.0),
        ]);
        let mut cloaked = enemy(0, 50.0, 0.0, 0.5);
        cloaked.cloaked = true;
        let enemies = EnemyView::from_snapshots(vec![cloaked]);

        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.handle(&towers, &enemies, &mut lists);
        assert!(target_ids(&lists, TowerId::new(0)).is_empty());
        assert_eq!(target_ids(&lists, TowerId::new(1)), vec![EnemyId::new(0)]);

        let mut revealed = enemy(0, 50.0, 0.0, 0.5);
        revealed.cloaked = true;
        revealed.revealed = true;
        let enemies = EnemyView::from_snapshots(vec![revealed]);
        system.handle(&towers, &enemies, &mut lists);
        assert_eq!(target_ids(&lists, TowerId::new(0)), vec![EnemyId::new(0)]);
    }

    #[test]
    fn life_towers_never_produce_enemy_candidates() {
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Life, 0.0, 0.0, 200.0)]);
        let enemies = EnemyView::from_snapshots(vec![enemy(0, 10.0, 0.0, 0.5)]);
        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.handle(&towers, &enemies, &mut lists);
        assert!(lists.is_empty());
    }

    #[test]
    fn support_targets_exclude_the_source_and_order_by_distance() {
        let roster = Roster::default();
        let towers = TowerView::from_snapshots(vec![
            tower(0, TowerKind::Life, 0.0, 0.0, 150.0),
            tower(1, TowerKind::Fire, 100.0, 0.0, 150.0),
            tower(2, TowerKind::Water, 50.0, 0.0, 150.0),
            // Beyond the default 200 unit aura.
            tower(3, TowerKind::Earth, 300.0, 0.0, 150.0),
        ]);
        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.support_targets(&roster, &towers, &mut lists);

        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].tower, TowerId::new(0));
        assert_eq!(lists[0].allies, vec![TowerId::new(2), TowerId::new(1)]);
    }

    #[test]
    fn lone_life_towers_produce_no_support_list() {
        let roster = Roster::default();
        let towers = TowerView::from_snapshots(vec![tower(0, TowerKind::Life, 0.0, 0.0, 150.0)]);
        let mut system = TowerTargeting::new();
        let mut lists = Vec::new();
        system.support_targets(&roster, &towers, &mut lists);
        assert!(lists.is_empty());
    }
}

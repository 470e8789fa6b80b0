#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves tower actions into world commands.
//!
//! Given the ordered candidate lists from targeting, the resolver decides
//! which towers act this tick and what each action looks like: the struck
//! enemies with their final damage amounts, the status effects riding along,
//! and whether an escalated ability fires. It never mutates state itself;
//! every decision becomes a [`Command`] for the world to apply.

use arcane_defence_core::{
    scaling, Ability, AbilityTuning, Command, Roster, StrikeSpec, SupportSpec, TowerKind,
    TowerSnapshot, TowerView,
};
use arcane_defence_system_targeting::{Candidate, SupportList, TargetList};

/// Combat resolver that turns candidate lists into strike and support
/// commands.
#[derive(Debug, Default)]
pub struct CombatResolver {
    scratch: Vec<Command>,
}

impl CombatResolver {
    /// Creates a new combat resolver with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one tick of tower actions, appending commands to `out`.
    ///
    /// Towers act in ascending identifier order. A tower whose cooldown has
    /// not elapsed, or that has no candidate this tick, contributes nothing
    /// and keeps its accumulated cooldown.
    pub fn handle(
        &mut self,
        roster: &Roster,
        towers: &TowerView,
        targets: &[TargetList],
        support: &[SupportList],
        out: &mut Vec<Command>,
    ) {
        self.scratch.clear();

        for tower in towers.iter() {
            if !tower.ready {
                continue;
            }
            if tower.kind == TowerKind::Life {
                if let Some(list) = find_support(support, tower) {
                    resolve_support(roster, tower, list, &mut self.scratch);
                }
            } else if let Some(list) = find_targets(targets, tower) {
                resolve_strike(roster, tower, &list.candidates, &mut self.scratch);
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_targets<'a>(targets: &'a [TargetList], tower: &TowerSnapshot) -> Option<&'a TargetList> {
    targets
        .binary_search_by_key(&tower.id, |list| list.tower)
        .ok()
        .map(|index| &targets[index])
}

fn find_support<'a>(support: &'a [SupportList], tower: &TowerSnapshot) -> Option<&'a SupportList> {
    support
        .binary_search_by_key(&tower.id, |list| list.tower)
        .ok()
        .map(|index| &support[index])
}

/// Final damage one strike deals to one candidate.
///
/// Applies the attacker's capped damage buff, the target's Mark bonus, and
/// the cloak bonus when a Light tower strikes a cloaked enemy.
fn strike_damage(tower: &TowerSnapshot, candidate: &Candidate, cloak_bonus: f32) -> f32 {
    let mut damage = tower.stats.damage * (1.0 + tower.buff) * (1.0 + candidate.mark_bonus);
    if candidate.cloaked && cloak_bonus > 0.0 {
        damage *= 1.0 + cloak_bonus;
    }
    damage
}

fn resolve_strike(
    roster: &Roster,
    tower: &TowerSnapshot,
    candidates: &[Candidate],
    out: &mut Vec<Command>,
) {
    let Some(primary) = candidates.first() else {
        return;
    };
    let config = roster.tower(tower.kind);
    let unlocked = scaling::ability_unlocked(config, tower.level);

    match config.ability {
        AbilityTuning::Fire {
            orb_capacity,
            burst_radius,
            burst_damage_factor,
        } => {
            let surge = unlocked && tower.charge >= orb_capacity;
            let mut strikes = vec![StrikeSpec {
                enemy: primary.enemy,
                damage: strike_damage(tower, primary, 0.0),
            }];
            if surge {
                let radius_squared = burst_radius * burst_radius;
                for candidate in &candidates[1..] {
                    if candidate.position.distance_squared(primary.position) <= radius_squared {
                        strikes.push(StrikeSpec {
                            enemy: candidate.enemy,
                            damage: strike_damage(tower, candidate, 0.0) * burst_damage_factor,
                        });
                    }
                }
            }
            out.push(Command::Strike {
                tower: tower.id,
                strikes,
                surge: surge.then_some(Ability::FlameBurst),
            });
        }
        AbilityTuning::Water { slow, .. } => {
            out.push(Command::Strike {
                tower: tower.id,
                strikes: vec![StrikeSpec {
                    enemy: primary.enemy,
                    damage: strike_damage(tower, primary, 0.0),
                }],
                surge: unlocked.then_some(Ability::Whirlpool),
            });
            out.push(Command::ApplyEffect {
                source: tower.id,
                enemy: primary.enemy,
                effect: slow,
            });
            if unlocked {
                out.push(Command::OpenWhirlpool {
                    tower: tower.id,
                    center: primary.position,
                });
            }
        }
        AbilityTuning::Air {
            gust_width,
            lightning_cadence,
            lightning_damage_factor,
        } => {
            let surge =
                unlocked && lightning_cadence > 0 && tower.cadence + 1 >= lightning_cadence;
            let width = gust_width.max(1) as usize;
            let mut strikes: Vec<StrikeSpec> = candidates
                .iter()
                .take(width)
                .map(|candidate| StrikeSpec {
                    enemy: candidate.enemy,
                    damage: strike_damage(tower, candidate, 0.0),
                })
                .collect();
            if surge {
                strikes.push(StrikeSpec {
                    enemy: primary.enemy,
                    damage: strike_damage(tower, primary, 0.0) * lightning_damage_factor,
                });
            }
            out.push(Command::Strike {
                tower: tower.id,
                strikes,
                surge: surge.then_some(Ability::ChainLightning),
            });
        }
        AbilityTuning::Earth {
            crystal_capacity,
            eruption_radius,
            eruption_damage_factor,
        } => {
            let surge = unlocked && tower.charge >= crystal_capacity;
            let mut strikes = vec![StrikeSpec {
                enemy: primary.enemy,
                damage: strike_damage(tower, primary, 0.0),
            }];
            if surge {
                let radius_squared = eruption_radius * eruption_radius;
                for candidate in &candidates[1..] {
                    if candidate.distance_squared <= radius_squared {
                        strikes.push(StrikeSpec {
                            enemy: candidate.enemy,
                            damage: strike_damage(tower, candidate, 0.0) * eruption_damage_factor,
                        });
                    }
                }
            }
            out.push(Command::Strike {
                tower: tower.id,
                strikes,
                surge: surge.then_some(Ability::Eruption),
            });
        }
        AbilityTuning::Darkness {
            mark,
            drain,
            stun,
            stun_cadence,
            ..
        } => {
            let surge = unlocked && stun_cadence > 0 && tower.cadence + 1 >= stun_cadence;
            out.push(Command::Strike {
                tower: tower.id,
                strikes: vec![StrikeSpec {
                    enemy: primary.enemy,
                    damage: strike_damage(tower, primary, 0.0),
                }],
                surge: surge.then_some(Ability::ShadowGrip),
            });
            out.push(Command::ApplyEffect {
                source: tower.id,
                enemy: primary.enemy,
                effect: mark,
            });
            if unlocked {
                out.push(Command::ApplyEffect {
                    source: tower.id,
                    enemy: primary.enemy,
                    effect: drain,
                });
            }
            if surge {
                out.push(Command::ApplyEffect {
                    source: tower.id,
                    enemy: primary.enemy,
                    effect: stun,
                });
            }
        }
        AbilityTuning::Light {
            cloak_bonus,
            reveal,
            burst_width,
        } => {
            let surge = unlocked && primary.revealed;
            let width = if surge { burst_width.max(1) as usize } else { 1 };
            let struck: Vec<&Candidate> = candidates.iter().take(width).collect();
            let strikes: Vec<StrikeSpec> = struck
                .iter()
                .map(|candidate| StrikeSpec {
                    enemy: candidate.enemy,
                    damage: strike_damage(tower, candidate, cloak_bonus),
                })
                .collect();
            out.push(Command::Strike {
                tower: tower.id,
                strikes,
                surge: surge.then_some(Ability::RadiantBurst),
            });
            for candidate in struck {
                out.push(Command::ApplyEffect {
                    source: tower.id,
                    enemy: candidate.enemy,
                    effect: reveal,
                });
            }
        }
        AbilityTuning::Life { .. } => {}
    }
}

fn resolve_support(
    roster: &Roster,
    tower: &TowerSnapshot,
    list: &SupportList,
    out: &mut Vec<Command>,
) {
    let config = roster.tower(TowerKind::Life);
    let AbilityTuning::Life {
        buff,
        blessing_cadence,
        ..
    } = config.ability
    else {
        return;
    };
    let unlocked = scaling::ability_unlocked(config, tower.level);
    let surge = unlocked && blessing_cadence > 0 && tower.cadence + 1 >= blessing_cadence;
    out.push(Command::Support {
        tower: tower.id,
        buffs: list
            .allies
            .iter()
            .map(|ally| SupportSpec {
                tower: *ally,
                effect: buff,
            })
            .collect(),
        surge: surge.then_some(Ability::Blessing),
    });
}

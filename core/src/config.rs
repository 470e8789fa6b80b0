//! Externally supplied tuning data for the tower roster.
//!
//! Every magnitude, duration, radius, cadence, and stacking cap consumed by
//! the combat systems originates here. Files are deserialized into
//! [`RosterConfig`], validated exactly once at load time, and converted into
//! the infallible [`Roster`] lookup table so no configuration miss can occur
//! mid-tick.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EffectKind, EffectSpec, TowerKind};

/// Errors detected while validating roster configuration at load time.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A tower kind is missing from the roster file entirely.
    #[error("no configuration provided for tower kind {0:?}")]
    UnknownTowerType(TowerKind),
    /// A tower kind carries the ability block of a different kind.
    #[error("tower kind {kind:?} carries an ability block for a different kind")]
    AbilityMismatch {
        /// Kind whose ability block was mismatched.
        kind: TowerKind,
    },
    /// A stat, effect, or ability value violates its permitted range.
    #[error("malformed configuration for {kind:?}: {reason}")]
    MalformedEffectConfig {
        /// Kind whose configuration was rejected.
        kind: TowerKind,
        /// Human-readable description of the violated constraint.
        reason: &'static str,
    },
}

/// Per-level multiplicative growth applied by the upgrade scaler.
///
/// Damage and range factors must be at least one and the cooldown factor must
/// sit in `(0, 1]`, which keeps every scaling curve monotone in the level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthCurve {
    /// Factor applied to damage for each level gained.
    pub damage_factor: f32,
    /// Factor applied to range for each level gained.
    pub range_factor: f32,
    /// Factor applied to cooldown for each level gained.
    pub cooldown_factor: f32,
}

/// Kind-specific ability tuning selected by the tower's elemental school.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AbilityTuning {
    /// Fire accumulates orbs and detonates them into an area burst.
    Fire {
        /// Orbs accumulated before a burst becomes available.
        orb_capacity: u32,
        /// Radius around the primary target struck by the burst.
        burst_radius: f32,
        /// Fraction of strike damage dealt to each burst victim.
        burst_damage_factor: f32,
    },
    /// Water slows targets and opens whirlpool hazards at high level.
    Water {
        /// Slow applied by every strike.
        slow: EffectSpec,
        /// Radius of the whirlpool hazard.
        whirlpool_radius: f32,
        /// Lifetime of the whirlpool hazard.
        whirlpool_duration: Duration,
        /// Damage per second dealt inside the whirlpool.
        whirlpool_damage_per_second: f32,
        /// Slow applied to enemies caught in the whirlpool.
        whirlpool_slow: EffectSpec,
    },
    /// Air strikes several targets and periodically adds lightning.
    Air {
        /// Number of ordered candidates struck by a gust.
        gust_width: u32,
        /// Actions between lightning bonuses once unlocked.
        lightning_cadence: u32,
        /// Fraction of strike damage added by the lightning bonus.
        lightning_damage_factor: f32,
    },
    /// Earth accumulates crystals and detonates them around the tower.
    Earth {
        /// Crystals accumulated before an eruption becomes available.
        crystal_capacity: u32,
        /// Radius around the tower struck by the eruption.
        eruption_radius: f32,
        /// Fraction of strike damage dealt to each eruption victim.
        eruption_damage_factor: f32,
    },
    /// Life buffs allied towers and periodically blesses the defender.
    Life {
        /// Radius of the tower-to-tower support query.
        support_radius: f32,
        /// Buff granted to each allied tower in the support radius.
        buff: EffectSpec,
        /// Cap on the summed buff magnitude a single tower may carry.
        buff_cap: f32,
        /// Actions between blessings once unlocked.
        blessing_cadence: u32,
        /// Gold granted per blessing.
        blessing_gold: u32,
        /// Lives restored per blessing.
        blessing_lives: u32,
    },
    /// Darkness marks targets and drains or stuns them at high level.
    Darkness {
        /// Mark applied by every strike.
        mark: EffectSpec,
        /// Drain applied by every strike once unlocked.
        drain: EffectSpec,
        /// Cap on the summed drain fraction a single enemy may carry.
        drain_cap: f32,
        /// Stun applied on cadence once unlocked.
        stun: EffectSpec,
        /// Actions between stuns once unlocked.
        stun_cadence: u32,
    },
    /// Light reveals cloaked enemies and bursts across revealed ones.
    Light {
        /// Bonus fraction of damage against cloaked enemies.
        cloak_bonus: f32,
        /// Reveal effect set on every struck enemy.
        reveal: EffectSpec,
        /// Number of ordered candidates struck by a radiant burst.
        burst_width: u32,
    },
}

impl AbilityTuning {
    fn matches(&self, kind: TowerKind) -> bool {
        matches!(
            (self, kind),
            (Self::Fire { .. }, TowerKind::Fire)
                | (Self::Water { .. }, TowerKind::Water)
                | (Self::Air { .. }, TowerKind::Air)
                | (Self::Earth { .. }, TowerKind::Earth)
                | (Self::Life { .. }, TowerKind::Life)
                | (Self::Darkness { .. }, TowerKind::Darkness)
                | (Self::Light { .. }, TowerKind::Light)
        )
    }
}

/// Complete tuning for a single tower kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Damage dealt by a level-one strike before modifiers.
    pub damage: f32,
    /// Level-one targeting radius in world units.
    pub range: f32,
    /// Level-one minimum time between actions.
    pub cooldown: Duration,
    /// Highest level the tower may reach.
    pub max_level: u8,
    /// Level at which the escalated ability unlocks.
    pub threshold_level: u8,
    /// Per-level growth applied by the upgrade scaler.
    pub growth: GrowthCurve,
    /// Kind-specific ability tuning.
    pub ability: AbilityTuning,
}

impl TowerConfig {
    fn validate(&self, kind: TowerKind) -> Result<(), ConfigError> {
        let malformed = |reason| ConfigError::MalformedEffectConfig { kind, reason };

        if !self.ability.matches(kind) {
            return Err(ConfigError::AbilityMismatch { kind });
        }
        if self.damage < 0.0 {
            return Err(malformed("base damage must not be negative"));
        }
        if self.range <= 0.0 {
            return Err(malformed("base range must be positive"));
        }
        if self.cooldown.is_zero() {
            return Err(malformed("base cooldown must be positive"));
        }
        if self.max_level == 0 {
            return Err(malformed("maximum level must be at least one"));
        }
        if self.threshold_level == 0 || self.threshold_level > self.max_level {
            return Err(malformed("threshold level must lie within the level range"));
        }
        if self.growth.damage_factor < 1.0 {
            return Err(malformed("damage growth factor must be at least one"));
        }
        if self.growth.range_factor < 1.0 {
            return Err(malformed("range growth factor must be at least one"));
        }
        if self.growth.cooldown_factor <= 0.0 || self.growth.cooldown_factor > 1.0 {
            return Err(malformed("cooldown growth factor must lie in (0, 1]"));
        }

        self.validate_ability(kind)
    }

    fn validate_ability(&self, kind: TowerKind) -> Result<(), ConfigError> {
        let malformed = |reason| ConfigError::MalformedEffectConfig { kind, reason };
        let check_effect = |effect: &EffectSpec, expected: EffectKind| {
            if effect.kind != expected {
                return Err(malformed("effect spec declares an unexpected kind"));
            }
            if effect.duration.is_zero() {
                return Err(malformed("effect duration must be positive"));
            }
            if effect.magnitude < 0.0 {
                return Err(malformed("effect magnitude must not be negative"));
            }
            Ok(())
        };

        match &self.ability {
            AbilityTuning::Fire {
                orb_capacity,
                burst_radius,
                burst_damage_factor,
            } => {
                if *orb_capacity == 0 {
                    return Err(malformed("orb capacity must be positive"));
                }
                if *burst_radius <= 0.0 {
                    return Err(malformed("burst radius must be positive"));
                }
                if *burst_damage_factor < 0.0 {
                    return Err(malformed("burst damage factor must not be negative"));
                }
            }
            AbilityTuning::Water {
                slow,
                whirlpool_radius,
                whirlpool_duration,
                whirlpool_damage_per_second,
                whirlpool_slow,
            } => {
                check_effect(slow, EffectKind::Slow)?;
                check_effect(whirlpool_slow, EffectKind::Slow)?;
                if *whirlpool_radius <= 0.0 {
                    return Err(malformed("whirlpool radius must be positive"));
                }
                if whirlpool_duration.is_zero() {
                    return Err(malformed("whirlpool duration must be positive"));
                }
                if *whirlpool_damage_per_second < 0.0 {
                    return Err(malformed("whirlpool damage must not be negative"));
                }
            }
            AbilityTuning::Air {
                gust_width,
                lightning_cadence,
                lightning_damage_factor,
            } => {
                if *gust_width == 0 {
                    return Err(malformed("gust width must be positive"));
                }
                if *lightning_cadence == 0 {
                    return Err(malformed("lightning cadence must be positive"));
                }
                if *lightning_damage_factor < 0.0 {
                    return Err(malformed("lightning damage factor must not be negative"));
                }
            }
            AbilityTuning::Earth {
                crystal_capacity,
                eruption_radius,
                eruption_damage_factor,
            } => {
                if *crystal_capacity == 0 {
                    return Err(malformed("crystal capacity must be positive"));
                }
                if *eruption_radius <= 0.0 {
                    return Err(malformed("eruption radius must be positive"));
                }
                if *eruption_damage_factor < 0.0 {
                    return Err(malformed("eruption damage factor must not be negative"));
                }
            }
            AbilityTuning::Life {
                support_radius,
                buff,
                buff_cap,
                blessing_cadence,
                ..
            } => {
                check_effect(buff, EffectKind::DamageBuff)?;
                if *support_radius <= 0.0 {
                    return Err(malformed("support radius must be positive"));
                }
                if *buff_cap < 0.0 {
                    return Err(malformed("buff cap must not be negative"));
                }
                if *blessing_cadence == 0 {
                    return Err(malformed("blessing cadence must be positive"));
                }
            }
            AbilityTuning::Darkness {
                mark,
                drain,
                drain_cap,
                stun,
                stun_cadence,
            } => {
                check_effect(mark, EffectKind::Mark)?;
                check_effect(drain, EffectKind::Drain)?;
                check_effect(stun, EffectKind::Stun)?;
                if *drain_cap < 0.0 {
                    return Err(malformed("drain cap must not be negative"));
                }
                if *stun_cadence == 0 {
                    return Err(malformed("stun cadence must be positive"));
                }
            }
            AbilityTuning::Light {
                cloak_bonus,
                reveal,
                burst_width,
            } => {
                check_effect(reveal, EffectKind::RevealWeakness)?;
                if *cloak_bonus < 0.0 {
                    return Err(malformed("cloak bonus must not be negative"));
                }
                if *burst_width == 0 {
                    return Err(malformed("burst width must be positive"));
                }
            }
        }

        Ok(())
    }
}

/// Roster file contents prior to validation.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RosterConfig {
    /// Tuning keyed by tower kind; every kind must be present.
    pub towers: BTreeMap<TowerKind, TowerConfig>,
}

impl RosterConfig {
    /// Validates the file contents and produces the infallible roster.
    pub fn validate(mut self) -> Result<Roster, ConfigError> {
        let mut configs = Vec::with_capacity(TowerKind::ALL.len());
        for kind in TowerKind::ALL {
            let config = self
                .towers
                .remove(&kind)
                .ok_or(ConfigError::UnknownTowerType(kind))?;
            config.validate(kind)?;
            configs.push(config);
        }

        let configs: [TowerConfig; 7] = match configs.try_into() {
            Ok(array) => array,
            // Unreachable: the loop above pushes exactly one entry per kind.
            Err(_) => return Err(ConfigError::UnknownTowerType(TowerKind::Fire)),
        };
        Ok(Roster { configs })
    }
}

// Map keys require Ord for the BTreeMap roster file.
impl Ord for TowerKind {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        kind_index(*self).cmp(&kind_index(*other))
    }
}

impl PartialOrd for TowerKind {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

const fn kind_index(kind: TowerKind) -> usize {
    match kind {
        TowerKind::Fire => 0,
        TowerKind::Water => 1,
        TowerKind::Air => 2,
        TowerKind::Earth => 3,
        TowerKind::Life => 4,
        TowerKind::Darkness => 5,
        TowerKind::Light => 6,
    }
}

/// Validated tuning table with an infallible per-kind lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    configs: [TowerConfig; 7],
}

impl Roster {
    /// Retrieves the tuning for the provided tower kind.
    #[must_use]
    pub fn tower(&self, kind: TowerKind) -> &TowerConfig {
        &self.configs[kind_index(kind)]
    }
}

impl Default for Roster {
    fn default() -> Self {
        match default_roster_config().validate() {
            Ok(roster) => roster,
            // The built-in tuning is covered by tests and always validates.
            Err(_) => Roster {
                configs: TowerKind::ALL.map(|_| fallback_config()),
            },
        }
    }
}

fn fallback_config() -> TowerConfig {
    TowerConfig {
        damage: 10.0,
        range: 150.0,
        cooldown: Duration::from_secs(1),
        max_level: 1,
        threshold_level: 1,
        growth: GrowthCurve {
            damage_factor: 1.0,
            range_factor: 1.0,
            cooldown_factor: 1.0,
        },
        ability: AbilityTuning::Fire {
            orb_capacity: 1,
            burst_radius: 1.0,
            burst_damage_factor: 0.0,
        },
    }
}

fn effect(kind: EffectKind, magnitude: f32, duration: Duration) -> EffectSpec {
    EffectSpec {
        kind,
        magnitude,
        duration,
    }
}

const DEFAULT_GROWTH: GrowthCurve = GrowthCurve {
    damage_factor: 1.25,
    range_factor: 1.1,
    cooldown_factor: 0.9,
};

/// Built-in tuning mirroring the original game's balance table.
#[must_use]
pub fn default_roster_config() -> RosterConfig {
    let base = |damage: f32, range: f32, cooldown_ms: u64, ability: AbilityTuning| TowerConfig {
        damage,
        range,
        cooldown: Duration::from_millis(cooldown_ms),
        max_level: 5,
        threshold_level: 3,
        growth: DEFAULT_GROWTH,
        ability,
    };

    let mut towers = BTreeMap::new();
    let _ = towers.insert(
        TowerKind::Fire,
        base(
            20.0,
            150.0,
            1_000,
            AbilityTuning::Fire {
                orb_capacity: 4,
                burst_radius: 40.0,
                burst_damage_factor: 0.3,
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Water,
        base(
            15.0,
            150.0,
            800,
            AbilityTuning::Water {
                slow: effect(EffectKind::Slow, 0.4, Duration::from_millis(2_500)),
                whirlpool_radius: 90.0,
                whirlpool_duration: Duration::from_millis(2_500),
                whirlpool_damage_per_second: 4.0,
                whirlpool_slow: effect(EffectKind::Slow, 0.5, Duration::from_millis(700)),
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Air,
        base(
            10.0,
            175.0,
            400,
            AbilityTuning::Air {
                gust_width: 3,
                lightning_cadence: 4,
                lightning_damage_factor: 0.75,
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Earth,
        base(
            25.0,
            200.0,
            1_500,
            AbilityTuning::Earth {
                crystal_capacity: 3,
                eruption_radius: 120.0,
                eruption_damage_factor: 0.5,
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Life,
        base(
            15.0,
            150.0,
            1_200,
            AbilityTuning::Life {
                support_radius: 200.0,
                buff: effect(EffectKind::DamageBuff, 0.2, Duration::from_secs(3)),
                buff_cap: 0.5,
                blessing_cadence: 8,
                blessing_gold: 5,
                blessing_lives: 1,
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Darkness,
        base(
            30.0,
            150.0,
            1_400,
            AbilityTuning::Darkness {
                mark: effect(EffectKind::Mark, 0.2, Duration::from_secs(5)),
                drain: effect(EffectKind::Drain, 0.05, Duration::from_secs(4)),
                drain_cap: 0.25,
                stun: effect(EffectKind::Stun, 1.0, Duration::from_millis(500)),
                stun_cadence: 5,
            },
        ),
    );
    let _ = towers.insert(
        TowerKind::Light,
        base(
            25.0,
            175.0,
            600,
            AbilityTuning::Light {
                cloak_bonus: 0.5,
                reveal: effect(EffectKind::RevealWeakness, 0.25, Duration::from_millis(1_500)),
                burst_width: 3,
            },
        ),
    );

    RosterConfig { towers }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_roster_validates() {
        assert!(default_roster_config().validate().is_ok());
    }

    #[test]
    fn roster_lookup_covers_every_kind() {
        let roster = Roster::default();
        for kind in TowerKind::ALL {
            assert!(roster.tower(kind).ability.matches(kind), "{kind:?}");
        }
    }

    #[test]
    fn missing_kind_is_rejected_as_unknown_tower_type() {
        let mut config = default_roster_config();
        let _ = config.towers.remove(&TowerKind::Darkness);
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownTowerType(TowerKind::Darkness))
        );
    }

    #[test]
    fn zero_duration_effect_is_rejected() {
        let mut config = default_roster_config();
        let water = config
            .towers
            .get_mut(&TowerKind::Water)
            .expect("water config present");
        if let AbilityTuning::Water { slow, .. } = &mut water.ability {
            slow.duration = Duration::ZERO;
        }

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MalformedEffectConfig {
                kind: TowerKind::Water,
                ..
            })
        ));
    }

    #[test]
    fn negative_magnitude_effect_is_rejected() {
        let mut config = default_roster_config();
        let darkness = config
            .towers
            .get_mut(&TowerKind::Darkness)
            .expect("darkness config present");
        if let AbilityTuning::Darkness { mark, .. } = &mut darkness.ability {
            mark.magnitude = -0.5;
        }

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MalformedEffectConfig {
                kind: TowerKind::Darkness,
                ..
            })
        ));
    }

    #[test]
    fn mismatched_ability_block_is_rejected() {
        let mut config = default_roster_config();
        let fire_ability = config
            .towers
            .get(&TowerKind::Fire)
            .expect("fire config present")
            .ability
            .clone();
        let water = config
            .towers
            .get_mut(&TowerKind::Water)
            .expect("water config present");
        water.ability = fire_ability;

        assert_eq!(
            config.validate(),
            Err(ConfigError::AbilityMismatch {
                kind: TowerKind::Water
            })
        );
    }

    #[test]
    fn shrinking_cooldown_growth_is_rejected_outside_unit_interval() {
        let mut config = default_roster_config();
        let air = config
            .towers
            .get_mut(&TowerKind::Air)
            .expect("air config present");
        air.growth.cooldown_factor = 1.5;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MalformedEffectConfig {
                kind: TowerKind::Air,
                ..
            })
        ));
    }

    #[test]
    fn threshold_above_cap_is_rejected() {
        let mut config = default_roster_config();
        let earth = config
            .towers
            .get_mut(&TowerKind::Earth)
            .expect("earth config present");
        earth.threshold_level = earth.max_level + 1;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::MalformedEffectConfig {
                kind: TowerKind::Earth,
                ..
            })
        ));
    }
}

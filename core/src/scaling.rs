//! Pure upgrade scaler mapping (tower kind, level) to a stat bundle.
//!
//! The scaler is called when a tower is constructed or upgraded; the result
//! is cached on the tower and never recomputed during ticks.

use crate::{StatBundle, TowerConfig};

/// Derives the stat bundle for a tower at the provided level.
///
/// Levels are clamped into `[1, max_level]`: a level of zero falls back to
/// the level-one stats and levels beyond the cap clamp to the cap rather
/// than failing. The configured growth curve keeps damage and range
/// monotonically non-decreasing and cooldown monotonically non-increasing.
#[must_use]
pub fn stats_for(config: &TowerConfig, level: u8) -> StatBundle {
    let level = level.clamp(1, config.max_level);
    let steps = i32::from(level) - 1;

    StatBundle {
        damage: config.damage * config.growth.damage_factor.powi(steps),
        range: config.range * config.growth.range_factor.powi(steps),
        cooldown: config
            .cooldown
            .mul_f32(config.growth.cooldown_factor.powi(steps)),
    }
}

/// Reports whether the escalated ability is unlocked at the provided level.
#[must_use]
pub fn ability_unlocked(config: &TowerConfig, level: u8) -> bool {
    level >= config.threshold_level
}

#[cfg(test)]
mod tests {
    use super::{ability_unlocked, stats_for};
    use crate::{default_roster_config, TowerKind};

    #[test]
    fn stats_scale_monotonically_with_level() {
        let roster = default_roster_config().validate().expect("valid roster");

        for kind in TowerKind::ALL {
            let config = roster.tower(kind);
            let mut previous = stats_for(config, 1);
            for level in 2..=config.max_level {
                let current = stats_for(config, level);
                assert!(current.damage >= previous.damage, "{kind:?} level {level}");
                assert!(current.range >= previous.range, "{kind:?} level {level}");
                assert!(
                    current.cooldown <= previous.cooldown,
                    "{kind:?} level {level}"
                );
                previous = current;
            }
        }
    }

    #[test]
    fn level_zero_falls_back_to_level_one_stats() {
        let roster = default_roster_config().validate().expect("valid roster");
        let config = roster.tower(TowerKind::Fire);
        assert_eq!(stats_for(config, 0), stats_for(config, 1));
    }

    #[test]
    fn levels_beyond_the_cap_clamp_to_the_cap() {
        let roster = default_roster_config().validate().expect("valid roster");
        let config = roster.tower(TowerKind::Earth);
        assert_eq!(
            stats_for(config, config.max_level),
            stats_for(config, u8::MAX)
        );
    }

    #[test]
    fn ability_unlocks_exactly_at_the_threshold() {
        let roster = default_roster_config().validate().expect("valid roster");
        let config = roster.tower(TowerKind::Darkness);
        assert!(!ability_unlocked(config, config.threshold_level - 1));
        assert!(ability_unlocked(config, config.threshold_level));
    }
}

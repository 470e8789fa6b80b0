//! Persistent area hazards opened by escalated tower abilities.

use std::time::Duration;

use arcane_defence_core::{EffectSpec, Position, TowerId};

/// A whirlpool zone that slows and damages enemies caught inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Whirlpool {
    /// Water tower credited with the zone's damage.
    pub(crate) source: TowerId,
    pub(crate) center: Position,
    pub(crate) radius: f32,
    pub(crate) remaining: Duration,
    pub(crate) damage_per_second: f32,
    /// Short-lived slow reapplied to occupants every tick.
    pub(crate) slow: EffectSpec,
}

impl Whirlpool {
    /// Advances the zone's lifetime; returns `false` once it has expired.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.remaining = self.remaining.saturating_sub(dt);
        !self.remaining.is_zero()
    }

    pub(crate) fn covers(&self, position: Position) -> bool {
        self.center.distance_squared(position) <= self.radius * self.radius
    }
}

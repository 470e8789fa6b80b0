//! Per-entity status effect ledger and its stacking rules.

use std::time::Duration;

use arcane_defence_core::{EffectKind, EffectSpec, Stacking, TowerId};

/// A single active effect owned by an entity's ledger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectEntry {
    /// Kind of the active effect.
    pub kind: EffectKind,
    /// Magnitude currently in force.
    pub magnitude: f32,
    /// Remaining lifetime of the entry.
    pub remaining: Duration,
    /// Tower that contributed the entry.
    pub source: TowerId,
    /// Tick index at which the entry was applied or last refreshed.
    pub applied_at: u64,
}

/// Magnitude and duration now in force after an application.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Applied {
    /// Magnitude of the ledger entry after merging.
    pub magnitude: f32,
    /// Remaining duration of the ledger entry after merging.
    pub duration: Duration,
}

/// Collection of active status effects owned by one enemy or tower.
///
/// Refreshable kinds keep a single shared entry whose magnitude and duration
/// are the maximum of every application. Source-keyed kinds keep one entry
/// per contributing tower and are summed (and capped) at query time.
#[derive(Clone, Debug, Default)]
pub struct StatusLedger {
    entries: Vec<EffectEntry>,
}

impl StatusLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies an effect following its kind's stacking policy.
    ///
    /// Returns the magnitude and duration in force after merging, which is
    /// what the world reports through `EffectApplied`.
    pub fn apply(&mut self, source: TowerId, spec: EffectSpec, now: u64) -> Applied {
        let slot = match spec.kind.stacking() {
            Stacking::RefreshMax => self.entries.iter_mut().find(|entry| entry.kind == spec.kind),
            Stacking::PerSource => self
                .entries
                .iter_mut()
                .find(|entry| entry.kind == spec.kind && entry.source == source),
        };

        match slot {
            Some(entry) => {
                entry.magnitude = entry.magnitude.max(spec.magnitude);
                entry.remaining = entry.remaining.max(spec.duration);
                entry.source = source;
                entry.applied_at = now;
                Applied {
                    magnitude: entry.magnitude,
                    duration: entry.remaining,
                }
            }
            None => {
                self.entries.push(EffectEntry {
                    kind: spec.kind,
                    magnitude: spec.magnitude,
                    remaining: spec.duration,
                    source,
                    applied_at: now,
                });
                Applied {
                    magnitude: spec.magnitude,
                    duration: spec.duration,
                }
            }
        }
    }

    /// Advances every entry by the elapsed time and removes expired entries.
    ///
    /// Expired kinds are pushed onto `expired` in entry order so the caller
    /// can emit `EffectExpired` events. Removal happens before any query in
    /// the same tick: a zero-duration entry never influences damage.
    pub fn tick(&mut self, dt: Duration, expired: &mut Vec<EffectKind>) {
        for entry in &mut self.entries {
            entry.remaining = entry.remaining.saturating_sub(dt);
        }
        self.entries.retain(|entry| {
            let keep = !entry.remaining.is_zero();
            if !keep {
                expired.push(entry.kind);
            }
            keep
        });
    }

    /// Magnitude of a refreshable kind, or zero when absent.
    #[must_use]
    pub fn magnitude_of(&self, kind: EffectKind) -> f32 {
        self.entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| entry.magnitude)
            .sum()
    }

    /// Summed magnitude of a source-keyed kind, capped at the provided total.
    #[must_use]
    pub fn capped_magnitude(&self, kind: EffectKind, cap: f32) -> f32 {
        self.magnitude_of(kind).min(cap)
    }

    /// Reports whether any entry of the kind is active.
    #[must_use]
    pub fn has(&self, kind: EffectKind) -> bool {
        self.entries.iter().any(|entry| entry.kind == kind)
    }

    /// Fraction of base movement speed remaining under the active Slow.
    #[must_use]
    pub fn slow_factor(&self) -> f32 {
        (1.0 - self.magnitude_of(EffectKind::Slow)).clamp(0.0, 1.0)
    }

    /// Drain contributions as `(source tower, fraction)` in entry order.
    pub fn drain_shares(&self) -> impl Iterator<Item = (TowerId, f32)> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.kind == EffectKind::Drain)
            .map(|entry| (entry.source, entry.magnitude))
    }

    /// Active entries in application order, used by queries and tests.
    #[must_use]
    pub fn entries(&self) -> &[EffectEntry] {
        &self.entries
    }
}

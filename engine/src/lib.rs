#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-tick orchestration of combat resolution.
//!
//! The engine owns the pure systems and their intermediate buffers and runs
//! the fixed pipeline external collaborators call once per frame: advance
//! the clock, snapshot the world, compute targets, resolve actions, and
//! apply the resulting command batch back to the world.

use std::time::Duration;

use arcane_defence_core::{Command, Event, TowerId};
use arcane_defence_system_combat::CombatResolver;
use arcane_defence_system_targeting::{SupportList, TargetList, TowerTargeting};
use arcane_defence_world::{self as world, query, World};

/// Combat resolution pipeline with reusable buffers.
#[derive(Debug, Default)]
pub struct Engine {
    targeting: TowerTargeting,
    resolver: CombatResolver,
    targets: Vec<TargetList>,
    support: Vec<SupportList>,
    commands: Vec<Command>,
}

impl Engine {
    /// Creates an engine with empty buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves one frame of combat, appending produced events to
    /// `out_events`.
    ///
    /// The tick is applied first, so cooldowns and ledgers reflect `dt`
    /// before any tower acts. Commands are applied in resolver order, which
    /// follows ascending tower identifiers.
    pub fn resolve_combat(
        &mut self,
        world: &mut World,
        dt: Duration,
        out_events: &mut Vec<Event>,
    ) {
        world::apply(world, Command::Tick { dt }, out_events);

        let towers = query::tower_view(world);
        let enemies = query::enemy_view(world);
        self.targeting.handle(&towers, &enemies, &mut self.targets);
        let roster = query::roster(world);
        self.targeting
            .support_targets(roster, &towers, &mut self.support);

        self.commands.clear();
        self.resolver.handle(
            roster,
            &towers,
            &self.targets,
            &self.support,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(world, command, out_events);
        }
    }

    /// Forwards an upgrade request to the world.
    pub fn upgrade(world: &mut World, tower: TowerId, out_events: &mut Vec<Event>) {
        world::apply(world, Command::UpgradeTower { tower }, out_events);
    }
}

//! Boss entity creation and management
//!
//! Bosses are enemies with health-driven phases, a one-time enrage and an
//! archetype policy that specialises the shared state machine.

pub mod berserker;
pub mod necromancer;
pub mod ranged;
pub mod speed;
pub mod tank;

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use hecs::{Entity, World};
use serde::{Deserialize, Serialize};

use crate::data::{BossTemplate, BossTemplates, SimConfig};
use crate::ecs::{Brain, Faction, Name, Position, Vec2, Velocity};
use crate::entities::behavior::Behavior;

pub use berserker::BerserkerBoss;
pub use necromancer::NecromancerBoss;
pub use ranged::{RangedBoss, ShotPattern};
pub use speed::SpeedBoss;
pub use tank::TankBoss;

/// Boss archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Tank,
    Speed,
    Ranged,
    Berserker,
    Necromancer,
}

impl BossKind {
    pub const ALL: [BossKind; 5] = [
        BossKind::Tank,
        BossKind::Speed,
        BossKind::Ranged,
        BossKind::Berserker,
        BossKind::Necromancer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BossKind::Tank => "tank",
            BossKind::Speed => "speed",
            BossKind::Ranged => "ranged",
            BossKind::Berserker => "berserker",
            BossKind::Necromancer => "necromancer",
        }
    }
}

impl fmt::Display for BossKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BossKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BossKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown boss kind: {}", s))
    }
}

/// Phase for a health fraction: `1 + floor((1 - hf) * N)`, clamped to `[1, N]`
pub fn phase_for(health_fraction: f32, phase_count: u32) -> u32 {
    let phase_count = phase_count.max(1);
    let lost = (1.0 - health_fraction.clamp(0.0, 1.0)) * phase_count as f32;
    (1 + lost.floor() as u32).min(phase_count)
}

/// Phase and enrage bookkeeping shared by every boss
#[derive(Debug, Clone, PartialEq)]
pub struct BossCore {
    pub kind: BossKind,
    pub title: String,
    pub phase_count: u32,
    current_phase: u32,
    pub enrage_threshold: f32,
    enraged: bool,
    pub gold_drop: u32,
}

impl BossCore {
    pub fn new(
        kind: BossKind,
        title: impl Into<String>,
        phase_count: u32,
        enrage_threshold: f32,
        gold_drop: u32,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            phase_count: phase_count.max(1),
            current_phase: 1,
            enrage_threshold,
            enraged: false,
            gold_drop,
        }
    }

    pub fn from_template<T>(kind: BossKind, template: &BossTemplate<T>) -> Self {
        Self::new(
            kind,
            template.title.clone(),
            template.phase_count,
            template.enrage_threshold,
            template.gold_drop,
        )
    }

    pub fn current_phase(&self) -> u32 {
        self.current_phase
    }

    pub fn is_enraged(&self) -> bool {
        self.enraged
    }

    /// Advance to the phase for `health_fraction`, returning every phase
    /// newly entered in order. Phases never regress.
    pub fn advance_phase(&mut self, health_fraction: f32) -> RangeInclusive<u32> {
        let target = phase_for(health_fraction, self.phase_count);
        let entered = (self.current_phase + 1)..=target;
        if target > self.current_phase {
            self.current_phase = target;
        }
        entered
    }

    /// Latch enrage the first time health is at or below the threshold
    pub fn check_enrage(&mut self, health_fraction: f32) -> bool {
        if self.enraged || health_fraction > self.enrage_threshold {
            return false;
        }
        self.enraged = true;
        true
    }
}

/// Spawn a boss of `kind` from its template
pub fn spawn_boss(
    world: &mut World,
    kind: BossKind,
    templates: &BossTemplates,
    config: &SimConfig,
    pos: Vec2,
) -> Entity {
    match kind {
        BossKind::Tank => {
            let t = &templates.tank;
            let policy = TankBoss::new(&t.tuning);
            spawn_from_template(world, kind, t, config, pos, Behavior::Tank(policy))
        }
        BossKind::Speed => {
            let t = &templates.speed;
            let policy = SpeedBoss::new(&t.tuning);
            spawn_from_template(world, kind, t, config, pos, Behavior::Speed(policy))
        }
        BossKind::Ranged => {
            let t = &templates.ranged;
            let policy = RangedBoss::new(&t.tuning).with_target_radius(config.target_radius);
            spawn_from_template(world, kind, t, config, pos, Behavior::Ranged(policy))
        }
        BossKind::Berserker => {
            let t = &templates.berserker;
            let vitals = t.stats.vitals(config.difficulty);
            let policy = BerserkerBoss::new(&t.tuning, vitals.attack_value, vitals.move_speed);
            spawn_from_template(world, kind, t, config, pos, Behavior::Berserker(policy))
        }
        BossKind::Necromancer => {
            let t = &templates.necromancer;
            let policy = NecromancerBoss::new(&t.tuning);
            spawn_from_template(world, kind, t, config, pos, Behavior::Necromancer(policy))
        }
    }
}

fn spawn_from_template<T>(
    world: &mut World,
    kind: BossKind,
    template: &BossTemplate<T>,
    config: &SimConfig,
    pos: Vec2,
    behavior: Behavior,
) -> Entity {
    let vitals = template.stats.vitals(config.difficulty);
    let mut brain: Brain = template.stats.brain().with_behavior(behavior);
    brain.despawn_delay = config.despawn_delay;
    brain.boss = Some(BossCore::from_template(kind, template));

    log::info!(
        "=== BOSS SPAWNED: {} === ({}, HP {}, ATK {}, SPD {:.0})",
        template.title,
        template.name,
        vitals.max_health(),
        vitals.attack_value,
        vitals.move_speed
    );

    world.spawn((
        Position(pos),
        Velocity::default(),
        Name::new(template.title.clone()),
        Faction::Enemy,
        vitals,
        brain,
    ))
}

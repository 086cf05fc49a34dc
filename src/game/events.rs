//! Combat events
//!
//! The AI core never talks to a HUD, audio or log directly. Everything it
//! wants the outside world to know is pushed as a `CombatEvent` and flushed
//! to registered listeners at the end of each tick.

use std::fmt;
use std::sync::Arc;

use hecs::Entity;
use parking_lot::Mutex;
use serde::Serialize;

use crate::ecs::{AiState, Vec2};
use crate::entities::bosses::ranged::ShotPattern;

/// Named boss and enemy abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Ability {
    GroundPound,
    ArmorStack,
    Dash,
    DashStrike,
    ComboFinisher,
    Afterimage,
    Whirlwind,
    ExecuteMode,
    BloodTrail,
    Summon,
    LifeDrain,
    Curse,
    Resurrect,
    DeathNova,
    Flee,
    Slam,
    Stealth,
    Backstab,
}

impl Ability {
    pub fn name(&self) -> &'static str {
        match self {
            Ability::GroundPound => "Ground Pound",
            Ability::ArmorStack => "Armor Stack",
            Ability::Dash => "Dash",
            Ability::DashStrike => "Dash Strike",
            Ability::ComboFinisher => "Combo Finisher",
            Ability::Afterimage => "Afterimage",
            Ability::Whirlwind => "Whirlwind",
            Ability::ExecuteMode => "Execute Mode",
            Ability::BloodTrail => "Blood Trail",
            Ability::Summon => "Summon",
            Ability::LifeDrain => "Life Drain",
            Ability::Curse => "Curse",
            Ability::Resurrect => "Resurrect",
            Ability::DeathNova => "Death Nova",
            Ability::Flee => "Flee",
            Ability::Slam => "Ground Slam",
            Ability::Stealth => "Stealth",
            Ability::Backstab => "Backstab",
        }
    }
}

/// Structured notification emitted by the AI core
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    DamageDealt { source: Option<Entity>, target: Entity, amount: i32 },
    Healed { entity: Entity, amount: i32 },
    Dodged { entity: Entity, attacker: Option<Entity> },
    /// Incoming damage reduced by armour or shield
    Absorbed { entity: Entity, raw: i32, taken: i32 },
    StateChanged { entity: Entity, from: AiState, to: AiState },
    Died { entity: Entity },
    Despawned { entity: Entity },
    PhaseChanged { entity: Entity, phase: u32 },
    Enraged { entity: Entity },
    AbilityUsed { entity: Entity, ability: Ability },
    MinionSpawned { master: Entity, minion: Entity },
    MinionDied { master: Entity, minion: Entity },
    HazardCreated { entity: Entity, at: Vec2 },
    Teleported { entity: Entity, from: Vec2, to: Vec2 },
    PatternChanged { entity: Entity, pattern: ShotPattern },
    ProjectileFired { entity: Entity, pattern: ShotPattern, hit: bool },
    Taunt { entity: Entity, line: String },
    BossDefeated { entity: Entity, title: String, gold: u32 },
}

impl CombatEvent {
    /// Short event kind, used as the structured event name
    pub fn name(&self) -> &'static str {
        match self {
            CombatEvent::DamageDealt { .. } => "damage_dealt",
            CombatEvent::Healed { .. } => "healed",
            CombatEvent::Dodged { .. } => "dodged",
            CombatEvent::Absorbed { .. } => "absorbed",
            CombatEvent::StateChanged { .. } => "state_changed",
            CombatEvent::Died { .. } => "died",
            CombatEvent::Despawned { .. } => "despawned",
            CombatEvent::PhaseChanged { .. } => "phase_changed",
            CombatEvent::Enraged { .. } => "enraged",
            CombatEvent::AbilityUsed { .. } => "ability_used",
            CombatEvent::MinionSpawned { .. } => "minion_spawned",
            CombatEvent::MinionDied { .. } => "minion_died",
            CombatEvent::HazardCreated { .. } => "hazard_created",
            CombatEvent::Teleported { .. } => "teleported",
            CombatEvent::PatternChanged { .. } => "pattern_changed",
            CombatEvent::ProjectileFired { .. } => "projectile_fired",
            CombatEvent::Taunt { .. } => "taunt",
            CombatEvent::BossDefeated { .. } => "boss_defeated",
        }
    }

    /// The entity the event is primarily about
    pub fn subject(&self) -> Entity {
        match *self {
            CombatEvent::DamageDealt { target, .. } => target,
            CombatEvent::Healed { entity, .. }
            | CombatEvent::Dodged { entity, .. }
            | CombatEvent::Absorbed { entity, .. }
            | CombatEvent::StateChanged { entity, .. }
            | CombatEvent::Died { entity }
            | CombatEvent::Despawned { entity }
            | CombatEvent::PhaseChanged { entity, .. }
            | CombatEvent::Enraged { entity }
            | CombatEvent::AbilityUsed { entity, .. }
            | CombatEvent::HazardCreated { entity, .. }
            | CombatEvent::Teleported { entity, .. }
            | CombatEvent::PatternChanged { entity, .. }
            | CombatEvent::ProjectileFired { entity, .. }
            | CombatEvent::Taunt { entity, .. }
            | CombatEvent::BossDefeated { entity, .. } => entity,
            CombatEvent::MinionSpawned { master, .. } | CombatEvent::MinionDied { master, .. } => {
                master
            }
        }
    }
}

impl fmt::Display for CombatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombatEvent::DamageDealt { source: Some(source), target, amount } => {
                write!(f, "#{} hits #{} for {} damage", source.id(), target.id(), amount)
            }
            CombatEvent::DamageDealt { source: None, target, amount } => {
                write!(f, "#{} takes {} damage", target.id(), amount)
            }
            CombatEvent::Healed { entity, amount } => {
                write!(f, "#{} heals {}", entity.id(), amount)
            }
            CombatEvent::Dodged { entity, .. } => write!(f, "#{} dodges", entity.id()),
            CombatEvent::Absorbed { entity, raw, taken } => {
                write!(f, "#{} absorbs {} of {} damage", entity.id(), raw - taken, raw)
            }
            CombatEvent::StateChanged { entity, from, to } => {
                write!(f, "#{} {} -> {}", entity.id(), from.name(), to.name())
            }
            CombatEvent::Died { entity } => write!(f, "#{} dies", entity.id()),
            CombatEvent::Despawned { entity } => write!(f, "#{} despawned", entity.id()),
            CombatEvent::PhaseChanged { entity, phase } => {
                write!(f, "#{} enters phase {}", entity.id(), phase)
            }
            CombatEvent::Enraged { entity } => write!(f, "#{} becomes ENRAGED", entity.id()),
            CombatEvent::AbilityUsed { entity, ability } => {
                write!(f, "#{} uses {}", entity.id(), ability.name())
            }
            CombatEvent::MinionSpawned { master, minion } => {
                write!(f, "#{} summons minion #{}", master.id(), minion.id())
            }
            CombatEvent::MinionDied { master, minion } => {
                write!(f, "minion #{} of #{} perished", minion.id(), master.id())
            }
            CombatEvent::HazardCreated { entity, at } => {
                write!(f, "#{} leaves a hazard at ({:.0}, {:.0})", entity.id(), at.x, at.y)
            }
            CombatEvent::Teleported { entity, to, .. } => {
                write!(f, "#{} teleports to ({:.0}, {:.0})", entity.id(), to.x, to.y)
            }
            CombatEvent::PatternChanged { entity, pattern } => {
                write!(f, "#{} switches to {} pattern", entity.id(), pattern)
            }
            CombatEvent::ProjectileFired { entity, pattern, hit } => write!(
                f,
                "#{} fires {} shot ({})",
                entity.id(),
                pattern,
                if *hit { "hit" } else { "miss" }
            ),
            CombatEvent::Taunt { line, .. } => write!(f, "\"{}\"", line),
            CombatEvent::BossDefeated { title, gold, .. } => {
                write!(f, "{} has been defeated! Dropped {} gold", title, gold)
            }
        }
    }
}

/// Receiver of flushed combat events (HUD, boss bar, audio cue router, log)
pub trait EventListener: Send {
    fn on_event(&mut self, event: &CombatEvent);
}

/// Event listener readable from another thread
#[derive(Debug, Clone, Default)]
pub struct SharedEventLog {
    events: Arc<Mutex<Vec<CombatEvent>>>,
}

impl SharedEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Copy of every event received so far
    pub fn snapshot(&self) -> Vec<CombatEvent> {
        self.events.lock().clone()
    }

    /// Remove and return every event received so far
    pub fn take(&self) -> Vec<CombatEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventListener for SharedEventLog {
    fn on_event(&mut self, event: &CombatEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Serializable form of an event for JSON-lines output
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub tick: u64,
    pub kind: &'static str,
    pub subject: u32,
    pub message: String,
}

impl EventRecord {
    pub fn new(tick: u64, event: &CombatEvent) -> Self {
        Self {
            tick,
            kind: event.name(),
            subject: event.subject().id(),
            message: event.to_string(),
        }
    }
}

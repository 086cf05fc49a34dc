//! ECS Systems
//!
//! The shared enemy state machine, the incoming-damage pipeline and boss
//! escalation. Systems operate on one checked-out `Actor` at a time and
//! reach the rest of the world through `Ports`.

use hecs::Entity;
use rand::Rng;

use crate::combat::CombatError;
use crate::ecs::{AiState, Brain, Vec2, Vitals};
use crate::entities::behavior::{with_policy, BehaviorPolicy};
use crate::entities::minions;
use crate::game::CombatEvent;
use crate::world::Ports;

/// Chase gives up once the player is this many detection ranges away
pub const LOSE_TARGET_FACTOR: f32 = 1.5;
/// Attack falls back to Chase once the player is this many attack ranges away
pub const ATTACK_LEASH_FACTOR: f32 = 1.2;
/// Patrol picks a new wander point when closer than this
pub const PATROL_ARRIVAL: f32 = 10.0;
/// Patrol walks at this fraction of move speed
pub const PATROL_SPEED_FACTOR: f32 = 0.5;
/// Baseline enrage bonuses applied before the archetype hook
pub const ENRAGE_SPEED_MULT: f32 = 1.3;
pub const ENRAGE_ATTACK_MULT: f32 = 1.2;

/// An AI entity checked out of the arena for its update
#[derive(Debug, Clone)]
pub struct Actor {
    pub entity: Entity,
    pub name: String,
    pub position: Vec2,
    pub vitals: Vitals,
    pub brain: Brain,
}

/// The living player as seen by an actor this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub entity: Entity,
    pub position: Vec2,
    pub distance: f32,
}

impl Actor {
    pub fn new(
        entity: Entity,
        name: impl Into<String>,
        position: Vec2,
        vitals: Vitals,
        brain: Brain,
    ) -> Self {
        Self {
            entity,
            name: name.into(),
            position,
            vitals,
            brain,
        }
    }

    /// The player, if present and alive. A stale handle counts as absent.
    pub fn player_target(&self, ports: &dyn Ports) -> Option<Target> {
        let entity = ports.find_player()?;
        if !ports.is_alive(entity) {
            return None;
        }
        let position = ports.position(entity)?;
        Some(Target {
            entity,
            position,
            distance: self.position.distance(position),
        })
    }
}

// ============================================================================
// Movement & transitions
// ============================================================================

/// Change AI state, emitting a notification. Dead is terminal.
pub fn transition(actor: &mut Actor, ports: &mut dyn Ports, to: AiState) {
    let from = actor.brain.state;
    if from == to || from == AiState::Dead {
        return;
    }
    actor.brain.state = to;
    log::debug!("{} {} -> {}", actor.name, from.name(), to.name());
    ports.notify(CombatEvent::StateChanged {
        entity: actor.entity,
        from,
        to,
    });
}

pub fn steer(actor: &Actor, ports: &mut dyn Ports, direction: Vec2, speed: f32) {
    ports.move_entity(actor.entity, direction * speed);
}

pub fn halt(actor: &Actor, ports: &mut dyn Ports) {
    ports.move_entity(actor.entity, Vec2::ZERO);
}

// ============================================================================
// Per-tick update
// ============================================================================

/// Full update for one AI entity: timers, death, minion bond, behavior,
/// then boss escalation
pub fn update_actor(actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
    actor.brain.attack_cooldown.tick(dt);

    if !actor.vitals.is_alive() {
        enter_dead(actor, ports);
        if let Some(timer) = actor.brain.despawn.as_mut() {
            timer.tick(dt);
        }
        return;
    }

    if minions::check_bond(actor, ports, dt) {
        return;
    }

    with_policy(actor, ports, |policy, actor, ports| policy.on_tick(actor, ports, dt));

    if actor.vitals.is_alive() {
        escalate(actor, ports);
    }
}

/// Idle → Patrol → Chase → Attack dispatch shared by every behavior
pub fn run_state_machine<P: BehaviorPolicy + ?Sized>(
    policy: &mut P,
    actor: &mut Actor,
    ports: &mut dyn Ports,
) {
    match actor.brain.state {
        AiState::Idle => update_idle(actor, ports),
        AiState::Patrol => update_patrol(actor, ports),
        AiState::Chase => update_chase(actor, ports),
        AiState::Attack => update_attack(policy, actor, ports),
        AiState::Dead => {}
    }
}

/// True when the living player is inside detection range
fn detects_player(actor: &Actor, ports: &dyn Ports) -> bool {
    actor
        .player_target(ports)
        .is_some_and(|target| target.distance <= actor.brain.detection_range)
}

pub fn update_idle(actor: &mut Actor, ports: &mut dyn Ports) {
    halt(actor, ports);

    if detects_player(actor, ports) {
        log::info!("{} detected player!", actor.name);
        transition(actor, ports, AiState::Chase);
    }
}

pub fn update_patrol(actor: &mut Actor, ports: &mut dyn Ports) {
    let Some(mut route) = actor.brain.patrol else {
        update_idle(actor, ports);
        return;
    };

    if actor.position.distance(route.target) < PATROL_ARRIVAL {
        let radius = route.radius.abs();
        let rng = ports.rng();
        let offset = Vec2::new(rng.gen_range(-radius..=radius), rng.gen_range(-radius..=radius));
        route.target = route.home + offset;
        actor.brain.patrol = Some(route);
    }

    let direction = actor.position.direction_to(route.target);
    steer(actor, ports, direction, actor.vitals.move_speed * PATROL_SPEED_FACTOR);

    if detects_player(actor, ports) {
        log::info!("{} detected player!", actor.name);
        transition(actor, ports, AiState::Chase);
    }
}

pub fn update_chase(actor: &mut Actor, ports: &mut dyn Ports) {
    let Some(target) = actor.player_target(ports) else {
        halt(actor, ports);
        transition(actor, ports, AiState::Idle);
        return;
    };

    if target.distance > actor.brain.detection_range * LOSE_TARGET_FACTOR {
        log::info!("{} lost sight of player", actor.name);
        halt(actor, ports);
        transition(actor, ports, AiState::Idle);
        return;
    }

    if target.distance <= actor.brain.attack_range {
        halt(actor, ports);
        transition(actor, ports, AiState::Attack);
        return;
    }

    let direction = actor.position.direction_to(target.position);
    steer(actor, ports, direction, actor.vitals.move_speed);
}

pub fn update_attack<P: BehaviorPolicy + ?Sized>(
    policy: &mut P,
    actor: &mut Actor,
    ports: &mut dyn Ports,
) {
    let Some(target) = actor.player_target(ports) else {
        halt(actor, ports);
        transition(actor, ports, AiState::Idle);
        return;
    };

    halt(actor, ports);

    if target.distance > actor.brain.attack_range * ATTACK_LEASH_FACTOR {
        transition(actor, ports, AiState::Chase);
        return;
    }

    if actor.brain.attack_cooldown.is_ready() {
        policy.strike(actor, ports, target.entity);
    }
}

// ============================================================================
// Outgoing damage
// ============================================================================

/// Route damage to the player sink or the entity sink
pub fn deal_damage(actor: &Actor, ports: &mut dyn Ports, target: Entity, amount: i32) -> i32 {
    if ports.find_player() == Some(target) {
        ports.apply_damage_to_player(actor.entity, amount)
    } else {
        ports.apply_damage_to_entity(actor.entity, target, amount)
    }
}

/// Roll attack damage, restart the attack cooldown and hit `target`.
/// Returns the damage actually applied.
pub fn basic_attack(actor: &mut Actor, ports: &mut dyn Ports, target: Entity) -> i32 {
    let damage = actor.vitals.calculate_attack_damage(ports.rng());
    actor.brain.attack_cooldown.restart();
    log::debug!("{} attacks for {} damage", actor.name, damage);
    deal_damage(actor, ports, target, damage)
}

/// Heal the actor, emitting a notification for any health restored
pub fn heal_self(actor: &mut Actor, ports: &mut dyn Ports, amount: i32) -> i32 {
    match actor.vitals.heal(amount) {
        Ok(0) => 0,
        Ok(healed) => {
            ports.notify(CombatEvent::Healed {
                entity: actor.entity,
                amount: healed,
            });
            healed
        }
        Err(e) => {
            log::warn!("{}: heal rejected: {}", actor.name, e);
            0
        }
    }
}

// ============================================================================
// Incoming damage & death
// ============================================================================

/// Full receive-damage path: archetype modifiers, health, aggro interrupt,
/// then either death or the on-hit hook. Returns the damage applied.
pub fn receive_damage(
    actor: &mut Actor,
    ports: &mut dyn Ports,
    source: Option<Entity>,
    amount: i32,
) -> Result<i32, CombatError> {
    if amount < 0 {
        return Err(CombatError::NegativeAmount(amount));
    }
    if !actor.vitals.is_alive() {
        return Ok(0);
    }

    let Some(effective) = with_policy(actor, ports, |policy, actor, ports| {
        policy.modify_incoming(actor, ports, amount)
    }) else {
        return Ok(0);
    };

    if effective < amount {
        ports.notify(CombatEvent::Absorbed {
            entity: actor.entity,
            raw: amount,
            taken: effective,
        });
    }

    let outcome = actor.vitals.take_damage(effective)?;
    log::debug!(
        "{} takes {} damage. Remaining HP: {}",
        actor.name,
        outcome.applied,
        actor.vitals.current_health()
    );
    ports.notify(CombatEvent::DamageDealt {
        source,
        target: actor.entity,
        amount: outcome.applied,
    });

    if outcome.killed {
        enter_dead(actor, ports);
        return Ok(outcome.applied);
    }

    if !matches!(actor.brain.state, AiState::Attack | AiState::Chase) {
        transition(actor, ports, AiState::Chase);
    }

    with_policy(actor, ports, |policy, actor, ports| {
        policy.on_damage_taken(actor, ports, outcome.applied)
    });

    Ok(outcome.applied)
}

/// Enter the terminal Dead state. Runs at most once per entity.
pub fn enter_dead(actor: &mut Actor, ports: &mut dyn Ports) {
    if actor.brain.is_dead() {
        return;
    }

    halt(actor, ports);
    transition(actor, ports, AiState::Dead);
    actor.brain.arm_despawn();

    log::info!("{} has been defeated!", actor.name);
    ports.notify(CombatEvent::Died { entity: actor.entity });

    if let Some(boss) = &actor.brain.boss {
        log::info!("{} has been defeated! Gold: {}", boss.title, boss.gold_drop);
        ports.notify(CombatEvent::BossDefeated {
            entity: actor.entity,
            title: boss.title.clone(),
            gold: boss.gold_drop,
        });
    }

    with_policy(actor, ports, |policy, actor, ports| policy.on_death(actor, ports));

    if let Some(bond) = actor.brain.bond {
        if ports.is_valid(bond.master) {
            ports.report_minion_death(bond.master, actor.entity);
        }
    }
}

// ============================================================================
// Boss escalation
// ============================================================================

/// Advance boss phases and latch enrage from the current health reading
pub fn escalate(actor: &mut Actor, ports: &mut dyn Ports) {
    let health_fraction = actor.vitals.health_fraction();
    let Some(boss) = actor.brain.boss.as_mut() else {
        return;
    };
    let phase_count = boss.phase_count;
    let entered = boss.advance_phase(health_fraction);

    for phase in entered {
        log::info!("{} enters Phase {}/{}!", actor.name, phase, phase_count);
        ports.notify(CombatEvent::PhaseChanged {
            entity: actor.entity,
            phase,
        });
        with_policy(actor, ports, |policy, actor, ports| {
            policy.on_phase_change(actor, ports, phase)
        });
    }

    let enraged = actor
        .brain
        .boss
        .as_mut()
        .is_some_and(|boss| boss.check_enrage(health_fraction));
    if enraged {
        actor.vitals.move_speed *= ENRAGE_SPEED_MULT;
        actor.vitals.attack_value = (actor.vitals.attack_value as f32 * ENRAGE_ATTACK_MULT) as i32;
        log::info!("{} is ENRAGED!", actor.name);
        ports.notify(CombatEvent::Enraged { entity: actor.entity });
        with_policy(actor, ports, |policy, actor, ports| policy.on_enrage(actor, ports));
    }
}

/// Emit a boss voice line
pub fn taunt(actor: &Actor, ports: &mut dyn Ports, line: &str) {
    log::info!("{}: \"{}\"", actor.name, line);
    ports.notify(CombatEvent::Taunt {
        entity: actor.entity,
        line: line.to_string(),
    });
}

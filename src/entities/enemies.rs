//! Regular enemies
//!
//! Spawning from templates plus the small behaviors layered on top of the
//! shared state machine: cowards that flee, brutes that slam, marksmen that
//! hold a range band, stalkers that ambush from stealth and raiders that
//! work themselves into a frenzy.

use hecs::{Entity, World};
use rand::Rng;

use crate::data::{
    BruteTuning, CowardTuning, EnemyArchetype, EnemyTemplate, FrenzyTuning, MarksmanTuning,
    SimConfig, StalkerTuning,
};
use crate::ecs::systems::{self, halt, steer, transition, Actor, Target, LOSE_TARGET_FACTOR};
use crate::ecs::{AiState, Faction, Name, Position, Vec2, Velocity, Vitals};
use crate::entities::behavior::{Behavior, BehaviorPolicy, GenericEnemy};
use crate::entities::bosses::ShotPattern;
use crate::game::{Ability, CombatEvent, Cooldown};
use crate::world::Ports;

/// Spawn an enemy from a template
pub fn spawn_enemy(
    world: &mut World,
    template: &EnemyTemplate,
    config: &SimConfig,
    pos: Vec2,
) -> Entity {
    let vitals = template.stats.vitals(config.difficulty);
    let mut brain = template
        .stats
        .brain()
        .with_behavior(behavior_for(&template.archetype, &vitals));
    if let Some(radius) = template.patrol_radius {
        brain = brain.with_patrol(pos, radius);
    }
    brain.despawn_delay = config.despawn_delay;

    log::info!(
        "Enemy '{}' spawned with {} HP ({})",
        template.name,
        vitals.current_health(),
        brain.behavior.name()
    );

    world.spawn((
        Position(pos),
        Velocity::default(),
        Name::new(template.name.clone()),
        Faction::Enemy,
        vitals,
        brain,
    ))
}

/// Build the behavior for a template archetype
pub fn behavior_for(archetype: &EnemyArchetype, vitals: &Vitals) -> Behavior {
    match archetype {
        EnemyArchetype::Generic => Behavior::Generic(GenericEnemy),
        EnemyArchetype::Coward(tuning) => Behavior::Coward(CowardEnemy::new(tuning)),
        EnemyArchetype::Brute(tuning) => Behavior::Brute(BruteEnemy::new(tuning)),
        EnemyArchetype::Marksman(tuning) => Behavior::Marksman(MarksmanEnemy::new(tuning)),
        EnemyArchetype::Stalker(tuning) => Behavior::Stalker(StalkerEnemy::new(tuning)),
        EnemyArchetype::Frenzy(tuning) => Behavior::Frenzy(FrenzyEnemy::new(
            tuning,
            vitals.attack_value,
            vitals.move_speed,
        )),
    }
}

fn roll_chance(ports: &mut dyn Ports, chance: f64) -> bool {
    ports.rng().gen_bool(chance.clamp(0.0, 1.0))
}

// ============================================================================
// Coward
// ============================================================================

/// Fights until hurt, then runs from the player for good
#[derive(Debug, Clone)]
pub struct CowardEnemy {
    flee_threshold: f32,
    flee_speed_multiplier: f32,
    panic_chance: f64,
    fleeing: bool,
}

impl CowardEnemy {
    pub fn new(tuning: &CowardTuning) -> Self {
        Self {
            flee_threshold: tuning.flee_threshold,
            flee_speed_multiplier: tuning.flee_speed_multiplier,
            panic_chance: tuning.panic_chance,
            fleeing: false,
        }
    }

    pub fn is_fleeing(&self) -> bool {
        self.fleeing
    }

    fn start_fleeing(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        if self.fleeing {
            return;
        }
        self.fleeing = true;
        transition(actor, ports, AiState::Chase);
        log::info!("{} flees in panic!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Flee,
        });
    }
}

impl BehaviorPolicy for CowardEnemy {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _dt: f32) {
        if actor.vitals.health_fraction() <= self.flee_threshold {
            self.start_fleeing(actor, ports);
        }
        if !self.fleeing {
            systems::run_state_machine(self, actor, ports);
            return;
        }

        match actor.player_target(ports) {
            Some(target) => {
                let away = target.position.direction_to(actor.position);
                let speed = actor.vitals.move_speed * self.flee_speed_multiplier;
                steer(actor, ports, away, speed);
            }
            None => halt(actor, ports),
        }
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _amount: i32) {
        if !self.fleeing && roll_chance(ports, self.panic_chance) {
            self.start_fleeing(actor, ports);
        }
    }
}

// ============================================================================
// Brute
// ============================================================================

/// Heavy melee enemy that sometimes slams the ground around it
#[derive(Debug, Clone)]
pub struct BruteEnemy {
    pub slam_range: f32,
    pub slam_damage: i32,
    slam_chance: f64,
    slam_cooldown: Cooldown,
}

impl BruteEnemy {
    pub fn new(tuning: &BruteTuning) -> Self {
        Self {
            slam_range: tuning.slam_range,
            slam_damage: tuning.slam_damage,
            slam_chance: tuning.slam_chance,
            slam_cooldown: Cooldown::new(tuning.slam_cooldown),
        }
    }

    pub fn slam_cooldown(&self) -> &Cooldown {
        &self.slam_cooldown
    }

    /// Damage falls off linearly to zero at the edge of the slam
    fn slam_damage_at(&self, distance: f32) -> i32 {
        if self.slam_range <= 0.0 || distance > self.slam_range {
            return 0;
        }
        (self.slam_damage as f32 * (1.0 - distance / self.slam_range)) as i32
    }

    fn ground_slam(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.slam_cooldown.restart();
        log::info!("{} performs a ground slam!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Slam,
        });

        for (target, distance) in ports.hostiles_within(actor.position, self.slam_range) {
            let damage = self.slam_damage_at(distance);
            if damage > 0 {
                log::debug!("Slam hits for {} damage at {:.0}", damage, distance);
                systems::deal_damage(actor, ports, target, damage);
            }
        }
    }
}

impl BehaviorPolicy for BruteEnemy {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.slam_cooldown.tick(dt);

        systems::run_state_machine(self, actor, ports);

        if actor.brain.state == AiState::Attack
            && self.slam_cooldown.is_ready()
            && roll_chance(ports, self.slam_chance)
        {
            self.ground_slam(actor, ports);
        }
    }
}

// ============================================================================
// Marksman
// ============================================================================

/// Ranged enemy that keeps between its minimum range and its attack range
#[derive(Debug, Clone)]
pub struct MarksmanEnemy {
    pub min_range: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
}

impl MarksmanEnemy {
    pub fn new(tuning: &MarksmanTuning) -> Self {
        Self {
            min_range: tuning.min_range,
            projectile_damage: tuning.projectile_damage,
            projectile_speed: tuning.projectile_speed,
        }
    }

    fn hold_range(&self, actor: &mut Actor, ports: &mut dyn Ports) {
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

        if target.distance < self.min_range {
            let away = target.position.direction_to(actor.position);
            steer(actor, ports, away, actor.vitals.move_speed);
            return;
        }

        if target.distance <= actor.brain.attack_range {
            halt(actor, ports);
            transition(actor, ports, AiState::Attack);
            return;
        }

        let toward = actor.position.direction_to(target.position);
        steer(actor, ports, toward, actor.vitals.move_speed);
    }

    fn too_close(&self, target: Option<Target>) -> bool {
        target.is_some_and(|target| target.distance < self.min_range)
    }
}

impl BehaviorPolicy for MarksmanEnemy {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _dt: f32) {
        match actor.brain.state {
            AiState::Chase => self.hold_range(actor, ports),
            AiState::Attack if self.too_close(actor.player_target(ports)) => {
                transition(actor, ports, AiState::Chase);
                self.hold_range(actor, ports);
            }
            _ => systems::run_state_machine(self, actor, ports),
        }
    }

    fn strike(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Entity) {
        actor.brain.attack_cooldown.restart();
        if let Some(at) = ports.position(target) {
            log::debug!(
                "{} looses an arrow ({:.2}s flight)",
                actor.name,
                actor.position.distance(at) / self.projectile_speed.max(1.0)
            );
        }
        ports.notify(CombatEvent::ProjectileFired {
            entity: actor.entity,
            pattern: ShotPattern::Single,
            hit: true,
        });
        systems::deal_damage(actor, ports, target, self.projectile_damage);
    }
}

// ============================================================================
// Stalker
// ============================================================================

/// Glass cannon that teleports past the player and strikes from stealth
#[derive(Debug, Clone)]
pub struct StalkerEnemy {
    teleport_range: f32,
    teleport_chance: f64,
    ambush_offset: f32,
    backstab_multiplier: f32,
    stealth_duration: f32,
    escape_chance: f64,
    escape_distance: f32,
    teleport_cooldown: Cooldown,
    /// Running while the stalker is hidden
    stealth: Cooldown,
}

impl StalkerEnemy {
    pub fn new(tuning: &StalkerTuning) -> Self {
        // The first teleport has to be earned
        let mut teleport_cooldown = Cooldown::new(tuning.teleport_cooldown);
        teleport_cooldown.restart();
        Self {
            teleport_range: tuning.teleport_range,
            teleport_chance: tuning.teleport_chance,
            ambush_offset: tuning.ambush_offset,
            backstab_multiplier: tuning.backstab_multiplier,
            stealth_duration: tuning.stealth_duration,
            escape_chance: tuning.escape_chance,
            escape_distance: tuning.escape_distance,
            teleport_cooldown,
            stealth: Cooldown::new(tuning.stealth_duration),
        }
    }

    pub fn is_stealthed(&self) -> bool {
        !self.stealth.is_ready()
    }

    pub fn teleport_cooldown(&self) -> &Cooldown {
        &self.teleport_cooldown
    }

    fn enter_stealth(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.stealth.start(self.stealth_duration);
        log::debug!("{} vanishes into the shadows", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Stealth,
        });
    }

    fn leave_stealth(&mut self, actor: &Actor) {
        if self.is_stealthed() {
            self.stealth.stop();
            log::debug!("{} is revealed", actor.name);
        }
    }

    fn blink(&mut self, actor: &mut Actor, ports: &mut dyn Ports, to: Vec2) {
        self.teleport_cooldown.restart();
        let from = actor.position;
        ports.place_entity(actor.entity, to);
        actor.position = to;
        ports.notify(CombatEvent::Teleported {
            entity: actor.entity,
            from,
            to,
        });
        self.enter_stealth(actor, ports);
    }

    /// Land just past the player, on the far side from where we stood
    fn ambush(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Target) {
        let mut through = actor.position.direction_to(target.position);
        if through == Vec2::ZERO {
            through = Vec2::new(1.0, 0.0);
        }
        log::info!("{} teleports behind the player!", actor.name);
        self.blink(actor, ports, target.position + through * self.ambush_offset);
    }

    fn escape(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        let Some(target) = actor.player_target(ports) else {
            return;
        };
        let away = target.position.direction_to(actor.position);
        log::info!("{} teleports to safety!", actor.name);
        let to = actor.position + away * self.escape_distance;
        self.blink(actor, ports, to);
    }
}

impl BehaviorPolicy for StalkerEnemy {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.teleport_cooldown.tick(dt);
        if self.stealth.tick(dt) {
            log::debug!("{}'s stealth fades", actor.name);
        }

        systems::run_state_machine(self, actor, ports);

        if actor.brain.state != AiState::Chase
            || !self.teleport_cooldown.is_ready()
            || self.is_stealthed()
        {
            return;
        }
        let Some(target) = actor
            .player_target(ports)
            .filter(|target| target.distance <= self.teleport_range)
        else {
            return;
        };
        if roll_chance(ports, self.teleport_chance) {
            self.ambush(actor, ports, target);
        }
    }

    fn strike(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Entity) {
        let mut damage = actor.vitals.calculate_attack_damage(ports.rng());
        actor.brain.attack_cooldown.restart();

        if self.is_stealthed() {
            damage = (damage as f32 * self.backstab_multiplier) as i32;
            log::info!("{} lands a BACKSTAB for {}!", actor.name, damage);
            ports.notify(CombatEvent::AbilityUsed {
                entity: actor.entity,
                ability: Ability::Backstab,
            });
            self.leave_stealth(actor);
        }

        systems::deal_damage(actor, ports, target, damage);
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _amount: i32) {
        self.leave_stealth(actor);
        if self.teleport_cooldown.is_ready() && roll_chance(ports, self.escape_chance) {
            self.escape(actor, ports);
        }
    }
}

// ============================================================================
// Frenzy
// ============================================================================

/// Grows angrier with each wound and enrages once badly hurt
#[derive(Debug, Clone)]
pub struct FrenzyEnemy {
    base_attack: i32,
    base_speed: f32,
    enrage_threshold: f32,
    damage_multiplier: f32,
    speed_multiplier: f32,
    cooldown_multiplier: f32,
    attack_per_hit: i32,
    enraged: bool,
}

impl FrenzyEnemy {
    pub fn new(tuning: &FrenzyTuning, base_attack: i32, base_speed: f32) -> Self {
        Self {
            base_attack,
            base_speed,
            enrage_threshold: tuning.enrage_threshold,
            damage_multiplier: tuning.damage_multiplier,
            speed_multiplier: tuning.speed_multiplier,
            cooldown_multiplier: tuning.cooldown_multiplier,
            attack_per_hit: tuning.attack_per_hit,
            enraged: false,
        }
    }

    pub fn is_enraged(&self) -> bool {
        self.enraged
    }

    fn enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        self.enraged = true;
        actor.vitals.attack_value = (self.base_attack as f32 * self.damage_multiplier) as i32;
        actor.vitals.move_speed = self.base_speed * self.speed_multiplier;
        let cooldown = actor.brain.attack_cooldown.duration() * self.cooldown_multiplier;
        actor.brain.attack_cooldown.set_duration(cooldown);

        log::info!(
            "{} is ENRAGED! (ATK {}, SPD {:.0})",
            actor.name,
            actor.vitals.attack_value,
            actor.vitals.move_speed
        );
        ports.notify(CombatEvent::Enraged { entity: actor.entity });
    }
}

impl BehaviorPolicy for FrenzyEnemy {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _dt: f32) {
        systems::run_state_machine(self, actor, ports);

        if !self.enraged && actor.vitals.health_fraction() <= self.enrage_threshold {
            self.enrage(actor, ports);
        }
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, _ports: &mut dyn Ports, _amount: i32) {
        if !self.enraged {
            actor.vitals.attack_value += self.attack_per_hit;
            log::debug!("{} grows angrier! ATK {}", actor.name, actor.vitals.attack_value);
        }
    }
}

//! Ranged boss: The Arcane Sorcerer
//!
//! Keeps the player at arm's length, cycles through shot patterns and
//! blinks away when cornered, leaving hazard markers behind.

use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::fmt;

use rand::Rng;
use serde::Serialize;

use crate::combat::ray_hits;
use crate::data::RangedTuning;
use crate::ecs::systems::{
    self, halt, steer, taunt, transition, Actor, Target, ATTACK_LEASH_FACTOR, LOSE_TARGET_FACTOR,
};
use crate::ecs::{AiState, Vec2};
use crate::entities::behavior::BehaviorPolicy;
use crate::game::{CombatEvent, Cooldown, Interval};
use crate::world::Ports;

/// Projectile hit radius used when none is configured
pub const DEFAULT_TARGET_RADIUS: f32 = 16.0;

const PHASE2_PROJECTILE_SPEED: f32 = 350.0;
const PHASE2_PROJECTILE_COOLDOWN: f32 = 1.2;
const PHASE3_PROJECTILE_SPEED: f32 = 400.0;
const PHASE3_PROJECTILE_COOLDOWN: f32 = 1.0;
const PHASE3_DAMAGE_BONUS: i32 = 5;
const PHASE3_TELEPORT_COOLDOWN: f32 = 5.0;
const ENRAGE_PROJECTILE_COOLDOWN: f32 = 0.7;
const ENRAGE_DAMAGE_BONUS: i32 = 10;
const ENRAGE_HAZARD_SPREAD: f32 = 300.0;
/// Back off while attacking when closer than this share of the preferred distance
const CRAMPED_FACTOR: f32 = 0.7;

/// Projectile patterns, cycled on a fixed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ShotPattern {
    #[default]
    Single,
    Spread,
    Circle,
}

impl ShotPattern {
    pub fn next(self) -> ShotPattern {
        match self {
            ShotPattern::Single => ShotPattern::Spread,
            ShotPattern::Spread => ShotPattern::Circle,
            ShotPattern::Circle => ShotPattern::Single,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShotPattern::Single => "single",
            ShotPattern::Spread => "spread",
            ShotPattern::Circle => "circle",
        }
    }
}

impl fmt::Display for ShotPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct RangedBoss {
    pub preferred_distance: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
    projectile_cooldown: Cooldown,
    pattern: ShotPattern,
    pattern_cycle: Interval,
    spread_angle: f32,
    circle_rays: u32,
    target_radius: f32,
    teleport_distance: f32,
    teleport_cooldown: Cooldown,
    teleport_trigger: f32,
    teleport_on_hit_chance: f64,
    hazards: VecDeque<Vec2>,
    max_hazards: usize,
}

impl RangedBoss {
    pub fn new(tuning: &RangedTuning) -> Self {
        Self {
            preferred_distance: tuning.preferred_distance,
            projectile_damage: tuning.projectile_damage,
            projectile_speed: tuning.projectile_speed,
            projectile_cooldown: Cooldown::new(tuning.projectile_cooldown),
            pattern: ShotPattern::Single,
            pattern_cycle: Interval::new(tuning.pattern_cycle),
            spread_angle: tuning.spread_degrees.to_radians(),
            circle_rays: tuning.circle_rays.max(1),
            target_radius: DEFAULT_TARGET_RADIUS,
            teleport_distance: tuning.teleport_distance,
            teleport_cooldown: Cooldown::new(tuning.teleport_cooldown),
            teleport_trigger: tuning.teleport_trigger,
            teleport_on_hit_chance: tuning.teleport_on_hit_chance.clamp(0.0, 1.0),
            hazards: VecDeque::new(),
            max_hazards: tuning.max_hazards,
        }
    }

    pub fn with_target_radius(mut self, radius: f32) -> Self {
        self.target_radius = radius.max(0.0);
        self
    }

    pub fn pattern(&self) -> ShotPattern {
        self.pattern
    }

    pub fn hazards(&self) -> impl Iterator<Item = &Vec2> {
        self.hazards.iter()
    }

    pub fn hazard_count(&self) -> usize {
        self.hazards.len()
    }

    pub fn projectile_cooldown(&self) -> &Cooldown {
        &self.projectile_cooldown
    }

    pub fn teleport_cooldown(&self) -> &Cooldown {
        &self.teleport_cooldown
    }

    fn add_hazard(&mut self, actor: &Actor, ports: &mut dyn Ports, at: Vec2) {
        if self.max_hazards == 0 {
            return;
        }
        while self.hazards.len() >= self.max_hazards {
            self.hazards.pop_front();
        }
        self.hazards.push_back(at);
        log::debug!(
            "{} leaves a hazard zone ({}/{})",
            actor.name,
            self.hazards.len(),
            self.max_hazards
        );
        ports.notify(CombatEvent::HazardCreated {
            entity: actor.entity,
            at,
        });
    }

    fn teleport(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        self.teleport_cooldown.restart();

        let from = actor.position;
        let away = match actor.player_target(ports) {
            Some(target) if target.distance > 0.0 => target.position.direction_to(from),
            _ => Vec2::from_angle(ports.rng().gen_range(0.0..TAU)),
        };
        let to = from + away * self.teleport_distance;

        ports.place_entity(actor.entity, to);
        actor.position = to;
        log::info!("{} teleports away!", actor.name);
        ports.notify(CombatEvent::Teleported {
            entity: actor.entity,
            from,
            to,
        });

        self.add_hazard(actor, ports, from);
    }

    fn next_pattern(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        self.pattern = self.pattern.next();
        log::debug!("{} switches to {} pattern", actor.name, self.pattern);
        ports.notify(CombatEvent::PatternChanged {
            entity: actor.entity,
            pattern: self.pattern,
        });
    }

    fn rays(&self, aim: Vec2) -> Vec<Vec2> {
        match self.pattern {
            ShotPattern::Single => vec![aim],
            ShotPattern::Spread => vec![
                aim.rotated(-self.spread_angle),
                aim,
                aim.rotated(self.spread_angle),
            ],
            ShotPattern::Circle => (0..self.circle_rays)
                .map(|i| Vec2::from_angle(TAU * i as f32 / self.circle_rays as f32))
                .collect(),
        }
    }

    fn fire(&mut self, actor: &Actor, ports: &mut dyn Ports, target: Target) {
        self.projectile_cooldown.restart();
        let aim = actor.position.direction_to(target.position);
        let range = actor.brain.attack_range;

        log::debug!(
            "{} fires {} pattern at speed {:.0}",
            actor.name,
            self.pattern,
            self.projectile_speed
        );
        for ray in self.rays(aim) {
            let hit = ray_hits(actor.position, ray, range, target.position, self.target_radius);
            ports.notify(CombatEvent::ProjectileFired {
                entity: actor.entity,
                pattern: self.pattern,
                hit,
            });
            if hit {
                systems::deal_damage(actor, ports, target.entity, self.projectile_damage);
            }
        }
    }

    fn update_chase(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        let Some(target) = actor.player_target(ports) else {
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
            return;
        };

        if target.distance > actor.brain.detection_range * LOSE_TARGET_FACTOR {
            log::info!("{} lost sight of player", actor.name);
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
        } else if target.distance <= self.preferred_distance {
            let away = target.position.direction_to(actor.position);
            steer(actor, ports, away, actor.vitals.move_speed);
            if target.distance < self.teleport_trigger && self.teleport_cooldown.is_ready() {
                self.teleport(actor, ports);
            }
        } else if target.distance > actor.brain.attack_range {
            let toward = actor.position.direction_to(target.position);
            steer(actor, ports, toward, actor.vitals.move_speed);
        } else {
            halt(actor, ports);
            transition(actor, ports, AiState::Attack);
        }
    }

    fn update_attack(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        let Some(target) = actor.player_target(ports) else {
            halt(actor, ports);
            transition(actor, ports, AiState::Idle);
            return;
        };

        if target.distance < self.preferred_distance * CRAMPED_FACTOR {
            let away = target.position.direction_to(actor.position);
            steer(actor, ports, away, actor.vitals.move_speed * 0.5);
        } else {
            halt(actor, ports);
        }

        if target.distance > actor.brain.attack_range * ATTACK_LEASH_FACTOR {
            transition(actor, ports, AiState::Chase);
            return;
        }

        if self.projectile_cooldown.is_ready() {
            self.fire(actor, ports, target);
        }
    }
}

impl BehaviorPolicy for RangedBoss {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.projectile_cooldown.tick(dt);
        self.teleport_cooldown.tick(dt);
        if self.pattern_cycle.update(dt) {
            self.next_pattern(actor, ports);
        }

        match actor.brain.state {
            AiState::Idle | AiState::Patrol => systems::update_idle(actor, ports),
            AiState::Chase => self.update_chase(actor, ports),
            AiState::Attack => self.update_attack(actor, ports),
            AiState::Dead => {}
        }
    }

    fn on_phase_change(&mut self, actor: &mut Actor, ports: &mut dyn Ports, phase: u32) {
        match phase {
            2 => {
                taunt(actor, ports, "Witness the power of true magic!");
                self.projectile_speed = PHASE2_PROJECTILE_SPEED;
                self.projectile_cooldown.set_duration(PHASE2_PROJECTILE_COOLDOWN);
                let here = actor.position;
                self.add_hazard(actor, ports, here);
            }
            3 => {
                taunt(actor, ports, "You face annihilation!");
                self.projectile_speed = PHASE3_PROJECTILE_SPEED;
                self.projectile_cooldown.set_duration(PHASE3_PROJECTILE_COOLDOWN);
                self.projectile_damage += PHASE3_DAMAGE_BONUS;
                self.teleport_cooldown.set_duration(PHASE3_TELEPORT_COOLDOWN);
            }
            _ => {}
        }
    }

    fn on_enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        taunt(actor, ports, "I will reduce you to ash!");
        self.projectile_cooldown.set_duration(ENRAGE_PROJECTILE_COOLDOWN);
        self.projectile_damage += ENRAGE_DAMAGE_BONUS;

        while self.hazards.len() < self.max_hazards {
            let rng = ports.rng();
            let offset = Vec2::new(
                rng.gen_range(-ENRAGE_HAZARD_SPREAD..=ENRAGE_HAZARD_SPREAD),
                rng.gen_range(-ENRAGE_HAZARD_SPREAD..=ENRAGE_HAZARD_SPREAD),
            );
            let at = actor.position + offset;
            self.add_hazard(actor, ports, at);
        }
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _amount: i32) {
        if self.teleport_cooldown.is_ready() && ports.rng().gen_bool(self.teleport_on_hit_chance) {
            self.teleport(actor, ports);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::bosses::default_boss_templates;
    use crate::ecs::systems::{receive_damage, update_actor};
    use crate::ecs::{Brain, Vitals};
    use crate::entities::behavior::Behavior;
    use crate::entities::bosses::{BossCore, BossKind};
    use crate::world::testing::MockPorts;

    fn sorcerer(ports: &mut MockPorts, teleport_on_hit_chance: f64) -> Actor {
        let mut template = default_boss_templates().ranged;
        template.tuning.teleport_on_hit_chance = teleport_on_hit_chance;
        let entity = ports.spawn_npc(Vec2::ZERO);
        let brain = template
            .stats
            .brain()
            .with_behavior(Behavior::Ranged(RangedBoss::new(&template.tuning)))
            .with_boss(BossCore::from_template(BossKind::Ranged, &template));
        let vitals = template.stats.vitals(Default::default());
        Actor::new(entity, "The Arcane Sorcerer", Vec2::ZERO, vitals, brain)
    }

    fn ranged_state(actor: &Actor) -> &RangedBoss {
        actor.brain.behavior.as_ranged().unwrap()
    }

    #[test]
    fn test_pattern_cycles_on_timer() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let mut actor = sorcerer(&mut ports, 0.0);

        update_actor(&mut actor, &mut ports, 4.0);
        assert_eq!(ranged_state(&actor).pattern(), ShotPattern::Single);
        update_actor(&mut actor, &mut ports, 1.0);
        assert_eq!(ranged_state(&actor).pattern(), ShotPattern::Spread);
        update_actor(&mut actor, &mut ports, 5.0);
        assert_eq!(ranged_state(&actor).pattern(), ShotPattern::Circle);
        update_actor(&mut actor, &mut ports, 5.0);
        assert_eq!(ranged_state(&actor).pattern(), ShotPattern::Single);
        assert_eq!(ports.count_events("pattern_changed"), 3);
    }

    #[test]
    fn test_single_shot_hits_target() {
        let mut ports = MockPorts::with_player(Vec2::new(250.0, 0.0));
        let mut actor = sorcerer(&mut ports, 0.0);
        actor.brain.state = AiState::Attack;

        update_actor(&mut actor, &mut ports, 0.016);
        assert_eq!(ports.player_damage_taken(), 15);
        assert_eq!(ports.count_events("projectile_fired"), 1);
        assert!(!ranged_state(&actor).projectile_cooldown().is_ready());
        assert_eq!(ports.velocity_of(actor.entity), Vec2::ZERO);
    }

    #[test]
    fn test_circle_pattern_fires_every_ray() {
        let mut ports = MockPorts::with_player(Vec2::new(250.0, 0.0));
        let mut boss = RangedBoss::new(&RangedTuning::default());
        boss.pattern = ShotPattern::Circle;

        let entity = ports.spawn_npc(Vec2::ZERO);
        let vitals = Vitals::new(180, 10, 120.0);
        let actor =
            Actor::new(entity, "Sorcerer", Vec2::ZERO, vitals, Brain::new(400.0, 300.0, 1.0));
        let target = actor.player_target(&ports).unwrap();
        boss.fire(&actor, &mut ports, target);

        assert_eq!(ports.count_events("projectile_fired"), 8);
        // Only the ray along +x passes within the hit radius
        assert_eq!(ports.player_damage_taken(), 15);
    }

    #[test]
    fn test_attack_backs_off_when_cramped() {
        let mut ports = MockPorts::with_player(Vec2::new(120.0, 0.0));
        let mut actor = sorcerer(&mut ports, 0.0);
        actor.brain.state = AiState::Attack;

        update_actor(&mut actor, &mut ports, 0.016);
        assert!((ports.velocity_of(actor.entity).x + 60.0).abs() < 1e-3);
        assert_eq!(actor.brain.state, AiState::Attack);
    }

    #[test]
    fn test_teleport_when_cornered_leaves_hazard() {
        let mut ports = MockPorts::with_player(Vec2::new(50.0, 0.0));
        let mut actor = sorcerer(&mut ports, 0.0);
        actor.brain.state = AiState::Chase;

        update_actor(&mut actor, &mut ports, 0.016);
        assert_eq!(actor.position, Vec2::new(-250.0, 0.0));
        assert_eq!(ports.count_events("teleported"), 1);
        let hazards: Vec<Vec2> = ranged_state(&actor).hazards().copied().collect();
        assert_eq!(hazards, vec![Vec2::ZERO]);
        assert!(!ranged_state(&actor).teleport_cooldown().is_ready());
    }

    #[test]
    fn test_teleport_on_hit() {
        let mut ports = MockPorts::with_player(Vec2::new(0.0, 300.0));
        let mut actor = sorcerer(&mut ports, 1.0);

        receive_damage(&mut actor, &mut ports, None, 10).unwrap();
        assert_eq!(actor.position, Vec2::new(0.0, -250.0));
        assert_eq!(ranged_state(&actor).hazard_count(), 1);
    }

    #[test]
    fn test_hazards_capped_oldest_evicted() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let mut boss = RangedBoss::new(&RangedTuning::default());
        let entity = ports.spawn_npc(Vec2::ZERO);
        let vitals = Vitals::new(180, 10, 120.0);
        let actor = Actor::new(entity, "Sorcerer", Vec2::ZERO, vitals, Brain::default());

        for i in 0..7 {
            boss.add_hazard(&actor, &mut ports, Vec2::new(i as f32, 0.0));
        }
        let xs: Vec<f32> = boss.hazards().map(|at| at.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_phases_and_enrage() {
        let mut ports = MockPorts::with_player(Vec2::new(5000.0, 0.0));
        let mut actor = sorcerer(&mut ports, 0.0);

        receive_damage(&mut actor, &mut ports, None, 135).unwrap();
        update_actor(&mut actor, &mut ports, 0.016);

        let boss = actor.brain.boss.as_ref().unwrap();
        assert_eq!(boss.current_phase(), 3);
        assert!(boss.is_enraged());
        let state = ranged_state(&actor);
        assert_eq!(state.projectile_speed, PHASE3_PROJECTILE_SPEED);
        assert_eq!(state.projectile_damage, 30);
        assert_eq!(state.projectile_cooldown().duration(), ENRAGE_PROJECTILE_COOLDOWN);
        assert_eq!(state.teleport_cooldown().duration(), PHASE3_TELEPORT_COOLDOWN);
        assert_eq!(state.hazard_count(), 5);
        assert!(state
            .hazards()
            .all(|at| at.x.abs() <= ENRAGE_HAZARD_SPREAD && at.y.abs() <= ENRAGE_HAZARD_SPREAD));
        assert_eq!(ports.count_events("taunt"), 3);
    }
}

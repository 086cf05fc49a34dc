//! Speed boss: The Shadow Blade
//!
//! Low health, very fast. Dashes in from medium range, chains a three-hit
//! combo and sometimes dodges a blow outright.

use hecs::Entity;
use rand::Rng;

use crate::data::SpeedTuning;
use crate::ecs::systems::{self, taunt, Actor};
use crate::ecs::{AiState, Vec2};
use crate::entities::behavior::BehaviorPolicy;
use crate::game::{Ability, CombatEvent, Cooldown};
use crate::world::Ports;

const PHASE2_MOVE_SPEED: f32 = 220.0;
const PHASE2_DASH_COOLDOWN: f32 = 1.5;
const PHASE2_ATTACK_COOLDOWN: f32 = 0.4;
const ENRAGE_MOVE_SPEED: f32 = 250.0;
const ENRAGE_DASH_SPEED: f32 = 500.0;
const ENRAGE_DASH_COOLDOWN: f32 = 1.0;
const ENRAGE_ATTACK_COOLDOWN: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Dash {
    direction: Vec2,
    remaining: f32,
}

#[derive(Debug, Clone)]
pub struct SpeedBoss {
    pub dash_speed: f32,
    dash_distance: f32,
    dash_cooldown: Cooldown,
    dash_min_range: f32,
    dash_max_range: f32,
    dash_bonus_damage: i32,
    dash: Option<Dash>,
    combo_count: u32,
    combo_hits: u32,
    combo_reset: Cooldown,
    dodge_chance: f64,
    afterimages: u32,
    max_afterimages: u32,
}

impl SpeedBoss {
    pub fn new(tuning: &SpeedTuning) -> Self {
        Self {
            dash_speed: tuning.dash_speed,
            dash_distance: tuning.dash_distance,
            dash_cooldown: Cooldown::new(tuning.dash_cooldown),
            dash_min_range: tuning.dash_min_range,
            dash_max_range: tuning.dash_max_range,
            dash_bonus_damage: tuning.dash_bonus_damage,
            dash: None,
            combo_count: 0,
            combo_hits: tuning.combo_hits.max(1),
            combo_reset: Cooldown::new(tuning.combo_reset),
            dodge_chance: tuning.dodge_chance.clamp(0.0, 1.0),
            afterimages: 0,
            max_afterimages: tuning.max_afterimages,
        }
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_some()
    }

    pub fn combo_count(&self) -> u32 {
        self.combo_count
    }

    pub fn afterimages(&self) -> u32 {
        self.afterimages
    }

    pub fn dash_cooldown(&self) -> &Cooldown {
        &self.dash_cooldown
    }

    fn create_afterimage(&mut self, actor: &Actor, ports: &mut dyn Ports) {
        if self.afterimages >= self.max_afterimages {
            return;
        }
        self.afterimages += 1;
        log::debug!(
            "{} creates an afterimage! ({}/{})",
            actor.name,
            self.afterimages,
            self.max_afterimages
        );
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Afterimage,
        });
    }

    fn start_dash(&mut self, actor: &Actor, ports: &mut dyn Ports, toward: Vec2) {
        self.dash_cooldown.restart();
        self.dash = Some(Dash {
            direction: actor.position.direction_to(toward),
            remaining: self.dash_distance / self.dash_speed,
        });

        log::info!("{} dashes!", actor.name);
        ports.notify(CombatEvent::AbilityUsed {
            entity: actor.entity,
            ability: Ability::Dash,
        });
        self.create_afterimage(actor, ports);
    }

    fn process_dash(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        let Some(mut dash) = self.dash else {
            return;
        };
        dash.remaining -= dt;
        if dash.remaining <= 0.0 {
            self.dash = None;
            systems::halt(actor, ports);
            return;
        }
        self.dash = Some(dash);
        systems::steer(actor, ports, dash.direction, self.dash_speed);

        let Some(target) = actor.player_target(ports) else {
            return;
        };
        if target.distance <= actor.brain.attack_range && actor.brain.attack_cooldown.is_ready() {
            let damage = actor.vitals.attack_value + self.dash_bonus_damage;
            actor.brain.attack_cooldown.restart();
            log::info!("{} hits with DASH ATTACK for {} damage!", actor.name, damage);
            ports.notify(CombatEvent::AbilityUsed {
                entity: actor.entity,
                ability: Ability::DashStrike,
            });
            systems::deal_damage(actor, ports, target.entity, damage);
        }
    }
}

impl BehaviorPolicy for SpeedBoss {
    fn on_tick(&mut self, actor: &mut Actor, ports: &mut dyn Ports, dt: f32) {
        self.dash_cooldown.tick(dt);
        if self.combo_reset.tick(dt) && self.combo_count > 0 {
            log::debug!("{}'s combo resets.", actor.name);
            self.combo_count = 0;
        }

        if self.is_dashing() {
            self.process_dash(actor, ports, dt);
            return;
        }

        systems::run_state_machine(self, actor, ports);

        if actor.brain.state != AiState::Chase || !self.dash_cooldown.is_ready() {
            return;
        }
        if let Some(target) = actor.player_target(ports) {
            if target.distance > self.dash_min_range && target.distance < self.dash_max_range {
                self.start_dash(actor, ports, target.position);
            }
        }
    }

    fn strike(&mut self, actor: &mut Actor, ports: &mut dyn Ports, target: Entity) {
        actor.brain.attack_cooldown.restart();
        self.combo_count += 1;
        self.combo_reset.restart();

        let mut damage = actor.vitals.calculate_attack_damage(ports.rng());
        if self.combo_count >= self.combo_hits {
            damage *= 2;
            self.combo_count = 0;
            log::info!("{} completes a {}-hit combo!", actor.name, self.combo_hits);
            ports.notify(CombatEvent::AbilityUsed {
                entity: actor.entity,
                ability: Ability::ComboFinisher,
            });
        }
        log::debug!("{} slashes for {} (combo {})", actor.name, damage, self.combo_count);
        systems::deal_damage(actor, ports, target, damage);
    }

    fn on_phase_change(&mut self, actor: &mut Actor, ports: &mut dyn Ports, phase: u32) {
        if phase != 2 {
            return;
        }
        taunt(actor, ports, "You're too slow! Can you keep up?");
        actor.vitals.move_speed = PHASE2_MOVE_SPEED;
        self.dash_cooldown.set_duration(PHASE2_DASH_COOLDOWN);
        actor.brain.attack_cooldown.set_duration(PHASE2_ATTACK_COOLDOWN);
        self.create_afterimage(actor, ports);
    }

    fn on_enrage(&mut self, actor: &mut Actor, ports: &mut dyn Ports) {
        taunt(actor, ports, "I am speed incarnate!");
        actor.vitals.move_speed = ENRAGE_MOVE_SPEED;
        self.dash_speed = ENRAGE_DASH_SPEED;
        self.dash_cooldown.set_duration(ENRAGE_DASH_COOLDOWN);
        actor.brain.attack_cooldown.set_duration(ENRAGE_ATTACK_COOLDOWN);
        for _ in 0..self.max_afterimages {
            self.create_afterimage(actor, ports);
        }
    }

    fn modify_incoming(
        &mut self,
        actor: &mut Actor,
        ports: &mut dyn Ports,
        amount: i32,
    ) -> Option<i32> {
        if self.is_dashing() || !ports.rng().gen_bool(self.dodge_chance) {
            return Some(amount);
        }

        log::info!("{} dodges the attack with incredible speed!", actor.name);
        ports.notify(CombatEvent::Dodged {
            entity: actor.entity,
            attacker: None,
        });
        if self.dash_cooldown.is_ready() {
            if let Some(target) = actor.player_target(ports) {
                self.start_dash(actor, ports, target.position);
            }
        }
        None
    }

    fn on_damage_taken(&mut self, actor: &mut Actor, ports: &mut dyn Ports, _amount: i32) {
        self.create_afterimage(actor, ports);
    }
}

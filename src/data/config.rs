//! Simulation configuration

use serde::{Deserialize, Serialize};

use crate::ecs::Vitals;
use crate::progression::Difficulty;

/// Player stats used by `Simulation::spawn_player`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerTemplate {
    pub name: String,
    pub max_health: i32,
    pub attack_value: i32,
    pub move_speed: f32,
    /// Reach of the player's melee swing
    pub attack_range: f32,
    #[serde(default)]
    pub weapon: Option<String>,
}

impl PlayerTemplate {
    pub fn vitals(&self) -> Vitals {
        let mut vitals = Vitals::new(self.max_health, self.attack_value, self.move_speed);
        vitals.weapon = self.weapon.clone();
        vitals
    }
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            name: "Hero".to_string(),
            max_health: 100,
            attack_value: 10,
            move_speed: 200.0,
            attack_range: 100.0,
            weapon: Some("1d6".to_string()),
        }
    }
}

/// Global simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Seed for the simulation's random source
    pub seed: u64,
    /// Seconds a dead entity lingers before removal
    pub despawn_delay: f32,
    pub difficulty: Difficulty,
    /// Hit radius used when resolving projectile rays
    pub target_radius: f32,
    /// Enemy template used for summoned minions
    pub minion_template: String,
    /// Optional lifetime after which summoned minions expire
    #[serde(default)]
    pub minion_lifetime: Option<f32>,
    pub player: PlayerTemplate,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            despawn_delay: 2.0,
            difficulty: Difficulty::Normal,
            target_radius: 16.0,
            minion_template: "undead_minion".to_string(),
            minion_lifetime: None,
            player: PlayerTemplate::default(),
        }
    }
}

//! Difficulty settings
//!
//! Scales enemy and boss stat blocks at spawn time. The player is never scaled.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Game difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    /// Damage multiplier for enemies
    pub fn enemy_damage_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.7,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.3,
            Difficulty::Nightmare => 1.6,
        }
    }

    /// Health multiplier for enemies
    pub fn enemy_health_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.25,
            Difficulty::Nightmare => 1.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Nightmare => "Nightmare",
        }
    }

    /// Scaled max health, never below 1
    pub fn scale_health(&self, base_hp: i32) -> i32 {
        let scaled = base_hp as f32 * self.enemy_health_mult();
        (scaled.round() as i32).max(1)
    }

    /// Scaled attack value
    pub fn scale_attack(&self, base_attack: i32) -> i32 {
        let scaled = base_attack as f32 * self.enemy_damage_mult();
        scaled.round() as i32
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "nightmare" => Ok(Difficulty::Nightmare),
            other => Err(format!("unknown difficulty: {}", other)),
        }
    }
}

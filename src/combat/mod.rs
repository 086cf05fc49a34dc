//! Combat math

pub mod damage;

pub use damage::{
    armor_percent, armored_damage, falloff_damage, minion_shield_percent, parse_dice,
    ray_hits, reduce_by_percent, roll_damage, CombatError, FALLBACK_DAMAGE,
    MAX_DICE_COUNT,
};

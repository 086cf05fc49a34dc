//! Boss templates
//!
//! One template per archetype: identity, stat block, escalation settings and
//! the archetype's own ability tuning.

use serde::{Deserialize, Serialize};

use super::enemies::StatBlock;

/// Shared boss template, parameterised over the archetype tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTemplate<T> {
    /// Boss title shown on the health bar
    pub title: String,
    /// Internal enemy name
    pub name: String,
    pub stats: StatBlock,
    pub phase_count: u32,
    /// Health fraction at or below which the boss enrages
    pub enrage_threshold: f32,
    pub gold_drop: u32,
    pub tuning: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankTuning {
    /// Base fraction of incoming damage absorbed
    pub damage_reduction: f32,
    pub max_armor_stacks: u32,
    pub pound_radius: f32,
    pub pound_damage: i32,
    pub pound_cooldown: f32,
}

impl Default for TankTuning {
    fn default() -> Self {
        Self {
            damage_reduction: 0.2,
            max_armor_stacks: 5,
            pound_radius: 150.0,
            pound_damage: 25,
            pound_cooldown: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTuning {
    pub dash_speed: f32,
    pub dash_distance: f32,
    pub dash_cooldown: f32,
    /// Dash only while the player is farther than this
    pub dash_min_range: f32,
    /// Dash only while the player is nearer than this
    pub dash_max_range: f32,
    pub dash_bonus_damage: i32,
    pub combo_hits: u32,
    pub combo_reset: f32,
    pub dodge_chance: f64,
    pub max_afterimages: u32,
}

impl Default for SpeedTuning {
    fn default() -> Self {
        Self {
            dash_speed: 400.0,
            dash_distance: 200.0,
            dash_cooldown: 2.0,
            dash_min_range: 100.0,
            dash_max_range: 250.0,
            dash_bonus_damage: 5,
            combo_hits: 3,
            combo_reset: 2.0,
            dodge_chance: 0.15,
            max_afterimages: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangedTuning {
    pub preferred_distance: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
    pub projectile_cooldown: f32,
    /// Seconds between pattern switches
    pub pattern_cycle: f32,
    pub spread_degrees: f32,
    pub circle_rays: u32,
    pub teleport_distance: f32,
    pub teleport_cooldown: f32,
    /// Teleport away when the player closes inside this distance
    pub teleport_trigger: f32,
    pub teleport_on_hit_chance: f64,
    pub max_hazards: usize,
}

impl Default for RangedTuning {
    fn default() -> Self {
        Self {
            preferred_distance: 200.0,
            projectile_damage: 15,
            projectile_speed: 300.0,
            projectile_cooldown: 1.5,
            pattern_cycle: 5.0,
            spread_degrees: 20.0,
            circle_rays: 8,
            teleport_distance: 250.0,
            teleport_cooldown: 8.0,
            teleport_trigger: 100.0,
            teleport_on_hit_chance: 0.25,
            max_hazards: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BerserkerTuning {
    pub lifesteal: f32,
    pub cleave_radius: f32,
    pub rage_per_hit: f32,
    pub whirlwind_cooldown: f32,
    pub whirlwind_duration: f32,
    /// Start a whirlwind when the player is nearer than this
    pub whirlwind_trigger: f32,
    /// Seconds between whirlwind damage pulses
    pub whirlwind_pulse: f32,
    pub execute_threshold: f32,
    pub blood_trail_interval: f32,
}

impl Default for BerserkerTuning {
    fn default() -> Self {
        Self {
            lifesteal: 0.15,
            cleave_radius: 80.0,
            rage_per_hit: 0.05,
            whirlwind_cooldown: 8.0,
            whirlwind_duration: 3.0,
            whirlwind_trigger: 100.0,
            whirlwind_pulse: 0.25,
            execute_threshold: 0.15,
            blood_trail_interval: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NecromancerTuning {
    pub max_minions: usize,
    pub initial_minions: u32,
    pub summon_cooldown: f32,
    /// Minions appear within this square offset of the boss
    pub summon_spread: f32,
    pub drain_range: f32,
    pub drain_damage: i32,
    pub drain_interval: f32,
    pub curse_cooldown: f32,
    pub curse_damage: i32,
    pub resurrect_cooldown: f32,
    pub resurrect_batch: u32,
    pub nova_radius: f32,
    pub nova_damage: i32,
}

impl Default for NecromancerTuning {
    fn default() -> Self {
        Self {
            max_minions: 5,
            initial_minions: 2,
            summon_cooldown: 6.0,
            summon_spread: 100.0,
            drain_range: 150.0,
            drain_damage: 5,
            drain_interval: 1.0,
            curse_cooldown: 12.0,
            curse_damage: 15,
            resurrect_cooldown: 15.0,
            resurrect_batch: 3,
            nova_radius: 200.0,
            nova_damage: 30,
        }
    }
}

/// All boss templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossTemplates {
    pub tank: BossTemplate<TankTuning>,
    pub speed: BossTemplate<SpeedTuning>,
    pub ranged: BossTemplate<RangedTuning>,
    pub berserker: BossTemplate<BerserkerTuning>,
    pub necromancer: BossTemplate<NecromancerTuning>,
}

impl Default for BossTemplates {
    fn default() -> Self {
        default_boss_templates()
    }
}

fn boss<T>(
    title: &str,
    name: &str,
    stats: StatBlock,
    phase_count: u32,
    gold_drop: u32,
    tuning: T,
) -> BossTemplate<T> {
    BossTemplate {
        title: title.to_string(),
        name: name.to_string(),
        stats,
        phase_count,
        enrage_threshold: 0.3,
        gold_drop,
        tuning,
    }
}

/// Create default boss templates (hardcoded fallback)
pub fn default_boss_templates() -> BossTemplates {
    BossTemplates {
        tank: boss(
            "The Iron Colossus",
            "Tank Boss",
            StatBlock::new(300, 25, 60.0, 250.0, 60.0, 1.0),
            2,
            150,
            TankTuning::default(),
        ),
        speed: boss(
            "The Shadow Blade",
            "Speed Boss",
            StatBlock::new(120, 12, 180.0, 300.0, 45.0, 0.5),
            2,
            120,
            SpeedTuning::default(),
        ),
        ranged: boss(
            "The Arcane Sorcerer",
            "Ranged Boss",
            StatBlock::new(180, 10, 120.0, 400.0, 300.0, 1.0),
            3,
            140,
            RangedTuning::default(),
        ),
        berserker: boss(
            "The Blood Reaver",
            "Berserker Boss",
            StatBlock::new(220, 18, 140.0, 350.0, 55.0, 1.0),
            4,
            160,
            BerserkerTuning::default(),
        ),
        necromancer: boss(
            "The Undying Archlich",
            "Necromancer Boss",
            StatBlock::new(150, 8, 100.0, 400.0, 250.0, 1.0),
            3,
            200,
            NecromancerTuning::default(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identities() {
        let bosses = default_boss_templates();
        assert_eq!(bosses.tank.title, "The Iron Colossus");
        assert_eq!(bosses.tank.stats.max_health, 300);
        assert_eq!(bosses.berserker.phase_count, 4);
        assert_eq!(bosses.necromancer.gold_drop, 200);
        assert_eq!(bosses.ranged.stats.attack_range, 300.0);
    }

    #[test]
    fn test_all_bosses_enrage_at_thirty_percent() {
        let bosses = default_boss_templates();
        for threshold in [
            bosses.tank.enrage_threshold,
            bosses.speed.enrage_threshold,
            bosses.ranged.enrage_threshold,
            bosses.berserker.enrage_threshold,
            bosses.necromancer.enrage_threshold,
        ] {
            assert_eq!(threshold, 0.3);
        }
    }
}

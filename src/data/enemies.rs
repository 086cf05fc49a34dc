//! Enemy templates for data-driven enemy creation
//!
//! These templates are loaded from RON files and used to spawn enemies.

use serde::{Deserialize, Serialize};

use crate::ecs::{Brain, Vitals};
use crate::progression::Difficulty;

/// Combat stats and AI ranges shared by enemy and boss templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBlock {
    pub max_health: i32,
    pub attack_value: i32,
    pub move_speed: f32,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Seconds between basic attacks
    pub attack_cooldown: f32,
    /// Optional weapon dice, e.g. "1d6"
    #[serde(default)]
    pub weapon: Option<String>,
}

impl StatBlock {
    pub fn new(
        max_health: i32,
        attack_value: i32,
        move_speed: f32,
        detection_range: f32,
        attack_range: f32,
        attack_cooldown: f32,
    ) -> Self {
        Self {
            max_health,
            attack_value,
            move_speed,
            detection_range,
            attack_range,
            attack_cooldown,
            weapon: None,
        }
    }

    /// Build full-health vitals, scaled for the difficulty
    pub fn vitals(&self, difficulty: Difficulty) -> Vitals {
        let mut vitals = Vitals::new(
            difficulty.scale_health(self.max_health),
            difficulty.scale_attack(self.attack_value),
            self.move_speed,
        );
        vitals.weapon = self.weapon.clone();
        vitals
    }

    /// Build an idle brain with this block's ranges
    pub fn brain(&self) -> Brain {
        Brain::new(self.detection_range, self.attack_range, self.attack_cooldown)
    }
}

/// A template for creating enemies from external data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplate {
    /// Unique template ID for reference
    pub id: String,
    /// Display name
    pub name: String,
    pub stats: StatBlock,
    /// Start in Patrol around the spawn point with this radius
    #[serde(default)]
    pub patrol_radius: Option<f32>,
    /// Optional description/lore
    #[serde(default)]
    pub description: Option<String>,
    /// Behavior the enemy runs on top of the shared state machine
    #[serde(default)]
    pub archetype: EnemyArchetype,
}

/// Regular enemy behaviors and their tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum EnemyArchetype {
    #[default]
    Generic,
    /// Runs away once hurt
    Coward(CowardTuning),
    /// Slow hitter with an area slam
    Brute(BruteTuning),
    /// Holds a range band and shoots
    Marksman(MarksmanTuning),
    /// Teleports behind the player and backstabs from stealth
    Stalker(StalkerTuning),
    /// Hits harder the more it is hurt
    Frenzy(FrenzyTuning),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CowardTuning {
    /// Health fraction at or below which the enemy flees
    pub flee_threshold: f32,
    pub flee_speed_multiplier: f32,
    /// Chance to panic and flee early on any hit
    pub panic_chance: f64,
}

impl Default for CowardTuning {
    fn default() -> Self {
        Self {
            flee_threshold: 0.3,
            flee_speed_multiplier: 1.5,
            panic_chance: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BruteTuning {
    pub slam_range: f32,
    pub slam_damage: i32,
    pub slam_cooldown: f32,
    /// Chance per attacking tick to slam once the cooldown is ready
    pub slam_chance: f64,
}

impl Default for BruteTuning {
    fn default() -> Self {
        Self {
            slam_range: 100.0,
            slam_damage: 20,
            slam_cooldown: 5.0,
            slam_chance: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarksmanTuning {
    /// Closer than this the enemy backs away
    pub min_range: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
}

impl Default for MarksmanTuning {
    fn default() -> Self {
        Self {
            min_range: 100.0,
            projectile_damage: 12,
            projectile_speed: 300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StalkerTuning {
    pub teleport_cooldown: f32,
    /// Maximum distance to the player for an ambush teleport
    pub teleport_range: f32,
    pub teleport_chance: f64,
    /// How far past the player the ambush lands
    pub ambush_offset: f32,
    pub backstab_multiplier: f32,
    pub stealth_duration: f32,
    /// Chance to blink away when hit
    pub escape_chance: f64,
    pub escape_distance: f32,
}

impl Default for StalkerTuning {
    fn default() -> Self {
        Self {
            teleport_cooldown: 8.0,
            teleport_range: 300.0,
            teleport_chance: 0.4,
            ambush_offset: 40.0,
            backstab_multiplier: 2.0,
            stealth_duration: 2.0,
            escape_chance: 0.25,
            escape_distance: 150.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrenzyTuning {
    /// Health fraction at or below which the enemy enrages
    pub enrage_threshold: f32,
    pub damage_multiplier: f32,
    pub speed_multiplier: f32,
    /// Attack cooldown scale once enraged
    pub cooldown_multiplier: f32,
    /// Attack gained per hit taken before enraging
    pub attack_per_hit: i32,
}

impl Default for FrenzyTuning {
    fn default() -> Self {
        Self {
            enrage_threshold: 0.4,
            damage_multiplier: 1.5,
            speed_multiplier: 1.3,
            cooldown_multiplier: 0.8,
            attack_per_hit: 1,
        }
    }
}

/// Collection of enemy templates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplates {
    pub templates: Vec<EnemyTemplate>,
}

impl Default for EnemyTemplates {
    fn default() -> Self {
        default_enemy_templates()
    }
}

impl EnemyTemplates {
    /// Find a template by ID
    pub fn find(&self, id: &str) -> Option<&EnemyTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.iter().map(|t| t.id.as_str())
    }
}

fn template(
    id: &str,
    name: &str,
    stats: StatBlock,
    patrol_radius: Option<f32>,
    archetype: EnemyArchetype,
    description: &str,
) -> EnemyTemplate {
    EnemyTemplate {
        id: id.to_string(),
        name: name.to_string(),
        stats,
        patrol_radius,
        description: Some(description.to_string()),
        archetype,
    }
}

/// Create default enemy templates (hardcoded fallback)
pub fn default_enemy_templates() -> EnemyTemplates {
    EnemyTemplates {
        templates: vec![
            template(
                "troll",
                "Troll",
                StatBlock::new(50, 8, 100.0, 200.0, 50.0, 1.0),
                None,
                EnemyArchetype::Generic,
                "A lumbering brute that guards the roads.",
            ),
            template(
                "goblin",
                "Goblin",
                StatBlock::new(30, 6, 130.0, 250.0, 40.0, 0.8),
                Some(100.0),
                EnemyArchetype::Coward(CowardTuning::default()),
                "Quick and cowardly, dangerous in numbers.",
            ),
            template(
                "ogre",
                "Ogre",
                StatBlock::new(120, 15, 70.0, 180.0, 60.0, 2.0),
                None,
                EnemyArchetype::Brute(BruteTuning::default()),
                "Slow, but every blow lands like a falling tree.",
            ),
            template(
                "archer",
                "Archer",
                StatBlock::new(40, 10, 110.0, 300.0, 250.0, 1.5),
                Some(100.0),
                EnemyArchetype::Marksman(MarksmanTuning::default()),
                "Keeps its distance and looses arrows.",
            ),
            template(
                "assassin",
                "Assassin",
                StatBlock::new(35, 20, 150.0, 220.0, 50.0, 1.0),
                None,
                EnemyArchetype::Stalker(StalkerTuning::default()),
                "Strikes hard and fast from the shadows.",
            ),
            template(
                "raider",
                "Raider",
                StatBlock::new(80, 12, 100.0, 200.0, 50.0, 1.2),
                Some(100.0),
                EnemyArchetype::Frenzy(FrenzyTuning::default()),
                "A seasoned marauder whose fury grows with every wound.",
            ),
            template(
                "undead_minion",
                "Undead Minion",
                StatBlock::new(20, 5, 100.0, 300.0, 40.0, 1.2),
                None,
                EnemyArchetype::Generic,
                "A weak servant raised by necromancy.",
            ),
        ],
    }
}

//! Data loading and external tuning content
//!
//! This module handles loading simulation data from external RON files,
//! allowing enemies and bosses to be rebalanced without recompiling.

pub mod bosses;
pub mod config;
pub mod enemies;
pub mod loader;

pub use bosses::{
    BerserkerTuning, BossTemplate, BossTemplates, NecromancerTuning, RangedTuning, SpeedTuning,
    TankTuning,
};
pub use config::{PlayerTemplate, SimConfig};
pub use enemies::{
    BruteTuning, CowardTuning, EnemyArchetype, EnemyTemplate, EnemyTemplates, FrenzyTuning,
    MarksmanTuning, StalkerTuning, StatBlock,
};
pub use loader::{export_default_data, DataError, DataManager};

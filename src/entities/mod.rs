//! Entity creation and management

pub mod behavior;
pub mod bosses;
pub mod enemies;
pub mod minions;
pub mod player;

pub use behavior::{Behavior, BehaviorPolicy, GenericEnemy};
pub use bosses::{spawn_boss, BossCore, BossKind};
pub use enemies::spawn_enemy;
pub use minions::{spawn_minion, MinionBond};
pub use player::{spawn_player, Reach};

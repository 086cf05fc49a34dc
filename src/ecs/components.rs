//! ECS Components
//!
//! All components attached to entities in the simulation arena.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combat::{roll_damage, CombatError};
use crate::entities::behavior::Behavior;
use crate::entities::bosses::BossCore;
use crate::entities::minions::MinionBond;
use crate::game::Cooldown;

// ============================================================================
// Position & Movement
// ============================================================================

/// 2D vector in world units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(&self, other: Vec2) -> f32 {
        (other - *self).length()
    }

    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector in the same direction, or zero for a zero-length vector
    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len <= f32::EPSILON {
            Vec2::ZERO
        } else {
            Vec2::new(self.x / len, self.y / len)
        }
    }

    /// Unit vector pointing from `self` towards `target`
    pub fn direction_to(&self, target: Vec2) -> Vec2 {
        (target - *self).normalized()
    }

    /// Rotate by `angle` radians (counter-clockwise)
    pub fn rotated(&self, angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Unit vector at `angle` radians from the +x axis
    pub fn from_angle(angle: f32) -> Vec2 {
        let (sin, cos) = angle.sin_cos();
        Vec2::new(cos, sin)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Position in the game world
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position(pub Vec2);

/// Desired velocity for the current tick, integrated by the movement executor
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity(pub Vec2);

// ============================================================================
// Identity & Naming
// ============================================================================

/// Name component for entities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Marks an entity as the player
#[derive(Debug, Clone, Copy, Default)]
pub struct Player;

/// Faction for determining hostility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Player,
    Enemy,
}

// ============================================================================
// Combat Stats
// ============================================================================

/// Result of applying damage to a `Vitals`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DamageOutcome {
    /// Health actually removed
    pub applied: i32,
    /// True only on the hit that brought health to zero
    pub killed: bool,
}

/// Shared combat attributes of players, enemies and bosses.
///
/// `current_health` stays within `[0, max_health]`; `take_damage` and `heal`
/// are its only mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    max_health: i32,
    current_health: i32,
    pub attack_value: i32,
    pub move_speed: f32,
    /// Weapon damage dice in "NdM" notation, rolled on top of `attack_value`
    pub weapon: Option<String>,
}

impl Vitals {
    /// Create vitals at full health
    pub fn new(max_health: i32, attack_value: i32, move_speed: f32) -> Self {
        let max_health = max_health.max(1);
        Self {
            max_health,
            current_health: max_health,
            attack_value,
            move_speed,
            weapon: None,
        }
    }

    pub fn with_weapon(mut self, notation: impl Into<String>) -> Self {
        self.weapon = Some(notation.into());
        self
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0
    }

    pub fn health_fraction(&self) -> f32 {
        self.current_health as f32 / self.max_health as f32
    }

    /// Subtract health, flooring at zero. Negative amounts are rejected.
    pub fn take_damage(&mut self, amount: i32) -> Result<DamageOutcome, CombatError> {
        if amount < 0 {
            return Err(CombatError::NegativeAmount(amount));
        }
        if !self.is_alive() {
            return Ok(DamageOutcome::default());
        }

        let applied = amount.min(self.current_health);
        self.current_health -= applied;
        Ok(DamageOutcome {
            applied,
            killed: self.current_health == 0,
        })
    }

    /// Add health, capped at max. Dead entities cannot be healed.
    pub fn heal(&mut self, amount: i32) -> Result<i32, CombatError> {
        if amount < 0 {
            return Err(CombatError::NegativeAmount(amount));
        }
        if !self.is_alive() {
            return Ok(0);
        }

        let actual = amount.min(self.max_health - self.current_health);
        self.current_health += actual;
        Ok(actual)
    }

    /// Base attack plus a weapon roll when a weapon is equipped
    pub fn calculate_attack_damage(&self, rng: &mut (impl Rng + ?Sized)) -> i32 {
        let weapon = self
            .weapon
            .as_deref()
            .map(|notation| roll_damage(notation, rng))
            .unwrap_or(0);
        self.attack_value + weapon
    }
}

// ============================================================================
// AI
// ============================================================================

/// Enemy state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Dead,
}

impl AiState {
    pub fn name(&self) -> &'static str {
        match self {
            AiState::Idle => "Idle",
            AiState::Patrol => "Patrol",
            AiState::Chase => "Chase",
            AiState::Attack => "Attack",
            AiState::Dead => "Dead",
        }
    }
}

/// Post-death delay before removal, in seconds
pub const DEFAULT_DESPAWN_DELAY: f32 = 2.0;

/// Wander area around a spawn point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatrolRoute {
    pub home: Vec2,
    pub radius: f32,
    pub target: Vec2,
}

impl PatrolRoute {
    pub fn new(home: Vec2, radius: f32) -> Self {
        Self { home, radius, target: home }
    }
}

/// AI behavior component (EnemyAI, optionally extended to a boss or minion)
#[derive(Debug, Clone)]
pub struct Brain {
    pub state: AiState,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Gates repeated basic attacks
    pub attack_cooldown: Cooldown,
    pub patrol: Option<PatrolRoute>,
    /// Seconds the body lingers after death
    pub despawn_delay: f32,
    /// Armed on death; the entity is removed once it elapses
    pub despawn: Option<Cooldown>,
    /// Phase and enrage bookkeeping for bosses
    pub boss: Option<BossCore>,
    /// Master link for minions
    pub bond: Option<MinionBond>,
    pub behavior: Behavior,
}

impl Brain {
    pub fn new(detection_range: f32, attack_range: f32, attack_cooldown: f32) -> Self {
        Self {
            state: AiState::Idle,
            detection_range,
            attack_range,
            attack_cooldown: Cooldown::new(attack_cooldown),
            patrol: None,
            despawn_delay: DEFAULT_DESPAWN_DELAY,
            despawn: None,
            boss: None,
            bond: None,
            behavior: Behavior::default(),
        }
    }

    /// Start in Patrol around `home`
    pub fn with_patrol(mut self, home: Vec2, radius: f32) -> Self {
        self.patrol = Some(PatrolRoute::new(home, radius));
        self.state = AiState::Patrol;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn with_boss(mut self, boss: BossCore) -> Self {
        self.boss = Some(boss);
        self
    }

    pub fn with_bond(mut self, bond: MinionBond) -> Self {
        self.bond = Some(bond);
        self
    }

    /// Arm the despawn timer if it is not already running
    pub fn arm_despawn(&mut self) {
        if self.despawn.is_none() {
            let mut timer = Cooldown::new(self.despawn_delay);
            timer.restart();
            self.despawn = Some(timer);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.state == AiState::Dead
    }

    /// True once the post-death delay has elapsed
    pub fn ready_to_despawn(&self) -> bool {
        self.despawn.is_some_and(|timer| timer.is_ready())
    }
}

impl Default for Brain {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

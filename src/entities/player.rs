//! Player entity creation

use hecs::{Entity, World};

use crate::data::PlayerTemplate;
use crate::ecs::{Faction, Name, Player, Position, Vec2, Velocity};

/// Player melee reach, stored alongside its vitals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reach(pub f32);

/// Spawn the player entity
pub fn spawn_player(world: &mut World, template: &PlayerTemplate, pos: Vec2) -> Entity {
    log::info!(
        "Player '{}' initialized with {} HP",
        template.name,
        template.max_health
    );

    world.spawn((
        Player,
        Position(pos),
        Velocity::default(),
        Name::new(template.name.clone()),
        Faction::Player,
        template.vitals(),
        Reach(template.attack_range),
    ))
}

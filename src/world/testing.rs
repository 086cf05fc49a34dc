//! In-memory `Ports` used by unit tests

use std::collections::HashMap;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use super::ports::{DamageSink, Movement, NotificationSink, Ports, SpawnService, WorldQuery};
use crate::ecs::Vec2;
use crate::game::CombatEvent;

#[derive(Debug, Clone, Copy)]
struct Npc {
    position: Vec2,
    alive: bool,
}

pub struct MockPorts {
    slots: World,
    player: Option<Entity>,
    player_position: Vec2,
    player_health: i32,
    player_max_health: i32,
    npcs: HashMap<Entity, Npc>,
    velocities: HashMap<Entity, Vec2>,
    pub events: Vec<CombatEvent>,
    pub entity_hits: Vec<(Entity, Entity, i32)>,
    pub spawned: Vec<(Entity, Entity)>,
    pub reports: Vec<(Entity, Entity)>,
    rng: StdRng,
}

impl MockPorts {
    pub fn without_player() -> Self {
        Self {
            slots: World::new(),
            player: None,
            player_position: Vec2::ZERO,
            player_health: 0,
            player_max_health: 100,
            npcs: HashMap::new(),
            velocities: HashMap::new(),
            events: Vec::new(),
            entity_hits: Vec::new(),
            spawned: Vec::new(),
            reports: Vec::new(),
            rng: StdRng::seed_from_u64(99),
        }
    }

    pub fn with_player(position: Vec2) -> Self {
        let mut ports = Self::without_player();
        ports.player = Some(ports.slots.spawn(()));
        ports.player_position = position;
        ports.player_health = 100;
        ports
    }

    pub fn spawn_npc(&mut self, position: Vec2) -> Entity {
        let entity = self.slots.spawn(());
        self.npcs.insert(entity, Npc { position, alive: true });
        entity
    }

    /// Remove an NPC so its handle goes stale
    pub fn despawn(&mut self, entity: Entity) {
        self.npcs.remove(&entity);
        let _ = self.slots.despawn(entity);
    }

    pub fn set_alive(&mut self, entity: Entity, alive: bool) {
        if let Some(npc) = self.npcs.get_mut(&entity) {
            npc.alive = alive;
        }
    }

    pub fn set_player_position(&mut self, position: Vec2) {
        self.player_position = position;
    }

    pub fn set_player_health(&mut self, health: i32) {
        self.player_health = health.clamp(0, self.player_max_health);
    }

    pub fn kill_player(&mut self) {
        self.player_health = 0;
    }

    pub fn player_health(&self) -> i32 {
        self.player_health
    }

    pub fn player_damage_taken(&self) -> i32 {
        self.player_max_health - self.player_health
    }

    pub fn velocity_of(&self, entity: Entity) -> Vec2 {
        self.velocities.get(&entity).copied().unwrap_or_default()
    }

    pub fn count_events(&self, kind: &str) -> usize {
        self.events.iter().filter(|e| e.name() == kind).count()
    }
}

impl WorldQuery for MockPorts {
    fn find_player(&self) -> Option<Entity> {
        self.player
    }

    fn is_valid(&self, entity: Entity) -> bool {
        self.slots.contains(entity)
    }

    fn is_alive(&self, entity: Entity) -> bool {
        if Some(entity) == self.player {
            return self.player_health > 0;
        }
        self.npcs.get(&entity).is_some_and(|npc| npc.alive)
    }

    fn position(&self, entity: Entity) -> Option<Vec2> {
        if Some(entity) == self.player {
            return Some(self.player_position);
        }
        self.npcs.get(&entity).map(|npc| npc.position)
    }

    fn health_fraction(&self, entity: Entity) -> Option<f32> {
        if Some(entity) == self.player {
            return Some(self.player_health as f32 / self.player_max_health as f32);
        }
        self.npcs
            .get(&entity)
            .map(|npc| if npc.alive { 1.0 } else { 0.0 })
    }

    fn hostiles_within(&self, center: Vec2, radius: f32) -> Vec<(Entity, f32)> {
        match self.player {
            Some(player) if self.player_health > 0 => {
                let distance = center.distance(self.player_position);
                if distance <= radius {
                    vec![(player, distance)]
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        }
    }
}

impl Movement for MockPorts {
    fn move_entity(&mut self, entity: Entity, velocity: Vec2) {
        self.velocities.insert(entity, velocity);
    }

    fn place_entity(&mut self, entity: Entity, position: Vec2) {
        if let Some(npc) = self.npcs.get_mut(&entity) {
            npc.position = position;
        }
    }
}

impl DamageSink for MockPorts {
    fn apply_damage_to_player(&mut self, source: Entity, amount: i32) -> i32 {
        let Some(player) = self.player else {
            return 0;
        };
        let applied = amount.clamp(0, self.player_health);
        self.player_health -= applied;
        self.events.push(CombatEvent::DamageDealt {
            source: Some(source),
            target: player,
            amount: applied,
        });
        applied
    }

    fn apply_damage_to_entity(&mut self, source: Entity, target: Entity, amount: i32) -> i32 {
        if Some(target) == self.player {
            return self.apply_damage_to_player(source, amount);
        }
        self.entity_hits.push((source, target, amount));
        amount
    }
}

impl SpawnService for MockPorts {
    fn spawn_minion(&mut self, master: Entity, offset: Vec2) -> Option<Entity> {
        let origin = self.position(master).unwrap_or_default();
        let minion = self.spawn_npc(origin + offset);
        self.spawned.push((master, minion));
        self.events.push(CombatEvent::MinionSpawned { master, minion });
        Some(minion)
    }

    fn report_minion_death(&mut self, master: Entity, minion: Entity) {
        self.reports.push((master, minion));
    }
}

impl NotificationSink for MockPorts {
    fn notify(&mut self, event: CombatEvent) {
        self.events.push(event);
    }
}

impl Ports for MockPorts {
    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.rng
    }
}

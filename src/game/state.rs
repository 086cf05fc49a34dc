//! Simulation host
//!
//! Owns the entity arena and drives every AI entity once per frame. The
//! acting entity is checked out of the arena for its update, so the ports it
//! is handed can freely mutate everything else.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::combat::CombatError;
use crate::data::DataManager;
use crate::ecs::systems::{self, Actor};
use crate::ecs::{AiState, Brain, Faction, Name, Position, Vec2, Velocity, Vitals};
use crate::entities::behavior::with_policy;
use crate::entities::bosses::{self, BossCore, BossKind};
use crate::entities::player::{self, Reach};
use crate::entities::{enemies, minions};
use crate::world::ports::{DamageSink, Movement, NotificationSink, Ports, SpawnService, WorldQuery};

use super::events::{CombatEvent, EventListener};

/// Mutable state shared by every port handed out during a tick
struct Context {
    /// Random number generator (seeded for reproducibility)
    rng: StdRng,
    /// External tuning data
    data: DataManager,
    /// Events raised since the last flush
    pending: Vec<CombatEvent>,
    /// Minion deaths waiting to be delivered to their masters
    minion_reports: VecDeque<(Entity, Entity)>,
}

/// The combat simulation
pub struct Simulation {
    world: World,
    ctx: Context,
    player: Option<Entity>,
    listeners: Vec<Box<dyn EventListener>>,
    /// Flushed events not yet drained by the caller
    outbox: Vec<CombatEvent>,
    tick_count: u64,
}

impl Simulation {
    /// Create a simulation seeded from the loaded configuration
    pub fn new(data: DataManager) -> Self {
        let seed = data.config.seed;
        Self {
            world: World::new(),
            ctx: Context {
                rng: StdRng::seed_from_u64(seed),
                data,
                pending: Vec::new(),
                minion_reports: VecDeque::new(),
            },
            player: None,
            listeners: Vec::new(),
            outbox: Vec::new(),
            tick_count: 0,
        }
    }

    /// Replace the random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.ctx.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn data(&self) -> &DataManager {
        &self.ctx.data
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get the player entity
    pub fn player(&self) -> Option<Entity> {
        self.player.filter(|&player| self.world.contains(player))
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Register a listener for flushed events
    pub fn subscribe(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Take every event flushed since the last call
    pub fn drain_events(&mut self) -> Vec<CombatEvent> {
        std::mem::take(&mut self.outbox)
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    /// Spawn the player. Any previous player entity is removed.
    pub fn spawn_player(&mut self, pos: Vec2) -> Entity {
        if let Some(old) = self.player.take() {
            log::warn!("Replacing existing player #{}", old.id());
            let _ = self.world.despawn(old);
        }
        let entity = player::spawn_player(&mut self.world, &self.ctx.data.config.player, pos);
        self.player = Some(entity);
        entity
    }

    /// Spawn a regular enemy by template id
    pub fn spawn_enemy(&mut self, id: &str, pos: Vec2) -> Result<Entity, CombatError> {
        let template = self
            .ctx
            .data
            .enemies
            .find(id)
            .ok_or_else(|| CombatError::UnknownTemplate(id.to_string()))?;
        Ok(enemies::spawn_enemy(&mut self.world, template, &self.ctx.data.config, pos))
    }

    /// Spawn a boss and run its spawn hook
    pub fn spawn_boss(&mut self, kind: BossKind, pos: Vec2) -> Entity {
        let entity = bosses::spawn_boss(
            &mut self.world,
            kind,
            &self.ctx.data.bosses,
            &self.ctx.data.config,
            pos,
        );

        if let Some(mut actor) = checkout(&mut self.world, entity) {
            let mut ports =
                WorldPorts::new(&mut self.world, &mut self.ctx, self.player, vec![entity]);
            with_policy(&mut actor, &mut ports, |policy, actor, ports| {
                policy.on_spawn(actor, ports)
            });
            checkin(&mut self.world, actor);
        }
        self.settle();
        entity
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        self.tick_count += 1;

        let actors: Vec<Entity> = self
            .world
            .query::<&Brain>()
            .iter()
            .map(|(entity, _)| entity)
            .collect();
        for entity in actors {
            let Some(mut actor) = checkout(&mut self.world, entity) else {
                continue;
            };
            let mut ports =
                WorldPorts::new(&mut self.world, &mut self.ctx, self.player, vec![entity]);
            systems::update_actor(&mut actor, &mut ports, dt);
            checkin(&mut self.world, actor);
            self.deliver_minion_reports();
        }

        for (_, (pos, vel)) in self.world.query_mut::<(&mut Position, &Velocity)>() {
            pos.0 += vel.0 * dt;
        }

        self.despawn_finished();
        self.flush_events();
    }

    fn despawn_finished(&mut self) {
        let finished: Vec<Entity> = self
            .world
            .query::<&Brain>()
            .iter()
            .filter(|(_, brain)| brain.ready_to_despawn())
            .map(|(entity, _)| entity)
            .collect();

        for entity in finished {
            if self.world.despawn(entity).is_ok() {
                log::debug!("Despawned #{}", entity.id());
                self.ctx.pending.push(CombatEvent::Despawned { entity });
            }
        }
    }

    /// Hand queued minion deaths to their masters
    fn deliver_minion_reports(&mut self) {
        while let Some((master, minion)) = self.ctx.minion_reports.pop_front() {
            self.ctx.pending.push(CombatEvent::MinionDied { master, minion });
            let Some(mut actor) = checkout(&mut self.world, master) else {
                continue;
            };
            let mut ports =
                WorldPorts::new(&mut self.world, &mut self.ctx, self.player, vec![master]);
            with_policy(&mut actor, &mut ports, |policy, actor, ports| {
                policy.on_minion_death(actor, ports, minion)
            });
            checkin(&mut self.world, actor);
        }
    }

    fn flush_events(&mut self) {
        for event in std::mem::take(&mut self.ctx.pending) {
            log::debug!("[{}] {}", event.name(), event);
            for listener in &mut self.listeners {
                listener.on_event(&event);
            }
            self.outbox.push(event);
        }
    }

    /// Finish an out-of-tick mutation
    fn settle(&mut self) {
        self.deliver_minion_reports();
        self.flush_events();
    }

    // ========================================================================
    // External mutators
    // ========================================================================

    /// Apply damage from outside the AI core (player abilities, traps, tests).
    /// Returns the damage actually applied.
    pub fn damage_entity(&mut self, entity: Entity, amount: i32) -> Result<i32, CombatError> {
        let applied = self.damage_from(None, entity, amount)?;
        self.settle();
        Ok(applied)
    }

    fn damage_from(
        &mut self,
        source: Option<Entity>,
        entity: Entity,
        amount: i32,
    ) -> Result<i32, CombatError> {
        if amount < 0 {
            return Err(CombatError::NegativeAmount(amount));
        }
        if !self.world.contains(entity) {
            return Err(CombatError::UnknownEntity(entity));
        }

        if let Some(mut actor) = checkout(&mut self.world, entity) {
            let mut ports =
                WorldPorts::new(&mut self.world, &mut self.ctx, self.player, vec![entity]);
            let result = systems::receive_damage(&mut actor, &mut ports, source, amount);
            checkin(&mut self.world, actor);
            return result;
        }

        let mut ports = WorldPorts::new(&mut self.world, &mut self.ctx, self.player, Vec::new());
        ports.damage_plain(source, entity, amount)
    }

    /// Heal an entity. Returns the health actually restored.
    pub fn heal_entity(&mut self, entity: Entity, amount: i32) -> Result<i32, CombatError> {
        let healed = {
            let mut vitals = self.world.get::<&mut Vitals>(entity).map_err(|_| {
                if self.world.contains(entity) {
                    CombatError::NotCombatant(entity)
                } else {
                    CombatError::UnknownEntity(entity)
                }
            })?;
            vitals.heal(amount)?
        };
        if healed > 0 {
            self.ctx.pending.push(CombatEvent::Healed { entity, amount: healed });
        }
        self.flush_events();
        Ok(healed)
    }

    /// Player swings at every living enemy within reach. Returns total damage dealt.
    pub fn player_attack(&mut self) -> i32 {
        let Some(player) = self.player() else {
            return 0;
        };
        let (origin, reach, attacker) = {
            let Ok(vitals) = self.world.get::<&Vitals>(player) else {
                return 0;
            };
            if !vitals.is_alive() {
                return 0;
            }
            let origin = self.position(player).unwrap_or_default();
            let reach = self.world.get::<&Reach>(player).map(|r| r.0).unwrap_or(0.0);
            (origin, reach, (*vitals).clone())
        };

        let targets: Vec<Entity> = self
            .world
            .query::<(&Position, &Faction, &Vitals)>()
            .iter()
            .filter(|(_, (pos, faction, vitals))| {
                **faction == Faction::Enemy && vitals.is_alive() && pos.0.distance(origin) <= reach
            })
            .map(|(entity, _)| entity)
            .collect();

        let mut total = 0;
        for target in targets {
            let damage = attacker.calculate_attack_damage(&mut self.ctx.rng);
            match self.damage_from(Some(player), target, damage) {
                Ok(applied) => total += applied,
                Err(e) => log::warn!("Player attack on #{} failed: {}", target.id(), e),
            }
        }
        self.settle();
        total
    }

    /// Teleport the player
    pub fn move_player(&mut self, pos: Vec2) {
        if let Some(player) = self.player() {
            if let Ok(mut p) = self.world.get::<&mut Position>(player) {
                p.0 = pos;
            }
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn vitals(&self, entity: Entity) -> Option<Vitals> {
        self.world.get::<&Vitals>(entity).ok().map(|v| (*v).clone())
    }

    pub fn state(&self, entity: Entity) -> Option<AiState> {
        self.world.get::<&Brain>(entity).ok().map(|b| b.state)
    }

    pub fn boss(&self, entity: Entity) -> Option<BossCore> {
        self.world.get::<&Brain>(entity).ok().and_then(|b| b.boss.clone())
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<&Position>(entity).ok().map(|p| p.0)
    }

    pub fn name(&self, entity: Entity) -> Option<String> {
        self.world.get::<&Name>(entity).ok().map(|n| n.0.clone())
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.world.get::<&Vitals>(entity).is_ok_and(|v| v.is_alive())
    }

    /// Living minions bound to `master`
    pub fn minions_of(&self, master: Entity) -> Vec<Entity> {
        self.world
            .query::<(&Brain, &Vitals)>()
            .iter()
            .filter(|(_, (brain, vitals))| {
                vitals.is_alive() && brain.bond.is_some_and(|bond| bond.master == master)
            })
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Every entity that carries an AI brain
    pub fn ai_entities(&self) -> Vec<Entity> {
        self.world.query::<&Brain>().iter().map(|(entity, _)| entity).collect()
    }
}

/// Take an AI entity's vitals and brain out of the arena
fn checkout(world: &mut World, entity: Entity) -> Option<Actor> {
    let (vitals, brain) = world.remove::<(Vitals, Brain)>(entity).ok()?;
    let position = world.get::<&Position>(entity).map(|p| p.0).unwrap_or_default();
    let name = world
        .get::<&Name>(entity)
        .map(|n| n.0.clone())
        .unwrap_or_else(|_| format!("#{}", entity.id()));
    Some(Actor::new(entity, name, position, vitals, brain))
}

/// Return a checked-out actor to the arena
fn checkin(world: &mut World, actor: Actor) {
    if let Ok(mut pos) = world.get::<&mut Position>(actor.entity) {
        pos.0 = actor.position;
    }
    if world.insert(actor.entity, (actor.vitals, actor.brain)).is_err() {
        log::warn!("{} vanished while checked out", actor.name);
    }
}

/// `Ports` over the simulation arena
struct WorldPorts<'a> {
    world: &'a mut World,
    ctx: &'a mut Context,
    player: Option<Entity>,
    /// Entities currently checked out, innermost last
    acting: Vec<Entity>,
}

impl<'a> WorldPorts<'a> {
    fn new(
        world: &'a mut World,
        ctx: &'a mut Context,
        player: Option<Entity>,
        acting: Vec<Entity>,
    ) -> Self {
        Self {
            world,
            ctx,
            player,
            acting,
        }
    }

    /// Damage an entity without an AI brain
    fn damage_plain(
        &mut self,
        source: Option<Entity>,
        target: Entity,
        amount: i32,
    ) -> Result<i32, CombatError> {
        let outcome = {
            let mut vitals = self
                .world
                .get::<&mut Vitals>(target)
                .map_err(|_| CombatError::NotCombatant(target))?;
            vitals.take_damage(amount)?
        };
        self.ctx.pending.push(CombatEvent::DamageDealt {
            source,
            target,
            amount: outcome.applied,
        });
        if outcome.killed {
            log::info!("#{} has fallen", target.id());
            self.ctx.pending.push(CombatEvent::Died { entity: target });
        }
        Ok(outcome.applied)
    }
}

impl WorldQuery for WorldPorts<'_> {
    fn find_player(&self) -> Option<Entity> {
        self.player.filter(|&player| self.world.contains(player))
    }

    fn is_valid(&self, entity: Entity) -> bool {
        self.world.contains(entity)
    }

    fn is_alive(&self, entity: Entity) -> bool {
        match self.world.get::<&Vitals>(entity) {
            Ok(vitals) => vitals.is_alive(),
            Err(_) => self.acting.contains(&entity) && self.world.contains(entity),
        }
    }

    fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<&Position>(entity).ok().map(|p| p.0)
    }

    fn health_fraction(&self, entity: Entity) -> Option<f32> {
        self.world.get::<&Vitals>(entity).ok().map(|v| v.health_fraction())
    }

    fn hostiles_within(&self, center: Vec2, radius: f32) -> Vec<(Entity, f32)> {
        self.world
            .query::<(&Position, &Faction, &Vitals)>()
            .iter()
            .filter(|(_, (_, faction, vitals))| **faction == Faction::Player && vitals.is_alive())
            .map(|(entity, (pos, _, _))| (entity, center.distance(pos.0)))
            .filter(|&(_, distance)| distance <= radius)
            .collect()
    }
}

impl Movement for WorldPorts<'_> {
    fn move_entity(&mut self, entity: Entity, velocity: Vec2) {
        if let Ok(mut vel) = self.world.get::<&mut Velocity>(entity) {
            vel.0 = velocity;
        }
    }

    fn place_entity(&mut self, entity: Entity, position: Vec2) {
        if let Ok(mut pos) = self.world.get::<&mut Position>(entity) {
            pos.0 = position;
        }
    }
}

impl DamageSink for WorldPorts<'_> {
    fn apply_damage_to_player(&mut self, source: Entity, amount: i32) -> i32 {
        let Some(player) = self.find_player() else {
            return 0;
        };
        match self.damage_plain(Some(source), player, amount) {
            Ok(applied) => applied,
            Err(e) => {
                log::warn!("Damage to player rejected: {}", e);
                0
            }
        }
    }

    fn apply_damage_to_entity(&mut self, source: Entity, target: Entity, amount: i32) -> i32 {
        if Some(target) == self.find_player() {
            return self.apply_damage_to_player(source, amount);
        }
        if self.acting.contains(&target) || !self.world.contains(target) {
            return 0;
        }

        let Some(mut actor) = checkout(&mut *self.world, target) else {
            return self.damage_plain(Some(source), target, amount).unwrap_or_else(|e| {
                log::warn!("Damage to #{} rejected: {}", target.id(), e);
                0
            });
        };

        let mut acting = self.acting.clone();
        acting.push(target);
        let mut nested = WorldPorts::new(&mut *self.world, &mut *self.ctx, self.player, acting);
        let applied = systems::receive_damage(&mut actor, &mut nested, Some(source), amount)
            .unwrap_or_else(|e| {
                log::warn!("Damage to {} rejected: {}", actor.name, e);
                0
            });
        checkin(&mut *self.world, actor);
        applied
    }
}

impl SpawnService for WorldPorts<'_> {
    fn spawn_minion(&mut self, master: Entity, offset: Vec2) -> Option<Entity> {
        let config = &self.ctx.data.config;
        let Some(template) = self.ctx.data.enemies.find(&config.minion_template) else {
            log::warn!("Minion template '{}' not found", config.minion_template);
            return None;
        };
        let origin = self.world.get::<&Position>(master).map(|p| p.0).unwrap_or_default();
        let minion =
            minions::spawn_minion(&mut *self.world, master, template, config, origin + offset);
        self.ctx.pending.push(CombatEvent::MinionSpawned { master, minion });
        Some(minion)
    }

    fn report_minion_death(&mut self, master: Entity, minion: Entity) {
        self.ctx.minion_reports.push_back((master, minion));
    }
}

impl NotificationSink for WorldPorts<'_> {
    fn notify(&mut self, event: CombatEvent) {
        self.ctx.pending.push(event);
    }
}

impl Ports for WorldPorts<'_> {
    fn rng(&mut self) -> &mut dyn RngCore {
        &mut self.ctx.rng
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SharedEventLog;

    fn sim() -> Simulation {
        let mut sim = Simulation::new(DataManager::default());
        sim.spawn_player(Vec2::ZERO);
        sim
    }

    #[test]
    fn test_unknown_template_rejected() {
        let mut sim = sim();
        let err = sim.spawn_enemy("dragon", Vec2::ZERO).unwrap_err();
        assert_eq!(err, CombatError::UnknownTemplate("dragon".to_string()));
    }

    #[test]
    fn test_enemy_detects_and_closes_in() {
        let mut sim = sim();
        let troll = sim.spawn_enemy("troll", Vec2::new(150.0, 0.0)).unwrap();

        sim.tick(0.1);
        assert_eq!(sim.state(troll), Some(AiState::Chase));
        sim.tick(0.1);
        let x = sim.position(troll).unwrap().x;
        assert!(x < 150.0, "troll should move toward the player, at {}", x);
    }

    #[test]
    fn test_troll_attacks_player() {
        let mut sim = sim();
        sim.spawn_enemy("troll", Vec2::new(30.0, 0.0)).unwrap();
        let player = sim.player().unwrap();

        // Idle -> Chase -> Attack -> strike
        for _ in 0..3 {
            sim.tick(0.016);
        }
        assert_eq!(sim.vitals(player).unwrap().current_health(), 92);
    }

    #[test]
    fn test_external_damage_errors() {
        let mut sim = sim();
        let troll = sim.spawn_enemy("troll", Vec2::new(500.0, 0.0)).unwrap();

        assert_eq!(sim.damage_entity(troll, -1), Err(CombatError::NegativeAmount(-1)));
        assert_eq!(sim.damage_entity(troll, 10), Ok(10));
        assert_eq!(sim.state(troll), Some(AiState::Chase));

        sim.tick(0.016);
        sim.tick(3.0);
        sim.damage_entity(troll, 100).unwrap();
        for _ in 0..3 {
            sim.tick(1.0);
        }
        assert_eq!(sim.damage_entity(troll, 5), Err(CombatError::UnknownEntity(troll)));
    }

    #[test]
    fn test_heal_entity() {
        let mut sim = sim();
        let player = sim.player().unwrap();
        sim.damage_entity(player, 30).unwrap();
        assert_eq!(sim.heal_entity(player, 50), Ok(30));
        assert_eq!(sim.heal_entity(player, -5), Err(CombatError::NegativeAmount(-5)));
    }

    #[test]
    fn test_player_attack_hits_only_in_reach() {
        let mut sim = sim();
        let near = sim.spawn_enemy("troll", Vec2::new(50.0, 0.0)).unwrap();
        let far = sim.spawn_enemy("troll", Vec2::new(400.0, 0.0)).unwrap();

        let dealt = sim.player_attack();
        // 10 base plus 1d6
        assert!((11..=16).contains(&dealt));
        assert_eq!(sim.vitals(near).unwrap().current_health(), 50 - dealt);
        assert_eq!(sim.vitals(far).unwrap().current_health(), 50);
    }

    #[test]
    fn test_listener_receives_flushed_events() {
        let mut sim = sim();
        let log = SharedEventLog::new();
        sim.subscribe(log.clone());
        sim.spawn_enemy("troll", Vec2::new(100.0, 0.0)).unwrap();

        sim.tick(0.016);
        let events = log.snapshot();
        assert!(events.iter().any(|e| e.name() == "state_changed"));
        assert_eq!(sim.drain_events().len(), events.len());
        assert!(sim.drain_events().is_empty());
    }

    #[test]
    fn test_necromancer_spawns_with_minions() {
        let mut sim = sim();
        let boss = sim.spawn_boss(BossKind::Necromancer, Vec2::new(1000.0, 0.0));
        let minions = sim.minions_of(boss);
        assert_eq!(minions.len(), 2);
        for minion in &minions {
            let at = sim.position(*minion).unwrap();
            assert!((at.x - 1000.0).abs() <= 100.0 && at.y.abs() <= 100.0);
        }
    }

    #[test]
    fn test_minion_death_is_reported_to_master() {
        let mut sim = sim();
        let boss = sim.spawn_boss(BossKind::Necromancer, Vec2::new(1000.0, 0.0));
        let minion = sim.minions_of(boss)[0];
        let attack_before = sim.vitals(boss).unwrap().attack_value;

        sim.damage_entity(minion, 100).unwrap();
        let events = sim.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::MinionDied { master, minion: m } if *master == boss && *m == minion
        )));
        assert_eq!(sim.vitals(boss).unwrap().attack_value, attack_before + 2);
        assert_eq!(sim.minions_of(boss).len(), 1);
    }

    #[test]
    fn test_dead_entities_despawn_after_delay() {
        let mut sim = sim();
        let troll = sim.spawn_enemy("troll", Vec2::new(900.0, 0.0)).unwrap();
        sim.damage_entity(troll, 50).unwrap();

        sim.tick(1.0);
        assert!(sim.world().contains(troll));
        sim.tick(1.0);
        sim.tick(0.1);
        assert!(!sim.world().contains(troll));
        assert!(sim.drain_events().iter().any(|e| e.name() == "despawned"));
    }
}

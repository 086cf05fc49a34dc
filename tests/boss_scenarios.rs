//! End-to-end combat scenarios driven through the public `Simulation` API

use noheroes::data::DataManager;
use noheroes::ecs::{AiState, Vec2};
use noheroes::game::{Ability, CombatEvent, SharedEventLog, Simulation};
use noheroes::BossKind;

const DT: f32 = 1.0 / 60.0;
const FAR_AWAY: Vec2 = Vec2 { x: 5000.0, y: 0.0 };

fn sim_with_player(pos: Vec2) -> Simulation {
    let mut sim = Simulation::new(DataManager::default()).with_seed(7);
    sim.spawn_player(pos);
    sim
}

fn count(events: &[CombatEvent], kind: &str) -> usize {
    events.iter().filter(|e| e.name() == kind).count()
}

fn health(sim: &Simulation, entity: hecs::Entity) -> i32 {
    sim.vitals(entity).map(|v| v.current_health()).unwrap_or(0)
}

#[test]
fn tank_armor_escalates_through_the_fight() {
    let mut sim = sim_with_player(FAR_AWAY);
    let tank = sim.spawn_boss(BossKind::Tank, Vec2::ZERO);

    // 20% base reduction
    assert_eq!(sim.damage_entity(tank, 188).unwrap(), 150);
    assert_eq!(health(&sim, tank), 150);
    sim.tick(DT);
    assert_eq!(sim.boss(tank).unwrap().current_phase(), 2);

    // One armour stack from phase two: 25%
    sim.damage_entity(tank, 82).unwrap();
    assert_eq!(health(&sim, tank), 89);
    sim.tick(DT);
    assert!(sim.boss(tank).unwrap().is_enraged());

    // Enrage fills every stack: 45%
    sim.damage_entity(tank, 144).unwrap();
    assert_eq!(health(&sim, tank), 10);

    sim.damage_entity(tank, 1000).unwrap();
    assert!(!sim.is_alive(tank));
    let events = sim.drain_events();
    assert_eq!(count(&events, "died"), 1);
    assert_eq!(count(&events, "boss_defeated"), 1);

    // Further hits on a corpse are ignored silently
    assert_eq!(sim.damage_entity(tank, 50).unwrap(), 0);
    assert!(sim.drain_events().is_empty());
}

#[test]
fn dead_bosses_despawn_after_the_delay() {
    let mut sim = sim_with_player(FAR_AWAY);
    let tank = sim.spawn_boss(BossKind::Tank, Vec2::ZERO);
    sim.damage_entity(tank, 10_000).unwrap();

    let delay = sim.data().config.despawn_delay;
    let ticks = (delay / DT).ceil() as usize + 2;
    for _ in 0..ticks {
        sim.tick(DT);
    }

    assert!(sim.vitals(tank).is_none());
    assert!(sim.damage_entity(tank, 5).is_err());
    assert_eq!(count(&sim.drain_events(), "despawned"), 1);
}

#[test]
fn chase_uses_hysteresis_before_giving_up() {
    let mut sim = sim_with_player(Vec2::new(150.0, 0.0));
    let troll = sim.spawn_enemy("troll", Vec2::ZERO).unwrap();

    sim.tick(DT);
    assert_eq!(sim.state(troll), Some(AiState::Chase));

    // Outside detection (200) but inside the 1.5x leash (300)
    sim.move_player(Vec2::new(250.0, 0.0));
    sim.tick(DT);
    assert_eq!(sim.state(troll), Some(AiState::Chase));

    sim.move_player(Vec2::new(400.0, 0.0));
    sim.tick(DT);
    assert_eq!(sim.state(troll), Some(AiState::Idle));
}

#[test]
fn damage_pulls_idle_enemies_into_chase() {
    let mut sim = sim_with_player(FAR_AWAY);
    let troll = sim.spawn_enemy("troll", Vec2::ZERO).unwrap();
    assert_eq!(sim.state(troll), Some(AiState::Idle));

    sim.damage_entity(troll, 5).unwrap();
    assert_eq!(sim.state(troll), Some(AiState::Chase));
    let events = sim.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        CombatEvent::StateChanged { from: AiState::Idle, to: AiState::Chase, .. }
    )));
}

#[test]
fn necromancer_shield_shrinks_as_minions_fall() {
    let mut sim = sim_with_player(FAR_AWAY);
    let necro = sim.spawn_boss(BossKind::Necromancer, Vec2::ZERO);
    let minions = sim.minions_of(necro);
    assert_eq!(minions.len(), 2);

    // Two minions: 10%
    assert_eq!(sim.damage_entity(necro, 20).unwrap(), 18);

    sim.damage_entity(minions[0], 1000).unwrap();
    assert_eq!(count(&sim.drain_events(), "minion_died"), 1);

    // One minion left: 5%
    assert_eq!(sim.damage_entity(necro, 20).unwrap(), 19);
}

#[test]
fn minions_die_with_their_master() {
    let mut sim = sim_with_player(FAR_AWAY);
    let necro = sim.spawn_boss(BossKind::Necromancer, Vec2::ZERO);
    let minions = sim.minions_of(necro);
    assert!(!minions.is_empty());

    sim.damage_entity(necro, 10_000).unwrap();
    assert!(!sim.is_alive(necro));
    sim.tick(DT);

    for minion in minions {
        assert!(!sim.is_alive(minion));
        assert_eq!(sim.state(minion), Some(AiState::Dead));
    }
}

#[test]
fn ground_pound_hits_a_player_in_melee() {
    let mut sim = sim_with_player(Vec2::new(50.0, 0.0));
    let tank = sim.spawn_boss(BossKind::Tank, Vec2::ZERO);
    let player = sim.player().unwrap();
    let log = SharedEventLog::new();
    sim.subscribe(log.clone());

    // Idle -> Chase -> Attack, then the swing and the pound
    for _ in 0..3 {
        sim.tick(DT);
    }

    let pounded = log.snapshot().iter().any(|e| {
        matches!(
            e,
            CombatEvent::AbilityUsed { entity, ability: Ability::GroundPound } if *entity == tank
        )
    });
    assert!(pounded);

    // Basic swing of 25 plus a pound reduced by distance falloff
    let remaining = health(&sim, player);
    assert!(remaining < 75, "pound should land on top of the swing, health {}", remaining);
    assert!(remaining >= 50, "pound never exceeds its base damage, health {}", remaining);
}

#[test]
fn player_swing_stays_within_dice_bounds() {
    for seed in 0..50 {
        let mut sim = Simulation::new(DataManager::default()).with_seed(seed);
        sim.spawn_player(Vec2::ZERO);
        sim.spawn_enemy("troll", Vec2::new(30.0, 0.0)).unwrap();

        // attack 10 plus 1d6
        let dealt = sim.player_attack();
        assert!((11..=16).contains(&dealt), "seed {} dealt {}", seed, dealt);
    }
}

#[test]
fn phases_never_regress_after_healing() {
    let mut sim = sim_with_player(FAR_AWAY);
    let reaver = sim.spawn_boss(BossKind::Berserker, Vec2::ZERO);

    sim.damage_entity(reaver, 120).unwrap();
    sim.tick(DT);
    assert_eq!(sim.boss(reaver).unwrap().current_phase(), 3);
    let phases: Vec<u32> = sim
        .drain_events()
        .iter()
        .filter_map(|e| match e {
            CombatEvent::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(phases, vec![2, 3]);

    sim.heal_entity(reaver, 500).unwrap();
    sim.tick(DT);
    assert_eq!(sim.boss(reaver).unwrap().current_phase(), 3);
    assert_eq!(count(&sim.drain_events(), "phase_changed"), 0);
}

#[test]
fn enrage_latches_once_even_after_recovery() {
    let mut sim = sim_with_player(FAR_AWAY);
    let reaver = sim.spawn_boss(BossKind::Berserker, Vec2::ZERO);

    sim.damage_entity(reaver, 165).unwrap();
    sim.tick(DT);
    assert!(sim.boss(reaver).unwrap().is_enraged());

    sim.heal_entity(reaver, 500).unwrap();
    sim.tick(DT);
    sim.damage_entity(reaver, 170).unwrap();
    sim.tick(DT);

    assert!(sim.boss(reaver).unwrap().is_enraged());
    assert_eq!(count(&sim.drain_events(), "enraged"), 1);
}

#[test]
fn unknown_enemy_template_is_rejected() {
    let mut sim = sim_with_player(FAR_AWAY);
    assert!(sim.spawn_enemy("dragon", Vec2::ZERO).is_err());
    assert!(sim.ai_entities().is_empty());
}

#[test]
fn extreme_hits_kill_bosses_without_overflow() {
    let mut sim = sim_with_player(FAR_AWAY);
    let tank = sim.spawn_boss(BossKind::Tank, Vec2::ZERO);
    assert_eq!(sim.damage_entity(tank, 100_000_000).unwrap(), 300);
    assert!(!sim.is_alive(tank));

    let lich = sim.spawn_boss(BossKind::Necromancer, Vec2::new(0.0, 500.0));
    assert_eq!(sim.damage_entity(lich, i32::MAX).unwrap(), 150);
    assert!(!sim.is_alive(lich));

    for kind in BossKind::ALL {
        let boss = sim.spawn_boss(kind, Vec2::new(-500.0, 0.0));
        // The speed boss may dodge a few
        for _ in 0..50 {
            if !sim.is_alive(boss) {
                break;
            }
            assert!(sim.damage_entity(boss, i32::MAX).is_ok(), "{}", kind);
        }
        assert!(!sim.is_alive(boss), "{} survived", kind);
    }
}

#[test]
fn wounded_goblin_runs_away() {
    let mut sim = sim_with_player(Vec2::new(100.0, 0.0));
    let goblin = sim.spawn_enemy("goblin", Vec2::ZERO).unwrap();

    // 9 / 30 health left
    sim.damage_entity(goblin, 21).unwrap();
    for _ in 0..10 {
        sim.tick(DT);
    }

    assert_eq!(sim.state(goblin), Some(AiState::Chase));
    assert!(sim.position(goblin).unwrap().x < 0.0);
    let fled = sim
        .drain_events()
        .iter()
        .filter(|e| matches!(e, CombatEvent::AbilityUsed { ability: Ability::Flee, .. }))
        .count();
    assert_eq!(fled, 1);
}

#[test]
fn raider_enrages_when_badly_hurt() {
    let mut sim = sim_with_player(FAR_AWAY);
    let raider = sim.spawn_enemy("raider", Vec2::ZERO).unwrap();

    sim.damage_entity(raider, 48).unwrap();
    sim.tick(DT);

    // Two hits of rage would have been 14; enrage resets to 12 * 1.5
    assert_eq!(sim.vitals(raider).unwrap().attack_value, 18);
    assert_eq!(count(&sim.drain_events(), "enraged"), 1);
}

#[test]
fn necromancer_raises_servants_while_idle() {
    let mut sim = sim_with_player(FAR_AWAY);
    let lich = sim.spawn_boss(BossKind::Necromancer, Vec2::ZERO);
    assert_eq!(sim.minions_of(lich).len(), 2);

    // Summon cooldown is 6 s
    let ticks = (6.0 / DT).ceil() as usize + 5;
    for _ in 0..ticks {
        sim.tick(DT);
    }

    assert_eq!(sim.state(lich), Some(AiState::Idle));
    assert_eq!(sim.minions_of(lich).len(), 3);
    assert_eq!(health(&sim, sim.player().unwrap()), 100);
}

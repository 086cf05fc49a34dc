//! No Heroes - headless arena demo
//!
//! Spawns a player, one boss and a pair of trolls, then runs the simulation
//! at a fixed frame rate and prints every combat event.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use directories::ProjectDirs;

use noheroes::data::DataManager;
use noheroes::ecs::Vec2;
use noheroes::game::{EventRecord, Simulation};
use noheroes::BossKind;

/// Fixed simulation rate
const TICKS_PER_SECOND: u32 = 60;
const FRAME_TIME: f32 = 1.0 / TICKS_PER_SECOND as f32;
/// Seconds between player swings
const PLAYER_SWING_INTERVAL: f32 = 0.5;
/// Distance the player keeps from the boss
const PLAYER_STANDOFF: f32 = 60.0;

/// Run a headless arena fight and print the combat log
#[derive(Parser, Debug)]
#[command(name = "noheroes")]
#[command(version)]
struct Cli {
    /// Directory holding the RON data files (defaults to the platform config dir)
    #[arg(long = "data", value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Seed for a reproducible fight
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of frames to simulate
    #[arg(long, default_value_t = 60 * TICKS_PER_SECOND as u64)]
    ticks: u64,

    /// Boss to fight: tank, speed, ranged, berserker or necromancer
    #[arg(long, default_value_t = BossKind::Tank)]
    boss: BossKind,

    /// Print events as JSON lines instead of log messages
    #[arg(long)]
    json: bool,
}

/// Directory holding the RON data files
fn data_dir(cli: &Cli) -> PathBuf {
    if let Some(dir) = &cli.data_dir {
        return dir.clone();
    }
    if let Some(proj_dirs) = ProjectDirs::from("com", "noheroes", "NoHeroes") {
        return proj_dirs.config_dir().to_path_buf();
    }
    PathBuf::from("data")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting No Heroes v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let dir = data_dir(&cli);
    log::info!("Loading data from {}", dir.display());

    let data = DataManager::load(&dir);
    let mut sim = Simulation::new(data);
    if let Some(seed) = cli.seed {
        sim = sim.with_seed(seed);
    }

    run_demo(&mut sim, &cli)
}

fn run_demo(sim: &mut Simulation, cli: &Cli) -> Result<()> {
    let player = sim.spawn_player(Vec2::new(0.0, 0.0));
    let boss = sim.spawn_boss(cli.boss, Vec2::new(300.0, 0.0));
    sim.spawn_enemy("troll", Vec2::new(150.0, 120.0))?;
    sim.spawn_enemy("troll", Vec2::new(150.0, -120.0))?;

    log::info!("Arena ready: player vs {} boss", cli.boss);

    let mut swing_timer = 0.0;
    for _ in 0..cli.ticks {
        if !sim.is_alive(player) || !sim.is_alive(boss) {
            break;
        }

        advance_player(sim, player, boss);
        swing_timer += FRAME_TIME;
        if swing_timer >= PLAYER_SWING_INTERVAL {
            swing_timer = 0.0;
            sim.player_attack();
        }

        sim.tick(FRAME_TIME);
        report(sim, cli.json)?;
    }

    let outcome = match (sim.is_alive(player), sim.is_alive(boss)) {
        (true, false) => "victory",
        (false, _) => "defeat",
        (true, true) => "time out",
    };
    log::info!("Demo finished after {} ticks: {}", sim.tick_count(), outcome);
    Ok(())
}

/// Walk the player toward the boss until within swing distance
fn advance_player(sim: &mut Simulation, player: hecs::Entity, boss: hecs::Entity) {
    let (Some(from), Some(to)) = (sim.position(player), sim.position(boss)) else {
        return;
    };
    let distance = from.distance(to);
    if distance <= PLAYER_STANDOFF {
        return;
    }
    let speed = sim.data().config.player.move_speed;
    let step = (speed * FRAME_TIME).min(distance - PLAYER_STANDOFF);
    sim.move_player(from + from.direction_to(to) * step);
}

fn report(sim: &mut Simulation, json: bool) -> Result<()> {
    let tick = sim.tick_count();
    for event in sim.drain_events() {
        if json {
            let record = EventRecord::new(tick, &event);
            println!("{}", serde_json::to_string(&record)?);
        } else {
            log::info!("[{:>5}] {}", tick, event);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["noheroes"]).unwrap();
        assert_eq!(cli.boss, BossKind::Tank);
        assert_eq!(cli.ticks, 3600);
        assert!(cli.seed.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "noheroes", "--boss", "Necromancer", "--seed", "9", "--ticks", "120", "--json",
            "--data", "arena",
        ])
        .unwrap();
        assert_eq!(cli.boss, BossKind::Necromancer);
        assert_eq!(cli.seed, Some(9));
        assert_eq!(cli.ticks, 120);
        assert!(cli.json);
        assert_eq!(data_dir(&cli), PathBuf::from("arena"));
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["noheroes", "--boss", "dragon"]).is_err());
        assert!(Cli::try_parse_from(["noheroes", "--ticks", "-5"]).is_err());
        assert!(Cli::try_parse_from(["noheroes", "--frobnicate"]).is_err());
    }
}

//! Frame update benchmark: a crowded arena with every boss archetype

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use noheroes::data::DataManager;
use noheroes::ecs::Vec2;
use noheroes::game::Simulation;
use noheroes::BossKind;

const DT: f32 = 1.0 / 60.0;

fn setup_arena(n: usize) -> Simulation {
    let mut sim = Simulation::new(DataManager::default()).with_seed(42);
    sim.spawn_player(Vec2::new(640.0, 360.0));
    for i in 0..n {
        let pos = Vec2::new((i as f32 * 1.7) % 1280.0, (i as f32 * 2.3) % 720.0);
        let id = if i % 3 == 0 { "goblin" } else { "troll" };
        let _ = sim.spawn_enemy(id, pos);
    }
    for (i, kind) in BossKind::ALL.into_iter().enumerate() {
        sim.spawn_boss(kind, Vec2::new(200.0 * i as f32, 100.0));
    }
    sim
}

fn bench_tick(c: &mut Criterion) {
    c.bench_function("tick_500_enemies", |b| {
        b.iter_batched(
            || setup_arena(500),
            |mut sim| {
                sim.tick(DT);
                sim
            },
            BatchSize::PerIteration,
        )
    });

    c.bench_function("tick_60_frames_100_enemies", |b| {
        b.iter_batched(
            || setup_arena(100),
            |mut sim| {
                for _ in 0..60 {
                    sim.tick(DT);
                }
                sim.drain_events();
                sim
            },
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_tick);
criterion_main!(benches);

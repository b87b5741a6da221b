use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hexbugs::core::config::SimulationConfig;
use hexbugs::simulation::{Simulation, SimulationState, StaticControl};
use hexbugs::world::food::SeasonalGrowth;
use std::time::Duration;

/// A grown population to start every batch from
fn grown_state(warmup_turns: u64) -> SimulationState {
    let mut config = SimulationConfig::default();
    config.seed = 0xBEEF;
    config.world.width = 96;
    config.world.height = 80;
    let mut sim = Simulation::fixed_schedule(config).expect("default config is valid");
    sim.run(warmup_turns).expect("warmup run");
    sim.state
}

fn bench_turns(c: &mut Criterion) {
    let mut group = c.benchmark_group("turn");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(8));

    let warmup: u64 = std::env::var("HEXBUGS_BENCH_WARMUP")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(400);
    let steps: u64 = std::env::var("HEXBUGS_BENCH_STEPS")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(16);

    let start = grown_state(warmup);
    let population = start.population.len();
    group.bench_function(format!("steps{}_agents{}", steps, population), |b| {
        b.iter_batched(
            || Simulation::new(start.clone(), SeasonalGrowth, StaticControl),
            |mut sim| {
                for _ in 0..steps {
                    sim.step().expect("turn");
                }
                sim.population()
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_turns);
criterion_main!(benches);

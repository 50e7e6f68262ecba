//! Single-trial throughput: plain hits and hits with venom stacks.
//!
//! Run with: `cargo bench --bench simulator`

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use nshot::combat::{
    simulate_once, simulate_once_with, ExpiringStacks, NoTrace, PeriodicParams, Rng, TrialParams,
};

fn venom() -> PeriodicParams {
    PeriodicParams {
        basic_attack: 80.0,
        success_rate: 0.6,
        duration_ms: 6000,
        max_stack: 3,
        tick_interval_ms: 1000,
        dmg_min: 220.0,
        dmg_max: 340.0,
    }
}

fn params(hit_points: u64, periodic: Option<PeriodicParams>) -> TrialParams {
    TrialParams {
        player_min: 1200,
        player_max: 1800,
        hit_points,
        weapon_defense: 300.0,
        multiplier: 1.0,
        hits: 6,
        latency_ms: 630,
        periodic,
    }
}

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");
    group.sample_size(100);
    group.throughput(Throughput::Elements(1));

    let plain = params(200_000, None);
    group.bench_function("trial_no_venom", |b| {
        b.iter_batched(
            || Rng::new(7),
            |mut rng| black_box(simulate_once(&plain, &mut rng)),
            BatchSize::SmallInput,
        );
    });

    let poisoned = params(200_000, Some(venom()));
    group.bench_function("trial_venom", |b| {
        b.iter_batched(
            || Rng::new(7),
            |mut rng| black_box(simulate_once(&poisoned, &mut rng)),
            BatchSize::SmallInput,
        );
    });

    // buffer reuse as done inside a batch
    group.bench_function("trial_venom_reused_stacks", |b| {
        let mut stacks = ExpiringStacks::new(3);
        let mut index = 0u64;
        b.iter(|| {
            index += 1;
            let mut rng = Rng::for_trial(7, index);
            black_box(simulate_once_with(&poisoned, &mut rng, &mut stacks, &mut NoTrace))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_simulator);
criterion_main!(benches);

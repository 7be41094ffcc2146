use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fastrand::Rng;
use quadtree_gravity::{SimConfig, Simulation, utils};

fn setup_sim(n: usize, use_barnes_hut: bool, theta: f32) -> Simulation {
    let config = SimConfig {
        theta,
        use_barnes_hut,
        ..SimConfig::default()
    };
    let mut rng = Rng::with_seed(0);
    let bodies = utils::uniform_disc(&mut rng, n, &config, 1.0);
    Simulation::with_bodies(config, bodies)
}

fn bench_force_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("step");
    group.sample_size(20);

    for n in [250, 1000, 2000] {
        group.throughput(Throughput::Elements(n as u64));

        let mut sim = setup_sim(n, true, 1.0);
        sim.step();
        group.bench_with_input(BenchmarkId::new("barnes_hut", n), &n, |b, _| {
            b.iter(|| sim.step());
        });

        let mut sim = setup_sim(n, false, 1.0);
        sim.step();
        group.bench_with_input(BenchmarkId::new("pairwise", n), &n, |b, _| {
            b.iter(|| sim.step());
        });
    }

    group.finish();
}

fn bench_theta(c: &mut Criterion) {
    let mut group = c.benchmark_group("theta");
    group.sample_size(20);

    for theta in [0.0, 0.5, 1.0, 1.9] {
        let mut sim = setup_sim(1000, true, theta);
        sim.step();
        group.bench_with_input(BenchmarkId::from_parameter(theta), &theta, |b, _| {
            b.iter(|| sim.step());
        });
    }

    group.finish();
}

fn bench_rebuild(c: &mut Criterion) {
    let mut sim = setup_sim(2000, true, 1.0);
    c.bench_function("rebuild_index_2000", |b| b.iter(|| sim.rebuild_index()));
}

criterion_group!(benches, bench_force_modes, bench_theta, bench_rebuild);
criterion_main!(benches);

//! Benchmarks for the generation-stepping engine.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use demesim::demography;
use demesim::evolution::IntroductionEntry;
use demesim::simulation::SimulationBuilder;

const TWO_DEME_MODEL: &str = "
demes:
  - name: mainland
    epochs:
      - start_size: 1000
  - name: island
    ancestors: [mainland]
    start_time: 80
    epochs:
      - start_size: 250
migrations:
  - {source: mainland, dest: island, rate: 0.01}
pulses:
  - {source: island, dest: mainland, proportion: 0.05, time: 30}
";

fn builder(population_scale: f64) -> SimulationBuilder {
    let model = TWO_DEME_MODEL
        .replace("1000", &format!("{}", (1000.0 * population_scale) as usize))
        .replace("250", &format!("{}", (250.0 * population_scale) as usize));
    SimulationBuilder::new()
        .graph(demography::load_str(&model).unwrap())
        .alleles(["wt", "m1", "late"])
        .wild_type("wt")
        .mutation_rate(0.001)
        .selection("m1", 0.01)
        .introduction(IntroductionEntry::new("late", "island", 40.0))
        .seed(42)
}

fn bench_full_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_run");
    for scale in [1.0, 4.0] {
        group.bench_with_input(
            BenchmarkId::new("two_deme", (1000.0 * scale) as usize),
            &scale,
            |b, &scale| {
                b.iter(|| {
                    let mut sim = builder(scale).build().unwrap();
                    black_box(sim.run());
                });
            },
        );
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_simulation", |b| {
        b.iter(|| black_box(builder(1.0).build().unwrap()));
    });
}

criterion_group!(benches, bench_full_run, bench_build);
criterion_main!(benches);

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use light_hst::anomaly::{HalfSpaceTree, HalfSpaceTreeConfig};
use light_hst::common::Observation;
use rand::prelude::*;

fn features() -> Vec<String> {
    (1..=30).map(|i| format!("V{}", i)).collect()
}

fn observations(n: usize, seed: u64) -> Vec<Observation<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let features = features();
    (0..n)
        .map(|_| features.iter().map(|f| (f.clone(), rng.gen::<f32>())).collect())
        .collect()
}

fn detector(n_trees: u32, height: u32, window_size: u32) -> HalfSpaceTree<f32> {
    HalfSpaceTree::new(HalfSpaceTreeConfig::new(n_trees, height, window_size).with_seed(42))
        .expect("valid configuration")
}

fn creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("creation");
    let first = observations(1, 0).remove(0);

    for height in [2, 6, 10, 14].iter() {
        for n_trees in [3, 30, 300].iter() {
            let input = (*height, *n_trees);
            let throughput = (2u64.pow(*height + 1) - 1) * *n_trees as u64;
            group.throughput(Throughput::Elements(throughput));
            group.bench_with_input(
                format!("height={}-n_trees={}", height, n_trees),
                &input,
                |b, &input| {
                    // Trees are grown on the first learn.
                    b.iter_batched(
                        || detector(input.1, input.0, 1000),
                        |mut hst| {
                            hst.learn(&first);
                            hst
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }
    group.finish();
}

fn learn_and_score(c: &mut Criterion) {
    let mut group = c.benchmark_group("stream");
    let data = observations(2000, 1);
    group.throughput(Throughput::Elements(data.len() as u64));

    for height in [6, 10].iter() {
        let name = format!("learn-height={}", height);
        group.bench_function(name, |b| {
            b.iter_batched(
                || detector(50, *height, 250),
                |mut hst| {
                    for x in data.iter() {
                        hst.learn(x);
                    }
                    hst
                },
                BatchSize::LargeInput,
            );
        });

        let mut trained = detector(50, *height, 250);
        for x in data.iter() {
            trained.learn(x);
        }
        let name = format!("score-height={}", height);
        group.bench_function(name, |b| {
            b.iter(|| data.iter().map(|x| trained.score(x)).sum::<f32>());
        });
    }
    group.finish();
}

criterion_group!(benches, creation, learn_and_score);
criterion_main!(benches);

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::StdRng;

use vectorized_mlp::{Activation, Dataset, Matrix, MlpBuilder};

fn matmul_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let a = Matrix::random(128, 256, &mut rng);
    let b = Matrix::random(256, 64, &mut rng);

    c.bench_function("matmul_128x256_256x64", |bench| {
        bench.iter(|| {
            let out = black_box(&a).matmul(black_box(&b)).unwrap();
            black_box(out);
        })
    });
}

fn predict_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mlp = MlpBuilder::new(&[32, 64, 64, 4])
        .unwrap()
        .activation(Activation::HyperbolicTangent)
        .build_with_seed(0)
        .unwrap();
    let inputs = Matrix::random(256, 32, &mut rng);

    c.bench_function("predict_256x32_32_64_64_4", |bench| {
        bench.iter(|| {
            let out = mlp.predict(black_box(&inputs)).unwrap();
            black_box(out);
        })
    });
}

fn step_bench(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut mlp = MlpBuilder::new(&[32, 64, 64, 4])
        .unwrap()
        .build_with_seed(0)
        .unwrap();
    let data = Dataset::new(
        Matrix::random(256, 32, &mut rng),
        Matrix::random(256, 4, &mut rng),
    )
    .unwrap();

    c.bench_function("step_256x32_32_64_64_4", |bench| {
        bench.iter(|| {
            let loss = mlp.step(black_box(&data), 0.01).unwrap();
            black_box(loss);
        })
    });

    let mut xor = MlpBuilder::new(&[2, 2, 1]).unwrap().build_with_seed(1).unwrap();
    let train = Dataset::xor();
    c.bench_function("step_xor_2_2_1", |bench| {
        bench.iter(|| {
            let loss = xor.step(black_box(&train), 0.1).unwrap();
            black_box(loss);
        })
    });
}

criterion_group!(benches, matmul_bench, predict_bench, step_bench);
criterion_main!(benches);

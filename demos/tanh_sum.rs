use rand::SeedableRng;
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;

use vectorized_mlp::{Activation, Dataset, FitConfig, Matrix, MlpBuilder};

fn sample(n: usize, rng: &mut StdRng) -> vectorized_mlp::Result<Dataset> {
    let dist = Uniform::new(-1.0_f64, 1.0_f64);
    let mut xs = Vec::with_capacity(2 * n);
    let mut ys = Vec::with_capacity(n);
    for _ in 0..n {
        let x0 = dist.sample(rng);
        let x1 = dist.sample(rng);
        xs.extend_from_slice(&[x0, x1]);
        ys.push((x0 + x1).tanh());
    }
    Dataset::new(Matrix::from_flat(n, 2, xs)?, Matrix::from_flat(n, 1, ys)?)
}

fn main() -> vectorized_mlp::Result<()> {
    env_logger::init();

    // y = tanh(x0 + x1) is a single layer: one weight per input plus a bias row.
    let mut rng = StdRng::seed_from_u64(1);
    let train = sample(256, &mut rng)?;
    let test = sample(64, &mut rng)?;

    let mut mlp = MlpBuilder::new(&[2, 1])?
        .activation(Activation::HyperbolicTangent)
        .build_with_seed(0)?;

    let report = mlp.fit(
        &train,
        FitConfig {
            iterations: 500,
            learning_rate: 0.01,
        },
    )?;

    let test_loss = mlp.evaluate(&test)?;
    println!(
        "train_loss={:.4} test_loss={:.4} weights={:.3}",
        report.final_loss,
        test_loss,
        mlp.weights()[0]
    );
    Ok(())
}

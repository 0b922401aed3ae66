use vectorized_mlp::{Activation, Dataset, FitConfig, MlpBuilder};

fn main() -> vectorized_mlp::Result<()> {
    env_logger::init();

    // Inputs (1,0), (0,0), (0,1), (1,1) with targets 1, 0, 1, 0.
    let train = Dataset::xor();

    // ReLU forward with a sigmoid derivative keeps hidden units from dying.
    let mut mlp = MlpBuilder::new(&[2, 4, 1])?
        .activation(Activation::ReLUSigmoid)
        .build_with_seed(0)?;

    let report = mlp.fit_with(
        &train,
        FitConfig {
            iterations: 5_000,
            learning_rate: 0.05,
        },
        |p| {
            if p.iteration % 1_000 == 0 {
                println!("iteration={} loss={:.4}", p.iteration, p.loss);
            }
        },
    )?;

    let output = mlp.predict(train.inputs())?;
    println!("final_loss={:.4}", report.final_loss);
    let inputs = train.inputs();
    for i in 0..train.len() {
        println!(
            "x=({}, {}) y={:.3}",
            inputs[(i, 0)],
            inputs[(i, 1)],
            output[(i, 0)]
        );
    }

    Ok(())
}

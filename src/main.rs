use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use vectorized_mlp::{Activation, Dataset, FitConfig, MlpBuilder, Result};

/// Train a 2-2-1 network on XOR and print its output.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Activation: sigmoid, tanh, elu, relu, relu-sigmoid, gaussian, sine or atan
    #[arg(default_value = "sigmoid")]
    activation: Activation,

    /// Number of full-batch iterations
    #[arg(long, default_value_t = 10_000)]
    iterations: usize,

    /// Gradient descent step size
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Do not inject the constant-1 bias column
    #[arg(long)]
    no_bias: bool,

    /// Seed for the initial weights
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl Args {
    fn fit_config(&self) -> FitConfig {
        FitConfig {
            iterations: self.iterations,
            learning_rate: self.learning_rate,
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let train = Dataset::xor();
    let mut mlp = MlpBuilder::new(&[2, 2, 1])?
        .activation(args.activation)
        .bias(!args.no_bias)
        .build_with_seed(args.seed)?;

    info!(
        "training xor: activation={} iterations={} lr={} bias={}",
        args.activation, args.iterations, args.learning_rate, !args.no_bias
    );
    let report = mlp.fit(&train, args.fit_config())?;
    let output = mlp.predict(train.inputs())?;

    println!("input:\n{}", train.inputs());
    println!("output:\n{output}");
    println!("loss: {:.4}", report.final_loss);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_train_sigmoid_with_bias() {
        let args = Args::try_parse_from(["vectorized-mlp"]).unwrap();
        assert_eq!(args.activation, Activation::Sigmoid);
        assert!(!args.no_bias);
        assert_eq!(args.fit_config(), FitConfig::default());
    }

    #[test]
    fn flags_are_accepted_in_any_order() {
        let args =
            Args::try_parse_from(["vectorized-mlp", "--iterations", "5", "relu", "--no-bias"])
                .unwrap();
        assert_eq!(args.activation, Activation::ReLU);
        assert_eq!(args.iterations, 5);
        assert!(args.no_bias);

        let args = Args::try_parse_from([
            "vectorized-mlp",
            "tanh",
            "--learning-rate",
            "0.05",
            "--iterations",
            "200",
        ])
        .unwrap();
        assert_eq!(args.activation, Activation::HyperbolicTangent);
        assert_eq!(args.fit_config().iterations, 200);
        assert_eq!(args.fit_config().learning_rate, 0.05);
    }

    #[test]
    fn rejects_unknown_activation_and_bad_numbers() {
        assert!(Args::try_parse_from(["vectorized-mlp", "500"]).is_err());
        assert!(Args::try_parse_from(["vectorized-mlp", "--iterations", "many"]).is_err());
    }

    #[test]
    fn short_run_succeeds() {
        let args = Args::try_parse_from(["vectorized-mlp", "atan", "--iterations", "10"]).unwrap();
        assert!(run(&args).is_ok());
    }
}

use log::info;

use crate::loss::scaled_loss;
use crate::{Dataset, Error, Matrix, Mlp, Result};

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
    /// Number of full-batch iterations; training always runs all of them.
    pub iterations: usize,
    pub learning_rate: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            iterations: 10_000,
            learning_rate: 0.1,
        }
    }
}

impl FitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(Error::InvalidConfig("iterations must be > 0".to_owned()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::InvalidConfig(
                "learning_rate must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub iterations: usize,
    /// Loss of the last iteration, `mean(|output - target|) * len`.
    pub final_loss: f64,
}

/// Snapshot handed to the progress callback of [`Mlp::fit_with`].
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based iteration number.
    pub iteration: usize,
    pub loss: f64,
    pub inputs: &'a Matrix,
    pub output: &'a Matrix,
}

/// Progress schedule for a 0-based iteration index: the first 10 iterations, then
/// every 100th up to 1000, every 1000th up to 10000, and every 10000th after that.
pub fn should_report(iteration: usize) -> bool {
    let n = iteration + 1;
    iteration < 10
        || (n % 100 == 0 && iteration < 1_000)
        || (n % 1_000 == 0 && iteration < 10_000)
        || n % 10_000 == 0
}

impl Mlp {
    /// Train on `train` with full-batch gradient descent for exactly `cfg.iterations`
    /// iterations. Progress (loss, inputs and outputs) is logged at `info` level on the
    /// [`should_report`] schedule.
    pub fn fit(&mut self, train: &Dataset, cfg: FitConfig) -> Result<FitReport> {
        self.fit_with(train, cfg, |_| {})
    }

    /// Like [`Mlp::fit`], also calling `on_progress` on every scheduled iteration.
    pub fn fit_with<F>(
        &mut self,
        train: &Dataset,
        cfg: FitConfig,
        mut on_progress: F,
    ) -> Result<FitReport>
    where
        F: FnMut(&Progress<'_>),
    {
        self.check_dataset(train)?;
        cfg.validate()?;

        let mut loss = f64::NAN;
        for iteration in 0..cfg.iterations {
            let (iteration_loss, output) = self.iterate(train, cfg.learning_rate)?;
            loss = iteration_loss;

            if should_report(iteration) {
                let progress = Progress {
                    iteration: iteration + 1,
                    loss,
                    inputs: train.inputs(),
                    output,
                };
                info!(
                    "iteration {} loss {:.6}\ninput: {}\noutput: {}",
                    progress.iteration, progress.loss, progress.inputs, progress.output
                );
                on_progress(&progress);
            }
        }

        Ok(FitReport {
            iterations: cfg.iterations,
            final_loss: loss,
        })
    }

    /// Loss of the current weights on `data`, without updating anything.
    pub fn evaluate(&self, data: &Dataset) -> Result<f64> {
        self.check_dataset(data)?;
        let output = self.predict(data.inputs())?;
        let error = output.checked_sub(data.targets())?;
        Ok(scaled_loss(&error, data.len()))
    }

    fn check_dataset(&self, data: &Dataset) -> Result<()> {
        if data.is_empty() {
            return Err(Error::InvalidData("dataset must not be empty".to_owned()));
        }
        if data.input_dim() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "dataset input_dim {} does not match model input_dim {}",
                data.input_dim(),
                self.input_dim()
            )));
        }
        if data.target_dim() != self.output_dim() {
            return Err(Error::InvalidData(format!(
                "dataset target_dim {} does not match model output_dim {}",
                data.target_dim(),
                self.output_dim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MlpBuilder;

    fn mlp() -> Mlp {
        MlpBuilder::new(&[2, 2, 1]).unwrap().build_with_seed(1).unwrap()
    }

    #[test]
    fn report_schedule() {
        let reported: Vec<usize> = (0..30_000).filter(|&i| should_report(i)).collect();
        assert_eq!(&reported[..10], &(0..10).collect::<Vec<_>>()[..]);
        assert_eq!(reported[10], 99);
        assert!(reported.contains(&999));
        assert!(!reported.contains(&1_099));
        assert!(reported.contains(&1_999));
        assert!(!reported.contains(&10_999));
        assert_eq!(&reported[reported.len() - 2..], &[19_999_usize, 29_999][..]);
    }

    #[test]
    fn fit_validates_config_and_data() {
        let data = Dataset::xor();
        let mut m = mlp();
        let zero_iters = FitConfig {
            iterations: 0,
            ..FitConfig::default()
        };
        assert!(matches!(m.fit(&data, zero_iters), Err(Error::InvalidConfig(_))));

        let bad_lr = FitConfig {
            learning_rate: f64::NAN,
            ..FitConfig::default()
        };
        assert!(matches!(m.fit(&data, bad_lr), Err(Error::InvalidConfig(_))));

        let wide = Dataset::new(Matrix::ones(4, 3), Matrix::ones(4, 1)).unwrap();
        assert!(matches!(
            m.fit(&wide, FitConfig::default()),
            Err(Error::InvalidData(_))
        ));

        let empty = Dataset::new(Matrix::zeros(0, 2), Matrix::zeros(0, 1)).unwrap();
        assert!(matches!(m.evaluate(&empty), Err(Error::InvalidData(_))));
    }

    #[test]
    fn fit_with_reports_on_schedule() {
        let data = Dataset::xor();
        let mut m = mlp();
        let mut seen = Vec::new();
        let report = m
            .fit_with(
                &data,
                FitConfig {
                    iterations: 250,
                    learning_rate: 0.1,
                },
                |p| seen.push((p.iteration, p.loss)),
            )
            .unwrap();

        let iterations: Vec<usize> = seen.iter().map(|&(i, _)| i).collect();
        assert_eq!(iterations, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 100, 200]);
        assert_eq!(report.iterations, 250);
        assert_eq!(report.final_loss, m.average_error().unwrap());
    }

    #[test]
    fn every_scheduled_iteration_sees_the_stored_output() {
        let data = Dataset::xor();
        let mut m = mlp();
        let mut outputs = Vec::new();
        m.fit_with(
            &data,
            FitConfig {
                iterations: 100,
                learning_rate: 0.1,
            },
            |p| outputs.push((p.iteration, p.output.clone())),
        )
        .unwrap();

        assert_eq!(outputs.len(), 11);
        let (iteration, last) = outputs.last().unwrap();
        assert_eq!(*iteration, 100);
        assert_eq!(Some(last), m.output());
        assert!(outputs.iter().all(|(_, o)| o.shape() == (4, 1)));
    }

    #[test]
    fn evaluate_does_not_change_the_model() {
        let data = Dataset::xor();
        let mut m = mlp();
        m.fit(
            &data,
            FitConfig {
                iterations: 20,
                learning_rate: 0.1,
            },
        )
        .unwrap();

        let weights = m.weights().to_vec();
        let stored = m.average_error().unwrap();
        let a = m.evaluate(&data).unwrap();
        let b = m.evaluate(&data).unwrap();
        assert_eq!(a, b);
        assert_eq!(m.weights(), weights.as_slice());
        assert_eq!(m.average_error().unwrap(), stored);
    }
}

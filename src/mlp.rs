use rand::Rng;

use crate::loss::scaled_loss;
use crate::{Dataset, Error, Matrix, Nonlinearity, Result};

/// A fully vectorized multilayer perceptron.
///
/// Every layer works on the whole dataset at once: activations are
/// `(examples, neurons)` matrices and each weight matrix maps one layer to the next.
///
/// With bias injection on, a column of ones is prepended to the input and to every
/// layer's pre-activation, and the first row of each weight matrix acts as the bias.
/// Hidden layers also carry one extra neuron, so `neuron_counts()` is the topology
/// with `+1` on every hidden layer.
#[derive(Debug, Clone)]
pub struct Mlp {
    topology: Vec<usize>,
    neuron_counts: Vec<usize>,
    /// `weights[i]` maps layer `i` to layer `i + 1`.
    weights: Vec<Matrix>,
    nonlinearity: Nonlinearity,
    use_bias: bool,
    last: Option<LastIteration>,
}

/// What the most recent training iteration produced.
#[derive(Debug, Clone)]
struct LastIteration {
    output: Matrix,
    /// One error matrix per layer; the last one is `output - targets`.
    errors: Vec<Matrix>,
    example_count: usize,
}

/// Pre-activations (`z`) and activations (`a`) of one forward pass, per layer.
struct Pass {
    z: Vec<Matrix>,
    a: Vec<Matrix>,
}

impl Mlp {
    /// Zero weights with the shapes implied by `topology` and `use_bias`.
    ///
    /// `MlpBuilder` validates the topology and randomizes the result.
    pub(crate) fn new(topology: Vec<usize>, nonlinearity: Nonlinearity, use_bias: bool) -> Self {
        let layers = topology.len();
        let neuron_counts: Vec<usize> = topology
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                if use_bias && i > 0 && i < layers - 1 {
                    n + 1
                } else {
                    n
                }
            })
            .collect();

        let weights = (0..layers - 1)
            .map(|i| {
                let (rows, cols) = weight_shape(&neuron_counts, use_bias, i);
                Matrix::zeros(rows, cols)
            })
            .collect();

        Self {
            topology,
            neuron_counts,
            weights,
            nonlinearity,
            use_bias,
            last: None,
        }
    }

    /// Redraw every weight uniformly from `[-1, 1)`, layer by layer from the same generator.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for w in &mut self.weights {
            *w = Matrix::random(w.rows(), w.cols(), rng) * 2.0 - 1.0;
        }
    }

    /// Replace weight matrix `idx` (used to pin exact starting weights).
    pub fn set_weights(&mut self, idx: usize, weights: Matrix) -> Result<()> {
        let Some(current) = self.weights.get(idx) else {
            return Err(Error::InvalidArgument(format!(
                "weight index {idx} is out of range for {} weight matrices",
                self.weights.len()
            )));
        };
        if current.shape() != weights.shape() {
            return Err(Error::InvalidShape(format!(
                "weights {idx} must be {:?}, got {:?}",
                current.shape(),
                weights.shape()
            )));
        }
        log::debug!("pinned weights {idx}: {weights}");
        self.weights[idx] = weights;
        Ok(())
    }

    #[inline]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[inline]
    pub fn weight(&self, idx: usize) -> Option<&Matrix> {
        self.weights.get(idx)
    }

    /// Layer sizes as configured.
    #[inline]
    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    /// Layer sizes including the extra hidden neuron added by bias injection.
    #[inline]
    pub fn neuron_counts(&self) -> &[usize] {
        &self.neuron_counts
    }

    #[inline]
    pub fn num_layers(&self) -> usize {
        self.topology.len()
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.topology[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    #[inline]
    pub fn uses_bias(&self) -> bool {
        self.use_bias
    }

    #[inline]
    pub fn nonlinearity(&self) -> &Nonlinearity {
        &self.nonlinearity
    }

    /// Output of the most recent training iteration.
    pub fn output(&self) -> Option<&Matrix> {
        self.last.as_ref().map(|l| &l.output)
    }

    /// Per-layer errors of the most recent training iteration (empty before training).
    pub fn errors(&self) -> &[Matrix] {
        self.last.as_ref().map(|l| l.errors.as_slice()).unwrap_or(&[])
    }

    /// `output - targets` of the most recent training iteration.
    pub fn last_error(&self) -> Option<&Matrix> {
        self.errors().last()
    }

    /// Number of examples seen by the most recent training iteration.
    pub fn example_count(&self) -> Option<usize> {
        self.last.as_ref().map(|l| l.example_count)
    }

    /// Loss of the most recent training iteration: `mean(|error|) * example_count`.
    ///
    /// Reads stored state only, so repeated calls return the same value.
    pub fn average_error(&self) -> Result<f64> {
        let last = self.last.as_ref().ok_or_else(|| {
            Error::InvalidConfig("no training iteration has run yet".to_owned())
        })?;
        let error = last.errors.last().ok_or_else(|| {
            Error::InvalidConfig("no training iteration has run yet".to_owned())
        })?;
        Ok(scaled_loss(error, last.example_count))
    }

    fn bias_column(&self, rows: usize) -> Matrix {
        Matrix::ones(rows, 1)
    }

    /// Drop the leading bias column when bias injection is on.
    fn strip_bias(&self, m: &Matrix) -> Result<Matrix> {
        if self.use_bias {
            m.slice(0, 1, m.rows(), m.cols())
        } else {
            Ok(m.clone())
        }
    }

    fn forward(&self, inputs: &Matrix) -> Result<Pass> {
        let layers = self.num_layers();
        let examples = inputs.rows();
        let mut z = Vec::with_capacity(layers);
        let mut a = Vec::with_capacity(layers);

        let z0 = if self.use_bias {
            inputs.add_column(&self.bias_column(examples))?
        } else {
            inputs.clone()
        };
        a.push(z0.clone());
        z.push(z0);

        for i in 1..layers {
            let mut zi = a[i - 1].matmul(&self.weights[i - 1])?;
            if self.use_bias {
                zi = zi.add_column(&self.bias_column(examples))?;
            }
            a.push(zi.map(|v| self.nonlinearity.activate(v)));
            z.push(zi);
        }

        // Unbounded outputs: the last layer passes its pre-activation through.
        if self.nonlinearity.is_non_linear() {
            a[layers - 1] = z[layers - 1].clone();
        }

        Ok(Pass { z, a })
    }

    /// Forward pass only: returns the output for `inputs` without touching weights
    /// or the stored training state.
    pub fn predict(&self, inputs: &Matrix) -> Result<Matrix> {
        if inputs.cols() != self.input_dim() {
            return Err(Error::InvalidData(format!(
                "inputs have {} columns, model input_dim is {}",
                inputs.cols(),
                self.input_dim()
            )));
        }
        let pass = self.forward(inputs)?;
        self.strip_bias(&pass.a[self.num_layers() - 1])
    }

    /// One full-batch iteration: forward pass, backpropagation, gradient descent.
    ///
    /// Every weight matrix is updated once, after the whole backward pass. Returns the
    /// loss of this iteration (computed before the update). Shape problems surface as
    /// errors from the matrix operation that hits them, and leave the weights as
    /// they were.
    pub fn step(&mut self, data: &Dataset, learning_rate: f64) -> Result<f64> {
        self.iterate(data, learning_rate).map(|(loss, _)| loss)
    }

    /// [`Mlp::step`], also handing back the output it stored.
    pub(crate) fn iterate(&mut self, data: &Dataset, learning_rate: f64) -> Result<(f64, &Matrix)> {
        let layers = self.num_layers();
        let last = layers - 1;
        let pass = self.forward(data.inputs())?;

        let z_last = self.strip_bias(&pass.z[last])?;
        let output = self.strip_bias(&pass.a[last])?;

        let mut errors = vec![Matrix::zeros(0, 0); layers];
        let mut deltas = vec![Matrix::zeros(0, 0); layers];

        errors[last] = output.checked_sub(data.targets())?;
        deltas[last] = errors[last].hadamard(&z_last.map(|v| self.nonlinearity.derivative(v)))?;

        for i in (0..last).rev() {
            errors[i] = deltas[i + 1].matmul(&self.weights[i].transpose())?;
            // The input layer's delta has no weights to update.
            if i == 0 {
                continue;
            }
            let delta = errors[i].hadamard(&pass.z[i].map(|v| self.nonlinearity.derivative(v)))?;
            deltas[i] = self.strip_bias(&delta)?;
        }

        let mut updated = Vec::with_capacity(self.weights.len());
        for (i, w) in self.weights.iter().enumerate() {
            let gradient = pass.a[i].transpose().matmul(&deltas[i + 1])?;
            updated.push(w.checked_sub(&(gradient * learning_rate))?);
        }
        self.weights = updated;

        let example_count = data.len();
        let loss = scaled_loss(&errors[last], example_count);
        let last = self.last.insert(LastIteration {
            output,
            errors,
            example_count,
        });
        Ok((loss, &last.output))
    }
}

/// Shape of `weights[i]`: one extra row for the bias when it is injected.
fn weight_shape(neuron_counts: &[usize], use_bias: bool, i: usize) -> (usize, usize) {
    let rows = neuron_counts[i] + usize::from(use_bias);
    (rows, neuron_counts[i + 1])
}

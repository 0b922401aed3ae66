//! Model builder.
//!
//! `MlpBuilder` is the recommended way to define a model. It fixes the topology,
//! the nonlinearity shared by every layer and whether a bias column is injected, then
//! builds an [`Mlp`] with every weight drawn uniformly from `[-1, 1)`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Error, Mlp, Nonlinearity, Result};

#[derive(Debug, Clone)]
/// Builder for an `Mlp`.
///
/// Example:
///
/// ```rust
/// use vectorized_mlp::{Activation, MlpBuilder};
///
/// # fn main() -> vectorized_mlp::Result<()> {
/// let mlp = MlpBuilder::new(&[2, 2, 1])?
///     .activation(Activation::Sigmoid)
///     .bias(true)
///     .build_with_seed(1)?;
/// assert_eq!(mlp.weight(0).map(|w| w.shape()), Some((3, 3)));
/// # Ok(())
/// # }
/// ```
pub struct MlpBuilder {
    topology: Vec<usize>,
    nonlinearity: Nonlinearity,
    use_bias: bool,
}

impl MlpBuilder {
    /// Start from per-layer neuron counts, input layer first and output layer last.
    pub fn new(topology: &[usize]) -> Result<Self> {
        if topology.len() < 2 {
            return Err(Error::InvalidConfig(
                "topology must include input and output layers".to_owned(),
            ));
        }
        if topology.contains(&0) {
            return Err(Error::InvalidConfig(
                "all layer sizes must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            topology: topology.to_vec(),
            nonlinearity: Nonlinearity::default(),
            use_bias: true,
        })
    }

    /// Nonlinearity applied at every layer. Defaults to sigmoid with gain 1, center 0.
    pub fn activation(mut self, nonlinearity: impl Into<Nonlinearity>) -> Self {
        self.nonlinearity = nonlinearity.into();
        self
    }

    /// Inject a constant-1 column into every layer (default: on).
    pub fn bias(mut self, use_bias: bool) -> Self {
        self.use_bias = use_bias;
        self
    }

    /// Build using a deterministic seed.
    pub fn build_with_seed(self, seed: u64) -> Result<Mlp> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.build_with_rng(&mut rng)
    }

    /// Build using the provided RNG; weight matrices are drawn in layer order.
    pub fn build_with_rng<R: Rng + ?Sized>(self, rng: &mut R) -> Result<Mlp> {
        self.nonlinearity.validate()?;
        let mut mlp = Mlp::new(self.topology, self.nonlinearity, self.use_bias);
        mlp.randomize(rng);
        log::debug!(
            "built mlp: topology={:?} neurons={:?} bias={} nonlinearity={:?}",
            mlp.topology(),
            mlp.neuron_counts(),
            mlp.uses_bias(),
            mlp.nonlinearity()
        );
        Ok(mlp)
    }
}

//! A small, fully vectorized MLP (multi-layer perceptron) trainer.
//!
//! `vectorized-mlp` is a from-scratch implementation of a dense feed-forward network on
//! top of its own 2D matrix type. Every layer processes the whole dataset at once:
//! activations are `(examples, neurons)` matrices, and one training iteration is a
//! handful of matrix products.
//!
//! # Pieces
//!
//! - [`Matrix`]: dense `f64` matrix with slicing, elementwise and matrix arithmetic,
//!   scalar broadcasting, reductions and pointwise mapping.
//! - [`Activation`] / [`Nonlinearity`]: the pointwise function (and derivative) applied
//!   at every layer.
//! - [`MlpBuilder`] / [`Mlp`]: network configuration, weight initialization, forward
//!   propagation, backpropagation and full-batch gradient descent.
//!
//! # Panics vs `Result`
//!
//! - The `std::ops` operators between two matrices (`&a + &b`, `&a * &b`, ...) panic
//!   on a shape mismatch. Scalar operators never fail.
//! - Everything else returns [`Result`]: the `checked_*` matrix methods, slicing,
//!   model building and training.
//!
//! # Multiplication
//!
//! `*` between matrices uses dual dispatch: operands of identical shape are multiplied
//! elementwise, anything else is a matrix product. [`Matrix::hadamard`] and
//! [`Matrix::matmul`] name each half explicitly.
//!
//! # Bias injection
//!
//! With bias on (the default), a column of ones is prepended to the inputs and to every
//! layer's pre-activation, so the first row of each weight matrix is the bias. For a
//! topology `[2, 2, 1]` the weights are `3 x 3` and `4 x 1`.
//!
//! # Quick start
//!
//! ```rust
//! use vectorized_mlp::{Activation, Dataset, FitConfig, MlpBuilder};
//!
//! # fn main() -> vectorized_mlp::Result<()> {
//! let train = Dataset::xor();
//!
//! let mut mlp = MlpBuilder::new(&[2, 2, 1])?
//!     .activation(Activation::Sigmoid)
//!     .bias(true)
//!     .build_with_seed(1)?;
//!
//! let report = mlp.fit(
//!     &train,
//!     FitConfig {
//!         iterations: 200,
//!         learning_rate: 0.1,
//!     },
//! )?;
//! assert!(report.final_loss.is_finite());
//! assert_eq!(mlp.output().map(|o| o.shape()), Some((4, 1)));
//! # Ok(())
//! # }
//! ```

pub mod activation;
pub mod builder;
pub mod data;
pub mod error;
pub mod loss;
pub(crate) mod matmul;
pub mod matrix;
pub mod mlp;
pub mod train;

pub use activation::{Activation, Nonlinearity, PointwiseFn};
pub use builder::MlpBuilder;
pub use data::Dataset;
pub use error::{Error, Result};
pub use matrix::{Axis, Matrix};
pub use mlp::Mlp;
pub use train::{FitConfig, FitReport, Progress, should_report};

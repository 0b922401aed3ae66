//! Training data.
//!
//! The engine trains full-batch, so a dataset is just two matrices with one row per
//! example: inputs `(len, input_dim)` and targets `(len, target_dim)`.

use crate::{Error, Matrix, Result};

/// A supervised dataset: inputs (X) and targets (Y).
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    inputs: Matrix,
    targets: Matrix,
}

impl Dataset {
    /// Pair input and target matrices with the same number of rows.
    pub fn new(inputs: Matrix, targets: Matrix) -> Result<Self> {
        if inputs.rows() != targets.rows() {
            return Err(Error::InvalidData(format!(
                "inputs/targets length mismatch: {} vs {}",
                inputs.rows(),
                targets.rows()
            )));
        }
        Ok(Self { inputs, targets })
    }

    /// Build a dataset from per-sample rows.
    pub fn from_rows<X, Y>(inputs: &[X], targets: &[Y]) -> Result<Self>
    where
        X: AsRef<[f64]>,
        Y: AsRef<[f64]>,
    {
        let inputs = Matrix::from_rows(inputs)
            .map_err(|e| Error::InvalidData(format!("inputs: {e}")))?;
        let targets = Matrix::from_rows(targets)
            .map_err(|e| Error::InvalidData(format!("targets: {e}")))?;
        Self::new(inputs, targets)
    }

    /// The four XOR examples in the order `(1,0) (0,0) (0,1) (1,1)`.
    pub fn xor() -> Self {
        Self {
            inputs: Matrix::from_array(&[[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]),
            targets: Matrix::column_vector(&[1.0, 0.0, 1.0, 0.0]),
        }
    }

    #[inline]
    /// Returns the number of examples.
    pub fn len(&self) -> usize {
        self.targets.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.inputs.cols()
    }

    #[inline]
    pub fn target_dim(&self) -> usize {
        self.targets.cols()
    }

    #[inline]
    pub fn inputs(&self) -> &Matrix {
        &self.inputs
    }

    #[inline]
    pub fn targets(&self) -> &Matrix {
        &self.targets
    }
}

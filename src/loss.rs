//! Loss metric.
//!
//! Training reports the mean absolute error of the output layer scaled by the number
//! of examples: `mean(|output - target|) * len`. For a single-output network this is
//! the total absolute error over the dataset.

use crate::Matrix;

/// Mean of `|error|` over every element.
#[inline]
pub fn mean_absolute_error(error: &Matrix) -> f64 {
    error.abs().average()
}

/// `mean(|error|) * example_count`.
#[inline]
pub fn scaled_loss(error: &Matrix, example_count: usize) -> f64 {
    mean_absolute_error(error) * example_count as f64
}

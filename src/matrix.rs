//! Dense 2D matrix of `f64`.
//!
//! `Matrix` is a value type: every operation returns a fresh matrix and leaves its
//! operands untouched. Storage is a contiguous row-major buffer of `rows * cols`
//! values.
//!
//! Shape rules:
//!
//! - elementwise `+`/`-` need identical shapes;
//! - `*` between matrices uses *dual dispatch*: identical shapes give the
//!   elementwise (Hadamard) product, anything else is a matrix product that needs
//!   `lhs.cols() == rhs.rows()`;
//! - scalar `+ - * /` broadcast to every element.
//!
//! The `checked_*` methods return [`Result`]. The `std::ops` operators between two
//! matrices panic on a shape mismatch; use them only where shapes are known to agree.

use std::fmt;
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

use rand::Rng;
use rand::distributions::{Distribution, Uniform};

use crate::matmul::gemm_f64;
use crate::{Error, Result};

/// Reduction axis for [`Matrix::sum`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Axis {
    /// Reduce everything to a `1 x 1` matrix.
    #[default]
    None,
    /// Collapse the columns of each row: `(rows, cols) -> (rows, 1)`.
    Rows,
    /// Collapse the rows of each column: `(rows, cols) -> (1, cols)`.
    Columns,
}

impl TryFrom<i32> for Axis {
    type Error = Error;

    /// Numeric axis tags: `-1` (none), `0` (rows), `1` (columns).
    fn try_from(tag: i32) -> Result<Self> {
        match tag {
            -1 => Ok(Axis::None),
            0 => Ok(Axis::Rows),
            1 => Ok(Axis::Columns),
            other => Err(Error::InvalidArgument(format!(
                "reduction axis must be -1, 0 or 1, got {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major, `rows * cols` values.
    data: Vec<f64>,
}

impl Matrix {
    /// A `rows x cols` matrix of zeros.
    #[inline]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    #[inline]
    pub fn ones(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 1.0)
    }

    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// The `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// A matrix of uniform samples in `[0, 1)` drawn from `rng` in row-major order.
    ///
    /// The same seeded generator always yields the same matrix.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let dist = Uniform::new(0.0_f64, 1.0_f64);
        let mut data = Vec::with_capacity(rows * cols);
        for _ in 0..rows * cols {
            data.push(dist.sample(rng));
        }
        Self { rows, cols, data }
    }

    /// Build a matrix from a flat row-major buffer.
    pub fn from_flat(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidShape(format!(
                "buffer length {} does not match {rows} x {cols}",
                data.len()
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Build a matrix from rows of equal length.
    ///
    /// An empty slice gives a `0 x 0` matrix.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(Error::InvalidShape(format!(
                    "row {i} has len {}, expected {cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Build a matrix from fixed-width rows; the shape is known at compile time.
    pub fn from_array<const C: usize>(rows: &[[f64; C]]) -> Self {
        Self {
            rows: rows.len(),
            cols: C,
            data: rows.iter().flatten().copied().collect(),
        }
    }

    /// A `len x 1` matrix.
    pub fn column_vector(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    /// A `1 x len` matrix.
    pub fn row_vector(values: &[f64]) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    /// Row-major view of the elements.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Row-major copy of the elements.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.clone()
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::InvalidArgument(format!(
                "index ({row}, {col}) is outside a {} x {} matrix",
                self.rows, self.cols
            )));
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                t.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        t
    }

    /// Half-open rectangular copy of rows `x1..x2` and columns `y1..y2`.
    pub fn slice(&self, x1: usize, y1: usize, x2: usize, y2: usize) -> Result<Self> {
        if x1 >= x2 || y1 >= y2 {
            return Err(Error::InvalidArgument(format!(
                "slice bounds ({x1}, {y1})..({x2}, {y2}) are not valid"
            )));
        }
        if x2 > self.rows || y2 > self.cols {
            return Err(Error::InvalidArgument(format!(
                "slice bounds ({x1}, {y1})..({x2}, {y2}) exceed a {} x {} matrix",
                self.rows, self.cols
            )));
        }

        let cols = y2 - y1;
        let mut data = Vec::with_capacity((x2 - x1) * cols);
        for i in x1..x2 {
            let start = i * self.cols;
            data.extend_from_slice(&self.data[start + y1..start + y2]);
        }
        Ok(Self {
            rows: x2 - x1,
            cols,
            data,
        })
    }

    /// Shorthand for `slice(0, 0, x, y)`.
    #[inline]
    pub fn slice_to(&self, x: usize, y: usize) -> Result<Self> {
        self.slice(0, 0, x, y)
    }

    /// Copy of row `i` as a `1 x cols` matrix.
    pub fn row(&self, i: usize) -> Result<Self> {
        if i >= self.rows {
            return Err(Error::InvalidArgument(format!(
                "row {i} is outside a matrix with {} rows",
                self.rows
            )));
        }
        let start = i * self.cols;
        Ok(Self::row_vector(&self.data[start..start + self.cols]))
    }

    /// Copy of column `j` as a `rows x 1` matrix.
    pub fn column(&self, j: usize) -> Result<Self> {
        if j >= self.cols {
            return Err(Error::InvalidArgument(format!(
                "column {j} is outside a matrix with {} columns",
                self.cols
            )));
        }
        let data = (0..self.rows).map(|i| self.data[i * self.cols + j]).collect();
        Ok(Self {
            rows: self.rows,
            cols: 1,
            data,
        })
    }

    /// Prepend `column` (shape `rows x 1`); it becomes column 0.
    pub fn add_column(&self, column: &Matrix) -> Result<Self> {
        if column.cols != 1 || column.rows != self.rows {
            return Err(Error::InvalidShape(format!(
                "cannot prepend a {} x {} column to a {} x {} matrix",
                column.rows, column.cols, self.rows, self.cols
            )));
        }

        let cols = self.cols + 1;
        let mut data = Vec::with_capacity(self.rows * cols);
        for i in 0..self.rows {
            data.push(column.data[i]);
            data.extend_from_slice(&self.data[i * self.cols..(i + 1) * self.cols]);
        }
        Ok(Self {
            rows: self.rows,
            cols,
            data,
        })
    }

    /// Prepend `row` (shape `1 x cols`); it becomes row 0.
    pub fn add_row(&self, row: &Matrix) -> Result<Self> {
        if row.rows != 1 || row.cols != self.cols {
            return Err(Error::InvalidShape(format!(
                "cannot prepend a {} x {} row to a {} x {} matrix",
                row.rows, row.cols, self.rows, self.cols
            )));
        }

        let mut data = Vec::with_capacity(self.data.len() + self.cols);
        data.extend_from_slice(&row.data);
        data.extend_from_slice(&self.data);
        Ok(Self {
            rows: self.rows + 1,
            cols: self.cols,
            data,
        })
    }

    fn zip_with(&self, other: &Matrix, op: &str, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        if self.shape() != other.shape() {
            return Err(Error::InvalidShape(format!(
                "{op} needs identical shapes, got {} x {} and {} x {}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Self {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    pub fn checked_add(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "addition", |a, b| a + b)
    }

    pub fn checked_sub(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "subtraction", |a, b| a - b)
    }

    /// Elementwise product of two same-shaped matrices.
    pub fn hadamard(&self, other: &Matrix) -> Result<Self> {
        self.zip_with(other, "elementwise product", |a, b| a * b)
    }

    /// Matrix product: `(m, k) x (k, n) -> (m, n)`.
    pub fn matmul(&self, other: &Matrix) -> Result<Self> {
        if self.cols != other.rows {
            return Err(Error::InvalidShape(format!(
                "matrix product needs lhs cols == rhs rows, got {} x {} and {} x {}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        let mut out = Self::zeros(self.rows, other.cols);
        gemm_f64(
            self.rows,
            other.cols,
            self.cols,
            &self.data,
            &other.data,
            &mut out.data,
        );
        Ok(out)
    }

    /// Dual-dispatch multiply.
    ///
    /// Same-shaped operands give the Hadamard product, even when a square matrix
    /// product would also be legal. Otherwise this is [`Matrix::matmul`].
    pub fn checked_mul(&self, other: &Matrix) -> Result<Self> {
        if self.shape() == other.shape() {
            self.hadamard(other)
        } else {
            self.matmul(other)
        }
    }

    /// `self * other^T` through the dual-dispatch multiply.
    pub fn dot(&self, other: &Matrix) -> Result<Self> {
        self.checked_mul(&other.transpose())
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    pub fn pow(&self, exponent: f64) -> Self {
        self.map(|v| v.powf(exponent))
    }

    pub fn abs(&self) -> Self {
        self.map(f64::abs)
    }

    pub fn sum(&self, axis: Axis) -> Self {
        match axis {
            Axis::None => Self::filled(1, 1, self.total()),
            Axis::Rows => {
                let data = (0..self.rows)
                    .map(|i| self.data[i * self.cols..(i + 1) * self.cols].iter().sum::<f64>())
                    .collect();
                Self {
                    rows: self.rows,
                    cols: 1,
                    data,
                }
            }
            Axis::Columns => {
                let mut out = Self::zeros(1, self.cols);
                for i in 0..self.rows {
                    for j in 0..self.cols {
                        out.data[j] += self.data[i * self.cols + j];
                    }
                }
                out
            }
        }
    }

    /// Sum of all elements.
    pub fn total(&self) -> f64 {
        self.data.iter().sum()
    }

    /// Mean of the raw elements (`NaN` for an empty matrix).
    ///
    /// `m.abs().average()` is the mean absolute value.
    pub fn average(&self) -> f64 {
        self.total() / self.data.len() as f64
    }

    /// Same shape and every pair of elements within `eps`.
    pub fn approx_eq(&self, other: &Matrix, eps: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(&other.data)
                .all(|(a, b)| (a - b).abs() <= eps)
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    /// Panics if the index is out of range.
    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) is outside a {} x {} matrix",
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) is outside a {} x {} matrix",
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

/// Round to `digits` decimals with ties away from zero; `-0.0` becomes `0.0`.
fn round_half_away(value: f64, digits: usize) -> f64 {
    // Beyond 15 digits the scaled value no longer fits the mantissa.
    if digits > 15 || !value.is_finite() {
        return value;
    }
    let scale = 10f64.powi(digits as i32);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Nested-brace rendering with two decimals by default:
///
/// ```text
/// {
///  {0.97},
///  {0.02}}
/// ```
///
/// An explicit precision (`{:.4}`) overrides the default. Ties round away from zero
/// (`0.125` renders as `0.13`) and a value that rounds to zero never shows a sign.
impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = f.precision().unwrap_or(2);
        writeln!(f, "{{")?;
        for i in 0..self.rows {
            f.write_str(" {")?;
            for j in 0..self.cols {
                let value = round_half_away(self.data[i * self.cols + j], precision);
                write!(f, "{:.*}", precision, value)?;
                if j + 1 < self.cols {
                    f.write_str(", ")?;
                }
            }
            f.write_str("}")?;
            if i + 1 < self.rows {
                f.write_str(",\n")?;
            }
        }
        f.write_str("}")
    }
}

macro_rules! impl_matrix_op {
    ($trait:ident, $method:ident, $checked:ident) => {
        impl $trait<&Matrix> for &Matrix {
            type Output = Matrix;

            fn $method(self, rhs: &Matrix) -> Matrix {
                match self.$checked(rhs) {
                    Ok(m) => m,
                    Err(e) => panic!("{e}"),
                }
            }
        }

        impl $trait<Matrix> for Matrix {
            type Output = Matrix;

            fn $method(self, rhs: Matrix) -> Matrix {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&Matrix> for Matrix {
            type Output = Matrix;

            fn $method(self, rhs: &Matrix) -> Matrix {
                (&self).$method(rhs)
            }
        }
    };
}

impl_matrix_op!(Add, add, checked_add);
impl_matrix_op!(Sub, sub, checked_sub);
impl_matrix_op!(Mul, mul, checked_mul);

macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for &Matrix {
            type Output = Matrix;

            fn $method(self, rhs: f64) -> Matrix {
                self.map(|v| v $op rhs)
            }
        }

        impl $trait<f64> for Matrix {
            type Output = Matrix;

            fn $method(mut self, rhs: f64) -> Matrix {
                for v in &mut self.data {
                    *v = *v $op rhs;
                }
                self
            }
        }
    };
}

impl_scalar_op!(Add, add, +);
impl_scalar_op!(Sub, sub, -);
impl_scalar_op!(Mul, mul, *);
impl_scalar_op!(Div, div, /);

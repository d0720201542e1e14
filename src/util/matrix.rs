use std::fmt;
use std::ops;

use super::Vector4f;

const DEFAULT_ALLOC: usize = 4;

/// Dense row-major matrix of f32 with explicit dimensions.
/// `m[i][j]` gives the element in row i and column j, row access is bounds checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Default for Matrix {
    fn default() -> Self {
        return Matrix::new(DEFAULT_ALLOC, DEFAULT_ALLOC);
    }
}

impl Matrix {
    /// Zero matrix of the given size.
    pub fn new(rows: usize, cols: usize) -> Matrix {
        return Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        };
    }

    pub fn identity(dimensions: usize) -> Matrix {
        let mut e = Matrix::new(dimensions, dimensions);
        for i in 0..dimensions {
            e[i][i] = 1.0;
        }
        return e;
    }

    /// Builds a matrix from a slice of equally sized rows.
    pub fn from_rows<const C: usize>(rows: &[[f32; C]]) -> Matrix {
        let mut m = Matrix::new(rows.len(), C);
        for (i, row) in rows.iter().enumerate() {
            m[i].copy_from_slice(row);
        }
        return m;
    }

    pub fn nrows(&self) -> usize {
        return self.rows;
    }

    pub fn ncols(&self) -> usize {
        return self.cols;
    }

    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::new(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result[j][i] = self[i][j];
            }
        }
        return result;
    }

    /// Inverse via Gauss-Jordan elimination on the matrix augmented with the identity.
    ///
    /// Every row is normalized by its own diagonal element, there is no pivot search. A zero on the
    /// diagonal during elimination or a singular input produce inf/NaN garbage instead of an error, and
    /// near-singular input loses precision quickly. Callers needing robustness must check the input.
    ///
    /// Panics if the matrix isn't square.
    pub fn inverse(&self) -> Matrix {
        assert_eq!(self.rows, self.cols, "inverse of a non-square matrix");
        let n = self.rows;
        if n == 0 {
            return Matrix::new(0, 0);
        }
        // [a] => [a | e]
        let mut result = Matrix::new(n, 2 * n);
        for i in 0..n {
            result[i][..n].copy_from_slice(&self[i]);
            result[i][i + n] = 1.0;
        }
        // Forward pass, zeroing everything below the diagonal.
        for i in 0..n - 1 {
            let pivot = result[i][i];
            for j in (0..2 * n).rev() {
                result[i][j] /= pivot;
            }
            for k in i + 1..n {
                let coeff = result[k][i];
                for j in 0..2 * n {
                    result[k][j] -= result[i][j] * coeff;
                }
            }
        }
        let pivot = result[n - 1][n - 1];
        for j in (n - 1..2 * n).rev() {
            result[n - 1][j] /= pivot;
        }
        // Backward pass, zeroing everything above the diagonal.
        for i in (1..n).rev() {
            for k in (0..i).rev() {
                let coeff = result[k][i];
                for j in 0..2 * n {
                    result[k][j] -= result[i][j] * coeff;
                }
            }
        }
        // Cutting the identity back.
        let mut truncated = Matrix::new(n, n);
        for i in 0..n {
            truncated[i].copy_from_slice(&result[i][n..]);
        }
        return truncated;
    }

    /// Largest absolute elementwise difference, handy for approximate comparisons.
    pub fn max_abs_diff(&self, other: &Matrix) -> f32 {
        assert!(self.rows == other.rows && self.cols == other.cols);
        return self
            .data
            .iter()
            .zip(other.data.iter())
            .fold(0.0, |max, (a, b)| f32::max(max, (a - b).abs()));
    }
}

impl ops::Index<usize> for Matrix {
    type Output = [f32];

    fn index(&self, i: usize) -> &[f32] {
        assert!(i < self.rows, "row {} out of {}", i, self.rows);
        return &self.data[i * self.cols..(i + 1) * self.cols];
    }
}

impl ops::IndexMut<usize> for Matrix {
    fn index_mut(&mut self, i: usize) -> &mut [f32] {
        assert!(i < self.rows, "row {} out of {}", i, self.rows);
        return &mut self.data[i * self.cols..(i + 1) * self.cols];
    }
}

impl ops::Mul<&Matrix> for &Matrix {
    type Output = Matrix;

    fn mul(self, _rhs: &Matrix) -> Matrix {
        assert_eq!(
            self.cols, _rhs.rows,
            "can't multiply {}x{} by {}x{}",
            self.rows, self.cols, _rhs.rows, _rhs.cols
        );
        let mut result = Matrix::new(self.rows, _rhs.cols);
        for i in 0..self.rows {
            for j in 0.._rhs.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self[i][k] * _rhs[k][j];
                }
                result[i][j] = sum;
            }
        }
        return result;
    }
}

impl ops::Mul<Matrix> for Matrix {
    type Output = Matrix;

    fn mul(self, _rhs: Matrix) -> Matrix {
        return &self * &_rhs;
    }
}

impl ops::Mul<Vector4f> for &Matrix {
    type Output = Vector4f;

    fn mul(self, _rhs: Vector4f) -> Vector4f {
        assert!(self.rows == 4 && self.cols == 4, "expected a 4x4 matrix");
        let mut result = Vector4f::default();
        for i in 0..4 {
            let mut sum = 0.0;
            for j in 0..4 {
                sum += self[i][j] * _rhs[j];
            }
            result[i] = sum;
        }
        return result;
    }
}

impl ops::Mul<Vector4f> for Matrix {
    type Output = Vector4f;

    fn mul(self, _rhs: Vector4f) -> Vector4f {
        return &self * _rhs;
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for j in 0..self.cols {
                write!(f, "{}\t\t", self[i][j])?;
            }
            writeln!(f)?;
        }
        return Ok(());
    }
}

//! Transition matrix for one intervention condition.
//!
//! A [`TransitionMatrix`] holds the probabilities P(j → i) of a population
//! member moving from state `j` at time t to state `i` at t+1, stored
//! row-major as `cells[i * size + j]`. Columns are source states, so every
//! column of a ratio-form matrix sums to 1.0 and one step is the
//! matrix-vector product
//!
//! ```text
//! next[i] = Σ_j cells[i][j] · state[j]
//! ```
//!
//! which conserves the total population.
//!
//! Matrices are either set directly as ratios (validated: every column must
//! sum to exactly 1.0) or derived from raw transition counts by dividing each
//! cell by its column total.

use crate::constants::MIN_MATRIX_SIZE;
use crate::error::MatrixError;

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix {
    size: usize,
    /// Row-major: `cells[row * size + col]`.
    cells: Vec<f64>,
    is_set: bool,
}

impl TransitionMatrix {
    /// Create an empty (all-zero, unset) matrix of the given size.
    pub fn new(size: usize) -> Result<Self, MatrixError> {
        if size < MIN_MATRIX_SIZE {
            return Err(MatrixError::InvalidSize { size });
        }
        Ok(Self {
            size,
            cells: vec![0.0; size * size],
            is_set: false,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the matrix holds validated data.
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Transition ratio from state `col` to state `row`.
    pub fn cell(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.size || col >= self.size {
            return None;
        }
        Some(self.cells[row * self.size + col])
    }

    /// Sum of each column, in column order.
    pub fn column_sums(&self) -> Vec<f64> {
        column_sums(self.size, |r, c| self.cells[r * self.size + c])
    }

    /// Reset to an empty matrix of `new_size`. Clears any data.
    pub fn resize(&mut self, new_size: usize) -> Result<(), MatrixError> {
        if new_size < MIN_MATRIX_SIZE {
            return Err(MatrixError::InvalidSize { size: new_size });
        }
        self.size = new_size;
        self.cells = vec![0.0; new_size * new_size];
        self.is_set = false;
        Ok(())
    }

    /// Replace the matrix with ratio values.
    ///
    /// Every column must sum to exactly 1.0; there is no tolerance. On any
    /// failure the matrix is left untouched.
    pub fn set_ratio<R: AsRef<[f64]>>(&mut self, values: &[R]) -> Result<(), MatrixError> {
        self.check_dimensions(values)?;

        let sums = column_sums(self.size, |r, c| values[r].as_ref()[c]);
        if let Some((column, &sum)) = sums.iter().enumerate().find(|(_, &s)| s != 1.0) {
            return Err(MatrixError::NotStochastic { column, sum });
        }

        self.cells = flatten(values);
        self.is_set = true;
        Ok(())
    }

    /// Replace the matrix with ratios computed from raw transition counts:
    /// `cell[r][c] = value[r][c] / Σ_r' value[r'][c]`.
    ///
    /// A column whose counts total zero yields non-finite ratios; callers
    /// must not pass one.
    pub fn set_raw_counts<R: AsRef<[f64]>>(&mut self, values: &[R]) -> Result<(), MatrixError> {
        self.check_dimensions(values)?;

        let sums = column_sums(self.size, |r, c| values[r].as_ref()[c]);
        let n = self.size;
        let mut cells = vec![0.0; n * n];
        for r in 0..n {
            let row = values[r].as_ref();
            for c in 0..n {
                cells[r * n + c] = row[c] / sums[c];
            }
        }

        self.cells = cells;
        self.is_set = true;
        Ok(())
    }

    /// One Markov step: `matrix · state`.
    pub fn step(&self, state: &[f64]) -> Result<Vec<f64>, MatrixError> {
        let mut next = vec![0.0; self.size];
        self.step_into(state, &mut next)?;
        Ok(next)
    }

    /// Like [`step`](Self::step) but writes into a caller-owned buffer of
    /// length `size`.
    pub fn step_into(&self, state: &[f64], out: &mut [f64]) -> Result<(), MatrixError> {
        if state.len() != self.size {
            return Err(MatrixError::SizeMismatch {
                expected: self.size,
                actual: state.len(),
            });
        }
        if out.len() != self.size {
            return Err(MatrixError::SizeMismatch {
                expected: self.size,
                actual: out.len(),
            });
        }
        for (row, slot) in self.cells.chunks_exact(self.size).zip(out.iter_mut()) {
            *slot = row.iter().zip(state).map(|(m, s)| m * s).sum();
        }
        Ok(())
    }

    fn check_dimensions<R: AsRef<[f64]>>(&self, values: &[R]) -> Result<(), MatrixError> {
        if values.len() != self.size {
            return Err(MatrixError::SizeMismatch {
                expected: self.size,
                actual: values.len(),
            });
        }
        if let Some(row) = values.iter().find(|r| r.as_ref().len() != self.size) {
            return Err(MatrixError::SizeMismatch {
                expected: self.size,
                actual: row.as_ref().len(),
            });
        }
        Ok(())
    }
}

/// Column sums accumulated top to bottom, starting from 0.0.
fn column_sums(n: usize, at: impl Fn(usize, usize) -> f64) -> Vec<f64> {
    (0..n)
        .map(|c| (0..n).fold(0.0, |acc, r| acc + at(r, c)))
        .collect()
}

fn flatten<R: AsRef<[f64]>>(values: &[R]) -> Vec<f64> {
    values.iter().flat_map(|r| r.as_ref().iter().copied()).collect()
}

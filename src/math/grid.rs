use rand::prelude::*;
use std::f64::consts::PI;
use std::ops::{Index, IndexMut};

use crate::error::{LaminaError, Result};

/// A dense 2-D `f64` container with flat row-major storage.
///
/// The shape is fixed at construction. Element access through [`Grid::get`]
/// and [`Grid::set`] is bounds-checked and returns
/// [`LaminaError::OutOfBounds`] on violation; the `Index` operators exist for
/// inner loops whose ranges were validated up front.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Builds a `rows x cols` grid with every cell set to `fill`.
    pub fn new(rows: usize, cols: usize, fill: f64) -> Grid {
        Grid {
            rows,
            cols,
            data: vec![fill; rows * cols],
        }
    }

    pub fn zeros(rows: usize, cols: usize) -> Grid {
        Grid::new(rows, cols, 0.0)
    }

    /// Builds a grid from nested rows. All rows must have equal length.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Grid {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, |r| r.len());
        assert!(
            rows.iter().all(|r| r.len() == n_cols),
            "from_rows: ragged row lengths"
        );
        Grid {
            rows: n_rows,
            cols: n_cols,
            data: rows.into_iter().flatten().collect(),
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// He initialization: samples every cell from N(0, sqrt(2 / fan_in)).
    ///
    /// The variance 2/fan_in accounts for the fact that rectifier activations
    /// zero half of their inputs on average. `fan_in` is the number of input
    /// connections feeding one output unit, which for kernel grids differs
    /// from the column count, hence the explicit parameter.
    pub fn he<R: Rng>(rows: usize, cols: usize, fan_in: usize, rng: &mut R) -> Grid {
        let std_dev = (2.0 / fan_in as f64).sqrt();
        let mut res = Grid::zeros(rows, cols);
        for v in &mut res.data {
            *v = Grid::sample_standard_normal(rng) * std_dev;
        }
        res
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Bounds-checked element read.
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        if row >= self.rows || col >= self.cols {
            return Err(self.out_of_bounds(row, col));
        }
        Ok(self.data[row * self.cols + col])
    }

    /// Bounds-checked element write.
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(self.out_of_bounds(row, col));
        }
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// `true` when `other` has the same `rows x cols` shape.
    pub fn same_shape(&self, other: &Grid) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    pub fn map<F>(&self, functor: F) -> Grid
    where
        F: Fn(f64) -> f64,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|&x| functor(x)).collect(),
        }
    }

    pub fn transpose(&self) -> Grid {
        let mut res = Grid::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                res[(j, i)] = self[(i, j)];
            }
        }
        res
    }

    /// Matrix product `self * rhs`. Fails unless `self.cols == rhs.rows`.
    pub fn matmul(&self, rhs: &Grid) -> Result<Grid> {
        if self.cols != rhs.rows {
            return Err(LaminaError::ShapeMismatch(format!(
                "matmul: {}x{} * {}x{}",
                self.rows, self.cols, rhs.rows, rhs.cols
            )));
        }
        let mut res = Grid::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for j in 0..rhs.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self[(i, k)] * rhs[(k, j)];
                }
                res[(i, j)] = sum;
            }
        }
        Ok(res)
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> LaminaError {
        LaminaError::OutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        }
    }
}

impl Index<(usize, usize)> for Grid {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(
            row < self.rows && col < self.cols,
            "grid index ({}, {}) out of range for {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Grid {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(
            row < self.rows && col < self.cols,
            "grid index ({}, {}) out of range for {}x{} grid",
            row,
            col,
            self.rows,
            self.cols
        );
        &mut self.data[row * self.cols + col]
    }
}

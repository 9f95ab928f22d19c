use serde::{Serialize, Deserialize};
use std::ops::{Add, Sub, Mul};

/// Dense row-major matrix.
///
/// Batches are stored column-wise: a batch of `m` examples with `n` features
/// is an `n × m` matrix, one example per column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix{
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>
}

impl Matrix{
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix{
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows]
        }
    }

    /// Builds a matrix from row vectors. All rows must have the same length.
    pub fn from_data(data: Vec<Vec<f64>>) -> Matrix {
        let cols = data.first().map_or(0, |row| row.len());
        assert!(
            data.iter().all(|row| row.len() == cols),
            "Matrix rows must all have the same length"
        );
        Matrix {
            rows: data.len(),
            cols,
            data
        }
    }

    /// Builds a matrix whose `j`-th column is `columns[j]`.
    pub fn from_columns(columns: &[Vec<f64>]) -> Matrix {
        let rows = columns.first().map_or(0, |col| col.len());
        let mut res = Matrix::zeros(rows, columns.len());
        for (j, col) in columns.iter().enumerate() {
            assert_eq!(col.len(), rows, "Matrix columns must all have the same length");
            for (i, &x) in col.iter().enumerate() {
                res.data[i][j] = x;
            }
        }
        res
    }

    /// A single-column matrix.
    pub fn column_vector(values: &[f64]) -> Matrix {
        Matrix::from_columns(&[values.to_vec()])
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row][col] = value;
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        self.data.iter().map(|row| row[col]).collect()
    }

    /// Columns `start..end` as a new matrix.
    pub fn column_range(&self, start: usize, end: usize) -> Matrix {
        assert!(start <= end && end <= self.cols, "column range out of bounds");
        let data = self.data.iter()
            .map(|row| row[start..end].to_vec())
            .collect();
        Matrix { rows: self.rows, cols: end - start, data }
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        let data = self.data.iter()
            .map(|row| row.iter().map(|&x| functor(x)).collect())
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Combines two same-shape matrices element by element.
    pub fn zip_map<F>(&self, other: &Matrix, functor: F) -> Matrix
    where
        F: Fn(f64, f64) -> f64,
    {
        assert_eq!(self.shape(), other.shape(), "Matrices are of incorrect sizes");
        let data = self.data.iter().zip(other.data.iter())
            .map(|(row_a, row_b)| {
                row_a.iter().zip(row_b.iter()).map(|(&x, &y)| functor(x, y)).collect()
            })
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Element-wise (Hadamard) product.
    pub fn hadamard(&self, other: &Matrix) -> Matrix {
        self.zip_map(other, |x, y| x * y)
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Adds `column[i]` to every entry of row `i`.
    pub fn add_column(&self, column: &[f64]) -> Matrix {
        assert_eq!(column.len(), self.rows, "Broadcast column has the wrong length");
        let data = self.data.iter().zip(column.iter())
            .map(|(row, &b)| row.iter().map(|&x| x + b).collect())
            .collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }

    /// Sum of each row (collapses the batch dimension).
    pub fn row_sums(&self) -> Vec<f64> {
        self.data.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn frobenius_norm(&self) -> f64 {
        self.data.iter().flatten().map(|x| x * x).sum::<f64>().sqrt()
    }

    /// Reorders columns so that new column `j` is old column `permutation[j]`.
    pub fn permute_columns(&mut self, permutation: &[usize]) {
        assert_eq!(permutation.len(), self.cols, "permutation length must equal column count");
        for row in &mut self.data {
            let old = row.clone();
            for (j, &src) in permutation.iter().enumerate() {
                row[j] = old[src];
            }
        }
    }

    /// Row index of the largest entry in column `col`. Ties resolve to the
    /// lowest index; NaN entries are never selected over a number.
    pub fn argmax_column(&self, col: usize) -> usize {
        let mut best = 0;
        let mut best_value = f64::NEG_INFINITY;
        for (i, row) in self.data.iter().enumerate() {
            if row[col] > best_value {
                best = i;
                best_value = row[col];
            }
        }
        best
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        self.zip_map(rhs, |x, y| x + y)
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }
        self.zip_map(rhs, |x, y| x - y)
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res =  Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            let out_row = &mut res.data[i];
            for (k, &a) in self.data[i].iter().enumerate() {
                if a == 0.0 {
                    continue;
                }
                for (out, &b) in out_row.iter_mut().zip(rhs.data[k].iter()) {
                    *out += a * b;
                }
            }
        }

        res
    }
}

impl Add for Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        &self * &rhs
    }
}

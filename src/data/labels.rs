use crate::math::matrix::Matrix;

/// Class labels for a column-aligned split, in either of the two
/// representations datasets ship with.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// One column per example; the true class is the row holding the maximum.
    OneHot(Matrix),
    /// One class index per example.
    Index(Vec<usize>),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::OneHot(m) => m.cols,
            Labels::Index(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True class of example `i`.
    pub fn class_of(&self, i: usize) -> usize {
        match self {
            Labels::OneHot(m) => m.argmax_column(i),
            Labels::Index(v) => v[i],
        }
    }

    /// Largest class index present plus one (0 when empty).
    pub fn class_count(&self) -> usize {
        match self {
            Labels::OneHot(m) => m.rows,
            Labels::Index(v) => v.iter().max().map_or(0, |&c| c + 1),
        }
    }

    /// Target matrix with one one-hot column per example.
    pub fn to_one_hot(&self, n_classes: usize) -> Matrix {
        match self {
            Labels::OneHot(m) => m.clone(),
            Labels::Index(v) => {
                let mut m = Matrix::zeros(n_classes, v.len());
                for (j, &class) in v.iter().enumerate() {
                    m.set(class, j, 1.0);
                }
                m
            }
        }
    }

    /// Reorders examples so that new example `j` is old example `permutation[j]`.
    pub fn permute(&mut self, permutation: &[usize]) {
        match self {
            Labels::OneHot(m) => m.permute_columns(permutation),
            Labels::Index(v) => {
                let old = v.clone();
                for (j, &src) in permutation.iter().enumerate() {
                    v[j] = old[src];
                }
            }
        }
    }

    /// Examples `start..end`.
    pub fn range(&self, start: usize, end: usize) -> Labels {
        match self {
            Labels::OneHot(m) => Labels::OneHot(m.column_range(start, end)),
            Labels::Index(v) => Labels::Index(v[start..end].to_vec()),
        }
    }
}

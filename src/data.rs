//! Data of one optimization instance.

use crate::error::{Error, Result};
use crate::index::IndexSet;
use ndarray::Array1;
use sprs::{CsMat, TriMat};

/// Tolerance used to classify rows and to discard negligible violations.
pub const TOL: f64 = 1e-5;

/// One instance of
///
/// ```text
/// minimize    cᵗx
/// subject to  l ≤ Ax ≤ u
///             x_i integer for i in int_idx
/// ```
///
/// Bounds may be infinite for one-sided rows.
/// The data is checked once at construction and never modified afterwards:
/// derived problems (continuous restrictions, reduced problems) are new values.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData {
    c: Array1<f64>,
    a: CsMat<f64>,
    l: Array1<f64>,
    u: Array1<f64>,
    int_idx: IndexSet,
}

impl ProblemData {
    pub fn new(
        c: Array1<f64>,
        l: Array1<f64>,
        a: CsMat<f64>,
        u: Array1<f64>,
        int_idx: IndexSet,
    ) -> Result<Self> {
        let (m, n) = a.shape();
        if c.len() != n {
            return Err(Error::mismatch("cost vector", n, c.len()));
        }
        if l.len() != m {
            return Err(Error::mismatch("lower bounds", m, l.len()));
        }
        if u.len() != m {
            return Err(Error::mismatch("upper bounds", m, u.len()));
        }
        if int_idx.bound() != n {
            return Err(Error::mismatch("integer index range", n, int_idx.bound()));
        }
        if c.iter().chain(a.data()).any(|v| !v.is_finite()) {
            return Err(Error::Validation("non finite cost or matrix entry".into()));
        }
        for (i, (li, ui)) in l.iter().zip(u.iter()).enumerate() {
            let unreachable = *li == f64::INFINITY || *ui == f64::NEG_INFINITY;
            if li.is_nan() || ui.is_nan() || li > ui || unreachable {
                return Err(Error::Validation(format!(
                    "invalid bounds {li} <= A_{i} x <= {ui}"
                )));
            }
        }
        let a = if a.is_csr() { a } else { a.to_csr() };
        Ok(Self {
            c,
            a,
            l,
            u,
            int_idx,
        })
    }
    /// Instance without integer variables.
    pub fn continuous(c: Array1<f64>, l: Array1<f64>, a: CsMat<f64>, u: Array1<f64>) -> Result<Self> {
        let n = c.len();
        Self::new(c, l, a, u, IndexSet::empty(n))
    }

    pub fn c(&self) -> &Array1<f64> {
        &self.c
    }
    pub fn a(&self) -> &CsMat<f64> {
        &self.a
    }
    pub fn l(&self) -> &Array1<f64> {
        &self.l
    }
    pub fn u(&self) -> &Array1<f64> {
        &self.u
    }
    pub fn int_idx(&self) -> &IndexSet {
        &self.int_idx
    }
    /// Number of variables.
    pub fn n_var(&self) -> usize {
        self.c.len()
    }
    /// Number of constraint rows.
    pub fn n_con(&self) -> usize {
        self.l.len()
    }

    /// Split the rows into equalities (`u - l <= TOL`) and inequalities.
    pub fn eq_ineq(&self) -> (Vec<usize>, Vec<usize>) {
        (0..self.n_con()).partition(|&i| self.u[i] - self.l[i] <= TOL)
    }

    /// Value of the objective at `x`.
    pub fn cost(&self, x: &Array1<f64>) -> f64 {
        debug_assert_eq!(x.len(), self.n_var());
        self.c.dot(x)
    }

    pub fn is_mip(&self) -> bool {
        !self.int_idx.is_empty()
    }

    /// Compute `Ax`.
    pub fn row_products(&self, x: &Array1<f64>) -> Array1<f64> {
        debug_assert_eq!(x.len(), self.n_var());
        self.a
            .outer_iterator()
            .map(|row| row.iter().map(|(j, v)| v * x[j]).sum())
            .collect()
    }

    /// Euclidean norm of every row of `A`.
    pub fn row_norms(&self) -> Array1<f64> {
        self.a
            .outer_iterator()
            .map(|row| row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt())
            .collect()
    }

    /// Same shape: number of variables, of rows, and same integer indices.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.a.shape() == other.a.shape() && self.int_idx == other.int_idx
    }

    /// Continuous restriction where the integer variables are fixed to `values`.
    ///
    /// One row `x_i = values[k]` is appended for the k-th integer index `i`.
    /// The first `n_con()` rows of the result are the rows of `self`.
    pub fn fix_integers(&self, values: &[i64]) -> Result<Self> {
        if values.len() != self.int_idx.len() {
            return Err(Error::mismatch(
                "integer assignment",
                self.int_idx.len(),
                values.len(),
            ));
        }
        let mut builder = RowStack::new(self.n_var());
        builder.push_all(self);
        for (i, &v) in self.int_idx.iter().zip(values) {
            builder.push_unit(i, v as f64);
        }
        builder.build(self.c.clone())
    }
}

/// Incremental construction of a new constraint matrix, row by row.
///
/// Used to build the continuous restriction and the reduced problems.
#[derive(Debug, Clone)]
pub(crate) struct RowStack {
    n_var: usize,
    triplets: Vec<(usize, usize, f64)>,
    l: Vec<f64>,
    u: Vec<f64>,
}

impl RowStack {
    pub fn new(n_var: usize) -> Self {
        Self {
            n_var,
            triplets: Vec::new(),
            l: Vec::new(),
            u: Vec::new(),
        }
    }
    pub fn len(&self) -> usize {
        self.l.len()
    }
    /// Append row `i` of `data` with bounds `lower <= . <= upper`.
    pub fn push_row(&mut self, data: &ProblemData, i: usize, lower: f64, upper: f64) {
        let row = self.len();
        if let Some(vec) = data.a.outer_view(i) {
            for (j, &v) in vec.iter() {
                self.triplets.push((row, j, v))
            }
        }
        self.l.push(lower);
        self.u.push(upper);
    }
    /// Append every row of `data` with its own bounds.
    pub fn push_all(&mut self, data: &ProblemData) {
        for i in 0..data.n_con() {
            self.push_row(data, i, data.l[i], data.u[i])
        }
    }
    /// Append the equality `x_j = value`.
    pub fn push_unit(&mut self, j: usize, value: f64) {
        self.triplets.push((self.len(), j, 1.));
        self.l.push(value);
        self.u.push(value);
    }
    pub fn build(self, c: Array1<f64>) -> Result<ProblemData> {
        let mut tri = TriMat::new((self.l.len(), self.n_var));
        for (i, j, v) in self.triplets {
            tri.add_triplet(i, j, v)
        }
        ProblemData::continuous(c, Array1::from(self.l), tri.to_csr(), Array1::from(self.u))
    }
}

/// Build a sparse matrix from dense rows. Mostly handy in tests and demos.
pub fn csr_from_rows(rows: &[Vec<f64>], n_cols: usize) -> CsMat<f64> {
    let mut tri = TriMat::new((rows.len(), n_cols));
    for (i, row) in rows.iter().enumerate() {
        debug_assert_eq!(row.len(), n_cols);
        for (j, &v) in row.iter().enumerate() {
            if v != 0. {
                tri.add_triplet(i, j, v)
            }
        }
    }
    tri.to_csr()
}

//! Validated sequences of row or column indices.

use crate::error::{Error, Result};
use std::ops::Index;

/// An ordered sequence of distinct indices, all below a known bound.
///
/// The order is the one given at construction: it is the order in which
/// the integer values of a `Strategy` are stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct IndexSet {
    indices: Vec<usize>,
    bound: usize,
}

impl IndexSet {
    /// Check that every index is `< bound` and appears once.
    pub fn new(indices: Vec<usize>, bound: usize) -> Result<Self> {
        let mut seen = vec![false; bound];
        for &i in &indices {
            if i >= bound {
                return Err(Error::Validation(format!(
                    "index {i} out of range [0, {bound})"
                )));
            }
            if seen[i] {
                return Err(Error::Validation(format!("index {i} repeated")));
            }
            seen[i] = true;
        }
        Ok(Self { indices, bound })
    }
    /// The empty set over `[0, bound)`.
    pub fn empty(bound: usize) -> Self {
        Self {
            indices: Vec::new(),
            bound,
        }
    }
    /// All indices of `[0, bound)` satisfying `pred`, in increasing order.
    pub fn filter<P>(bound: usize, pred: P) -> Self
    where
        P: FnMut(&usize) -> bool,
    {
        Self {
            indices: (0..bound).filter(pred).collect(),
            bound,
        }
    }
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn bound(&self) -> usize {
        self.bound
    }
    pub fn contains(&self, i: usize) -> bool {
        self.indices.contains(&i)
    }
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }
    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }
    /// Gather the entries of `values` at these indices.
    pub fn select<T: Clone>(&self, values: &[T]) -> Vec<T> {
        debug_assert_eq!(values.len(), self.bound);
        self.indices.iter().map(|&i| values[i].clone()).collect()
    }
}

impl Index<usize> for IndexSet {
    type Output = usize;

    fn index(&self, k: usize) -> &usize {
        &self.indices[k]
    }
}

//! Batches of instances of a parametric family.

use crate::data::ProblemData;
use crate::error::{Error, Result};
use crate::problem::OptimizationProblem;
use crate::solvers::{SolverId, SolverSettings};
use crate::strategy::Strategy;
use log::*;
use ndarray::{Array1, Array2, ArrayView1};
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

/// A family of instances sharing their structure, indexed by a parameter
/// vector `theta`.
///
/// `build_instance` must be pure: the instance depends on `theta` only.
pub trait ParametricFamily: Sync {
    fn build_instance(&self, theta: ArrayView1<'_, f64>) -> Result<ProblemData>;
}

impl<F> ParametricFamily for F
where
    F: for<'a> Fn(ArrayView1<'a, f64>) -> Result<ProblemData> + Sync,
{
    fn build_instance(&self, theta: ArrayView1<'_, f64>) -> Result<ProblemData> {
        self(theta)
    }
}

/// Solutions, solve times and strategies of a batch, aligned with the rows
/// of the parameter table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametricSolution {
    pub x: Vec<Array1<f64>>,
    pub time: Vec<f64>,
    pub strategy: Vec<Strategy>,
}

impl ParametricSolution {
    pub fn len(&self) -> usize {
        self.x.len()
    }
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
    pub fn push(&mut self, (x, time, strategy): (Array1<f64>, f64, Strategy)) {
        self.x.push(x);
        self.time.push(time);
        self.strategy.push(strategy);
    }
    /// Distinct strategies, in order of first appearance.
    pub fn unique_strategies(&self) -> Vec<Strategy> {
        let mut seen = HashSet::new();
        self.strategy
            .iter()
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }
    pub fn into_parts(self) -> (Vec<Array1<f64>>, Vec<f64>, Vec<Strategy>) {
        (self.x, self.time, self.strategy)
    }
    /// Write the batch to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        info!("Saving {} samples to {}", self.len(), path.display());
        let buf = BufWriter::new(File::create(path)?);
        bincode::serialize_into(buf, self)?;
        Ok(())
    }
    /// Read a batch written by `save`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading {}", path.display());
        let mut buf = BufReader::new(File::open(path)?);
        let data: Self = bincode::deserialize_from(&mut buf)?;
        if data.time.len() != data.len() || data.strategy.len() != data.len() {
            return Err(Error::Validation(format!(
                "{} holds misaligned samples",
                path.display()
            )));
        }
        Ok(data)
    }
}

impl FromIterator<(Array1<f64>, f64, Strategy)> for ParametricSolution {
    fn from_iter<I: IntoIterator<Item = (Array1<f64>, f64, Strategy)>>(iter: I) -> Self {
        let mut res = Self::default();
        for sample in iter {
            res.push(sample)
        }
        res
    }
}

impl OptimizationProblem {
    /// The instance of `family` at `theta`, sharing the solvers of `self`.
    ///
    /// The instance must have the shape of `self` so that strategies can be
    /// exchanged between them.
    pub fn instance<F: ParametricFamily + ?Sized>(
        &self,
        family: &F,
        theta: ArrayView1<'_, f64>,
    ) -> Result<Self> {
        let data = family.build_instance(theta)?;
        let nominal = self.data();
        if data.n_var() != nominal.n_var() {
            return Err(Error::mismatch("variables", nominal.n_var(), data.n_var()));
        }
        if data.n_con() != nominal.n_con() {
            return Err(Error::mismatch("constraints", nominal.n_con(), data.n_con()));
        }
        if !data.same_shape(nominal) {
            return Err(Error::Validation(
                "instance has different integer variables".into(),
            ));
        }
        Ok(self.with_data(data))
    }

    /// Solve the instance of `family` for every row of `theta`.
    ///
    /// The first failure aborts the batch.
    pub fn solve_parametric<F: ParametricFamily + ?Sized>(
        &self,
        family: &F,
        theta: &Array2<f64>,
        solver: SolverId,
        settings: &SolverSettings,
    ) -> Result<ParametricSolution> {
        let n = theta.nrows();
        info!("Solving for all theta ({} samples)", n);
        let start = Instant::now();
        let mut res = ParametricSolution::default();
        for (i, row) in theta.outer_iter().enumerate() {
            let sample = self.instance(family, row)?.solve(solver, settings)?;
            debug!("Sample {}/{}: {}", i + 1, n, sample.2);
            res.push(sample);
        }
        info!(
            "Solved {} samples in {:.2}s, {} distinct strategies",
            n,
            start.elapsed().as_secs_f64(),
            res.unique_strategies().len()
        );
        Ok(res)
    }

    /// Same as [`solve_parametric`](Self::solve_parametric), the samples being
    /// solved in parallel.
    pub fn solve_parametric_par<F: ParametricFamily + ?Sized>(
        &self,
        family: &F,
        theta: &Array2<f64>,
        solver: SolverId,
        settings: &SolverSettings,
    ) -> Result<ParametricSolution> {
        let n = theta.nrows();
        info!("Solving for all theta ({} samples, parallel)", n);
        let start = Instant::now();
        let samples = (0..n)
            .into_par_iter()
            .map(|i| self.instance(family, theta.row(i))?.solve(solver, settings))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Solved {} samples in {:.2}s",
            n,
            start.elapsed().as_secs_f64()
        );
        Ok(samples.into_iter().collect())
    }
}

//! Configuration passed to the solvers.

use super::SolverId;
use std::time::Duration;

/// Solver settings.
///
/// Every field has a default, so partial configurations can be deserialized.
/// Custom adapters are free to ignore the fields they have no use for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Pivoting and feasibility tolerance of the simplex.
    pub tol: f64,
    /// Relative slack below which a row is reported active.
    pub active_tol: f64,
    /// Distance to the nearest integer below which a value counts as integer.
    pub int_tol: f64,
    /// Maximum number of simplex pivots per LP.
    pub max_iter: usize,
    /// Maximum number of branch and bound nodes.
    pub max_nodes: usize,
    /// Wall-clock limit of one solve, in seconds.
    pub time_limit: Option<f64>,
    /// Log each solve at info level instead of debug.
    pub verbose: bool,
    /// Solver run on failure to cross-check the status. Purely diagnostic.
    pub verify_with: Option<SolverId>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tol: 1e-9,
            active_tol: 1e-7,
            int_tol: 1e-6,
            max_iter: 50_000,
            max_nodes: 100_000,
            time_limit: None,
            verbose: false,
            verify_with: None,
        }
    }
}

impl SolverSettings {
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }
    pub fn verify_with(mut self, solver: SolverId) -> Self {
        self.verify_with = Some(solver);
        self
    }
    /// `None` when there is no limit or when it exceeds what a `Duration` holds.
    pub(crate) fn time_budget(&self) -> Option<Duration> {
        self.time_limit
            .and_then(|t| Duration::try_from_secs_f64(t).ok())
    }
    pub(crate) fn log_level(&self) -> log::Level {
        if self.verbose {
            log::Level::Info
        } else {
            log::Level::Debug
        }
    }
}

//! Termination statuses reported by the solvers.

use std::fmt;
use std::fmt::Display;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Optimal,
    /// A solution was found but optimality could not be fully certified
    /// (e.g. branch and bound stopped at its node limit).
    OptimalInaccurate,
    Infeasible,
    Unbounded,
    MaxIterReached,
    TimeLimit,
    Error,
}

/// Statuses for which the result carries a meaningful solution.
pub const SOLUTION_PRESENT: [Status; 2] = [Status::Optimal, Status::OptimalInaccurate];

impl Status {
    pub fn solution_present(self) -> bool {
        SOLUTION_PRESENT.contains(&self)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Status::Optimal => "optimal",
            Status::OptimalInaccurate => "optimal inaccurate",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::MaxIterReached => "max iterations reached",
            Status::TimeLimit => "time limit reached",
            Status::Error => "solver error",
        };
        write!(f, "{name}")
    }
}

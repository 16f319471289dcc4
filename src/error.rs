//! Error type shared by the whole crate.

use crate::data::ProblemData;
use crate::solvers::{SolverId, Status};
use std::io;
use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

/// Errors raised while building, solving or re-solving a problem.
///
/// `Solver` is the expected outcome of a bad strategy prediction, the other
/// variants point at a defect in the caller or in the data.
#[derive(Error, Debug)]
pub enum Error {
    /// The solver returned without a solution.
    #[error("Problem not solved. Status {status}")]
    Solver {
        status: Status,
        data: Box<ProblemData>,
    },
    /// Invalid content (bounds, indices, strategy entries).
    #[error("Validation failed: {0}")]
    Validation(String),
    /// Incompatible matrix/vector shapes.
    #[error("Dimension mismatch for {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// No adapter registered under this identifier.
    #[error("No solver registered for {0:?}")]
    UnknownSolver(SolverId),
    #[error("Error while parsing problem file: {0}")]
    Parse(String),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Serialization(#[from] bincode::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn mismatch(what: &'static str, expected: usize, found: usize) -> Self {
        Error::DimensionMismatch {
            what,
            expected,
            found,
        }
    }
    /// True if the error reports a failed solve rather than a defect.
    pub fn is_solver_failure(&self) -> bool {
        matches!(self, Error::Solver { .. })
    }
}

impl From<ParseIntError> for Error {
    fn from(e: ParseIntError) -> Self {
        Error::Parse(format!("{}", e))
    }
}

impl From<ParseFloatError> for Error {
    fn from(e: ParseFloatError) -> Self {
        Error::Parse(format!("{}", e))
    }
}

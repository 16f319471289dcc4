//! Combinatorial certificates of optimality.

use crate::error::{Error, Result};
use std::fmt;
use std::fmt::Display;

/// Which side of a constraint row is tight at the optimum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Activity {
    /// `A_i x = l_i`
    Lower,
    /// Strictly between the bounds.
    Inactive,
    /// `A_i x = u_i`
    Upper,
}

impl Activity {
    /// `-1`, `0` or `+1`.
    pub fn to_trit(self) -> i8 {
        match self {
            Activity::Lower => -1,
            Activity::Inactive => 0,
            Activity::Upper => 1,
        }
    }
    pub fn from_trit(v: i8) -> Result<Self> {
        match v {
            -1 => Ok(Activity::Lower),
            0 => Ok(Activity::Inactive),
            1 => Ok(Activity::Upper),
            _ => Err(Error::Validation(format!("{v} is not a constraint activity"))),
        }
    }
    pub fn is_active(self) -> bool {
        self != Activity::Inactive
    }
}

/// How an instance was solved: the values taken by the integer variables
/// (in the order of the instance's integer indices) and the activity of every
/// constraint row.
///
/// A strategy does not refer to the instance that produced it, so it can be
/// applied to any instance of the same shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strategy {
    pub int_vars: Vec<i64>,
    pub active_constraints: Vec<Activity>,
}

impl Strategy {
    pub fn new(int_vars: Vec<i64>, active_constraints: Vec<Activity>) -> Self {
        Self {
            int_vars,
            active_constraints,
        }
    }
    /// Build a strategy from `-1/0/+1` entries.
    pub fn from_trits(int_vars: Vec<i64>, trits: &[i8]) -> Result<Self> {
        let active_constraints = trits
            .iter()
            .map(|&v| Activity::from_trit(v))
            .collect::<Result<_>>()?;
        Ok(Self::new(int_vars, active_constraints))
    }
    pub fn trits(&self) -> Vec<i8> {
        self.active_constraints.iter().map(|a| a.to_trit()).collect()
    }
    /// Rows tight at their lower bound, in increasing order.
    pub fn lower_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows_with(Activity::Lower)
    }
    /// Rows tight at their upper bound, in increasing order.
    pub fn upper_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows_with(Activity::Upper)
    }
    fn rows_with(&self, activity: Activity) -> impl Iterator<Item = usize> + '_ {
        self.active_constraints
            .iter()
            .enumerate()
            .filter(move |(_, a)| **a == activity)
            .map(|(i, _)| i)
    }
    /// Number of tight rows.
    pub fn n_active(&self) -> usize {
        self.active_constraints
            .iter()
            .filter(|a| a.is_active())
            .count()
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "int {:?} active [", self.int_vars)?;
        for a in &self.active_constraints {
            let c = match a {
                Activity::Lower => '-',
                Activity::Inactive => '.',
                Activity::Upper => '+',
            };
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}

//! Plain-text format for instances.
//!
//! ```text
//! * comment
//! n m k
//! c_0 ... c_{n-1}
//! l_0 ... l_{m-1}
//! u_0 ... u_{m-1}
//! int_0 ... int_{k-1}
//! row col value
//! ...
//! ```
//! One `row col value` line per nonzero of A, indices starting at 0.
//! Infinite bounds are written `inf` and `-inf`.

use crate::data::ProblemData;
use crate::error::{Error, Result};
use crate::index::IndexSet;
use log::*;
use ndarray::Array1;
use sprs::TriMat;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

// A nonzero of the constraint matrix
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    row: usize,
    col: usize,
    val: f64,
}

impl FromStr for Entry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut iter = s.split_whitespace();
        let mut next = || {
            iter.next()
                .ok_or_else(|| Error::Parse(format!("less than 3 elements in {:?}", s)))
        };
        let result = Entry {
            row: next()?.parse()?,
            col: next()?.parse()?,
            val: next()?.parse()?,
        };
        if iter.next().is_some() {
            return Err(Error::Parse(format!("more than 3 elements in {:?}", s)));
        };
        Ok(result)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.row, self.col, self.val)
    }
}

fn write_vec<W: Write, T: Display>(w: &mut W, v: impl IntoIterator<Item = T>) -> Result<()> {
    let mut first = true;
    for x in v {
        if !first {
            write!(w, " ")?;
        }
        write!(w, "{}", x)?;
        first = false;
    }
    writeln!(w)?;
    Ok(())
}

// Blank lines are skipped by the reader, so an empty vector takes no line.
fn parse_vec<T, I>(lines: &mut I, len: usize, what: &'static str) -> Result<Vec<T>>
where
    T: FromStr,
    Error: From<T::Err>,
    I: Iterator<Item = String>,
{
    if len == 0 {
        return Ok(Vec::new());
    }
    let line = lines
        .next()
        .ok_or_else(|| Error::Parse(format!("missing {}", what)))?;
    let v = line
        .split_whitespace()
        .map(|x| x.parse::<T>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    if v.len() != len {
        return Err(Error::Parse(format!(
            "expected {} values for {}, found {}",
            len,
            what,
            v.len()
        )));
    }
    Ok(v)
}

impl ProblemData {
    /// Write the instance to `path` in plain text.
    pub fn write(&self, path: &Path) -> Result<()> {
        debug!("Writing instance to {}", path.display());
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "* n m k")?;
        writeln!(w, "{} {} {}", self.n_var(), self.n_con(), self.int_idx().len())?;
        write_vec(&mut w, self.c())?;
        write_vec(&mut w, self.l())?;
        write_vec(&mut w, self.u())?;
        write_vec(&mut w, self.int_idx().iter())?;
        for (&val, (row, col)) in self.a().iter() {
            let entry = Entry { row, col, val };
            writeln!(w, "{}", entry)?;
        }
        w.flush()?;
        Ok(())
    }

    /// Read an instance written by [`write`](Self::write).
    ///
    /// The instance goes through the checks of [`new`](Self::new).
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading instance from {}", path.display());
        let buf = BufReader::new(File::open(path)?);
        let mut lines = buf
            .lines()
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .filter(|line| {
                let l = line.trim_start();
                !l.starts_with('*') && !l.is_empty()
            });
        let header: Vec<usize> = parse_vec(&mut lines, 3, "header")?;
        let (n, m, k) = (header[0], header[1], header[2]);
        let c: Vec<f64> = parse_vec(&mut lines, n, "cost vector")?;
        let l: Vec<f64> = parse_vec(&mut lines, m, "lower bounds")?;
        let u: Vec<f64> = parse_vec(&mut lines, m, "upper bounds")?;
        let int_idx: Vec<usize> = parse_vec(&mut lines, k, "integer indices")?;
        let mut a = TriMat::new((m, n));
        for line in lines {
            let e: Entry = line.parse()?;
            if e.row >= m || e.col >= n {
                return Err(Error::Parse(format!(
                    "entry ({}, {}) out of a {}x{} matrix",
                    e.row, e.col, m, n
                )));
            }
            a.add_triplet(e.row, e.col, e.val);
        }
        Self::new(
            Array1::from(c),
            Array1::from(l),
            a.to_csr(),
            Array1::from(u),
            IndexSet::new(int_idx, n)?,
        )
    }
}

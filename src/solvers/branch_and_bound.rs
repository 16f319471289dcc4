//! Depth-first branch and bound over the simplex relaxations.

use super::simplex::{self, DenseLp, LpOutcome};
use super::status::Status;
use crate::index::IndexSet;
use log::*;
use ndarray::Array1;
use std::time::Instant;

/// A node of the search tree: bounds on the variables.
#[derive(Debug, Clone)]
struct Node {
    lb: Vec<f64>,
    ub: Vec<f64>,
    depth: usize,
}

/// Limits and tolerances of the search.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Limits {
    pub tol: f64,
    pub int_tol: f64,
    pub max_iter: usize,
    pub max_nodes: usize,
    pub deadline: Option<Instant>,
}

/// Integer index whose value is the farthest from an integer, if any.
fn most_fractional(x: &Array1<f64>, int_idx: &IndexSet, int_tol: f64) -> Option<usize> {
    int_idx
        .iter()
        .map(|j| (j, (x[j] - x[j].round()).abs()))
        .filter(|&(_, frac)| frac > int_tol)
        .max_by(|(_, f1), (_, f2)| f1.total_cmp(f2))
        .map(|(j, _)| j)
}

pub(crate) fn solve(lp: &DenseLp, int_idx: &IndexSet, limits: Limits) -> LpOutcome {
    let n = lp.n_var();
    let mut stack = vec![Node {
        lb: vec![f64::NEG_INFINITY; n],
        ub: vec![f64::INFINITY; n],
        depth: 0,
    }];
    let mut incumbent: Option<(Array1<f64>, f64)> = None;
    let mut nodes = 0;
    let mut iterations = 0;
    let mut interrupted = None;

    while let Some(node) = stack.pop() {
        if nodes >= limits.max_nodes {
            interrupted = Some(Status::MaxIterReached);
            break;
        }
        if limits.deadline.is_some_and(|d| Instant::now() > d) {
            interrupted = Some(Status::TimeLimit);
            break;
        }
        nodes += 1;
        let relax = simplex::solve(
            lp,
            &node.lb,
            &node.ub,
            limits.tol,
            limits.max_iter,
            limits.deadline,
        );
        iterations += relax.iterations;
        match relax.status {
            Status::Optimal => (),
            Status::Infeasible => continue,
            Status::TimeLimit => {
                interrupted = Some(Status::TimeLimit);
                break;
            }
            status => {
                debug!("Relaxation at depth {} returned {}", node.depth, status);
                return LpOutcome::failed(status, n, iterations);
            }
        }
        if let Some((_, best)) = &incumbent {
            if relax.objective >= best - limits.tol * (1. + best.abs()) {
                continue;
            }
        }
        match most_fractional(&relax.x, int_idx, limits.int_tol) {
            None => {
                let mut x = relax.x;
                for j in int_idx.iter() {
                    x[j] = x[j].round()
                }
                let objective = lp.c.dot(&x);
                trace!("New incumbent {} at depth {}", objective, node.depth);
                incumbent = Some((x, objective));
            }
            Some(j) => {
                let v = relax.x[j];
                let mut down = node.clone();
                down.ub[j] = down.ub[j].min(v.floor());
                down.depth += 1;
                let mut up = node;
                up.lb[j] = up.lb[j].max(v.ceil());
                up.depth += 1;
                // The closest child is explored first
                if v - v.floor() < 0.5 {
                    stack.push(up);
                    stack.push(down);
                } else {
                    stack.push(down);
                    stack.push(up);
                }
            }
        }
    }
    debug!("Branch and bound explored {} nodes", nodes);

    match (incumbent, interrupted) {
        (Some((x, objective)), interrupted) => LpOutcome {
            status: if interrupted.is_some() {
                Status::OptimalInaccurate
            } else {
                Status::Optimal
            },
            x,
            objective,
            iterations,
        },
        (None, Some(status)) => LpOutcome::failed(status, n, iterations),
        (None, None) => LpOutcome::failed(Status::Infeasible, n, iterations),
    }
}

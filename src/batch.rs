//! Console scoring of saved solutions.

use crate::constraint::{self, EdgeStatus, Globalist};
use crate::error::{Error, Result};
use crate::geom::Point;
use crate::problem::{read_solution_from_file, Problem};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub dislike: f64,
    pub globalist: Globalist,
    pub edges: Vec<EdgeStatus>,
}

impl Report {
    pub fn invalid_edges(&self) -> usize {
        self.edges.iter().filter(|s| !s.is_valid()).count()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dislike {}, globalist {:.6}/{:.6}{}, {} of {} edges out of tolerance",
            self.dislike,
            self.globalist.current,
            self.globalist.limit,
            if self.globalist.within_budget() { "" } else { " (over budget)" },
            self.invalid_edges(),
            self.edges.len()
        )
    }
}

pub fn score(problem: &Problem, pose: &[Point]) -> Result<Report> {
    if pose.len() != problem.figure.vertices.len() {
        return Err(Error::PoseLength {
            expected: problem.figure.vertices.len(),
            actual: pose.len(),
        });
    }
    Ok(Report {
        dislike: constraint::dislike(&problem.hole, pose),
        globalist: constraint::globalist(&problem.figure, pose, problem.epsilon),
        edges: constraint::edge_statuses(problem, pose),
    })
}

pub fn score_file(problem: &Problem, path: &Path) -> Result<Report> {
    let solution = read_solution_from_file(path)?;
    score(problem, &solution.vertices)
}

/// Scores every file in parallel, keeping the input order.
pub fn score_files(problem: &Problem, paths: &[PathBuf]) -> Vec<(PathBuf, Result<Report>)> {
    paths
        .par_iter()
        .map(|path| (path.clone(), score_file(problem, path)))
        .collect()
}

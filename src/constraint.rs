//! Edge tolerance arithmetic and pose scoring.
//!
//! Every length here is a *squared* length. Epsilon is expressed in parts per
//! million of the squared original length.

use crate::geom::{distance2, Point};
use crate::problem::{Figure, Problem};

pub const PPM: f64 = 1_000_000.0;

/// Added to every margin so that exact boundary values are not misclassified
/// through float rounding.
pub const MARGIN_SLACK: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeStatus {
    /// Too short.
    Compressed,
    Valid,
    /// Too long.
    Stretched,
}

impl EdgeStatus {
    pub fn is_valid(self) -> bool {
        self == EdgeStatus::Valid
    }
}

/// Allowed squared-length band `[min, max]` for one edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub min: f64,
    pub max: f64,
}

impl Tolerance {
    pub fn new(original2: f64, epsilon: i64) -> Self {
        let margin = original2 * epsilon as f64 / PPM + MARGIN_SLACK;
        Tolerance {
            min: original2 - margin,
            max: original2 + margin,
        }
    }

    pub fn contains(&self, current2: f64) -> bool {
        current2 >= self.min && current2 <= self.max
    }

    pub fn classify(&self, current2: f64) -> EdgeStatus {
        if current2 < self.min {
            EdgeStatus::Compressed
        } else if current2 > self.max {
            EdgeStatus::Stretched
        } else {
            EdgeStatus::Valid
        }
    }
}

/// Classifies an edge of squared length `current2` whose undeformed squared
/// length is `original2`. A zero length original edge has no meaningful band
/// and always reports `Valid`.
pub fn classify(current2: f64, original2: f64, epsilon: i64) -> EdgeStatus {
    if original2 == 0.0 {
        return EdgeStatus::Valid;
    }
    Tolerance::new(original2, epsilon).classify(current2)
}

/// Whether a figure edge of squared length `original2` could be stretched onto
/// a segment of squared length `target2`.
pub fn edge_matches(target2: f64, original2: f64, epsilon: i64) -> bool {
    if original2 == 0.0 {
        return false;
    }
    (target2 / original2 - 1.0).abs() <= epsilon as f64 / PPM + MARGIN_SLACK
}

/// Status of every figure edge under `pose`, in edge order. Edges with a
/// missing endpoint are reported as `Valid`.
pub fn edge_statuses(problem: &Problem, pose: &[Point]) -> Vec<EdgeStatus> {
    let figure = &problem.figure;
    figure
        .edges
        .iter()
        .map(|&(a, b)| {
            if a >= figure.vertices.len() || b >= figure.vertices.len() || a >= pose.len() || b >= pose.len() {
                return EdgeStatus::Valid;
            }
            classify(
                distance2(pose[a], pose[b]),
                figure.original_length2((a, b)),
                problem.epsilon,
            )
        })
        .collect()
}

/// Sum over hole vertices of the squared distance to the closest pose vertex.
/// An empty pose contributes nothing.
pub fn dislike(hole: &[Point], pose: &[Point]) -> f64 {
    hole.iter()
        .map(|h| {
            pose.iter()
                .map(|p| distance2(*p, *h))
                .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
                .unwrap_or(0.0)
        })
        .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Globalist {
    pub current: f64,
    pub limit: f64,
}

impl Globalist {
    pub fn within_budget(&self) -> bool {
        self.current <= self.limit
    }
}

/// Aggregate deformation of `pose` against `figure`.
///
/// The per-edge term is `|d² / o² - 1|`, a ratio of squared lengths; scores
/// computed elsewhere rely on exactly this formula.
pub fn globalist(figure: &Figure, pose: &[Point], epsilon: i64) -> Globalist {
    let mut current = 0.0;
    for (_, (a, b)) in figure.valid_edges() {
        if a >= pose.len() || b >= pose.len() {
            continue;
        }
        let original2 = figure.original_length2((a, b));
        if original2 == 0.0 {
            continue;
        }
        let dist2 = distance2(pose[a], pose[b]);
        current += (dist2 / original2 - 1.0).abs();
    }
    Globalist {
        current,
        limit: epsilon as f64 * figure.edges.len() as f64 / PPM,
    }
}

use crate::constraint::Tolerance;
use crate::geom::{distance2, nearest, Point};
use crate::problem::Problem;
use itertools::Itertools;

/// Integer offsets up to this euclidean length around the cursor are searched.
pub const SNAP_RADIUS: i32 = 5;

/// A snap target further than this many canvas pixels from the cursor is ignored.
pub const SNAP_THRESHOLD_PX: f64 = 30.0;

/// Grid points near `cursor` at which every edge of `vertex` stays within its
/// band, measured against the neighbours' current positions.
pub fn grid_candidates(problem: &Problem, pose: &[Point], vertex: usize, cursor: Point) -> Vec<Point> {
    let figure = &problem.figure;
    let bands: Vec<(Point, Tolerance)> = figure
        .adjacent(vertex)
        .into_iter()
        .filter(|&adjacent| adjacent < pose.len() && vertex < figure.vertices.len())
        .map(|adjacent| {
            let original2 = figure.original_length2((adjacent, vertex));
            (pose[adjacent], Tolerance::new(original2, problem.epsilon))
        })
        .collect();

    (-SNAP_RADIUS..=SNAP_RADIUS)
        .cartesian_product(-SNAP_RADIUS..=SNAP_RADIUS)
        .filter(|&(dy, dx)| dx * dx + dy * dy <= SNAP_RADIUS * SNAP_RADIUS)
        .map(|(dy, dx)| (cursor + Point::new(dx as f64, dy as f64)).round())
        .filter(|p| bands.iter().all(|(center, band)| band.contains(distance2(*center, *p))))
        .collect()
}

/// Every snap target for `vertex`: bonus positions, hole vertices, then the
/// valid grid points around `cursor`.
pub fn candidates(problem: &Problem, pose: &[Point], vertex: usize, cursor: Point) -> Vec<Point> {
    problem
        .bonuses
        .iter()
        .map(|b| b.position)
        .chain(problem.hole.iter().copied())
        .chain(grid_candidates(problem, pose, vertex, cursor))
        .collect()
}

/// Position for `vertex` dragged to model-space `cursor` with snapping on.
///
/// The closest candidate wins if it lies within `SNAP_THRESHOLD_PX` at the
/// current `zoom`; otherwise the cursor itself is used. The result is always on
/// the integer grid.
pub fn snap(problem: &Problem, pose: &[Point], vertex: usize, cursor: Point, zoom: f64) -> Point {
    let threshold = SNAP_THRESHOLD_PX / zoom;
    let snapped = match nearest(&candidates(problem, pose, vertex, cursor), cursor) {
        Some((_, target)) if distance2(target, cursor).sqrt() < threshold => target,
        _ => cursor,
    };
    snapped.round()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Bonus, BonusKind, Figure};

    fn segment(epsilon: i64) -> Problem {
        Problem {
            hole: vec![],
            figure: Figure {
                edges: vec![(0, 1)],
                vertices: vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
            },
            epsilon,
            bonuses: vec![],
        }
    }

    #[test]
    fn grid_candidates_respect_every_edge() {
        let problem = segment(0);
        let pose = problem.figure.vertices.clone();
        let found = grid_candidates(&problem, &pose, 1, Point::new(10.2, 0.3));
        assert!(!found.is_empty());
        for p in &found {
            assert_eq!(distance2(*p, pose[0]), 100.0);
        }
        assert!(found.contains(&Point::new(10.0, 0.0)));
        assert!(!found.contains(&Point::new(10.0, 1.0)));
    }

    #[test]
    fn unconstrained_vertex_sees_whole_disc() {
        let problem = Problem {
            figure: Figure {
                edges: vec![],
                vertices: vec![Point::ZERO],
            },
            ..Problem::default()
        };
        let found = grid_candidates(&problem, &[Point::ZERO], 0, Point::ZERO);
        // Lattice points with x² + y² <= 25.
        assert_eq!(found.len(), 81);
    }

    #[test]
    fn snaps_to_the_valid_grid_point() {
        let problem = segment(0);
        let pose = problem.figure.vertices.clone();
        let p = snap(&problem, &pose, 1, Point::new(8.3, 5.6), 1.0);
        assert_eq!(p, Point::new(8.0, 6.0));
    }

    #[test]
    fn candidate_at_the_cursor_is_always_taken() {
        let mut problem = segment(0);
        problem.bonuses.push(Bonus {
            bonus: BonusKind::Globalist,
            position: Point::new(40.0, 40.0),
            problem: 3,
        });
        let pose = problem.figure.vertices.clone();
        let p = snap(&problem, &pose, 1, Point::new(40.0, 40.0), 20.0);
        assert_eq!(p, Point::new(40.0, 40.0));
    }

    #[test]
    fn distant_candidates_fall_back_to_the_rounded_cursor() {
        let mut problem = segment(0);
        problem.hole = vec![Point::new(50.0, 50.0)];
        let pose = problem.figure.vertices.clone();
        // No grid point near the cursor is 10 away from vertex 0, and the hole
        // vertex is ~28 away, beyond 30 / 2.
        let p = snap(&problem, &pose, 1, Point::new(30.4, 29.6), 2.0);
        assert_eq!(p, Point::new(30.0, 30.0));
    }

    #[test]
    fn hole_vertex_within_threshold_wins() {
        let mut problem = segment(0);
        problem.hole = vec![Point::new(50.0, 50.0)];
        let pose = problem.figure.vertices.clone();
        let p = snap(&problem, &pose, 1, Point::new(45.0, 45.0), 1.0);
        assert_eq!(p, Point::new(50.0, 50.0));
    }
}

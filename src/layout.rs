//! Spring/repulsion relayout of a figure, used to untangle a pose.
//!
//! This is not a solver: the simulation only knows the graph topology, and the
//! result is afterwards rescaled so that edges have their original lengths on
//! average.

use crate::geom::{distance2, Point};
use crate::problem::{Edge, Figure};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_SEED: u64 = 0x5eed;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSettings {
    /// Rest length of every spring.
    pub spring_length: f64,
    pub spring_coefficient: f64,
    /// Negative values repel.
    pub gravity: f64,
    pub drag_coefficient: f64,
    pub time_step: f64,
    /// Per step speed cap.
    pub max_speed: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            spring_length: 30.0,
            spring_coefficient: 0.0008,
            gravity: -1.2,
            drag_coefficient: 0.02,
            time_step: 20.0,
            max_speed: 1.0,
        }
    }
}

struct Body {
    pos: Point,
    velocity: Point,
    force: Point,
    mass: f64,
}

pub struct ForceLayout {
    settings: LayoutSettings,
    bodies: Vec<Body>,
    edges: Vec<Edge>,
    rng: StdRng,
}

impl ForceLayout {
    /// Seeds one body per position. Edges with an endpoint outside
    /// `positions` are dropped.
    pub fn new(positions: &[Point], edges: &[Edge], settings: LayoutSettings, seed: u64) -> Self {
        let n = positions.len();
        let edges: Vec<Edge> = edges.iter().copied().filter(|&(a, b)| a < n && b < n && a != b).collect();
        let mut degree = vec![0usize; n];
        for &(a, b) in &edges {
            degree[a] += 1;
            degree[b] += 1;
        }
        let bodies = positions
            .iter()
            .zip(degree)
            .map(|(pos, d)| Body {
                pos: *pos,
                velocity: Point::ZERO,
                force: Point::ZERO,
                mass: 1.0 + d as f64 / 3.0,
            })
            .collect();
        ForceLayout {
            settings,
            bodies,
            edges,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Separation from `from` to `to`, nudged randomly when they coincide.
    fn separation(&mut self, from: Point, to: Point) -> (Point, f64) {
        let mut delta = to - from;
        let mut r = delta.magnitude();
        if r == 0.0 {
            delta = Point::new(
                self.rng.gen_range(-0.5..0.5) / 50.0,
                self.rng.gen_range(-0.5..0.5) / 50.0,
            );
            r = delta.magnitude();
            if r == 0.0 {
                delta = Point::new(1e-3, 0.0);
                r = 1e-3;
            }
        }
        (delta, r)
    }

    pub fn step(&mut self) {
        let n = self.bodies.len();
        for body in &mut self.bodies {
            body.force = Point::ZERO;
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let (delta, r) = self.separation(self.bodies[i].pos, self.bodies[j].pos);
                let v = self.settings.gravity * self.bodies[i].mass * self.bodies[j].mass / (r * r * r);
                self.bodies[i].force = self.bodies[i].force + delta * v;
                self.bodies[j].force = self.bodies[j].force - delta * v;
            }
        }

        for k in 0..self.edges.len() {
            let (a, b) = self.edges[k];
            let (delta, r) = self.separation(self.bodies[a].pos, self.bodies[b].pos);
            let stretch = r - self.settings.spring_length;
            let coefficient = self.settings.spring_coefficient * stretch / r;
            self.bodies[a].force = self.bodies[a].force + delta * coefficient;
            self.bodies[b].force = self.bodies[b].force - delta * coefficient;
        }

        let s = self.settings;
        for body in &mut self.bodies {
            body.force = body.force - body.velocity * s.drag_coefficient;
            body.velocity = body.velocity + body.force * (s.time_step / body.mass);
            let speed = body.velocity.magnitude();
            if speed > s.max_speed {
                body.velocity = body.velocity * (s.max_speed / speed);
            }
            body.pos = body.pos + body.velocity * s.time_step;
        }
    }

    pub fn positions(&self) -> Vec<Point> {
        self.bodies.iter().map(|b| b.pos).collect()
    }
}

/// Scales `positions` so the mean of `original / simulated` edge length is 1,
/// then moves them so the smallest x and y are 0. Returns the scale applied.
///
/// Edges that are degenerate in either the figure or the layout do not take
/// part in the mean; with no usable edge the scale is 1.
pub fn normalize(figure: &Figure, positions: &mut [Point]) -> f64 {
    let ratios: Vec<f64> = figure
        .valid_edges()
        .filter(|&(_, (a, b))| a < positions.len() && b < positions.len())
        .filter_map(|(_, (a, b))| {
            let original = figure.original_length2((a, b)).sqrt();
            let simulated = distance2(positions[a], positions[b]).sqrt();
            if original > 0.0 && simulated > 0.0 {
                Some(original / simulated)
            } else {
                None
            }
        })
        .collect();
    let scale = if ratios.is_empty() {
        1.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    };

    for p in positions.iter_mut() {
        *p = *p * scale;
    }
    let min_x = positions.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
    let min_y = positions.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    if min_x.is_finite() && min_y.is_finite() {
        let origin = Point::new(min_x, min_y);
        for p in positions.iter_mut() {
            *p = *p - origin;
        }
    }
    scale
}

/// Runs the simulation from `pose` for `iterations` steps and normalizes the
/// result against the figure. Deterministic for a given seed.
pub fn relayout(figure: &Figure, pose: &[Point], iterations: usize, seed: u64) -> Vec<Point> {
    let mut layout = ForceLayout::new(pose, &figure.edges, LayoutSettings::default(), seed);
    for _ in 0..iterations {
        layout.step();
    }
    let mut positions = layout.positions();
    let scale = normalize(figure, &mut positions);
    log::debug!("relayout: {} steps, scale {}", iterations, scale);
    positions
}

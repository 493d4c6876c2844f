use serde::{Deserialize, Serialize, Serializer};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A position in model space. Serialized as `[x, y]`; integral coordinates are
/// written as JSON integers so saved poses look like the contest format.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
#[serde(from = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn magnitude(self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Undefined (NaN) for the zero vector.
    pub fn unit(self) -> Point {
        self / self.magnitude()
    }

    /// Rounds both coordinates onto the integer grid, halves going up.
    pub fn round(self) -> Point {
        Point {
            x: (self.x + 0.5).floor(),
            y: (self.y + 0.5).floor(),
        }
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Point {
        Point { x: p[0], y: p[1] }
    }
}

impl From<(f64, f64)> for Point {
    fn from(p: (f64, f64)) -> Point {
        Point { x: p.0, y: p.1 }
    }
}

impl From<Point> for eframe::egui::Pos2 {
    fn from(p: Point) -> Self {
        eframe::egui::Pos2::new(p.x as f32, p.y as f32)
    }
}

impl From<eframe::egui::Pos2> for Point {
    fn from(p: eframe::egui::Pos2) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

fn serialize_coordinate<S: serde::ser::SerializeTuple>(seq: &mut S, v: f64) -> Result<(), S::Error> {
    // 2^53: every integer below this is exactly representable.
    if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 {
        seq.serialize_element(&(v as i64))
    } else {
        seq.serialize_element(&v)
    }
}

impl Serialize for Point {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple;
        let mut seq = serializer.serialize_tuple(2)?;
        serialize_coordinate(&mut seq, self.x)?;
        serialize_coordinate(&mut seq, self.y)?;
        seq.end()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, m: f64) -> Point {
        Point::new(self.x * m, self.y * m)
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, m: f64) -> Point {
        Point::new(self.x / m, self.y / m)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Squared euclidean distance. All tolerance checks work in squared-length space.
pub fn distance2(p: Point, q: Point) -> f64 {
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    dx * dx + dy * dy
}

pub fn midpoint(p: Point, q: Point) -> Point {
    (p + q) / 2.0
}

/// Axis aligned bounds of `points`. An empty set yields `(0,0)..(1,1)` so that
/// fit calculations never divide by zero.
pub fn bounding_box(points: &[Point]) -> (Point, Point) {
    if points.is_empty() {
        return (Point::ZERO, Point::new(1.0, 1.0));
    }
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for p in points {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// The point of `points` closest to `origin` and its index. Ties go to the
/// earliest entry.
pub fn nearest(points: &[Point], origin: Point) -> Option<(usize, Point)> {
    let mut best: Option<(usize, Point, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        let d = distance2(*p, origin);
        match best {
            Some((_, _, bd)) if bd <= d => {}
            _ => best = Some((i, *p, d)),
        }
    }
    best.map(|(i, p, _)| (i, p))
}

/// Closest point to `p` on the segment `[a, b]`.
pub fn project_onto_segment(p: Point, a: Point, b: Point) -> Point {
    let delta = b - a;
    let len = delta.magnitude();
    if len == 0.0 {
        return a;
    }
    let t = ((p - a).dot(delta.unit()) / len).max(0.0).min(1.0);
    a + delta * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_arithmetic() {
        let p = Point::new(3.0, 4.0);
        let q = Point::new(1.0, -2.0);
        assert_eq!(p + q, Point::new(4.0, 2.0));
        assert_eq!(p - q, Point::new(2.0, 6.0));
        assert_eq!(p * 2.0, Point::new(6.0, 8.0));
        assert_eq!(p / 2.0, Point::new(1.5, 2.0));
        assert_eq!(-p, Point::new(-3.0, -4.0));
        assert_eq!(p.magnitude(), 5.0);
        assert_eq!(Point::ZERO.magnitude(), 0.0);
        assert_eq!(distance2(p, q), 4.0 + 36.0);
        assert_eq!(midpoint(p, q), Point::new(2.0, 1.0));
        let u = p.unit();
        assert!((u.magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rounding_goes_up_on_halves() {
        assert_eq!(Point::new(0.5, -0.5).round(), Point::new(1.0, 0.0));
        assert_eq!(Point::new(1.4, -1.6).round(), Point::new(1.0, -2.0));
    }

    #[test]
    fn bounding_box_of_points_and_empty_fallback() {
        let pts = [Point::new(1.0, 5.0), Point::new(-2.0, 3.0), Point::new(4.0, 0.0)];
        assert_eq!(
            bounding_box(&pts),
            (Point::new(-2.0, 0.0), Point::new(4.0, 5.0))
        );
        assert_eq!(bounding_box(&[]), (Point::ZERO, Point::new(1.0, 1.0)));
    }

    #[test]
    fn nearest_prefers_first_on_ties() {
        let pts = [Point::new(1.0, 0.0), Point::new(-1.0, 0.0), Point::new(5.0, 5.0)];
        assert_eq!(nearest(&pts, Point::ZERO), Some((0, Point::new(1.0, 0.0))));
        assert_eq!(nearest(&pts, Point::new(4.0, 4.0)), Some((2, Point::new(5.0, 5.0))));
        assert_eq!(nearest(&[], Point::ZERO), None);
    }

    #[test]
    fn projection_is_clamped_to_segment() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert_eq!(project_onto_segment(Point::new(3.0, 7.0), a, b), Point::new(3.0, 0.0));
        assert_eq!(project_onto_segment(Point::new(-4.0, 1.0), a, b), a);
        assert_eq!(project_onto_segment(Point::new(14.0, -1.0), a, b), b);
        assert_eq!(project_onto_segment(Point::new(1.0, 1.0), a, a), a);
    }

    #[test]
    fn points_serialize_as_integer_pairs_when_integral() {
        let json = serde_json::to_string(&vec![Point::new(1.0, 2.0), Point::new(0.5, -3.0)]).unwrap();
        assert_eq!(json, "[[1,2],[0.5,-3]]");
        let back: Vec<Point> = serde_json::from_str("[[1,2],[0.5,-3]]").unwrap();
        assert_eq!(back, vec![Point::new(1.0, 2.0), Point::new(0.5, -3.0)]);
    }
}

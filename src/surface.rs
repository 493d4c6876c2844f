//! Drawing primitives the editor renders through.
//!
//! The editor draws into a [`Scene`], a recorded display list that a host can
//! replay onto a real canvas or inspect directly.

use crate::geom::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Color { r, g, b, a }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub color: Color,
}

impl Stroke {
    pub const fn new(width: f64, color: Color) -> Self {
        Stroke { width, color }
    }
}

/// Canvas-space drawing capability. All coordinates are canvas pixels.
pub trait Surface {
    fn clear(&mut self, color: Color);
    /// Closed polygon through `points`.
    fn draw_polygon(&mut self, points: &[Point], fill: Color, stroke: Stroke);
    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke);
    fn draw_circle(&mut self, center: Point, radius: f64, fill: Color, stroke: Option<Stroke>);
    /// Filled annulus between `inner` and `outer` radii.
    fn draw_ring(&mut self, center: Point, inner: f64, outer: f64, fill: Color);
    fn draw_text(&mut self, at: Point, text: &str, color: Color);
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Clear(Color),
    Polygon {
        points: Vec<Point>,
        fill: Color,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
        stroke: Option<Stroke>,
    },
    Ring {
        center: Point,
        inner: f64,
        outer: f64,
        fill: Color,
    },
    Text {
        at: Point,
        text: String,
        color: Color,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, Stroke)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { from, to, stroke } => Some((*from, *to, *stroke)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Draws every recorded primitive onto `surface`, in order.
    pub fn replay(&self, surface: &mut dyn Surface) {
        for primitive in &self.primitives {
            match primitive {
                Primitive::Clear(color) => surface.clear(*color),
                Primitive::Polygon { points, fill, stroke } => surface.draw_polygon(points, *fill, *stroke),
                Primitive::Line { from, to, stroke } => surface.draw_line(*from, *to, *stroke),
                Primitive::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => surface.draw_circle(*center, *radius, *fill, *stroke),
                Primitive::Ring {
                    center,
                    inner,
                    outer,
                    fill,
                } => surface.draw_ring(*center, *inner, *outer, *fill),
                Primitive::Text { at, text, color } => surface.draw_text(*at, text, *color),
            }
        }
    }
}

impl Surface for Scene {
    fn clear(&mut self, color: Color) {
        self.primitives.clear();
        self.primitives.push(Primitive::Clear(color));
    }

    fn draw_polygon(&mut self, points: &[Point], fill: Color, stroke: Stroke) {
        self.primitives.push(Primitive::Polygon {
            points: points.to_vec(),
            fill,
            stroke,
        });
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.primitives.push(Primitive::Line { from, to, stroke });
    }

    fn draw_circle(&mut self, center: Point, radius: f64, fill: Color, stroke: Option<Stroke>) {
        self.primitives.push(Primitive::Circle {
            center,
            radius,
            fill,
            stroke,
        });
    }

    fn draw_ring(&mut self, center: Point, inner: f64, outer: f64, fill: Color) {
        self.primitives.push(Primitive::Ring {
            center,
            inner,
            outer,
            fill,
        });
    }

    fn draw_text(&mut self, at: Point, text: &str, color: Color) {
        self.primitives.push(Primitive::Text {
            at,
            text: text.to_owned(),
            color,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_starts_a_new_frame() {
        let mut scene = Scene::new();
        scene.draw_line(Point::ZERO, Point::new(1.0, 1.0), Stroke::new(1.0, Color::BLACK));
        scene.clear(Color::WHITE);
        scene.draw_text(Point::ZERO, "3", Color::BLACK);
        assert_eq!(scene.primitives().len(), 2);
        assert_eq!(scene.primitives()[0], Primitive::Clear(Color::WHITE));
        assert_eq!(scene.texts().collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn replay_reproduces_the_scene() {
        let mut scene = Scene::new();
        scene.clear(Color::WHITE);
        scene.draw_polygon(&[Point::ZERO, Point::new(1.0, 0.0), Point::new(0.0, 1.0)], Color::WHITE, Stroke::new(1.0, Color::BLACK));
        scene.draw_circle(Point::ZERO, 2.0, Color::BLACK, None);
        scene.draw_ring(Point::ZERO, 1.0, 3.0, Color::rgba(0, 255, 0, 0.15));
        let mut copy = Scene::new();
        scene.replay(&mut copy);
        assert_eq!(copy, scene);
    }
}

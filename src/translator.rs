use crate::geom::{bounding_box, midpoint, Point};

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 20.0;

/// Fraction of the canvas a fitted point set may occupy.
const FIT_MARGIN: f64 = 0.95;

/// Maps between model space and canvas pixels: `canvas = (model + offset) * zoom`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Translator {
    pub zoom: f64,
    pub offset: Point,
}

impl Default for Translator {
    fn default() -> Self {
        Translator::new(5.0)
    }
}

impl Translator {
    pub fn new(zoom: f64) -> Self {
        Translator {
            zoom,
            offset: Point::ZERO,
        }
    }

    /// A translator that centers `points` on a `width` x `height` canvas with a
    /// small margin. Degenerate extents are widened to one model unit.
    pub fn fit_to(points: &[Point], width: f64, height: f64) -> Self {
        let (min, max) = bounding_box(points);
        let center = midpoint(min, max);
        let extent_x = if max.x - min.x > 0.0 { max.x - min.x } else { 1.0 };
        let extent_y = if max.y - min.y > 0.0 { max.y - min.y } else { 1.0 };
        let width = width.max(1.0);
        let height = height.max(1.0);
        let zoom = (width / extent_x).min(height / extent_y) * FIT_MARGIN;
        let offset = Point::new(width / 2.0, height / 2.0) / zoom - center;
        Translator { zoom, offset }
    }

    pub fn model_to_canvas(&self, p: Point) -> Point {
        (p + self.offset) * self.zoom
    }

    pub fn canvas_to_model(&self, p: Point) -> Point {
        p / self.zoom - self.offset
    }

    /// Changes the zoom while keeping the model point under `canvas` fixed.
    /// Out of range requests are clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom_at(&mut self, new_zoom: f64, canvas: Point) {
        let new_zoom = if new_zoom.is_nan() {
            self.zoom
        } else {
            new_zoom.max(MIN_ZOOM).min(MAX_ZOOM)
        };
        let old_zoom = self.zoom;
        self.offset = self.offset - canvas * ((new_zoom - old_zoom) / (old_zoom * new_zoom));
        self.zoom = new_zoom;
    }

    /// Offset that moves the view by the canvas distance from `start_canvas`
    /// to `canvas`, relative to the offset captured when panning began.
    pub fn pan(&mut self, start_offset: Point, start_canvas: Point, canvas: Point) {
        self.offset = start_offset + (canvas - start_canvas) / self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: Point, b: Point, tol: f64) -> bool {
        (a.x - b.x).abs() <= tol && (a.y - b.y).abs() <= tol
    }

    #[test]
    fn model_to_canvas_applies_offset_then_zoom() {
        let t = Translator {
            zoom: 2.0,
            offset: Point::new(1.0, -1.0),
        };
        assert_eq!(t.model_to_canvas(Point::new(3.0, 3.0)), Point::new(8.0, 4.0));
        assert_eq!(t.canvas_to_model(Point::new(8.0, 4.0)), Point::new(3.0, 3.0));
    }

    #[test]
    fn fit_centers_the_bounding_box() {
        let pts = [Point::new(0.0, 0.0), Point::new(100.0, 50.0)];
        let t = Translator::fit_to(&pts, 400.0, 400.0);
        assert!((t.zoom - 4.0 * 0.95).abs() < 1e-12);
        let c = t.model_to_canvas(Point::new(50.0, 25.0));
        assert!(close(c, Point::new(200.0, 200.0), 1e-9));
        for p in &pts {
            let q = t.model_to_canvas(*p);
            assert!(q.x >= 0.0 && q.x <= 400.0 && q.y >= 0.0 && q.y <= 400.0);
        }
    }

    #[test]
    fn fit_survives_degenerate_input() {
        for pts in [vec![], vec![Point::new(3.0, 3.0)], vec![Point::new(0.0, 1.0), Point::new(0.0, 9.0)]] {
            let t = Translator::fit_to(&pts, 800.0, 600.0);
            assert!(t.zoom.is_finite() && t.zoom > 0.0);
            assert!(t.offset.x.is_finite() && t.offset.y.is_finite());
        }
        let t = Translator::fit_to(&[Point::new(1.0, 1.0)], 0.0, 0.0);
        assert!(t.zoom.is_finite() && t.zoom > 0.0);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut t = Translator::new(1.0);
        t.set_zoom_at(100.0, Point::ZERO);
        assert_eq!(t.zoom, MAX_ZOOM);
        t.set_zoom_at(0.0, Point::ZERO);
        assert_eq!(t.zoom, MIN_ZOOM);
        t.set_zoom_at(-3.0, Point::new(10.0, 10.0));
        assert_eq!(t.zoom, MIN_ZOOM);
    }

    #[test]
    fn panning_follows_the_cursor() {
        let mut t = Translator::new(2.0);
        let start = t.offset;
        let model = t.canvas_to_model(Point::new(10.0, 10.0));
        t.pan(start, Point::new(10.0, 10.0), Point::new(30.0, 16.0));
        assert!(close(t.canvas_to_model(Point::new(30.0, 16.0)), model, 1e-12));
    }

    proptest! {
        #[test]
        fn canvas_to_model_inverts_model_to_canvas(
            zoom in 0.01f64..100.0,
            ox in -1e3f64..1e3, oy in -1e3f64..1e3,
            px in -1e4f64..1e4, py in -1e4f64..1e4,
        ) {
            let t = Translator { zoom, offset: Point::new(ox, oy) };
            let p = Point::new(px, py);
            prop_assert!(close(t.canvas_to_model(t.model_to_canvas(p)), p, 1e-6));
        }

        #[test]
        fn zooming_keeps_the_anchor_fixed(
            z1 in MIN_ZOOM..=MAX_ZOOM, z2 in MIN_ZOOM..=MAX_ZOOM,
            ox in -1e3f64..1e3, oy in -1e3f64..1e3,
            cx in 0f64..2000.0, cy in 0f64..2000.0,
        ) {
            let mut t = Translator { zoom: z1, offset: Point::new(ox, oy) };
            let c = Point::new(cx, cy);
            let before = t.canvas_to_model(c);
            t.set_zoom_at(z2, c);
            prop_assert!((t.zoom - z2).abs() < 1e-12);
            prop_assert!(close(t.canvas_to_model(c), before, 1e-6));
        }
    }
}

use crate::constraint::{self, EdgeStatus, Globalist, Tolerance};
use crate::error::{Error, Result};
use crate::geom::{distance2, midpoint, nearest, project_onto_segment, Point};
use crate::layout;
use crate::problem::{BonusKind, Pose, Problem};
use crate::snap;
use crate::surface::{Color, Scene, Stroke, Surface};
use crate::translator::Translator;
use std::mem;

/// A left click picks the closest vertex within this many canvas pixels.
pub const PICK_RADIUS_PX: f64 = 10.0;

/// Hole edges are highlighted when the cursor's squared distance to them is
/// below this value divided by the zoom.
pub const HOLE_EDGE_THRESHOLD: f64 = 50.0;

/// Zoom change per unit of wheel delta.
pub const WHEEL_ZOOM_DIVISOR: f64 = 200.0;

const BACKGROUND: Color = Color::rgb(222, 222, 222);
const VERTEX_COLOR: Color = Color::rgb(0, 0, 255);
const HINT_COLOR: Color = Color::rgba(0, 255, 0, 0.15);
const BONUS_RADIUS: f64 = 3.0;
const VERTEX_RADIUS: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// A pointer event in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub pos: Point,
    pub button: MouseButton,
    /// Snap modifier.
    pub shift: bool,
}

impl PointerEvent {
    pub fn new(pos: Point, button: MouseButton) -> Self {
        PointerEvent {
            pos,
            button,
            shift: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    DraggingVertex(usize),
    Panning { start_canvas: Point, start_offset: Point },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Highlight {
    pub hole_edge: Option<usize>,
}

/// Rendering toggles; none of them changes the pose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    pub draw_distance: bool,
    pub similar_edge_highlight: bool,
    pub constraint_hint: bool,
    pub vertex_index: bool,
}

type RefreshObserver = Box<dyn FnMut(&PoseEditor)>;

/// Interactive pose editor. Every state change re-renders the scene and then
/// notifies the refresh observers, which read back whatever they need.
pub struct PoseEditor {
    problem: Problem,
    pose: Pose,
    translator: Translator,
    interaction: Interaction,
    highlight: Highlight,
    options: DisplayOptions,
    width: f64,
    height: f64,
    scene: Scene,
    observers: Vec<RefreshObserver>,
}

impl Default for PoseEditor {
    fn default() -> Self {
        PoseEditor::new(800.0, 600.0)
    }
}

impl PoseEditor {
    pub fn new(width: f64, height: f64) -> Self {
        PoseEditor {
            problem: Problem::default(),
            pose: vec![],
            translator: Translator::default(),
            interaction: Interaction::Idle,
            highlight: Highlight::default(),
            options: DisplayOptions::default(),
            width,
            height,
            scene: Scene::new(),
            observers: vec![],
        }
    }

    pub fn on_refresh<F: FnMut(&PoseEditor) + 'static>(&mut self, observer: F) {
        self.observers.push(Box::new(observer));
    }

    fn notify_refresh(&mut self) {
        let mut observers = mem::take(&mut self.observers);
        for observer in observers.iter_mut() {
            observer(self);
        }
        self.observers = observers;
    }

    pub fn problem(&self) -> &Problem {
        &self.problem
    }

    /// Replaces the problem, resets the pose to the undeformed figure and fits
    /// the view.
    pub fn set_problem(&mut self, problem: Problem) {
        log::info!(
            "loaded problem: {} hole vertices, {} figure vertices, {} edges, epsilon {}",
            problem.hole.len(),
            problem.figure.vertices.len(),
            problem.figure.edges.len(),
            problem.epsilon
        );
        self.pose = problem.figure.vertices.clone();
        self.problem = problem;
        self.interaction = Interaction::Idle;
        self.highlight = Highlight::default();
        self.set_zoom_auto_fit();
    }

    pub fn pose(&self) -> &[Point] {
        &self.pose
    }

    /// Replaces the whole pose. A pose whose length differs from the figure is
    /// rejected and the current pose is kept.
    pub fn set_pose(&mut self, pose: Pose) -> Result<()> {
        let expected = self.problem.figure.vertices.len();
        if pose.len() != expected {
            log::warn!("rejected pose with {} vertices, expected {}", pose.len(), expected);
            return Err(Error::PoseLength {
                expected,
                actual: pose.len(),
            });
        }
        self.pose = pose;
        if let Interaction::DraggingVertex(_) = self.interaction {
            self.interaction = Interaction::Idle;
        }
        self.render();
        Ok(())
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn highlight(&self) -> Highlight {
        self.highlight
    }

    pub fn options(&self) -> DisplayOptions {
        self.options
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Changes the canvas size without refitting the view.
    pub fn resize(&mut self, width: f64, height: f64) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.render();
        }
    }

    pub fn zoom(&self) -> f64 {
        self.translator.zoom
    }

    /// Zooms about the canvas center.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.set_zoom_at(zoom, Point::new(self.width / 2.0, self.height / 2.0));
    }

    pub fn set_zoom_at(&mut self, zoom: f64, canvas: Point) {
        self.translator.set_zoom_at(zoom, canvas);
        self.render();
    }

    /// Fits the hole and the current pose into the canvas.
    pub fn set_zoom_auto_fit(&mut self) {
        let points: Vec<Point> = self.problem.hole.iter().chain(self.pose.iter()).copied().collect();
        self.translator = Translator::fit_to(&points, self.width, self.height);
        self.render();
    }

    pub fn set_draw_distance(&mut self, on: bool) {
        self.options.draw_distance = on;
        self.render();
    }

    pub fn set_similar_edge_highlight(&mut self, on: bool) {
        self.options.similar_edge_highlight = on;
        if !on {
            self.highlight = Highlight::default();
        }
        self.render();
    }

    pub fn set_constraint_hint(&mut self, on: bool) {
        self.options.constraint_hint = on;
        self.render();
    }

    pub fn set_vertex_index(&mut self, on: bool) {
        self.options.vertex_index = on;
        self.render();
    }

    pub fn compute_dislike(&self) -> f64 {
        constraint::dislike(&self.problem.hole, &self.pose)
    }

    pub fn compute_globalist(&self) -> Globalist {
        constraint::globalist(&self.problem.figure, &self.pose, self.problem.epsilon)
    }

    pub fn edge_statuses(&self) -> Vec<EdgeStatus> {
        constraint::edge_statuses(&self.problem, &self.pose)
    }

    /// Replaces the pose with a force-directed layout of the figure. The
    /// current pose is lost; hosts should confirm with the user first.
    pub fn relayout(&mut self) {
        self.relayout_with(layout::DEFAULT_ITERATIONS, layout::DEFAULT_SEED);
    }

    pub fn relayout_with(&mut self, iterations: usize, seed: u64) {
        if self.pose.is_empty() {
            return;
        }
        log::info!("relayout over {} vertices", self.pose.len());
        self.pose = layout::relayout(&self.problem.figure, &self.pose, iterations, seed)
            .into_iter()
            .map(Point::round)
            .collect();
        self.interaction = Interaction::Idle;
        self.render();
    }

    pub fn mouse_down(&mut self, ev: PointerEvent) {
        match ev.button {
            MouseButton::Left => {
                let cursor = self.translator.canvas_to_model(ev.pos);
                if let Some((index, vertex)) = nearest(&self.pose, cursor) {
                    let radius = PICK_RADIUS_PX / self.translator.zoom;
                    if distance2(vertex, cursor) < radius * radius {
                        log::debug!("dragging vertex {}", index);
                        self.interaction = Interaction::DraggingVertex(index);
                        self.drag_vertex(index, ev);
                        self.render();
                    }
                }
            }
            MouseButton::Right => {
                self.interaction = Interaction::Panning {
                    start_canvas: ev.pos,
                    start_offset: self.translator.offset,
                };
            }
            MouseButton::Middle => {}
        }
    }

    pub fn mouse_up(&mut self, ev: PointerEvent) {
        match ev.button {
            MouseButton::Left | MouseButton::Right => {
                self.interaction = Interaction::Idle;
                self.render();
            }
            MouseButton::Middle => {}
        }
    }

    pub fn mouse_move(&mut self, ev: PointerEvent) {
        let mut dirty = false;
        match self.interaction {
            Interaction::DraggingVertex(index) => {
                self.drag_vertex(index, ev);
                dirty = true;
            }
            Interaction::Panning {
                start_canvas,
                start_offset,
            } => {
                self.translator.pan(start_offset, start_canvas, ev.pos);
                dirty = true;
            }
            Interaction::Idle => {}
        }

        let mut highlight = Highlight::default();
        if self.interaction == Interaction::Idle && self.options.similar_edge_highlight {
            let cursor = self.translator.canvas_to_model(ev.pos);
            highlight.hole_edge = self.near_hole_edge(cursor, HOLE_EDGE_THRESHOLD / self.translator.zoom);
        }
        if highlight != self.highlight {
            self.highlight = highlight;
            dirty = true;
        }

        if dirty {
            self.render();
        }
    }

    /// Zooms about the cursor. Hosts should suppress their default scrolling.
    pub fn wheel(&mut self, pos: Point, delta_y: f64) {
        self.set_zoom_at(self.translator.zoom + delta_y / WHEEL_ZOOM_DIVISOR, pos);
    }

    /// Right click belongs to panning, so the context menu is always
    /// suppressed.
    pub fn context_menu(&self) -> bool {
        true
    }

    fn drag_vertex(&mut self, index: usize, ev: PointerEvent) {
        if index >= self.pose.len() {
            return;
        }
        let cursor = self.translator.canvas_to_model(ev.pos);
        self.pose[index] = if ev.shift {
            snap::snap(&self.problem, &self.pose, index, cursor, self.translator.zoom)
        } else {
            cursor.round()
        };
    }

    fn near_hole_edge(&self, p: Point, threshold: f64) -> Option<usize> {
        let hole = &self.problem.hole;
        let mut best: Option<(usize, f64)> = None;
        for i in 0..hole.len() {
            let a = hole[i];
            let b = hole[(i + 1) % hole.len()];
            let d2 = distance2(p, project_onto_segment(p, a, b));
            if best.map_or(true, |(_, bd)| d2 < bd) {
                best = Some((i, d2));
            }
        }
        match best {
            Some((i, d2)) if d2 < threshold => Some(i),
            _ => None,
        }
    }

    fn render(&mut self) {
        let mut scene = mem::take(&mut self.scene);
        self.draw(&mut scene);
        self.scene = scene;
        self.notify_refresh();
    }

    /// Draws the whole editor onto `surface`.
    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.clear(BACKGROUND);
        self.draw_hole(surface);
        self.draw_bonuses(surface);
        self.draw_pose(surface);
        self.draw_labels(surface);
        self.draw_hints(surface);
    }

    fn draw_hole(&self, surface: &mut dyn Surface) {
        let hole = &self.problem.hole;
        if hole.is_empty() {
            return;
        }
        let points: Vec<Point> = hole.iter().map(|v| self.translator.model_to_canvas(*v)).collect();
        surface.draw_polygon(&points, Color::WHITE, Stroke::new(1.0, Color::BLACK));

        if let Some(i) = self.highlight.hole_edge {
            surface.draw_line(
                points[i % points.len()],
                points[(i + 1) % points.len()],
                Stroke::new(3.0, Color::BLACK),
            );
        }
    }

    fn draw_bonuses(&self, surface: &mut dyn Surface) {
        let radius = BONUS_RADIUS * self.translator.zoom;
        for bonus in &self.problem.bonuses {
            let center = self.translator.model_to_canvas(bonus.position);
            surface.draw_circle(
                center,
                radius,
                bonus_color(&bonus.bonus, 0.5),
                Some(Stroke::new(1.0, bonus_color(&bonus.bonus, 1.0))),
            );
        }
    }

    /// Squared length of the highlighted hole edge, if any.
    fn highlighted_length2(&self) -> Option<f64> {
        let hole = &self.problem.hole;
        let i = self.highlight.hole_edge?;
        if hole.is_empty() {
            return None;
        }
        Some(distance2(hole[i % hole.len()], hole[(i + 1) % hole.len()]))
    }

    fn drawable_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.pose.len();
        self.problem
            .figure
            .valid_edges()
            .map(|(_, edge)| edge)
            .filter(move |&(a, b)| a < n && b < n)
    }

    fn draw_pose(&self, surface: &mut dyn Surface) {
        let figure = &self.problem.figure;
        let target2 = self.highlighted_length2();
        let dragging = match self.interaction {
            Interaction::DraggingVertex(i) => Some(i),
            _ => None,
        };
        for (a, b) in self.drawable_edges() {
            let original2 = figure.original_length2((a, b));
            let matches = target2.map_or(false, |t| constraint::edge_matches(t, original2, self.problem.epsilon));
            let touches = dragging.map_or(false, |d| a == d || b == d);
            let highlight = matches || touches;
            let status = constraint::classify(distance2(self.pose[a], self.pose[b]), original2, self.problem.epsilon);
            surface.draw_line(
                self.translator.model_to_canvas(self.pose[a]),
                self.translator.model_to_canvas(self.pose[b]),
                Stroke::new(if highlight { 3.0 } else { 1.0 }, line_color(status, highlight)),
            );
        }
        for vertex in &self.pose {
            surface.draw_circle(self.translator.model_to_canvas(*vertex), VERTEX_RADIUS, VERTEX_COLOR, None);
        }
    }

    fn draw_labels(&self, surface: &mut dyn Surface) {
        if self.options.draw_distance {
            for (a, b) in self.drawable_edges() {
                let original2 = self.problem.figure.original_length2((a, b));
                let band = Tolerance::new(original2, self.problem.epsilon);
                let at = self.translator.model_to_canvas(midpoint(self.pose[a], self.pose[b]));
                let text = format!(
                    "{:.1} [{:.1}, {:.1}]",
                    distance2(self.pose[a], self.pose[b]),
                    band.min.max(0.0),
                    band.max
                );
                surface.draw_text(at, &text, Color::BLACK);
            }
        }
        if self.options.vertex_index {
            for (i, vertex) in self.pose.iter().enumerate() {
                let at = self.translator.model_to_canvas(*vertex) + Point::new(4.0, -4.0);
                surface.draw_text(at, &i.to_string(), VERTEX_COLOR);
            }
        }
    }

    fn draw_hints(&self, surface: &mut dyn Surface) {
        let dragging = match self.interaction {
            Interaction::DraggingVertex(i) if self.options.constraint_hint => i,
            _ => return,
        };
        let figure = &self.problem.figure;
        if dragging >= figure.vertices.len() {
            return;
        }
        for adjacent in figure.adjacent(dragging) {
            if adjacent >= self.pose.len() {
                continue;
            }
            let band = Tolerance::new(figure.original_length2((adjacent, dragging)), self.problem.epsilon);
            let zoom = self.translator.zoom;
            surface.draw_ring(
                self.translator.model_to_canvas(self.pose[adjacent]),
                band.min.max(0.0).sqrt() * zoom,
                band.max.sqrt() * zoom,
                HINT_COLOR,
            );
        }
    }
}

/// Compressed edges are red, stretched blue and valid green; highlighted
/// edges use a darker shade.
pub fn line_color(status: EdgeStatus, highlight: bool) -> Color {
    let hi = if highlight { 192 } else { 255 };
    match status {
        EdgeStatus::Compressed => Color::rgb(hi, 0, 0),
        EdgeStatus::Stretched => Color::rgb(0, 0, hi),
        EdgeStatus::Valid => Color::rgb(0, hi, 0),
    }
}

pub fn bonus_color(kind: &BonusKind, alpha: f32) -> Color {
    match kind {
        BonusKind::Globalist => Color::rgba(255, 255, 0, alpha),
        BonusKind::BreakALeg => Color::rgba(0, 0, 255, alpha),
        BonusKind::Wallhack => Color::rgba(128, 128, 0, alpha),
        _ => Color::rgba(0, 0, 0, alpha),
    }
}

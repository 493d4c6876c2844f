use crate::config::Config;
use crate::editor::{MouseButton, PointerEvent, PoseEditor};
use crate::geom::Point;
use crate::mirror::{self, Fragment};
use crate::problem::{read_problem_from_file, write_solution_to_file, Solution};
use crate::surface::{Color, Stroke, Surface};
use crate::translator::{MAX_ZOOM, MIN_ZOOM};
use eframe::{egui, epi};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn color32(c: Color) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, (c.a * 255.0).round() as u8)
}

fn stroke32(s: Stroke) -> egui::Stroke {
    egui::Stroke::new(s.width as f32, color32(s.color))
}

/// Replays editor scenes onto an egui painter. Scene coordinates are relative
/// to the canvas rect.
struct CanvasPainter<'a> {
    painter: &'a egui::Painter,
    origin: egui::Vec2,
}

impl CanvasPainter<'_> {
    fn pos(&self, p: Point) -> egui::Pos2 {
        egui::Pos2::from(p) + self.origin
    }
}

impl Surface for CanvasPainter<'_> {
    fn clear(&mut self, color: Color) {
        self.painter.rect_filled(self.painter.clip_rect(), 0.0, color32(color));
    }

    fn draw_polygon(&mut self, points: &[Point], _fill: Color, stroke: Stroke) {
        // egui paths only fill convex shapes, and holes rarely are.
        let points = points.iter().map(|p| self.pos(*p)).collect();
        self.painter.add(egui::Shape::closed_line(points, stroke32(stroke)));
    }

    fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.painter.line_segment([self.pos(from), self.pos(to)], stroke32(stroke));
    }

    fn draw_circle(&mut self, center: Point, radius: f64, fill: Color, stroke: Option<Stroke>) {
        let center = self.pos(center);
        self.painter.circle_filled(center, radius as f32, color32(fill));
        if let Some(stroke) = stroke {
            self.painter.circle_stroke(center, radius as f32, stroke32(stroke));
        }
    }

    fn draw_ring(&mut self, center: Point, inner: f64, outer: f64, fill: Color) {
        let width = (outer - inner).max(1.0) as f32;
        let radius = ((inner + outer) / 2.0) as f32;
        self.painter
            .circle_stroke(self.pos(center), radius, egui::Stroke::new(width, color32(fill)));
    }

    fn draw_text(&mut self, at: Point, text: &str, color: Color) {
        self.painter.text(
            self.pos(at),
            egui::Align2::LEFT_BOTTOM,
            text,
            egui::TextStyle::Small,
            color32(color),
        );
    }
}

/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[cfg_attr(feature = "persistence", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "persistence", serde(default))] // if we add new fields, give them default values when deserializing old state
pub struct PoseEditorApp {
    problem_id_text: String,
    draw_distance: bool,
    similar_edge_highlight: bool,
    constraint_hint: bool,
    vertex_index: bool,

    #[cfg_attr(feature = "persistence", serde(skip))]
    config: Config,

    #[cfg_attr(feature = "persistence", serde(skip))]
    editor: PoseEditor,

    #[cfg_attr(feature = "persistence", serde(skip))]
    problem_id: Rc<Cell<u32>>,

    #[cfg_attr(feature = "persistence", serde(skip))]
    mirror: Rc<RefCell<String>>,

    #[cfg_attr(feature = "persistence", serde(skip))]
    mirror_edit: String,

    #[cfg_attr(feature = "persistence", serde(skip))]
    fragment: Rc<RefCell<String>>,

    #[cfg_attr(feature = "persistence", serde(skip))]
    fragment_edit: String,

    #[cfg_attr(feature = "persistence", serde(skip))]
    status: Rc<RefCell<String>>,

    #[cfg_attr(feature = "persistence", serde(skip))]
    message: String,

    #[cfg_attr(feature = "persistence", serde(skip))]
    confirm_relayout: bool,

    #[cfg_attr(feature = "persistence", serde(skip))]
    fit_pending: bool,

    #[cfg_attr(feature = "persistence", serde(skip))]
    attached: bool,
}

impl Default for PoseEditorApp {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl PoseEditorApp {
    pub fn new(config: Config) -> Self {
        Self {
            problem_id_text: config.problem_id.to_string(),
            draw_distance: false,
            similar_edge_highlight: false,
            constraint_hint: false,
            vertex_index: false,
            problem_id: Rc::new(Cell::new(config.problem_id)),
            config,
            editor: PoseEditor::default(),
            mirror: Rc::default(),
            mirror_edit: String::new(),
            fragment: Rc::default(),
            fragment_edit: String::new(),
            status: Rc::default(),
            message: String::new(),
            confirm_relayout: false,
            fit_pending: false,
            attached: false,
        }
    }

    fn attach_observers(&mut self) {
        if self.attached {
            return;
        }
        self.editor
            .on_refresh(mirror::text_mirror(self.problem_id.clone(), self.mirror.clone()));
        self.editor
            .on_refresh(mirror::fragment_persister(self.problem_id.clone(), self.fragment.clone()));
        self.editor.on_refresh(mirror::status_label(self.status.clone()));
        self.attached = true;
    }

    fn apply_display_options(&mut self) {
        self.editor.set_draw_distance(self.draw_distance);
        self.editor.set_similar_edge_highlight(self.similar_edge_highlight);
        self.editor.set_constraint_hint(self.constraint_hint);
        self.editor.set_vertex_index(self.vertex_index);
    }

    fn load_problem(&mut self, id: u32) -> bool {
        let path = self.config.problem_path(id);
        match read_problem_from_file(&path) {
            Ok(problem) => {
                self.problem_id.set(id);
                self.problem_id_text = id.to_string();
                self.editor.set_problem(problem);
                self.fit_pending = true;
                self.message = format!("Loaded {}", path.display());
                true
            }
            Err(e) => {
                log::warn!("could not load {}: {}", path.display(), e);
                self.message = format!("Could not load {}: {}", path.display(), e);
                false
            }
        }
    }

    fn save_solution(&mut self) {
        let id = self.problem_id.get();
        let path = self.config.solution_path(id);
        let solution = Solution {
            problem_id: Some(id),
            vertices: self.editor.pose().to_vec(),
        };
        match write_solution_to_file(&path, &solution) {
            Ok(()) => {
                log::info!("saved solution to {}", path.display());
                self.message = format!("Saved {}", path.display());
            }
            Err(e) => {
                log::warn!("could not save {}: {}", path.display(), e);
                self.message = format!("Could not save: {}", e);
            }
        }
    }

    /// Applies an edited JSON mirror, switching problem first when it names
    /// another one.
    fn apply_mirror_edit(&mut self) {
        let solution = match mirror::parse_mirror(&self.mirror_edit) {
            Ok(solution) => solution,
            Err(e) => {
                self.message = format!("Invalid pose JSON: {}", e);
                return;
            }
        };
        if let Some(id) = solution.problem_id {
            if id != self.problem_id.get() && !self.load_problem(id) {
                return;
            }
        }
        if let Err(e) = self.editor.set_pose(solution.vertices) {
            self.message = e.to_string();
        }
    }

    fn apply_fragment(&mut self) {
        let fragment = match Fragment::parse(self.fragment_edit.trim()) {
            Ok(fragment) => fragment,
            Err(e) => {
                self.message = e.to_string();
                return;
            }
        };
        if let Some(id) = fragment.problem_id {
            if !self.load_problem(id) {
                return;
            }
        }
        if let Some(id) = fragment.base_solution_id {
            log::info!("base solution {} lives on the dashboard; ignoring", id);
        }
        if let Some(pose) = fragment.pose {
            if let Err(e) = self.editor.set_pose(pose) {
                self.message = e.to_string();
            }
        }
        self.fragment_edit.clear();
    }

    #[cfg(feature = "persistence")]
    fn restore(&mut self, storage: &dyn epi::Storage) {
        let config = self.config.clone();
        *self = epi::get_value(storage, epi::APP_KEY).unwrap_or_default();
        let id = self.problem_id_text.parse().unwrap_or(config.problem_id);
        self.problem_id.set(id);
        self.config = config;
    }

    #[cfg(not(feature = "persistence"))]
    fn restore(&mut self, _storage: &dyn epi::Storage) {}

    fn handle_input(&mut self, ui: &egui::Ui, rect: egui::Rect) {
        let input = ui.input();
        let events = input.events.clone();
        let shift = input.modifiers.shift;
        let scroll = input.scroll_delta;
        let hover = input.pointer.hover_pos();
        let to_canvas = |pos: egui::Pos2| Point::from(pos - rect.min.to_vec2());

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => {
                    self.editor
                        .mouse_move(PointerEvent::new(to_canvas(pos), MouseButton::Left).with_shift(shift));
                }
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed,
                    modifiers,
                } => {
                    let button = match button {
                        egui::PointerButton::Primary => MouseButton::Left,
                        egui::PointerButton::Secondary => MouseButton::Right,
                        egui::PointerButton::Middle => MouseButton::Middle,
                    };
                    let ev = PointerEvent::new(to_canvas(pos), button).with_shift(modifiers.shift);
                    if !pressed {
                        self.editor.mouse_up(ev);
                    } else if rect.contains(pos) {
                        self.editor.mouse_down(ev);
                    }
                }
                _ => {}
            }
        }

        if scroll.y != 0.0 {
            if let Some(pos) = hover {
                if rect.contains(pos) {
                    // egui scrolls up with positive y; wheel deltas grow downwards.
                    self.editor.wheel(to_canvas(pos), -scroll.y as f64);
                }
            }
        }
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Problem: ");
            ui.text_edit_singleline(&mut self.problem_id_text);
        });
        if ui.button("Load").clicked() {
            match self.problem_id_text.trim().parse() {
                Ok(id) => {
                    self.load_problem(id);
                }
                Err(_) => self.message = format!("Not a problem id: {:?}", self.problem_id_text),
            }
        }

        ui.separator();
        if ui.checkbox(&mut self.draw_distance, "Show edge lengths").changed() {
            self.editor.set_draw_distance(self.draw_distance);
        }
        if ui
            .checkbox(&mut self.similar_edge_highlight, "Highlight similar edges")
            .changed()
        {
            self.editor.set_similar_edge_highlight(self.similar_edge_highlight);
        }
        if ui.checkbox(&mut self.constraint_hint, "Constraint hint").changed() {
            self.editor.set_constraint_hint(self.constraint_hint);
        }
        if ui.checkbox(&mut self.vertex_index, "Vertex numbers").changed() {
            self.editor.set_vertex_index(self.vertex_index);
        }

        let mut zoom = self.editor.zoom();
        if ui
            .add(egui::Slider::new(&mut zoom, MIN_ZOOM..=MAX_ZOOM).text("Zoom"))
            .changed()
        {
            self.editor.set_zoom(zoom);
        }
        if ui.button("Fit").clicked() {
            self.editor.set_zoom_auto_fit();
        }

        ui.separator();
        ui.label(self.status.borrow().as_str());
        ui.label("Drag vertices with the left button, hold Shift to snap. Right button pans.");
        if ui.button("Relayout").clicked() {
            self.confirm_relayout = true;
        }

        ui.separator();
        ui.label("Pose:");
        let response = ui.text_edit_multiline(&mut self.mirror_edit);
        if response.lost_focus() {
            self.apply_mirror_edit();
        } else if !response.has_focus() {
            self.mirror_edit = self.mirror.borrow().clone();
        }

        ui.label("Share link:");
        let mut fragment = self.fragment.borrow().clone();
        ui.text_edit_singleline(&mut fragment);
        ui.horizontal(|ui| {
            ui.text_edit_singleline(&mut self.fragment_edit);
            if ui.button("Open link").clicked() {
                self.apply_fragment();
            }
        });

        if !self.message.is_empty() {
            ui.separator();
            ui.label(self.message.as_str());
        }
    }
}

impl epi::App for PoseEditorApp {
    fn name(&self) -> &str {
        "icfp 2021 pose editor"
    }

    /// Called once before the first frame. Restores old app state (if any)
    /// and opens the start problem.
    fn setup(
        &mut self,
        _ctx: &egui::CtxRef,
        _frame: &mut epi::Frame<'_>,
        _storage: Option<&dyn epi::Storage>,
    ) {
        if let Some(storage) = _storage {
            self.restore(storage);
        }
        self.attach_observers();
        self.apply_display_options();
        self.load_problem(self.problem_id.get());
    }

    /// Called by the frame work to save state before shutdown.
    #[cfg(feature = "persistence")]
    fn save(&mut self, storage: &mut dyn epi::Storage) {
        epi::set_value(storage, epi::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::CtxRef, frame: &mut epi::Frame<'_>) {
        self.attach_observers();

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                egui::menu::menu(ui, "File", |ui| {
                    if ui.button("Save").clicked() {
                        self.save_solution();
                    }
                    if ui.button("Quit").clicked() {
                        frame.quit();
                    }
                });
            });
        });

        egui::SidePanel::left("side_panel").show(ctx, |ui| {
            egui::ScrollArea::auto_sized().show(ui, |ui| {
                self.side_panel(ui);
            });
        });

        if self.confirm_relayout {
            let mut run = false;
            let mut cancel = false;
            egui::Window::new("Relayout")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label("Replace the current pose with a force-directed layout? It cannot be undone.");
                    ui.horizontal(|ui| {
                        run = ui.button("Relayout").clicked();
                        cancel = ui.button("Cancel").clicked();
                    });
                });
            if run {
                self.editor.relayout();
            }
            if run || cancel {
                self.confirm_relayout = false;
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::dark_canvas(ui.style()).show(ui, |ui| {
                let desired_size = ui.available_size();
                if desired_size.x == 0.0 || desired_size.y == 0.0 {
                    return;
                }
                let (_id, rect) = ui.allocate_space(desired_size);
                ui.set_clip_rect(rect);

                self.editor.resize(rect.width() as f64, rect.height() as f64);
                if self.fit_pending {
                    self.editor.set_zoom_auto_fit();
                    self.fit_pending = false;
                }
                self.handle_input(ui, rect);

                let mut surface = CanvasPainter {
                    painter: ui.painter(),
                    origin: rect.min.to_vec2(),
                };
                self.editor.scene().replay(&mut surface);
            });
        });
    }
}

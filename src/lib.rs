#![forbid(unsafe_code)]
#![cfg_attr(not(debug_assertions), deny(warnings))] // Forbid warnings in release builds
#![warn(clippy::all, rust_2018_idioms)]

mod app;
pub mod batch;
pub mod config;
pub mod constraint;
pub mod editor;
pub mod error;
pub mod geom;
pub mod layout;
pub mod mirror;
pub mod problem;
pub mod snap;
pub mod surface;
pub mod translator;

pub use app::PoseEditorApp;
pub use editor::PoseEditor;
pub use error::{Error, Result};
pub use geom::Point;
pub use problem::{Problem, Solution};

// ----------------------------------------------------------------------------
// When compiling for web:

#[cfg(target_arch = "wasm32")]
use eframe::wasm_bindgen::{self, prelude::*};

/// This is the entry-point for all the web-assembly.
/// This is called once from the HTML.
/// It loads the app, installs some callbacks, then returns.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start(canvas_id: &str) -> std::result::Result<(), eframe::wasm_bindgen::JsValue> {
    let app = PoseEditorApp::default();
    eframe::start_web(canvas_id, Box::new(app))
}

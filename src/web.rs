#![cfg(target_arch = "wasm32")]

use std::sync::Arc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use winit::dpi::LogicalSize;
use winit::event_loop::EventLoop;
use winit::platform::web::{EventLoopExtWebSys, WindowAttributesExtWebSys};
use winit::window::Window;

use crate::app::{App, WINDOW_TITLE};
use crate::assets::{ModelLibrary, ModelLoader};
use crate::scene::Scene;
use crate::session::Session;

/// Starts the scene on the canvas with id `canvas_id` using the built-in layout.
#[wasm_bindgen]
pub async fn run(canvas_id: String) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let scene = Scene::default_layout()
        .map_err(|err| JsValue::from_str(&format!("failed to parse scene XML: {err}")))?;
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("missing document"))?;
    let element = document
        .get_element_by_id(&canvas_id)
        .ok_or_else(|| JsValue::from_str("canvas element not found"))?;
    let canvas: web_sys::HtmlCanvasElement = element
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    let event_loop = EventLoop::new()
        .map_err(|err| JsValue::from_str(&format!("failed to create event loop: {err}")))?;
    #[allow(deprecated)]
    let window = Arc::new(
        event_loop
            .create_window(
                Window::default_attributes()
                    .with_canvas(Some(canvas))
                    .with_title(WINDOW_TITLE)
                    .with_inner_size(LogicalSize::new(1280.0, 720.0)),
            )
            .map_err(|err| JsValue::from_str(&format!("window error: {err}")))?,
    );

    let library = ModelLibrary::new();
    let renderer = crate::render::Renderer::new(Arc::clone(&window), library.clone())
        .await
        .map_err(|err| JsValue::from_str(&format!("renderer error: {err}")))?;

    let size = window.inner_size();
    let session = Session::new(&scene, size.width, size.height)
        .map_err(|err| JsValue::from_str(&format!("invalid scene: {err}")))?;

    let mut loader = ModelLoader::new("assets", session.model().clone(), library);
    for object in Session::pending_models(&scene) {
        loader.spawn(object);
    }

    log_to_console(&format!(
        "Loaded scene with {} objects ({} lights)",
        scene.objects.len(),
        scene.lights().count()
    ));

    event_loop.spawn_app(App::new(session, renderer));
    Ok(())
}

fn log_to_console(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

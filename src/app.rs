use std::time::Duration;

use anyhow::anyhow;
use glam::Vec2;
use log::{error, info, warn};
use winit::application::ApplicationHandler;
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey as WinitNamedKey};
use winit::window::WindowId;

use crate::input::{KeyCode, MouseButton, NamedKey};
use crate::render::{lights_from_objects, CameraParams, Renderer};
use crate::session::Session;

pub const WINDOW_TITLE: &str = "Rocket Scene";

/// Window front end: forwards winit events to the [`Session`] and renders
/// one frame per redraw.
pub struct App {
    session: Session,
    renderer: Renderer,
    clock: FrameClock,
    title: String,
    last_error: Option<anyhow::Error>,
}

impl App {
    pub fn new(session: Session, renderer: Renderer) -> Self {
        Self {
            session,
            renderer,
            clock: FrameClock::start(),
            title: String::new(),
            last_error: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn take_error(&mut self) -> Option<anyhow::Error> {
        self.last_error.take()
    }

    fn handle_keyboard(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match map_key(&event.logical_key) {
            Some(KeyCode::Named(NamedKey::Escape)) => event_loop.exit(),
            Some(key) => {
                self.session.handle_key(key);
            }
            None => {}
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: WinitMouseButton) {
        let button = map_mouse_button(button);
        match state {
            ElementState::Pressed => self.session.handle_mouse_down(button),
            ElementState::Released => {
                if let Some(outcome) = self.session.handle_mouse_up(button) {
                    info!("click: {outcome:?}");
                }
            }
        }
    }

    fn redraw(&mut self) -> anyhow::Result<()> {
        self.session.advance_frame(self.clock.elapsed());
        self.refresh_title();

        let objects = self.session.model().attached_objects();
        let camera = CameraParams::from_rig(self.session.cameras().active());
        self.renderer
            .update_globals(&camera, &lights_from_objects(&objects));
        match self.renderer.render(&objects) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow!("GPU is out of memory"));
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; retrying next frame");
            }
            Err(wgpu::SurfaceError::Other) => {
                warn!("surface reported an unknown error; retrying next frame");
            }
        }
        Ok(())
    }

    /// Labels are shown in the window title.
    fn refresh_title(&mut self) {
        let title = std::iter::once(WINDOW_TITLE.to_string())
            .chain(self.session.visible_labels())
            .collect::<Vec<_>>()
            .join(" | ");
        if title != self.title {
            self.renderer.window().set_title(&title);
            self.title = title;
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
        self.renderer.window().request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        if window_id != self.renderer.window_id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                self.renderer.resize(size);
                self.session.resize(size.width, size.height);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.renderer.window().inner_size();
                self.renderer.resize(size);
                self.session.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(event_loop, &event),
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.session.handle_scroll(scroll_lines(delta));
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.session
                    .handle_pointer_move(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw() {
                    error!("{err:#}");
                    self.last_error = Some(err);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        self.renderer.window().request_redraw();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        for line in final_state_lines(&self.session) {
            info!("{line}");
        }
    }
}

pub fn map_key(key: &Key) -> Option<KeyCode> {
    match key {
        Key::Character(text) => KeyCode::from_name(text),
        Key::Named(WinitNamedKey::Space) => Some(KeyCode::Named(NamedKey::Space)),
        Key::Named(WinitNamedKey::Escape) => Some(KeyCode::Named(NamedKey::Escape)),
        _ => None,
    }
}

pub fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    let index = match button {
        WinitMouseButton::Left => 0,
        WinitMouseButton::Right => 1,
        WinitMouseButton::Middle => 2,
        WinitMouseButton::Back => 3,
        WinitMouseButton::Forward => 4,
        WinitMouseButton::Other(value) => value.min(u8::MAX as u16) as u8,
    };
    MouseButton::new(index)
}

/// Wheel travel in lines. Pixel deltas from touchpads count 100 pixels per line.
pub fn scroll_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / 100.0,
    }
}

/// Rocket state, active camera, visible labels and every object's placement.
pub fn final_state_lines(session: &Session) -> Vec<String> {
    let rocket = session.flight().state();
    let mut lines = vec![
        format!(
            "Rocket: y={:.2} speed={:.2} launched={}",
            rocket.vertical_position, rocket.vertical_speed, rocket.launched
        ),
        format!("Active camera: {}", session.cameras().active_view().label()),
        format!("Visible labels: {}", session.visible_labels().join(" / ")),
        "Final object states:".to_string(),
    ];
    for object in session.model().all_objects() {
        lines.push(format!(
            " - {} ({}) pos=({:.2}, {:.2}, {:.2}){}",
            object.name,
            object.kind,
            object.position.x,
            object.position.y,
            object.position.z,
            if object.attached { "" } else { " hidden" }
        ));
    }
    lines
}

pub fn print_final_state(session: &Session) {
    for line in final_state_lines(session) {
        println!("{line}");
    }
}

/// Time since the application started.
struct FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    start: std::time::Instant,
    #[cfg(target_arch = "wasm32")]
    start_ms: f64,
}

impl FrameClock {
    fn start() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            start: std::time::Instant::now(),
            #[cfg(target_arch = "wasm32")]
            start_ms: performance_now(),
        }
    }

    fn elapsed(&self) -> Duration {
        #[cfg(not(target_arch = "wasm32"))]
        {
            self.start.elapsed()
        }
        #[cfg(target_arch = "wasm32")]
        {
            Duration::from_secs_f64(((performance_now() - self.start_ms) / 1000.0).max(0.0))
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|performance| performance.now())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    #[test]
    fn maps_keys_case_insensitively() {
        assert_eq!(
            map_key(&Key::Character("b".into())),
            Some(KeyCode::Character('B'))
        );
        assert_eq!(
            map_key(&Key::Named(WinitNamedKey::Space)),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(map_key(&Key::Named(WinitNamedKey::Tab)), None);
    }

    #[test]
    fn escape_is_the_only_named_key_besides_space() {
        assert_eq!(
            map_key(&Key::Named(WinitNamedKey::Escape)),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        assert_eq!(map_key(&Key::Named(WinitNamedKey::Enter)), None);
    }

    #[test]
    fn scroll_deltas_become_lines() {
        assert_eq!(scroll_lines(MouseScrollDelta::LineDelta(0.0, 2.0)), 2.0);
        let pixels = winit::dpi::PhysicalPosition::new(0.0, -50.0);
        assert_eq!(scroll_lines(MouseScrollDelta::PixelDelta(pixels)), -0.5);
    }

    #[test]
    fn maps_mouse_buttons() {
        assert_eq!(map_mouse_button(WinitMouseButton::Left), MouseButton::LEFT);
        assert_eq!(map_mouse_button(WinitMouseButton::Right), MouseButton::RIGHT);
        assert_eq!(map_mouse_button(WinitMouseButton::Other(7)).index(), 7);
    }

    #[test]
    fn final_state_reports_rocket_and_camera() {
        let scene = Scene::default_layout().unwrap();
        let session = Session::new(&scene, 1280, 720).unwrap();
        let lines = final_state_lines(&session);
        assert_eq!(lines[0], "Rocket: y=-60.00 speed=0.00 launched=false");
        assert_eq!(lines[1], "Active camera: normal");
        assert!(lines.iter().any(|line| line == " - rocket-flame (mesh) pos=(-160.00, -100.00, 0.00) hidden"));
    }
}

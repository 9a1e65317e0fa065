use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use glam::{Vec2, Vec3};
use log::{debug, info};

use crate::astronaut::Astronaut;
use crate::camera::{CameraSet, CameraView};
use crate::data_model::DataModel;
use crate::drag::{ClickOutcome, DragSelector};
use crate::flight::{FlightAnimationDriver, FlightRig};
use crate::input::{Command, InputState, KeyCode, MouseButton};
use crate::labels::visible_labels;
use crate::orbit::OrbitController;
use crate::props::Props;
use crate::scene::{ObjectKind, Scene, SceneObject};

pub const ASTRONAUT: &str = "astronaut";
pub const SUN_LIGHT: &str = "sun-light";
pub const DONUT: &str = "golden-donut";

/// All interactive state of one running scene.
///
/// Built once from a scene layout before any input is delivered; platform
/// code forwards events to the `handle_*` methods and calls
/// [`Session::advance_frame`] once per rendered frame.
pub struct Session {
    model: DataModel,
    cameras: CameraSet,
    flight: FlightAnimationDriver,
    drag: DragSelector,
    astronaut: Astronaut,
    props: Props,
    orbit: OrbitController,
    input: InputState,
    now: Duration,
    frames: u64,
}

impl Session {
    pub fn new(scene: &Scene, width: u32, height: u32) -> Result<Self> {
        let input = InputState::new(width, height);
        let cameras = CameraSet::from_objects(&scene.objects, input.aspect())
            .context("invalid camera setup")?;
        let rig = FlightRig::default();
        let rocket = required(scene, &rig.rocket)?;
        let astronaut = required(scene, ASTRONAUT)?;
        let donut = required(scene, DONUT)?;

        // models join the scene once loaded
        let model = DataModel::from_objects(
            scene
                .objects
                .iter()
                .filter(|o| !matches!(o.kind, ObjectKind::Camera | ObjectKind::Model))
                .cloned()
                .collect(),
        );

        Ok(Self {
            flight: FlightAnimationDriver::new(rig, rocket.position),
            astronaut: Astronaut::new(ASTRONAUT, astronaut.position),
            props: Props::new(donut.position),
            orbit: OrbitController::new(),
            drag: DragSelector::new(Some(SUN_LIGHT.to_string())),
            model,
            cameras,
            input,
            now: Duration::ZERO,
            frames: 0,
        })
    }

    /// Objects that have to be loaded from model files.
    pub fn pending_models(scene: &Scene) -> Vec<SceneObject> {
        scene
            .objects
            .iter()
            .filter(|o| o.kind == ObjectKind::Model)
            .cloned()
            .collect()
    }

    pub fn model(&self) -> &DataModel {
        &self.model
    }

    pub fn cameras(&self) -> &CameraSet {
        &self.cameras
    }

    pub fn flight(&self) -> &FlightAnimationDriver {
        &self.flight
    }

    pub fn astronaut(&self) -> &Astronaut {
        &self.astronaut
    }

    pub fn drag(&self) -> &DragSelector {
        &self.drag
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn visible_labels(&self) -> Vec<String> {
        visible_labels(&self.model)
    }

    /// Dispatches a key press. Keys without a command are ignored.
    pub fn handle_key(&mut self, key: KeyCode) -> Option<Command> {
        let command = Command::from_key(key)?;
        self.handle_command(command);
        Some(command)
    }

    pub fn handle_command(&mut self, command: Command) {
        debug!("command {command:?}");
        match command {
            Command::Launch => self.flight.on_launch_command(&self.model),
            Command::Land => self.flight.on_land_command(&self.model),
            Command::CycleCamera => {
                let view = self.cameras.cycle();
                info!("active camera: {}", view.label());
            }
            movement => {
                self.astronaut.handle(movement, self.now, &self.model);
            }
        }
    }

    /// Moves the pointer; while the right button is held the normal camera
    /// orbits its target.
    pub fn handle_pointer_move(&mut self, position: Vec2) {
        self.input.set_pointer_position(position);
        let height = self.input.viewport().1;
        let normal = self.cameras.get_mut(CameraView::Normal);
        self.orbit.drag(normal, position, height);
    }

    pub fn handle_mouse_down(&mut self, button: MouseButton) {
        if button == MouseButton::RIGHT {
            self.orbit.begin(self.input.pointer_position());
        }
    }

    /// A left release is a click; a right release ends the orbit.
    pub fn handle_mouse_up(&mut self, button: MouseButton) -> Option<ClickOutcome> {
        match button {
            MouseButton::LEFT => Some(self.handle_click()),
            MouseButton::RIGHT => {
                self.orbit.end();
                None
            }
            _ => None,
        }
    }

    /// Wheel input in lines, positive when scrolling away from the user.
    pub fn handle_scroll(&mut self, lines: f32) {
        let normal = self.cameras.get_mut(CameraView::Normal);
        self.orbit.zoom(normal, lines);
    }

    pub fn handle_click(&mut self) -> ClickOutcome {
        let ray = self.cameras.active().pointer_ray(self.input.pointer_ndc());
        self.drag.click(&self.model, &ray)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.input.set_viewport(width, height);
        self.cameras.resize(self.input.aspect());
    }

    /// Advances every animation by one frame. `now` is the time since the
    /// session started.
    pub fn advance_frame(&mut self, now: Duration) {
        self.now = now;
        self.frames += 1;

        self.props.advance_frame(&self.model);

        let ray = self.cameras.active().pointer_ray(self.input.pointer_ndc());
        self.drag.update(&self.model, &self.model, &ray);

        self.astronaut.update(now, &self.model);

        let follow = self.cameras.get_mut(CameraView::RocketFollow);
        self.flight.advance_frame(&self.model, follow);
    }

    pub fn rocket_position(&self) -> Vec3 {
        self.flight.rocket_position()
    }
}

fn required<'a>(scene: &'a Scene, name: &str) -> Result<&'a SceneObject> {
    scene
        .get(name)
        .ok_or_else(|| anyhow!("scene layout is missing {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::SceneSurface;
    use crate::input::NamedKey;

    const FRAME: Duration = Duration::from_millis(16);

    fn session() -> Session {
        let scene = Scene::default_layout().unwrap();
        Session::new(&scene, 1280, 720).unwrap()
    }

    fn run(session: &mut Session, frames: u32) {
        for _ in 0..frames {
            let now = FRAME * (session.frames() as u32 + 1);
            session.advance_frame(now);
        }
    }

    #[test]
    fn starts_with_launch_prompt_and_normal_camera() {
        let session = session();
        assert_eq!(session.cameras().active_view(), CameraView::Normal);
        let labels = session.visible_labels();
        assert!(labels.iter().any(|l| l == "Press B to blast off!"));
        assert!(!labels.iter().any(|l| l == "Press R to land rocket!"));
        assert!(session.model().get("rocket").is_none());
        assert_eq!(Session::pending_models(&Scene::default_layout().unwrap()).len(), 2);
    }

    #[test]
    fn launch_then_land_round_trip() {
        let mut session = session();
        session.handle_key(KeyCode::Character('B'));
        run(&mut session, 30);
        let state = session.flight().state();
        assert!(state.launched);
        assert!(state.vertical_position > -60.0);
        assert!(session.model().contains_object("rocket-flame"));
        let follow = session.cameras().get(CameraView::RocketFollow);
        assert!(follow.position.y > 0.0);

        session.handle_key(KeyCode::Character('r'));
        run(&mut session, 400);
        let state = session.flight().state();
        assert_eq!(state.vertical_position, -63.0);
        assert_eq!(state.vertical_speed, 0.0);
        assert!(!session.model().contains_object("rocket-flame"));
        assert_eq!(session.cameras().get(CameraView::RocketFollow).position.y, 0.0);
    }

    #[test]
    fn camera_key_cycles() {
        let mut session = session();
        session.handle_key(KeyCode::Character('c'));
        assert_eq!(session.cameras().active_view(), CameraView::RocketFollow);
        session.handle_key(KeyCode::Character('C'));
        session.handle_key(KeyCode::Character('c'));
        assert_eq!(session.cameras().active_view(), CameraView::Normal);
    }

    #[test]
    fn astronaut_jump_uses_frame_clock() {
        let mut session = session();
        let start = session.astronaut().position();
        run(&mut session, 1);
        session.handle_key(KeyCode::Named(NamedKey::Space));
        assert_eq!(session.astronaut().position().y, start.y + 15.0);
        run(&mut session, 30);
        assert_eq!(session.astronaut().position().y, start.y + 15.0);
        run(&mut session, 2);
        assert_eq!(session.astronaut().position(), start);
    }

    #[test]
    fn clicking_the_sun_drags_it_with_its_light() {
        let mut session = session();
        let sun = Vec3::new(100.0, 0.0, 0.0);
        session.model().set_position("sun", sun);
        let view_proj = session.cameras().active().view_proj();
        let clip = view_proj * sun.extend(1.0);
        let ndc = Vec2::new(clip.x / clip.w, clip.y / clip.w);
        let pixel = Vec2::new((ndc.x + 1.0) * 0.5 * 1280.0, (1.0 - ndc.y) * 0.5 * 720.0);

        session.handle_pointer_move(pixel);
        assert_eq!(session.handle_click(), ClickOutcome::Grabbed("sun".into()));

        session.handle_pointer_move(Vec2::new(640.0, 360.0));
        run(&mut session, 1);
        let moved = session.model().get("sun").unwrap().position;
        assert_ne!(moved, sun);
        assert_eq!(session.model().position(SUN_LIGHT), Some(moved));

        assert_eq!(
            session.handle_click(),
            ClickOutcome::Released("sun".into())
        );
        run(&mut session, 1);
        assert_eq!(session.model().get("sun").unwrap().position, moved);
    }

    #[test]
    fn right_drag_orbits_only_the_normal_camera() {
        let mut session = session();
        let before = session.cameras().clone();
        let normal = *before.get(CameraView::Normal);
        let radius = normal.position.distance(normal.target);

        session.handle_pointer_move(Vec2::new(600.0, 300.0));
        session.handle_mouse_down(MouseButton::RIGHT);
        session.handle_pointer_move(Vec2::new(700.0, 340.0));
        assert_eq!(session.handle_mouse_up(MouseButton::RIGHT), None);

        let orbited = session.cameras().get(CameraView::Normal);
        assert_ne!(orbited.position, normal.position);
        assert_eq!(orbited.target, normal.target);
        assert!((orbited.position.distance(orbited.target) - radius).abs() < 1e-2);
        for view in [CameraView::RocketFollow, CameraView::Mars] {
            assert_eq!(session.cameras().get(view), before.get(view));
        }

        // released: further motion leaves the camera alone
        let settled = orbited.position;
        session.handle_pointer_move(Vec2::new(100.0, 100.0));
        assert_eq!(session.cameras().get(CameraView::Normal).position, settled);
    }

    #[test]
    fn wheel_zooms_the_normal_camera() {
        let mut session = session();
        let normal = *session.cameras().get(CameraView::Normal);
        let radius = normal.position.distance(normal.target);
        session.handle_key(KeyCode::Character('c'));
        session.handle_scroll(2.0);
        let zoomed = session.cameras().get(CameraView::Normal);
        assert!(zoomed.position.distance(zoomed.target) < radius);
        assert_eq!(session.cameras().active_view(), CameraView::RocketFollow);
    }

    #[test]
    fn left_release_is_a_click() {
        let mut session = session();
        session.handle_pointer_move(Vec2::new(5.0, 5.0));
        assert!(matches!(
            session.handle_mouse_up(MouseButton::LEFT),
            Some(ClickOutcome::Missed) | Some(ClickOutcome::Grabbed(_))
        ));
        assert_eq!(session.handle_mouse_up(MouseButton::new(2)), None);
    }

    #[test]
    fn missing_rocket_is_an_error() {
        let mut scene = Scene::default_layout().unwrap();
        scene.objects.retain(|o| o.name != "rocket");
        assert!(Session::new(&scene, 640, 480).is_err());
    }
}

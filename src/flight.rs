//! Rocket launch and landing animation.
//!
//! The driver keeps the rocket's vertical state itself so the animation runs
//! whether or not the rocket model has finished loading; scene objects are
//! only ever addressed by name through a [`SceneSurface`].

use glam::Vec3;
use log::info;

use crate::camera::CameraRig;
use crate::data_model::SceneSurface;
use crate::labels::swap_labels;

/// Height the rocket snaps to when it touches down.
pub const FLOOR_HEIGHT: f32 = -63.0;
/// Once the floored height reaches this value the rocket counts as landed.
pub const LANDED_HEIGHT: f32 = -64.0;
pub const LAUNCH_SPEED: f32 = 1.0;
pub const LAND_SPEED: f32 = -0.01;
/// Subtracted from a negative speed every airborne frame.
pub const DESCENT_ACCELERATION: f32 = 0.2;
/// Positive speeds below [`ASCENT_SPEED_CAP`] are multiplied by this every frame.
pub const ASCENT_FACTOR: f32 = 1.04;
pub const ASCENT_SPEED_CAP: f32 = 10.0;
/// Where the flame waits while the rocket is on the ground.
pub const FLAME_PARKED_HEIGHT: f32 = -100.0;

/// Names of the scene objects the driver moves and toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightRig {
    pub rocket: String,
    pub flame: String,
    pub flame_light: String,
    pub launch_prompt: String,
    pub land_prompt: String,
}

impl Default for FlightRig {
    fn default() -> Self {
        Self {
            rocket: "rocket".into(),
            flame: "rocket-flame".into(),
            flame_light: "rocket-flame-light".into(),
            launch_prompt: "launch-prompt".into(),
            land_prompt: "land-prompt".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketState {
    pub vertical_position: f32,
    pub vertical_speed: f32,
    pub launched: bool,
}

impl RocketState {
    pub fn resting(height: f32) -> Self {
        Self {
            vertical_position: height,
            vertical_speed: 0.0,
            launched: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FlightAnimationDriver {
    rig: FlightRig,
    anchor: Vec3,
    state: RocketState,
}

impl FlightAnimationDriver {
    /// Creates a driver for a rocket resting at `anchor`.
    pub fn new(rig: FlightRig, anchor: Vec3) -> Self {
        Self::with_state(rig, anchor, RocketState::resting(anchor.y))
    }

    pub fn with_state(rig: FlightRig, anchor: Vec3, state: RocketState) -> Self {
        Self { rig, anchor, state }
    }

    pub fn state(&self) -> RocketState {
        self.state
    }

    pub fn rig(&self) -> &FlightRig {
        &self.rig
    }

    pub fn rocket_position(&self) -> Vec3 {
        Vec3::new(self.anchor.x, self.state.vertical_position, self.anchor.z)
    }

    pub fn on_launch_command<S: SceneSurface + ?Sized>(&mut self, surface: &S) {
        self.state.launched = true;
        self.state.vertical_speed = LAUNCH_SPEED;
        swap_labels(surface, &self.rig.launch_prompt, &self.rig.land_prompt);
        surface.add_object(&self.rig.flame);
        surface.add_object(&self.rig.flame_light);
        info!("rocket launch requested");
    }

    pub fn on_land_command<S: SceneSurface + ?Sized>(&mut self, surface: &S) {
        self.state.launched = false;
        self.state.vertical_speed = LAND_SPEED;
        swap_labels(surface, &self.rig.land_prompt, &self.rig.launch_prompt);
        info!("rocket landing requested");
    }

    /// Advances the animation by one frame. Returns `true` on the frame the
    /// rocket touches down.
    ///
    /// The airborne and landed checks are evaluated one after the other, so
    /// the frame that carries the rocket below the floor also lands it.
    pub fn advance_frame<S: SceneSurface + ?Sized>(
        &mut self,
        surface: &S,
        follow: &mut CameraRig,
    ) -> bool {
        let state = &mut self.state;

        if state.vertical_position.floor() >= FLOOR_HEIGHT {
            if state.vertical_speed < 0.0 {
                state.vertical_speed -= DESCENT_ACCELERATION;
            } else if state.vertical_speed > 0.0 && state.vertical_speed < ASCENT_SPEED_CAP {
                state.vertical_speed *= ASCENT_FACTOR;
            }
            let delta = state.vertical_speed;
            state.vertical_position += delta;

            surface.set_height(&self.rig.rocket, state.vertical_position);
            surface.translate(&self.rig.flame, Vec3::Y * delta);
            surface.translate(&self.rig.flame_light, Vec3::Y * delta);
            follow.position.y += delta;
            follow.look_at(Vec3::new(
                self.anchor.x,
                state.vertical_position,
                self.anchor.z,
            ));
        }

        if state.vertical_position.floor() <= LANDED_HEIGHT {
            state.vertical_speed = 0.0;
            state.vertical_position = FLOOR_HEIGHT;
            surface.set_height(&self.rig.rocket, FLOOR_HEIGHT);
            surface.remove_object(&self.rig.flame);
            surface.remove_object(&self.rig.flame_light);
            surface.set_height(&self.rig.flame, FLAME_PARKED_HEIGHT);
            surface.set_height(&self.rig.flame_light, FLAME_PARKED_HEIGHT);
            follow.position.y = 0.0;
            info!("rocket touched down");
            return true;
        }
        false
    }
}

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec2, Vec3};

use crate::camera::CameraRig;

/// Highest elevation reachable before the view would flip over the pole.
const MAX_ELEVATION: f32 = FRAC_PI_2 - 1e-3;
/// Per wheel line, the distance is scaled by this factor (or its inverse).
pub const ZOOM_STEP: f32 = 0.95;
pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 1900.0;

/// Mouse orbit around a camera's look-at target.
///
/// A full viewport height of pointer travel turns the camera once around
/// the target. The target itself never moves.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitController {
    orbiting: bool,
    last_pointer: Option<Vec2>,
}

impl OrbitController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_orbiting(&self) -> bool {
        self.orbiting
    }

    pub fn begin(&mut self, pointer: Vec2) {
        self.orbiting = true;
        self.last_pointer = Some(pointer);
    }

    pub fn end(&mut self) {
        self.orbiting = false;
        self.last_pointer = None;
    }

    /// Turns `rig` by the pointer travel since the last call. Does nothing
    /// unless an orbit is in progress.
    pub fn drag(&mut self, rig: &mut CameraRig, pointer: Vec2, viewport_height: u32) {
        if !self.orbiting {
            return;
        }
        let Some(last) = self.last_pointer.replace(pointer) else {
            return;
        };
        let delta = (pointer - last) * TAU / viewport_height.max(1) as f32;
        let mut spherical = Spherical::from_offset(rig.position - rig.target);
        spherical.azimuth -= delta.x;
        spherical.elevation = (spherical.elevation + delta.y).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        rig.position = rig.target + spherical.to_offset();
    }

    /// Moves `rig` towards its target for positive `lines`, away for negative.
    pub fn zoom(&self, rig: &mut CameraRig, lines: f32) {
        let mut spherical = Spherical::from_offset(rig.position - rig.target);
        spherical.distance =
            (spherical.distance * ZOOM_STEP.powf(lines)).clamp(MIN_DISTANCE, MAX_DISTANCE);
        rig.position = rig.target + spherical.to_offset();
    }
}

#[derive(Debug, Clone, Copy)]
struct Spherical {
    distance: f32,
    azimuth: f32,
    elevation: f32,
}

impl Spherical {
    fn from_offset(offset: Vec3) -> Self {
        let distance = offset.length().max(MIN_DISTANCE);
        Self {
            distance,
            azimuth: offset.x.atan2(offset.z),
            elevation: (offset.y / distance).clamp(-1.0, 1.0).asin(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let flat = self.distance * self.elevation.cos();
        Vec3::new(
            flat * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            flat * self.azimuth.cos(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 0.0, 300.0), Vec3::ZERO, 75.0, 16.0 / 9.0)
    }

    #[test]
    fn horizontal_drag_circles_the_target() {
        let mut rig = rig();
        let mut orbit = OrbitController::new();
        orbit.begin(Vec2::new(100.0, 100.0));
        // a quarter of the viewport height is a quarter turn
        orbit.drag(&mut rig, Vec2::new(280.0, 100.0), 720);
        assert!((rig.position - Vec3::new(-300.0, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(rig.target, Vec3::ZERO);
    }

    #[test]
    fn vertical_drag_stops_short_of_the_pole() {
        let mut rig = rig();
        let mut orbit = OrbitController::new();
        orbit.begin(Vec2::ZERO);
        orbit.drag(&mut rig, Vec2::new(0.0, 5000.0), 720);
        assert!(rig.position.y > 299.0);
        assert!(rig.position.z > 0.0);
        assert!((rig.position.length() - 300.0).abs() < 1e-2);
    }

    #[test]
    fn drag_without_begin_is_ignored() {
        let mut rig = rig();
        let mut orbit = OrbitController::new();
        orbit.drag(&mut rig, Vec2::new(500.0, 0.0), 720);
        assert_eq!(rig.position, Vec3::new(0.0, 0.0, 300.0));
        orbit.begin(Vec2::ZERO);
        orbit.end();
        orbit.drag(&mut rig, Vec2::new(500.0, 0.0), 720);
        assert_eq!(rig.position, Vec3::new(0.0, 0.0, 300.0));
    }

    #[test]
    fn zoom_scales_distance_within_bounds() {
        let mut rig = rig();
        let orbit = OrbitController::new();
        orbit.zoom(&mut rig, 1.0);
        assert!((rig.position.z - 285.0).abs() < 1e-3);
        orbit.zoom(&mut rig, -1000.0);
        assert!((rig.position.z - MAX_DISTANCE).abs() < 1e-2);
        orbit.zoom(&mut rig, 1000.0);
        assert!((rig.position.z - MIN_DISTANCE).abs() < 1e-3);
    }
}

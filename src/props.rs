use glam::{EulerRot, Quat, Vec3};

use crate::data_model::{DataModel, SceneSurface};

pub const SUN_SPIN: f32 = 0.06;
pub const DONUT_VELOCITY: Vec3 = Vec3::new(0.8, -0.5, -0.5);
pub const DONUT_SPIN: f32 = 0.03;
pub const DONUT_WRAP_X: f32 = 800.0;

/// Background motion that runs every frame regardless of input.
#[derive(Debug, Clone)]
pub struct Props {
    pub sun: String,
    pub donut: String,
    pub donut_light: String,
    /// Where the donut and its light restart once they drift past the wrap line.
    pub donut_home: Vec3,
}

impl Props {
    pub fn new(donut_home: Vec3) -> Self {
        Self {
            sun: "sun".into(),
            donut: "golden-donut".into(),
            donut_light: "donut-light".into(),
            donut_home,
        }
    }

    pub fn advance_frame(&self, model: &DataModel) {
        model.rotate(&self.sun, Vec3::new(0.0, SUN_SPIN.to_degrees(), 0.0));

        model.translate(&self.donut, DONUT_VELOCITY);
        model.update(&self.donut, |donut| {
            donut.rotation = spin_about_own_axes(donut.rotation, DONUT_SPIN);
        });
        model.translate(&self.donut_light, DONUT_VELOCITY);

        if model.position(&self.donut).is_some_and(|p| p.x >= DONUT_WRAP_X) {
            model.set_position(&self.donut, self.donut_home);
            model.set_position(&self.donut_light, self.donut_home);
        }
    }
}

/// Turns an orientation by `angle` radians about its own X, then Y, then Z
/// axis. Orientations are Euler degrees applied Z * Y * X.
fn spin_about_own_axes(degrees: Vec3, angle: f32) -> Vec3 {
    let turned = orientation(degrees)
        * Quat::from_rotation_x(angle)
        * Quat::from_rotation_y(angle)
        * Quat::from_rotation_z(angle);
    let (z, y, x) = turned.to_euler(EulerRot::ZYX);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

fn orientation(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        degrees.z.to_radians(),
        degrees.y.to_radians(),
        degrees.x.to_radians(),
    )
}

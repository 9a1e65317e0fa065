use glam::{Mat4, Vec3};

use crate::camera::CameraRig;
use crate::scene::{ObjectKind, SceneObject};

/// Lights beyond this count are ignored by the shader.
pub const MAX_LIGHTS: usize = 4;

/// Camera parameters consumed by the renderer's uniform buffer.
#[derive(Clone, Debug)]
pub struct CameraParams {
    pub view_proj: Mat4,
    pub position: Vec3,
}

impl CameraParams {
    pub fn from_rig(rig: &CameraRig) -> Self {
        Self {
            view_proj: rig.view_proj(),
            position: rig.position,
        }
    }
}

/// Lighting state consumed by the renderer's uniform buffer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

/// Attached lights in scene order, capped at [`MAX_LIGHTS`].
pub fn lights_from_objects(objects: &[SceneObject]) -> Vec<LightParams> {
    objects
        .iter()
        .filter(|object| object.kind == ObjectKind::Light && object.attached)
        .take(MAX_LIGHTS)
        .map(|light| LightParams {
            position: light.position,
            color: light.color,
            intensity: light.intensity,
        })
        .collect()
}

/// Whether the renderer draws geometry for this object.
pub fn object_wants_mesh(object: &SceneObject) -> bool {
    object.attached
        && match object.kind {
            ObjectKind::Mesh => object.shape.is_some(),
            ObjectKind::Model => object.mesh.is_some(),
            ObjectKind::Light | ObjectKind::Label | ObjectKind::Camera => false,
        }
}

pub fn object_model_matrix(object: &SceneObject) -> Mat4 {
    let translation = Mat4::from_translation(object.position);
    let rotation = Mat4::from_rotation_z(object.rotation.z.to_radians())
        * Mat4::from_rotation_y(object.rotation.y.to_radians())
        * Mat4::from_rotation_x(object.rotation.x.to_radians());
    translation * rotation * Mat4::from_scale(object.scale)
}

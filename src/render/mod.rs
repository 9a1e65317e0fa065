pub mod common;
mod gpu;
pub mod shared;

pub use common::{lights_from_objects, CameraParams, LightParams, MAX_LIGHTS};
pub use gpu::Renderer;
pub use shared::primitive_mesh;

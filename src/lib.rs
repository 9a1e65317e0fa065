//! Interactive rocket launch scene.
//!
//! A rocket that launches and lands on key presses while a follow camera
//! tracks it, a sun that can be picked up and dragged around with its light,
//! a keyboard controlled astronaut and a few props that animate on their own.
//!
//! All behavior lives in [`Session`], which talks to the scene only through
//! the [`SceneSurface`] and [`Raycaster`] traits and can run headless. The
//! window, renderer and browser entry point are thin layers on top.

pub mod app;
pub mod assets;
pub mod astronaut;
pub mod camera;
pub mod data_model;
pub mod drag;
pub mod flight;
pub mod input;
pub mod labels;
pub mod obj;
pub mod orbit;
pub mod picking;
pub mod props;
pub mod render;
pub mod scene;
pub mod session;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use assets::{default_asset_root, AssetError, ModelLibrary, ModelLoader};
pub use astronaut::Astronaut;
pub use camera::{CameraRig, CameraSet, CameraView};
pub use data_model::{DataModel, SceneSurface};
pub use drag::{ClickOutcome, DragSelector};
pub use flight::{FlightAnimationDriver, FlightRig, RocketState};
pub use input::{Command, InputState, KeyCode, MouseButton, NamedKey, ScriptedKey};
pub use obj::{load_obj_from_str, ModelNode, ObjMesh};
pub use orbit::OrbitController;
pub use picking::{Hit, Ray, Raycaster};
pub use props::Props;
pub use render::{CameraParams, LightParams, Renderer};
pub use scene::{ObjectKind, Scene, SceneObject, Shape, DEFAULT_SCENE_XML};
pub use session::Session;

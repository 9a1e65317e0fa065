use anyhow::{anyhow, Result};
use glam::{Mat4, Vec2, Vec3};

use crate::picking::Ray;
use crate::scene::{ObjectKind, SceneObject};

/// The three fixed views, in cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraView {
    Normal,
    RocketFollow,
    Mars,
}

impl CameraView {
    pub const ALL: [CameraView; 3] = [Self::Normal, Self::RocketFollow, Self::Mars];

    /// Name of the camera object describing this view in the scene layout.
    pub fn object_name(self) -> &'static str {
        match self {
            Self::Normal => "normal-camera",
            Self::RocketFollow => "rocket-camera",
            Self::Mars => "mars-camera",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::RocketFollow => "rocket",
            Self::Mars => "mars",
        }
    }
}

/// Perspective camera looking at a fixed point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraRig {
    pub fn new(position: Vec3, target: Vec3, fov: f32, aspect: f32) -> Self {
        Self {
            position,
            target,
            fov,
            aspect,
            near: 0.1,
            far: 2000.0,
        }
    }

    pub fn from_object(object: &SceneObject, aspect: f32) -> Self {
        let target = object
            .target
            .unwrap_or(object.position + Vec3::NEG_Z);
        Self::new(object.position, target, object.fov, aspect)
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect.max(0.01), self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the camera through a pointer given in normalized device coordinates.
    pub fn pointer_ray(&self, ndc: Vec2) -> Ray {
        Ray::from_ndc(ndc, self.view_proj())
    }
}

/// Exactly three cameras, one of which is active.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSet {
    rigs: [CameraRig; 3],
    cycles: usize,
}

impl CameraSet {
    pub fn new(normal: CameraRig, rocket: CameraRig, mars: CameraRig) -> Self {
        Self {
            rigs: [normal, rocket, mars],
            cycles: 0,
        }
    }

    /// Builds the set from the camera objects of a scene layout.
    pub fn from_objects(objects: &[SceneObject], aspect: f32) -> Result<Self> {
        let cameras = objects
            .iter()
            .filter(|object| object.kind == ObjectKind::Camera)
            .collect::<Vec<_>>();
        if cameras.len() != CameraView::ALL.len() {
            return Err(anyhow!(
                "scene must define exactly 3 cameras, found {}",
                cameras.len()
            ));
        }
        let rig = |view: CameraView| {
            cameras
                .iter()
                .find(|camera| camera.name == view.object_name())
                .map(|camera| CameraRig::from_object(camera, aspect))
                .ok_or_else(|| anyhow!("scene is missing camera {}", view.object_name()))
        };
        Ok(Self::new(
            rig(CameraView::Normal)?,
            rig(CameraView::RocketFollow)?,
            rig(CameraView::Mars)?,
        ))
    }

    pub fn active_index(&self) -> usize {
        self.cycles % self.rigs.len()
    }

    pub fn active_view(&self) -> CameraView {
        CameraView::ALL[self.active_index()]
    }

    pub fn active(&self) -> &CameraRig {
        &self.rigs[self.active_index()]
    }

    pub fn active_mut(&mut self) -> &mut CameraRig {
        let index = self.active_index();
        &mut self.rigs[index]
    }

    pub fn get(&self, view: CameraView) -> &CameraRig {
        &self.rigs[view as usize]
    }

    pub fn get_mut(&mut self, view: CameraView) -> &mut CameraRig {
        &mut self.rigs[view as usize]
    }

    /// Advances to the next camera.
    pub fn cycle(&mut self) -> CameraView {
        self.cycles += 1;
        self.active_view()
    }

    /// Applies a new aspect ratio to the active camera only.
    pub fn resize(&mut self, aspect: f32) {
        self.active_mut().aspect = aspect;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Scene;

    fn rig(z: f32) -> CameraRig {
        CameraRig::new(Vec3::new(0.0, 0.0, z), Vec3::ZERO, 75.0, 16.0 / 9.0)
    }

    #[test]
    fn cycling_wraps_every_three_calls() {
        let mut cameras = CameraSet::new(rig(1.0), rig(2.0), rig(3.0));
        let mut seen = vec![cameras.active_view()];
        for _ in 0..5 {
            seen.push(cameras.cycle());
        }
        use CameraView::*;
        assert_eq!(seen, [Normal, RocketFollow, Mars, Normal, RocketFollow, Mars]);
        assert_eq!(cameras.active().position.z, 3.0);
        cameras.cycle();
        assert_eq!(cameras.active_index(), 0);
    }

    #[test]
    fn resize_only_touches_active_camera() {
        let mut cameras = CameraSet::new(rig(1.0), rig(2.0), rig(3.0));
        cameras.cycle();
        cameras.resize(2.0);
        assert_eq!(cameras.get(CameraView::RocketFollow).aspect, 2.0);
        assert_eq!(cameras.get(CameraView::Normal).aspect, 16.0 / 9.0);
    }

    #[test]
    fn default_layout_cameras() {
        let scene = Scene::default_layout().unwrap();
        let cameras = CameraSet::from_objects(&scene.objects, 1.0).unwrap();
        let follow = cameras.get(CameraView::RocketFollow);
        assert_eq!(follow.position, Vec3::new(-160.0, 0.0, 300.0));
        assert_eq!(cameras.active_view(), CameraView::Normal);
    }

    #[test]
    fn wrong_camera_count_is_an_error() {
        let scene = Scene::from_xml(
            "<scene><object><name>normal-camera</name><type>camera</type></object></scene>",
        )
        .unwrap();
        assert!(CameraSet::from_objects(&scene.objects, 1.0).is_err());
    }
}

use std::sync::Arc;

use glam::Vec3;
use parking_lot::RwLock;

use crate::picking::{cast_objects, Hit, Ray, Raycaster};
use crate::scene::SceneObject;

/// Scene membership and placement, as seen by the animation code.
///
/// Objects are addressed by name; callers never hold on to them.
pub trait SceneSurface {
    /// Attaches a known object to the rendered scene. Returns `false` when the
    /// object does not exist.
    fn add_object(&self, name: &str) -> bool;
    /// Detaches an object, keeping it known for a later [`add_object`].
    ///
    /// [`add_object`]: SceneSurface::add_object
    fn remove_object(&self, name: &str) -> bool;
    fn contains_object(&self, name: &str) -> bool;
    fn position(&self, name: &str) -> Option<Vec3>;
    fn set_position(&self, name: &str, position: Vec3) -> bool;

    fn translate(&self, name: &str, delta: Vec3) -> bool {
        match self.position(name) {
            Some(position) => self.set_position(name, position + delta),
            None => false,
        }
    }

    fn set_height(&self, name: &str, height: f32) -> bool {
        match self.position(name) {
            Some(position) => {
                self.set_position(name, Vec3::new(position.x, height, position.z))
            }
            None => false,
        }
    }
}

/// Thread-safe container mirroring the mutable state of the scene graph.
#[derive(Debug, Default)]
pub struct DataModel {
    objects: Arc<RwLock<Vec<SceneObject>>>,
}

impl Clone for DataModel {
    fn clone(&self) -> Self {
        Self {
            objects: Arc::clone(&self.objects),
        }
    }
}

impl DataModel {
    /// Creates an empty data model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a data model from an initial set of objects.
    pub fn from_objects(objects: Vec<SceneObject>) -> Self {
        Self {
            objects: Arc::new(RwLock::new(objects)),
        }
    }

    /// Adds an object, replacing any previous object with the same name.
    pub fn insert(&self, object: SceneObject) {
        let mut guard = self.objects.write();
        match guard.iter_mut().find(|existing| existing.name == object.name) {
            Some(existing) => *existing = object,
            None => guard.push(object),
        }
    }

    /// Returns a snapshot of all stored objects, attached or not.
    pub fn all_objects(&self) -> Vec<SceneObject> {
        self.objects.read().clone()
    }

    /// Returns a snapshot of the objects currently in the rendered scene.
    pub fn attached_objects(&self) -> Vec<SceneObject> {
        self.objects
            .read()
            .iter()
            .filter(|object| object.attached)
            .cloned()
            .collect()
    }

    /// Returns a clone of the requested object.
    pub fn get(&self, name: &str) -> Option<SceneObject> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .cloned()
    }

    /// Applies a mutation to the requested object.
    pub fn update<F, R>(&self, name: &str, mut updater: F) -> Option<R>
    where
        F: FnMut(&mut SceneObject) -> R,
    {
        let mut guard = self.objects.write();
        let object = guard.iter_mut().find(|object| object.name == name)?;
        Some(updater(object))
    }

    pub fn set_rotation(&self, name: &str, rotation: Vec3) -> bool {
        self.update(name, |obj| obj.rotation = rotation).is_some()
    }

    pub fn rotate(&self, name: &str, degrees: Vec3) -> bool {
        self.update(name, |obj| obj.rotation += degrees).is_some()
    }

    pub fn set_target(&self, name: &str, target: Vec3) -> bool {
        self.update(name, |obj| obj.target = Some(target)).is_some()
    }
}

impl SceneSurface for DataModel {
    fn add_object(&self, name: &str) -> bool {
        self.update(name, |obj| obj.attached = true).is_some()
    }

    fn remove_object(&self, name: &str) -> bool {
        self.update(name, |obj| obj.attached = false).is_some()
    }

    fn contains_object(&self, name: &str) -> bool {
        self.objects
            .read()
            .iter()
            .any(|object| object.name == name && object.attached)
    }

    fn position(&self, name: &str) -> Option<Vec3> {
        self.objects
            .read()
            .iter()
            .find(|object| object.name == name)
            .map(|object| object.position)
    }

    fn set_position(&self, name: &str, position: Vec3) -> bool {
        self.update(name, |obj| obj.position = position).is_some()
    }
}

impl Raycaster for DataModel {
    fn cast(&self, ray: &Ray, exclude: Option<&str>) -> Option<Hit> {
        cast_objects(self.objects.read().iter(), ray, exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;

    fn make_object(name: &str) -> SceneObject {
        SceneObject {
            name: name.to_string(),
            ..SceneObject::default()
        }
    }

    #[test]
    fn insert_replaces_by_name() {
        let model = DataModel::from_objects(vec![make_object("rocket")]);
        model.insert(SceneObject {
            position: Vec3::Y,
            ..make_object("rocket")
        });
        model.insert(make_object("astronaut"));
        assert_eq!(model.all_objects().len(), 2);
        assert_eq!(model.position("rocket"), Some(Vec3::Y));
    }

    #[test]
    fn membership_toggles_keep_the_object() {
        let model = DataModel::from_objects(vec![make_object("flame")]);
        assert!(model.contains_object("flame"));
        assert!(model.remove_object("flame"));
        assert!(!model.contains_object("flame"));
        assert!(model.get("flame").is_some());
        assert!(model.attached_objects().is_empty());
        assert!(model.add_object("flame"));
        assert!(model.add_object("flame"));
        assert_eq!(model.attached_objects().len(), 1);
    }

    #[test]
    fn placement_helpers() {
        let model = DataModel::from_objects(vec![make_object("rocket")]);
        assert!(model.translate("rocket", Vec3::new(1.0, 2.0, 3.0)));
        assert!(model.set_height("rocket", -63.0));
        assert_eq!(model.position("rocket"), Some(Vec3::new(1.0, -63.0, 3.0)));
        assert!(!model.translate("unknown", Vec3::ONE));
        assert!(!model.add_object("unknown"));
    }

    #[test]
    fn raycast_ignores_detached_objects() {
        let mut sun = make_object("sun");
        sun.shape = Some(Shape::Sphere { radius: 1.0 });
        let model = DataModel::from_objects(vec![sun]);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(model.cast(&ray, None).map(|hit| hit.name), Some("sun".into()));
        model.remove_object("sun");
        assert!(model.cast(&ray, None).is_none());
    }
}

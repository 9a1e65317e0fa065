use glam::Vec3;
use log::info;

use crate::data_model::SceneSurface;
use crate::picking::{Ray, Raycaster};

/// Result of a click on the scene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Grabbed(String),
    Released(String),
    Missed,
}

/// Click-to-grab, click-to-drop selector.
///
/// The dragged object is remembered by name only. While something is held,
/// a companion light follows it.
#[derive(Debug, Clone, Default)]
pub struct DragSelector {
    dragged: Option<String>,
    companion_light: Option<String>,
}

impl DragSelector {
    pub fn new(companion_light: Option<String>) -> Self {
        Self {
            dragged: None,
            companion_light,
        }
    }

    pub fn dragged(&self) -> Option<&str> {
        self.dragged.as_deref()
    }

    /// A click releases whatever is held, otherwise grabs the first object
    /// under the pointer if it is draggable.
    pub fn click<R: Raycaster + ?Sized>(&mut self, raycaster: &R, ray: &Ray) -> ClickOutcome {
        if let Some(name) = self.dragged.take() {
            info!("released {name}");
            return ClickOutcome::Released(name);
        }
        match raycaster.cast(ray, None) {
            Some(hit) if hit.draggable => {
                info!("grabbed {}", hit.name);
                self.dragged = Some(hit.name.clone());
                ClickOutcome::Grabbed(hit.name)
            }
            _ => ClickOutcome::Missed,
        }
    }

    /// Moves the held object and the companion light to where the pointer ray
    /// meets the rest of the scene.
    pub fn update<S, R>(&self, surface: &S, raycaster: &R, ray: &Ray) -> Option<Vec3>
    where
        S: SceneSurface + ?Sized,
        R: Raycaster + ?Sized,
    {
        let name = self.dragged.as_deref()?;
        let hit = raycaster.cast(ray, Some(name))?;
        surface.set_position(name, hit.point);
        if let Some(light) = &self.companion_light {
            surface.set_position(light, hit.point);
        }
        Some(hit.point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::DataModel;
    use crate::scene::{ObjectKind, SceneObject, Shape};

    fn scene() -> DataModel {
        DataModel::from_objects(vec![
            SceneObject {
                name: "sun".into(),
                shape: Some(Shape::Sphere { radius: 1.0 }),
                draggable: true,
                ..SceneObject::default()
            },
            SceneObject {
                name: "wall".into(),
                shape: Some(Shape::Box {
                    size: Vec3::new(20.0, 20.0, 2.0),
                }),
                position: Vec3::new(0.0, 0.0, -10.0),
                extent: Vec3::new(10.0, 10.0, 1.0),
                ..SceneObject::default()
            },
            SceneObject {
                name: "sun-light".into(),
                kind: ObjectKind::Light,
                ..SceneObject::default()
            },
        ])
    }

    fn towards(x: f32) -> Ray {
        Ray::new(Vec3::new(x, 0.0, 10.0), Vec3::NEG_Z)
    }

    #[test]
    fn click_toggles_between_grab_and_release() {
        let model = scene();
        let mut drag = DragSelector::new(Some("sun-light".into()));
        assert_eq!(
            drag.click(&model, &towards(0.0)),
            ClickOutcome::Grabbed("sun".into())
        );
        assert_eq!(drag.dragged(), Some("sun"));
        // the second click releases regardless of what it hits
        assert_eq!(
            drag.click(&model, &towards(100.0)),
            ClickOutcome::Released("sun".into())
        );
        assert_eq!(drag.dragged(), None);
    }

    #[test]
    fn non_draggable_hit_is_ignored() {
        let model = scene();
        let mut drag = DragSelector::default();
        assert_eq!(drag.click(&model, &towards(5.0)), ClickOutcome::Missed);
        assert_eq!(drag.click(&model, &towards(50.0)), ClickOutcome::Missed);
        assert!(drag.dragged().is_none());
    }

    #[test]
    fn held_object_and_light_follow_pointer() {
        let model = scene();
        let mut drag = DragSelector::new(Some("sun-light".into()));
        assert!(drag.update(&model, &model, &towards(3.0)).is_none());
        drag.click(&model, &towards(0.0));

        let point = drag.update(&model, &model, &towards(3.0)).unwrap();
        assert!((point - Vec3::new(3.0, 0.0, -9.0)).length() < 1e-4);
        assert_eq!(model.get("sun").unwrap().position, point);
        assert_eq!(model.get("sun-light").unwrap().position, point);
    }
}

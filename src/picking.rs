use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::scene::{ObjectKind, SceneObject, Shape};

/// Half-line used for pointer picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Builds the ray passing through `ndc` by unprojecting the near and far
    /// planes (depth range `0..1`).
    pub fn from_ndc(ndc: Vec2, view_proj: Mat4) -> Self {
        let inverse = view_proj.inverse();
        let near = inverse * Vec4::new(ndc.x, ndc.y, 0.0, 1.0);
        let far = inverse * Vec4::new(ndc.x, ndc.y, 1.0, 1.0);
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        Self::new(near, far - near)
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance to the first sphere surface crossing in front of the origin.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let offset = self.origin - center;
        let b = offset.dot(self.direction);
        let c = offset.length_squared() - radius * radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        let near = -b - root;
        let far = -b + root;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            Some(far)
        } else {
            None
        }
    }

    /// Slab test; from inside the box the far wall is reported.
    pub fn intersect_aabb(&self, min: Vec3, max: Vec3) -> Option<f32> {
        let dir = self.direction;
        let inv_dir = Vec3::new(
            if dir.x.abs() > 1e-6 { 1.0 / dir.x } else { f32::MAX },
            if dir.y.abs() > 1e-6 { 1.0 / dir.y } else { f32::MAX },
            if dir.z.abs() > 1e-6 { 1.0 / dir.z } else { f32::MAX },
        );

        let t1 = (min - self.origin) * inv_dir;
        let t2 = (max - self.origin) * inv_dir;
        let tmin = t1.min(t2).max_element();
        let tmax = t1.max(t2).min_element();

        if tmax < 0.0 || tmin > tmax {
            return None;
        }
        Some(if tmin >= 0.0 { tmin } else { tmax })
    }
}

/// Nearest object crossed by a ray.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub name: String,
    pub point: Vec3,
    pub distance: f32,
    pub draggable: bool,
}

/// Casts pointer rays into the scene.
pub trait Raycaster {
    /// Returns the nearest hit, ignoring the object named `exclude`.
    fn cast(&self, ray: &Ray, exclude: Option<&str>) -> Option<Hit>;
}

/// Distance along `ray` to the object's bounding volume. Spheres are tested
/// exactly, everything else through its axis aligned extent; labels, lights
/// and cameras are never hit.
pub fn intersect_object(ray: &Ray, object: &SceneObject) -> Option<f32> {
    if !matches!(object.kind, ObjectKind::Mesh | ObjectKind::Model) {
        return None;
    }
    if let Some(Shape::Sphere { radius }) = object.shape {
        return ray.intersect_sphere(object.position, radius * object.scale.max_element());
    }
    if object.extent == Vec3::ZERO {
        return None;
    }
    ray.intersect_aabb(object.position - object.extent, object.position + object.extent)
}

/// Nearest attached object hit by `ray`.
pub fn cast_objects<'a>(
    objects: impl IntoIterator<Item = &'a SceneObject>,
    ray: &Ray,
    exclude: Option<&str>,
) -> Option<Hit> {
    objects
        .into_iter()
        .filter(|object| object.attached && Some(object.name.as_str()) != exclude)
        .filter_map(|object| intersect_object(ray, object).map(|distance| (object, distance)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(object, distance)| Hit {
            name: object.name.clone(),
            point: ray.at(distance),
            distance,
            draggable: object.draggable,
        })
}

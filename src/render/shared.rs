use std::f32::consts::{PI, TAU};

use glam::Vec3;

use crate::obj::ObjMesh;
use crate::scene::Shape;

use super::common::MAX_LIGHTS;

pub(crate) const SHADER: &str = r#"
const MAX_LIGHTS: u32 = 4u;

struct Light {
    position: vec4<f32>,
    // rgb color, w intensity
    color: vec4<f32>,
}

struct GlobalUniform {
    view_proj: mat4x4<f32>,
    camera_position: vec4<f32>,
    light_count: vec4<u32>,
    lights: array<Light, MAX_LIGHTS>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    // x > 0.5 skips lighting
    flags: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: GlobalUniform;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.view_proj * world_position;
    out.world_pos = world_position.xyz;

    let world_normal = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    ) * input.normal;

    out.normal = normalize(world_normal);
    return out;
}

@fragment
fn fs_main(input: VertexOutput) -> @location(0) vec4<f32> {
    if (object.flags.x > 0.5) {
        return object.color;
    }
    let normal = normalize(input.normal);
    var lit = vec3<f32>(0.15);
    let count = min(globals.light_count.x, MAX_LIGHTS);
    for (var i = 0u; i < count; i = i + 1u) {
        let light = globals.lights[i];
        let light_dir = normalize(light.position.xyz - input.world_pos);
        let diffuse = max(dot(normal, light_dir), 0.0);
        lit = lit + diffuse * light.color.w * light.color.xyz;
    }
    return vec4<f32>(lit * object.color.rgb, object.color.a);
}
"#;

const SEGMENTS: u32 = 32;
const RINGS: u32 = 16;

/// Builds the triangle mesh of a procedural shape, centred on the origin.
///
/// Orientation follows the usual conventions: planes and tori lie in the XY
/// plane, cones and cylinders stand along Y with the apex of a cone at +Y.
pub fn primitive_mesh(shape: &Shape) -> ObjMesh {
    let mut builder = MeshBuilder::default();
    match *shape {
        Shape::Sphere { radius } => builder.sphere(radius),
        Shape::Box { size } => builder.cuboid(size * 0.5),
        Shape::Torus { radius, tube } => builder.torus(radius, tube),
        Shape::Cone { radius, height } => builder.tube(radius, 0.0, height),
        Shape::Cylinder { radius, height } => builder.tube(radius, radius, height),
        Shape::Plane { width, height } => builder.quad(
            Vec3::new(-width * 0.5, -height * 0.5, 0.0),
            Vec3::X * width,
            Vec3::Y * height,
            Vec3::Z,
        ),
    }
    builder.mesh
}

#[derive(Default)]
struct MeshBuilder {
    mesh: ObjMesh,
}

impl MeshBuilder {
    fn vertex(&mut self, position: Vec3, normal: Vec3) -> u32 {
        let index = self.mesh.vertex_count() as u32;
        self.mesh.vertices.extend_from_slice(&position.to_array());
        self.mesh
            .vertices
            .extend_from_slice(&normal.normalize_or_zero().to_array());
        index
    }

    fn triangle(&mut self, a: u32, b: u32, c: u32) {
        self.mesh.indices.extend_from_slice(&[a, b, c]);
    }

    fn quad(&mut self, origin: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
        let a = self.vertex(origin, normal);
        let b = self.vertex(origin + u, normal);
        let c = self.vertex(origin + u + v, normal);
        let d = self.vertex(origin + v, normal);
        self.triangle(a, b, c);
        self.triangle(a, c, d);
    }

    fn cuboid(&mut self, half: Vec3) {
        let faces = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
        ];
        for (normal, u, v) in faces {
            let (u, v) = (u * half * 2.0, v * half * 2.0);
            let origin = normal * half - u * 0.5 - v * 0.5;
            self.quad(origin, u, v, normal);
        }
    }

    /// Grid of `rows + 1` by `SEGMENTS + 1` vertices stitched into quads.
    fn grid(&mut self, rows: u32, mut point: impl FnMut(f32, f32) -> (Vec3, Vec3)) {
        let base = self.mesh.vertex_count() as u32;
        for row in 0..=rows {
            for segment in 0..=SEGMENTS {
                let (position, normal) =
                    point(row as f32 / rows as f32, segment as f32 / SEGMENTS as f32);
                self.vertex(position, normal);
            }
        }
        let stride = SEGMENTS + 1;
        for row in 0..rows {
            for segment in 0..SEGMENTS {
                let a = base + row * stride + segment;
                let b = a + stride;
                self.triangle(a, b, a + 1);
                self.triangle(a + 1, b, b + 1);
            }
        }
    }

    fn sphere(&mut self, radius: f32) {
        self.grid(RINGS, |v, u| {
            let (theta, phi) = (v * PI, u * TAU);
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            (normal * radius, normal)
        });
    }

    fn torus(&mut self, radius: f32, tube: f32) {
        self.grid(RINGS, |v, u| {
            let (around, across) = (u * TAU, v * TAU);
            let centre = Vec3::new(around.cos(), around.sin(), 0.0) * radius;
            let normal = Vec3::new(
                around.cos() * across.cos(),
                around.sin() * across.cos(),
                across.sin(),
            );
            (centre + normal * tube, normal)
        });
    }

    /// Frustum along Y with capped ends; a zero top radius makes a cone.
    fn tube(&mut self, bottom: f32, top: f32, height: f32) {
        let half = height * 0.5;
        let slope = (bottom - top) / height.max(f32::EPSILON);
        self.grid(1, |v, u| {
            let angle = u * TAU;
            let radius = bottom + (top - bottom) * v;
            let (sin, cos) = angle.sin_cos();
            let position = Vec3::new(sin * radius, -half + height * v, cos * radius);
            (position, Vec3::new(sin, slope, cos))
        });
        self.cap(bottom, -half, Vec3::NEG_Y);
        if top > 0.0 {
            self.cap(top, half, Vec3::Y);
        }
    }

    fn cap(&mut self, radius: f32, y: f32, normal: Vec3) {
        let centre = self.vertex(Vec3::new(0.0, y, 0.0), normal);
        let first = self.mesh.vertex_count() as u32;
        for segment in 0..=SEGMENTS {
            let angle = segment as f32 / SEGMENTS as f32 * TAU;
            let (sin, cos) = angle.sin_cos();
            self.vertex(Vec3::new(sin * radius, y, cos * radius), normal);
        }
        for segment in 0..SEGMENTS {
            self.triangle(centre, first + segment, first + segment + 1);
        }
    }
}

const _: () = assert!(MAX_LIGHTS == 4);

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

/// Scene layout shipped with the binary.
pub const DEFAULT_SCENE_XML: &str = include_str!("../assets/scene.xml");

/// Runtime representation of a scene description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
}

impl Scene {
    /// Parses the XML scene layout.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid scene XML")?;
        let mut objects = Vec::new();

        for node in document.descendants().filter(|n| n.has_tag_name("object")) {
            let mut object = SceneObject::default();
            object.name = required_text(&node, "name")?;
            object.kind = match optional_text(&node, "type") {
                Some(kind) => kind
                    .parse()
                    .with_context(|| format!("object {} has an invalid type", object.name))?,
                None => ObjectKind::Mesh,
            };
            object.shape = optional_text(&node, "shape")
                .map(|shape| shape.parse::<Shape>())
                .transpose()
                .with_context(|| format!("object {} has an invalid shape", object.name))?;
            object.mesh = optional_text(&node, "mesh");
            object.text = optional_text(&node, "text");
            object.color = parse_color(optional_text(&node, "color"), object.color)?;
            object.position = parse_vec3(optional_text(&node, "position"), object.position)?;
            object.rotation = parse_vec3(optional_text(&node, "rotation"), object.rotation)?;
            object.scale = parse_vec3(optional_text(&node, "scale"), object.scale)?;
            object.target = optional_text(&node, "target")
                .map(|target| parse_vec3(Some(target), Vec3::ZERO))
                .transpose()?;
            object.fov = parse_f32(optional_text(&node, "fov"), object.fov)?;
            object.intensity = parse_f32(optional_text(&node, "intensity"), object.intensity)?;
            object.draggable = parse_flag(optional_text(&node, "draggable"), false)?;
            object.emissive = parse_flag(optional_text(&node, "emissive"), false)?;
            object.attached = !parse_flag(optional_text(&node, "hidden"), false)?;
            if let Some(shape) = object.shape {
                object.extent = shape.half_extents() * object.scale;
            }
            objects.push(object);
        }

        Ok(Self { objects })
    }

    /// Parses the embedded default layout.
    pub fn default_layout() -> Result<Self> {
        Self::from_xml(DEFAULT_SCENE_XML)
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.name == name)
    }

    pub fn lights(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().filter(|o| o.kind == ObjectKind::Light)
    }
}

/// Role of an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Light,
    Label,
    Model,
    Camera,
}

impl ObjectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Light => "light",
            Self::Label => "label",
            Self::Model => "model",
            Self::Camera => "camera",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        Ok(match value {
            "mesh" => Self::Mesh,
            "light" => Self::Light,
            "label" => Self::Label,
            "model" => Self::Model,
            "camera" => Self::Camera,
            other => bail!("unknown object type {other:?}"),
        })
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Procedural primitive used for meshes that are not loaded from disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    Sphere { radius: f32 },
    Box { size: Vec3 },
    Torus { radius: f32, tube: f32 },
    Cone { radius: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    Plane { width: f32, height: f32 },
}

impl Shape {
    /// Half extents of the axis aligned box enclosing the unscaled shape.
    pub fn half_extents(&self) -> Vec3 {
        match *self {
            Self::Sphere { radius } => Vec3::splat(radius),
            Self::Box { size } => size * 0.5,
            Self::Torus { radius, tube } => Vec3::new(radius + tube, radius + tube, tube),
            Self::Cone { radius, height } | Self::Cylinder { radius, height } => {
                Vec3::new(radius, height * 0.5, radius)
            }
            Self::Plane { width, height } => Vec3::new(width * 0.5, height * 0.5, 0.0),
        }
    }
}

impl FromStr for Shape {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        let mut parts = value.split_whitespace();
        let kind = parts.next().ok_or_else(|| anyhow!("shape is empty"))?;
        let numbers = parts
            .map(|part| {
                part.parse::<f32>()
                    .map_err(|err| anyhow!("invalid shape parameter {part:?}: {err}"))
            })
            .collect::<Result<Vec<_>>>()?;
        let arg = |index: usize| {
            numbers
                .get(index)
                .copied()
                .ok_or_else(|| anyhow!("{kind} shape is missing parameters"))
        };
        Ok(match kind {
            "sphere" => Self::Sphere { radius: arg(0)? },
            "box" => Self::Box {
                size: Vec3::new(arg(0)?, arg(1)?, arg(2)?),
            },
            "torus" => Self::Torus {
                radius: arg(0)?,
                tube: arg(1)?,
            },
            "cone" => Self::Cone {
                radius: arg(0)?,
                height: arg(1)?,
            },
            "cylinder" => Self::Cylinder {
                radius: arg(0)?,
                height: arg(1)?,
            },
            "plane" => Self::Plane {
                width: arg(0)?,
                height: arg(1)?,
            },
            other => bail!("unknown shape {other:?}"),
        })
    }
}

/// Scene object as described by the layout file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    /// Model file, relative to the asset root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default = "default_color")]
    pub color: Vec3,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees.
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<Vec3>,
    #[serde(default = "default_fov")]
    pub fov: f32,
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub emissive: bool,
    /// Whether the object is currently part of the rendered scene.
    #[serde(default = "default_attached")]
    pub attached: bool,
    /// Half extents used for picking, already scaled.
    #[serde(default)]
    pub extent: Vec3,
}

impl Default for SceneObject {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ObjectKind::Mesh,
            shape: None,
            mesh: None,
            text: None,
            color: default_color(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: default_scale(),
            target: None,
            fov: default_fov(),
            intensity: default_intensity(),
            draggable: false,
            emissive: false,
            attached: default_attached(),
            extent: Vec3::ZERO,
        }
    }
}

fn default_color() -> Vec3 {
    Vec3::ONE
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

fn default_fov() -> f32 {
    75.0
}

fn default_intensity() -> f32 {
    1.0
}

fn default_attached() -> bool {
    true
}

fn required_text(node: &Node<'_, '_>, tag: &str) -> Result<String> {
    optional_text(node, tag).ok_or_else(|| anyhow!("<{tag}> tag is missing"))
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components<const N: usize>(value: &str, what: &str) -> Result<[f32; N]> {
    let mut numbers = value.split_whitespace().map(|component| {
        component
            .parse::<f32>()
            .map_err(|err| anyhow!("invalid {what} component {component:?}: {err}"))
    });
    let mut out = [0.0; N];
    for slot in out.iter_mut() {
        *slot = numbers
            .next()
            .ok_or_else(|| anyhow!("{what} is missing components"))??;
    }
    Ok(out)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let [x, y, z] = parse_components::<3>(&value, "vector")?;
    Ok(Vec3::new(x, y, z))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let [r, g, b] = parse_components::<3>(&value, "color")?;
    Ok(Vec3::new(r / 255.0, g / 255.0, b / 255.0))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_flag(value: Option<String>, default: bool) -> Result<bool> {
    match value.as_deref() {
        None => Ok(default),
        Some("true" | "yes" | "1") => Ok(true),
        Some("false" | "no" | "0") => Ok(false),
        Some(other) => Err(anyhow!("expected a boolean, found {other:?}")),
    }
}

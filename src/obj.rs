use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// GPU ready mesh buffers produced from an OBJ group.
///
/// Vertices are interleaved as `position.xyz` followed by `normal.xyz`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjMesh {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.vertices
            .chunks_exact(6)
            .map(|chunk| Vec3::new(chunk[0], chunk[1], chunk[2]))
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: &ObjMesh) {
        let base = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|index| index + base));
    }
}

/// What a node in a loaded model hierarchy is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Group,
    Mesh(ObjMesh),
}

/// Node of a loaded model. Every `o`/`g` statement becomes a mesh node under
/// a single root group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<ModelNode>,
}

impl ModelNode {
    pub fn group(name: impl Into<String>, children: Vec<ModelNode>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Group,
            children,
        }
    }

    pub fn mesh(name: impl Into<String>, mesh: ObjMesh) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Mesh(mesh),
            children: Vec::new(),
        }
    }

    /// Visits this node and its descendants depth first.
    pub fn traverse<'a>(&'a self, visit: &mut impl FnMut(&'a ModelNode)) {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /// Mesh payloads in traversal order, skipping groups.
    pub fn meshes(&self) -> Vec<&ObjMesh> {
        let mut meshes = Vec::new();
        self.traverse(&mut |node| {
            if let NodeKind::Mesh(mesh) = &node.kind {
                meshes.push(mesh);
            }
        });
        meshes
    }

    /// Flattens all mesh nodes into one draw mesh.
    pub fn merged_mesh(&self) -> ObjMesh {
        let mut merged = ObjMesh::default();
        for mesh in self.meshes() {
            merged.append(mesh);
        }
        merged
    }

    /// Axis aligned bounds of every vertex in the hierarchy.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.meshes()
            .into_iter()
            .flat_map(|mesh| mesh.positions())
            .fold(None, |acc, p| match acc {
                None => Some((p, p)),
                Some((min, max)) => Some((min.min(p), max.max(p))),
            })
    }
}

/// Parses an OBJ file from memory into a model hierarchy.
pub fn load_obj_from_str(data: &str) -> Result<ModelNode> {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut groups: Vec<(String, Vec<[FaceIndex; 3]>)> = vec![("default".to_string(), Vec::new())];

    for (line_no, line) in data.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut parts = trimmed.split_whitespace();
        let Some(tag) = parts.next() else {
            continue;
        };
        match tag {
            "v" => positions.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid vertex on line {}", line_no + 1))?,
            ),
            "vn" => normals.push(
                parse_vec3(parts)
                    .with_context(|| format!("invalid normal on line {}", line_no + 1))?,
            ),
            "o" | "g" => {
                let name = parts.collect::<Vec<_>>().join(" ");
                let name = if name.is_empty() {
                    format!("group{}", groups.len())
                } else {
                    name
                };
                groups.push((name, Vec::new()));
            }
            "f" => {
                let polygon = parse_face(parts)
                    .with_context(|| format!("invalid face on line {}", line_no + 1))?;
                if let Some((_, faces)) = groups.last_mut() {
                    triangulate_face(&polygon, faces);
                }
            }
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(anyhow!("OBJ file does not define any vertices"));
    }

    let mut children = Vec::new();
    for (name, faces) in groups {
        if faces.is_empty() {
            continue;
        }
        let mut mesh = build_mesh(&positions, &normals, &faces)
            .with_context(|| format!("failed to build group {name}"))?;
        if needs_normals(&mesh.vertices) {
            compute_normals(&mut mesh);
        }
        children.push(ModelNode::mesh(name, mesh));
    }

    if children.is_empty() {
        return Err(anyhow!("OBJ file does not define any faces"));
    }
    Ok(ModelNode::group("root", children))
}

fn parse_vec3<'a>(mut parts: impl Iterator<Item = &'a str>) -> Result<Vec3> {
    let mut next = || -> Result<f32> {
        Ok(parts
            .next()
            .ok_or_else(|| anyhow!("missing vector component"))?
            .parse::<f32>()?)
    };
    let x = next()?;
    let y = next()?;
    let z = next()?;
    Ok(Vec3::new(x, y, z))
}

fn parse_face<'a>(parts: impl Iterator<Item = &'a str>) -> Result<Vec<FaceIndex>> {
    let mut indices = Vec::new();
    for part in parts {
        let mut segments = part.split('/');
        let v = segments
            .next()
            .ok_or_else(|| anyhow!("missing vertex index"))?
            .parse::<i32>()?;
        // texture coordinates are not used
        let _ = segments.next();
        let vn = segments
            .next()
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<i32>().ok())
            .unwrap_or(0);
        indices.push(FaceIndex { v, vn });
    }
    if indices.len() < 3 {
        return Err(anyhow!("faces must reference at least 3 vertices"));
    }
    Ok(indices)
}

fn triangulate_face(polygon: &[FaceIndex], faces: &mut Vec<[FaceIndex; 3]>) {
    for i in 1..polygon.len().saturating_sub(1) {
        faces.push([polygon[0], polygon[i], polygon[i + 1]]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    position: usize,
    normal: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
struct FaceIndex {
    v: i32,
    vn: i32,
}

fn build_mesh(positions: &[Vec3], normals: &[Vec3], faces: &[[FaceIndex; 3]]) -> Result<ObjMesh> {
    let mut lookup: HashMap<Key, u32> = HashMap::new();
    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for face in faces {
        for idx in face {
            let pos_index =
                fix_index(idx.v, positions.len()).ok_or_else(|| anyhow!("invalid vertex index"))?;
            let normal_index = fix_index(idx.vn, normals.len());
            let key = Key {
                position: pos_index,
                normal: normal_index,
            };
            let next_index = (vertices.len() / 6) as u32;
            let entry = lookup.entry(key).or_insert_with(|| {
                let position = positions[pos_index];
                vertices.extend_from_slice(&[position.x, position.y, position.z]);
                let normal = normal_index.map(|i| normals[i]).unwrap_or(Vec3::ZERO);
                vertices.extend_from_slice(&[normal.x, normal.y, normal.z]);
                next_index
            });
            indices.push(*entry);
        }
    }

    Ok(ObjMesh { vertices, indices })
}

fn fix_index(index: i32, len: usize) -> Option<usize> {
    if index > 0 {
        let zero_based = index as usize - 1;
        (zero_based < len).then_some(zero_based)
    } else if index < 0 {
        let abs = index.unsigned_abs() as usize;
        (abs <= len).then(|| len - abs)
    } else {
        None
    }
}

fn needs_normals(vertices: &[f32]) -> bool {
    vertices
        .chunks_exact(6)
        .any(|chunk| chunk[3] == 0.0 && chunk[4] == 0.0 && chunk[5] == 0.0)
}

fn compute_normals(mesh: &mut ObjMesh) {
    let mut accum = vec![Vec3::ZERO; mesh.vertex_count()];

    for triangle in mesh.indices.chunks_exact(3) {
        let [i0, i1, i2] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let p0 = Vec3::from_slice(&mesh.vertices[i0 * 6..i0 * 6 + 3]);
        let p1 = Vec3::from_slice(&mesh.vertices[i1 * 6..i1 * 6 + 3]);
        let p2 = Vec3::from_slice(&mesh.vertices[i2 * 6..i2 * 6 + 3]);
        let normal = (p1 - p0).cross(p2 - p0);
        if normal.length_squared() > f32::EPSILON {
            let normal = normal.normalize();
            accum[i0] += normal;
            accum[i1] += normal;
            accum[i2] += normal;
        }
    }

    for (i, normal) in accum.into_iter().enumerate() {
        let normal = normal.normalize_or_zero();
        mesh.vertices[i * 6 + 3..i * 6 + 6].copy_from_slice(&normal.to_array());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_triangle() {
        let obj = "\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = load_obj_from_str(obj).unwrap();
        let mesh = model.merged_mesh();
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.vertices.len(), 18);
        for normal in mesh.vertices.chunks_exact(6).map(|c| Vec3::new(c[3], c[4], c[5])) {
            assert!((normal.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn groups_become_mesh_nodes() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 0 1\n\
                   o body\nf 1 2 3\n\
                   g fin\nf 1 3 4\nf 1 2 4\n\
                   o empty\n";
        let model = load_obj_from_str(obj).unwrap();
        assert_eq!(model.kind, NodeKind::Group);

        let mut names = Vec::new();
        model.traverse(&mut |node| {
            if matches!(node.kind, NodeKind::Mesh(_)) {
                names.push(node.name.as_str());
            }
        });
        assert_eq!(names, ["body", "fin"]);

        let merged = model.merged_mesh();
        assert_eq!(merged.indices.len(), 9);
        assert!(merged
            .indices
            .iter()
            .all(|&i| (i as usize) < merged.vertex_count()));
    }

    #[test]
    fn bounds_cover_all_groups() {
        let obj = "v -1 0 0\nv 1 0 0\nv 0 2 0\nv 0 0 -3\no a\nf 1 2 3\no b\nf 1 2 4\n";
        let (min, max) = load_obj_from_str(obj).unwrap().bounds().unwrap();
        assert_eq!(min, Vec3::new(-1.0, 0.0, -3.0));
        assert_eq!(max, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn rejects_out_of_range_indices() {
        assert!(load_obj_from_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n").is_err());
        assert!(load_obj_from_str("# nothing here\n").is_err());
    }
}

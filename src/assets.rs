use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
#[cfg(not(target_arch = "wasm32"))]
use std::thread::{self, JoinHandle};

use log::{info, warn};
use parking_lot::RwLock;
use thiserror::Error;

use crate::data_model::DataModel;
use crate::obj::{load_obj_from_str, ObjMesh};
use crate::scene::SceneObject;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("object {0} does not name a model file")]
    NoModel(String),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Meshes of every model loaded so far, keyed by model path.
#[derive(Debug, Default, Clone)]
pub struct ModelLibrary {
    meshes: Arc<RwLock<HashMap<String, Arc<ObjMesh>>>>,
}

impl ModelLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<String>, mesh: ObjMesh) {
        self.meshes.write().insert(path.into(), Arc::new(mesh));
    }

    pub fn get(&self, path: &str) -> Option<Arc<ObjMesh>> {
        self.meshes.read().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.meshes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads a model described by `object` from `root`, returning the object with
/// its picking extent filled in and the flattened mesh.
pub fn load_model(root: &Path, object: &SceneObject) -> Result<(SceneObject, ObjMesh), AssetError> {
    let relative = object
        .mesh
        .as_deref()
        .ok_or_else(|| AssetError::NoModel(object.name.clone()))?;
    let path = root.join(relative);
    let source = std::fs::read_to_string(&path).map_err(|source| AssetError::Io {
        path: path.clone(),
        source,
    })?;
    let model = load_obj_from_str(&source).map_err(|err| AssetError::Parse {
        path: path.clone(),
        message: format!("{err:#}"),
    })?;

    let mut loaded = object.clone();
    if let Some((min, max)) = model.bounds() {
        loaded.extent = min.abs().max(max.abs()) * object.scale;
    }
    let mesh = model.merged_mesh();
    Ok((loaded, mesh))
}

/// Fire-and-forget model loading. Each model loads on its own thread and joins
/// the scene when done; failures are logged and the model never appears.
pub struct ModelLoader {
    root: PathBuf,
    model: DataModel,
    library: ModelLibrary,
    #[cfg(not(target_arch = "wasm32"))]
    threads: Vec<JoinHandle<()>>,
}

impl ModelLoader {
    pub fn new(root: impl Into<PathBuf>, model: DataModel, library: ModelLibrary) -> Self {
        Self {
            root: root.into(),
            model,
            library,
            #[cfg(not(target_arch = "wasm32"))]
            threads: Vec::new(),
        }
    }

    pub fn library(&self) -> &ModelLibrary {
        &self.library
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn spawn(&mut self, object: SceneObject) {
        let root = self.root.clone();
        let model = self.model.clone();
        let library = self.library.clone();
        self.threads.push(thread::spawn(move || {
            finish_load(&root, &object, &model, &library);
        }));
    }

    /// Browser builds cannot read the asset directory; the model is skipped.
    #[cfg(target_arch = "wasm32")]
    pub fn spawn(&mut self, object: SceneObject) {
        warn!(
            "model {} skipped: loading from {} is unavailable in the browser build",
            object.name,
            self.root.display()
        );
        let _ = (&self.model, &self.library);
    }

    /// Blocks until every spawned load has finished.
    pub fn wait(&mut self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            for handle in self.threads.drain(..) {
                if handle.join().is_err() {
                    warn!("model loader thread panicked");
                }
            }
        }
    }
}

fn finish_load(root: &Path, object: &SceneObject, model: &DataModel, library: &ModelLibrary) {
    match load_model(root, object) {
        Ok((loaded, mesh)) => {
            info!(
                "loaded model {} ({} vertices, extent {:?})",
                loaded.name,
                mesh.vertex_count(),
                loaded.extent
            );
            if let Some(path) = loaded.mesh.clone() {
                library.insert(path, mesh);
            }
            model.insert(loaded);
        }
        Err(err) => warn!("{err}"),
    }
}

/// Default asset root: `assets/` next to the crate manifest.
pub fn default_asset_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_model::SceneSurface;
    use crate::scene::ObjectKind;
    use glam::Vec3;
    use std::io::Write;
    use tempfile::TempDir;

    fn model_object(name: &str, mesh: &str) -> SceneObject {
        SceneObject {
            name: name.into(),
            kind: ObjectKind::Model,
            mesh: Some(mesh.into()),
            scale: Vec3::splat(2.0),
            ..SceneObject::default()
        }
    }

    #[test]
    fn loaded_model_joins_scene() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join("tri.obj")).unwrap();
        writeln!(file, "v -1 0 0\nv 1 0 0\nv 0 3 0\no tri\nf 1 2 3").unwrap();

        let model = DataModel::new();
        let mut loader = ModelLoader::new(dir.path(), model.clone(), ModelLibrary::new());
        loader.spawn(model_object("rocket", "tri.obj"));
        loader.wait();

        let rocket = model.get("rocket").unwrap();
        assert!(model.contains_object("rocket"));
        assert_eq!(rocket.extent, Vec3::new(2.0, 6.0, 0.0));
        assert_eq!(loader.library().get("tri.obj").unwrap().indices, vec![0, 1, 2]);
    }

    #[test]
    fn missing_model_never_appears() {
        let dir = TempDir::new().unwrap();
        let model = DataModel::new();
        let mut loader = ModelLoader::new(dir.path(), model.clone(), ModelLibrary::new());
        loader.spawn(model_object("astronaut", "missing.obj"));
        loader.wait();
        assert!(model.get("astronaut").is_none());
        assert!(loader.library().is_empty());

        let err = load_model(dir.path(), &model_object("astronaut", "missing.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn malformed_model_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.obj"), "v 0 0\n").unwrap();
        let err = load_model(dir.path(), &model_object("rocket", "bad.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Parse { .. }));
    }

    #[test]
    fn shipped_models_load() {
        for name in ["models/rocket.obj", "models/astronaut.obj"] {
            let (loaded, mesh) =
                load_model(&default_asset_root(), &model_object("m", name)).unwrap();
            assert!(mesh.vertex_count() > 0);
            assert!(loaded.extent.y > 0.0);
        }
    }
}

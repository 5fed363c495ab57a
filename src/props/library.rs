//! Named mesh cache shared by prop instances.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::geom::{MaterialHandle, Mesh};
use crate::util::{Error, Result};

/// A cached prop mesh and whether it is a stand-in for a model that failed
/// to load.
#[derive(Clone, Debug)]
pub struct PropMesh {
    pub mesh: Arc<Mesh>,
    pub placeholder: bool,
}

/// Mesh cache owned by whoever builds props and passed to them explicitly.
///
/// The first request for a name loads (or substitutes) the mesh; later
/// requests return the same `Arc`.
#[derive(Debug, Default)]
pub struct PropLibrary {
    meshes: IndexMap<String, PropMesh>,
}

impl PropLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&PropMesh> {
        self.meshes.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, mesh: Arc<Mesh>) -> PropMesh {
        let entry = PropMesh { mesh, placeholder: false };
        self.meshes.insert(name.into(), entry.clone());
        entry
    }

    /// Cached mesh for `name`, or the mesh parsed from `source`.
    ///
    /// If the source is missing or does not parse, `placeholder` is built
    /// instead and a warning is logged; only a failing placeholder is an
    /// error.
    pub fn obj_or_placeholder(
        &mut self,
        name: &str,
        source: Result<String>,
        materials: &[MaterialHandle],
        placeholder: impl FnOnce() -> Result<Mesh>,
    ) -> Result<PropMesh> {
        if let Some(hit) = self.meshes.get(name) {
            return Ok(hit.clone());
        }

        let parsed = source.and_then(|text| Mesh::from_obj(&text, materials.iter().cloned()));
        let entry = match parsed {
            Ok(mesh) => {
                debug!(model = name, vertices = mesh.vertex_count(), "prop model loaded");
                PropMesh { mesh: Arc::new(mesh), placeholder: false }
            }
            Err(err) => {
                warn!(model = name, %err, "prop model unavailable, using placeholder");
                PropMesh { mesh: Arc::new(placeholder()?), placeholder: true }
            }
        };
        self.meshes.insert(name.to_string(), entry.clone());
        Ok(entry)
    }

    /// Like [`obj_or_placeholder`](Self::obj_or_placeholder), reading the
    /// model from `path` (no path means placeholder).
    pub fn obj_file_or_placeholder(
        &mut self,
        name: &str,
        path: Option<&Path>,
        materials: &[MaterialHandle],
        placeholder: impl FnOnce() -> Result<Mesh>,
    ) -> Result<PropMesh> {
        if let Some(hit) = self.meshes.get(name) {
            return Ok(hit.clone());
        }
        let source = match path {
            Some(path) => std::fs::read_to_string(path).map_err(Error::from),
            None => Err(Error::other("no model path configured")),
        };
        self.obj_or_placeholder(name, source, materials, placeholder)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_surface::LitMaterial;

    fn materials() -> Vec<MaterialHandle> {
        vec![Arc::new(LitMaterial::default())]
    }

    fn boxed() -> Result<Mesh> {
        Mesh::cuboid(1.0, 4.0, 1.0, materials())
    }

    #[test]
    fn test_parse_and_cache() {
        let mut lib = PropLibrary::new();
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n".to_string();
        let a = lib.obj_or_placeholder("tri", Ok(text), &materials(), boxed).unwrap();
        assert!(!a.placeholder);
        assert_eq!(a.mesh.triangle_count(), 1);

        // Cached: the source is not consulted again.
        let b = lib
            .obj_or_placeholder("tri", Err(Error::other("gone")), &materials(), boxed)
            .unwrap();
        assert!(Arc::ptr_eq(&a.mesh, &b.mesh));
        assert_eq!(lib.len(), 1);
    }

    #[test]
    fn test_placeholder_on_bad_model() {
        let mut lib = PropLibrary::new();
        let p = lib
            .obj_or_placeholder("column", Ok("f 1 2 3".into()), &materials(), boxed)
            .unwrap();
        assert!(p.placeholder);
        assert_eq!(p.mesh.vertex_count(), 24);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.obj");
        let mut lib = PropLibrary::new();
        let p = lib
            .obj_file_or_placeholder("statue", Some(&missing), &materials(), boxed)
            .unwrap();
        assert!(p.placeholder);

        let path = dir.path().join("tri.obj");
        std::fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        let p = lib.obj_file_or_placeholder("tri", Some(&path), &materials(), boxed).unwrap();
        assert!(!p.placeholder);
    }
}

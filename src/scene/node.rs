//! Scene nodes and their drawable payload.

use std::sync::Arc;

use slotmap::new_key_type;

use super::transform::Transform;
use crate::geom::{MaterialHandle, Mesh};

new_key_type! {
    /// Handle of a node inside a [`SceneGraph`](super::SceneGraph).
    pub struct NodeId;
}

/// What a node draws.
#[derive(Clone, Debug)]
pub enum Renderable {
    /// Mesh drawn with its own materials.
    Mesh(Arc<Mesh>),
    /// Mesh drawn with one material overriding all of its slots.
    WithMaterial {
        mesh: Arc<Mesh>,
        material: MaterialHandle,
    },
}

impl Renderable {
    pub fn mesh(&self) -> &Arc<Mesh> {
        match self {
            Self::Mesh(mesh) | Self::WithMaterial { mesh, .. } => mesh,
        }
    }

    pub fn material_override(&self) -> Option<&MaterialHandle> {
        match self {
            Self::Mesh(_) => None,
            Self::WithMaterial { material, .. } => Some(material),
        }
    }

    /// Materials the draw binds: the override alone, or the mesh's slots.
    pub fn materials(&self) -> &[MaterialHandle] {
        match self {
            Self::Mesh(mesh) => mesh.materials(),
            Self::WithMaterial { material, .. } => std::slice::from_ref(material),
        }
    }

    pub fn is_translucent(&self) -> bool {
        match self {
            Self::Mesh(mesh) => mesh.is_translucent(),
            Self::WithMaterial { material, .. } => material.is_translucent(),
        }
    }
}

impl From<Arc<Mesh>> for Renderable {
    fn from(mesh: Arc<Mesh>) -> Self {
        Self::Mesh(mesh)
    }
}

/// One node: a local transform, an optional payload and ordered children.
///
/// `parent` is a plain id used to find the owner when detaching; ownership
/// runs through the parent's `children` list only.
#[derive(Clone, Debug, Default)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    pub payload: Option<Renderable>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl SceneNode {
    /// Node without payload.
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Node drawing `payload`.
    pub fn with_payload(name: impl Into<String>, payload: impl Into<Renderable>) -> Self {
        Self {
            name: name.into(),
            payload: Some(payload.into()),
            ..Default::default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

//! Immutable indexed triangle meshes.

use std::fmt;
use std::sync::Arc;

use lit_surface::{LitMaterial, MaterialSlots, MAX_MATERIAL_SLOTS};
use smallvec::SmallVec;

use super::vertex::Vertex;
use crate::util::{BBox3f, Error, Result};

/// Shared material reference. Many meshes may bind the same material.
pub type MaterialHandle = Arc<LitMaterial>;

/// Materials bound to one mesh, at most [`MAX_MATERIAL_SLOTS`].
pub type MaterialList = SmallVec<[MaterialHandle; MAX_MATERIAL_SLOTS]>;

/// Triangle-list mesh with 1..=3 material slots.
///
/// Immutable after construction; share it with `Arc<Mesh>`.
#[derive(Clone)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    materials: MaterialList,
    use_vertex_color: bool,
    bounds: BBox3f,
}

impl Mesh {
    /// Validate and assemble a mesh.
    ///
    /// Fails if the material count is outside 1..=3, a vertex names a slot
    /// that is not bound, an index is out of range or the index count is
    /// not a multiple of 3.
    pub fn from_parts(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        materials: impl IntoIterator<Item = MaterialHandle>,
        use_vertex_color: bool,
    ) -> Result<Self> {
        let materials: MaterialList = materials.into_iter().collect();
        if materials.is_empty() || materials.len() > MAX_MATERIAL_SLOTS {
            return Err(Error::MaterialCount {
                count: materials.len(),
                max: MAX_MATERIAL_SLOTS,
            });
        }

        for v in &vertices {
            match v.material_slot() {
                Some(slot) if (slot as usize) < materials.len() => {}
                _ => {
                    return Err(Error::MaterialIndexOutOfRange {
                        index: v.material_index.max(0.0) as u32,
                        count: materials.len(),
                    });
                }
            }
        }

        if indices.len() % 3 != 0 {
            return Err(Error::NotTriangleList(indices.len()));
        }
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(Error::IndexOutOfRange {
                index,
                count: vertices.len(),
            });
        }

        let bounds = BBox3f::from_points(vertices.iter().map(Vertex::position));
        Ok(Self {
            vertices,
            indices,
            materials,
            use_vertex_color,
            bounds,
        })
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn materials(&self) -> &[MaterialHandle] {
        &self.materials
    }

    /// Whether the render target should modulate by vertex color.
    #[inline]
    pub fn use_vertex_color(&self) -> bool {
        self.use_vertex_color
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Object-space bounds, empty for a mesh without vertices.
    pub fn bounds(&self) -> BBox3f {
        self.bounds
    }

    /// Vertex buffer as raw bytes for upload.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Material uniform block for this mesh's slots.
    pub fn material_slots(&self) -> MaterialSlots {
        MaterialSlots::from_materials(self.materials.iter().map(|m| &**m))
    }

    /// True if any bound material blends with the framebuffer.
    pub fn is_translucent(&self) -> bool {
        self.materials.iter().any(|m| m.is_translucent())
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: SmallVec<[&str; MAX_MATERIAL_SLOTS]> =
            self.materials.iter().map(|m| m.name.as_str()).collect();
        f.debug_struct("Mesh")
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("materials", &names)
            .field("use_vertex_color", &self.use_vertex_color)
            .field("bounds", &self.bounds)
            .finish()
    }
}

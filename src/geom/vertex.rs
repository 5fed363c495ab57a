//! Interleaved vertex record shared by every mesh.

use bytemuck::{Pod, Zeroable};

use crate::util::{Vec2, Vec3, Vec4};

/// Byte size of one [`Vertex`].
pub const VERTEX_STRIDE: usize = 52;

/// Fixed-stride vertex: position, RGBA color, UV, normal, material slot.
///
/// Stored as plain `f32` arrays so the layout is exactly 13 floats with no
/// SIMD padding. The material slot is a float because vertex attributes are.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub normal: [f32; 3],
    pub material_index: f32,
}

impl Vertex {
    pub fn new(position: Vec3, color: Vec4, uv: Vec2, normal: Vec3, material: u32) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
            normal: normal.to_array(),
            material_index: material as f32,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[inline]
    pub fn normal(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }

    /// Material slot, or `None` if the stored value is not a whole non-negative number.
    pub fn material_slot(&self) -> Option<u32> {
        let m = self.material_index;
        (m >= 0.0 && m.fract() == 0.0 && m <= u32::MAX as f32).then_some(m as u32)
    }
}

/// One attribute within the vertex record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VertexAttribute {
    pub name: &'static str,
    /// Byte offset from the start of the record
    pub offset: usize,
    /// Number of `f32` components
    pub components: usize,
}

/// Attribute table a render target binds against.
pub const VERTEX_ATTRIBUTES: [VertexAttribute; 5] = [
    VertexAttribute { name: "position", offset: 0, components: 3 },
    VertexAttribute { name: "color", offset: 12, components: 4 },
    VertexAttribute { name: "uv", offset: 28, components: 2 },
    VertexAttribute { name: "normal", offset: 36, components: 3 },
    VertexAttribute { name: "material_index", offset: 48, components: 1 },
];

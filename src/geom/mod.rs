//! Geometry: vertex layout, meshes and mesh constructors.
//!
//! - [`Vertex`] - fixed 52-byte interleaved record
//! - [`Mesh`] - validated, immutable triangle list with 1..=3 materials
//! - Constructors: [`Mesh::cuboid`], [`Mesh::platform`], [`Mesh::uv_sphere`],
//!   [`Mesh::from_heightmap`], [`Mesh::from_obj`]

mod grid;
mod mesh;
mod obj;
mod primitives;
mod vertex;

pub use grid::{GridLayout, MIN_BRIGHTNESS};
pub use mesh::{MaterialHandle, MaterialList, Mesh};
pub use primitives::MIN_SPHERE_SUBDIVS;
pub use vertex::{Vertex, VertexAttribute, VERTEX_ATTRIBUTES, VERTEX_STRIDE};

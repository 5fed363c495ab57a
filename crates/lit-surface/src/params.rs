//! Uniform records and light sources
//!
//! Layouts are `#[repr(C)]` and `Pod` so a render target can upload them
//! as-is. Vectors are padded to 16 bytes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::material::{LitMaterial, MAX_MATERIAL_SLOTS};

/// Material coefficients for one slot
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
}

/// All material slots of one draw plus the number actually bound.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MaterialSlots {
    pub slots: [MaterialUniform; MAX_MATERIAL_SLOTS],
    pub count: u32,
    pub _pad: [u32; 3],
}

impl MaterialSlots {
    /// Fill slots in order. Materials past the last slot are ignored.
    pub fn from_materials<'a>(materials: impl IntoIterator<Item = &'a LitMaterial>) -> Self {
        let mut out = Self::default();
        for (slot, material) in out.slots.iter_mut().zip(materials) {
            *slot = material.uniform();
            out.count += 1;
        }
        out
    }
}

/// Falloff tag of a light source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightKind {
    /// `vector` is a direction toward the light; no falloff.
    #[default]
    Directional = 0,
    /// `vector` is a world position; distance attenuation applies.
    Point = 1,
}

/// A light source: direction or position, color and falloff kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub vector: Vec3,
    pub color: Vec3,
    pub kind: LightKind,
}

impl Light {
    /// Directional light; `direction` is normalized.
    pub fn directional(direction: Vec3, color: Vec3) -> Self {
        Self {
            vector: direction.normalize_or_zero(),
            color,
            kind: LightKind::Directional,
        }
    }

    /// Point light at `position`
    pub fn point(position: Vec3, color: Vec3) -> Self {
        Self {
            vector: position,
            color,
            kind: LightKind::Point,
        }
    }

    pub fn uniform(&self) -> LightUniform {
        LightUniform {
            vector: self.vector,
            kind: self.kind as u32 as f32,
            color: self.color,
            _pad: 0.0,
        }
    }
}

/// Light uniform: `vector` + kind tag, color + padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct LightUniform {
    pub vector: Vec3,
    pub kind: f32,
    pub color: Vec3,
    pub _pad: f32,
}

/// Distance attenuation for point lights: `1 / (k + l*d + q*d^2)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Self {
            constant: 0.01,
            linear: 0.1,
            quadratic: 0.0,
        }
    }
}

impl Attenuation {
    #[inline]
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Camera uniform data
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    /// Camera world position
    pub position: Vec3,
    pub _pad: f32,
}

impl CameraUniform {
    pub fn new(projection: Mat4, view: Mat4, position: Vec3) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            position,
            _pad: 0.0,
        }
    }
}

/// Per-draw transform uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    /// Model matrix (world transform)
    pub model: [[f32; 4]; 4],
    /// View * model
    pub modelview: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of model)
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn new(model: Mat4, view: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            modelview: (view * model).to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY)
    }
}

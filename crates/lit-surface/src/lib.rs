//! Lit surface records for a per-vertex lit render target
//!
//! The scene core never talks to a GPU directly. Whatever draws its meshes
//! consumes the records in this crate: material coefficients, light sources
//! and the uniform blocks a Gouraud or Phong program expects.
//!
//! ## Usage
//!
//! ```ignore
//! use lit_surface::{LitMaterial, Light, MaterialSlots};
//!
//! let sand = LitMaterial::new("sand", "tex/sand.png", 0.2, 0.8, 0.05, 1.0);
//! let slots = MaterialSlots::from_materials([&sand]);
//! let sun = Light::directional(glam::Vec3::X, glam::Vec3::new(1.0, 0.95, 0.85));
//! ```

mod material;
mod params;

pub use material::{BlendMode, LitMaterial, TextureFilter, MAX_MATERIAL_SLOTS};
pub use params::{
    Attenuation, CameraUniform, Light, LightKind, LightUniform, MaterialSlots, MaterialUniform,
    ModelUniform,
};

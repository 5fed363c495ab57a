//! Lit material description
//!
//! A material is an opaque handle from the scene's point of view: an image to
//! bind plus four lighting coefficients. Loading and binding the image is the
//! render target's job.

use serde::{Deserialize, Serialize};

use crate::params::MaterialUniform;

/// Number of material slots a single mesh can bind at draw time.
pub const MAX_MATERIAL_SLOTS: usize = 3;

/// Texture sampling filter requested for the material image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    Nearest,
    #[default]
    Linear,
}

/// How a surface combines with what is already in the framebuffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Opaque,
    /// Alpha-blended; drawn after all opaque geometry.
    Translucent,
}

/// Material with ambient/diffuse/specular/shininess coefficients and an image.
///
/// Every field has an explicit default, so partially written JSON fills in
/// the rest.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LitMaterial {
    /// Name used by model files (`usemtl`) to pick this material.
    pub name: String,
    /// Image path or URL handed to the render target.
    pub texture: String,
    pub filter: TextureFilter,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    pub shininess: f32,
    pub blend: BlendMode,
}

impl Default for LitMaterial {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            texture: String::new(),
            filter: TextureFilter::Linear,
            ambient: 0.3,
            diffuse: 0.8,
            specular: 0.4,
            shininess: 16.0,
            blend: BlendMode::Opaque,
        }
    }
}

impl LitMaterial {
    /// Create an opaque, linearly filtered material.
    pub fn new(
        name: impl Into<String>,
        texture: impl Into<String>,
        ambient: f32,
        diffuse: f32,
        specular: f32,
        shininess: f32,
    ) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
            ambient,
            diffuse,
            specular,
            shininess,
            ..Self::default()
        }
    }

    /// Set the sampling filter
    pub fn with_filter(mut self, filter: TextureFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the blend mode
    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    #[inline]
    pub fn is_translucent(&self) -> bool {
        self.blend == BlendMode::Translucent
    }

    /// Coefficients packed for a uniform slot.
    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            shininess: self.shininess,
        }
    }
}

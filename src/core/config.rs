//! Terrain and noise configuration.
//!
//! Plain serde structs with explicit defaults. Partially written JSON fills
//! the missing fields from [`Default`].

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::cache::EvictionPolicy;
use crate::util::{Error, Result};

/// Largest grid resolution accepted by [`TerrainConfig::validate`].
pub const MAX_GRID_RESOLUTION: u32 = 256;

/// Fractal noise parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub seed: u32,
    /// Number of summed layers
    pub octaves: u32,
    /// Base frequency in noise units per tile length
    pub frequency: f64,
    /// Amplitude multiplier between layers
    pub persistence: f64,
    /// Frequency multiplier between layers
    pub lacunarity: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            octaves: 4,
            frequency: 6.0,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=16).contains(&self.octaves) {
            return Err(Error::config(format!("noise.octaves must be 1..=16, got {}", self.octaves)));
        }
        for (name, v) in [
            ("frequency", self.frequency),
            ("persistence", self.persistence),
            ("lacunarity", self.lacunarity),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::config(format!("noise.{name} must be positive, got {v}")));
            }
        }
        Ok(())
    }
}

/// Terrain generation and streaming settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// World length of one tile along +Z
    pub tile_size: f32,
    /// Samples per tile edge (grid is resolution x resolution)
    pub grid_resolution: u32,
    /// Width of the flat road corridor, in cells
    pub road_width: u32,
    /// Width of the ramp between road and terrain on each side, in cells
    pub transition_width: u32,
    /// Tiles kept in front of the reference tile
    pub tiles_ahead: u32,
    /// Tiles kept behind the reference tile
    pub tiles_behind: u32,
    /// Vertical offset of every tile node
    pub tile_y_offset: f32,
    /// Multiplier applied to the absolute noise value
    pub height_scale: f32,
    /// Elevation cut points between material 0/1 and 1/2
    pub material_thresholds: [f32; 2],
    /// Material index of road cells
    pub road_material: u32,
    pub heightmap_cache_capacity: usize,
    pub tile_cache_capacity: usize,
    pub tile_cache_policy: EvictionPolicy,
    pub noise: NoiseConfig,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            tile_size: 20.0,
            grid_resolution: 64,
            road_width: 8,
            transition_width: 5,
            tiles_ahead: 4,
            tiles_behind: 3,
            tile_y_offset: -2.0,
            height_scale: 9.0,
            material_thresholds: [2.0, 6.0],
            road_material: 0,
            heightmap_cache_capacity: 20,
            tile_cache_capacity: 12,
            tile_cache_policy: EvictionPolicy::InsertionOrder,
            noise: NoiseConfig::default(),
        }
    }
}

impl TerrainConfig {
    /// Check every field, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        if !self.tile_size.is_finite() || self.tile_size <= 0.0 {
            return Err(Error::config(format!("tile_size must be positive, got {}", self.tile_size)));
        }
        if !(2..=MAX_GRID_RESOLUTION).contains(&self.grid_resolution) {
            return Err(Error::config(format!(
                "grid_resolution must be 2..={MAX_GRID_RESOLUTION}, got {}",
                self.grid_resolution
            )));
        }
        if !self.height_scale.is_finite() || self.height_scale < 0.0 {
            return Err(Error::config(format!(
                "height_scale must be non-negative, got {}",
                self.height_scale
            )));
        }
        if !self.tile_y_offset.is_finite() {
            return Err(Error::config("tile_y_offset must be finite"));
        }
        let [t0, t1] = self.material_thresholds;
        if !(t0.is_finite() && t1.is_finite()) || t0 > t1 {
            return Err(Error::config(format!(
                "material_thresholds must be finite and ascending, got [{t0}, {t1}]"
            )));
        }
        if self.road_material > 2 {
            return Err(Error::config(format!(
                "road_material must be 0..=2, got {}",
                self.road_material
            )));
        }
        if self.heightmap_cache_capacity == 0 {
            return Err(Error::config("heightmap_cache_capacity must be at least 1"));
        }
        if self.tile_cache_capacity < self.window_len() {
            return Err(Error::config(format!(
                "tile_cache_capacity {} is smaller than the {} tile window",
                self.tile_cache_capacity,
                self.window_len()
            )));
        }
        self.noise.validate()
    }

    /// Key offsets of the active window relative to the reference tile.
    pub fn window_offsets(&self) -> RangeInclusive<i32> {
        -(self.tiles_behind as i32)..=self.tiles_ahead as i32
    }

    /// Number of tiles active at once.
    pub fn window_len(&self) -> usize {
        (self.tiles_behind + self.tiles_ahead + 1) as usize
    }

    /// Distance between neighbouring grid samples.
    pub fn cell_spacing(&self) -> f32 {
        self.tile_size / (self.grid_resolution.max(2) - 1) as f32
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

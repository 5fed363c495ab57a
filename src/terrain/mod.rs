//! Procedural terrain: noise, heightmaps and tile streaming.
//!
//! - [`NoiseField`] - seeded fractal Perlin noise
//! - [`HeightmapGenerator`] - per-tile grids with a flat road corridor, memoized
//! - [`TerrainStreamer`] - keeps a window of tile nodes attached around a position

mod heightmap;
mod noise;
mod streamer;

pub use heightmap::{Heightmap, HeightmapGenerator, HeightmapStats, TileKey};
pub use noise::NoiseField;
pub use streamer::{StreamerStats, TerrainStreamer};

//! Core layer - caching and configuration.
//!
//! - [`BoundedCache`] - capacity-bounded map with insertion-order or recency eviction
//! - [`TerrainConfig`] / [`NoiseConfig`] - generation and streaming settings

mod cache;
mod config;

pub use cache::{BoundedCache, CacheStats, EvictionPolicy};
pub use config::{NoiseConfig, TerrainConfig, MAX_GRID_RESOLUTION};

//! Heightmap grids and their procedural generator.
//!
//! A tile's grid covers `[key * tile_size, (key + 1) * tile_size]` along Z
//! with `resolution` rows, so the last row of one tile and the first row of
//! the next sample identical world positions. Columns straddle X = 0 with the
//! road centred on column `resolution / 2`.

use std::fmt;
use std::sync::Arc;

use crate::core::{BoundedCache, CacheStats, EvictionPolicy, TerrainConfig};
use crate::util::{Error, Result};

use super::noise::NoiseField;

/// Integer index of a terrain tile along +Z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TileKey(pub i32);

impl TileKey {
    /// Tile containing world `z`: `floor(z / tile_size)`.
    #[inline]
    pub fn from_z(z: f32, tile_size: f32) -> Self {
        Self((z / tile_size).floor() as i32)
    }

    /// World Z of the tile's first row.
    #[inline]
    pub fn origin_z(self, tile_size: f32) -> f32 {
        self.0 as f32 * tile_size
    }

    /// Like [`from_z`](Self::from_z), but `None` when `z` is not finite or
    /// its tile index does not fit in an `i32`.
    pub fn try_from_z(z: f32, tile_size: f32) -> Option<Self> {
        let k = f64::from((z / tile_size).floor());
        (k.is_finite() && k >= f64::from(i32::MIN) && k <= f64::from(i32::MAX)).then_some(Self(k as i32))
    }

    /// Key `delta` tiles away, saturating at the ends of the key range.
    #[inline]
    pub fn offset(self, delta: i32) -> Self {
        Self(self.0.saturating_add(delta))
    }

    #[inline]
    pub fn checked_offset(self, delta: i32) -> Option<Self> {
        self.0.checked_add(delta).map(Self)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile[{}]", self.0)
    }
}

/// Elevation grid plus a same-shaped grid of material indices.
///
/// Both grids are row-major; row index grows with world Z.
#[derive(Clone, PartialEq)]
pub struct Heightmap {
    key: TileKey,
    rows: usize,
    cols: usize,
    elevations: Vec<f32>,
    materials: Vec<u32>,
}

impl Heightmap {
    /// Build from row-major grids, checking the shape.
    pub fn from_parts(
        key: TileKey,
        rows: usize,
        cols: usize,
        elevations: Vec<f32>,
        materials: Vec<u32>,
    ) -> Result<Self> {
        if rows < 2 || cols < 2 {
            return Err(Error::HeightmapShape {
                expected: "at least 2x2".into(),
                actual: format!("{rows}x{cols}"),
            });
        }
        let cells = rows * cols;
        if elevations.len() != cells || materials.len() != cells {
            return Err(Error::HeightmapShape {
                expected: format!("{cells} cells"),
                actual: format!(
                    "{} elevations, {} materials",
                    elevations.len(),
                    materials.len()
                ),
            });
        }
        Ok(Self { key, rows, cols, elevations, materials })
    }

    #[inline]
    pub fn key(&self) -> TileKey {
        self.key
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn elevation(&self, row: usize, col: usize) -> f32 {
        self.elevations[row * self.cols + col]
    }

    #[inline]
    pub fn material(&self, row: usize, col: usize) -> u32 {
        self.materials[row * self.cols + col]
    }

    /// One row of elevations.
    pub fn row(&self, row: usize) -> &[f32] {
        let start = row * self.cols;
        &self.elevations[start..start + self.cols]
    }

    pub fn elevations(&self) -> &[f32] {
        &self.elevations
    }

    pub fn materials(&self) -> &[u32] {
        &self.materials
    }

    /// (min, max) elevation over the grid.
    pub fn elevation_range(&self) -> (f32, f32) {
        self.elevations
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &h| (lo.min(h), hi.max(h)))
    }
}

impl fmt::Debug for Heightmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (lo, hi) = self.elevation_range();
        write!(f, "Heightmap({} {}x{} h={lo:.2}..{hi:.2})", self.key, self.rows, self.cols)
    }
}

/// Generator counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeightmapStats {
    /// Grids actually computed (cache misses)
    pub generated: usize,
    pub cache: CacheStats,
}

/// Memoizing heightmap generator.
///
/// Repeated requests for a cached key return the same `Arc` until the key is
/// evicted (insertion order, oldest first).
#[derive(Debug)]
pub struct HeightmapGenerator {
    noise: NoiseField,
    tile_size: f32,
    resolution: usize,
    road_width: u32,
    transition_width: u32,
    height_scale: f32,
    frequency: f64,
    thresholds: [f32; 2],
    road_material: u32,
    cache: BoundedCache<TileKey, Arc<Heightmap>>,
    generated: usize,
}

impl HeightmapGenerator {
    pub fn new(config: &TerrainConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            noise: NoiseField::new(&config.noise),
            tile_size: config.tile_size,
            resolution: config.grid_resolution as usize,
            road_width: config.road_width,
            transition_width: config.transition_width,
            height_scale: config.height_scale,
            frequency: config.noise.frequency,
            thresholds: config.material_thresholds,
            road_material: config.road_material,
            cache: BoundedCache::new(config.heightmap_cache_capacity, EvictionPolicy::InsertionOrder),
            generated: 0,
        })
    }

    /// Heightmap for `key`, from cache or freshly generated.
    pub fn generate(&mut self, key: TileKey) -> Arc<Heightmap> {
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!(%key, "heightmap cache hit");
            return Arc::clone(hit);
        }
        let map = Arc::new(self.build(key));
        self.generated += 1;
        for (old, _) in self.cache.insert(key, Arc::clone(&map)) {
            tracing::trace!(key = %old, "heightmap evicted");
        }
        map
    }

    /// Compute the grid for `key` without touching the cache.
    pub fn build(&self, key: TileKey) -> Heightmap {
        let res = self.resolution;
        let spacing = self.tile_size / (res - 1) as f32;
        let center = (res / 2) as f32;
        let half_road = self.road_width as f32 / 2.0;
        let band = self.transition_width as f32;
        // First whole column past the ramp; its full height is the ramp target.
        let edge_offset = (half_road + band).ceil();

        let mut elevations = Vec::with_capacity(res * res);
        let mut materials = Vec::with_capacity(res * res);

        for row in 0..res {
            let z = key.origin_z(self.tile_size) + row as f32 * spacing;
            let mut edge_left = None;
            let mut edge_right = None;

            for col in 0..res {
                let offset = col as f32 - center;
                let d = offset.abs();

                if d < half_road {
                    elevations.push(0.0);
                    materials.push(self.road_material);
                    continue;
                }

                let h = if band > 0.0 && d < half_road + band {
                    let edge = if offset < 0.0 { &mut edge_left } else { &mut edge_right };
                    let target = *edge.get_or_insert_with(|| {
                        let edge_col = center + edge_offset * offset.signum();
                        self.height_at(self.column_x(edge_col, spacing), z)
                    });
                    (d - half_road) / band * target
                } else {
                    self.height_at(self.column_x(col as f32, spacing), z)
                };

                elevations.push(h);
                materials.push(self.material_for(h));
            }
        }

        Heightmap { key, rows: res, cols: res, elevations, materials }
    }

    #[inline]
    fn column_x(&self, col: f32, spacing: f32) -> f32 {
        (col - (self.resolution - 1) as f32 / 2.0) * spacing
    }

    /// Full terrain height at world (x, z), ignoring the road.
    pub fn height_at(&self, x: f32, z: f32) -> f32 {
        let scale = self.frequency / self.tile_size as f64;
        let n = self.noise.sample(x as f64 * scale, z as f64 * scale);
        n.abs() as f32 * self.height_scale
    }

    fn material_for(&self, h: f32) -> u32 {
        let [t0, t1] = self.thresholds;
        if h < t0 {
            0
        } else if h < t1 {
            1
        } else {
            2
        }
    }

    /// Largest elevation any tile can reach.
    pub fn max_height(&self) -> f32 {
        self.noise.amplitude_sum() as f32 * self.height_scale
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn is_cached(&self, key: TileKey) -> bool {
        self.cache.contains(&key)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn stats(&self) -> HeightmapStats {
        HeightmapStats {
            generated: self.generated,
            cache: self.cache.stats(),
        }
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> TerrainConfig {
        TerrainConfig {
            grid_resolution: 24,
            heightmap_cache_capacity: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_tile_key() {
        assert_eq!(TileKey::from_z(0.0, 20.0), TileKey(0));
        assert_eq!(TileKey::from_z(19.99, 20.0), TileKey(0));
        assert_eq!(TileKey::from_z(20.0, 20.0), TileKey(1));
        assert_eq!(TileKey::from_z(-0.1, 20.0), TileKey(-1));
        assert_eq!(TileKey(3).origin_z(20.0), 60.0);
        assert_eq!(TileKey(3).to_string(), "tile[3]");
    }

    #[test]
    fn test_tile_key_range_edges() {
        assert_eq!(TileKey::try_from_z(45.0, 20.0), Some(TileKey(2)));
        assert_eq!(TileKey::try_from_z(-0.1, 20.0), Some(TileKey(-1)));
        assert_eq!(TileKey::try_from_z(4.3e10, 1.0), None);
        assert_eq!(TileKey::try_from_z(f32::NAN, 20.0), None);
        assert_eq!(TileKey::try_from_z(f32::INFINITY, 20.0), None);

        let top = TileKey(i32::MAX);
        assert_eq!(top.checked_offset(1), None);
        assert_eq!(top.checked_offset(-3), Some(TileKey(i32::MAX - 3)));
        assert_eq!(top.offset(4), top);
        assert_eq!(TileKey(i32::MIN).offset(-1), TileKey(i32::MIN));
    }

    #[test]
    fn test_shape_validation() {
        assert!(Heightmap::from_parts(TileKey(0), 2, 2, vec![0.0; 4], vec![0; 4]).is_ok());
        assert!(matches!(
            Heightmap::from_parts(TileKey(0), 2, 2, vec![0.0; 4], vec![0; 3]),
            Err(Error::HeightmapShape { .. })
        ));
        assert!(Heightmap::from_parts(TileKey(0), 1, 4, vec![0.0; 4], vec![0; 4]).is_err());
    }

    #[test]
    fn test_cache_returns_same_arc() {
        let mut generator = HeightmapGenerator::new(&small_config()).unwrap();
        let a = generator.generate(TileKey(5));
        let b = generator.generate(TileKey(5));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(generator.stats().generated, 1);
        assert_eq!(generator.stats().cache.hits, 1);
    }

    #[test]
    fn test_cache_insertion_order_eviction() {
        let mut generator = HeightmapGenerator::new(&small_config()).unwrap();
        let first = generator.generate(TileKey(0));
        generator.generate(TileKey(1));
        generator.generate(TileKey(2));
        // Hit does not refresh key 0
        generator.generate(TileKey(0));
        generator.generate(TileKey(3));
        assert!(!generator.is_cached(TileKey(0)));
        assert_eq!(generator.cached_len(), 3);

        let again = generator.generate(TileKey(0));
        assert!(!Arc::ptr_eq(&first, &again));
        assert_eq!(*first, *again);
    }

    #[test]
    fn test_materials_follow_thresholds() {
        let generator = HeightmapGenerator::new(&small_config()).unwrap();
        let map = generator.build(TileKey(2));
        for r in 0..map.rows() {
            for c in 0..map.cols() {
                let h = map.elevation(r, c);
                let m = map.material(r, c);
                let d = (c as f32 - (map.cols() / 2) as f32).abs();
                if d < 4.0 {
                    assert_eq!(m, 0);
                } else if h < 2.0 {
                    assert_eq!(m, 0);
                } else if h < 6.0 {
                    assert_eq!(m, 1);
                } else {
                    assert_eq!(m, 2);
                }
            }
        }
    }

    #[test]
    fn test_heights_non_negative() {
        let generator = HeightmapGenerator::new(&small_config()).unwrap();
        let map = generator.build(TileKey(-4));
        let (lo, hi) = map.elevation_range();
        assert!(lo >= 0.0);
        assert!(hi > 0.0);
    }
}

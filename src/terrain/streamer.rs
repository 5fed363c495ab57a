//! Moving window of terrain tiles around a reference position.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use lit_surface::MAX_MATERIAL_SLOTS;
use tracing::{debug, info, trace};

use super::heightmap::{HeightmapGenerator, HeightmapStats, TileKey};
use crate::core::{BoundedCache, TerrainConfig};
use crate::geom::{GridLayout, MaterialHandle, MaterialList, Mesh};
use crate::scene::{NodeId, SceneGraph, SceneNode, Transform};
use crate::util::{vec3, Error, Result, Vec3};

/// Streaming counters, cumulative since construction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamerStats {
    /// Tile meshes triangulated
    pub tiles_built: usize,
    /// Window entries served from the tile cache
    pub cache_hits: usize,
    /// Cached tiles dropped (and their nodes destroyed)
    pub evicted: usize,
    pub attached: usize,
    pub detached: usize,
}

/// Keeps the tiles `[ref - behind, ref + ahead]` attached under a terrain
/// group node.
///
/// Detached tiles stay in a bounded node cache so driving back and forth
/// does not rebuild them. Cache eviction never touches a tile the current
/// window needs, and an evicted node is destroyed in the graph.
#[derive(Debug)]
pub struct TerrainStreamer {
    config: TerrainConfig,
    heightmaps: HeightmapGenerator,
    materials: MaterialList,
    layout: GridLayout,
    root: NodeId,
    tiles: BoundedCache<TileKey, NodeId>,
    active: BTreeMap<TileKey, NodeId>,
    stats: StreamerStats,
}

impl TerrainStreamer {
    /// Create a streamer whose tiles hang off a new `terrain` group under
    /// `parent`. Needs exactly three materials (low ground, slope, peak).
    pub fn new(
        config: TerrainConfig,
        materials: impl IntoIterator<Item = MaterialHandle>,
        graph: &mut SceneGraph,
        parent: NodeId,
    ) -> Result<Self> {
        config.validate()?;
        let materials: MaterialList = materials.into_iter().collect();
        if materials.len() != MAX_MATERIAL_SLOTS {
            return Err(Error::MaterialCount {
                count: materials.len(),
                max: MAX_MATERIAL_SLOTS,
            });
        }

        let heightmaps = HeightmapGenerator::new(&config)?;
        let layout = GridLayout::new(config.cell_spacing(), heightmaps.max_height().max(f32::EPSILON));
        let root = graph.spawn(parent, SceneNode::group("terrain"))?;
        let tiles = BoundedCache::new(config.tile_cache_capacity, config.tile_cache_policy);

        info!(
            resolution = config.grid_resolution,
            tile_size = config.tile_size,
            window = config.window_len(),
            cache = config.tile_cache_capacity,
            "terrain streamer ready"
        );

        Ok(Self {
            config,
            heightmaps,
            materials,
            layout,
            root,
            tiles,
            active: BTreeMap::new(),
            stats: StreamerStats::default(),
        })
    }

    /// Bring the active window in line with `reference` and return the
    /// active tile nodes ordered by key.
    ///
    /// Meshes for missing tiles are built before the graph is touched, so
    /// an error leaves the previous window attached.
    #[tracing::instrument(skip_all, fields(z = reference.z))]
    pub fn update(&mut self, graph: &mut SceneGraph, reference: Vec3) -> Result<Vec<NodeId>> {
        let needed: BTreeSet<TileKey> = TileKey::try_from_z(reference.z, self.config.tile_size)
            .and_then(|center| {
                self.config
                    .window_offsets()
                    .map(|i| center.checked_offset(i))
                    .collect()
            })
            .ok_or_else(|| Error::other(format!("reference z {} is outside the tile key range", reference.z)))?;

        // Build everything fallible first.
        let mut built = BTreeMap::new();
        for &key in &needed {
            if self.active.contains_key(&key) || self.cached_node(graph, key).is_some() {
                continue;
            }
            built.insert(key, self.build_mesh(key)?);
        }

        let leaving: Vec<(TileKey, NodeId)> = self
            .active
            .iter()
            .filter(|(key, _)| !needed.contains(key))
            .map(|(&k, &id)| (k, id))
            .collect();
        for (key, id) in leaving {
            graph.detach(id)?;
            self.active.remove(&key);
            self.stats.detached += 1;
            trace!(%key, "tile detached");
        }

        for &key in &needed {
            if self.active.contains_key(&key) {
                continue;
            }
            let id = match built.remove(&key) {
                Some(mesh) => self.insert_node(graph, key, mesh, &needed),
                None => match self.tiles.get(&key).copied() {
                    Some(id) => {
                        self.stats.cache_hits += 1;
                        trace!(%key, "tile cache hit");
                        id
                    }
                    None => {
                        // Needed keys are pinned, so this only runs if the cache lost one.
                        let mesh = self.build_mesh(key)?;
                        self.insert_node(graph, key, mesh, &needed)
                    }
                },
            };
            graph.add_child(self.root, id)?;
            self.active.insert(key, id);
            self.stats.attached += 1;
        }

        debug_assert_eq!(self.active.len(), needed.len());
        Ok(self.active.values().copied().collect())
    }

    /// Cached node for `key` if it is still alive in `graph`; stale entries
    /// are dropped.
    fn cached_node(&mut self, graph: &SceneGraph, key: TileKey) -> Option<NodeId> {
        let id = *self.tiles.peek(&key)?;
        if graph.contains(id) {
            Some(id)
        } else {
            self.tiles.remove(&key);
            None
        }
    }

    fn build_mesh(&mut self, key: TileKey) -> Result<Arc<Mesh>> {
        let heightmap = self.heightmaps.generate(key);
        let mesh = Mesh::from_heightmap(&heightmap, self.layout, self.materials.iter().cloned())?;
        self.stats.tiles_built += 1;
        debug!(%key, vertices = mesh.vertex_count(), "tile built");
        Ok(Arc::new(mesh))
    }

    /// Create the detached node for a freshly built tile and cache it,
    /// destroying whatever the cache evicts.
    fn insert_node(
        &mut self,
        graph: &mut SceneGraph,
        key: TileKey,
        mesh: Arc<Mesh>,
        needed: &BTreeSet<TileKey>,
    ) -> NodeId {
        let translation = vec3(0.0, self.config.tile_y_offset, key.origin_z(self.config.tile_size));
        let node = SceneNode::with_payload(format!("terrain {key}"), mesh)
            .with_transform(Transform::from_translation(translation));
        let id = graph.create_node(node);

        for (old_key, old_id) in self.tiles.insert_with_pinned(key, id, |k| needed.contains(k)) {
            if self.active.contains_key(&old_key) {
                tracing::error!(key = %old_key, "evicted an active tile");
                debug_assert!(false, "evicted an active tile");
            }
            // Stale ids are already gone; nothing to free.
            let _ = graph.destroy(old_id);
            self.stats.evicted += 1;
            debug!(key = %old_key, "tile evicted");
        }
        id
    }

    /// Destroy every tile node, cached or active.
    pub fn clear(&mut self, graph: &mut SceneGraph) {
        for (_, id) in self.tiles.clear() {
            let _ = graph.destroy(id);
        }
        for (_, id) in std::mem::take(&mut self.active) {
            let _ = graph.destroy(id);
        }
        self.heightmaps.clear_cache();
    }

    /// Keys currently attached, ascending.
    pub fn active_keys(&self) -> impl Iterator<Item = TileKey> + '_ {
        self.active.keys().copied()
    }

    pub fn active_node(&self, key: TileKey) -> Option<NodeId> {
        self.active.get(&key).copied()
    }

    pub fn is_active(&self, key: TileKey) -> bool {
        self.active.contains_key(&key)
    }

    /// Keys with a cached node, in eviction order.
    pub fn cached_keys(&self) -> impl Iterator<Item = TileKey> + '_ {
        self.tiles.keys().copied()
    }

    pub fn cached_len(&self) -> usize {
        self.tiles.len()
    }

    /// The group node tiles are attached under.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn stats(&self) -> StreamerStats {
        self.stats
    }

    /// Grid spacing and brightness ramp used for tile meshes.
    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn heightmap_stats(&self) -> HeightmapStats {
        self.heightmaps.stats()
    }

    pub fn heightmaps(&mut self) -> &mut HeightmapGenerator {
        &mut self.heightmaps
    }
}

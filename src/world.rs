//! The driving scene: terrain, camera and props advanced by a fixed tick.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use lit_surface::{BlendMode, Light, LitMaterial};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::TerrainConfig;
use crate::geom::{MaterialHandle, Mesh};
use crate::props::{trail_mesh, CentrePiece, PropLibrary, ShootingStar, StatueColumn};
use crate::render::{submit_frame, FlyCamera, FrameUniforms, RenderJobConsumer};
use crate::scene::{NodeId, SceneGraph, SceneNode};
use crate::terrain::TerrainStreamer;
use crate::util::{vec3, Error, Result, Vec3};

/// Materials used by the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldMaterials {
    /// Low ground, slope and peak, in material index order.
    pub terrain: Vec<LitMaterial>,
    pub metal: LitMaterial,
    pub ground: LitMaterial,
    /// Override material for shooting stars; should be translucent.
    pub glow: LitMaterial,
    /// Columns and statues.
    pub stone: LitMaterial,
}

impl Default for WorldMaterials {
    fn default() -> Self {
        Self {
            terrain: vec![
                LitMaterial::new("sand", "tex/sand.png", 0.2, 0.8, 0.05, 1.0),
                LitMaterial::new("ground", "tex/ground.png", 0.2, 0.8, 0.05, 1.0),
                LitMaterial::new("snow", "tex/snow.png", 0.3, 0.9, 0.1, 1.0),
            ],
            metal: LitMaterial::new("metal", "tex/metal.png", 0.25, 1.0, 2.0, 5.0),
            ground: LitMaterial::new("ground", "tex/ground.png", 0.2, 0.8, 0.05, 1.0),
            glow: LitMaterial::new("glow", "tex/glow.png", 1.0, 0.5, 0.0, 1.0)
                .with_blend(BlendMode::Translucent),
            stone: LitMaterial::new("stone", "tex/snow.png", 0.3, 0.8, 0.4, 16.0),
        }
    }
}

/// Slowest accepted simulation rate, one tick every 1000 s.
pub const MIN_TICK_RATE: f32 = 1e-3;

/// Everything [`World::new`] needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub terrain: TerrainConfig,
    /// Simulation ticks per second
    pub tick_rate: f32,
    /// Automatic forward (+Z) speed, units per second
    pub drive_speed: f32,
    /// Manual movement speed, units per second at full input
    pub fly_speed: f32,
    /// Manual turn speed, turns per second at full input
    pub rotation_speed: f32,
    pub camera_start: Vec3,
    pub shooting_star_count: usize,
    pub star_seed: u64,
    pub statue_count: usize,
    /// Distance along Z between consecutive columns
    pub statue_spacing: f32,
    /// Distance of the columns from the road centreline
    pub statue_offset: f32,
    pub lights: Vec<Light>,
    pub materials: WorldMaterials,
    /// OBJ file for the column; a box stands in when unset or unreadable.
    pub column_model: Option<PathBuf>,
    pub statue_model: Option<PathBuf>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            terrain: TerrainConfig::default(),
            tick_rate: 60.0,
            drive_speed: 0.0,
            fly_speed: 10.0,
            rotation_speed: 0.2,
            camera_start: vec3(0.0, 3.0, -4.5),
            shooting_star_count: 6,
            star_seed: 12345,
            statue_count: 6,
            statue_spacing: 40.0,
            statue_offset: 4.0,
            lights: vec![
                Light::directional(Vec3::X, vec3(1.0, 0.95, 0.85)),
                Light::point(vec3(-9.0, -9.0, 0.0), vec3(1.0, 0.2, 0.2)),
            ],
            materials: WorldMaterials::default(),
            column_model: None,
            statue_model: None,
        }
    }
}

impl WorldConfig {
    /// Check every field, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.terrain.validate()?;
        if !self.tick_rate.is_finite() || self.tick_rate < MIN_TICK_RATE {
            return Err(Error::config(format!(
                "tick_rate must be at least {MIN_TICK_RATE}, got {}",
                self.tick_rate
            )));
        }
        for (name, v) in [
            ("drive_speed", self.drive_speed),
            ("fly_speed", self.fly_speed),
            ("rotation_speed", self.rotation_speed),
            ("statue_offset", self.statue_offset),
        ] {
            if !v.is_finite() {
                return Err(Error::config(format!("{name} must be finite")));
            }
        }
        if self.statue_count > 0 && !(self.statue_spacing.is_finite() && self.statue_spacing > 0.0) {
            return Err(Error::config(format!(
                "statue_spacing must be positive, got {}",
                self.statue_spacing
            )));
        }
        if !self.camera_start.is_finite() {
            return Err(Error::config("camera_start must be finite"));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Manual input for one tick, each axis in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DriveInput {
    pub forward: f32,
    pub strafe: f32,
    pub lift: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

/// Fixed-step accumulator decoupling simulation ticks from render frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: Duration,
    accumulator: Duration,
    max_ticks: u32,
}

impl FrameClock {
    /// Clock for `tick_rate` ticks per second, running at most `max_ticks`
    /// ticks per advance. Backlog beyond that is dropped.
    ///
    /// Rates below [`MIN_TICK_RATE`], and NaN, run at [`MIN_TICK_RATE`].
    pub fn new(tick_rate: f32, max_ticks: u32) -> Self {
        let step = Duration::from_secs_f32(1.0 / tick_rate.max(MIN_TICK_RATE));
        Self {
            step,
            accumulator: Duration::ZERO,
            max_ticks: max_ticks.max(1),
        }
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Add `elapsed` wall time and return how many ticks to run now.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator = self.accumulator.saturating_add(elapsed);
        let mut ticks = 0;
        while self.accumulator >= self.step && ticks < self.max_ticks {
            self.accumulator -= self.step;
            ticks += 1;
        }
        if self.accumulator >= self.step {
            debug!(backlog = ?self.accumulator, "simulation behind, dropping ticks");
            self.accumulator = Duration::ZERO;
        }
        ticks
    }

    /// Fraction of a tick accumulated but not yet simulated.
    pub fn alpha(&self) -> f32 {
        self.accumulator.as_secs_f32() / self.step.as_secs_f32()
    }
}

/// The whole scene plus the state that drives it.
pub struct World {
    config: WorldConfig,
    graph: SceneGraph,
    streamer: TerrainStreamer,
    camera: FlyCamera,
    props: NodeId,
    library: PropLibrary,
    rig: CentrePiece,
    stars: Vec<ShootingStar>,
    statues: Vec<StatueColumn>,
    rng: StdRng,
    ticks: u64,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self> {
        config.validate()?;
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let camera = FlyCamera::new(config.camera_start);
        let mats = &config.materials;

        let terrain: Vec<MaterialHandle> = mats.terrain.iter().cloned().map(Arc::new).collect();
        let mut streamer = TerrainStreamer::new(config.terrain.clone(), terrain, &mut graph, root)?;
        streamer.update(&mut graph, camera.position())?;

        let props = graph.spawn(root, SceneNode::group("props"))?;
        let rig = CentrePiece::build(
            &mut graph,
            props,
            Arc::new(mats.ground.clone()),
            Arc::new(mats.metal.clone()),
        )?;

        let glow: MaterialHandle = Arc::new(mats.glow.clone());
        let star_mesh = Arc::new(trail_mesh(glow.clone())?);
        let mut rng = StdRng::seed_from_u64(config.star_seed);
        let stars = (0..config.shooting_star_count)
            .map(|_| ShootingStar::spawn(&mut graph, props, star_mesh.clone(), glow.clone(), &mut rng, camera.position()))
            .collect::<Result<Vec<_>>>()?;

        let mut library = PropLibrary::new();
        let stone: Vec<MaterialHandle> = vec![Arc::new(mats.stone.clone())];
        let column = library.obj_file_or_placeholder("column", config.column_model.as_deref(), &stone, || {
            Mesh::cuboid(1.0, 4.0, 1.0, stone.clone())
        })?;
        let statue = library.obj_file_or_placeholder("statue", config.statue_model.as_deref(), &stone, || {
            Mesh::cuboid(0.5, 1.0, 0.5, stone.clone())
        })?;
        let mut statues = Vec::with_capacity(config.statue_count);
        for i in 0..config.statue_count {
            let side = if i % 2 == 0 { -1.0 } else { 1.0 };
            let x = side * config.statue_offset;
            let z = config.camera_start.z + i as f32 * config.statue_spacing;
            let y = streamer.heightmaps().height_at(x, z) + config.terrain.tile_y_offset;
            statues.push(StatueColumn::spawn(&mut graph, props, &column, &statue, vec3(x, y, z))?);
        }

        info!(
            nodes = graph.len(),
            stars = stars.len(),
            statues = statues.len(),
            placeholders = column.placeholder || statue.placeholder,
            "world ready"
        );

        Ok(Self {
            config,
            graph,
            streamer,
            camera,
            props,
            library,
            rig,
            stars,
            statues,
            rng,
            ticks: 0,
        })
    }

    /// Run one simulation tick.
    ///
    /// On error the camera has already moved but the terrain window is
    /// still the previous one; the next successful step catches up.
    pub fn step(&mut self, input: &DriveInput) -> Result<()> {
        let rate = self.config.tick_rate;
        let dt = 1.0 / rate;

        let turn = self.config.rotation_speed * TAU * dt;
        self.camera.add_yaw(input.yaw * turn);
        self.camera.add_pitch(input.pitch * turn);
        self.camera.add_roll(input.roll * turn);
        let travel = self.config.fly_speed * dt;
        self.camera
            .move_in_direction(vec3(input.strafe, input.lift, input.forward) * travel);
        if self.config.drive_speed != 0.0 {
            self.camera.translate(Vec3::Z * self.config.drive_speed * dt);
        }

        let car = self.camera.position();
        self.streamer.update(&mut self.graph, car)?;

        self.rig.tick(&mut self.graph, rate);
        for star in &mut self.stars {
            star.update(&mut self.graph, dt, car, &mut self.rng);
        }

        let span = self.config.statue_count as f32 * self.config.statue_spacing;
        let y_offset = self.config.terrain.tile_y_offset;
        for statue in &mut self.statues {
            statue.update(&mut self.graph, dt);
            if statue.recycle(&mut self.graph, car.z, self.config.statue_spacing, span) {
                if let Some(mut p) = statue.position(&self.graph) {
                    p.y = self.streamer.heightmaps().height_at(p.x, p.z) + y_offset;
                    statue.set_position(&mut self.graph, p);
                }
            }
        }

        self.ticks += 1;
        Ok(())
    }

    pub fn frame_uniforms(&self, aspect: f32) -> FrameUniforms {
        FrameUniforms {
            projection: self.camera.projection_matrix(aspect),
            view: self.camera.view_matrix(),
            camera_position: self.camera.position(),
            lights: self.config.lights.clone(),
        }
    }

    /// Flatten the scene and submit it. Returns the number of draws.
    pub fn render<C: RenderJobConsumer + ?Sized>(&self, consumer: &mut C, aspect: f32) -> usize {
        let jobs = self.graph.flatten(self.graph.root());
        submit_frame(consumer, &self.frame_uniforms(aspect), jobs)
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn streamer(&self) -> &TerrainStreamer {
        &self.streamer
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut FlyCamera {
        &mut self.camera
    }

    pub fn props_root(&self) -> NodeId {
        self.props
    }

    pub fn library(&self) -> &PropLibrary {
        &self.library
    }

    pub fn rig(&self) -> &CentrePiece {
        &self.rig
    }

    pub fn stars(&self) -> &[ShootingStar] {
        &self.stars
    }

    pub fn statues(&self) -> &[StatueColumn] {
        &self.statues
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_roundtrip() {
        let cfg = WorldConfig::default();
        cfg.validate().unwrap();
        let back = WorldConfig::from_json_str(&cfg.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, cfg);

        let partial = WorldConfig::from_json_str(r#"{ "tick_rate": 30, "terrain": { "tile_size": 10 } }"#).unwrap();
        assert_eq!(partial.tick_rate, 30.0);
        assert_eq!(partial.terrain.tile_size, 10.0);
        assert_eq!(partial.statue_count, 6);
    }

    #[test]
    fn test_config_rejects_bad_rate() {
        for tick_rate in [0.0, -60.0, 1e-30, MIN_TICK_RATE / 2.0, f32::NAN, f32::INFINITY] {
            let cfg = WorldConfig { tick_rate, ..Default::default() };
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))), "{tick_rate}");
        }
        let slowest = WorldConfig { tick_rate: MIN_TICK_RATE, ..Default::default() };
        assert!(slowest.validate().is_ok());
        assert_eq!(FrameClock::new(slowest.tick_rate, 1).step(), Duration::from_secs_f32(1.0 / MIN_TICK_RATE));
    }

    #[test]
    fn test_clock_clamps_rate() {
        let limit = Duration::from_secs_f32(1.0 / MIN_TICK_RATE);
        for tick_rate in [1e-30, 0.0, -1.0, f32::NAN] {
            assert_eq!(FrameClock::new(tick_rate, 4).step(), limit, "{tick_rate}");
        }

        let mut clock = FrameClock::new(60.0, 4);
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(Duration::MAX), 4);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }

    #[test]
    fn test_clock() {
        let mut clock = FrameClock::new(60.0, 4);
        assert_eq!(clock.advance(Duration::from_millis(10)), 0);
        assert_eq!(clock.advance(Duration::from_millis(10)), 1);
        assert!(clock.alpha() > 0.0 && clock.alpha() < 1.0);
        // A long stall runs at most max_ticks and drops the rest.
        assert_eq!(clock.advance(Duration::from_secs(1)), 4);
        assert_eq!(clock.advance(Duration::ZERO), 0);
    }
}

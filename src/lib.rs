//! # roadscape
//!
//! Procedurally generated, endlessly streaming road terrain feeding a
//! hierarchical scene graph that is flattened into render jobs every frame.
//!
//! ## Modules
//!
//! - [`util`] - Errors and math helpers
//! - [`core`] - Bounded caches and configuration
//! - [`terrain`] - Noise, heightmap generation and tile streaming
//! - [`geom`] - Vertex layout, meshes, primitives, OBJ loading
//! - [`scene`] - Scene graph, transforms and render jobs
//! - [`render`] - Fly camera, uniforms and the render target boundary
//! - [`props`] - Centre-piece rig, shooting stars, statue columns
//! - [`world`] - Fixed-tick driver tying everything together
//!
//! ## Example
//!
//! ```no_run
//! use roadscape::render::FrameRecorder;
//! use roadscape::world::{DriveInput, World, WorldConfig};
//!
//! let mut world = World::new(WorldConfig { drive_speed: 15.0, ..Default::default() })?;
//! let mut target = FrameRecorder::new();
//! for _ in 0..120 {
//!     world.step(&DriveInput::default())?;
//! }
//! let draws = world.render(&mut target, 16.0 / 9.0);
//! println!("{draws} draws, {} triangles", target.triangles());
//! # Ok::<(), roadscape::Error>(())
//! ```

pub mod util;
pub mod core;
pub mod terrain;
pub mod geom;
pub mod scene;
pub mod render;
pub mod props;
pub mod world;

pub use util::{Error, Result};

/// Commonly used types.
pub mod prelude {
    pub use crate::core::{EvictionPolicy, NoiseConfig, TerrainConfig};
    pub use crate::geom::{MaterialHandle, Mesh, Vertex};
    pub use crate::render::{FlyCamera, FrameRecorder, FrameUniforms, RenderJobConsumer};
    pub use crate::scene::{NodeId, RenderJob, Renderable, Rotation, SceneGraph, SceneNode, Transform};
    pub use crate::terrain::{Heightmap, HeightmapGenerator, TerrainStreamer, TileKey};
    pub use crate::util::{Error, Result};
    pub use crate::world::{DriveInput, FrameClock, World, WorldConfig};
    pub use lit_surface::{BlendMode, Light, LitMaterial};
}

//! Scene graph: transforms, nodes, hierarchy and per-frame render jobs.
//!
//! - [`Transform`] / [`Rotation`] - local TRS with roll/pitch/yaw
//! - [`SceneNode`] / [`Renderable`] - node data and drawable payload
//! - [`SceneGraph`] - arena of nodes keyed by [`NodeId`]
//! - [`RenderJob`] - flattened (world matrix, drawable) pair

mod graph;
mod job;
mod node;
mod transform;

pub use graph::SceneGraph;
pub use job::RenderJob;
pub use node::{NodeId, Renderable, SceneNode};
pub use transform::{Rotation, Transform};

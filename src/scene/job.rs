use super::node::{NodeId, Renderable};
use crate::util::Mat4;

/// One draw for one frame: where and what.
///
/// Rebuilt by every flatten; holding one across frames keeps the mesh
/// alive but not its transform current.
#[derive(Clone, Debug)]
pub struct RenderJob {
    pub node: NodeId,
    pub world_matrix: Mat4,
    pub renderable: Renderable,
}

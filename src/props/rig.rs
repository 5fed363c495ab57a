//! Animated centre-piece: platform, pillar, swinging arm, spinning boxes and
//! orbiting spheres.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::geom::{MaterialHandle, Mesh};
use crate::scene::{NodeId, SceneGraph, SceneNode, Transform};
use crate::util::{vec3, Result};

/// Arm yaw rate, radians per second.
pub const ARM_SPEED: f32 = 0.5;
/// Sphere orbit rate, radians per second.
pub const SPHERE_SPEED: f32 = 2.0;
pub const SPHERE_ORBIT_RADIUS: f32 = 0.8;
/// Box roll/pitch increment per tick, radians.
pub const BOX_SPIN_PER_TICK: f32 = 0.02;

/// Node handles of the centre-piece hierarchy.
#[derive(Clone, Debug)]
pub struct CentrePiece {
    pub platform: NodeId,
    pub pillar: NodeId,
    pub arm: NodeId,
    pub left_box: NodeId,
    pub right_box: NodeId,
    pub left_sphere: NodeId,
    pub right_sphere: NodeId,
    arm_angle: f32,
    sphere_angle: f32,
}

impl CentrePiece {
    /// Build the hierarchy under `parent`. Both spheres share one mesh.
    pub fn build(
        graph: &mut SceneGraph,
        parent: NodeId,
        ground: MaterialHandle,
        metal: MaterialHandle,
    ) -> Result<Self> {
        let platform_mesh = Arc::new(Mesh::platform(5.0, 5.0, 0.0, 4.0, [ground])?);
        let pillar_mesh = Arc::new(Mesh::cuboid(0.5, 2.0, 0.5, [metal.clone()])?);
        let arm_mesh = Arc::new(Mesh::cuboid(2.0, 0.3, 0.3, [metal.clone()])?);
        let box_mesh = Arc::new(Mesh::cuboid(0.5, 0.5, 0.5, [metal.clone()])?);
        let sphere_mesh = Arc::new(Mesh::uv_sphere(0.2, 12, [metal])?);

        let up_one = Transform::from_translation(vec3(0.0, 1.0, 0.0));

        let platform = graph.spawn(parent, SceneNode::with_payload("platform", platform_mesh))?;
        let pillar = graph.spawn(
            platform,
            SceneNode::with_payload("pillar", pillar_mesh).with_transform(up_one),
        )?;
        let arm = graph.spawn(pillar, SceneNode::with_payload("arm", arm_mesh).with_transform(up_one))?;
        let left_box = graph.spawn(
            arm,
            SceneNode::with_payload("left box", box_mesh.clone())
                .with_transform(Transform::from_translation(vec3(-1.0, 0.0, 0.0))),
        )?;
        let right_box = graph.spawn(
            arm,
            SceneNode::with_payload("right box", box_mesh)
                .with_transform(Transform::from_translation(vec3(1.0, 0.0, 0.0))),
        )?;
        let left_sphere = graph.spawn(left_box, SceneNode::with_payload("left sphere", sphere_mesh.clone()))?;
        let right_sphere = graph.spawn(right_box, SceneNode::with_payload("right sphere", sphere_mesh))?;

        let mut rig = Self {
            platform,
            pillar,
            arm,
            left_box,
            right_box,
            left_sphere,
            right_sphere,
            arm_angle: 0.0,
            sphere_angle: 0.0,
        };
        rig.apply(graph);
        Ok(rig)
    }

    /// Advance one simulation tick at `tick_rate` ticks per second.
    pub fn tick(&mut self, graph: &mut SceneGraph, tick_rate: f32) {
        self.arm_angle += ARM_SPEED / tick_rate;
        self.sphere_angle += SPHERE_SPEED / tick_rate;
        if let Some(n) = graph.node_mut(self.left_box) {
            n.transform.rotation.roll += BOX_SPIN_PER_TICK;
        }
        if let Some(n) = graph.node_mut(self.right_box) {
            n.transform.rotation.pitch += BOX_SPIN_PER_TICK;
        }
        self.apply(graph);
    }

    fn apply(&self, graph: &mut SceneGraph) {
        if let Some(n) = graph.node_mut(self.arm) {
            n.transform.rotation.yaw = self.arm_angle;
        }
        for (node, phase) in [(self.left_sphere, 0.0), (self.right_sphere, PI)] {
            let angle = self.sphere_angle + phase;
            if let Some(n) = graph.node_mut(node) {
                n.transform.translation =
                    vec3(angle.cos(), angle.sin(), 0.0) * SPHERE_ORBIT_RADIUS;
            }
        }
    }

    pub fn arm_angle(&self) -> f32 {
        self.arm_angle
    }

    pub fn sphere_angle(&self) -> f32 {
        self.sphere_angle
    }
}

//! Roadside columns topped with a slowly tumbling statue.

use std::f32::consts::FRAC_PI_2;

use super::library::PropMesh;
use crate::scene::{NodeId, Rotation, SceneGraph, SceneNode, Transform};
use crate::util::{vec3, Result, Vec3};

/// Statue pitch rate, radians per second (negative: tips forward).
pub const STATUE_SPIN: f32 = 0.3;

/// Column transform for the authored model or its box stand-in.
fn column_transform(placeholder: bool) -> Transform {
    if placeholder {
        Transform::from_translation(vec3(0.0, 1.0, 0.0))
    } else {
        Transform::from_translation(vec3(0.0, -1.0, 0.0)).with_scale(vec3(0.0025, 0.005, 0.0025))
    }
}

/// Statue transform relative to the column.
///
/// The authored statue is placed in the column's model space. A stand-in
/// box is placed relative to the prop root and mapped back through the
/// column transform so it sits on top at unit scale.
fn statue_transform(column: &Transform, placeholder: bool) -> Transform {
    if !placeholder {
        return Transform::from_translation(vec3(0.0, 1000.0, 0.0))
            .with_rotation(Rotation::new(0.0, FRAC_PI_2, 0.0))
            .with_scale(Vec3::splat(20.0));
    }
    let wanted = vec3(0.0, 3.5, 0.0);
    Transform::from_translation((wanted - column.translation) / column.scale)
        .with_scale(Vec3::ONE / column.scale)
}

/// A column prop: a positioning group, the column, and the statue on it.
#[derive(Clone, Debug)]
pub struct StatueColumn {
    pub root: NodeId,
    pub column: NodeId,
    pub statue: NodeId,
}

impl StatueColumn {
    pub fn spawn(
        graph: &mut SceneGraph,
        parent: NodeId,
        column: &PropMesh,
        statue: &PropMesh,
        position: Vec3,
    ) -> Result<Self> {
        let root = graph.spawn(
            parent,
            SceneNode::group("statue column").with_transform(Transform::from_translation(position)),
        )?;
        let column_xf = column_transform(column.placeholder);
        let column_node = graph.spawn(
            root,
            SceneNode::with_payload("column", column.mesh.clone()).with_transform(column_xf),
        )?;
        let statue_node = graph.spawn(
            column_node,
            SceneNode::with_payload("statue", statue.mesh.clone())
                .with_transform(statue_transform(&column_xf, statue.placeholder)),
        )?;
        Ok(Self { root, column: column_node, statue: statue_node })
    }

    /// Tumble the statue.
    pub fn update(&mut self, graph: &mut SceneGraph, dt: f32) {
        if let Some(node) = graph.node_mut(self.statue) {
            node.transform.rotation.pitch -= dt * STATUE_SPIN;
        }
    }

    pub fn position(&self, graph: &SceneGraph) -> Option<Vec3> {
        graph.node(self.root).map(|n| n.transform.translation)
    }

    pub fn set_position(&self, graph: &mut SceneGraph, position: Vec3) {
        if let Some(node) = graph.node_mut(self.root) {
            node.transform.translation = position;
        }
    }

    /// Move the column forward by whole multiples of `span` once it is more
    /// than `behind` units behind `reference_z`. Returns whether it moved.
    ///
    /// The jump is computed in one step, so a column far behind lands just
    /// past the threshold instead of being walked there.
    pub fn recycle(&self, graph: &mut SceneGraph, reference_z: f32, behind: f32, span: f32) -> bool {
        let Some(mut position) = self.position(graph) else {
            return false;
        };
        let threshold = reference_z - behind;
        if position.z >= threshold || !span.is_finite() || span <= 0.0 {
            return false;
        }
        let (z, span) = (f64::from(position.z), f64::from(span));
        let steps = ((f64::from(threshold) - z) / span).ceil();
        // Spacing between f32 values can exceed `span` far from the origin.
        position.z = ((z + steps * span) as f32).max(threshold);
        self.set_position(graph, position);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Mesh;
    use lit_surface::LitMaterial;
    use std::sync::Arc;

    fn prop(w: f32, h: f32, placeholder: bool) -> PropMesh {
        let m = Arc::new(LitMaterial::default());
        PropMesh { mesh: Arc::new(Mesh::cuboid(w, h, w, [m]).unwrap()), placeholder }
    }

    #[test]
    fn test_placeholder_stack() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let s = StatueColumn::spawn(&mut g, root, &prop(1.0, 4.0, true), &prop(0.5, 1.0, true), vec3(14.0, 0.0, 40.0))
            .unwrap();
        let statue = g.world_matrix(s.statue).unwrap();
        assert!((statue.w_axis.truncate() - vec3(14.0, 3.5, 40.0)).length() < 1e-4);
        assert!((statue.x_axis.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_authored_stack_and_spin() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let mut s =
            StatueColumn::spawn(&mut g, root, &prop(1.0, 1.0, false), &prop(1.0, 1.0, false), Vec3::ZERO).unwrap();
        let statue = g.world_matrix(s.statue).unwrap();
        // 1000 units of column space lifted by the column's 0.005 Y scale.
        assert!((statue.w_axis.y - 4.0).abs() < 1e-3);

        s.update(&mut g, 1.0);
        let pitch = g.node(s.statue).unwrap().transform.rotation.pitch;
        assert!((pitch - (FRAC_PI_2 - STATUE_SPIN)).abs() < 1e-6);
    }

    #[test]
    fn test_recycle() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let s = StatueColumn::spawn(&mut g, root, &prop(1.0, 4.0, true), &prop(0.5, 1.0, true), vec3(-14.0, 0.0, 0.0))
            .unwrap();
        assert!(!s.recycle(&mut g, 30.0, 40.0, 240.0));
        assert!(s.recycle(&mut g, 50.0, 40.0, 240.0));
        assert_eq!(s.position(&g), Some(vec3(-14.0, 0.0, 240.0)));

        // Several spans behind: one jump to the first slot past the threshold.
        assert!(s.recycle(&mut g, 1000.0, 40.0, 240.0));
        assert_eq!(s.position(&g), Some(vec3(-14.0, 0.0, 960.0)));
        assert!(!s.recycle(&mut g, 1000.0, 40.0, 0.0));
        assert!(!s.recycle(&mut g, 1e4, 40.0, f32::NAN));
    }

    #[test]
    fn test_recycle_far_from_origin() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let s = StatueColumn::spawn(&mut g, root, &prop(1.0, 4.0, true), &prop(0.5, 1.0, true), vec3(14.0, 0.0, 0.0))
            .unwrap();
        // At this magnitude adding `span` to a f32 would not change it.
        let reference = 5.0e9;
        assert!(s.recycle(&mut g, reference, 40.0, 240.0));
        let z = s.position(&g).unwrap().z;
        assert!(z >= reference - 40.0, "{z}");
        assert!(z - reference < 1e3, "{z}");
        assert!(!s.recycle(&mut g, reference, 40.0, 240.0));
    }
}

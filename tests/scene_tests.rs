//! Integration tests for transform composition and scene flattening.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use roadscape::geom::Mesh;
use roadscape::prelude::LitMaterial;
use roadscape::scene::{NodeId, Rotation, SceneGraph, SceneNode, Transform};
use roadscape::util::{vec3, Vec3};
use roadscape::Error;

fn mesh() -> Arc<Mesh> {
    Arc::new(Mesh::cuboid(1.0, 1.0, 1.0, [Arc::new(LitMaterial::default())]).unwrap())
}

#[test]
fn test_local_matrix_translate_then_scale() {
    let t = Transform::from_translation(vec3(1.0, 2.0, 3.0)).with_scale(Vec3::splat(2.0));
    let m = t.local_matrix();
    assert_eq!(m.transform_point3(Vec3::ZERO), vec3(1.0, 2.0, 3.0));
    assert_eq!(m.transform_point3(vec3(1.0, 0.0, 0.0)), vec3(3.0, 2.0, 3.0));
}

#[test]
fn test_rotation_order_is_fixed() {
    // Rz * Rx * Ry differs from the reverse order for these angles.
    let r = Rotation::new(0.3, 0.7, 1.1);
    let forward = r.matrix();
    let reverse = glam::Mat4::from_rotation_y(1.1) * glam::Mat4::from_rotation_x(0.7) * glam::Mat4::from_rotation_z(0.3);
    let p = vec3(0.2, -0.5, 1.0);
    assert!((forward.transform_point3(p) - reverse.transform_point3(p)).length() > 1e-3);

    let t = Transform::from_translation(vec3(5.0, 0.0, 0.0))
        .with_rotation(Rotation::new(0.0, 0.0, FRAC_PI_2))
        .with_scale(vec3(2.0, 1.0, 1.0));
    // Scale first, then yaw (+X -> -Z), then translate.
    let q = t.local_matrix().transform_point3(Vec3::X);
    assert!((q - vec3(5.0, 0.0, -2.0)).length() < 1e-5);
}

#[test]
fn test_flatten_order_and_count() {
    let m = mesh();
    let mut g = SceneGraph::new();
    let root = g.root();

    // root
    //  ├─ a (mesh)
    //  │   ├─ group
    //  │   │   └─ c (mesh)
    //  │   └─ d (mesh)
    //  └─ e (mesh)
    let a = g.spawn(root, SceneNode::with_payload("a", m.clone())).unwrap();
    let group = g.spawn(a, SceneNode::group("group")).unwrap();
    let c = g.spawn(group, SceneNode::with_payload("c", m.clone())).unwrap();
    let d = g.spawn(a, SceneNode::with_payload("d", m.clone())).unwrap();
    let e = g.spawn(root, SceneNode::with_payload("e", m)).unwrap();

    let jobs = g.flatten(root);
    let order: Vec<NodeId> = jobs.iter().map(|j| j.node).collect();
    assert_eq!(order, vec![a, c, d, e]);
    assert_eq!(g.len(), 6);

    // Same tree, same order.
    let again: Vec<NodeId> = g.flatten(root).iter().map(|j| j.node).collect();
    assert_eq!(again, order);
}

#[test]
fn test_group_matrix_propagates() {
    let mut g = SceneGraph::new();
    let root = g.root();
    let group = g
        .spawn(
            root,
            SceneNode::group("offset").with_transform(Transform::from_translation(vec3(0.0, 10.0, 0.0))),
        )
        .unwrap();
    let child = g
        .spawn(
            group,
            SceneNode::with_payload("child", mesh()).with_transform(Transform::from_translation(vec3(1.0, 0.0, 0.0))),
        )
        .unwrap();

    let jobs = g.flatten(root);
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].world_matrix.w_axis.truncate(), vec3(1.0, 10.0, 0.0));
    assert_eq!(g.world_matrix(child).unwrap(), jobs[0].world_matrix);
}

#[test]
fn test_remove_child_by_identity() {
    let m = mesh();
    let mut g = SceneGraph::new();
    let root = g.root();
    let a = g.spawn(root, SceneNode::with_payload("same", m.clone())).unwrap();
    let b = g.spawn(root, SceneNode::with_payload("same", m)).unwrap();

    assert!(g.remove_child(root, a).unwrap());
    assert!(!g.remove_child(root, a).unwrap());
    assert_eq!(g.children(root), &[b]);
    assert_eq!(g.parent(a), None);

    // Detached subtrees are not flattened but can be reattached.
    assert_eq!(g.flatten(root).len(), 1);
    g.add_child(root, a).unwrap();
    let order: Vec<NodeId> = g.flatten(root).iter().map(|j| j.node).collect();
    assert_eq!(order, vec![b, a]);
}

#[test]
fn test_structure_errors() {
    let mut g = SceneGraph::new();
    let root = g.root();
    let a = g.spawn(root, SceneNode::group("a")).unwrap();
    let b = g.spawn(a, SceneNode::group("b")).unwrap();

    assert!(matches!(g.add_child(root, b), Err(Error::NodeHasParent(_))));
    g.detach(a).unwrap();
    assert!(matches!(g.add_child(b, a), Err(Error::CycleDetected { .. })));

    assert_eq!(g.destroy(a).unwrap(), 2);
    assert!(!g.contains(b));
    assert!(matches!(g.add_child(root, b), Err(Error::NodeNotFound(_))));
}

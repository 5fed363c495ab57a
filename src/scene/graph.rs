//! Arena-backed scene hierarchy.

use slotmap::SlotMap;

use super::job::RenderJob;
use super::node::{NodeId, SceneNode};
use crate::util::{Error, Mat4, Result};

/// Tree of [`SceneNode`]s stored in a slot map.
///
/// Every graph has a root. Nodes are created detached and hang off at most
/// one parent; [`add_child`](Self::add_child) refuses anything that would
/// give a node two parents or make it its own ancestor.
#[derive(Debug)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::group("root"));
        Self { nodes, root }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Insert a detached node.
    pub fn create_node(&mut self, mut node: SceneNode) -> NodeId {
        node.parent = None;
        node.children.clear();
        self.nodes.insert(node)
    }

    /// Insert a node and attach it under `parent`.
    pub fn spawn(&mut self, parent: NodeId, node: SceneNode) -> Result<NodeId> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let id = self.create_node(node);
        self.add_child(parent, id)?;
        Ok(id)
    }

    /// Append `child` to `parent`'s children.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if !self.nodes.contains_key(parent) {
            return Err(Error::NodeNotFound(parent));
        }
        let child_node = self.nodes.get(child).ok_or(Error::NodeNotFound(child))?;
        if child_node.parent.is_some() {
            return Err(Error::NodeHasParent(child));
        }
        if self.is_descendant_of(parent, child) {
            return Err(Error::CycleDetected { parent, child });
        }

        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.push(child);
        }
        Ok(())
    }

    /// Remove `child` from `parent`'s children. Returns false if it was not
    /// a child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        let parent_node = self.nodes.get_mut(parent).ok_or(Error::NodeNotFound(parent))?;
        let Some(pos) = parent_node.children.iter().position(|&c| c == child) else {
            return Ok(false);
        };
        parent_node.children.remove(pos);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = None;
        }
        Ok(true)
    }

    /// Detach `node` from its parent, if any. The subtree stays alive.
    pub fn detach(&mut self, node: NodeId) -> Result<bool> {
        let parent = self.nodes.get(node).ok_or(Error::NodeNotFound(node))?.parent;
        match parent {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(false),
        }
    }

    /// Detach `node` and free it with its whole subtree.
    ///
    /// Returns the number of nodes freed. The root cannot be destroyed.
    pub fn destroy(&mut self, node: NodeId) -> Result<usize> {
        if node == self.root {
            return Err(Error::other("the root node cannot be destroyed"));
        }
        self.detach(node)?;
        let mut stack = vec![node];
        let mut freed = 0;
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(id) {
                stack.extend(removed.children);
                freed += 1;
            }
        }
        Ok(freed)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    /// Children in insertion order; empty for unknown ids.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `node` followed by its parent, grandparent and so on.
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.nodes.contains_key(node).then_some(node);
        std::iter::successors(first, move |&id| self.parent(id))
    }

    /// True if `node` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Product of local matrices from the top of `node`'s tree down to it.
    pub fn world_matrix(&self, node: NodeId) -> Result<Mat4> {
        if !self.nodes.contains_key(node) {
            return Err(Error::NodeNotFound(node));
        }
        Ok(self
            .ancestors(node)
            .filter_map(|id| self.nodes.get(id))
            .fold(Mat4::IDENTITY, |acc, n| n.transform.local_matrix() * acc))
    }

    /// Render jobs for `start` and everything below it.
    pub fn flatten(&self, start: NodeId) -> Vec<RenderJob> {
        let mut jobs = Vec::new();
        self.flatten_into(start, Mat4::IDENTITY, &mut jobs);
        jobs
    }

    /// Depth-first pre-order walk appending one job per node with a
    /// payload. `world = parent_matrix * local`; siblings keep insertion
    /// order.
    pub fn flatten_into(&self, start: NodeId, parent_matrix: Mat4, jobs: &mut Vec<RenderJob>) {
        let mut stack = vec![(start, parent_matrix)];
        while let Some((id, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            let world = parent * node.transform.local_matrix();
            if let Some(payload) = &node.payload {
                jobs.push(RenderJob {
                    node: id,
                    world_matrix: world,
                    renderable: payload.clone(),
                });
            }
            stack.extend(node.children.iter().rev().map(|&c| (c, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Transform;
    use crate::util::vec3;

    #[test]
    fn test_add_and_remove() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let a = g.create_node(SceneNode::group("a"));
        g.add_child(root, a).unwrap();
        assert_eq!(g.parent(a), Some(root));
        assert_eq!(g.children(root), &[a]);

        assert!(g.remove_child(root, a).unwrap());
        assert!(!g.remove_child(root, a).unwrap());
        assert_eq!(g.parent(a), None);
        assert!(g.children(root).is_empty());
    }

    #[test]
    fn test_single_parent() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let a = g.spawn(root, SceneNode::group("a")).unwrap();
        let b = g.spawn(root, SceneNode::group("b")).unwrap();
        assert!(matches!(g.add_child(b, a), Err(Error::NodeHasParent(id)) if id == a));

        g.detach(a).unwrap();
        g.add_child(b, a).unwrap();
        assert_eq!(g.parent(a), Some(b));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut g = SceneGraph::new();
        let a = g.create_node(SceneNode::group("a"));
        let b = g.spawn(a, SceneNode::group("b")).unwrap();
        let c = g.spawn(b, SceneNode::group("c")).unwrap();
        assert!(matches!(g.add_child(c, a), Err(Error::CycleDetected { .. })));
        assert!(matches!(g.add_child(a, a), Err(Error::CycleDetected { .. })));
        assert!(matches!(g.add_child(g.root(), g.root()), Err(Error::CycleDetected { .. })));

        assert!(g.is_descendant_of(c, a));
        assert!(g.is_descendant_of(a, a));
        assert!(!g.is_descendant_of(a, c));
        assert!(!g.is_descendant_of(a, g.root()));
    }

    #[test]
    fn test_destroy_subtree() {
        let mut g = SceneGraph::new();
        let a = g.spawn(g.root(), SceneNode::group("a")).unwrap();
        let b = g.spawn(a, SceneNode::group("b")).unwrap();
        g.spawn(b, SceneNode::group("c")).unwrap();
        assert_eq!(g.len(), 4);

        assert_eq!(g.destroy(a).unwrap(), 3);
        assert_eq!(g.len(), 1);
        assert!(!g.contains(b));
        assert!(g.children(g.root()).is_empty());
        assert!(matches!(g.detach(a), Err(Error::NodeNotFound(_))));
        assert!(g.destroy(g.root()).is_err());
    }

    #[test]
    fn test_world_matrix() {
        let mut g = SceneGraph::new();
        let a = g.spawn(
            g.root(),
            SceneNode::group("a").with_transform(Transform::from_translation(vec3(0.0, 0.0, 10.0))),
        )
        .unwrap();
        let b = g.spawn(
            a,
            SceneNode::group("b").with_transform(Transform::from_translation(vec3(1.0, 0.0, 0.0))),
        )
        .unwrap();
        let m = g.world_matrix(b).unwrap();
        assert_eq!(m.transform_point3(crate::util::Vec3::ZERO), vec3(1.0, 0.0, 10.0));
    }
}

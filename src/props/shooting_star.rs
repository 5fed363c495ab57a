//! Translucent streaks falling toward the car from far ahead.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;

use crate::geom::{MaterialHandle, Mesh, Vertex};
use crate::scene::{NodeId, Renderable, Rotation, SceneGraph, SceneNode, Transform};
use crate::util::{vec2, vec3, vec4, Result, Vec3};

/// Seconds spent growing in after a reset.
pub const FADE_IN: f32 = 0.3;
/// Seconds spent shrinking out before the lifespan ends.
pub const FADE_OUT: f32 = 0.7;
/// A star this far behind the car is recycled early.
pub const BEHIND_LIMIT: f32 = 50.0;

/// Trail triangle pointing down local +Z: bright head at the origin, two
/// transparent tail corners behind it. Drawn with vertex colors.
pub fn trail_mesh(glow: MaterialHandle) -> Result<Mesh> {
    let up = Vec3::Y;
    let vertices = vec![
        Vertex::new(Vec3::ZERO, vec4(0.8, 0.4, 0.8, 0.7), vec2(0.0, 0.0), up, 0),
        Vertex::new(vec3(-1.2, 0.0, -32.0), vec4(0.2, 0.6, 0.8, 0.0), vec2(1.0, 0.0), up, 0),
        Vertex::new(vec3(1.2, 0.0, -32.0), vec4(0.6, 0.2, 0.8, 0.0), vec2(1.0, 1.0), up, 0),
    ];
    Mesh::from_parts(vertices, vec![0, 1, 2], [glow], true)
}

/// One shooting star and its scene node.
#[derive(Clone, Debug)]
pub struct ShootingStar {
    pub node: NodeId,
    pub position: Vec3,
    pub velocity: Vec3,
    pub age: f32,
    pub lifespan: f32,
}

impl ShootingStar {
    /// Spawn a star node under `parent` drawing `mesh` with `glow`, placed
    /// relative to `car`.
    pub fn spawn(
        graph: &mut SceneGraph,
        parent: NodeId,
        mesh: Arc<Mesh>,
        glow: MaterialHandle,
        rng: &mut StdRng,
        car: Vec3,
    ) -> Result<Self> {
        let node = graph.spawn(
            parent,
            SceneNode::with_payload("shooting star", Renderable::WithMaterial { mesh, material: glow }),
        )?;
        let mut star = Self {
            node,
            position: Vec3::ZERO,
            velocity: Vec3::NEG_Z,
            age: 0.0,
            lifespan: 1.0,
        };
        star.reset(car, rng);
        star.apply(graph);
        Ok(star)
    }

    /// Re-roll position, velocity and lifespan ahead of and above `car`.
    pub fn reset(&mut self, car: Vec3, rng: &mut StdRng) {
        let x = car.x + (rng.gen::<f32>() - 0.5) * 200.0;
        let y = car.y + 120.0 + rng.gen::<f32>() * 40.0;
        let z = car.z + 300.0 + rng.gen::<f32>() * 100.0;
        let speed = 15.0 + rng.gen::<f32>() * 15.0;

        self.position = vec3(x, y, z);
        self.velocity = vec3((car.x - x) * 0.015, -speed * 0.4, -speed);
        self.age = 0.0;
        self.lifespan = 2.5 + rng.gen::<f32>() * 2.5;
    }

    /// Uniform scale for the current age: grow in, hold, shrink out.
    pub fn fade(&self) -> f32 {
        let scale = if self.age < FADE_IN {
            self.age / FADE_IN
        } else if self.age > self.lifespan - FADE_OUT {
            (self.lifespan - self.age) / FADE_OUT
        } else {
            1.0
        };
        scale.clamp(0.0, 1.0)
    }

    /// Advance by `dt` seconds, recycling the star when it burns out or
    /// falls behind `car`, and write the node transform.
    pub fn update(&mut self, graph: &mut SceneGraph, dt: f32, car: Vec3, rng: &mut StdRng) {
        self.age += dt;
        self.position += self.velocity * dt;
        if self.age > self.lifespan || self.position.z < car.z - BEHIND_LIMIT {
            self.reset(car, rng);
        }
        self.apply(graph);
    }

    fn apply(&self, graph: &mut SceneGraph) {
        if let Some(node) = graph.node_mut(self.node) {
            node.transform = Transform::from_translation(self.position)
                .with_rotation(Rotation::facing(self.velocity))
                .with_scale(Vec3::splat(self.fade()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lit_surface::{BlendMode, LitMaterial};
    use rand::SeedableRng;

    fn glow() -> MaterialHandle {
        Arc::new(LitMaterial::new("glow", "tex/glow.png", 1.0, 0.5, 0.0, 1.0).with_blend(BlendMode::Translucent))
    }

    #[test]
    fn test_trail_mesh() {
        let mesh = trail_mesh(glow()).unwrap();
        assert_eq!(mesh.triangle_count(), 1);
        assert!(mesh.use_vertex_color());
        assert!(mesh.is_translucent());
        assert_eq!(mesh.vertices()[1].color[3], 0.0);
    }

    #[test]
    fn test_spawn_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut g = SceneGraph::new();
        let root = g.root();
        let mesh = Arc::new(trail_mesh(glow()).unwrap());
        let car = vec3(0.0, 0.0, 100.0);
        for _ in 0..20 {
            let s = ShootingStar::spawn(&mut g, root, mesh.clone(), glow(), &mut rng, car).unwrap();
            assert!((-100.0..=100.0).contains(&s.position.x));
            assert!((120.0..=160.0).contains(&s.position.y));
            assert!((400.0..=500.0).contains(&s.position.z));
            assert!((2.5..=5.0).contains(&s.lifespan));
            assert!(s.velocity.z <= -15.0 && s.velocity.y < 0.0);
            // Freshly reset stars start invisible.
            assert_eq!(g.node(s.node).unwrap().transform.scale, Vec3::ZERO);
        }
    }

    #[test]
    fn test_fade_envelope() {
        let mut s = ShootingStar {
            node: NodeId::default(),
            position: Vec3::ZERO,
            velocity: Vec3::NEG_Z,
            age: 0.15,
            lifespan: 4.0,
        };
        assert!((s.fade() - 0.5).abs() < 1e-6);
        s.age = 2.0;
        assert_eq!(s.fade(), 1.0);
        s.age = 3.65;
        assert!((s.fade() - 0.5).abs() < 1e-5);
        s.age = 4.5;
        assert_eq!(s.fade(), 0.0);
    }

    #[test]
    fn test_update_orients_and_recycles() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut g = SceneGraph::new();
        let root = g.root();
        let mesh = Arc::new(trail_mesh(glow()).unwrap());
        let car = Vec3::ZERO;
        let mut s = ShootingStar::spawn(&mut g, root, mesh, glow(), &mut rng, car).unwrap();

        s.update(&mut g, 0.5, car, &mut rng);
        let m = g.world_matrix(s.node).unwrap();
        let heading = m.transform_vector3(Vec3::Z).normalize();
        assert!((heading - s.velocity.normalize()).length() < 1e-4);

        // Past its lifespan the star is re-rolled.
        s.update(&mut g, 10.0, car, &mut rng);
        assert_eq!(s.age, 0.0);
        assert!(s.position.z >= 300.0);
    }
}

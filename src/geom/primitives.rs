//! Box, platform and sphere constructors.

use std::f32::consts::TAU;

use super::mesh::{MaterialHandle, Mesh};
use super::vertex::Vertex;
use crate::util::{vec2, vec3, vec4, Error, Result, Vec3, Vec4};

/// Minimum sphere subdivisions (rings and segments).
pub const MIN_SPHERE_SUBDIVS: u32 = 3;

impl Mesh {
    /// Axis-aligned box centred on the origin.
    ///
    /// Four vertices per face with outward normals, counter-clockwise
    /// front faces. 24 vertices, 36 indices.
    pub fn cuboid(
        width: f32,
        height: f32,
        depth: f32,
        materials: impl IntoIterator<Item = MaterialHandle>,
    ) -> Result<Self> {
        for (name, v) in [("width", width), ("height", height), ("depth", depth)] {
            if !v.is_finite() || v <= 0.0 {
                return Err(Error::DegenerateGeometry(format!("box {name} must be positive, got {v}")));
            }
        }
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);

        // Per face: normal, then corners as (position, corner tint, uv).
        let magenta = vec4(1.0, 0.0, 1.0, 1.0);
        let cyan = vec4(0.0, 1.0, 1.0, 1.0);
        let lavender = vec4(0.5, 0.5, 1.0, 1.0);
        let cream = vec4(1.0, 1.0, 0.5, 1.0);
        let red = vec4(1.0, 0.0, 0.0, 1.0);
        let green = vec4(0.0, 1.0, 0.0, 1.0);
        let blue = vec4(0.0, 0.0, 1.0, 1.0);
        let yellow = vec4(1.0, 1.0, 0.0, 1.0);

        let faces: [(Vec3, [(Vec3, Vec4, [f32; 2]); 4]); 6] = [
            // -Z
            (Vec3::NEG_Z, [
                (vec3(hw, -hh, -hd), magenta, [1.0, 1.0]),
                (vec3(-hw, -hh, -hd), cyan, [0.0, 1.0]),
                (vec3(-hw, hh, -hd), lavender, [0.0, 0.0]),
                (vec3(hw, hh, -hd), cream, [1.0, 0.0]),
            ]),
            // +X
            (Vec3::X, [
                (vec3(hw, -hh, hd), magenta, [1.0, 1.0]),
                (vec3(hw, -hh, -hd), cyan, [0.0, 1.0]),
                (vec3(hw, hh, -hd), lavender, [0.0, 0.0]),
                (vec3(hw, hh, hd), cream, [1.0, 0.0]),
            ]),
            // +Z
            (Vec3::Z, [
                (vec3(-hw, -hh, hd), magenta, [1.0, 1.0]),
                (vec3(hw, -hh, hd), cream, [0.0, 1.0]),
                (vec3(hw, hh, hd), lavender, [0.0, 0.0]),
                (vec3(-hw, hh, hd), cyan, [1.0, 0.0]),
            ]),
            // -X
            (Vec3::NEG_X, [
                (vec3(-hw, -hh, hd), magenta, [0.0, 1.0]),
                (vec3(-hw, -hh, -hd), cyan, [1.0, 1.0]),
                (vec3(-hw, hh, -hd), lavender, [1.0, 0.0]),
                (vec3(-hw, hh, hd), cream, [0.0, 0.0]),
            ]),
            // +Y
            (Vec3::Y, [
                (vec3(-hw, hh, -hd), red, [0.0, 1.0]),
                (vec3(hw, hh, -hd), green, [1.0, 1.0]),
                (vec3(hw, hh, hd), blue, [1.0, 0.0]),
                (vec3(-hw, hh, hd), yellow, [0.0, 0.0]),
            ]),
            // -Y
            (Vec3::NEG_Y, [
                (vec3(-hw, -hh, -hd), red, [0.0, 1.0]),
                (vec3(hw, -hh, -hd), green, [1.0, 1.0]),
                (vec3(hw, -hh, hd), blue, [1.0, 0.0]),
                (vec3(-hw, -hh, hd), yellow, [0.0, 0.0]),
            ]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = vertices.len() as u32;
            for (position, color, uv) in corners {
                vertices.push(Vertex::new(position, color, uv.into(), normal, 0));
            }
            // Pick the diagonal so both triangles wind counter-clockwise
            // seen from outside.
            let (a, b, c) = (corners[0].0, corners[1].0, corners[2].0);
            if (b - a).cross(c - a).dot(normal) > 0.0 {
                indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
            } else {
                indices.extend([base + 2, base + 1, base, base, base + 3, base + 2]);
            }
        }

        Mesh::from_parts(vertices, indices, materials, false)
    }

    /// Flat rectangle in the XZ plane facing +Y.
    ///
    /// UVs run from `uv_min` to `uv_max` across the quad, so values past 1
    /// tile the texture. 4 vertices, 6 indices.
    pub fn platform(
        width: f32,
        depth: f32,
        uv_min: f32,
        uv_max: f32,
        materials: impl IntoIterator<Item = MaterialHandle>,
    ) -> Result<Self> {
        if !(width.is_finite() && depth.is_finite()) || width <= 0.0 || depth <= 0.0 {
            return Err(Error::DegenerateGeometry(format!(
                "platform extents must be positive, got {width}x{depth}"
            )));
        }
        let (hw, hd) = (width / 2.0, depth / 2.0);
        let white = Vec4::ONE;
        let vertices = vec![
            Vertex::new(vec3(-hw, 0.0, -hd), white, vec2(uv_min, uv_max), Vec3::Y, 0),
            Vertex::new(vec3(hw, 0.0, -hd), white, vec2(uv_max, uv_max), Vec3::Y, 0),
            Vertex::new(vec3(hw, 0.0, hd), white, vec2(uv_max, uv_min), Vec3::Y, 0),
            Vertex::new(vec3(-hw, 0.0, hd), white, vec2(uv_min, uv_min), Vec3::Y, 0),
        ];
        // Counter-clockwise seen from +Y.
        let indices = vec![0, 2, 1, 2, 0, 3];
        Mesh::from_parts(vertices, indices, materials, false)
    }

    /// UV sphere of `radius` with `subdivs` rings and segments.
    ///
    /// Rings run pole to pole and the longitude seam is duplicated, giving
    /// `(subdivs + 1)^2` vertices and `6 * subdivs^2` indices.
    pub fn uv_sphere(
        radius: f32,
        subdivs: u32,
        materials: impl IntoIterator<Item = MaterialHandle>,
    ) -> Result<Self> {
        if subdivs < MIN_SPHERE_SUBDIVS {
            return Err(Error::DegenerateGeometry(format!(
                "sphere needs at least {MIN_SPHERE_SUBDIVS} subdivisions, got {subdivs}"
            )));
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::DegenerateGeometry(format!("sphere radius must be positive, got {radius}")));
        }

        let n = subdivs as usize;
        let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
        for layer in 0..=subdivs {
            let v = layer as f32 / subdivs as f32;
            let polar = v * TAU / 2.0;
            let (ring, y) = polar.sin_cos();
            for seg in 0..=subdivs {
                let u = seg as f32 / subdivs as f32;
                let (sin, cos) = (u * TAU).sin_cos();
                let normal = vec3(cos * ring, y, sin * ring).normalize_or_zero();
                vertices.push(Vertex::new(normal * radius, Vec4::ONE, vec2(u, v), normal, 0));
            }
        }

        let row = subdivs + 1;
        let mut indices = Vec::with_capacity(6 * n * n);
        for layer in 1..=subdivs {
            for seg in 0..subdivs {
                let i0 = (layer - 1) * row + seg;
                let i1 = (layer - 1) * row + seg + 1;
                let i2 = layer * row + seg;
                let i3 = layer * row + seg + 1;
                indices.extend([i0, i2, i3, i3, i1, i0]);
            }
        }

        Mesh::from_parts(vertices, indices, materials, false)
    }
}

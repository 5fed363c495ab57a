//! Heightmap triangulation.

use super::mesh::{MaterialHandle, Mesh};
use super::vertex::Vertex;
use crate::terrain::Heightmap;
use crate::util::{triangle_normal, vec2, vec3, Error, Result, Vec3, Vec4};

/// Darkest vertex brightness, used at elevation 0.
pub const MIN_BRIGHTNESS: f32 = 0.2;

/// How grid cells map to object space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    /// Distance between neighbouring samples along X and Z
    pub cell_size: f32,
    /// Elevation span mapped onto the brightness ramp
    pub brightness_range: f32,
}

impl GridLayout {
    pub fn new(cell_size: f32, brightness_range: f32) -> Self {
        Self { cell_size, brightness_range }
    }

    /// Grey level for an elevation: `0.2 + h / range * 0.8`, clamped to [0.2, 1].
    #[inline]
    pub fn brightness(&self, height: f32) -> f32 {
        (MIN_BRIGHTNESS + height / self.brightness_range * (1.0 - MIN_BRIGHTNESS))
            .clamp(MIN_BRIGHTNESS, 1.0)
    }
}

impl Default for GridLayout {
    fn default() -> Self {
        Self::new(1.0, 20.0)
    }
}

impl Mesh {
    /// Triangulate a heightmap with flat-shaded, unshared vertices.
    ///
    /// Row `r` sits at `z = r * cell_size`; columns are centred on X = 0.
    /// Each cell (tl, tr, bl, br) becomes triangles (tl, tr, bl) and
    /// (br, bl, tr), six vertices in total, carrying the cell corner's
    /// material index. Vertex colors are enabled.
    pub fn from_heightmap(
        heightmap: &Heightmap,
        layout: GridLayout,
        materials: impl IntoIterator<Item = MaterialHandle>,
    ) -> Result<Self> {
        if !layout.cell_size.is_finite() || layout.cell_size <= 0.0 {
            return Err(Error::DegenerateGeometry(format!(
                "grid cell size must be positive, got {}",
                layout.cell_size
            )));
        }
        if !layout.brightness_range.is_finite() || layout.brightness_range <= 0.0 {
            return Err(Error::DegenerateGeometry(format!(
                "brightness range must be positive, got {}",
                layout.brightness_range
            )));
        }

        let (rows, cols) = (heightmap.rows(), heightmap.cols());
        let quads = (rows - 1) * (cols - 1);
        let x_offset = (cols - 1) as f32 / 2.0;

        let corner = |row: usize, col: usize| -> (Vec3, u32) {
            let p = vec3(
                (col as f32 - x_offset) * layout.cell_size,
                heightmap.elevation(row, col),
                row as f32 * layout.cell_size,
            );
            (p, heightmap.material(row, col))
        };
        let vertex = |(p, m): (Vec3, u32), u: f32, v: f32, n: Vec3| {
            let b = layout.brightness(p.y);
            Vertex::new(p, Vec4::new(b, b, b, 1.0), vec2(u, v), n, m)
        };

        let mut vertices = Vec::with_capacity(quads * 6);
        for row in 1..rows {
            for col in 1..cols {
                let tl = corner(row - 1, col - 1);
                let tr = corner(row - 1, col);
                let bl = corner(row, col - 1);
                let br = corner(row, col);

                let n1 = triangle_normal(tl.0, tr.0, bl.0);
                let n2 = triangle_normal(br.0, bl.0, tr.0);

                vertices.extend([
                    vertex(tl, 0.0, 1.0, n1),
                    vertex(tr, 1.0, 1.0, n1),
                    vertex(bl, 0.0, 0.0, n1),
                    vertex(br, 1.0, 0.0, n2),
                    vertex(bl, 0.0, 0.0, n2),
                    vertex(tr, 1.0, 1.0, n2),
                ]);
            }
        }

        let indices = (0..vertices.len() as u32).collect();
        Mesh::from_parts(vertices, indices, materials, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TileKey;
    use lit_surface::LitMaterial;
    use std::sync::Arc;

    fn materials(n: usize) -> Vec<MaterialHandle> {
        (0..n).map(|_| Arc::new(LitMaterial::default())).collect()
    }

    #[test]
    fn test_flat_grid_normals_up() {
        let map = Heightmap::from_parts(TileKey(0), 3, 4, vec![0.0; 12], vec![0; 12]).unwrap();
        let mesh = Mesh::from_heightmap(&map, GridLayout::default(), materials(1)).unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 3 * 6);
        assert_eq!(mesh.index_count(), mesh.vertex_count());
        assert!(mesh.use_vertex_color());
        for v in mesh.vertices() {
            assert_eq!(v.normal(), Vec3::Y);
            assert_eq!(v.color, [0.2, 0.2, 0.2, 1.0]);
        }
        assert_eq!(mesh.bounds().min, vec3(-1.5, 0.0, 0.0));
        assert_eq!(mesh.bounds().max, vec3(1.5, 0.0, 2.0));
    }

    #[test]
    fn test_uvs_and_materials() {
        let map = Heightmap::from_parts(TileKey(0), 2, 2, vec![0.0, 10.0, 20.0, 40.0], vec![0, 1, 2, 2])
            .unwrap();
        let mesh = Mesh::from_heightmap(&map, GridLayout::new(2.0, 20.0), materials(3)).unwrap();
        let v = mesh.vertices();
        let uvs: Vec<[f32; 2]> = v.iter().map(|v| v.uv).collect();
        assert_eq!(uvs, vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0], [0.0, 0.0], [1.0, 1.0]]);
        let mats: Vec<u32> = v.iter().filter_map(|v| v.material_slot()).collect();
        assert_eq!(mats, vec![0, 1, 2, 2, 2, 1]);
        // tr at h=10 over a range of 20, br clamped at 1.0
        assert!((v[1].color[0] - 0.6).abs() < 1e-6);
        assert_eq!(v[3].color[0], 1.0);
    }

    #[test]
    fn test_missing_material_slot_fails() {
        let map = Heightmap::from_parts(TileKey(0), 2, 2, vec![0.0; 4], vec![0, 0, 0, 2]).unwrap();
        let err = Mesh::from_heightmap(&map, GridLayout::default(), materials(2)).unwrap_err();
        assert!(matches!(err, Error::MaterialIndexOutOfRange { index: 2, count: 2 }));
    }
}

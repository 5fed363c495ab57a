//! Integration tests for mesh construction.

use std::sync::Arc;

use roadscape::core::TerrainConfig;
use roadscape::geom::{GridLayout, MaterialHandle, Mesh, VERTEX_STRIDE};
use roadscape::prelude::LitMaterial;
use roadscape::terrain::{HeightmapGenerator, TileKey};
use roadscape::Error;

fn mats(n: usize) -> Vec<MaterialHandle> {
    (0..n)
        .map(|i| Arc::new(LitMaterial::new(format!("m{i}"), "", 0.3, 0.8, 0.4, 16.0)))
        .collect()
}

#[test]
fn test_primitive_counts() {
    let cube = Mesh::cuboid(1.0, 2.0, 3.0, mats(1)).unwrap();
    assert_eq!((cube.vertex_count(), cube.index_count()), (24, 36));

    let platform = Mesh::platform(5.0, 5.0, 0.0, 4.0, mats(1)).unwrap();
    assert_eq!((platform.vertex_count(), platform.index_count()), (4, 6));

    let sphere = Mesh::uv_sphere(0.2, 12, mats(1)).unwrap();
    assert_eq!(sphere.vertex_count(), 13 * 13);
    assert_eq!(sphere.index_count(), 6 * 12 * 12);
    assert_eq!(sphere.vertex_bytes().len(), sphere.vertex_count() * VERTEX_STRIDE);
}

#[test]
fn test_heightmap_triangulation_counts() {
    for res in [2u32, 9, 33] {
        let cfg = TerrainConfig { grid_resolution: res, road_width: 2, transition_width: 1, ..Default::default() };
        let generator = HeightmapGenerator::new(&cfg).unwrap();
        let map = generator.build(TileKey(1));
        let layout = GridLayout::new(cfg.cell_spacing(), generator.max_height());
        let mesh = Mesh::from_heightmap(&map, layout, mats(3)).unwrap();
        let quads = (res as usize - 1) * (res as usize - 1);
        assert_eq!(mesh.vertex_count(), quads * 6, "res {res}");
        assert_eq!(mesh.index_count(), quads * 6);
        assert!(mesh.use_vertex_color());

        // Tile spans tile_size along both axes.
        let size = mesh.bounds().size();
        assert!((size.x - cfg.tile_size).abs() < 1e-3);
        assert!((size.z - cfg.tile_size).abs() < 1e-3);
    }
}

#[test]
fn test_heightmap_vertices_carry_materials_and_brightness() {
    let cfg = TerrainConfig { grid_resolution: 17, ..Default::default() };
    let generator = HeightmapGenerator::new(&cfg).unwrap();
    let map = generator.build(TileKey(0));
    let layout = GridLayout::new(cfg.cell_spacing(), generator.max_height());
    let mesh = Mesh::from_heightmap(&map, layout, mats(3)).unwrap();
    for v in mesh.vertices() {
        let slot = v.material_slot().unwrap();
        assert!(slot < 3);
        let b = v.color[0];
        assert!((0.2..=1.0).contains(&b));
        assert_eq!(b, layout.brightness(v.position[1]));
        assert!(v.normal().y > 0.0, "terrain normals point up");
    }
}

#[test]
fn test_sphere_rejects_few_subdivisions() {
    for subdivs in [0, 1, 2] {
        assert!(matches!(Mesh::uv_sphere(1.0, subdivs, mats(1)), Err(Error::DegenerateGeometry(_))));
    }
    assert!(Mesh::uv_sphere(1.0, 3, mats(1)).is_ok());
}

#[test]
fn test_material_count_limits() {
    assert!(matches!(
        Mesh::cuboid(1.0, 1.0, 1.0, mats(0)),
        Err(Error::MaterialCount { count: 0, .. })
    ));
    assert!(matches!(
        Mesh::cuboid(1.0, 1.0, 1.0, mats(4)),
        Err(Error::MaterialCount { count: 4, .. })
    ));
}

#[test]
fn test_obj_quad_with_materials() {
    let text = "\
# two-material quad pair
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl m0
f 1/1/1 2/2/1 3/3/1 4/4/1
usemtl m1
f -4/1/1 -3/2/1 -2/3/1
";
    let mesh = Mesh::from_obj(text, mats(2)).unwrap();
    assert_eq!(mesh.triangle_count(), 3);
    // Four shared corners in slot 0, three more in slot 1.
    assert_eq!(mesh.vertex_count(), 7);
    let slots: Vec<u32> = mesh.vertices().iter().filter_map(|v| v.material_slot()).collect();
    assert_eq!(slots.iter().filter(|&&s| s == 1).count(), 3);
}

#[test]
fn test_obj_errors_name_the_line() {
    let err = Mesh::from_obj("v 0 0 0\nv 1 0 0\nf 1 2 9\n", mats(1)).unwrap_err();
    assert!(matches!(err, Error::MalformedModel { line: 3, .. }), "{err}");

    let err = Mesh::from_obj("v 0 0\n", mats(1)).unwrap_err();
    assert!(matches!(err, Error::MalformedModel { line: 1, .. }), "{err}");

    assert!(Mesh::from_obj("# nothing\n", mats(1)).is_err());
}

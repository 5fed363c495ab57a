//! Wavefront OBJ text to [`Mesh`].
//!
//! Supports the subset props need: `v`, `vt`, `vn`, `f` (any polygon,
//! fan-triangulated; `v`, `v/vt`, `v//vn`, `v/vt/vn`; negative indices) and
//! `usemtl`, which selects the material slot whose name matches. Other
//! statements (`o`, `g`, `s`, `mtllib`, ...) are ignored.

use indexmap::IndexMap;

use super::mesh::{MaterialHandle, MaterialList, Mesh};
use super::vertex::Vertex;
use crate::util::{triangle_normal, Error, Result, Vec2, Vec3, Vec4};

/// One face corner: position, texcoord and normal indices (0-based) plus slot.
type CornerKey = (usize, Option<usize>, Option<usize>, u32);

#[derive(Default)]
struct ObjData {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

impl Mesh {
    /// Parse OBJ text. Corners sharing position, texcoord, normal and slot
    /// become one vertex. Corners without a normal get their face's flat
    /// normal and are not shared.
    pub fn from_obj(text: &str, materials: impl IntoIterator<Item = MaterialHandle>) -> Result<Self> {
        let materials: MaterialList = materials.into_iter().collect();
        let mut data = ObjData::default();
        let mut vertices = Vec::new();
        let mut shared: IndexMap<CornerKey, u32> = IndexMap::new();
        let mut indices = Vec::new();
        let mut slot = 0u32;

        for (i, raw) in text.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.split('#').next().unwrap_or("").trim();
            let mut parts = line.split_whitespace();
            let Some(tag) = parts.next() else { continue };

            match tag {
                "v" => data.positions.push(Vec3::from_array(parse_floats(parts, line_no)?)),
                "vt" => {
                    // Optional third (w) component is ignored.
                    let [u, v] = parse_floats(parts.take(2), line_no)?;
                    data.texcoords.push(Vec2::new(u, v));
                }
                "vn" => data.normals.push(Vec3::from_array(parse_floats(parts, line_no)?).normalize_or_zero()),
                "usemtl" => {
                    let name = parts.next().unwrap_or("");
                    slot = match materials.iter().position(|m| m.name == name) {
                        Some(s) => s as u32,
                        None => {
                            tracing::warn!(line = line_no, material = name, "unknown material, using slot 0");
                            0
                        }
                    };
                }
                "f" => {
                    let face = parts
                        .map(|tok| parse_corner(tok, &data, line_no))
                        .collect::<Result<Vec<_>>>()?;
                    if face.len() < 3 {
                        return Err(Error::model(line_no, format!("face has {} corners", face.len())));
                    }
                    for k in 1..face.len() - 1 {
                        let tri = [face[0], face[k], face[k + 1]];
                        let flat = triangle_normal(
                            data.positions[tri[0].0],
                            data.positions[tri[2].0],
                            data.positions[tri[1].0],
                        );
                        for (v, vt, vn) in tri {
                            let make = || {
                                let normal = vn.map_or(flat, |n| data.normals[n]);
                                let uv = vt.map_or(Vec2::ZERO, |t| data.texcoords[t]);
                                Vertex::new(data.positions[v], Vec4::ONE, uv, normal, slot)
                            };
                            let index = match vn {
                                // Flat-shaded corners are never shared across faces.
                                None => {
                                    vertices.push(make());
                                    vertices.len() as u32 - 1
                                }
                                Some(_) => *shared.entry((v, vt, vn, slot)).or_insert_with(|| {
                                    vertices.push(make());
                                    vertices.len() as u32 - 1
                                }),
                            };
                            indices.push(index);
                        }
                    }
                }
                _ => {}
            }
        }

        if indices.is_empty() {
            return Err(Error::model(text.lines().count().max(1), "no faces"));
        }

        Mesh::from_parts(vertices, indices, materials, false)
    }
}

fn parse_floats<'a, const N: usize>(
    parts: impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    let mut n = 0;
    for tok in parts.take(N) {
        out[n] = tok
            .parse::<f32>()
            .map_err(|_| Error::model(line, format!("bad number {tok:?}")))?;
        n += 1;
    }
    if n < N {
        return Err(Error::model(line, format!("expected {N} numbers, got {n}")));
    }
    Ok(out)
}

/// Resolve a 1-based (or negative, relative) OBJ index.
fn resolve(tok: &str, len: usize, what: &str, line: usize) -> Result<usize> {
    let raw: i64 = tok
        .parse()
        .map_err(|_| Error::model(line, format!("bad {what} index {tok:?}")))?;
    let index = match raw {
        0 => None,
        r if r > 0 => Some(r as usize - 1),
        r => len.checked_sub(r.unsigned_abs() as usize),
    };
    index
        .filter(|&i| i < len)
        .ok_or_else(|| Error::model(line, format!("{what} index {raw} out of range ({len} defined)")))
}

fn parse_corner(tok: &str, data: &ObjData, line: usize) -> Result<(usize, Option<usize>, Option<usize>)> {
    let mut fields = tok.split('/');
    let v = resolve(fields.next().unwrap_or(""), data.positions.len(), "position", line)?;
    let vt = match fields.next() {
        Some(t) if !t.is_empty() => Some(resolve(t, data.texcoords.len(), "texcoord", line)?),
        _ => None,
    };
    let vn = match fields.next() {
        Some(n) if !n.is_empty() => Some(resolve(n, data.normals.len(), "normal", line)?),
        _ => None,
    };
    Ok((v, vt, vn))
}

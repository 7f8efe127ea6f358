//! ASCII PLY mesh reader.
//!
//! Handles the subset exported by common modelling tools: `format ascii 1.0`,
//! a `vertex` element with float properties (positions required; normals and
//! texture coordinates picked up by name) and a `face` element holding a
//! vertex-index list. Polygons are fan-triangulated. Other elements are
//! skipped. Malformed input is an error, never a partially filled mesh.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use glam::{Vec2, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Triangle mesh loaded from a PLY file.
#[derive(Debug, Clone, Default)]
pub struct PlyMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

#[derive(Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<String>,
}

/// Column indices of the vertex properties we understand.
struct VertexColumns {
    position: [usize; 3],
    normal: Option<[usize; 3]>,
    uv: Option<[usize; 2]>,
}

impl VertexColumns {
    fn resolve(properties: &[String]) -> Result<Self> {
        let find = |names: &[&str]| properties.iter().position(|p| names.contains(&p.as_str()));
        let position = match (find(&["x"]), find(&["y"]), find(&["z"])) {
            (Some(x), Some(y), Some(z)) => [x, y, z],
            _ => bail!("vertex element lacks x/y/z properties"),
        };
        let normal = match (find(&["nx"]), find(&["ny"]), find(&["nz"])) {
            (Some(x), Some(y), Some(z)) => Some([x, y, z]),
            _ => None,
        };
        let uv = match (find(&["s", "u", "texture_u"]), find(&["t", "v", "texture_v"])) {
            (Some(u), Some(v)) => Some([u, v]),
            _ => None,
        };
        Ok(Self { position, normal, uv })
    }
}

impl PlyMesh {
    /// Read and parse a PLY file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading PLY file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing PLY file {}", path.display()))
    }

    /// Parse PLY text.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

        match lines.next() {
            Some((_, "ply")) => {}
            _ => bail!("missing 'ply' magic on line 1"),
        }

        let mut elements: Vec<Element> = Vec::new();
        let mut saw_format = false;
        loop {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| anyhow!("header ended without 'end_header'"))?;
            let mut words = line.split_whitespace();
            match words.next() {
                Some("format") => {
                    if words.next() != Some("ascii") {
                        bail!("line {}: only ASCII PLY is supported", line_no);
                    }
                    saw_format = true;
                }
                Some("element") => {
                    let name = words
                        .next()
                        .ok_or_else(|| anyhow!("line {}: element without a name", line_no))?;
                    let count = words
                        .next()
                        .ok_or_else(|| anyhow!("line {}: element '{}' without a count", line_no, name))?
                        .parse::<usize>()
                        .with_context(|| format!("line {}: bad element count", line_no))?;
                    elements.push(Element { name: name.to_string(), count, properties: Vec::new() });
                }
                Some("property") => {
                    let element = elements
                        .last_mut()
                        .ok_or_else(|| anyhow!("line {}: property before any element", line_no))?;
                    let name = line
                        .split_whitespace()
                        .last()
                        .ok_or_else(|| anyhow!("line {}: property without a name", line_no))?;
                    element.properties.push(name.to_string());
                }
                Some("end_header") => break,
                Some("comment") | Some("obj_info") | None => {}
                Some(other) => bail!("line {}: unexpected header keyword '{}'", line_no, other),
            }
        }
        if !saw_format {
            bail!("header has no 'format' line");
        }

        let mut mesh = PlyMesh::default();
        for element in &elements {
            match element.name.as_str() {
                "vertex" => {
                    let columns = VertexColumns::resolve(&element.properties)?;
                    for _ in 0..element.count {
                        let (line_no, line) = lines
                            .next()
                            .ok_or_else(|| anyhow!("vertex section truncated"))?;
                        let values = parse_floats(line)
                            .with_context(|| format!("line {}: bad vertex", line_no))?;
                        mesh.push_vertex(&values, &columns)
                            .with_context(|| format!("line {}: bad vertex", line_no))?;
                    }
                }
                "face" => {
                    for _ in 0..element.count {
                        let (line_no, line) = lines
                            .next()
                            .ok_or_else(|| anyhow!("face section truncated"))?;
                        mesh.push_face(line)
                            .with_context(|| format!("line {}: bad face", line_no))?;
                    }
                }
                _ => {
                    for _ in 0..element.count {
                        lines
                            .next()
                            .ok_or_else(|| anyhow!("'{}' section truncated", element.name))?;
                    }
                }
            }
        }

        if mesh.positions.is_empty() {
            bail!("mesh has no vertices");
        }
        let vertex_count = mesh.positions.len() as u32;
        if let Some(bad) = mesh.indices.iter().find(|&&i| i >= vertex_count) {
            bail!("face index {} out of range ({} vertices)", bad, vertex_count);
        }
        Ok(mesh)
    }

    fn push_vertex(&mut self, values: &[f32], columns: &VertexColumns) -> Result<()> {
        let get = |i: usize| {
            values
                .get(i)
                .copied()
                .ok_or_else(|| anyhow!("expected at least {} values, found {}", i + 1, values.len()))
        };
        let [x, y, z] = columns.position;
        self.positions.push(Vec3::new(get(x)?, get(y)?, get(z)?));
        if let Some([x, y, z]) = columns.normal {
            self.normals.push(Vec3::new(get(x)?, get(y)?, get(z)?));
        }
        if let Some([u, v]) = columns.uv {
            self.uvs.push(Vec2::new(get(u)?, get(v)?));
        }
        Ok(())
    }

    fn push_face(&mut self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        let count: usize = words
            .next()
            .ok_or_else(|| anyhow!("empty face line"))?
            .parse()
            .context("bad vertex count")?;
        let polygon = words
            .map(|w| w.parse::<u32>().with_context(|| format!("bad index '{}'", w)))
            .collect::<Result<Vec<_>>>()?;
        if polygon.len() != count || count < 3 {
            bail!("face declares {} indices but lists {}", count, polygon.len());
        }
        for k in 1..count - 1 {
            self.indices.extend_from_slice(&[polygon[0], polygon[k], polygon[k + 1]]);
        }
        Ok(())
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn has_uv(&self) -> bool {
        !self.uvs.is_empty()
    }

    /// Bounding box of all vertex positions. A parsed mesh always has one.
    pub fn bounds(&self) -> Aabb {
        let first = self.positions.first().copied().unwrap_or(Vec3::ZERO);
        self.positions.iter().fold(Aabb { min: first, max: first }, |acc, &p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }
}

fn parse_floats(line: &str) -> Result<Vec<f32>> {
    line.split_whitespace()
        .map(|w| w.parse::<f32>().with_context(|| format!("'{}' is not a number", w)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: &str = "ply
format ascii 1.0
comment exported quad
element vertex 4
property float x
property float y
property float z
property float nx
property float ny
property float nz
property float u
property float v
element face 1
property list uchar int vertex_indices
end_header
-1 -2 0 0 0 1 0 0
3 -2 0 0 0 1 1 0
3 4 0.5 0 0 1 1 1
-1 4 0 0 0 1 0 1
4 0 1 2 3
";

    #[test]
    fn parses_quad_and_triangulates() {
        let mesh = PlyMesh::parse(QUAD).unwrap();
        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(mesh.indices(), &[0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.normals().len(), 4);
        assert!(mesh.has_uv());
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = PlyMesh::parse(QUAD).unwrap();
        let b = mesh.bounds();
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, Vec3::new(3.0, 4.0, 0.5));
        assert_eq!(b.extents(), Vec3::new(4.0, 6.0, 0.5));
        assert_eq!(b.center(), Vec3::new(1.0, 1.0, 0.25));
    }

    #[test]
    fn positions_only_mesh() {
        let text = "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nelement face 1\nproperty list uchar int vertex_indices\nend_header\n0 0 0\n1 0 0\n0 1 0\n3 0 1 2\n";
        let mesh = PlyMesh::parse(text).unwrap();
        assert!(!mesh.has_uv());
        assert!(mesh.normals().is_empty());
        assert_eq!(mesh.num_triangles(), 1);
    }

    #[test]
    fn rejects_missing_magic() {
        let err = PlyMesh::parse("obj\n").unwrap_err();
        assert!(err.to_string().contains("magic"));
    }

    #[test]
    fn rejects_binary_format() {
        let err = PlyMesh::parse("ply\nformat binary_little_endian 1.0\nend_header\n").unwrap_err();
        assert!(err.to_string().contains("ASCII"));
    }

    #[test]
    fn rejects_truncated_vertices() {
        let text = QUAD.lines().take(16).collect::<Vec<_>>().join("\n");
        let err = PlyMesh::parse(&text).unwrap_err();
        assert!(format!("{:#}", err).contains("truncated"));
    }

    #[test]
    fn oversized_vertex_count_is_an_error() {
        let text = "ply\nformat ascii 1.0\nelement vertex 18446744073709551615\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n";
        let err = PlyMesh::parse(text).unwrap_err();
        assert!(format!("{:#}", err).contains("vertex section truncated"));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let text = QUAD.replace("4 0 1 2 3", "4 0 1 2 9");
        let err = PlyMesh::parse(&text).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_garbage_number_with_line() {
        let text = QUAD.replace("3 -2 0 0 0 1 1 0", "3 -2 zero 0 0 1 1 0");
        let err = PlyMesh::parse(&text).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("line 17"), "{}", msg);
    }
}

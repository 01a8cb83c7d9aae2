//! STL loading for URDF `<mesh>` collision geometry.
//!
//! Both binary and ASCII STL are accepted. A file is treated as binary
//! when its length matches the face count in the 84-byte preamble, even
//! if the header happens to start with `solid`.

use std::path::{Path, PathBuf};

use crate::error::{PhysicsError, Result};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// Flat triangle soup: `vertices` holds xyz triples, `indices` holds
/// vertex index triples.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions, three floats per vertex.
    pub vertices: Vec<f32>,
    /// Triangle vertex indices, three per triangle.
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Multiply every vertex component-wise by `scale`.
    pub fn scale(&mut self, scale: [f32; 3]) {
        for v in self.vertices.chunks_exact_mut(3) {
            v[0] *= scale[0];
            v[1] *= scale[1];
            v[2] *= scale[2];
        }
    }

    fn push_triangle(&mut self, tri: [[f32; 3]; 3]) {
        let base = self.num_vertices() as u32;
        for v in tri {
            self.vertices.extend_from_slice(&v);
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Load an STL file from disk.
pub fn load_stl(path: &Path) -> Result<TriangleMesh> {
    let bytes = std::fs::read(path).map_err(|source| PhysicsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stl(&bytes).map_err(|reason| PhysicsError::Mesh {
        path: path.to_path_buf(),
        reason,
    })
}

/// Parse STL bytes, detecting binary vs ASCII.
pub fn parse_stl(bytes: &[u8]) -> std::result::Result<TriangleMesh, String> {
    if is_binary(bytes) {
        parse_binary(bytes)
    } else if bytes.trim_ascii_start().starts_with(b"solid") {
        let text = std::str::from_utf8(bytes).map_err(|e| e.to_string())?;
        parse_ascii(text)
    } else {
        Err(format!("not an STL file ({} bytes)", bytes.len()))
    }
}

fn is_binary(bytes: &[u8]) -> bool {
    if bytes.len() < HEADER_SIZE + 4 {
        return false;
    }
    let count = face_count(bytes) as usize;
    bytes.len() == HEADER_SIZE + 4 + count * TRIANGLE_SIZE
}

fn face_count(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ])
}

fn parse_binary(bytes: &[u8]) -> std::result::Result<TriangleMesh, String> {
    let count = face_count(bytes) as usize;
    let mut mesh = TriangleMesh {
        vertices: Vec::with_capacity(count * 9),
        indices: Vec::with_capacity(count * 3),
    };

    for tri in bytes[HEADER_SIZE + 4..].chunks_exact(TRIANGLE_SIZE) {
        // Skip the 12-byte normal
        mesh.push_triangle([
            read_vertex(&tri[12..24]),
            read_vertex(&tri[24..36]),
            read_vertex(&tri[36..48]),
        ]);
    }

    Ok(mesh)
}

fn read_vertex(buf: &[u8]) -> [f32; 3] {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    [x, y, z]
}

fn parse_ascii(text: &str) -> std::result::Result<TriangleMesh, String> {
    let mut mesh = TriangleMesh::default();
    let mut face: Vec<[f32; 3]> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("outer") => face.clear(),
            Some("vertex") => {
                let mut v = [0.0f32; 3];
                for c in &mut v {
                    *c = parts
                        .next()
                        .and_then(|s| s.parse().ok())
                        .ok_or_else(|| format!("bad vertex on line {}", line_no + 1))?;
                }
                face.push(v);
            }
            Some("endfacet") => {
                if face.len() == 3 {
                    mesh.push_triangle([face[0], face[1], face[2]]);
                }
                face.clear();
            }
            Some("endsolid") => break,
            _ => {}
        }
    }

    Ok(mesh)
}

/// Resolve a URDF mesh filename against the directory of the URDF file.
///
/// `package://` and `file://` prefixes are stripped; relative paths are
/// joined onto `base_dir`.
pub fn resolve_mesh_path(filename: &str, base_dir: &Path) -> PathBuf {
    let stripped = filename
        .strip_prefix("package://")
        .or_else(|| filename.strip_prefix("file://"))
        .unwrap_or(filename);
    let path = Path::new(stripped);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

//! # Mesh Module
//!
//! Procedural sphere meshes. A [`Mesh`] is a plain value: a vertex list and a 16-bit index list
//! describing a triangle list. It is produced by [`generate`] under one of two strategies selected
//! with [`SphereStrategy`]:
//!
//! - [`SphereStrategy::Grid`]: a latitude/longitude grid with the poles on the Z axis. Every grid
//!   point is shared by the four cells around it.
//! - [`SphereStrategy::Stacked`]: latitude bands stacked along the Y axis. Every band owns its own
//!   pair of rings, so no vertex is shared between bands.
//!
//! Both strategies are deterministic: the same strategy and segment count always produce the same
//! buffers. Triangles are wound counter-clockwise when seen from outside, which is the front face
//! of the pipeline built in [`crate::pipeline`]. A mesh with the wrong winding is not an error, it
//! is simply culled away and renders blank.
//!
//! Indices are `u16`, so the vertex count of a mesh may not exceed 65536. [`generate`] rejects
//! segment counts beyond [`SphereStrategy::max_segments`].

use std::f64::consts::PI;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::vertex::Vertex;

/// Number of distinct vertices addressable by a `u16` index.
pub const MAX_VERTICES: usize = u16::MAX as usize + 1;

/// How a sphere is triangulated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SphereStrategy {
    /// Latitude/longitude grid, `(N+1)²` vertices and `6N²` indices.
    #[default]
    Grid,
    /// Stacked latitude rings, `2(N+1)²` vertices and `6N(N+1)` indices.
    Stacked,
}

impl SphereStrategy {
    /// Segment count used when none is configured.
    pub fn default_segments(self) -> u32 {
        match self {
            Self::Grid => 64,
            Self::Stacked => 20,
        }
    }

    /// The camera this strategy is framed for.
    pub fn camera(self) -> Camera {
        match self {
            Self::Grid => Camera::globe(),
            Self::Stacked => Camera::stacked(),
        }
    }

    /// Vertex count produced for `segments`.
    pub fn vertex_count(self, segments: u32) -> usize {
        let side = segments as usize + 1;
        match self {
            Self::Grid => side * side,
            Self::Stacked => 2 * side * side,
        }
    }

    /// Index count produced for `segments`.
    pub fn index_count(self, segments: u32) -> usize {
        let n = segments as usize;
        match self {
            Self::Grid => 6 * n * n,
            Self::Stacked => 6 * n * (n + 1),
        }
    }

    /// Largest segment count whose vertices are all addressable with `u16` indices.
    pub fn max_segments(self) -> u32 {
        (1..)
            .take_while(|&segments| self.vertex_count(segments) <= MAX_VERTICES)
            .last()
            .unwrap_or(0)
    }
}

impl std::fmt::Display for SphereStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Grid => f.write_str("grid"),
            Self::Stacked => f.write_str("stacked"),
        }
    }
}

/// A triangulated sphere ready for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

/// Generates a unit sphere with `segments` subdivisions using `strategy`.
///
/// # Errors
///
/// [`Error::InvalidMesh`] when `segments` is zero or larger than
/// [`SphereStrategy::max_segments`].
///
/// # Example
///
/// ```
/// use sphere_capture::{generate, SphereStrategy};
///
/// let mesh = generate(SphereStrategy::Stacked, 20).unwrap();
/// assert_eq!(mesh.vertices.len(), 882);
/// assert_eq!(mesh.indices.len(), 2520);
/// ```
pub fn generate(strategy: SphereStrategy, segments: u32) -> Result<Mesh> {
    if segments == 0 {
        return Err(Error::InvalidMesh(
            "segment count must be at least 1".to_string(),
        ));
    }
    let max = strategy.max_segments();
    if segments > max {
        return Err(Error::InvalidMesh(format!(
            "{segments} segments produce {} vertices, the {strategy} strategy allows at most {max} segments",
            strategy.vertex_count(segments)
        )));
    }

    let mesh = match strategy {
        SphereStrategy::Grid => grid(segments),
        SphereStrategy::Stacked => stacked(segments),
    };
    log::debug!(
        "generated {strategy} sphere: {segments} segments, {} vertices, {} indices",
        mesh.vertices.len(),
        mesh.indices.len()
    );
    Ok(mesh)
}

fn grid(segments: u32) -> Mesh {
    let n = segments as usize;
    let stride = n + 1;
    let mut vertices = Vec::with_capacity(stride * stride);
    let mut indices = Vec::with_capacity(6 * n * n);

    for i in 0..=n {
        let lat = PI * i as f64 / n as f64;

        for j in 0..=n {
            let lng = 2.0 * PI * j as f64 / n as f64;
            let position = [
                lat.sin() * lng.cos(),
                lat.sin() * lng.sin(),
                lat.cos(),
            ];
            // v covers only half of the texture: lat stops at π.
            let tex_coord = [lat / (2.0 * PI), lng / (2.0 * PI)];
            vertices.push(vertex(position, tex_coord));

            if i < n && j < n {
                let i0 = (vertices.len() - 1) as u16;
                let i1 = i0 + 1;
                let i2 = i0 + stride as u16;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i2, i1, i0, i1, i2, i3]);
            }
        }
    }

    Mesh { vertices, indices }
}

fn stacked(segments: u32) -> Mesh {
    let n = segments as usize;
    let stride = n + 1;
    let mut vertices = Vec::with_capacity(2 * stride * stride);
    let mut indices = Vec::with_capacity(6 * n * stride);

    for i in 0..=n {
        let lat0 = PI * (i as f64 - 1.0) / n as f64;
        let lat1 = PI * i as f64 / n as f64;
        let (y0, r0) = lat0.sin_cos();
        let (y1, r1) = lat1.sin_cos();

        for j in 0..=n {
            let lng = 2.0 * PI * j as f64 / n as f64;
            let (sin_lng, cos_lng) = lng.sin_cos();
            let u = j as f64 / n as f64;

            vertices.push(vertex(
                [r0 * cos_lng, y0, r0 * sin_lng],
                [u, i as f64 / n as f64],
            ));
            vertices.push(vertex(
                [r1 * cos_lng, y1, r1 * sin_lng],
                [u, (i + 1) as f64 / n as f64],
            ));
        }

        for j in 0..n {
            let base = i * stride + j;
            let b0 = (2 * base) as u16;
            let t0 = b0 + 1;
            let b1 = b0 + 2;
            let t1 = b0 + 3;
            indices.extend_from_slice(&[b0, t0, b1, t0, t1, b1]);
        }
    }

    Mesh { vertices, indices }
}

fn vertex(position: [f64; 3], tex_coord: [f64; 2]) -> Vertex {
    Vertex::new(
        position.map(|component| component as f32),
        tex_coord.map(|component| component as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRATEGIES: [SphereStrategy; 2] = [SphereStrategy::Grid, SphereStrategy::Stacked];

    #[test]
    fn generation_is_deterministic() {
        for strategy in STRATEGIES {
            let first = generate(strategy, 24).unwrap();
            let second = generate(strategy, 24).unwrap();
            assert_eq!(
                bytemuck::cast_slice::<Vertex, u8>(&first.vertices),
                bytemuck::cast_slice::<Vertex, u8>(&second.vertices)
            );
            assert_eq!(first.indices, second.indices);
        }
    }

    #[test]
    fn size_laws_hold() {
        for n in [1u32, 2, 7, 20, 64] {
            let grid = generate(SphereStrategy::Grid, n).unwrap();
            let n_usize = n as usize;
            assert_eq!(grid.vertices.len(), (n_usize + 1).pow(2));
            assert_eq!(grid.indices.len(), 6 * n_usize * n_usize);

            let stacked = generate(SphereStrategy::Stacked, n).unwrap();
            assert_eq!(stacked.vertices.len(), 2 * (n_usize + 1).pow(2));
            assert_eq!(stacked.indices.len(), 6 * n_usize * (n_usize + 1));

            for strategy in STRATEGIES {
                let mesh = generate(strategy, n).unwrap();
                assert_eq!(mesh.vertices.len(), strategy.vertex_count(n));
                assert_eq!(mesh.indices.len(), strategy.index_count(n));
            }
        }
    }

    #[test]
    fn every_index_addresses_a_vertex() {
        for strategy in STRATEGIES {
            for n in [1, 3, 20, strategy.max_segments()] {
                let mesh = generate(strategy, n).unwrap();
                let count = mesh.vertices.len();
                assert!(
                    mesh.indices.iter().all(|&index| (index as usize) < count),
                    "{strategy} with {n} segments emitted an out-of-range index"
                );
            }
        }
    }

    #[test]
    fn positions_are_homogeneous_and_on_the_unit_sphere() {
        for strategy in STRATEGIES {
            let mesh = generate(strategy, 12).unwrap();
            for vertex in &mesh.vertices {
                let [x, y, z, w] = vertex.position;
                assert_eq!(w, 1.0);
                let length = (x * x + y * y + z * z).sqrt();
                assert!((length - 1.0).abs() < 1e-5, "radius {length}");
            }
        }
    }

    #[test]
    fn stacked_scenario_counts() {
        let mesh = generate(SphereStrategy::Stacked, 20).unwrap();
        assert_eq!(mesh.vertices.len(), 882);
        assert_eq!(mesh.index_count(), 2520);
    }

    #[test]
    fn grid_texture_coordinates_span_half_the_latitude_range() {
        let mesh = generate(SphereStrategy::Grid, 8).unwrap();
        let south_pole = mesh.vertices.last().unwrap();
        assert!((south_pole.tex_coord[0] - 0.5).abs() < 1e-6);
        assert!((south_pole.tex_coord[1] - 1.0).abs() < 1e-6);
        assert_eq!(mesh.vertices[0].tex_coord, [0.0, 0.0]);
    }

    #[test]
    fn grid_first_cell_winding() {
        let mesh = generate(SphereStrategy::Grid, 4).unwrap();
        assert_eq!(&mesh.indices[..6], &[5, 1, 0, 1, 5, 6]);
    }

    fn assert_vertex(vertex: &Vertex, position: [f32; 3], tex_coord: [f32; 2]) {
        for (actual, expected) in vertex.position[..3].iter().zip(position) {
            assert!((actual - expected).abs() < 1e-6, "{vertex:?} is not at {position:?}");
        }
        assert_eq!(vertex.position[3], 1.0);
        for (actual, expected) in vertex.tex_coord.iter().zip(tex_coord) {
            assert!((actual - expected).abs() < 1e-6, "{vertex:?} has no tex coord {tex_coord:?}");
        }
    }

    #[test]
    fn stacked_first_band_layout() {
        let mesh = generate(SphereStrategy::Stacked, 4).unwrap();
        let half = std::f32::consts::FRAC_1_SQRT_2;

        // Band 0 spans lat -π/4 to 0; column 1 sits at lng π/2.
        assert_vertex(&mesh.vertices[0], [half, -half, 0.0], [0.0, 0.0]);
        assert_vertex(&mesh.vertices[1], [1.0, 0.0, 0.0], [0.0, 0.25]);
        assert_vertex(&mesh.vertices[2], [0.0, -half, half], [0.25, 0.0]);
        assert_vertex(&mesh.vertices[3], [0.0, 0.0, 1.0], [0.25, 0.25]);
        assert_eq!(&mesh.indices[..6], &[0, 1, 2, 1, 3, 2]);

        // Band 1 starts at vertex 2 * (1 * 5 + 0) and spans lat 0 to π/4.
        assert_vertex(&mesh.vertices[10], [1.0, 0.0, 0.0], [0.0, 0.25]);
        assert_vertex(&mesh.vertices[11], [half, half, 0.0], [0.0, 0.5]);
        assert_eq!(&mesh.indices[24..30], &[10, 11, 12, 11, 13, 12]);

        // Last band, last column.
        let last = &mesh.indices[mesh.indices.len() - 6..];
        let b0 = (2 * (4 * 5 + 3)) as u16;
        assert_eq!(last, &[b0, b0 + 1, b0 + 2, b0 + 1, b0 + 3, b0 + 2]);
    }

    #[test]
    fn triangles_face_outward() {
        for strategy in STRATEGIES {
            let mesh = generate(strategy, 16).unwrap();
            let mut outward = 0;
            let mut degenerate = 0;
            for triangle in mesh.indices.chunks_exact(3) {
                let [a, b, c] = [0, 1, 2].map(|k| {
                    let p = mesh.vertices[triangle[k] as usize].position;
                    nalgebra_glm::vec3(p[0], p[1], p[2])
                });
                let normal = (b - a).cross(&(c - a));
                if normal.norm() < 1e-7 {
                    degenerate += 1;
                    continue;
                }
                let centroid = (a + b + c) / 3.0;
                if normal.dot(&centroid) > 0.0 {
                    outward += 1;
                }
            }
            let facing = mesh.indices.len() / 3 - degenerate;
            // The stacked rings fold back over the top hemisphere; the folded half faces inward.
            let expected = match strategy {
                SphereStrategy::Grid => facing,
                SphereStrategy::Stacked => facing / 2,
            };
            assert!(
                outward >= expected,
                "{strategy}: only {outward} of {facing} triangles face outward"
            );
        }
    }

    #[test]
    fn zero_segments_is_rejected() {
        for strategy in STRATEGIES {
            assert!(matches!(
                generate(strategy, 0),
                Err(Error::InvalidMesh(_))
            ));
        }
    }

    #[test]
    fn segment_limit_follows_u16_index_range() {
        assert_eq!(SphereStrategy::Grid.max_segments(), 255);
        assert_eq!(SphereStrategy::Stacked.max_segments(), 180);

        for strategy in STRATEGIES {
            let max = strategy.max_segments();
            assert!(strategy.vertex_count(max) <= MAX_VERTICES);
            assert!(generate(strategy, max).is_ok());
            assert!(matches!(
                generate(strategy, max + 1),
                Err(Error::InvalidMesh(_))
            ));
        }
    }
}

//! Core mesh data structures.
//!
//! This module provides the polygonal half-edge mesh that every UV
//! algorithm in the crate reads and writes.
//!
//! # Overview
//!
//! [`HalfEdgeMesh`] stores vertices, half-edges, edges and faces with full
//! connectivity. Besides topology it carries the attributes UV editing
//! needs:
//!
//! - a UV coordinate and a pin flag on every loop (face corner)
//! - a seam flag on every edge
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge (a loop when it has a face)
//! - [`EdgeId`] - Identifies an undirected edge
//! - [`FaceId`] - Identifies a face
//!
//! # Construction
//!
//! ```
//! use rectuv::mesh::{HalfEdgeMesh, build_from_quads};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! assert_eq!(mesh.num_edges(), 4);
//! ```

mod builder;
mod halfedge;
mod index;

pub use builder::{build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex};
pub use halfedge::{Edge, Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexHalfEdgeIter};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// Small meshes shared by the unit tests.
#[cfg(test)]
pub(crate) mod test_meshes {
    use nalgebra::{Point2, Point3};

    use super::{
        build_from_polygons, build_from_quads, build_from_triangles, FaceId, HalfEdgeMesh,
        VertexId,
    };

    /// One right triangle in the XY plane.
    pub fn single_triangle() -> HalfEdgeMesh {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap()
    }

    /// Planar grid of `nx` x `ny` unit quads in the XY plane.
    ///
    /// Vertex `(i, j)` has index `j * (nx + 1) + i`; face `(i, j)` has index
    /// `j * nx + i`.
    pub fn quad_grid(nx: usize, ny: usize) -> HalfEdgeMesh {
        scaled_quad_grid(nx, ny, 1.0, 1.0)
    }

    /// Planar quad grid with cell size `sx` x `sy`.
    pub fn scaled_quad_grid(nx: usize, ny: usize, sx: f64, sy: f64) -> HalfEdgeMesh {
        let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
        for j in 0..=ny {
            for i in 0..=nx {
                vertices.push(Point3::new(i as f64 * sx, j as f64 * sy, 0.0));
            }
        }

        let mut faces = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let v00 = j * (nx + 1) + i;
                let v10 = v00 + 1;
                let v01 = v00 + nx + 1;
                let v11 = v01 + 1;
                faces.push([v00, v10, v11, v01]);
            }
        }

        build_from_quads(&vertices, &faces).unwrap()
    }

    /// Open tube of `segments` quads around and `rings` quads along Z.
    pub fn cylinder(segments: usize, rings: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::with_capacity(segments * (rings + 1));
        for j in 0..=rings {
            for i in 0..segments {
                let angle = i as f64 / segments as f64 * std::f64::consts::TAU;
                vertices.push(Point3::new(angle.cos(), angle.sin(), j as f64 * 0.5));
            }
        }

        let mut faces = Vec::with_capacity(segments * rings);
        for j in 0..rings {
            for i in 0..segments {
                let a = j * segments + i;
                let b = j * segments + (i + 1) % segments;
                faces.push(vec![a, b, b + segments, a + segments]);
            }
        }

        build_from_polygons(&vertices, &faces).unwrap()
    }

    /// Closed torus of `segments` x `rings` quads.
    ///
    /// Vertex `(i, j)` has index `j * segments + i`; face `(i, j)` has index
    /// `j * segments + i`.
    pub fn torus(segments: usize, rings: usize) -> HalfEdgeMesh {
        let mut vertices = Vec::with_capacity(segments * rings);
        for j in 0..rings {
            let tube = j as f64 / rings as f64 * std::f64::consts::TAU;
            for i in 0..segments {
                let angle = i as f64 / segments as f64 * std::f64::consts::TAU;
                let radius = 2.0 + 0.5 * tube.cos();
                vertices.push(Point3::new(
                    radius * angle.cos(),
                    radius * angle.sin(),
                    0.5 * tube.sin(),
                ));
            }
        }

        let mut faces = Vec::with_capacity(segments * rings);
        for j in 0..rings {
            for i in 0..segments {
                let a = j * segments + i;
                let b = j * segments + (i + 1) % segments;
                let c = (j + 1) % rings * segments + (i + 1) % segments;
                let d = (j + 1) % rings * segments + i;
                faces.push([a, b, c, d]);
            }
        }

        build_from_quads(&vertices, &faces).unwrap()
    }

    /// All faces of a mesh, in id order.
    pub fn all_faces(mesh: &HalfEdgeMesh) -> Vec<FaceId> {
        mesh.face_ids().collect()
    }

    /// Seed every loop's UV with its vertex's XY position.
    pub fn project_xy(mesh: &mut HalfEdgeMesh) {
        let loops: Vec<_> = mesh
            .halfedge_ids()
            .filter(|&he| !mesh.is_boundary_halfedge(he))
            .collect();
        for l in loops {
            let p = *mesh.position(mesh.origin(l));
            mesh.set_uv(l, Point2::new(p.x, p.y));
        }
    }

    /// The loop of `face` whose origin is `vertex`.
    pub fn loop_at(mesh: &HalfEdgeMesh, face: usize, vertex: usize) -> super::HalfEdgeId {
        mesh.face_halfedges(FaceId::new(face))
            .find(|&l| mesh.origin(l) == VertexId::new(vertex))
            .unwrap()
    }
}

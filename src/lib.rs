//! # rectuv
//!
//! Conformal UV parameterization and rectangular UV layout for polygonal
//! meshes.
//!
//! rectuv stores meshes in a half-edge structure whose loops (face corners)
//! carry UV coordinates and pin flags, and whose edges carry seam flags. On
//! top of it the crate provides:
//!
//! - **Rectangularize**: lay a disk-shaped face patch out as an axis-aligned
//!   rectangle, with automatic or explicit corners
//! - **Conformal relax**: Least Squares Conformal Maps that respect pins
//!   and seams
//! - **Topology helpers**: boundary chains, tube cutting and seam-separated
//!   face groups
//!
//! ## Quick Start
//!
//! ```
//! use rectuv::prelude::*;
//! use nalgebra::Point3;
//!
//! // A 2 x 1 strip of quads.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(2.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(2.0, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 4, 3], [1, 2, 5, 4]];
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//!
//! let patch = Patch::all(&mesh);
//! let outcome = rectangularize(&mut mesh, &patch, &RectangularizeOptions::default()).unwrap();
//! assert!(outcome.is_applied());
//!
//! for l in patch.loops(&mesh) {
//!     let uv = mesh.uv(l);
//!     println!("{:?}: ({:.3}, {:.3})", l, uv.x, uv.y);
//! }
//! ```
//!
//! ## Mesh Traversal
//!
//! ```
//! use rectuv::prelude::*;
//! use nalgebra::Point3;
//!
//! # let vertices = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.5, 1.0, 0.0),
//! # ];
//! # let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
//! // Loops of a face, in winding order
//! for l in mesh.face_halfedges(FaceId::new(0)) {
//!     println!("{:?} -> {:?}", mesh.origin(l), mesh.dest(l));
//! }
//!
//! // Loops at a vertex
//! let corners = mesh.vertex_loops(VertexId::new(0)).count();
//! assert_eq!(corners, 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use rectuv::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::parameterize::{
        conformal_relax, conformal_relax_selection, rectangularize, rectangularize_selection,
        AxisMode, FitMode, Outcome, RectangularizeOptions, RelaxOptions, SkipReason,
        SolverOptions,
    };
    pub use crate::algo::Patch;
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        build_from_polygons, build_from_quads, build_from_triangles, to_face_vertex, EdgeId,
        FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

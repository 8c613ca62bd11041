//! UV parameterization of face patches.
//!
//! UVs live on loops (face corners), so a vertex can carry different UVs in
//! different faces. Every operation here reads and writes those loop UVs in
//! place on a [`HalfEdgeMesh`](crate::mesh::HalfEdgeMesh).
//!
//! # Available Operations
//!
//! - [`rectangularize`]: lay a disk-shaped patch out as an axis-aligned
//!   rectangle
//! - [`conformal_relax`]: Least Squares Conformal Maps with the current pins
//! - [`conformal_solve`]: the underlying per-patch LSCM solver
//! - [`fit_to_bounds`]: move a layout back onto a UV bounding box
//!
//! # Example
//!
//! ```
//! use rectuv::prelude::*;
//! use rectuv::algo::parameterize::{conformal_relax, RelaxOptions};
//! use nalgebra::{Point2, Point3};
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//! let corner = |mesh: &HalfEdgeMesh, v: usize| {
//!     mesh.face_halfedges(FaceId::new(0))
//!         .find(|&l| mesh.origin(l) == VertexId::new(v))
//!         .unwrap()
//! };
//! let (a, b, c) = (corner(&mesh, 0), corner(&mesh, 1), corner(&mesh, 2));
//! mesh.set_uv(a, Point2::new(0.0, 0.0));
//! mesh.set_uv(c, Point2::new(2.0, 2.0));
//! mesh.set_pinned(a, true);
//! mesh.set_pinned(c, true);
//!
//! let patch = Patch::all(&mesh);
//! conformal_relax(&mut mesh, &patch, &RelaxOptions::default()).unwrap();
//! assert!((mesh.uv(b) - Point2::new(2.0, 0.0)).norm() < 1e-9);
//! ```
//!
//! # References
//!
//! - Lévy, B., Petitjean, S., Ray, N., & Maillot, J. (2002). "Least squares
//!   conformal maps for automatic texture atlas generation." ACM SIGGRAPH.

mod bounds;
mod lscm;
mod lstsq;
mod rectangularize;
mod relax;
mod sparse;

pub use bounds::{fit_to_bounds, FitMode, UvBounds, BOUNDS_EPSILON};
pub use lscm::{conformal_solve, AxisMode, SolveSummary};
pub use lstsq::{solve_least_squares, SolverOptions};
pub use rectangularize::{
    assign_rectangle_targets, conformal_relax, conformal_relax_selection, rectangularize,
    rectangularize_selection, Outcome, RectangleTargets, RectangularizeOptions, RelaxOptions,
    SkipReason,
};
pub use relax::{relax_patches, RelaxPatch, RelaxVertex};

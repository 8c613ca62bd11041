//! UV layout algorithms.
//!
//! Everything here works on a [`Patch`], a caller-chosen set of faces, and
//! treats seam edges, mesh borders and edges shared with faces outside the
//! patch as boundary:
//!
//! - **Boundary**: boundary loops, connected boundary components
//! - **Chains**: boundary loops sorted into winding-consistent cycles
//! - **Corners**: scoring boundary turns and picking rectangle corners
//! - **Topology**: cutting tubes open, seaming UV islands, grouping selections
//! - **Geodesics**: edge-graph shortest paths inside a patch
//! - **Parameterization**: LSCM relaxation and rectangular layout

pub mod boundary;
pub mod chain;
pub mod corners;
pub mod geodesic;
pub mod parameterize;
pub mod patch;
pub mod topology;

pub use patch::Patch;

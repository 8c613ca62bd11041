//! Error types for rectuv.
//!
//! Only malformed input and broken internal invariants are errors. A group
//! that cannot be parameterized is reported as a skipped
//! [`Outcome`](crate::algo::parameterize::Outcome) instead.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh construction or UV operations.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces.
    #[error("mesh has no faces")]
    EmptyMesh,

    /// A face references an invalid vertex index.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A face has fewer than three corners or repeats a vertex.
    #[error("face {face} is degenerate (fewer than 3 vertices or duplicate vertices)")]
    DegenerateFace {
        /// The face index.
        face: usize,
    },

    /// A directed edge is used by more than one face.
    #[error("edge ({v0}, {v1}) has more than two incident faces")]
    NonManifoldEdge {
        /// First vertex of the edge.
        v0: usize,
        /// Second vertex of the edge.
        v1: usize,
    },

    /// Two separate face fans meet at a single border vertex.
    #[error("vertex {vertex} joins more than one fan of faces")]
    NonManifoldVertex {
        /// The vertex index.
        vertex: usize,
    },

    /// A patch references a face that does not exist.
    #[error("face {face} does not exist in the mesh")]
    InvalidFace {
        /// The face index.
        face: usize,
    },

    /// A corner override references a half-edge that is not a face loop.
    #[error("half-edge {halfedge} is not a loop of any face")]
    InvalidHalfEdge {
        /// The half-edge index.
        halfedge: usize,
    },

    /// The sorted boundary chain does not cover its boundary set.
    #[error("boundary chain is broken: expected {expected} loops, linked {found}")]
    BrokenChain {
        /// Number of boundary loops that should have been linked.
        expected: usize,
        /// Number of loops actually linked.
        found: usize,
    },

    /// An iterative solver failed to converge.
    #[error("algorithm failed to converge after {iterations} iterations")]
    ConvergenceFailed {
        /// Number of iterations attempted.
        iterations: usize,
    },

    /// Invalid mesh state for the requested operation.
    #[error("invalid mesh state: {0}")]
    InvalidState(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = MeshError::BrokenChain {
            expected: 12,
            found: 7,
        };
        assert_eq!(
            err.to_string(),
            "boundary chain is broken: expected 12 loops, linked 7"
        );

        let err = MeshError::invalid_param("corner_bias", -1.0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid parameter: corner_bias = -1 (must be positive)"
        );
    }
}

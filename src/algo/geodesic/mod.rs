//! Edge-graph shortest paths.
//!
//! Cutting an annular patch open needs a short chain of edges joining its
//! two boundary loops. [`dijkstra`] computes distances along mesh edges,
//! optionally confined to the edges of a [`Patch`](crate::algo::Patch), and
//! [`shortest_path`] wraps it into a "nearest target" path query.
//!
//! # Example
//!
//! ```
//! use rectuv::prelude::*;
//! use rectuv::algo::geodesic::{dijkstra, DijkstraOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
//!
//! let result = dijkstra(&mesh, VertexId::new(0), &DijkstraOptions::default());
//! assert!((result.distance(VertexId::new(2)) - 2.0).abs() < 1e-12);
//! ```

mod dijkstra;

use std::marker::PhantomData;

pub use dijkstra::{dijkstra, shortest_path, DijkstraOptions};

use crate::mesh::{MeshIndex, VertexId};

/// Result of a shortest-path distance computation.
#[derive(Debug, Clone)]
pub struct GeodesicResult<I: MeshIndex = u32> {
    /// Distance from the source to each vertex.
    /// `f64::INFINITY` if the vertex was not reached.
    distances: Vec<f64>,

    /// Predecessor vertex for each vertex, when requested.
    predecessors: Option<Vec<Option<usize>>>,

    _marker: PhantomData<I>,
}

impl<I: MeshIndex> GeodesicResult<I> {
    pub(crate) fn new(distances: Vec<f64>, predecessors: Option<Vec<Option<usize>>>) -> Self {
        Self {
            distances,
            predecessors,
            _marker: PhantomData,
        }
    }

    /// Get the distance to a vertex.
    #[inline]
    pub fn distance(&self, v: VertexId<I>) -> f64 {
        self.distances[v.index()]
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Check if a vertex was reached from the source.
    #[inline]
    pub fn is_reachable(&self, v: VertexId<I>) -> bool {
        self.distances[v.index()].is_finite()
    }

    /// Reconstruct the path from the source to `target`, both included.
    ///
    /// Returns `None` when predecessors were not stored or `target` was not
    /// reached.
    pub fn path_to(&self, target: VertexId<I>) -> Option<Vec<VertexId<I>>> {
        let predecessors = self.predecessors.as_ref()?;
        if !self.distances[target.index()].is_finite() {
            return None;
        }

        let mut path = Vec::new();
        let mut current = target.index();
        loop {
            path.push(VertexId::new(current));
            match predecessors[current] {
                Some(pred) => current = pred,
                None => break,
            }
            if path.len() > self.distances.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }
}

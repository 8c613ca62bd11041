//! Dijkstra's algorithm on the mesh edge graph.
//!
//! Distances are sums of 3D edge lengths. When a region is given, only
//! edges of the region's faces are relaxed, so paths never leave the patch.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::algo::patch::Patch;
use crate::mesh::{HalfEdgeMesh, MeshIndex, VertexId};

use super::GeodesicResult;

/// Options for Dijkstra's algorithm.
#[derive(Debug, Clone)]
pub struct DijkstraOptions<'a, I: MeshIndex = u32> {
    /// Whether to store predecessor information for path reconstruction.
    pub store_predecessors: bool,

    /// Stop as soon as any of these vertices is settled.
    pub targets: Vec<VertexId<I>>,

    /// Only walk edges bordering a face of this patch.
    pub region: Option<&'a Patch<I>>,
}

impl<'a, I: MeshIndex> Default for DijkstraOptions<'a, I> {
    fn default() -> Self {
        Self {
            store_predecessors: false,
            targets: Vec::new(),
            region: None,
        }
    }
}

impl<'a, I: MeshIndex> DijkstraOptions<'a, I> {
    /// Enable predecessor storage for path reconstruction.
    pub fn with_predecessors(mut self, store: bool) -> Self {
        self.store_predecessors = store;
        self
    }

    /// Stop once one of the given vertices is settled.
    pub fn with_targets(mut self, targets: Vec<VertexId<I>>) -> Self {
        self.targets = targets;
        self
    }

    /// Restrict the search to the edges of a patch.
    pub fn within(mut self, region: &'a Patch<I>) -> Self {
        self.region = Some(region);
        self
    }
}

/// Entry in Dijkstra's priority queue.
#[derive(Debug, Clone)]
struct DijkstraEntry {
    vertex: usize,
    distance: f64,
}

impl PartialEq for DijkstraEntry {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for DijkstraEntry {}

impl PartialOrd for DijkstraEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DijkstraEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for min-heap behavior; ties broken by vertex index so
        // results are deterministic.
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

/// Compute edge-graph distances from a single source vertex.
///
/// Unreached vertices keep an infinite distance. With targets set, the
/// search ends when the first target is settled; that target's distance
/// and path are final.
pub fn dijkstra<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    source: VertexId<I>,
    options: &DijkstraOptions<'_, I>,
) -> GeodesicResult<I> {
    let n = mesh.num_vertices();
    if n == 0 || source.index() >= n {
        return GeodesicResult::new(vec![f64::INFINITY; n], None);
    }

    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors: Option<Vec<Option<usize>>> = if options.store_predecessors {
        Some(vec![None; n])
    } else {
        None
    };
    let targets: HashSet<usize> = options.targets.iter().map(|v| v.index()).collect();

    let mut heap = BinaryHeap::new();
    distances[source.index()] = 0.0;
    heap.push(DijkstraEntry {
        vertex: source.index(),
        distance: 0.0,
    });

    while let Some(entry) = heap.pop() {
        let u = entry.vertex;
        if entry.distance > distances[u] {
            continue;
        }
        if targets.contains(&u) {
            break;
        }

        for he in mesh.vertex_halfedges(VertexId::new(u)) {
            if let Some(region) = options.region {
                if !region.contains(mesh.face_of(he))
                    && !region.contains(mesh.face_of(mesh.twin(he)))
                {
                    continue;
                }
            }

            let v = mesh.dest(he).index();
            let new_dist = entry.distance + mesh.edge_length(he);
            if new_dist < distances[v] {
                distances[v] = new_dist;
                if let Some(ref mut preds) = predecessors {
                    preds[v] = Some(u);
                }
                heap.push(DijkstraEntry {
                    vertex: v,
                    distance: new_dist,
                });
            }
        }
    }

    GeodesicResult::new(distances, predecessors)
}

/// Shortest edge path from `source` to the nearest of `targets`, walking
/// only edges of `region`.
///
/// The returned path starts at `source` and ends at a target. Returns `None`
/// when no target is reachable inside the region.
pub fn shortest_path<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    source: VertexId<I>,
    targets: &[VertexId<I>],
    region: &Patch<I>,
) -> Option<Vec<VertexId<I>>> {
    if targets.is_empty() {
        return None;
    }
    if targets.contains(&source) {
        return Some(vec![source]);
    }

    let options = DijkstraOptions::default()
        .with_predecessors(true)
        .with_targets(targets.to_vec())
        .within(region);
    let result = dijkstra(mesh, source, &options);

    let nearest = targets
        .iter()
        .copied()
        .filter(|&t| result.is_reachable(t))
        .min_by(|&a, &b| result.distance(a).total_cmp(&result.distance(b)))?;

    result.path_to(nearest)
}

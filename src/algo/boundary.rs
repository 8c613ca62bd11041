//! Boundary classification for face patches.
//!
//! A loop is on the boundary of a patch when its edge is a seam, lies on the
//! mesh border, or is shared with a face outside the patch.

use std::collections::{HashMap, HashSet};

use crate::mesh::{EdgeId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

use super::patch::Patch;

/// A rectangle needs four boundary loops to host four distinct corners.
pub const MIN_BOUNDARY_LOOPS: usize = 4;

/// Check whether a loop lies on the boundary of `patch`.
pub fn is_boundary_loop<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    l: HalfEdgeId<I>,
) -> bool {
    let e = mesh.edge_of(l);
    if mesh.is_seam(e) || mesh.is_boundary_edge(e) {
        return true;
    }
    !patch.contains(mesh.face_of(mesh.twin(l)))
}

/// Collect the boundary loops of a patch, in patch order.
pub fn boundary_loops<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, patch: &Patch<I>) -> Vec<HalfEdgeId<I>> {
    patch
        .loops(mesh)
        .filter(|&l| is_boundary_loop(mesh, patch, l))
        .collect()
}

/// A maximal connected set of boundary edges.
#[derive(Debug, Clone)]
pub struct BoundaryComponent<I: MeshIndex = u32> {
    /// Edges of the component.
    pub edges: Vec<EdgeId<I>>,
    /// Vertices of the component. Ordered along the cycle when `closed`.
    pub vertices: Vec<VertexId<I>>,
    /// Whether the edges form a single simple cycle.
    pub closed: bool,
}

/// Group the edges of the given boundary loops into connected components.
///
/// Components are discovered in the order of `loops`.
pub fn boundary_components<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    loops: &[HalfEdgeId<I>],
) -> Vec<BoundaryComponent<I>> {
    let mut edges: Vec<EdgeId<I>> = Vec::new();
    let mut seen_edges = HashSet::new();
    for &l in loops {
        let e = mesh.edge_of(l);
        if seen_edges.insert(e) {
            edges.push(e);
        }
    }

    let mut incident: HashMap<VertexId<I>, Vec<EdgeId<I>>> = HashMap::new();
    for &e in &edges {
        for v in mesh.edge_vertices(e) {
            incident.entry(v).or_default().push(e);
        }
    }

    let mut assigned: HashSet<EdgeId<I>> = HashSet::new();
    let mut components = Vec::new();

    for &seed in &edges {
        if assigned.contains(&seed) {
            continue;
        }

        let mut component_edges = Vec::new();
        let mut component_vertices = Vec::new();
        let mut seen_vertices = HashSet::new();
        let mut stack = vec![seed];
        assigned.insert(seed);

        while let Some(e) = stack.pop() {
            component_edges.push(e);
            for v in mesh.edge_vertices(e) {
                if seen_vertices.insert(v) {
                    component_vertices.push(v);
                }
                for &ne in &incident[&v] {
                    if assigned.insert(ne) {
                        stack.push(ne);
                    }
                }
            }
        }

        let closed = component_vertices.iter().all(|v| incident[v].len() == 2);
        if closed {
            component_vertices = walk_cycle(mesh, &incident, component_edges[0]);
        }

        components.push(BoundaryComponent {
            edges: component_edges,
            vertices: component_vertices,
            closed,
        });
    }

    components
}

/// Order the vertices of a simple cycle starting at `start`'s first vertex.
fn walk_cycle<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    incident: &HashMap<VertexId<I>, Vec<EdgeId<I>>>,
    start: EdgeId<I>,
) -> Vec<VertexId<I>> {
    let [first, mut current] = mesh.edge_vertices(start);
    let mut order = vec![first];
    let mut via = start;

    while current != first {
        order.push(current);
        let Some(&next_edge) = incident[&current].iter().find(|&&e| e != via) else {
            break;
        };
        let [a, b] = mesh.edge_vertices(next_edge);
        current = if a == current { b } else { a };
        via = next_edge;
    }

    order
}

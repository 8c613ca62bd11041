//! Boundary chain sorting.
//!
//! Orders the boundary loops of a patch into cycles that follow face
//! winding: the vertex a loop ends at is the vertex the next loop starts
//! from. Walking from one boundary loop to the next crosses interior edges
//! face by face around the shared vertex, so no recursion is involved.

use std::collections::{HashSet, VecDeque};

use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::boundary::is_boundary_loop;
use super::patch::Patch;

/// The boundary loop that follows `l` along the patch border.
///
/// Starting at `next(l)`, interior loops are skipped by crossing into the
/// neighbouring face (`next(twin(..))`) until a boundary loop is found. The
/// walk is capped, and returns the last loop visited if it never finds one.
pub fn next_boundary_loop<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    l: HalfEdgeId<I>,
) -> HalfEdgeId<I> {
    let mut current = mesh.next(l);
    for _ in 0..mesh.num_halfedges() {
        if is_boundary_loop(mesh, patch, current) {
            break;
        }
        let twin = mesh.twin(current);
        if !patch.contains(mesh.face_of(twin)) {
            break;
        }
        current = mesh.next(twin);
    }
    current
}

/// The loops walked backwards from `l` to the previous boundary loop.
///
/// The list starts with `prev(l)` and ends at the boundary loop preceding
/// `l`; every entry ends at the vertex `l` starts from. Mapping the list
/// through `next` yields the wedge of loops at that vertex between the two
/// boundary loops.
pub fn prev_boundary_loop<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    l: HalfEdgeId<I>,
) -> Vec<HalfEdgeId<I>> {
    let mut current = mesh.prev(l);
    let mut walked = vec![current];
    for _ in 0..mesh.num_halfedges() {
        if is_boundary_loop(mesh, patch, current) {
            break;
        }
        let twin = mesh.twin(current);
        if !patch.contains(mesh.face_of(twin)) {
            break;
        }
        current = mesh.prev(twin);
        walked.push(current);
    }
    walked
}

/// The loops at the vertex `l` starts from, between `l` and the previous
/// boundary loop, starting with `l` itself.
pub fn boundary_wedge<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    l: HalfEdgeId<I>,
) -> Vec<HalfEdgeId<I>> {
    prev_boundary_loop(mesh, patch, l)
        .into_iter()
        .map(|p| mesh.next(p))
        .collect()
}

/// A sequence of boundary loops linked end to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryChain<I: MeshIndex = u32> {
    loops: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> BoundaryChain<I> {
    /// Loops in chain order.
    #[inline]
    pub fn loops(&self) -> &[HalfEdgeId<I>] {
        &self.loops
    }

    /// Number of loops.
    #[inline]
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Check if the chain is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Loop at a cyclic index.
    #[inline]
    pub fn get(&self, i: usize) -> HalfEdgeId<I> {
        self.loops[i % self.loops.len()]
    }

    /// Index of a loop in the chain.
    pub fn position(&self, l: HalfEdgeId<I>) -> Option<usize> {
        self.loops.iter().position(|&c| c == l)
    }

    /// Check that every loop ends where its cyclic successor starts.
    pub fn validate(&self, mesh: &HalfEdgeMesh<I>) -> Result<()> {
        let n = self.loops.len();
        for i in 0..n {
            if mesh.dest(self.loops[i]) != mesh.origin(self.loops[(i + 1) % n]) {
                return Err(MeshError::BrokenChain {
                    expected: n,
                    found: i + 1,
                });
            }
        }
        Ok(())
    }
}

/// Partition boundary loops into winding-consistent chains.
///
/// Each chain is seeded with the first unassigned loop of `boundary` and
/// grown forwards and backwards until the walk reaches a loop that is not
/// available. A disk-shaped patch yields exactly one chain.
pub fn sort_boundary_chains<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    boundary: &[HalfEdgeId<I>],
) -> Vec<BoundaryChain<I>> {
    let mut remaining: HashSet<HalfEdgeId<I>> = boundary.iter().copied().collect();
    let mut chains = Vec::new();

    for &seed in boundary {
        if !remaining.remove(&seed) {
            continue;
        }
        let mut loops = VecDeque::from([seed]);

        while let Some(&last) = loops.back() {
            let next = next_boundary_loop(mesh, patch, last);
            if !remaining.remove(&next) {
                break;
            }
            loops.push_back(next);
        }

        while let Some(&first) = loops.front() {
            let Some(&prev) = prev_boundary_loop(mesh, patch, first).last() else {
                break;
            };
            if !remaining.remove(&prev) {
                break;
            }
            loops.push_front(prev);
        }

        chains.push(BoundaryChain {
            loops: Vec::from(loops),
        });
    }

    chains
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::boundary::boundary_loops;
    use crate::algo::topology::{cut_cylinder, CylinderCut};
    use crate::mesh::{test_meshes, FaceId, VertexId};

    #[test]
    fn test_next_boundary_loop_crosses_interior_edges() {
        let mesh = test_meshes::quad_grid(2, 2);
        let patch = Patch::all(&mesh);

        // Bottom edge of face 0 runs 0 -> 1; the border continues 1 -> 2 in face 1.
        let l = test_meshes::loop_at(&mesh, 0, 0);
        let next = next_boundary_loop(&mesh, &patch, l);
        assert_eq!(mesh.origin(next), VertexId::new(1));
        assert_eq!(mesh.dest(next), VertexId::new(2));
        assert_eq!(mesh.face_of(next), FaceId::new(1));
    }

    #[test]
    fn test_prev_boundary_loop_walks_the_wedge() {
        let mesh = test_meshes::quad_grid(2, 2);
        let patch = Patch::all(&mesh);

        // Border loop 1 -> 2 in face 1; its predecessor is 0 -> 1 in face 0.
        let l = test_meshes::loop_at(&mesh, 1, 1);
        let walked = prev_boundary_loop(&mesh, &patch, l);
        assert_eq!(walked.len(), 2);
        for &w in &walked {
            assert_eq!(mesh.dest(w), VertexId::new(1));
        }
        let last = *walked.last().unwrap();
        assert!(is_boundary_loop(&mesh, &patch, last));
        assert_eq!(mesh.origin(last), VertexId::new(0));

        let wedge = boundary_wedge(&mesh, &patch, l);
        assert_eq!(wedge.len(), 2);
        assert_eq!(wedge[0], l);
        assert!(wedge.iter().all(|&w| mesh.origin(w) == VertexId::new(1)));
    }

    #[test]
    fn test_grid_sorts_into_one_chain() {
        let mesh = test_meshes::quad_grid(3, 3);
        let patch = Patch::all(&mesh);
        let loops = boundary_loops(&mesh, &patch);

        let chains = sort_boundary_chains(&mesh, &patch, &loops);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 12);
        chains[0].validate(&mesh).unwrap();
    }

    #[test]
    fn test_cylinder_sorts_into_two_chains_until_cut() {
        let mut mesh = test_meshes::cylinder(6, 3);
        let patch = Patch::all(&mesh);
        let loops = boundary_loops(&mesh, &patch);
        assert_eq!(sort_boundary_chains(&mesh, &patch, &loops).len(), 2);

        assert!(matches!(
            cut_cylinder(&mut mesh, &patch, &loops),
            CylinderCut::Cut(_)
        ));
        let loops = boundary_loops(&mesh, &patch);
        let chains = sort_boundary_chains(&mesh, &patch, &loops);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 18);
        chains[0].validate(&mesh).unwrap();
    }

    #[test]
    fn test_validate_reports_broken_link() {
        let mesh = test_meshes::quad_grid(2, 1);
        let a = test_meshes::loop_at(&mesh, 0, 0);
        let b = test_meshes::loop_at(&mesh, 1, 2);
        let chain = BoundaryChain { loops: vec![a, b] };

        let err = chain.validate(&mesh).unwrap_err();
        assert!(matches!(
            err,
            MeshError::BrokenChain {
                expected: 2,
                found: 1
            }
        ));
    }
}

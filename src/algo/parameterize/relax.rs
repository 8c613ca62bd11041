//! Seam-aware grouping of loops into solve unknowns.
//!
//! Loops around one mesh vertex become a single [`RelaxVertex`] when they can
//! be reached from each other by stepping across shared edges that are not
//! seams. A vertex lying on a seam therefore yields one unknown per side.
//! Faces joined by non-seam edges form a [`RelaxPatch`], the unit solved by
//! the conformal solver.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::unionfind::UnionFind;

use crate::algo::patch::Patch;
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// One solve unknown: the loops of a vertex sharing a UV continuity domain.
#[derive(Debug, Clone)]
pub struct RelaxVertex<I: MeshIndex = u32> {
    /// The mesh vertex.
    pub vertex: VertexId<I>,
    /// Member loops, all starting at `vertex`.
    pub loops: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> RelaxVertex<I> {
    /// The first pinned member loop, if any.
    pub fn pinned_loop(&self, mesh: &HalfEdgeMesh<I>) -> Option<HalfEdgeId<I>> {
        self.loops.iter().copied().find(|&l| mesh.is_pinned(l))
    }
}

/// A seam-connected set of faces and the unknowns they reference.
#[derive(Debug, Clone)]
pub struct RelaxPatch<I: MeshIndex = u32> {
    faces: Vec<FaceId<I>>,
    vertices: Vec<RelaxVertex<I>>,
    polygons: Vec<Vec<usize>>,
}

impl<I: MeshIndex> RelaxPatch<I> {
    /// Faces in flood-fill order.
    #[inline]
    pub fn faces(&self) -> &[FaceId<I>] {
        &self.faces
    }

    /// Unknowns in discovery order.
    #[inline]
    pub fn vertices(&self) -> &[RelaxVertex<I>] {
        &self.vertices
    }

    /// Number of unknowns.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Each face as a cycle of unknown indices, parallel to [`faces`](Self::faces).
    #[inline]
    pub fn polygons(&self) -> &[Vec<usize>] {
        &self.polygons
    }

    /// Assemble a relaxation patch directly.
    #[cfg(test)]
    pub(crate) fn from_parts(
        faces: Vec<FaceId<I>>,
        vertices: Vec<RelaxVertex<I>>,
        polygons: Vec<Vec<usize>>,
    ) -> Self {
        Self {
            faces,
            vertices,
            polygons,
        }
    }

    /// Fan triangulation of every polygon, rooted at its first corner.
    pub fn triangles(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        self.polygons.iter().flat_map(|poly| {
            (1..poly.len().saturating_sub(1)).map(move |i| [poly[0], poly[i], poly[i + 1]])
        })
    }
}

/// Split a patch into relaxation patches of seam-aware unknowns.
///
/// Faces are flood-filled from the first unvisited patch face across
/// non-seam edges. Unknowns are numbered in the order their first loop is
/// met, so the first and last unknowns of a patch are deterministic.
pub fn relax_patches<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, patch: &Patch<I>) -> Vec<RelaxPatch<I>> {
    let loops: Vec<HalfEdgeId<I>> = patch.loops(mesh).collect();
    let slot: HashMap<HalfEdgeId<I>, usize> =
        loops.iter().enumerate().map(|(i, &l)| (l, i)).collect();

    // Loop l and the loop across its edge at the same vertex, next(twin(l)),
    // share a domain unless the edge is a seam. Every interior edge is seen
    // from both sides, which covers the edge entering the vertex as well.
    let mut uf = UnionFind::<usize>::new(loops.len());
    for (i, &l) in loops.iter().enumerate() {
        if !crosses(mesh, patch, l) {
            continue;
        }
        if let Some(&j) = slot.get(&mesh.next(mesh.twin(l))) {
            uf.union(i, j);
        }
    }

    let mut visited: HashSet<FaceId<I>> = HashSet::new();
    let mut patches = Vec::new();

    for &seed in patch.faces() {
        if !visited.insert(seed) {
            continue;
        }

        let mut relax = RelaxPatch {
            faces: Vec::new(),
            vertices: Vec::new(),
            polygons: Vec::new(),
        };
        let mut local: HashMap<usize, usize> = HashMap::new();
        let mut queue = VecDeque::from([seed]);

        while let Some(f) = queue.pop_front() {
            let mut polygon = Vec::new();
            for l in mesh.face_halfedges(f) {
                let root = uf.find_mut(slot[&l]);
                let index = *local.entry(root).or_insert_with(|| {
                    relax.vertices.push(RelaxVertex {
                        vertex: mesh.origin(l),
                        loops: Vec::new(),
                    });
                    relax.vertices.len() - 1
                });
                relax.vertices[index].loops.push(l);
                polygon.push(index);

                if crosses(mesh, patch, l) {
                    let neighbor = mesh.face_of(mesh.twin(l));
                    if visited.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
            relax.faces.push(f);
            relax.polygons.push(polygon);
        }

        patches.push(relax);
    }

    patches
}

/// Whether UV continuity carries across the edge of `l` into another patch face.
fn crosses<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, patch: &Patch<I>, l: HalfEdgeId<I>) -> bool {
    !mesh.is_seam(mesh.edge_of(l)) && patch.contains(mesh.face_of(mesh.twin(l)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes;

    fn unknowns_at(patches: &[RelaxPatch], v: usize) -> usize {
        patches
            .iter()
            .flat_map(|p| p.vertices())
            .filter(|rv| rv.vertex == VertexId::new(v))
            .count()
    }

    #[test]
    fn test_grid_merges_every_vertex() {
        let mesh = test_meshes::quad_grid(2, 2);
        let patch = Patch::all(&mesh);
        let patches = relax_patches(&mesh, &patch);

        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].num_vertices(), 9);
        assert_eq!(patches[0].faces().len(), 4);
        assert_eq!(patches[0].triangles().count(), 8);

        let center = patches[0]
            .vertices()
            .iter()
            .find(|rv| rv.vertex == VertexId::new(4))
            .unwrap();
        assert_eq!(center.loops.len(), 4);
    }

    #[test]
    fn test_seam_splits_patches_and_vertices() {
        let mut mesh = test_meshes::quad_grid(2, 1);
        let l = mesh.find_halfedge(VertexId::new(1), VertexId::new(4)).unwrap();
        mesh.set_seam(mesh.edge_of(l), true);

        let patch = Patch::all(&mesh);
        let patches = relax_patches(&mesh, &patch);
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].num_vertices(), 4);
        assert_eq!(patches[1].num_vertices(), 4);
        assert_eq!(unknowns_at(&patches, 1), 2);
        assert_eq!(unknowns_at(&patches, 4), 2);
        assert_eq!(unknowns_at(&patches, 0), 1);
    }

    #[test]
    fn test_slit_merges_around_the_far_side() {
        // Seam from the border vertex 1 to the center vertex 4.
        let mut mesh = test_meshes::quad_grid(2, 2);
        let l = mesh.find_halfedge(VertexId::new(1), VertexId::new(4)).unwrap();
        mesh.set_seam(mesh.edge_of(l), true);

        let patch = Patch::all(&mesh);
        let patches = relax_patches(&mesh, &patch);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].num_vertices(), 10);

        // The center is still reachable around the slit; the border vertex is not.
        assert_eq!(unknowns_at(&patches, 4), 1);
        assert_eq!(unknowns_at(&patches, 1), 2);
    }

    #[test]
    fn test_patch_boundary_splits_like_a_seam() {
        let mesh = test_meshes::quad_grid(3, 1);
        let patch = Patch::new(&mesh, [FaceId::new(0), FaceId::new(2)]).unwrap();
        let patches = relax_patches(&mesh, &patch);
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].faces(), &[FaceId::new(0)]);
        assert_eq!(patches[1].faces(), &[FaceId::new(2)]);
    }

    #[test]
    fn test_pinned_loop_lookup() {
        let mut mesh = test_meshes::quad_grid(2, 2);
        let patch = Patch::all(&mesh);
        let l = test_meshes::loop_at(&mesh, 3, 4);
        mesh.set_pinned(l, true);

        let patches = relax_patches(&mesh, &patch);
        let center = patches[0]
            .vertices()
            .iter()
            .find(|rv| rv.vertex == VertexId::new(4))
            .unwrap();
        assert_eq!(center.pinned_loop(&mesh), Some(l));
    }
}

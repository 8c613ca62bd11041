//! Patch topology normalization.
//!
//! A patch can only be laid out as a rectangle when its boundary is a single
//! closed loop. This module cuts open annular patches, seams UV-island
//! borders for corner overrides, and splits a face selection into connected
//! groups.

use std::collections::HashMap;

use log::debug;
use petgraph::unionfind::UnionFind;

use crate::mesh::{EdgeId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::boundary::boundary_components;
use super::geodesic::shortest_path;
use super::patch::Patch;

/// UV coordinates closer than this are considered the same point.
pub const UV_EPSILON: f64 = 1e-9;

/// Result of trying to cut an annular patch open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CylinderCut<I: MeshIndex = u32> {
    /// The boundary is not two closed loops; nothing was changed.
    NotCylinder,
    /// The listed edges, not seams before, were flagged as seams.
    Cut(Vec<EdgeId<I>>),
    /// The patch is annular but no path joins its boundary loops.
    Unreachable,
}

/// Detect an annular patch from its boundary loops and cut it open.
///
/// When the boundary edges form exactly two closed loops, the shortest edge
/// path from the first vertex of the first loop to the nearest vertex of the
/// second loop is walked inside the patch, and every edge on it becomes a
/// seam.
pub fn cut_cylinder<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    boundary: &[HalfEdgeId<I>],
) -> CylinderCut<I> {
    let components = boundary_components(mesh, boundary);
    if components.len() != 2 || !components.iter().all(|c| c.closed) {
        return CylinderCut::NotCylinder;
    }

    let source = components[0].vertices[0];
    let Some(path) = shortest_path(mesh, source, &components[1].vertices, patch) else {
        return CylinderCut::Unreachable;
    };

    let mut edges = Vec::with_capacity(path.len().saturating_sub(1));
    for pair in path.windows(2) {
        let Some(he) = mesh.find_halfedge(pair[0], pair[1]) else {
            return CylinderCut::Unreachable;
        };
        edges.push(mesh.edge_of(he));
    }
    if edges.is_empty() {
        return CylinderCut::Unreachable;
    }

    debug!("cut annular patch along {} edges", edges.len());
    edges.retain(|&e| !mesh.is_seam(e));
    for &e in &edges {
        mesh.set_seam(e, true);
    }
    CylinderCut::Cut(edges)
}

fn same_uv(a: nalgebra::Point2<f64>, b: nalgebra::Point2<f64>) -> bool {
    (a - b).norm_squared() <= UV_EPSILON * UV_EPSILON
}

/// Loops of `patch` lying on the border of a UV island.
///
/// A loop is on an island border when its edge is a mesh border, its twin
/// face is outside the patch, or the UVs on the two sides of the edge do not
/// meet.
pub fn uv_border_loops<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
) -> Vec<HalfEdgeId<I>> {
    patch
        .loops(mesh)
        .filter(|&l| {
            let e = mesh.edge_of(l);
            if mesh.is_boundary_edge(e) {
                return true;
            }
            let twin = mesh.twin(l);
            if !patch.contains(mesh.face_of(twin)) {
                return true;
            }
            !same_uv(mesh.uv(l), mesh.uv(mesh.next(twin)))
                || !same_uv(mesh.uv(mesh.next(l)), mesh.uv(twin))
        })
        .collect()
}

/// Flag every UV-island border edge of `patch` as a seam.
///
/// Returns the number of edges that were not seams before.
pub fn seam_uv_borders<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, patch: &Patch<I>) -> usize {
    let mut added = 0;
    for l in uv_border_loops(mesh, patch) {
        let e = mesh.edge_of(l);
        if !mesh.is_seam(e) {
            mesh.set_seam(e, true);
            added += 1;
        }
    }
    added
}

/// Split a face selection into edge-connected groups.
///
/// Faces are joined across every edge they share, except seam edges when
/// `use_seams` is set. Groups are ordered by their first face in the
/// selection, and each keeps the selection's face order.
pub fn group_faces<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    selection: &Patch<I>,
    use_seams: bool,
) -> Vec<Patch<I>> {
    let faces = selection.faces();
    let position: HashMap<_, usize> = faces.iter().enumerate().map(|(i, &f)| (f, i)).collect();

    let mut uf = UnionFind::<usize>::new(faces.len());
    for (i, &f) in faces.iter().enumerate() {
        for l in mesh.face_halfedges(f) {
            if use_seams && mesh.is_seam(mesh.edge_of(l)) {
                continue;
            }
            if let Some(&j) = position.get(&mesh.face_of(mesh.twin(l))) {
                uf.union(i, j);
            }
        }
    }

    let mut group_of_root: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<_>> = Vec::new();
    for (i, &f) in faces.iter().enumerate() {
        let root = uf.find_mut(i);
        let g = *group_of_root.entry(root).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[g].push(f);
    }

    groups.into_iter().map(Patch::from_unique).collect()
}

//! Rectangle corner selection.
//!
//! Corners are picked from a sorted boundary chain by how sharply the
//! boundary turns in UV space at each loop's vertex.

use std::f64::consts::{PI, TAU};

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::chain::BoundaryChain;

/// Default factor applied to the score of loops whose chain predecessor is
/// the previous loop of the same face.
pub const DEFAULT_CORNER_BIAS: f64 = 0.8;

/// Turning score of the chain loop at index `i`.
///
/// The score is `PI` plus the unsigned angle between the UV directions to
/// the previous and next chain vertices: a straight run scores `TAU`, a
/// right-angle turn `1.5 * PI` and a hairpin `PI`. The score is multiplied
/// by `bias` when the chain predecessor is `prev(l)` in the same face.
/// Coincident UVs score `TAU`.
pub fn corner_score<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    chain: &BoundaryChain<I>,
    i: usize,
    bias: f64,
) -> f64 {
    let n = chain.len();
    let l = chain.get(i);
    let prev = chain.get(i + n - 1);
    let next = chain.get(i + 1);

    let here = mesh.uv(l);
    let to_prev = (mesh.uv(prev) - here).try_normalize(f64::EPSILON);
    let to_next = (mesh.uv(next) - here).try_normalize(f64::EPSILON);

    let mut theta = match (to_prev, to_next) {
        (Some(v1), Some(v2)) => PI + v1.angle(&v2),
        _ => TAU,
    };
    if mesh.next(prev) == l {
        theta *= bias;
    }
    theta
}

/// Pick the four chain loops with the lowest turning score.
///
/// Ties keep chain order. The corners are returned in chain order, so the
/// first one is the corner met first when walking the chain. Returns `None`
/// for chains with fewer than four loops.
pub fn select_corners<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    chain: &BoundaryChain<I>,
    bias: f64,
) -> Option<[HalfEdgeId<I>; 4]> {
    if chain.len() < 4 {
        return None;
    }

    let mut scored: Vec<(f64, usize)> = (0..chain.len())
        .map(|i| (corner_score(mesh, chain, i, bias), i))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut picked = [scored[0].1, scored[1].1, scored[2].1, scored[3].1];
    picked.sort_unstable();
    Some(picked.map(|i| chain.get(i)))
}

//! Rectangular UV layout of face patches.
//!
//! [`rectangularize`] lays a disk-shaped patch out as an axis-aligned
//! rectangle. The boundary is cut open if the patch is a tube, sorted into a
//! single chain, split into four sides at four corners, and pinned at
//! arc-length positions along the rectangle. A conformal solve then places
//! the interior. [`conformal_relax`] runs the conformal solve alone.
//!
//! Patches that cannot be laid out are reported as
//! [`Outcome::Skipped`] rather than as errors, so a selection with several
//! groups is processed group by group.
//!
//! # Example
//!
//! ```
//! use rectuv::prelude::*;
//! use rectuv::algo::parameterize::{rectangularize, Outcome, RectangularizeOptions};
//! use nalgebra::Point3;
//!
//! let mut vertices = Vec::new();
//! for j in 0..=2 {
//!     for i in 0..=3 {
//!         vertices.push(Point3::new(i as f64, j as f64, 0.0));
//!     }
//! }
//! let mut faces = Vec::new();
//! for j in 0..2 {
//!     for i in 0..3 {
//!         let v = j * 4 + i;
//!         faces.push([v, v + 1, v + 5, v + 4]);
//!     }
//! }
//! let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &faces).unwrap();
//! let patch = Patch::all(&mesh);
//!
//! let outcome = rectangularize(&mut mesh, &patch, &RectangularizeOptions::default()).unwrap();
//! assert_eq!(outcome, Outcome::Applied);
//! ```

use std::collections::HashSet;
use std::fmt;

use log::{debug, warn};
use nalgebra::{Point2, Vector2};

use crate::algo::boundary::{boundary_loops, MIN_BOUNDARY_LOOPS};
use crate::algo::chain::{boundary_wedge, sort_boundary_chains, BoundaryChain};
use crate::algo::corners::{select_corners, DEFAULT_CORNER_BIAS};
use crate::algo::patch::Patch;
use crate::algo::topology::{cut_cylinder, group_faces, seam_uv_borders, CylinderCut};
use crate::error::{MeshError, Result};
use crate::mesh::{EdgeId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

use super::bounds::{fit_to_bounds, FitMode, UvBounds};
use super::lscm::{conformal_solve, AxisMode};
use super::lstsq::SolverOptions;
use super::relax::{relax_patches, RelaxPatch};

/// Sides shorter than this make a corner assignment degenerate.
const MIN_SIDE_LENGTH: f64 = 1e-12;

/// Options for [`rectangularize`].
#[derive(Debug, Clone)]
pub struct RectangularizeOptions<I: MeshIndex = u32> {
    /// Explicit corner loops. When set, corners are not detected and the
    /// patch is not checked for tube topology.
    pub corners: Option<[HalfEdgeId<I>; 4]>,

    /// Refit the result onto the patch's UV bounds from before the call.
    pub fit: Option<FitMode>,

    /// Score factor for boundary loops that turn inside a single face.
    pub corner_bias: f64,

    /// Least squares settings.
    pub solver: SolverOptions,
}

impl<I: MeshIndex> Default for RectangularizeOptions<I> {
    fn default() -> Self {
        Self {
            corners: None,
            fit: None,
            corner_bias: DEFAULT_CORNER_BIAS,
            solver: SolverOptions::default(),
        }
    }
}

impl<I: MeshIndex> RectangularizeOptions<I> {
    /// Use the given loops as rectangle corners.
    pub fn with_corners(mut self, corners: [HalfEdgeId<I>; 4]) -> Self {
        self.corners = Some(corners);
        self
    }

    /// Refit the result onto the original UV bounds.
    pub fn with_fit(mut self, mode: FitMode) -> Self {
        self.fit = Some(mode);
        self
    }

    /// Set the corner score bias.
    pub fn with_corner_bias(mut self, bias: f64) -> Self {
        self.corner_bias = bias;
        self
    }

    /// Set the least squares settings.
    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }
}

/// Options for [`conformal_relax`].
#[derive(Debug, Clone, Default)]
pub struct RelaxOptions {
    /// Which UV axes may change.
    pub axis: AxisMode,

    /// Refit the result onto the patch's UV bounds from before the call.
    pub fit: Option<FitMode>,

    /// Least squares settings.
    pub solver: SolverOptions,
}

impl RelaxOptions {
    /// Set the axis mode.
    pub fn with_axis(mut self, axis: AxisMode) -> Self {
        self.axis = axis;
        self
    }

    /// Refit the result onto the original UV bounds.
    pub fn with_fit(mut self, mode: FitMode) -> Self {
        self.fit = Some(mode);
        self
    }

    /// Set the least squares settings.
    pub fn with_solver(mut self, solver: SolverOptions) -> Self {
        self.solver = solver;
        self
    }
}

/// Why a patch was left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The patch has no faces.
    EmptyPatch,
    /// Fewer than four boundary loops.
    TooFewBoundaryLoops {
        /// Boundary loops found.
        found: usize,
    },
    /// The boundary does not form a single chain.
    NotDiskTopology {
        /// Number of boundary chains.
        loops: usize,
    },
    /// The boundary is a single chain but the patch is not a disk.
    HasHandles {
        /// Euler characteristic of the patch after cutting.
        euler_characteristic: isize,
    },
    /// The patch is a tube but no edge path joins its two borders.
    NoCylinderCut,
    /// The corner override names the same loop more than once.
    InvalidCornerOverride {
        /// Distinct corner loops given.
        found: usize,
    },
    /// A corner does not lie on the patch boundary.
    CornersNotOnBoundary,
    /// A side between two corners has no length.
    DegenerateCorners,
    /// No relaxation patch had enough unknowns or distinct pins to solve.
    NothingToSolve,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::EmptyPatch => write!(f, "patch has no faces"),
            SkipReason::TooFewBoundaryLoops { found } => {
                write!(f, "patch has {} boundary loops, at least 4 needed", found)
            }
            SkipReason::NotDiskTopology { loops } => {
                write!(f, "patch boundary forms {} chains instead of 1", loops)
            }
            SkipReason::HasHandles {
                euler_characteristic,
            } => write!(
                f,
                "patch has Euler characteristic {} instead of 1",
                euler_characteristic
            ),
            SkipReason::NoCylinderCut => write!(f, "no path joins the two borders of the tube"),
            SkipReason::InvalidCornerOverride { found } => {
                write!(f, "corner override has {} distinct loops, 4 needed", found)
            }
            SkipReason::CornersNotOnBoundary => write!(f, "corners are not on the patch boundary"),
            SkipReason::DegenerateCorners => write!(f, "corners leave a side of zero length"),
            SkipReason::NothingToSolve => {
                write!(f, "no relaxation patch has free unknowns and two distinct pins")
            }
        }
    }
}

/// Result of a per-patch UV operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// UVs were rewritten.
    Applied,
    /// The patch was left unchanged.
    Skipped(SkipReason),
}

impl Outcome {
    /// Check whether the operation changed the patch.
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

fn skipped(reason: SkipReason) -> Outcome {
    warn!("skipping patch: {}", reason);
    Outcome::Skipped(reason)
}

/// Pinned rectangle targets for a boundary chain.
#[derive(Debug, Clone)]
pub struct RectangleTargets<I: MeshIndex = u32> {
    /// Corners in chain order, starting at the first requested corner.
    pub corners: [HalfEdgeId<I>; 4],
    /// Rectangle size; the longer side is 1.
    pub size: Vector2<f64>,
    /// Every loop that was moved and pinned.
    pub pinned: Vec<HalfEdgeId<I>>,
}

/// Pin the boundary chain onto an axis-aligned rectangle.
///
/// `corners[0]` lands at the origin and the chain runs counter-clockwise
/// through the other corners in chain order. The rectangle's width is the
/// summed 3D length of the first and third sides, its height that of the
/// second and fourth, scaled so the longer one is 1. Loops between corners
/// are spaced by arc length. Every loop of each chain vertex's wedge is
/// moved and pinned, so the vertex stays continuous.
pub fn assign_rectangle_targets<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    chain: &BoundaryChain<I>,
    corners: &[HalfEdgeId<I>; 4],
) -> std::result::Result<RectangleTargets<I>, SkipReason> {
    let n = chain.len();
    let mut offsets = [0usize; 4];
    for (k, &c) in corners.iter().enumerate() {
        offsets[k] = chain.position(c).ok_or(SkipReason::CornersNotOnBoundary)?;
    }
    let start = offsets[0];
    for o in offsets.iter_mut() {
        *o = (*o + n - start) % n;
    }
    offsets.sort_unstable();
    if offsets.windows(2).any(|w| w[0] == w[1]) {
        return Err(SkipReason::DegenerateCorners);
    }

    let lengths: Vec<f64> = (0..n).map(|o| mesh.edge_length(chain.get(start + o))).collect();
    let side_of = |o: usize| offsets.iter().rposition(|&c| c <= o).unwrap_or(0);

    let mut sides = [0.0; 4];
    for (o, &len) in lengths.iter().enumerate() {
        sides[side_of(o)] += len;
    }
    if sides.iter().any(|&s| s <= MIN_SIDE_LENGTH) {
        return Err(SkipReason::DegenerateCorners);
    }

    let width = sides[0] + sides[2];
    let height = sides[1] + sides[3];
    let longest = width.max(height);
    let size = Vector2::new(width / longest, height / longest);

    // Travel per unit of 3D length along each side.
    let step = [
        Vector2::new(size.x / sides[0], 0.0),
        Vector2::new(0.0, size.y / sides[1]),
        Vector2::new(-size.x / sides[2], 0.0),
        Vector2::new(0.0, -size.y / sides[3]),
    ];

    let mut pinned = Vec::with_capacity(n);
    let mut position = Point2::origin();
    for (o, &len) in lengths.iter().enumerate() {
        for l in boundary_wedge(mesh, patch, chain.get(start + o)) {
            mesh.set_uv(l, position);
            mesh.set_pinned(l, true);
            pinned.push(l);
        }
        position += step[side_of(o)] * len;
    }

    Ok(RectangleTargets {
        corners: offsets.map(|o| chain.get(start + o)),
        size,
        pinned,
    })
}

/// Lay a patch out as an axis-aligned rectangle.
///
/// Every loop of the patch is unpinned first. Without a corner override,
/// a patch whose boundary is two closed loops is cut open along the
/// shortest edge path between them, a rough conformal layout is solved, and
/// the four sharpest boundary turns become the corners. With an override,
/// every UV-island border edge of the patch is seamed and the given loops
/// are matched to the boundary chain, by loop or else by vertex.
///
/// # Errors
///
/// Returns [`MeshError::InvalidHalfEdge`] for override corners that are not
/// face loops, [`MeshError::InvalidParameter`] for a non-positive corner
/// bias, and [`MeshError::BrokenChain`] if the sorted boundary is not
/// linked end to start.
pub fn rectangularize<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    options: &RectangularizeOptions<I>,
) -> Result<Outcome> {
    if !(options.corner_bias > 0.0) {
        return Err(MeshError::invalid_param(
            "corner_bias",
            options.corner_bias,
            "must be positive",
        ));
    }
    if patch.is_empty() {
        return Ok(skipped(SkipReason::EmptyPatch));
    }

    if let Some(corners) = &options.corners {
        for &c in corners {
            if c.index() >= mesh.num_halfedges() || mesh.is_boundary_halfedge(c) {
                return Err(MeshError::InvalidHalfEdge {
                    halfedge: c.index(),
                });
            }
        }
        let distinct: HashSet<_> = corners.iter().collect();
        if distinct.len() != 4 {
            return Ok(skipped(SkipReason::InvalidCornerOverride {
                found: distinct.len(),
            }));
        }
        if corners.iter().any(|&c| !patch.contains(mesh.face_of(c))) {
            return Ok(skipped(SkipReason::CornersNotOnBoundary));
        }
    }

    let mut boundary = boundary_loops(mesh, patch);
    if boundary.len() < MIN_BOUNDARY_LOOPS {
        return Ok(skipped(SkipReason::TooFewBoundaryLoops {
            found: boundary.len(),
        }));
    }

    let loops: Vec<_> = patch.loops(mesh).collect();
    for &l in &loops {
        mesh.set_pinned(l, false);
    }
    let initial = UvBounds::of_patch(mesh, patch);

    let mut cut = Vec::new();
    let reseamed = match options.corners {
        None => match cut_cylinder(mesh, patch, &boundary) {
            CylinderCut::NotCylinder => false,
            CylinderCut::Cut(edges) => {
                cut = edges;
                true
            }
            CylinderCut::Unreachable => return Ok(skipped(SkipReason::NoCylinderCut)),
        },
        Some(_) => {
            let added = seam_uv_borders(mesh, patch);
            debug!("seamed {} UV border edges", added);
            added > 0
        }
    };
    if reseamed {
        boundary = boundary_loops(mesh, patch);
        if boundary.len() < MIN_BOUNDARY_LOOPS {
            return Ok(skipped(SkipReason::TooFewBoundaryLoops {
                found: boundary.len(),
            }));
        }
    }

    let mut chains = sort_boundary_chains(mesh, patch, &boundary);
    if chains.len() != 1 {
        uncut(mesh, &cut);
        return Ok(skipped(SkipReason::NotDiskTopology {
            loops: chains.len(),
        }));
    }
    let euler = euler_characteristic(mesh, patch, boundary.len());
    if euler != 1 {
        uncut(mesh, &cut);
        return Ok(skipped(SkipReason::HasHandles {
            euler_characteristic: euler,
        }));
    }
    let chain = chains.remove(0);
    chain.validate(mesh)?;
    if chain.len() != boundary.len() {
        return Err(MeshError::BrokenChain {
            expected: boundary.len(),
            found: chain.len(),
        });
    }
    debug!("boundary chain of {} loops", chain.len());

    let corners = match &options.corners {
        Some(requested) => match resolve_corners(mesh, &chain, requested) {
            Some(corners) => corners,
            None => return Ok(skipped(SkipReason::CornersNotOnBoundary)),
        },
        None => {
            coarse_layout(mesh, patch, &chain, &options.solver)?;
            match select_corners(mesh, &chain, options.corner_bias) {
                Some(corners) => corners,
                None => {
                    return Ok(skipped(SkipReason::TooFewBoundaryLoops { found: chain.len() }))
                }
            }
        }
    };

    let targets = match assign_rectangle_targets(mesh, patch, &chain, &corners) {
        Ok(targets) => targets,
        Err(reason) => return Ok(skipped(reason)),
    };
    debug!(
        "pinned {} loops onto a {:.3} x {:.3} rectangle",
        targets.pinned.len(),
        targets.size.x,
        targets.size.y
    );

    let solved = conformal_solve(mesh, patch, AxisMode::Full, &options.solver);
    for &l in &targets.pinned {
        mesh.set_pinned(l, false);
    }
    solved?;

    if let Some(mode) = options.fit {
        fit_to_bounds(mesh, patch, &initial, mode);
    }

    Ok(Outcome::Applied)
}

/// Euler characteristic `V - E + F` of a patch, with vertices split along
/// seams and the patch border.
fn euler_characteristic<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    patch: &Patch<I>,
    boundary_len: usize,
) -> isize {
    let vertices: usize = relax_patches(mesh, patch)
        .iter()
        .map(RelaxPatch::num_vertices)
        .sum();
    let interior = patch.loops(mesh).count() - boundary_len;
    let edges = boundary_len + interior / 2;
    vertices as isize - edges as isize + patch.len() as isize
}

/// Clear the seams laid by a tube cut.
fn uncut<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>, edges: &[EdgeId<I>]) {
    for &e in edges {
        mesh.set_seam(e, false);
    }
}

/// Conformally relax a patch.
///
/// Pinned loops keep their UVs; see
/// [`conformal_solve`](super::conformal_solve) for how the remaining
/// unknowns are anchored.
pub fn conformal_relax<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    options: &RelaxOptions,
) -> Result<Outcome> {
    if patch.is_empty() {
        return Ok(skipped(SkipReason::EmptyPatch));
    }

    let initial = UvBounds::of_patch(mesh, patch);
    let summary = conformal_solve(mesh, patch, options.axis, &options.solver)?;
    debug!(
        "relaxed {} of {} relaxation patches",
        summary.solved, summary.patches
    );
    if summary.solved == 0 {
        return Ok(skipped(SkipReason::NothingToSolve));
    }

    if let Some(mode) = options.fit {
        fit_to_bounds(mesh, patch, &initial, mode);
    }

    Ok(Outcome::Applied)
}

/// Run [`rectangularize`] on every seam-separated group of a selection.
pub fn rectangularize_selection<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    selection: &Patch<I>,
    options: &RectangularizeOptions<I>,
) -> Result<Vec<Outcome>> {
    let groups = group_faces(mesh, selection, true);
    debug!("rectangularizing {} groups", groups.len());
    groups
        .iter()
        .map(|group| rectangularize(mesh, group, options))
        .collect()
}

/// Run [`conformal_relax`] on every seam-separated group of a selection.
pub fn conformal_relax_selection<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    selection: &Patch<I>,
    options: &RelaxOptions,
) -> Result<Vec<Outcome>> {
    let groups = group_faces(mesh, selection, true);
    groups
        .iter()
        .map(|group| conformal_relax(mesh, group, options))
        .collect()
}

/// Rough conformal layout used to measure boundary turns.
///
/// The first chain vertex is pinned at the origin and the middle one on the
/// U axis at their 3D distance.
fn coarse_layout<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    chain: &BoundaryChain<I>,
    solver: &SolverOptions,
) -> Result<()> {
    let first = chain.get(0);
    let origin = *mesh.position(mesh.origin(first));
    let distance_to = |l: HalfEdgeId<I>| (mesh.position(mesh.origin(l)) - origin).norm();

    // Both sides of a cut can land opposite each other; fall back to the
    // farthest chain vertex.
    let mut middle = chain.get(chain.len() / 2);
    if distance_to(middle) <= MIN_SIDE_LENGTH {
        if let Some(&far) = chain
            .loops()
            .iter()
            .max_by(|&&a, &&b| distance_to(a).total_cmp(&distance_to(b)))
        {
            middle = far;
        }
    }
    let distance = distance_to(middle);

    let mut pinned = Vec::new();
    for (l, uv) in [
        (first, Point2::origin()),
        (middle, Point2::new(distance, 0.0)),
    ] {
        for w in boundary_wedge(mesh, patch, l) {
            mesh.set_uv(w, uv);
            mesh.set_pinned(w, true);
            pinned.push(w);
        }
    }

    let solved = conformal_solve(mesh, patch, AxisMode::Full, solver);
    for l in pinned {
        mesh.set_pinned(l, false);
    }
    solved.map(|_| ())
}

/// Match requested corners to chain loops: the same loop, else a chain loop
/// starting at the same vertex.
fn resolve_corners<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    chain: &BoundaryChain<I>,
    requested: &[HalfEdgeId<I>; 4],
) -> Option<[HalfEdgeId<I>; 4]> {
    let mut resolved = *requested;
    for slot in resolved.iter_mut() {
        if chain.position(*slot).is_some() {
            continue;
        }
        let v = mesh.origin(*slot);
        *slot = chain.loops().iter().copied().find(|&l| mesh.origin(l) == v)?;
    }
    Some(resolved)
}

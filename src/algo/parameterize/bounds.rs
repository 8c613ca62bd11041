//! UV bounding boxes and refitting.
//!
//! After a solve the layout of a patch lives at an arbitrary scale and
//! position. [`fit_to_bounds`] maps it back onto the footprint the patch
//! had before the solve.

use nalgebra::{Point2, Vector2};

use crate::algo::patch::Patch;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

/// Extents at or below this are treated as degenerate.
pub const BOUNDS_EPSILON: f64 = 1e-6;

/// How the refitter scales a layout onto its target box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Scale each axis independently to fill the target box.
    #[default]
    Stretch,
    /// Scale both axes by the horizontal factor.
    Uniform,
}

/// An axis-aligned box in UV space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvBounds {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl UvBounds {
    /// The unit square `[0, 1] x [0, 1]`.
    pub fn unit() -> Self {
        Self {
            min: Point2::new(0.0, 0.0),
            max: Point2::new(1.0, 1.0),
        }
    }

    /// Bounding box of a set of points.
    ///
    /// Falls back to the unit square when there are no points or when the
    /// box is flat along either axis.
    pub fn from_points(points: impl IntoIterator<Item = Point2<f64>>) -> Self {
        let mut min = Point2::new(f64::INFINITY, f64::INFINITY);
        let mut max = Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        let bounds = Self { min, max };
        if bounds.width() <= BOUNDS_EPSILON
            || bounds.height() <= BOUNDS_EPSILON
            || !bounds.width().is_finite()
            || !bounds.height().is_finite()
        {
            return Self::unit();
        }
        bounds
    }

    /// Bounding box of the UVs of every loop in a patch.
    pub fn of_patch<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, patch: &Patch<I>) -> Self {
        Self::from_points(patch.loops(mesh).map(|l| mesh.uv(l)))
    }

    /// Extent along U.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Extent along V.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center point.
    #[inline]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Rescale and move the UVs of `patch` so their bounding box matches
/// `target`.
///
/// The current box is centered on the target's center and scaled by the
/// ratio of widths and heights, or by the width ratio alone in
/// [`FitMode::Uniform`].
pub fn fit_to_bounds<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    target: &UvBounds,
    mode: FitMode,
) {
    let current = UvBounds::of_patch(mesh, patch);
    let sx = target.width() / current.width();
    let sy = match mode {
        FitMode::Stretch => target.height() / current.height(),
        FitMode::Uniform => sx,
    };
    let scale = Vector2::new(sx, sy);
    let from = current.center();
    let to = target.center();

    let loops: Vec<_> = patch.loops(mesh).collect();
    for l in loops {
        let offset = (mesh.uv(l) - from).component_mul(&scale);
        mesh.set_uv(l, to + offset);
    }
}

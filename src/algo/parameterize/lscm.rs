//! Least Squares Conformal Maps (LSCM) on face loops.
//!
//! Every relaxation patch of the input is solved on its own. Each polygon is
//! fanned into triangles, and each triangle is laid flat from its three edge
//! lengths so only its shape enters the energy. With complex UVs `z = u + iv`
//! the conformal condition on a triangle is `w0 z0 + w1 z1 + w2 z2 = 0`,
//! where the `w` are the flattened opposite edges divided by twice the area.
//! Pinned unknowns move to the right-hand side and the remaining ones are
//! found by a sparse least squares solve.
//!
//! # References
//!
//! - Lévy, B., Petitjean, S., Ray, N., & Maillot, J. (2002). "Least squares
//!   conformal maps for automatic texture atlas generation." ACM SIGGRAPH.

use log::{debug, warn};
use nalgebra::{DVector, Point2, Point3};
use num_complex::Complex64;

use crate::algo::patch::Patch;
use crate::error::Result;
use crate::mesh::{HalfEdgeMesh, MeshIndex};

use super::lstsq::{solve_least_squares, SolverOptions};
use super::relax::{relax_patches, RelaxPatch};
use super::sparse::CsrMatrix;

/// Triangles whose flattened double area is below this fraction of their
/// squared perimeter are dropped from the system.
const DEGENERATE_AREA: f64 = 1e-12;

/// Pins closer than this are treated as coincident.
const PIN_EPSILON: f64 = 1e-12;

/// Which UV axes the solver may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisMode {
    /// Solve U and V together.
    #[default]
    Full,
    /// Keep every U value and solve V.
    ConstrainU,
    /// Keep every V value and solve U.
    ConstrainV,
}

/// Counts from a conformal solve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveSummary {
    /// Relaxation patches found in the input patch.
    pub patches: usize,
    /// Relaxation patches whose UVs were rewritten.
    pub solved: usize,
}

/// Conformally relax the UVs of every loop in `patch`.
///
/// Loops flagged as pinned keep their UVs. A relaxation patch with fewer
/// than two pinned unknowns is pinned at its first and last unknown, at
/// their current UVs. Patches with two or fewer unknowns, or whose explicit
/// pins all coincide, are left untouched.
///
/// # Example
///
/// ```
/// use rectuv::prelude::*;
/// use rectuv::algo::parameterize::{conformal_solve, AxisMode, SolverOptions};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mut mesh: HalfEdgeMesh = build_from_quads(&vertices, &[[0, 1, 2, 3]]).unwrap();
/// let patch = Patch::all(&mesh);
///
/// let summary = conformal_solve(&mut mesh, &patch, AxisMode::Full, &SolverOptions::default()).unwrap();
/// assert_eq!(summary.solved, 1);
/// ```
pub fn conformal_solve<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    patch: &Patch<I>,
    axis: AxisMode,
    options: &SolverOptions,
) -> Result<SolveSummary> {
    let patches = relax_patches(mesh, patch);
    let mut summary = SolveSummary {
        patches: patches.len(),
        solved: 0,
    };

    for relax in &patches {
        if solve_relax_patch(mesh, relax, axis, options)? {
            summary.solved += 1;
        }
    }

    Ok(summary)
}

/// Solve one relaxation patch. Returns `false` when it was left untouched.
fn solve_relax_patch<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    relax: &RelaxPatch<I>,
    axis: AxisMode,
    options: &SolverOptions,
) -> Result<bool> {
    let n = relax.num_vertices();
    if n <= 2 {
        debug!("skipping relaxation patch with {} unknowns", n);
        return Ok(false);
    }

    let positions: Vec<Point3<f64>> = relax
        .vertices()
        .iter()
        .map(|rv| *mesh.position(rv.vertex))
        .collect();
    let current: Vec<Point2<f64>> = relax
        .vertices()
        .iter()
        .map(|rv| mesh.uv(rv.loops[0]))
        .collect();

    let Some(pins) = select_pins(mesh, relax, axis, &positions, &current) else {
        warn!("pinned UVs of a relaxation patch coincide; leaving it unchanged");
        return Ok(false);
    };

    // Column of every free unknown.
    let mut column = vec![None; n];
    let mut free = Vec::with_capacity(n);
    for i in 0..n {
        if pins[i].is_none() {
            column[i] = Some(free.len());
            free.push(i);
        }
    }

    let weights: Vec<([usize; 3], [Complex64; 3])> = relax
        .triangles()
        .filter_map(|tri| {
            triangle_weights(&positions[tri[0]], &positions[tri[1]], &positions[tri[2]])
                .map(|w| (tri, w))
        })
        .collect();

    let rows = weights.len();
    let cols = free.len();
    debug!(
        "relaxation patch: {} unknowns, {} pinned, {} triangles",
        n,
        n - cols,
        rows
    );
    if cols == 0 || rows == 0 {
        scatter(mesh, relax, &pins, axis, &[]);
        return Ok(true);
    }

    // Row t holds the real part of triangle t's equation, row rows + t the
    // imaginary part. Full mode stores U in the first cols columns and V in
    // the rest; constrained modes only have the solved axis.
    let width = match axis {
        AxisMode::Full => 2 * cols,
        AxisMode::ConstrainU | AxisMode::ConstrainV => cols,
    };
    let mut triplets = Vec::with_capacity(rows * 12);
    let mut b = DVector::zeros(2 * rows);
    for (t, (tri, w)) in weights.iter().enumerate() {
        let mut rhs = Complex64::new(0.0, 0.0);
        for (&i, &wj) in tri.iter().zip(w.iter()) {
            match (column[i], pins[i]) {
                (Some(c), _) => match axis {
                    AxisMode::Full => {
                        triplets.push((t, c, wj.re));
                        triplets.push((t, cols + c, -wj.im));
                        triplets.push((rows + t, c, wj.im));
                        triplets.push((rows + t, cols + c, wj.re));
                    }
                    AxisMode::ConstrainV => {
                        // Known V: w u = -pinned - i w v.
                        rhs -= Complex64::i() * wj * current[i].y;
                        triplets.push((t, c, wj.re));
                        triplets.push((rows + t, c, wj.im));
                    }
                    AxisMode::ConstrainU => {
                        // Known U: i w v = -pinned - w u.
                        rhs -= wj * current[i].x;
                        triplets.push((t, c, -wj.im));
                        triplets.push((rows + t, c, wj.re));
                    }
                },
                (None, Some(p)) => rhs -= wj * Complex64::new(p.x, p.y),
                (None, None) => {}
            }
        }
        b[t] = rhs.re;
        b[rows + t] = rhs.im;
    }

    let a = CsrMatrix::from_triplets(2 * rows, width, triplets)?;
    let x = solve_least_squares(&a, &b, options)?;
    let solution: Vec<Point2<f64>> = free
        .iter()
        .enumerate()
        .map(|(c, &i)| match axis {
            AxisMode::Full => Point2::new(x[c], x[cols + c]),
            AxisMode::ConstrainV => Point2::new(x[c], current[i].y),
            AxisMode::ConstrainU => Point2::new(current[i].x, x[c]),
        })
        .collect();

    scatter(mesh, relax, &pins, axis, &solution);
    Ok(true)
}

/// Pinned UV per unknown.
///
/// Unknowns with a pinned member loop take that loop's UV. With fewer than
/// two of those, the first and last unknowns are pinned at their current
/// UVs. If those coincide they are spread apart by their 3D distance along
/// the solved axis, U in full mode; a constrained axis keeps its current
/// value. Returns `None` when explicit pins span no extent.
fn select_pins<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    relax: &RelaxPatch<I>,
    axis: AxisMode,
    positions: &[Point3<f64>],
    current: &[Point2<f64>],
) -> Option<Vec<Option<Point2<f64>>>> {
    let mut pins: Vec<Option<Point2<f64>>> = relax
        .vertices()
        .iter()
        .map(|rv| rv.pinned_loop(mesh).map(|l| mesh.uv(l)))
        .collect();

    let explicit: Vec<Point2<f64>> = pins.iter().flatten().copied().collect();
    if explicit.len() >= 2 {
        let first = explicit[0];
        let spread = explicit
            .iter()
            .any(|p| (p - first).norm() > PIN_EPSILON);
        return spread.then_some(pins);
    }

    let last = pins.len() - 1;
    pins.iter_mut().for_each(|p| *p = None);
    let (mut a, mut b) = (current[0], current[last]);
    if (b - a).norm() <= PIN_EPSILON {
        let d = (positions[last] - positions[0]).norm();
        let d = if d > PIN_EPSILON { d } else { 1.0 };
        match axis {
            AxisMode::Full => {
                a = Point2::origin();
                b = Point2::new(d, 0.0);
            }
            AxisMode::ConstrainV => {
                a.x = 0.0;
                b.x = d;
            }
            AxisMode::ConstrainU => {
                a.y = 0.0;
                b.y = d;
            }
        }
    }
    pins[0] = Some(a);
    pins[last] = Some(b);
    Some(pins)
}

/// Complex conformal weights of a triangle laid flat from its edge lengths.
///
/// Returns `None` for degenerate triangles.
fn triangle_weights(
    p0: &Point3<f64>,
    p1: &Point3<f64>,
    p2: &Point3<f64>,
) -> Option<[Complex64; 3]> {
    let l0 = (p2 - p1).norm();
    let l1 = (p0 - p2).norm();
    let l2 = (p1 - p0).norm();
    if l1 <= 0.0 || l2 <= 0.0 {
        return None;
    }

    let cos = ((l1 * l1 + l2 * l2 - l0 * l0) / (2.0 * l1 * l2)).clamp(-1.0, 1.0);
    let sin = (1.0 - cos * cos).sqrt();

    let q0 = Complex64::new(0.0, 0.0);
    let q1 = Complex64::new(l2, 0.0);
    let q2 = Complex64::new(l1 * cos, l1 * sin);

    let double_area = l2 * l1 * sin;
    let perimeter = l0 + l1 + l2;
    if double_area <= DEGENERATE_AREA * perimeter * perimeter {
        return None;
    }

    Some([
        (q2 - q1) / double_area,
        (q0 - q2) / double_area,
        (q1 - q0) / double_area,
    ])
}

/// Write solved UVs back to unpinned member loops.
///
/// Pinned unknowns write their pin value so every loop of the unknown
/// agrees. Constrained modes only touch the solved axis.
fn scatter<I: MeshIndex>(
    mesh: &mut HalfEdgeMesh<I>,
    relax: &RelaxPatch<I>,
    pins: &[Option<Point2<f64>>],
    axis: AxisMode,
    solution: &[Point2<f64>],
) {
    let mut solved = solution.iter();
    for (rv, pin) in relax.vertices().iter().zip(pins) {
        let value = match pin {
            Some(p) => *p,
            None => match solved.next() {
                Some(s) => *s,
                None => continue,
            },
        };
        for &l in &rv.loops {
            if mesh.is_pinned(l) {
                continue;
            }
            let old = mesh.uv(l);
            let uv = match axis {
                AxisMode::Full => value,
                AxisMode::ConstrainV => Point2::new(value.x, old.y),
                AxisMode::ConstrainU => Point2::new(old.x, value.y),
            };
            mesh.set_uv(l, uv);
        }
    }
}

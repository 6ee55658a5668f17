// fdtd_pml - Core kernels of a 3D FDTD electromagnetic solver
// Copyright (C) 2025

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! The face-, kind- and recursion-parameterised PML slab kernel
//!
//! Every absorbing update is the same three nested loops: map slab-local
//! indices to global Yee nodes, take a one-sided curl difference along the
//! grading axis, add a correction to the two tangential components and
//! advance the recursive-integration state. What varies between the two
//! dozen update variants is captured by three small type parameters
//! (face geometry, field kind, recursion law), so a single template
//! monomorphises into all of them.

use itertools::izip;
use scoped_threadpool::Pool;

use crate::arrays::{Array3, Array4};
use crate::helpers::ceil_div;
use crate::materials::CoeffTable;
use crate::Real;

use super::{RcProfiles, SlabBounds};

/// Orientation of a slab: grading axis and which end of it
pub(crate) trait FaceGeom: Copy + Send + Sync + 'static {
    /// Axis of the absorption grading (0 = x, 1 = y, 2 = z)
    const AXIS: usize;
    /// Slab sits at the low-coordinate end of its axis
    const LOW: bool;
}

macro_rules! face_geom {
    ($name:ident, $axis:expr, $low:expr) => {
        #[derive(Clone, Copy)]
        pub(crate) struct $name;
        impl FaceGeom for $name {
            const AXIS: usize = $axis;
            const LOW: bool = $low;
        }
    };
}

face_geom!(XMinusGeom, 0, true);
face_geom!(XPlusGeom, 0, false);
face_geom!(YMinusGeom, 1, true);
face_geom!(YPlusGeom, 1, false);
face_geom!(ZMinusGeom, 2, true);
face_geom!(ZPlusGeom, 2, false);

/// Field kind: direction of the curl difference and the half-node shift of
/// the minus-face index map (Yee staggering between E and H nodes)
pub(crate) trait FieldKind: Copy + Send + Sync + 'static {
    /// Backward difference along the grading axis (electric) vs forward
    /// (magnetic)
    const BACKWARD: bool;
    /// Minus-face normal map shift; E nodes sit one node further out than
    /// H nodes, so their map is `hi - l` instead of `hi - (l + 1)`
    const LOW_SHIFT: usize;
}

#[derive(Clone, Copy)]
pub(crate) struct Electric;
impl FieldKind for Electric {
    const BACKWARD: bool = true;
    const LOW_SHIFT: usize = 0;
}

#[derive(Clone, Copy)]
pub(crate) struct Magnetic;
impl FieldKind for Magnetic {
    const BACKWARD: bool = false;
    const LOW_SHIFT: usize = 1;
}

/// Global node index along the grading axis for slab-local index `l`
#[inline(always)]
fn normal_index<F: FaceGeom, K: FieldKind>(b: &SlabBounds, l: usize) -> usize {
    if F::LOW {
        b.hi(F::AXIS) - l - K::LOW_SHIFT
    } else {
        b.lo(F::AXIS) + l
    }
}

/// Neighbour node along the grading axis for the one-sided difference
#[inline(always)]
fn stencil_step<K: FieldKind>(g: usize) -> usize {
    if K::BACKWARD {
        g - 1
    } else {
        g + 1
    }
}

/// Recursive-integration law of one field kind at one order
///
/// `advance` returns the correction factor for the field update (computed
/// from the auxiliary state before this call) and advances the pole cells
/// in place, second pole strictly before the first.
pub(crate) trait Recursion: Copy + Send + Sync + 'static {
    const ORDER: usize;
    fn advance(p: &RcProfiles, q: usize, df: Real, pole0: &mut [Real], pole1: &mut [Real],
        t: usize) -> Real;
}

/// Higher-order law of the magnetic kernels, single pole
#[derive(Clone, Copy)]
pub(crate) struct Hori1;
impl Recursion for Hori1 {
    const ORDER: usize = 1;
    #[inline(always)]
    fn advance(p: &RcProfiles, q: usize, df: Real, pole0: &mut [Real], _pole1: &mut [Real],
        t: usize) -> Real {
        let phi = pole0[t];
        let corr = (p.ra(0, q) - 1.0) * df + p.rb(0, q) * phi;
        pole0[t] = p.re(0, q) * phi - p.rf(0, q) * df;
        corr
    }
}

/// Higher-order law of the magnetic kernels, two poles composed
/// multiplicatively
#[derive(Clone, Copy)]
pub(crate) struct Hori2;
impl Recursion for Hori2 {
    const ORDER: usize = 2;
    #[inline(always)]
    fn advance(p: &RcProfiles, q: usize, df: Real, pole0: &mut [Real], pole1: &mut [Real],
        t: usize) -> Real {
        let (ra0, ra1) = (p.ra(0, q), p.ra(1, q));
        let (rb0, rb1) = (p.rb(0, q), p.rb(1, q));
        let (phi0, phi1) = (pole0[t], pole1[t]);
        let corr = (ra0 * ra1 - 1.0) * df + ra1 * rb0 * phi0 + rb1 * phi1;
        // The second pole convolves the first pole's output, so it must
        // read the not-yet-advanced first pole.
        pole1[t] = p.re(1, q) * phi1 - p.rf(1, q) * (ra0 * df + rb0 * phi0);
        pole0[t] = p.re(0, q) * phi0 - p.rf(0, q) * df;
        corr
    }
}

/// Multipole law of the electric kernels, single pole, inverse-scaled
/// coefficients
#[derive(Clone, Copy)]
pub(crate) struct Mri1;
impl Recursion for Mri1 {
    const ORDER: usize = 1;
    #[inline(always)]
    fn advance(p: &RcProfiles, q: usize, df: Real, pole0: &mut [Real], _pole1: &mut [Real],
        t: usize) -> Real {
        let ira = 1.0 / p.ra(0, q);
        let phi = pole0[t];
        let corr = (ira - 1.0) * df - ira * phi;
        let rc0 = ira * p.rb(0, q) * p.rf(0, q);
        // Semi-implicit step: the subtracted term reuses the old state.
        pole0[t] = p.re(0, q) * phi + rc0 * df - rc0 * phi;
        corr
    }
}

/// Multipole law of the electric kernels, two poles composed additively
#[derive(Clone, Copy)]
pub(crate) struct Mri2;
impl Recursion for Mri2 {
    const ORDER: usize = 2;
    #[inline(always)]
    fn advance(p: &RcProfiles, q: usize, df: Real, pole0: &mut [Real], pole1: &mut [Real],
        t: usize) -> Real {
        let ira = 1.0 / (p.ra(0, q) + p.ra(1, q));
        let (phi0, phi1) = (pole0[t], pole1[t]);
        let psi = p.rb(0, q) * phi0 + p.rb(1, q) * phi1;
        let corr = (ira - 1.0) * df - ira * psi;
        pole1[t] = p.re(1, q) * phi1 + ira * p.rf(1, q) * (df - psi);
        pole0[t] = p.re(0, q) * phi0 + ira * p.rf(0, q) * (df - psi);
        corr
    }
}

/// Apply one absorbing half-step to the two tangential components of a slab
///
/// `fa`/`fb` are the written components, `ga`/`gb` the components whose
/// normal derivative drives them (`fa` pairs with `ga` and `phi1`, `fb`
/// with `gb` and `phi2`). `comp_a`/`comp_b` select the material ID rows,
/// `sign_a`/`sign_b` the curl signs of the face, `d` the spatial step along
/// the grading axis.
///
/// The outermost (x) loop of the slab is split into contiguous static
/// chunks across a transient worker pool; chunks map to disjoint whole
/// x-planes of the written fields and disjoint row blocks of the auxiliary
/// arrays, so workers never share a writable cell.
#[allow(clippy::too_many_arguments)]
pub(crate) fn slab_kernel<F: FaceGeom, K: FieldKind, R: Recursion>(
    b: &SlabBounds,
    num_threads: usize,
    coeffs: &CoeffTable,
    id: &Array4<u32>,
    comp_a: usize,
    comp_b: usize,
    sign_a: Real,
    sign_b: Real,
    fa: &mut Array3<Real>,
    fb: &mut Array3<Real>,
    ga: &Array3<Real>,
    gb: &Array3<Real>,
    phi1: &mut Array4<Real>,
    phi2: &mut Array4<Real>,
    prof: &RcProfiles,
    d: f64,
) {
    let (nx, ny, nz) = b.extents();
    let tile = ny * nz;
    let plane = fa.plane();
    let rd = (1.0 / d) as Real;
    debug_assert_eq!(phi1.dims(), (R::ORDER, nx, ny, nz));
    debug_assert_eq!(phi2.dims(), (R::ORDER, nx, ny, nz));

    // Written global x-plane range. Minus faces graded along x map local
    // rows onto planes in reverse order; everywhere else the map is the
    // identity shifted by the slab start.
    let reversed = F::AXIS == 0 && F::LOW;
    let (g0, g1) = if reversed {
        (b.xs + 1 - K::LOW_SHIFT, b.xf + 1 - K::LOW_SHIFT)
    } else {
        (b.xs, b.xf)
    };

    let fa_win = &mut fa.as_mut_slice()[g0 * plane..g1 * plane];
    let fb_win = &mut fb.as_mut_slice()[g0 * plane..g1 * plane];
    let (p1a, p1b) = phi1.as_mut_slice().split_at_mut(nx * tile);
    let (p2a, p2b) = phi2.as_mut_slice().split_at_mut(nx * tile);

    let num_threads = num_threads.max(1).min(nx);
    if num_threads < 2 {
        process_rows::<F, K, R>(b, 0, nx, g0, 0, prof, coeffs, id, comp_a, comp_b,
            sign_a, sign_b, fa_win, fb_win, ga, gb, p1a, p1b, p2a, p2b, rd);
        return;
    }

    // Size of chunk in numbers of x-planes / local rows
    let chunk_rows = ceil_div(nx, num_threads);
    let nchunks = ceil_div(nx, chunk_rows);
    let fa_ch: Vec<&mut [Real]> = fa_win.chunks_mut(chunk_rows * plane).collect();
    let fb_ch: Vec<&mut [Real]> = fb_win.chunks_mut(chunk_rows * plane).collect();
    // Ascending plane chunks pair with descending row chunks on reversed
    // faces; rchunks_mut yields exactly that order, short tail included.
    let p1a_ch = row_chunks(p1a, chunk_rows, tile, reversed, nchunks);
    let p1b_ch = row_chunks(p1b, chunk_rows, tile, reversed, nchunks);
    let p2a_ch = row_chunks(p2a, chunk_rows, tile, reversed, nchunks);
    let p2b_ch = row_chunks(p2b, chunk_rows, tile, reversed, nchunks);

    let mut pool = Pool::new(nchunks as u32);
    pool.scoped(|s| {
        for (c, fa_w, fb_w, p1a_w, p1b_w, p2a_w, p2b_w) in
            izip!(0..nchunks, fa_ch, fb_ch, p1a_ch, p1b_ch, p2a_ch, p2b_ch)
        {
            let rows = fa_w.len() / plane;
            let gfirst = g0 + c * chunk_rows;
            let lfirst = if reversed { nx - c * chunk_rows - rows } else { c * chunk_rows };
            s.execute(move || {
                process_rows::<F, K, R>(b, lfirst, lfirst + rows, gfirst, lfirst, prof,
                    coeffs, id, comp_a, comp_b, sign_a, sign_b, fa_w, fb_w, ga, gb,
                    p1a_w, p1b_w, p2a_w, p2b_w, rd);
            });
        }
    });
}

fn row_chunks<'a>(block: &'a mut [Real], rows: usize, tile: usize, reversed: bool,
    nchunks: usize) -> Vec<&'a mut [Real]> {
    if block.is_empty() {
        // First-order recursion: no second pole, hand every worker an
        // empty window.
        return (0..nchunks).map(|_| -> &'a mut [Real] { &mut [] }).collect();
    }
    if reversed {
        block.rchunks_mut(rows * tile).collect()
    } else {
        block.chunks_mut(rows * tile).collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn process_rows<F: FaceGeom, K: FieldKind, R: Recursion>(
    b: &SlabBounds,
    l0: usize,
    l1: usize,
    gfirst: usize,
    lfirst: usize,
    prof: &RcProfiles,
    coeffs: &CoeffTable,
    id: &Array4<u32>,
    comp_a: usize,
    comp_b: usize,
    sign_a: Real,
    sign_b: Real,
    fa: &mut [Real],
    fb: &mut [Real],
    ga: &Array3<Real>,
    gb: &Array3<Real>,
    p1a: &mut [Real],
    p1b: &mut [Real],
    p2a: &mut [Real],
    p2b: &mut [Real],
    rd: Real,
) {
    let (_, fd1, fd2) = ga.dims();
    let (ny, nz) = (b.yf - b.ys, b.zf - b.zs);
    for l in l0..l1 {
        let ii = if F::AXIS == 0 { normal_index::<F, K>(b, l) } else { b.xs + l };
        for j in 0..ny {
            let jj = if F::AXIS == 1 { normal_index::<F, K>(b, j) } else { b.ys + j };
            for k in 0..nz {
                let kk = if F::AXIS == 2 { normal_index::<F, K>(b, k) } else { b.zs + k };
                // Profile index along the grading axis, independent of the
                // face direction
                let q = match F::AXIS {
                    0 => l,
                    1 => j,
                    _ => k,
                };
                let (ni, nj, nk) = match F::AXIS {
                    0 => (stencil_step::<K>(ii), jj, kk),
                    1 => (ii, stencil_step::<K>(jj), kk),
                    _ => (ii, jj, stencil_step::<K>(kk)),
                };
                let (dfa, dfb) = if K::BACKWARD {
                    ((ga[(ii, jj, kk)] - ga[(ni, nj, nk)]) * rd,
                     (gb[(ii, jj, kk)] - gb[(ni, nj, nk)]) * rd)
                } else {
                    ((ga[(ni, nj, nk)] - ga[(ii, jj, kk)]) * rd,
                     (gb[(ni, nj, nk)] - gb[(ii, jj, kk)]) * rd)
                };
                let t = ((l - lfirst) * ny + j) * nz + k;
                let w = ((ii - gfirst) * fd1 + jj) * fd2 + kk;
                let ca = coeffs.curl_weight(id[(comp_a, ii, jj, kk)] as usize);
                let cb = coeffs.curl_weight(id[(comp_b, ii, jj, kk)] as usize);
                fa[w] += sign_a * ca * R::advance(prof, q, dfa, p1a, p1b, t);
                fb[w] += sign_b * cb * R::advance(prof, q, dfb, p2a, p2b, t);
            }
        }
    }
}

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

//! Complex-frequency-shifted PML absorbing boundaries
//!
//! Six axis-aligned slabs wrap the domain, one per face. Each slab applies
//! a recursive-integration correction to the two field components
//! tangential to its face, with absorption graded along the face normal.
//! The stretching function carries one or two poles and is integrated with
//! the higher-order recursive law on the magnetic half-step and with the
//! multipole law (inverse-scaled coefficients) on the electric half-step.
//! The bulk Yee update runs everywhere including the slabs; these kernels
//! only add the absorbing correction on top of it.

mod kernel;

use crate::arrays::Array4;
use crate::grid::{FieldState, EX, EY, EZ, HX, HY, HZ};
use crate::{Real, YeeGrid, EPS0, MU0};

use kernel::{slab_kernel, Electric, FaceGeom, Hori1, Hori2, Magnetic, Mri1, Mri2, Recursion,
    XMinusGeom, XPlusGeom, YMinusGeom, YPlusGeom, ZMinusGeom, ZPlusGeom};

/// The six faces of the domain a PML slab can be attached to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Face {
    XMinus,
    XPlus,
    YMinus,
    YPlus,
    ZMinus,
    ZPlus,
}

impl Face {
    pub const ALL: [Face; 6] =
        [Face::XMinus, Face::XPlus, Face::YMinus, Face::YPlus, Face::ZMinus, Face::ZPlus];

    /// Axis of the absorption grading (0 = x, 1 = y, 2 = z)
    pub fn axis(self) -> usize {
        match self {
            Face::XMinus | Face::XPlus => 0,
            Face::YMinus | Face::YPlus => 1,
            Face::ZMinus | Face::ZPlus => 2,
        }
    }

    /// Whether the slab sits at the low-coordinate end of its axis
    pub fn is_low(self) -> bool {
        matches!(self, Face::XMinus | Face::YMinus | Face::ZMinus)
    }
}

/// Axis-aligned cuboid region `[xs,xf) x [ys,yf) x [zs,zf)` in cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlabBounds {
    pub xs: usize,
    pub xf: usize,
    pub ys: usize,
    pub yf: usize,
    pub zs: usize,
    pub zf: usize,
}

impl SlabBounds {
    pub fn new(xs: usize, xf: usize, ys: usize, yf: usize, zs: usize, zf: usize) -> SlabBounds {
        if xf <= xs || yf <= ys || zf <= zs {
            panic!("Slab bounds must have positive extent in every direction");
        }
        SlabBounds { xs, xf, ys, yf, zs, zf }
    }

    /// Cell extents `(xf-xs, yf-ys, zf-zs)`
    pub fn extents(&self) -> (usize, usize, usize) {
        (self.xf - self.xs, self.yf - self.ys, self.zf - self.zs)
    }

    #[inline(always)]
    pub(crate) fn lo(&self, axis: usize) -> usize {
        match axis {
            0 => self.xs,
            1 => self.ys,
            _ => self.zs,
        }
    }

    #[inline(always)]
    pub(crate) fn hi(&self, axis: usize) -> usize {
        match axis {
            0 => self.xf,
            1 => self.yf,
            _ => self.zf,
        }
    }
}

/// Design parameters of one CFS pole
///
/// `alpha` is graded linearly from `alpha_max` at the interface with the
/// interior down to `alpha_min` at the outer boundary; `sigma` and `kappa`
/// are graded polynomially from nothing at the interface to their maxima at
/// the outer boundary. `sigma_max = None` selects the standard optimum
/// `0.8 (m+1) / (eta0 * d)`.
#[derive(Clone, Debug)]
pub struct CfsPole {
    pub alpha_min: f64,
    pub alpha_max: f64,
    pub kappa_max: f64,
    pub sigma_max: Option<f64>,
    /// Polynomial grading order
    pub m: f64,
}

impl CfsPole {
    /// Plain polynomially graded conductivity, no stretching, no shift
    pub fn standard() -> CfsPole {
        CfsPole { alpha_min: 0.0, alpha_max: 0.0, kappa_max: 1.0, sigma_max: None, m: 4.0 }
    }
}

/// Per-slab recursive-integration coefficient profiles RA, RB, RE, RF
///
/// One row of each coefficient per pole, indexed by the slab-local depth
/// along the grading axis; index 0 is the interface with the interior.
/// Frozen during stepping.
#[derive(Clone)]
pub struct RcProfiles {
    order: usize,
    n: usize,
    ra: Vec<Real>,
    rb: Vec<Real>,
    re: Vec<Real>,
    rf: Vec<Real>,
}

impl RcProfiles {
    /// Zeroed profiles for `order` poles over a slab `n` cells deep
    pub fn new(order: usize, n: usize) -> RcProfiles {
        assert!(order == 1 || order == 2, "PML recursion order must be 1 or 2");
        assert!(n > 0, "PML slab must be at least one cell deep");
        RcProfiles {
            order,
            n,
            ra: vec![0.0; order * n],
            rb: vec![0.0; order * n],
            re: vec![0.0; order * n],
            rf: vec![0.0; order * n],
        }
    }

    /// Profiles for the electric kernels of a slab, which integrate the
    /// multipole law with inverse-scaled coefficients
    pub fn build_electric(poles: &[CfsPole], n: usize, d: f64, dt: f64) -> RcProfiles {
        Self::build(poles, n, d, dt, 0.0, true)
    }

    /// Profiles for the magnetic kernels of a slab, which integrate the
    /// higher-order law (magnetic nodes sit half a cell deeper into the
    /// absorber than the electric nodes)
    pub fn build_magnetic(poles: &[CfsPole], n: usize, d: f64, dt: f64) -> RcProfiles {
        Self::build(poles, n, d, dt, 0.5, false)
    }

    fn build(poles: &[CfsPole], n: usize, d: f64, dt: f64, stagger: f64,
        multipole: bool) -> RcProfiles {
        let order = poles.len();
        let mut prof = RcProfiles::new(order, n);
        let eta0 = (MU0 / EPS0).sqrt();
        for (p, pole) in poles.iter().enumerate() {
            let smax = pole.sigma_max.unwrap_or(0.8 * (pole.m + 1.0) / (eta0 * d));
            for q in 0..n {
                let rho = (q as f64 + stagger) / n as f64;
                let grade = rho.powf(pole.m);
                let sigma = smax * grade;
                let kappa = 1.0 + (pole.kappa_max - 1.0) * grade;
                let alpha = pole.alpha_min + (pole.alpha_max - pole.alpha_min) * (1.0 - rho);
                let b = (-(sigma / kappa + alpha) * dt / EPS0).exp();
                let denom = sigma + kappa * alpha;
                let (ra, re, rf) = if multipole {
                    // The additive composition divides the stretch over the
                    // poles so that it stays 1 at the interface.
                    let rc = if denom > 0.0 { sigma * (1.0 - b) / denom } else { 0.0 };
                    (kappa / order as f64, b + rc, kappa * rc)
                } else {
                    let rf = if denom > 0.0 { sigma * (1.0 - b) / (kappa * denom) } else { 0.0 };
                    (1.0 / kappa, b, rf)
                };
                prof.set(p, q, ra as Real, 1.0, re as Real, rf as Real);
            }
        }
        prof
    }

    /// Overwrite the four coefficients of pole `p` at depth `q`
    pub fn set(&mut self, p: usize, q: usize, ra: Real, rb: Real, re: Real, rf: Real) {
        assert!(p < self.order && q < self.n, "profile index out of range");
        self.ra[p * self.n + q] = ra;
        self.rb[p * self.n + q] = rb;
        self.re[p * self.n + q] = re;
        self.rf[p * self.n + q] = rf;
    }

    /// Number of poles
    pub fn order(&self) -> usize {
        self.order
    }

    /// Slab depth the profiles are defined over
    pub fn depth(&self) -> usize {
        self.n
    }

    #[inline(always)]
    pub(crate) fn ra(&self, p: usize, q: usize) -> Real {
        self.ra[p * self.n + q]
    }

    #[inline(always)]
    pub(crate) fn rb(&self, p: usize, q: usize) -> Real {
        self.rb[p * self.n + q]
    }

    #[inline(always)]
    pub(crate) fn re(&self, p: usize, q: usize) -> Real {
        self.re[p * self.n + q]
    }

    #[inline(always)]
    pub(crate) fn rf(&self, p: usize, q: usize) -> Real {
        self.rf[p * self.n + q]
    }
}

/// One absorbing slab: bounds, coefficient profiles and the auxiliary
/// recursive-integration state for both field kinds
///
/// The slab owns its Phi arrays (zero-initialised, advanced in place once
/// per cell per half-step) and borrows the field state per call. Between
/// calls the Phi arrays carry the recursive-integration memory.
pub struct PmlSlab {
    face: Face,
    bounds: SlabBounds,
    order: usize,
    /// Spatial step along the grading axis
    d: f64,
    e_profiles: RcProfiles,
    h_profiles: RcProfiles,
    e_phi1: Array4<Real>,
    e_phi2: Array4<Real>,
    h_phi1: Array4<Real>,
    h_phi2: Array4<Real>,
}

impl PmlSlab {
    /// Create a slab on `face` covering `bounds`, with one CFS pole per
    /// entry of `poles` (one or two)
    pub fn new(face: Face, bounds: SlabBounds, poles: &[CfsPole], grid: &YeeGrid) -> PmlSlab {
        if poles.is_empty() || poles.len() > 2 {
            panic!("PML recursion order must be 1 or 2");
        }
        if bounds.xf > grid.nx || bounds.yf > grid.ny || bounds.zf > grid.nz {
            panic!("PML slab bounds exceed the grid");
        }
        let order = poles.len();
        let (nx, ny, nz) = bounds.extents();
        let depth = bounds.hi(face.axis()) - bounds.lo(face.axis());
        let d = grid.step(face.axis());
        PmlSlab {
            face,
            bounds,
            order,
            d,
            e_profiles: RcProfiles::build_electric(poles, depth, d, grid.dt),
            h_profiles: RcProfiles::build_magnetic(poles, depth, d, grid.dt),
            e_phi1: Array4::zeros(order, nx, ny, nz),
            e_phi2: Array4::zeros(order, nx, ny, nz),
            h_phi1: Array4::zeros(order, nx, ny, nz),
            h_phi2: Array4::zeros(order, nx, ny, nz),
        }
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn bounds(&self) -> SlabBounds {
        self.bounds
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Replace the built-in coefficient profiles
    pub fn set_profiles(&mut self, electric: RcProfiles, magnetic: RcProfiles) {
        let depth = self.bounds.hi(self.face.axis()) - self.bounds.lo(self.face.axis());
        assert!(electric.order() == self.order && magnetic.order() == self.order,
            "profile order does not match the slab");
        assert!(electric.depth() == depth && magnetic.depth() == depth,
            "profile depth does not match the slab");
        self.e_profiles = electric;
        self.h_profiles = magnetic;
    }

    /// Reset the auxiliary state to zero
    pub fn reset(&mut self) {
        self.e_phi1.fill_zero();
        self.e_phi2.fill_zero();
        self.h_phi1.fill_zero();
        self.h_phi2.fill_zero();
    }

    /// Apply the absorbing correction to the two tangential electric
    /// components of this slab
    pub fn update_electric(&mut self, f: &mut FieldState, num_threads: usize) {
        match self.face {
            Face::XMinus => self.electric_face::<XMinusGeom>(f, num_threads),
            Face::XPlus => self.electric_face::<XPlusGeom>(f, num_threads),
            Face::YMinus => self.electric_face::<YMinusGeom>(f, num_threads),
            Face::YPlus => self.electric_face::<YPlusGeom>(f, num_threads),
            Face::ZMinus => self.electric_face::<ZMinusGeom>(f, num_threads),
            Face::ZPlus => self.electric_face::<ZPlusGeom>(f, num_threads),
        }
    }

    /// Apply the absorbing correction to the two tangential magnetic
    /// components of this slab
    pub fn update_magnetic(&mut self, f: &mut FieldState, num_threads: usize) {
        match self.face {
            Face::XMinus => self.magnetic_face::<XMinusGeom>(f, num_threads),
            Face::XPlus => self.magnetic_face::<XPlusGeom>(f, num_threads),
            Face::YMinus => self.magnetic_face::<YMinusGeom>(f, num_threads),
            Face::YPlus => self.magnetic_face::<YPlusGeom>(f, num_threads),
            Face::ZMinus => self.magnetic_face::<ZMinusGeom>(f, num_threads),
            Face::ZPlus => self.magnetic_face::<ZPlusGeom>(f, num_threads),
        }
    }

    fn electric_face<F: FaceGeom>(&mut self, f: &mut FieldState, num_threads: usize) {
        // Electric kernels integrate the multipole law
        if self.order == 1 {
            self.electric_kernel::<F, Mri1>(f, num_threads)
        } else {
            self.electric_kernel::<F, Mri2>(f, num_threads)
        }
    }

    fn magnetic_face<F: FaceGeom>(&mut self, f: &mut FieldState, num_threads: usize) {
        // Magnetic kernels integrate the higher-order law
        if self.order == 1 {
            self.magnetic_kernel::<F, Hori1>(f, num_threads)
        } else {
            self.magnetic_kernel::<F, Hori2>(f, num_threads)
        }
    }

    fn electric_kernel<F: FaceGeom, R: Recursion>(&mut self, f: &mut FieldState,
        num_threads: usize) {
        let FieldState { ex, ey, ez, hx, hy, hz, id, coeffs_e, .. } = f;
        let b = self.bounds;
        match F::AXIS {
            0 => slab_kernel::<F, Electric, R>(&b, num_threads, coeffs_e, id, EY, EZ,
                -1.0, 1.0, ey, ez, hz, hy, &mut self.e_phi1, &mut self.e_phi2,
                &self.e_profiles, self.d),
            1 => slab_kernel::<F, Electric, R>(&b, num_threads, coeffs_e, id, EX, EZ,
                1.0, -1.0, ex, ez, hz, hx, &mut self.e_phi1, &mut self.e_phi2,
                &self.e_profiles, self.d),
            _ => slab_kernel::<F, Electric, R>(&b, num_threads, coeffs_e, id, EX, EY,
                -1.0, 1.0, ex, ey, hy, hx, &mut self.e_phi1, &mut self.e_phi2,
                &self.e_profiles, self.d),
        }
    }

    fn magnetic_kernel<F: FaceGeom, R: Recursion>(&mut self, f: &mut FieldState,
        num_threads: usize) {
        let FieldState { ex, ey, ez, hx, hy, hz, id, coeffs_h, .. } = f;
        let b = self.bounds;
        match F::AXIS {
            0 => slab_kernel::<F, Magnetic, R>(&b, num_threads, coeffs_h, id, HY, HZ,
                1.0, -1.0, hy, hz, ez, ey, &mut self.h_phi1, &mut self.h_phi2,
                &self.h_profiles, self.d),
            1 => slab_kernel::<F, Magnetic, R>(&b, num_threads, coeffs_h, id, HX, HZ,
                -1.0, 1.0, hx, hz, ez, ex, &mut self.h_phi1, &mut self.h_phi2,
                &self.h_profiles, self.d),
            _ => slab_kernel::<F, Magnetic, R>(&b, num_threads, coeffs_h, id, HX, HY,
                1.0, -1.0, hx, hy, ey, ex, &mut self.h_phi1, &mut self.h_phi2,
                &self.h_profiles, self.d),
        }
    }
}

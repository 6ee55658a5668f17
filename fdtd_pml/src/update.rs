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

//! Bulk-domain Yee update kernels
//!
//! These are the plain second-order curl stencils applied over the whole
//! grid, PML cells included; the PML slab kernels only augment the result
//! with their correction terms. Outer boundary nodes that would require
//! out-of-range reads are skipped and stay at zero (perfect electric
//! conductor behind the absorbing layers).

use crate::grid::{FieldState, EX, EY, EZ, HX, HY, HZ};
use crate::helpers::par_planes;

/// Advance all electric field components by one time step
pub fn update_electric(f: &mut FieldState, num_threads: usize) {
    let FieldState { ex, ey, ez, hx, hy, hz, id, coeffs_e, .. } = f;
    let (d0, d1, d2) = hx.dims();
    let (nx, ny, nz) = (d0 - 1, d1 - 1, d2 - 1);
    let plane = d1 * d2;

    par_planes(ex.as_mut_slice(), plane, 0, nx, num_threads, |first, last, win| {
        for i in first..last {
            for j in 1..ny {
                for k in 1..nz {
                    let c = coeffs_e.row(id[(EX, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[2] * (hz[(i, j, k)] - hz[(i, j - 1, k)])
                        - c[3] * (hy[(i, j, k)] - hy[(i, j, k - 1)]);
                }
            }
        }
    });
    par_planes(ey.as_mut_slice(), plane, 1, nx, num_threads, |first, last, win| {
        for i in first..last {
            for j in 0..ny {
                for k in 1..nz {
                    let c = coeffs_e.row(id[(EY, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[3] * (hx[(i, j, k)] - hx[(i, j, k - 1)])
                        - c[1] * (hz[(i, j, k)] - hz[(i - 1, j, k)]);
                }
            }
        }
    });
    par_planes(ez.as_mut_slice(), plane, 1, nx, num_threads, |first, last, win| {
        for i in first..last {
            for j in 1..ny {
                for k in 0..nz {
                    let c = coeffs_e.row(id[(EZ, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[1] * (hy[(i, j, k)] - hy[(i - 1, j, k)])
                        - c[2] * (hx[(i, j, k)] - hx[(i, j - 1, k)]);
                }
            }
        }
    });
}

/// Advance all magnetic field components by one time step
pub fn update_magnetic(f: &mut FieldState, num_threads: usize) {
    let FieldState { ex, ey, ez, hx, hy, hz, id, coeffs_h, .. } = f;
    let (d0, d1, d2) = ex.dims();
    let (nx, ny, nz) = (d0 - 1, d1 - 1, d2 - 1);
    let plane = d1 * d2;

    par_planes(hx.as_mut_slice(), plane, 0, nx + 1, num_threads, |first, last, win| {
        for i in first..last {
            for j in 0..ny {
                for k in 0..nz {
                    let c = coeffs_h.row(id[(HX, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[3] * (ey[(i, j, k + 1)] - ey[(i, j, k)])
                        - c[2] * (ez[(i, j + 1, k)] - ez[(i, j, k)]);
                }
            }
        }
    });
    par_planes(hy.as_mut_slice(), plane, 0, nx, num_threads, |first, last, win| {
        for i in first..last {
            for j in 0..ny + 1 {
                for k in 0..nz {
                    let c = coeffs_h.row(id[(HY, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[1] * (ez[(i + 1, j, k)] - ez[(i, j, k)])
                        - c[3] * (ex[(i, j, k + 1)] - ex[(i, j, k)]);
                }
            }
        }
    });
    par_planes(hz.as_mut_slice(), plane, 0, nx, num_threads, |first, last, win| {
        for i in first..last {
            for j in 0..ny {
                for k in 0..nz + 1 {
                    let c = coeffs_h.row(id[(HZ, i, j, k)] as usize);
                    let w = ((i - first) * d1 + j) * d2 + k;
                    win[w] = c[0] * win[w]
                        + c[2] * (ex[(i, j + 1, k)] - ex[(i, j, k)])
                        - c[1] * (ey[(i + 1, j, k)] - ey[(i, j, k)]);
                }
            }
        }
    });
}

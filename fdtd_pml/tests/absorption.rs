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

//! End-to-end absorption test: a Gaussian dipole in a PML-terminated vacuum
//! box must leave the domain without bouncing back.

use fdtd_pml::pml::{CfsPole, Face, PmlSlab, SlabBounds};
use fdtd_pml::{update_electric, update_magnetic, FieldState, Material, MaterialTable, Real,
    YeeGrid};

/// Domain size in cells
const N: usize = 40;
/// PML thickness in cells
const T: usize = 10;

fn build_slabs(grid: &YeeGrid, poles: &[CfsPole]) -> Vec<PmlSlab> {
    Face::ALL
        .iter()
        .map(|&face| {
            let b = match face {
                Face::XMinus => SlabBounds::new(0, T, 0, N, 0, N),
                Face::XPlus => SlabBounds::new(N - T, N, 0, N, 0, N),
                Face::YMinus => SlabBounds::new(0, N, 0, T, 0, N),
                Face::YPlus => SlabBounds::new(0, N, N - T, N, 0, N),
                Face::ZMinus => SlabBounds::new(0, N, 0, N, 0, T),
                Face::ZPlus => SlabBounds::new(0, N, 0, N, N - T, N),
            };
            PmlSlab::new(face, b, poles, grid)
        })
        .collect()
}

/// RMS of Ez over the interior part of the plane touching the x-minus slab
fn rms_inner_face(f: &FieldState) -> f64 {
    let mut acc = 0.0f64;
    let mut count = 0u32;
    for j in T..=N - T {
        for k in T..=N - T {
            let v = f.ez[(T, j, k)] as f64;
            acc += v * v;
            count += 1;
        }
    }
    (acc / count as f64).sqrt()
}

fn step_once(f: &mut FieldState, slabs: &mut [PmlSlab], num_threads: usize) {
    update_magnetic(f, num_threads);
    for s in slabs.iter_mut() {
        s.update_magnetic(f, num_threads);
    }
    update_electric(f, num_threads);
    for s in slabs.iter_mut() {
        s.update_electric(f, num_threads);
    }
}

#[test]
fn dipole_pulse_is_absorbed() {
    let grid = YeeGrid::new(N, N, N, 1e-3, 1e-3, 1e-3);
    let mut materials = MaterialTable::new();
    materials.add(Material::free_space());
    let mut f = FieldState::new(&grid, &materials);
    // Second-order recursion: a graded-conductivity pole plus a plain
    // second pole. No kappa stretching, which keeps the magnetic
    // (higher-order) and electric (multipole) half-steps matched.
    let poles = [
        CfsPole { alpha_min: 0.0, alpha_max: 0.0, kappa_max: 1.0, sigma_max: None, m: 3.0 },
        CfsPole { alpha_min: 0.0, alpha_max: 0.0, kappa_max: 1.0, sigma_max: Some(0.0), m: 3.0 },
    ];
    let mut slabs = build_slabs(&grid, &poles);

    let tau = 20.0 * grid.dt;
    let t0 = 3.0 * tau;
    let mut peak = 0.0f64;
    let mut last = 0.0f64;
    for step in 0..500 {
        step_once(&mut f, &mut slabs, 2);
        // z-directed Gaussian dipole in the centre of the box
        let t = (step as f64 + 1.0) * grid.dt;
        let w = (-((t - t0) / tau).powi(2)).exp();
        f.ez[(N / 2, N / 2, N / 2)] += w as Real;
        let rms = rms_inner_face(&f);
        if step < 200 {
            peak = peak.max(rms);
        }
        last = rms;
    }
    assert!(peak > 0.0, "pulse never reached the measurement plane");
    assert!(
        last < 1e-3 * peak,
        "residual RMS {:e} is not small against the transit peak {:e}",
        last,
        peak
    );
    for &v in f.ez.as_slice() {
        assert!((v as f64).is_finite());
    }
}

#[test]
fn full_time_stepping_is_deterministic_across_worker_counts() {
    let grid = YeeGrid::new(24, 24, 24, 1e-3, 1e-3, 1e-3);
    let mut materials = MaterialTable::new();
    materials.add(Material::free_space());
    let poles = [CfsPole { alpha_min: 0.0, alpha_max: 0.05, kappa_max: 4.0, sigma_max: None,
        m: 4.0 }];

    let run = |num_threads: usize| -> FieldState {
        let mut f = FieldState::new(&grid, &materials);
        let mut slabs: Vec<PmlSlab> = Face::ALL
            .iter()
            .map(|&face| {
                let b = match face {
                    Face::XMinus => SlabBounds::new(0, 6, 0, 24, 0, 24),
                    Face::XPlus => SlabBounds::new(18, 24, 0, 24, 0, 24),
                    Face::YMinus => SlabBounds::new(0, 24, 0, 6, 0, 24),
                    Face::YPlus => SlabBounds::new(0, 24, 18, 24, 0, 24),
                    Face::ZMinus => SlabBounds::new(0, 24, 0, 24, 0, 6),
                    Face::ZPlus => SlabBounds::new(0, 24, 0, 24, 18, 24),
                };
                PmlSlab::new(face, b, &poles, &grid)
            })
            .collect();
        for step in 0..50 {
            let t = (step as f64 + 1.0) * grid.dt;
            let w = (-((t - 30.0 * grid.dt) / (10.0 * grid.dt)).powi(2)).exp();
            f.ez[(12, 12, 12)] += w as Real;
            update_magnetic(&mut f, num_threads);
            for s in slabs.iter_mut() {
                s.update_magnetic(&mut f, num_threads);
            }
            update_electric(&mut f, num_threads);
            for s in slabs.iter_mut() {
                s.update_electric(&mut f, num_threads);
            }
        }
        f
    };
    let a = run(1);
    let b = run(3);
    assert_eq!(a.ex.as_slice(), b.ex.as_slice());
    assert_eq!(a.ey.as_slice(), b.ey.as_slice());
    assert_eq!(a.ez.as_slice(), b.ez.as_slice());
    assert_eq!(a.hx.as_slice(), b.hx.as_slice());
    assert_eq!(a.hy.as_slice(), b.hy.as_slice());
    assert_eq!(a.hz.as_slice(), b.hz.as_slice());
}

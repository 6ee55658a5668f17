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

//! Yee grid geometry and the field state container

use crate::arrays::{Array3, Array4};
use crate::materials::{CoeffTable, MaterialTable};
use crate::{Real, C0};

/// Component indices of the per-cell material ID array
pub const EX: usize = 0;
pub const EY: usize = 1;
pub const EZ: usize = 2;
pub const HX: usize = 3;
pub const HY: usize = 4;
pub const HZ: usize = 5;

/// Geometry of a regular 3D rectilinear Yee grid
///
/// `nx/ny/nz` count cells; field arrays carry one extra node per axis.
#[derive(Clone)]
pub struct YeeGrid {
    /// Number of cells in x
    pub nx: usize,
    /// Number of cells in y
    pub ny: usize,
    /// Number of cells in z
    pub nz: usize,
    /// Cell size in x (m)
    pub dx: f64,
    /// Cell size in y (m)
    pub dy: f64,
    /// Cell size in z (m)
    pub dz: f64,
    /// Time step (s)
    pub dt: f64,
}

impl YeeGrid {
    /// Create a grid with the time step at the 3D CFL limit
    pub fn new(nx: usize, ny: usize, nz: usize, dx: f64, dy: f64, dz: f64) -> YeeGrid {
        let dt = 1.0 / (C0 * (1.0 / (dx * dx) + 1.0 / (dy * dy) + 1.0 / (dz * dz)).sqrt());
        Self::with_dt(nx, ny, nz, dx, dy, dz, dt)
    }

    /// Create a grid with an explicit time step
    pub fn with_dt(nx: usize, ny: usize, nz: usize, dx: f64, dy: f64, dz: f64, dt: f64) -> YeeGrid {
        if nx == 0 || ny == 0 || nz == 0 {
            panic!("Must have at least one cell in every direction");
        }
        if dx <= 0.0 || dy <= 0.0 || dz <= 0.0 || dt <= 0.0 {
            panic!("Cell size and time step must be positive");
        }
        YeeGrid { nx, ny, nz, dx, dy, dz, dt }
    }

    /// Spatial step along one axis (0 = x, 1 = y, 2 = z)
    pub fn step(&self, axis: usize) -> f64 {
        match axis {
            0 => self.dx,
            1 => self.dy,
            _ => self.dz,
        }
    }
}

/// Owner of all field, material-ID and coefficient storage
///
/// The six field components live on staggered Yee nodes in dense arrays of
/// shape `(nx+1, ny+1, nz+1)`; `id` maps every component of every cell to a
/// row of the coefficient tables. Kernels borrow mutably exactly the
/// components they write and share the rest, which plain field borrows
/// already guarantee to be non-aliasing.
pub struct FieldState {
    pub ex: Array3<Real>,
    pub ey: Array3<Real>,
    pub ez: Array3<Real>,
    pub hx: Array3<Real>,
    pub hy: Array3<Real>,
    pub hz: Array3<Real>,
    /// Material IDs, one per field component per cell: `[6, nx+1, ny+1, nz+1]`
    pub id: Array4<u32>,
    /// Electric update coefficients, frozen after construction
    pub coeffs_e: CoeffTable,
    /// Magnetic update coefficients, frozen after construction
    pub coeffs_h: CoeffTable,
}

impl FieldState {
    /// Create zero-initialised fields with every cell set to material 0
    pub fn new(grid: &YeeGrid, materials: &MaterialTable) -> FieldState {
        let (d0, d1, d2) = (grid.nx + 1, grid.ny + 1, grid.nz + 1);
        FieldState {
            ex: Array3::zeros(d0, d1, d2),
            ey: Array3::zeros(d0, d1, d2),
            ez: Array3::zeros(d0, d1, d2),
            hx: Array3::zeros(d0, d1, d2),
            hy: Array3::zeros(d0, d1, d2),
            hz: Array3::zeros(d0, d1, d2),
            id: Array4::zeros(6, d0, d1, d2),
            coeffs_e: materials.electric_coefficients(grid),
            coeffs_h: materials.magnetic_coefficients(grid),
        }
    }

    /// Node dimensions of the field arrays
    pub fn dims(&self) -> (usize, usize, usize) {
        self.ex.dims()
    }
}

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

//! This crate contains the computational core of a 3D finite-difference
//! time-domain (FDTD) electromagnetic solver: the Yee-grid field state, the
//! bulk Maxwell update kernels, complex-frequency-shifted PML absorbing
//! boundaries (higher-order recursive integration on the magnetic
//! half-step, multipole on the electric half-step), and a spectral fractal
//! generator for heterogeneous material domains.
//!
//! Usage
//! -----
//! A time step is driven from outside by alternating magnetic and electric
//! half-steps, with the PML slabs augmenting the bulk update on each side:
//!
//! ```
//! # use fdtd_pml::{YeeGrid, FieldState, Material, MaterialTable};
//! # use fdtd_pml::pml::{PmlSlab, SlabBounds, Face, CfsPole};
//! let grid = YeeGrid::new(20, 20, 20, 1e-3, 1e-3, 1e-3);
//! let mut materials = MaterialTable::new();
//! materials.add(Material::free_space());
//! let mut fields = FieldState::new(&grid, &materials);
//! let mut pml = PmlSlab::new(Face::XMinus, SlabBounds::new(0, 6, 0, 20, 0, 20),
//!     &[CfsPole::standard()], &grid);
//! // One full time step with a single worker thread:
//! fdtd_pml::update_magnetic(&mut fields, 1);
//! pml.update_magnetic(&mut fields, 1);
//! fdtd_pml::update_electric(&mut fields, 1);
//! pml.update_electric(&mut fields, 1);
//! ```

pub mod arrays;
pub mod pml;
mod fractal;
mod grid;
mod helpers;
mod materials;
mod update;

pub use fractal::*;
pub use grid::*;
pub use materials::*;
pub use update::*;

/// Floating point type of all field arrays and coefficient tables.
///
/// Selected once at build time; the `single` feature switches the whole
/// solver core to `f32`.
#[cfg(feature = "single")]
pub type Real = f32;
/// Floating point type of all field arrays and coefficient tables.
///
/// Selected once at build time; the `single` feature switches the whole
/// solver core to `f32`.
#[cfg(not(feature = "single"))]
pub type Real = f64;

/// Vacuum permittivity (F/m)
pub const EPS0: f64 = 8.8541878128e-12;
/// Vacuum permeability (H/m)
pub const MU0: f64 = 1.25663706212e-6;
/// Speed of light in vacuum (m/s)
pub const C0: f64 = 299_792_458.0;

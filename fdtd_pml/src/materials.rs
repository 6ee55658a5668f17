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

//! Materials and their precomputed update coefficients

use crate::{Real, YeeGrid, EPS0, MU0};

/// Electromagnetic properties of one material
#[derive(Clone)]
pub struct Material {
    /// Relative permittivity
    pub er: f64,
    /// Electric conductivity (S/m)
    pub se: f64,
    /// Relative permeability
    pub mr: f64,
    /// Magnetic loss (Ohm/m)
    pub sm: f64,
}

impl Material {
    pub fn new(er: f64, se: f64, mr: f64, sm: f64) -> Material {
        Material { er, se, mr, sm }
    }

    /// Lossless vacuum
    pub fn free_space() -> Material {
        Material { er: 1.0, se: 0.0, mr: 1.0, sm: 0.0 }
    }
}

/// Per-material update coefficients, five per row
///
/// Row layout for the electric table is `[CA, CBx, CBy, CBz, CB]`: `CA`
/// multiplies the old field value, `CBa` the curl difference along axis `a`
/// (spatial step folded in), and `CB` (column 4) is the curl-scaled weight
/// without a spatial step, read by source injection and the PML kernels
/// which divide by the step themselves. The magnetic table mirrors this
/// with the permeability and magnetic loss.
pub struct CoeffTable {
    data: Vec<Real>,
}

impl CoeffTable {
    /// Coefficient row of material `m`
    #[inline(always)]
    pub fn row(&self, m: usize) -> &[Real] {
        &self.data[m * 5..m * 5 + 5]
    }

    /// Column 4 of material `m`
    #[inline(always)]
    pub fn curl_weight(&self, m: usize) -> Real {
        self.data[m * 5 + 4]
    }

    /// Number of material rows
    pub fn len(&self) -> usize {
        self.data.len() / 5
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Ordered collection of the materials present in a model
///
/// The index returned by [MaterialTable::add] is the value stored in the
/// per-cell ID array.
pub struct MaterialTable {
    materials: Vec<Material>,
}

impl MaterialTable {
    pub fn new() -> MaterialTable {
        MaterialTable { materials: Vec::new() }
    }

    /// Append a material, returning its ID
    pub fn add(&mut self, material: Material) -> u32 {
        self.materials.push(material);
        (self.materials.len() - 1) as u32
    }

    pub fn get(&self, id: u32) -> &Material {
        &self.materials[id as usize]
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Build the electric update-coefficient table for a grid
    pub fn electric_coefficients(&self, grid: &YeeGrid) -> CoeffTable {
        assert!(!self.materials.is_empty(), "material table is empty");
        let mut data = Vec::with_capacity(self.materials.len() * 5);
        for mat in &self.materials {
            let eps = mat.er * EPS0;
            let lam = mat.se * grid.dt / (2.0 * eps);
            let denom = 1.0 + lam;
            data.push(((1.0 - lam) / denom) as Real);
            data.push((grid.dt / (eps * grid.dx * denom)) as Real);
            data.push((grid.dt / (eps * grid.dy * denom)) as Real);
            data.push((grid.dt / (eps * grid.dz * denom)) as Real);
            data.push((grid.dt / (eps * denom)) as Real);
        }
        CoeffTable { data }
    }

    /// Build the magnetic update-coefficient table for a grid
    pub fn magnetic_coefficients(&self, grid: &YeeGrid) -> CoeffTable {
        assert!(!self.materials.is_empty(), "material table is empty");
        let mut data = Vec::with_capacity(self.materials.len() * 5);
        for mat in &self.materials {
            let mu = mat.mr * MU0;
            let lam = mat.sm * grid.dt / (2.0 * mu);
            let denom = 1.0 + lam;
            data.push(((1.0 - lam) / denom) as Real);
            data.push((grid.dt / (mu * grid.dx * denom)) as Real);
            data.push((grid.dt / (mu * grid.dy * denom)) as Real);
            data.push((grid.dt / (mu * grid.dz * denom)) as Real);
            data.push((grid.dt / (mu * denom)) as Real);
        }
        CoeffTable { data }
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn free_space_coefficients() {
        let grid = YeeGrid::new(4, 4, 4, 1e-3, 1e-3, 1e-3);
        let mut table = MaterialTable::new();
        table.add(Material::free_space());
        let ce = table.electric_coefficients(&grid);
        let row = ce.row(0);
        assert_relative_eq!(row[0] as f64, 1.0);
        assert_relative_eq!(row[1] as f64, grid.dt / (EPS0 * 1e-3), max_relative = 1e-12);
        assert_relative_eq!(ce.curl_weight(0) as f64, grid.dt / EPS0, max_relative = 1e-12);
    }

    #[test]
    fn lossy_material_decays_field() {
        let grid = YeeGrid::new(4, 4, 4, 1e-3, 1e-3, 1e-3);
        let mut table = MaterialTable::new();
        table.add(Material::new(4.0, 0.1, 1.0, 0.0));
        let ce = table.electric_coefficients(&grid);
        // CA < 1 for a conductive material
        assert!(ce.row(0)[0] < 1.0);
        assert!(ce.row(0)[0] > 0.0);
    }
}

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

//! Dense row-major array containers for field and auxiliary data
//!
//! All multi-dimensional data in the solver lives in flat vectors with the
//! last axis contiguous; these wrappers carry the shape and the index
//! arithmetic. Strides are never passed separately.

use std::ops::{Index, IndexMut};

use num_traits::Zero;

/// Dense 2D array (row-major, last axis contiguous)
#[derive(Clone)]
pub struct Array2<T> {
    data: Vec<T>,
    d0: usize,
    d1: usize,
}

impl<T: Zero + Clone> Array2<T> {
    pub fn zeros(d0: usize, d1: usize) -> Self {
        Array2 { data: vec![T::zero(); d0 * d1], d0, d1 }
    }
}

impl<T> Array2<T> {
    pub fn from_vec(d0: usize, d1: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), d0 * d1, "data length does not match shape");
        Array2 { data, d0, d1 }
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.d0, self.d1)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[i * self.d1 + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    #[inline(always)]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        &mut self.data[i * self.d1 + j]
    }
}

/// Dense 3D array (row-major, last axis contiguous)
#[derive(Clone)]
pub struct Array3<T> {
    data: Vec<T>,
    d0: usize,
    d1: usize,
    d2: usize,
}

impl<T: Zero + Clone> Array3<T> {
    pub fn zeros(d0: usize, d1: usize, d2: usize) -> Self {
        Array3 { data: vec![T::zero(); d0 * d1 * d2], d0, d1, d2 }
    }
}

impl<T> Array3<T> {
    pub fn from_vec(d0: usize, d1: usize, d2: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), d0 * d1 * d2, "data length does not match shape");
        Array3 { data, d0, d1, d2 }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.d0, self.d1, self.d2)
    }

    /// Number of elements in one plane of the slowest axis
    #[inline(always)]
    pub fn plane(&self) -> usize {
        self.d1 * self.d2
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T> Index<(usize, usize, usize)> for Array3<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, (i, j, k): (usize, usize, usize)) -> &T {
        &self.data[(i * self.d1 + j) * self.d2 + k]
    }
}

impl<T> IndexMut<(usize, usize, usize)> for Array3<T> {
    #[inline(always)]
    fn index_mut(&mut self, (i, j, k): (usize, usize, usize)) -> &mut T {
        &mut self.data[(i * self.d1 + j) * self.d2 + k]
    }
}

/// Dense 4D array (row-major, last axis contiguous)
///
/// The first axis selects a field component (material ID array) or a
/// recursion pole (PML auxiliary arrays); the remaining axes are spatial.
#[derive(Clone)]
pub struct Array4<T> {
    data: Vec<T>,
    d0: usize,
    d1: usize,
    d2: usize,
    d3: usize,
}

impl<T: Zero + Clone> Array4<T> {
    pub fn zeros(d0: usize, d1: usize, d2: usize, d3: usize) -> Self {
        Array4 { data: vec![T::zero(); d0 * d1 * d2 * d3], d0, d1, d2, d3 }
    }
}

impl<T> Array4<T> {
    pub fn dims(&self) -> (usize, usize, usize, usize) {
        (self.d0, self.d1, self.d2, self.d3)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T: Zero + Clone> Array4<T> {
    /// Reset all entries to zero, keeping the allocation
    pub fn fill_zero(&mut self) {
        for v in self.data.iter_mut() {
            *v = T::zero();
        }
    }
}

impl<T> Index<(usize, usize, usize, usize)> for Array4<T> {
    type Output = T;
    #[inline(always)]
    fn index(&self, (c, i, j, k): (usize, usize, usize, usize)) -> &T {
        &self.data[((c * self.d1 + i) * self.d2 + j) * self.d3 + k]
    }
}

impl<T> IndexMut<(usize, usize, usize, usize)> for Array4<T> {
    #[inline(always)]
    fn index_mut(&mut self, (c, i, j, k): (usize, usize, usize, usize)) -> &mut T {
        &mut self.data[((c * self.d1 + i) * self.d2 + j) * self.d3 + k]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array3_is_row_major_with_contiguous_last_axis() {
        let mut a = Array3::<f64>::zeros(2, 3, 4);
        a[(1, 2, 3)] = 5.0;
        a[(1, 2, 2)] = 4.0;
        assert_eq!(a.as_slice()[(1 * 3 + 2) * 4 + 3], 5.0);
        assert_eq!(a.as_slice()[(1 * 3 + 2) * 4 + 2], 4.0);
        assert_eq!(a.plane(), 12);
    }

    #[test]
    fn array4_component_axis_is_slowest() {
        let mut a = Array4::<u32>::zeros(6, 2, 2, 2);
        a[(5, 1, 1, 1)] = 7;
        assert_eq!(*a.as_slice().last().unwrap(), 7);
        a.fill_zero();
        assert!(a.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    #[should_panic]
    fn array2_from_vec_checks_shape() {
        Array2::from_vec(2, 3, vec![0.0f64; 5]);
    }
}

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

//! Fractal fields for heterogeneous material domains
//!
//! Scale-invariant random media are synthesised in reciprocal space: a
//! complex random spectrum is divided by `r^D`, where `r` is the distance
//! from a configurable centre in the FFT-origin-centred frequency box and
//! `D` the fractal dimension, then transformed back and rescaled. The
//! spectrum kernels can address a sub-region of a larger wrapped spectrum,
//! which keeps distributed geometry construction consistent with the
//! single-box result.

use num_complex::{Complex, Complex64};
use num_traits::Zero;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustfft::FftPlanner;

use crate::arrays::{Array2, Array3};
use crate::helpers::par_planes;
use crate::Real;

/// Weight a 2D complex spectrum by the inverse power law `1 / r^D`
///
/// `a` is the random spectrum of the `out`-sized sub-region whose origin
/// sits at `offset` inside a wrapped global spectrum of size `global`;
/// `centre` is the (weighting-scaled) point the distance is measured from.
/// The cell that lands on the centre is regularised with the fixed
/// denominator 0.9 instead of dividing by zero.
pub fn generate_fractal_2d(
    offset: [usize; 2],
    global: [usize; 2],
    num_threads: usize,
    fractal_dim: f64,
    weighting: [f64; 2],
    centre: [f64; 2],
    a: &Array2<Complex64>,
    out: &mut Array2<Complex<Real>>,
) {
    let (nx, ny) = out.dims();
    assert_eq!(a.dims(), (nx, ny), "spectrum and output shapes differ");
    assert!(global[0] > 0 && global[1] > 0, "global size must be positive");
    par_planes(out.as_mut_slice(), ny, 0, nx, num_threads, |first, last, win| {
        for i in first..last {
            let v2x = weighting[0] * (((i + offset[0] + global[0] / 2) % global[0]) as f64);
            for j in 0..ny {
                let v2y = weighting[1] * (((j + offset[1] + global[1] / 2) % global[1]) as f64);
                let r = ((v2x - centre[0]).powi(2) + (v2y - centre[1]).powi(2)).sqrt();
                let mut b = r.powf(fractal_dim);
                if b == 0.0 {
                    b = 0.9;
                }
                let v = a[(i, j)] / b;
                win[(i - first) * ny + j] = Complex::new(v.re as Real, v.im as Real);
            }
        }
    });
}

/// Weight a 3D complex spectrum by the inverse power law `1 / r^D`
///
/// Volume counterpart of [generate_fractal_2d].
pub fn generate_fractal_3d(
    offset: [usize; 3],
    global: [usize; 3],
    num_threads: usize,
    fractal_dim: f64,
    weighting: [f64; 3],
    centre: [f64; 3],
    a: &Array3<Complex64>,
    out: &mut Array3<Complex<Real>>,
) {
    let (nx, ny, nz) = out.dims();
    assert_eq!(a.dims(), (nx, ny, nz), "spectrum and output shapes differ");
    assert!(global[0] > 0 && global[1] > 0 && global[2] > 0, "global size must be positive");
    let plane = ny * nz;
    par_planes(out.as_mut_slice(), plane, 0, nx, num_threads, |first, last, win| {
        for i in first..last {
            let v2x = weighting[0] * (((i + offset[0] + global[0] / 2) % global[0]) as f64);
            for j in 0..ny {
                let v2y = weighting[1] * (((j + offset[1] + global[1] / 2) % global[1]) as f64);
                for k in 0..nz {
                    let v2z =
                        weighting[2] * (((k + offset[2] + global[2] / 2) % global[2]) as f64);
                    let r = ((v2x - centre[0]).powi(2)
                        + (v2y - centre[1]).powi(2)
                        + (v2z - centre[2]).powi(2))
                    .sqrt();
                    let mut b = r.powf(fractal_dim);
                    if b == 0.0 {
                        b = 0.9;
                    }
                    let v = a[(i, j, k)] / b;
                    win[((i - first) * ny + j) * nz + k] =
                        Complex::new(v.re as Real, v.im as Real);
                }
            }
        }
    });
}

/// In-place inverse DFT over both axes, with the 1/N normalisation applied
pub fn inverse_fft_2d(field: &mut Array2<Complex<Real>>) {
    let (nx, ny) = field.dims();
    let data = field.as_mut_slice();
    let mut planner = FftPlanner::<Real>::new();
    // Rows are contiguous
    let fft_y = planner.plan_fft_inverse(ny);
    let mut scratch: Vec<Complex<Real>> = vec![Complex::zero(); fft_y.get_inplace_scratch_len()];
    for row in data.chunks_mut(ny) {
        fft_y.process_with_scratch(row, &mut scratch);
    }
    // Columns are gathered into a scratch line
    let fft_x = planner.plan_fft_inverse(nx);
    let mut scratch: Vec<Complex<Real>> = vec![Complex::zero(); fft_x.get_inplace_scratch_len()];
    let mut line: Vec<Complex<Real>> = vec![Complex::zero(); nx];
    for j in 0..ny {
        for i in 0..nx {
            line[i] = data[i * ny + j];
        }
        fft_x.process_with_scratch(&mut line, &mut scratch);
        for i in 0..nx {
            data[i * ny + j] = line[i];
        }
    }
    let norm = (1.0 / (nx as f64 * ny as f64)) as Real;
    for v in data.iter_mut() {
        *v = *v * norm;
    }
}

/// In-place inverse DFT over all three axes, with the 1/N normalisation
/// applied
pub fn inverse_fft_3d(field: &mut Array3<Complex<Real>>) {
    let (nx, ny, nz) = field.dims();
    let data = field.as_mut_slice();
    let mut planner = FftPlanner::<Real>::new();
    // z lines are contiguous
    let fft_z = planner.plan_fft_inverse(nz);
    let mut scratch: Vec<Complex<Real>> = vec![Complex::zero(); fft_z.get_inplace_scratch_len()];
    for line in data.chunks_mut(nz) {
        fft_z.process_with_scratch(line, &mut scratch);
    }
    // y lines, strided by nz
    let fft_y = planner.plan_fft_inverse(ny);
    let mut scratch: Vec<Complex<Real>> = vec![Complex::zero(); fft_y.get_inplace_scratch_len()];
    let mut line: Vec<Complex<Real>> = vec![Complex::zero(); ny];
    for i in 0..nx {
        for k in 0..nz {
            for j in 0..ny {
                line[j] = data[(i * ny + j) * nz + k];
            }
            fft_y.process_with_scratch(&mut line, &mut scratch);
            for j in 0..ny {
                data[(i * ny + j) * nz + k] = line[j];
            }
        }
    }
    // x lines, strided by ny*nz
    let fft_x = planner.plan_fft_inverse(nx);
    let mut scratch: Vec<Complex<Real>> = vec![Complex::zero(); fft_x.get_inplace_scratch_len()];
    let mut line: Vec<Complex<Real>> = vec![Complex::zero(); nx];
    for j in 0..ny {
        for k in 0..nz {
            for i in 0..nx {
                line[i] = data[(i * ny + j) * nz + k];
            }
            fft_x.process_with_scratch(&mut line, &mut scratch);
            for i in 0..nx {
                data[(i * ny + j) * nz + k] = line[i];
            }
        }
    }
    let norm = (1.0 / (nx as f64 * ny as f64 * nz as f64)) as Real;
    for v in data.iter_mut() {
        *v = *v * norm;
    }
}

/// Min-max rescale of `values` into `range`, written to `out`
fn rescale<I>(values: I, out: &mut [Real], range: (Real, Real))
where
    I: Iterator<Item = Real> + Clone,
{
    let mut lo = Real::INFINITY;
    let mut hi = Real::NEG_INFINITY;
    for v in values.clone() {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    let span = hi - lo;
    if span == 0.0 {
        for o in out.iter_mut() {
            *o = range.0;
        }
        return;
    }
    let scale = (range.1 - range.0) / span;
    for (o, v) in out.iter_mut().zip(values) {
        *o = range.0 + (v - lo) * scale;
    }
}

/// A rough surface synthesised from a seeded random spectrum
pub struct FractalSurface {
    /// Fractal dimension of the weighting law
    pub dimension: f64,
    /// Per-axis scaling of the frequency coordinates
    pub weighting: [f64; 2],
    /// Seed of the random spectrum
    pub seed: u64,
    data: Array2<Real>,
}

impl FractalSurface {
    pub fn new(nx: usize, ny: usize, dimension: f64, weighting: [f64; 2],
        seed: u64) -> FractalSurface {
        if nx == 0 || ny == 0 {
            panic!("Fractal surface must have at least one cell in every direction");
        }
        FractalSurface { dimension, weighting, seed, data: Array2::zeros(nx, ny) }
    }

    /// Synthesise the surface heights, min-max rescaled into `range`
    pub fn generate(&mut self, range: (Real, Real), num_threads: usize) {
        let (nx, ny) = self.data.dims();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let spectrum_in = Array2::from_vec(nx, ny,
            (0..nx * ny).map(|_| unit_phase(&mut rng)).collect());
        let centre =
            [self.weighting[0] * nx as f64 / 2.0, self.weighting[1] * ny as f64 / 2.0];
        let mut spectrum: Array2<Complex<Real>> = Array2::zeros(nx, ny);
        generate_fractal_2d([0, 0], [nx, ny], num_threads, self.dimension, self.weighting,
            centre, &spectrum_in, &mut spectrum);
        inverse_fft_2d(&mut spectrum);
        rescale(spectrum.as_slice().iter().map(|c| c.re), self.data.as_mut_slice(), range);
    }

    /// Synthesised heights; zeros before the first [FractalSurface::generate]
    pub fn data(&self) -> &Array2<Real> {
        &self.data
    }
}

/// A heterogeneous volume synthesised from a seeded random spectrum
pub struct FractalVolume {
    /// Fractal dimension of the weighting law
    pub dimension: f64,
    /// Per-axis scaling of the frequency coordinates
    pub weighting: [f64; 3],
    /// Seed of the random spectrum
    pub seed: u64,
    data: Array3<Real>,
}

impl FractalVolume {
    pub fn new(nx: usize, ny: usize, nz: usize, dimension: f64, weighting: [f64; 3],
        seed: u64) -> FractalVolume {
        if nx == 0 || ny == 0 || nz == 0 {
            panic!("Fractal volume must have at least one cell in every direction");
        }
        FractalVolume { dimension, weighting, seed, data: Array3::zeros(nx, ny, nz) }
    }

    /// Synthesise the volume intensities, min-max rescaled into `range`
    pub fn generate(&mut self, range: (Real, Real), num_threads: usize) {
        let (nx, ny, nz) = self.data.dims();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let spectrum_in = Array3::from_vec(nx, ny, nz,
            (0..nx * ny * nz).map(|_| unit_phase(&mut rng)).collect());
        let centre = [
            self.weighting[0] * nx as f64 / 2.0,
            self.weighting[1] * ny as f64 / 2.0,
            self.weighting[2] * nz as f64 / 2.0,
        ];
        let mut spectrum: Array3<Complex<Real>> = Array3::zeros(nx, ny, nz);
        generate_fractal_3d([0, 0, 0], [nx, ny, nz], num_threads, self.dimension,
            self.weighting, centre, &spectrum_in, &mut spectrum);
        inverse_fft_3d(&mut spectrum);
        rescale(spectrum.as_slice().iter().map(|c| c.re), self.data.as_mut_slice(), range);
    }

    /// Synthesised intensities; zeros before the first [FractalVolume::generate]
    pub fn data(&self) -> &Array3<Real> {
        &self.data
    }
}

fn unit_phase(rng: &mut StdRng) -> Complex64 {
    Complex64::from_polar(1.0, 2.0 * std::f64::consts::PI * rng.gen::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn dc_bin_is_regularised() {
        // With centre = weighting * global/2 the wrapped coordinate lands
        // on the centre at index 0
        let a = Array2::from_vec(4, 4, vec![Complex64::new(1.0, 0.0); 16]);
        let mut out: Array2<Complex<Real>> = Array2::zeros(4, 4);
        generate_fractal_2d([0, 0], [4, 4], 1, 2.5, [1.0, 1.0], [2.0, 2.0], &a, &mut out);
        assert_relative_eq!(out[(0, 0)].re as f64, 1.0 / 0.9, max_relative = 1e-6);
        // The cell diagonally opposite the centre sits at distance sqrt(8)
        let expect = 1.0 / 8f64.sqrt().powf(2.5);
        assert_relative_eq!(out[(2, 2)].re as f64, expect, max_relative = 1e-6);
        for v in out.as_slice() {
            assert!(v.re.is_finite() && v.im.is_finite());
        }
    }

    #[test]
    fn volume_spectrum_is_finite_everywhere() {
        let n = 8;
        let a = Array3::from_vec(n, n, n, vec![Complex64::new(1.0, 0.0); n * n * n]);
        let mut out: Array3<Complex<Real>> = Array3::zeros(n, n, n);
        generate_fractal_3d([0, 0, 0], [n, n, n], 2, 3.2, [1.0, 1.0, 1.0],
            [n as f64 / 2.0, n as f64 / 2.0, n as f64 / 2.0], &a, &mut out);
        for v in out.as_slice() {
            assert!(v.re.is_finite() && v.im.is_finite());
        }
    }

    #[test]
    fn sub_region_matches_global_spectrum() {
        // Generating the lower half of a wrapped spectrum must agree with
        // the corresponding rows of the full generation
        let a_full = Array2::from_vec(8, 8, (0..64)
            .map(|i| Complex64::new(1.0 + i as f64, 0.5 * i as f64))
            .collect::<Vec<_>>());
        let mut full: Array2<Complex<Real>> = Array2::zeros(8, 8);
        generate_fractal_2d([0, 0], [8, 8], 1, 1.8, [1.0, 2.0], [4.0, 8.0], &a_full, &mut full);

        let a_half = Array2::from_vec(4, 8,
            a_full.as_slice()[4 * 8..].to_vec());
        let mut half: Array2<Complex<Real>> = Array2::zeros(4, 8);
        generate_fractal_2d([4, 0], [8, 8], 1, 1.8, [1.0, 2.0], [4.0, 8.0], &a_half, &mut half);
        assert_eq!(&full.as_slice()[4 * 8..], half.as_slice());
    }

    #[test]
    fn inverse_fft_of_pure_dc_is_constant() {
        let mut f: Array2<Complex<Real>> = Array2::zeros(4, 6);
        f[(0, 0)] = Complex::new(24.0, 0.0);
        inverse_fft_2d(&mut f);
        for v in f.as_slice() {
            assert_relative_eq!(v.re, 1.0, max_relative = 1e-6);
            assert_relative_eq!(v.im, 0.0, epsilon = 1e-6);
        }
        let mut f: Array3<Complex<Real>> = Array3::zeros(3, 4, 5);
        f[(0, 0, 0)] = Complex::new(60.0, 0.0);
        inverse_fft_3d(&mut f);
        for v in f.as_slice() {
            assert_relative_eq!(v.re, 1.0, max_relative = 1e-6);
        }
    }

    #[test]
    fn volume_generation_is_seeded_and_bounded() {
        let mut v1 = FractalVolume::new(8, 6, 5, 2.7, [1.0, 1.0, 1.0], 42);
        v1.generate((1.0, 9.0), 2);
        let mut v2 = FractalVolume::new(8, 6, 5, 2.7, [1.0, 1.0, 1.0], 42);
        v2.generate((1.0, 9.0), 1);
        assert_eq!(v1.data().as_slice(), v2.data().as_slice());
        let mut v3 = FractalVolume::new(8, 6, 5, 2.7, [1.0, 1.0, 1.0], 43);
        v3.generate((1.0, 9.0), 2);
        assert_ne!(v1.data().as_slice(), v3.data().as_slice());
        for &v in v1.data().as_slice() {
            assert!(v >= 1.0 - 1e-9 && v <= 9.0 + 1e-9);
        }
        let lo = v1.data().as_slice().iter().cloned().fold(Real::INFINITY, Real::min);
        let hi = v1.data().as_slice().iter().cloned().fold(Real::NEG_INFINITY, Real::max);
        assert_relative_eq!(lo, 1.0, max_relative = 1e-9);
        assert_relative_eq!(hi, 9.0, max_relative = 1e-9);
    }

    #[test]
    fn surface_generation_is_seeded_and_bounded() {
        let mut s = FractalSurface::new(12, 10, 1.5, [1.0, 1.0], 7);
        s.generate((0.0, 2.0), 2);
        for &v in s.data().as_slice() {
            assert!(v >= -1e-9 && v <= 2.0 + 1e-9);
        }
    }
}

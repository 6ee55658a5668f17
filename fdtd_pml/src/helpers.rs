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

/// Crate internal helper functions:

use scoped_threadpool::Pool;

// Calculates ceil(x/y) if x > 0
pub(crate) fn ceil_div(x: usize, y: usize) -> usize {
    assert!(x > 0);
    1 + (x - 1) / y
}

/// Static-chunk parallel-for over whole planes `[i0, i1)` of a flat
/// row-major array whose slowest axis has planes of `plane` elements.
///
/// The body is called as `body(first_plane, last_plane, window)` where
/// `window` covers exactly the planes `[first_plane, last_plane)`. Workers
/// are transient: the pool is created for this call and joined before it
/// returns. A worker count below two runs the body inline.
pub(crate) fn par_planes<T, F>(data: &mut [T], plane: usize, i0: usize, i1: usize,
    num_threads: usize, body: F)
where
    T: Send,
    F: Fn(usize, usize, &mut [T]) + Send + Sync,
{
    if i1 <= i0 {
        return;
    }
    let n = i1 - i0;
    let num_threads = num_threads.max(1).min(n);
    let window = &mut data[i0 * plane..i1 * plane];
    if num_threads < 2 {
        body(i0, i1, window);
        return;
    }
    // Size of chunk in numbers of planes
    let chunk_planes = ceil_div(n, num_threads);
    let mut pool = Pool::new(num_threads as u32);
    pool.scoped(|s| {
        for (c, chunk) in window.chunks_mut(chunk_planes * plane).enumerate() {
            let body = &body;
            let first = i0 + c * chunk_planes;
            let last = first + chunk.len() / plane;
            s.execute(move || {
                body(first, last, chunk);
            });
        }
    });
}

// Example of a Gaussian pulse being absorbed by second-order PML slabs

use fdtd_pml::pml::{CfsPole, Face, PmlSlab, SlabBounds};
use fdtd_pml::{update_electric, update_magnetic, FieldState, Material, MaterialTable, Real,
    YeeGrid};

pub fn main() {
    const NUM_THREADS: usize = 4;
    let n = 40;
    let t = 10;
    let grid = YeeGrid::new(n, n, n, 1e-3, 1e-3, 1e-3);
    let mut materials = MaterialTable::new();
    materials.add(Material::free_space());
    let mut fields = FieldState::new(&grid, &materials);

    let poles = [
        CfsPole { alpha_min: 0.0, alpha_max: 0.0, kappa_max: 1.0, sigma_max: None, m: 3.0 },
        CfsPole { alpha_min: 0.0, alpha_max: 0.0, kappa_max: 1.0, sigma_max: Some(0.0), m: 3.0 },
    ];
    let mut slabs: Vec<PmlSlab> = Face::ALL
        .iter()
        .map(|&face| {
            let b = match face {
                Face::XMinus => SlabBounds::new(0, t, 0, n, 0, n),
                Face::XPlus => SlabBounds::new(n - t, n, 0, n, 0, n),
                Face::YMinus => SlabBounds::new(0, n, 0, t, 0, n),
                Face::YPlus => SlabBounds::new(0, n, n - t, n, 0, n),
                Face::ZMinus => SlabBounds::new(0, n, 0, n, 0, t),
                Face::ZPlus => SlabBounds::new(0, n, 0, n, n - t, n),
            };
            PmlSlab::new(face, b, &poles, &grid)
        })
        .collect();

    let tau = 20.0 * grid.dt;
    println!("step    RMS(Ez) on inner x-minus face");
    for step in 0..500usize {
        update_magnetic(&mut fields, NUM_THREADS);
        for s in slabs.iter_mut() {
            s.update_magnetic(&mut fields, NUM_THREADS);
        }
        update_electric(&mut fields, NUM_THREADS);
        for s in slabs.iter_mut() {
            s.update_electric(&mut fields, NUM_THREADS);
        }
        let time = (step as f64 + 1.0) * grid.dt;
        let w = (-((time - 3.0 * tau) / tau).powi(2)).exp();
        fields.ez[(n / 2, n / 2, n / 2)] += w as Real;

        if step % 50 == 49 {
            let mut acc = 0.0f64;
            let mut count = 0u32;
            for j in t..=n - t {
                for k in t..=n - t {
                    let v = fields.ez[(t, j, k)] as f64;
                    acc += v * v;
                    count += 1;
                }
            }
            println!("{:5}   {:e}", step + 1, (acc / count as f64).sqrt());
        }
    }
}

/// Benchmarks of the PML slab update kernels

use criterion::{criterion_group, criterion_main, Criterion};

use fdtd_pml::pml::{CfsPole, Face, PmlSlab, SlabBounds};
use fdtd_pml::{FieldState, Material, MaterialTable, Real, YeeGrid};

fn my_benchmark(c: &mut Criterion) {
    const NUM_THREADS: usize = 4;
    let n = 96;
    let grid = YeeGrid::new(n, n, n, 1e-3, 1e-3, 1e-3);
    let mut materials = MaterialTable::new();
    materials.add(Material::free_space());
    let mut fields = FieldState::new(&grid, &materials);
    for (i, v) in fields.ez.as_mut_slice().iter_mut().enumerate() {
        *v = ((i % 13) as Real - 6.0) * 0.1;
    }
    for (i, v) in fields.ey.as_mut_slice().iter_mut().enumerate() {
        *v = ((i % 11) as Real - 5.0) * 0.1;
    }

    let poles = [CfsPole::standard(), CfsPole::standard()];
    let mut slab = PmlSlab::new(Face::XMinus, SlabBounds::new(0, 10, 0, n, 0, n),
        &poles, &grid);
    c.bench_function("pml_magnetic_xminus_order2", |b| b.iter(|| {
        slab.update_magnetic(&mut fields, NUM_THREADS);
    }));

    let mut slab = PmlSlab::new(Face::YPlus, SlabBounds::new(0, n, n - 10, n, 0, n),
        &poles[..1], &grid);
    c.bench_function("pml_electric_yplus_order1", |b| b.iter(|| {
        slab.update_electric(&mut fields, NUM_THREADS);
    }));
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = my_benchmark
}
criterion_main!(benches);

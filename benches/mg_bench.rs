use criterion::{black_box, criterion_group, criterion_main, Criterion};

use incompressible2d::grid::bc::{BcKind, BcSet};
use incompressible2d::grid::Grid2D;
use incompressible2d::log::discard_logger;
use incompressible2d::{MgHierarchy, MgSolver};

fn bench_v_cycle(c: &mut Criterion) {
    let log = discard_logger();
    let bc = BcSet::new(BcKind::Periodic, BcKind::Periodic, BcKind::Periodic, BcKind::Periodic);

    let mut group = c.benchmark_group("mg_v_cycle");
    for &nx in &[32usize, 64, 128] {
        group.bench_function(format!("nx={nx}"), |b| {
            b.iter(|| {
                let hierarchy = MgHierarchy::new(nx, nx, 0.0, 1.0, 0.0, 1.0, bc).unwrap();
                let grid = Grid2D::new(nx, nx, 1, 0.0, 1.0, 0.0, 1.0);
                let mut f = grid.scratch_array();
                for j in grid.jlo()..=grid.jhi() {
                    for i in grid.ilo()..=grid.ihi() {
                        let x = grid.x(i);
                        let y = grid.y(j);
                        f.set(i, j, (2.0 * std::f64::consts::PI * x).sin() * (2.0 * std::f64::consts::PI * y).sin());
                    }
                }
                let mut solver = MgSolver::new(hierarchy, 0.0, -1.0);
                solver.init_zeros();
                solver.init_rhs(&f);
                black_box(solver.solve(&log, 1e-10).unwrap());
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_v_cycle);
criterion_main!(benches);

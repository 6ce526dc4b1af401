//! End-to-end runs of the Lax-Wendroff stencil.

use proptest::prelude::*;
use wendroff_core::{Halo, Shape};
use wendroff_grid::Grid;
use wendroff_kernels::fields::{LAX_WENDROFF_PARAMS, LAX_WENDROFF_SCRATCH};
use wendroff_kernels::{lax_wendroff_stencil, LaxWendroffConfig};
use wendroff_stencil::{AccessRanges, Boundary};
use wendroff_test_utils::LaxWendroffFields;

fn stencil(shape: Shape) -> wendroff_stencil::Stencil {
    lax_wendroff_stencil(shape, &LaxWendroffConfig::default()).unwrap()
}

fn transposed(g: &Grid) -> Grid {
    let s = g.shape();
    Grid::from_fn(Shape::new(s.ny, s.nx, s.nz), |[x, y, z]| g[[y, x, z]])
}

#[test]
fn access_ranges() {
    let ranges = stencil(Shape::new(8, 8, 1)).access_ranges();
    for name in LAX_WENDROFF_PARAMS {
        let bounds = ranges.get(name.as_str()).map(|r| r.xy_bounds());
        assert_eq!(bounds, Some([0, 1, 0, 1]), "{name}");
    }
    for name in LAX_WENDROFF_SCRATCH {
        let bounds = ranges.get(name.as_str()).map(|r| r.xy_bounds());
        assert_eq!(bounds, Some([-1, 0, -1, 0]), "{name}");
    }
}

#[test]
fn dry_run_agrees_with_declarations() {
    let s = stencil(Shape::new(8, 8, 1));
    assert_eq!(
        AccessRanges::from_dry_run(&s).unwrap(),
        AccessRanges::from_declarations(&s)
    );
}

#[test]
fn dependencies_chain_into_the_final_step() {
    let graph = stencil(Shape::new(8, 8, 1)).dependencies();
    assert_eq!(graph.producers_of(2), vec![0, 1]);
    assert!(graph.producers_of(1).is_empty());
    assert!(graph.edges_point_forward());
}

#[test]
fn carries_a_reflective_boundary() {
    let s = stencil(Shape::new(8, 8, 1));
    assert!(matches!(s.boundary(), Boundary::Reflective(f) if f.len() == 3));
    assert_eq!(s.halo(), Halo::uniform(1));
}

#[test]
fn still_water_is_a_fixed_point() {
    let shape = Shape::new(64, 64, 1);
    let mut s = stencil(shape);
    let mut fields = LaxWendroffFields::still_water(shape);
    let before = fields.clone();
    for _ in 0..5 {
        s.run(&mut fields.bindings()).unwrap();
    }
    assert_eq!(fields, before);
}

#[test]
fn droplet_collapses_symmetrically() {
    let shape = Shape::new(16, 16, 1);
    let mut s = stencil(shape);
    let mut fields = LaxWendroffFields::with_droplet(shape, 0.5);
    let peak = fields.h[[8, 8, 0]];
    for _ in 0..20 {
        s.run(&mut fields.bindings()).unwrap();
    }

    assert!(fields.h[[8, 8, 0]] < peak);
    for grid in [&fields.h, &fields.u, &fields.v] {
        assert!(grid.as_slice().iter().all(|v| v.is_finite()));
    }

    let (ht, ut, vt) = (
        transposed(&fields.h),
        transposed(&fields.u),
        transposed(&fields.v),
    );
    for (a, b) in fields.h.as_slice().iter().zip(ht.as_slice()) {
        assert!((a - b).abs() < 1e-12, "h {a} vs {b}");
    }
    for (a, b) in fields.u.as_slice().iter().zip(vt.as_slice()) {
        assert!((a - b).abs() < 1e-12, "u {a} vs v {b}");
    }
    for (a, b) in fields.v.as_slice().iter().zip(ut.as_slice()) {
        assert!((a - b).abs() < 1e-12, "v {a} vs u {b}");
    }
}

#[test]
fn halo_mirrors_the_interior_after_a_run() {
    let shape = Shape::new(16, 16, 1);
    let mut s = stencil(shape);
    let mut fields = LaxWendroffFields::with_droplet(shape, 0.5);
    for _ in 0..4 {
        s.run(&mut fields.bindings()).unwrap();
    }
    for y in 1..15 {
        assert_eq!(fields.h[[0, y, 0]], fields.h[[1, y, 0]]);
        assert_eq!(fields.h[[15, y, 0]], fields.h[[14, y, 0]]);
        assert_eq!(fields.u[[0, y, 0]], -0.5 * fields.u[[1, y, 0]]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn still_water_of_any_depth_stays_still(depth in 0.1f64..10.0, n in 4usize..12) {
        let shape = Shape::new(n, n + 2, 1);
        let mut s = stencil(shape);
        let mut fields = LaxWendroffFields::still_water(shape);
        fields.h.fill(depth);
        s.run(&mut fields.bindings()).unwrap();
        prop_assert!(fields.h.as_slice().iter().all(|&h| h == depth));
        prop_assert!(fields.u.as_slice().iter().all(|&u| u == 0.0));
    }
}

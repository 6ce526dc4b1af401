//! Scheduler behaviour: bindings, freeze semantics, compute regions,
//! failure handling and boundary application.

use wendroff_core::{AccessRange, Halo, Offset, RunError, Shape, StageError};
use wendroff_grid::{get_interior_points, Grid};
use wendroff_stencil::{
    Bindings, Boundary, BoundaryError, ConfigError, FieldKind, FieldRole, Stage, StencilBuilder,
};
use wendroff_test_utils::fixtures::{
    copy_stage, diffusion_stage, diffusion_stencil, failing_stage, two_pass_stencil,
};

fn ramp(shape: Shape) -> Grid {
    Grid::from_fn(shape, |[x, y, z]| (100 * x + 10 * y + z) as f64)
}

// ── Interior semantics ─────────────────────────────────────────────

#[test]
fn parameter_writes_stay_in_the_interior() {
    let shape = Shape::new(6, 5, 1);
    let halo = Halo::uniform(1);
    let mut stencil = diffusion_stencil(shape, halo);
    let mut input = ramp(shape);
    let mut out = Grid::filled(shape, -1.0);

    stencil
        .run(&mut Bindings::new().with("in", &mut input).with("out", &mut out))
        .unwrap();

    for p in get_interior_points(&out, halo) {
        let [x, y, z] = p;
        let expected = (input[[x + 1, y, z]]
            + input[[x - 1, y, z]]
            + input[[x, y + 1, z]]
            + input[[x, y - 1, z]])
            / 4.0;
        assert_eq!(out[p], expected);
    }
    for x in 0..shape.nx {
        assert_eq!(out[[x, 0, 0]], -1.0);
        assert_eq!(out[[x, 4, 0]], -1.0);
    }
    for y in 0..shape.ny {
        assert_eq!(out[[0, y, 0]], -1.0);
        assert_eq!(out[[5, y, 0]], -1.0);
    }
}

#[test]
fn reads_see_values_from_stage_entry() {
    let mut b = Stage::builder("shift");
    let f = b.read_write("f", [Offset::xy(-1, 0), Offset::ZERO]);
    b.body(move |ctx| {
        let left = ctx.read(f, Offset::xy(-1, 0))?;
        ctx.write(f, left)
    });
    let shift = b.build().unwrap();

    let shape = Shape::new(6, 3, 1);
    let mut stencil = StencilBuilder::new("shift", shape)
        .halo(Halo::uniform(1))
        .param("f")
        .call(&shift, ["f"])
        .build()
        .unwrap();

    let original = ramp(shape);
    let mut f = original.clone();
    stencil.run(&mut Bindings::new().with("f", &mut f)).unwrap();

    for x in 1..5 {
        assert_eq!(f[[x, 1, 0]], original[[x - 1, 1, 0]]);
    }
    assert_eq!(f[[5, 1, 0]], original[[5, 1, 0]]);
}

#[test]
fn later_stages_see_earlier_commits() {
    let shape = Shape::new(5, 5, 1);
    let mut stencil = StencilBuilder::new("chain", shape)
        .halo(Halo::uniform(1))
        .params(["a", "b", "c"])
        .call(&copy_stage(), ["a", "b"])
        .call(&copy_stage(), ["b", "c"])
        .build()
        .unwrap();
    let mut a = ramp(shape);
    let mut b = Grid::new(shape);
    let mut c = Grid::new(shape);
    stencil
        .run(
            &mut Bindings::new()
                .with("a", &mut a)
                .with("b", &mut b)
                .with("c", &mut c),
        )
        .unwrap();
    assert_eq!(c[[2, 3, 0]], a[[2, 3, 0]]);
    assert_eq!(c[[0, 0, 0]], 0.0);
}

// ── Scratch fields ─────────────────────────────────────────────────

#[test]
fn scratch_producer_covers_what_consumers_read() {
    let shape = Shape::new(6, 4, 1);
    let mut stencil = two_pass_stencil(shape, Halo::uniform(1)).unwrap();
    assert_eq!(stencil.calls()[0].extent(), AccessRange::xy(-1, 1, 0, 0));
    assert_eq!(stencil.calls()[1].extent(), AccessRange::ZERO);
    assert_eq!(stencil.field_kind("tmp"), Some(FieldKind::Scratch));

    let mut input = ramp(shape);
    let mut out = Grid::new(shape);
    stencil
        .run(&mut Bindings::new().with("in", &mut input).with("out", &mut out))
        .unwrap();

    let tmp = stencil.scratch("tmp").unwrap();
    for y in 1..3 {
        for x in 0..6 {
            assert_eq!(tmp[[x, y, 0]], input[[x, y, 0]], "tmp at ({x}, {y})");
        }
        assert_eq!(tmp[[0, 0, 0]], 0.0);
        for x in 1..5 {
            assert_eq!(out[[x, y, 0]], input[[x - 1, y, 0]] + input[[x + 1, y, 0]]);
        }
    }
}

#[test]
fn scratch_persists_between_runs() {
    let shape = Shape::new(6, 4, 1);
    let mut stencil = two_pass_stencil(shape, Halo::uniform(1)).unwrap();
    let mut out = Grid::new(shape);

    let mut first = Grid::filled(shape, 1.0);
    stencil
        .run(&mut Bindings::new().with("in", &mut first).with("out", &mut out))
        .unwrap();
    assert_eq!(stencil.scratch("tmp").unwrap()[[3, 1, 0]], 1.0);

    let mut second = Grid::filled(shape, 2.0);
    stencil
        .run(&mut Bindings::new().with("in", &mut second).with("out", &mut out))
        .unwrap();
    let tmp = stencil.scratch("tmp").unwrap();
    assert_eq!(tmp[[3, 1, 0]], 2.0);
    assert_eq!(tmp[[3, 0, 0]], 0.0);
    assert!(stencil.scratch("in").is_none());
    assert!(stencil.scratch("missing").is_none());
}

// ── Buffering ──────────────────────────────────────────────────────

#[test]
fn ping_pong_matches_copy_back() {
    let shape = Shape::new(10, 9, 1);
    let halo = Halo::uniform(1);
    let init = ramp(shape);
    let steps = 5;

    let mut stencil = diffusion_stencil(shape, halo);
    let (mut a, mut b) = (init.clone(), init.clone());
    for step in 0..steps {
        let (src, dst) = if step % 2 == 0 {
            (&mut a, &mut b)
        } else {
            (&mut b, &mut a)
        };
        stencil
            .run(&mut Bindings::new().with("in", src).with("out", dst))
            .unwrap();
    }
    let ping_pong = if steps % 2 == 0 { a } else { b };

    let mut stencil = diffusion_stencil(shape, halo);
    let (mut src, mut dst) = (init.clone(), init.clone());
    for _ in 0..steps {
        stencil
            .run(&mut Bindings::new().with("in", &mut src).with("out", &mut dst))
            .unwrap();
        src.copy_from(&dst).unwrap();
    }

    assert_eq!(ping_pong, dst);
}

// ── Failures ───────────────────────────────────────────────────────

#[test]
fn failing_stage_discards_its_writes_only() {
    let shape = Shape::new(5, 5, 1);
    let mut stencil = StencilBuilder::new("fails", shape)
        .halo(Halo::uniform(1))
        .params(["a", "b", "c"])
        .call(&copy_stage(), ["a", "b"])
        .call(&failing_stage([2, 2, 0]), ["b", "c"])
        .build()
        .unwrap();
    let mut a = ramp(shape);
    let mut b = Grid::new(shape);
    let mut c = Grid::filled(shape, 7.0);

    let err = stencil
        .run(
            &mut Bindings::new()
                .with("a", &mut a)
                .with("b", &mut b)
                .with("c", &mut c),
        )
        .unwrap_err();

    match err {
        RunError::Stage {
            stage,
            point,
            source,
        } => {
            assert_eq!(stage, "failing");
            assert_eq!(point, [2, 2, 0]);
            assert!(matches!(source, StageError::UndeclaredAccess { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(b[[1, 1, 0]], a[[1, 1, 0]]);
    assert_eq!(c, Grid::filled(shape, 7.0));
}

#[test]
fn binding_errors_are_reported_before_mutation() {
    let shape = Shape::new(5, 5, 1);
    let halo = Halo::uniform(1);
    let mut stencil = diffusion_stencil(shape, halo);
    let mut input = ramp(shape);
    let mut out = Grid::new(shape);
    let mut extra = Grid::new(shape);
    let mut wrong = Grid::new(Shape::new(5, 4, 1));

    let err = stencil
        .run(&mut Bindings::new().with("in", &mut input))
        .unwrap_err();
    assert_eq!(err, RunError::UnboundParam { name: "out".into() });

    let err = stencil
        .run(
            &mut Bindings::new()
                .with("in", &mut input)
                .with("out", &mut out)
                .with("tmp", &mut extra),
        )
        .unwrap_err();
    assert!(matches!(err, RunError::UnknownBinding { .. }));

    let mut bindings = Bindings::new();
    bindings.bind("in", &mut input).bind("in", &mut extra);
    let err = stencil.run(&mut bindings).unwrap_err();
    assert_eq!(err, RunError::DuplicateBinding { name: "in".into() });

    let err = stencil
        .run(&mut Bindings::new().with("in", &mut input).with("out", &mut wrong))
        .unwrap_err();
    assert!(matches!(err, RunError::BindingShape { .. }));

    assert_eq!(out, Grid::new(shape));
    assert_eq!(wrong, Grid::new(Shape::new(5, 4, 1)));
}

// ── Build-time validation ──────────────────────────────────────────

#[test]
fn structural_errors_are_caught_at_build() {
    let shape = Shape::new(6, 6, 1);
    let halo = Halo::uniform(1);
    let diffuse = diffusion_stage();

    let err = StencilBuilder::new("empty", shape).param("a").build().unwrap_err();
    assert!(matches!(err, ConfigError::EmptyStencil { .. }));

    let err = StencilBuilder::new("flat", Shape::new(6, 0, 1))
        .params(["in", "out"])
        .call(&diffuse, ["in", "out"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::EmptyDomain { .. }));

    let err = StencilBuilder::new("wide", shape)
        .halo(Halo::uniform(4))
        .params(["in", "out"])
        .call(&diffuse, ["in", "out"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::HaloTooWide { .. }));

    let err = StencilBuilder::new("dup", shape)
        .halo(halo)
        .params(["in", "out"])
        .scratch("in")
        .call(&diffuse, ["in", "out"])
        .build()
        .unwrap_err();
    assert_eq!(err, ConfigError::DuplicateField { name: "in".into() });

    let err = StencilBuilder::new("arity", shape)
        .halo(halo)
        .params(["in", "out"])
        .call(&diffuse, ["in"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::ArityMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));

    let err = StencilBuilder::new("unknown", shape)
        .halo(halo)
        .params(["in", "out"])
        .call(&diffuse, ["in", "nowhere"])
        .build()
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownField { .. }));
}

#[test]
fn reading_scratch_before_its_producer_is_rejected() {
    let shape = Shape::new(6, 6, 1);
    let err = StencilBuilder::new("backwards", shape)
        .halo(Halo::uniform(1))
        .params(["in", "out"])
        .scratch("tmp")
        .call(&diffusion_stage(), ["tmp", "out"])
        .call(&copy_stage(), ["in", "tmp"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::ForwardReference {
            stage: "diffuse".into(),
            call: 0,
            field: "tmp".into(),
        }
    );
}

#[test]
fn binding_one_field_to_conflicting_patterns_is_rejected() {
    let mut b = Stage::builder("grad");
    let p = b.read("p", [Offset::xy(1, 0)]);
    let q = b.read("q", [Offset::xy(0, 1)]);
    let out = b.write("out");
    b.body(move |ctx| {
        let v = ctx.read(p, Offset::xy(1, 0))? - ctx.read(q, Offset::xy(0, 1))?;
        ctx.write(out, v)
    });
    let grad = b.build().unwrap();

    let err = StencilBuilder::new("conflict", Shape::new(6, 6, 1))
        .halo(Halo::uniform(1))
        .params(["in", "out"])
        .call(&grad, ["in", "in", "out"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::RangeConflict {
            stage: "grad".into(),
            field: "in".into(),
            first: "p".into(),
            second: "q".into(),
        }
    );
}

#[test]
fn binding_one_field_to_two_outputs_is_rejected() {
    let mut b = Stage::builder("split");
    let src = b.read("src", [Offset::ZERO]);
    let lo = b.write("lo");
    let hi = b.write("hi");
    b.body(move |ctx| {
        let v = ctx.centre(src)?;
        if ctx.point()[0] < 3 {
            ctx.write(lo, v)
        } else {
            ctx.write(hi, v)
        }
    });
    let split = b.build().unwrap();

    let err = StencilBuilder::new("aliased", Shape::new(6, 6, 1))
        .halo(Halo::uniform(1))
        .params(["in", "out"])
        .call(&split, ["in", "out", "out"])
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        ConfigError::AliasedWrite {
            stage: "split".into(),
            field: "out".into(),
            first: "lo".into(),
            second: "hi".into(),
        }
    );

    let mut stencil = StencilBuilder::new("split", Shape::new(6, 6, 1))
        .halo(Halo::uniform(1))
        .params(["in", "lo", "hi"])
        .call(&split, ["in", "lo", "hi"])
        .build()
        .unwrap();
    let shape = Shape::new(6, 6, 1);
    let (mut input, mut lo_out, mut hi_out) =
        (Grid::filled(shape, 5.0), Grid::new(shape), Grid::new(shape));
    stencil
        .run(
            &mut Bindings::new()
                .with("in", &mut input)
                .with("lo", &mut lo_out)
                .with("hi", &mut hi_out),
        )
        .unwrap();
    assert_eq!(lo_out[[1, 2, 0]], 5.0);
    assert_eq!(hi_out[[4, 2, 0]], 5.0);
    assert_eq!(lo_out[[4, 2, 0]], 0.0);
}

#[test]
fn offsets_reaching_past_storage_are_rejected() {
    let shape = Shape::new(6, 6, 1);
    let err = StencilBuilder::new("no_halo", shape)
        .params(["in", "out"])
        .call(&diffusion_stage(), ["in", "out"])
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::OffsetOutsideStorage { ref field, .. } if field.as_str() == "in"
    ));

    let err = two_pass_stencil(shape, Halo::new(0, 0, 1, 1)).unwrap_err();
    assert!(matches!(err, ConfigError::OffsetOutsideStorage { .. }));
}

// ── Boundary ───────────────────────────────────────────────────────

#[test]
fn reflective_boundary_patches_the_halo_after_the_run() {
    let shape = Shape::new(6, 6, 1);
    let halo = Halo::uniform(1);
    let mut stencil = StencilBuilder::new("reflect", shape)
        .halo(halo)
        .params(["in", "out"])
        .call(&diffusion_stage(), ["in", "out"])
        .boundary(Boundary::Reflective(vec![("out".into(), FieldRole::VelocityX)]))
        .build()
        .unwrap();
    let mut input = ramp(shape);
    let mut out = Grid::new(shape);
    stencil
        .run(&mut Bindings::new().with("in", &mut input).with("out", &mut out))
        .unwrap();

    assert_eq!(out[[0, 2, 0]], -0.5 * out[[1, 2, 0]]);
    assert_eq!(out[[2, 5, 0]], 0.5 * out[[2, 4, 0]]);
    assert_eq!(input, ramp(shape));
}

#[test]
fn boundary_fields_are_validated() {
    let shape = Shape::new(6, 6, 1);
    let halo = Halo::uniform(1);
    let build = |boundary: Boundary, shape: Shape| {
        StencilBuilder::new("b", shape)
            .halo(halo)
            .params(["in", "out"])
            .scratch("tmp")
            .call(&copy_stage(), ["in", "tmp"])
            .call(&copy_stage(), ["tmp", "out"])
            .boundary(boundary)
            .build()
    };

    let err = build(
        Boundary::Reflective(vec![("tmp".into(), FieldRole::Height)]),
        shape,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConfigError::Boundary(BoundaryError::NotAParam { name: "tmp".into() })
    );

    let err = build(
        Boundary::Reflective(vec![("gone".into(), FieldRole::Height)]),
        shape,
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::UnknownField { .. }));

    let err = build(
        Boundary::Reflective(vec![
            ("out".into(), FieldRole::Height),
            ("out".into(), FieldRole::VelocityY),
        ]),
        shape,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Boundary(BoundaryError::DuplicateField { .. })
    ));

    let err = build(
        Boundary::Reflective(vec![("out".into(), FieldRole::Height)]),
        Shape::new(2, 6, 1),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Boundary(BoundaryError::InteriorTooNarrow { .. })
    ));
}

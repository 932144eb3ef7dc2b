//! End-to-end finishing runs on small case assemblies.

use approx::assert_relative_eq;
use mesh_pipeline::{CaseFinisher, PipelineConfig, Stage};
use mesh_repair::MeshAdjacency;
use mesh_types::{box_shape, MeshBounds, Shape, Vector3};

/// Log warnings (or `RUST_LOG`) from the pipeline to the test output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

/// A `w x d x h` block standing on the build plate.
fn block(w: f64, d: f64, h: f64, x: f64, y: f64) -> Shape {
    let mut shape = box_shape(w, d, h);
    shape.translate(Vector3::new(x, y, h / 2.0));
    shape
}

/// A plate whose bottom face lies on top of `block(w, d, h, 0, 0)`.
fn key_plate(w: f64, d: f64, h: f64) -> Shape {
    let mut plate = box_shape(w, d, 2.0);
    plate.translate(Vector3::new(0.0, 0.0, h + 1.0));
    plate
}

#[test]
fn key_crease_keeps_the_top_rim() {
    init_tracing();
    let plate = key_plate(20.0, 20.0, 6.0);
    let config = PipelineConfig::preview().with_key_crease_tolerance(0.01);

    let creased = CaseFinisher::new(config.clone())
        .finish(vec![block(20.0, 20.0, 6.0, 0.0, 0.0)], Some(plate.mesh()))
        .unwrap();
    assert_eq!(creased.key_creases, 4);
    assert_eq!(creased.base_creases, 4);
    let bounds = creased.shape.mesh().bounds();
    assert_relative_eq!(bounds.min.z, 0.0, epsilon = 1e-12);
    assert_relative_eq!(bounds.max.z, 6.0, epsilon = 1e-12);
    assert_relative_eq!(bounds.max.x, 10.0, epsilon = 1e-12);

    let soft = CaseFinisher::new(config.with_key_crease_tolerance(0.0))
        .finish(vec![block(20.0, 20.0, 6.0, 0.0, 0.0)], Some(plate.mesh()))
        .unwrap();
    assert_eq!(soft.key_creases, 0);
    assert!(soft.shape.mesh().volume() < creased.shape.mesh().volume());
}

#[test]
fn overlapping_primitives_finish_as_one_solid() {
    init_tracing();
    let wall = block(20.0, 4.0, 8.0, 0.0, 0.0);
    let post = block(4.0, 12.0, 8.0, 8.0, 4.0);
    let config = PipelineConfig::preview().with_snapshots(true);

    let case = CaseFinisher::new(config).finish(vec![wall, post], None).unwrap();

    let tags: Vec<_> = case.snapshots.iter().map(Shape::tag).collect();
    assert_eq!(
        tags,
        [
            "shape1_assembled",
            "shape2_baseline",
            "shape3_post_base_crease",
            "shape5_post_smooth",
            "shape6_post_cleanup"
        ]
    );
    let assembled = case.snapshot(Stage::Assemble).unwrap().mesh();
    assert_eq!(assembled.component_count(), 1);

    let mesh = case.shape.mesh();
    assert_eq!(mesh.component_count(), 1);
    assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    assert!(mesh.volume() < assembled.volume());
    assert_relative_eq!(mesh.bounds().min.z, 0.0, epsilon = 1e-9);
    assert!(case.warning().is_none());
}

#[test]
fn presmooth_and_cuts_densify_before_smoothing() {
    init_tracing();
    let config = PipelineConfig::preview()
        .with_presmooth_levels(1)
        .with_presubdivide_cuts(1);
    let case = CaseFinisher::new(config)
        .finish_shape(block(20.0, 20.0, 6.0, 0.0, 0.0), None)
        .unwrap();

    // 6 quads, x4 presmooth, x4 cuts, x4 smooth.
    assert_eq!(case.shape.mesh().faces.len(), 384);
    assert_relative_eq!(case.shape.mesh().bounds().min.z, 0.0, epsilon = 1e-12);
}

#[test]
fn zero_smoothing_only_creases() {
    init_tracing();
    let config = PipelineConfig::default().with_smooth_levels(0);
    let original = block(20.0, 20.0, 6.0, 0.0, 0.0);
    let case = CaseFinisher::new(config).finish_shape(original.clone(), None).unwrap();

    assert_eq!(case.shape.mesh().faces.len(), 6);
    assert_eq!(case.shape.mesh().bounds(), original.mesh().bounds());
    assert_eq!(case.shape.mesh().creases.len(), 4);
}

#[test]
fn assembly_errors_name_the_operand() {
    init_tracing();
    let empty = Shape::new(mesh_types::IndexedMesh::new(), "standoff");
    let err = CaseFinisher::default()
        .finish(vec![block(4.0, 4.0, 4.0, 0.0, 0.0), empty], None)
        .unwrap_err();
    assert_eq!(err.stage, Stage::Assemble);
    assert!(err.to_string().contains("standoff"));
}

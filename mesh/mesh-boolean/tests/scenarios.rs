//! End-to-end boolean scenarios on owned shapes.

use approx::assert_relative_eq;
use mesh_boolean::{
    combine_with_config, difference, extrude_with_holes, intersect, union, BooleanConfig, BooleanError, BooleanOp,
};
use mesh_repair::{validate_mesh, MeshAdjacency};
use mesh_types::{box_shape, cylinder, polyline, MeshBounds, Shape, Vector3};

fn cube_at(x: f64, y: f64, z: f64) -> Shape {
    let mut shape = box_shape(1.0, 1.0, 1.0);
    shape.translate(Vector3::new(x, y, z));
    shape
}

#[test]
fn overlapping_boxes_fuse_into_one_manifold() {
    let joined = union(vec![cube_at(0.0, 0.0, 0.0), cube_at(0.5, 0.0, 0.0)], true).unwrap();
    let mesh = joined.mesh();

    assert_eq!(mesh.component_count(), 1);
    assert!(MeshAdjacency::build(&mesh.faces).is_watertight());
    let report = validate_mesh(mesh);
    assert_eq!(report.non_manifold_edge_count, 0);
    assert_relative_eq!(mesh.bounds().size().x, 1.5, epsilon = 1e-9);
    assert_relative_eq!(mesh.volume(), 1.5, epsilon = 1e-9);
}

#[test]
fn face_touching_boxes_fuse() {
    let joined = union(vec![cube_at(0.0, 0.0, 0.0), cube_at(1.0, 0.0, 0.0)], true).unwrap();
    assert_eq!(joined.mesh().component_count(), 1);
    assert_relative_eq!(joined.mesh().volume(), 2.0, epsilon = 1e-9);
}

#[test]
fn union_of_one_returns_it_untouched() {
    let shape = cube_at(2.0, 0.0, 0.0);
    let expected = shape.clone();
    assert_eq!(union(vec![shape], true).unwrap(), expected);
}

#[test]
fn drilled_plate_loses_the_hole_volume() {
    let plate = box_shape(10.0, 10.0, 2.0);
    let drill = box_shape(2.0, 2.0, 4.0);
    let drilled = difference(plate, vec![drill], true).unwrap();

    assert_relative_eq!(drilled.mesh().volume(), 200.0 - 8.0, epsilon = 1e-6);
    assert_eq!(drilled.mesh().component_count(), 1);
    assert!(MeshAdjacency::build(&drilled.mesh().faces).is_watertight());
    assert_eq!(drilled.tag(), "box");
}

#[test]
fn round_hole_leaves_a_closed_solid() {
    let plate = box_shape(10.0, 10.0, 2.0);
    let drilled = difference(plate, vec![cylinder(2.0, 4.0, 24)], true).unwrap();
    let mesh = drilled.mesh();
    assert!(mesh.volume() < 200.0 - 24.0);
    assert!(mesh.volume() > 200.0 - 26.0);
    assert_eq!(MeshAdjacency::build(&mesh.faces).boundary_edge_count(), 0);
}

#[test]
fn intersection_is_the_shared_box() {
    let common = intersect(cube_at(0.0, 0.0, 0.0), cube_at(0.5, 0.5, 0.5), true).unwrap();
    assert_relative_eq!(common.mesh().volume(), 0.125, epsilon = 1e-9);
}

#[test]
fn strict_config_accepts_a_clean_fold() {
    let config = BooleanConfig::strict();
    let shapes = vec![cube_at(0.0, 0.0, 0.0), cube_at(0.5, 0.5, 0.0), cube_at(0.0, 0.5, 0.5)];
    let joined = combine_with_config(shapes, BooleanOp::Union, true, &config).unwrap();
    assert_eq!(MeshAdjacency::build(&joined.mesh().faces).boundary_edge_count(), 0);
}

#[test]
fn empty_shape_is_named_in_the_error() {
    let ghost = Shape::new(mesh_types::IndexedMesh::new(), "standoff");
    let err = difference(cube_at(0.0, 0.0, 0.0), vec![ghost], false).unwrap_err();
    assert!(matches!(err, BooleanError::InvalidOperand { ref tag, .. } if tag == "standoff"));
}

#[test]
fn plate_with_two_holes() {
    let outline = polyline(&[[0.0, 0.0], [20.0, 0.0], [20.0, 10.0], [0.0, 10.0]]).unwrap();
    let left = polyline(&[[2.0, 2.0], [6.0, 2.0], [6.0, 6.0], [2.0, 6.0]]).unwrap();
    let right = polyline(&[[12.0, 2.0], [16.0, 2.0], [16.0, 6.0], [12.0, 6.0]]).unwrap();

    let plate = extrude_with_holes(outline, vec![left, right], 1.5).unwrap();
    assert_relative_eq!(plate.mesh().volume(), (200.0 - 32.0) * 1.5, epsilon = 1e-6);
    assert_eq!(plate.mesh().component_count(), 1);
}

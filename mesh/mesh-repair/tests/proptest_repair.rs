//! Property-based tests for the repair stages.
//!
//! These tests use proptest to generate random meshes and verify invariants.
//!
//! Run with: cargo test -p mesh-repair -- proptest

use mesh_boolean::{difference_with_config, union_with_config, BooleanConfig};
use mesh_repair::{repair, validate_mesh, weld_vertices, MeshAdjacency, RepairOptions};
use mesh_types::{box_shape, cylinder, ico_sphere, Face, IndexedMesh, Shape, Vector3, Vertex};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating random meshes
// =============================================================================

/// Generate a random vertex position in a bounded range.
fn arb_position() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-100.0..100.0f64)
}

/// Generate a random vertex with position only.
fn arb_vertex() -> impl Strategy<Value = Vertex> {
    arb_position().prop_map(|[x, y, z]| Vertex::from_coords(x, y, z))
}

/// Generate a mesh with valid face indices, no index repeated within a face.
fn arb_mesh(
    min_vertices: usize,
    max_vertices: usize,
    min_faces: usize,
    max_faces: usize,
) -> impl Strategy<Value = IndexedMesh> {
    (min_vertices..=max_vertices).prop_flat_map(move |num_vertices| {
        let vertices = prop::collection::vec(arb_vertex(), num_vertices);

        vertices.prop_flat_map(move |verts| {
            let n = verts.len() as u32;
            let face = prop::sample::subsequence((0..n).collect::<Vec<_>>(), 3..=(n as usize).min(5)).prop_shuffle();
            let faces = prop::collection::vec(face, min_faces..=max_faces);

            faces
                .prop_map(move |f| {
                    IndexedMesh::from_parts(verts.clone(), f.iter().map(|l| Face::from_slice(l)).collect())
                })
                .boxed()
        })
    })
}

/// A closed shape exploded into disconnected faces, each corner nudged by
/// less than the weld distance.
fn arb_exploded_solid() -> impl Strategy<Value = IndexedMesh> {
    let solid = prop_oneof![
        (0.5..20.0f64, 0.5..20.0f64, 0.5..20.0f64).prop_map(|(w, d, h)| box_shape(w, d, h).into_mesh()),
        (0.5..10.0f64, 0.5..10.0f64, 3usize..16).prop_map(|(r, h, n)| cylinder(r, h, n).into_mesh()),
    ];
    (solid, prop::array::uniform3(-50.0..50.0f64), -1e-4..1e-4f64).prop_map(|(mesh, [x, y, z], nudge)| {
        let mut out = IndexedMesh::new();
        for face in &mesh.faces {
            let start = out.vertices.len() as u32;
            for (k, &v) in face.iter().enumerate() {
                let offset = Vector3::new(x, y, z) + Vector3::repeat(nudge * (k % 2) as f64);
                out.push_vertex(mesh.vertices[v as usize].position + offset);
            }
            out.push_face(start..start + face.len() as u32);
        }
        out
    })
}

/// A rotated primitive placed near the origin so that neighbours overlap.
fn arb_placed_primitive() -> impl Strategy<Value = Shape> {
    let shape = prop_oneof![
        (1.0..4.0f64, 1.0..4.0f64, 1.0..4.0f64).prop_map(|(w, d, h)| box_shape(w, d, h)),
        (0.5..2.0f64, 1.0..4.0f64, 6usize..16).prop_map(|(r, h, n)| cylinder(r, h, n)),
        (0.8..2.0f64, 1u32..3).prop_map(|(r, s)| ico_sphere(r, s)),
    ];
    (
        shape,
        prop::array::uniform3(-60.0..60.0f64),
        prop::array::uniform3(-1.0..1.0f64),
    )
        .prop_map(|(mut shape, degrees, [x, y, z])| {
            shape.rotate(degrees).translate(Vector3::new(x, y, z));
            shape
        })
}

/// The output of a union or a difference of overlapping rotated
/// primitives, folded with per-step cleanup. Open results are kept so the
/// repairer sees them too.
fn arb_boolean_result() -> impl Strategy<Value = IndexedMesh> {
    (prop::collection::vec(arb_placed_primitive(), 2..=4), any::<bool>()).prop_filter_map(
        "boolean evaluation failed",
        |(mut shapes, subtract)| {
            let config = BooleanConfig::lenient();
            let result = if subtract {
                let base = shapes.remove(0);
                difference_with_config(base, shapes, true, &config)
            } else {
                union_with_config(shapes, true, &config)
            };
            result.ok().map(Shape::into_mesh).filter(|mesh| !mesh.faces.is_empty())
        },
    )
}

// =============================================================================
// Property Tests: Validation
// =============================================================================

proptest! {
    /// Validation should never panic on any mesh.
    #[test]
    fn validation_never_panics(mesh in arb_mesh(3, 50, 0, 100)) {
        let _ = validate_mesh(&mesh);
    }

    /// Validation is deterministic.
    #[test]
    fn validation_is_deterministic(mesh in arb_mesh(3, 30, 1, 50)) {
        prop_assert_eq!(validate_mesh(&mesh), validate_mesh(&mesh));
    }
}

// =============================================================================
// Property Tests: Vertex Welding
// =============================================================================

proptest! {
    /// Welding should never increase vertex count.
    #[test]
    fn weld_never_increases_vertices(mesh in arb_mesh(3, 30, 1, 50)) {
        let original_vertex_count = mesh.vertices.len();
        let mut welded = mesh.clone();

        weld_vertices(&mut welded, 0.001);

        prop_assert!(welded.vertices.len() <= original_vertex_count);
    }

    /// All face indices should be valid after welding.
    #[test]
    fn weld_produces_valid_indices(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut welded = mesh.clone();
        weld_vertices(&mut welded, 5.0);

        let vertex_count = welded.vertices.len() as u32;
        for face in &welded.faces {
            prop_assert!(face.len() >= 3);
            for &v in face {
                prop_assert!(v < vertex_count, "Face index {} >= vertex count {}", v, vertex_count);
            }
        }
    }
}

// =============================================================================
// Property Tests: Full Repair
// =============================================================================

proptest! {
    /// Full repair should never panic, and never leave invalid indices.
    #[test]
    fn repair_never_panics(mesh in arb_mesh(3, 30, 1, 50)) {
        let mut repaired = mesh.clone();
        if repair(&mut repaired, &RepairOptions::default()).is_ok() {
            prop_assert!(repaired.validate().is_ok());
        }
    }

    /// Repair never adds non-manifold edges or degenerate faces.
    #[test]
    fn repair_never_makes_things_worse(mesh in arb_mesh(3, 30, 1, 50)) {
        let before = validate_mesh(&mesh);
        let mut repaired = mesh.clone();
        if let Ok(report) = repair(&mut repaired, &RepairOptions::default()) {
            prop_assert!(report.final_report.non_manifold_edge_count <= before.non_manifold_edge_count);
            prop_assert!(report.final_report.degenerate_face_count <= before.degenerate_face_count);
        }
    }
}

// =============================================================================
// Property Tests: Closed solids
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Exploded closed solids come back manifold and watertight.
    #[test]
    fn closed_input_repairs_manifold(mesh in arb_exploded_solid()) {
        let mut repaired = mesh.clone();
        let report = repair(&mut repaired, &RepairOptions::default()).unwrap();

        let adjacency = MeshAdjacency::build(&repaired.faces);
        prop_assert!(adjacency.is_manifold());
        prop_assert!(adjacency.is_watertight());
        prop_assert!(report.warning.is_none());
        prop_assert!(repaired.signed_volume() > 0.0);
    }

    /// Running repair on its own output changes nothing.
    #[test]
    fn repair_is_idempotent(mesh in arb_exploded_solid()) {
        let mut once = mesh.clone();
        repair(&mut once, &RepairOptions::default()).unwrap();

        let mut twice = once.clone();
        let report = repair(&mut twice, &RepairOptions::default()).unwrap();

        prop_assert_eq!(&twice, &once);
        prop_assert!(!report.had_changes());
    }
}

// =============================================================================
// Property Tests: Boolean results
// =============================================================================

/// A rotated cylinder, a cylinder, a rotated box and a sphere fused into one
/// solid.
fn fused_primitives() -> IndexedMesh {
    let mut tilted = cylinder(1.0, 4.0, 12);
    tilted.rotate([90.0, 0.0, 0.0]);
    let upright = cylinder(0.8, 3.0, 10);
    let mut block = box_shape(2.0, 1.5, 1.0);
    block.rotate([0.0, 0.0, 30.0]).translate(Vector3::new(0.5, 0.2, 0.6));
    let mut ball = ico_sphere(1.1, 2);
    ball.translate(Vector3::new(-0.4, 0.3, 0.9));
    union_with_config(vec![tilted, upright, block, ball], true, &BooleanConfig::lenient())
        .unwrap()
        .into_mesh()
}

#[test]
fn repair_keeps_fused_solid_closed() {
    let mut mesh = fused_primitives();
    let before = validate_mesh(&mesh);

    let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
    let after = validate_mesh(&mesh);
    assert!(after.topology_defects() <= before.topology_defects());
    assert!(after.non_manifold_edge_count <= before.non_manifold_edge_count);
    if before.is_watertight {
        assert!(after.is_watertight);
        assert!(report.warning.map_or(true, |w| w.boundary_edges == 0));
    }

    let once = mesh.clone();
    let again = repair(&mut mesh, &RepairOptions::default()).unwrap();
    assert_eq!(mesh, once);
    assert!(!again.had_changes());
    assert_eq!(validate_mesh(&mesh).is_watertight, after.is_watertight);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Repair never opens or pinches a boolean result.
    #[test]
    fn boolean_results_stay_closed(mesh in arb_boolean_result()) {
        let before = validate_mesh(&mesh);
        let mut repaired = mesh.clone();
        repair(&mut repaired, &RepairOptions::default()).unwrap();

        let after = validate_mesh(&repaired);
        prop_assert!(after.topology_defects() <= before.topology_defects());
        prop_assert!(after.non_manifold_edge_count <= before.non_manifold_edge_count);
        prop_assert!(after.degenerate_face_count <= before.degenerate_face_count);
        if before.is_watertight {
            prop_assert!(after.is_watertight);
        }
    }

    /// Running repair on a repaired boolean result changes nothing.
    #[test]
    fn boolean_results_repair_idempotently(mesh in arb_boolean_result()) {
        let mut once = mesh.clone();
        repair(&mut once, &RepairOptions::default()).unwrap();

        let mut twice = once.clone();
        let report = repair(&mut twice, &RepairOptions::default()).unwrap();

        prop_assert_eq!(&twice, &once);
        prop_assert!(!report.had_changes());
    }
}

//! Exact pairwise evaluation: union, difference and intersection of two meshes.
//!
//! Both meshes are turned into convex polygons (non-convex or non-planar
//! loops are ear-clipped first), combined with BSP trees, and the surviving
//! polygon soup is stitched back into an indexed mesh.

use mesh_repair::{
    insert_t_junctions, limited_dissolve, recalculate_normals, weld_vertices, MeshAdjacency, COPLANAR_ANGLE,
};
use mesh_types::{polygon, IndexedMesh, MeshBounds};
use tracing::debug;

use crate::bsp::{BspTree, Plane, Polygon};
use crate::config::{BooleanConfig, BooleanOp, CleanupLevel};
use crate::error::{BooleanError, BooleanResult};

/// Statistics from a boolean operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanStats {
    /// Convex polygons mesh A was split into.
    pub polygons_a: usize,
    /// Convex polygons mesh B was split into.
    pub polygons_b: usize,
    /// Polygons that survived clipping.
    pub polygons_out: usize,
    /// Polygons cut in two by a BSP plane.
    pub splits: usize,
    /// Corners merged while stitching.
    pub vertices_welded: usize,
    /// Vertices inserted into neighbouring loops while stitching.
    pub t_junctions: usize,
    /// Edges of the result used by a single face.
    pub boundary_edges: usize,
    /// Whether the bounding boxes overlapped, so the BSP path ran.
    pub overlapping: bool,
}

/// Result of a boolean operation.
#[derive(Debug)]
pub struct BooleanOperationResult {
    /// The resulting mesh.
    pub mesh: IndexedMesh,
    /// Statistics about the operation.
    pub stats: BooleanStats,
}

/// Perform a boolean operation on two meshes.
///
/// Disjoint bounding boxes take a fast path: union appends, difference
/// returns A, intersection is empty. The result may be empty; callers that
/// need a solid check it.
///
/// # Errors
///
/// Returns [`BooleanError::InvalidOperand`] (tagged `"A"` or `"B"`) if
/// either mesh is empty or invalid.
///
/// # Example
///
/// ```
/// use mesh_boolean::{boolean_operation, BooleanConfig, BooleanOp};
/// use mesh_types::{unit_cube, MeshBounds, Vector3};
///
/// let a = unit_cube();
/// let mut b = unit_cube();
/// b.translate(Vector3::new(0.5, 0.0, 0.0));
///
/// let result = boolean_operation(&a, &b, BooleanOp::Union, &BooleanConfig::default()).unwrap();
/// assert_eq!(result.stats.boundary_edges, 0);
/// assert!((result.mesh.bounds().size().x - 1.5).abs() < 1e-9);
/// ```
pub fn boolean_operation(
    mesh_a: &IndexedMesh,
    mesh_b: &IndexedMesh,
    operation: BooleanOp,
    config: &BooleanConfig,
) -> BooleanResult<BooleanOperationResult> {
    for (mesh, tag) in [(mesh_a, "A"), (mesh_b, "B")] {
        mesh.validate_non_empty(tag)
            .map_err(|source| BooleanError::InvalidOperand {
                tag: tag.to_string(),
                source,
            })?;
    }

    let margin = config.vertex_weld_tolerance + config.plane_epsilon;
    if !mesh_a.bounds().expanded(margin).intersects(&mesh_b.bounds()) {
        return Ok(disjoint(mesh_a, mesh_b, operation));
    }

    let polygons_a = to_polygons(mesh_a, config.plane_epsilon);
    let polygons_b = to_polygons(mesh_b, config.plane_epsilon);
    let mut stats = BooleanStats {
        polygons_a: polygons_a.len(),
        polygons_b: polygons_b.len(),
        overlapping: true,
        ..BooleanStats::default()
    };

    let mut a = BspTree::build(polygons_a, config.plane_epsilon);
    let mut b = BspTree::build(polygons_b, config.plane_epsilon);
    let mut flip_result = false;
    match operation {
        BooleanOp::Union => {
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
        }
        BooleanOp::Difference => {
            a.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
            flip_result = true;
        }
        BooleanOp::Intersect => {
            a.invert();
            b.clip_to(&a);
            b.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            flip_result = true;
        }
    }
    stats.splits = a.splits + b.splits;

    let mut polygons = a.into_polygons();
    polygons.extend(b.into_polygons());
    if flip_result {
        for polygon in &mut polygons {
            polygon.flip();
        }
    }
    stats.polygons_out = polygons.len();

    let mesh = stitch(&polygons, config, &mut stats);
    debug!(
        %operation,
        polygons_in = stats.polygons_a + stats.polygons_b,
        polygons_out = stats.polygons_out,
        splits = stats.splits,
        t_junctions = stats.t_junctions,
        boundary_edges = stats.boundary_edges,
        "evaluated boolean"
    );
    Ok(BooleanOperationResult { mesh, stats })
}

/// Handle meshes whose bounding boxes do not touch.
fn disjoint(mesh_a: &IndexedMesh, mesh_b: &IndexedMesh, operation: BooleanOp) -> BooleanOperationResult {
    let mesh = match operation {
        BooleanOp::Union => {
            let mut combined = mesh_a.clone();
            combined.append(mesh_b);
            combined
        }
        BooleanOp::Difference => mesh_a.clone(),
        BooleanOp::Intersect => IndexedMesh::new(),
    };
    let boundary_edges = MeshAdjacency::build(&mesh.faces).boundary_edge_count();
    BooleanOperationResult {
        mesh,
        stats: BooleanStats {
            boundary_edges,
            ..BooleanStats::default()
        },
    }
}

/// Convert every face into one convex polygon, or into triangles when
/// the loop is non-convex or bends out of its plane.
fn to_polygons(mesh: &IndexedMesh, epsilon: f64) -> Vec<Polygon> {
    let mut polygons = Vec::with_capacity(mesh.faces.len());
    for fi in 0..mesh.faces.len() {
        let points = mesh.face_positions(fi);
        let Some(normal) = polygon::normal(&points) else {
            continue;
        };
        if points.len() == 3
            || (polygon::is_convex(&points, &normal, 0.0) && polygon::planarity_error(&points) <= epsilon)
        {
            let centroid = polygon::centroid(&points);
            polygons.push(Polygon {
                points: points.to_vec(),
                plane: Plane::new(normal, &centroid),
            });
            continue;
        }
        for [i, j, k] in polygon::triangulate(&points) {
            let triangle = vec![points[i], points[j], points[k]];
            if let Some(normal) = polygon::normal(&triangle) {
                polygons.push(Polygon {
                    plane: Plane::new(normal, &triangle[0]),
                    points: triangle,
                });
            }
        }
    }
    polygons
}

/// Weld a polygon soup into an indexed mesh and close its T-junctions.
fn stitch(polygons: &[Polygon], config: &BooleanConfig, stats: &mut BooleanStats) -> IndexedMesh {
    let corner_count = polygons.iter().map(|p| p.points.len()).sum();
    let mut mesh = IndexedMesh::with_capacity(corner_count, polygons.len());
    for polygon in polygons {
        let start = mesh.vertices.len() as u32;
        for point in &polygon.points {
            mesh.push_vertex(*point);
        }
        mesh.push_face(start..start + polygon.points.len() as u32);
    }

    let tolerance = config.vertex_weld_tolerance;
    stats.vertices_welded = weld_vertices(&mut mesh, tolerance);
    if config.cleanup != CleanupLevel::None {
        stats.t_junctions = insert_t_junctions(&mut mesh, tolerance);
    }
    if config.cleanup == CleanupLevel::Full {
        limited_dissolve(&mut mesh, COPLANAR_ANGLE);
        recalculate_normals(&mut mesh);
    }
    stats.boundary_edges = MeshAdjacency::build(&mesh.faces).boundary_edge_count();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{box_shape, unit_cube, Point3, Vector3};

    fn cube_at(x: f64, y: f64, z: f64) -> IndexedMesh {
        let mut mesh = unit_cube();
        mesh.translate(Vector3::new(x, y, z));
        mesh
    }

    fn run(a: &IndexedMesh, b: &IndexedMesh, op: BooleanOp) -> BooleanOperationResult {
        boolean_operation(a, b, op, &BooleanConfig::default()).unwrap()
    }

    #[test]
    fn disjoint_union_appends() {
        let result = run(&cube_at(0.0, 0.0, 0.0), &cube_at(5.0, 0.0, 0.0), BooleanOp::Union);
        assert!(!result.stats.overlapping);
        assert_eq!(result.mesh.faces.len(), 12);
        assert_eq!(result.mesh.component_count(), 2);
    }

    #[test]
    fn disjoint_difference_keeps_base() {
        let a = cube_at(0.0, 0.0, 0.0);
        let result = run(&a, &cube_at(5.0, 0.0, 0.0), BooleanOp::Difference);
        assert_eq!(result.mesh, a);
    }

    #[test]
    fn disjoint_intersection_is_empty() {
        let result = run(&cube_at(0.0, 0.0, 0.0), &cube_at(5.0, 0.0, 0.0), BooleanOp::Intersect);
        assert!(result.mesh.faces.is_empty());
    }

    #[test]
    fn overlapping_union_is_closed() {
        let result = run(&cube_at(0.0, 0.0, 0.0), &cube_at(0.5, 0.5, 0.5), BooleanOp::Union);
        assert!(result.stats.overlapping);
        assert_eq!(result.stats.boundary_edges, 0);
        assert_relative_eq!(result.mesh.volume(), 2.0 - 0.125, epsilon = 1e-9);
    }

    #[test]
    fn difference_carves_a_notch() {
        let result = run(&cube_at(0.0, 0.0, 0.0), &cube_at(0.5, 0.5, 0.5), BooleanOp::Difference);
        assert_eq!(result.stats.boundary_edges, 0);
        assert_relative_eq!(result.mesh.volume(), 1.0 - 0.125, epsilon = 1e-9);
        assert!(result.mesh.signed_volume() > 0.0);
    }

    #[test]
    fn intersection_keeps_the_overlap() {
        let result = run(&cube_at(0.0, 0.0, 0.0), &cube_at(0.5, 0.5, 0.5), BooleanOp::Intersect);
        assert_eq!(result.stats.boundary_edges, 0);
        assert_relative_eq!(result.mesh.volume(), 0.125, epsilon = 1e-9);
        let bounds = result.mesh.bounds();
        assert_relative_eq!(bounds.min, Point3::new(0.5, 0.5, 0.5), epsilon = 1e-9);
        assert_relative_eq!(bounds.max, Point3::new(1.0, 1.0, 1.0), epsilon = 1e-9);
    }

    #[test]
    fn full_cleanup_merges_fragments() {
        let config = BooleanConfig::default().with_cleanup(CleanupLevel::Full);
        let a = box_shape(2.0, 1.0, 1.0).into_mesh();
        let mut b = box_shape(1.0, 1.0, 1.0).into_mesh();
        b.translate(Vector3::new(1.0, 0.0, 0.0));
        let fast = boolean_operation(&a, &b, BooleanOp::Union, &BooleanConfig::default()).unwrap();
        let full = boolean_operation(&a, &b, BooleanOp::Union, &config).unwrap();
        assert_eq!(full.stats.boundary_edges, 0);
        assert_relative_eq!(full.mesh.volume(), 2.5, epsilon = 1e-9);
        assert!(full.mesh.faces.len() < fast.mesh.faces.len());
    }

    #[test]
    fn empty_operand_is_rejected() {
        let err = boolean_operation(&IndexedMesh::new(), &unit_cube(), BooleanOp::Union, &BooleanConfig::default())
            .unwrap_err();
        assert!(matches!(err, BooleanError::InvalidOperand { ref tag, .. } if tag == "A"));
    }
}

//! Hulls over shapes: merged hulls, sliding-window chains and projected
//! footprints.
//!
//! Every operation consumes its input shapes. The result keeps the tag and
//! reference point of the first shape it was built from.

use mesh_boolean::{union, union_with_config, BooleanConfig};
use mesh_repair::{repair, RepairOptions};
use mesh_types::{IndexedMesh, Point3, Shape};
use tracing::{debug, info};

use crate::error::{HullError, HullResult};
use crate::quickhull::convex_hull;

/// Tag given to hulls built from bare points.
pub const HULL_TAG: &str = "hull";

/// Hull a point set, then clean it with the fold repair preset so
/// coplanar triangles merge back into polygons.
///
/// # Errors
///
/// See [`convex_hull`]. Cleaning failures are reported as
/// [`HullError::Repair`].
///
/// # Example
///
/// ```
/// use mesh_hull::hull_from_points;
/// use mesh_types::{MeshBounds, Point3};
///
/// let corners: Vec<Point3<f64>> = (0..8)
///     .map(|i| Point3::new(f64::from(i & 1), f64::from((i >> 1) & 1), f64::from((i >> 2) & 1)))
///     .collect();
///
/// let hull = hull_from_points(&corners).unwrap();
/// assert_eq!(hull.tag(), "hull");
/// assert!((hull.mesh().volume() - 1.0).abs() < 1e-9);
/// ```
pub fn hull_from_points(points: &[Point3<f64>]) -> HullResult<Shape> {
    let mesh = clean(convex_hull(points)?, HULL_TAG)?;
    Ok(Shape::new(mesh, HULL_TAG))
}

/// Hull everything in `shapes` plus `extra_points`.
///
/// The shapes are unioned first without per-step cleanup (a single shape
/// is used as is), the extra points are added as loose vertices, and the
/// hull spans the merged vertex set.
///
/// # Errors
///
/// - [`HullError::TooFewShapes`] if `shapes` is empty
/// - [`HullError::Boolean`] if the union fails
/// - any error of [`hull_from_points`]
pub fn hull_from_shapes(shapes: Vec<Shape>, extra_points: &[Point3<f64>]) -> HullResult<Shape> {
    if shapes.is_empty() {
        return Err(HullError::TooFewShapes { needed: 1, found: 0 });
    }
    let count = shapes.len();
    let mut merged = union_with_config(shapes, false, &BooleanConfig::lenient())?;
    add_points(&mut merged, extra_points);

    let hull = hull_of(&merged)?;
    debug!(tag = merged.tag(), shapes = count, extra = extra_points.len(), "hulled shapes");
    merged.replace_mesh(hull);
    Ok(merged)
}

/// Skin an ordered chain of shapes.
///
/// Every window of three consecutive shapes is hulled (over duplicates,
/// so the window overlap is reused), then all hulls are unioned
/// nearest-first with cleanup. Concavities between non-consecutive shapes
/// survive.
///
/// # Errors
///
/// - [`HullError::TooFewShapes`] for fewer than 3 shapes
/// - any error of [`hull_from_shapes`] or the union
///
/// # Example
///
/// ```
/// use mesh_hull::triangle_hulls;
/// use mesh_types::{box_shape, MeshBounds, Vector3};
///
/// let chain: Vec<_> = (0..4)
///     .map(|i| {
///         let mut cube = box_shape(1.0, 1.0, 1.0);
///         cube.translate(Vector3::new(f64::from(i) * 2.0, 0.0, 0.0));
///         cube
///     })
///     .collect();
///
/// let skinned = triangle_hulls(chain).unwrap();
/// assert_eq!(skinned.mesh().component_count(), 1);
/// assert!((skinned.mesh().bounds().size().x - 7.0).abs() < 1e-9);
/// ```
pub fn triangle_hulls(shapes: Vec<Shape>) -> HullResult<Shape> {
    if shapes.len() < 3 {
        return Err(HullError::TooFewShapes {
            needed: 3,
            found: shapes.len(),
        });
    }

    let mut hulls = Vec::with_capacity(shapes.len() - 2);
    for window in shapes.windows(3) {
        let copies = window.iter().map(|s| s.duplicate(s.tag())).collect();
        hulls.push(hull_from_shapes(copies, &[])?);
    }
    let count = hulls.len();
    drop(shapes);

    let skinned = union(hulls, true)?;
    info!(tag = skinned.tag(), hulls = count, "built triangle hulls");
    Ok(skinned)
}

/// Connect every shape to a flat footprint `drop_height` below its
/// reference point, and union the results.
///
/// Each shape is hulled together with a copy of its vertices projected
/// onto the horizontal plane at `location.z - drop_height`.
///
/// # Errors
///
/// - [`HullError::TooFewShapes`] if `shapes` is empty
/// - any error of the hull or the union
///
/// # Example
///
/// ```
/// use mesh_hull::bottom_hull;
/// use mesh_types::{box_shape, MeshBounds, Vector3};
///
/// let mut cube = box_shape(1.0, 1.0, 1.0);
/// cube.translate(Vector3::new(0.0, 0.0, 5.0));
///
/// let solid = bottom_hull(vec![cube], 10.0).unwrap();
/// let bounds = solid.mesh().bounds();
/// assert!((bounds.min.z + 5.0).abs() < 1e-9);
/// assert!((bounds.max.z - 5.5).abs() < 1e-9);
/// ```
pub fn bottom_hull(shapes: Vec<Shape>, drop_height: f64) -> HullResult<Shape> {
    if shapes.is_empty() {
        return Err(HullError::TooFewShapes { needed: 1, found: 0 });
    }

    let mut hulls = Vec::with_capacity(shapes.len());
    for mut shape in shapes {
        let floor = shape.location().z - drop_height;
        let footprint: Vec<Point3<f64>> = shape
            .mesh()
            .vertices
            .iter()
            .map(|v| Point3::new(v.position.x, v.position.y, floor))
            .collect();
        add_points(&mut shape, &footprint);
        let hull = hull_of(&shape)?;
        shape.replace_mesh(hull);
        hulls.push(shape);
    }
    Ok(union(hulls, true)?)
}

/// Append `points` to the shape's vertex set as loose vertices.
///
/// No faces reference them; they only matter to operations that read the
/// vertex set, such as hulls. Returns the number of points added.
pub fn add_points(shape: &mut Shape, points: &[Point3<f64>]) -> usize {
    let mesh = shape.mesh_mut();
    mesh.vertices.reserve(points.len());
    for point in points {
        mesh.push_vertex(*point);
    }
    points.len()
}

fn hull_of(shape: &Shape) -> HullResult<IndexedMesh> {
    let points: Vec<Point3<f64>> = shape.mesh().vertices.iter().map(|v| v.position).collect();
    clean(convex_hull(&points)?, shape.tag())
}

fn clean(mut mesh: IndexedMesh, tag: &str) -> HullResult<IndexedMesh> {
    repair(&mut mesh, &RepairOptions::fold()).map_err(|source| HullError::Repair {
        tag: tag.to_string(),
        source,
    })?;
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_repair::MeshAdjacency;
    use mesh_types::{box_shape, MeshBounds, Vector3};

    fn cube_at(x: f64, z: f64, tag: &str) -> Shape {
        let mut cube = box_shape(1.0, 1.0, 1.0);
        cube.translate(Vector3::new(x, 0.0, z));
        cube.set_tag(tag);
        cube
    }

    #[test]
    fn hull_from_points_merges_coplanar_triangles() {
        let shape = hull_from_points(&box_shape(2.0, 2.0, 2.0).into_mesh().vertices.iter().map(|v| v.position).collect::<Vec<_>>())
            .unwrap();
        assert_eq!(shape.mesh().faces.len(), 6);
        assert_relative_eq!(shape.mesh().volume(), 8.0, epsilon = 1e-9);
        assert_eq!(shape.location(), Point3::origin());
    }

    #[test]
    fn hull_from_shapes_bridges_two_cubes() {
        let hull = hull_from_shapes(vec![cube_at(0.0, 0.0, "a"), cube_at(3.0, 0.0, "b")], &[]).unwrap();
        assert_eq!(hull.tag(), "a");
        assert_relative_eq!(hull.mesh().volume(), 4.0, epsilon = 1e-9);
        assert!(MeshAdjacency::build(&hull.mesh().faces).is_watertight());
    }

    #[test]
    fn extra_points_extend_the_hull() {
        let hull = hull_from_shapes(vec![cube_at(0.0, 0.0, "a")], &[Point3::new(0.0, 0.0, 3.0)]).unwrap();
        assert_relative_eq!(hull.mesh().bounds().max.z, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn hull_needs_a_shape() {
        assert!(matches!(hull_from_shapes(Vec::new(), &[]), Err(HullError::TooFewShapes { found: 0, .. })));
        assert!(matches!(bottom_hull(Vec::new(), 1.0), Err(HullError::TooFewShapes { found: 0, .. })));
    }

    #[test]
    fn triangle_hulls_needs_three() {
        let err = triangle_hulls(vec![cube_at(0.0, 0.0, "a"), cube_at(2.0, 0.0, "b")]).unwrap_err();
        assert!(matches!(err, HullError::TooFewShapes { needed: 3, found: 2 }));
    }

    #[test]
    fn bottom_hull_reaches_the_floor() {
        let solid = bottom_hull(vec![cube_at(0.0, 5.0, "key")], 10.0).unwrap();
        let bounds = solid.mesh().bounds();
        assert_relative_eq!(bounds.min.z, -5.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.z, 5.5, epsilon = 1e-9);
        assert!(MeshAdjacency::build(&solid.mesh().faces).is_manifold());
        assert_eq!(solid.tag(), "key");
    }

    #[test]
    fn add_points_leaves_faces_alone() {
        let mut cube = cube_at(0.0, 0.0, "a");
        let faces = cube.mesh().faces.clone();
        assert_eq!(add_points(&mut cube, &[Point3::new(9.0, 9.0, 9.0)]), 1);
        assert_eq!(cube.mesh().vertices.len(), 9);
        assert_eq!(cube.mesh().faces, faces);
    }
}

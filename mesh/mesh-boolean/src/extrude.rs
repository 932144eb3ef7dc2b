//! Extrusion of outlines with holes.

use mesh_types::{extrude_poly, Shape, Vector3};

use crate::error::{BooleanError, BooleanResult};
use crate::multi::difference;

/// Extrude `outer` by `height` and subtract the extrusion of every hole.
///
/// Outlines are planar polygons in the XY plane, as built by
/// [`mesh_types::polyline`]. Holes are extruded slightly past both caps so
/// the subtraction never leaves coplanar skins.
///
/// # Errors
///
/// Returns [`BooleanError::InvalidOperand`] naming an outline that cannot
/// be extruded, or any error of the subtraction.
///
/// # Example
///
/// ```
/// use mesh_boolean::extrude_with_holes;
/// use mesh_types::polyline;
///
/// let plate = polyline(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]).unwrap();
/// let hole = polyline(&[[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0]]).unwrap();
///
/// let solid = extrude_with_holes(plate, vec![hole], 2.0).unwrap();
/// assert!((solid.mesh().volume() - 192.0).abs() < 1e-6);
/// ```
pub fn extrude_with_holes(outer: Shape, holes: Vec<Shape>, height: f64) -> BooleanResult<Shape> {
    let solid = extrude(outer, height)?;
    let margin = height.abs().max(1.0) * 1e-2;
    let sign = height.signum();

    let mut cutters = Vec::with_capacity(holes.len());
    for mut hole in holes {
        hole.translate(Vector3::new(0.0, 0.0, -sign * margin));
        cutters.push(extrude(hole, height + 2.0 * sign * margin)?);
    }
    difference(solid, cutters, true)
}

fn extrude(outline: Shape, height: f64) -> BooleanResult<Shape> {
    let tag = outline.tag().to_string();
    extrude_poly(outline, height).map_err(|source| BooleanError::InvalidOperand { tag, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_repair::MeshAdjacency;
    use mesh_types::{polyline, MeshBounds};

    fn square(min: f64, max: f64) -> Shape {
        polyline(&[[min, min], [max, min], [max, max], [min, max]]).unwrap()
    }

    #[test]
    fn hole_goes_all_the_way_through() {
        let solid = extrude_with_holes(square(0.0, 10.0), vec![square(4.0, 6.0)], 2.0).unwrap();
        let mesh = solid.mesh();
        assert!((mesh.volume() - 192.0).abs() < 1e-6);
        assert!(MeshAdjacency::build(&mesh.faces).is_manifold());
        let bounds = mesh.bounds();
        assert!((bounds.min.z).abs() < 1e-9);
        assert!((bounds.max.z - 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_holes_is_a_plain_prism() {
        let solid = extrude_with_holes(square(0.0, 2.0), Vec::new(), 3.0).unwrap();
        assert_eq!(solid.mesh().faces.len(), 6);
        assert!((solid.mesh().volume() - 12.0).abs() < 1e-9);
    }

    #[test]
    fn zero_height_is_rejected() {
        let err = extrude_with_holes(square(0.0, 2.0), Vec::new(), 0.0).unwrap_err();
        assert!(matches!(err, BooleanError::InvalidOperand { ref tag, .. } if tag == "polygon"));
    }
}

//! Crease marking.
//!
//! Marking never fails: a selection that matches nothing simply creases
//! no edges.

use mesh_region::{select_by_proximity, select_by_range, AxisRange, Selection};
use mesh_types::IndexedMesh;
use tracing::debug;

/// Default z-range of [`crease_base_vertices`], in mesh units.
pub const DEFAULT_BASE_CREASE_Z: (f64, f64) = (-1.0, 2.0);

/// Set `weight` on every edge whose two endpoints are selected.
///
/// The weight is clamped to `[0, 1]`; zero clears the crease. Returns the
/// number of edges touched.
///
/// # Example
///
/// ```
/// use mesh_region::{select_by_range, AxisRange};
/// use mesh_subdivide::crease;
/// use mesh_types::unit_cube;
///
/// let mut cube = unit_cube();
/// let top = select_by_range(&cube, None, None, Some(AxisRange::new(0.5, 2.0)));
/// assert_eq!(crease(&mut cube, &top, 1.0), 4);
/// assert!(cube.creases.is_sharp(4, 5));
/// ```
pub fn crease(mesh: &mut IndexedMesh, selection: &Selection, weight: f64) -> usize {
    let edges = selection.edges(mesh);
    for edge in &edges {
        mesh.creases.set(edge.0, edge.1, weight);
    }
    debug!(edges = edges.len(), weight, "creased selection");
    edges.len()
}

/// Fully crease the edges between vertices with z in `z_range`, keeping
/// the base of a case flat through smoothing.
pub fn crease_base_vertices(mesh: &mut IndexedMesh, z_range: impl Into<AxisRange>) -> usize {
    let selection = select_by_range(mesh, None, None, Some(z_range.into()));
    crease(mesh, &selection, 1.0)
}

/// Fully crease the edges between vertices lying within `tolerance` of a
/// vertex of `key_plate`, keeping the key mounting surface sharp.
pub fn crease_key_vertices(mesh: &mut IndexedMesh, key_plate: &IndexedMesh, tolerance: f64) -> usize {
    let selection = select_by_proximity(mesh, key_plate, tolerance);
    crease(mesh, &selection, 1.0)
}

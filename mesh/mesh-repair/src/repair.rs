//! The staged repair driver.
//!
//! [`repair`] runs the enabled stages in a fixed order and repeats the
//! whole sequence until a pass leaves the mesh unchanged, so running it on
//! its own output is a no-op. Vertex indices stay stable inside a pass;
//! vertices orphaned by the pass are compacted away at its end.

use std::fmt;

use mesh_region::Selection;
use mesh_types::{polygon, Face, IndexedMesh};
use tracing::{debug, info, warn};

use crate::decimate::collapse_masked;
use crate::degenerate::degenerate_masked;
use crate::dissolve::{dissolve_masked, join_triangles, prune_creases};
use crate::error::{RepairError, RepairResult};
use crate::holes::fill_holes_masked;
use crate::loose::loose_faces_masked;
use crate::manifold::{resolve_non_manifold, NonManifoldWarning};
use crate::mask::Mask;
use crate::orient::{beautify_masked, recalculate_normals, COPLANAR_ANGLE};
use crate::topology;
use crate::validate::{validate_mesh, MeshReport};
use crate::weld::weld_masked;

/// Holes with more edges than this are left open by default.
pub const DEFAULT_MAX_HOLE_EDGES: usize = 4;

/// Upper bound on full stage passes per call.
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Configuration for [`repair`].
///
/// Distances are in mesh units (typically millimeters), angles in radians.
/// `None` disables the corresponding stage.
///
/// # Example
///
/// ```
/// use mesh_repair::RepairOptions;
///
/// // The canonical post-boolean cleanup.
/// let options = RepairOptions::default();
/// assert_eq!(options.weld_distance, Some(0.01));
///
/// // Or start from a preset and adjust.
/// let options = RepairOptions::baseline()
///     .with_degenerate_threshold(0.001)
///     .with_recalc_normals(true);
/// assert!(!options.triangulate);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairOptions {
    /// Cap boundary loops with ear-clipped faces.
    ///
    /// Default: `true`
    pub fill_holes: bool,

    /// Longest boundary loop (in edges) that gets capped.
    ///
    /// Default: [`DEFAULT_MAX_HOLE_EDGES`]
    pub max_hole_edges: usize,

    /// Merge vertices within this distance.
    ///
    /// Default: `Some(0.01)`
    pub weld_distance: Option<f64>,

    /// Split polygons into triangles before dissolving.
    ///
    /// Default: `true`
    pub triangulate: bool,

    /// Join coplanar triangle pairs back into convex quads after dissolving.
    /// Only applies when `triangulate` is set.
    ///
    /// Default: `true`
    pub requad: bool,

    /// Merge adjacent faces whose normals differ by at most this angle and
    /// drop collinear vertices.
    ///
    /// Default: `Some(0.01)`
    pub dissolve_angle: Option<f64>,

    /// Collapse edges shorter than this and remove faces with area below
    /// its square.
    ///
    /// Default: `Some(1e-4)`
    pub degenerate_threshold: Option<f64>,

    /// Remove isolated faces and unreferenced vertices.
    ///
    /// Default: `true`
    pub delete_loose: bool,

    /// Collapse interior vertices whose faces lie within this angle of
    /// their mean plane.
    ///
    /// Default: `Some(0.001)`
    pub decimate_angle: Option<f64>,

    /// Check for boundary edges, multi-face edges and non-manifold vertices.
    ///
    /// Default: `true`
    pub detect_non_manifold: bool,

    /// Try one collapse of non-manifold vertex groups when defects are found.
    ///
    /// Default: `false`
    pub collapse_non_manifold: bool,

    /// Fail with [`RepairError::Exhausted`] when defects remain and the
    /// repair made no progress on them.
    ///
    /// Default: `false`
    pub require_manifold: bool,

    /// Flip coplanar triangle pairs to improve their minimum angle.
    ///
    /// Default: `false`
    pub beautify: bool,

    /// Make winding consistent and point closed components outward.
    ///
    /// Default: `true`
    pub recalc_normals: bool,

    /// Upper bound on full stage passes.
    ///
    /// Default: [`DEFAULT_MAX_PASSES`]
    pub max_passes: usize,
}

impl Default for RepairOptions {
    fn default() -> Self {
        Self {
            fill_holes: true,
            max_hole_edges: DEFAULT_MAX_HOLE_EDGES,
            weld_distance: Some(0.01),
            triangulate: true,
            requad: true,
            dissolve_angle: Some(0.01),
            degenerate_threshold: Some(1e-4),
            delete_loose: true,
            decimate_angle: Some(0.001),
            detect_non_manifold: true,
            collapse_non_manifold: false,
            require_manifold: false,
            beautify: false,
            recalc_normals: true,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl RepairOptions {
    /// The light pass run before smoothing: weld and degenerate dissolve,
    /// without reshaping faces or touching orientation.
    #[must_use]
    pub fn baseline() -> Self {
        Self {
            triangulate: false,
            requad: false,
            dissolve_angle: None,
            delete_loose: false,
            decimate_angle: None,
            recalc_normals: false,
            ..Self::default()
        }
    }

    /// Cleanup after each step of a boolean fold: weld, dissolve coplanar
    /// fragments, drop slivers and loose pieces, fix orientation.
    #[must_use]
    pub fn fold() -> Self {
        Self {
            fill_holes: false,
            triangulate: false,
            requad: false,
            decimate_angle: None,
            ..Self::default()
        }
    }

    /// Every stage disabled.
    #[must_use]
    pub fn none() -> Self {
        Self {
            fill_holes: false,
            max_hole_edges: DEFAULT_MAX_HOLE_EDGES,
            weld_distance: None,
            triangulate: false,
            requad: false,
            dissolve_angle: None,
            degenerate_threshold: None,
            delete_loose: false,
            decimate_angle: None,
            detect_non_manifold: false,
            collapse_non_manifold: false,
            require_manifold: false,
            beautify: false,
            recalc_normals: false,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Enable or disable hole filling.
    #[must_use]
    pub const fn with_fill_holes(mut self, enable: bool) -> Self {
        self.fill_holes = enable;
        self
    }

    /// Set the longest hole that gets filled.
    #[must_use]
    pub const fn with_max_hole_edges(mut self, edges: usize) -> Self {
        self.max_hole_edges = edges;
        self
    }

    /// Set the vertex welding distance.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_repair::RepairOptions;
    ///
    /// let options = RepairOptions::none().with_weld_distance(0.001);
    /// assert_eq!(options.weld_distance, Some(0.001));
    /// ```
    #[must_use]
    pub const fn with_weld_distance(mut self, distance: f64) -> Self {
        self.weld_distance = Some(distance);
        self
    }

    /// Enable or disable triangulation.
    #[must_use]
    pub const fn with_triangulate(mut self, enable: bool) -> Self {
        self.triangulate = enable;
        self
    }

    /// Enable or disable re-joining triangles into quads.
    #[must_use]
    pub const fn with_requad(mut self, enable: bool) -> Self {
        self.requad = enable;
        self
    }

    /// Set the limited dissolve angle.
    #[must_use]
    pub const fn with_dissolve_angle(mut self, angle: f64) -> Self {
        self.dissolve_angle = Some(angle);
        self
    }

    /// Set the degenerate edge length threshold.
    #[must_use]
    pub const fn with_degenerate_threshold(mut self, threshold: f64) -> Self {
        self.degenerate_threshold = Some(threshold);
        self
    }

    /// Enable or disable loose geometry removal.
    #[must_use]
    pub const fn with_delete_loose(mut self, enable: bool) -> Self {
        self.delete_loose = enable;
        self
    }

    /// Set the angle for flat vertex collapse.
    #[must_use]
    pub const fn with_decimate_angle(mut self, angle: f64) -> Self {
        self.decimate_angle = Some(angle);
        self
    }

    /// Enable or disable non-manifold detection.
    #[must_use]
    pub const fn with_detect_non_manifold(mut self, enable: bool) -> Self {
        self.detect_non_manifold = enable;
        self
    }

    /// Enable or disable the non-manifold collapse retry.
    #[must_use]
    pub const fn with_collapse_non_manifold(mut self, enable: bool) -> Self {
        self.collapse_non_manifold = enable;
        self
    }

    /// Make unresolved non-manifold geometry an error.
    #[must_use]
    pub const fn with_require_manifold(mut self, require: bool) -> Self {
        self.require_manifold = require;
        self
    }

    /// Enable or disable triangle beautification.
    #[must_use]
    pub const fn with_beautify(mut self, enable: bool) -> Self {
        self.beautify = enable;
        self
    }

    /// Enable or disable normal recalculation.
    #[must_use]
    pub const fn with_recalc_normals(mut self, enable: bool) -> Self {
        self.recalc_normals = enable;
        self
    }

    /// Set the maximum number of full passes.
    #[must_use]
    pub const fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes;
        self
    }
}

/// Summary of a [`repair`] call.
///
/// Stage counts only include passes that changed the mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    /// Boundary loops capped.
    pub holes_filled: usize,
    /// Boundary loops left open.
    pub holes_skipped: usize,
    /// Vertices merged away by welding.
    pub vertices_welded: usize,
    /// Polygons split into triangles.
    pub faces_triangulated: usize,
    /// Faces absorbed by limited dissolve.
    pub faces_merged: usize,
    /// Triangle pairs joined into quads.
    pub quads_joined: usize,
    /// Collinear vertices dissolved.
    pub vertices_dissolved: usize,
    /// Short edges collapsed plus sliver faces removed.
    pub degenerate_removed: usize,
    /// Vertices inserted into neighbouring edges.
    pub t_junctions_resolved: usize,
    /// Loose faces and vertices removed.
    pub loose_removed: usize,
    /// Vertices removed by flat collapse or the non-manifold retry.
    pub vertices_collapsed: usize,
    /// Triangle pair edges flipped.
    pub triangles_flipped: usize,
    /// Faces whose winding was reversed.
    pub faces_reoriented: usize,
    /// Full passes run, including the final unchanged one.
    pub passes: usize,
    /// A pass made the mesh worse and was undone.
    pub rolled_back: bool,
    /// Validation of the final mesh.
    pub final_report: MeshReport,
    /// Defects left after repair, if any were checked for and found.
    pub warning: Option<NonManifoldWarning>,
}

impl RepairReport {
    /// Whether any stage modified the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.change_count() > 0
    }

    fn change_count(&self) -> usize {
        self.holes_filled
            + self.vertices_welded
            + self.faces_triangulated
            + self.faces_merged
            + self.quads_joined
            + self.vertices_dissolved
            + self.degenerate_removed
            + self.t_junctions_resolved
            + self.loose_removed
            + self.vertices_collapsed
            + self.triangles_flipped
            + self.faces_reoriented
    }

    fn absorb(&mut self, pass: &Self) {
        self.holes_filled += pass.holes_filled;
        self.holes_skipped = pass.holes_skipped;
        self.vertices_welded += pass.vertices_welded;
        self.faces_triangulated += pass.faces_triangulated;
        self.faces_merged += pass.faces_merged;
        self.quads_joined += pass.quads_joined;
        self.vertices_dissolved += pass.vertices_dissolved;
        self.degenerate_removed += pass.degenerate_removed;
        self.t_junctions_resolved += pass.t_junctions_resolved;
        self.loose_removed += pass.loose_removed;
        self.vertices_collapsed += pass.vertices_collapsed;
        self.triangles_flipped += pass.triangles_flipped;
        self.faces_reoriented += pass.faces_reoriented;
    }
}

impl fmt::Display for RepairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Repair Report ({} passes):", self.passes)?;
        let stages = [
            ("Holes filled", self.holes_filled),
            ("Holes left open", self.holes_skipped),
            ("Vertices welded", self.vertices_welded),
            ("Faces triangulated", self.faces_triangulated),
            ("Faces merged", self.faces_merged),
            ("Quads joined", self.quads_joined),
            ("Vertices dissolved", self.vertices_dissolved),
            ("Degenerate removed", self.degenerate_removed),
            ("T-junctions resolved", self.t_junctions_resolved),
            ("Loose removed", self.loose_removed),
            ("Vertices collapsed", self.vertices_collapsed),
            ("Triangles flipped", self.triangles_flipped),
            ("Faces reoriented", self.faces_reoriented),
        ];
        for (label, count) in stages.iter().filter(|(_, c)| *c > 0) {
            writeln!(f, "  {label}: {count}")?;
        }
        if self.rolled_back {
            writeln!(f, "  Rolled back: a pass made the mesh worse")?;
        }
        if let Some(warning) = &self.warning {
            writeln!(f, "  Warning: {warning}")?;
        }
        write!(f, "{}", self.final_report)
    }
}

/// Repair a mesh in place.
///
/// Stages run in order: fill holes, weld, triangulate, limited dissolve
/// (then requad), dissolve degenerate, delete loose, flat vertex collapse,
/// non-manifold detection, beautify and normal recalculation. The sequence
/// repeats until a pass changes nothing, bounded by `max_passes`.
///
/// A pass that leaves more boundary edges, non-manifold edges or vertices,
/// or degenerate faces than it started with is undone and ends the repair;
/// the report marks the rollback. The output is therefore never less
/// closed or less manifold than the input.
///
/// # Errors
///
/// Returns [`RepairError::InvalidMesh`] if the mesh references missing
/// vertices or has non-finite coordinates, and [`RepairError::Exhausted`]
/// when `require_manifold` is set and defects remain without progress. On
/// error the mesh is left as it was passed in.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::{repair, RepairOptions};
///
/// let mut mesh = unit_cube();
/// mesh.faces.remove(1); // Open the top
///
/// let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
/// assert_eq!(report.holes_filled, 1);
/// assert!(report.final_report.is_printable());
/// assert!(report.warning.is_none());
/// ```
pub fn repair(mesh: &mut IndexedMesh, options: &RepairOptions) -> RepairResult<RepairReport> {
    mesh.validate()?;
    run(mesh, options, Mask::All)
}

/// Repair only geometry whose vertices are all in `selection`.
///
/// Welding, dissolving, collapsing and hole filling never move or merge a
/// vertex outside the selection; orientation is still fixed globally.
///
/// # Errors
///
/// As [`repair`].
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, Point3};
/// use mesh_region::{select_by_range, AxisRange};
/// use mesh_repair::{repair_region, RepairOptions};
///
/// let mut mesh = unit_cube();
/// // A duplicate of vertex 0 near the bottom and of vertex 6 near the top.
/// let low = mesh.push_vertex(Point3::new(0.0, 0.0, 0.001));
/// let high = mesh.push_vertex(Point3::new(1.0, 1.0, 0.999));
/// mesh.faces[4] = [low, 4, 7, 3].into_iter().collect();
/// mesh.faces[1] = [4, 5, high, 7].into_iter().collect();
///
/// let top = select_by_range(&mesh, None, None, Some(AxisRange::new(0.5, 2.0)));
/// let report = repair_region(&mut mesh, &top, &RepairOptions::none().with_weld_distance(0.01)).unwrap();
/// assert_eq!(report.vertices_welded, 1);
/// ```
pub fn repair_region(
    mesh: &mut IndexedMesh,
    selection: &Selection,
    options: &RepairOptions,
) -> RepairResult<RepairReport> {
    mesh.validate()?;
    let mask = Mask::from_selection(selection, mesh.vertices.len());
    run(mesh, options, mask)
}

fn run(mesh: &mut IndexedMesh, options: &RepairOptions, mut mask: Mask) -> RepairResult<RepairReport> {
    let original = mesh.clone();
    let input = validate_mesh(mesh);
    let initial_defects = input.topology_defects();
    let mut current = input;
    let mut report = RepairReport::default();
    let mut warning = None;

    for pass in 0..options.max_passes.max(1) {
        let before = mesh.clone();
        let before_mask = mask.clone();
        let (pass_report, pass_warning) = run_pass(mesh, options, &mut mask);
        report.passes = pass + 1;
        if *mesh == before {
            warning = pass_warning;
            break;
        }

        let output = validate_mesh(mesh);
        if is_worse(&output, &current) {
            warn!(
                pass = pass + 1,
                defects_before = current.topology_defects(),
                defects_after = output.topology_defects(),
                degenerate_before = current.degenerate_face_count,
                degenerate_after = output.degenerate_face_count,
                "repair pass made the mesh worse, undoing it"
            );
            *mesh = before;
            mask = before_mask;
            report.rolled_back = true;
            warning = options
                .detect_non_manifold
                .then(|| NonManifoldWarning::detect(mesh))
                .flatten();
            break;
        }

        warning = pass_warning;
        current = output;
        report.absorb(&pass_report);
        debug!(pass = pass + 1, changes = pass_report.change_count(), "repair pass");
    }

    if let Some(remaining) = &warning {
        if options.require_manifold && remaining.defects() >= initial_defects {
            *mesh = original;
            return Err(RepairError::Exhausted {
                remaining: remaining.defects(),
                attempts: usize::from(options.collapse_non_manifold),
            });
        }
        warn!(
            boundary_edges = remaining.boundary_edges,
            non_manifold_edges = remaining.non_manifold_edges,
            non_manifold_vertices = remaining.non_manifold_vertices,
            "{remaining}"
        );
    }

    report.final_report = current;
    report.warning = warning;
    info!(
        passes = report.passes,
        changes = report.change_count(),
        faces = report.final_report.face_count,
        vertices = report.final_report.vertex_count,
        "mesh repair complete"
    );
    Ok(report)
}

/// Open edges plus multi-face edges plus pinched vertices may not grow,
/// and neither may multi-face edges or slivers on their own.
fn is_worse(after: &MeshReport, before: &MeshReport) -> bool {
    after.topology_defects() > before.topology_defects()
        || after.non_manifold_edge_count > before.non_manifold_edge_count
        || after.degenerate_face_count > before.degenerate_face_count
}

fn run_pass(
    mesh: &mut IndexedMesh,
    options: &RepairOptions,
    mask: &mut Mask,
) -> (RepairReport, Option<NonManifoldWarning>) {
    let mut report = RepairReport::default();
    let before = mesh.clone();
    let loose_at_start = unreferenced(mesh);

    if options.fill_holes {
        let summary = fill_holes_masked(mesh, options.max_hole_edges, options.weld_distance, mask);
        report.holes_filled = summary.filled;
        report.holes_skipped = summary.skipped;
    }
    if let Some(distance) = options.weld_distance {
        report.vertices_welded = weld_masked(mesh, distance, mask);
        if report.vertices_welded > 0 {
            topology::remove_duplicate_faces(mesh);
        }
    }
    if options.triangulate {
        report.faces_triangulated = triangulate_masked(mesh, mask);
    }
    if let Some(angle) = options.dissolve_angle {
        let summary = dissolve_masked(mesh, angle, mask);
        report.faces_merged = summary.faces_merged;
        report.vertices_dissolved = summary.vertices_dissolved;
    }
    if options.triangulate && options.requad {
        let angle = options.dissolve_angle.unwrap_or(COPLANAR_ANGLE);
        report.quads_joined = join_triangles(mesh, angle, mask);
    }
    if let Some(threshold) = options.degenerate_threshold {
        let summary = degenerate_masked(mesh, threshold, mask);
        report.degenerate_removed = summary.edges_collapsed + summary.faces_removed;
        report.t_junctions_resolved = summary.t_junctions;
    }
    if options.delete_loose {
        report.loose_removed = loose_faces_masked(mesh, mask);
    }
    if let Some(angle) = options.decimate_angle {
        report.vertices_collapsed = collapse_masked(mesh, angle, mask);
    }

    let mut warning = None;
    if options.detect_non_manifold {
        let outcome = resolve_non_manifold(mesh, options.collapse_non_manifold, mask);
        report.vertices_collapsed += outcome.vertices_collapsed;
        warning = outcome.warning;
    }
    if options.beautify {
        report.triangles_flipped = beautify_masked(mesh, mask);
    }
    if options.recalc_normals {
        report.faces_reoriented = recalculate_normals(mesh);
    }

    // Vertices loose before the pass survive unless loose removal covers them.
    let keep: Vec<bool> = loose_at_start
        .iter()
        .enumerate()
        .map(|(v, &loose)| loose && !(options.delete_loose && mask.allows(v as u32)))
        .collect();
    if let Some(remap) = topology::compact_except(mesh, &keep) {
        if options.delete_loose {
            report.loose_removed += remap
                .iter()
                .zip(&loose_at_start)
                .filter(|(target, &loose)| loose && target.is_none())
                .count();
        }
        mask.remap(&remap, mesh.vertices.len());
    }
    prune_creases(mesh);

    if *mesh != before {
        topology::canonicalize(mesh);
    }
    (report, warning)
}

/// Vertices referenced by no face.
fn unreferenced(mesh: &IndexedMesh) -> Vec<bool> {
    let mut loose = vec![true; mesh.vertices.len()];
    for face in &mesh.faces {
        for &v in face {
            loose[v as usize] = false;
        }
    }
    loose
}

/// Ear-clip every polygon whose vertices are all allowed by `mask`.
fn triangulate_masked(mesh: &mut IndexedMesh, mask: &Mask) -> usize {
    if matches!(mask, Mask::All) {
        return mesh.triangulate();
    }
    let mut split = 0;
    let mut faces = Vec::with_capacity(mesh.faces.len());
    for (fi, face) in mesh.faces.iter().enumerate() {
        if face.len() <= 3 || !mask.allows_all(face) {
            faces.push(face.clone());
            continue;
        }
        split += 1;
        for [a, b, c] in polygon::triangulate(&mesh.face_positions(fi)) {
            faces.push(Face::from_slice(&[face[a], face[b], face[c]]));
        }
    }
    mesh.faces = faces;
    split
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::{box_shape, unit_cube, Point3};

    fn soup(mesh: &IndexedMesh) -> IndexedMesh {
        let mut out = IndexedMesh::new();
        for face in &mesh.faces {
            let start = out.vertices.len() as u32;
            for &v in face {
                out.vertices.push(mesh.vertices[v as usize]);
            }
            out.push_face(start..start + face.len() as u32);
        }
        out
    }

    #[test]
    fn clean_cube_round_trips() {
        let mut mesh = unit_cube();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert!(report.final_report.is_printable());
        assert!(report.warning.is_none());
        assert!(!report.rolled_back);
        assert_eq!(mesh.faces.len(), 6);
        assert_eq!(mesh.vertices.len(), 8);
    }

    #[test]
    fn opening_a_closed_mesh_counts_as_worse() {
        let closed = unit_cube();
        let mut open = closed.clone();
        open.faces.pop();
        let (closed, open) = (validate_mesh(&closed), validate_mesh(&open));

        assert!(is_worse(&open, &closed));
        assert!(!is_worse(&closed, &open));
        assert!(!is_worse(&closed, &closed));
    }

    #[test]
    fn repair_is_idempotent() {
        let mut mesh = soup(&box_shape(2.0, 1.0, 3.0).into_mesh());
        repair(&mut mesh, &RepairOptions::default()).unwrap();
        let once = mesh.clone();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(mesh, once);
        assert!(!report.had_changes());
        assert_eq!(report.passes, 1);
    }

    #[test]
    fn soup_is_welded_closed() {
        let mut mesh = soup(&unit_cube());
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.vertices_welded, 16);
        assert_eq!(report.holes_filled, 0);
        assert!(report.final_report.is_printable());
        assert_eq!(mesh.vertices.len(), 8);
    }

    #[test]
    fn none_is_a_no_op() {
        let mut mesh = soup(&unit_cube());
        let before = mesh.clone();
        let report = repair(&mut mesh, &RepairOptions::none()).unwrap();
        assert_eq!(mesh, before);
        assert!(!report.had_changes());
    }

    #[test]
    fn inverted_cube_is_turned_outward() {
        let mut mesh = unit_cube();
        mesh.flip_normals();
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.faces_reoriented, 6);
        assert!(mesh.signed_volume() > 0.0);
    }

    #[test]
    fn invalid_index_is_rejected() {
        let mut mesh = unit_cube();
        mesh.push_face([0, 1, 42]);
        let before = mesh.clone();
        let err = repair(&mut mesh, &RepairOptions::default()).unwrap_err();
        assert!(matches!(err, RepairError::InvalidMesh(_)));
        assert_eq!(mesh, before);
    }

    #[test]
    fn open_mesh_warns_unless_required() {
        let mut mesh = unit_cube();
        mesh.faces.remove(1);
        let options = RepairOptions::default().with_fill_holes(false);
        let report = repair(&mut mesh, &options).unwrap();
        assert_eq!(report.warning.map(|w| w.boundary_edges), Some(4));

        let err = repair(&mut mesh, &options.with_require_manifold(true)).unwrap_err();
        assert!(matches!(err, RepairError::Exhausted { remaining: 4, attempts: 0 }));
    }

    #[test]
    fn loose_vertices_survive_without_delete_loose() {
        let mut mesh = unit_cube();
        mesh.push_vertex(Point3::new(9.0, 9.0, 9.0));
        repair(&mut mesh, &RepairOptions::baseline()).unwrap();
        assert_eq!(mesh.vertices.len(), 9);

        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        assert_eq!(report.loose_removed, 1);
        assert_eq!(mesh.vertices.len(), 8);
    }

    #[test]
    fn report_display_lists_changes() {
        let mut mesh = soup(&unit_cube());
        let report = repair(&mut mesh, &RepairOptions::default()).unwrap();
        let text = report.to_string();
        assert!(text.contains("Vertices welded: 16"));
        assert!(text.contains("Watertight: Yes"));
    }
}

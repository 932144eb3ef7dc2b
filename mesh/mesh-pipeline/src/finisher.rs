//! The case finishing run.

use mesh_boolean::union;
use mesh_region::{select_by_proximity, select_by_range, select_complement};
use mesh_repair::{repair, repair_region, NonManifoldWarning, RepairOptions, RepairReport};
use mesh_subdivide::{
    crease_base_vertices, crease_key_vertices, subdivide_edges, subdivide_mesh, SubdivideParams, SubdivisionMode,
};
use mesh_types::{IndexedMesh, Shape};
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult, Stage, StageError};

/// Shape tag reported when there are no primitives to assemble.
const NO_PRIMITIVES: &str = "<no primitives>";

/// Output of a finishing run.
#[derive(Debug, Clone)]
pub struct FinishedCase {
    /// The smoothed, cleaned case.
    pub shape: Shape,
    /// Tagged copies taken along the way, in order. Empty unless
    /// snapshots were requested.
    pub snapshots: Vec<Shape>,
    /// Edges creased along the base.
    pub base_creases: usize,
    /// Edges creased along the key plate.
    pub key_creases: usize,
    /// Report of the cleanup after assembly.
    pub baseline_report: RepairReport,
    /// Report of the limited dissolve before smoothing.
    pub dissolve_report: RepairReport,
    /// Report of the final cleanup.
    pub cleanup_report: RepairReport,
}

impl FinishedCase {
    /// The snapshot taken at `stage`, if any.
    #[must_use]
    pub fn snapshot(&self, stage: Stage) -> Option<&Shape> {
        let name = stage.snapshot_name()?;
        self.snapshots.iter().find(|s| s.tag() == name)
    }

    /// Defects left by the final cleanup.
    #[must_use]
    pub fn warning(&self) -> Option<NonManifoldWarning> {
        self.cleanup_report.warning
    }
}

/// Runs the finishing steps on a keyboard case.
///
/// 1. assemble the primitives with a cleaned nearest-first union
/// 2. baseline cleanup
/// 3. limited dissolve away from the key plate and the base
/// 4. optional presmooth and 5. optional edge cuts
/// 6. base crease and 7. optional key crease
/// 8. Catmull-Clark smoothing
/// 9. final cleanup
///
/// The first failing step stops the run.
///
/// # Example
///
/// ```
/// use mesh_pipeline::{CaseFinisher, PipelineConfig};
/// use mesh_types::{box_shape, MeshBounds, Vector3};
///
/// let mut wall = box_shape(20.0, 4.0, 8.0);
/// wall.translate(Vector3::new(0.0, 0.0, 4.0));
/// let mut post = box_shape(4.0, 12.0, 8.0);
/// post.translate(Vector3::new(8.0, 4.0, 4.0));
///
/// let finisher = CaseFinisher::new(PipelineConfig::preview());
/// let case = finisher.finish(vec![wall, post], None).unwrap();
///
/// // The creased base stays flat on the build plate.
/// assert!(case.shape.mesh().bounds().min.z.abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CaseFinisher {
    config: PipelineConfig,
}

impl CaseFinisher {
    /// Create a finisher.
    #[must_use]
    pub const fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Assemble `primitives` and finish the result.
    ///
    /// The case keeps the tag and location of the first primitive.
    ///
    /// # Errors
    ///
    /// A [`PipelineError`] naming the failed [`Stage`]; an empty
    /// `primitives` list fails at [`Stage::Assemble`].
    pub fn finish(&self, primitives: Vec<Shape>, key_plate: Option<&IndexedMesh>) -> PipelineResult<FinishedCase> {
        let tag = primitives.first().map_or(NO_PRIMITIVES, Shape::tag).to_string();
        let count = primitives.len();
        let shape = union(primitives, true).map_err(at(Stage::Assemble, &tag))?;
        info!(
            shape = %tag,
            primitives = count,
            faces = shape.mesh().faces.len(),
            "assembled case"
        );

        let mut snapshots = Vec::new();
        self.snapshot(&mut snapshots, &shape, Stage::Assemble);
        self.run(shape, key_plate, snapshots)
    }

    /// Finish an already assembled shape.
    ///
    /// # Errors
    ///
    /// A [`PipelineError`] naming the failed [`Stage`]; an empty or
    /// invalid shape fails at [`Stage::BaselineCleanup`].
    pub fn finish_shape(&self, shape: Shape, key_plate: Option<&IndexedMesh>) -> PipelineResult<FinishedCase> {
        self.run(shape, key_plate, Vec::new())
    }

    fn run(
        &self,
        mut shape: Shape,
        key_plate: Option<&IndexedMesh>,
        mut snapshots: Vec<Shape>,
    ) -> PipelineResult<FinishedCase> {
        let config = &self.config;
        let tag = shape.tag().to_string();

        // The baseline snapshot is the shape as it enters the cleanup.
        shape.mesh().validate_non_empty(&tag).map_err(at(Stage::BaselineCleanup, &tag))?;
        self.snapshot(&mut snapshots, &shape, Stage::BaselineCleanup);
        let baseline_report = repair(shape.mesh_mut(), &config.baseline_cleanup).map_err(at(Stage::BaselineCleanup, &tag))?;
        debug!(shape = %tag, faces = shape.mesh().faces.len(), "baseline cleanup");

        let dissolve_report = self.dissolve(&mut shape, key_plate).map_err(at(Stage::Dissolve, &tag))?;

        if config.presmooth_levels > 0 {
            let params = self.subdivide_params(SubdivisionMode::Simple, config.presmooth_levels);
            let result = subdivide_mesh(shape.mesh(), &params).map_err(at(Stage::Presmooth, &tag))?;
            debug!(shape = %tag, %result, "presmoothed");
            shape.replace_mesh(result.mesh);
        }

        if config.presubdivide_cuts > 0 {
            let cut = subdivide_edges(shape.mesh(), config.presubdivide_cuts).map_err(at(Stage::Presubdivide, &tag))?;
            debug!(shape = %tag, cuts = config.presubdivide_cuts, faces = cut.faces.len(), "presubdivided");
            shape.replace_mesh(cut);
        }

        let base_creases = crease_base_vertices(shape.mesh_mut(), config.base_crease_z_range);
        self.snapshot(&mut snapshots, &shape, Stage::BaseCrease);

        let key_creases = match key_plate {
            Some(plate) if config.key_crease_tolerance > 0.0 => {
                let count = crease_key_vertices(shape.mesh_mut(), plate, config.key_crease_tolerance);
                self.snapshot(&mut snapshots, &shape, Stage::KeyCrease);
                count
            }
            _ => 0,
        };
        info!(shape = %tag, base = base_creases, key = key_creases, "creased edges");

        let params = self.subdivide_params(SubdivisionMode::PreserveTopology, config.smooth_levels);
        let smoothed = subdivide_mesh(shape.mesh(), &params).map_err(at(Stage::Smooth, &tag))?;
        info!(shape = %tag, %smoothed, "smoothed case");
        shape.replace_mesh(smoothed.mesh);
        self.snapshot(&mut snapshots, &shape, Stage::Smooth);

        let cleanup_report = repair(shape.mesh_mut(), &config.final_cleanup).map_err(at(Stage::FinalCleanup, &tag))?;
        self.snapshot(&mut snapshots, &shape, Stage::FinalCleanup);
        if let Some(warning) = cleanup_report.warning {
            warn!(shape = %tag, %warning, "finished case is not manifold");
        }

        info!(
            shape = %tag,
            faces = shape.mesh().faces.len(),
            vertices = shape.mesh().vertices.len(),
            snapshots = snapshots.len(),
            "case finished"
        );
        Ok(FinishedCase {
            shape,
            snapshots,
            base_creases,
            key_creases,
            baseline_report,
            dissolve_report,
            cleanup_report,
        })
    }

    /// Limited dissolve restricted to vertices that are neither near the
    /// key plate nor in the protected z-range.
    fn dissolve(&self, shape: &mut Shape, key_plate: Option<&IndexedMesh>) -> mesh_repair::RepairResult<RepairReport> {
        let config = &self.config;
        let mesh = shape.mesh();
        let mut protected = select_by_range(mesh, None, None, Some(config.dissolve_z_range.into()));
        if let Some(plate) = key_plate {
            protected = protected.union(&select_by_proximity(mesh, plate, config.shared_tolerance));
        }
        let region = select_complement(mesh, &protected);
        debug!(shape = shape.tag(), protected = protected.len(), free = region.len(), "dissolve region");

        let options = RepairOptions::none().with_dissolve_angle(config.dissolve_angle);
        repair_region(shape.mesh_mut(), &region, &options)
    }

    fn subdivide_params(&self, mode: SubdivisionMode, levels: u32) -> SubdivideParams {
        SubdivideParams::new()
            .with_mode(mode)
            .with_levels(levels)
            .with_max_faces(self.config.max_faces)
    }

    fn snapshot(&self, snapshots: &mut Vec<Shape>, shape: &Shape, stage: Stage) {
        if !self.config.keep_snapshots {
            return;
        }
        if let Some(name) = stage.snapshot_name() {
            snapshots.push(shape.duplicate(name));
        }
    }
}

/// Attribute an error to `stage` of the shape tagged `tag`.
fn at<E: Into<StageError>>(stage: Stage, tag: &str) -> impl FnOnce(E) -> PipelineError + '_ {
    move |source| PipelineError::new(stage, tag, source)
}

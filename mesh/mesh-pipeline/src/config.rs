//! Pipeline configuration.

use mesh_repair::RepairOptions;
use mesh_subdivide::DEFAULT_MAX_FACES;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Knobs of [`CaseFinisher`](crate::CaseFinisher).
///
/// Distances are in mesh units (millimetres for keyboard cases), angles in
/// radians, ranges are inclusive `(min, max)` pairs.
///
/// # Example
///
/// ```
/// use mesh_pipeline::PipelineConfig;
///
/// let config = PipelineConfig::default()
///     .with_smooth_levels(2)
///     .with_key_crease_tolerance(0.5)
///     .with_snapshots(true);
/// assert_eq!(config.presmooth_levels, 0);
/// assert!(config.keep_snapshots);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Levels of geometry-preserving subdivision before creasing.
    ///
    /// Default: `0`
    pub presmooth_levels: u32,

    /// Cuts per edge before creasing.
    ///
    /// Default: `0`
    pub presubdivide_cuts: u32,

    /// Catmull-Clark levels of the final smoothing.
    ///
    /// Default: `3`
    pub smooth_levels: u32,

    /// Vertices this close to the key plate get their edges fully creased.
    /// Zero disables key creasing.
    ///
    /// Default: `0.0`
    pub key_crease_tolerance: f64,

    /// Vertices this close to the key plate are kept out of the dissolve.
    ///
    /// Default: `1.0`
    pub shared_tolerance: f64,

    /// Vertices with z in this range are kept out of the dissolve.
    ///
    /// Default: `(0.0, 1.0)`
    pub dissolve_z_range: (f64, f64),

    /// Limited dissolve angle before smoothing.
    ///
    /// Default: `0.0175` (about one degree)
    pub dissolve_angle: f64,

    /// Edges between vertices with z in this range are fully creased.
    ///
    /// Default: `(-1.0, 2.0)`
    pub base_crease_z_range: (f64, f64),

    /// Repair pass right after assembly.
    ///
    /// Default: [`RepairOptions::baseline`]
    pub baseline_cleanup: RepairOptions,

    /// Repair pass after smoothing.
    ///
    /// Default: non-manifold detection only
    pub final_cleanup: RepairOptions,

    /// Face limit for the presmooth and smooth steps.
    ///
    /// Default: [`DEFAULT_MAX_FACES`]
    pub max_faces: usize,

    /// Keep a tagged copy of the shape after each major step.
    ///
    /// Default: `false`
    pub keep_snapshots: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            presmooth_levels: 0,
            presubdivide_cuts: 0,
            smooth_levels: 3,
            key_crease_tolerance: 0.0,
            shared_tolerance: 1.0,
            dissolve_z_range: (0.0, 1.0),
            dissolve_angle: 0.0175,
            base_crease_z_range: (-1.0, 2.0),
            baseline_cleanup: RepairOptions::baseline(),
            final_cleanup: RepairOptions::none().with_detect_non_manifold(true),
            max_faces: DEFAULT_MAX_FACES,
            keep_snapshots: false,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One smoothing level and no snapshots, for quick previews.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            smooth_levels: 1,
            ..Self::default()
        }
    }

    /// Denser input and key creasing, for printing.
    #[must_use]
    pub fn high_quality() -> Self {
        Self {
            presmooth_levels: 1,
            key_crease_tolerance: 0.5,
            final_cleanup: RepairOptions::none()
                .with_weld_distance(0.001)
                .with_delete_loose(true)
                .with_detect_non_manifold(true),
            ..Self::default()
        }
    }

    /// Set the presmooth levels.
    #[must_use]
    pub const fn with_presmooth_levels(mut self, levels: u32) -> Self {
        self.presmooth_levels = levels;
        self
    }

    /// Set the presubdivide cuts.
    #[must_use]
    pub const fn with_presubdivide_cuts(mut self, cuts: u32) -> Self {
        self.presubdivide_cuts = cuts;
        self
    }

    /// Set the smoothing levels.
    #[must_use]
    pub const fn with_smooth_levels(mut self, levels: u32) -> Self {
        self.smooth_levels = levels;
        self
    }

    /// Set the key crease tolerance; zero disables key creasing.
    #[must_use]
    pub const fn with_key_crease_tolerance(mut self, tolerance: f64) -> Self {
        self.key_crease_tolerance = tolerance;
        self
    }

    /// Set the key plate distance protected from the dissolve.
    #[must_use]
    pub const fn with_shared_tolerance(mut self, tolerance: f64) -> Self {
        self.shared_tolerance = tolerance;
        self
    }

    /// Set the z-range protected from the dissolve.
    #[must_use]
    pub const fn with_dissolve_z_range(mut self, min: f64, max: f64) -> Self {
        self.dissolve_z_range = (min, max);
        self
    }

    /// Set the dissolve angle.
    #[must_use]
    pub const fn with_dissolve_angle(mut self, angle: f64) -> Self {
        self.dissolve_angle = angle;
        self
    }

    /// Set the z-range of the base crease.
    #[must_use]
    pub const fn with_base_crease_z_range(mut self, min: f64, max: f64) -> Self {
        self.base_crease_z_range = (min, max);
        self
    }

    /// Set the repair pass run after assembly.
    #[must_use]
    pub fn with_baseline_cleanup(mut self, options: RepairOptions) -> Self {
        self.baseline_cleanup = options;
        self
    }

    /// Set the repair pass run after smoothing.
    #[must_use]
    pub fn with_final_cleanup(mut self, options: RepairOptions) -> Self {
        self.final_cleanup = options;
        self
    }

    /// Set the face limit of the subdivision steps.
    #[must_use]
    pub const fn with_max_faces(mut self, max_faces: usize) -> Self {
        self.max_faces = max_faces;
        self
    }

    /// Keep or drop intermediate snapshots.
    #[must_use]
    pub const fn with_snapshots(mut self, keep: bool) -> Self {
        self.keep_snapshots = keep;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_finishing_script() {
        let config = PipelineConfig::default();
        assert_eq!(config.smooth_levels, 3);
        assert_eq!(config.base_crease_z_range, (-1.0, 2.0));
        assert_eq!(config.dissolve_z_range, (0.0, 1.0));
        assert!((config.dissolve_angle - 0.0175).abs() < f64::EPSILON);
        assert!((config.shared_tolerance - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.baseline_cleanup, RepairOptions::baseline());
        assert!(config.final_cleanup.detect_non_manifold);
        assert!(config.final_cleanup.weld_distance.is_none());
    }

    #[test]
    fn presets_differ_from_default() {
        assert_eq!(PipelineConfig::preview().smooth_levels, 1);
        let hq = PipelineConfig::high_quality();
        assert_eq!(hq.presmooth_levels, 1);
        assert!(hq.key_crease_tolerance > 0.0);
        assert!(hq.final_cleanup.delete_loose);
    }

    #[test]
    fn builders_chain() {
        let config = PipelineConfig::new()
            .with_presubdivide_cuts(2)
            .with_dissolve_z_range(0.0, 3.0)
            .with_max_faces(5000)
            .with_final_cleanup(RepairOptions::default());
        assert_eq!(config.presubdivide_cuts, 2);
        assert_eq!(config.dissolve_z_range, (0.0, 3.0));
        assert_eq!(config.max_faces, 5000);
        assert_eq!(config.final_cleanup, RepairOptions::default());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"smooth_levels": 2, "key_crease_tolerance": 0.25}"#).unwrap();
        assert_eq!(config.smooth_levels, 2);
        assert!((config.key_crease_tolerance - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.presmooth_levels, 0);

        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

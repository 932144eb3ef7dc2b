//! Multi-shape boolean folds over owned shapes.
//!
//! A fold keeps the first shape as the running base and combines the
//! remaining operands into it one at a time. Every operand is consumed;
//! the base is mutated in place and handed back.
//!
//! Union folds visit operands nearest-first, measured between reference
//! points, so each step joins geometry that most likely already touches
//! the base.
//!
//! # Example
//!
//! ```
//! use mesh_boolean::union;
//! use mesh_types::{box_shape, MeshBounds, Vector3};
//!
//! let a = box_shape(1.0, 1.0, 1.0);
//! let mut b = box_shape(1.0, 1.0, 1.0);
//! b.translate(Vector3::new(0.5, 0.0, 0.0));
//!
//! let joined = union(vec![a, b], true).unwrap();
//! assert_eq!(joined.mesh().component_count(), 1);
//! assert!((joined.mesh().bounds().size().x - 1.5).abs() < 1e-9);
//! ```

use mesh_repair::{repair, MeshAdjacency, NonManifoldWarning};
use mesh_types::Shape;
use tracing::{debug, info, warn};

use crate::config::{BooleanConfig, BooleanOp};
use crate::error::{BooleanError, BooleanResult};
use crate::operation::{boolean_operation, BooleanStats};

/// Fold `shapes` into the first one with `op`, using the default
/// [`BooleanConfig`].
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn combine(shapes: Vec<Shape>, op: BooleanOp, cleanup_each_step: bool) -> BooleanResult<Shape> {
    combine_with_config(shapes, op, cleanup_each_step, &BooleanConfig::default())
}

/// Fold `shapes` into the first one with `op`.
///
/// `Union` visits the remaining shapes nearest-first by reference point
/// (ties keep input order), `Difference` subtracts them in order, and
/// `Intersect` takes exactly two shapes. With `cleanup_each_step` the
/// Repairer runs with `config.repair` after every step.
///
/// # Errors
///
/// - [`BooleanError::OperandCount`] for an empty list, or an `Intersect`
///   that is not given exactly two shapes
/// - [`BooleanError::InvalidOperand`] naming the first empty or invalid shape
/// - [`BooleanError::NotSolid`] naming the first shape that is open or
///   non-manifold, when `config.require_closed` is set (the default)
/// - [`BooleanError::EmptyResult`] when a step leaves nothing behind
/// - [`BooleanError::OpenResult`] when `config.require_closed` is set and
///   a step left the result open
/// - [`BooleanError::Repair`] when the per-step cleanup fails
pub fn combine_with_config(
    mut shapes: Vec<Shape>,
    op: BooleanOp,
    cleanup_each_step: bool,
    config: &BooleanConfig,
) -> BooleanResult<Shape> {
    let expected = match op {
        BooleanOp::Intersect => "2",
        BooleanOp::Union | BooleanOp::Difference => "at least 1",
    };
    if shapes.is_empty() || (op == BooleanOp::Intersect && shapes.len() != 2) {
        return Err(BooleanError::OperandCount {
            op,
            expected,
            found: shapes.len(),
        });
    }
    for shape in &shapes {
        shape
            .mesh()
            .validate_non_empty(shape.tag())
            .map_err(|source| BooleanError::InvalidOperand {
                tag: shape.tag().to_string(),
                source,
            })?;
        if config.require_closed {
            require_solid(shape)?;
        }
    }

    let mut operands = shapes.split_off(1);
    let Some(mut base) = shapes.pop() else {
        return Err(BooleanError::OperandCount { op, expected, found: 0 });
    };
    if op == BooleanOp::Union {
        operands.sort_by(|x, y| x.distance_to(&base).total_cmp(&y.distance_to(&base)));
    }

    let steps = operands.len();
    for operand in operands {
        fold_step(&mut base, operand, op, cleanup_each_step, config)?;
    }
    if steps > 0 {
        info!(
            %op,
            base = base.tag(),
            steps,
            faces = base.mesh().faces.len(),
            vertices = base.mesh().vertices.len(),
            "boolean fold complete"
        );
    }
    Ok(base)
}

/// Combine one operand into the base, consuming it.
fn fold_step(
    base: &mut Shape,
    operand: Shape,
    op: BooleanOp,
    cleanup: bool,
    config: &BooleanConfig,
) -> BooleanResult<BooleanStats> {
    let inputs_closed = is_closed(base) && is_closed(&operand);
    let result = boolean_operation(base.mesh(), operand.mesh(), op, config).map_err(|err| match err {
        BooleanError::InvalidOperand { tag, source } => BooleanError::InvalidOperand {
            tag: (if tag == "A" { base.tag() } else { operand.tag() }).to_string(),
            source,
        },
        other => other,
    })?;

    let mut mesh = result.mesh;
    let mut stats = result.stats;
    if cleanup && !mesh.faces.is_empty() {
        repair(&mut mesh, &config.repair).map_err(|source| BooleanError::Repair {
            tag: operand.tag().to_string(),
            source,
        })?;
        stats.boundary_edges = MeshAdjacency::build(&mesh.faces).boundary_edge_count();
    }
    if mesh.faces.is_empty() {
        return Err(BooleanError::EmptyResult {
            op,
            tag: operand.tag().to_string(),
        });
    }
    if inputs_closed {
        check_closed(op, operand.tag(), stats.boundary_edges, config.require_closed)?;
    }

    debug!(
        %op,
        base = base.tag(),
        operand = operand.tag(),
        overlapping = stats.overlapping,
        faces = mesh.faces.len(),
        "folded operand"
    );
    base.replace_mesh(mesh);
    Ok(stats)
}

fn is_closed(shape: &Shape) -> bool {
    MeshAdjacency::build(&shape.mesh().faces).boundary_edge_count() == 0
}

fn require_solid(shape: &Shape) -> BooleanResult<()> {
    match NonManifoldWarning::detect(shape.mesh()) {
        None => Ok(()),
        Some(defects) => Err(BooleanError::NotSolid {
            tag: shape.tag().to_string(),
            boundary_edges: defects.boundary_edges,
            non_manifold_edges: defects.non_manifold_edges,
            non_manifold_vertices: defects.non_manifold_vertices,
        }),
    }
}

/// An open result from closed inputs fails when `require` is set and is
/// logged otherwise.
fn check_closed(op: BooleanOp, tag: &str, boundary_edges: usize, require: bool) -> BooleanResult<()> {
    if boundary_edges == 0 {
        return Ok(());
    }
    if require {
        return Err(BooleanError::OpenResult {
            op,
            tag: tag.to_string(),
            boundary_edges,
        });
    }
    warn!(%op, operand = tag, boundary_edges, "boolean result is not closed");
    Ok(())
}

/// Union all shapes into the first, nearest-first.
///
/// A single shape is returned unchanged.
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn union(shapes: Vec<Shape>, cleanup_each_step: bool) -> BooleanResult<Shape> {
    combine(shapes, BooleanOp::Union, cleanup_each_step)
}

/// [`union`] with an explicit configuration.
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn union_with_config(shapes: Vec<Shape>, cleanup_each_step: bool, config: &BooleanConfig) -> BooleanResult<Shape> {
    combine_with_config(shapes, BooleanOp::Union, cleanup_each_step, config)
}

/// Subtract every operand from `base`, in order.
///
/// With no operands `base` is returned unchanged.
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn difference(base: Shape, operands: Vec<Shape>, cleanup_each_step: bool) -> BooleanResult<Shape> {
    difference_with_config(base, operands, cleanup_each_step, &BooleanConfig::default())
}

/// [`difference`] with an explicit configuration.
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn difference_with_config(
    base: Shape,
    operands: Vec<Shape>,
    cleanup_each_step: bool,
    config: &BooleanConfig,
) -> BooleanResult<Shape> {
    if operands.is_empty() {
        return Ok(base);
    }
    let mut shapes = Vec::with_capacity(operands.len() + 1);
    shapes.push(base);
    shapes.extend(operands);
    combine_with_config(shapes, BooleanOp::Difference, cleanup_each_step, config)
}

/// Intersect two shapes. The result replaces `a`; `b` is consumed.
///
/// # Errors
///
/// See [`combine_with_config`].
pub fn intersect(a: Shape, b: Shape, cleanup_each_step: bool) -> BooleanResult<Shape> {
    combine(vec![a, b], BooleanOp::Intersect, cleanup_each_step)
}

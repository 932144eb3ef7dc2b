//! Primitive solids the layout code builds cases from.
//!
//! Every constructor returns a closed, outward-facing [`Shape`] centred on
//! the origin (except [`polyline`], which is a single planar face, and
//! [`extrude_poly`], which grows from its outline).

use crate::error::{MeshError, MeshResult};
use crate::{polygon, unit_cube, EdgeKey, Face, IndexedMesh, Shape, Vertex};
use hashbrown::HashMap;
use nalgebra::{Point3, Vector3};
use std::f64::consts::TAU;

/// Side count of [`cylinder`] when the caller has no preference.
pub const DEFAULT_CYLINDER_SEGMENTS: usize = 8;

/// Side count of [`cone`] when the caller has no preference.
pub const DEFAULT_CONE_SEGMENTS: usize = 32;

/// Subdivision level of [`ico_sphere`] when the caller has no preference.
pub const DEFAULT_SPHERE_SUBDIVISIONS: u32 = 3;

/// Axis-aligned box of the given extents along X, Y and Z, centred on the
/// origin, with 6 quad faces.
///
/// # Example
///
/// ```
/// use mesh_types::{box_shape, MeshBounds};
///
/// let plate = box_shape(18.0, 18.0, 1.5);
/// assert_eq!(plate.mesh().bounds().size().z, 1.5);
/// ```
#[must_use]
pub fn box_shape(width: f64, depth: f64, height: f64) -> Shape {
    let mut mesh = unit_cube();
    for vertex in &mut mesh.vertices {
        let p = vertex.position;
        vertex.position = Point3::new((p.x - 0.5) * width, (p.y - 0.5) * depth, (p.z - 0.5) * height);
    }
    if width * depth * height < 0.0 {
        mesh.flip_normals();
    }
    Shape::new(mesh, "box")
}

/// Cylinder along Z, centred on the origin, with n-gon caps.
///
/// `segments` below 3 is raised to 3.
#[must_use]
pub fn cylinder(radius: f64, height: f64, segments: usize) -> Shape {
    let mesh = frustum(radius, radius, height, segments.max(3));
    Shape::new(mesh, "cylinder")
}

/// Cone or frustum along Z, centred on the origin. `r1` is the bottom
/// radius, `r2` the top; a zero radius collapses that cap into an apex.
///
/// # Errors
///
/// Returns [`MeshError::EmptyMesh`] if both radii are zero.
pub fn cone(r1: f64, r2: f64, height: f64, segments: usize) -> MeshResult<Shape> {
    let (r1, r2) = (r1.abs(), r2.abs());
    if r1 <= 0.0 && r2 <= 0.0 {
        return Err(MeshError::EmptyMesh {
            tag: "cone".to_string(),
        });
    }
    Ok(Shape::new(frustum(r1, r2, height, segments.max(3)), "cone"))
}

fn frustum(r1: f64, r2: f64, height: f64, segments: usize) -> IndexedMesh {
    let half = height.abs() * 0.5;
    let mut mesh = IndexedMesh::with_capacity(segments * 2, segments + 2);
    let ring = |mesh: &mut IndexedMesh, radius: f64, z: f64| -> Option<u32> {
        if radius <= 0.0 {
            return None;
        }
        let start = mesh.vertices.len() as u32;
        for i in 0..segments {
            let angle = TAU * i as f64 / segments as f64;
            mesh.push_vertex(Point3::new(radius * angle.cos(), radius * angle.sin(), z));
        }
        Some(start)
    };

    let bottom = ring(&mut mesh, r1, -half);
    let top = ring(&mut mesh, r2, half);
    let n = segments as u32;

    match (bottom, top) {
        (Some(b), Some(t)) => {
            mesh.push_face((0..n).rev().map(|i| b + i));
            mesh.push_face((0..n).map(|i| t + i));
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.push_face([b + i, b + j, t + j, t + i]);
            }
        }
        (Some(b), None) => {
            let apex = mesh.push_vertex(Point3::new(0.0, 0.0, half));
            mesh.push_face((0..n).rev().map(|i| b + i));
            for i in 0..n {
                mesh.push_face([b + i, b + (i + 1) % n, apex]);
            }
        }
        (None, Some(t)) => {
            let apex = mesh.push_vertex(Point3::new(0.0, 0.0, -half));
            mesh.push_face((0..n).map(|i| t + i));
            for i in 0..n {
                mesh.push_face([t + (i + 1) % n, t + i, apex]);
            }
        }
        (None, None) => {}
    }
    mesh
}

/// Icosphere of the given radius.
///
/// `subdivisions = 1` is the bare icosahedron (20 faces); every further
/// level splits each triangle into four and projects the new vertices onto
/// the sphere.
#[must_use]
pub fn ico_sphere(radius: f64, subdivisions: u32) -> Shape {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let base = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut triangles: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];
    let mut positions: Vec<Point3<f64>> = base
        .iter()
        .map(|&[x, y, z]| Point3::from(Vector3::new(x, y, z).normalize()))
        .collect();

    for _ in 1..subdivisions.max(1) {
        let mut midpoints: HashMap<EdgeKey, u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Point3<f64>>| -> u32 {
            *midpoints.entry(EdgeKey::new(a, b)).or_insert_with(|| {
                let mid = nalgebra::center(&positions[a as usize], &positions[b as usize]);
                positions.push(Point3::from(mid.coords.normalize()));
                (positions.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(triangles.len() * 4);
        for [a, b, c] in triangles {
            let ab = midpoint(a, b, &mut positions);
            let bc = midpoint(b, c, &mut positions);
            let ca = midpoint(c, a, &mut positions);
            next.extend_from_slice(&[[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        triangles = next;
    }

    for p in &mut positions {
        *p = Point3::from(p.coords * radius);
    }
    Shape::new(IndexedMesh::from_triangles(&positions, &triangles), "sphere")
}

/// A single planar polygon face at z = 0 from 2D points, wound
/// counter-clockwise seen from +Z.
///
/// # Errors
///
/// Returns [`MeshError::DegenerateFace`] if fewer than 3 points are given
/// or they enclose no area.
pub fn polyline(points: &[[f64; 2]]) -> MeshResult<Shape> {
    let positions: Vec<Point3<f64>> = points.iter().map(|&[x, y]| Point3::new(x, y, 0.0)).collect();
    let normal = polygon::newell_normal(&positions);
    if positions.len() < 3 || normal.norm() <= f64::EPSILON {
        return Err(MeshError::DegenerateFace {
            face: 0,
            len: positions.len(),
        });
    }

    let mut face: Face = (0..positions.len() as u32).collect();
    if normal.z < 0.0 {
        face.reverse();
    }
    let mesh = IndexedMesh::from_parts(positions.into_iter().map(Vertex::new).collect(), vec![face]);
    Ok(Shape::new(mesh, "polygon"))
}

/// Extrude every face of a planar outline along its normal by `height`,
/// producing a closed prism per face.
///
/// The outline is consumed; the prism keeps its reference point.
///
/// # Errors
///
/// Returns [`MeshError`] if the outline is invalid or empty, a face has no
/// area, or `height` is zero.
pub fn extrude_poly(outline: Shape, height: f64) -> MeshResult<Shape> {
    let location = outline.location();
    let tag = outline.tag().to_string();
    let source = outline.into_mesh();
    source.validate_non_empty(&tag)?;
    if height == 0.0 || !height.is_finite() {
        return Err(MeshError::EmptyMesh { tag });
    }

    let mut solid = IndexedMesh::new();
    for fi in 0..source.faces.len() {
        let loop_positions = source.face_positions(fi);
        let Some(normal) = polygon::normal(&loop_positions) else {
            return Err(MeshError::DegenerateFace {
                face: fi,
                len: loop_positions.len(),
            });
        };
        let offset = normal * height;
        // Extruding against the normal turns the prism inside out.
        let ordered: Vec<Point3<f64>> = if height > 0.0 {
            loop_positions.to_vec()
        } else {
            loop_positions.iter().rev().copied().collect()
        };

        let n = ordered.len() as u32;
        let base = solid.vertices.len() as u32;
        for p in &ordered {
            solid.push_vertex(*p);
        }
        for p in &ordered {
            solid.push_vertex(p + offset);
        }
        solid.push_face((0..n).rev().map(|i| base + i));
        solid.push_face((0..n).map(|i| base + n + i));
        for i in 0..n {
            let j = (i + 1) % n;
            solid.push_face([base + i, base + j, base + n + j, base + n + i]);
        }
    }

    Ok(Shape::with_location(solid, location, tag))
}

//! Triangle beautification and consistent face orientation.

use std::collections::VecDeque;

use mesh_types::{IndexedMesh, Point3, Vector3};
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;
use crate::topology::has_directed_edge;

/// Normals of a flippable triangle pair may differ by at most this (radians).
pub const COPLANAR_ANGLE: f64 = 1e-3;

const MAX_BEAUTIFY_PASSES: usize = 32;

/// Flip the shared edge of coplanar triangle pairs when that strictly
/// increases the smaller of the two triangles' minimum angles.
///
/// Only strictly convex pairs are flipped, and never across a creased edge
/// or onto an edge that already exists. Returns the number of flips.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Point3};
/// use mesh_repair::beautify_triangles;
///
/// // A flat rhombus split along its long diagonal.
/// let mut mesh = IndexedMesh::new();
/// for p in [[0.0, 0.0], [4.0, 0.0], [2.0, 1.0], [2.0, -1.0]] {
///     mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
/// }
/// mesh.push_face([0, 1, 2]);
/// mesh.push_face([1, 0, 3]);
///
/// assert_eq!(beautify_triangles(&mut mesh), 1);
/// assert_eq!(beautify_triangles(&mut mesh), 0);
/// ```
pub fn beautify_triangles(mesh: &mut IndexedMesh) -> usize {
    beautify_masked(mesh, &Mask::All)
}

pub(crate) fn beautify_masked(mesh: &mut IndexedMesh, mask: &Mask) -> usize {
    let cos_limit = COPLANAR_ANGLE.cos();
    let mut total = 0;
    for _ in 0..MAX_BEAUTIFY_PASSES {
        let flipped = beautify_pass(mesh, cos_limit, mask);
        if flipped == 0 {
            break;
        }
        total += flipped;
    }
    if total > 0 {
        debug!(flipped = total, "beautified triangle pairs");
    }
    total
}

fn beautify_pass(mesh: &mut IndexedMesh, cos_limit: f64, mask: &Mask) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut touched = vec![false; mesh.faces.len()];
    let mut flipped = 0;

    for f in 0..mesh.faces.len() {
        if touched[f] || mesh.faces[f].len() != 3 || !mask.allows_all(&mesh.faces[f]) {
            continue;
        }
        for i in 0..3 {
            let tri = &mesh.faces[f];
            let (a, b, c) = (tri[i], tri[(i + 1) % 3], tri[(i + 2) % 3]);
            let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                continue;
            };
            let g = if f0 == f { f1 } else { f0 };
            let other = &mesh.faces[g];
            if touched[g]
                || other.len() != 3
                || !has_directed_edge(other, b, a)
                || !mask.allows_all(other)
                || mesh.creases.get(a, b) > 0.0
            {
                continue;
            }
            let Some(&d) = other.iter().find(|&&w| w != a && w != b) else {
                continue;
            };
            if d == c || adjacency.edge_valence(c, d) > 0 {
                continue;
            }

            let [pa, pb, pc, pd] = [a, b, c, d].map(|v| mesh.position(v));
            let (Some(nf), Some(ng)) = (mesh.face_normal(f), mesh.face_normal(g)) else {
                continue;
            };
            if nf.dot(&ng) < cos_limit || !strictly_convex(&[pa, pd, pb, pc], &nf) {
                continue;
            }
            let before = min_angle(&pa, &pb, &pc).min(min_angle(&pb, &pa, &pd));
            let after = min_angle(&pa, &pd, &pc).min(min_angle(&pd, &pb, &pc));
            if after <= before + 1e-12 {
                continue;
            }

            mesh.faces[f] = [a, d, c].into_iter().collect();
            mesh.faces[g] = [d, b, c].into_iter().collect();
            touched[f] = true;
            touched[g] = true;
            flipped += 1;
            break;
        }
    }
    flipped
}

fn strictly_convex(quad: &[Point3<f64>; 4], normal: &Vector3<f64>) -> bool {
    (0..4).all(|i| {
        let prev = quad[(i + 3) % 4];
        let curr = quad[i];
        let next = quad[(i + 1) % 4];
        (curr - prev).cross(&(next - curr)).dot(normal) > 1e-12
    })
}

/// Smallest interior angle of a triangle, in radians.
fn min_angle(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let corner = |p: &Point3<f64>, q: &Point3<f64>, r: &Point3<f64>| (q - p).angle(&(r - p));
    corner(a, b, c).min(corner(b, c, a)).min(corner(c, a, b))
}

/// Make face winding consistent across every edge-connected component,
/// then turn closed components with negative volume outside-out.
///
/// Orientation spreads breadth-first from the lowest face of each
/// component; edges shared by more than two faces do not propagate it.
/// Returns the number of faces reversed.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::recalculate_normals;
///
/// let mut mesh = unit_cube();
/// mesh.faces[3].reverse();
/// assert_eq!(recalculate_normals(&mut mesh), 1);
/// assert!(mesh.signed_volume() > 0.0);
/// ```
pub fn recalculate_normals(mesh: &mut IndexedMesh) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let face_count = mesh.faces.len();
    let mut flip = vec![false; face_count];
    let mut component = vec![usize::MAX; face_count];
    let mut members: Vec<Vec<usize>> = Vec::new();

    for seed in 0..face_count {
        if component[seed] != usize::MAX {
            continue;
        }
        let id = members.len();
        component[seed] = id;
        let mut group = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(f) = queue.pop_front() {
            let face = &mesh.faces[f];
            let n = face.len();
            for i in 0..n {
                // Direction of this edge as the face will end up wound.
                let (a, b) = if flip[f] {
                    (face[(i + 1) % n], face[i])
                } else {
                    (face[i], face[(i + 1) % n])
                };
                let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                    continue;
                };
                let g = if f0 == f { f1 } else { f0 };
                if component[g] != usize::MAX {
                    continue;
                }
                component[g] = id;
                flip[g] = has_directed_edge(&mesh.faces[g], a, b);
                group.push(g);
                queue.push_back(g);
            }
        }
        members.push(group);
    }

    for (f, face) in mesh.faces.iter_mut().enumerate() {
        if flip[f] {
            face.reverse();
        }
    }

    for group in &members {
        if is_closed(&adjacency, mesh, group) && component_volume(mesh, group) < 0.0 {
            for &f in group {
                mesh.faces[f].reverse();
                flip[f] = !flip[f];
            }
        }
    }

    let reversed = flip.iter().filter(|&&x| x).count();
    if reversed > 0 {
        debug!(reversed, components = members.len(), "recalculated face orientation");
    }
    reversed
}

fn is_closed(adjacency: &MeshAdjacency, mesh: &IndexedMesh, group: &[usize]) -> bool {
    group.iter().all(|&f| {
        let face = &mesh.faces[f];
        let n = face.len();
        (0..n).all(|i| adjacency.edge_valence(face[i], face[(i + 1) % n]) == 2)
    })
}

fn component_volume(mesh: &IndexedMesh, group: &[usize]) -> f64 {
    group
        .iter()
        .map(|&f| {
            let face = &mesh.faces[f];
            let p0 = mesh.position(face[0]).coords;
            (1..face.len() - 1)
                .map(|i| {
                    let p1 = mesh.position(face[i]).coords;
                    let p2 = mesh.position(face[i + 1]).coords;
                    p0.dot(&p1.cross(&p2))
                })
                .sum::<f64>()
        })
        .sum::<f64>()
        / 6.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_types::unit_cube;

    #[test]
    fn inside_out_cube_is_turned() {
        let mut mesh = unit_cube();
        mesh.flip_normals();
        assert_eq!(recalculate_normals(&mut mesh), 6);
        assert!(crate::validate_mesh(&mesh).is_printable());
    }

    #[test]
    fn mixed_winding_is_made_consistent() {
        let mut mesh = unit_cube();
        mesh.faces[1].reverse();
        mesh.faces[4].reverse();
        assert_eq!(recalculate_normals(&mut mesh), 2);
        assert!((mesh.signed_volume() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn correct_mesh_is_unchanged() {
        let mut mesh = unit_cube();
        assert_eq!(recalculate_normals(&mut mesh), 0);
        assert_eq!(mesh, unit_cube());
    }

    #[test]
    fn beautify_keeps_area_and_boundary() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0], [4.0, 0.0], [2.0, 1.0], [2.0, -1.0]] {
            mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
        }
        mesh.push_face([0, 1, 2]);
        mesh.push_face([1, 0, 3]);
        let area: f64 = (0..2).map(|f| mesh.face_area(f)).sum();
        assert_eq!(beautify_triangles(&mut mesh), 1);
        let after: f64 = (0..2).map(|f| mesh.face_area(f)).sum();
        assert!((area - after).abs() < 1e-12);
        assert_eq!(MeshAdjacency::build(&mesh.faces).edge_valence(2, 3), 2);
        assert!((0..2).all(|f| mesh.face_normal(f).is_some_and(|n| n.z > 0.0)));
    }

    #[test]
    fn creased_diagonal_is_kept() {
        let mut mesh = IndexedMesh::new();
        for p in [[0.0, 0.0], [4.0, 0.0], [2.0, 1.0], [2.0, -1.0]] {
            mesh.push_vertex(Point3::new(p[0], p[1], 0.0));
        }
        mesh.push_face([0, 1, 2]);
        mesh.push_face([1, 0, 3]);
        mesh.creases.set(0, 1, 0.5);
        assert_eq!(beautify_triangles(&mut mesh), 0);
    }
}

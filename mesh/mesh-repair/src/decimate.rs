//! Angle-bounded vertex collapse.
//!
//! An interior vertex whose surrounding faces are all nearly parallel
//! carries no shape. Removing it and replacing its fan with the single
//! polygon bounded by its link loop leaves the surface where it was.

use hashbrown::{HashMap, HashSet};
use mesh_types::{Face, IndexedMesh, Vector3};
use smallvec::SmallVec;
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;
use crate::topology;

/// Collapse interior vertices whose incident faces all lie within `angle`
/// radians of their mean plane. Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, Point3};
/// use mesh_repair::collapse_flat_vertices;
///
/// // A cube whose top face is fanned around its centre.
/// let mut mesh = unit_cube();
/// let centre = mesh.push_vertex(Point3::new(0.5, 0.5, 1.0));
/// mesh.faces.remove(1);
/// for (a, b) in [(4, 5), (5, 6), (6, 7), (7, 4)] {
///     mesh.push_face([centre, a, b]);
/// }
///
/// assert_eq!(collapse_flat_vertices(&mut mesh, 0.001), 1);
/// assert_eq!(mesh.faces.len(), 6);
/// assert_eq!(mesh.vertices.len(), 8);
/// ```
pub fn collapse_flat_vertices(mesh: &mut IndexedMesh, angle: f64) -> usize {
    let collapsed = collapse_masked(mesh, angle, &Mask::All);
    if collapsed > 0 {
        mesh.compact();
    }
    collapsed
}

pub(crate) fn collapse_masked(mesh: &mut IndexedMesh, angle: f64, mask: &Mask) -> usize {
    if !(angle >= 0.0) {
        return 0;
    }
    let cos_limit = angle.cos();
    let mut total = 0;

    for _ in 0..mesh.vertices.len() {
        let collapsed = collapse_pass(mesh, cos_limit, mask);
        if collapsed == 0 {
            break;
        }
        total += collapsed;
    }
    if total > 0 {
        debug!(collapsed = total, angle, "collapsed flat vertices");
    }
    total
}

fn collapse_pass(mesh: &mut IndexedMesh, cos_limit: f64, mask: &Mask) -> usize {
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let existing: HashSet<SmallVec<[u32; 8]>> = mesh.faces.iter().map(|f| sorted_key(f)).collect();
    let mut blocked: HashSet<u32> = HashSet::new();
    let mut replaced: HashMap<usize, Option<Face>> = HashMap::new();
    let mut created: HashSet<SmallVec<[u32; 8]>> = HashSet::new();

    let mut candidates: Vec<u32> = (0..mesh.vertices.len() as u32)
        .filter(|&v| mask.allows(v) && adjacency.faces_for_vertex(v).len() >= 2)
        .collect();
    candidates.sort_unstable();

    for v in candidates {
        if blocked.contains(&v) {
            continue;
        }
        let incident = adjacency.faces_for_vertex(v);
        if incident.iter().any(|&f| mesh.faces[f].iter().any(|w| blocked.contains(w))) {
            continue;
        }
        let Some(link) = link_loop(mesh, &adjacency, v, incident, cos_limit) else {
            continue;
        };
        let key = sorted_key(&link);
        if existing.contains(&key) || !created.insert(key) {
            continue;
        }

        for &f in incident {
            blocked.extend(mesh.faces[f].iter().copied());
            replaced.insert(f, None);
        }
        if let Some(&first) = incident.iter().min() {
            replaced.insert(first, Some(link));
        }
    }

    let collapsed = created.len();
    if collapsed > 0 {
        let faces = std::mem::take(&mut mesh.faces);
        mesh.faces = faces
            .into_iter()
            .enumerate()
            .filter_map(|(f, face)| match replaced.remove(&f) {
                Some(link) => link,
                None => Some(face),
            })
            .collect();
        topology::remove_duplicate_faces(mesh);
    }
    collapsed
}

/// The loop bounding `v`'s fan, when `v` is an uncreased interior vertex
/// whose faces are flat within the limit.
fn link_loop(
    mesh: &IndexedMesh,
    adjacency: &MeshAdjacency,
    v: u32,
    incident: &[usize],
    cos_limit: f64,
) -> Option<Face> {
    let mut normals: SmallVec<[Vector3<f64>; 8]> = SmallVec::new();
    // Each face contributes the path from the vertex after `v` round to the
    // vertex before it, keyed by its first vertex.
    let mut paths: HashMap<u32, SmallVec<[u32; 4]>> = HashMap::new();

    for &f in incident {
        let face = &mesh.faces[f];
        let n = face.len();
        let mut at = face.iter().enumerate().filter(|&(_, &w)| w == v).map(|(i, _)| i);
        let i = at.next()?;
        if at.next().is_some() {
            return None;
        }
        let (before, after) = (face[(i + n - 1) % n], face[(i + 1) % n]);
        for w in [before, after] {
            if adjacency.edge_valence(v, w) != 2 || mesh.creases.get(v, w) > 0.0 {
                return None;
            }
        }
        let path: SmallVec<[u32; 4]> = (1..n).map(|k| face[(i + k) % n]).collect();
        if paths.insert(after, path).is_some() {
            return None;
        }
        normals.push(mesh.face_normal(f)?);
    }

    let mean = normals.iter().sum::<Vector3<f64>>().try_normalize(f64::EPSILON)?;
    if normals.iter().any(|n| n.dot(&mean) < cos_limit) {
        return None;
    }

    let start = *paths.keys().min()?;
    let mut link: Face = Face::new();
    let mut key = start;
    for _ in 0..paths.len() {
        let path = paths.get(&key)?;
        link.extend(path[..path.len() - 1].iter().copied());
        key = *path.last()?;
    }
    if key != start || link.len() < 3 {
        return None;
    }
    let distinct: HashSet<u32> = link.iter().copied().collect();
    (distinct.len() == link.len()).then(|| topology::canonical_loop(&link))
}

fn sorted_key(face: &[u32]) -> SmallVec<[u32; 8]> {
    let mut key: SmallVec<[u32; 8]> = face.iter().copied().collect();
    key.sort_unstable();
    key
}

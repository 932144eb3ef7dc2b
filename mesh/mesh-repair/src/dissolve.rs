//! Limited dissolve: merge near-coplanar faces into polygons and drop
//! collinear vertices; re-joining triangle pairs into quads.

use hashbrown::{HashMap, HashSet};
use mesh_types::{polygon, EdgeKey, Face, IndexedMesh, Vector3};
use tracing::debug;

use crate::adjacency::MeshAdjacency;
use crate::mask::Mask;
use crate::topology::{canonical_loop, has_directed_edge};

/// Outcome of a limited dissolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveSummary {
    /// Faces absorbed into a neighbouring region.
    pub faces_merged: usize,
    /// Collinear vertices removed from face loops.
    pub vertices_dissolved: usize,
}

/// Merge adjacent faces whose normals lie within `angle` radians of each
/// other into single polygons, then dissolve 2-valent vertices whose edges
/// are collinear within `angle`.
///
/// Creased edges are never dissolved. A region is merged only when its
/// boundary is one simple loop, so faces with holes stay split.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_repair::limited_dissolve;
///
/// let mut mesh = unit_cube();
/// mesh.triangulate();
/// assert_eq!(mesh.faces.len(), 12);
///
/// let summary = limited_dissolve(&mut mesh, 0.01);
/// assert_eq!(summary.faces_merged, 6);
/// assert_eq!(mesh.faces.len(), 6);
/// ```
pub fn limited_dissolve(mesh: &mut IndexedMesh, angle: f64) -> DissolveSummary {
    let summary = dissolve_masked(mesh, angle, &Mask::All);
    if summary.vertices_dissolved > 0 {
        mesh.compact();
    }
    summary
}

/// Limited dissolve touching only faces and vertices allowed by `mask`.
/// Dissolved vertices are left unreferenced.
pub(crate) fn dissolve_masked(mesh: &mut IndexedMesh, angle: f64, mask: &Mask) -> DissolveSummary {
    if !(angle >= 0.0) || mesh.faces.is_empty() {
        return DissolveSummary::default();
    }
    let faces_merged = merge_regions(mesh, angle, mask);
    let vertices_dissolved = dissolve_collinear(mesh, angle, mask);
    if faces_merged + vertices_dissolved > 0 {
        debug!(faces_merged, vertices_dissolved, "limited dissolve");
    }
    DissolveSummary {
        faces_merged,
        vertices_dissolved,
    }
}

fn merge_regions(mesh: &mut IndexedMesh, angle: f64, mask: &Mask) -> usize {
    let cos_limit = angle.cos();
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let normals: Vec<Option<Vector3<f64>>> = (0..mesh.faces.len()).map(|f| mesh.face_normal(f)).collect();
    let eligible: Vec<bool> = mesh
        .faces
        .iter()
        .zip(&normals)
        .map(|(face, n)| n.is_some() && mask.allows_all(face))
        .collect();

    let mut region_of = vec![usize::MAX; mesh.faces.len()];
    let mut regions: Vec<Vec<usize>> = Vec::new();

    for seed in 0..mesh.faces.len() {
        if region_of[seed] != usize::MAX {
            continue;
        }
        let id = regions.len();
        region_of[seed] = id;
        let mut members = vec![seed];

        if let (true, Some(seed_normal)) = (eligible[seed], normals[seed]) {
            let mut cursor = 0;
            while cursor < members.len() {
                let f = members[cursor];
                cursor += 1;
                let face = &mesh.faces[f];
                let n = face.len();
                for i in 0..n {
                    let (a, b) = (face[i], face[(i + 1) % n]);
                    if mesh.creases.get(a, b) > 0.0 {
                        continue;
                    }
                    let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                        continue;
                    };
                    let g = if f0 == f { f1 } else { f0 };
                    if region_of[g] != usize::MAX
                        || !eligible[g]
                        || !has_directed_edge(&mesh.faces[g], b, a)
                        || normals[g].map_or(true, |ng| ng.dot(&seed_normal) < cos_limit)
                    {
                        continue;
                    }
                    region_of[g] = id;
                    members.push(g);
                }
            }
        }
        regions.push(members);
    }

    let mut merged_loop: HashMap<usize, Face> = HashMap::new();
    let mut absorbed = vec![false; mesh.faces.len()];
    let mut merged = 0;
    for members in regions.iter().filter(|m| m.len() > 1) {
        let Some(boundary) = region_boundary(mesh, members) else {
            continue;
        };
        let seed = members[0];
        for &f in &members[1..] {
            absorbed[f] = true;
        }
        merged += members.len() - 1;
        merged_loop.insert(seed, boundary);
    }
    if merged == 0 {
        return 0;
    }

    let faces = std::mem::take(&mut mesh.faces);
    mesh.faces = faces
        .into_iter()
        .enumerate()
        .filter(|(f, _)| !absorbed[*f])
        .map(|(f, face)| merged_loop.remove(&f).unwrap_or(face))
        .collect();
    merged
}

/// Outer loop of a face region when it is a single simple loop with no
/// creased edge swallowed inside.
fn region_boundary(mesh: &IndexedMesh, members: &[usize]) -> Option<Face> {
    let mut directed: HashSet<(u32, u32)> = HashSet::new();
    for &f in members {
        let face = &mesh.faces[f];
        let n = face.len();
        for i in 0..n {
            directed.insert((face[i], face[(i + 1) % n]));
        }
    }

    let mut next: HashMap<u32, u32> = HashMap::new();
    for &(a, b) in &directed {
        if directed.contains(&(b, a)) {
            if mesh.creases.get(a, b) > 0.0 {
                return None;
            }
            continue;
        }
        if next.insert(a, b).is_some() {
            return None;
        }
    }
    if next.len() < 3 {
        return None;
    }

    let start = *next.keys().min()?;
    let mut boundary: Vec<u32> = vec![start];
    let mut at = *next.get(&start)?;
    while at != start {
        if boundary.len() >= next.len() {
            return None;
        }
        boundary.push(at);
        at = *next.get(&at)?;
    }
    (boundary.len() == next.len()).then(|| canonical_loop(&boundary))
}

fn dissolve_collinear(mesh: &mut IndexedMesh, angle: f64, mask: &Mask) -> usize {
    let cos_limit = angle.cos();
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut candidates: Vec<u32> = mesh
        .faces
        .iter()
        .flat_map(|f| f.iter().copied())
        .filter(|&v| mask.allows(v))
        .collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut dissolved = 0;
    for v in candidates {
        let incident = adjacency.faces_for_vertex(v);
        let mut neighbours: Vec<u32> = Vec::with_capacity(4);
        for &f in incident {
            let face = &mesh.faces[f];
            let n = face.len();
            for i in (0..n).filter(|&i| face[i] == v) {
                for w in [face[(i + n - 1) % n], face[(i + 1) % n]] {
                    if !neighbours.contains(&w) {
                        neighbours.push(w);
                    }
                }
            }
        }
        let &[a, c] = neighbours.as_slice() else {
            continue;
        };
        if incident.iter().any(|&f| mesh.faces[f].len() <= 3) {
            continue;
        }
        let (wa, wc) = (mesh.creases.get(a, v), mesh.creases.get(v, c));
        if wa != wc {
            continue;
        }

        let (pa, pv, pc) = (mesh.position(a), mesh.position(v), mesh.position(c));
        let (Some(d0), Some(d1)) = (
            (pv - pa).try_normalize(f64::EPSILON),
            (pc - pv).try_normalize(f64::EPSILON),
        ) else {
            continue;
        };
        if d0.dot(&d1) < cos_limit {
            continue;
        }

        for &f in incident {
            mesh.faces[f].retain(|w| *w != v);
        }
        mesh.creases.set(a, v, 0.0);
        mesh.creases.set(v, c, 0.0);
        if wa > 0.0 {
            mesh.creases.set(a, c, wa);
        }
        dissolved += 1;
    }
    dissolved
}

/// Join adjacent coplanar triangle pairs whose union is a convex quad,
/// greedily in face order. Returns the number of pairs joined.
pub(crate) fn join_triangles(mesh: &mut IndexedMesh, angle: f64, mask: &Mask) -> usize {
    let cos_limit = angle.cos();
    let adjacency = MeshAdjacency::build(&mesh.faces);
    let mut consumed = vec![false; mesh.faces.len()];
    let mut quads: HashMap<usize, Face> = HashMap::new();

    for f in 0..mesh.faces.len() {
        if consumed[f] || mesh.faces[f].len() != 3 || !mask.allows_all(&mesh.faces[f]) {
            continue;
        }
        let Some(nf) = mesh.face_normal(f) else {
            continue;
        };
        for i in 0..3 {
            let tri = &mesh.faces[f];
            let (a, b, c) = (tri[i], tri[(i + 1) % 3], tri[(i + 2) % 3]);
            if mesh.creases.get(a, b) > 0.0 {
                continue;
            }
            let Some(&[f0, f1]) = adjacency.faces_for_edge(a, b) else {
                continue;
            };
            let g = if f0 == f { f1 } else { f0 };
            let other = &mesh.faces[g];
            if consumed[g] || other.len() != 3 || !has_directed_edge(other, b, a) || !mask.allows_all(other) {
                continue;
            }
            let Some(&d) = other.iter().find(|&&w| w != a && w != b) else {
                continue;
            };
            if mesh.face_normal(g).map_or(true, |ng| ng.dot(&nf) < cos_limit) {
                continue;
            }
            let quad = [a, d, b, c];
            let points: Vec<_> = quad.iter().map(|&v| mesh.position(v)).collect();
            let scale = polygon::area(&points).max(f64::MIN_POSITIVE);
            if !polygon::is_convex(&points, &nf, scale * 1e-9) {
                continue;
            }
            consumed[f] = true;
            consumed[g] = true;
            quads.insert(f, Face::from_slice(&quad));
            break;
        }
    }

    let joined = quads.len();
    if joined > 0 {
        let faces = std::mem::take(&mut mesh.faces);
        mesh.faces = faces
            .into_iter()
            .enumerate()
            .filter_map(|(f, face)| match quads.remove(&f) {
                Some(quad) => Some(quad),
                None if consumed[f] => None,
                None => Some(face),
            })
            .collect();
        debug!(joined, "joined triangle pairs into quads");
    }
    joined
}

/// Drop crease entries whose edge no longer appears in any face.
pub(crate) fn prune_creases(mesh: &mut IndexedMesh) {
    if mesh.creases.is_empty() {
        return;
    }
    let live: HashSet<EdgeKey> = mesh.edges().into_iter().collect();
    mesh.creases.retain(|edge| live.contains(&edge));
}

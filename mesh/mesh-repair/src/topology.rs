//! Index-level helpers shared by the repair stages.

use mesh_types::{Face, IndexedMesh};

/// Disjoint sets over vertex indices; the smallest index is the root.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len as u32).collect(),
        }
    }

    pub(crate) fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grand = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grand;
            x = grand;
        }
        x
    }

    /// Returns `true` if the sets were distinct.
    pub(crate) fn union(&mut self, a: u32, b: u32) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra.max(rb) as usize] = ra.min(rb);
        true
    }

    /// Root of every element.
    pub(crate) fn roots(&mut self) -> Vec<u32> {
        (0..self.parent.len() as u32).map(|v| self.find(v)).collect()
    }
}

/// Rewrite face loops and creases through `target` while keeping the
/// vertex array. Merged-away vertices become unreferenced.
pub(crate) fn redirect(mesh: &mut IndexedMesh, target: &[u32]) {
    let remap: Vec<Option<u32>> = target.iter().map(|&t| Some(t)).collect();
    let vertices = std::mem::take(&mut mesh.vertices);
    mesh.apply_remap(vertices, &remap);
}

/// Drop unreferenced vertices except those flagged in `keep`.
///
/// Returns the old-to-new remap, or `None` when nothing was removed.
pub(crate) fn compact_except(mesh: &mut IndexedMesh, keep: &[bool]) -> Option<Vec<Option<u32>>> {
    let mut referenced = vec![false; mesh.vertices.len()];
    for face in &mesh.faces {
        for &v in face {
            referenced[v as usize] = true;
        }
    }
    let alive: Vec<bool> = referenced
        .iter()
        .enumerate()
        .map(|(i, &r)| r || keep.get(i).copied().unwrap_or(false))
        .collect();
    if alive.iter().all(|&a| a) {
        return None;
    }

    let mut remap = vec![None; mesh.vertices.len()];
    let mut kept = Vec::with_capacity(mesh.vertices.len());
    for (old, vertex) in mesh.vertices.iter().enumerate() {
        if alive[old] {
            remap[old] = Some(kept.len() as u32);
            kept.push(*vertex);
        }
    }
    mesh.apply_remap(kept, &remap);
    Some(remap)
}

/// Whether the loop walks from `a` straight to `b`.
pub(crate) fn has_directed_edge(face: &[u32], a: u32, b: u32) -> bool {
    let n = face.len();
    (0..n).any(|i| face[i] == a && face[(i + 1) % n] == b)
}

/// Rotate a loop so it starts at its smallest index, keeping direction.
pub(crate) fn canonical_loop(face: &[u32]) -> Face {
    let start = face
        .iter()
        .enumerate()
        .min_by_key(|&(_, v)| *v)
        .map_or(0, |(i, _)| i);
    face[start..].iter().chain(&face[..start]).copied().collect()
}

/// Rotate every loop to its smallest index and sort faces, giving a
/// deterministic face order independent of how the faces were produced.
pub(crate) fn canonicalize(mesh: &mut IndexedMesh) {
    for face in &mut mesh.faces {
        *face = canonical_loop(face);
    }
    mesh.faces.sort();
}

/// Remove faces that repeat another face's loop. Same-direction copies
/// keep the first; opposite-direction pairs (zero-thickness walls) are both
/// removed. Returns the number of faces removed.
pub(crate) fn remove_duplicate_faces(mesh: &mut IndexedMesh) -> usize {
    use hashbrown::HashMap;

    let before = mesh.faces.len();
    let mut first_by_key: HashMap<Face, usize> = HashMap::new();
    let mut drop = vec![false; before];

    for (fi, face) in mesh.faces.iter().enumerate() {
        let forward = canonical_loop(face);
        let reversed: Face = {
            let mut r: Face = face.iter().rev().copied().collect();
            r = canonical_loop(&r);
            r
        };
        if let Some(&other) = first_by_key.get(&forward) {
            if !drop[other] {
                drop[fi] = true;
                continue;
            }
        }
        if let Some(&other) = first_by_key.get(&reversed) {
            if !drop[other] {
                drop[other] = true;
                drop[fi] = true;
                continue;
            }
        }
        first_by_key.insert(forward, fi);
    }

    let mut index = 0;
    mesh.faces.retain(|_| {
        let keep = !drop[index];
        index += 1;
        keep
    });
    before - mesh.faces.len()
}

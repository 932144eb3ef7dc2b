//! Indexed polygon mesh.

use crate::error::{MeshError, MeshResult};
use crate::{polygon, Aabb, CreaseMap, EdgeKey, MeshBounds, MeshTopology, Vertex};
use hashbrown::HashSet;
use nalgebra::{Isometry3, Point3, Vector3};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A face loop: at least 3 vertex indices, counter-clockwise from outside.
///
/// Triangles and quads fit inline; larger polygons spill to the heap.
pub type Face = SmallVec<[u32; 4]>;

/// An indexed polygon mesh with per-edge crease weights.
///
/// Faces are loops of any length ≥ 3, so booleans, dissolves and
/// subdivision can all work on the same structure: booleans emit convex
/// polygons, limited dissolve produces n-gons, and Catmull–Clark produces
/// quads.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshBounds, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 6);
/// assert_eq!(cube.edges().len(), 12);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
/// assert_eq!(cube.bounds().size().x, 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Face loops as indices into the vertex array.
    pub faces: Vec<Face>,

    /// Crease weights of edges.
    pub creases: CreaseMap,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
            creases: CreaseMap::new(),
        }
    }

    /// Create a mesh from vertices and face loops, without creases.
    #[must_use]
    pub fn from_parts(vertices: Vec<Vertex>, faces: Vec<Face>) -> Self {
        Self {
            vertices,
            faces,
            creases: CreaseMap::new(),
        }
    }

    /// Create a mesh from positions and triangle index triples.
    #[must_use]
    pub fn from_triangles(positions: &[Point3<f64>], triangles: &[[u32; 3]]) -> Self {
        Self::from_parts(
            positions.iter().copied().map(Vertex::new).collect(),
            triangles.iter().map(|t| Face::from_slice(t)).collect(),
        )
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.vertices.push(Vertex::new(position));
        (self.vertices.len() - 1) as u32
    }

    /// Append a face loop.
    pub fn push_face(&mut self, face: impl IntoIterator<Item = u32>) {
        self.faces.push(face.into_iter().collect());
    }

    /// Position of a vertex.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Call [`Self::validate`] first on
    /// untrusted input.
    #[inline]
    #[must_use]
    pub fn position(&self, index: u32) -> Point3<f64> {
        self.vertices[index as usize].position
    }

    /// Positions of a face's loop.
    #[must_use]
    pub fn face_positions(&self, face: usize) -> SmallVec<[Point3<f64>; 4]> {
        self.faces[face].iter().map(|&v| self.position(v)).collect()
    }

    /// Unit normal of a face, `None` for zero-area faces.
    #[must_use]
    pub fn face_normal(&self, face: usize) -> Option<Vector3<f64>> {
        polygon::normal(&self.face_positions(face))
    }

    /// Area of a face.
    #[must_use]
    pub fn face_area(&self, face: usize) -> f64 {
        polygon::area(&self.face_positions(face))
    }

    /// Centroid of a face's vertices.
    #[must_use]
    pub fn face_centroid(&self, face: usize) -> Point3<f64> {
        polygon::centroid(&self.face_positions(face))
    }

    /// Check structural validity: every face has ≥3 in-range indices and
    /// every coordinate is finite.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshError`] found.
    pub fn validate(&self) -> MeshResult<()> {
        if let Some(index) = self.vertices.iter().position(|v| !v.is_finite()) {
            return Err(MeshError::NonFinite { index });
        }
        let vertex_count = self.vertices.len();
        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(MeshError::DegenerateFace {
                    face: fi,
                    len: face.len(),
                });
            }
            if let Some(&index) = face.iter().find(|&&v| v as usize >= vertex_count) {
                return Err(MeshError::InvalidIndex {
                    face: fi,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// Like [`Self::validate`] but also rejects meshes without faces.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::EmptyMesh`] carrying `tag`, or any structural
    /// error from [`Self::validate`].
    pub fn validate_non_empty(&self, tag: &str) -> MeshResult<()> {
        if MeshTopology::is_empty(self) {
            return Err(MeshError::EmptyMesh {
                tag: tag.to_string(),
            });
        }
        self.validate()
    }

    /// All distinct edges, sorted.
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeKey> {
        let mut seen = HashSet::new();
        for face in &self.faces {
            for (a, b) in loop_edges(face) {
                if a != b {
                    seen.insert(EdgeKey::new(a, b));
                }
            }
        }
        let mut edges: Vec<EdgeKey> = seen.into_iter().collect();
        edges.sort_unstable();
        edges
    }

    /// Signed volume by the divergence theorem, fanning each loop from its
    /// first vertex.
    ///
    /// Positive for closed meshes with outward winding.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let v0 = self.position(face[0]).coords;
            for i in 1..face.len() - 1 {
                let v1 = self.position(face[i]).coords;
                let v2 = self.position(face[i + 1]).coords;
                volume += v0.dot(&v1.cross(&v2));
            }
        }
        volume / 6.0
    }

    /// Absolute enclosed volume.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }

    /// Translate every vertex.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Apply a rigid transform to every vertex.
    pub fn transform(&mut self, isometry: &Isometry3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position = isometry.transform_point(&vertex.position);
        }
    }

    /// Mirror through the plane `coordinate[axis] = 0` and reverse every
    /// loop so the surface stays outward-facing.
    pub fn reflect(&mut self, axis: usize) {
        for vertex in &mut self.vertices {
            vertex.position[axis] = -vertex.position[axis];
        }
        self.flip_normals();
    }

    /// Reverse every face loop.
    pub fn flip_normals(&mut self) {
        for face in &mut self.faces {
            face.reverse();
        }
    }

    /// Append another mesh as a disjoint part of this one, creases included.
    pub fn append(&mut self, other: &Self) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| f.iter().map(|&v| v + offset).collect::<Face>()));
        for (edge, weight) in other.creases.iter() {
            self.creases.set(edge.0 + offset, edge.1 + offset, weight);
        }
    }

    /// Drop vertices no face references, remapping faces and creases.
    ///
    /// Returns the number of vertices removed.
    pub fn compact(&mut self) -> usize {
        let mut referenced = vec![false; self.vertices.len()];
        for face in &self.faces {
            for &v in face {
                referenced[v as usize] = true;
            }
        }
        let removed = referenced.iter().filter(|r| !**r).count();
        if removed == 0 {
            return 0;
        }

        let mut remap = vec![None; self.vertices.len()];
        let mut kept = Vec::with_capacity(self.vertices.len() - removed);
        for (old, vertex) in self.vertices.iter().enumerate() {
            if referenced[old] {
                remap[old] = Some(kept.len() as u32);
                kept.push(*vertex);
            }
        }
        self.apply_remap(kept, &remap);
        removed
    }

    /// Replace the vertex array and rewrite faces and creases through
    /// `remap` (`None` entries must not be referenced by any face).
    ///
    /// Consecutive duplicate indices produced by merging are removed and
    /// faces left with fewer than 3 distinct vertices are dropped.
    pub fn apply_remap(&mut self, vertices: Vec<Vertex>, remap: &[Option<u32>]) {
        self.vertices = vertices;
        let mut faces = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            let mapped: Face = face
                .iter()
                .filter_map(|&v| remap.get(v as usize).copied().flatten())
                .collect();
            let cleaned = dedup_loop(&mapped);
            if cleaned.len() >= 3 {
                faces.push(cleaned);
            }
        }
        self.faces = faces;
        self.creases.remap(remap);
    }

    /// Split every polygon with more than 3 vertices into triangles.
    ///
    /// Returns the number of faces that were split.
    pub fn triangulate(&mut self) -> usize {
        let mut split = 0;
        let mut faces = Vec::with_capacity(self.faces.len() * 2);
        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() <= 3 {
                faces.push(face.clone());
                continue;
            }
            split += 1;
            let positions = self.face_positions(fi);
            for [a, b, c] in polygon::triangulate(&positions) {
                faces.push(Face::from_slice(&[face[a], face[b], face[c]]));
            }
        }
        self.faces = faces;
        split
    }

    /// Group faces into connected components (faces sharing a vertex are
    /// connected).
    #[must_use]
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.vertices.len()).collect();
        for face in &self.faces {
            for w in face.windows(2) {
                union(&mut parent, w[0] as usize, w[1] as usize);
            }
        }

        let mut by_root: hashbrown::HashMap<usize, usize> = hashbrown::HashMap::new();
        let mut components: Vec<Vec<usize>> = Vec::new();
        for (fi, face) in self.faces.iter().enumerate() {
            let Some(&first) = face.first() else {
                continue;
            };
            let root = find(&mut parent, first as usize);
            let slot = *by_root.entry(root).or_insert_with(|| {
                components.push(Vec::new());
                components.len() - 1
            });
            components[slot].push(fi);
        }
        components
    }

    /// Number of connected components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.connected_components().len()
    }
}

/// Directed edges of a loop, wrapping around.
pub(crate) fn loop_edges(face: &[u32]) -> impl Iterator<Item = (u32, u32)> + '_ {
    let n = face.len();
    (0..n).map(move |i| (face[i], face[(i + 1) % n]))
}

/// Remove consecutive duplicates, including across the wrap-around.
fn dedup_loop(face: &[u32]) -> Face {
    let mut out: Face = SmallVec::with_capacity(face.len());
    for &v in face {
        if out.last() != Some(&v) {
            out.push(v);
        }
    }
    while out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    #[inline]
    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    #[inline]
    fn face(&self, index: usize) -> Option<&[u32]> {
        self.faces.get(index).map(SmallVec::as_slice)
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn faces(&self) -> impl Iterator<Item = &[u32]> {
        self.faces.iter().map(SmallVec::as_slice)
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Create an axis-aligned unit cube `[0, 1]³` with 6 quad faces.
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let positions = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces: [[u32; 4]; 6] = [
        [0, 3, 2, 1], // bottom (-Z)
        [4, 5, 6, 7], // top (+Z)
        [0, 1, 5, 4], // front (-Y)
        [2, 3, 7, 6], // back (+Y)
        [0, 4, 7, 3], // left (-X)
        [1, 2, 6, 5], // right (+X)
    ];
    IndexedMesh::from_parts(
        positions.iter().map(|&p| Vertex::from(p)).collect(),
        faces.iter().map(|f| Face::from_slice(f)).collect(),
    )
}

//! Catmull-Clark and simple subdivision with crease weights.
//!
//! One round splits every k-gon into k quads around a face point, with a
//! new point on every edge. Output vertices are laid out as the original
//! vertices (moved), then one point per edge, then one point per face.
//!
//! Crease weights bend the Catmull-Clark rules toward linear subdivision:
//!
//! - an edge point is blended from its smooth position toward the edge
//!   midpoint by the edge's weight;
//! - a vertex is blended back toward its original position by
//!   `max(clamp(Σw - 1, 0, 1), max w)` over its incident edges, so any
//!   fully sharp edge pins both of its ends.
//!
//! Boundary and non-manifold edges always count as fully creased, so open
//! borders keep their shape.

use hashbrown::HashMap;
use mesh_types::{EdgeKey, IndexedMesh, Point3, Vector3, Vertex};
use tracing::debug;

use crate::error::{SubdivideError, SubdivideResult};
use crate::params::{SubdivideParams, SubdivisionMode};
use crate::result::SubdivisionResult;

/// Subdivide a mesh using the specified parameters.
///
/// # Errors
///
/// Returns an error if:
/// - The mesh is empty or invalid
/// - The resulting mesh would exceed `max_faces`
///
/// # Examples
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_subdivide::{subdivide_mesh, SubdivideParams};
///
/// let cube = unit_cube();
/// let result = subdivide_mesh(&cube, &SubdivideParams::catmull_clark(1))?;
///
/// // Each quad becomes 4 quads.
/// assert_eq!(result.final_faces, 24);
/// assert_eq!(result.final_vertices, 26);
/// # Ok::<(), mesh_subdivide::SubdivideError>(())
/// ```
pub fn subdivide_mesh(mesh: &IndexedMesh, params: &SubdivideParams) -> SubdivideResult<SubdivisionResult> {
    mesh.validate_non_empty("subdivision input")?;

    let corners = mesh.faces.iter().map(|f| f.len()).sum();
    let projected = params.expected_faces(mesh.faces.len(), corners);
    if projected > params.max_faces {
        return Err(SubdivideError::MeshTooLarge {
            current: mesh.faces.len(),
            projected,
            max: params.max_faces,
        });
    }

    let mut current = mesh.clone();
    for level in 0..params.levels {
        current = subdivide_once(&current, params.mode);
        debug!(
            level = level + 1,
            mode = ?params.mode,
            faces = current.faces.len(),
            vertices = current.vertices.len(),
            creases = current.creases.len(),
            "subdivided"
        );
    }

    Ok(SubdivisionResult {
        original_faces: mesh.faces.len(),
        final_faces: current.faces.len(),
        original_vertices: mesh.vertices.len(),
        final_vertices: current.vertices.len(),
        levels: params.levels,
        mode: params.mode,
        mesh: current,
    })
}

/// Run `levels` rounds of subdivision with the default face limit.
///
/// # Errors
///
/// See [`subdivide_mesh`].
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshBounds};
/// use mesh_subdivide::{smooth, SubdivisionMode};
///
/// let cube = unit_cube();
/// let flat = smooth(&cube, 2, SubdivisionMode::Simple).unwrap();
/// assert_eq!(flat.mesh.faces.len(), 96);
/// assert_eq!(flat.mesh.bounds(), cube.bounds());
/// ```
pub fn smooth(mesh: &IndexedMesh, levels: u32, mode: SubdivisionMode) -> SubdivideResult<SubdivisionResult> {
    subdivide_mesh(mesh, &SubdivideParams::new().with_mode(mode).with_levels(levels))
}

#[derive(Debug)]
struct EdgeInfo {
    key: EdgeKey,
    faces: Vec<usize>,
    /// Crease weight; 1 for boundary and non-manifold edges.
    weight: f64,
}

/// Edge and vertex incidence of one mesh.
#[derive(Debug)]
struct Topology {
    edges: Vec<EdgeInfo>,
    index: HashMap<EdgeKey, usize>,
    vertex_edges: Vec<Vec<usize>>,
    vertex_faces: Vec<Vec<usize>>,
}

impl Topology {
    fn build(mesh: &IndexedMesh) -> Self {
        let mut edges: Vec<EdgeInfo> = Vec::new();
        let mut index = HashMap::new();
        let mut vertex_edges = vec![Vec::new(); mesh.vertices.len()];
        let mut vertex_faces = vec![Vec::new(); mesh.vertices.len()];

        for (fi, face) in mesh.faces.iter().enumerate() {
            let k = face.len();
            for i in 0..k {
                let (a, b) = (face[i], face[(i + 1) % k]);
                vertex_faces[a as usize].push(fi);
                let key = EdgeKey::new(a, b);
                let e = *index.entry(key).or_insert_with(|| {
                    let id = edges.len();
                    edges.push(EdgeInfo {
                        key,
                        faces: Vec::new(),
                        weight: 0.0,
                    });
                    vertex_edges[a as usize].push(id);
                    vertex_edges[b as usize].push(id);
                    id
                });
                edges[e].faces.push(fi);
            }
        }
        for edge in &mut edges {
            edge.weight = if edge.faces.len() == 2 {
                mesh.creases.get(edge.key.0, edge.key.1)
            } else {
                1.0
            };
        }

        Self {
            edges,
            index,
            vertex_edges,
            vertex_faces,
        }
    }

    fn edge_index(&self, a: u32, b: u32) -> usize {
        self.index[&EdgeKey::new(a, b)]
    }
}

fn midpoint(mesh: &IndexedMesh, key: EdgeKey) -> Vector3<f64> {
    (mesh.position(key.0).coords + mesh.position(key.1).coords) * 0.5
}

fn subdivide_once(mesh: &IndexedMesh, mode: SubdivisionMode) -> IndexedMesh {
    let topology = Topology::build(mesh);
    let nv = mesh.vertices.len();
    let ne = topology.edges.len();

    let face_points: Vec<Vector3<f64>> = (0..mesh.faces.len()).map(|fi| mesh.face_centroid(fi).coords).collect();

    let edge_points: Vec<Vector3<f64>> = topology
        .edges
        .iter()
        .map(|edge| {
            let mid = midpoint(mesh, edge.key);
            if !mode.is_smoothing() || edge.faces.len() != 2 {
                return mid;
            }
            let ends = mesh.position(edge.key.0).coords + mesh.position(edge.key.1).coords;
            let smooth = (ends + face_points[edge.faces[0]] + face_points[edge.faces[1]]) / 4.0;
            smooth + (mid - smooth) * edge.weight
        })
        .collect();

    let mut positions: Vec<Vector3<f64>> = mesh.vertices.iter().map(|v| v.position.coords).collect();
    if mode.is_smoothing() {
        for (v, position) in positions.iter_mut().enumerate() {
            let incident = &topology.vertex_edges[v];
            let faces = &topology.vertex_faces[v];
            if incident.is_empty() || faces.is_empty() {
                continue;
            }
            // A vertex on any fully sharp edge stays put, darts included.
            let weights = incident.iter().map(|&e| topology.edges[e].weight);
            let sharpness: f64 = weights.clone().sum();
            let sharpest = weights.fold(0.0_f64, f64::max);
            let pin = (sharpness - 1.0).clamp(0.0, 1.0).max(sharpest.clamp(0.0, 1.0));
            if pin >= 1.0 {
                continue;
            }

            let n = incident.len() as f64;
            let f_avg = faces.iter().map(|&f| face_points[f]).sum::<Vector3<f64>>() / faces.len() as f64;
            let r_avg = incident
                .iter()
                .map(|&e| midpoint(mesh, topology.edges[e].key))
                .sum::<Vector3<f64>>()
                / n;
            let smooth = (f_avg + r_avg * 2.0 + *position * (n - 3.0)) / n;
            *position = smooth + (*position - smooth) * pin;
        }
    }

    let corners = mesh.faces.iter().map(|f| f.len()).sum();
    let mut out = IndexedMesh::with_capacity(nv + ne + face_points.len(), corners);
    out.vertices.extend(
        positions
            .into_iter()
            .chain(edge_points)
            .chain(face_points)
            .map(|c| Vertex::new(Point3::from(c))),
    );

    let edge_vertex = |a: u32, b: u32| (nv + topology.edge_index(a, b)) as u32;
    for (fi, face) in mesh.faces.iter().enumerate() {
        let center = (nv + ne + fi) as u32;
        let k = face.len();
        for i in 0..k {
            let (prev, current, next) = (face[(i + k - 1) % k], face[i], face[(i + 1) % k]);
            out.push_face([current, edge_vertex(current, next), center, edge_vertex(prev, current)]);
        }
    }

    for (key, weight) in mesh.creases.iter() {
        if let Some(&e) = topology.index.get(&key) {
            let mid = (nv + e) as u32;
            out.creases.set(key.0, mid, weight);
            out.creases.set(mid, key.1, weight);
        }
    }
    out
}

//! Direct edge cutting.
//!
//! Every edge receives the same number of evenly spaced cuts, shared by
//! both faces on the edge, so the result stays conforming. Triangles and
//! quads are filled with a regular grid; larger polygons only gain the
//! cut vertices along their loop.

use hashbrown::HashMap;
use mesh_types::{CreaseMap, EdgeKey, Face, IndexedMesh, Point3};
use tracing::debug;

use crate::error::{SubdivideError, SubdivideResult};
use crate::params::DEFAULT_MAX_FACES;

/// Cut every edge `cuts` times and fill faces accordingly.
///
/// Quads become a `(cuts + 1)²` grid of quads and triangles become
/// `(cuts + 1)²` triangles. Polygons with more corners keep a single face
/// whose loop runs through the new edge vertices. Creased edges pass their
/// weight to every piece. Zero cuts returns the mesh unchanged.
///
/// # Errors
///
/// - [`SubdivideError::InvalidMesh`] if the mesh is empty or invalid
/// - [`SubdivideError::MeshTooLarge`] if the result would exceed
///   [`DEFAULT_MAX_FACES`]
///
/// # Example
///
/// ```
/// use mesh_subdivide::subdivide_edges;
/// use mesh_types::unit_cube;
///
/// let cube = unit_cube();
/// let cut = subdivide_edges(&cube, 2)?;
///
/// assert_eq!(cut.faces.len(), 6 * 9);
/// assert!((cut.volume() - 1.0).abs() < 1e-12);
/// # Ok::<(), mesh_subdivide::SubdivideError>(())
/// ```
pub fn subdivide_edges(mesh: &IndexedMesh, cuts: u32) -> SubdivideResult<IndexedMesh> {
    mesh.validate_non_empty("edge cut input")?;
    if cuts == 0 {
        return Ok(mesh.clone());
    }

    let n = cuts as usize + 1;
    let projected: usize = mesh
        .faces
        .iter()
        .map(|f| if f.len() <= 4 { n.saturating_mul(n) } else { 1 })
        .fold(0, usize::saturating_add);
    if projected > DEFAULT_MAX_FACES {
        return Err(SubdivideError::MeshTooLarge {
            current: mesh.faces.len(),
            projected,
            max: DEFAULT_MAX_FACES,
        });
    }

    let mut out = IndexedMesh::with_capacity(mesh.vertices.len(), projected);
    out.vertices.extend_from_slice(&mesh.vertices);

    let mut cutter = EdgeCuts {
        first: HashMap::new(),
        cuts: cuts as usize,
    };
    for key in mesh.edges() {
        let (a, b) = (mesh.position(key.0), mesh.position(key.1));
        let first = out.vertices.len() as u32;
        for i in 1..n {
            let t = i as f64 / n as f64;
            out.push_vertex(a + (b - a) * t);
        }
        cutter.first.insert(key, first);
    }

    for face in &mesh.faces {
        match face.len() {
            3 => fill_triangle(&mut out, &cutter, [face[0], face[1], face[2]], n),
            4 => fill_quad(&mut out, &cutter, [face[0], face[1], face[2], face[3]], n),
            k => {
                let mut ring = Face::with_capacity(k * n);
                for i in 0..k {
                    let run = cutter.run(face[i], face[(i + 1) % k]);
                    ring.extend_from_slice(&run[..run.len() - 1]);
                }
                out.faces.push(ring);
            }
        }
    }

    out.creases = inherit_creases(&mesh.creases, &cutter);
    debug!(
        cuts,
        faces = out.faces.len(),
        vertices = out.vertices.len(),
        creases = out.creases.len(),
        "cut edges"
    );
    Ok(out)
}

/// First cut vertex of every edge; cuts are laid out from `key.0` to
/// `key.1`.
struct EdgeCuts {
    first: HashMap<EdgeKey, u32>,
    cuts: usize,
}

impl EdgeCuts {
    /// Vertices along `a -> b`, both ends included.
    fn run(&self, a: u32, b: u32) -> Vec<u32> {
        let key = EdgeKey::new(a, b);
        let first = self.first.get(&key).copied().unwrap_or_default();
        let mut run = Vec::with_capacity(self.cuts + 2);
        run.push(key.0);
        run.extend((0..self.cuts as u32).map(|i| first + i));
        run.push(key.1);
        if key.0 != a {
            run.reverse();
        }
        run
    }
}

fn fill_quad(out: &mut IndexedMesh, cutter: &EdgeCuts, [v0, v1, v2, v3]: [u32; 4], n: usize) {
    let side = n + 1;
    let mut grid = vec![0u32; side * side];
    let at = |i: usize, j: usize| i * side + j;

    let (bottom, top) = (cutter.run(v0, v1), cutter.run(v3, v2));
    let (left, right) = (cutter.run(v0, v3), cutter.run(v1, v2));
    for k in 0..=n {
        grid[at(k, 0)] = bottom[k];
        grid[at(k, n)] = top[k];
        grid[at(0, k)] = left[k];
        grid[at(n, k)] = right[k];
    }

    let corners = [v0, v1, v2, v3].map(|v| out.position(v).coords);
    for i in 1..n {
        for j in 1..n {
            let (u, v) = (i as f64 / n as f64, j as f64 / n as f64);
            let p = corners[0] * ((1.0 - u) * (1.0 - v))
                + corners[1] * (u * (1.0 - v))
                + corners[2] * (u * v)
                + corners[3] * ((1.0 - u) * v);
            grid[at(i, j)] = out.push_vertex(Point3::from(p));
        }
    }

    for i in 0..n {
        for j in 0..n {
            out.push_face([grid[at(i, j)], grid[at(i + 1, j)], grid[at(i + 1, j + 1)], grid[at(i, j + 1)]]);
        }
    }
}

fn fill_triangle(out: &mut IndexedMesh, cutter: &EdgeCuts, [a, b, c]: [u32; 3], n: usize) {
    let side = n + 1;
    let mut grid = vec![0u32; side * side];
    let at = |i: usize, j: usize| i * side + j;

    let (ab, ac, bc) = (cutter.run(a, b), cutter.run(a, c), cutter.run(b, c));
    for k in 0..=n {
        grid[at(k, 0)] = ab[k];
        grid[at(0, k)] = ac[k];
        grid[at(n - k, k)] = bc[k];
    }

    let pa = out.position(a).coords;
    let (du, dv) = (out.position(b).coords - pa, out.position(c).coords - pa);
    for i in 1..n {
        for j in 1..n - i {
            let p = pa + du * (i as f64 / n as f64) + dv * (j as f64 / n as f64);
            grid[at(i, j)] = out.push_vertex(Point3::from(p));
        }
    }

    for i in 0..n {
        for j in 0..n - i {
            out.push_face([grid[at(i, j)], grid[at(i + 1, j)], grid[at(i, j + 1)]]);
            if i + j + 1 < n {
                out.push_face([grid[at(i + 1, j)], grid[at(i + 1, j + 1)], grid[at(i, j + 1)]]);
            }
        }
    }
}

fn inherit_creases(creases: &CreaseMap, cutter: &EdgeCuts) -> CreaseMap {
    let mut out = CreaseMap::new();
    for (key, weight) in creases.iter() {
        if !cutter.first.contains_key(&key) {
            continue;
        }
        for pair in cutter.run(key.0, key.1).windows(2) {
            out.set(pair[0], pair[1], weight);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_repair::MeshAdjacency;
    use mesh_types::{unit_cube, MeshBounds};

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_triangles(
            &[
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        )
    }

    #[test]
    fn zero_cuts_is_identity() {
        let cube = unit_cube();
        assert_eq!(subdivide_edges(&cube, 0).unwrap(), cube);
    }

    #[test]
    fn cube_grid_stays_closed() {
        let cube = unit_cube();
        let cut = subdivide_edges(&cube, 1).unwrap();
        assert_eq!(cut.faces.len(), 24);
        // 8 corners, 12 edge cuts, 6 face centres.
        assert_eq!(cut.vertices.len(), 26);
        assert!(MeshAdjacency::build(&cut.faces).is_watertight());
        assert_relative_eq!(cut.volume(), 1.0, epsilon = 1e-12);
        assert_eq!(cut.bounds(), cube.bounds());
    }

    #[test]
    fn triangle_splits_into_n_squared() {
        let tri = triangle();
        for cuts in 1..4u32 {
            let cut = subdivide_edges(&tri, cuts).unwrap();
            let n = cuts as usize + 1;
            assert_eq!(cut.faces.len(), n * n);
            assert_eq!(cut.vertices.len(), (n + 1) * (n + 2) / 2);
            assert_relative_eq!(cut.surface_area(), 0.5, epsilon = 1e-12);
            for fi in 0..cut.faces.len() {
                let normal = cut.face_normal(fi).unwrap();
                assert_relative_eq!(normal.z, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn pentagon_gains_loop_vertices() {
        let mut mesh = IndexedMesh::new();
        for i in 0..5 {
            let angle = f64::from(i) * std::f64::consts::TAU / 5.0;
            mesh.push_vertex(Point3::new(angle.cos(), angle.sin(), 0.0));
        }
        mesh.push_face([0, 1, 2, 3, 4]);

        let cut = subdivide_edges(&mesh, 2).unwrap();
        assert_eq!(cut.faces.len(), 1);
        assert_eq!(cut.faces[0].len(), 15);
        assert_relative_eq!(cut.surface_area(), mesh.surface_area(), epsilon = 1e-12);
    }

    #[test]
    fn creases_pass_to_the_pieces() {
        let mut cube = unit_cube();
        cube.creases.set(4, 5, 0.5);
        let cut = subdivide_edges(&cube, 2).unwrap();
        assert_eq!(cut.creases.len(), 3);
        assert!(!cut.creases.is_sharp(4, 5));
        assert!(cut.creases.iter().all(|(_, w)| (w - 0.5).abs() < f64::EPSILON));
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let err = subdivide_edges(&IndexedMesh::new(), 1).unwrap_err();
        assert!(matches!(err, SubdivideError::InvalidMesh(_)));
    }
}

//! Owning shape handle.

use crate::error::MeshResult;
use crate::{Face, IndexedMesh, Vertex};
use nalgebra::{Isometry3, Point3, Rotation3, Vector3};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plane to mirror a shape through. Every plane passes through the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MirrorPlane {
    /// The XY plane (negates Z).
    XY,
    /// The XZ plane (negates Y).
    XZ,
    /// The YZ plane (negates X).
    YZ,
}

impl MirrorPlane {
    /// Index of the coordinate the plane negates.
    #[must_use]
    pub const fn axis(self) -> usize {
        match self {
            Self::XY => 2,
            Self::XZ => 1,
            Self::YZ => 0,
        }
    }
}

/// A solid in the pipeline: exactly one mesh, a reference point and a tag.
///
/// A shape exclusively owns its mesh. Boolean and hull operations take
/// their operands by value, so an operand cannot be used after it has been
/// consumed. Geometry is kept in world coordinates; `location` is the
/// transform position, moved along with the geometry, and is what union
/// folds measure distances from.
///
/// # Example
///
/// ```
/// use mesh_types::{box_shape, MeshBounds, Vector3};
///
/// let mut key = box_shape(1.0, 1.0, 1.0);
/// key.translate(Vector3::new(0.0, 0.0, 5.0));
/// assert_eq!(key.location().z, 5.0);
/// assert_eq!(key.mesh().bounds().max.z, 5.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    mesh: IndexedMesh,
    location: Point3<f64>,
    tag: String,
}

impl Shape {
    /// Wrap a mesh with its reference point at the origin.
    #[must_use]
    pub fn new(mesh: IndexedMesh, tag: impl Into<String>) -> Self {
        Self::with_location(mesh, Point3::origin(), tag)
    }

    /// Wrap a mesh with an explicit reference point.
    #[must_use]
    pub fn with_location(mesh: IndexedMesh, location: Point3<f64>, tag: impl Into<String>) -> Self {
        Self {
            mesh,
            location,
            tag: tag.into(),
        }
    }

    /// Build a shape from a `(vertex list, face list, transform)` triple.
    ///
    /// The transform is baked into the vertex positions and its
    /// translation becomes the reference point.
    ///
    /// # Errors
    ///
    /// Returns [`crate::MeshError`] if the mesh is empty, a face has fewer
    /// than 3 vertices, an index is out of range, or a coordinate is not
    /// finite.
    pub fn from_parts(
        positions: &[Point3<f64>],
        faces: &[Vec<u32>],
        transform: &Isometry3<f64>,
        tag: impl Into<String>,
    ) -> MeshResult<Self> {
        let tag = tag.into();
        let mut mesh = IndexedMesh::from_parts(
            positions.iter().copied().map(Vertex::new).collect(),
            faces.iter().map(|f| Face::from_slice(f)).collect(),
        );
        mesh.validate_non_empty(&tag)?;
        mesh.transform(transform);
        let location = Point3::from(transform.translation.vector);
        Ok(Self::with_location(mesh, location, tag))
    }

    /// The owned mesh.
    #[inline]
    #[must_use]
    pub const fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    /// Mutable access to the owned mesh.
    #[inline]
    pub fn mesh_mut(&mut self) -> &mut IndexedMesh {
        &mut self.mesh
    }

    /// Release the mesh, consuming the handle.
    #[inline]
    #[must_use]
    pub fn into_mesh(self) -> IndexedMesh {
        self.mesh
    }

    /// Swap in a new mesh, keeping location and tag.
    pub fn replace_mesh(&mut self, mesh: IndexedMesh) -> IndexedMesh {
        std::mem::replace(&mut self.mesh, mesh)
    }

    /// Reference point (transform position).
    #[inline]
    #[must_use]
    pub const fn location(&self) -> Point3<f64> {
        self.location
    }

    /// Human-readable identity used in logs and errors.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Rename the shape.
    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    /// Deep copy under a new tag.
    #[must_use]
    pub fn duplicate(&self, tag: impl Into<String>) -> Self {
        let copy = Self {
            mesh: self.mesh.clone(),
            location: self.location,
            tag: tag.into(),
        };
        debug!(source = %self.tag, copy = %copy.tag, "duplicated shape");
        copy
    }

    /// Move geometry and reference point.
    pub fn translate(&mut self, offset: Vector3<f64>) -> &mut Self {
        self.mesh.translate(offset);
        self.location += offset;
        self
    }

    /// Rotate about the origin by `-degrees[0]` around X, then
    /// `-degrees[1]` around Y, then `-degrees[2]` around Z.
    pub fn rotate(&mut self, degrees: [f64; 3]) -> &mut Self {
        let rotation = rotation_from_degrees(degrees);
        for vertex in &mut self.mesh.vertices {
            vertex.position = rotation * vertex.position;
        }
        self.location = rotation * self.location;
        self
    }

    /// Mirror geometry and reference point through a plane through the
    /// origin. Loops are reversed so the solid stays outward-facing.
    pub fn mirror(&mut self, plane: MirrorPlane) -> &mut Self {
        let axis = plane.axis();
        self.mesh.reflect(axis);
        self.location[axis] = -self.location[axis];
        self
    }

    /// Distance between the reference points of two shapes.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        nalgebra::distance(&self.location, &other.location)
    }
}

/// The X-then-Y-then-Z rotation with negated angles.
#[must_use]
fn rotation_from_degrees(degrees: [f64; 3]) -> Rotation3<f64> {
    let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), -degrees[0].to_radians());
    let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), -degrees[1].to_radians());
    let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), -degrees[2].to_radians());
    rz * ry * rx
}

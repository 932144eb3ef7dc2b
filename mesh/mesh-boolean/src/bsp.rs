//! Binary space partitioning over convex polygons.
//!
//! Each node holds a splitting plane, the polygons lying in it, and the
//! indices of its front and back subtrees. Nodes live in one arena so
//! every traversal is a loop over a vector or an explicit stack.
//!
//! A tree built from a closed, outward-facing solid answers "is this
//! fragment inside the solid": [`BspTree::clip_polygons`] keeps only what
//! lies outside, and [`BspTree::invert`] swaps inside and outside.

use mesh_types::{Point3, Vector3};

/// Position of a point or polygon relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Coplanar,
    Front,
    Back,
    Spanning,
}

impl Side {
    fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Coplanar, s) | (s, Self::Coplanar) => s,
            (a, b) if a == b => a,
            _ => Self::Spanning,
        }
    }
}

/// An oriented plane `normal · p = w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Plane {
    pub(crate) normal: Vector3<f64>,
    pub(crate) w: f64,
}

impl Plane {
    /// Plane through `point` with unit `normal`.
    pub(crate) fn new(normal: Vector3<f64>, point: &Point3<f64>) -> Self {
        Self {
            normal,
            w: normal.dot(&point.coords),
        }
    }

    pub(crate) fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    pub(crate) fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    fn side_of(&self, point: &Point3<f64>, epsilon: f64) -> Side {
        let d = self.signed_distance(point);
        if d > epsilon {
            Side::Front
        } else if d < -epsilon {
            Side::Back
        } else {
            Side::Coplanar
        }
    }
}

/// A convex, planar polygon wound counter-clockwise about its plane normal.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Polygon {
    pub(crate) points: Vec<Point3<f64>>,
    pub(crate) plane: Plane,
}

impl Polygon {
    pub(crate) fn flip(&mut self) {
        self.points.reverse();
        self.plane = self.plane.flipped();
    }
}

/// Where the pieces of a polygon go when split by a plane.
struct Buckets<'a> {
    coplanar_front: &'a mut Vec<Polygon>,
    coplanar_back: &'a mut Vec<Polygon>,
    front: &'a mut Vec<Polygon>,
    back: &'a mut Vec<Polygon>,
}

/// Split `polygon` by `plane`, returning whether it was cut in two.
fn split_polygon(plane: &Plane, polygon: Polygon, epsilon: f64, out: &mut Buckets<'_>) -> bool {
    let sides: Vec<Side> = polygon.points.iter().map(|p| plane.side_of(p, epsilon)).collect();
    let overall = sides.iter().fold(Side::Coplanar, |acc, &s| acc.combine(s));

    match overall {
        Side::Coplanar => {
            if plane.normal.dot(&polygon.plane.normal) > 0.0 {
                out.coplanar_front.push(polygon);
            } else {
                out.coplanar_back.push(polygon);
            }
            false
        }
        Side::Front => {
            out.front.push(polygon);
            false
        }
        Side::Back => {
            out.back.push(polygon);
            false
        }
        Side::Spanning => {
            let n = polygon.points.len();
            let mut front = Vec::with_capacity(n + 1);
            let mut back = Vec::with_capacity(n + 1);
            for i in 0..n {
                let j = (i + 1) % n;
                let (si, sj) = (sides[i], sides[j]);
                let (pi, pj) = (polygon.points[i], polygon.points[j]);
                if si != Side::Back {
                    front.push(pi);
                }
                if si != Side::Front {
                    back.push(pi);
                }
                if si.combine(sj) == Side::Spanning {
                    let t = plane.signed_distance(&pi) / (plane.signed_distance(&pi) - plane.signed_distance(&pj));
                    let cut = pi + (pj - pi) * t;
                    front.push(cut);
                    back.push(cut);
                }
            }
            if front.len() >= 3 {
                out.front.push(Polygon {
                    points: front,
                    plane: polygon.plane,
                });
            }
            if back.len() >= 3 {
                out.back.push(Polygon {
                    points: back,
                    plane: polygon.plane,
                });
            }
            true
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    plane: Option<Plane>,
    polygons: Vec<Polygon>,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree of one solid's boundary polygons.
#[derive(Debug, Clone)]
pub(crate) struct BspTree {
    nodes: Vec<Node>,
    epsilon: f64,
    /// Polygons cut in two while building or clipping.
    pub(crate) splits: usize,
}

impl BspTree {
    /// Build a tree, taking each node's plane from its first polygon.
    pub(crate) fn build(polygons: Vec<Polygon>, epsilon: f64) -> Self {
        let mut tree = Self {
            nodes: vec![Node::default()],
            epsilon,
            splits: 0,
        };
        let mut stack = vec![(0, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            let Some(first) = polygons.first() else {
                continue;
            };
            let plane = *tree.nodes[index].plane.get_or_insert(first.plane);

            let mut coplanar = Vec::new();
            let mut coplanar_back = Vec::new();
            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                let mut out = Buckets {
                    coplanar_front: &mut coplanar,
                    coplanar_back: &mut coplanar_back,
                    front: &mut front,
                    back: &mut back,
                };
                if split_polygon(&plane, polygon, epsilon, &mut out) {
                    tree.splits += 1;
                }
            }
            coplanar.append(&mut coplanar_back);
            tree.nodes[index].polygons.append(&mut coplanar);

            if !front.is_empty() {
                let child = tree.child(index, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = tree.child(index, false);
                stack.push((child, back));
            }
        }
        tree
    }

    /// Index of a node's front or back child, creating it if missing.
    fn child(&mut self, index: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[index].front
        } else {
            self.nodes[index].back
        };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(Node::default());
        if front {
            self.nodes[index].front = Some(child);
        } else {
            self.nodes[index].back = Some(child);
        }
        child
    }

    /// Turn the solid inside out.
    pub(crate) fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            node.plane = node.plane.map(Plane::flipped);
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Remove the parts of `polygons` inside this tree's solid. Polygons
    /// coplanar with a node follow their own facing.
    pub(crate) fn clip_polygons(&self, polygons: Vec<Polygon>, splits: &mut usize) -> Vec<Polygon> {
        let mut kept = Vec::new();
        let mut stack = vec![(0, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            let node = &self.nodes[index];
            let Some(plane) = node.plane else {
                kept.extend(polygons);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            let mut coplanar_front = Vec::new();
            let mut coplanar_back = Vec::new();
            for polygon in polygons {
                let mut out = Buckets {
                    coplanar_front: &mut coplanar_front,
                    coplanar_back: &mut coplanar_back,
                    front: &mut front,
                    back: &mut back,
                };
                if split_polygon(&plane, polygon, self.epsilon, &mut out) {
                    *splits += 1;
                }
            }
            front.append(&mut coplanar_front);
            back.append(&mut coplanar_back);

            match node.front {
                Some(child) => stack.push((child, front)),
                None => kept.extend(front),
            }
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }
        kept
    }

    /// Clip this tree's polygons against `other`.
    pub(crate) fn clip_to(&mut self, other: &Self) {
        let mut splits = 0;
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons, &mut splits);
        }
        self.splits += splits;
    }

    /// Every polygon still in the tree.
    pub(crate) fn into_polygons(self) -> Vec<Polygon> {
        self.nodes.into_iter().flat_map(|node| node.polygons).collect()
    }

    #[cfg(test)]
    fn polygon_count(&self) -> usize {
        self.nodes.iter().map(|node| node.polygons.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(z: f64) -> Polygon {
        let points = vec![
            Point3::new(0.0, 0.0, z),
            Point3::new(1.0, 0.0, z),
            Point3::new(0.0, 1.0, z),
        ];
        Polygon {
            plane: Plane::new(Vector3::z(), &points[0]),
            points,
        }
    }

    #[test]
    fn build_keeps_every_polygon() {
        let tree = BspTree::build(vec![triangle(0.0), triangle(1.0), triangle(-1.0)], 1e-5);
        assert_eq!(tree.polygon_count(), 3);
        assert_eq!(tree.splits, 0);
    }

    #[test]
    fn clip_keeps_front_and_drops_back() {
        let tree = BspTree::build(vec![triangle(0.0)], 1e-5);
        let mut splits = 0;
        assert_eq!(tree.clip_polygons(vec![triangle(1.0)], &mut splits).len(), 1);
        assert!(tree.clip_polygons(vec![triangle(-1.0)], &mut splits).is_empty());
    }

    #[test]
    fn spanning_polygon_is_cut() {
        let points = vec![
            Point3::new(0.0, 0.0, -1.0),
            Point3::new(1.0, 0.0, -1.0),
            Point3::new(0.5, 0.0, 1.0),
        ];
        let polygon = Polygon {
            plane: Plane::new(-Vector3::y(), &points[0]),
            points,
        };
        let tree = BspTree::build(vec![triangle(0.0)], 1e-5);
        let mut splits = 0;
        let kept = tree.clip_polygons(vec![polygon], &mut splits);
        assert_eq!(splits, 1);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].points.iter().all(|p| p.z >= -1e-12));
    }

    #[test]
    fn invert_flips_planes_and_polygons() {
        let mut tree = BspTree::build(vec![triangle(0.0)], 1e-5);
        tree.invert();
        let polygons = tree.into_polygons();
        assert_eq!(polygons[0].plane.normal, -Vector3::z());
        assert_eq!(polygons[0].points[0], Point3::new(0.0, 1.0, 0.0));
    }
}

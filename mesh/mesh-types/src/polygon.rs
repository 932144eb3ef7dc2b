//! Geometry of planar (or nearly planar) polygon loops.
//!
//! All functions take the loop as a slice of positions in order and return
//! indices into that slice, so callers can map them back to mesh vertices.

use nalgebra::{Point3, Vector3};

/// Area-weighted normal of a loop by Newell's method.
///
/// The magnitude is twice the polygon area. Works for non-convex loops.
#[must_use]
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

/// Unit normal of a loop, `None` when the loop has no area.
#[must_use]
pub fn normal(points: &[Point3<f64>]) -> Option<Vector3<f64>> {
    newell_normal(points).try_normalize(f64::EPSILON)
}

/// Area enclosed by a loop.
#[must_use]
pub fn area(points: &[Point3<f64>]) -> f64 {
    newell_normal(points).norm() * 0.5
}

/// Average of the loop's vertices.
#[must_use]
pub fn centroid(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Whether every corner of the loop turns the same way as `normal`.
///
/// Collinear corners (cross product shorter than `eps`) are tolerated.
#[must_use]
pub fn is_convex(points: &[Point3<f64>], normal: &Vector3<f64>, eps: f64) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    (0..n).all(|i| {
        let prev = points[(i + n - 1) % n];
        let curr = points[i];
        let next = points[(i + 1) % n];
        (curr - prev).cross(&(next - curr)).dot(normal) >= -eps
    })
}

/// Largest deviation of any loop vertex from the loop's best-fit plane.
#[must_use]
pub fn planarity_error(points: &[Point3<f64>]) -> f64 {
    let Some(n) = normal(points) else {
        return 0.0;
    };
    let c = centroid(points);
    points
        .iter()
        .map(|p| (p - c).dot(&n).abs())
        .fold(0.0, f64::max)
}

/// Triangulate a loop by ear clipping.
///
/// The loop is projected onto the plane dropping the axis most aligned with
/// its normal. Collinear corners are never clipped as ears. If clipping gets
/// stuck (self-intersecting input) the remainder is fanned.
///
/// Returned triangles keep the loop's winding.
#[must_use]
pub fn triangulate(points: &[Point3<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }
    if n == 3 {
        return vec![[0, 1, 2]];
    }

    let poly_normal = newell_normal(points);
    let scale = poly_normal.norm().max(f64::MIN_POSITIVE);
    let projected: Vec<(f64, f64)> = points.iter().map(|p| project(p, &poly_normal)).collect();
    // Projection may mirror the loop, so measure orientation in 2D.
    let orientation = signed_area_2d(&projected).signum();

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&i| {
            let prev = remaining[(i + m - 1) % m];
            let curr = remaining[i];
            let next = remaining[(i + 1) % m];
            is_ear(&projected, &remaining, prev, curr, next, orientation, scale)
        });

        let Some(i) = ear else {
            break;
        };
        let prev = remaining[(i + m - 1) % m];
        let next = remaining[(i + 1) % m];
        triangles.push([prev, remaining[i], next]);
        remaining.remove(i);
    }

    // Fan whatever is left: the final triangle, or a stuck remainder.
    for i in 1..remaining.len().saturating_sub(1) {
        triangles.push([remaining[0], remaining[i], remaining[i + 1]]);
    }

    triangles
}

fn project(p: &Point3<f64>, normal: &Vector3<f64>) -> (f64, f64) {
    let (ax, ay, az) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    if az >= ax && az >= ay {
        (p.x, p.y)
    } else if ay >= ax {
        (p.z, p.x)
    } else {
        (p.y, p.z)
    }
}

fn signed_area_2d(points: &[(f64, f64)]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % n];
            x0 * y1 - x1 * y0
        })
        .sum::<f64>()
        * 0.5
}

fn cross_2d(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

fn is_ear(
    projected: &[(f64, f64)],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    orientation: f64,
    scale: f64,
) -> bool {
    let a = projected[prev];
    let b = projected[curr];
    let c = projected[next];

    // Convex and not collinear, relative to the loop size.
    let turn = cross_2d(a, b, c) * orientation;
    if turn <= scale * 1e-12 {
        return false;
    }

    remaining.iter().all(|&idx| {
        if idx == prev || idx == curr || idx == next {
            return true;
        }
        let p = projected[idx];
        // Duplicates of the ear's own corners do not block it.
        if p == a || p == b || p == c {
            return true;
        }
        !point_in_triangle(p, a, b, c, orientation)
    })
}

/// Inclusive test, so vertices on the ear's diagonal block it.
fn point_in_triangle(
    p: (f64, f64),
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    orientation: f64,
) -> bool {
    let d1 = cross_2d(a, b, p) * orientation;
    let d2 = cross_2d(b, c, p) * orientation;
    let d3 = cross_2d(c, a, p) * orientation;
    d1 >= 0.0 && d2 >= 0.0 && d3 >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    fn total_area(points: &[Point3<f64>], tris: &[[usize; 3]]) -> f64 {
        tris.iter()
            .map(|t| area(&[points[t[0]], points[t[1]], points[t[2]]]))
            .sum()
    }

    #[test]
    fn square_normal_and_area() {
        let sq = square();
        let n = normal(&sq).unwrap();
        assert_relative_eq!(n, Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(area(&sq), 1.0, epsilon = 1e-12);
        assert_relative_eq!(centroid(&sq), Point3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        assert!(is_convex(&sq, &n, 1e-12));
        assert_relative_eq!(planarity_error(&sq), 0.0);
    }

    #[test]
    fn collinear_loop_has_no_normal() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(normal(&line).is_none());
        assert_eq!(area(&line), 0.0);
    }

    #[test]
    fn triangulates_l_shape() {
        let l = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert!(!is_convex(&l, &Vector3::z(), 1e-12));
        let tris = triangulate(&l);
        assert_eq!(tris.len(), 4);
        assert_relative_eq!(total_area(&l, &tris), 3.0, epsilon = 1e-12);
        for t in &tris {
            let n = newell_normal(&[l[t[0]], l[t[1]], l[t[2]]]);
            assert!(n.z > 0.0, "winding must follow the loop");
        }
    }

    #[test]
    fn collinear_corners_are_not_clipped() {
        // Rectangle with a T-junction vertex on the bottom edge.
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let tris = triangulate(&pts);
        assert_eq!(tris.len(), 3);
        for t in &tris {
            assert!(area(&[pts[t[0]], pts[t[1]], pts[t[2]]]) > 1e-9);
        }
    }

    #[test]
    fn vertical_loop_triangulates() {
        // Clockwise in the projected YZ plane; winding must still hold.
        let pts = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let loop_normal = newell_normal(&pts);
        let tris = triangulate(&pts);
        assert_eq!(tris.len(), 2);
        for t in &tris {
            let n = newell_normal(&[pts[t[0]], pts[t[1]], pts[t[2]]]);
            assert!(n.dot(&loop_normal) > 0.0);
        }
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Plan-view polygon utilities
//!
//! Polygons are open rings of [`Point2`]: the first point is never repeated at
//! the end. Plan points `(x, y)` map to 3D as `(x, height, y)`; the canonical
//! winding of this crate is counter-clockwise in plan coordinates.

use crate::error::{Error, Result};
use nalgebra::{Point2, Point3, Rotation2, Vector2};
use std::f64::consts::PI;

/// Points closer than this are treated as the same point
pub const EPSILON_2D: f64 = 1e-9;

/// Signed area (shoelace formula), positive for counter-clockwise rings
pub fn signed_area(points: &[Point2<f64>]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }
    area * 0.5
}

/// Absolute area of a ring
#[inline]
pub fn area(points: &[Point2<f64>]) -> f64 {
    signed_area(points).abs()
}

#[inline]
pub fn is_ccw(points: &[Point2<f64>]) -> bool {
    signed_area(points) > 0.0
}

/// Return the ring in counter-clockwise order
pub fn ensure_ccw(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out = points.to_vec();
    if signed_area(&out) < 0.0 {
        out.reverse();
    }
    out
}

/// Return the ring in clockwise order
pub fn ensure_cw(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out = points.to_vec();
    if signed_area(&out) > 0.0 {
        out.reverse();
    }
    out
}

/// Drop consecutive duplicate points, including a repeated closing point
pub fn clean_polygon(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out: Vec<Point2<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if out
            .last()
            .map_or(true, |last| (p - last).norm() > EPSILON_2D)
        {
            out.push(*p);
        }
    }
    while out.len() > 1 && (out[0] - out[out.len() - 1]).norm() <= EPSILON_2D {
        out.pop();
    }
    out
}

/// Drop points lying on the segment joining their neighbours
pub fn remove_collinear(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut out = clean_polygon(points);
    let mut i = 0;
    while out.len() > 3 && i < out.len() {
        let n = out.len();
        let prev = out[(i + n - 1) % n];
        let next = out[(i + 1) % n];
        let a = out[i] - prev;
        let b = next - out[i];
        let cross = a.x * b.y - a.y * b.x;
        if cross.abs() <= EPSILON_2D * a.norm().max(b.norm()) && a.dot(&b) > 0.0 {
            out.remove(i);
        } else {
            i += 1;
        }
    }
    out
}

/// Vertex average of a 2D point set
pub fn centroid(points: &[Point2<f64>]) -> Point2<f64> {
    if points.is_empty() {
        return Point2::origin();
    }
    let sum = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords);
    Point2::from(sum / points.len() as f64)
}

/// Vertex average of a 3D point set
pub fn centroid_3d(points: &[Point3<f64>]) -> Point3<f64> {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
    Point3::from(sum / points.len() as f64)
}

/// Lift a plan point to 3D at the given height
#[inline]
pub fn point_to_3d(p: &Point2<f64>, height: f64) -> Point3<f64> {
    Point3::new(p.x, height, p.y)
}

/// Lift plan points to 3D at the given height
pub fn to_3d(points: &[Point2<f64>], height: f64) -> Vec<Point3<f64>> {
    points.iter().map(|p| point_to_3d(p, height)).collect()
}

/// Lift plan points to 3D with the second plan axis negated.
///
/// The mirror flips the winding, so a counter-clockwise plan ring reads
/// counter-clockwise when seen from above in a right-handed y-up frame.
pub fn to_3d_mirrored(points: &[Point2<f64>], height: f64) -> Vec<Point3<f64>> {
    points.iter().map(|p| Point3::new(p.x, height, -p.y)).collect()
}

/// Drop the vertical component
pub fn to_2d(points: &[Point3<f64>]) -> Vec<Point2<f64>> {
    points.iter().map(|p| Point2::new(p.x, p.z)).collect()
}

/// Inverse of [`to_3d_mirrored`]
pub fn to_2d_mirrored(points: &[Point3<f64>]) -> Vec<Point2<f64>> {
    points.iter().map(|p| Point2::new(p.x, -p.z)).collect()
}

pub fn displace(points: &[Point2<f64>], offset: &Vector2<f64>) -> Vec<Point2<f64>> {
    points.iter().map(|p| p + offset).collect()
}

/// Scale about the origin
pub fn scale(points: &[Point2<f64>], factor: f64) -> Vec<Point2<f64>> {
    points.iter().map(|p| Point2::from(p.coords * factor)).collect()
}

/// Rotate counter-clockwise about the origin
pub fn rotate(points: &[Point2<f64>], angle: f64) -> Vec<Point2<f64>> {
    let rotation = Rotation2::new(angle);
    points.iter().map(|p| rotation * p).collect()
}

/// Angle of a vector from the +x axis, in `(-π, π]`
#[inline]
pub fn get_angle(v: &Vector2<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// Iterate over the sides `(p[i], p[i + 1])` of a ring, closing the loop
pub fn sides(points: &[Point2<f64>]) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
    let n = points.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| (points[i], points[(i + 1) % n]))
}

/// Axis-aligned square centered on the origin, counter-clockwise
pub fn make_quad(side_length: f64) -> Vec<Point2<f64>> {
    let s = side_length / 2.0;
    vec![
        Point2::new(s, s),
        Point2::new(-s, s),
        Point2::new(-s, -s),
        Point2::new(s, -s),
    ]
}

/// `num_sides` points on a circle of `radius`, starting at `base_angle`,
/// counter-clockwise
pub fn make_regular_polygon(
    num_sides: usize,
    radius: f64,
    base_angle: f64,
) -> Result<Vec<Point2<f64>>> {
    if num_sides < 3 {
        return Err(Error::InvalidArgument(format!(
            "a polygon needs at least 3 sides, got {}",
            num_sides
        )));
    }
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "polygon radius must be positive, got {}",
            radius
        )));
    }

    let step = 2.0 * PI / num_sides as f64;
    Ok((0..num_sides)
        .map(|i| {
            let angle = base_angle + step * i as f64;
            Point2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect())
}

/// [`make_regular_polygon`] lifted to the `y = 0` plane
pub fn make_regular_polygon_xz(
    num_sides: usize,
    radius: f64,
    base_angle: f64,
) -> Result<Vec<Point3<f64>>> {
    Ok(to_3d(&make_regular_polygon(num_sides, radius, base_angle)?, 0.0))
}

/// Regular polygon described by its center and one of its vertices
pub fn regular_polygon_from_vertex(
    center: &Point2<f64>,
    vertex: &Point2<f64>,
    num_sides: usize,
) -> Result<Vec<Point2<f64>>> {
    let segment = vertex - center;
    let points = make_regular_polygon(num_sides, segment.norm(), get_angle(&segment))?;
    Ok(displace(&points, &center.coords))
}

/// Insert `num_segments - 1` evenly spaced points on every side
pub fn tesselate_border(points: &[Point2<f64>], num_segments: usize) -> Vec<Point2<f64>> {
    let segments = num_segments.max(1);
    let mut out = Vec::with_capacity(points.len() * segments);
    for (a, b) in sides(points) {
        out.push(a);
        for j in 1..segments {
            let t = j as f64 / segments as f64;
            out.push(a + (b - a) * t);
        }
    }
    out
}

/// Replace the middle third of every side with the two outer edges of an
/// equilateral triangle, `levels` times. `outside` assumes a counter-clockwise
/// ring.
pub fn fractalize_triangle(polygon: &[Point2<f64>], outside: bool, levels: usize) -> Vec<Point2<f64>> {
    fractalize(polygon, outside, levels, |mid1, mid2, normal| {
        let height = (mid2 - mid1).norm() * 3f64.sqrt() / 2.0;
        let apex = nalgebra::center(&mid1, &mid2) + normal * height;
        vec![mid1, apex, mid2]
    })
}

/// Replace the middle third of every side with three sides of a square,
/// `levels` times. `outside` assumes a counter-clockwise ring.
pub fn fractalize_square(polygon: &[Point2<f64>], outside: bool, levels: usize) -> Vec<Point2<f64>> {
    fractalize(polygon, outside, levels, |mid1, mid2, normal| {
        let bump = normal * (mid2 - mid1).norm();
        vec![mid1, mid1 + bump, mid2 + bump, mid2]
    })
}

fn fractalize<F>(polygon: &[Point2<f64>], outside: bool, levels: usize, bump: F) -> Vec<Point2<f64>>
where
    F: Fn(Point2<f64>, Point2<f64>, Vector2<f64>) -> Vec<Point2<f64>>,
{
    let mut points = polygon.to_vec();
    for _ in 0..levels {
        let mut next = Vec::with_capacity(points.len() * 5);
        for (a, b) in sides(&points) {
            let side = b - a;
            let length = side.norm();
            next.push(a);
            if length <= EPSILON_2D {
                continue;
            }
            // Right-hand normal points out of a counter-clockwise ring
            let mut normal = Vector2::new(side.y, -side.x) / length;
            if !outside {
                normal = -normal;
            }
            let mid1 = a + side / 3.0;
            let mid2 = a + side * (2.0 / 3.0);
            next.extend(bump(mid1, mid2, normal));
        }
        points = next;
    }
    points
}

/// Build an open polyline of `num_segments + 1` points from `start`.
///
/// The first segment heads along `initial_angle`; every following segment
/// turns by a value drawn from `turn`. Segment lengths are drawn from
/// `length`. Draws alternate turn/length in segment order.
pub fn make_segmented_line<A, L>(
    start: Point2<f64>,
    num_segments: usize,
    initial_angle: f64,
    mut turn: A,
    mut length: L,
) -> Vec<Point2<f64>>
where
    A: FnMut() -> f64,
    L: FnMut() -> f64,
{
    let mut points = Vec::with_capacity(num_segments + 1);
    points.push(start);

    let mut angle = initial_angle;
    let mut current = start;
    for i in 0..num_segments {
        if i > 0 {
            angle += turn();
        }
        let len = length();
        current += Vector2::new(angle.cos(), angle.sin()) * len;
        points.push(current);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn test_signed_area_orientation() {
        let ccw = unit_square();
        assert_relative_eq!(signed_area(&ccw), 1.0);
        let cw: Vec<_> = ccw.iter().rev().cloned().collect();
        assert_relative_eq!(signed_area(&cw), -1.0);
        assert!(is_ccw(&ensure_ccw(&cw)));
        assert!(!is_ccw(&ensure_cw(&ccw)));
    }

    #[test]
    fn test_clean_polygon() {
        let mut points = unit_square();
        points.insert(1, Point2::new(0.0, 0.0));
        points.push(Point2::new(0.0, 0.0));
        assert_eq!(clean_polygon(&points), unit_square());
    }

    #[test]
    fn test_remove_collinear() {
        let points = tesselate_border(&unit_square(), 4);
        assert_eq!(points.len(), 16);
        assert_eq!(remove_collinear(&points), unit_square());
    }

    #[test]
    fn test_regular_polygon() {
        let n = 7;
        let points = make_regular_polygon(n, 3.0, 0.4).unwrap();
        assert_eq!(points.len(), n);
        for (i, p) in points.iter().enumerate() {
            assert_relative_eq!(p.coords.norm(), 3.0, epsilon = 1e-12);
            let next = points[(i + 1) % n];
            let step = (get_angle(&next.coords) - get_angle(&p.coords)).rem_euclid(2.0 * PI);
            assert_relative_eq!(step, 2.0 * PI / n as f64, epsilon = 1e-12);
        }
        assert!(is_ccw(&points));
    }

    #[test]
    fn test_regular_polygon_too_few_sides() {
        assert!(matches!(
            make_regular_polygon(2, 1.0, 0.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_regular_polygon_from_vertex() {
        let center = Point2::new(2.0, -1.0);
        let vertex = Point2::new(4.0, -1.0);
        let points = regular_polygon_from_vertex(&center, &vertex, 4).unwrap();
        assert_relative_eq!(points[0], vertex, epsilon = 1e-12);
        assert_relative_eq!(points[1], Point2::new(2.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_3d_round_trip() {
        let square = unit_square();
        let lifted = to_3d(&square, 2.0);
        assert!(lifted.iter().all(|p| p.y == 2.0));
        assert_eq!(to_2d(&lifted), square);
        assert_eq!(to_2d_mirrored(&to_3d_mirrored(&square, 0.0)), square);
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let rotated = rotate(&[Point2::new(1.0, 0.0)], PI / 2.0);
        assert_relative_eq!(rotated[0], Point2::new(0.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_tesselate_border() {
        let points = tesselate_border(&unit_square(), 2);
        assert_eq!(points.len(), 8);
        assert_relative_eq!(points[1], Point2::new(0.5, 0.0));
        assert_relative_eq!(signed_area(&points), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_fractalize_area() {
        let square = make_quad(3.0);
        let outward = fractalize_square(&square, true, 1);
        let inward = fractalize_square(&square, false, 1);
        assert_eq!(outward.len(), 20);
        // Each side gains (or loses) a 1x1 square
        assert_relative_eq!(signed_area(&outward), 13.0, epsilon = 1e-9);
        assert_relative_eq!(signed_area(&inward), 5.0, epsilon = 1e-9);

        let star = fractalize_triangle(&square, true, 2);
        assert_eq!(star.len(), 4 * 4 * 4);
        assert!(signed_area(&star) > 9.0);
    }

    #[test]
    fn test_segmented_line() {
        let mut turns = vec![0.5, -0.5].into_iter();
        let points = make_segmented_line(
            Point2::origin(),
            3,
            PI / 2.0,
            || turns.next().unwrap_or(0.0),
            || 2.0,
        );
        assert_eq!(points.len(), 4);
        assert_relative_eq!(points[1], Point2::new(0.0, 2.0), epsilon = 1e-12);
        // Last segment is back on the initial heading
        let last = points[3] - points[2];
        assert_relative_eq!(get_angle(&last), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sides_closes_loop() {
        let square = unit_square();
        let all: Vec<_> = sides(&square).collect();
        assert_eq!(all.len(), 4);
        assert_eq!(all[3], (square[3], square[0]));
    }
}

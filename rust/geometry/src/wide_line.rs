// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Line widening with mitered joints
//!
//! A polyline ("main points") is turned into a strip of quads by offsetting each
//! vertex perpendicular to the bisector of its two adjacent segments. End
//! vertices get a virtual neighbour extrapolated from their only segment, so
//! the same miter formula applies everywhere.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::polygon::{point_to_3d, EPSILON_2D};
use nalgebra::{Point2, Vector2};

/// Lower bound for `cos(θ/2)`; keeps miters of near-reversing joints finite
const MIN_MITER_COS: f64 = 0.05;

/// Right and left offsets of every polyline vertex
struct Sides {
    right: Vec<Point2<f64>>,
    left: Vec<Point2<f64>>,
}

fn widen(points: &[Point2<f64>], width: f64, lengthen_ends: bool) -> Result<Sides> {
    if points.len() < 2 {
        return Err(Error::InvalidArgument(format!(
            "a wide line needs at least 2 points, got {}",
            points.len()
        )));
    }
    if !(width > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "line width must be positive, got {}",
            width
        )));
    }

    let half = width / 2.0;
    let n = points.len();

    // Unit direction of every segment
    let mut segments = Vec::with_capacity(n - 1);
    for w in points.windows(2) {
        let d = (w[1] - w[0])
            .try_normalize(EPSILON_2D)
            .ok_or_else(|| Error::InvalidArgument("wide line has coincident points".to_string()))?;
        segments.push(d);
    }

    let mut line = points.to_vec();
    if lengthen_ends {
        line[0] -= segments[0] * half;
        line[n - 1] += segments[n - 2] * half;
    }

    let mut right = Vec::with_capacity(n);
    let mut left = Vec::with_capacity(n);
    for i in 0..n {
        // Virtual neighbours continue the terminal segments
        let d1 = if i == 0 { segments[0] } else { segments[i - 1] };
        let d2 = if i == n - 1 { segments[n - 2] } else { segments[i] };

        let dir = (d1 + d2).try_normalize(EPSILON_2D).unwrap_or(d1);
        let cos_half = dir.dot(&d1).max(MIN_MITER_COS);
        let offset = Vector2::new(dir.y, -dir.x) * (half / cos_half);

        right.push(line[i] + offset);
        left.push(line[i] - offset);
    }

    Ok(Sides { right, left })
}

/// Widen a polyline into a quad strip lying on the `y = 0` plane.
///
/// Positions alternate right/left per input point (`[r0, l0, r1, l1, ...]`)
/// and every quad `(r_i, l_i, l_i+1, r_i+1)` faces +y. With `lengthen_ends`
/// the two end points are pushed outward by `width / 2` along their segment,
/// giving square caps.
pub fn make_wide_line(points: &[Point2<f64>], width: f64, lengthen_ends: bool) -> Result<Mesh> {
    let sides = widen(points, width, lengthen_ends)?;
    let n = points.len();

    let mut mesh = Mesh::with_capacity(n * 2, n - 1);
    for (r, l) in sides.right.iter().zip(sides.left.iter()) {
        mesh.add_vertex(point_to_3d(r, 0.0));
        mesh.add_vertex(point_to_3d(l, 0.0));
    }
    for i in 0..(n - 1) as u32 {
        let (r0, l0, r1, l1) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        mesh.add_quad(r0, l0, l1, r1);
    }
    mesh.compute_normals();
    Ok(mesh)
}

/// Outline of [`make_wide_line`] as a single closed ring: the right side
/// forward, then the left side backward. The ring is counter-clockwise and
/// has exactly twice as many points as the input.
pub fn make_wide_line_border(
    points: &[Point2<f64>],
    width: f64,
    lengthen_ends: bool,
) -> Result<Vec<Point2<f64>>> {
    let Sides { mut right, left } = widen(points, width, lengthen_ends)?;
    right.extend(left.into_iter().rev());
    Ok(right)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon offsetting
//!
//! Every vertex of a counter-clockwise ring is moved along its miter by the
//! signed distance (positive grows the polygon). The raw contour can loop over
//! itself where edges invert, so it is resolved with an i_overlay self-overlay
//! that keeps only positively wound regions. i_overlay counts clockwise
//! contours as positive, so the contour is handed over reversed.

use crate::error::{Error, Result};
use crate::polygon::{clean_polygon, ensure_ccw, signed_area, EPSILON_2D};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;

/// Offset results; a single polygon unless an inward offset splits the shape
pub type Polygons = SmallVec<[Vec<Point2<f64>>; 1]>;

/// Lower bound for `cos(θ/2)` at sharp corners
const MIN_MITER_COS: f64 = 0.05;

/// Regions smaller than this are dropped from the overlay output
const MIN_AREA_THRESHOLD: f64 = 1e-10;

/// Offset a simple polygon by `distance` (positive = outward).
///
/// Returns every resulting outer contour, counter-clockwise. An inward offset
/// that consumes the polygon returns an empty list.
pub fn offset_polygon(polygon: &[Point2<f64>], distance: f64) -> Result<Polygons> {
    if !distance.is_finite() {
        return Err(Error::InvalidArgument(format!(
            "offset distance must be finite, got {}",
            distance
        )));
    }

    let ring = ensure_ccw(&clean_polygon(polygon));
    if ring.len() < 3 || signed_area(&ring).abs() < MIN_AREA_THRESHOLD {
        return Err(Error::InvalidArgument(
            "offset needs a polygon with at least 3 distinct points".to_string(),
        ));
    }

    if distance.abs() < EPSILON_2D {
        let mut out = Polygons::new();
        out.push(ring);
        return Ok(out);
    }

    let raw = miter_contour(&ring, distance);
    if all_edges_inverted(&ring, &raw) {
        // Shrunk past its inradius; the contour is the input turned inside out
        return Ok(Polygons::new());
    }

    Ok(resolve(&raw))
}

/// Offset outward (or inward) and require exactly one resulting polygon
pub fn expand_polygon(polygon: &[Point2<f64>], distance: f64) -> Result<Vec<Point2<f64>>> {
    let mut polygons = offset_polygon(polygon, distance)?;
    match polygons.len() {
        1 => Ok(polygons.remove(0)),
        0 => Err(Error::OffsetError(format!(
            "offset by {} left no polygon",
            distance
        ))),
        n => Err(Error::OffsetError(format!(
            "offset by {} split the polygon into {} parts",
            distance, n
        ))),
    }
}

/// Mitered offset of a counter-clockwise ring, possibly self-intersecting
fn miter_contour(ring: &[Point2<f64>], distance: f64) -> Vec<Point2<f64>> {
    let n = ring.len();
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let prev = ring[(i + n - 1) % n];
        let next = ring[(i + 1) % n];
        let p = ring[i];

        let d1 = (p - prev).try_normalize(EPSILON_2D).unwrap_or_else(Vector2::x);
        let d2 = (next - p).try_normalize(EPSILON_2D).unwrap_or(d1);
        let dir = (d1 + d2).try_normalize(EPSILON_2D).unwrap_or(d1);
        let cos_half = dir.dot(&d1).max(MIN_MITER_COS);

        // Right-hand normal points outward on a counter-clockwise ring
        let normal = Vector2::new(dir.y, -dir.x);
        out.push(p + normal * (distance / cos_half));
    }
    out
}

fn all_edges_inverted(ring: &[Point2<f64>], raw: &[Point2<f64>]) -> bool {
    let n = ring.len();
    (0..n).all(|i| {
        let j = (i + 1) % n;
        (ring[j] - ring[i]).dot(&(raw[j] - raw[i])) < 0.0
    })
}

/// Regions wound like the counter-clockwise input, as simple polygons
fn resolve(contour: &[Point2<f64>]) -> Polygons {
    let subject = vec![contour.iter().rev().map(|p| [p.x, p.y]).collect::<Vec<[f64; 2]>>()];
    let clip: Vec<Vec<[f64; 2]>> = Vec::new();
    let shapes = subject.overlay(&clip, OverlayRule::Subject, FillRule::Positive);

    shapes
        .iter()
        .filter_map(|shape| shape.first())
        .map(|outer| {
            let points: Vec<Point2<f64>> = outer.iter().map(|p| Point2::new(p[0], p[1])).collect();
            ensure_ccw(&clean_polygon(&points))
        })
        .filter(|points| points.len() >= 3 && signed_area(points) > MIN_AREA_THRESHOLD)
        .collect()
}

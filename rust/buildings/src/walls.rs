// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::{Error, Result};
use skyline_geometry::{
    expand_polygon, make_wide_line_border, offset_polygon, thicken_polygon, Mesh, Point2,
};

/// Wall of the given thickness and height following `points`.
///
/// An open wall widens the polyline. A closed wall joins the last point to
/// the first and becomes a ring: the polygon grown by half the thickness,
/// with the polygon shrunk by half the thickness cut out of it.
pub fn make_wall(
    points: &[Point2<f64>],
    thickness: f64,
    height: f64,
    closed: bool,
) -> Result<Mesh> {
    if !(thickness > 0.0 && height > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "wall thickness and height must be positive, got {} and {}",
            thickness, height
        )));
    }

    if !closed {
        let border = make_wide_line_border(points, thickness, true)?;
        return Ok(thicken_polygon(&border, height, &[])?);
    }

    let outer = expand_polygon(points, thickness / 2.0)?;
    let inner = offset_polygon(points, -thickness / 2.0)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::InvalidArgument("wall is thicker than its enclosure".to_string()))?;
    Ok(thicken_polygon(&outer, height, &[inner])?)
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor borders derived from a [`Footprint`]

use crate::error::{Error, Result};
use crate::params::Footprint;
use skyline_geometry::polygon::{area, displace, ensure_ccw, get_angle, make_regular_polygon};
use skyline_geometry::{expand_polygon, make_wide_line_border, Point2};

/// Minimum footprint area accepted for an explicit border
const MIN_BORDER_AREA: f64 = 1e-9;

impl Footprint {
    /// Check the fields of the active shape mode
    pub fn validate(&self) -> Result<()> {
        match self {
            Footprint::Spine { main_points, width } => {
                if main_points.len() < 2 {
                    return Err(Error::InvalidArgument(format!(
                        "a main-point line needs at least 2 points, got {}",
                        main_points.len()
                    )));
                }
                if !(*width > 0.0) {
                    return Err(Error::InvalidArgument(format!(
                        "floor width must be positive, got {}",
                        width
                    )));
                }
                if main_points.windows(2).any(|w| (w[1] - w[0]).norm() <= f64::EPSILON) {
                    return Err(Error::InvalidArgument(
                        "main-point line has coincident consecutive points".to_string(),
                    ));
                }
                Ok(())
            }
            Footprint::Border { border } => {
                if border.len() < 3 {
                    return Err(Error::InvalidArgument(format!(
                        "a floor border needs at least 3 points, got {}",
                        border.len()
                    )));
                }
                if area(border) <= MIN_BORDER_AREA {
                    return Err(Error::InvalidArgument("floor border has no area".to_string()));
                }
                Ok(())
            }
            Footprint::Regular {
                center,
                vertex,
                num_sides,
            } => {
                if *num_sides < 3 {
                    return Err(Error::InvalidArgument(format!(
                        "a regular footprint needs at least 3 sides, got {}",
                        num_sides
                    )));
                }
                if (vertex - center).norm() <= f64::EPSILON {
                    return Err(Error::InvalidArgument(
                        "regular footprint vertex coincides with its center".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// The spine of a main-point footprint
    pub fn main_points(&self) -> Option<&[Point2<f64>]> {
        match self {
            Footprint::Spine { main_points, .. } => Some(main_points),
            _ => None,
        }
    }

    /// Border of the ground floor
    pub fn base_border(&self) -> Result<Vec<Point2<f64>>> {
        self.border_for_floor(0, 0.0)
    }

    /// Border of floor `floor` when every floor grows by `width_delta`.
    ///
    /// Each mode rebuilds its border from scratch: spines are widened to
    /// `width + delta`, explicit borders are offset by `delta`, and regular
    /// polygons get `delta` added to their radius. The result is always
    /// counter-clockwise.
    pub fn border_for_floor(&self, floor: u32, width_delta: f64) -> Result<Vec<Point2<f64>>> {
        let delta = width_delta * floor as f64;
        let border = match self {
            Footprint::Spine { main_points, width } => {
                make_wide_line_border(main_points, width + delta, true)?
            }
            Footprint::Border { border } => {
                if delta == 0.0 {
                    border.clone()
                } else {
                    expand_polygon(border, delta)?
                }
            }
            Footprint::Regular {
                center,
                vertex,
                num_sides,
            } => {
                let segment = vertex - center;
                let points =
                    make_regular_polygon(*num_sides, segment.norm() + delta, get_angle(&segment))?;
                displace(&points, &center.coords)
            }
        };
        Ok(ensure_ccw(&border))
    }

    /// Floor width of a spine footprint at `floor`
    pub fn width_for_floor(&self, floor: u32, width_delta: f64) -> Option<f64> {
        match self {
            Footprint::Spine { width, .. } => Some(width + width_delta * floor as f64),
            _ => None,
        }
    }
}

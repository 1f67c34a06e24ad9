// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building parameter records
//!
//! A building is described once, validated up front, and then only read by the
//! floor, roof and window builders.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use skyline_geometry::{Color, Point2, Shape};
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

/// Plan shape of the building's floors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Footprint {
    /// Open polyline widened by `width` (main points)
    Spine {
        main_points: Vec<Point2<f64>>,
        width: f64,
    },
    /// Explicit floor border
    Border { border: Vec<Point2<f64>> },
    /// Regular polygon given by its center and one vertex
    Regular {
        center: Point2<f64>,
        vertex: Point2<f64>,
        num_sides: usize,
    },
}

/// Floor stacking dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloorLayout {
    pub num_floors: u32,
    pub floor_height: f64,
    /// Height of the belt course between consecutive floors; 0 disables belts
    pub belt_height: f64,
    /// How far belts stick out of the floor border
    pub belt_width: f64,
    /// Offset applied per floor index (floor `i` grows by `width_delta * i`)
    pub width_delta: f64,
}

impl FloorLayout {
    pub fn validate(&self) -> Result<()> {
        if self.num_floors == 0 {
            return Err(Error::InvalidArgument("a building needs at least one floor".to_string()));
        }
        if !(self.floor_height > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "floor height must be positive, got {}",
                self.floor_height
            )));
        }
        if !(self.belt_height >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "belt height must not be negative, got {}",
                self.belt_height
            )));
        }
        if !(self.belt_width > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "belt width must be positive, got {}",
                self.belt_width
            )));
        }
        if !self.width_delta.is_finite() {
            return Err(Error::InvalidArgument("width delta must be finite".to_string()));
        }
        Ok(())
    }

    /// Total stacked height: all floors plus the belts between them
    #[inline]
    pub fn building_height(&self) -> f64 {
        get_building_height(self.num_floors, self.floor_height, self.belt_height)
    }

    /// Base height of floor `i`
    #[inline]
    pub fn floor_base(&self, floor: u32) -> f64 {
        (self.floor_height + self.belt_height) * floor as f64
    }

    /// Width offset of floor `i`
    #[inline]
    pub fn delta_for_floor(&self, floor: u32) -> f64 {
        self.width_delta * floor as f64
    }

    #[inline]
    pub fn top_floor(&self) -> u32 {
        self.num_floors.saturating_sub(1)
    }
}

pub fn get_building_height(num_floors: u32, floor_height: f64, belt_height: f64) -> f64 {
    if num_floors == 0 {
        return 0.0;
    }
    num_floors as f64 * floor_height + (num_floors - 1) as f64 * belt_height
}

/// Thick rafters and overhangs of a cross-gabled roof
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofThickness {
    pub thickness: f64,
    pub rake_overhang: f64,
    pub roof_overhang: f64,
    pub color: Color,
}

/// Roof variants; only the fields of the active variant exist
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoofStyle {
    None,
    CrossGabled {
        angle: f64,
        thickness: Option<RoofThickness>,
    },
    CrossHipped {
        angle: f64,
        hip_depth: f64,
    },
    /// Apex height is given directly since slopes differ per edge
    Pyramid { height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoofParams {
    pub style: RoofStyle,
    pub color: Color,
}

impl Default for RoofParams {
    fn default() -> Self {
        Self {
            style: RoofStyle::None,
            color: Color::WHITE,
        }
    }
}

/// Check that a roof angle lies strictly between flat and vertical
pub(crate) fn check_roof_angle(angle: f64) -> Result<()> {
    if angle > 0.0 && angle < FRAC_PI_2 {
        Ok(())
    } else {
        Err(Error::InvalidRoof(format!(
            "roof angle must lie in (0, pi/2), got {}",
            angle
        )))
    }
}

impl RoofParams {
    /// Check the fields of the active variant and that it fits the footprint
    pub fn validate(&self, footprint: &Footprint) -> Result<()> {
        let is_spine = matches!(footprint, Footprint::Spine { .. });
        match self.style {
            RoofStyle::None => Ok(()),
            RoofStyle::CrossGabled { angle, thickness } => {
                if !is_spine {
                    return Err(Error::InvalidRoof(
                        "cross-gabled roofs need a main-point footprint".to_string(),
                    ));
                }
                check_roof_angle(angle)?;
                if let Some(t) = thickness {
                    if !(t.thickness > 0.0) {
                        return Err(Error::InvalidRoof(format!(
                            "roof thickness must be positive, got {}",
                            t.thickness
                        )));
                    }
                    if !(t.rake_overhang >= 0.0 && t.roof_overhang >= 0.0) {
                        return Err(Error::InvalidRoof(format!(
                            "overhangs must not be negative, got rake {} and roof {}",
                            t.rake_overhang, t.roof_overhang
                        )));
                    }
                }
                Ok(())
            }
            RoofStyle::CrossHipped { angle, hip_depth } => {
                if !is_spine {
                    return Err(Error::InvalidRoof(
                        "cross-hipped roofs need a main-point footprint".to_string(),
                    ));
                }
                check_roof_angle(angle)?;
                if !(hip_depth >= 0.0) {
                    return Err(Error::InvalidRoof(format!(
                        "hip depth must not be negative, got {}",
                        hip_depth
                    )));
                }
                Ok(())
            }
            RoofStyle::Pyramid { height } => {
                if !(height > 0.0) {
                    return Err(Error::InvalidRoof(format!(
                        "pyramid height must be positive, got {}",
                        height
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Window placement settings. Window shapes are shared between all
/// instances and are expected to be centered on the origin.
#[derive(Debug, Clone)]
pub struct WindowParams {
    /// Prefix of the window instance names
    pub name: String,
    /// Minimum distance between two windows on a side
    pub spacing: f64,
    /// Minimum distance between a window and a corner
    pub edge_distance: f64,
    pub open_shape: Arc<Shape>,
    pub closed_shape: Arc<Shape>,
    /// Probability that a placed window is open
    pub open_ratio: f64,
    /// Probability that a window slot is used at all
    pub filled_ratio: f64,
}

impl WindowParams {
    pub fn validate(&self) -> Result<()> {
        if !(self.spacing >= 0.0) {
            return Err(Error::InvalidWindows(format!(
                "spacing must not be negative, got {}",
                self.spacing
            )));
        }
        if !(self.edge_distance.is_finite() && self.edge_distance >= 0.0) {
            return Err(Error::InvalidWindows(format!(
                "edge distance must not be negative, got {}",
                self.edge_distance
            )));
        }
        for (what, ratio) in [("open", self.open_ratio), ("filled", self.filled_ratio)] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(Error::InvalidWindows(format!(
                    "{} ratio must lie in [0, 1], got {}",
                    what, ratio
                )));
            }
        }
        if self.open_shape.mesh.is_empty() || self.closed_shape.mesh.is_empty() {
            return Err(Error::InvalidWindows("window shapes must not be empty".to_string()));
        }
        if !(self.window_width() > 0.0) {
            return Err(Error::InvalidWindows("window shapes have no width".to_string()));
        }
        Ok(())
    }

    /// Width of a window slot: the wider of the two window shapes
    pub fn window_width(&self) -> f64 {
        self.open_shape
            .mesh
            .size()
            .x
            .max(self.closed_shape.mesh.size().x)
    }
}

/// Everything needed to generate one building
#[derive(Debug, Clone)]
pub struct BuildingParams {
    /// Prefix of every instance name
    pub id: String,
    pub footprint: Footprint,
    pub layout: FloorLayout,
    /// Floor color
    pub color1: Color,
    /// Belt color
    pub color2: Color,
    pub roof: RoofParams,
    pub windows: WindowParams,
}

impl BuildingParams {
    /// Fail fast on any inconsistent field before geometry is built
    pub fn validate(&self) -> Result<()> {
        self.footprint.validate()?;
        self.layout.validate()?;
        self.roof.validate(&self.footprint)?;
        self.windows.validate()
    }
}

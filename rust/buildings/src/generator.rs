// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Random building parameters
//!
//! Every field of a [`BuildingParams`] is drawn, in a fixed order, from the
//! distributions of a [`GeneratorConfig`]. Fields of shape modes and roof
//! styles that end up unused are still drawn so the stream position after a
//! building does not depend on the choices made for it.

use crate::error::{Error, Result};
use crate::params::{
    BuildingParams, FloorLayout, Footprint, RoofParams, RoofStyle, RoofThickness, WindowParams,
};
use crate::random::{choose_random, choose_random_weighted, gaussian, rand_color, uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};
use skyline_geometry::polygon::make_segmented_line;
use skyline_geometry::{Point2, Shape};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};
use std::sync::Arc;

/// Uniform distribution over `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        uniform(rng, self.min, self.max)
    }

    fn check(&self, what: &str) -> Result<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(Error::InvalidArgument(format!(
                "invalid {} range [{}, {}]",
                what, self.min, self.max
            )))
        }
    }
}

/// Shape mode of a generated footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FootprintKind {
    Spine,
    Border,
    Regular,
}

/// Roof style of a generated building, before its fields are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoofKind {
    CrossGabled,
    CrossHipped,
    Pyramid,
    None,
}

/// Distributions for [`random_building_params`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Weights of spine, border and regular footprints
    pub footprint_weights: [f64; 3],
    /// Number of spine segments, drawn uniformly from `min..=max`
    pub min_segments: usize,
    pub max_segments: usize,
    /// Direction of the first spine segment
    pub initial_angle: f64,
    /// Turns between spine segments are non-zero and uniform in `(-max, max)`
    pub max_turn_angle: f64,
    pub segment_length_mean: f64,
    pub segment_length_sigma: f64,
    pub floor_width: Span,
    /// Border used by every border footprint
    pub fixed_border: Vec<Point2<f64>>,
    pub min_sides: usize,
    pub max_sides: usize,
    pub radius: Span,
    pub min_floors: u32,
    pub max_floors: u32,
    pub floor_height: Span,
    pub belt_height: Span,
    pub belt_width: Span,
    pub width_delta: Span,
    /// Weights of cross-gabled, cross-hipped, pyramid and no roof on spines
    pub spine_roof_weights: [f64; 4],
    /// Weights of pyramid and no roof on other footprints
    pub other_roof_weights: [f64; 2],
    pub roof_angle: Span,
    pub roof_thickness: Span,
    pub rake_overhang: Span,
    pub roof_overhang: Span,
    /// Hip depth is uniform up to this fraction of the shorter end segment
    pub max_hip_fraction: f64,
    pub roof_height: Span,
    pub window_spacing: Span,
    pub window_edge_distance: Span,
    pub open_ratio: Span,
    pub filled_ratio: Span,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            footprint_weights: [80.0, 5.0, 20.0],
            min_segments: 3,
            max_segments: 8,
            initial_angle: FRAC_PI_2,
            max_turn_angle: FRAC_PI_3,
            segment_length_mean: 10.0,
            segment_length_sigma: 1.0,
            floor_width: Span::new(5.0, 15.0),
            fixed_border: vec![
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 5.0),
                Point2::new(-10.0, 10.0),
                Point2::new(-5.0, 0.0),
                Point2::new(-10.0, -10.0),
                Point2::new(0.0, -5.0),
                Point2::new(10.0, -10.0),
                Point2::new(5.0, 0.0),
            ],
            min_sides: 3,
            max_sides: 4,
            radius: Span::new(5.0, 15.0),
            min_floors: 3,
            max_floors: 8,
            floor_height: Span::new(2.5, 5.0),
            belt_height: Span::new(0.25, 0.45),
            belt_width: Span::new(0.25, 0.45),
            width_delta: Span::new(-0.15, 2.0),
            spine_roof_weights: [75.0, 10.0, 10.0, 5.0],
            other_roof_weights: [85.0, 15.0],
            roof_angle: Span::new(PI / 10.0, FRAC_PI_3),
            roof_thickness: Span::new(0.25, 0.75),
            rake_overhang: Span::new(0.1, 2.0),
            roof_overhang: Span::new(0.1, 1.0),
            max_hip_fraction: 0.9,
            roof_height: Span::new(3.0, 13.0),
            window_spacing: Span::new(0.1, 0.5),
            window_edge_distance: Span::new(0.2, 0.5),
            open_ratio: Span::new(0.0, 1.0),
            filled_ratio: Span::new(0.0, 1.0),
        }
    }
}

impl GeneratorConfig {
    /// Load a configuration from JSON; missing fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_segments == 0 || self.min_segments > self.max_segments {
            return Err(Error::InvalidArgument(format!(
                "invalid segment count range [{}, {}]",
                self.min_segments, self.max_segments
            )));
        }
        if self.min_sides < 3 || self.min_sides > self.max_sides {
            return Err(Error::InvalidArgument(format!(
                "invalid side count range [{}, {}]",
                self.min_sides, self.max_sides
            )));
        }
        if self.min_floors == 0 || self.min_floors > self.max_floors {
            return Err(Error::InvalidArgument(format!(
                "invalid floor count range [{}, {}]",
                self.min_floors, self.max_floors
            )));
        }
        if !(self.max_turn_angle > 0.0) {
            return Err(Error::InvalidArgument(
                "maximum turn angle must be positive".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&self.max_hip_fraction) {
            return Err(Error::InvalidArgument(format!(
                "hip fraction must lie in [0, 1), got {}",
                self.max_hip_fraction
            )));
        }
        for (what, span) in [
            ("floor width", &self.floor_width),
            ("radius", &self.radius),
            ("floor height", &self.floor_height),
            ("belt height", &self.belt_height),
            ("belt width", &self.belt_width),
            ("width delta", &self.width_delta),
            ("roof angle", &self.roof_angle),
            ("roof thickness", &self.roof_thickness),
            ("rake overhang", &self.rake_overhang),
            ("roof overhang", &self.roof_overhang),
            ("roof height", &self.roof_height),
            ("window spacing", &self.window_spacing),
            ("window edge distance", &self.window_edge_distance),
            ("open ratio", &self.open_ratio),
            ("filled ratio", &self.filled_ratio),
        ] {
            span.check(what)?;
        }
        Ok(())
    }
}

/// Spine of `num_segments` segments: the first heads along the initial angle,
/// every following one turns first. Draws alternate turn and length.
fn random_main_points<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
    num_segments: usize,
) -> Result<Vec<Point2<f64>>> {
    let mut turns = Vec::with_capacity(num_segments);
    let mut lengths = Vec::with_capacity(num_segments);
    for i in 0..num_segments {
        if i > 0 {
            let mut turn = 0.0;
            while turn == 0.0 {
                turn = uniform(rng, -config.max_turn_angle, config.max_turn_angle);
            }
            turns.push(turn);
        }
        lengths.push(gaussian(
            rng,
            config.segment_length_mean,
            config.segment_length_sigma,
        )?);
    }

    let mut turns = turns.into_iter();
    let mut lengths = lengths.into_iter();
    Ok(make_segmented_line(
        Point2::origin(),
        num_segments,
        config.initial_angle,
        || turns.next().unwrap_or(0.0),
        || lengths.next().unwrap_or(0.0),
    ))
}

/// Draw a complete building.
///
/// Instance names are prefixed with `{id}_building`, windows with `{id}_wnd`.
/// Hip depths stay below `max_hip_fraction` of the shorter end segment of the
/// spine, which keeps generated hipped roofs valid.
pub fn random_building_params<R: Rng + ?Sized>(
    rng: &mut R,
    config: &GeneratorConfig,
    open_shape: &Arc<Shape>,
    closed_shape: &Arc<Shape>,
    id: &str,
) -> Result<BuildingParams> {
    config.validate()?;

    let kind = *choose_random_weighted(
        rng,
        &[FootprintKind::Spine, FootprintKind::Border, FootprintKind::Regular],
        &config.footprint_weights,
    )?;
    let segment_counts: Vec<usize> = (config.min_segments..=config.max_segments).collect();
    let num_segments = *choose_random(rng, &segment_counts)?;
    let main_points = random_main_points(rng, config, num_segments)?;
    let floor_width = config.floor_width.sample(rng);
    let num_sides = rng.gen_range(config.min_sides..=config.max_sides);
    let radius = config.radius.sample(rng);
    let base_angle = uniform(rng, 0.0, PI);

    let layout_draws = (
        rng.gen_range(config.min_floors..=config.max_floors),
        config.floor_height.sample(rng),
        config.belt_height.sample(rng),
        config.belt_width.sample(rng),
    );
    let color1 = rand_color(rng);
    let color2 = rand_color(rng);
    let layout = FloorLayout {
        num_floors: layout_draws.0,
        floor_height: layout_draws.1,
        belt_height: layout_draws.2,
        belt_width: layout_draws.3,
        width_delta: config.width_delta.sample(rng),
    };

    let roof_kind = if kind == FootprintKind::Spine {
        *choose_random_weighted(
            rng,
            &[
                RoofKind::CrossGabled,
                RoofKind::CrossHipped,
                RoofKind::Pyramid,
                RoofKind::None,
            ],
            &config.spine_roof_weights,
        )?
    } else {
        *choose_random_weighted(
            rng,
            &[RoofKind::Pyramid, RoofKind::None],
            &config.other_roof_weights,
        )?
    };
    let roof_color = rand_color(rng);
    let roof_angle = config.roof_angle.sample(rng);
    let thickness = config.roof_thickness.sample(rng);
    let shell_color = rand_color(rng);
    let rake_overhang = config.rake_overhang.sample(rng);
    let roof_overhang = config.roof_overhang.sample(rng);

    let n = main_points.len();
    let first = (main_points[1] - main_points[0]).norm();
    let last = (main_points[n - 1] - main_points[n - 2]).norm();
    let max_hip_depth = (first.min(last) * config.max_hip_fraction).max(0.0);
    let hip_depth = uniform(rng, 0.0, max_hip_depth);
    let roof_height = config.roof_height.sample(rng);

    let style = match roof_kind {
        RoofKind::CrossGabled => RoofStyle::CrossGabled {
            angle: roof_angle,
            thickness: Some(RoofThickness {
                thickness,
                rake_overhang,
                roof_overhang,
                color: shell_color,
            }),
        },
        RoofKind::CrossHipped => RoofStyle::CrossHipped {
            angle: roof_angle,
            hip_depth,
        },
        RoofKind::Pyramid => RoofStyle::Pyramid {
            height: roof_height,
        },
        RoofKind::None => RoofStyle::None,
    };

    let windows = WindowParams {
        name: format!("{}_wnd", id),
        spacing: config.window_spacing.sample(rng),
        edge_distance: config.window_edge_distance.sample(rng),
        open_shape: Arc::clone(open_shape),
        closed_shape: Arc::clone(closed_shape),
        open_ratio: config.open_ratio.sample(rng),
        filled_ratio: config.filled_ratio.sample(rng),
    };

    let footprint = match kind {
        FootprintKind::Spine => Footprint::Spine {
            main_points,
            width: floor_width,
        },
        FootprintKind::Border => Footprint::Border {
            border: config.fixed_border.clone(),
        },
        FootprintKind::Regular => Footprint::Regular {
            center: Point2::origin(),
            vertex: Point2::new(base_angle.cos() * radius, base_angle.sin() * radius),
            num_sides,
        },
    };

    Ok(BuildingParams {
        id: format!("{}_building", id),
        footprint,
        layout,
        color1,
        color2,
        roof: RoofParams {
            style,
            color: roof_color,
        },
        windows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::windows::make_test_windows;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_params_are_valid() {
        let (open, closed) = make_test_windows("wnd_op", "wnd_cls").unwrap();
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        for i in 0..200 {
            let params =
                random_building_params(&mut rng, &config, &open, &closed, &format!("b{}", i))
                    .unwrap();
            params.validate().unwrap();
            assert_eq!(params.id, format!("b{}_building", i));
            assert!((3..=8).contains(&params.layout.num_floors));
            if let Footprint::Spine { main_points, width } = &params.footprint {
                assert!((4..=9).contains(&main_points.len()));
                assert!((5.0..15.0).contains(width));
            }
            if let Footprint::Regular { num_sides, .. } = &params.footprint {
                assert!((3..=4).contains(num_sides));
            }
        }
    }

    #[test]
    fn test_non_spine_roofs() {
        let (open, closed) = make_test_windows("o", "c").unwrap();
        let config = GeneratorConfig {
            footprint_weights: [0.0, 1.0, 1.0],
            ..GeneratorConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..50 {
            let params = random_building_params(&mut rng, &config, &open, &closed, "x").unwrap();
            assert!(matches!(
                params.roof.style,
                RoofStyle::Pyramid { .. } | RoofStyle::None
            ));
        }
    }

    #[test]
    fn test_spine_starts_north() {
        let config = GeneratorConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let points = random_main_points(&mut rng, &config, 3).unwrap();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], Point2::origin());
        assert!(points[1].x.abs() < 1e-9);
        assert!(points[1].y > 0.0);
    }

    #[test]
    fn test_config_json() {
        let config = GeneratorConfig::default();
        let json = config.to_json_string().unwrap();
        assert_eq!(GeneratorConfig::from_json_str(&json).unwrap(), config);

        let partial = GeneratorConfig::from_json_str(r#"{"min_floors": 1, "max_floors": 2}"#).unwrap();
        assert_eq!(partial.max_floors, 2);
        assert_eq!(partial.min_segments, 3);

        assert!(GeneratorConfig::from_json_str(r#"{"min_floors": 5, "max_floors": 2}"#).is_err());
        assert!(matches!(
            GeneratorConfig::from_json_str("{not json"),
            Err(Error::Config(_))
        ));
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! City layout
//!
//! Buildings are laid on a square grid and generated in parallel. Each
//! building draws from its own ChaCha stream, selected by its grid index, so
//! the city is the same for a given seed however the work is scheduled.

use crate::assembly::make_building;
use crate::error::{Error, Result};
use crate::generator::{random_building_params, GeneratorConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use skyline_geometry::polygon::make_quad;
use skyline_geometry::{triangulate, Color, Frame, Instance, Material, Shape, Vector3};
use std::sync::Arc;

/// City generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    /// Seed shared by all building streams
    pub seed: u64,
    /// Buildings on a side of the city square
    pub buildings_per_side: usize,
    /// Distance between neighbouring buildings
    pub spacing: f64,
    /// Side of the ground quad; `None` leaves the ground out
    pub ground_size: Option<f64>,
    /// Unshare vertices of building bodies for flat shading
    pub facet: bool,
    pub generator: GeneratorConfig,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            buildings_per_side: 14,
            spacing: 70.0,
            ground_size: Some(5000.0),
            facet: true,
            generator: GeneratorConfig::default(),
        }
    }
}

impl CityConfig {
    /// Defaults overridden by `SKYLINE_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            seed: std::env::var("SKYLINE_SEED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.seed),
            buildings_per_side: std::env::var("SKYLINE_BUILDINGS_PER_SIDE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.buildings_per_side),
            spacing: std::env::var("SKYLINE_SPACING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.spacing),
            ground_size: match std::env::var("SKYLINE_GROUND_SIZE") {
                Ok(v) if v == "none" => None,
                Ok(v) => v.parse().ok().or(defaults.ground_size),
                Err(_) => defaults.ground_size,
            },
            facet: std::env::var("SKYLINE_FACET")
                .map(|v| v != "0" && v != "false")
                .unwrap_or(defaults.facet),
            generator: defaults.generator,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buildings_per_side == 0 {
            return Err(Error::InvalidArgument("a city needs at least one building".to_string()));
        }
        if !(self.spacing > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "building spacing must be positive, got {}",
                self.spacing
            )));
        }
        if let Some(size) = self.ground_size {
            if !(size > 0.0) {
                return Err(Error::InvalidArgument(format!(
                    "ground size must be positive, got {}",
                    size
                )));
            }
        }
        self.generator.validate()
    }
}

/// Generated city
#[derive(Debug, Clone, Default)]
pub struct City {
    /// Ground first (when enabled), then every building in grid order
    pub instances: Vec<Instance>,
    pub buildings: usize,
    /// Buildings whose parameters turned out unbuildable
    pub skipped: usize,
}

/// Grid position of building `index`; odd indices are shifted by half a
/// spacing along x
pub fn building_position(index: usize, buildings_per_side: usize, spacing: f64) -> Vector3<f64> {
    let start = spacing * (buildings_per_side as f64 - 1.0) / 2.0;
    Vector3::new(
        -start + spacing * (index / buildings_per_side) as f64 + spacing / 2.0 * (index % 2) as f64,
        0.0,
        -start + spacing * (index % buildings_per_side) as f64,
    )
}

/// Random stream of building `index`
pub fn building_rng(seed: u64, index: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(index as u64);
    rng
}

fn make_ground(size: f64) -> Result<Instance> {
    let mut mesh = triangulate(&make_quad(size), &[])?;
    mesh.set_color(Color::WHITE);
    let material = Material::new("ground_mat", Color::new(0.3, 0.3, 0.1));
    let shape = Shape::new("ground_shape", mesh, material);
    Ok(Instance::new("ground_inst", Arc::new(shape), Frame::identity()))
}

/// Generate a whole city.
///
/// A building that fails to generate is logged and left out; the city itself
/// only fails on an invalid configuration.
pub fn generate_city(
    config: &CityConfig,
    open_shape: &Arc<Shape>,
    closed_shape: &Arc<Shape>,
) -> Result<City> {
    config.validate()?;

    let count = config.buildings_per_side * config.buildings_per_side;
    let buildings: Vec<Option<Vec<Instance>>> = (0..count)
        .into_par_iter()
        .map(|i| {
            let mut rng = building_rng(config.seed, i);
            let id = format!("building{}", i);
            let built = random_building_params(
                &mut rng,
                &config.generator,
                open_shape,
                closed_shape,
                &id,
            )
            .and_then(|params| make_building(&params, &mut rng));

            match built {
                Ok(mut instances) => {
                    let offset = building_position(i, config.buildings_per_side, config.spacing);
                    for instance in &mut instances {
                        // Window shapes are shared and stay untouched
                        if config.facet {
                            if let Some(shape) = Arc::get_mut(&mut instance.shape) {
                                shape.mesh.facet();
                            }
                        }
                        instance.translate(offset);
                    }
                    Some(instances)
                }
                Err(e) => {
                    tracing::warn!(building = i, error = %e, "skipping building");
                    None
                }
            }
        })
        .collect();

    let mut city = City::default();
    if let Some(size) = config.ground_size {
        city.instances.push(make_ground(size)?);
    }
    for instances in buildings {
        match instances {
            Some(instances) => {
                city.buildings += 1;
                city.instances.extend(instances);
            }
            None => city.skipped += 1,
        }
    }

    tracing::info!(
        buildings = city.buildings,
        skipped = city.skipped,
        instances = city.instances.len(),
        "generated city"
    );
    Ok(city)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_positions() {
        let p0 = building_position(0, 14, 70.0);
        assert_relative_eq!(p0, Vector3::new(-455.0, 0.0, -455.0));
        let p1 = building_position(1, 14, 70.0);
        assert_relative_eq!(p1, Vector3::new(-420.0, 0.0, -385.0));
        let p14 = building_position(14, 14, 70.0);
        assert_relative_eq!(p14, Vector3::new(-385.0, 0.0, -455.0));
    }

    #[test]
    fn test_streams_differ_per_building() {
        use rand::Rng;
        let a: u64 = building_rng(1, 0).gen();
        let b: u64 = building_rng(1, 1).gen();
        let again: u64 = building_rng(1, 0).gen();
        assert_ne!(a, b);
        assert_eq!(a, again);
    }

    #[test]
    fn test_config_validation() {
        let config = CityConfig {
            buildings_per_side: 0,
            ..CityConfig::default()
        };
        assert!(config.validate().is_err());
        let config = CityConfig {
            ground_size: Some(-1.0),
            ..CityConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(CityConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_json() {
        let config = CityConfig {
            seed: 42,
            ground_size: None,
            ..CityConfig::default()
        };
        let json = config.to_json_string().unwrap();
        assert_eq!(CityConfig::from_json_str(&json).unwrap(), config);
        let partial = CityConfig::from_json_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(partial.buildings_per_side, 14);
    }

    #[test]
    fn test_ground() {
        let ground = make_ground(100.0).unwrap();
        let (min, max) = ground.shape.mesh.bounds();
        assert_relative_eq!(max.x - min.x, 100.0);
        assert!(ground.shape.mesh.normals.iter().all(|n| n.y > 0.99));
    }
}

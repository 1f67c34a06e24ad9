// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skyline Buildings
//!
//! Procedural buildings from an immutable parameter record: stacked floor
//! slabs with belt courses, gabled, hipped or pyramid roofs, and windows
//! spread along every floor border. [`make_building`] is the entry point for
//! one building; [`generate_city`] lays out a grid of random buildings in
//! parallel.
//!
//! Randomness always comes from an explicit [`rand::Rng`] handed in by the
//! caller, and draws happen in a fixed order, so a seeded stream reproduces
//! the same building.

pub mod assembly;
pub mod city;
pub mod error;
pub mod floors;
pub mod footprint;
pub mod generator;
pub mod params;
pub mod random;
pub mod roof;
pub mod walls;
pub mod windows;

pub use assembly::make_building;
pub use city::{building_position, generate_city, City, CityConfig};
pub use error::{Error, Result};
pub use floors::{make_floors, FloorStack};
pub use generator::{random_building_params, GeneratorConfig, Span};
pub use params::{
    get_building_height, BuildingParams, FloorLayout, Footprint, RoofParams, RoofStyle,
    RoofThickness, WindowParams,
};
pub use roof::{
    make_roof, make_roof_crossgabled_simple, make_roof_crossgabled_thickness,
    make_roof_crosshipped_simple, make_roof_pyramid_from_border, make_roof_pyramid_from_main_points,
    make_roof_pyramid_from_regular, RoofMeshes,
};
pub use walls::make_wall;
pub use windows::{check_window_params, make_test_windows, make_windows, window_slots};

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Building assembly: the single entry point turning a parameter record into
//! named instances.

use crate::error::Result;
use crate::floors::{build_floors, FloorStack};
use crate::params::{BuildingParams, RoofStyle};
use crate::roof::{build_roof, RoofMeshes};
use crate::windows::place_windows;
use rand::Rng;
use skyline_geometry::{Color, Frame, Instance, Material, Mesh, Shape};
use std::sync::Arc;

/// Instance for one color group, or `None` when the group has no geometry
fn body_instance(id: &str, suffix: &str, mesh: Mesh, color: Color) -> Option<Instance> {
    if mesh.is_empty() {
        return None;
    }
    let name = format!("{}_{}", id, suffix);
    let shape = Shape::new(
        format!("{}_shape", name),
        mesh,
        Material::new(format!("{}_mat", name), color),
    );
    Some(Instance::new(name, Arc::new(shape), Frame::identity()))
}

/// Generate every instance of one building.
///
/// The result holds up to four body instances, one per color group, named
/// `{id}_h1` (floors), `{id}_h2` (belts), `{id}_rr` (roof) and `{id}_rt` (roof
/// shell), followed by the window instances. Groups without geometry are left
/// out. Parameters are validated before anything is built.
pub fn make_building<R: Rng + ?Sized>(params: &BuildingParams, rng: &mut R) -> Result<Vec<Instance>> {
    params.validate()?;

    let FloorStack { floors, belts } = build_floors(&params.footprint, &params.layout)?;
    let RoofMeshes { roof, shell } = build_roof(&params.footprint, &params.layout, &params.roof)?;
    let shell_color = match params.roof.style {
        RoofStyle::CrossGabled {
            thickness: Some(t), ..
        } => t.color,
        _ => params.roof.color,
    };

    let mut instances: Vec<Instance> = [
        ("h1", floors, params.color1),
        ("h2", belts, params.color2),
        ("rr", roof, params.roof.color),
        ("rt", shell, shell_color),
    ]
    .into_iter()
    .filter_map(|(suffix, mesh, color)| body_instance(&params.id, suffix, mesh, color))
    .collect();

    let bodies = instances.len();
    instances.extend(place_windows(&params.footprint, &params.layout, &params.windows, rng)?);

    tracing::debug!(
        id = %params.id,
        bodies,
        windows = instances.len() - bodies,
        "generated building"
    );
    Ok(instances)
}

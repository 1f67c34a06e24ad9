// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor and belt stacks
//!
//! Floor `i` sits at `i * (floor_height + belt_height)`; a belt course sits on
//! top of every floor except the last one.

use crate::error::Result;
use crate::params::{FloorLayout, Footprint};
use skyline_geometry::{expand_polygon, thicken_polygon, Mesh, Point2, Vector3};

/// Floor slabs and belt slabs of one building
#[derive(Debug, Clone, Default)]
pub struct FloorStack {
    pub floors: Mesh,
    /// Empty when the layout has no belts
    pub belts: Mesh,
}

/// Extruded slabs for one floor border
fn make_slabs(border: &[Point2<f64>], layout: &FloorLayout) -> Result<(Mesh, Mesh)> {
    let floor = thicken_polygon(border, layout.floor_height, &[])?;
    let belt = if layout.belt_height > 0.0 {
        let belt_border = expand_polygon(border, layout.belt_width)?;
        thicken_polygon(&belt_border, layout.belt_height, &[])?
            .translated(Vector3::new(0.0, layout.floor_height, 0.0))
    } else {
        Mesh::new()
    };
    Ok((floor, belt))
}

/// Build every floor and belt of a building.
///
/// Without a width delta the ground floor slabs are built once and copied
/// upward. With a delta every floor border is rebuilt at its own width, since
/// offsets of different distances are not translations of one another.
pub fn make_floors(footprint: &Footprint, layout: &FloorLayout) -> Result<FloorStack> {
    footprint.validate()?;
    layout.validate()?;
    build_floors(footprint, layout)
}

/// [`make_floors`] on already validated parameters
pub(crate) fn build_floors(footprint: &Footprint, layout: &FloorLayout) -> Result<FloorStack> {
    let n = layout.num_floors;
    let mut stack = FloorStack::default();

    if layout.width_delta == 0.0 {
        let (floor, belt) = make_slabs(&footprint.base_border()?, layout)?;
        for i in 0..n {
            let up = Vector3::new(0.0, layout.floor_base(i), 0.0);
            stack.floors.merge(floor.clone().translated(up));
            if i + 1 < n {
                stack.belts.merge(belt.clone().translated(up));
            }
        }
    } else {
        for i in 0..n {
            let border = footprint.border_for_floor(i, layout.width_delta)?;
            let (floor, belt) = make_slabs(&border, layout)?;
            let up = Vector3::new(0.0, layout.floor_base(i), 0.0);
            stack.floors.merge(floor.translated(up));
            if i + 1 < n {
                stack.belts.merge(belt.translated(up));
            }
        }
    }

    tracing::trace!(
        floors = n,
        floor_vertices = stack.floors.vertex_count(),
        belt_vertices = stack.belts.vertex_count(),
        "built floor stack"
    );
    Ok(stack)
}

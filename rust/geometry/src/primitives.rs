// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use nalgebra::Point3;

/// Closed box of six outward-facing quads, centered on the origin
pub fn make_box(width: f64, height: f64, depth: f64) -> Result<Mesh> {
    if !(width > 0.0 && height > 0.0 && depth > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "box dimensions must be positive, got {} x {} x {}",
            width, height, depth
        )));
    }

    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut mesh = Mesh::with_capacity(8, 6);

    // Corner index = x_bit + 2 * y_bit + 4 * z_bit
    for k in 0..8u32 {
        let x = if k & 1 == 0 { -hx } else { hx };
        let y = if k & 2 == 0 { -hy } else { hy };
        let z = if k & 4 == 0 { -hz } else { hz };
        mesh.add_vertex(Point3::new(x, y, z));
    }

    mesh.add_quad(0, 2, 3, 1); // -z
    mesh.add_quad(4, 5, 7, 6); // +z
    mesh.add_quad(0, 1, 5, 4); // -y
    mesh.add_quad(2, 6, 7, 3); // +y
    mesh.add_quad(0, 4, 6, 2); // -x
    mesh.add_quad(1, 3, 7, 5); // +x

    mesh.compute_normals();
    Ok(mesh)
}

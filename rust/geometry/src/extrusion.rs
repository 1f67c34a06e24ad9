// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extrusion operations - turning plan polygons and surfaces into solids
//!
//! Both entry points share vertices between caps and side walls, so the
//! resulting meshes are closed: every edge borders exactly two faces.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::polygon::{ensure_ccw, ensure_cw, point_to_3d, remove_collinear};
use crate::triangulation::triangulate_indices;
use nalgebra::{Point2, Vector3};
use rustc_hash::FxHashMap;

/// Extrude a plan polygon upward along +y by `thickness`.
///
/// Rings are cleaned of repeated and collinear points, then the outer ring is
/// normalized counter-clockwise and holes clockwise. The
/// bottom cap faces down, the top cap up, and side quads face away from the
/// solid (into the hole for hole walls).
pub fn thicken_polygon(
    border: &[Point2<f64>],
    thickness: f64,
    holes: &[Vec<Point2<f64>>],
) -> Result<Mesh> {
    if !(thickness > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "extrusion thickness must be positive, got {}",
            thickness
        )));
    }

    let outer = ensure_ccw(&remove_collinear(border));
    if outer.len() < 3 {
        return Err(Error::InvalidArgument(
            "extrusion needs a polygon with at least 3 points".to_string(),
        ));
    }
    let holes: Vec<Vec<Point2<f64>>> = holes
        .iter()
        .map(|h| ensure_cw(&remove_collinear(h)))
        .collect();

    let caps = triangulate_indices(&outer, &holes)?;

    let rings: Vec<&[Point2<f64>]> = std::iter::once(outer.as_slice())
        .chain(holes.iter().map(|h| h.as_slice()))
        .collect();
    let ring_points: usize = rings.iter().map(|r| r.len()).sum();
    let top = ring_points as u32;

    let mut mesh = Mesh::with_capacity(ring_points * 2, caps.len() * 2 + ring_points);

    // Bottom ring [0, n), top ring [n, 2n)
    for ring in &rings {
        for p in ring.iter() {
            mesh.add_vertex(point_to_3d(p, 0.0));
        }
    }
    for ring in &rings {
        for p in ring.iter() {
            mesh.add_vertex(point_to_3d(p, thickness));
        }
    }

    // Counter-clockwise plan triangles face down once lifted
    for t in &caps {
        mesh.add_triangle(t[0], t[1], t[2]);
        mesh.add_triangle(t[0] + top, t[2] + top, t[1] + top);
    }

    let mut start = 0u32;
    for ring in &rings {
        let len = ring.len() as u32;
        for k in 0..len {
            let bi = start + k;
            let bj = start + (k + 1) % len;
            mesh.add_quad(bi, bi + top, bj + top, bj);
        }
        start += len;
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// Thicken a triangle/quad surface along its per-vertex normals.
///
/// The input faces become the bottom layer (reversed), a copy displaced by
/// `thickness` along the normals becomes the top layer, and every boundary
/// edge gets a side quad. Normals are computed first when missing.
pub fn thicken_surface(surface: &Mesh, thickness: f64) -> Result<Mesh> {
    if !(thickness > 0.0) {
        return Err(Error::InvalidArgument(format!(
            "surface thickness must be positive, got {}",
            thickness
        )));
    }
    if surface.face_count() == 0 {
        return Err(Error::EmptyMesh("surface has no faces to thicken".to_string()));
    }
    surface.validate()?;

    let normals: Vec<Vector3<f64>> = if surface.normals.len() == surface.positions.len() {
        surface.normals.clone()
    } else {
        let mut copy = surface.clone();
        copy.compute_normals();
        copy.normals
    };

    let n = surface.positions.len() as u32;
    let mut mesh = Mesh::with_capacity(
        surface.positions.len() * 2,
        surface.face_count() * 2,
    );
    mesh.positions.extend(surface.positions.iter().copied());
    mesh.positions.extend(
        surface
            .positions
            .iter()
            .zip(normals.iter())
            .map(|(p, nrm)| p + nrm * thickness),
    );

    for t in &surface.triangles {
        mesh.add_triangle(t[0], t[2], t[1]);
        mesh.add_triangle(t[0] + n, t[1] + n, t[2] + n);
    }
    for q in &surface.quads {
        mesh.add_quad(q[0], q[3], q[2], q[1]);
        mesh.add_quad(q[0] + n, q[1] + n, q[2] + n, q[3] + n);
    }

    for (a, b) in directed_boundary_edges(surface) {
        mesh.add_quad(a, b, b + n, a + n);
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// Directed edges (as wound by their face) used by exactly one face
fn directed_boundary_edges(mesh: &Mesh) -> Vec<(u32, u32)> {
    let mut counts: FxHashMap<(u32, u32), usize> = FxHashMap::default();
    let mut directed = Vec::new();

    let faces = mesh
        .triangles
        .iter()
        .map(|t| t.as_slice())
        .chain(mesh.quads.iter().map(|q| q.as_slice()));
    for face in faces {
        for k in 0..face.len() {
            let (a, b) = (face[k], face[(k + 1) % face.len()]);
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            directed.push((a, b));
        }
    }

    directed
        .into_iter()
        .filter(|&(a, b)| counts.get(&(a.min(b), a.max(b))) == Some(&1))
        .collect()
}

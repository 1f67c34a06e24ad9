// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Polygon triangulation utilities
//!
//! Wrapper around earcutr for plan polygons with holes. Index results refer to
//! the concatenation of the outer ring and all hole rings, in input order.

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::polygon::point_to_3d;
use nalgebra::Point2;

/// Check if a polygon is convex (all cross products have same sign)
#[inline]
fn is_convex(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return false;
    }

    let n = points.len();
    let mut sign = 0i8;

    for i in 0..n {
        let p0 = &points[i];
        let p1 = &points[(i + 1) % n];
        let p2 = &points[(i + 2) % n];

        let cross = (p1.x - p0.x) * (p2.y - p1.y) - (p1.y - p0.y) * (p2.x - p1.x);

        if cross.abs() > 1e-10 {
            let current_sign = if cross > 0.0 { 1i8 } else { -1i8 };
            if sign == 0 {
                sign = current_sign;
            } else if sign != current_sign {
                return false;
            }
        }
    }

    true
}

/// Simple fan triangulation for convex polygons
#[inline]
fn fan_triangulate(n: usize) -> Vec<usize> {
    let mut indices = Vec::with_capacity((n - 2) * 3);
    for i in 1..n - 1 {
        indices.push(0);
        indices.push(i);
        indices.push(i + 1);
    }
    indices
}

/// Raw earcut indices for an outer ring and its holes
fn earcut_indices(outer: &[Point2<f64>], holes: &[&Vec<Point2<f64>>]) -> Result<Vec<usize>> {
    let n = outer.len();

    if holes.is_empty() {
        // FAST PATH: Triangle - no triangulation needed
        if n == 3 {
            return Ok(vec![0, 1, 2]);
        }

        // FAST PATH: Convex polygon - use fan triangulation
        if n <= 8 && is_convex(outer) {
            return Ok(fan_triangulate(n));
        }
    }

    let total_points: usize = n + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut vertices = Vec::with_capacity(total_points * 2);
    for p in outer {
        vertices.push(p.x);
        vertices.push(p.y);
    }

    let mut hole_indices = Vec::with_capacity(holes.len());
    for hole in holes {
        hole_indices.push(vertices.len() / 2);
        for p in hole.iter() {
            vertices.push(p.x);
            vertices.push(p.y);
        }
    }

    earcutr::earcut(&vertices, &hole_indices, 2)
        .map_err(|e| Error::TriangulationError(format!("{:?}", e)))
}

/// Triangulate a plan polygon with holes.
///
/// Every triangle is counter-clockwise in plan coordinates; indices point into
/// `outer` followed by each hole in order. Holes with fewer than 3 points are
/// rejected rather than skipped so indices stay aligned with the input.
pub fn triangulate_indices(
    outer: &[Point2<f64>],
    holes: &[Vec<Point2<f64>>],
) -> Result<Vec<[u32; 3]>> {
    if outer.len() < 3 {
        return Err(Error::TriangulationError(
            "Need at least 3 points in outer boundary".to_string(),
        ));
    }
    if holes.iter().any(|h| h.len() < 3) {
        return Err(Error::TriangulationError(
            "Holes need at least 3 points".to_string(),
        ));
    }

    let hole_refs: Vec<&Vec<Point2<f64>>> = holes.iter().collect();
    let indices = earcut_indices(outer, &hole_refs)?;
    if indices.is_empty() {
        return Err(Error::TriangulationError(
            "Polygon produced no triangles".to_string(),
        ));
    }

    let all: Vec<&Point2<f64>> = outer.iter().chain(holes.iter().flatten()).collect();
    let triangles = indices
        .chunks_exact(3)
        .map(|t| {
            let (a, b, c) = (all[t[0]], all[t[1]], all[t[2]]);
            let cross = (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x);
            if cross < 0.0 {
                [t[0] as u32, t[2] as u32, t[1] as u32]
            } else {
                [t[0] as u32, t[1] as u32, t[2] as u32]
            }
        })
        .collect();

    Ok(triangles)
}

/// Triangulated surface on the `y = 0` plane, facing up (+y)
pub fn triangulate(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Mesh> {
    let mut mesh = triangulate_opposite(outer, holes)?;
    for t in &mut mesh.triangles {
        t.swap(1, 2);
    }
    mesh.compute_normals();
    Ok(mesh)
}

/// Triangulated surface on the `y = 0` plane, facing down (-y)
pub fn triangulate_opposite(outer: &[Point2<f64>], holes: &[Vec<Point2<f64>>]) -> Result<Mesh> {
    let triangles = triangulate_indices(outer, holes)?;

    let total_points = outer.len() + holes.iter().map(|h| h.len()).sum::<usize>();
    let mut mesh = Mesh::with_capacity(total_points, triangles.len());
    for p in outer.iter().chain(holes.iter().flatten()) {
        mesh.add_vertex(point_to_3d(p, 0.0));
    }
    // A counter-clockwise plan triangle faces -y once lifted to 3D
    mesh.triangles = triangles;
    mesh.compute_normals();
    Ok(mesh)
}

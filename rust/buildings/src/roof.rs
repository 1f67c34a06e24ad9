// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Roof construction
//!
//! Cross-gabled and cross-hipped roofs follow the widened main-point line:
//! border point `i` on the right side is paired with its opposite on the left
//! side, and the midpoint of every pair is raised to the ridge. Pyramid roofs
//! work on any floor border. All builders produce roofs standing on `y = 0`;
//! [`make_roof`] lifts them onto the building.

use crate::error::{Error, Result};
use crate::params::{check_roof_angle, FloorLayout, Footprint, RoofParams, RoofStyle};
use nalgebra::{Point3, Vector3};
use skyline_geometry::polygon::{
    centroid, ensure_ccw, point_to_3d, regular_polygon_from_vertex, remove_collinear,
};
use skyline_geometry::triangulation::triangulate_indices;
use skyline_geometry::{make_wide_line_border, Mesh, Point2};

/// Roof body and optional thick shell of one building
#[derive(Debug, Clone, Default)]
pub struct RoofMeshes {
    /// Drawn with the roof color
    pub roof: Mesh,
    /// Drawn with the thickness color; empty without a thick shell
    pub shell: Mesh,
}

#[inline]
fn ridge_point(a: &Point2<f64>, b: &Point2<f64>, height: f64) -> Point3<f64> {
    point_to_3d(&nalgebra::center(a, b), height)
}

/// Closed cross-gabled roof over a main-point line.
///
/// The mesh holds the `2 * P` border points followed by the `P` ridge points
/// (`P` main points). Each step along the line adds a bottom quad and one quad
/// per slope; two triangles close the gable ends.
pub fn make_roof_crossgabled_simple(
    main_points: &[Point2<f64>],
    floor_width: f64,
    roof_angle: f64,
) -> Result<Mesh> {
    check_roof_angle(roof_angle)?;
    let center_height = roof_angle.tan() * floor_width / 2.0;
    let border = make_wide_line_border(main_points, floor_width, true)?;

    let n = border.len();
    let half = (n / 2) as u32;
    let mut mesh = Mesh::with_capacity(n + n / 2, n * 2);
    for p in &border {
        mesh.add_vertex(point_to_3d(p, 0.0));
    }
    mesh.add_vertex(ridge_point(&border[0], &border[n - 1], center_height));

    // i walks the right side forward, j the left side backward
    let (mut i, mut j) = (0usize, n - 1);
    while i + 2 < j {
        let m = mesh.add_vertex(ridge_point(&border[i + 1], &border[j - 1], center_height));
        let (bi, bj) = (i as u32, j as u32);
        mesh.add_quad(bi, bi + 1, bj - 1, bj);
        mesh.add_quad(m - 1, m, bi + 1, bi);
        mesh.add_quad(m, m - 1, bj, bj - 1);
        i += 1;
        j -= 1;
    }

    let first_ridge = n as u32;
    let last_ridge = (mesh.vertex_count() - 1) as u32;
    mesh.add_triangle(first_ridge - 1, first_ridge, 0);
    mesh.add_triangle(half - 1, last_ridge, half);

    mesh.compute_normals();
    Ok(mesh)
}

/// Cross-gabled roof whose two ridge ends are pulled inward by `hip_depth`.
///
/// `hip_depth` must stay below the length of the first and last ridge
/// segments (and below half the ridge when it has a single segment), otherwise
/// the hips would fold over.
pub fn make_roof_crosshipped_simple(
    main_points: &[Point2<f64>],
    floor_width: f64,
    roof_angle: f64,
    hip_depth: f64,
) -> Result<Mesh> {
    let mut mesh = make_roof_crossgabled_simple(main_points, floor_width, roof_angle)?;

    let first = 2 * main_points.len();
    let last = mesh.vertex_count() - 1;
    let first_segment = mesh.positions[first + 1] - mesh.positions[first];
    let last_segment = mesh.positions[last] - mesh.positions[last - 1];

    let limit = if first + 1 == last {
        first_segment.norm() / 2.0
    } else {
        first_segment.norm().min(last_segment.norm())
    };
    if !(hip_depth >= 0.0 && hip_depth < limit) {
        return Err(Error::InvalidRoof(format!(
            "hip depth must lie in [0, {}), got {}",
            limit, hip_depth
        )));
    }

    mesh.positions[first] += first_segment.normalize() * hip_depth;
    mesh.positions[last] -= last_segment.normalize() * hip_depth;
    mesh.compute_normals();
    Ok(mesh)
}

/// Pyramid over any floor border with its apex `roof_height` above the
/// border's vertex centroid. The base is closed by a downward-facing cap.
pub fn make_roof_pyramid_from_border(border: &[Point2<f64>], roof_height: f64) -> Result<Mesh> {
    if !(roof_height > 0.0) {
        return Err(Error::InvalidRoof(format!(
            "pyramid height must be positive, got {}",
            roof_height
        )));
    }
    let border = ensure_ccw(&remove_collinear(border));
    if border.len() < 3 {
        return Err(Error::InvalidRoof(
            "pyramid needs a border with at least 3 points".to_string(),
        ));
    }

    let base = triangulate_indices(&border, &[])?;
    let n = border.len() as u32;
    let mut mesh = Mesh::with_capacity(border.len() + 1, base.len() + border.len());
    for p in &border {
        mesh.add_vertex(point_to_3d(p, 0.0));
    }
    let apex = mesh.add_vertex(point_to_3d(&centroid(&border), roof_height));

    for t in &base {
        mesh.add_triangle(t[0], t[1], t[2]);
    }
    for k in 0..n {
        mesh.add_triangle(k, apex, (k + 1) % n);
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// Pyramid over a regular polygon, rising at `roof_angle` from every vertex
/// toward the apex
pub fn make_roof_pyramid_from_regular(
    center: &Point2<f64>,
    vertex: &Point2<f64>,
    num_sides: usize,
    roof_angle: f64,
) -> Result<Mesh> {
    check_roof_angle(roof_angle)?;
    let border = regular_polygon_from_vertex(center, vertex, num_sides)?;
    let radius = (vertex - center).norm();
    make_roof_pyramid_from_border(&border, roof_angle.tan() * radius)
}

/// Pyramid over the widened main-point line
pub fn make_roof_pyramid_from_main_points(
    main_points: &[Point2<f64>],
    floor_width: f64,
    roof_height: f64,
) -> Result<Mesh> {
    let border = make_wide_line_border(main_points, floor_width, true)?;
    make_roof_pyramid_from_border(&border, roof_height)
}

/// Thick rafters over a cross-gabled roof, with overhangs.
///
/// Rafters of perpendicular thickness `t` on a slope of angle `a` rise by
/// `t / cos(a)` at the ridge and reach `t / sin(a)` further out at the eaves.
/// Every main point contributes six vertices: right, left and ridge on the
/// roof surface, then the same three on the outer surface. `rake_overhang`
/// pushes the first and last groups out along the line; `roof_overhang`
/// slides the eave vertices down each slope so they stay in its plane.
pub fn make_roof_crossgabled_thickness(
    main_points: &[Point2<f64>],
    floor_width: f64,
    roof_angle: f64,
    thickness: f64,
    rake_overhang: f64,
    roof_overhang: f64,
) -> Result<Mesh> {
    check_roof_angle(roof_angle)?;
    if !(thickness > 0.0) {
        return Err(Error::InvalidRoof(format!(
            "roof thickness must be positive, got {}",
            thickness
        )));
    }
    if !(rake_overhang >= 0.0 && roof_overhang >= 0.0) {
        return Err(Error::InvalidRoof(format!(
            "overhangs must not be negative, got rake {} and roof {}",
            rake_overhang, roof_overhang
        )));
    }

    let center_height = roof_angle.tan() * floor_width / 2.0;
    let thick_height = thickness / roof_angle.cos();
    let thick_width = thickness / roof_angle.sin();
    let border = make_wide_line_border(main_points, floor_width, true)?;
    let n = border.len();

    let mut mesh = Mesh::with_capacity(3 * n, 4 * n);
    let push_group = |mesh: &mut Mesh, right: &Point2<f64>, left: &Point2<f64>| {
        let r = point_to_3d(right, 0.0);
        let l = point_to_3d(left, 0.0);
        let top = ridge_point(right, left, center_height);
        let to_right = (r - l).normalize();
        mesh.add_vertex(r);
        mesh.add_vertex(l);
        mesh.add_vertex(top);
        mesh.add_vertex(r + to_right * thick_width);
        mesh.add_vertex(l - to_right * thick_width);
        mesh.add_vertex(top + Vector3::new(0.0, thick_height, 0.0));
    };

    push_group(&mut mesh, &border[0], &border[n - 1]);
    let (mut i, mut j) = (0usize, n - 1);
    while i + 2 < j {
        push_group(&mut mesh, &border[i + 1], &border[j - 1]);

        // Offsets in a group: 0 right, 1 left, 2 ridge, 3..6 the outer copies
        let b = (mesh.vertex_count() - 12) as u32;
        mesh.add_quad(b + 6, b + 8, b + 2, b);
        mesh.add_quad(b + 1, b + 2, b + 8, b + 7);
        mesh.add_quad(b + 5, b + 11, b + 9, b + 3);
        mesh.add_quad(b + 4, b + 10, b + 11, b + 5);
        mesh.add_quad(b + 3, b + 9, b + 6, b);
        mesh.add_quad(b + 1, b + 7, b + 10, b + 4);
        if i == 0 {
            mesh.add_quad(b, b + 2, b + 5, b + 3);
            mesh.add_quad(b + 1, b + 4, b + 5, b + 2);
        }
        if i + 3 == j {
            mesh.add_quad(b + 6, b + 9, b + 11, b + 8);
            mesh.add_quad(b + 7, b + 8, b + 11, b + 10);
        }
        i += 1;
        j -= 1;
    }

    let count = mesh.vertex_count();
    if rake_overhang > 0.0 {
        let front = (mesh.positions[6] - mesh.positions[0]).normalize();
        for p in &mut mesh.positions[..6] {
            *p -= front * rake_overhang;
        }
        let rear = (mesh.positions[count - 1] - mesh.positions[count - 7]).normalize();
        for p in &mut mesh.positions[count - 6..] {
            *p += rear * rake_overhang;
        }
    }

    if roof_overhang > 0.0 {
        let length = roof_overhang / roof_angle.cos();
        for g in (0..count).step_by(6) {
            let down_right = (mesh.positions[g + 2] - mesh.positions[g]).normalize() * length;
            let down_left = Vector3::new(-down_right.x, down_right.y, -down_right.z);
            mesh.positions[g] -= down_right;
            mesh.positions[g + 3] -= down_right;
            mesh.positions[g + 1] -= down_left;
            mesh.positions[g + 4] -= down_left;
        }
    }

    mesh.compute_normals();
    Ok(mesh)
}

fn require_spine(footprint: &Footprint) -> Result<&[Point2<f64>]> {
    footprint.main_points().ok_or_else(|| {
        Error::InvalidRoof("this roof style needs a main-point footprint".to_string())
    })
}

/// Build the roof selected by `params` on top of the floor stack.
///
/// The roof follows the top floor: spine roofs use the top floor's width and
/// pyramids the top floor's border. Both meshes are lifted by the building
/// height.
pub fn make_roof(
    footprint: &Footprint,
    layout: &FloorLayout,
    params: &RoofParams,
) -> Result<RoofMeshes> {
    footprint.validate()?;
    layout.validate()?;
    params.validate(footprint)?;
    build_roof(footprint, layout, params)
}

/// [`make_roof`] on already validated parameters
pub(crate) fn build_roof(
    footprint: &Footprint,
    layout: &FloorLayout,
    params: &RoofParams,
) -> Result<RoofMeshes> {
    let top = layout.top_floor();
    let width = footprint.width_for_floor(top, layout.width_delta);

    let mut meshes = RoofMeshes::default();
    match params.style {
        RoofStyle::None => return Ok(meshes),
        RoofStyle::CrossGabled { angle, thickness } => {
            let main_points = require_spine(footprint)?;
            let width = width.unwrap_or_default();
            meshes.roof = make_roof_crossgabled_simple(main_points, width, angle)?;
            if let Some(t) = thickness {
                meshes.shell = make_roof_crossgabled_thickness(
                    main_points,
                    width,
                    angle,
                    t.thickness,
                    t.rake_overhang,
                    t.roof_overhang,
                )?;
            }
        }
        RoofStyle::CrossHipped { angle, hip_depth } => {
            let main_points = require_spine(footprint)?;
            meshes.roof = make_roof_crosshipped_simple(
                main_points,
                width.unwrap_or_default(),
                angle,
                hip_depth,
            )?;
        }
        RoofStyle::Pyramid { height } => {
            meshes.roof = match (footprint.main_points(), width) {
                (Some(main_points), Some(width)) => {
                    make_roof_pyramid_from_main_points(main_points, width, height)?
                }
                _ => make_roof_pyramid_from_border(
                    &footprint.border_for_floor(top, layout.width_delta)?,
                    height,
                )?,
            };
        }
    }

    let lift = Vector3::new(0.0, layout.building_height(), 0.0);
    meshes.roof.translate(lift);
    meshes.shell.translate(lift);
    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RoofThickness;
    use approx::assert_relative_eq;
    use skyline_geometry::Color;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn straight() -> Vec<Point2<f64>> {
        vec![Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)]
    }

    fn bent() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 10.0),
            Point2::new(8.0, 16.0),
            Point2::new(8.0, 26.0),
        ]
    }

    #[test]
    fn test_gabled_ridge_height() {
        let mesh = make_roof_crossgabled_simple(&straight(), 4.0, FRAC_PI_4).unwrap();
        assert_eq!(mesh.vertex_count(), 6);
        let (min, max) = mesh.bounds();
        assert_relative_eq!(min.y, 0.0);
        assert_relative_eq!(max.y, 2.0, epsilon = 1e-12);
        // Ridge runs over the lengthened spine
        assert_relative_eq!(mesh.positions[4], Point3::new(-2.0, 2.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(mesh.positions[5], Point3::new(12.0, 2.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_gabled_is_closed() {
        for points in [straight(), bent()] {
            let mesh = make_roof_crossgabled_simple(&points, 5.0, 0.5).unwrap();
            assert_eq!(mesh.vertex_count(), 3 * points.len());
            assert!(mesh.is_closed());
            assert!(mesh.is_consistently_oriented());
        }
    }

    #[test]
    fn test_gabled_rejects_bad_angles() {
        for angle in [0.0, -0.3, FRAC_PI_2, 2.0, PI] {
            assert!(matches!(
                make_roof_crossgabled_simple(&straight(), 4.0, angle),
                Err(Error::InvalidRoof(_))
            ));
        }
    }

    #[test]
    fn test_hipped_pulls_ridge_ends() {
        let mesh = make_roof_crosshipped_simple(&straight(), 4.0, FRAC_PI_4, 3.0).unwrap();
        assert_relative_eq!(mesh.positions[4].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.positions[5].x, 9.0, epsilon = 1e-12);
        assert!(mesh.is_closed());
    }

    #[test]
    fn test_hipped_depth_limits() {
        // Single ridge segment of length 14: the two hips must not cross
        assert!(make_roof_crosshipped_simple(&straight(), 4.0, 0.6, 7.0).is_err());
        assert!(make_roof_crosshipped_simple(&straight(), 4.0, 0.6, -1.0).is_err());
        // First ridge segment is 10 + 2.5 long
        assert!(make_roof_crosshipped_simple(&bent(), 5.0, 0.6, 12.0).is_ok());
        assert!(make_roof_crosshipped_simple(&bent(), 5.0, 0.6, 12.5).is_err());
    }

    #[test]
    fn test_pyramid_apex() {
        let square = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
        ];
        let mesh = make_roof_pyramid_from_border(&square, 3.0).unwrap();
        assert_eq!(mesh.vertex_count(), 5);
        assert_eq!(mesh.triangles.len(), 2 + 4);
        assert_relative_eq!(mesh.positions[4], Point3::new(1.0, 3.0, 1.0));
        assert!(mesh.is_closed());
        assert!(mesh.is_consistently_oriented());
        assert!(make_roof_pyramid_from_border(&square, 0.0).is_err());
    }

    #[test]
    fn test_pyramid_sides_face_outward() {
        let border = skyline_geometry::polygon::make_regular_polygon(6, 5.0, 0.2).unwrap();
        let mesh = make_roof_pyramid_from_border(&border, 4.0).unwrap();
        let apex = mesh.positions[6];
        for t in mesh.triangles.iter().filter(|t| t[1] == 6) {
            let (a, b, c) = (
                mesh.positions[t[0] as usize],
                mesh.positions[t[1] as usize],
                mesh.positions[t[2] as usize],
            );
            let normal = (b - a).cross(&(c - a));
            let outward = Vector3::new(a.x, 0.0, a.z);
            assert!(normal.dot(&outward) > 0.0);
            assert!(normal.y > 0.0);
            assert_relative_eq!(apex.y, 4.0);
        }
    }

    #[test]
    fn test_pyramid_from_regular_height() {
        let mesh = make_roof_pyramid_from_regular(
            &Point2::new(0.0, 0.0),
            &Point2::new(4.0, 0.0),
            4,
            FRAC_PI_4,
        )
        .unwrap();
        assert_relative_eq!(mesh.bounds().1.y, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_thickness_shell_is_closed() {
        for points in [straight(), bent()] {
            let mesh =
                make_roof_crossgabled_thickness(&points, 6.0, 0.6, 0.4, 0.8, 0.5).unwrap();
            assert_eq!(mesh.vertex_count(), 6 * points.len());
            assert!(mesh.is_closed(), "boundary: {:?}", mesh.boundary_edges());
            assert!(mesh.is_consistently_oriented());
        }
    }

    #[test]
    fn test_thickness_geometry() {
        let angle = FRAC_PI_4;
        let mesh = make_roof_crossgabled_thickness(&straight(), 4.0, angle, 0.5, 0.0, 0.0).unwrap();
        // Ridge of the outer surface sits t / cos(a) above the roof ridge
        assert_relative_eq!(
            mesh.positions[5].y - mesh.positions[2].y,
            0.5 / angle.cos(),
            epsilon = 1e-12
        );
        // Eaves of the outer surface reach t / sin(a) further out
        assert_relative_eq!(
            (mesh.positions[3] - mesh.positions[0]).norm(),
            0.5 / angle.sin(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_overhangs() {
        let plain = make_roof_crossgabled_thickness(&straight(), 4.0, 0.5, 0.3, 0.0, 0.0).unwrap();
        let rake = make_roof_crossgabled_thickness(&straight(), 4.0, 0.5, 0.3, 1.0, 0.0).unwrap();
        assert_relative_eq!(rake.positions[0].x, plain.positions[0].x - 1.0, epsilon = 1e-12);
        assert_relative_eq!(rake.positions[11].x, plain.positions[11].x + 1.0, epsilon = 1e-12);

        let eaves = make_roof_crossgabled_thickness(&straight(), 4.0, 0.5, 0.3, 0.0, 0.7).unwrap();
        // Eaves move 0.7 outward and drop along the slope
        assert_relative_eq!(eaves.positions[0].z, plain.positions[0].z - 0.7, epsilon = 1e-12);
        assert_relative_eq!(eaves.positions[1].z, plain.positions[1].z + 0.7, epsilon = 1e-12);
        assert!(eaves.positions[0].y < 0.0);
        assert!(make_roof_crossgabled_thickness(&straight(), 4.0, 0.5, 0.3, -1.0, 0.0).is_err());
    }

    #[test]
    fn test_make_roof_lifts_and_dispatches() {
        let footprint = Footprint::Spine {
            main_points: bent(),
            width: 5.0,
        };
        let layout = FloorLayout {
            num_floors: 3,
            floor_height: 3.0,
            belt_height: 0.5,
            belt_width: 0.3,
            width_delta: 0.0,
        };
        let params = RoofParams {
            style: RoofStyle::CrossGabled {
                angle: 0.5,
                thickness: Some(RoofThickness {
                    thickness: 0.3,
                    rake_overhang: 0.5,
                    roof_overhang: 0.2,
                    color: Color::BLACK,
                }),
            },
            color: Color::WHITE,
        };
        let meshes = make_roof(&footprint, &layout, &params).unwrap();
        assert_relative_eq!(meshes.roof.bounds().0.y, 10.0, epsilon = 1e-12);
        assert!(!meshes.shell.is_empty());

        let none = RoofParams::default();
        let meshes = make_roof(&footprint, &layout, &none).unwrap();
        assert!(meshes.roof.is_empty() && meshes.shell.is_empty());
    }

    #[test]
    fn test_make_roof_rejects_gables_without_spine() {
        let footprint = Footprint::Regular {
            center: Point2::origin(),
            vertex: Point2::new(5.0, 0.0),
            num_sides: 5,
        };
        let layout = FloorLayout {
            num_floors: 2,
            floor_height: 3.0,
            belt_height: 0.0,
            belt_width: 0.3,
            width_delta: 0.5,
        };
        let gabled = RoofParams {
            style: RoofStyle::CrossHipped {
                angle: 0.5,
                hip_depth: 1.0,
            },
            color: Color::WHITE,
        };
        assert!(matches!(
            make_roof(&footprint, &layout, &gabled),
            Err(Error::InvalidRoof(_))
        ));

        let pyramid = RoofParams {
            style: RoofStyle::Pyramid { height: 2.0 },
            color: Color::WHITE,
        };
        let meshes = make_roof(&footprint, &layout, &pyramid).unwrap();
        // Top floor radius is 5.5
        assert_relative_eq!(meshes.roof.bounds().1.x, 5.5, epsilon = 1e-9);
        assert_relative_eq!(meshes.roof.bounds().1.y, 8.0, epsilon = 1e-12);
    }
}

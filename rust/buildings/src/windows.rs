// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Window placement along floor borders
//!
//! Every side of every floor border is split into evenly spread window slots.
//! Each slot is kept with probability `filled_ratio`; kept slots get the open
//! window with probability `open_ratio` and the closed one otherwise. The two
//! draws happen in that order, slot by slot, so a seeded stream reproduces the
//! same facade.

use crate::error::Result;
use crate::params::{FloorLayout, Footprint, WindowParams};
use crate::random::bernoulli;
use rand::Rng;
use skyline_geometry::polygon::{get_angle, point_to_3d, sides};
use skyline_geometry::{make_box, Color, Frame, Instance, Material, Point2, Shape};
use std::f64::consts::PI;
use std::sync::Arc;

/// Reject inconsistent window settings before any slot is computed
pub fn check_window_params(params: &WindowParams) -> Result<()> {
    params.validate()
}

/// Centers of the window slots fitting on the side `p1 -> p2`.
///
/// With `W` the side length, `w` the window width, `eps` the clearance from
/// the corners and `s` the minimum spacing, `n = floor((W - w - 2 eps) / (w + s)) + 1`
/// windows fit when `w + 2 eps < W`. The windows are then spread so the gaps
/// between them are equal; a single window is centered.
pub fn window_slots(
    p1: &Point2<f64>,
    p2: &Point2<f64>,
    window_width: f64,
    spacing: f64,
    edge_distance: f64,
) -> Vec<Point2<f64>> {
    let side = p2 - p1;
    let length = side.norm();
    let (w, eps) = (window_width, edge_distance);
    if w + 2.0 * eps >= length {
        return Vec::new();
    }

    let n = ((length - w - 2.0 * eps) / (w + spacing)).floor() as usize + 1;
    let dir = side / length;
    if n == 1 {
        return vec![p1 + dir * (length / 2.0)];
    }

    let spread = (length - 2.0 * eps - n as f64 * w) / (n - 1) as f64;
    (0..n)
        .map(|j| p1 + dir * (eps + w / 2.0 + (w + spread) * j as f64))
        .collect()
}

/// Window instances for every floor of a building.
///
/// Instances are named `{name}_{k}` with `k` counting placed windows. Frames
/// sit at mid-floor height and turn the window's local +z axis out of the
/// (counter-clockwise) border.
pub fn make_windows<R: Rng + ?Sized>(
    footprint: &Footprint,
    layout: &FloorLayout,
    params: &WindowParams,
    rng: &mut R,
) -> Result<Vec<Instance>> {
    footprint.validate()?;
    layout.validate()?;
    check_window_params(params)?;
    place_windows(footprint, layout, params, rng)
}

/// [`make_windows`] on already validated parameters
pub(crate) fn place_windows<R: Rng + ?Sized>(
    footprint: &Footprint,
    layout: &FloorLayout,
    params: &WindowParams,
    rng: &mut R,
) -> Result<Vec<Instance>> {
    let window_width = params.window_width();
    let mut windows = Vec::new();
    let mut win_id = 0usize;

    for floor in 0..layout.num_floors {
        let border = footprint.border_for_floor(floor, layout.width_delta)?;
        let height = layout.floor_base(floor) + layout.floor_height / 2.0;

        for (p1, p2) in sides(&border) {
            let angle = PI - get_angle(&(p2 - p1));
            for center in window_slots(&p1, &p2, window_width, params.spacing, params.edge_distance) {
                if !bernoulli(rng, params.filled_ratio)? {
                    continue;
                }
                let shape = if bernoulli(rng, params.open_ratio)? {
                    Arc::clone(&params.open_shape)
                } else {
                    Arc::clone(&params.closed_shape)
                };
                windows.push(Instance::new(
                    format!("{}_{}", params.name, win_id),
                    shape,
                    Frame::rotated_y(point_to_3d(&center, height), angle),
                ));
                win_id += 1;
            }
        }
    }

    tracing::trace!(count = windows.len(), name = %params.name, "placed windows");
    Ok(windows)
}

/// Box-shaped open and closed windows, centered on the origin
pub fn make_test_windows(name_open: &str, name_closed: &str) -> Result<(Arc<Shape>, Arc<Shape>)> {
    let open = Shape::new(
        format!("{}_shape", name_open),
        make_box(1.6, 1.0, 0.1)?,
        Material::new(format!("{}_mat", name_open), Color::new(0.8, 0.8, 1.0))
            .with_specular(Color::gray(0.8)),
    );
    let closed = Shape::new(
        format!("{}_shape", name_closed),
        make_box(1.0, 1.0, 0.1)?,
        Material::new(format!("{}_mat", name_closed), Color::new(0.3, 0.1, 0.0)),
    );
    Ok((Arc::new(open), Arc::new(closed)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use skyline_geometry::Vector3;

    fn window_params(open_ratio: f64, filled_ratio: f64) -> WindowParams {
        let shape = |name: &str| {
            Arc::new(Shape::new(
                name,
                make_box(2.0, 1.0, 0.1).unwrap(),
                Material::default(),
            ))
        };
        WindowParams {
            name: "wnd".to_string(),
            spacing: 1.0,
            edge_distance: 0.5,
            open_shape: shape("open"),
            closed_shape: shape("closed"),
            open_ratio,
            filled_ratio,
        }
    }

    fn square_footprint() -> Footprint {
        Footprint::Border {
            border: vec![
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
        }
    }

    fn layout() -> FloorLayout {
        FloorLayout {
            num_floors: 2,
            floor_height: 3.0,
            belt_height: 0.5,
            belt_width: 0.2,
            width_delta: 0.0,
        }
    }

    #[test]
    fn test_slot_count_and_spread() {
        let slots = window_slots(&Point2::new(0.0, 0.0), &Point2::new(10.0, 0.0), 2.0, 1.0, 0.5);
        assert_eq!(slots.len(), 3);
        // Spread spacing (10 - 1 - 6) / 2 = 1.5
        assert_relative_eq!(slots[0].x, 1.5, epsilon = 1e-12);
        assert_relative_eq!(slots[1].x, 5.0, epsilon = 1e-12);
        assert_relative_eq!(slots[2].x, 8.5, epsilon = 1e-12);
    }

    #[test]
    fn test_single_slot_is_centered() {
        let slots = window_slots(&Point2::new(0.0, 0.0), &Point2::new(0.0, 4.0), 2.0, 3.0, 0.5);
        assert_eq!(slots.len(), 1);
        assert_relative_eq!(slots[0], Point2::new(0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn test_side_too_short() {
        assert!(window_slots(&Point2::new(0.0, 0.0), &Point2::new(3.0, 0.0), 2.0, 1.0, 0.5).is_empty());
    }

    #[test]
    fn test_all_slots_filled() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let windows =
            make_windows(&square_footprint(), &layout(), &window_params(0.0, 1.0), &mut rng).unwrap();
        assert_eq!(windows.len(), 2 * 4 * 3);
        assert_eq!(windows[0].name, "wnd_0");
        assert_eq!(windows[23].name, "wnd_23");
        assert!(windows.iter().all(|w| w.shape.name == "closed"));
        assert_relative_eq!(windows[0].frame.origin.y, 1.5);
        assert_relative_eq!(windows[12].frame.origin.y, 5.0);
    }

    #[test]
    fn test_no_slots_filled() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let windows =
            make_windows(&square_footprint(), &layout(), &window_params(1.0, 0.0), &mut rng).unwrap();
        assert!(windows.is_empty());
    }

    #[test]
    fn test_windows_face_outward() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let windows =
            make_windows(&square_footprint(), &layout(), &window_params(1.0, 1.0), &mut rng).unwrap();
        let center = Vector3::new(5.0, 0.0, 5.0);
        for w in &windows {
            let out = Vector3::new(w.frame.origin.x, 0.0, w.frame.origin.z) - center;
            assert!(w.frame.z.dot(&out) > 0.0, "{} faces inward", w.name);
            assert_relative_eq!(w.frame.y, Vector3::y(), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_same_seed_same_windows() {
        let params = window_params(0.5, 0.5);
        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            make_windows(&square_footprint(), &layout(), &params, &mut rng)
                .unwrap()
                .into_iter()
                .map(|w| (w.shape.name.clone(), w.frame.origin))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_invalid_window_params() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut params = window_params(0.5, 0.5);
        params.spacing = -1.0;
        assert!(matches!(
            make_windows(&square_footprint(), &layout(), &params, &mut rng),
            Err(Error::InvalidWindows(_))
        ));
        let mut params = window_params(1.5, 0.5);
        assert!(check_window_params(&params).is_err());
        params.open_ratio = 0.5;
        params.filled_ratio = -0.1;
        assert!(check_window_params(&params).is_err());

        // Windows would hang past the corners
        let mut params = window_params(0.5, 0.5);
        params.edge_distance = -0.5;
        assert!(matches!(
            check_window_params(&params),
            Err(Error::InvalidWindows(_))
        ));
        params.edge_distance = 0.0;
        assert!(check_window_params(&params).is_ok());
    }

    #[test]
    fn test_test_windows() {
        let (open, closed) = make_test_windows("wnd_op", "wnd_cls").unwrap();
        assert_relative_eq!(open.mesh.size().x, 1.6, epsilon = 1e-12);
        assert_relative_eq!(closed.mesh.size().x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(open.mesh.centroid().coords.norm(), 0.0, epsilon = 1e-12);
        assert_eq!(open.material.name, "wnd_op_mat");
        assert_eq!(closed.name, "wnd_cls_shape");
    }
}

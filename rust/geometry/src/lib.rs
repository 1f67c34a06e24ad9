// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Skyline Geometry
//!
//! Plan-polygon and mesh primitives for procedural buildings: mitered line
//! widening, polygon offsetting through i_overlay, earcutr triangulation and
//! extrusion of polygons and surfaces into closed solids, using nalgebra for
//! all point and vector math.
//!
//! Conventions: 3D space is y-up, a plan point `(x, y)` sits at `(x, h, y)`,
//! and polygons are open counter-clockwise rings.

pub mod error;
pub mod extrusion;
pub mod mesh;
pub mod offset;
pub mod polygon;
pub mod primitives;
pub mod scene;
pub mod triangulation;
pub mod wide_line;

// Re-export nalgebra types for convenience
pub use nalgebra::{Matrix4, Point2, Point3, Vector2, Vector3};

pub use error::{Error, Result};
pub use extrusion::{thicken_polygon, thicken_surface};
pub use mesh::{Mesh, MeshBuffers};
pub use offset::{expand_polygon, offset_polygon, Polygons};
pub use primitives::make_box;
pub use scene::{Color, Frame, Instance, Material, Shape};
pub use triangulation::{triangulate, triangulate_opposite};
pub use wide_line::{make_wide_line, make_wide_line_border};

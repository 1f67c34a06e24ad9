// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene value types handed to the renderer: colors, materials, shapes and
//! named instances placed by a frame.

use crate::mesh::Mesh;
use nalgebra::{Matrix4, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Linear RGB color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Uniform gray
    pub const fn gray(v: f32) -> Self {
        Self::new(v, v, v)
    }

    #[inline]
    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Surface material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    pub diffuse: Color,
    pub specular: Color,
    pub roughness: f32,
}

impl Material {
    /// Matte material with the given diffuse color
    pub fn new(name: impl Into<String>, diffuse: Color) -> Self {
        Self {
            name: name.into(),
            diffuse,
            specular: Color::BLACK,
            roughness: 1.0,
        }
    }

    pub fn with_specular(mut self, specular: Color) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("", Color::WHITE)
    }
}

/// A mesh with its material
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub name: String,
    pub mesh: Mesh,
    pub material: Material,
}

impl Shape {
    pub fn new(name: impl Into<String>, mesh: Mesh, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
        }
    }
}

/// Placement frame: origin plus an orthonormal basis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point3<f64>,
    pub x: Vector3<f64>,
    pub y: Vector3<f64>,
    pub z: Vector3<f64>,
}

impl Frame {
    pub fn identity() -> Self {
        Self::at(Point3::origin())
    }

    /// Axis-aligned frame at `origin`
    pub fn at(origin: Point3<f64>) -> Self {
        Self {
            origin,
            x: Vector3::x(),
            y: Vector3::y(),
            z: Vector3::z(),
        }
    }

    /// Frame at `origin` rotated by `angle` radians about the vertical axis
    pub fn rotated_y(origin: Point3<f64>, angle: f64) -> Self {
        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), angle);
        Self {
            origin,
            x: rotation * Vector3::x(),
            y: rotation * Vector3::y(),
            z: rotation * Vector3::z(),
        }
    }

    /// Affine matrix mapping local to world coordinates
    #[rustfmt::skip]
    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new(
            self.x.x, self.y.x, self.z.x, self.origin.x,
            self.x.y, self.y.y, self.z.y, self.origin.y,
            self.x.z, self.y.z, self.z.z, self.origin.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    #[inline]
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        self.origin + self.x * p.x + self.y * p.y + self.z * p.z
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::identity()
    }
}

/// A named placement of a shared shape
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: String,
    pub shape: Arc<Shape>,
    pub frame: Frame,
}

impl Instance {
    pub fn new(name: impl Into<String>, shape: Arc<Shape>, frame: Frame) -> Self {
        Self {
            name: name.into(),
            shape,
            frame,
        }
    }

    /// Move the instance without touching the shared mesh
    pub fn translate(&mut self, offset: Vector3<f64>) {
        self.frame.origin += offset;
    }

    /// Shape vertices in world coordinates
    pub fn world_positions(&self) -> Vec<Point3<f64>> {
        self.shape
            .mesh
            .positions
            .iter()
            .map(|p| self.frame.transform_point(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_rotated_frame_is_orthonormal() {
        let frame = Frame::rotated_y(Point3::new(1.0, 2.0, 3.0), 0.7);
        assert_relative_eq!(frame.x.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(frame.x.dot(&frame.z), 0.0, epsilon = 1e-12);
        assert_relative_eq!(frame.x.cross(&frame.y), frame.z, epsilon = 1e-12);
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let frame = Frame::rotated_y(Point3::origin(), PI / 2.0);
        assert_relative_eq!(frame.x, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        assert_relative_eq!(frame.z, Vector3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_matches_transform_point() {
        let frame = Frame::rotated_y(Point3::new(5.0, 1.0, -2.0), 1.1);
        let p = Point3::new(0.3, -0.2, 0.9);
        let by_matrix = frame.to_matrix().transform_point(&p);
        assert_relative_eq!(by_matrix, frame.transform_point(&p), epsilon = 1e-12);
    }

    #[test]
    fn test_instance_translate_keeps_shape() {
        let shape = Arc::new(Shape::new("s", Mesh::new(), Material::default()));
        let mut instance = Instance::new("i", shape.clone(), Frame::identity());
        instance.translate(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(instance.frame.origin, Point3::new(1.0, 0.0, 0.0));
        assert!(Arc::ptr_eq(&instance.shape, &shape));
    }

    #[test]
    fn test_color_rgba() {
        assert_eq!(Color::new(0.5, 0.25, 1.0).to_rgba(), [0.5, 0.25, 1.0, 1.0]);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mesh data structures
//!
//! A [`Mesh`] keeps positions in `f64` and faces as index tuples (points, lines,
//! triangles and quads). Meshes are built by a single constructing call and then
//! only combined through [`Mesh::merge`] or moved as a whole with
//! [`Mesh::translate`]. [`Mesh::to_buffers`] flattens a mesh into the `f32`
//! triangle buffers a renderer consumes.

use crate::error::{Error, Result};
use crate::scene::Color;
use nalgebra::{Matrix4, Point3, Vector3};
use rustc_hash::FxHashMap;

/// Polygonal mesh with optional per-vertex normals and colors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions (y is the vertical axis)
    pub positions: Vec<Point3<f64>>,
    /// Per-vertex normals, either empty or the same length as `positions`
    pub normals: Vec<Vector3<f64>>,
    /// Per-vertex colors (RGBA), either empty or the same length as `positions`
    pub colors: Vec<[f32; 4]>,
    /// Point primitives
    pub points: Vec<u32>,
    /// Line primitives
    pub lines: Vec<[u32; 2]>,
    /// Triangles, counter-clockwise seen from the side they face
    pub triangles: Vec<[u32; 3]>,
    /// Quads, counter-clockwise seen from the side they face
    pub quads: Vec<[u32; 4]>,
}

/// Flat buffers for the renderer hand-off
#[derive(Debug, Clone, Default)]
pub struct MeshBuffers {
    /// Vertex positions (x, y, z)
    pub positions: Vec<f32>,
    /// Vertex normals (nx, ny, nz)
    pub normals: Vec<f32>,
    /// Triangle indices (i0, i1, i2)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh with capacity
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertex_count),
            normals: Vec::new(),
            colors: Vec::new(),
            points: Vec::new(),
            lines: Vec::new(),
            triangles: Vec::with_capacity(face_count),
            quads: Vec::with_capacity(face_count),
        }
    }

    /// Add a vertex and return its index
    #[inline]
    pub fn add_vertex(&mut self, position: Point3<f64>) -> u32 {
        self.positions.push(position);
        (self.positions.len() - 1) as u32
    }

    /// Add a triangle
    #[inline]
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.triangles.push([i0, i1, i2]);
    }

    /// Add a quad
    #[inline]
    pub fn add_quad(&mut self, i0: u32, i1: u32, i2: u32, i3: u32) {
        self.quads.push([i0, i1, i2, i3]);
    }

    /// Get vertex count
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles after splitting quads
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() + self.quads.len() * 2
    }

    /// Number of surface faces (triangles and quads)
    #[inline]
    pub fn face_count(&self) -> usize {
        self.triangles.len() + self.quads.len()
    }

    /// Check if mesh is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append another mesh, offsetting its indices.
    ///
    /// Normals and colors are kept only when both meshes carry them (or the
    /// receiving mesh is empty), so the length invariant always holds.
    pub fn merge(&mut self, other: Mesh) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = other;
            return;
        }

        let offset = self.positions.len() as u32;

        if self.normals.len() == self.positions.len() && other.normals.len() == other.positions.len() {
            self.normals.extend(other.normals);
        } else {
            self.normals.clear();
        }
        if self.colors.len() == self.positions.len() && other.colors.len() == other.positions.len() {
            self.colors.extend(other.colors);
        } else {
            self.colors.clear();
        }

        self.positions.extend(other.positions);
        self.points.extend(other.points.iter().map(|&i| i + offset));
        self.lines
            .extend(other.lines.iter().map(|l| [l[0] + offset, l[1] + offset]));
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
        self.quads.extend(
            other
                .quads
                .iter()
                .map(|q| [q[0] + offset, q[1] + offset, q[2] + offset, q[3] + offset]),
        );
    }

    /// Batch merge multiple meshes at once
    pub fn merge_all<I>(&mut self, meshes: I)
    where
        I: IntoIterator<Item = Mesh>,
    {
        for mesh in meshes {
            self.merge(mesh);
        }
    }

    /// Move every vertex by `offset`
    #[inline]
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Consuming variant of [`Mesh::translate`]
    #[inline]
    pub fn translated(mut self, offset: Vector3<f64>) -> Self {
        self.translate(offset);
        self
    }

    /// Apply an affine transformation to positions and normals
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for p in &mut self.positions {
            *p = matrix.transform_point(p);
        }

        let normal_matrix = matrix
            .fixed_view::<3, 3>(0, 0)
            .try_inverse()
            .map(|m| m.transpose())
            .unwrap_or_else(|| matrix.fixed_view::<3, 3>(0, 0).into_owned());
        for n in &mut self.normals {
            *n = (normal_matrix * *n).try_normalize(1e-12).unwrap_or(*n);
        }
    }

    /// Recompute per-vertex normals as the area-weighted average of the
    /// adjacent face normals. Quads are split along their 0-2 diagonal.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vector3::zeros(); self.positions.len()];

        let mut accumulate = |a: u32, b: u32, c: u32| {
            let (pa, pb, pc) = (
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            );
            let n = (pb - pa).cross(&(pc - pa));
            normals[a as usize] += n;
            normals[b as usize] += n;
            normals[c as usize] += n;
        };

        for t in &self.triangles {
            accumulate(t[0], t[1], t[2]);
        }
        for q in &self.quads {
            accumulate(q[0], q[1], q[2]);
            accumulate(q[0], q[2], q[3]);
        }

        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize(1e-12).unwrap_or_else(Vector3::y))
            .collect();
    }

    /// Give every face its own vertices so normals are flat per face.
    ///
    /// Points and lines are dropped; colors follow their vertices.
    pub fn facet(&mut self) {
        let has_colors = self.colors.len() == self.positions.len();
        let mut positions = Vec::with_capacity(self.triangles.len() * 3 + self.quads.len() * 4);
        let mut colors = Vec::new();
        let mut triangles = Vec::with_capacity(self.triangles.len());
        let mut quads = Vec::with_capacity(self.quads.len());

        for t in &self.triangles {
            let base = positions.len() as u32;
            for &i in t {
                positions.push(self.positions[i as usize]);
                if has_colors {
                    colors.push(self.colors[i as usize]);
                }
            }
            triangles.push([base, base + 1, base + 2]);
        }
        for q in &self.quads {
            let base = positions.len() as u32;
            for &i in q {
                positions.push(self.positions[i as usize]);
                if has_colors {
                    colors.push(self.colors[i as usize]);
                }
            }
            quads.push([base, base + 1, base + 2, base + 3]);
        }

        self.positions = positions;
        self.colors = colors;
        self.points.clear();
        self.lines.clear();
        self.triangles = triangles;
        self.quads = quads;
        self.compute_normals();
    }

    /// Weld vertices closer than `epsilon` (grid-quantized) into one.
    ///
    /// Faces that collapse onto repeated indices are removed.
    pub fn merge_same_points(&mut self, epsilon: f64) {
        let eps = epsilon.max(f64::EPSILON);
        let mut lookup: FxHashMap<(i64, i64, i64), u32> = FxHashMap::default();
        let mut remap = Vec::with_capacity(self.positions.len());
        let mut positions = Vec::with_capacity(self.positions.len());
        let mut colors = Vec::new();
        let has_colors = self.colors.len() == self.positions.len();

        for (i, p) in self.positions.iter().enumerate() {
            let key = (
                (p.x / eps).round() as i64,
                (p.y / eps).round() as i64,
                (p.z / eps).round() as i64,
            );
            let index = *lookup.entry(key).or_insert_with(|| {
                positions.push(*p);
                if has_colors {
                    colors.push(self.colors[i]);
                }
                (positions.len() - 1) as u32
            });
            remap.push(index);
        }

        let r = |i: u32| remap[i as usize];
        self.points = self.points.iter().map(|&i| r(i)).collect();
        self.lines = self
            .lines
            .iter()
            .map(|l| [r(l[0]), r(l[1])])
            .filter(|l| l[0] != l[1])
            .collect();
        self.triangles = self
            .triangles
            .iter()
            .map(|t| [r(t[0]), r(t[1]), r(t[2])])
            .filter(|t| t[0] != t[1] && t[1] != t[2] && t[0] != t[2])
            .collect();
        self.quads = self
            .quads
            .iter()
            .map(|q| [r(q[0]), r(q[1]), r(q[2]), r(q[3])])
            .filter(|q| {
                q[0] != q[1] && q[0] != q[2] && q[0] != q[3]
                    && q[1] != q[2] && q[1] != q[3] && q[2] != q[3]
            })
            .collect();
        self.positions = positions;
        self.colors = colors;

        if !self.normals.is_empty() {
            self.compute_normals();
        }
    }

    /// Calculate bounds (min, max)
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        if self.is_empty() {
            return (Point3::origin(), Point3::origin());
        }

        let mut min = Point3::new(f64::MAX, f64::MAX, f64::MAX);
        let mut max = Point3::new(f64::MIN, f64::MIN, f64::MIN);

        for p in &self.positions {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        (min, max)
    }

    /// Bounding box extent along each axis
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        let (min, max) = self.bounds();
        max - min
    }

    /// Average of all vertex positions
    pub fn centroid(&self) -> Point3<f64> {
        if self.is_empty() {
            return Point3::origin();
        }
        let sum = self
            .positions
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.positions.len() as f64)
    }

    /// Translate the mesh so its bounding box is centered on the origin
    pub fn center_at_origin(&mut self) {
        let (min, max) = self.bounds();
        let center = nalgebra::center(&min, &max);
        self.translate(-center.coords);
    }

    /// Paint every vertex with one color
    pub fn set_color(&mut self, color: Color) {
        self.colors = vec![color.to_rgba(); self.positions.len()];
    }

    /// Edges (sorted index pairs) that are not shared by exactly two faces
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut counts: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        self.for_each_face_edge(|a, b| {
            *counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
        });

        let mut edges: Vec<(u32, u32)> = counts
            .into_iter()
            .filter(|&(_, count)| count != 2)
            .map(|(edge, _)| edge)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// True if every edge borders exactly two faces
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.face_count() > 0 && self.boundary_edges().is_empty()
    }

    /// True if every directed edge is used once and its opposite once,
    /// i.e. the closed surface has a consistent winding.
    pub fn is_consistently_oriented(&self) -> bool {
        let mut directed: FxHashMap<(u32, u32), usize> = FxHashMap::default();
        self.for_each_face_edge(|a, b| {
            *directed.entry((a, b)).or_insert(0) += 1;
        });
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }

    /// Check the index and attribute-length invariants
    pub fn validate(&self) -> Result<()> {
        let n = self.positions.len() as u32;
        let in_range = |i: &u32| *i < n;
        let faces_ok = self.points.iter().all(in_range)
            && self.lines.iter().flatten().all(in_range)
            && self.triangles.iter().flatten().all(in_range)
            && self.quads.iter().flatten().all(in_range);
        if !faces_ok {
            return Err(Error::InvalidArgument(
                "face index out of range".to_string(),
            ));
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(Error::InvalidArgument(format!(
                "{} normals for {} positions",
                self.normals.len(),
                self.positions.len()
            )));
        }
        if !self.colors.is_empty() && self.colors.len() != self.positions.len() {
            return Err(Error::InvalidArgument(format!(
                "{} colors for {} positions",
                self.colors.len(),
                self.positions.len()
            )));
        }
        Ok(())
    }

    /// Flatten into `f32` triangle buffers. Normals are computed when missing.
    pub fn to_buffers(&self) -> MeshBuffers {
        let normals = if self.normals.len() == self.positions.len() {
            self.normals.clone()
        } else {
            let mut copy = self.clone();
            copy.compute_normals();
            copy.normals
        };

        let mut buffers = MeshBuffers {
            positions: Vec::with_capacity(self.positions.len() * 3),
            normals: Vec::with_capacity(self.positions.len() * 3),
            indices: Vec::with_capacity(self.triangle_count() * 3),
        };

        for (p, n) in self.positions.iter().zip(normals.iter()) {
            buffers.positions.extend([p.x as f32, p.y as f32, p.z as f32]);
            buffers.normals.extend([n.x as f32, n.y as f32, n.z as f32]);
        }
        for t in &self.triangles {
            buffers.indices.extend_from_slice(t);
        }
        for q in &self.quads {
            buffers.indices.extend([q[0], q[1], q[2], q[0], q[2], q[3]]);
        }

        buffers
    }

    fn for_each_face_edge(&self, mut f: impl FnMut(u32, u32)) {
        for t in &self.triangles {
            for k in 0..3 {
                f(t[k], t[(k + 1) % 3]);
            }
        }
        for q in &self.quads {
            for k in 0..4 {
                f(q[k], q[(k + 1) % 4]);
            }
        }
    }
}

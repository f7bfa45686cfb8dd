//! Procedural mesh generation and GPU-resident geometry buffers.
//!
//! This module provides the geometry building blocks of the renderer:
//!
//! - [`MeshData`] — CPU-side parallel attribute arrays (position, normal,
//!   color, index) with deterministic procedural constructors
//! - [`GeometryBuffer`] — a mesh's GPU buffers plus the construction
//!   parameters needed to rebuild them
//!
//! # Shapes
//!
//! Three generators are built in:
//!
//! | Shape     | Vertices            | Triangles        |
//! |-----------|---------------------|------------------|
//! | Icosphere | 12 + 30·(4ᴺ − 1)/3  | 20·4ᴺ            |
//! | Cube      | 24 (4 per face)     | 12               |
//! | Square    | 4                   | 2                |
//!
//! The icosphere starts from a regular icosahedron and recursively splits
//! each triangle into four, deduplicating edge midpoints so shared edges
//! never produce seam vertices. Level 0 is the bare icosahedron.
//!
//! ```
//! use facet::{MeshData, Vec3};
//!
//! let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, 2);
//! assert_eq!(mesh.vertex_count(), 162);
//! ```
//!
//! # Attribute Layout
//!
//! Positions, normals, and colors are kept in separate arrays (and
//! uploaded to separate vertex buffers) rather than interleaved. Every
//! attribute is a `vec4`: positions carry `w = 1`, normals `w = 0`, so
//! both can be transformed by the same 4×4 matrices. Colors default to
//! opaque white; a shader that ignores the color slot simply never reads
//! it.

use glam::Vec3;
use std::collections::HashMap;

use crate::gpu::GpuContext;

/// Maximum supported icosphere subdivision level.
///
/// Level 8 already yields ~655k vertices; deeper recursion buys nothing
/// visible and costs real memory.
pub const MAX_SUBDIVISION_LEVEL: u32 = 8;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// CPU-side mesh attribute arrays.
///
/// All three attribute arrays are parallel: they have the same length, and
/// `indices` only contains values below that length. Construction through
/// the shape generators upholds this; hand-built instances should too.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// Vertex positions, `w = 1`.
    pub positions: Vec<[f32; 4]>,
    /// Vertex normals, `w = 0`.
    pub normals: Vec<[f32; 4]>,
    /// Vertex colors (RGBA). Generators fill these with opaque white.
    pub colors: Vec<[f32; 4]>,
    /// Triangle list indices, three per triangle.
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Generates an icosphere by recursive subdivision of an icosahedron.
    ///
    /// `level` is clamped to [`MAX_SUBDIVISION_LEVEL`]. Each pass splits
    /// every triangle `(a, b, c)` into four using the normalized edge
    /// midpoints; a midpoint cache keyed by the unordered parent-index
    /// pair lives for the whole pass, so vertices on shared edges are
    /// created exactly once. After subdivision, every unit-sphere vertex
    /// is scaled by `radius` and translated by `center`; its normal is the
    /// pre-scale unit direction.
    pub fn icosphere(center: Vec3, radius: f32, level: u32) -> Self {
        let level = level.min(MAX_SUBDIVISION_LEVEL);

        let mut vertices = icosahedron_vertices();
        let mut faces = icosahedron_faces();

        for _ in 0..level {
            let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
            let mut split = Vec::with_capacity(faces.len() * 4);

            for &[a, b, c] in &faces {
                let ab = midpoint(&mut vertices, &mut midpoints, a, b);
                let bc = midpoint(&mut vertices, &mut midpoints, b, c);
                let ca = midpoint(&mut vertices, &mut midpoints, c, a);

                split.push([a, ab, ca]);
                split.push([b, bc, ab]);
                split.push([c, ca, bc]);
                split.push([ab, bc, ca]);
            }

            faces = split;
        }

        let mut positions = Vec::with_capacity(vertices.len());
        let mut normals = Vec::with_capacity(vertices.len());
        for unit in &vertices {
            let p = center + *unit * radius;
            positions.push([p.x, p.y, p.z, 1.0]);
            normals.push([unit.x, unit.y, unit.z, 0.0]);
        }

        let colors = vec![WHITE; vertices.len()];
        let indices = faces.iter().flatten().copied().collect();

        Self {
            positions,
            normals,
            colors,
            indices,
        }
    }

    /// Generates an axis-aligned cube with edge length `size` centered at
    /// `center`.
    ///
    /// Each face gets its own four vertices so normals stay flat per face.
    pub fn cube(center: Vec3, size: f32) -> Self {
        let h = size * 0.5;

        #[rustfmt::skip]
        let corners: [([f32; 3], [f32; 3]); 24] = [
            // Front face (Z+)
            ([-h, -h,  h], [ 0.0,  0.0,  1.0]),
            ([ h, -h,  h], [ 0.0,  0.0,  1.0]),
            ([ h,  h,  h], [ 0.0,  0.0,  1.0]),
            ([-h,  h,  h], [ 0.0,  0.0,  1.0]),
            // Back face (Z-)
            ([ h, -h, -h], [ 0.0,  0.0, -1.0]),
            ([-h, -h, -h], [ 0.0,  0.0, -1.0]),
            ([-h,  h, -h], [ 0.0,  0.0, -1.0]),
            ([ h,  h, -h], [ 0.0,  0.0, -1.0]),
            // Top face (Y+)
            ([-h,  h,  h], [ 0.0,  1.0,  0.0]),
            ([ h,  h,  h], [ 0.0,  1.0,  0.0]),
            ([ h,  h, -h], [ 0.0,  1.0,  0.0]),
            ([-h,  h, -h], [ 0.0,  1.0,  0.0]),
            // Bottom face (Y-)
            ([-h, -h, -h], [ 0.0, -1.0,  0.0]),
            ([ h, -h, -h], [ 0.0, -1.0,  0.0]),
            ([ h, -h,  h], [ 0.0, -1.0,  0.0]),
            ([-h, -h,  h], [ 0.0, -1.0,  0.0]),
            // Right face (X+)
            ([ h, -h,  h], [ 1.0,  0.0,  0.0]),
            ([ h, -h, -h], [ 1.0,  0.0,  0.0]),
            ([ h,  h, -h], [ 1.0,  0.0,  0.0]),
            ([ h,  h,  h], [ 1.0,  0.0,  0.0]),
            // Left face (X-)
            ([-h, -h, -h], [-1.0,  0.0,  0.0]),
            ([-h, -h,  h], [-1.0,  0.0,  0.0]),
            ([-h,  h,  h], [-1.0,  0.0,  0.0]),
            ([-h,  h, -h], [-1.0,  0.0,  0.0]),
        ];

        #[rustfmt::skip]
        let indices = vec![
            0,  1,  2,  2,  3,  0,  // front
            4,  5,  6,  6,  7,  4,  // back
            8,  9,  10, 10, 11, 8,  // top
            12, 13, 14, 14, 15, 12, // bottom
            16, 17, 18, 18, 19, 16, // right
            20, 21, 22, 22, 23, 20, // left
        ];

        let positions = corners
            .iter()
            .map(|(p, _)| {
                [
                    center.x + p[0],
                    center.y + p[1],
                    center.z + p[2],
                    1.0,
                ]
            })
            .collect();
        let normals = corners
            .iter()
            .map(|(_, n)| [n[0], n[1], n[2], 0.0])
            .collect();

        Self {
            positions,
            normals,
            colors: vec![WHITE; corners.len()],
            indices,
        }
    }

    /// Generates a flat square of side `size` in the XY plane, centered at
    /// `center`, with a single +Z normal.
    pub fn square(center: Vec3, size: f32) -> Self {
        let h = size * 0.5;

        let positions = vec![
            [center.x - h, center.y - h, center.z, 1.0],
            [center.x + h, center.y - h, center.z, 1.0],
            [center.x + h, center.y + h, center.z, 1.0],
            [center.x - h, center.y + h, center.z, 1.0],
        ];
        let normals = vec![[0.0, 0.0, 1.0, 0.0]; 4];
        let indices = vec![0, 1, 2, 2, 3, 0];

        Self {
            positions,
            normals,
            colors: vec![WHITE; 4],
            indices,
        }
    }
}

/// The twelve unit-sphere vertices of a regular icosahedron.
fn icosahedron_vertices() -> Vec<Vec3> {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;

    #[rustfmt::skip]
    let raw = [
        Vec3::new(-1.0,  t,  0.0), Vec3::new( 1.0,  t,  0.0),
        Vec3::new(-1.0, -t,  0.0), Vec3::new( 1.0, -t,  0.0),
        Vec3::new( 0.0, -1.0,  t), Vec3::new( 0.0,  1.0,  t),
        Vec3::new( 0.0, -1.0, -t), Vec3::new( 0.0,  1.0, -t),
        Vec3::new( t,  0.0, -1.0), Vec3::new( t,  0.0,  1.0),
        Vec3::new(-t,  0.0, -1.0), Vec3::new(-t,  0.0,  1.0),
    ];

    raw.iter().map(|v| v.normalize()).collect()
}

/// The twenty faces of a regular icosahedron, wound counter-clockwise
/// when viewed from outside.
fn icosahedron_faces() -> Vec<[u32; 3]> {
    #[rustfmt::skip]
    let faces = vec![
        [0, 11, 5],  [0, 5, 1],   [0, 1, 7],   [0, 7, 10],  [0, 10, 11],
        [1, 5, 9],   [5, 11, 4],  [11, 10, 2], [10, 7, 6],  [7, 1, 8],
        [3, 9, 4],   [3, 4, 2],   [3, 2, 6],   [3, 6, 8],   [3, 8, 9],
        [4, 9, 5],   [2, 4, 11],  [6, 2, 10],  [8, 6, 7],   [9, 8, 1],
    ];
    faces
}

/// Returns the index of the normalized midpoint between vertices `a` and
/// `b`, creating it on first use.
///
/// The cache key is the unordered index pair, so both triangles sharing
/// an edge resolve to the same midpoint vertex.
fn midpoint(
    vertices: &mut Vec<Vec3>,
    cache: &mut HashMap<(u32, u32), u32>,
    a: u32,
    b: u32,
) -> u32 {
    let key = if a < b { (a, b) } else { (b, a) };

    if let Some(&index) = cache.get(&key) {
        return index;
    }

    let mid = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalize();
    let index = vertices.len() as u32;
    vertices.push(mid);
    cache.insert(key, index);
    index
}

/// Construction parameters for the built-in shapes.
///
/// Kept by [`GeometryBuffer`] so [`create`](GeometryBuffer::create) can
/// rebuild the mesh from scratch at any time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ShapeDesc {
    Icosphere { center: Vec3, radius: f32, level: u32 },
    Cube { center: Vec3, size: f32 },
    Square { center: Vec3, size: f32 },
}

impl ShapeDesc {
    /// Generates the mesh data described by these parameters.
    pub fn generate(&self) -> MeshData {
        match *self {
            ShapeDesc::Icosphere {
                center,
                radius,
                level,
            } => MeshData::icosphere(center, radius, level),
            ShapeDesc::Cube { center, size } => MeshData::cube(center, size),
            ShapeDesc::Square { center, size } => MeshData::square(center, size),
        }
    }
}

/// GPU buffers for one mesh: one vertex buffer per attribute plus the
/// index buffer.
pub(crate) struct GpuBuffers {
    pub(crate) position: wgpu::Buffer,
    pub(crate) normal: wgpu::Buffer,
    pub(crate) color: wgpu::Buffer,
    pub(crate) index: wgpu::Buffer,
    pub(crate) index_count: u32,
    pub(crate) vertex_count: u32,
}

/// A drawable mesh: construction parameters plus (once
/// [`create`](Self::create) has run) GPU-resident attribute buffers.
///
/// The buffers are owned by this struct and released either by
/// [`destroy`](Self::destroy) or on drop. The renderer borrows them per
/// frame; it never takes ownership.
pub struct GeometryBuffer {
    desc: ShapeDesc,
    buffers: Option<GpuBuffers>,
}

impl GeometryBuffer {
    /// Vertex buffer layout for the position attribute (location 0).
    pub const POSITION_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: 16,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x4,
        }],
    };

    /// Vertex buffer layout for the normal attribute (location 1).
    pub const NORMAL_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: 16,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x4,
        }],
    };

    /// Vertex buffer layout for the color attribute (location 2).
    pub const COLOR_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: 16,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x4,
        }],
    };

    /// An icosphere of the given radius and subdivision level, centered at
    /// `center`. No GPU work happens until [`create`](Self::create).
    pub fn icosphere(center: Vec3, radius: f32, level: u32) -> Self {
        Self {
            desc: ShapeDesc::Icosphere {
                center,
                radius,
                level: level.min(MAX_SUBDIVISION_LEVEL),
            },
            buffers: None,
        }
    }

    /// A cube with edge length `size`, centered at `center`.
    pub fn cube(center: Vec3, size: f32) -> Self {
        Self {
            desc: ShapeDesc::Cube { center, size },
            buffers: None,
        }
    }

    /// A flat square of side `size` in the XY plane, centered at `center`.
    pub fn square(center: Vec3, size: f32) -> Self {
        Self {
            desc: ShapeDesc::Square { center, size },
            buffers: None,
        }
    }

    /// The construction parameters this buffer was built from.
    pub fn desc(&self) -> ShapeDesc {
        self.desc
    }

    /// (Re)generates the mesh from the stored parameters and uploads it.
    ///
    /// Safe to call again after a parameter change or at any time: the
    /// previous buffers are dropped and the mesh is rebuilt in full. There
    /// is no partial-update path.
    pub fn create(&mut self, gpu: &GpuContext) {
        use wgpu::util::DeviceExt;

        let data = self.desc.generate();
        debug_assert_eq!(data.positions.len(), data.normals.len());
        debug_assert_eq!(data.positions.len(), data.colors.len());

        let make = |label: &str, contents: &[u8], usage| {
            gpu.device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(label),
                    contents,
                    usage,
                })
        };

        self.buffers = Some(GpuBuffers {
            position: make(
                "Geometry Position Buffer",
                bytemuck::cast_slice(&data.positions),
                wgpu::BufferUsages::VERTEX,
            ),
            normal: make(
                "Geometry Normal Buffer",
                bytemuck::cast_slice(&data.normals),
                wgpu::BufferUsages::VERTEX,
            ),
            color: make(
                "Geometry Color Buffer",
                bytemuck::cast_slice(&data.colors),
                wgpu::BufferUsages::VERTEX,
            ),
            index: make(
                "Geometry Index Buffer",
                bytemuck::cast_slice(&data.indices),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: data.indices.len() as u32,
            vertex_count: data.positions.len() as u32,
        });
    }

    /// Releases the GPU buffers. The construction parameters are kept, so
    /// [`create`](Self::create) can rebuild later.
    pub fn destroy(&mut self) {
        self.buffers = None;
    }

    /// Whether [`create`](Self::create) has produced GPU buffers.
    pub fn is_created(&self) -> bool {
        self.buffers.is_some()
    }

    /// Vertex count of the uploaded mesh, or 0 before `create`.
    pub fn vertex_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.vertex_count)
    }

    /// Index count of the uploaded mesh, or 0 before `create`.
    pub fn index_count(&self) -> u32 {
        self.buffers.as_ref().map_or(0, |b| b.index_count)
    }

    pub(crate) fn buffers(&self) -> Option<&GpuBuffers> {
        self.buffers.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_icosphere_vertices(level: u32) -> usize {
        12 + 30 * (4usize.pow(level) - 1) / 3
    }

    #[test]
    fn icosphere_vertex_count_follows_recurrence() {
        for level in 0..=4 {
            let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, level);
            assert_eq!(
                mesh.vertex_count(),
                expected_icosphere_vertices(level),
                "level {level}"
            );
            assert_eq!(mesh.triangle_count(), 20 * 4usize.pow(level));
        }
    }

    #[test]
    fn icosphere_level_zero_is_bare_icosahedron() {
        let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, 0);
        assert_eq!(mesh.vertex_count(), 12);
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn icosphere_level_two_scenario() {
        let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, 2);
        assert_eq!(mesh.vertex_count(), 162);
    }

    #[test]
    fn icosphere_vertices_lie_on_the_sphere() {
        let center = Vec3::new(1.0, 2.0, 3.0);
        let radius = 2.5;

        for level in 0..=3 {
            let mesh = MeshData::icosphere(center, radius, level);
            for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
                let pos = Vec3::new(p[0], p[1], p[2]);
                let normal = Vec3::new(n[0], n[1], n[2]);

                assert!(((pos - center).length() - radius).abs() < 1e-4);
                assert!((normal.length() - 1.0).abs() < 1e-5);
                // Normal points radially outward.
                assert!((pos - center).normalize().dot(normal) > 0.9999);
            }
        }
    }

    #[test]
    fn icosphere_triangles_are_valid() {
        for level in 0..=4 {
            let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, level);
            let count = mesh.vertex_count() as u32;

            for tri in mesh.indices.chunks(3) {
                assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
                assert!(tri.iter().all(|&i| i < count));
            }
        }
    }

    #[test]
    fn generators_are_deterministic() {
        let a = MeshData::icosphere(Vec3::new(0.5, 0.0, -1.0), 1.5, 3);
        let b = MeshData::icosphere(Vec3::new(0.5, 0.0, -1.0), 1.5, 3);
        assert_eq!(a, b);

        assert_eq!(MeshData::cube(Vec3::ZERO, 2.0), MeshData::cube(Vec3::ZERO, 2.0));
        assert_eq!(
            MeshData::square(Vec3::ZERO, 2.0),
            MeshData::square(Vec3::ZERO, 2.0)
        );
    }

    #[test]
    fn attribute_arrays_are_parallel() {
        let meshes = [
            MeshData::icosphere(Vec3::ZERO, 1.0, 2),
            MeshData::cube(Vec3::ZERO, 1.0),
            MeshData::square(Vec3::ZERO, 1.0),
        ];

        for mesh in &meshes {
            assert_eq!(mesh.positions.len(), mesh.normals.len());
            assert_eq!(mesh.positions.len(), mesh.colors.len());
            assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertex_count()));
            assert!(mesh.colors.iter().all(|&c| c == WHITE));
        }
    }

    #[test]
    fn homogeneous_components() {
        let mesh = MeshData::icosphere(Vec3::ZERO, 1.0, 1);
        assert!(mesh.positions.iter().all(|p| p[3] == 1.0));
        assert!(mesh.normals.iter().all(|n| n[3] == 0.0));
    }

    #[test]
    fn cube_tables() {
        let center = Vec3::new(1.0, -2.0, 0.5);
        let size = 3.0;
        let mesh = MeshData::cube(center, size);

        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.indices.len(), 36);

        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            // Every corner sits half an edge from the center on each axis.
            for axis in 0..3 {
                let offset = (p[axis] - center[axis]).abs();
                assert!((offset - size * 0.5).abs() < 1e-6);
            }

            // Face normals are unit length and axis aligned.
            let normal = Vec3::new(n[0], n[1], n[2]);
            assert!((normal.length() - 1.0).abs() < 1e-6);
            assert_eq!(
                normal.to_array().iter().filter(|c| c.abs() > 0.5).count(),
                1
            );
        }
    }

    #[test]
    fn square_tables() {
        let mesh = MeshData::square(Vec3::new(0.0, 0.0, -1.0), 2.0);

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 2, 3, 0]);
        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, 1.0, 0.0]));
        assert!(mesh.positions.iter().all(|p| p[2] == -1.0));
    }

    #[test]
    fn shape_desc_round_trips_through_geometry_buffer() {
        let buffer = GeometryBuffer::icosphere(Vec3::ZERO, 1.0, 3);
        assert_eq!(
            buffer.desc(),
            ShapeDesc::Icosphere {
                center: Vec3::ZERO,
                radius: 1.0,
                level: 3
            }
        );
        assert!(!buffer.is_created());
        assert_eq!(buffer.vertex_count(), 0);
        assert_eq!(buffer.index_count(), 0);
    }

    #[test]
    fn geometry_buffer_clamps_subdivision_level() {
        let buffer = GeometryBuffer::icosphere(Vec3::ZERO, 1.0, 99);
        match buffer.desc() {
            ShapeDesc::Icosphere { level, .. } => assert_eq!(level, MAX_SUBDIVISION_LEVEL),
            other => panic!("unexpected desc {other:?}"),
        }
    }
}

//! Scene loading: the geometry the viewer can display.
//!
//! [`Scene`] is the capability object the UI boundary uses to (re)build
//! geometry. It owns the three drawable shapes, remembers which
//! subdivision level the icosphere was last built at, and rebuilds the
//! icosphere synchronously inside the frame tick when the control value
//! changes, so a frame always draws either the old mesh or the fully
//! rebuilt one, never a partial state.

use glam::Vec3;

use crate::controls::{Controls, ShapeKind};
use crate::gpu::GpuContext;
use crate::mesh::GeometryBuffer;

const ICOSPHERE_RADIUS: f32 = 1.0;
const CUBE_SIZE: f32 = 2.0;
const SQUARE_SIZE: f32 = 2.0;

/// The three drawable shapes, all centered at the origin.
pub struct Scene {
    icosphere: GeometryBuffer,
    cube: GeometryBuffer,
    square: GeometryBuffer,
    applied_tessellation: u32,
}

impl Scene {
    /// Builds and uploads all three shapes, the icosphere at the control
    /// snapshot's current subdivision level.
    pub fn load(gpu: &GpuContext, controls: &Controls) -> Self {
        let level = controls.tessellation();

        let mut icosphere = GeometryBuffer::icosphere(Vec3::ZERO, ICOSPHERE_RADIUS, level);
        icosphere.create(gpu);

        let mut cube = GeometryBuffer::cube(Vec3::ZERO, CUBE_SIZE);
        cube.create(gpu);

        let mut square = GeometryBuffer::square(Vec3::ZERO, SQUARE_SIZE);
        square.create(gpu);

        log::info!(
            "scene loaded (icosphere level {level}, {} vertices)",
            icosphere.vertex_count()
        );

        Self {
            icosphere,
            cube,
            square,
            applied_tessellation: level,
        }
    }

    /// Rebuilds the whole scene from scratch. Bound to the reload action
    /// at the UI boundary.
    pub fn reload(&mut self, gpu: &GpuContext, controls: &Controls) {
        *self = Self::load(gpu, controls);
    }

    /// Rebuilds the icosphere if the subdivision control changed since the
    /// mesh was last built.
    ///
    /// Runs inline in the frame tick, before the draw call.
    pub fn sync_tessellation(&mut self, gpu: &GpuContext, controls: &Controls) {
        let level = controls.tessellation();
        if level == self.applied_tessellation {
            return;
        }

        self.icosphere = GeometryBuffer::icosphere(Vec3::ZERO, ICOSPHERE_RADIUS, level);
        self.icosphere.create(gpu);
        self.applied_tessellation = level;

        log::debug!(
            "icosphere rebuilt at level {level} ({} vertices)",
            self.icosphere.vertex_count()
        );
    }

    /// The drawable for the given shape selection.
    pub fn drawable(&self, shape: ShapeKind) -> &GeometryBuffer {
        match shape {
            ShapeKind::Square => &self.square,
            ShapeKind::Icosphere => &self.icosphere,
            ShapeKind::Cube => &self.cube,
        }
    }
}

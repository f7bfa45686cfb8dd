//! Per-frame draw orchestration.
//!
//! [`Renderer`] owns the frame-buffer clear state and the depth
//! attachment, and turns a camera, a shader program, and a list of
//! drawables into one presented frame. It does not own geometry or shader
//! lifetimes (both are borrowed per call) and it makes no promise about
//! GPU binding state after a call returns: the next frame re-binds
//! everything it needs.
//!
//! Per-frame failures (a lost or outdated surface, a timeout) are logged
//! and the frame is skipped; the frame loop itself never halts.

use glam::{Mat4, Vec4};

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::mesh::GeometryBuffer;
use crate::shader::ShaderProgram;

/// Orchestrates clearing and drawing for one surface.
pub struct Renderer {
    clear_color: wgpu::Color,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
}

impl Renderer {
    /// Creates a renderer with a depth buffer sized to the current
    /// surface and a dark-gray clear color.
    pub fn new(gpu: &GpuContext) -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.2,
                g: 0.2,
                b: 0.2,
                a: 1.0,
            },
            depth_view: create_depth_view(gpu),
            depth_size: (gpu.width(), gpu.height()),
        }
    }

    /// Sets the color the frame buffer is cleared to at the start of each
    /// frame.
    pub fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    /// Resizes the surface-backing state: the wgpu surface itself and the
    /// depth attachment.
    pub fn set_size(&mut self, gpu: &mut GpuContext, width: u32, height: u32) {
        gpu.resize(width, height);
        self.ensure_depth_size(gpu);
    }

    /// Recreates the depth texture if the surface size has changed since
    /// it was built.
    fn ensure_depth_size(&mut self, gpu: &GpuContext) {
        if self.depth_size != (gpu.width(), gpu.height()) {
            self.depth_view = create_depth_view(gpu);
            self.depth_size = (gpu.width(), gpu.height());
        }
    }

    /// Presents a frame containing only the clear color.
    pub fn clear(&mut self, gpu: &GpuContext) {
        self.ensure_depth_size(gpu);

        let Some(frame) = self.acquire_frame(gpu) else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Clear Encoder"),
            });

        drop(self.begin_pass(&mut encoder, &view));

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    /// Renders one frame.
    ///
    /// Clears color and depth, activates `program`, binds the
    /// camera-derived view/projection matrices, an identity model matrix,
    /// the tint color, and the elapsed time, then draws each drawable in
    /// list order (no sorting) with one indexed draw call. Drawables whose
    /// buffers were never created are skipped with a warning.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        camera: &Camera,
        program: &ShaderProgram,
        tint: Vec4,
        elapsed_ms: f32,
        drawables: &[&GeometryBuffer],
    ) {
        self.ensure_depth_size(gpu);

        program.set_mat4(gpu, "model", Mat4::IDENTITY);
        program.set_mat4(gpu, "view", camera.view_matrix());
        program.set_mat4(gpu, "proj", camera.projection_matrix());
        program.set_vec4(gpu, "color", tint);
        program.set_f32(gpu, "time", elapsed_ms);

        let Some(frame) = self.acquire_frame(gpu) else {
            return;
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = self.begin_pass(&mut encoder, &view);
            program.use_program(&mut render_pass);

            for drawable in drawables {
                let Some(buffers) = drawable.buffers() else {
                    log::warn!("skipping drawable with no GPU buffers; was create() called?");
                    continue;
                };

                render_pass.set_vertex_buffer(0, buffers.position.slice(..));
                render_pass.set_vertex_buffer(1, buffers.normal.slice(..));
                render_pass.set_vertex_buffer(2, buffers.color.slice(..));
                render_pass.set_index_buffer(buffers.index.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..buffers.index_count, 0, 0..1);
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }

    /// Acquires the next surface texture, recovering from per-frame
    /// surface errors by reconfiguring or skipping.
    fn acquire_frame(&self, gpu: &GpuContext) -> Option<wgpu::SurfaceTexture> {
        match gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring and skipping frame");
                gpu.surface.configure(&gpu.device, &gpu.config);
                None
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory; skipping frame");
                None
            }
            Err(err) => {
                log::warn!("transient surface error ({err}); skipping frame");
                None
            }
        }
    }

    fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        view: &'e wgpu::TextureView,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Facet Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        })
    }
}

/// Creates a depth attachment matching the current surface size. The
/// view keeps the underlying texture alive.
fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
    let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: gpu.width(),
            height: gpu.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

//! Shader program construction and uniform binding.
//!
//! A [`ShaderProgram`] is built from exactly one vertex-stage and one
//! fragment-stage WGSL source, identified by a human-readable pipeline
//! name. Each stage is compiled inside a wgpu validation error scope, so a
//! bad source surfaces as [`ShaderError::Compile`] instead of an
//! uncaptured device error; pipeline creation failures surface as
//! [`ShaderError::Link`]. A program that constructs successfully is
//! immutable: its pipeline state, uniform buffer, and bind group never
//! change afterwards.
//!
//! # Uniform block
//!
//! Both stages see a single uniform block at `@group(0) @binding(0)`:
//!
//! ```wgsl
//! struct SceneUniforms {
//!     model: mat4x4f,
//!     view: mat4x4f,
//!     proj: mat4x4f,
//!     color: vec4f,
//!     time: f32,
//! }
//! ```
//!
//! Uniforms are written by semantic name ([`set_mat4`](ShaderProgram::set_mat4),
//! [`set_vec4`](ShaderProgram::set_vec4), [`set_f32`](ShaderProgram::set_f32)),
//! which map names to byte offsets within the block. Writing a name the
//! block does not have logs a warning and is otherwise ignored, so a
//! caller can bind a superset of what a particular shader consumes.

use glam::{Mat4, Vec4};

use crate::gpu::GpuContext;
use crate::mesh::GeometryBuffer;

/// The two shader stages a program is linked from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStageKind::Vertex => write!(f, "vertex"),
            ShaderStageKind::Fragment => write!(f, "fragment"),
        }
    }
}

/// Errors that can occur while constructing a [`ShaderProgram`].
///
/// Both variants are fatal to the program being built: no partial program
/// is ever produced.
#[derive(Debug)]
pub enum ShaderError {
    /// A stage failed WGSL validation.
    Compile {
        program: String,
        stage: ShaderStageKind,
        message: String,
    },
    /// The stages compiled but the pipeline could not be created.
    Link { program: String, message: String },
}

impl std::fmt::Display for ShaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderError::Compile {
                program,
                stage,
                message,
            } => {
                write!(f, "{stage} stage of '{program}' failed to compile: {message}")
            }
            ShaderError::Link { program, message } => {
                write!(f, "failed to link '{program}': {message}")
            }
        }
    }
}

impl std::error::Error for ShaderError {}

/// CPU mirror of the shader-side uniform block.
///
/// The field order and padding match WGSL std140 layout; the named-setter
/// offset tables below are checked against this struct in the tests.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    /// Object-to-world transform.
    pub model: [[f32; 4]; 4],
    /// World-to-camera transform.
    pub view: [[f32; 4]; 4],
    /// Camera-to-clip transform.
    pub proj: [[f32; 4]; 4],
    /// RGBA tint applied by the shader.
    pub color: [f32; 4],
    /// Elapsed time in milliseconds.
    pub time: f32,
    /// Padding to the 16-byte struct alignment WGSL requires.
    pub _padding: [f32; 3],
}

const UNIFORM_BLOCK_SIZE: u64 = std::mem::size_of::<SceneUniforms>() as u64;

const MAT4_UNIFORMS: &[(&str, u64)] = &[("model", 0), ("view", 64), ("proj", 128)];
const VEC4_UNIFORMS: &[(&str, u64)] = &[("color", 192)];
const F32_UNIFORMS: &[(&str, u64)] = &[("time", 208)];

fn slot_offset(table: &[(&str, u64)], name: &str) -> Option<u64> {
    table
        .iter()
        .find(|(slot, _)| *slot == name)
        .map(|(_, offset)| *offset)
}

/// A linked GPU program: render pipeline, uniform buffer, and bind group.
///
/// Created once at startup per distinct shader pair and destroyed on drop.
/// [`use_program`](Self::use_program) must run before any draw that relies
/// on this program's bindings.
pub struct ShaderProgram {
    name: String,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a render pipeline.
    ///
    /// `name` is a human-readable pipeline name used in labels, logs, and
    /// error messages (e.g. `"Lambert"`). The pipeline renders indexed
    /// triangle lists with depth testing (`Less`, write enabled) against
    /// the surface format, reading the three vertex attribute slots
    /// defined by [`GeometryBuffer`].
    ///
    /// # Errors
    ///
    /// [`ShaderError::Compile`] if either stage fails validation,
    /// [`ShaderError::Link`] if pipeline creation fails. In both cases no
    /// program is produced.
    pub fn new(
        gpu: &GpuContext,
        name: &str,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_stage(gpu, name, ShaderStageKind::Vertex, vertex_src)?;
        let fragment = compile_stage(gpu, name, ShaderStageKind::Fragment, fragment_src)?;

        let device = &gpu.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: UNIFORM_BLOCK_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Uniforms Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Uniforms Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Shader Program Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: Some("vs"),
                buffers: &[
                    GeometryBuffer::POSITION_LAYOUT,
                    GeometryBuffer::NORMAL_LAYOUT,
                    GeometryBuffer::COLOR_LAYOUT,
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: Some("fs"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Two-sided: the flat square stays visible while orbiting
                // behind it.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(ShaderError::Link {
                program: name.to_string(),
                message: err.to_string(),
            });
        }

        log::debug!("linked shader program '{name}'");

        Ok(Self {
            name: name.to_string(),
            pipeline,
            uniform_buffer,
            bind_group,
        })
    }

    /// The human-readable pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Writes a matrix uniform by name (`"model"`, `"view"`, `"proj"`).
    ///
    /// An unknown name is logged and skipped; the draw proceeds without
    /// that binding.
    pub fn set_mat4(&self, gpu: &GpuContext, name: &str, value: Mat4) {
        match slot_offset(MAT4_UNIFORMS, name) {
            Some(offset) => gpu.queue.write_buffer(
                &self.uniform_buffer,
                offset,
                bytemuck::bytes_of(&value.to_cols_array()),
            ),
            None => log::warn!("program '{}' has no mat4 uniform '{name}'", self.name),
        }
    }

    /// Writes a vec4 uniform by name (`"color"`).
    ///
    /// An unknown name is logged and skipped.
    pub fn set_vec4(&self, gpu: &GpuContext, name: &str, value: Vec4) {
        match slot_offset(VEC4_UNIFORMS, name) {
            Some(offset) => gpu.queue.write_buffer(
                &self.uniform_buffer,
                offset,
                bytemuck::bytes_of(&value.to_array()),
            ),
            None => log::warn!("program '{}' has no vec4 uniform '{name}'", self.name),
        }
    }

    /// Writes a float uniform by name (`"time"`).
    ///
    /// An unknown name is logged and skipped.
    pub fn set_f32(&self, gpu: &GpuContext, name: &str, value: f32) {
        match slot_offset(F32_UNIFORMS, name) {
            Some(offset) => {
                gpu.queue
                    .write_buffer(&self.uniform_buffer, offset, bytemuck::bytes_of(&value))
            }
            None => log::warn!("program '{}' has no f32 uniform '{name}'", self.name),
        }
    }

    /// Activates this program on the render pass.
    ///
    /// Must be called before issuing draws that use this program's
    /// uniforms and attribute slots.
    pub fn use_program(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
    }
}

/// Compiles one WGSL stage inside a validation error scope.
fn compile_stage(
    gpu: &GpuContext,
    program: &str,
    stage: ShaderStageKind,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

    let label = format!("{program} {stage} stage");
    let module = gpu
        .device
        .create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

    match pollster::block_on(gpu.device.pop_error_scope()) {
        None => Ok(module),
        Some(err) => Err(ShaderError::Compile {
            program: program.to_string(),
            stage,
            message: err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    #[test]
    fn uniform_block_matches_wgsl_layout() {
        assert_eq!(size_of::<SceneUniforms>() as u64, UNIFORM_BLOCK_SIZE);
        assert_eq!(UNIFORM_BLOCK_SIZE % 16, 0);

        assert_eq!(offset_of!(SceneUniforms, model), 0);
        assert_eq!(offset_of!(SceneUniforms, view), 64);
        assert_eq!(offset_of!(SceneUniforms, proj), 128);
        assert_eq!(offset_of!(SceneUniforms, color), 192);
        assert_eq!(offset_of!(SceneUniforms, time), 208);
    }

    #[test]
    fn offset_tables_agree_with_struct() {
        for (name, offset) in MAT4_UNIFORMS {
            let expected = match *name {
                "model" => offset_of!(SceneUniforms, model),
                "view" => offset_of!(SceneUniforms, view),
                "proj" => offset_of!(SceneUniforms, proj),
                other => panic!("unexpected mat4 slot {other}"),
            };
            assert_eq!(*offset, expected as u64);
        }

        assert_eq!(
            slot_offset(VEC4_UNIFORMS, "color"),
            Some(offset_of!(SceneUniforms, color) as u64)
        );
        assert_eq!(
            slot_offset(F32_UNIFORMS, "time"),
            Some(offset_of!(SceneUniforms, time) as u64)
        );
    }

    #[test]
    fn unknown_slot_names_resolve_to_none() {
        assert_eq!(slot_offset(MAT4_UNIFORMS, "normalMatrix"), None);
        assert_eq!(slot_offset(VEC4_UNIFORMS, "tint"), None);
        assert_eq!(slot_offset(F32_UNIFORMS, ""), None);
    }

    #[test]
    fn stage_kind_display() {
        assert_eq!(ShaderStageKind::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStageKind::Fragment.to_string(), "fragment");
    }

    #[test]
    fn shader_error_display_names_the_program() {
        let err = ShaderError::Compile {
            program: "Lambert".to_string(),
            stage: ShaderStageKind::Fragment,
            message: "unexpected token".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("Lambert"));
        assert!(text.contains("fragment"));
    }
}

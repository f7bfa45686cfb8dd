//! # Facet
//!
//! **An interactive viewer for procedural meshes with live-switchable
//! WGSL shaders.**
//!
//! Facet renders three procedurally generated shapes (an adaptively
//! subdivided icosphere, a cube, and a flat square) through selectable
//! shader programs, with an orbit camera and keyboard-driven live
//! controls for tessellation level, shader, shape, and tint color.
//!
//! ## Quick Start
//!
//! ```no_run
//! use facet::AppConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     facet::init_logging();
//!     facet::run(AppConfig::new().title("Facet").size(1280, 720))
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`GpuContext`] — the explicit wgpu context handed by reference to
//!   everything that touches the GPU; there are no globals.
//! - [`MeshData`] / [`GeometryBuffer`] — deterministic procedural
//!   generators and the per-attribute GPU buffers built from them.
//! - [`Camera`] — look-at view and perspective projection, recomputed on
//!   demand.
//! - [`ShaderProgram`] — a vertex/fragment WGSL pair compiled and linked
//!   into one pipeline; construction fails cleanly on bad sources.
//! - [`Renderer`] — clear state, depth attachment, and the per-frame
//!   draw orchestration.
//! - [`Scene`] and [`Controls`] — the collaborators the frame loop reads
//!   each tick.
//!
//! Geometry is rebuilt synchronously inside the frame tick when the
//! tessellation control changes, so a frame always shows either the old
//! or the fully rebuilt mesh.

mod app;
mod camera;
mod controls;
mod gpu;
mod input;
mod logging;
mod mesh;
mod orbit_camera;
mod renderer;
mod scene;
mod shader;

pub use app::{run, AppConfig};
pub use camera::Camera;
pub use controls::{parse_hex_color, Controls, ShaderKind, ShapeKind};
pub use gpu::GpuContext;
pub use input::Input;
pub use logging::init_logging;
pub use mesh::{GeometryBuffer, MeshData, ShapeDesc, MAX_SUBDIVISION_LEVEL};
pub use orbit_camera::OrbitCamera;
pub use renderer::Renderer;
pub use scene::Scene;
pub use shader::{SceneUniforms, ShaderError, ShaderProgram, ShaderStageKind};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec2, Vec3, Vec4};

// Re-export commonly used winit types for convenience
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

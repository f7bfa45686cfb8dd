//! Window bootstrap and the frame loop.
//!
//! This is the glue around the rendering core: it owns the winit event
//! loop, feeds window events to the input tracker, mutates the
//! [`Controls`] snapshot from the keyboard between frames, and drives
//! [`Renderer::render`] once per display refresh with the elapsed time.
//!
//! # Keys
//!
//! | Key   | Action                         |
//! |-------|--------------------------------|
//! | 0–8   | Set icosphere subdivision level|
//! | S     | Cycle shader program           |
//! | Tab   | Cycle shape                    |
//! | C     | Cycle tint color               |
//! | R     | Reload the scene               |
//!
//! Dragging with the left mouse button orbits the camera; the scroll
//! wheel zooms.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use glam::{Vec3, Vec4};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::KeyCode;
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::controls::{parse_hex_color, Controls, ShaderKind};
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::orbit_camera::OrbitCamera;
use crate::renderer::Renderer;
use crate::scene::Scene;
use crate::shader::ShaderProgram;

const LAMBERT_VERT: &str = include_str!("shaders/lambert.vert.wgsl");
const LAMBERT_FRAG: &str = include_str!("shaders/lambert.frag.wgsl");
const DEFORM_VERT: &str = include_str!("shaders/deform.vert.wgsl");
const DEFORM_FRAG: &str = include_str!("shaders/deform.frag.wgsl");

const TESSELLATION_KEYS: [KeyCode; 9] = [
    KeyCode::Digit0,
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
    KeyCode::Digit6,
    KeyCode::Digit7,
    KeyCode::Digit8,
];

/// Preset tint colors cycled with the C key. The first entry matches the
/// default control value.
const TINT_PALETTE: &[&str] = &[
    "#ffff00", "#ff5533", "#33ccff", "#44ff88", "#ffffff", "#bb66ff",
];

/// Configuration for the viewer window and initial control state.
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub controls: Controls,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Facet".to_string(),
            width: 1280,
            height: 720,
            controls: Controls::default(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn controls(mut self, controls: Controls) -> Self {
        self.controls = controls;
        self
    }
}

/// Runs the viewer until its window is closed.
///
/// # Errors
///
/// Fails if the event loop cannot be created, or if startup
/// initialization (GPU context, shader programs) fails. Per-frame
/// problems never surface here; they are logged and the loop continues.
pub fn run(config: AppConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::Pending {
        config: Some(config),
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app {
        App::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

enum App {
    Pending { config: Option<AppConfig> },
    Running(Box<RunningApp>),
    Failed(anyhow::Error),
}

struct RunningApp {
    window: Arc<Window>,
    base_title: String,
    gpu: GpuContext,
    renderer: Renderer,
    camera: Camera,
    orbit: OrbitCamera,
    input: Input,
    controls: Controls,
    scene: Scene,
    lambert: ShaderProgram,
    deform: ShaderProgram,
    /// Last successfully parsed tint.
    tint: Vec4,
    /// Control string the current `tint` was parsed from.
    applied_tint_source: String,
    palette_index: usize,
    start_time: Instant,
    last_frame: Instant,
    fps_frames: u32,
    fps_timer: f32,
}

impl RunningApp {
    fn init(config: AppConfig, event_loop: &ActiveEventLoop) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("failed to create window")?,
        );

        let gpu = GpuContext::new(window.clone())?;
        let mut renderer = Renderer::new(&gpu);
        renderer.set_clear_color(0.2, 0.2, 0.2, 1.0);

        let orbit = OrbitCamera::new().target(Vec3::ZERO).distance(5.0);
        let mut camera = Camera::new(orbit.eye(), orbit.target);
        camera.set_aspect_ratio(gpu.aspect());
        camera.update_projection_matrix();

        let lambert = ShaderProgram::new(&gpu, "Lambert", LAMBERT_VERT, LAMBERT_FRAG)?;
        let deform = ShaderProgram::new(&gpu, "Deform", DEFORM_VERT, DEFORM_FRAG)?;

        let controls = config.controls;
        let scene = Scene::load(&gpu, &controls);

        let tint = parse_hex_color(&controls.tint_color).unwrap_or_else(|| {
            log::warn!(
                "malformed initial tint {:?}, falling back to white",
                controls.tint_color
            );
            Vec4::ONE
        });
        let applied_tint_source = controls.tint_color.clone();

        let now = Instant::now();
        Ok(Self {
            window,
            base_title: config.title,
            gpu,
            renderer,
            camera,
            orbit,
            input: Input::new(),
            controls,
            scene,
            lambert,
            deform,
            tint,
            applied_tint_source,
            palette_index: 0,
            start_time: now,
            last_frame: now,
            fps_frames: 0,
            fps_timer: 0.0,
        })
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        self.renderer.set_size(&mut self.gpu, width, height);
        self.camera.set_aspect_ratio(self.gpu.aspect());
        self.camera.update_projection_matrix();
    }

    /// Applies this frame's keyboard edits to the control snapshot.
    fn apply_control_keys(&mut self) {
        for (level, key) in TESSELLATION_KEYS.iter().enumerate() {
            if self.input.key_pressed(*key) {
                let applied = self.controls.set_tessellation(level as u32);
                log::info!("tessellation level {applied}");
            }
        }

        if self.input.key_pressed(KeyCode::KeyS) {
            self.controls.shader = self.controls.shader.next();
            log::info!("shader: {}", self.controls.shader.label());
        }

        if self.input.key_pressed(KeyCode::Tab) {
            self.controls.shape = self.controls.shape.next();
            log::info!("shape: {}", self.controls.shape.label());
        }

        if self.input.key_pressed(KeyCode::KeyC) {
            self.palette_index = (self.palette_index + 1) % TINT_PALETTE.len();
            self.controls.tint_color = TINT_PALETTE[self.palette_index].to_string();
            log::info!("tint: {}", self.controls.tint_color);
        }

        if self.input.key_pressed(KeyCode::KeyR) {
            self.scene.reload(&self.gpu, &self.controls);
        }
    }

    /// Re-parses the tint control if it changed, keeping the previous
    /// valid color on malformed input.
    fn sync_tint(&mut self) {
        if self.controls.tint_color == self.applied_tint_source {
            return;
        }

        match parse_hex_color(&self.controls.tint_color) {
            Some(color) => self.tint = color,
            None => log::warn!(
                "ignoring malformed tint color {:?}",
                self.controls.tint_color
            ),
        }
        self.applied_tint_source = self.controls.tint_color.clone();
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        let elapsed_ms = self.start_time.elapsed().as_secs_f32() * 1000.0;

        self.apply_control_keys();

        self.orbit.update(&self.input);
        self.orbit.apply_to(&mut self.camera);
        self.camera.update();

        self.scene.sync_tessellation(&self.gpu, &self.controls);
        self.sync_tint();

        let (program, tint) = match self.controls.shader {
            ShaderKind::Lambert => (&self.lambert, self.tint),
            // The deform fragment stage supplies its own palette.
            ShaderKind::Deform => (&self.deform, Vec4::new(0.0, 0.0, 0.0, 1.0)),
        };
        let drawable = self.scene.drawable(self.controls.shape);

        self.renderer
            .render(&self.gpu, &self.camera, program, tint, elapsed_ms, &[drawable]);

        self.fps_frames += 1;
        self.fps_timer += dt;
        if self.fps_timer >= 1.0 {
            let fps = self.fps_frames as f32 / self.fps_timer;
            self.window.set_title(&format!(
                "{} | {} | {} | {:.0} fps",
                self.base_title,
                self.controls.shader.label(),
                self.controls.shape.label(),
                fps
            ));
            self.fps_frames = 0;
            self.fps_timer = 0.0;
        }

        self.input.begin_frame();
        self.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let App::Pending { config } = self {
            let config = config.take().expect("resumed twice while pending");
            match RunningApp::init(config, event_loop) {
                Ok(running) => {
                    running.window.request_redraw();
                    *self = App::Running(Box::new(running));
                }
                Err(err) => {
                    log::error!("initialization failed: {err:#}");
                    *self = App::Failed(err);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let App::Running(state) = self else {
            return;
        };

        state.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                state.handle_resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                state.tick();
            }
            _ => {}
        }
    }
}

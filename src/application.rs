//! Window, event loop and the per-frame update loop.
//!
//! A [`Project`] supplies the scene through four hooks. [`run`] opens the
//! window, creates the GPU context and renderer, calls
//! [`Project::startup`] and then drives frames until the window closes.
//!
//! # Frame order
//!
//! The frame runs once all pending window and device events have been
//! dispatched:
//! 1. Tick the frame timer and report the FPS every half second
//! 2. Turn the camera by the accumulated mouse motion and scroll
//! 3. Sample the held keys: movement, polygon mode, spot light, quit
//! 4. Run `fixed_update` for every fixed step that is due
//! 5. Run `update` once
//! 6. Sleep if the window is minimised, otherwise draw and present
//!
//! When the window closes (close button or the End key) `shutdown` runs once
//! and the renderer releases its resources.

use std::sync::Arc;

use anyhow::Context;
use instant::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Fullscreen, Window, WindowId},
};

use crate::{
    config::AppConfig,
    context::GpuContext,
    controls::{self, FrameCommands},
    error::EngineError,
    input::Input,
    renderer::Renderer,
    timing::{FixedStep, FrameTimer},
};

/// Where the demo camera starts.
pub const CAMERA_START: [f32; 3] = [0.0, 0.0, 6.0];

/// Hooks a demo implements. Only `startup` is required.
pub trait Project {
    /// Loads shaders, textures and lights. An error ends the program before
    /// the first frame; `shutdown` still runs.
    fn startup(&mut self, ctx: &mut AppContext) -> anyhow::Result<()>;

    /// Called once per frame with the frame time in seconds.
    fn update(&mut self, _ctx: &mut AppContext, _dt: f64) {}

    /// Called at a fixed rate, possibly several times in one frame.
    fn fixed_update(&mut self, _ctx: &mut AppContext, _fixed_dt: f64) {}

    fn shutdown(&mut self) {}
}

/// Everything a [`Project`] hook can reach.
pub struct AppContext {
    pub gpu: GpuContext,
    pub renderer: Renderer,
    pub input: Input,
    pub timer: FrameTimer,
    pub config: AppConfig,
    close_requested: bool,
    /// Whether the cursor is grabbed, so raw mouse motion drives the camera.
    raw_motion: bool,
}

impl AppContext {
    pub fn window(&self) -> &Window {
        &self.gpu.window
    }

    /// Ends the program after the current frame.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    /// Applies mouse and keyboard input to the camera and the demo state.
    fn apply_controls(&mut self, dt: f64) {
        let settings = self.config.controls;
        let camera = &mut self.renderer.camera;

        controls::look(&self.input, camera, &settings, self.raw_motion);
        let translation = controls::movement(&self.input, camera, &settings, dt);
        camera.translate(translation);

        let commands = FrameCommands::sample(&self.input, &settings);
        if let Some(mode) = commands.polygon_mode {
            self.renderer.set_polygon_mode(mode);
        }
        if let Some(spot) = self.renderer.spot_light_mut() {
            commands.apply_to_spot(spot);
        }
        if commands.close {
            self.request_close();
        }
    }
}

struct App<P: Project> {
    async_runtime: tokio::runtime::Runtime,
    project: P,
    config: AppConfig,
    ctx: Option<AppContext>,
    fixed: FixedStep,
    start: Instant,
    error: Option<anyhow::Error>,
    shut_down: bool,
}

impl<P: Project> App<P> {
    fn new(project: P, config: AppConfig) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new().context("Could not start the async runtime")?;
        Ok(Self {
            async_runtime,
            project,
            fixed: FixedStep::new(config.fixed_step, config.max_fixed_steps),
            config,
            ctx: None,
            start: Instant::now(),
            error: None,
            shut_down: false,
        })
    }

    fn window_attributes(&self, event_loop: &ActiveEventLoop) -> winit::window::WindowAttributes {
        let size = PhysicalSize::new(self.config.width, self.config.height);
        let attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size)
            .with_min_inner_size(PhysicalSize::new(self.config.min_size.0, self.config.min_size.1));

        if self.config.fullscreen {
            return attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        match event_loop.primary_monitor() {
            Some(monitor) => {
                let (origin, area) = (monitor.position(), monitor.size());
                let x = origin.x + (area.width as i32 - size.width as i32) / 2;
                let y = origin.y + (area.height as i32 - size.height as i32) / 2;
                attributes.with_position(PhysicalPosition::new(x.max(origin.x), y.max(origin.y)))
            }
            None => attributes,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<AppContext> {
        let window = event_loop
            .create_window(self.window_attributes(event_loop))
            .map_err(|e| EngineError::Window(e.to_string()))?;
        let window = Arc::new(window);

        // Mouse look needs the cursor kept inside the window
        let raw_motion = match window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
        {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Could not grab the cursor, following its position instead: {e}");
                false
            }
        };
        window.set_cursor_visible(false);

        let gpu = self.async_runtime.block_on(GpuContext::new(window))?;
        let mut renderer = Renderer::init(&gpu.device, &gpu.queue, gpu.config.format, gpu.features);
        renderer.camera.set_position(CAMERA_START.into());
        renderer.camera.clear_colour = self.config.clear_colour;
        let (width, height) = gpu.size();
        renderer.resize(width, height);

        let mut ctx = AppContext {
            gpu,
            renderer,
            input: Input::new(),
            timer: FrameTimer::new(),
            config: self.config.clone(),
            close_requested: false,
            raw_motion,
        };
        self.project.startup(&mut ctx).context("Project startup failed")?;
        Ok(ctx)
    }

    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };

        let now = self.start.elapsed().as_secs_f64();
        let (dt, fps) = ctx.timer.tick(now);
        if let Some(fps) = fps {
            log::debug!("FPS: {fps}");
        }

        ctx.apply_controls(dt);

        for _ in 0..self.fixed.accumulate(dt) {
            self.project.fixed_update(ctx, self.fixed.step());
        }
        self.project.update(ctx, dt);
        ctx.input.end_frame();

        if ctx.close_requested() {
            self.exit(event_loop);
            return;
        }

        let size = ctx.gpu.window.inner_size();
        let minimised = ctx.gpu.window.is_minimized().unwrap_or(false) || size.width == 0 || size.height == 0;
        if minimised {
            std::thread::sleep(ctx.config.minimised_sleep);
            return;
        }

        match render(ctx) {
            Ok(_) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => ctx.gpu.reconfigure(),
            Err(e) => log::error!("Unable to render {}", e),
        }
    }

    /// Runs `shutdown` and releases the renderer, each at most once.
    fn teardown(&mut self) {
        if !self.shut_down {
            self.shut_down = true;
            self.project.shutdown();
        }
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.renderer.destroy();
        }
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        self.teardown();
        event_loop.exit();
    }
}

fn render(ctx: &mut AppContext) -> Result<(), wgpu::SurfaceError> {
    let output = ctx.gpu.surface.get_current_texture()?;
    let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = ctx
        .gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Render Encoder"),
        });
    ctx.renderer
        .draw(&mut encoder, &view, &ctx.gpu.depth_view, ctx.timer.time());
    ctx.gpu.queue.submit(std::iter::once(encoder.finish()));
    ctx.gpu.window.pre_present_notify();
    output.present();
    Ok(())
}

impl<P: Project> ApplicationHandler for App<P> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.is_some() || self.shut_down {
            return;
        }
        match self.init(event_loop) {
            Ok(ctx) => self.ctx = Some(ctx),
            Err(e) => {
                log::error!("Initialisation failed: {e:#}");
                self.error = Some(e);
                self.exit(event_loop);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(ctx) = self.ctx.as_mut() else {
            return;
        };
        ctx.input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => self.exit(event_loop),
            WindowEvent::Resized(size) => {
                ctx.gpu.resize(size.width, size.height);
                ctx.renderer.resize(size.width, size.height);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.input.handle_device_event(&event);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.frame(event_loop);
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

/// Opens the window and runs `project` until it is closed.
///
/// Returns the error that stopped initialisation, if any.
pub fn run<P: Project>(project: P, config: AppConfig) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    // Frames are driven from `about_to_wait`, so never wait for events
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(project, config)?;
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

//! Windowed runners for the fluid gradient and the glass effect.
//!
//! Both follow the same winit 0.30 shape: an [`ApplicationHandler`] that
//! creates the window and GPU context on `resumed`, forwards pointer and
//! resize events, and renders one frame per `RedrawRequested`.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::config::FluidConfig;
use crate::error::EffectError;
use crate::glass::{GlassEffect, GlassPointer};
use crate::gpu::{GlassGpu, GpuBackend, GpuContext};
use crate::scheduler::{FrameScheduler, FrameStatus};

/// Builder for the interactive fluid gradient window.
///
/// ```ignore
/// FluidEffect::new()
///     .with_config(FluidConfig::default().with_brush_size(40.0))
///     .with_title("Contact")
///     .run()?;
/// ```
pub struct FluidEffect {
    config: FluidConfig,
    title: String,
    size: (u32, u32),
}

impl FluidEffect {
    pub fn new() -> Self {
        Self {
            config: FluidConfig::default(),
            title: "Fluid Gradient".to_string(),
            size: (1280, 720),
        }
    }

    pub fn with_config(mut self, config: FluidConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Validate the configuration, open the window and run until closed.
    pub fn run(self) -> Result<(), EffectError> {
        self.config.validate()?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = FluidApp {
            effect: self,
            window: None,
            scheduler: None,
            error: None,
            last_title_update: Instant::now(),
        };
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Default for FluidEffect {
    fn default() -> Self {
        Self::new()
    }
}

struct FluidApp {
    effect: FluidEffect,
    window: Option<Arc<Window>>,
    scheduler: Option<FrameScheduler<GpuBackend>>,
    error: Option<EffectError>,
    last_title_update: Instant,
}

impl FluidApp {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EffectError> {
        let (width, height) = self.effect.size;
        let attrs = Window::default_attributes()
            .with_title(self.effect.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(width, height));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = pollster::block_on(GpuContext::new(window.clone()))?;

        let mut scheduler = FrameScheduler::new(GpuBackend::new(context, self.effect.config));
        // Field textures are allocated at the first tick
        let size = window.inner_size();
        scheduler.request_resize(size.width, size.height);

        self.scheduler = Some(scheduler);
        self.window = Some(window);
        Ok(())
    }

    fn update_title(&mut self) {
        let (Some(window), Some(scheduler)) = (&self.window, &self.scheduler) else {
            return;
        };
        if self.last_title_update.elapsed().as_secs_f32() < 1.0 {
            return;
        }
        self.last_title_update = Instant::now();
        window.set_title(&format!("{} - {:.0} fps", self.effect.title, scheduler.time().fps()));
    }
}

impl ApplicationHandler for FluidApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(scheduler) = &mut self.scheduler else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                scheduler.request_resize(size.width, size.height);
            }
            WindowEvent::CursorMoved { .. } => {
                scheduler.pointer_mut().handle_event(&event, Instant::now());
            }
            WindowEvent::RedrawRequested => {
                if scheduler.tick() == FrameStatus::Rendered {
                    self.update_title();
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

impl GlassEffect {
    /// Open a window showing the effect and run until closed.
    pub fn run(self) -> Result<(), EffectError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let pointer = GlassPointer::new(self.params.lerp_factor);
        let mut app = GlassApp {
            effect: self,
            pointer,
            window: None,
            context: None,
            gpu: None,
            error: None,
        };
        event_loop.run_app(&mut app)?;

        match app.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

struct GlassApp {
    effect: GlassEffect,
    pointer: GlassPointer,
    window: Option<Arc<Window>>,
    context: Option<GpuContext>,
    gpu: Option<GlassGpu>,
    error: Option<EffectError>,
}

impl GlassApp {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), EffectError> {
        let attrs = Window::default_attributes()
            .with_title("Fractal Glass")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = pollster::block_on(GpuContext::new(window.clone()))?;
        let gpu = context.scoped(|device| {
            GlassGpu::new(
                device,
                &context.queue,
                context.config.format,
                &self.effect.image,
                self.effect.params,
            )
        })?;

        self.gpu = Some(gpu);
        self.context = Some(context);
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<(), EffectError> {
        let (Some(context), Some(gpu)) = (&mut self.context, &self.gpu) else {
            return Ok(());
        };
        let mouse = self.pointer.update();

        let Some(output) = context.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Glass Encoder"),
            });
        let resolution = [context.config.width as f32, context.config.height as f32];
        gpu.render(&context.queue, &mut encoder, &view, resolution, mouse.to_array());
        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl ApplicationHandler for GlassApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(context) = &mut self.context {
                    context.resize_surface(size.width, size.height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.pointer.set_target(
                        Vec2::new(position.x as f32, position.y as f32),
                        Vec2::new(size.width as f32, size.height as f32),
                    );
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    log::error!("Glass effect stopped: {}", e);
                    self.error = Some(e);
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

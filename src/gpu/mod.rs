//! wgpu backend.
//!
//! [`GpuContext`] owns the surface, device and queue. [`GpuBackend`] runs
//! the simulation pass into a ping-ponged pair of float textures and the
//! compositing pass onto the surface, implementing [`FluidBackend`] so the
//! same [`FrameScheduler`](crate::scheduler::FrameScheduler) drives it.

mod display_gpu;
mod fluid_gpu;
mod glass_gpu;

use std::sync::Arc;

use winit::window::Window;

use crate::backend::{FluidBackend, FrameInputs};
use crate::config::FluidConfig;
use crate::error::GpuError;
use crate::uniforms::{DisplayUniforms, FluidUniforms};

pub use display_gpu::DisplayPassGpu;
pub use fluid_gpu::{FluidFieldGpu, FluidPassGpu};
pub use glass_gpu::GlassGpu;

/// Surface, device and queue for one window.
pub struct GpuContext {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Storage format of the simulation fields.
    pub field_format: wgpu::TextureFormat,
}

impl GpuContext {
    pub async fn new(window: Arc<Window>) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        // Full-precision fields need filterable f32 textures
        let float32_filterable = adapter.features().contains(wgpu::Features::FLOAT32_FILTERABLE);
        let (required_features, field_format) = if float32_filterable {
            (wgpu::Features::FLOAT32_FILTERABLE, wgpu::TextureFormat::Rgba32Float)
        } else {
            (wgpu::Features::empty(), wgpu::TextureFormat::Rgba16Float)
        };
        log::info!("Field format: {:?}", field_format);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Fluid Device"),
                    required_features,
                    required_limits: wgpu::Limits::default().using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Palette values are display-referred, so skip the sRGB encode
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;
        log::info!("Surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            field_format,
        })
    }

    /// Reconfigure the surface. Zero sizes are ignored.
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Reconfigure with the current size, after a lost or outdated surface.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn max_texture_dimension(&self) -> u32 {
        self.device.limits().max_texture_dimension_2d
    }

    /// Acquire the next surface texture.
    ///
    /// Returns `Ok(None)` when the surface had to be reconfigured or timed
    /// out and this frame should be dropped.
    pub fn acquire(&mut self) -> Result<Option<wgpu::SurfaceTexture>, GpuError> {
        match self.surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.reconfigure();
                Ok(None)
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                Err(GpuError::Allocation("out of memory acquiring surface texture".into()))
            }
            Err(e) => {
                log::warn!("Dropped frame: {}", e);
                Ok(None)
            }
        }
    }

    /// Run `f` and turn any allocation or validation error it raised into
    /// a [`GpuError::Allocation`].
    pub fn scoped<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> Result<T, GpuError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        match oom.or(validation) {
            Some(e) => Err(GpuError::Allocation(e.to_string())),
            None => Ok(value),
        }
    }
}

/// Build a pipeline that draws one fullscreen triangle with `fragment`.
pub(crate) fn create_fullscreen_pipeline(
    device: &wgpu::Device,
    label: &str,
    fragment: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    target_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(crate::shaders::module_source(fragment).into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Layout shared by every pass: texture, sampler, uniform block.
pub(crate) fn create_texture_bind_group_layout(device: &wgpu::Device, label: &str) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
        ],
    })
}

pub(crate) fn create_texture_bind_group(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    view: &wgpu::TextureView,
    sampler: &wgpu::Sampler,
    uniforms: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniforms.as_entire_binding(),
            },
        ],
    })
}

/// Both passes on the GPU, compositing straight to the window surface.
pub struct GpuBackend {
    context: GpuContext,
    config: FluidConfig,
    fluid: FluidPassGpu,
    fields: Option<FluidFieldGpu>,
    display: DisplayPassGpu,
    width: u32,
    height: u32,
}

impl GpuBackend {
    /// Build pipelines. Field textures are allocated by the first
    /// [`FluidBackend::resize`].
    pub fn new(context: GpuContext, config: FluidConfig) -> Self {
        let fluid = FluidPassGpu::new(&context.device, context.field_format);
        let display = DisplayPassGpu::new(&context.device, context.config.format);
        Self {
            context,
            config,
            fluid,
            fields: None,
            display,
            width: 0,
            height: 0,
        }
    }

    pub fn context(&self) -> &GpuContext {
        &self.context
    }
}

impl FluidBackend for GpuBackend {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), GpuError> {
        let max = self.context.max_texture_dimension();
        if width > max || height > max {
            return Err(GpuError::TooLarge { width, height, max });
        }

        self.context.resize_surface(width, height);
        // Drop the old pair first so its memory can be reused
        self.fields = None;
        let fluid = &self.fluid;
        let fields = self
            .context
            .scoped(|device| fluid.create_fields(device, width, height))??;
        self.display.rebind(&self.context.device, &fields);
        self.fields = Some(fields);
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn simulate(&mut self, inputs: &FrameInputs) -> Result<(), GpuError> {
        let Some(fields) = &self.fields else {
            return Ok(());
        };
        let uniforms = FluidUniforms::new(self.width, self.height, inputs, &self.config.simulation);
        self.context
            .queue
            .write_buffer(&self.fluid.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fluid Encoder"),
            });
        self.fluid.encode(&mut encoder, fields);
        self.context.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn composite(&mut self, inputs: &FrameInputs) -> Result<(), GpuError> {
        let Some(fields) = &self.fields else {
            return Ok(());
        };
        let Some(output) = self.context.acquire()? else {
            return Ok(());
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let uniforms = DisplayUniforms::new(self.width, self.height, inputs.time, &self.config.display);
        self.context
            .queue
            .write_buffer(self.display.uniform_buffer(), 0, bytemuck::bytes_of(&uniforms));

        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Display Encoder"),
            });
        self.display.encode(&mut encoder, &view, fields.back_is_b());
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn swap(&mut self) {
        if let Some(fields) = &mut self.fields {
            fields.swap();
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

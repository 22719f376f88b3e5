//! Ping-ponged field textures and the simulation pipeline.

use crate::error::GpuError;
use crate::shaders::FLUID_FRAGMENT;
use crate::uniforms::FluidUniforms;

use super::{create_fullscreen_pipeline, create_texture_bind_group, create_texture_bind_group_layout};

/// Size-independent resources of the simulation pass.
pub struct FluidPassGpu {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    /// Linear filtering with repeat addressing, so sampling wraps.
    pub sampler: wgpu::Sampler,
    pub uniform_buffer: wgpu::Buffer,
    pub format: wgpu::TextureFormat,
}

impl FluidPassGpu {
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = create_texture_bind_group_layout(device, "Fluid Bind Group Layout");
        let pipeline = create_fullscreen_pipeline(device, "Fluid Pipeline", FLUID_FRAGMENT, &bind_group_layout, format);

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Field Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Fluid Uniform Buffer"),
            size: std::mem::size_of::<FluidUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            format,
        }
    }

    /// Allocate a cleared field pair at the given size.
    pub fn create_fields(&self, device: &wgpu::Device, width: u32, height: u32) -> Result<FluidFieldGpu, GpuError> {
        if width == 0 || height == 0 {
            return Err(GpuError::Allocation(format!("empty field {}x{}", width, height)));
        }
        let texture_a = create_field_texture(device, "Field Texture A", self.format, width, height);
        let texture_b = create_field_texture(device, "Field Texture B", self.format, width, height);
        let view_a = texture_a.create_view(&wgpu::TextureViewDescriptor::default());
        let view_b = texture_b.create_view(&wgpu::TextureViewDescriptor::default());

        let read_a = create_texture_bind_group(
            device,
            "Fluid Bind Group (read A)",
            &self.bind_group_layout,
            &view_a,
            &self.sampler,
            &self.uniform_buffer,
        );
        let read_b = create_texture_bind_group(
            device,
            "Fluid Bind Group (read B)",
            &self.bind_group_layout,
            &view_b,
            &self.sampler,
            &self.uniform_buffer,
        );

        Ok(FluidFieldGpu {
            texture_a,
            texture_b,
            view_a,
            view_b,
            read_a,
            read_b,
            front_is_b: false,
            width,
            height,
        })
    }

    /// Record the simulation pass: front texture -> back texture.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, fields: &FluidFieldGpu) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Fluid Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: fields.back_view(),
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, fields.front_bind_group(), &[]);
        pass.draw(0..3, 0..1);
    }
}

/// Two field textures of one size with swappable roles.
pub struct FluidFieldGpu {
    pub texture_a: wgpu::Texture,
    pub texture_b: wgpu::Texture,
    pub view_a: wgpu::TextureView,
    pub view_b: wgpu::TextureView,
    /// Bind group sampling texture A.
    read_a: wgpu::BindGroup,
    /// Bind group sampling texture B.
    read_b: wgpu::BindGroup,
    /// Which texture holds the last completed frame (false = A, true = B)
    front_is_b: bool,
    pub width: u32,
    pub height: u32,
}

impl FluidFieldGpu {
    pub fn front_bind_group(&self) -> &wgpu::BindGroup {
        if self.front_is_b {
            &self.read_b
        } else {
            &self.read_a
        }
    }

    pub fn back_view(&self) -> &wgpu::TextureView {
        if self.front_is_b {
            &self.view_a
        } else {
            &self.view_b
        }
    }

    /// Whether texture B is the current write target.
    pub fn back_is_b(&self) -> bool {
        !self.front_is_b
    }

    pub fn swap(&mut self) {
        self.front_is_b = !self.front_is_b;
    }
}

fn create_field_texture(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    })
}

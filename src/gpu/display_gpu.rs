//! Compositing pipeline: field texture -> surface.

use crate::shaders::DISPLAY_FRAGMENT;
use crate::uniforms::DisplayUniforms;

use super::fluid_gpu::FluidFieldGpu;
use super::{create_fullscreen_pipeline, create_texture_bind_group, create_texture_bind_group_layout};

pub struct DisplayPassGpu {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    uniform_buffer: wgpu::Buffer,
    /// Bind groups reading texture A and B. Rebuilt whenever the field
    /// textures are reallocated.
    bind_groups: Option<[wgpu::BindGroup; 2]>,
}

impl DisplayPassGpu {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let bind_group_layout = create_texture_bind_group_layout(device, "Display Bind Group Layout");
        let pipeline = create_fullscreen_pipeline(
            device,
            "Display Pipeline",
            DISPLAY_FRAGMENT,
            &bind_group_layout,
            surface_format,
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Display Field Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Display Uniform Buffer"),
            size: std::mem::size_of::<DisplayUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            pipeline,
            bind_group_layout,
            sampler,
            uniform_buffer,
            bind_groups: None,
        }
    }

    pub fn uniform_buffer(&self) -> &wgpu::Buffer {
        &self.uniform_buffer
    }

    /// Point the bind groups at a newly allocated field pair.
    pub fn rebind(&mut self, device: &wgpu::Device, fields: &FluidFieldGpu) {
        let read_a = create_texture_bind_group(
            device,
            "Display Bind Group (A)",
            &self.bind_group_layout,
            &fields.view_a,
            &self.sampler,
            &self.uniform_buffer,
        );
        let read_b = create_texture_bind_group(
            device,
            "Display Bind Group (B)",
            &self.bind_group_layout,
            &fields.view_b,
            &self.sampler,
            &self.uniform_buffer,
        );
        self.bind_groups = Some([read_a, read_b]);
    }

    /// Record the compositing pass, reading the texture just written.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, target: &wgpu::TextureView, read_b: bool) {
        let Some(bind_groups) = &self.bind_groups else {
            return;
        };

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Display Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &bind_groups[read_b as usize], &[]);
        pass.draw(0..3, 0..1);
    }
}

//! Uniform blocks shared with the WGSL passes.
//!
//! Every struct here is `#[repr(C)]` + `Pod` and laid out to match the
//! corresponding `struct` in [`crate::shaders`] under WGSL uniform layout
//! rules. All fields are 4-byte scalars or arrays of them, padded to a
//! multiple of 16 bytes.

use bytemuck::{Pod, Zeroable};

use crate::backend::FrameInputs;
use crate::config::{DisplayParams, SimulationParams};
use crate::glass::GlassParams;

/// Uniforms for the simulation pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct FluidUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub frame: u32,
    /// Current pointer position (xy) and previous position (zw).
    pub mouse: [f32; 4],
    pub brush_size: f32,
    pub brush_strength: f32,
    pub fluid_decay: f32,
    pub trail_length: f32,
    pub stop_decay: f32,
    /// 1 when the pointer forces this frame, else 0.
    pub pointer_active: u32,
    pub _pad: [f32; 2],
}

impl FluidUniforms {
    pub fn new(width: u32, height: u32, inputs: &FrameInputs, params: &SimulationParams) -> Self {
        let (mouse, pointer_active) = match inputs.pointer {
            Some(p) => ([p.position.x, p.position.y, p.previous.x, p.previous.y], 1),
            None => ([0.0; 4], 0),
        };
        Self {
            resolution: [width as f32, height as f32],
            time: inputs.time,
            // The shader only distinguishes frame 0 from the rest
            frame: inputs.frame.min(u32::MAX as u64) as u32,
            mouse,
            brush_size: params.brush_size,
            brush_strength: params.brush_strength,
            fluid_decay: params.fluid_decay,
            trail_length: params.trail_length,
            stop_decay: params.stop_decay,
            pointer_active,
            _pad: [0.0; 2],
        }
    }
}

/// Uniforms for the compositing pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DisplayUniforms {
    pub resolution: [f32; 2],
    pub time: f32,
    pub distortion: f32,
    /// Palette stops as rgb + unused w.
    pub color1: [f32; 4],
    pub color2: [f32; 4],
    pub color3: [f32; 4],
    pub color4: [f32; 4],
    pub intensity: f32,
    pub softness: f32,
    pub _pad: [f32; 2],
}

impl DisplayUniforms {
    pub fn new(width: u32, height: u32, time: f32, params: &DisplayParams) -> Self {
        let c = params.colors.map(|c| c.extend(1.0).to_array());
        Self {
            resolution: [width as f32, height as f32],
            time,
            distortion: params.distortion_amount,
            color1: c[0],
            color2: c[1],
            color3: c[2],
            color4: c[3],
            intensity: params.color_intensity,
            softness: params.softness,
            _pad: [0.0; 2],
        }
    }
}

/// Uniforms for the fractal glass pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct GlassUniforms {
    pub resolution: [f32; 2],
    pub texture_size: [f32; 2],
    pub mouse: [f32; 2],
    pub parallax_strength: f32,
    pub distortion_multiplier: f32,
    pub glass_strength: f32,
    pub stripes_frequency: f32,
    pub glass_smoothness: f32,
    pub edge_padding: f32,
}

impl GlassUniforms {
    pub fn new(resolution: [f32; 2], texture_size: [f32; 2], mouse: [f32; 2], params: &GlassParams) -> Self {
        Self {
            resolution,
            texture_size,
            mouse,
            parallax_strength: params.parallax_strength,
            distortion_multiplier: params.distortion_multiplier,
            glass_strength: params.glass_strength,
            stripes_frequency: params.stripes_frequency,
            glass_smoothness: params.glass_smoothness,
            edge_padding: params.edge_padding,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerSample;
    use glam::Vec2;

    #[test]
    fn test_sizes_are_16_byte_multiples() {
        assert_eq!(std::mem::size_of::<FluidUniforms>(), 64);
        assert_eq!(std::mem::size_of::<DisplayUniforms>(), 96);
        assert_eq!(std::mem::size_of::<GlassUniforms>(), 48);
    }

    #[test]
    fn test_fluid_uniforms_pointer_flag() {
        let params = SimulationParams::default();
        let idle = FrameInputs { frame: 5, time: 1.0, pointer: None };
        assert_eq!(FluidUniforms::new(10, 10, &idle, &params).pointer_active, 0);

        let active = FrameInputs {
            frame: 5,
            time: 1.0,
            pointer: Some(PointerSample { position: Vec2::new(4.0, 3.0), previous: Vec2::new(1.0, 2.0) }),
        };
        let u = FluidUniforms::new(10, 10, &active, &params);
        assert_eq!(u.pointer_active, 1);
        assert_eq!(u.mouse, [4.0, 3.0, 1.0, 2.0]);
    }
}

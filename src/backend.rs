//! Execution backends for the two passes.
//!
//! The scheduler drives a [`FluidBackend`] and does not care where the
//! passes run. [`CpuBackend`] runs them with rayon on host memory and is
//! what tests and headless renders use; the GPU backend lives in
//! [`crate::gpu`].

use glam::Vec3;

use crate::advect::{self, PassInputs};
use crate::composite;
use crate::config::FluidConfig;
use crate::error::GpuError;
use crate::field::FieldPair;
use crate::input::PointerSample;

/// Per-frame values shared by both passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInputs {
    /// Frames since the last reset.
    pub frame: u64,
    /// Elapsed seconds, drives the gradient animation.
    pub time: f32,
    pub pointer: Option<PointerSample>,
}

/// Something that can run the simulation and compositing passes.
pub trait FluidBackend {
    /// Reallocate the field pair and output. Contents are cleared.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), GpuError>;

    /// Read the front field, write the back field.
    fn simulate(&mut self, inputs: &FrameInputs) -> Result<(), GpuError>;

    /// Composite the back field (the one just written) to the output.
    fn composite(&mut self, inputs: &FrameInputs) -> Result<(), GpuError>;

    /// Flip front and back roles.
    fn swap(&mut self);

    /// Current field dimensions.
    fn size(&self) -> (u32, u32);
}

/// Both passes on the CPU.
pub struct CpuBackend {
    config: FluidConfig,
    fields: FieldPair,
    frame: Vec<Vec3>,
}

impl CpuBackend {
    pub fn new(config: FluidConfig, width: u32, height: u32) -> Self {
        Self {
            config,
            fields: FieldPair::new(width, height),
            frame: vec![Vec3::ZERO; width as usize * height as usize],
        }
    }

    pub fn config(&self) -> &FluidConfig {
        &self.config
    }

    pub fn fields(&self) -> &FieldPair {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FieldPair {
        &mut self.fields
    }

    /// Last composited frame, row-major from the bottom row.
    pub fn frame(&self) -> &[Vec3] {
        &self.frame
    }

    /// Last composited frame as an 8-bit image (top row first).
    pub fn to_image(&self) -> image::RgbImage {
        let (width, height) = self.size();
        image::RgbImage::from_fn(width, height, |x, y| {
            let row = (height - 1 - y) as usize;
            let c = self.frame[row * width as usize + x as usize];
            let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8;
            image::Rgb([to_u8(c.x), to_u8(c.y), to_u8(c.z)])
        })
    }
}

impl FluidBackend for CpuBackend {
    fn resize(&mut self, width: u32, height: u32) -> Result<(), GpuError> {
        self.fields.resize(width, height);
        self.frame = vec![Vec3::ZERO; width as usize * height as usize];
        Ok(())
    }

    fn simulate(&mut self, inputs: &FrameInputs) -> Result<(), GpuError> {
        let pass = PassInputs {
            params: &self.config.simulation,
            frame: inputs.frame,
            pointer: inputs.pointer,
        };
        let (front, back) = self.fields.split();
        advect::simulate(front, back, &pass);
        Ok(())
    }

    fn composite(&mut self, inputs: &FrameInputs) -> Result<(), GpuError> {
        composite::composite(self.fields.back(), inputs.time, &self.config.display, &mut self.frame);
        Ok(())
    }

    fn swap(&mut self) {
        self.fields.swap();
    }

    fn size(&self) -> (u32, u32) {
        (self.fields.width(), self.fields.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_reallocates_frame() {
        let mut backend = CpuBackend::new(FluidConfig::default(), 4, 4);
        backend.resize(8, 2).unwrap();
        assert_eq!(backend.size(), (8, 2));
        assert_eq!(backend.frame().len(), 16);
    }

    #[test]
    fn test_image_rows_are_flipped() {
        let mut backend = CpuBackend::new(FluidConfig::default(), 2, 2);
        // Bottom-left pixel in field space
        backend.frame[0] = Vec3::ONE;
        let img = backend.to_image();
        assert_eq!(img.get_pixel(0, 1).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0]);
    }
}

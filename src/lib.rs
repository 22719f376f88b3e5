//! # fluid-gradient
//!
//! A pointer-driven fluid simulation rendered as an animated colour gradient.
//!
//! Every frame runs two passes over a full-resolution field of `Vec4` cells:
//!
//! 1. **Simulation**: semi-Lagrangian advection, neighbour relaxation, an
//!    area-based divergence correction, a pressure-like push and pointer
//!    forcing. Reads the front field, writes the back field.
//! 2. **Compositing**: the field's velocity displaces an animated
//!    interference pattern that mixes a four-colour palette.
//!
//! The two fields then swap roles. Both passes exist on the GPU (wgpu) and
//! on the CPU (rayon); the [`FrameScheduler`] drives either through the
//! [`FluidBackend`] trait.
//!
//! ## Quick Start
//!
//! ```ignore
//! use fluid_gradient::prelude::*;
//!
//! fn main() -> Result<(), EffectError> {
//!     FluidEffect::new()
//!         .with_config(FluidConfig::default().with_brush_size(40.0))
//!         .run()
//! }
//! ```
//!
//! ## Headless
//!
//! ```ignore
//! let mut scheduler = FrameScheduler::new(CpuBackend::new(FluidConfig::default(), 320, 180));
//! for _ in 0..120 {
//!     scheduler.tick();
//! }
//! scheduler.backend().to_image().save("gradient.png")?;
//! ```
//!
//! ## Coordinates
//!
//! Field and pointer coordinates have their origin at the bottom-left, in
//! pixels. [`PointerTracker`] flips screen coordinates on the way in and
//! [`CpuBackend::to_image`] flips rows on the way out.
//!
//! ## Fractal Glass
//!
//! [`GlassEffect`] is a companion effect: a still image seen through fluted
//! glass with pointer parallax.

pub mod advect;
pub mod backend;
pub mod composite;
pub mod config;
pub mod error;
pub mod field;
pub mod glass;
pub mod gpu;
pub mod input;
pub mod scheduler;
pub mod shaders;
pub mod time;
pub mod uniforms;
mod window;

pub use glam::{Vec2, Vec3, Vec4};

pub use backend::{CpuBackend, FluidBackend, FrameInputs};
pub use config::{parse_hex_color, DisplayParams, FluidConfig, SimulationParams};
pub use error::{ConfigError, EffectError, GpuError, TextureError};
pub use field::{Buffer, Field, FieldPair};
pub use glass::{GlassEffect, GlassParams, GlassPointer};
pub use gpu::GpuBackend;
pub use input::{CanvasRect, PointerSample, PointerSnapshot, PointerTracker};
pub use scheduler::{FrameScheduler, FrameStatus, Phase};
pub use time::Time;
pub use window::FluidEffect;

/// Everything needed to run or embed the effect.
pub mod prelude {
    pub use crate::backend::{CpuBackend, FluidBackend, FrameInputs};
    pub use crate::config::{DisplayParams, FluidConfig, SimulationParams};
    pub use crate::error::{ConfigError, EffectError, GpuError, TextureError};
    pub use crate::field::{Field, FieldPair};
    pub use crate::glass::{GlassEffect, GlassParams};
    pub use crate::gpu::GpuBackend;
    pub use crate::input::{CanvasRect, PointerTracker};
    pub use crate::scheduler::{FrameScheduler, FrameStatus, Phase};
    pub use crate::time::Time;
    pub use crate::window::FluidEffect;
    pub use crate::{Vec2, Vec3, Vec4};
}

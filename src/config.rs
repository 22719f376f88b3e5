//! Tunable parameters for the simulation and compositing passes.
//!
//! Parameters are set once when the effect is constructed and are never
//! hot-reloaded. Use the builder methods to override the defaults:
//!
//! ```ignore
//! let config = FluidConfig::default()
//!     .with_brush_size(40.0)
//!     .with_fluid_decay(0.97)
//!     .with_colors(["#000000", "#ff0080", "#00ffcc", "#ffffff"])?;
//! config.validate()?;
//! ```

use glam::Vec3;

use crate::error::ConfigError;

/// Parameters consumed by the simulation (advection) pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParams {
    /// Radius scale of the pointer brush. Larger values widen the falloff.
    pub brush_size: f32,
    /// Strength of velocity and activity injected by the pointer.
    pub brush_strength: f32,
    /// Per-frame retention of the velocity channels, in (0, 1].
    pub fluid_decay: f32,
    /// Per-frame retention of the scalar trail channel, in (0, 1].
    pub trail_length: f32,
    /// Extra decay applied around a pointer that is present but not moving.
    pub stop_decay: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            brush_size: 25.0,
            brush_strength: 0.5,
            fluid_decay: 0.98,
            trail_length: 0.8,
            stop_decay: 0.85,
        }
    }
}

/// Parameters consumed by the compositing (display) pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayParams {
    /// How far the field's velocity displaces the gradient lookup.
    pub distortion_amount: f32,
    /// Palette stops, mixed in order.
    pub colors: [Vec3; 4],
    /// Final brightness multiplier.
    pub color_intensity: f32,
    /// Pulls the mixing weights toward 0.5, reducing banding.
    pub softness: f32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            distortion_amount: 2.5,
            colors: [
                rgb8(0xb8, 0xff, 0xf7),
                rgb8(0x6e, 0x34, 0x66),
                rgb8(0x01, 0x33, 0xff),
                rgb8(0x66, 0xd1, 0xfe),
            ],
            color_intensity: 1.0,
            softness: 1.0,
        }
    }
}

/// Full configuration surface of the fluid gradient.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FluidConfig {
    pub simulation: SimulationParams,
    pub display: DisplayParams,
}

impl FluidConfig {
    pub fn with_brush_size(mut self, size: f32) -> Self {
        self.simulation.brush_size = size;
        self
    }

    pub fn with_brush_strength(mut self, strength: f32) -> Self {
        self.simulation.brush_strength = strength;
        self
    }

    pub fn with_fluid_decay(mut self, decay: f32) -> Self {
        self.simulation.fluid_decay = decay;
        self
    }

    pub fn with_trail_length(mut self, retention: f32) -> Self {
        self.simulation.trail_length = retention;
        self
    }

    pub fn with_stop_decay(mut self, decay: f32) -> Self {
        self.simulation.stop_decay = decay;
        self
    }

    pub fn with_distortion(mut self, amount: f32) -> Self {
        self.display.distortion_amount = amount;
        self
    }

    pub fn with_color_intensity(mut self, intensity: f32) -> Self {
        self.display.color_intensity = intensity;
        self
    }

    pub fn with_softness(mut self, softness: f32) -> Self {
        self.display.softness = softness;
        self
    }

    /// Replace the palette from `#rrggbb` strings.
    pub fn with_colors(mut self, hex: [&str; 4]) -> Result<Self, ConfigError> {
        for (slot, s) in self.display.colors.iter_mut().zip(hex) {
            *slot = parse_hex_color(s)?;
        }
        Ok(self)
    }

    /// Check every parameter against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.simulation;
        let d = &self.display;
        positive("brush_size", s.brush_size)?;
        positive("brush_strength", s.brush_strength)?;
        unit_interval("fluid_decay", s.fluid_decay)?;
        unit_interval("trail_length", s.trail_length)?;
        unit_interval("stop_decay", s.stop_decay)?;
        non_negative("distortion_amount", d.distortion_amount)?;
        non_negative("color_intensity", d.color_intensity)?;
        non_negative("softness", d.softness)?;
        Ok(())
    }
}

/// Parse a `#rrggbb` colour into 0-1 components.
///
/// Each byte is divided by 255 with no gamma conversion.
pub fn parse_hex_color(s: &str) -> Result<Vec3, ConfigError> {
    let invalid = || ConfigError::InvalidColor(s.to_string());
    let digits = s.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
    Ok(rgb8(channel(0)?, channel(2)?, channel(4)?))
}

fn rgb8(r: u8, g: u8, b: u8) -> Vec3 {
    Vec3::new(r as f32, g as f32, b as f32) / 255.0
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, expected: "> 0" })
    }
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, expected: ">= 0" })
    }
}

fn unit_interval(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { name, value, expected: "in (0, 1]" })
    }
}

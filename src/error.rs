//! Error types for the fluid gradient.
//!
//! This module provides error types for GPU initialization, texture loading,
//! configuration validation and the windowed runners.

use std::fmt;

/// Errors that can occur during GPU initialization or render-target allocation.
#[derive(Debug)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    DeviceCreation(wgpu::RequestDeviceError),
    /// The device rejected a texture or buffer allocation.
    Allocation(String),
    /// Requested render-target size exceeds the device limit.
    TooLarge { width: u32, height: u32, max: u32 },
}

impl fmt::Display for GpuError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpuError::SurfaceCreation(e) => write!(f, "Failed to create GPU surface: {}", e),
            GpuError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            GpuError::DeviceCreation(e) => write!(f, "Failed to create GPU device: {}", e),
            GpuError::Allocation(msg) => write!(f, "GPU allocation failed: {}", msg),
            GpuError::TooLarge { width, height, max } => write!(
                f,
                "Render target {}x{} exceeds the device limit of {} pixels per side",
                width, height, max
            ),
        }
    }
}

impl std::error::Error for GpuError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GpuError::SurfaceCreation(e) => Some(e),
            GpuError::DeviceCreation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        GpuError::SurfaceCreation(e)
    }
}

impl From<wgpu::RequestDeviceError> for GpuError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        GpuError::DeviceCreation(e)
    }
}

/// Errors that can occur while loading or saving images.
#[derive(Debug)]
pub enum TextureError {
    /// Failed to decode or encode an image.
    Image(image::ImageError),
    /// Failed to read or write a file.
    Io(std::io::Error),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Image(e) => write!(f, "Image error: {}", e),
            TextureError::Io(e) => write!(f, "Failed to access image file: {}", e),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Image(e) => Some(e),
            TextureError::Io(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Image(e)
    }
}

impl From<std::io::Error> for TextureError {
    fn from(e: std::io::Error) -> Self {
        TextureError::Io(e)
    }
}

/// Invalid configuration values.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A numeric parameter is outside its allowed range.
    OutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
    /// A colour string is not of the form `#rrggbb`.
    InvalidColor(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::OutOfRange { name, value, expected } => {
                write!(f, "{} = {} is out of range (expected {})", name, value, expected)
            }
            ConfigError::InvalidColor(s) => write!(f, "Invalid colour '{}', expected #rrggbb", s),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors that can occur when running an effect.
#[derive(Debug)]
pub enum EffectError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// GPU initialization or allocation failed.
    Gpu(GpuError),
    /// Image loading or saving failed.
    Texture(TextureError),
    /// Configuration was rejected.
    Config(ConfigError),
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            EffectError::Window(e) => write!(f, "Failed to create window: {}", e),
            EffectError::Gpu(e) => write!(f, "GPU error: {}", e),
            EffectError::Texture(e) => write!(f, "Texture error: {}", e),
            EffectError::Config(e) => write!(f, "Configuration error: {}", e),
        }
    }
}

impl std::error::Error for EffectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EffectError::EventLoop(e) => Some(e),
            EffectError::Window(e) => Some(e),
            EffectError::Gpu(e) => Some(e),
            EffectError::Texture(e) => Some(e),
            EffectError::Config(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for EffectError {
    fn from(e: winit::error::EventLoopError) -> Self {
        EffectError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for EffectError {
    fn from(e: winit::error::OsError) -> Self {
        EffectError::Window(e)
    }
}

impl From<GpuError> for EffectError {
    fn from(e: GpuError) -> Self {
        EffectError::Gpu(e)
    }
}

impl From<TextureError> for EffectError {
    fn from(e: TextureError) -> Self {
        EffectError::Texture(e)
    }
}

impl From<ConfigError> for EffectError {
    fn from(e: ConfigError) -> Self {
        EffectError::Config(e)
    }
}

//! Error types for glimmer.
//!
//! Configuration ingestion, GPU initialization and the viewer host each have
//! their own error enum. Range violations and unknown archetypes are *not*
//! errors: ingestion normalizes them (see [`crate::config`]).

use thiserror::Error;

/// Errors that can occur while ingesting or exporting a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required top-level field is absent (or `null`).
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// The document is valid JSON but not a JSON object.
    #[error("Configuration must be a JSON object")]
    NotAnObject,
    /// Generator output contained no `{ ... }` span to parse.
    #[error("No JSON object found in generator response")]
    NoJsonObject,
    /// A color string that is not `#RRGGBB`.
    #[error("Invalid color '{0}': expected \"#RRGGBB\" or an [r, g, b] triple")]
    InvalidColor(String),
    /// Malformed JSON or a field of the wrong type.
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to read or write a configuration file.
    #[error("Failed to access configuration file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during GPU initialization.
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("Failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support.")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("Failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The adapter reports no usable format or alpha mode for the surface.
    #[error("Surface is not supported by the selected adapter")]
    UnsupportedSurface,
}

/// Errors that can occur when running the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Failed to create event loop.
    #[error("Failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The startup configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_names_the_field() {
        let err = ConfigError::MissingField("physics");
        assert_eq!(err.to_string(), "Missing required field: physics");
    }

    #[test]
    fn test_viewer_error_wraps_config_error() {
        let err: ViewerError = ConfigError::NoJsonObject.into();
        assert!(err.to_string().contains("No JSON object"));
    }
}

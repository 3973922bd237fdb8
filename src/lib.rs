//! Rein cascaded shadow maps
//!
//! Cascaded shadow mapping for a single directional light, built on wgpu.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **context** - Core wgpu wrapper (Device, Queue)
//! 2. **core** - GPU primitives (buffers, depth textures, depth-only pipelines)
//! 3. **renderer** - Cameras, lights and the cascade pipeline
//!
//! The cascade math in [`renderer::shadow`] is plain CPU code with no GPU
//! dependency; [`CascadeShadowMaps`] is the only part that needs a device.
//!
//! ```no_run
//! use rein_csm::glam::Vec3;
//! use rein_csm::{Camera, CascadeConfig, CascadedShadows, DirectionalLight};
//!
//! # fn main() -> rein_csm::error::Result<()> {
//! let camera = Camera::new_perspective(
//!     Vec3::new(0.0, 3.0, 8.0),
//!     Vec3::ZERO,
//!     Vec3::Y,
//!     60.0,
//!     16.0 / 9.0,
//!     0.1,
//!     100.0,
//! );
//! let shadows = CascadedShadows::new(CascadeConfig::default())?;
//! let cascades = shadows.update_for_viewer(&camera, &DirectionalLight::default())?;
//! assert_eq!(cascades.len(), 3);
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod core;
pub mod error;
pub mod renderer;

// Re-export commonly used types
pub use context::WgpuContext;

pub use core::{
    CullState, DepthBias, DepthState, DepthTextureArray, DynamicUniformBuffer, IndexBuffer,
    PipelineBuilder, UniformBuffer, VertexBuffer,
};

pub use error::{Result, ShadowError};

pub use renderer::{
    select_cascade, shadow_factor, Aabb, AmbientLight, Camera, CameraFrame, Cascade,
    CascadeConfig, CascadeFit, CascadeFitter, CascadeSet, CascadeShadowMaps, CascadedShadows,
    CasterMesh, CasterVertex, CsmUniform, DepthImage, DepthLookup, DirectionalLight,
    FrustumCorners, LightingTerms, PcfKernel, Projection, ShadowCaster, ShadowQuery, SplitSet,
    Viewer, MAX_CASCADES,
};

// Re-export glam for convenience
pub use glam;

//! Error types for cascade setup
//!
//! Configuration problems are programmer errors: they are reported once, when
//! a [`CascadeConfig`](crate::renderer::shadow::CascadeConfig) or a camera is
//! handed to the shadow pipeline, and never silently turned into matrices.

use thiserror::Error;

/// Errors produced by the cascaded shadow pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadowError {
    /// Camera clip planes must satisfy `0 < near < far`.
    #[error("invalid clip planes: near = {near}, far = {far} (need 0 < near < far)")]
    InvalidClipPlanes { near: f32, far: f32 },

    /// At least one cascade is required.
    #[error("invalid cascade count {0} (need at least 1)")]
    InvalidCascadeCount(u32),

    /// The log/linear blend weight must lie in `[0, 1]`.
    #[error("split blend lambda {0} is outside [0, 1]")]
    InvalidSplitBlend(f32),

    /// The virtual light eye must sit a positive distance from the slice.
    #[error("light standoff distance {0} must be positive and finite")]
    InvalidStandoff(f32),

    /// Z padding cannot shrink the light-space box.
    #[error("z padding {0} must be non-negative and finite")]
    InvalidPadding(f32),

    /// Depth bias cannot be negative.
    #[error("depth bias {0} must be non-negative and finite")]
    InvalidDepthBias(f32),

    /// Shadow maps need at least one texel.
    #[error("shadow map resolution must be non-zero")]
    InvalidResolution,

    /// The light direction has no usable length.
    #[error("light direction has zero length")]
    ZeroLightDirection,

    /// The inverse view-projection does not describe a finite frustum.
    #[error("degenerate frustum: corner {corner} unprojected with w = {w}")]
    DegenerateFrustum { corner: usize, w: f32 },

    /// A CPU depth image was built from a texel buffer of the wrong size.
    #[error("depth image is {width}x{height} but {len} texels were supplied")]
    DepthImageSize { width: u32, height: u32, len: usize },
}

/// Result alias used throughout the shadow pipeline.
pub type Result<T> = std::result::Result<T, ShadowError>;

//! Cascaded shadow mapping
//!
//! Splits the camera's view volume into depth ranges, fits a light-space
//! orthographic projection to each range and samples the resulting depth maps
//! with percentage-closer filtering.
//!
//! The CPU side is a pure per-frame function:
//!
//! 1. [`SplitSet::compute`] - view-space split distances
//! 2. [`FrustumCorners::from_inverse_view_projection`] - world-space frustum
//! 3. [`CascadeFitter::fit`] - one light view-projection per cascade
//! 4. [`select_cascade`] and [`shadow_factor`] - shading-time lookup
//!
//! [`CascadedShadows`] runs steps 1-3 and [`CascadeShadowMaps`] owns the GPU
//! depth targets the cascades are rendered into.

mod cascaded;
mod fitting;
mod frustum;
mod maps;
mod pcf;
mod select;
mod splits;

pub use cascaded::{CameraFrame, Cascade, CascadeSet, CascadedShadows};
pub use fitting::{
    light_eye, CascadeFit, CascadeFitter, LightEye, ALTERNATE_UP, MIN_AXIS_EXTENT, REFERENCE_UP,
};
pub use frustum::{FrustumCorners, NDC_CORNERS};
pub use maps::{
    CascadeShadowMaps, CasterMesh, CasterVertex, CsmUniform, DepthPassUniform, ShadowCaster,
    MAX_CASCADES, SAMPLING_WGSL,
};
pub use pcf::{
    project_to_shadow_space, shadow_factor, DepthImage, DepthLookup, PcfKernel, ShadowQuery,
};
pub use select::select_cascade;
pub use splits::SplitSet;

use crate::error::{Result, ShadowError};

/// Cascaded shadow configuration.
///
/// Created once per shadow setup and passed by reference everywhere; nothing
/// in the pipeline keeps a global copy, so several setups (split-screen
/// cameras, multiple suns) can coexist.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeConfig {
    /// Number of cascades (N >= 1).
    pub cascade_count: u32,
    /// Blend between linear (0.0) and logarithmic (1.0) split spacing.
    pub split_lambda: f32,
    /// PCF kernel used when sampling a cascade.
    pub pcf_kernel: PcfKernel,
    /// Constant depth bias applied in the shadow comparison.
    pub depth_bias: f32,
    /// Distance of the virtual light eye from each slice centroid.
    pub light_standoff: f32,
    /// Extra light-space depth in front of each slice so off-screen occluders
    /// still land in the map.
    pub z_padding: f32,
    /// Shadow map resolution per cascade (width and height).
    pub resolution: u32,
}

impl CascadeConfig {
    /// Check every field, failing on the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if self.cascade_count < 1 {
            return Err(ShadowError::InvalidCascadeCount(self.cascade_count));
        }
        if !(0.0..=1.0).contains(&self.split_lambda) {
            return Err(ShadowError::InvalidSplitBlend(self.split_lambda));
        }
        if !(self.depth_bias.is_finite() && self.depth_bias >= 0.0) {
            return Err(ShadowError::InvalidDepthBias(self.depth_bias));
        }
        if !(self.light_standoff.is_finite() && self.light_standoff > 0.0) {
            return Err(ShadowError::InvalidStandoff(self.light_standoff));
        }
        if !(self.z_padding.is_finite() && self.z_padding >= 0.0) {
            return Err(ShadowError::InvalidPadding(self.z_padding));
        }
        if self.resolution == 0 {
            return Err(ShadowError::InvalidResolution);
        }
        Ok(())
    }

    /// Size of one shadow-map texel in normalized texture coordinates.
    pub fn texel_size(&self) -> f32 {
        1.0 / self.resolution as f32
    }
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            cascade_count: 3,
            split_lambda: 0.5,
            pcf_kernel: PcfKernel::Pcf3x3,
            depth_bias: 0.005,
            light_standoff: 50.0,
            z_padding: 25.0,
            resolution: 2048,
        }
    }
}

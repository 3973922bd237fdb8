//! Render state configurations
//!
//! Small value types describing the fixed-function state of the shadow depth
//! pipeline.

/// Depth test configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthState {
    /// Whether to write to the depth buffer.
    pub write: bool,
    /// Comparison function for depth test.
    pub compare: wgpu::CompareFunction,
    /// Rasterizer depth bias.
    pub bias: DepthBias,
}

impl DepthState {
    /// Depth testing enabled with writes.
    pub fn read_write() -> Self {
        Self {
            write: true,
            compare: wgpu::CompareFunction::Less,
            bias: DepthBias::NONE,
        }
    }

    /// Replace the rasterizer depth bias.
    pub fn with_bias(mut self, bias: DepthBias) -> Self {
        self.bias = bias;
        self
    }

    /// Convert to wgpu depth stencil state.
    pub fn to_wgpu(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.write,
            depth_compare: self.compare,
            stencil: wgpu::StencilState::default(),
            bias: self.bias.to_wgpu(),
        }
    }
}

impl Default for DepthState {
    fn default() -> Self {
        Self::read_write()
    }
}

/// Hardware depth bias applied while rasterizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthBias {
    /// Constant offset in depth-buffer units.
    pub constant: i32,
    /// Offset scaled by the polygon's depth slope.
    pub slope_scale: f32,
}

impl DepthBias {
    pub const NONE: Self = Self {
        constant: 0,
        slope_scale: 0.0,
    };

    pub fn to_wgpu(&self) -> wgpu::DepthBiasState {
        wgpu::DepthBiasState {
            constant: self.constant,
            slope_scale: self.slope_scale,
            clamp: 0.0,
        }
    }
}

impl Default for DepthBias {
    fn default() -> Self {
        Self::NONE
    }
}

/// Cull mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullState {
    /// No culling.
    None,
    /// Cull front faces.
    Front,
    /// Cull back faces.
    #[default]
    Back,
}

impl CullState {
    /// Convert to wgpu cull mode.
    pub fn to_wgpu(&self) -> Option<wgpu::Face> {
        match self {
            CullState::None => None,
            CullState::Front => Some(wgpu::Face::Front),
            CullState::Back => Some(wgpu::Face::Back),
        }
    }
}

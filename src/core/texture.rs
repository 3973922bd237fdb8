//! Depth texture arrays
//!
//! One depth layer per shadow cascade, with per-layer views for rendering and
//! an array view plus comparison sampler for shading.

use crate::context::WgpuContext;

/// A layered depth texture sampled with hardware depth comparison.
pub struct DepthTextureArray {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) layer_views: Vec<wgpu::TextureView>,
    pub(crate) sampler: wgpu::Sampler,
    pub(crate) resolution: u32,
    pub(crate) layers: u32,
}

impl DepthTextureArray {
    /// The depth format used by this texture.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Create a square depth array with `layers` layers.
    pub fn new(ctx: &WgpuContext, resolution: u32, layers: u32, label: Option<&str>) -> Self {
        let extent = wgpu::Extent3d {
            width: resolution,
            height: resolution,
            depth_or_array_layers: layers,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label,
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: label.map(|l| format!("{} array view", l)).as_deref(),
            dimension: Some(wgpu::TextureViewDimension::D2Array),
            ..Default::default()
        });

        let layer_views: Vec<_> = (0..layers)
            .map(|i| {
                texture.create_view(&wgpu::TextureViewDescriptor {
                    label: label.map(|l| format!("{} layer {}", l, i)).as_deref(),
                    dimension: Some(wgpu::TextureViewDimension::D2),
                    base_array_layer: i,
                    array_layer_count: Some(1),
                    ..Default::default()
                })
            })
            .collect();

        // Nearest taps; filtering comes from the PCF kernel in the shader
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: label.map(|l| format!("{} sampler", l)).as_deref(),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            view,
            layer_views,
            sampler,
            resolution,
            layers,
        }
    }

    /// Get the array view (all layers).
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Get a specific layer's view, if it exists.
    pub fn layer_view(&self, layer: u32) -> Option<&wgpu::TextureView> {
        self.layer_views.get(layer as usize)
    }

    /// Get the comparison sampler.
    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }

    /// Width and height of each layer.
    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// Get the number of layers.
    pub fn layers(&self) -> u32 {
        self.layers
    }
}

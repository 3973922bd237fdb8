//! GPU cascade depth maps
//!
//! Owns the layered depth texture the cascades are rendered into, the
//! depth-only pipeline that fills it and the uniform the shading pass reads
//! through `shaders/csm_sample.wgsl`.

use super::cascaded::CascadeSet;
use super::CascadeConfig;
use crate::context::WgpuContext;
use crate::core::buffer::{DynamicUniformBuffer, IndexBuffer, UniformBuffer, VertexBuffer};
use crate::core::pipeline::PipelineBuilder;
use crate::core::render_states::{CullState, DepthBias, DepthState};
use crate::core::texture::DepthTextureArray;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use tracing::{debug, warn};

/// Largest cascade count the GPU path supports.
pub const MAX_CASCADES: usize = 4;

/// WGSL providing `csm_shadow_factor(world_pos)` for lighting shaders.
pub const SAMPLING_WGSL: &str = include_str!("../../shaders/csm_sample.wgsl");

const DEPTH_WGSL: &str = include_str!("../../shaders/csm_depth.wgsl");

/// Slope-scaled raster bias for the depth pass, on top of the comparison bias.
const RASTER_BIAS: DepthBias = DepthBias {
    constant: 0,
    slope_scale: 1.5,
};

/// Shading-side cascade data, laid out to match `CsmUniform` in WGSL.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CsmUniform {
    pub light_view_proj: [[[f32; 4]; 4]; MAX_CASCADES],
    pub splits: [f32; MAX_CASCADES],
    pub camera_position: [f32; 4],
    pub cascade_count: u32,
    pub pcf_kernel_size: u32,
    pub depth_bias: f32,
    pub texel_size: f32,
}

impl CsmUniform {
    /// Pack a cascade set. Cascades past [`MAX_CASCADES`] are dropped with a
    /// warning.
    pub fn new(config: &CascadeConfig, set: &CascadeSet, camera_position: Vec3) -> Self {
        if set.len() > MAX_CASCADES {
            warn!(
                cascades = set.len(),
                max = MAX_CASCADES,
                "cascade set exceeds uniform capacity, dropping far cascades"
            );
        }

        let mut uniform = Self::zeroed();
        for (slot, cascade) in uniform.light_view_proj.iter_mut().zip(set.cascades()) {
            *slot = cascade.light_view_projection.to_cols_array_2d();
        }
        for (slot, split) in uniform.splits.iter_mut().zip(set.splits().as_slice()) {
            *slot = *split;
        }

        uniform.camera_position = camera_position.extend(1.0).to_array();
        uniform.cascade_count = set.len().min(MAX_CASCADES) as u32;
        uniform.pcf_kernel_size = config.pcf_kernel.size();
        uniform.depth_bias = config.depth_bias;
        uniform.texel_size = config.texel_size();
        uniform
    }
}

/// Per-draw data of the depth pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct DepthPassUniform {
    pub light_view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
}

impl DepthPassUniform {
    pub fn new(light_view_projection: Mat4, model: Mat4) -> Self {
        Self {
            light_view_proj: light_view_projection.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
        }
    }
}

/// Position-only vertex for shadow casters.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CasterVertex {
    pub position: [f32; 3],
}

impl CasterVertex {
    pub const fn new(position: [f32; 3]) -> Self {
        Self { position }
    }

    /// Get the vertex buffer layout for this vertex type.
    pub const fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CasterVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        }
    }

    /// Axis-aligned box centered on the origin, counter-clockwise from outside.
    pub fn cuboid(half_extents: Vec3) -> (Vec<CasterVertex>, Vec<u32>) {
        // (normal, u, v) with u x v == normal
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        const QUAD: [(f32, f32); 4] = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            let base = vertices.len() as u32;
            vertices.extend(QUAD.iter().map(|&(s, t)| {
                Self::new((half_extents * (normal + u * s + v * t)).to_array())
            }));
            indices.extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        (vertices, indices)
    }
}

/// Something that can draw itself into a cascade depth pass.
///
/// The pass already has the depth pipeline and per-draw uniform bound;
/// implementors only bind geometry and issue draws using
/// [`CasterVertex::layout`] at vertex slot 0.
pub trait ShadowCaster {
    fn draw_depth(&self, pass: &mut wgpu::RenderPass<'_>);
}

/// GPU mesh of [`CasterVertex`]es.
pub struct CasterMesh {
    vertices: VertexBuffer,
    indices: Option<IndexBuffer>,
}

impl CasterMesh {
    /// Upload a mesh. An empty `indices` slice draws the vertices in order.
    pub fn new(
        ctx: &WgpuContext,
        vertices: &[CasterVertex],
        indices: &[u32],
        label: Option<&str>,
    ) -> Self {
        Self {
            vertices: VertexBuffer::new(ctx, vertices, label),
            indices: (!indices.is_empty()).then(|| IndexBuffer::new(ctx, indices, label)),
        }
    }

    /// Upload an axis-aligned box.
    pub fn cuboid(ctx: &WgpuContext, half_extents: Vec3) -> Self {
        let (vertices, indices) = CasterVertex::cuboid(half_extents);
        Self::new(ctx, &vertices, &indices, Some("cuboid caster"))
    }
}

impl ShadowCaster for CasterMesh {
    fn draw_depth(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertices.slice());
        match &self.indices {
            Some(indices) => {
                pass.set_index_buffer(indices.slice(), IndexBuffer::FORMAT);
                pass.draw_indexed(0..indices.count(), 0, 0..1);
            }
            None => pass.draw(0..self.vertices.count(), 0..1),
        }
    }
}

/// Cascade depth maps on the GPU.
pub struct CascadeShadowMaps {
    config: CascadeConfig,
    depth: DepthTextureArray,
    pipeline: wgpu::RenderPipeline,
    pass_uniforms: DynamicUniformBuffer<DepthPassUniform>,
    csm_uniform: UniformBuffer<CsmUniform>,
    sample_layout: wgpu::BindGroupLayout,
    sample_bind_group: wgpu::BindGroup,
}

impl CascadeShadowMaps {
    /// Allocate one depth layer per cascade of `config`.
    pub fn new(ctx: &WgpuContext, config: &CascadeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        anyhow::ensure!(
            config.cascade_count as usize <= MAX_CASCADES,
            "{} cascades requested, at most {} supported",
            config.cascade_count,
            MAX_CASCADES
        );

        let depth = DepthTextureArray::new(
            ctx,
            config.resolution,
            config.cascade_count,
            Some("cascade shadow maps"),
        );

        let pass_uniforms = DynamicUniformBuffer::new(
            ctx,
            config.cascade_count as usize * 16,
            0,
            wgpu::ShaderStages::VERTEX,
            Some("cascade depth uniforms"),
        );

        let pipeline = PipelineBuilder::new(ctx)
            .label("cascade depth pipeline")
            .shader(DEPTH_WGSL)
            .vertex_layout(CasterVertex::layout())
            .bind_group_layout(pass_uniforms.bind_group_layout())
            .depth(DepthState::read_write().with_bias(RASTER_BIAS))
            .cull(CullState::Front)
            .build_depth_only()?;

        let csm_uniform = UniformBuffer::new(ctx, &CsmUniform::zeroed(), Some("csm uniform"));

        let sample_layout = ctx
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("csm sample bind group layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2Array,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let sample_bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("csm sample bind group"),
            layout: &sample_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: csm_uniform.buffer().as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(depth.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(depth.sampler()),
                },
            ],
        });

        debug!(
            cascades = config.cascade_count,
            resolution = config.resolution,
            "created cascade shadow maps"
        );

        Ok(Self {
            config: *config,
            depth,
            pipeline,
            pass_uniforms,
            csm_uniform,
            sample_layout,
            sample_bind_group,
        })
    }

    /// Upload the shading-side uniform for this frame's cascades.
    pub fn update(&self, ctx: &WgpuContext, set: &CascadeSet, camera_position: Vec3) {
        self.csm_uniform
            .update(ctx, &CsmUniform::new(&self.config, set, camera_position));
    }

    /// Render every caster into every cascade layer.
    ///
    /// Each layer is cleared to the far plane first, so a frame without
    /// casters leaves all maps fully lit.
    pub fn render_depth_passes<C: ShadowCaster + ?Sized>(
        &mut self,
        ctx: &WgpuContext,
        encoder: &mut wgpu::CommandEncoder,
        set: &CascadeSet,
        casters: &[(Mat4, &C)],
    ) {
        let layers = set.len().min(self.depth.layers() as usize);

        let uniforms: Vec<DepthPassUniform> = set.cascades()[..layers]
            .iter()
            .flat_map(|cascade| {
                casters.iter().map(move |(model, _)| {
                    DepthPassUniform::new(cascade.light_view_projection, *model)
                })
            })
            .collect();
        self.pass_uniforms.write(ctx, &uniforms);

        for layer in 0..layers {
            let Some(view) = self.depth.layer_view(layer as u32) else {
                continue;
            };

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cascade depth pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            pass.set_pipeline(&self.pipeline);
            for (i, (_, caster)) in casters.iter().enumerate() {
                let offset = self.pass_uniforms.offset(layer * casters.len() + i);
                pass.set_bind_group(0, self.pass_uniforms.bind_group(), &[offset]);
                caster.draw_depth(&mut pass);
            }
        }
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Depth array with one layer per cascade.
    pub fn depth(&self) -> &DepthTextureArray {
        &self.depth
    }

    /// Layout to use at group 1 of shaders that include [`SAMPLING_WGSL`].
    pub fn sample_bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.sample_layout
    }

    pub fn sample_bind_group(&self) -> &wgpu::BindGroup {
        &self.sample_bind_group
    }
}

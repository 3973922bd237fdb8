//! GPU buffer abstractions
//!
//! Typed wrappers for the vertex, index and uniform buffers used by the
//! shadow passes.

use crate::context::WgpuContext;
use bytemuck::{Pod, Zeroable};
use std::marker::PhantomData;
use std::num::NonZeroU64;
use tracing::debug;

/// A GPU buffer containing vertex data.
pub struct VertexBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) count: u32,
}

impl VertexBuffer {
    /// Create a new vertex buffer from a slice of vertices.
    pub fn new<V: Pod + Zeroable>(ctx: &WgpuContext, vertices: &[V], label: Option<&str>) -> Self {
        use wgpu::util::DeviceExt;
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        Self {
            buffer,
            count: vertices.len() as u32,
        }
    }

    /// Get the number of vertices.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Create a buffer slice for the entire buffer.
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }
}

/// A GPU buffer of `u32` indices.
pub struct IndexBuffer {
    pub(crate) buffer: wgpu::Buffer,
    pub(crate) count: u32,
}

impl IndexBuffer {
    /// The index format of every index buffer.
    pub const FORMAT: wgpu::IndexFormat = wgpu::IndexFormat::Uint32;

    pub fn new(ctx: &WgpuContext, indices: &[u32], label: Option<&str>) -> Self {
        use wgpu::util::DeviceExt;
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        Self {
            buffer,
            count: indices.len() as u32,
        }
    }

    /// Get the number of indices.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Create a buffer slice for the entire buffer.
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        self.buffer.slice(..)
    }
}

/// A typed GPU uniform buffer.
pub struct UniformBuffer<T> {
    pub(crate) buffer: wgpu::Buffer,
    _marker: PhantomData<T>,
}

impl<T: Pod + Zeroable> UniformBuffer<T> {
    /// Create a new uniform buffer with initial data.
    pub fn new(ctx: &WgpuContext, data: &T, label: Option<&str>) -> Self {
        use wgpu::util::DeviceExt;

        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label,
                contents: bytemuck::bytes_of(data),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });

        Self {
            buffer,
            _marker: PhantomData,
        }
    }

    /// Update the buffer contents.
    pub fn update(&self, ctx: &WgpuContext, data: &T) {
        ctx.queue
            .write_buffer(&self.buffer, 0, bytemuck::bytes_of(data));
    }

    /// Get the raw wgpu buffer.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Uniform buffer holding many `T`s, bound one at a time via dynamic offsets.
///
/// Elements sit `stride` bytes apart, where `stride` is `size_of::<T>()`
/// rounded up to the device's uniform offset alignment. The buffer grows on
/// demand; the bind group layout never changes, so pipelines built against
/// it stay valid.
pub struct DynamicUniformBuffer<T> {
    buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
    binding: u32,
    stride: u64,
    capacity: usize,
    label: Option<String>,
    _marker: PhantomData<T>,
}

impl<T: Pod + Zeroable> DynamicUniformBuffer<T> {
    /// Create a buffer with room for `capacity` elements, bound at `binding`.
    pub fn new(
        ctx: &WgpuContext,
        capacity: usize,
        binding: u32,
        visibility: wgpu::ShaderStages,
        label: Option<&str>,
    ) -> Self {
        let stride = ctx.uniform_stride(std::mem::size_of::<T>() as u64);
        let capacity = capacity.max(1);

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: label.map(|l| format!("{} layout", l)).as_deref(),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding,
                        visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: true,
                            min_binding_size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
                        },
                        count: None,
                    }],
                });

        let buffer = Self::create_buffer(ctx, stride, capacity, label);
        let bind_group = Self::create_bind_group(ctx, &bind_group_layout, &buffer, binding, label);

        Self {
            buffer,
            bind_group_layout,
            bind_group,
            binding,
            stride,
            capacity,
            label: label.map(str::to_owned),
            _marker: PhantomData,
        }
    }

    fn create_buffer(
        ctx: &WgpuContext,
        stride: u64,
        capacity: usize,
        label: Option<&str>,
    ) -> wgpu::Buffer {
        ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group(
        ctx: &WgpuContext,
        layout: &wgpu::BindGroupLayout,
        buffer: &wgpu::Buffer,
        binding: u32,
        label: Option<&str>,
    ) -> wgpu::BindGroup {
        ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: label.map(|l| format!("{} bind group", l)).as_deref(),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer,
                    offset: 0,
                    size: NonZeroU64::new(std::mem::size_of::<T>() as u64),
                }),
            }],
        })
    }

    /// Upload `items`, growing the buffer if it is too small.
    pub fn write(&mut self, ctx: &WgpuContext, items: &[T]) {
        if items.is_empty() {
            return;
        }

        if items.len() > self.capacity {
            let capacity = items.len().next_power_of_two();
            debug!(
                from = self.capacity,
                to = capacity,
                "growing dynamic uniform buffer"
            );
            let label = self.label.as_deref();
            self.buffer = Self::create_buffer(ctx, self.stride, capacity, label);
            self.bind_group = Self::create_bind_group(
                ctx,
                &self.bind_group_layout,
                &self.buffer,
                self.binding,
                label,
            );
            self.capacity = capacity;
        }

        let bytes = pack_strided(items, self.stride as usize);
        ctx.queue.write_buffer(&self.buffer, 0, &bytes);
    }

    /// Dynamic offset of element `index`.
    pub fn offset(&self, index: usize) -> wgpu::DynamicOffset {
        (index as u64 * self.stride) as wgpu::DynamicOffset
    }

    /// Distance in bytes between consecutive elements.
    pub fn stride(&self) -> u64 {
        self.stride
    }

    /// Number of elements that fit without growing.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the bind group layout.
    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Get the bind group.
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Lay `items` out `stride` bytes apart, zero-filling the gaps.
pub(crate) fn pack_strided<T: Pod>(items: &[T], stride: usize) -> Vec<u8> {
    let size = std::mem::size_of::<T>();
    let stride = stride.max(size);
    let mut bytes = vec![0u8; stride * items.len()];
    for (chunk, item) in bytes.chunks_exact_mut(stride).zip(items) {
        chunk[..size].copy_from_slice(bytemuck::bytes_of(item));
    }
    bytes
}

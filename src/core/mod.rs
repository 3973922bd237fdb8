//! Core rendering abstractions
//!
//! Mid-level wrappers over the wgpu primitives the shadow passes need.

pub mod buffer;
pub mod pipeline;
pub mod render_states;
pub mod texture;

pub use buffer::{DynamicUniformBuffer, IndexBuffer, UniformBuffer, VertexBuffer};
pub use pipeline::PipelineBuilder;
pub use render_states::{CullState, DepthBias, DepthState};
pub use texture::DepthTextureArray;

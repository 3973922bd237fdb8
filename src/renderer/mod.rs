//! High-level rendering abstractions
//!
//! Cameras, lights and cascaded shadow mapping for a directional light.

pub mod bounds;
pub mod light;
pub mod shadow;
pub mod viewer;

pub use bounds::Aabb;
pub use light::{AmbientLight, DirectionalLight, LightingTerms};
pub use shadow::{
    select_cascade, shadow_factor, CameraFrame, Cascade, CascadeConfig, CascadeFit, CascadeFitter,
    CascadeSet, CascadeShadowMaps, CascadedShadows, CasterMesh, CasterVertex, CsmUniform,
    DepthImage, DepthLookup, FrustumCorners, PcfKernel, ShadowCaster, ShadowQuery, SplitSet,
    MAX_CASCADES,
};
pub use viewer::{Camera, Projection, Viewer};

//! Percentage-closer filtering of cascade depth maps
//!
//! CPU reference of the shading-side lookup in `shaders/csm_sample.wgsl`.
//! Depth maps are addressed by normalized coordinates through
//! [`DepthLookup`]; [`DepthImage`] is an in-memory implementation.

use crate::error::{Result, ShadowError};
use glam::{Mat4, Vec2, Vec3};

/// Stored-depth surface addressed by normalized `[0, 1]` coordinates.
pub trait DepthLookup {
    /// Stored light-space depth at `uv`.
    fn depth_at(&self, uv: Vec2) -> f32;
}

/// A depth map held in memory.
///
/// Lookups use nearest filtering with clamp-to-edge addressing, matching the
/// comparison sampler bound to the GPU cascade maps.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthImage {
    width: u32,
    height: u32,
    texels: Vec<f32>,
}

impl DepthImage {
    /// Wrap row-major texels (row 0 is `v = 0`).
    pub fn new(width: u32, height: u32, texels: Vec<f32>) -> Result<Self> {
        if width == 0 || height == 0 || texels.len() != width as usize * height as usize {
            return Err(ShadowError::DepthImageSize {
                width,
                height,
                len: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// An image where every texel stores `depth`.
    pub fn filled(width: u32, height: u32, depth: f32) -> Result<Self> {
        Self::from_fn(width, height, |_, _| depth)
    }

    /// Build an image texel by texel. Rejects zero dimensions like [`Self::new`].
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> f32) -> Result<Self> {
        let texels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| f(x, y))
            .collect();
        Self::new(width, height, texels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size of one texel in normalized coordinates.
    pub fn texel_size(&self) -> Vec2 {
        Vec2::new(1.0 / self.width as f32, 1.0 / self.height as f32)
    }

    /// Stored depth of texel `(x, y)`.
    pub fn texel(&self, x: u32, y: u32) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.texels[(y * self.width + x) as usize])
        } else {
            None
        }
    }
}

impl DepthLookup for DepthImage {
    fn depth_at(&self, uv: Vec2) -> f32 {
        let x = ((uv.x * self.width as f32).floor() as i64).clamp(0, self.width as i64 - 1);
        let y = ((uv.y * self.height as f32).floor() as i64).clamp(0, self.height as i64 - 1);
        self.texels[(y as usize) * self.width as usize + x as usize]
    }
}

/// Fixed PCF kernel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcfKernel {
    /// Single comparison, hard edges.
    Single,
    /// 3x3 grid of offsets in {-1, 0, 1} texels.
    #[default]
    Pcf3x3,
    /// 5x5 grid.
    Pcf5x5,
    /// 7x7 grid.
    Pcf7x7,
}

impl PcfKernel {
    /// Width of the square sample grid.
    pub fn size(self) -> u32 {
        match self {
            Self::Single => 1,
            Self::Pcf3x3 => 3,
            Self::Pcf5x5 => 5,
            Self::Pcf7x7 => 7,
        }
    }

    /// Number of depth comparisons per lookup.
    pub fn sample_count(self) -> u32 {
        self.size() * self.size()
    }

    /// Kernel with a `size x size` grid, if supported.
    pub fn from_size(size: u32) -> Option<Self> {
        match size {
            1 => Some(Self::Single),
            3 => Some(Self::Pcf3x3),
            5 => Some(Self::Pcf5x5),
            7 => Some(Self::Pcf7x7),
            _ => None,
        }
    }
}

/// Everything needed to filter one surface point against one cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowQuery {
    /// Cascade the point was assigned to.
    pub cascade: usize,
    /// Shadow-map coordinates (v grows downward).
    pub uv: Vec2,
    /// Light-space depth of the point in `[0, 1]`.
    pub depth: f32,
    /// Size of one texel in normalized coordinates.
    pub texel_size: f32,
    /// Constant bias subtracted from `depth` before comparing.
    pub bias: f32,
}

impl ShadowQuery {
    /// Project `world_position` through a cascade's light view-projection.
    pub fn new(
        cascade: usize,
        light_view_projection: Mat4,
        world_position: Vec3,
        texel_size: f32,
        bias: f32,
    ) -> Self {
        let (uv, depth) = project_to_shadow_space(light_view_projection, world_position);
        Self {
            cascade,
            uv,
            depth,
            texel_size,
            bias,
        }
    }
}

/// Map a world position to shadow-map `(uv, depth)`.
///
/// x/y go from `[-1, 1]` to `[0, 1]` with v flipped to texture orientation;
/// depth is already `[0, 1]` under the wgpu clip convention.
pub fn project_to_shadow_space(light_view_projection: Mat4, world_position: Vec3) -> (Vec2, f32) {
    let ndc = light_view_projection.project_point3(world_position);
    let uv = Vec2::new(ndc.x * 0.5 + 0.5, 0.5 - ndc.y * 0.5);
    (uv, ndc.z)
}

/// Filter a depth map around `query` into a lit fraction in `[0, 1]`.
///
/// A sample is lit when `stored >= depth - bias`. Points behind the light's
/// far plane (`depth > 1`) are always lit. The result scales only the
/// diffuse and specular terms (see
/// [`LightingTerms::resolve`](crate::renderer::light::LightingTerms::resolve)).
pub fn shadow_factor<L: DepthLookup + ?Sized>(
    lookup: &L,
    query: &ShadowQuery,
    kernel: PcfKernel,
) -> f32 {
    if query.depth > 1.0 {
        return 1.0;
    }

    match kernel {
        PcfKernel::Single => filter::<1, L>(lookup, query),
        PcfKernel::Pcf3x3 => filter::<3, L>(lookup, query),
        PcfKernel::Pcf5x5 => filter::<5, L>(lookup, query),
        PcfKernel::Pcf7x7 => filter::<7, L>(lookup, query),
    }
}

fn filter<const K: usize, L: DepthLookup + ?Sized>(lookup: &L, query: &ShadowQuery) -> f32 {
    let radius = (K / 2) as f32;
    let reference = query.depth - query.bias;

    let mut lit = 0u32;
    for row in 0..K {
        for col in 0..K {
            let offset = Vec2::new(col as f32 - radius, row as f32 - radius) * query.texel_size;
            if lookup.depth_at(query.uv + offset) >= reference {
                lit += 1;
            }
        }
    }

    lit as f32 / (K * K) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(uv: Vec2, depth: f32, texel_size: f32, bias: f32) -> ShadowQuery {
        ShadowQuery {
            cascade: 0,
            uv,
            depth,
            texel_size,
            bias,
        }
    }

    #[test]
    fn test_all_lit_and_all_shadowed() {
        let q = query(Vec2::splat(0.5), 0.5, 1.0 / 8.0, 0.005);

        let open = DepthImage::filled(8, 8, 1.0).unwrap();
        assert_eq!(shadow_factor(&open, &q, PcfKernel::Pcf3x3), 1.0);

        let blocked = DepthImage::filled(8, 8, 0.1).unwrap();
        assert_eq!(shadow_factor(&blocked, &q, PcfKernel::Pcf3x3), 0.0);
    }

    #[test]
    fn test_factor_tracks_lit_sample_count() {
        // 3x3 image sampled at its center: each offset hits its own texel.
        let mut previous = -1.0;
        for lit in 0..=9u32 {
            let image = DepthImage::from_fn(3, 3, |x, y| {
                if y * 3 + x < lit {
                    1.0
                } else {
                    0.0
                }
            })
            .unwrap();
            let factor = shadow_factor(
                &image,
                &query(Vec2::splat(0.5), 0.5, 1.0 / 3.0, 0.0),
                PcfKernel::Pcf3x3,
            );

            assert!((factor - lit as f32 / 9.0).abs() < 1e-6);
            assert!(factor >= previous);
            previous = factor;
        }
    }

    #[test]
    fn test_shadow_edge_is_soft() {
        // Left half occluded; sampling the first lit column sees one dark column.
        let image = DepthImage::from_fn(8, 8, |x, _| if x < 4 { 0.2 } else { 1.0 }).unwrap();
        let q = query(Vec2::new(4.5 / 8.0, 0.5), 0.5, 1.0 / 8.0, 0.0);

        let soft = shadow_factor(&image, &q, PcfKernel::Pcf3x3);
        assert!((soft - 6.0 / 9.0).abs() < 1e-6);

        let hard = shadow_factor(&image, &q, PcfKernel::Single);
        assert_eq!(hard, 1.0);
    }

    #[test]
    fn test_bias_prevents_self_shadowing() {
        let image = DepthImage::filled(4, 4, 0.498).unwrap();
        let surface = Vec2::splat(0.5);

        let biased = query(surface, 0.5, 0.25, 0.005);
        assert_eq!(shadow_factor(&image, &biased, PcfKernel::Pcf3x3), 1.0);

        let unbiased = query(surface, 0.5, 0.25, 0.0);
        assert_eq!(shadow_factor(&image, &unbiased, PcfKernel::Pcf3x3), 0.0);
    }

    #[test]
    fn test_beyond_light_far_plane_is_lit() {
        let image = DepthImage::filled(4, 4, 0.0).unwrap();
        let q = query(Vec2::splat(0.5), 1.2, 0.25, 0.0);
        assert_eq!(shadow_factor(&image, &q, PcfKernel::Pcf7x7), 1.0);
    }

    #[test]
    fn test_lookup_clamps_to_edge() {
        let image = DepthImage::from_fn(2, 2, |x, y| (y * 2 + x) as f32).unwrap();
        assert_eq!(image.depth_at(Vec2::new(-0.5, -0.5)), 0.0);
        assert_eq!(image.depth_at(Vec2::new(1.5, -0.5)), 1.0);
        assert_eq!(image.depth_at(Vec2::new(-0.5, 1.5)), 2.0);
        assert_eq!(image.depth_at(Vec2::new(0.99, 0.99)), 3.0);
        assert_eq!(image.texel(1, 1), Some(3.0));
        assert_eq!(image.texel(2, 0), None);
    }

    #[test]
    fn test_projection_flips_v() {
        let (uv, depth) = project_to_shadow_space(Mat4::IDENTITY, Vec3::new(0.0, 0.0, 0.3));
        assert!(uv.abs_diff_eq(Vec2::splat(0.5), 1e-6));
        assert!((depth - 0.3).abs() < 1e-6);

        let (uv, _) = project_to_shadow_space(Mat4::IDENTITY, Vec3::new(1.0, 1.0, 0.0));
        assert!(uv.abs_diff_eq(Vec2::new(1.0, 0.0), 1e-6));

        let (uv, _) = project_to_shadow_space(Mat4::IDENTITY, Vec3::new(-1.0, -1.0, 0.0));
        assert!(uv.abs_diff_eq(Vec2::new(0.0, 1.0), 1e-6));
    }

    #[test]
    fn test_kernel_sizes() {
        assert_eq!(PcfKernel::default(), PcfKernel::Pcf3x3);
        for kernel in [
            PcfKernel::Single,
            PcfKernel::Pcf3x3,
            PcfKernel::Pcf5x5,
            PcfKernel::Pcf7x7,
        ] {
            assert_eq!(PcfKernel::from_size(kernel.size()), Some(kernel));
            assert_eq!(kernel.sample_count(), kernel.size() * kernel.size());
        }
        assert_eq!(PcfKernel::from_size(4), None);
    }

    #[test]
    fn test_depth_image_size_mismatch() {
        assert_eq!(
            DepthImage::new(2, 2, vec![0.0; 3]),
            Err(ShadowError::DepthImageSize {
                width: 2,
                height: 2,
                len: 3
            })
        );
        assert!(DepthImage::new(2, 1, vec![0.5, 0.7]).is_ok());
    }

    #[test]
    fn test_generated_images_reject_zero_dimensions() {
        let mut calls = 0;
        assert_eq!(
            DepthImage::from_fn(0, 4, |_, _| {
                calls += 1;
                1.0
            }),
            Err(ShadowError::DepthImageSize {
                width: 0,
                height: 4,
                len: 0
            })
        );
        assert_eq!(calls, 0);
        assert!(DepthImage::filled(3, 0, 1.0).is_err());

        let image = DepthImage::filled(3, 2, 0.25).unwrap();
        assert_eq!((image.width(), image.height()), (3, 2));
        assert_eq!(image.texel(2, 1), Some(0.25));
    }
}

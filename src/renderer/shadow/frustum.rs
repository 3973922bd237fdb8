//! World-space frustum reconstruction

use crate::error::{Result, ShadowError};
use glam::{Mat4, Vec3};

/// Smallest `|w|` accepted during the perspective divide.
const MIN_W: f32 = 1e-6;

/// Canonical NDC corners of the `[0, 1]` depth range.
///
/// Near plane first, then the far plane in the same winding, so corner `i`
/// and corner `i + 4` lie on the same edge of the frustum.
pub const NDC_CORNERS: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, 0.0),
    Vec3::new(1.0, -1.0, 0.0),
    Vec3::new(1.0, 1.0, 0.0),
    Vec3::new(-1.0, 1.0, 0.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, 1.0),
    Vec3::new(-1.0, 1.0, 1.0),
];

/// Eight corners of a view volume in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumCorners {
    corners: [Vec3; 8],
}

impl FrustumCorners {
    /// Wrap eight corners laid out like [`NDC_CORNERS`].
    pub fn new(corners: [Vec3; 8]) -> Self {
        Self { corners }
    }

    /// Unproject the canonical NDC cube through an inverse view-projection.
    ///
    /// Fails instead of producing NaNs when a corner lands at (or near) `w = 0`,
    /// which only happens for a non-invertible or infinite camera matrix.
    pub fn from_inverse_view_projection(inverse_view_projection: Mat4) -> Result<Self> {
        let mut corners = [Vec3::ZERO; 8];

        for (i, ndc) in NDC_CORNERS.iter().enumerate() {
            let clip = inverse_view_projection * ndc.extend(1.0);
            if !clip.w.is_finite() || clip.w.abs() < MIN_W {
                return Err(ShadowError::DegenerateFrustum {
                    corner: i,
                    w: clip.w,
                });
            }

            let world = clip.truncate() / clip.w;
            if !world.is_finite() {
                return Err(ShadowError::DegenerateFrustum {
                    corner: i,
                    w: clip.w,
                });
            }
            corners[i] = world;
        }

        Ok(Self { corners })
    }

    /// All corners, near plane first.
    pub fn corners(&self) -> &[Vec3; 8] {
        &self.corners
    }

    /// The four near-plane corners.
    pub fn near_plane(&self) -> &[Vec3] {
        &self.corners[..4]
    }

    /// The four far-plane corners.
    pub fn far_plane(&self) -> &[Vec3] {
        &self.corners[4..]
    }

    /// Mean of the eight corners.
    pub fn centroid(&self) -> Vec3 {
        self.corners.iter().copied().sum::<Vec3>() / 8.0
    }

    /// Cut the sub-volume between two view distances out of the full frustum.
    ///
    /// Each near/far edge is interpolated at `(split - near) / (far - near)`;
    /// view depth is linear along an edge, so the result bounds exactly the
    /// `[split_near, split_far]` slice.
    pub fn slice(&self, near: f32, far: f32, split_near: f32, split_far: f32) -> Self {
        let depth = far - near;
        let t_near = (split_near - near) / depth;
        let t_far = (split_far - near) / depth;

        let mut corners = [Vec3::ZERO; 8];
        for i in 0..4 {
            let (a, b) = (self.corners[i], self.corners[i + 4]);
            corners[i] = a.lerp(b, t_near);
            corners[i + 4] = a.lerp(b, t_far);
        }

        Self { corners }
    }
}

//! Cascade split scheduling
//!
//! Practical split scheme: a `lambda`-weighted blend of logarithmic and
//! linear spacing between the camera clip planes.

use crate::error::{Result, ShadowError};

/// View-space far distances of each cascade for one frame.
///
/// `splits[i]` is the far boundary of cascade `i`; the near boundary is the
/// previous split, or the camera near plane for cascade 0. The last split is
/// always exactly the camera far plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSet {
    near: f32,
    splits: Vec<f32>,
}

impl SplitSet {
    /// Compute `cascade_count` split distances between `near` and `far`.
    ///
    /// `lambda = 0` gives pure linear spacing, `lambda = 1` pure logarithmic.
    pub fn compute(near: f32, far: f32, cascade_count: u32, lambda: f32) -> Result<Self> {
        validate_clip_planes(near, far)?;
        if cascade_count < 1 {
            return Err(ShadowError::InvalidCascadeCount(cascade_count));
        }
        if !(0.0..=1.0).contains(&lambda) {
            return Err(ShadowError::InvalidSplitBlend(lambda));
        }

        let count = cascade_count as f32;
        let ratio = far / near;
        let range = far - near;

        let mut splits: Vec<f32> = (1..=cascade_count)
            .map(|i| {
                let p = i as f32 / count;
                let log_split = near * ratio.powf(p);
                let lin_split = near + range * p;
                lambda * log_split + (1.0 - lambda) * lin_split
            })
            .collect();

        // The blend of two values equal to `far` can round away from it.
        if let Some(last) = splits.last_mut() {
            *last = far;
        }

        Ok(Self { near, splits })
    }

    /// Camera near plane the splits were computed for.
    pub fn near(&self) -> f32 {
        self.near
    }

    /// Camera far plane (the last split).
    pub fn far(&self) -> f32 {
        self.splits[self.splits.len() - 1]
    }

    /// Number of cascades.
    pub fn len(&self) -> usize {
        self.splits.len()
    }

    /// Always false: a split set holds at least one cascade.
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty()
    }

    /// Split distances as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.splits
    }

    /// `(near, far)` view-space range covered by cascade `index`.
    pub fn range(&self, index: usize) -> Option<(f32, f32)> {
        let far = *self.splits.get(index)?;
        let near = if index == 0 {
            self.near
        } else {
            self.splits[index - 1]
        };
        Some((near, far))
    }

    /// Iterate over every cascade's `(near, far)` range in order.
    pub fn ranges(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        std::iter::once(self.near)
            .chain(self.splits.iter().copied())
            .zip(self.splits.iter().copied())
    }
}

/// Clip planes must satisfy `0 < near < far`, both finite.
pub(crate) fn validate_clip_planes(near: f32, far: f32) -> Result<()> {
    if near.is_finite() && far.is_finite() && near > 0.0 && far > near {
        Ok(())
    } else {
        Err(ShadowError::InvalidClipPlanes { near, far })
    }
}

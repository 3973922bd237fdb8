//! Per-frame cascade update
//!
//! [`CascadedShadows`] turns a camera snapshot and a light direction into a
//! [`CascadeSet`]. Nothing is carried between frames: the same inputs always
//! give the same set, so a set from an earlier frame stays valid to reuse.

use super::fitting::CascadeFitter;
use super::frustum::FrustumCorners;
use super::pcf::{shadow_factor, DepthLookup, ShadowQuery};
use super::select::select_cascade;
use super::splits::SplitSet;
use super::CascadeConfig;
use crate::error::Result;
use crate::renderer::light::DirectionalLight;
use crate::renderer::viewer::Viewer;
use glam::{Mat4, Vec3};
use tracing::debug;

/// Camera state the cascades are fitted to, captured once per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// World-space camera position.
    pub position: Vec3,
    /// Near clip distance.
    pub near: f32,
    /// Far clip distance.
    pub far: f32,
    /// Inverse of `projection * view`.
    pub inverse_view_projection: Mat4,
}

impl CameraFrame {
    /// Snapshot a viewer.
    pub fn from_viewer<V: Viewer + ?Sized>(viewer: &V) -> Self {
        let (near, far) = viewer.clip_planes();
        Self {
            position: viewer.position(),
            near,
            far,
            inverse_view_projection: viewer.view_projection_matrix().inverse(),
        }
    }
}

/// One fitted cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cascade {
    /// Position in the cascade array (and depth texture layer).
    pub index: usize,
    /// View distance where this cascade starts.
    pub split_near: f32,
    /// View distance where this cascade ends.
    pub split_far: f32,
    /// World to light-view transform.
    pub light_view: Mat4,
    /// Orthographic light projection.
    pub light_projection: Mat4,
    /// World to light clip space, used for both rendering and sampling.
    pub light_view_projection: Mat4,
}

/// All cascades of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeSet {
    splits: SplitSet,
    cascades: Vec<Cascade>,
}

impl CascadeSet {
    /// Split distances the cascades were fitted to.
    pub fn splits(&self) -> &SplitSet {
        &self.splits
    }

    /// Cascades, nearest first.
    pub fn cascades(&self) -> &[Cascade] {
        &self.cascades
    }

    pub fn get(&self, index: usize) -> Option<&Cascade> {
        self.cascades.get(index)
    }

    pub fn len(&self) -> usize {
        self.cascades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cascades.is_empty()
    }

    /// Cascade covering `surface`, or `None` outside shadow coverage.
    pub fn select(&self, surface: Vec3, camera_position: Vec3) -> Option<&Cascade> {
        select_cascade(surface, camera_position, self.splits.as_slice())
            .and_then(|index| self.cascades.get(index))
    }
}

/// Cascaded shadows for one directional light and one camera.
#[derive(Debug, Clone)]
pub struct CascadedShadows {
    config: CascadeConfig,
}

impl CascadedShadows {
    /// Validate `config` and keep it for the lifetime of this setup.
    pub fn new(config: CascadeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    /// Fit every cascade for this frame.
    ///
    /// `to_light` points from the scene toward the light. Each cascade is
    /// fitted independently from the same unprojected frustum.
    pub fn update(&self, camera: &CameraFrame, to_light: Vec3) -> Result<CascadeSet> {
        let splits = SplitSet::compute(
            camera.near,
            camera.far,
            self.config.cascade_count,
            self.config.split_lambda,
        )?;
        let fitter = CascadeFitter::from_config(&self.config, to_light)?;
        let frustum = FrustumCorners::from_inverse_view_projection(camera.inverse_view_projection)?;

        let cascades = splits
            .ranges()
            .enumerate()
            .map(|(index, (split_near, split_far))| {
                let fit = fitter.fit(&frustum, camera.near, camera.far, split_near, split_far);
                Cascade {
                    index,
                    split_near,
                    split_far,
                    light_view: fit.light_view,
                    light_projection: fit.light_projection,
                    light_view_projection: fit.light_view_projection,
                }
            })
            .collect::<Vec<_>>();

        debug!(
            cascades = cascades.len(),
            splits = ?splits.as_slice(),
            "updated shadow cascades"
        );

        Ok(CascadeSet { splits, cascades })
    }

    /// Fit every cascade for a viewer lit by `light`.
    pub fn update_for_viewer<V: Viewer + ?Sized>(
        &self,
        viewer: &V,
        light: &DirectionalLight,
    ) -> Result<CascadeSet> {
        self.update(&CameraFrame::from_viewer(viewer), light.to_light())
    }

    /// Build the shadow lookup for `surface`, or `None` outside coverage.
    pub fn query(
        &self,
        set: &CascadeSet,
        camera_position: Vec3,
        surface: Vec3,
    ) -> Option<ShadowQuery> {
        let cascade = set.select(surface, camera_position)?;
        Some(ShadowQuery::new(
            cascade.index,
            cascade.light_view_projection,
            surface,
            self.config.texel_size(),
            self.config.depth_bias,
        ))
    }

    /// Lit fraction of `surface` given one depth map per cascade.
    ///
    /// Surfaces outside shadow coverage, or whose cascade has no map in
    /// `maps`, are fully lit.
    pub fn shadow_factor<L: DepthLookup>(
        &self,
        set: &CascadeSet,
        maps: &[L],
        camera_position: Vec3,
        surface: Vec3,
    ) -> f32 {
        let Some(query) = self.query(set, camera_position, surface) else {
            return 1.0;
        };
        maps.get(query.cascade)
            .map_or(1.0, |map| shadow_factor(map, &query, self.config.pcf_kernel))
    }
}

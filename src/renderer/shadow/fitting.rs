//! Light-space fitting of a single cascade
//!
//! Each cascade gets an orthographic light projection bounding exactly its
//! slice of the camera frustum, padded toward the light so that casters
//! outside the slice still reach the map.

use super::frustum::FrustumCorners;
use super::CascadeConfig;
use crate::error::{Result, ShadowError};
use crate::renderer::bounds::Aabb;
use glam::{Mat4, Vec3};
use tracing::trace;

/// Up vector used for the light's look-at.
pub const REFERENCE_UP: Vec3 = Vec3::Y;

/// Up vector used when the light shines (anti)parallel to [`REFERENCE_UP`].
pub const ALTERNATE_UP: Vec3 = Vec3::Z;

/// Smallest light-space extent of any box axis. Grows with the distance from
/// the light so the widened axis stays representable in `f32`.
pub const MIN_AXIS_EXTENT: f32 = 1e-3;

/// `|cos|` above which the light direction counts as parallel to the up vector.
const PARALLEL_COS: f32 = 1.0 - 1e-4;

/// Virtual light camera for one slice: where it sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightEye {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

impl LightEye {
    /// Right-handed look-at from the eye toward the target.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }
}

/// Place the light eye `standoff` units from the slice centroid toward the light.
///
/// `to_light` must be normalized.
pub fn light_eye(centroid: Vec3, to_light: Vec3, standoff: f32) -> LightEye {
    let up = if to_light.dot(REFERENCE_UP).abs() > PARALLEL_COS {
        trace!(?to_light, "light parallel to reference up, using alternate up");
        ALTERNATE_UP
    } else {
        REFERENCE_UP
    };

    LightEye {
        eye: centroid + to_light * standoff,
        target: centroid,
        up,
    }
}

/// Result of fitting one cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeFit {
    /// Virtual light camera the fit was made from.
    pub eye: LightEye,
    /// Padded light-view bounds the projection was built from.
    pub bounds: Aabb,
    /// World to light-view transform.
    pub light_view: Mat4,
    /// Orthographic projection of `bounds`.
    pub light_projection: Mat4,
    /// `light_projection * light_view`.
    pub light_view_projection: Mat4,
}

/// Fits light view-projections to frustum slices for one directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeFitter {
    to_light: Vec3,
    standoff: f32,
    z_padding: f32,
}

impl CascadeFitter {
    /// Create a fitter. `to_light` points from the scene toward the light and
    /// is normalized here.
    pub fn new(to_light: Vec3, standoff: f32, z_padding: f32) -> Result<Self> {
        let to_light = to_light
            .try_normalize()
            .ok_or(ShadowError::ZeroLightDirection)?;
        if !(standoff.is_finite() && standoff > 0.0) {
            return Err(ShadowError::InvalidStandoff(standoff));
        }
        if !(z_padding.is_finite() && z_padding >= 0.0) {
            return Err(ShadowError::InvalidPadding(z_padding));
        }

        Ok(Self {
            to_light,
            standoff,
            z_padding,
        })
    }

    /// Create a fitter with the standoff and padding of `config`.
    pub fn from_config(config: &CascadeConfig, to_light: Vec3) -> Result<Self> {
        Self::new(to_light, config.light_standoff, config.z_padding)
    }

    /// Normalized direction toward the light.
    pub fn to_light(&self) -> Vec3 {
        self.to_light
    }

    /// Fit the `[split_near, split_far]` slice of a camera frustum spanning
    /// `[near, far]`.
    pub fn fit(
        &self,
        frustum: &FrustumCorners,
        near: f32,
        far: f32,
        split_near: f32,
        split_far: f32,
    ) -> CascadeFit {
        self.fit_slice(&frustum.slice(near, far, split_near, split_far))
    }

    /// Fit an already extracted slice.
    pub fn fit_slice(&self, slice: &FrustumCorners) -> CascadeFit {
        let eye = light_eye(slice.centroid(), self.to_light, self.standoff);
        let light_view = eye.view_matrix();

        let tight = Aabb::from_points(
            slice
                .corners()
                .iter()
                .map(|corner| light_view.transform_point3(*corner)),
        );

        let (mut bounds, widened) = tight.with_min_extent(MIN_AXIS_EXTENT);
        if widened {
            trace!(size = ?tight.size(), "widened zero-extent light-space axis");
        }

        // The light looks down -Z, so the face toward it is max.z.
        bounds.max.z += self.z_padding;

        let light_projection = Mat4::orthographic_rh(
            bounds.min.x,
            bounds.max.x,
            bounds.min.y,
            bounds.max.y,
            -bounds.max.z,
            -bounds.min.z,
        );

        CascadeFit {
            eye,
            bounds,
            light_view,
            light_projection,
            light_view_projection: light_projection * light_view,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn camera_frustum() -> FrustumCorners {
        let eye = Vec3::new(0.0, 2.0, 10.0);
        let view = Mat4::look_at_rh(eye, Vec3::new(0.0, 0.0, -20.0), Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 100.0);
        FrustumCorners::from_inverse_view_projection((proj * view).inverse()).unwrap()
    }

    fn project(fit: &CascadeFit, point: Vec3) -> Vec3 {
        fit.light_view_projection.project_point3(point)
    }

    #[test]
    fn test_light_eye_uses_reference_up() {
        let to_light = Vec3::new(0.3, 1.0, 0.5).normalize();
        let eye = light_eye(Vec3::new(1.0, 2.0, 3.0), to_light, 10.0);

        assert_eq!(eye.up, REFERENCE_UP);
        assert_eq!(eye.target, Vec3::new(1.0, 2.0, 3.0));
        assert!(((eye.eye - eye.target).length() - 10.0).abs() < EPS);
    }

    #[test]
    fn test_light_eye_parallel_to_up_uses_alternate() {
        for to_light in [Vec3::Y, Vec3::NEG_Y] {
            let eye = light_eye(Vec3::ZERO, to_light, 5.0);
            assert_eq!(eye.up, ALTERNATE_UP);
            assert!(eye.view_matrix().is_finite());
        }
    }

    #[test]
    fn test_fit_is_tight_on_all_six_faces() {
        let frustum = camera_frustum();
        let fitter = CascadeFitter::new(Vec3::new(-0.4, 1.0, 0.3), 50.0, 0.0).unwrap();
        let fit = fitter.fit(&frustum, 0.1, 100.0, 5.0, 20.0);
        let slice = frustum.slice(0.1, 100.0, 5.0, 20.0);

        let projected: Vec<Vec3> = slice.corners().iter().map(|c| project(&fit, *c)).collect();
        let min = projected.iter().copied().fold(Vec3::splat(f32::MAX), Vec3::min);
        let max = projected.iter().copied().fold(Vec3::splat(f32::MIN), Vec3::max);

        assert!(min.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), EPS), "{:?}", min);
        assert!(max.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), EPS), "{:?}", max);
    }

    #[test]
    fn test_padding_reaches_occluders_toward_light() {
        let frustum = camera_frustum();
        let to_light = Vec3::new(0.2, 1.0, -0.1).normalize();
        let padded = CascadeFitter::new(to_light, 50.0, 30.0).unwrap();
        let unpadded = CascadeFitter::new(to_light, 50.0, 0.0).unwrap();

        let fit = padded.fit(&frustum, 0.1, 100.0, 0.1, 10.0);
        let tight = unpadded.fit(&frustum, 0.1, 100.0, 0.1, 10.0);
        let slice = frustum.slice(0.1, 100.0, 0.1, 10.0);

        // Slice corners stay inside [0, 1] and still touch the far face.
        let depths: Vec<f32> = slice.corners().iter().map(|c| project(&fit, *c).z).collect();
        let nearest = depths.iter().copied().fold(f32::MAX, f32::min);
        let farthest = depths.iter().copied().fold(f32::MIN, f32::max);
        assert!((farthest - 1.0).abs() < EPS);
        assert!(nearest > 0.0 && nearest < 1.0);

        // A caster hovering between the light and the slice.
        let occluder = slice.centroid() + to_light * 20.0;
        assert!(project(&tight, occluder).z < 0.0);
        let z = project(&fit, occluder).z;
        assert!((0.0..=1.0).contains(&z), "occluder depth {}", z);
    }

    #[test]
    fn test_standoff_does_not_change_projection() {
        let frustum = camera_frustum();
        let to_light = Vec3::new(1.0, 2.0, 0.5);
        let near_eye = CascadeFitter::new(to_light, 5.0, 10.0).unwrap();
        let far_eye = CascadeFitter::new(to_light, 500.0, 10.0).unwrap();

        let a = near_eye.fit(&frustum, 0.1, 100.0, 20.0, 60.0);
        let b = far_eye.fit(&frustum, 0.1, 100.0, 20.0, 60.0);
        for corner in frustum.corners() {
            assert!(project(&a, *corner).abs_diff_eq(project(&b, *corner), 1e-3));
        }
    }

    #[test]
    fn test_zero_thickness_slice_stays_finite() {
        // Camera looking down -Z, light straight down the view axis: the slice
        // is a quad facing the light and has no light-space depth at all.
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 1.0, 10.0);
        let frustum = FrustumCorners::from_inverse_view_projection(proj.inverse()).unwrap();
        let fitter = CascadeFitter::new(Vec3::Z, 10.0, 0.0).unwrap();

        let fit = fitter.fit(&frustum, 1.0, 10.0, 4.0, 4.0);
        assert!(fit.light_view_projection.is_finite());
        assert!((fit.bounds.size().z - MIN_AXIS_EXTENT).abs() < 1e-5);

        let slice = frustum.slice(1.0, 10.0, 4.0, 4.0);
        for corner in slice.corners() {
            let p = project(&fit, *corner);
            assert!(p.is_finite());
            assert!(p.x.abs() <= 1.0 + EPS && p.y.abs() <= 1.0 + EPS);
            assert!((p.z - 0.5).abs() < 1e-2);
        }
    }

    #[test]
    fn test_zero_thickness_slice_far_from_light_stays_finite() {
        let proj = Mat4::perspective_rh(90f32.to_radians(), 1.0, 1.0, 10.0);
        let frustum = FrustumCorners::from_inverse_view_projection(proj.inverse()).unwrap();
        let slice = frustum.slice(1.0, 10.0, 4.0, 4.0);

        for standoff in [1.0e4, 1.0e5, 1.0e6] {
            let fitter = CascadeFitter::new(Vec3::Z, standoff, 0.0).unwrap();
            let fit = fitter.fit(&frustum, 1.0, 10.0, 4.0, 4.0);

            assert!(fit.light_view_projection.is_finite(), "standoff {}", standoff);
            assert!(fit.bounds.size().z > 0.0, "standoff {}", standoff);
            for corner in slice.corners() {
                let p = project(&fit, *corner);
                assert!(p.is_finite());
                assert!(p.x.abs() <= 1.0 + 1e-3 && p.y.abs() <= 1.0 + 1e-3);
            }
        }
    }

    #[test]
    fn test_parallel_light_fit_is_finite() {
        let frustum = camera_frustum();
        let fitter = CascadeFitter::new(Vec3::Y * 3.0, 50.0, 10.0).unwrap();
        assert_eq!(fitter.to_light(), Vec3::Y);

        let fit = fitter.fit(&frustum, 0.1, 100.0, 0.1, 30.0);
        assert_eq!(fit.eye.up, ALTERNATE_UP);
        assert!(fit.light_view_projection.is_finite());
    }

    #[test]
    fn test_fitter_rejects_bad_inputs() {
        assert_eq!(
            CascadeFitter::new(Vec3::ZERO, 10.0, 1.0),
            Err(ShadowError::ZeroLightDirection)
        );
        assert_eq!(
            CascadeFitter::new(Vec3::Y, -1.0, 1.0),
            Err(ShadowError::InvalidStandoff(-1.0))
        );
        assert_eq!(
            CascadeFitter::new(Vec3::Y, 1.0, -1.0),
            Err(ShadowError::InvalidPadding(-1.0))
        );
    }
}

//! Light types
//!
//! Directional and ambient lights, plus the split of a shaded result into
//! terms so shadowing can be applied to the right ones.

use glam::Vec3;

/// Ambient light that illuminates all surfaces equally.
#[derive(Debug, Clone)]
pub struct AmbientLight {
    /// Light intensity (0.0 - 1.0).
    pub intensity: f32,
    /// Light color (RGB).
    pub color: [f32; 3],
}

impl AmbientLight {
    /// Create a new ambient light.
    pub fn new(intensity: f32, color: [f32; 3]) -> Self {
        Self { intensity, color }
    }

    /// Create a white ambient light.
    pub fn white(intensity: f32) -> Self {
        Self::new(intensity, [1.0, 1.0, 1.0])
    }

    /// Color scaled by intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color) * self.intensity
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self::white(0.3)
    }
}

/// Directional light that illuminates from a direction.
#[derive(Debug, Clone)]
pub struct DirectionalLight {
    /// Light intensity (0.0 - 1.0+).
    pub intensity: f32,
    /// Light color (RGB).
    pub color: [f32; 3],
    /// Direction the light travels (normalized, zero if given a zero vector).
    pub direction: Vec3,
}

impl DirectionalLight {
    /// Create a new directional light.
    pub fn new(intensity: f32, color: [f32; 3], direction: Vec3) -> Self {
        Self {
            intensity,
            color,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a white directional light.
    pub fn white(intensity: f32, direction: Vec3) -> Self {
        Self::new(intensity, [1.0, 1.0, 1.0], direction)
    }

    /// Unit vector from a surface toward the light.
    pub fn to_light(&self) -> Vec3 {
        -self.direction
    }

    /// Color scaled by intensity.
    pub fn radiance(&self) -> Vec3 {
        Vec3::from_array(self.color) * self.intensity
    }

    /// Blinn-Phong terms for a surface lit by this light and `ambient`.
    pub fn terms(
        &self,
        ambient: &AmbientLight,
        normal: Vec3,
        to_viewer: Vec3,
        albedo: Vec3,
        shininess: f32,
    ) -> LightingTerms {
        let normal = normal.normalize_or_zero();
        let to_light = self.to_light();
        let radiance = self.radiance();

        let n_dot_l = normal.dot(to_light).max(0.0);
        let diffuse = albedo * radiance * n_dot_l;

        let half = (to_light + to_viewer.normalize_or_zero()).normalize_or_zero();
        let specular = if n_dot_l > 0.0 {
            radiance * normal.dot(half).max(0.0).powf(shininess)
        } else {
            Vec3::ZERO
        };

        LightingTerms {
            ambient: albedo * ambient.radiance(),
            diffuse,
            specular,
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::white(1.0, Vec3::new(-0.3, -1.0, -0.5))
    }
}

/// Shaded result kept as separate terms until shadowing is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingTerms {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightingTerms {
    /// Combine the terms under a shadow factor in `[0, 1]`.
    ///
    /// Shadowing scales diffuse and specular only, so a fully shadowed
    /// surface keeps its ambient contribution.
    pub fn resolve(&self, shadow_factor: f32) -> Vec3 {
        self.ambient + (self.diffuse + self.specular) * shadow_factor.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directional_light_normalizes() {
        let light = DirectionalLight::white(1.0, Vec3::new(0.0, -4.0, 0.0));
        assert_eq!(light.direction, Vec3::NEG_Y);
        assert_eq!(light.to_light(), Vec3::Y);

        let zero = DirectionalLight::white(1.0, Vec3::ZERO);
        assert_eq!(zero.direction, Vec3::ZERO);
    }

    #[test]
    fn test_overhead_light_terms() {
        let light = DirectionalLight::new(2.0, [1.0, 0.5, 0.25], Vec3::NEG_Y);
        let ambient = AmbientLight::white(0.1);
        let albedo = Vec3::new(0.5, 0.5, 0.5);

        let terms = light.terms(&ambient, Vec3::Y, Vec3::Y, albedo, 32.0);
        assert!(terms.diffuse.abs_diff_eq(Vec3::new(1.0, 0.5, 0.25), 1e-6));
        assert!(terms.specular.abs_diff_eq(Vec3::new(2.0, 1.0, 0.5), 1e-5));
        assert!(terms.ambient.abs_diff_eq(Vec3::splat(0.05), 1e-6));
    }

    #[test]
    fn test_back_facing_surface_gets_ambient_only() {
        let light = DirectionalLight::white(1.0, Vec3::NEG_Y);
        let terms = light.terms(&AmbientLight::default(), Vec3::NEG_Y, Vec3::Y, Vec3::ONE, 8.0);
        assert_eq!(terms.diffuse, Vec3::ZERO);
        assert_eq!(terms.specular, Vec3::ZERO);
        assert_eq!(terms.resolve(1.0), terms.ambient);
    }

    #[test]
    fn test_shadow_scales_direct_terms_only() {
        let terms = LightingTerms {
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::splat(0.6),
            specular: Vec3::splat(0.2),
        };

        assert!(terms.resolve(1.0).abs_diff_eq(Vec3::splat(0.9), 1e-6));
        assert!(terms.resolve(0.5).abs_diff_eq(Vec3::splat(0.5), 1e-6));
        assert_eq!(terms.resolve(0.0), Vec3::splat(0.1));
        assert_eq!(terms.resolve(-3.0), Vec3::splat(0.1));
    }
}

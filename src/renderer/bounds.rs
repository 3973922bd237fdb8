//! Axis-aligned bounding boxes

use glam::Vec3;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from a set of points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);

        for p in points {
            min = min.min(p);
            max = max.max(p);
        }

        Self { min, max }
    }

    /// Get the center of the AABB.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size of the AABB.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Widen every axis thinner than `min_extent` symmetrically about its
    /// center. Returns the box and whether any axis was widened.
    ///
    /// Far from the origin `min_extent` can be smaller than the float spacing
    /// at the center, so the extent also scales with the center's magnitude
    /// and a widened axis always has `max > min`.
    pub fn with_min_extent(&self, min_extent: f32) -> (Self, bool) {
        let mut min = self.min;
        let mut max = self.max;
        let mut widened = false;

        for axis in 0..3 {
            let mid = (min[axis] + max[axis]) * 0.5;
            let extent = min_extent.max(mid.abs() * 4.0 * f32::EPSILON);
            if max[axis] - min[axis] < extent {
                min[axis] = mid - extent * 0.5;
                max[axis] = mid + extent * 0.5;
                widened = true;
            }
        }

        (Self { min, max }, widened)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_points() {
        let aabb = Aabb::from_points([
            Vec3::new(1.0, -2.0, 3.0),
            Vec3::new(-1.0, 4.0, 0.5),
            Vec3::new(0.0, 0.0, -7.0),
        ]);
        assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, -7.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 4.0, 3.0));
        assert_eq!(aabb.center(), Vec3::new(0.0, 1.0, -2.0));
        assert_eq!(aabb.size(), Vec3::new(2.0, 6.0, 10.0));
    }

    #[test]
    fn test_min_extent_widens_flat_axis_only() {
        let flat = Aabb::new(Vec3::new(-1.0, 2.0, -3.0), Vec3::new(1.0, 2.0, 3.0));
        let (widened, changed) = flat.with_min_extent(0.5);

        assert!(changed);
        assert_eq!(widened.min.x, -1.0);
        assert_eq!(widened.max.x, 1.0);
        assert!((widened.min.y - 1.75).abs() < 1e-6);
        assert!((widened.max.y - 2.25).abs() < 1e-6);
        assert_eq!(widened.center(), flat.center());

        let (same, changed) = widened.with_min_extent(0.5);
        assert!(!changed);
        assert_eq!(same, widened);
    }

    #[test]
    fn test_min_extent_survives_large_coordinates() {
        for depth in [-1.0e4f32, -1.0e5, -1.0e6, 3.0e7] {
            let flat = Aabb::new(Vec3::new(-1.0, -1.0, depth), Vec3::new(1.0, 1.0, depth));
            let (widened, changed) = flat.with_min_extent(1e-3);

            assert!(changed);
            assert!(widened.max.z > widened.min.z, "collapsed at {}", depth);
            assert!(widened.size().z >= 1e-3);
            assert!(widened.min.is_finite() && widened.max.is_finite());
        }
    }
}

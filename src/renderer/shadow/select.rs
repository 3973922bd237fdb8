//! Shading-time cascade selection

use glam::Vec3;

/// Pick the cascade covering `surface`, or `None` beyond the last split.
///
/// Selection uses the Euclidean distance from the camera and the smallest
/// `i` with `distance <= splits[i]`, so a point exactly on a boundary belongs
/// to the nearer cascade. `None` means the surface is outside shadow
/// coverage and receives full lighting.
pub fn select_cascade(surface: Vec3, camera_position: Vec3, splits: &[f32]) -> Option<usize> {
    let distance = surface.distance(camera_position);
    splits.iter().position(|&split| distance <= split)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPLITS: [f32; 3] = [10.0, 30.0, 100.0];

    #[test]
    fn test_selects_smallest_covering_cascade() {
        let camera = Vec3::new(1.0, 2.0, 3.0);
        let along = |d: f32| camera + Vec3::new(0.0, 0.0, -d);

        assert_eq!(select_cascade(along(0.5), camera, &SPLITS), Some(0));
        assert_eq!(select_cascade(along(15.0), camera, &SPLITS), Some(1));
        assert_eq!(select_cascade(along(99.0), camera, &SPLITS), Some(2));
    }

    #[test]
    fn test_boundary_goes_to_nearer_cascade() {
        let camera = Vec3::ZERO;
        assert_eq!(select_cascade(Vec3::new(10.0, 0.0, 0.0), camera, &SPLITS), Some(0));
        assert_eq!(select_cascade(Vec3::new(0.0, -30.0, 0.0), camera, &SPLITS), Some(1));
        assert_eq!(select_cascade(Vec3::new(0.0, 0.0, 100.0), camera, &SPLITS), Some(2));
    }

    #[test]
    fn test_beyond_last_split_is_unshadowed() {
        let camera = Vec3::ZERO;
        assert_eq!(select_cascade(Vec3::new(0.0, 0.0, -100.5), camera, &SPLITS), None);
        assert_eq!(select_cascade(Vec3::splat(1000.0), camera, &SPLITS), None);
    }

    #[test]
    fn test_distance_is_radial_not_view_depth() {
        // 8 units deep along -Z, exactly 10 units from the camera
        let surface = Vec3::new(6.0, 0.0, -8.0);
        assert_eq!(select_cascade(surface, Vec3::ZERO, &SPLITS), Some(0));
        let surface = Vec3::new(6.1, 0.0, -8.0);
        assert_eq!(select_cascade(surface, Vec3::ZERO, &SPLITS), Some(1));
    }
}

//! Gaze → ground-plane raycast.
//!
//! A head pose is a position plus a unit quaternion.  The viewer looks along
//! [`LOOK_AXIS`] in its local frame, so the world-space gaze direction is that
//! axis rotated by the orientation.  The ray `origin + t * dir` meets the
//! ground (`y = 0`) at `t = -origin.y / dir.y`.
//!
//! Two cases yield no intersection:
//!
//! * `|dir.y| < GROUND_EPSILON` – the gaze is parallel (or nearly so) to the
//!   ground and `t` is unbounded.
//! * `t <= 0` – the ground point lies behind the viewer, i.e. the gaze is
//!   above the horizon.

use tracing::trace;

use crate::transform::{Quaternion, Vec3};

/// Local look direction of a scene camera.
pub const LOOK_AXIS: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Smallest `|dir.y|` accepted by [`ground_intersection`].
pub const GROUND_EPSILON: f64 = 1e-6;

/// World-space gaze direction for a head with orientation `q`.
pub fn gaze_direction(q: Quaternion) -> Vec3 {
    q.normalized().rotate(LOOK_AXIS)
}

/// Intersect the ray `origin + t * dir` with the ground plane `y = 0`.
///
/// Returns the ground point (with `y == 0`) or `None` when the ray is
/// degenerate or points away from the ground.
///
/// ```rust
/// use scenelink_geometry::{ground_intersection, Vec3};
///
/// let hit = ground_intersection(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
/// assert_eq!(hit, Some(Vec3::new(0.0, 0.0, 0.0)));
/// ```
pub fn ground_intersection(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    if dir.y.abs() < GROUND_EPSILON {
        trace!(dir_y = dir.y, "gaze parallel to ground");
        return None;
    }
    let t = -origin.y / dir.y;
    if t <= 0.0 {
        trace!(t, "ground point behind viewer");
        return None;
    }
    Some(Vec3::new(origin.x + t * dir.x, 0.0, origin.z + t * dir.z))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn straight_down_hits_directly_below() {
        let hit = ground_intersection(Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(hit, Some(Vec3::new(0.0, 0.0, 0.0)));
    }

    #[test]
    fn forty_five_degrees_down_travels_height_forward() {
        let dir = Vec3::new(0.0, -1.0, -1.0);
        let hit = ground_intersection(Vec3::new(2.0, 1.5, 3.0), dir).unwrap();
        assert!((hit.x - 2.0).abs() < 1e-12);
        assert!((hit.z - 1.5).abs() < 1e-12);
        assert_eq!(hit.y, 0.0);
    }

    #[test]
    fn parallel_gaze_yields_none() {
        assert!(ground_intersection(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 0.0, -1.0)).is_none());
        assert!(ground_intersection(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 1e-9, -1.0)).is_none());
    }

    #[test]
    fn upward_gaze_yields_none() {
        assert!(ground_intersection(Vec3::new(0.0, 1.6, 0.0), Vec3::new(0.0, 0.5, -1.0)).is_none());
    }

    #[test]
    fn identity_head_looks_along_negative_z() {
        assert_eq!(gaze_direction(Quaternion::identity()), LOOK_AXIS);
    }

    #[test]
    fn pitched_down_head_looks_at_floor() {
        // -90° about +X tips the -Z look axis onto -Y.
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), -FRAC_PI_2);
        let dir = gaze_direction(q);
        assert!((dir.y + 1.0).abs() < 1e-9, "y={}", dir.y);

        let hit = ground_intersection(Vec3::new(0.0, 1.0, 0.0), dir).unwrap();
        assert!(hit.x.abs() < 1e-9);
        assert!(hit.z.abs() < 1e-9);
    }
}

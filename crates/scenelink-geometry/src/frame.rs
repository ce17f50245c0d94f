//! Tracking frame → scene frame.
//!
//! The tracker reports planar `(x, y)` in meters and a heading in degrees.
//! The scene's horizontal axes are swapped relative to that frame:
//! `scene.x = tracking.y`, `scene.z = tracking.x`.  Height is not tracked and
//! comes from a fixed per-object offset.
//!
//! Orientation is not derived from a formula.  Each object role carries a
//! [`RotationRule`]: a fixed base rotation plus the axis that receives the
//! tracked heading and a constant offset added to it.

use serde::{Deserialize, Serialize};

use crate::transform::{Euler, Vec3};

/// Map a planar tracking-frame position into scene coordinates.
///
/// ```rust
/// use scenelink_geometry::frame::tracking_to_scene;
///
/// let p = tracking_to_scene(0.5, 0.25, -0.01);
/// assert_eq!((p.x, p.y, p.z), (0.25, -0.01, 0.5));
/// ```
pub fn tracking_to_scene(tracking_x: f64, tracking_y: f64, y_offset: f64) -> Vec3 {
    Vec3::new(tracking_y, y_offset, tracking_x)
}

/// Map a 3D tracked point into scene coordinates.
///
/// Point trackers already report in the scene's horizontal orientation, so
/// nothing is swapped: `scene.x = x`, `scene.z = y`, and the reported height
/// becomes `scene.y`.
///
/// ```rust
/// use scenelink_geometry::frame::point_to_scene;
///
/// let p = point_to_scene(0.1, 0.2, 0.3);
/// assert_eq!((p.x, p.y, p.z), (0.1, 0.3, 0.2));
/// ```
pub fn point_to_scene(x: f64, y: f64, height: f64) -> Vec3 {
    Vec3::new(x, height, y)
}

/// Scene rotation axis that receives the tracked heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingAxis {
    X,
    Y,
    Z,
}

/// One row of the per-role orientation table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationRule {
    /// Fixed rotation of the visual asset.  The component on
    /// [`heading_axis`](Self::heading_axis) is overwritten.
    pub base: Euler,
    pub heading_axis: HeadingAxis,
    /// Degrees added to the tracked heading.
    pub heading_offset_deg: f64,
}

impl RotationRule {
    /// Rotation published for a tracked heading of `theta_deg`.
    pub fn apply(&self, theta_deg: f64) -> Euler {
        let heading = theta_deg + self.heading_offset_deg;
        let mut out = self.base;
        match self.heading_axis {
            HeadingAxis::X => out.x = heading,
            HeadingAxis::Y => out.y = heading,
            HeadingAxis::Z => out.z = heading,
        }
        out
    }
}

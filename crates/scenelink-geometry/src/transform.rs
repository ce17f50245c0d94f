//! Scene-space primitives.
//!
//! The remote scene is Y-up and right-handed: `x` and `z` span the ground
//! plane, `y` is height.  Rotations travel over the wire as Euler angles in
//! degrees, but head poses arrive as unit quaternions, so both forms live
//! here.
//!
//! # Example
//!
//! ```rust
//! use scenelink_geometry::transform::{Quaternion, Vec3};
//!
//! // 90° about +Y turns the scene's -Z look axis into -X.
//! let q = Quaternion::from_axis_angle(Vec3::new(0.0, 1.0, 0.0), 90f64.to_radians());
//! let v = q.rotate(Vec3::new(0.0, 0.0, -1.0));
//! assert!((v.x + 1.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Vec3
// ────────────────────────────────────────────────────────────────────────────

/// A 3-D vector in scene coordinates (meters).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn length(self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// `true` when every component is exactly zero.
    ///
    /// XR runtimes report a hand at the origin when tracking drops out, so an
    /// exact comparison is what callers want here.
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Quaternion
// ────────────────────────────────────────────────────────────────────────────

/// A unit quaternion representing a 3-D rotation (w, x, y, z convention).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// Rotation of `angle_rad` about `axis` (need not be normalised).
    pub fn from_axis_angle(axis: Vec3, angle_rad: f64) -> Self {
        let len = axis.length();
        if len == 0.0 {
            return Self::identity();
        }
        let half = angle_rad * 0.5;
        let s = half.sin() / len;
        Self::new(half.cos(), axis.x * s, axis.y * s, axis.z * s)
    }

    /// Scale to unit length.  A zero quaternion becomes the identity.
    pub fn normalized(self) -> Self {
        let n = (self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if n == 0.0 {
            return Self::identity();
        }
        Self::new(self.w / n, self.x / n, self.y / n, self.z / n)
    }

    /// Hamilton product: compose two rotations.
    pub fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        )
    }

    /// Conjugate (== inverse for a unit quaternion).
    pub fn conjugate(self) -> Self {
        Self::new(self.w, -self.x, -self.y, -self.z)
    }

    /// Rotate a vector by this quaternion: p' = q * p * q*.
    pub fn rotate(self, v: Vec3) -> Vec3 {
        let p = Self::new(0.0, v.x, v.y, v.z);
        let rotated = self.mul(p).mul(self.conjugate());
        Vec3::new(rotated.x, rotated.y, rotated.z)
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Euler
// ────────────────────────────────────────────────────────────────────────────

/// Euler rotation in degrees, as the scene expects it on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_1_SQRT_2;

    // ── Vec3 ────────────────────────────────────────────────────────────────

    #[test]
    fn vec3_is_zero_is_exact() {
        assert!(Vec3::zero().is_zero());
        assert!(!Vec3::new(0.0, 1e-12, 0.0).is_zero());
    }

    // ── Quaternion ──────────────────────────────────────────────────────────

    #[test]
    fn quaternion_identity_rotate_is_noop() {
        let r = Quaternion::identity().rotate(Vec3::new(1.0, 2.0, 3.0));
        assert!((r.x - 1.0).abs() < 1e-12);
        assert!((r.y - 2.0).abs() < 1e-12);
        assert!((r.z - 3.0).abs() < 1e-12);
    }

    #[test]
    fn quaternion_90deg_about_z_rotates_x_to_y() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let r = q.rotate(Vec3::new(1.0, 0.0, 0.0));
        assert!(r.x.abs() < 1e-9, "x should be ~0, got {}", r.x);
        assert!((r.y - 1.0).abs() < 1e-9, "y should be ~1, got {}", r.y);
        assert!(r.z.abs() < 1e-9);
    }

    #[test]
    fn from_axis_angle_matches_literal_quaternion() {
        let q = Quaternion::from_axis_angle(Vec3::new(0.0, 0.0, 2.0), std::f64::consts::FRAC_PI_2);
        assert!((q.w - FRAC_1_SQRT_2).abs() < 1e-12);
        assert!((q.z - FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn from_axis_angle_zero_axis_is_identity() {
        assert_eq!(
            Quaternion::from_axis_angle(Vec3::zero(), 1.0),
            Quaternion::identity()
        );
    }

    #[test]
    fn quaternion_conjugate_is_inverse() {
        let q = Quaternion::new(FRAC_1_SQRT_2, 0.0, 0.0, FRAC_1_SQRT_2);
        let prod = q.mul(q.conjugate());
        assert!((prod.w - 1.0).abs() < 1e-12);
        assert!(prod.x.abs() < 1e-12);
        assert!(prod.y.abs() < 1e-12);
        assert!(prod.z.abs() < 1e-12);
    }

    #[test]
    fn normalized_rescales_to_unit_length() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0).normalized();
        assert_eq!(q, Quaternion::identity());
        assert_eq!(Quaternion::new(0.0, 0.0, 0.0, 0.0).normalized(), Quaternion::identity());
    }

    #[test]
    fn euler_serializes_as_xyz_object() {
        let json = serde_json::to_string(&Euler::new(90.0, 180.0, 0.0)).unwrap();
        assert_eq!(json, r#"{"x":90.0,"y":180.0,"z":0.0}"#);
    }
}

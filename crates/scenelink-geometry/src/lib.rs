//! `scenelink-geometry` – vector math shared by the relay.
//!
//! # Modules
//!
//! - [`transform`] – [`Vec3`][transform::Vec3],
//!   [`Quaternion`][transform::Quaternion] and [`Euler`][transform::Euler]
//!   primitives in the scene's right-handed, Y-up convention.
//! - [`frame`] – remapping from the planar tracking frame (or a 3D tracked
//!   point) into scene coordinates, plus the per-role [`RotationRule`][frame::RotationRule]
//!   table entries.
//! - [`raycast`] – gaze direction and ground-plane intersection used to place
//!   the waypoint indicator.

pub mod frame;
pub mod raycast;
pub mod transform;

pub use frame::{HeadingAxis, RotationRule, point_to_scene, tracking_to_scene};
pub use raycast::{GROUND_EPSILON, LOOK_AXIS, gaze_direction, ground_intersection};
pub use transform::{Euler, Quaternion, Vec3};

//! `scenelink-state` – shared relay state.
//!
//! Nothing here performs I/O.  Both stores are safe to share behind an
//! [`Arc`](std::sync::Arc) between the HTTP handlers, the publish loop and the
//! interaction handler.
//!
//! # Modules
//!
//! - [`pose_store`] – [`PoseStore`][pose_store::PoseStore]: latest
//!   [`TrackedObjectState`][scenelink_types::TrackedObjectState] per
//!   statically configured object, one lock per entry.
//! - [`waypoint`] – [`WaypointSlot`][waypoint::WaypointSlot]: the single
//!   pending waypoint with an atomic check-and-set commit.

pub mod pose_store;
pub mod waypoint;

pub use pose_store::PoseStore;
pub use waypoint::WaypointSlot;

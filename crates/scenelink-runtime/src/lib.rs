//! `scenelink-runtime` – the relay itself.
//!
//! Wires the shared state from `scenelink-state` to a
//! [`SceneClient`][scenelink_middleware::SceneClient].
//!
//! # Modules
//!
//! - [`config`] – [`RelayConfig`][config::RelayConfig]: tracked objects,
//!   indicator, interaction mode and timing.
//! - [`publisher`] – [`PublishLoop`][publisher::PublishLoop]: the
//!   fixed-interval tick that pushes every object's transform to the scene,
//!   and [`scene_transform`][publisher::scene_transform], the pure
//!   tracking-to-scene mapping it applies.
//! - [`negotiator`] – [`WaypointNegotiator`][negotiator::WaypointNegotiator]:
//!   turns head-gaze, hand and click events into indicator moves and waypoint
//!   commits; serves poll / acknowledge for the tracking process.
//! - [`service`] – [`Relay`][service::Relay]: owns all of the above, creates
//!   the scene objects once, then runs the publish loop and the event pump
//!   until shutdown.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: global
//!   `tracing` subscriber with optional OTLP export.

pub mod config;
pub mod negotiator;
pub mod publisher;
pub mod service;
pub mod telemetry;

pub use config::RelayConfig;
pub use negotiator::WaypointNegotiator;
pub use publisher::{PublishLoop, initial_object, scene_transform};
pub use service::Relay;
pub use telemetry::{TracerProviderGuard, init_tracing};

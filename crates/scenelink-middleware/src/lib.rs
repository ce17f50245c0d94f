//! `scenelink-middleware` – the remote scene boundary.
//!
//! The relay never speaks the scene's wire format directly.  It talks to a
//! [`SceneClient`], and the client translates object registrations and
//! transform updates outward and raw inbound messages into typed
//! [`InteractionEvent`][scenelink_types::InteractionEvent]s.
//!
//! # Modules
//!
//! - [`scene`] – the [`SceneClient`] trait.
//! - [`protocol`] – JSON object frames and inbound event classification.
//! - [`ws_scene`] – [`WsSceneClient`]: WebSocket connection to a hosted
//!   scene.
//! - [`recording`] – [`RecordingScene`]: in-memory client for tests and
//!   dry runs.

pub mod protocol;
pub mod recording;
pub mod scene;
pub mod ws_scene;

pub use recording::{RecordingScene, SceneCall};
pub use scene::SceneClient;
pub use ws_scene::WsSceneClient;

//! In-process scene for tests and dry runs.
//!
//! [`RecordingScene`] stores every call it receives and lets the caller
//! inject interaction events, so the full relay can run headless without a
//! scene server.
//!
//! # Example
//!
//! ```rust
//! use scenelink_middleware::{RecordingScene, SceneClient};
//! use scenelink_types::SceneUpdate;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let scene = RecordingScene::new();
//! scene.update_object(&SceneUpdate::new("cube1")).await.unwrap();
//! assert_eq!(scene.updates_for("cube1").len(), 1);
//! # });
//! ```

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use scenelink_types::{InteractionEvent, RelayError, SceneObject, SceneUpdate};
use tokio::sync::{broadcast, watch};
use tracing::debug;

use crate::scene::{SceneClient, broadcast_stream};

/// One call received by a [`RecordingScene`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneCall {
    Create(SceneObject),
    Update(SceneUpdate),
}

/// [`SceneClient`] that records calls instead of sending them anywhere.
pub struct RecordingScene {
    calls: Mutex<Vec<SceneCall>>,
    failing: Mutex<HashSet<String>>,
    /// While `true`, `update_object` waits before recording.
    paused: watch::Sender<bool>,
    events: broadcast::Sender<InteractionEvent>,
}

impl RecordingScene {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            paused: watch::Sender::new(false),
            events,
        }
    }

    /// Make every later update to `object_id` fail with
    /// [`RelayError::Scene`].
    pub fn fail_updates_for(&self, object_id: &str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(object_id.to_string());
    }

    /// Hold every later `update_object` call until [`Self::resume_updates`],
    /// like a scene that has stopped acknowledging writes.
    pub fn pause_updates(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume_updates(&self) {
        self.paused.send_replace(false);
    }

    /// Deliver `event` to every stream returned by [`SceneClient::events`].
    ///
    /// Returns the number of subscribers that received it.
    pub fn inject(&self, event: InteractionEvent) -> usize {
        self.events.send(event).unwrap_or(0)
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<SceneCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn created(&self) -> Vec<SceneObject> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SceneCall::Create(o) => Some(o),
                SceneCall::Update(_) => None,
            })
            .collect()
    }

    pub fn updates_for(&self, object_id: &str) -> Vec<SceneUpdate> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                SceneCall::Update(u) if u.object_id == object_id => Some(u),
                _ => None,
            })
            .collect()
    }

    pub fn last_update_for(&self, object_id: &str) -> Option<SceneUpdate> {
        self.updates_for(object_id).pop()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn record(&self, call: SceneCall) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }
}

impl Default for RecordingScene {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneClient for RecordingScene {
    async fn create_object(&self, object: &SceneObject) -> Result<(), RelayError> {
        debug!(object_id = %object.object_id, "recorded create");
        self.record(SceneCall::Create(object.clone()));
        Ok(())
    }

    async fn update_object(&self, update: &SceneUpdate) -> Result<(), RelayError> {
        let mut paused = self.paused.subscribe();
        // Only fails once the sender is gone, which cannot outlive `self`.
        let _ = paused.wait_for(|p| !*p).await;
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&update.object_id);
        if failing {
            return Err(RelayError::Scene(format!(
                "update to '{}' rejected",
                update.object_id
            )));
        }
        self.record(SceneCall::Update(update.clone()));
        Ok(())
    }

    async fn events(&self) -> BoxStream<'static, InteractionEvent> {
        broadcast_stream(self.events.subscribe())
    }
}

//! [`PoseStore`] – latest pose per tracked object.
//!
//! The set of object ids is fixed at construction.  Each entry has its own
//! [`Mutex`], so reports for different objects never contend and a single
//! report is atomic with respect to [`PoseStore::snapshot`].  A snapshot is
//! consistent per object only; it may mix entries from before and after a
//! concurrent report to another object.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use scenelink_types::{RelayError, TrackedObjectState};
use tracing::{debug, warn};

/// Latest [`TrackedObjectState`] for every configured object.
///
/// # Example
///
/// ```
/// use scenelink_state::PoseStore;
/// use scenelink_types::TrackedObjectState;
///
/// let store = PoseStore::new(["cozmo", "cube1"]);
/// let state = TrackedObjectState { position_x: 0.5, position_y: 0.25, heading: 10.0, visible: true, ..Default::default() };
///
/// store.report("cube1", state).unwrap();
/// assert!(store.report("ghost", state).is_err());
/// assert_eq!(store.snapshot()["cube1"], state);
/// ```
#[derive(Debug)]
pub struct PoseStore {
    entries: HashMap<String, Mutex<TrackedObjectState>>,
}

impl PoseStore {
    /// Create a store for `ids`, each starting at the origin and not visible.
    ///
    /// Duplicate ids collapse into one entry.
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut entries = HashMap::new();
        for id in ids {
            let id = id.into();
            if entries.contains_key(&id) {
                warn!(object_id = %id, "duplicate tracked object id ignored");
                continue;
            }
            entries.insert(id, Mutex::new(TrackedObjectState::default()));
        }
        Self { entries }
    }

    /// Replace the full state of `object_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::UnknownObject`] when `object_id` was not part of
    /// the configured set.  No entry is touched in that case.
    pub fn report(&self, object_id: &str, state: TrackedObjectState) -> Result<(), RelayError> {
        let Some(entry) = self.entries.get(object_id) else {
            return Err(RelayError::UnknownObject(object_id.to_string()));
        };
        *entry.lock().unwrap_or_else(PoisonError::into_inner) = state;
        debug!(
            object_id,
            x = state.position_x,
            y = state.position_y,
            theta = state.heading,
            visible = state.visible,
            "pose report"
        );
        Ok(())
    }

    /// Current state of `object_id`, or `None` for unknown ids.
    pub fn get(&self, object_id: &str) -> Option<TrackedObjectState> {
        self.entries
            .get(object_id)
            .map(|m| *m.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Copy of every entry.
    pub fn snapshot(&self) -> HashMap<String, TrackedObjectState> {
        self.entries
            .iter()
            .map(|(id, m)| (id.clone(), *m.lock().unwrap_or_else(PoisonError::into_inner)))
            .collect()
    }
}

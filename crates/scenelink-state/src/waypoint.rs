//! [`WaypointSlot`] – the single pending navigation target.
//!
//! ```text
//!   EMPTY ──commit──▶ PENDING ──acknowledge──▶ EMPTY
//!                       │  ▲
//!                       └──┘ commit (no-op)
//! ```
//!
//! The first commit wins until the tracking process acknowledges it.  Polling
//! never clears the slot.

use std::sync::{Mutex, PoisonError};

use scenelink_types::Waypoint;
use tracing::{debug, info};

/// Holds at most one pending [`Waypoint`].
///
/// # Example
///
/// ```
/// use scenelink_state::WaypointSlot;
/// use scenelink_types::Waypoint;
///
/// let slot = WaypointSlot::new();
/// assert!(slot.commit(Waypoint::new(1.0, 2.0)));
/// assert!(!slot.commit(Waypoint::new(3.0, 4.0)));
/// assert_eq!(slot.poll(), Some(Waypoint::new(1.0, 2.0)));
///
/// slot.acknowledge();
/// assert_eq!(slot.poll(), None);
/// ```
#[derive(Debug, Default)]
pub struct WaypointSlot {
    pending: Mutex<Option<Waypoint>>,
}

impl WaypointSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `waypoint` if nothing is pending.
    ///
    /// Returns `true` when the waypoint was stored, `false` when another one
    /// was already pending (in which case the slot is unchanged).
    pub fn commit(&self, waypoint: Waypoint) -> bool {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if pending.is_some() {
            debug!(
                target_x = waypoint.target_x,
                target_z = waypoint.target_z,
                "waypoint already pending; commit ignored"
            );
            return false;
        }
        *pending = Some(waypoint);
        info!(
            target_x = waypoint.target_x,
            target_z = waypoint.target_z,
            "waypoint committed"
        );
        true
    }

    /// The pending waypoint, if any.  Does not clear it.
    pub fn poll(&self) -> Option<Waypoint> {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the slot unconditionally, returning what was pending.
    pub fn acknowledge(&self) -> Option<Waypoint> {
        let cleared = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if cleared.is_some() {
            info!("waypoint acknowledged");
        }
        cleared
    }

    pub fn is_pending(&self) -> bool {
        self.poll().is_some()
    }
}

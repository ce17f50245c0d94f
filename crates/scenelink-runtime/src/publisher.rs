//! [`PublishLoop`] – fixed-interval transform publishing.
//!
//! Each tick takes one [`PoseStore::snapshot`] and sends one
//! [`SceneUpdate`] per configured object, in configuration order.  Ticks are
//! strictly serial: the next tick is scheduled only after the previous one
//! returns, and a slow tick delays the schedule rather than bunching ticks
//! together.
//!
//! A failed update is logged and the tick moves on to the next object.

use std::sync::Arc;
use std::time::Duration;

use scenelink_geometry::{point_to_scene, tracking_to_scene};
use scenelink_middleware::SceneClient;
use scenelink_state::PoseStore;
use scenelink_types::{ObjectRole, ObjectSpec, SceneObject, SceneUpdate, TrackedObjectState};
use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, warn};

/// Scene transform for `spec` in `state`.
///
/// Planar roles have their horizontal axes swapped, height from
/// `spec.y_offset` and rotation from the role's table entry.  Point objects
/// keep their axes, add the reported height to `spec.y_offset` and publish no
/// rotation.  A hidden object is moved to `hidden_sentinel` on both
/// horizontal axes.
pub fn scene_transform(
    spec: &ObjectSpec,
    state: &TrackedObjectState,
    hidden_sentinel: f64,
) -> SceneUpdate {
    let mut position = match spec.role {
        ObjectRole::Point => point_to_scene(
            state.position_x,
            state.position_y,
            spec.y_offset + state.height,
        ),
        ObjectRole::Primary | ObjectRole::Marker => {
            tracking_to_scene(state.position_x, state.position_y, spec.y_offset)
        }
    };
    if !state.visible {
        position.x = hidden_sentinel;
        position.z = hidden_sentinel;
    }
    let update = SceneUpdate::new(&spec.id).with_position(position);
    match spec.role.rotation_rule() {
        Some(rule) => update.with_rotation(rule.apply(state.heading)),
        None => update,
    }
}

/// Registration for `spec`, placed where its initial (hidden) state puts it.
pub fn initial_object(spec: &ObjectSpec, hidden_sentinel: f64) -> SceneObject {
    let placed = scene_transform(spec, &TrackedObjectState::default(), hidden_sentinel);
    SceneObject {
        object_id: spec.id.clone(),
        shape: spec.shape,
        model_url: spec.model_url.clone(),
        position: placed.position.unwrap_or_default(),
        rotation: placed.rotation.unwrap_or_default(),
        scale: spec.scale,
        color: spec.color,
        persist: true,
    }
}

/// Periodically pushes every tracked object's transform to the scene.
pub struct PublishLoop {
    scene: Arc<dyn SceneClient>,
    poses: Arc<PoseStore>,
    objects: Vec<ObjectSpec>,
    hidden_sentinel: f64,
    period: Duration,
}

impl PublishLoop {
    pub fn new(
        scene: Arc<dyn SceneClient>,
        poses: Arc<PoseStore>,
        objects: Vec<ObjectSpec>,
        hidden_sentinel: f64,
        period: Duration,
    ) -> Self {
        Self {
            scene,
            poses,
            objects,
            hidden_sentinel,
            period,
        }
    }

    /// Run one publish pass.  Returns the number of objects updated.
    pub async fn tick(&self) -> usize {
        let snapshot = self.poses.snapshot();
        let mut published = 0;
        for spec in &self.objects {
            let Some(state) = snapshot.get(&spec.id) else {
                continue;
            };
            let update = scene_transform(spec, state, self.hidden_sentinel);
            match self.scene.update_object(&update).await {
                Ok(()) => published += 1,
                Err(e) => warn!(object_id = %spec.id, error = %e, "publish failed"),
            }
        }
        debug!(published, "publish tick");
        published
    }

    /// Tick every `period` until `shutdown` flips to `true` or its sender is
    /// dropped.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(period_ms = self.period.as_millis() as u64, "publish loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("publish loop stopped");
    }
}

//! [`WaypointNegotiator`] – from scene interaction to a pending waypoint.
//!
//! # Head-gaze mode
//!
//! Every head pose from the designated viewer is raycast onto the ground.
//! The hit point moves the indicator but commits nothing; a click on the
//! indicator ([`WaypointNegotiator::confirm`]) commits its current position.
//!
//! # Hand mode
//!
//! All-zero positions are tracking dropouts and are discarded.  A hand held
//! below [`RelayConfig::hand_commit_height`] commits its horizontal position
//! immediately; above it, the indicator follows the hand, shifted by
//! [`RelayConfig::hand_indicator_offset`].
//!
//! # While a waypoint is pending
//!
//! The indicator stays where it was confirmed and shows the confirmed color.
//! Further commits are no-ops.  [`WaypointNegotiator::acknowledge`] clears
//! the waypoint and restores the candidate color.
//!
//! Every slot change and the indicator update that reflects it happen under
//! one async lock, so the indicator's last color always matches the slot.
//!
//! [`RelayConfig::hand_commit_height`]: crate::RelayConfig::hand_commit_height
//! [`RelayConfig::hand_indicator_offset`]: crate::RelayConfig::hand_indicator_offset

use std::sync::{Arc, Mutex, PoisonError};

use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use scenelink_geometry::{Quaternion, Vec3, gaze_direction, ground_intersection};
use scenelink_middleware::SceneClient;
use scenelink_state::WaypointSlot;
use scenelink_types::{IndicatorSpec, InteractionEvent, InteractionMode, SceneObject, SceneUpdate, Waypoint};
use tokio::sync::{Mutex as TokioMutex, watch};
use tracing::{debug, info, trace, warn};

use crate::config::RelayConfig;

/// Drives the indicator and the pending waypoint from interaction events.
pub struct WaypointNegotiator {
    scene: Arc<dyn SceneClient>,
    waypoint: Arc<WaypointSlot>,
    indicator: IndicatorSpec,
    mode: InteractionMode,
    head_source: Option<String>,
    hand_commit_height: f64,
    hand_indicator_offset: f64,
    hidden_sentinel: f64,
    /// Last position the indicator was moved to; `None` until first placed.
    indicator_position: Mutex<Option<Vec3>>,
    /// Held from a slot check or change until the matching scene update has
    /// been sent.
    indicator_gate: TokioMutex<()>,
}

impl WaypointNegotiator {
    pub fn new(scene: Arc<dyn SceneClient>, waypoint: Arc<WaypointSlot>, config: &RelayConfig) -> Self {
        Self {
            scene,
            waypoint,
            indicator: config.indicator.clone(),
            mode: config.interaction_mode,
            head_source: config.head_source.clone(),
            hand_commit_height: config.hand_commit_height,
            hand_indicator_offset: config.hand_indicator_offset,
            hidden_sentinel: config.hidden_sentinel,
            indicator_position: Mutex::new(None),
            indicator_gate: TokioMutex::new(()),
        }
    }

    /// Registration for the indicator: hidden until first placed.
    pub fn indicator_object(&self) -> SceneObject {
        SceneObject {
            object_id: self.indicator.id.clone(),
            shape: self.indicator.shape,
            model_url: None,
            position: Vec3::new(self.hidden_sentinel, self.indicator.y, self.hidden_sentinel),
            rotation: Default::default(),
            scale: self.indicator.scale,
            color: self.indicator.candidate_color,
            persist: true,
        }
    }

    /// Current indicator position, if it has been placed.
    pub fn indicator_position(&self) -> Option<Vec3> {
        *self.indicator_position.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Dispatch one interaction event.
    pub async fn on_interaction_event(&self, event: InteractionEvent) {
        match (self.mode, event) {
            (InteractionMode::None, _) => {}
            (
                InteractionMode::HeadGaze,
                InteractionEvent::HeadGaze {
                    source_id,
                    position,
                    orientation,
                },
            ) => self.on_head_gaze(&source_id, position, orientation).await,
            (InteractionMode::Hand, InteractionEvent::HandPosition { position, .. }) => {
                self.on_hand_position(position).await
            }
            (_, InteractionEvent::Click { object_id }) if object_id == self.indicator.id => {
                self.confirm().await
            }
            (_, other) => trace!(?other, "interaction event ignored"),
        }
    }

    async fn on_head_gaze(&self, source_id: &str, position: Vec3, orientation: Quaternion) {
        if let Some(expected) = &self.head_source
            && expected != source_id
        {
            trace!(source_id, "head pose from non-designated viewer");
            return;
        }
        let Some(hit) = ground_intersection(position, gaze_direction(orientation)) else {
            return;
        };
        self.move_indicator(Vec3::new(hit.x, self.indicator.y, hit.z)).await;
    }

    async fn on_hand_position(&self, position: Vec3) {
        if position.is_zero() {
            trace!("hand dropout ignored");
            return;
        }
        if position.y < self.hand_commit_height {
            let ground = Vec3::new(position.x, self.indicator.y, position.z);
            self.commit_at(ground).await;
            return;
        }
        let tracked = Vec3::new(position.x, position.y + self.hand_indicator_offset, position.z);
        self.move_indicator(tracked).await;
    }

    /// Commit the indicator's current position as the pending waypoint.
    ///
    /// No-op when nothing has been placed yet or a waypoint is already
    /// pending.
    pub async fn confirm(&self) {
        let Some(position) = self.indicator_position() else {
            debug!("confirm before indicator was placed");
            return;
        };
        self.commit_at(position).await;
    }

    async fn commit_at(&self, position: Vec3) {
        let _gate = self.indicator_gate.lock().await;
        if !self.waypoint.commit(Waypoint::new(position.x, position.z)) {
            return;
        }
        *self.indicator_position.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
        let update = SceneUpdate::new(&self.indicator.id)
            .with_position(position)
            .with_color(self.indicator.confirmed_color);
        self.push(&update).await;
    }

    /// Move the indicator unless a waypoint is pending.
    async fn move_indicator(&self, position: Vec3) {
        let _gate = self.indicator_gate.lock().await;
        if self.waypoint.is_pending() {
            return;
        }
        *self.indicator_position.lock().unwrap_or_else(PoisonError::into_inner) = Some(position);
        self.push(&SceneUpdate::new(&self.indicator.id).with_position(position))
            .await;
    }

    /// Pending waypoint in tracking-frame order `(z, x)`.
    pub fn poll_waypoint(&self) -> Option<(f64, f64)> {
        self.waypoint.poll().map(|w| w.tracking_order())
    }

    /// Clear the pending waypoint and restore the indicator's candidate
    /// color.
    pub async fn acknowledge(&self) {
        let _gate = self.indicator_gate.lock().await;
        if self.waypoint.acknowledge().is_some() {
            let update = SceneUpdate::new(&self.indicator.id).with_color(self.indicator.candidate_color);
            self.push(&update).await;
        }
    }

    async fn push(&self, update: &SceneUpdate) {
        if let Err(e) = self.scene.update_object(update).await {
            warn!(object_id = %update.object_id, error = %e, "indicator update failed");
        }
    }

    /// Feed `events` into [`Self::on_interaction_event`] until the stream
    /// ends or `shutdown` flips.
    pub async fn pump(
        self: Arc<Self>,
        mut events: BoxStream<'static, InteractionEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!(mode = ?self.mode, "interaction pump started");
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                next = events.next() => match next {
                    Some(event) => self.on_interaction_event(event).await,
                    None => {
                        warn!("interaction event stream ended");
                        break;
                    }
                },
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("interaction pump stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scenelink_middleware::RecordingScene;
    use std::f64::consts::FRAC_PI_2;
    use std::time::Duration;

    const PIN: &str = "pushpin";

    fn make(mode: InteractionMode) -> (Arc<RecordingScene>, Arc<WaypointSlot>, WaypointNegotiator) {
        let scene = Arc::new(RecordingScene::new());
        let slot = Arc::new(WaypointSlot::new());
        let cfg = RelayConfig {
            interaction_mode: mode,
            ..RelayConfig::default()
        };
        let n = WaypointNegotiator::new(scene.clone(), Arc::clone(&slot), &cfg);
        (scene, slot, n)
    }

    fn looking_down() -> Quaternion {
        Quaternion::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), -FRAC_PI_2)
    }

    fn gaze(source: &str, position: Vec3, orientation: Quaternion) -> InteractionEvent {
        InteractionEvent::HeadGaze {
            source_id: source.to_string(),
            position,
            orientation,
        }
    }

    fn hand(position: Vec3) -> InteractionEvent {
        InteractionEvent::HandPosition {
            source_id: "handRight_1".to_string(),
            position,
        }
    }

    fn click() -> InteractionEvent {
        InteractionEvent::Click {
            object_id: PIN.to_string(),
        }
    }

    // ── Head gaze ───────────────────────────────────────────────────────────

    #[tokio::test]
    async fn gaze_straight_down_moves_indicator_without_commit() {
        let (scene, slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;

        let p = n.indicator_position().unwrap();
        assert!(p.x.abs() < 1e-9 && p.z.abs() < 1e-9, "got {p:?}");
        assert_eq!(p.y, IndicatorSpec::default().y);
        assert!(scene.last_update_for(PIN).unwrap().position.is_some());
        assert!(!slot.is_pending());
        assert_eq!(n.poll_waypoint(), None);
    }

    #[tokio::test]
    async fn gaze_parallel_to_ground_is_ignored() {
        let (scene, _slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.6, 0.0), Quaternion::identity()))
            .await;
        assert!(n.indicator_position().is_none());
        assert!(scene.calls().is_empty());
    }

    #[tokio::test]
    async fn gaze_from_other_viewer_is_ignored_when_source_is_designated() {
        let scene = Arc::new(RecordingScene::new());
        let cfg = RelayConfig {
            interaction_mode: InteractionMode::HeadGaze,
            head_source: Some("camera_1".to_string()),
            ..RelayConfig::default()
        };
        let n = WaypointNegotiator::new(scene.clone(), Arc::new(WaypointSlot::new()), &cfg);

        n.on_interaction_event(gaze("camera_2", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        assert!(n.indicator_position().is_none());

        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        assert!(n.indicator_position().is_some());
    }

    #[tokio::test]
    async fn click_confirms_gaze_position() {
        let (scene, _slot, n) = make(InteractionMode::HeadGaze);
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 0.0, 0.0), -FRAC_PI_2);
        n.on_interaction_event(gaze("camera_1", Vec3::new(1.0, 1.0, 2.0), q)).await;
        n.on_interaction_event(click()).await;

        let (z, x) = n.poll_waypoint().unwrap();
        assert!((x - 1.0).abs() < 1e-9);
        assert!((z - 2.0).abs() < 1e-9);
        assert_eq!(
            scene.last_update_for(PIN).unwrap().color,
            Some(IndicatorSpec::default().confirmed_color)
        );
    }

    #[tokio::test]
    async fn click_before_placement_commits_nothing() {
        let (_scene, slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(click()).await;
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn click_on_other_object_is_ignored() {
        let (_scene, slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        n.on_interaction_event(InteractionEvent::Click {
            object_id: "cube1".to_string(),
        })
        .await;
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn indicator_freezes_while_pending() {
        let (_scene, _slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        n.confirm().await;
        let frozen = n.indicator_position();

        n.on_interaction_event(gaze("camera_1", Vec3::new(3.0, 1.0, 3.0), looking_down()))
            .await;
        assert_eq!(n.indicator_position(), frozen);
    }

    #[tokio::test]
    async fn acknowledge_allows_new_confirmation() {
        let (_scene, _slot, n) = make(InteractionMode::HeadGaze);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        n.confirm().await;
        n.acknowledge().await;

        n.on_interaction_event(gaze("camera_1", Vec3::new(2.0, 1.0, 0.0), looking_down()))
            .await;
        n.confirm().await;

        let (_z, x) = n.poll_waypoint().unwrap();
        assert!((x - 2.0).abs() < 1e-9, "x must be 2.0, got {x}");
    }

    #[tokio::test]
    async fn gaze_ignored_outside_head_mode() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(gaze("camera_1", Vec3::new(0.0, 1.0, 0.0), looking_down()))
            .await;
        assert!(scene.calls().is_empty());
    }

    // ── Hand ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn raised_hand_moves_indicator_with_offset() {
        let (scene, slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(hand(Vec3::new(0.3, 1.2, -0.4))).await;

        let p = n.indicator_position().unwrap();
        assert!((p.y - 1.1).abs() < 1e-12);
        assert_eq!((p.x, p.z), (0.3, -0.4));
        assert!(!slot.is_pending());
        assert_eq!(scene.last_update_for(PIN).unwrap().color, None);
    }

    #[tokio::test]
    async fn lowered_hand_commits_and_marks_confirmed() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(hand(Vec3::new(0.3, 0.2, -0.4))).await;

        assert_eq!(n.poll_waypoint(), Some((-0.4, 0.3)));
        let u = scene.last_update_for(PIN).unwrap();
        assert_eq!(u.color, Some(IndicatorSpec::default().confirmed_color));
        assert_eq!(u.position.unwrap().y, IndicatorSpec::default().y);
    }

    #[tokio::test]
    async fn hand_dropout_is_ignored() {
        let (scene, slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(hand(Vec3::zero())).await;
        assert!(scene.calls().is_empty());
        assert!(!slot.is_pending());
    }

    #[tokio::test]
    async fn lowered_hand_while_pending_is_noop() {
        let (_scene, _slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(hand(Vec3::new(1.0, 0.1, 1.0))).await;
        n.on_interaction_event(hand(Vec3::new(2.0, 0.1, 2.0))).await;
        assert_eq!(n.poll_waypoint(), Some((1.0, 1.0)));
    }

    // ── Poll / acknowledge ──────────────────────────────────────────────────

    #[tokio::test]
    async fn acknowledge_clears_and_restores_candidate_color() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        n.on_interaction_event(hand(Vec3::new(1.0, 0.1, 2.0))).await;
        assert_eq!(n.poll_waypoint(), Some((2.0, 1.0)));

        n.acknowledge().await;
        assert_eq!(n.poll_waypoint(), None);
        assert_eq!(
            scene.last_update_for(PIN).unwrap().color,
            Some(IndicatorSpec::default().candidate_color)
        );
    }

    #[tokio::test]
    async fn acknowledge_without_pending_sends_nothing() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        n.acknowledge().await;
        assert!(scene.calls().is_empty());
    }

    #[tokio::test]
    async fn mode_none_ignores_everything() {
        let (scene, _slot, n) = make(InteractionMode::None);
        n.on_interaction_event(hand(Vec3::new(1.0, 0.1, 2.0))).await;
        n.on_interaction_event(click()).await;
        assert!(scene.calls().is_empty());
    }

    #[tokio::test]
    async fn acknowledge_waits_for_an_in_flight_commit() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        let n = Arc::new(n);
        scene.pause_updates();

        let committer = Arc::clone(&n);
        let commit = tokio::spawn(async move {
            committer.on_interaction_event(hand(Vec3::new(1.0, 0.1, 2.0))).await
        });
        for _ in 0..50 {
            if n.poll_waypoint().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // The commit is parked in its indicator update; the reset must wait.
        let acker = Arc::clone(&n);
        let ack = tokio::spawn(async move { acker.acknowledge().await });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(n.poll_waypoint(), Some((2.0, 1.0)));
        assert!(!ack.is_finished());

        scene.resume_updates();
        commit.await.unwrap();
        ack.await.unwrap();

        assert_eq!(n.poll_waypoint(), None);
        let colors: Vec<_> = scene.updates_for(PIN).into_iter().map(|u| u.color).collect();
        let spec = IndicatorSpec::default();
        assert_eq!(colors, [Some(spec.confirmed_color), Some(spec.candidate_color)]);
    }

    #[tokio::test]
    async fn movement_waits_for_an_in_flight_acknowledge() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        let n = Arc::new(n);
        n.on_interaction_event(hand(Vec3::new(1.0, 0.1, 2.0))).await;
        scene.pause_updates();

        let acker = Arc::clone(&n);
        let ack = tokio::spawn(async move { acker.acknowledge().await });
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mover = Arc::clone(&n);
        let movement = tokio::spawn(async move {
            mover.on_interaction_event(hand(Vec3::new(0.5, 1.0, 0.5))).await
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!movement.is_finished());

        scene.resume_updates();
        ack.await.unwrap();
        movement.await.unwrap();

        let last = scene.last_update_for(PIN).unwrap();
        assert_eq!(last.color, None);
        assert_eq!(last.position, Some(Vec3::new(0.5, 0.9, 0.5)));
    }

    #[test]
    fn indicator_object_starts_hidden() {
        let (_scene, _slot, n) = make(InteractionMode::HeadGaze);
        let obj = n.indicator_object();
        assert_eq!(obj.object_id, PIN);
        assert_eq!(obj.position.x, 999.0);
        assert_eq!(obj.position.z, 999.0);
    }

    // ── Pump ────────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn pump_forwards_scene_events_until_shutdown() {
        let (scene, _slot, n) = make(InteractionMode::Hand);
        let n = Arc::new(n);
        let (tx, rx) = watch::channel(false);
        let events = scene.events().await;
        let handle = tokio::spawn(Arc::clone(&n).pump(events, rx));

        scene.inject(hand(Vec3::new(1.0, 0.1, 2.0)));
        for _ in 0..50 {
            if n.poll_waypoint().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(n.poll_waypoint(), Some((2.0, 1.0)));

        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}

//! [`Relay`] – the assembled service.
//!
//! Startup order:
//!
//! 1. [`Relay::initialise`] registers every tracked object (and the
//!    indicator, when an interaction mode is active) with the scene.  A
//!    failure here is fatal.
//! 2. [`Relay::run`] spawns the [`PublishLoop`] and, when interaction is
//!    enabled, the [`WaypointNegotiator::pump`], then waits for shutdown.
//!
//! Inbound reports and waypoint polling reach the relay through the shared
//! [`Relay::poses`] and [`Relay::negotiator`] handles, typically from the
//! HTTP gateway.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scenelink_middleware::RecordingScene;
//! use scenelink_runtime::{Relay, RelayConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let relay = Arc::new(Relay::new(RelayConfig::default(), Arc::new(RecordingScene::new())));
//!     let (_tx, rx) = tokio::sync::watch::channel(false);
//!     relay.run(rx).await.expect("relay failed");
//! }
//! ```

use std::sync::Arc;

use scenelink_middleware::SceneClient;
use scenelink_state::{PoseStore, WaypointSlot};
use scenelink_types::{InteractionMode, RelayError, TrackedObjectState};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::RelayConfig;
use crate::negotiator::WaypointNegotiator;
use crate::publisher::{PublishLoop, initial_object};

/// Shared relay state plus the scene it publishes to.
pub struct Relay {
    config: RelayConfig,
    scene: Arc<dyn SceneClient>,
    poses: Arc<PoseStore>,
    negotiator: Arc<WaypointNegotiator>,
}

impl Relay {
    pub fn new(config: RelayConfig, scene: Arc<dyn SceneClient>) -> Self {
        let poses = Arc::new(PoseStore::new(config.objects.iter().map(|o| o.id.clone())));
        let negotiator = Arc::new(WaypointNegotiator::new(
            Arc::clone(&scene),
            Arc::new(WaypointSlot::new()),
            &config,
        ));
        Self {
            config,
            scene,
            poses,
            negotiator,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn poses(&self) -> &Arc<PoseStore> {
        &self.poses
    }

    pub fn negotiator(&self) -> &Arc<WaypointNegotiator> {
        &self.negotiator
    }

    /// Record a report already converted to meters.
    ///
    /// # Errors
    ///
    /// [`RelayError::UnknownObject`] for ids outside the configured set.
    pub fn report(&self, object_id: &str, state: TrackedObjectState) -> Result<(), RelayError> {
        self.poses.report(object_id, state)
    }

    /// Register every object with the scene.
    ///
    /// # Errors
    ///
    /// Propagates the first [`SceneClient::create_object`] failure.
    pub async fn initialise(&self) -> Result<(), RelayError> {
        for spec in &self.config.objects {
            self.scene
                .create_object(&initial_object(spec, self.config.hidden_sentinel))
                .await?;
        }
        if self.config.interaction_mode != InteractionMode::None {
            self.scene
                .create_object(&self.negotiator.indicator_object())
                .await?;
        }
        info!(
            objects = self.config.objects.len(),
            mode = ?self.config.interaction_mode,
            "scene objects registered"
        );
        Ok(())
    }

    pub fn publish_loop(&self) -> PublishLoop {
        PublishLoop::new(
            Arc::clone(&self.scene),
            Arc::clone(&self.poses),
            self.config.objects.clone(),
            self.config.hidden_sentinel,
            self.config.publish_interval,
        )
    }

    /// Initialise, then publish and handle interaction until `shutdown`
    /// flips to `true`.
    ///
    /// # Errors
    ///
    /// Only startup failures from [`Relay::initialise`] are returned.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Result<(), RelayError> {
        self.initialise().await?;

        let publisher = tokio::spawn(self.publish_loop().run(shutdown.clone()));

        let pump = if self.config.interaction_mode != InteractionMode::None {
            let events = self.scene.events().await;
            Some(tokio::spawn(
                Arc::clone(&self.negotiator).pump(events, shutdown.clone()),
            ))
        } else {
            None
        };

        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }

        if let Err(e) = publisher.await {
            warn!(error = %e, "publish loop task failed");
        }
        if let Some(pump) = pump
            && let Err(e) = pump.await
        {
            warn!(error = %e, "interaction pump task failed");
        }
        info!("relay stopped");
        Ok(())
    }
}

//! WebSocket connection to a hosted scene.
//!
//! [`WsSceneClient::connect`] opens one socket and splits it into two tasks:
//!
//! * **writer** – drains a bounded queue of outbound frames built by
//!   [`protocol`](crate::protocol);
//! * **reader** – classifies each inbound text frame and broadcasts every
//!   non-[`Other`](InteractionEvent::Other) event to subscribers of
//!   [`SceneClient::events`].
//!
//! `create_object` waits for queue space.  `update_object` never waits: when
//! the queue is full the update is dropped and reported as
//! [`RelayError::Transport`], since the next publish pass supersedes it.
//!
//! Reconnection is not attempted.  When the socket closes the writer stops,
//! further sends fail with [`RelayError::Transport`] and every event stream
//! ends.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};
use futures_util::{SinkExt, StreamExt};
use scenelink_types::{InteractionEvent, RelayError, SceneObject, SceneUpdate};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{broadcast, mpsc};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::protocol;
use crate::scene::{SceneClient, broadcast_stream};

/// Buffered interaction events per subscriber before old ones are dropped.
const EVENT_CAPACITY: usize = 256;

/// Outbound frames queued ahead of the socket.
pub const OUTBOUND_CAPACITY: usize = 256;

/// Event sender shared with the reader task, which clears it on exit.
type EventSender = Arc<Mutex<Option<broadcast::Sender<InteractionEvent>>>>;

/// [`SceneClient`] backed by a live WebSocket.
pub struct WsSceneClient {
    url: String,
    client_id: String,
    outbound: mpsc::Sender<String>,
    events: EventSender,
}

impl WsSceneClient {
    /// Build the socket URL for `scene` in `namespace` on `host`.
    ///
    /// ```rust
    /// use scenelink_middleware::WsSceneClient;
    ///
    /// assert_eq!(
    ///     WsSceneClient::scene_url("arenaxr.org", "public", "cozmo-scene", true),
    ///     "wss://arenaxr.org/public/cozmo-scene"
    /// );
    /// ```
    pub fn scene_url(host: &str, namespace: &str, scene: &str, tls: bool) -> String {
        let scheme = if tls { "wss" } else { "ws" };
        format!("{scheme}://{host}/{namespace}/{scene}")
    }

    /// Connect to `url` and start the reader and writer tasks.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Transport`] when the handshake fails.
    pub async fn connect(url: &str) -> Result<Self, RelayError> {
        let (ws_stream, _response) = connect_async(url)
            .await
            .map_err(|e| RelayError::Transport(format!("scene connect to {url}: {e}")))?;
        let client_id = format!("scenelink-{}", Uuid::new_v4());
        info!(url, client_id = %client_id, "connected to scene");

        let (mut ws_tx, mut ws_rx) = ws_stream.split();
        let (outbound, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_CAPACITY);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let events: EventSender = Arc::new(Mutex::new(Some(events_tx.clone())));

        // ── Writer: queued frames → socket ─────────────────────────────────
        tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = ws_tx.send(Message::Text(frame.into())).await {
                    error!(error = %e, "scene write failed; writer stopping");
                    break;
                }
            }
            let _ = ws_tx.close().await;
        });

        // ── Reader: socket → classified events ─────────────────────────────
        let reader_slot = Arc::clone(&events);
        tokio::spawn(async move {
            let reader_events = events_tx;
            while let Some(msg) = ws_rx.next().await {
                match msg {
                    Ok(Message::Text(text)) => match protocol::classify(text.as_str()) {
                        InteractionEvent::Other => trace!("ignored scene frame"),
                        event => {
                            debug!(?event, "interaction event");
                            // No subscribers is a normal condition.
                            let _ = reader_events.send(event);
                        }
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!(error = %e, "scene read failed");
                        break;
                    }
                }
            }
            warn!("scene connection closed");
            // Drop both senders so open event streams end.
            reader_slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        });

        Ok(Self {
            url: url.to_string(),
            client_id,
            outbound,
            events,
        })
    }

    fn closed(&self) -> RelayError {
        RelayError::Transport(format!("scene connection to {} is closed", self.url))
    }
}

#[async_trait]
impl SceneClient for WsSceneClient {
    async fn create_object(&self, object: &SceneObject) -> Result<(), RelayError> {
        self.outbound
            .send(protocol::create_frame(object, &self.client_id))
            .await
            .map_err(|_| self.closed())
    }

    async fn update_object(&self, update: &SceneUpdate) -> Result<(), RelayError> {
        match self.outbound.try_send(protocol::update_frame(update, &self.client_id)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(RelayError::Transport(format!(
                "scene backlog full; update to {} dropped",
                update.object_id
            ))),
            Err(TrySendError::Closed(_)) => Err(self.closed()),
        }
    }

    async fn events(&self) -> BoxStream<'static, InteractionEvent> {
        let guard = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => broadcast_stream(tx.subscribe()),
            None => stream::empty().boxed(),
        }
    }
}

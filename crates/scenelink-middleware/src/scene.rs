//! The scene client contract.

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use scenelink_types::{InteractionEvent, RelayError, SceneObject, SceneUpdate};
use tokio::sync::broadcast;
use tracing::warn;

/// Every remote-scene backend must implement this trait.
///
/// # Contract
///
/// * `create_object` – registers an object once, with a stable id, initial
///   transform and visual properties.
///
/// * `update_object` – pushes an incremental transform and/or color change
///   to an existing object.
///
/// * `events` – returns a live stream of interaction events.  Classification
///   into [`InteractionEvent`] variants happens inside the client; callers
///   never inspect raw object ids to decide what an event is.
#[async_trait]
pub trait SceneClient: Send + Sync {
    /// Register `object` with the scene.
    async fn create_object(&self, object: &SceneObject) -> Result<(), RelayError>;

    /// Push `update` to the scene.
    async fn update_object(&self, update: &SceneUpdate) -> Result<(), RelayError>;

    /// Subscribe to classified interaction events.
    async fn events(&self) -> BoxStream<'static, InteractionEvent>;
}

/// Adapt a broadcast receiver into an event stream that skips over lag and
/// ends when every sender is gone.
pub(crate) fn broadcast_stream(
    rx: broadcast::Receiver<InteractionEvent>,
) -> BoxStream<'static, InteractionEvent> {
    stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((event, rx)),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(lagged_by = n, "interaction event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_stream_yields_in_order_and_ends_on_close() {
        let (tx, rx) = broadcast::channel(8);
        let mut events = broadcast_stream(rx);

        tx.send(InteractionEvent::Other).unwrap();
        tx.send(InteractionEvent::Click { object_id: "pushpin".into() }).unwrap();
        drop(tx);

        assert_eq!(events.next().await, Some(InteractionEvent::Other));
        assert_eq!(
            events.next().await,
            Some(InteractionEvent::Click { object_id: "pushpin".into() })
        );
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn broadcast_stream_survives_lag() {
        let (tx, rx) = broadcast::channel(1);
        let mut events = broadcast_stream(rx);

        tx.send(InteractionEvent::Click { object_id: "a".into() }).unwrap();
        tx.send(InteractionEvent::Click { object_id: "b".into() }).unwrap();
        drop(tx);

        // "a" was overwritten; the stream reports lag and continues with "b".
        assert_eq!(
            events.next().await,
            Some(InteractionEvent::Click { object_id: "b".into() })
        );
        assert_eq!(events.next().await, None);
    }
}

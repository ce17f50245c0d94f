//! Scene wire protocol.
//!
//! Outbound frames are JSON object messages:
//!
//! ```json
//! {
//!   "object_id": "cozmo",
//!   "action": "create",
//!   "type": "object",
//!   "persist": true,
//!   "timestamp": "2024-01-01T00:00:00Z",
//!   "data": {
//!     "object_type": "box",
//!     "position": { "x": 0.0, "y": -0.01, "z": 0.0 },
//!     "rotation": { "x": 0.0, "y": 0.0, "z": 0.0 },
//!     "scale": { "x": 0.02, "y": 0.01, "z": 0.01 },
//!     "color": "#009600"
//!   }
//! }
//! ```
//!
//! Update frames use `"action": "update"` and carry only the changed fields
//! in `data`.
//!
//! Inbound frames are classified by [`classify`]:
//!
//! | Frame | Event |
//! |---|---|
//! | `update`/`create` with `data.object_type == "camera"` and a quaternion rotation | [`InteractionEvent::HeadGaze`] |
//! | `update`/`create` with `data.object_type` `handLeft`/`handRight` | [`InteractionEvent::HandPosition`] |
//! | `clientEvent` of type `mousedown` | [`InteractionEvent::Click`] |
//! | anything else | [`InteractionEvent::Other`] |

use chrono::Utc;
use scenelink_geometry::{Quaternion, Vec3};
use scenelink_types::{InteractionEvent, SceneObject, SceneUpdate};
use serde::Deserialize;
use serde_json::{Map, Value, json};

/// Build the `create` frame for `object`.
pub fn create_frame(object: &SceneObject, source: &str) -> String {
    let mut data = json!({
        "object_type": object.shape,
        "position": object.position,
        "rotation": object.rotation,
        "scale": object.scale,
        "color": object.color.to_hex(),
    });
    if let Some(url) = &object.model_url {
        data["url"] = Value::String(url.clone());
    }
    json!({
        "object_id": object.object_id,
        "action": "create",
        "type": "object",
        "persist": object.persist,
        "source": source,
        "timestamp": Utc::now().to_rfc3339(),
        "data": data,
    })
    .to_string()
}

/// Build the `update` frame for `update`.  Absent fields are omitted.
pub fn update_frame(update: &SceneUpdate, source: &str) -> String {
    let mut data = Map::new();
    if let Some(p) = update.position {
        data.insert("position".into(), json!(p));
    }
    if let Some(r) = update.rotation {
        data.insert("rotation".into(), json!(r));
    }
    if let Some(c) = update.color {
        data.insert("color".into(), Value::String(c.to_hex()));
    }
    json!({
        "object_id": update.object_id,
        "action": "update",
        "type": "object",
        "source": source,
        "timestamp": Utc::now().to_rfc3339(),
        "data": data,
    })
    .to_string()
}

#[derive(Deserialize)]
struct InboundFrame {
    object_id: Option<String>,
    action: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    data: Option<InboundData>,
}

#[derive(Deserialize)]
struct InboundData {
    object_type: Option<String>,
    position: Option<Vec3>,
    rotation: Option<InboundRotation>,
}

#[derive(Deserialize)]
struct InboundRotation {
    x: f64,
    y: f64,
    z: f64,
    w: Option<f64>,
}

/// Turn a raw inbound text frame into an [`InteractionEvent`].
///
/// Unparseable or irrelevant frames become [`InteractionEvent::Other`].
pub fn classify(text: &str) -> InteractionEvent {
    let Ok(frame) = serde_json::from_str::<InboundFrame>(text) else {
        return InteractionEvent::Other;
    };
    let object_id = frame.object_id.unwrap_or_default();
    let action = frame.action.as_deref().unwrap_or("");

    if action == "clientEvent" {
        return match frame.kind.as_deref() {
            Some("mousedown") if !object_id.is_empty() => InteractionEvent::Click { object_id },
            _ => InteractionEvent::Other,
        };
    }

    if action != "update" && action != "create" {
        return InteractionEvent::Other;
    }
    let Some(data) = frame.data else {
        return InteractionEvent::Other;
    };

    match (data.object_type.as_deref(), data.position, data.rotation) {
        (Some("camera"), Some(position), Some(InboundRotation { x, y, z, w: Some(w) })) => {
            InteractionEvent::HeadGaze {
                source_id: object_id,
                position,
                orientation: Quaternion::new(w, x, y, z),
            }
        }
        (Some("handLeft" | "handRight"), Some(position), _) => InteractionEvent::HandPosition {
            source_id: object_id,
            position,
        },
        _ => InteractionEvent::Other,
    }
}

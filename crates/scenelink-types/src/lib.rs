use scenelink_geometry::{Euler, HeadingAxis, Quaternion, RotationRule, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How an object's visual asset is oriented relative to the tracked heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectRole {
    /// The mobile robot.  Its model faces a different default direction
    /// than the generic marker asset.
    Primary,
    /// Auxiliary fiducial markers.
    Marker,
    /// A bare 3D point (e.g. an arm end effector).  Reported as
    /// `(x, y, height)`, published unswapped and without rotation.
    Point,
}

impl ObjectRole {
    /// Fixed orientation table entry for this role.  `None` for roles that
    /// never publish a rotation.
    pub fn rotation_rule(self) -> Option<RotationRule> {
        let rule = match self {
            ObjectRole::Primary => RotationRule {
                base: Euler::new(90.0, 180.0, 0.0),
                heading_axis: HeadingAxis::Z,
                heading_offset_deg: 90.0,
            },
            ObjectRole::Marker => RotationRule {
                base: Euler::new(0.0, 0.0, 0.0),
                heading_axis: HeadingAxis::Y,
                heading_offset_deg: 0.0,
            },
            ObjectRole::Point => return None,
        };
        Some(rule)
    }
}

/// Primitive or model used to render an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    #[default]
    Box,
    Sphere,
    Cylinder,
    Cone,
    GltfModel,
}

/// 8-bit RGB color.  Serialised as a `[r, g, b]` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// `#rrggbb` form used by the scene.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Unit of the `x, y` fields in an inbound pose report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnits {
    #[default]
    Millimeters,
    Meters,
}

impl LengthUnits {
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            LengthUnits::Millimeters => value / 1000.0,
            LengthUnits::Meters => value,
        }
    }
}

/// Static description of one tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub id: String,
    pub role: ObjectRole,
    /// Fixed scene height.
    #[serde(default)]
    pub y_offset: f64,
    pub scale: Vec3,
    pub color: Color,
    #[serde(default)]
    pub shape: Shape,
    /// Asset URL when `shape` is [`Shape::GltfModel`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_url: Option<String>,
}

impl ObjectSpec {
    /// The robot: a thin green box sitting just below the ground plane.
    pub fn primary(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ObjectRole::Primary,
            y_offset: -0.01,
            scale: Vec3::new(0.02, 0.01, 0.01),
            color: Color(0, 150, 0),
            shape: Shape::Box,
            model_url: None,
        }
    }

    /// A small marker cube resting on the ground plane.
    pub fn marker(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ObjectRole::Marker,
            y_offset: 0.0,
            scale: Vec3::new(0.03, 0.03, 0.03),
            color: Color(0, 0, 200),
            shape: Shape::Box,
            model_url: None,
        }
    }

    /// A tiny green box following a tracked 3D point.
    pub fn point(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: ObjectRole::Point,
            y_offset: 0.0,
            scale: Vec3::new(0.003, 0.003, 0.003),
            color: Color(0, 150, 0),
            shape: Shape::Box,
            model_url: None,
        }
    }
}

/// Static description of the waypoint indicator ("pushpin").
///
/// Fields missing from a config file fall back to [`IndicatorSpec::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSpec {
    pub id: String,
    /// Resting height when placed by gaze or confirmed.
    pub y: f64,
    pub scale: Vec3,
    pub shape: Shape,
    pub candidate_color: Color,
    pub confirmed_color: Color,
}

impl Default for IndicatorSpec {
    fn default() -> Self {
        Self {
            id: "pushpin".to_string(),
            y: 0.05,
            scale: Vec3::new(0.02, 0.1, 0.02),
            shape: Shape::Cone,
            candidate_color: Color(255, 200, 0),
            confirmed_color: Color(255, 0, 0),
        }
    }
}

/// Most recent report for one tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedObjectState {
    /// Tracking frame, meters.
    pub position_x: f64,
    /// Tracking frame, meters.
    pub position_y: f64,
    /// Degrees.
    pub heading: f64,
    pub visible: bool,
    /// Meters above the ground.  Only [`ObjectRole::Point`] objects use it.
    #[serde(default)]
    pub height: f64,
}

/// Full object registration sent once at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub object_id: String,
    pub shape: Shape,
    pub model_url: Option<String>,
    pub position: Vec3,
    pub rotation: Euler,
    pub scale: Vec3,
    pub color: Color,
    pub persist: bool,
}

/// Incremental update.  `None` fields are left untouched remotely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneUpdate {
    pub object_id: String,
    pub position: Option<Vec3>,
    pub rotation: Option<Euler>,
    pub color: Option<Color>,
}

impl SceneUpdate {
    pub fn new(object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            position: None,
            rotation: None,
            color: None,
        }
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.rotation = Some(rotation);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

/// Interaction event delivered by the scene, already classified at the
/// scene-client boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InteractionEvent {
    /// A viewer's head (camera) pose.
    HeadGaze {
        source_id: String,
        position: Vec3,
        orientation: Quaternion,
    },
    /// A tracked hand position.
    HandPosition { source_id: String, position: Vec3 },
    /// A click on a scene object.
    Click { object_id: String },
    Other,
}

/// Which interaction events drive the waypoint indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    /// Pose relay only.
    #[default]
    None,
    HeadGaze,
    Hand,
}

/// A committed navigation target on the scene ground plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub target_x: f64,
    pub target_z: f64,
}

impl Waypoint {
    pub fn new(target_x: f64, target_z: f64) -> Self {
        Self { target_x, target_z }
    }

    /// Coordinates in the tracking process's axis order: `(z, x)`.
    pub fn tracking_order(&self) -> (f64, f64) {
        (self.target_z, self.target_x)
    }
}

/// Error type shared by every SceneLink crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RelayError {
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    #[error("Malformed report: {0}")]
    MalformedReport(String),

    #[error("Scene error: {0}")]
    Scene(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Config error: {0}")]
    Config(String),
}

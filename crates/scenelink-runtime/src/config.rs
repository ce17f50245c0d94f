//! [`RelayConfig`] – everything the relay needs to know up front.

use std::time::Duration;

use scenelink_types::{IndicatorSpec, InteractionMode, LengthUnits, ObjectRole, ObjectSpec};

/// Default publish period.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(100);

/// Horizontal coordinate used to push hidden objects out of view.
pub const DEFAULT_HIDDEN_SENTINEL: f64 = 999.0;

/// Static relay configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    /// Tracked objects, in publish order.
    pub objects: Vec<ObjectSpec>,
    pub indicator: IndicatorSpec,
    /// Unit of the `x, y` fields in inbound reports.
    pub units: LengthUnits,
    pub hidden_sentinel: f64,
    pub interaction_mode: InteractionMode,
    /// Only head-gaze events from this source are used.  `None` accepts any
    /// viewer.
    pub head_source: Option<String>,
    /// Hands below this height (meters) commit a waypoint.
    pub hand_commit_height: f64,
    /// Vertical offset applied to the indicator while it tracks a hand.
    pub hand_indicator_offset: f64,
    pub publish_interval: Duration,
    /// Object fed by the single-object `/data` route.  Defaults to the
    /// primary object, then to the first point object.
    pub data_object: Option<String>,
}

impl RelayConfig {
    /// Object that single-object reports are applied to.
    pub fn data_target(&self) -> Option<&ObjectSpec> {
        match &self.data_object {
            Some(id) => self.objects.iter().find(|o| &o.id == id),
            None => self
                .objects
                .iter()
                .find(|o| o.role == ObjectRole::Primary)
                .or_else(|| self.objects.iter().find(|o| o.role == ObjectRole::Point)),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            objects: vec![
                ObjectSpec::primary("cozmo"),
                ObjectSpec::marker("cube1"),
                ObjectSpec::marker("cube2"),
                ObjectSpec::marker("cube3"),
            ],
            indicator: IndicatorSpec::default(),
            units: LengthUnits::Millimeters,
            hidden_sentinel: DEFAULT_HIDDEN_SENTINEL,
            interaction_mode: InteractionMode::None,
            head_source: None,
            hand_commit_height: 0.5,
            hand_indicator_offset: -0.1,
            publish_interval: DEFAULT_PUBLISH_INTERVAL,
            data_object: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tracks_robot_and_three_markers() {
        let cfg = RelayConfig::default();
        let ids: Vec<_> = cfg.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["cozmo", "cube1", "cube2", "cube3"]);
        assert_eq!(cfg.publish_interval, Duration::from_millis(100));
    }

    #[test]
    fn data_target_is_none_with_only_markers() {
        let cfg = RelayConfig {
            objects: vec![ObjectSpec::marker("cube1")],
            ..RelayConfig::default()
        };
        assert!(cfg.data_target().is_none());
    }

    #[test]
    fn data_target_prefers_explicit_then_primary_then_point() {
        let mut cfg = RelayConfig::default();
        assert_eq!(cfg.data_target().map(|o| o.id.as_str()), Some("cozmo"));

        cfg.data_object = Some("cube2".to_string());
        assert_eq!(cfg.data_target().map(|o| o.id.as_str()), Some("cube2"));

        cfg.data_object = Some("ghost".to_string());
        assert!(cfg.data_target().is_none());

        let kine = RelayConfig {
            objects: vec![ObjectSpec::marker("cube1"), ObjectSpec::point("m_box")],
            ..RelayConfig::default()
        };
        assert_eq!(kine.data_target().map(|o| o.id.as_str()), Some("m_box"));
    }
}

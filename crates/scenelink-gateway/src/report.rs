//! Parsing of the comma-separated path segments the tracker sends.

use scenelink_types::{LengthUnits, RelayError, TrackedObjectState};

/// One inbound pose report, already converted to meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseReport {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
    pub visible: bool,
    /// Only set by [`parse_point_report`].
    pub height: f64,
}

impl From<PoseReport> for TrackedObjectState {
    fn from(r: PoseReport) -> Self {
        TrackedObjectState {
            position_x: r.x,
            position_y: r.y,
            heading: r.theta,
            visible: r.visible,
            height: r.height,
        }
    }
}

/// Parse `"x,y,theta,visible"`.
///
/// `visible` must be `0` or `1`.
///
/// # Errors
///
/// [`RelayError::MalformedReport`] on a wrong field count or any field that
/// does not parse.
pub fn parse_report(segment: &str, units: LengthUnits) -> Result<PoseReport, RelayError> {
    let fields: Vec<&str> = segment.split(',').collect();
    let [x, y, theta, visible] = fields.as_slice() else {
        return Err(RelayError::MalformedReport(format!(
            "expected 4 fields, got {} in '{segment}'",
            fields.len()
        )));
    };
    Ok(PoseReport {
        x: units.to_meters(number("x", x)?),
        y: units.to_meters(number("y", y)?),
        theta: number("theta", theta)?,
        visible: flag(visible)?,
        height: 0.0,
    })
}

/// Parse the legacy `"x,y,theta"` form; the object is always visible.
///
/// # Errors
///
/// Same as [`parse_report`].
pub fn parse_legacy_report(segment: &str, units: LengthUnits) -> Result<PoseReport, RelayError> {
    let fields: Vec<&str> = segment.split(',').collect();
    let [x, y, theta] = fields.as_slice() else {
        return Err(RelayError::MalformedReport(format!(
            "expected 3 fields, got {} in '{segment}'",
            fields.len()
        )));
    };
    Ok(PoseReport {
        x: units.to_meters(number("x", x)?),
        y: units.to_meters(number("y", y)?),
        theta: number("theta", theta)?,
        visible: true,
        height: 0.0,
    })
}

/// Parse a 3D point `"x,y,height"`.  All three fields are lengths; the point
/// is always visible and carries no heading.
///
/// # Errors
///
/// Same as [`parse_report`].
pub fn parse_point_report(segment: &str, units: LengthUnits) -> Result<PoseReport, RelayError> {
    let fields: Vec<&str> = segment.split(',').collect();
    let [x, y, height] = fields.as_slice() else {
        return Err(RelayError::MalformedReport(format!(
            "expected 3 fields, got {} in '{segment}'",
            fields.len()
        )));
    };
    Ok(PoseReport {
        x: units.to_meters(number("x", x)?),
        y: units.to_meters(number("y", y)?),
        theta: 0.0,
        visible: true,
        height: units.to_meters(number("height", height)?),
    })
}

fn number(name: &str, raw: &str) -> Result<f64, RelayError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| RelayError::MalformedReport(format!("{name} = '{raw}' is not a number")))?;
    if !value.is_finite() {
        return Err(RelayError::MalformedReport(format!("{name} = '{raw}' is not finite")));
    }
    Ok(value)
}

fn flag(raw: &str) -> Result<bool, RelayError> {
    match raw.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => Err(RelayError::MalformedReport(format!(
            "visible = '{other}' must be 0 or 1"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn millimeters_are_scaled() {
        let r = parse_report("500,250,10,1", LengthUnits::Millimeters).unwrap();
        assert_eq!(
            r,
            PoseReport {
                x: 0.5,
                y: 0.25,
                theta: 10.0,
                visible: true,
                height: 0.0,
            }
        );
    }

    #[test]
    fn meters_pass_through() {
        let r = parse_report("0.5,-1.5,270,0", LengthUnits::Meters).unwrap();
        assert_eq!(r.x, 0.5);
        assert_eq!(r.y, -1.5);
        assert!(!r.visible);
    }

    #[test]
    fn theta_is_never_scaled() {
        let r = parse_report("0,0,90,1", LengthUnits::Millimeters).unwrap();
        assert_eq!(r.theta, 90.0);
    }

    #[test]
    fn non_numeric_field_is_rejected() {
        let err = parse_report("abc,0,0,1", LengthUnits::Millimeters).unwrap_err();
        assert!(matches!(err, RelayError::MalformedReport(m) if m.contains("x")));
    }

    #[test]
    fn visible_must_be_binary() {
        assert!(parse_report("0,0,0,yes", LengthUnits::Millimeters).is_err());
        assert!(parse_report("0,0,0,2", LengthUnits::Millimeters).is_err());
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        assert!(parse_report("1,2,3", LengthUnits::Millimeters).is_err());
        assert!(parse_report("1,2,3,1,5", LengthUnits::Millimeters).is_err());
        assert!(parse_legacy_report("1,2", LengthUnits::Millimeters).is_err());
    }

    #[test]
    fn infinite_values_are_rejected() {
        assert!(parse_report("inf,0,0,1", LengthUnits::Meters).is_err());
        assert!(parse_report("0,NaN,0,1", LengthUnits::Meters).is_err());
    }

    #[test]
    fn legacy_report_is_visible() {
        let r = parse_legacy_report("1000,2000,45", LengthUnits::Millimeters).unwrap();
        assert_eq!((r.x, r.y, r.theta, r.visible), (1.0, 2.0, 45.0, true));
    }

    #[test]
    fn point_report_scales_every_field() {
        let r = parse_point_report("100,-200,300", LengthUnits::Millimeters).unwrap();
        assert_eq!((r.x, r.y, r.height), (0.1, -0.2, 0.3));
        assert_eq!((r.theta, r.visible), (0.0, true));

        let state = TrackedObjectState::from(r);
        assert_eq!(state.height, 0.3);
    }

    #[test]
    fn point_report_needs_three_numbers() {
        assert!(parse_point_report("1,2", LengthUnits::Millimeters).is_err());
        assert!(parse_point_report("1,2,up", LengthUnits::Millimeters).is_err());
    }
}

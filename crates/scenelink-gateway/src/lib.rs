//! `scenelink-gateway` – HTTP endpoint for the robot tracker.
//!
//! The tracker pushes pose reports and polls for waypoints over plain `GET`
//! requests; see [`server`] for the route table.  Reports are parsed by
//! [`report`] and handed to a shared [`Relay`][scenelink_runtime::Relay].

pub mod report;
pub mod server;

pub use report::{PoseReport, parse_legacy_report, parse_point_report, parse_report};
pub use server::{DEFAULT_PORT, GatewayServer, router, serve};

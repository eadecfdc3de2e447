//! Per-server state transition applied after every probe.
//!
//! `alert_sent` moves `false -> true` once per failure streak (after the
//! alert email actually went out) and back to `false` on the next success.

use chrono::{DateTime, Utc};

use crate::db::entities::server;
use crate::db::enums::ServerStatus;
use crate::db::services::ServerUpdate;
use crate::monitor::ProbeResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Fields to persist for the probe outcome. Never sets `alert_sent = true`;
    /// that is written only once the alert has been delivered.
    pub update: ServerUpdate,
    pub should_alert: bool,
}

pub fn reconcile(
    server: &server::Model,
    probe: &ProbeResult,
    checked_at: DateTime<Utc>,
    failure_threshold: i32,
) -> Transition {
    let response_time = i32::try_from(probe.response_time_ms).unwrap_or(i32::MAX);

    if probe.success {
        return Transition {
            update: ServerUpdate {
                status: Some(ServerStatus::Online),
                response_time: Some(response_time),
                last_check: Some(checked_at),
                consecutive_failures: Some(0),
                alert_sent: server.alert_sent.then_some(false),
            },
            should_alert: false,
        };
    }

    let failures = server.consecutive_failures.max(0).saturating_add(1);
    let should_alert = failures >= failure_threshold && server.alert_enabled && !server.alert_sent;

    Transition {
        update: ServerUpdate {
            status: Some(ServerStatus::Offline),
            response_time: Some(response_time),
            last_check: Some(checked_at),
            consecutive_failures: Some(failures),
            alert_sent: None,
        },
        should_alert,
    }
}

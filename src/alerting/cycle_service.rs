use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use sea_orm::DbErr;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, error, info, warn};

use super::state::reconcile;
use crate::config::CycleSettings;
use crate::db::entities::server;
use crate::db::services::ServerUpdate;
use crate::db::store::ServerStore;
use crate::monitor::Probe;
use crate::notifications::service::NotificationService;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Database error: {0}")]
    Store(#[from] DbErr),
}

/// Tally of one monitoring pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub total_servers: u64,
    pub batches: u32,
    pub checked: u32,
    pub online: u32,
    pub offline: u32,
    pub alerts_sent: u32,
    pub alerts_failed: u32,
    /// Servers whose handling errored or panicked.
    pub failed_checks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertOutcome {
    NotNeeded,
    Sent,
    Failed,
}

#[derive(Debug, Clone, Copy)]
struct CheckOutcome {
    online: bool,
    alert: AlertOutcome,
}

/// Everything one spawned per-server task needs.
#[derive(Clone)]
struct ServerChecker {
    store: Arc<dyn ServerStore>,
    prober: Arc<dyn Probe>,
    notifications: Arc<NotificationService>,
    failure_threshold: i32,
}

impl ServerChecker {
    async fn check(self, server: server::Model) -> Result<CheckOutcome, DbErr> {
        let probe = self.prober.probe(&server.url).await;
        let transition = reconcile(&server, &probe, Utc::now(), self.failure_threshold);

        self.store
            .update_by_id(server.id, transition.update.clone())
            .await?;

        if probe.success {
            debug!(
                server_id = server.id,
                url = %server.url,
                response_time_ms = probe.response_time_ms,
                "Server is up."
            );
        } else {
            warn!(
                server_id = server.id,
                url = %server.url,
                status_code = ?probe.status_code,
                error = probe.error_message.as_deref().unwrap_or_default(),
                consecutive_failures = ?transition.update.consecutive_failures,
                "Server check failed."
            );
        }

        let alert = if transition.should_alert {
            let mut current = server;
            transition.update.apply_to(&mut current);
            self.deliver_alert(&current, probe.error_message.as_deref())
                .await
        } else {
            AlertOutcome::NotNeeded
        };

        Ok(CheckOutcome {
            online: probe.success,
            alert,
        })
    }

    /// Sends the alert, then records `alert_sent`. A failed send leaves the
    /// flag unset so the next failing check tries again.
    async fn deliver_alert(&self, server: &server::Model, error_message: Option<&str>) -> AlertOutcome {
        if let Err(e) = self
            .notifications
            .send_down_alert(server, error_message)
            .await
        {
            error!(
                server_id = server.id,
                url = %server.url,
                error = %e,
                "Failed to send down alert; will retry on the next failing check."
            );
            return AlertOutcome::Failed;
        }

        if let Err(e) = self
            .store
            .update_by_id(server.id, ServerUpdate::alert_sent(true))
            .await
        {
            error!(
                server_id = server.id,
                error = %e,
                "Down alert sent but marking it failed; it may be sent again."
            );
        }
        AlertOutcome::Sent
    }
}

/// Runs monitoring passes: pages through every server in fixed-size batches,
/// probes each batch concurrently and reconciles the results.
pub struct CycleCoordinator {
    checker: ServerChecker,
    settings: CycleSettings,
}

impl CycleCoordinator {
    pub fn new(
        store: Arc<dyn ServerStore>,
        prober: Arc<dyn Probe>,
        notifications: Arc<NotificationService>,
        settings: CycleSettings,
    ) -> Self {
        Self {
            checker: ServerChecker {
                store,
                prober,
                notifications,
                failure_threshold: settings.alert_failure_threshold,
            },
            settings,
        }
    }

    /// Runs cycles forever on a fixed period. Cycle failures are logged, not fatal.
    pub async fn start_periodic_checks(self: Arc<Self>, period: Duration) {
        info!(period_seconds = period.as_secs(), "Periodic server checks started.");
        let mut interval = interval(period);
        // An overrunning cycle pushes the schedule back instead of bursting.
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = self.run_cycle().await {
                error!(error = %e, "Server check cycle failed.");
            }
        }
    }

    /// One full pass over all servers. Only store failures while counting or
    /// paging abort the cycle; everything per-server is contained.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let total = self.checker.store.count().await?;
        let mut report = CycleReport {
            total_servers: total,
            ..Default::default()
        };

        if total == 0 {
            info!("No servers registered; nothing to check.");
            return Ok(report);
        }

        let batch_size = self.settings.batch_size.max(1);
        info!(total, batch_size, "Starting server check cycle.");

        let mut offset = 0;
        while offset < total {
            let batch = self.checker.store.fetch_page(offset, batch_size).await?;
            if batch.is_empty() {
                break;
            }
            report.batches += 1;
            debug!(offset, size = batch.len(), "Checking batch.");

            self.run_batch(batch, &mut report).await;

            offset += batch_size;
            if offset < total && !self.settings.batch_delay.is_zero() {
                sleep(self.settings.batch_delay).await;
            }
        }

        info!(
            checked = report.checked,
            online = report.online,
            offline = report.offline,
            alerts_sent = report.alerts_sent,
            alerts_failed = report.alerts_failed,
            failed_checks = report.failed_checks,
            "Server check cycle completed."
        );
        Ok(report)
    }

    async fn run_batch(&self, batch: Vec<server::Model>, report: &mut CycleReport) {
        let tasks = batch.into_iter().map(|server| {
            let server_id = server.id;
            let handle = tokio::spawn(self.checker.clone().check(server));
            async move { (server_id, handle.await) }
        });

        for (server_id, joined) in join_all(tasks).await {
            report.checked += 1;
            match joined {
                Ok(Ok(outcome)) => {
                    if outcome.online {
                        report.online += 1;
                    } else {
                        report.offline += 1;
                    }
                    match outcome.alert {
                        AlertOutcome::Sent => report.alerts_sent += 1,
                        AlertOutcome::Failed => report.alerts_failed += 1,
                        AlertOutcome::NotNeeded => {}
                    }
                }
                Ok(Err(e)) => {
                    report.failed_checks += 1;
                    error!(server_id, error = %e, "Failed to record check result.");
                }
                Err(e) => {
                    report.failed_checks += 1;
                    error!(server_id, error = %e, "Server check task aborted.");
                }
            }
        }
    }
}

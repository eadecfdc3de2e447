use std::sync::Arc;

use clap::Parser;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{error, info};

use uptime_checker::alerting::CycleCoordinator;
use uptime_checker::config::CheckerConfig;
use uptime_checker::db::store::SeaOrmServerStore;
use uptime_checker::logging::init_logging;
use uptime_checker::monitor::HttpProber;
use uptime_checker::notifications::senders::http_mail::HttpMailSender;
use uptime_checker::notifications::service::NotificationService;
use uptime_checker::version::VERSION;

/// Probes every registered server once and emails owners of servers that keep failing.
///
/// Configuration comes from the environment (or a `.env` file). Set
/// `CHECK_INTERVAL_SECONDS` to keep running on a schedule instead of exiting.
#[derive(Parser, Debug)]
#[command(author, version = VERSION, about, long_about = None)]
struct Args {}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let _args = Args::parse();

    let config = CheckerConfig::from_env()?;
    init_logging(&config.log_dir);
    info!("Starting uptime checker, version: {}", VERSION);

    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.database_max_connections)
        .sqlx_logging(false);
    let db: DatabaseConnection = Database::connect(opt).await.map_err(|e| {
        error!(error = %e, "Failed to connect to the database.");
        e
    })?;

    let store = Arc::new(SeaOrmServerStore::new(db.clone()));
    let prober = Arc::new(HttpProber::new(config.cycle.probe_timeout)?);
    let mail_sender = Arc::new(HttpMailSender::new(&config.mail)?);
    let notifications = Arc::new(NotificationService::new(mail_sender));

    let coordinator = Arc::new(CycleCoordinator::new(
        store,
        prober,
        notifications,
        config.cycle.clone(),
    ));

    if let Some(period) = config.check_interval {
        coordinator.start_periodic_checks(period).await;
        return Ok(());
    }

    let outcome = coordinator.run_cycle().await;

    if let Err(e) = db.close().await {
        error!(error = %e, "Failed to close the database connection.");
    }

    match outcome {
        Ok(report) => {
            info!(
                checked = report.checked,
                alerts_sent = report.alerts_sent,
                "Check run finished."
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Check run failed.");
            Err(e.into())
        }
    }
}

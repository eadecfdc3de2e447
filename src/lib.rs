pub mod config;
pub mod logging;
pub mod version;

pub mod db;
pub mod monitor;

pub mod alerting;
pub mod notifications;

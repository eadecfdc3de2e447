use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::db::enums::ServerStatus;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "servers")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_email: String,
    pub url: String,
    pub status: ServerStatus,
    /// Latency of the most recent probe, in milliseconds.
    pub response_time: i32,
    pub last_check: Option<ChronoDateTimeUtc>,
    pub consecutive_failures: i32,
    pub alert_enabled: bool,
    /// Set once an alert went out for the current failure streak.
    pub alert_sent: bool,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

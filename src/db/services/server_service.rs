//! Queries against the `servers` table.
//!
//! The checker never creates or deletes rows; it only pages through them and
//! writes back probe outcomes.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::db::entities::{prelude::*, server};
use crate::db::enums::ServerStatus;

/// Partial update of a server row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerUpdate {
    pub status: Option<ServerStatus>,
    pub response_time: Option<i32>,
    pub last_check: Option<DateTime<Utc>>,
    pub consecutive_failures: Option<i32>,
    pub alert_sent: Option<bool>,
}

impl ServerUpdate {
    pub fn alert_sent(value: bool) -> Self {
        Self {
            alert_sent: Some(value),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ServerUpdate::default()
    }

    /// Applies the set fields onto an in-memory model.
    pub fn apply_to(&self, model: &mut server::Model) {
        if let Some(status) = self.status {
            model.status = status;
        }
        if let Some(response_time) = self.response_time {
            model.response_time = response_time;
        }
        if let Some(last_check) = self.last_check {
            model.last_check = Some(last_check);
        }
        if let Some(failures) = self.consecutive_failures {
            model.consecutive_failures = failures;
        }
        if let Some(alert_sent) = self.alert_sent {
            model.alert_sent = alert_sent;
        }
    }
}

/// Lowercases and trims a contact address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn count_servers(db: &DatabaseConnection) -> Result<u64, DbErr> {
    Server::find().count(db).await
}

/// Returns one page of servers in ascending id order.
pub async fn get_servers_page(
    db: &DatabaseConnection,
    offset: u64,
    limit: u64,
) -> Result<Vec<server::Model>, DbErr> {
    Server::find()
        .order_by_asc(server::Column::Id)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
}

/// Writes the set fields of `changes` to the server with the given id.
pub async fn update_server(
    db: &DatabaseConnection,
    server_id: i32,
    changes: &ServerUpdate,
) -> Result<u64, DbErr> {
    if changes.is_empty() {
        return Ok(0);
    }

    let now = Utc::now();
    let mut query = Server::update_many().col_expr(server::Column::UpdatedAt, Expr::value(now));

    if let Some(status) = changes.status {
        query = query.col_expr(server::Column::Status, Expr::value(status));
    }
    if let Some(response_time) = changes.response_time {
        query = query.col_expr(server::Column::ResponseTime, Expr::value(response_time));
    }
    if let Some(last_check) = changes.last_check {
        query = query.col_expr(server::Column::LastCheck, Expr::value(last_check));
    }
    if let Some(failures) = changes.consecutive_failures {
        query = query.col_expr(server::Column::ConsecutiveFailures, Expr::value(failures));
    }
    if let Some(alert_sent) = changes.alert_sent {
        query = query.col_expr(server::Column::AlertSent, Expr::value(alert_sent));
    }

    let result = query
        .filter(server::Column::Id.eq(server_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!("server {server_id}")));
    }
    Ok(result.rows_affected)
}

use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};

use crate::db::entities::server;
use crate::db::services::{ServerUpdate, server_service};

/// Storage operations the monitoring cycle relies on.
#[async_trait]
pub trait ServerStore: Send + Sync {
    async fn count(&self) -> Result<u64, DbErr>;

    /// Reads a stable-ordered page of servers.
    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<server::Model>, DbErr>;

    async fn update_by_id(&self, id: i32, changes: ServerUpdate) -> Result<(), DbErr>;
}

/// `ServerStore` over a sea-orm connection.
#[derive(Clone)]
pub struct SeaOrmServerStore {
    db: DatabaseConnection,
}

impl SeaOrmServerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ServerStore for SeaOrmServerStore {
    async fn count(&self) -> Result<u64, DbErr> {
        server_service::count_servers(&self.db).await
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<server::Model>, DbErr> {
        server_service::get_servers_page(&self.db, offset, limit).await
    }

    async fn update_by_id(&self, id: i32, changes: ServerUpdate) -> Result<(), DbErr> {
        server_service::update_server(&self.db, id, &changes).await?;
        Ok(())
    }
}

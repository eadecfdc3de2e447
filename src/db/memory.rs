//! In-memory `ServerStore` used by the cycle tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use sea_orm::DbErr;
use tokio::sync::Mutex;

use crate::db::entities::server;
use crate::db::enums::ServerStatus;
use crate::db::services::ServerUpdate;
use crate::db::store::ServerStore;

#[derive(Default)]
struct Inner {
    servers: Vec<server::Model>,
    pages: Vec<(u64, u64, usize)>,
    updates: Vec<(i32, ServerUpdate)>,
}

#[derive(Default)]
pub(crate) struct InMemoryServerStore {
    inner: Mutex<Inner>,
    failing_updates: HashSet<i32>,
    failing_counts: AtomicU32,
    reject_alert_marks: bool,
}

pub(crate) fn server_fixture(id: i32) -> server::Model {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    server::Model {
        id,
        user_email: format!("owner{id}@example.com"),
        url: format!("https://svc{id}.example.com/health"),
        status: ServerStatus::Checking,
        response_time: 0,
        last_check: None,
        consecutive_failures: 0,
        alert_enabled: true,
        alert_sent: false,
        created_at: created,
        updated_at: created,
    }
}

impl InMemoryServerStore {
    pub(crate) fn with_servers(servers: Vec<server::Model>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                servers,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub(crate) fn failing_updates_for(mut self, id: i32) -> Self {
        self.failing_updates.insert(id);
        self
    }

    pub(crate) fn failing_count(self) -> Self {
        self.failing_first_counts(u32::MAX)
    }

    /// The next `n` calls to `count` fail, later ones succeed.
    pub(crate) fn failing_first_counts(mut self, n: u32) -> Self {
        self.failing_counts = AtomicU32::new(n);
        self
    }

    /// Rejects writes that only set `alert_sent`.
    pub(crate) fn rejecting_alert_marks(mut self) -> Self {
        self.reject_alert_marks = true;
        self
    }

    pub(crate) async fn get(&self, id: i32) -> Option<server::Model> {
        let inner = self.inner.lock().await;
        inner.servers.iter().find(|s| s.id == id).cloned()
    }

    /// `(offset, limit, rows returned)` for every page read.
    pub(crate) async fn pages(&self) -> Vec<(u64, u64, usize)> {
        self.inner.lock().await.pages.clone()
    }

    pub(crate) async fn updates_for(&self, id: i32) -> Vec<ServerUpdate> {
        let inner = self.inner.lock().await;
        inner
            .updates
            .iter()
            .filter(|(server_id, _)| *server_id == id)
            .map(|(_, update)| update.clone())
            .collect()
    }
}

#[async_trait]
impl ServerStore for InMemoryServerStore {
    async fn count(&self) -> Result<u64, DbErr> {
        let remaining = self.failing_counts.load(Ordering::SeqCst);
        if remaining > 0 {
            if remaining != u32::MAX {
                self.failing_counts.fetch_sub(1, Ordering::SeqCst);
            }
            return Err(DbErr::Conn(sea_orm::RuntimeErr::Internal(
                "connection refused".to_string(),
            )));
        }
        Ok(self.inner.lock().await.servers.len() as u64)
    }

    async fn fetch_page(&self, offset: u64, limit: u64) -> Result<Vec<server::Model>, DbErr> {
        let mut inner = self.inner.lock().await;
        let mut sorted = inner.servers.clone();
        sorted.sort_by_key(|s| s.id);
        let page: Vec<_> = sorted
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        inner.pages.push((offset, limit, page.len()));
        Ok(page)
    }

    async fn update_by_id(&self, id: i32, changes: ServerUpdate) -> Result<(), DbErr> {
        if self.failing_updates.contains(&id) {
            return Err(DbErr::Custom(format!("write rejected for server {id}")));
        }
        if self.reject_alert_marks && changes.alert_sent.is_some() && changes.status.is_none() {
            return Err(DbErr::Custom(format!("alert flag write rejected for server {id}")));
        }
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let server = inner
            .servers
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DbErr::RecordNotFound(format!("server {id}")))?;
        changes.apply_to(server);
        inner.updates.push((id, changes));
        Ok(())
    }
}

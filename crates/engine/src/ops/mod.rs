use sea_orm::DatabaseConnection;
use tokio::sync::{Mutex, MutexGuard, broadcast};

use crate::{EngineError, LedgerEvent, ResultEngine};

mod reports;
mod sessions;
mod transactions;

pub use reports::SessionSummary;
pub use transactions::TransactionListFilter;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The ledger service: owns the durable store handle and serializes every
/// mutating operation.
///
/// Cloning is not supported; share one instance behind `Arc`. All state
/// lives in the database: the engine itself only holds the connection, the
/// write lock, and the event channel.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    write_lock: Mutex<()>,
    events: broadcast::Sender<LedgerEvent>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Subscribes to ledger change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Serializes validate-then-apply spans across concurrent callers.
    pub(crate) async fn write_guard(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    pub(crate) fn emit(&self, event: LedgerEvent) {
        // A send error only means nobody is listening.
        let _ = self.events.send(event);
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::MissingField(label.to_string()));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Engine {
            database: self.database,
            write_lock: Mutex::new(()),
            events,
        })
    }
}

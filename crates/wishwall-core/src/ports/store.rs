//! Remote store port - abstraction over the hosted data backend.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::StoreError;

/// A row as exchanged with the backend: a JSON object keyed by column.
pub type Row = serde_json::Map<String, Value>;

/// Tables exposed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Posts,
    Comments,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Posts => "posts",
            Table::Comments => "comments",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Descending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Notification that a row changed somewhere in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    pub id: Uuid,
}

/// Callback invoked for every change on a subscribed table.
pub type ChangeHandler =
    Box<dyn Fn(ChangeEvent) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Handle to a live subscription. Delivery stops when it is dropped.
pub struct Subscription {
    table: Table,
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn new(table: Table, task: JoinHandle<()>) -> Self {
        Self { table, task }
    }

    pub fn table(&self) -> Table {
        self.table
    }

    /// Stop receiving change notifications.
    pub fn unsubscribe(self) {
        tracing::info!(table = %self.table, "Unsubscribed from table changes");
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("table", &self.table)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

/// Remote store trait - the backend's client SDK as seen by this system.
///
/// The store assigns `id` and `created_at` on insert. No transactional
/// guarantees beyond single-row updates.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Insert a row and return it with its generated columns.
    async fn insert(&self, table: Table, row: Row) -> Result<Row, StoreError>;

    /// Fetch every row matching `filter`, sorted by `order`.
    async fn select(
        &self,
        table: Table,
        filter: Option<Filter>,
        order: OrderBy,
    ) -> Result<Vec<Row>, StoreError>;

    /// Overwrite the given columns of one row and return the updated row.
    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError>;

    /// Invoke `handler` on any insert, update or delete in `table`.
    async fn subscribe(
        &self,
        table: Table,
        handler: ChangeHandler,
    ) -> Result<Subscription, StoreError>;
}

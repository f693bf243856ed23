//! In-memory remote store.
//!
//! Stands in for the hosted backend: assigns ids and timestamps, enforces the
//! column constraints and fans out change notifications per table.
//! Works within a single process only. Data is lost on restart.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::Value;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use wishwall_core::StoreError;
use wishwall_core::domain::limits::{self, COMMENT_CONTENT_MAX, POST_CONTENT_MAX, RECIPIENT_MAX};
use wishwall_core::ports::{
    ChangeEvent, ChangeHandler, ChangeKind, Direction, Filter, OrderBy, RemoteStore, Row,
    Subscription, Table,
};

/// In-memory store configuration.
#[derive(Debug, Clone)]
pub struct InMemoryStoreConfig {
    /// Capacity of each table's change feed.
    pub feed_buffer: usize,
    /// Simulated round-trip time added to every insert, select and update.
    pub latency: Duration,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        Self {
            feed_buffer: 100,
            latency: Duration::ZERO,
        }
    }
}

impl InMemoryStoreConfig {
    pub fn from_env() -> Self {
        Self {
            feed_buffer: std::env::var("STORE_FEED_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            latency: Duration::from_millis(
                std::env::var("STORE_LATENCY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            ),
        }
    }
}

#[derive(Default)]
struct Tables {
    rows: HashMap<Table, Vec<Row>>,
    last_stamp: Option<DateTime<Utc>>,
}

impl Tables {
    fn rows(&self, table: Table) -> &[Row] {
        self.rows.get(&table).map_or(&[], Vec::as_slice)
    }

    fn rows_mut(&mut self, table: Table) -> &mut Vec<Row> {
        self.rows.entry(table).or_default()
    }

    fn position(&self, table: Table, id: &str) -> Option<usize> {
        self.rows(table).iter().position(|row| row_id(row) == Some(id))
    }

    /// Strictly increasing, microsecond precision.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(6);
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

/// In-memory implementation of [`RemoteStore`].
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    feeds: HashMap<Table, broadcast::Sender<ChangeEvent>>,
    available: AtomicBool,
    config: InMemoryStoreConfig,
}

impl InMemoryStore {
    pub fn new(config: InMemoryStoreConfig) -> Self {
        let capacity = config.feed_buffer.max(1);
        let feeds = [Table::Posts, Table::Comments]
            .into_iter()
            .map(|table| (table, broadcast::channel(capacity).0))
            .collect();

        Self {
            tables: RwLock::new(Tables::default()),
            feeds,
            available: AtomicBool::new(true),
            config,
        }
    }

    pub fn from_env() -> Self {
        Self::new(InMemoryStoreConfig::from_env())
    }

    /// Take the store offline (or back online). While offline every insert,
    /// select and update fails with [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
        tracing::info!(available, "Store availability changed");
    }

    /// Delete a row the way another actor would. Removing a post also
    /// removes its comments.
    pub async fn remove(&self, table: Table, id: Uuid) -> Result<Row, StoreError> {
        let mut tables = self.tables.write().await;
        let key = id.to_string();
        let index = tables.position(table, &key).ok_or(StoreError::NotFound {
            table: table.as_str(),
            id,
        })?;
        let removed = tables.rows_mut(table).remove(index);

        let mut orphans = Vec::new();
        if table == Table::Posts {
            tables.rows_mut(Table::Comments).retain(|row| {
                let orphaned = row.get("post_id").and_then(Value::as_str) == Some(key.as_str());
                if orphaned {
                    orphans.extend(row_id(row).and_then(|id| Uuid::parse_str(id).ok()));
                }
                !orphaned
            });
        }
        drop(tables);

        self.publish(table, ChangeKind::Delete, id);
        for comment_id in orphans {
            self.publish(Table::Comments, ChangeKind::Delete, comment_id);
        }
        Ok(removed)
    }

    async fn round_trip(&self) -> Result<(), StoreError> {
        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }
        if !self.available.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(())
    }

    fn publish(&self, table: Table, kind: ChangeKind, id: Uuid) {
        if let Some(sender) = self.feeds.get(&table) {
            // Ignore send errors (no subscribers)
            let _ = sender.send(ChangeEvent { table, kind, id });
            tracing::debug!(table = %table, ?kind, row_id = %id, "Change published");
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(InMemoryStoreConfig::default())
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn insert(&self, table: Table, mut row: Row) -> Result<Row, StoreError> {
        self.round_trip().await?;
        let mut tables = self.tables.write().await;
        check_constraints(table, &row, &tables)?;

        let id = Uuid::new_v4();
        // Fixed-width UTC timestamps sort the same as strings and as times.
        let created_at = tables
            .next_stamp()
            .to_rfc3339_opts(SecondsFormat::Micros, true);
        row.insert("id".into(), Value::String(id.to_string()));
        row.insert("created_at".into(), Value::String(created_at));
        row.entry("upvotes").or_insert(Value::from(0u64));

        tables.rows_mut(table).push(row.clone());
        drop(tables);

        self.publish(table, ChangeKind::Insert, id);
        Ok(row)
    }

    async fn select(
        &self,
        table: Table,
        filter: Option<Filter>,
        order: OrderBy,
    ) -> Result<Vec<Row>, StoreError> {
        self.round_trip().await?;
        let tables = self.tables.read().await;

        let mut rows: Vec<Row> = tables
            .rows(table)
            .iter()
            .filter(|row| filter.as_ref().is_none_or(|f| f.matches(row)))
            .cloned()
            .collect();
        drop(tables);

        // Stable: ties keep insertion order in both directions.
        rows.sort_by(|a, b| {
            let ordering = compare_values(a.get(&order.column), b.get(&order.column));
            match order.direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
        Ok(rows)
    }

    async fn update(&self, table: Table, id: Uuid, patch: Row) -> Result<Row, StoreError> {
        self.round_trip().await?;
        let mut tables = self.tables.write().await;
        let index = tables
            .position(table, &id.to_string())
            .ok_or(StoreError::NotFound {
                table: table.as_str(),
                id,
            })?;

        if patch.get("upvotes").is_some_and(|v| v.as_u64().is_none()) {
            return Err(StoreError::Rejected(format!(
                "{table}.upvotes must be a non-negative integer"
            )));
        }

        let row = &mut tables.rows_mut(table)[index];
        for (column, value) in patch {
            if column == "id" || column == "created_at" {
                continue;
            }
            row.insert(column, value);
        }
        let updated = row.clone();
        drop(tables);

        self.publish(table, ChangeKind::Update, id);
        Ok(updated)
    }

    async fn subscribe(
        &self,
        table: Table,
        handler: ChangeHandler,
    ) -> Result<Subscription, StoreError> {
        let mut receiver = self
            .feeds
            .get(&table)
            .ok_or_else(|| StoreError::Unavailable(format!("no change feed for {table}")))?
            .subscribe();
        let handler = Arc::new(handler);

        let task = tokio::spawn(async move {
            tracing::info!(table = %table, "Subscribed to table changes");

            loop {
                match receiver.recv().await {
                    Ok(event) => handler(event).await,
                    Err(broadcast::error::RecvError::Lagged(count)) => {
                        tracing::warn!(table = %table, lagged = count, "Subscriber lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!(table = %table, "Change feed closed");
                        break;
                    }
                }
            }
        });

        Ok(Subscription::new(table, task))
    }
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

/// Missing and null sort first; numbers numerically; strings lexically.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        (None | Some(Value::Null), _) => Ordering::Less,
        (_, None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn check_constraints(table: Table, row: &Row, tables: &Tables) -> Result<(), StoreError> {
    match table {
        Table::Posts => {
            check_text(table, row, "content", POST_CONTENT_MAX)?;
            match row.get("recipient") {
                None | Some(Value::Null) => Ok(()),
                Some(Value::String(name)) if limits::char_count(name) <= RECIPIENT_MAX => Ok(()),
                Some(_) => Err(StoreError::Rejected(
                    "posts.recipient violates check constraint".to_string(),
                )),
            }
        }
        Table::Comments => {
            check_text(table, row, "content", COMMENT_CONTENT_MAX)?;
            let post_id = row
                .get("post_id")
                .and_then(Value::as_str)
                .ok_or_else(|| StoreError::Rejected("comments.post_id is required".to_string()))?;
            if tables.position(Table::Posts, post_id).is_none() {
                return Err(StoreError::Rejected(
                    "comments.post_id violates foreign key constraint".to_string(),
                ));
            }
            Ok(())
        }
    }
}

fn check_text(table: Table, row: &Row, column: &str, max: usize) -> Result<(), StoreError> {
    match row.get(column).and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() && limits::char_count(text) <= max => Ok(()),
        _ => Err(StoreError::Rejected(format!(
            "{table}.{column} violates check constraint"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    async fn insert_post(store: &InMemoryStore, content: &str) -> Row {
        store
            .insert(Table::Posts, row(json!({ "content": content })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_generated_columns() {
        let store = InMemoryStore::default();
        let inserted = insert_post(&store, "I wish for rain").await;

        assert!(Uuid::parse_str(row_id(&inserted).unwrap()).is_ok());
        assert!(inserted["created_at"].as_str().unwrap().ends_with('Z'));
        assert_eq!(inserted["upvotes"], json!(0));
        assert!(inserted.get("recipient").is_none());
    }

    #[tokio::test]
    async fn test_select_orders_and_filters() {
        let store = InMemoryStore::default();
        let first = insert_post(&store, "first").await;
        let second = insert_post(&store, "second").await;
        let post_id = row_id(&first).unwrap().to_string();
        for content in ["a", "b"] {
            store
                .insert(
                    Table::Comments,
                    row(json!({ "post_id": post_id, "content": content })),
                )
                .await
                .unwrap();
        }

        let newest_first = store
            .select(Table::Posts, None, OrderBy::descending("created_at"))
            .await
            .unwrap();
        assert_eq!(newest_first[0]["id"], second["id"]);
        assert_eq!(newest_first[1]["id"], first["id"]);

        let thread = store
            .select(
                Table::Comments,
                Some(Filter::eq("post_id", post_id)),
                OrderBy::ascending("created_at"),
            )
            .await
            .unwrap();
        let contents: Vec<&str> = thread.iter().map(|r| r["content"].as_str().unwrap()).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_select_by_number_keeps_ties_in_insertion_order() {
        let store = InMemoryStore::default();
        let a = insert_post(&store, "a").await;
        let b = insert_post(&store, "b").await;
        let c = insert_post(&store, "c").await;
        let id = Uuid::parse_str(row_id(&c).unwrap()).unwrap();
        store
            .update(Table::Posts, id, row(json!({ "upvotes": 10 })))
            .await
            .unwrap();

        let top = store
            .select(Table::Posts, None, OrderBy::descending("upvotes"))
            .await
            .unwrap();
        let ids: Vec<&Value> = top.iter().map(|r| &r["id"]).collect();
        assert_eq!(ids, vec![&c["id"], &a["id"], &b["id"]]);
    }

    #[tokio::test]
    async fn test_update_overwrites_only_patched_columns() {
        let store = InMemoryStore::default();
        let inserted = insert_post(&store, "wish").await;
        let id = Uuid::parse_str(row_id(&inserted).unwrap()).unwrap();

        let updated = store
            .update(
                Table::Posts,
                id,
                row(json!({ "upvotes": 7, "created_at": "1970-01-01T00:00:00Z" })),
            )
            .await
            .unwrap();
        assert_eq!(updated["upvotes"], json!(7));
        assert_eq!(updated["content"], json!("wish"));
        assert_eq!(updated["created_at"], inserted["created_at"]);
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let store = InMemoryStore::default();
        let id = Uuid::new_v4();
        let err = store
            .update(Table::Posts, id, row(json!({ "upvotes": 1 })))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound { table: "posts", id });
    }

    #[tokio::test]
    async fn test_constraints() {
        let store = InMemoryStore::default();

        let blank = store
            .insert(Table::Posts, row(json!({ "content": "   " })))
            .await;
        assert!(matches!(blank, Err(StoreError::Rejected(_))));

        let orphan = store
            .insert(
                Table::Comments,
                row(json!({ "post_id": Uuid::new_v4().to_string(), "content": "hi" })),
            )
            .await;
        assert!(matches!(orphan, Err(StoreError::Rejected(_))));

        let long_name = "x".repeat(RECIPIENT_MAX + 1);
        let named = store
            .insert(
                Table::Posts,
                row(json!({ "content": "hi", "recipient": long_name })),
            )
            .await;
        assert!(matches!(named, Err(StoreError::Rejected(_))));
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = InMemoryStore::default();
        store.set_available(false);

        let err = store
            .select(Table::Posts, None, OrderBy::descending("created_at"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        store.set_available(true);
        insert_post(&store, "back online").await;
    }

    #[tokio::test]
    async fn test_subscribe_receives_changes_until_dropped() {
        let store = InMemoryStore::default();
        let (tx, mut rx) = mpsc::channel(8);

        let subscription = store
            .subscribe(
                Table::Posts,
                Box::new(move |event| {
                    let tx = tx.clone();
                    Box::pin(async move {
                        tx.send(event).await.unwrap();
                    })
                }),
            )
            .await
            .unwrap();
        assert_eq!(subscription.table(), Table::Posts);

        let inserted = insert_post(&store, "hello").await;
        let id = Uuid::parse_str(row_id(&inserted).unwrap()).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            event,
            ChangeEvent {
                table: Table::Posts,
                kind: ChangeKind::Insert,
                id
            }
        );

        subscription.unsubscribe();
        tokio::task::yield_now().await;
        insert_post(&store, "unheard").await;
        let next = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(!matches!(next, Ok(Some(_))));
    }

    #[tokio::test]
    async fn test_remove_post_cascades_to_comments() {
        let store = InMemoryStore::default();
        let post = insert_post(&store, "short-lived").await;
        let post_id = row_id(&post).unwrap().to_string();
        store
            .insert(
                Table::Comments,
                row(json!({ "post_id": post_id, "content": "reply" })),
            )
            .await
            .unwrap();

        store
            .remove(Table::Posts, Uuid::parse_str(&post_id).unwrap())
            .await
            .unwrap();

        let comments = store
            .select(
                Table::Comments,
                Some(Filter::eq("post_id", post_id)),
                OrderBy::ascending("created_at"),
            )
            .await
            .unwrap();
        assert!(comments.is_empty());
    }
}

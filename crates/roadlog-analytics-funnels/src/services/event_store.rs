use async_trait::async_trait;
use roadlog_core::{AnalyticsWindowConfig, UtcDateTime};
use sea_orm::{DatabaseBackend, DatabaseConnection, DbErr, FromQueryResult, Statement};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::types::{Event, EventRow, EventWindow, WindowQuery};

#[derive(Error, Debug)]
pub enum EventStoreError {
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid timestamp '{value}' on event in session {session_id}")]
    InvalidTimestamp { value: String, session_id: String },

    #[error("Invalid event window: {0}")]
    InvalidWindow(String),
}

/// Source of the raw events behind the growth dashboard.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events at or after `query.since`, newest first, at most `query.limit`.
    async fn fetch_window(&self, query: &WindowQuery) -> Result<EventWindow, EventStoreError>;
}

#[derive(Debug, FromQueryResult)]
struct StoredEvent {
    event_name: String,
    user_id: Option<String>,
    session_id: String,
    created_at: UtcDateTime,
}

impl From<StoredEvent> for Event {
    fn from(row: StoredEvent) -> Self {
        Event {
            name: row.event_name,
            user_id: row.user_id,
            session_id: row.session_id,
            timestamp: row.created_at,
        }
    }
}

/// Reads the analytics events table of the hosted Postgres.
pub struct DatabaseEventStore {
    db: Arc<DatabaseConnection>,
    table: String,
}

impl DatabaseEventStore {
    pub fn new(db: Arc<DatabaseConnection>, config: &AnalyticsWindowConfig) -> Self {
        Self {
            db,
            table: config.events_table.clone(),
        }
    }

    fn window_statement(&self, query: &WindowQuery) -> Result<Statement, EventStoreError> {
        let limit = i64::try_from(query.limit)
            .map_err(|_| EventStoreError::InvalidWindow(format!("limit {} too large", query.limit)))?;

        // Table name is validated as an identifier by AnalyticsWindowConfig::validate
        let sql = format!(
            "SELECT event_name, user_id, session_id, created_at FROM {} \
             WHERE created_at >= $1 ORDER BY created_at DESC LIMIT $2",
            self.table
        );

        Ok(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            vec![query.since.into(), limit.into()],
        ))
    }
}

#[async_trait]
impl EventStore for DatabaseEventStore {
    async fn fetch_window(&self, query: &WindowQuery) -> Result<EventWindow, EventStoreError> {
        let statement = self.window_statement(query)?;
        debug!("Growth window query: {}", statement.sql);

        let rows = StoredEvent::find_by_statement(statement)
            .all(self.db.as_ref())
            .await?;

        debug!(
            "Fetched {} events since {} from {}",
            rows.len(),
            query.since,
            self.table
        );

        let events = rows.into_iter().map(Event::from).collect();
        Ok(EventWindow::new(events, *query))
    }
}

/// Holds events in memory, e.g. loaded from a JSON export of the events table.
#[derive(Debug, Default, Clone)]
pub struct MemoryEventStore {
    events: Vec<Event>,
}

impl MemoryEventStore {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Converts exported rows, failing on the first unreadable timestamp.
    pub fn from_rows(rows: Vec<EventRow>) -> Result<Self, EventStoreError> {
        let events = rows
            .into_iter()
            .map(|row| {
                let value = row.created_at.clone();
                let session_id = row.session_id.clone();
                row.into_event()
                    .ok_or(EventStoreError::InvalidTimestamp { value, session_id })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn fetch_window(&self, query: &WindowQuery) -> Result<EventWindow, EventStoreError> {
        Ok(EventWindow::new(self.events.clone(), *query))
    }
}

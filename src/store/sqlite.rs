/*!
 * SQLite-backed content store used by the CLI.
 */

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::ContentStore;
use super::connection::DatabaseConnection;
use crate::content::record::{ContentRecord, ContentStatus, ContentUpdate, NewContent};
use crate::errors::StoreError;

/// Content store persisted in a local SQLite database
#[derive(Clone)]
pub struct SqliteContentStore {
    db: DatabaseConnection,
}

impl SqliteContentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fresh in-memory database, used by tests
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::in_memory()?))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn get_sync(conn: &Connection, id: &str) -> Result<Option<ContentRecord>> {
        let record = conn
            .query_row(
                r#"
                SELECT id, title, document, title_secondary, document_secondary, status, updated_at
                FROM contents WHERE id = ?1
                "#,
                [id],
                |row| {
                    let updated_at: Option<String> = row.get(6)?;
                    let raw_status: String = row.get(5)?;
                    let status = raw_status.parse::<ContentStatus>().map_err(|e| {
                        warn!("Content {} has unknown status '{}'", id, raw_status);
                        rusqlite::Error::FromSqlConversionFailure(5, Type::Text, e.into())
                    })?;
                    Ok(ContentRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        document: row.get(2)?,
                        title_secondary: row.get(3)?,
                        document_secondary: row.get(4)?,
                        status,
                        updated_at: updated_at
                            .and_then(|t| DateTime::parse_from_rfc3339(&t).ok())
                            .map(|t| t.with_timezone(&Utc)),
                    })
                },
            )
            .optional()?;

        Ok(record)
    }
}

#[async_trait]
impl ContentStore for SqliteContentStore {
    async fn get(&self, id: &str) -> Result<ContentRecord, StoreError> {
        let lookup = id.to_string();
        self.db
            .call(move |conn| Self::get_sync(conn, &lookup))
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    async fn update(&self, id: &str, update: ContentUpdate) -> Result<(), StoreError> {
        let target = id.to_string();
        let now = Utc::now().to_rfc3339();

        let changed = self
            .db
            .call(move |conn| {
                let changed = conn.execute(
                    r#"
                    UPDATE contents SET
                        title = COALESCE(?2, title),
                        document = COALESCE(?3, document),
                        title_secondary = COALESCE(?4, title_secondary),
                        document_secondary = COALESCE(?5, document_secondary),
                        status = COALESCE(?6, status),
                        updated_at = ?7
                    WHERE id = ?1
                    "#,
                    params![
                        target,
                        update.title,
                        update.document,
                        update.title_secondary,
                        update.document_secondary,
                        update.status.map(|s| s.to_string()),
                        now,
                    ],
                )?;
                Ok(changed)
            })
            .await
            .map_err(|e| StoreError::PersistFailed(format!("{:#}", e)))?;

        if changed == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }

        debug!("Updated content {}", id);
        Ok(())
    }

    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError> {
        let now = Utc::now();
        let record = ContentRecord {
            id: Uuid::new_v4().to_string(),
            title: content.title,
            document: content.document,
            title_secondary: content.title_secondary,
            document_secondary: content.document_secondary,
            status: content.status,
            updated_at: Some(now),
        };

        let row = record.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO contents (
                        id, title, document, title_secondary, document_secondary, status, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        row.id,
                        row.title,
                        row.document,
                        row.title_secondary,
                        row.document_secondary,
                        row.status.to_string(),
                        now.to_rfc3339(),
                    ],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::PersistFailed(format!("{:#}", e)))?;

        info!("Created content {}", record.id);
        Ok(record)
    }
}

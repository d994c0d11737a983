/*!
 * SQLite schema for content records.
 */

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Create the schema on a fresh database. A database written by a newer
/// schema version is refused rather than modified.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    match get_schema_version(conn)? {
        0 => {
            info!("Initializing content schema v{}", SCHEMA_VERSION);
            create_all_tables(conn)?;
            set_schema_version(conn, SCHEMA_VERSION)
        }
        version if version > SCHEMA_VERSION => Err(anyhow!(
            "Content schema v{} is newer than supported v{}",
            version,
            SCHEMA_VERSION
        )),
        version => {
            debug!("Content schema is up to date (v{})", version);
            Ok(())
        }
    }
}

fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;
    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked while the editor saves
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            document TEXT NOT NULL,
            title_secondary TEXT,
            document_secondary TEXT,
            status TEXT NOT NULL DEFAULT 'draft',
            updated_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_contents_status ON contents(status);
        "#,
    )?;

    info!("Content schema created");
    Ok(())
}

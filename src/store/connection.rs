/*!
 * Shared handle on the content database.
 *
 * rusqlite connections are blocking, so every query is shipped to tokio's
 * blocking pool through `call`. The handle is cheap to clone; clones share
 * one connection.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::schema;

/// How long a writer waits on a lock held by another process
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct DatabaseConnection {
    /// `None` for in-memory databases
    file: Option<PathBuf>,
    inner: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open the database file at `path`, creating it and its directory on
    /// first use.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create directory for {}", path.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
        info!("Content database: {}", path.display());
        Self::prepare(conn, Some(path.to_path_buf()))
    }

    /// Private database that disappears with the handle
    pub fn in_memory() -> Result<Self> {
        debug!("Opening in-memory content database");
        Self::prepare(Connection::open_in_memory()?, None)
    }

    fn prepare(conn: Connection, file: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        schema::initialize_schema(&conn)?;
        Ok(Self {
            file,
            inner: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || f(&inner.lock()))
            .await
            .context("Database task did not complete")?
    }
}

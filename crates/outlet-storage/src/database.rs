// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection management: PRAGMAs, migrations and error mapping.
//!
//! All reads and writes go through the one `tokio_rusqlite::Connection`
//! held here, which runs every closure on a single background thread.
//! Do not open a second connection for writes.

use std::path::Path;
use std::time::Duration;

use outlet_core::OutletError;
use rusqlite::OpenFlags;
use thiserror::Error;
use tracing::debug;

use crate::migrations;

/// Failure inside a storage closure: either SQLite itself or a domain rule
/// checked against the row loaded in the same transaction.
#[derive(Debug, Error)]
pub enum TxError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Rejected(#[from] OutletError),
}

/// Map a plain SQLite call failure into `OutletError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> OutletError {
    OutletError::Storage {
        source: Box::new(e),
    }
}

/// Map a transactional call failure. Domain rejections pass through unchanged
/// so callers still see `NotFound`, `InvalidOperation` and friends.
pub fn map_tx_err(e: tokio_rusqlite::Error<TxError>) -> OutletError {
    match e {
        tokio_rusqlite::Error::Error(TxError::Rejected(err)) => err,
        tokio_rusqlite::Error::Error(TxError::Sqlite(err)) => OutletError::Storage {
            source: Box::new(err),
        },
        other => OutletError::Storage {
            source: other.to_string().into(),
        },
    }
}

/// Handle to the Outlet database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode.
    pub async fn open(path: &str) -> Result<Self, OutletError> {
        Self::open_with(path, true).await
    }

    /// Open with an explicit journal mode choice.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, OutletError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| OutletError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .await
        .map_err(|e| OutletError::Storage {
            source: Box::new(e),
        })?;

        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// A private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, OutletError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| OutletError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), OutletError> {
        self.conn
            .call(move |conn| -> Result<(), TxError> {
                if wal_mode {
                    let mode: String = conn.pragma_update_and_check(
                        None,
                        "journal_mode",
                        "WAL",
                        |row| row.get(0),
                    )?;
                    debug!(journal_mode = %mode, "journal mode set");
                    conn.pragma_update(None, "synchronous", "NORMAL")?;
                }
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.busy_timeout(Duration::from_secs(5))?;
                migrations::run_migrations(conn)?;
                Ok(())
            })
            .await
            .map_err(map_tx_err)
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Fold the WAL back into the main file.
    pub async fn checkpoint(&self) -> Result<(), OutletError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

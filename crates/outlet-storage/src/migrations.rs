// SPDX-FileCopyrightText: 2026 Outlet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! SQL under `migrations/` is compiled in with `embed_migrations!` and applied
//! on every open. Refinery records progress in `refinery_schema_history`.

use outlet_core::OutletError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), OutletError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| OutletError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = migration.name(), "migration applied");
    }
    Ok(())
}

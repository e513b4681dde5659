//! Store schema migrations.
//!
//! Each migration runs in its own transaction together with the row that
//! records it, so a failed migration leaves the schema at the previous
//! version. A database stamped with a version newer than this build knows
//! about is refused rather than served from.

use tokio_rusqlite::{Connection, params};

use super::Error;

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "response stores",
    sql: include_str!("../../migrations/001_entries.sql"),
}];

fn latest() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

/// Bring the schema up to the latest version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` if a migration fails to apply or the
/// database was written by a newer schema.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;
        if current > latest() {
            return Err(Error::MigrationFailed(format!(
                "store schema version {current} is newer than this build supports ({})",
                latest()
            )));
        }

        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql).map_err(|e| {
                Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name))
            })?;
            tx.execute(
                "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::info!(version = migration.version, name = migration.name, "applied store migration");
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        run(&conn).await.unwrap();

        let has_entries: bool = conn
            .call(|conn| {
                conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='entries')",
                    [],
                    |row| row.get(0),
                )
            })
            .await
            .unwrap();

        assert!(has_entries);
    }

    #[tokio::test]
    async fn test_applied_migrations_are_named() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();

        let applied: Vec<(i64, String)> = conn
            .call(|conn| -> Result<Vec<(i64, String)>, tokio_rusqlite::rusqlite::Error> {
                let mut stmt = conn.prepare("SELECT version, name FROM _migrations ORDER BY version")?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?.collect();
                rows
            })
            .await
            .unwrap();

        assert_eq!(applied, vec![(1, "response stores".to_string())]);
    }

    #[tokio::test]
    async fn test_newer_schema_is_refused() {
        let conn = Connection::open_in_memory().await.unwrap();
        run(&conn).await.unwrap();
        conn.call(|conn| {
            conn.execute("INSERT INTO _migrations (version, name, applied_at) VALUES (99, 'future', 'now')", [])
        })
        .await
        .unwrap();

        assert!(matches!(run(&conn).await, Err(Error::MigrationFailed(_))));
    }
}

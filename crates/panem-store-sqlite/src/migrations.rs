//! Startup migrations for databases written by earlier schema generations.
//!
//! Two known evolutions are handled:
//!   1. `tributes` gained two nullable columns (`face_claim_url`,
//!      `prompt_channel_id`) — added via additive ALTER when missing.
//!   2. `prompts` used to allow many rows per tribute, keyed by a separate
//!      `prompt_id` column — collapsed to the 1:1 shape, keeping the newest
//!      row per tribute (highest rowid wins).
//!
//! Failures are logged, not fatal: every step is idempotent, so a partially
//! migrated database is safe to retry on the next startup.

use rusqlite::Connection;

/// Run all migrations, continuing past individual failures.
pub fn run_migrations(conn: &mut Connection) {
  if let Err(e) = add_tribute_columns(conn) {
    tracing::error!("tribute column migration failed: {e}");
  }
  if let Err(e) = collapse_prompts(conn) {
    tracing::error!("prompt 1:1 migration failed: {e}");
  }
}

/// Column names of `table`, via `PRAGMA table_info`.
fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<Vec<String>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
  let cols = stmt
    .query_map([], |row| row.get::<_, String>(1))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(cols)
}

fn add_tribute_columns(conn: &Connection) -> rusqlite::Result<()> {
  let cols = table_columns(conn, "tributes")?;

  if !cols.iter().any(|c| c == "face_claim_url") {
    tracing::info!("adding face_claim_url column to tributes");
    conn.execute("ALTER TABLE tributes ADD COLUMN face_claim_url TEXT", [])?;
  }
  if !cols.iter().any(|c| c == "prompt_channel_id") {
    tracing::info!("adding prompt_channel_id column to tributes");
    conn.execute("ALTER TABLE tributes ADD COLUMN prompt_channel_id INTEGER", [])?;
  }
  Ok(())
}

fn collapse_prompts(conn: &mut Connection) -> rusqlite::Result<()> {
  let cols = table_columns(conn, "prompts")?;
  if !cols.iter().any(|c| c == "prompt_id") {
    return Ok(());
  }

  tracing::info!("collapsing prompts table to one row per tribute");
  let tx = conn.transaction()?;
  // Old rows may hold NULL channel/timestamp; the new columns do not.
  tx.execute_batch(
    "ALTER TABLE prompts RENAME TO prompts_old;
     CREATE TABLE prompts (
         tribute_id TEXT PRIMARY KEY
                    REFERENCES tributes(tribute_id) ON DELETE CASCADE,
         message    TEXT NOT NULL,
         channel_id INTEGER NOT NULL,
         created_at INTEGER NOT NULL
     );
     INSERT INTO prompts (tribute_id, message, channel_id, created_at)
     SELECT tribute_id,
            message,
            COALESCE(channel_id, 0),
            COALESCE(created_at, 0)
     FROM prompts_old po
     WHERE po.rowid = (
         SELECT MAX(rowid) FROM prompts_old WHERE tribute_id = po.tribute_id
     );
     DROP TABLE prompts_old;",
  )?;
  tx.commit()?;
  tracing::info!("prompts table migrated to 1:1");
  Ok(())
}

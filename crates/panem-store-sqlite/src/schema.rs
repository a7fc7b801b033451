//! SQL schema for the Panem SQLite store.
//!
//! Executed on every open; idempotent thanks to `CREATE ... IF NOT EXISTS`.
//! Databases written by earlier schema generations are brought forward by
//! [`crate::migrations`] immediately afterwards.

/// Full schema DDL.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS tributes (
    tribute_id        TEXT PRIMARY KEY,   -- canonical uppercase, e.g. 'D1F'
    tribute_name      TEXT NOT NULL,
    user_id           INTEGER NOT NULL,
    user_mention      TEXT NOT NULL,
    guild_id          INTEGER,
    created_at        INTEGER NOT NULL,   -- epoch seconds
    face_claim_url    TEXT,
    prompt_channel_id INTEGER
);

CREATE TABLE IF NOT EXISTS inventories (
    tribute_id        TEXT PRIMARY KEY
                      REFERENCES tributes(tribute_id) ON DELETE CASCADE,
    capacity          INTEGER NOT NULL DEFAULT 10,
    equipped_capacity INTEGER NOT NULL DEFAULT 5,
    created_at        INTEGER NOT NULL,
    updated_at        INTEGER NOT NULL
);

-- Both sections live here; slot numbers are dense 1..N per (tribute, section).
CREATE TABLE IF NOT EXISTS inventory_items (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    tribute_id TEXT NOT NULL REFERENCES tributes(tribute_id) ON DELETE CASCADE,
    section    TEXT NOT NULL DEFAULT 'items',   -- 'items' | 'equipped'
    slot       INTEGER NOT NULL,
    item_name  TEXT NOT NULL,
    UNIQUE (tribute_id, section, slot)
);

-- One prompt per tribute; the primary key is the uniqueness constraint.
CREATE TABLE IF NOT EXISTS prompts (
    tribute_id TEXT PRIMARY KEY
               REFERENCES tributes(tribute_id) ON DELETE CASCADE,
    message    TEXT NOT NULL,
    channel_id INTEGER NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS files (
    file_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    tribute_id TEXT NOT NULL REFERENCES tributes(tribute_id) ON DELETE CASCADE,
    file_type  TEXT NOT NULL,
    file_path  TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS tributes_user_idx        ON tributes(user_id);
CREATE INDEX IF NOT EXISTS inventory_items_tribute_idx
    ON inventory_items(tribute_id);
CREATE INDEX IF NOT EXISTS files_tribute_idx        ON files(tribute_id);

PRAGMA user_version = 1;
";

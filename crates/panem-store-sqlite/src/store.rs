//! [`SqliteStore`] — the SQLite implementation of [`TributeStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, Transaction, params};

use panem_core::{
  Error as CoreError,
  file::FileRecord,
  inventory::{Inventory, InventorySnapshot, ItemMatch, Section},
  prompt::{Prompt, PromptPatch},
  store::TributeStore,
  tribute::{NewTribute, Tribute, TributeId, TributePatch, TributeProfile},
};

use crate::{
  Error, Result,
  encode::{
    RawFile, RawInventory, RawItem, RawMatch, RawPrompt, RawTribute, encode_ts,
  },
  migrations,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Panem tribute store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All access
/// funnels through one dedicated connection thread, so operations are
/// serialised at the store boundary.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation, and
  /// bring forward any earlier schema generation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        migrations::run_migrations(conn);
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a transaction on the connection thread. Commits when
  /// `f` returns `Ok`; dropping the transaction on `Err` rolls it back, so
  /// a failed operation is fully not-applied.
  async fn with_tx<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
  {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        match f(&tx) {
          Ok(value) => {
            tx.commit()?;
            Ok(Ok(value))
          }
          Err(e) => Ok(Err(e)),
        }
      })
      .await?
  }
}

// ─── Constraint mapping ──────────────────────────────────────────────────────

/// Translate a constraint failure from an insert into its typed domain
/// error; anything else surfaces as a rolled-back transaction.
fn constraint_err(
  e: rusqlite::Error,
  unique: CoreError,
  missing_tribute: CoreError,
) -> Error {
  use rusqlite::ffi::{
    SQLITE_CONSTRAINT_FOREIGNKEY, SQLITE_CONSTRAINT_PRIMARYKEY,
    SQLITE_CONSTRAINT_UNIQUE,
  };

  if let rusqlite::Error::SqliteFailure(f, _) = &e {
    if f.extended_code == SQLITE_CONSTRAINT_UNIQUE
      || f.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    {
      return Error::Core(unique);
    }
    if f.extended_code == SQLITE_CONSTRAINT_FOREIGNKEY {
      return Error::Core(missing_tribute);
    }
  }
  Error::Transaction(e)
}

// ─── Row queries ─────────────────────────────────────────────────────────────
// Shared between plain reads and transactional mutations; `Transaction`
// derefs to `Connection`.

fn tribute_row(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawTribute>> {
  conn
    .query_row(
      "SELECT tribute_id, tribute_name, user_id, user_mention, guild_id,
              created_at, face_claim_url, prompt_channel_id
       FROM tributes WHERE tribute_id = ?1",
      params![id],
      |row| {
        Ok(RawTribute {
          tribute_id:        row.get(0)?,
          name:              row.get(1)?,
          user_id:           row.get(2)?,
          mention:           row.get(3)?,
          guild_id:          row.get(4)?,
          created_at:        row.get(5)?,
          face_claim_url:    row.get(6)?,
          prompt_channel_id: row.get(7)?,
        })
      },
    )
    .optional()
}

fn inventory_row(
  conn: &Connection,
  id: &str,
) -> rusqlite::Result<Option<RawInventory>> {
  conn
    .query_row(
      "SELECT tribute_id, capacity, equipped_capacity, created_at, updated_at
       FROM inventories WHERE tribute_id = ?1",
      params![id],
      |row| {
        Ok(RawInventory {
          tribute_id:        row.get(0)?,
          capacity:          row.get(1)?,
          equipped_capacity: row.get(2)?,
          created_at:        row.get(3)?,
          updated_at:        row.get(4)?,
        })
      },
    )
    .optional()
}

fn item_rows(conn: &Connection, id: &str) -> rusqlite::Result<Vec<RawItem>> {
  let mut stmt = conn.prepare(
    "SELECT section, slot, item_name FROM inventory_items
     WHERE tribute_id = ?1 ORDER BY section, slot",
  )?;
  let rows = stmt
    .query_map(params![id], |row| {
      Ok(RawItem { section: row.get(0)?, slot: row.get(1)?, name: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn prompt_row(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawPrompt>> {
  conn
    .query_row(
      "SELECT tribute_id, message, channel_id, created_at
       FROM prompts WHERE tribute_id = ?1",
      params![id],
      |row| {
        Ok(RawPrompt {
          tribute_id: row.get(0)?,
          message:    row.get(1)?,
          channel_id: row.get(2)?,
          created_at: row.get(3)?,
        })
      },
    )
    .optional()
}

fn file_rows(
  conn: &Connection,
  id: &str,
  kind: Option<&str>,
) -> rusqlite::Result<Vec<RawFile>> {
  let map = |row: &rusqlite::Row<'_>| {
    Ok(RawFile {
      file_id:    row.get(0)?,
      tribute_id: row.get(1)?,
      kind:       row.get(2)?,
      path:       row.get(3)?,
      created_at: row.get(4)?,
    })
  };

  let rows = if let Some(kind) = kind {
    let mut stmt = conn.prepare(
      "SELECT file_id, tribute_id, file_type, file_path, created_at
       FROM files WHERE tribute_id = ?1 AND file_type = ?2 ORDER BY file_id",
    )?;
    stmt
      .query_map(params![id, kind], map)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  } else {
    let mut stmt = conn.prepare(
      "SELECT file_id, tribute_id, file_type, file_path, created_at
       FROM files WHERE tribute_id = ?1 ORDER BY file_id",
    )?;
    stmt
      .query_map(params![id], map)?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };
  Ok(rows)
}

// ─── Section helpers ─────────────────────────────────────────────────────────

fn section_count(
  conn: &Connection,
  id: &str,
  section: Section,
) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COUNT(*) FROM inventory_items WHERE tribute_id = ?1 AND section = ?2",
    params![id, section.as_str()],
    |row| row.get(0),
  )
}

/// Next free slot: `max(slot) + 1`, which tolerates a transient gap.
fn next_slot(conn: &Connection, id: &str, section: Section) -> rusqlite::Result<i64> {
  conn.query_row(
    "SELECT COALESCE(MAX(slot), 0) + 1 FROM inventory_items
     WHERE tribute_id = ?1 AND section = ?2",
    params![id, section.as_str()],
    |row| row.get(0),
  )
}

/// Renumber a section's rows to a dense `1..=N` sequence ordered by their
/// current slot. Renumbering ascending never collides with the UNIQUE
/// constraint: a row's new slot is never above its current one.
fn rekey_section(conn: &Connection, id: &str, section: Section) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "SELECT id FROM inventory_items
     WHERE tribute_id = ?1 AND section = ?2 ORDER BY slot",
  )?;
  let row_ids = stmt
    .query_map(params![id, section.as_str()], |row| row.get::<_, i64>(0))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  drop(stmt);

  for (idx, row_id) in row_ids.iter().enumerate() {
    conn.execute(
      "UPDATE inventory_items SET slot = ?1 WHERE id = ?2",
      params![idx as i64 + 1, row_id],
    )?;
  }
  Ok(())
}

fn touch_inventory(conn: &Connection, id: &str) -> rusqlite::Result<()> {
  conn.execute(
    "UPDATE inventories SET updated_at = ?1 WHERE tribute_id = ?2",
    params![encode_ts(Utc::now()), id],
  )?;
  Ok(())
}

// ─── TributeStore impl ───────────────────────────────────────────────────────

impl TributeStore for SqliteStore {
  type Error = Error;

  // ── Tributes ──────────────────────────────────────────────────────────────

  async fn create_tribute(&self, input: NewTribute) -> Result<Tribute> {
    let tribute = Tribute {
      tribute_id:        input.tribute_id,
      name:              input.name,
      user_id:           input.user_id,
      mention:           input.mention,
      guild_id:          input.guild_id,
      created_at:        input.created_at.unwrap_or_else(Utc::now),
      face_claim_url:    input.face_claim_url,
      prompt_channel_id: input.prompt_channel_id,
    };

    let row = (
      tribute.tribute_id.as_str().to_owned(),
      tribute.name.clone(),
      tribute.user_id,
      tribute.mention.clone(),
      tribute.guild_id,
      encode_ts(tribute.created_at),
      tribute.face_claim_url.clone(),
      tribute.prompt_channel_id,
    );
    let tid = tribute.tribute_id.clone();

    self
      .with_tx(move |tx| {
        tx.execute(
          "INSERT INTO tributes (
             tribute_id, tribute_name, user_id, user_mention, guild_id,
             created_at, face_claim_url, prompt_channel_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![row.0, row.1, row.2, row.3, row.4, row.5, row.6, row.7],
        )
        .map_err(|e| {
          constraint_err(
            e,
            CoreError::TributeExists(tid.clone()),
            CoreError::TributeNotFound(tid.clone()),
          )
        })?;
        Ok(())
      })
      .await?;

    Ok(tribute)
  }

  async fn get_tribute(&self, id: &TributeId) -> Result<Option<Tribute>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(tribute_row(conn, &id_str)?))
      .await?;

    raw.map(RawTribute::into_tribute).transpose()
  }

  async fn list_tributes(&self, guild_id: Option<i64>) -> Result<Vec<Tribute>> {
    let raws: Vec<RawTribute> = self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(RawTribute {
            tribute_id:        row.get(0)?,
            name:              row.get(1)?,
            user_id:           row.get(2)?,
            mention:           row.get(3)?,
            guild_id:          row.get(4)?,
            created_at:        row.get(5)?,
            face_claim_url:    row.get(6)?,
            prompt_channel_id: row.get(7)?,
          })
        };

        let rows = if let Some(g) = guild_id {
          let mut stmt = conn.prepare(
            "SELECT tribute_id, tribute_name, user_id, user_mention, guild_id,
                    created_at, face_claim_url, prompt_channel_id
             FROM tributes WHERE guild_id = ?1 ORDER BY tribute_id",
          )?;
          stmt
            .query_map(params![g], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT tribute_id, tribute_name, user_id, user_mention, guild_id,
                    created_at, face_claim_url, prompt_channel_id
             FROM tributes ORDER BY tribute_id",
          )?;
          stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTribute::into_tribute).collect()
  }

  async fn update_tribute(
    &self,
    id: &TributeId,
    patch: TributePatch,
  ) -> Result<Option<Tribute>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .with_tx(move |tx| {
        if let Some(name) = &patch.name {
          tx.execute(
            "UPDATE tributes SET tribute_name = ?1 WHERE tribute_id = ?2",
            params![name, id_str],
          )?;
        }
        if let Some(mention) = &patch.mention {
          tx.execute(
            "UPDATE tributes SET user_mention = ?1 WHERE tribute_id = ?2",
            params![mention, id_str],
          )?;
        }
        if let Some(guild_id) = patch.guild_id {
          tx.execute(
            "UPDATE tributes SET guild_id = ?1 WHERE tribute_id = ?2",
            params![guild_id, id_str],
          )?;
        }
        Ok(tribute_row(tx, &id_str)?)
      })
      .await?;

    raw.map(RawTribute::into_tribute).transpose()
  }

  async fn delete_tribute(&self, id: &TributeId) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    self
      .with_tx(move |tx| {
        // Dependents go with it via ON DELETE CASCADE.
        let n = tx.execute(
          "DELETE FROM tributes WHERE tribute_id = ?1",
          params![id_str],
        )?;
        Ok(n > 0)
      })
      .await
  }

  async fn get_tribute_full(&self, id: &TributeId) -> Result<Option<TributeProfile>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let Some(tribute) = tribute_row(conn, &id_str)? else {
          return Ok(None);
        };
        let inventory = inventory_row(conn, &id_str)?;
        let items = item_rows(conn, &id_str)?;
        let prompt = prompt_row(conn, &id_str)?;
        let files = file_rows(conn, &id_str, None)?;
        Ok(Some((tribute, inventory, items, prompt, files)))
      })
      .await?;

    let Some((tribute, inventory, items, prompt, files)) = raw else {
      return Ok(None);
    };

    Ok(Some(TributeProfile {
      tribute:   tribute.into_tribute()?,
      inventory: inventory.map(|inv| inv.into_snapshot(items)).transpose()?,
      prompt:    prompt.map(RawPrompt::into_prompt).transpose()?,
      files:     files
        .into_iter()
        .map(RawFile::into_file)
        .collect::<Result<_>>()?,
    }))
  }

  // ── Inventories ───────────────────────────────────────────────────────────

  async fn create_or_resize_inventory(
    &self,
    id: &TributeId,
    capacity: u32,
    equipped_capacity: u32,
  ) -> Result<Inventory> {
    let id_str = id.as_str().to_owned();
    let tid = id.clone();

    let raw = self
      .with_tx(move |tx| {
        let now = encode_ts(Utc::now());
        tx.execute(
          "INSERT INTO inventories (
             tribute_id, capacity, equipped_capacity, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?4)
           ON CONFLICT(tribute_id) DO UPDATE SET
             capacity          = excluded.capacity,
             equipped_capacity = excluded.equipped_capacity,
             updated_at        = excluded.updated_at",
          params![id_str, capacity, equipped_capacity, now],
        )
        .map_err(|e| {
          constraint_err(
            e,
            CoreError::TributeNotFound(tid.clone()),
            CoreError::TributeNotFound(tid.clone()),
          )
        })?;

        inventory_row(tx, &id_str)?
          .ok_or_else(|| Error::Core(CoreError::InventoryNotFound(tid.clone())))
      })
      .await?;

    raw.into_inventory()
  }

  async fn get_inventory(&self, id: &TributeId) -> Result<Option<Inventory>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(inventory_row(conn, &id_str)?))
      .await?;

    raw.map(RawInventory::into_inventory).transpose()
  }

  async fn snapshot_inventory(
    &self,
    id: &TributeId,
  ) -> Result<Option<InventorySnapshot>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        let Some(inventory) = inventory_row(conn, &id_str)? else {
          return Ok(None);
        };
        let items = item_rows(conn, &id_str)?;
        Ok(Some((inventory, items)))
      })
      .await?;

    raw
      .map(|(inventory, items)| inventory.into_snapshot(items))
      .transpose()
  }

  async fn add_inventory_item(&self, id: &TributeId, name: &str) -> Result<u32> {
    let id_str = id.as_str().to_owned();
    let tid = id.clone();
    let name = name.to_owned();

    self
      .with_tx(move |tx| {
        if inventory_row(tx, &id_str)?.is_none() {
          return Err(Error::Core(CoreError::InventoryNotFound(tid)));
        }

        // Carried capacity is advisory; no ceiling enforced here.
        let slot = next_slot(tx, &id_str, Section::Items)?;
        tx.execute(
          "INSERT INTO inventory_items (tribute_id, section, slot, item_name)
           VALUES (?1, 'items', ?2, ?3)",
          params![id_str, slot, name],
        )?;
        touch_inventory(tx, &id_str)?;
        Ok(slot as u32)
      })
      .await
  }

  async fn add_equipped_item(&self, id: &TributeId, name: &str) -> Result<u32> {
    let id_str = id.as_str().to_owned();
    let tid = id.clone();
    let name = name.to_owned();

    self
      .with_tx(move |tx| {
        let Some(inventory) = inventory_row(tx, &id_str)? else {
          return Err(Error::Core(CoreError::InventoryNotFound(tid)));
        };

        let count = section_count(tx, &id_str, Section::Equipped)?;
        if count >= inventory.equipped_capacity {
          return Err(Error::Core(CoreError::SectionFull {
            tribute_id: tid,
            section:    Section::Equipped,
            count:      count as u32,
            capacity:   inventory.equipped_capacity as u32,
          }));
        }

        let slot = next_slot(tx, &id_str, Section::Equipped)?;
        tx.execute(
          "INSERT INTO inventory_items (tribute_id, section, slot, item_name)
           VALUES (?1, 'equipped', ?2, ?3)",
          params![id_str, slot, name],
        )?;
        touch_inventory(tx, &id_str)?;
        Ok(slot as u32)
      })
      .await
  }

  async fn remove_inventory_item(&self, id: &TributeId, slot: u32) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    self
      .with_tx(move |tx| {
        let n = tx.execute(
          "DELETE FROM inventory_items
           WHERE tribute_id = ?1 AND section = 'items' AND slot = ?2",
          params![id_str, slot],
        )?;
        if n == 0 {
          return Ok(false);
        }
        rekey_section(tx, &id_str, Section::Items)?;
        touch_inventory(tx, &id_str)?;
        Ok(true)
      })
      .await
  }

  async fn equip_item(&self, id: &TributeId, slot: u32) -> Result<InventorySnapshot> {
    let id_str = id.as_str().to_owned();
    let tid = id.clone();

    let (inventory, items) = self
      .with_tx(move |tx| {
        let Some(inventory) = inventory_row(tx, &id_str)? else {
          return Err(Error::Core(CoreError::InventoryNotFound(tid)));
        };

        let name: Option<String> = tx
          .query_row(
            "SELECT item_name FROM inventory_items
             WHERE tribute_id = ?1 AND section = 'items' AND slot = ?2",
            params![id_str, slot],
            |row| row.get(0),
          )
          .optional()?;
        let Some(name) = name else {
          return Err(Error::Core(CoreError::SlotNotFound {
            tribute_id: tid,
            section: Section::Items,
            slot,
          }));
        };

        let count = section_count(tx, &id_str, Section::Equipped)?;
        if count >= inventory.equipped_capacity {
          return Err(Error::Core(CoreError::SectionFull {
            tribute_id: tid,
            section:    Section::Equipped,
            count:      count as u32,
            capacity:   inventory.equipped_capacity as u32,
          }));
        }

        tx.execute(
          "DELETE FROM inventory_items
           WHERE tribute_id = ?1 AND section = 'items' AND slot = ?2",
          params![id_str, slot],
        )?;
        rekey_section(tx, &id_str, Section::Items)?;

        let next = next_slot(tx, &id_str, Section::Equipped)?;
        tx.execute(
          "INSERT INTO inventory_items (tribute_id, section, slot, item_name)
           VALUES (?1, 'equipped', ?2, ?3)",
          params![id_str, next, name],
        )?;
        rekey_section(tx, &id_str, Section::Equipped)?;
        touch_inventory(tx, &id_str)?;

        let items = item_rows(tx, &id_str)?;
        Ok((inventory, items))
      })
      .await?;

    inventory.into_snapshot(items)
  }

  async fn unequip_item(&self, id: &TributeId, slot: u32) -> Result<InventorySnapshot> {
    let id_str = id.as_str().to_owned();
    let tid = id.clone();

    let (inventory, items) = self
      .with_tx(move |tx| {
        let Some(inventory) = inventory_row(tx, &id_str)? else {
          return Err(Error::Core(CoreError::InventoryNotFound(tid)));
        };

        let name: Option<String> = tx
          .query_row(
            "SELECT item_name FROM inventory_items
             WHERE tribute_id = ?1 AND section = 'equipped' AND slot = ?2",
            params![id_str, slot],
            |row| row.get(0),
          )
          .optional()?;
        let Some(name) = name else {
          return Err(Error::Core(CoreError::SlotNotFound {
            tribute_id: tid,
            section: Section::Equipped,
            slot,
          }));
        };

        let count = section_count(tx, &id_str, Section::Items)?;
        if count >= inventory.capacity {
          return Err(Error::Core(CoreError::SectionFull {
            tribute_id: tid,
            section:    Section::Items,
            count:      count as u32,
            capacity:   inventory.capacity as u32,
          }));
        }

        tx.execute(
          "DELETE FROM inventory_items
           WHERE tribute_id = ?1 AND section = 'equipped' AND slot = ?2",
          params![id_str, slot],
        )?;
        rekey_section(tx, &id_str, Section::Equipped)?;

        let next = next_slot(tx, &id_str, Section::Items)?;
        tx.execute(
          "INSERT INTO inventory_items (tribute_id, section, slot, item_name)
           VALUES (?1, 'items', ?2, ?3)",
          params![id_str, next, name],
        )?;
        rekey_section(tx, &id_str, Section::Items)?;
        touch_inventory(tx, &id_str)?;

        let items = item_rows(tx, &id_str)?;
        Ok((inventory, items))
      })
      .await?;

    inventory.into_snapshot(items)
  }

  async fn clear_inventory(&self, id: &TributeId) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    self
      .with_tx(move |tx| {
        if inventory_row(tx, &id_str)?.is_none() {
          return Ok(false);
        }
        tx.execute(
          "DELETE FROM inventory_items WHERE tribute_id = ?1",
          params![id_str],
        )?;
        touch_inventory(tx, &id_str)?;
        Ok(true)
      })
      .await
  }

  async fn search_inventory_items(&self, needle: &str) -> Result<Vec<ItemMatch>> {
    let pattern = format!("%{needle}%");

    let raws: Vec<RawMatch> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.tribute_id, t.tribute_name, t.user_mention,
                  ii.section, ii.slot, ii.item_name
           FROM inventory_items ii
           JOIN tributes t ON t.tribute_id = ii.tribute_id
           WHERE ii.item_name LIKE ?1
           ORDER BY t.tribute_id, ii.section, ii.slot",
        )?;
        let rows = stmt
          .query_map(params![pattern], |row| {
            Ok(RawMatch {
              tribute_id:   row.get(0)?,
              tribute_name: row.get(1)?,
              mention:      row.get(2)?,
              section:      row.get(3)?,
              slot:         row.get(4)?,
              name:         row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMatch::into_match).collect()
  }

  // ── Prompts ───────────────────────────────────────────────────────────────

  async fn create_prompt(
    &self,
    id: &TributeId,
    message: &str,
    channel_id: i64,
  ) -> Result<Prompt> {
    let prompt = Prompt {
      tribute_id: id.clone(),
      message:    message.to_owned(),
      channel_id,
      created_at: Utc::now(),
    };

    let id_str = id.as_str().to_owned();
    let tid = id.clone();
    let message = prompt.message.clone();
    let created_at = encode_ts(prompt.created_at);

    self
      .with_tx(move |tx| {
        tx.execute(
          "INSERT INTO prompts (tribute_id, message, channel_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, message, channel_id, created_at],
        )
        .map_err(|e| {
          constraint_err(
            e,
            CoreError::PromptExists(tid.clone()),
            CoreError::TributeNotFound(tid.clone()),
          )
        })?;
        Ok(())
      })
      .await?;

    Ok(prompt)
  }

  async fn get_prompt(&self, id: &TributeId) -> Result<Option<Prompt>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .conn
      .call(move |conn| Ok(prompt_row(conn, &id_str)?))
      .await?;

    raw.map(RawPrompt::into_prompt).transpose()
  }

  async fn list_prompts(&self, guild_id: Option<i64>) -> Result<Vec<Prompt>> {
    let raws: Vec<RawPrompt> = self
      .conn
      .call(move |conn| {
        let map = |row: &rusqlite::Row<'_>| {
          Ok(RawPrompt {
            tribute_id: row.get(0)?,
            message:    row.get(1)?,
            channel_id: row.get(2)?,
            created_at: row.get(3)?,
          })
        };

        let rows = if let Some(g) = guild_id {
          let mut stmt = conn.prepare(
            "SELECT p.tribute_id, p.message, p.channel_id, p.created_at
             FROM prompts p
             JOIN tributes t ON t.tribute_id = p.tribute_id
             WHERE t.guild_id = ?1
             ORDER BY p.tribute_id",
          )?;
          stmt
            .query_map(params![g], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT tribute_id, message, channel_id, created_at
             FROM prompts ORDER BY tribute_id",
          )?;
          stmt
            .query_map([], map)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPrompt::into_prompt).collect()
  }

  async fn update_prompt(
    &self,
    id: &TributeId,
    patch: PromptPatch,
  ) -> Result<Option<Prompt>> {
    let id_str = id.as_str().to_owned();

    let raw = self
      .with_tx(move |tx| {
        if let Some(message) = &patch.message {
          tx.execute(
            "UPDATE prompts SET message = ?1 WHERE tribute_id = ?2",
            params![message, id_str],
          )?;
        }
        if let Some(channel_id) = patch.channel_id {
          tx.execute(
            "UPDATE prompts SET channel_id = ?1 WHERE tribute_id = ?2",
            params![channel_id, id_str],
          )?;
        }
        Ok(prompt_row(tx, &id_str)?)
      })
      .await?;

    raw.map(RawPrompt::into_prompt).transpose()
  }

  async fn delete_prompt(&self, id: &TributeId) -> Result<bool> {
    let id_str = id.as_str().to_owned();

    self
      .with_tx(move |tx| {
        let n = tx.execute(
          "DELETE FROM prompts WHERE tribute_id = ?1",
          params![id_str],
        )?;
        Ok(n > 0)
      })
      .await
  }

  async fn delete_all_prompts(&self) -> Result<usize> {
    self
      .with_tx(move |tx| {
        let n = tx.execute("DELETE FROM prompts", [])?;
        Ok(n)
      })
      .await
  }

  // ── Files ─────────────────────────────────────────────────────────────────

  async fn add_file(
    &self,
    id: &TributeId,
    kind: &str,
    path: &str,
  ) -> Result<FileRecord> {
    let record = FileRecord {
      file_id:    0,
      tribute_id: id.clone(),
      kind:       kind.to_owned(),
      path:       path.to_owned(),
      created_at: Utc::now(),
    };

    let id_str = id.as_str().to_owned();
    let tid = id.clone();
    let kind = record.kind.clone();
    let path = record.path.clone();
    let created_at_ts = encode_ts(record.created_at);

    let file_id = self
      .with_tx(move |tx| {
        tx.execute(
          "INSERT INTO files (tribute_id, file_type, file_path, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![id_str, kind, path, created_at_ts],
        )
        .map_err(|e| {
          constraint_err(
            e,
            CoreError::TributeNotFound(tid.clone()),
            CoreError::TributeNotFound(tid.clone()),
          )
        })?;
        Ok(tx.last_insert_rowid())
      })
      .await?;

    Ok(FileRecord { file_id, ..record })
  }

  async fn get_files(
    &self,
    id: &TributeId,
    kind: Option<&str>,
  ) -> Result<Vec<FileRecord>> {
    let id_str = id.as_str().to_owned();
    let kind = kind.map(str::to_owned);

    let raws = self
      .conn
      .call(move |conn| Ok(file_rows(conn, &id_str, kind.as_deref())?))
      .await?;

    raws.into_iter().map(RawFile::into_file).collect()
  }

  async fn delete_file(&self, file_id: i64) -> Result<bool> {
    self
      .with_tx(move |tx| {
        let n = tx.execute("DELETE FROM files WHERE file_id = ?1", params![file_id])?;
        Ok(n > 0)
      })
      .await
  }
}

//! One-time backfill from the legacy JSON documents into the SQLite store.
//!
//! The migration is best-effort and resumable: every per-record failure is
//! recorded in the report rather than aborting the batch, and re-running
//! against an already-migrated store is safe — duplicate-tribute and
//! duplicate-prompt conflicts are treated as "already done", and a tribute
//! whose relational inventory already exists is skipped wholesale so item
//! counts stay stable.
//!
//! Tributes are created with placeholder identity (name = id, owner user 0,
//! mention `<@unknown>`); these are expected to be corrected manually after
//! the migration.

use std::collections::BTreeSet;
use std::fmt;

use panem_core::{store::TributeStore as _, tribute::{NewTribute, TributeId}};
use panem_store_json::JsonStore;
use panem_store_sqlite::SqliteStore;


/// Placeholder owner recorded for migrated tributes.
pub const PLACEHOLDER_USER_ID: i64 = 0;
pub const PLACEHOLDER_MENTION: &str = "<@unknown>";

// ─── Report ──────────────────────────────────────────────────────────────────

/// Counts, warnings, and errors accumulated over one migration run.
#[derive(Debug, Default)]
pub struct MigrationReport {
  pub tributes_created:     usize,
  pub inventories_migrated: usize,
  pub items_migrated:       usize,
  pub prompts_migrated:     usize,
  pub warnings:             Vec<String>,
  pub errors:               Vec<String>,
}

impl MigrationReport {
  fn warn(&mut self, msg: String) {
    tracing::warn!("{msg}");
    self.warnings.push(msg);
  }

  fn error(&mut self, msg: String) {
    tracing::error!("{msg}");
    self.errors.push(msg);
  }
}

impl fmt::Display for MigrationReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    writeln!(f, "{}", "=".repeat(70))?;
    writeln!(f, "MIGRATION REPORT")?;
    writeln!(f, "{}", "=".repeat(70))?;
    writeln!(f, "  Tributes created:     {}", self.tributes_created)?;
    writeln!(f, "  Inventories migrated: {}", self.inventories_migrated)?;
    writeln!(f, "  Inventory items:      {}", self.items_migrated)?;
    writeln!(f, "  Prompts migrated:     {}", self.prompts_migrated)?;

    if !self.warnings.is_empty() {
      writeln!(f, "\nWarnings ({}):", self.warnings.len())?;
      for w in &self.warnings {
        writeln!(f, "  ! {w}")?;
      }
    }
    if self.errors.is_empty() {
      writeln!(f, "\nMigration completed with no errors")?;
    } else {
      writeln!(f, "\nErrors ({}):", self.errors.len())?;
      for e in &self.errors {
        writeln!(f, "  x {e}")?;
      }
    }
    write!(f, "{}", "=".repeat(70))
  }
}

// ─── Prompt mapping ──────────────────────────────────────────────────────────

/// Map a legacy prompt key onto a candidate tribute id: prefix match on the
/// first three characters, falling back to an exact match.
fn map_prompt_to_tribute(
  prompt_id: &TributeId,
  candidates: &BTreeSet<TributeId>,
) -> Option<TributeId> {
  candidates
    .iter()
    .find(|tid| {
      let prefix = tid.as_str().get(..3).unwrap_or(tid.as_str());
      prompt_id.as_str().starts_with(prefix)
    })
    .or_else(|| candidates.get(prompt_id))
    .cloned()
}

// ─── Migration ───────────────────────────────────────────────────────────────

/// Walk both legacy documents and populate the relational store. With
/// `dry_run` set, nothing is written; the report shows what a real run
/// would do.
pub async fn migrate(
  store: &SqliteStore,
  legacy: &JsonStore,
  dry_run: bool,
) -> MigrationReport {
  let mut report = MigrationReport::default();

  tracing::info!("loading legacy documents from {:?}", legacy.data_dir());
  let inventories = match legacy.load_inventories() {
    Ok(doc) => doc,
    Err(e) => {
      report.error(format!("failed to read legacy inventories: {e}"));
      Default::default()
    }
  };
  let prompts = match legacy.load_prompts() {
    Ok(doc) => doc,
    Err(e) => {
      report.error(format!("failed to read legacy prompts: {e}"));
      Default::default()
    }
  };
  tracing::info!(
    inventories = inventories.len(),
    prompts = prompts.len(),
    "legacy documents loaded"
  );

  // Union the (already case-folded) keys into the candidate tribute set.
  let candidates: BTreeSet<TributeId> =
    inventories.keys().chain(prompts.keys()).cloned().collect();

  if candidates.is_empty() {
    tracing::warn!("no tributes found in legacy documents - nothing to migrate");
    return report;
  }
  tracing::info!("found {} unique tributes to migrate", candidates.len());

  // ── Tributes ──────────────────────────────────────────────────────────
  for id in &candidates {
    if dry_run {
      report.tributes_created += 1;
      continue;
    }
    let input =
      NewTribute::new(id.clone(), id.as_str(), PLACEHOLDER_USER_ID, PLACEHOLDER_MENTION);
    match store.create_tribute(input).await {
      Ok(_) => {
        report.tributes_created += 1;
        tracing::info!(%id, "tribute created");
      }
      Err(e) if e.is_tribute_conflict() => {
        tracing::debug!(%id, "tribute already present, skipping");
      }
      Err(e) => report.error(format!("failed to create tribute {id}: {e}")),
    }
  }

  // ── Inventories ───────────────────────────────────────────────────────
  for (id, inv) in &inventories {
    if dry_run {
      report.inventories_migrated += 1;
      report.items_migrated += inv.items.len() + inv.equipped.len();
      continue;
    }

    match store.get_inventory(id).await {
      Ok(Some(_)) => {
        report.warn(format!("inventory for {id} already migrated, skipping"));
        continue;
      }
      Ok(None) => {}
      Err(e) => {
        report.error(format!("failed to check inventory for {id}: {e}"));
        continue;
      }
    }

    if let Err(e) = store
      .create_or_resize_inventory(id, inv.capacity, inv.equipped_capacity)
      .await
    {
      report.error(format!("failed to migrate inventory for {id}: {e}"));
      continue;
    }
    report.inventories_migrated += 1;
    tracing::info!(%id, capacity = inv.capacity, "inventory migrated");

    // Replay in slot order so relative ordering survives renumbering.
    for name in inv.items.values() {
      match store.add_inventory_item(id, name).await {
        Ok(_) => report.items_migrated += 1,
        Err(e) => report.error(format!("failed to add item to {id}: {name:?} - {e}")),
      }
    }
    for name in inv.equipped.values() {
      match store.add_equipped_item(id, name).await {
        Ok(_) => report.items_migrated += 1,
        Err(e) => {
          report.error(format!("failed to add equipped item to {id}: {name:?} - {e}"))
        }
      }
    }
  }

  // ── Prompts ───────────────────────────────────────────────────────────
  for (prompt_id, prompt) in &prompts {
    let Some(target) = map_prompt_to_tribute(prompt_id, &candidates) else {
      report.warn(format!("could not map prompt {prompt_id} to a tribute"));
      continue;
    };

    if dry_run {
      report.prompts_migrated += 1;
      continue;
    }

    match store.create_prompt(&target, &prompt.message, prompt.channel).await {
      Ok(_) => {
        report.prompts_migrated += 1;
        tracing::info!(tribute = %target, "prompt migrated");
      }
      Err(e) if e.is_prompt_conflict() => {
        tracing::debug!(tribute = %target, "prompt already present, skipping");
      }
      Err(e) => report.error(format!("failed to migrate prompt {prompt_id}: {e}")),
    }
  }

  report
}

//! Storage facade for the Panem tribute store.
//!
//! Presents one interface that hides whether a record currently lives in the
//! relational store or only in the legacy JSON documents. Reads try the
//! relational store first and, while fallback mode is on, consult the legacy
//! documents for anything it lacks. Writes go to the relational store only —
//! the legacy documents are frozen at their pre-migration state and serve
//! purely as a read-only safety net.
//!
//! Once an operator has verified the migration, [`Storage::disable_fallback`]
//! turns the legacy reads off for the rest of the process lifetime.

use std::{
  collections::BTreeMap,
  sync::atomic::{AtomicBool, Ordering},
};

use panem_core::{
  file::FileRecord,
  inventory::{Inventory, InventorySnapshot, ItemMatch},
  prompt::{Prompt, PromptPatch, PromptView},
  store::TributeStore,
  tribute::{NewTribute, Tribute, TributeId, TributePatch, TributeProfile},
};
use panem_store_json::JsonStore;
use serde::Serialize;


// ─── Legacy analysis ─────────────────────────────────────────────────────────

/// Summary of what the legacy documents still hold, used to decide whether
/// the one-time migration tool needs to run.
#[derive(Debug, Clone, Serialize)]
pub struct LegacyAnalysis {
  /// Union of tribute ids across both documents, sorted.
  pub tribute_ids:           Vec<TributeId>,
  pub total_inventories:     usize,
  pub total_prompts:         usize,
  pub total_inventory_items: usize,
  pub needs_migration:       bool,
}

// ─── Facade ──────────────────────────────────────────────────────────────────

/// The single storage entry point consumed by the rest of the application.
pub struct Storage<S> {
  store:    S,
  legacy:   JsonStore,
  /// Whether reads may fall back to the legacy documents. Process-lifetime;
  /// the facade holds no other mutable state.
  fallback: AtomicBool,
}

impl<S: TributeStore> Storage<S> {
  /// Build a facade over `store` with fallback reads enabled.
  pub fn new(store: S, legacy: JsonStore) -> Self {
    Self { store, legacy, fallback: AtomicBool::new(true) }
  }

  /// Direct access to the primary store, for callers that need it.
  pub fn store(&self) -> &S { &self.store }

  pub fn fallback_enabled(&self) -> bool { self.fallback.load(Ordering::Relaxed) }

  pub fn enable_fallback(&self) {
    self.fallback.store(true, Ordering::Relaxed);
    tracing::info!("legacy fallback reads enabled");
  }

  /// Stop consulting the legacy documents. Flip this once the migration has
  /// been verified and no legacy-only records remain.
  pub fn disable_fallback(&self) {
    self.fallback.store(false, Ordering::Relaxed);
    tracing::info!("legacy fallback reads disabled");
  }

  // ── Dual reads ────────────────────────────────────────────────────────

  /// Inventory snapshot: relational store first, legacy documents second.
  ///
  /// A corrupt or unreadable legacy file is treated as "no data" — the
  /// fallback is best-effort and must never block a live operation.
  pub async fn get_inventory(
    &self,
    id: &TributeId,
  ) -> Result<Option<InventorySnapshot>, S::Error> {
    if let Some(snapshot) = self.store.snapshot_inventory(id).await? {
      return Ok(Some(snapshot));
    }
    if !self.fallback_enabled() {
      return Ok(None);
    }
    match self.legacy.get_inventory(id) {
      Ok(Some(snapshot)) => {
        tracing::info!(%id, "inventory read fell back to legacy documents");
        Ok(Some(snapshot))
      }
      Ok(None) => Ok(None),
      Err(e) => {
        tracing::warn!(%id, "legacy inventory read failed: {e}");
        Ok(None)
      }
    }
  }

  /// Prompt: relational store first, legacy documents second, normalised to
  /// [`PromptView`] either way.
  pub async fn get_prompt(
    &self,
    id: &TributeId,
  ) -> Result<Option<PromptView>, S::Error> {
    if let Some(prompt) = self.store.get_prompt(id).await? {
      return Ok(Some(prompt.into()));
    }
    if !self.fallback_enabled() {
      return Ok(None);
    }
    match self.legacy.get_prompt(id) {
      Ok(Some(view)) => {
        tracing::info!(%id, "prompt read fell back to legacy documents");
        Ok(Some(view))
      }
      Ok(None) => Ok(None),
      Err(e) => {
        tracing::warn!(%id, "legacy prompt read failed: {e}");
        Ok(None)
      }
    }
  }

  /// All prompts, keyed by tribute id. The relational store wins on
  /// conflict; legacy entries fill in only what it lacks.
  pub async fn get_all_prompts(
    &self,
    guild_id: Option<i64>,
  ) -> Result<BTreeMap<TributeId, PromptView>, S::Error> {
    let mut prompts: BTreeMap<TributeId, PromptView> = self
      .store
      .list_prompts(guild_id)
      .await?
      .into_iter()
      .map(|p| (p.tribute_id.clone(), p.into()))
      .collect();

    if self.fallback_enabled() {
      match self.legacy.load_prompts() {
        Ok(legacy) => {
          for (id, prompt) in legacy {
            prompts.entry(id).or_insert_with(|| prompt.view());
          }
        }
        Err(e) => tracing::warn!("legacy prompts read failed: {e}"),
      }
    }

    Ok(prompts)
  }

  /// Scan both legacy documents and summarise what is still in them.
  /// Unreadable documents count as empty, consistent with fallback reads.
  pub fn analyze_legacy_data(&self) -> LegacyAnalysis {
    let inventories = self.legacy.load_inventories().unwrap_or_else(|e| {
      tracing::warn!("legacy inventories unreadable during analysis: {e}");
      BTreeMap::new()
    });
    let prompts = self.legacy.load_prompts().unwrap_or_else(|e| {
      tracing::warn!("legacy prompts unreadable during analysis: {e}");
      BTreeMap::new()
    });

    let mut tribute_ids: Vec<TributeId> =
      inventories.keys().chain(prompts.keys()).cloned().collect();
    tribute_ids.sort();
    tribute_ids.dedup();

    LegacyAnalysis {
      needs_migration:       !tribute_ids.is_empty(),
      total_inventories:     inventories.len(),
      total_prompts:         prompts.len(),
      total_inventory_items: inventories
        .values()
        .map(|inv| inv.items.len() + inv.equipped.len())
        .sum(),
      tribute_ids,
    }
  }

  // ── Tribute writes and reads (relational only) ────────────────────────

  pub async fn create_tribute(&self, input: NewTribute) -> Result<Tribute, S::Error> {
    self.store.create_tribute(input).await
  }

  pub async fn get_tribute(&self, id: &TributeId) -> Result<Option<Tribute>, S::Error> {
    self.store.get_tribute(id).await
  }

  pub async fn list_tributes(
    &self,
    guild_id: Option<i64>,
  ) -> Result<Vec<Tribute>, S::Error> {
    self.store.list_tributes(guild_id).await
  }

  pub async fn update_tribute(
    &self,
    id: &TributeId,
    patch: TributePatch,
  ) -> Result<Option<Tribute>, S::Error> {
    self.store.update_tribute(id, patch).await
  }

  pub async fn delete_tribute(&self, id: &TributeId) -> Result<bool, S::Error> {
    self.store.delete_tribute(id).await
  }

  pub async fn get_tribute_full(
    &self,
    id: &TributeId,
  ) -> Result<Option<TributeProfile>, S::Error> {
    self.store.get_tribute_full(id).await
  }

  // ── Inventory writes (relational only) ────────────────────────────────

  pub async fn create_or_resize_inventory(
    &self,
    id: &TributeId,
    capacity: u32,
    equipped_capacity: u32,
  ) -> Result<Inventory, S::Error> {
    self
      .store
      .create_or_resize_inventory(id, capacity, equipped_capacity)
      .await
  }

  pub async fn add_inventory_item(
    &self,
    id: &TributeId,
    name: &str,
  ) -> Result<u32, S::Error> {
    self.store.add_inventory_item(id, name).await
  }

  pub async fn add_equipped_item(
    &self,
    id: &TributeId,
    name: &str,
  ) -> Result<u32, S::Error> {
    self.store.add_equipped_item(id, name).await
  }

  pub async fn remove_inventory_item(
    &self,
    id: &TributeId,
    slot: u32,
  ) -> Result<bool, S::Error> {
    self.store.remove_inventory_item(id, slot).await
  }

  pub async fn equip_item(
    &self,
    id: &TributeId,
    slot: u32,
  ) -> Result<InventorySnapshot, S::Error> {
    self.store.equip_item(id, slot).await
  }

  pub async fn unequip_item(
    &self,
    id: &TributeId,
    slot: u32,
  ) -> Result<InventorySnapshot, S::Error> {
    self.store.unequip_item(id, slot).await
  }

  pub async fn clear_inventory(&self, id: &TributeId) -> Result<bool, S::Error> {
    self.store.clear_inventory(id).await
  }

  pub async fn search_inventory_items(
    &self,
    needle: &str,
  ) -> Result<Vec<ItemMatch>, S::Error> {
    self.store.search_inventory_items(needle).await
  }

  // ── Prompt writes (relational only) ───────────────────────────────────

  pub async fn create_prompt(
    &self,
    id: &TributeId,
    message: &str,
    channel_id: i64,
  ) -> Result<Prompt, S::Error> {
    self.store.create_prompt(id, message, channel_id).await
  }

  pub async fn update_prompt(
    &self,
    id: &TributeId,
    patch: PromptPatch,
  ) -> Result<Option<Prompt>, S::Error> {
    self.store.update_prompt(id, patch).await
  }

  pub async fn delete_prompt(&self, id: &TributeId) -> Result<bool, S::Error> {
    self.store.delete_prompt(id).await
  }

  pub async fn delete_all_prompts(&self) -> Result<usize, S::Error> {
    self.store.delete_all_prompts().await
  }

  // ── File records (relational only) ────────────────────────────────────

  pub async fn add_file(
    &self,
    id: &TributeId,
    kind: &str,
    path: &str,
  ) -> Result<FileRecord, S::Error> {
    self.store.add_file(id, kind, path).await
  }

  pub async fn get_files(
    &self,
    id: &TributeId,
    kind: Option<&str>,
  ) -> Result<Vec<FileRecord>, S::Error> {
    self.store.get_files(id, kind).await
  }

  pub async fn delete_file(&self, file_id: i64) -> Result<bool, S::Error> {
    self.store.delete_file(file_id).await
  }
}

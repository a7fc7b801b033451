//! [`JsonStore`] — wholesale load/mutate/save access to the legacy documents.

use std::{
  collections::BTreeMap,
  fs, io,
  path::{Path, PathBuf},
  sync::{Mutex, PoisonError},
};

use panem_core::{
  Error as CoreError,
  inventory::{InventorySnapshot, Section},
  prompt::{PromptPatch, PromptView},
  tribute::TributeId,
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
  Result,
  document::{LegacyInventory, LegacyPrompt, rekey},
};

const INVENTORIES_FILE: &str = "inventories/inventories.json";
const PROMPTS_FILE: &str = "prompts/prompt_info.json";

// ─── Store ───────────────────────────────────────────────────────────────────

/// The legacy document store, rooted at a data directory.
///
/// A single process-wide lock serialises the load/save pair of every
/// operation. Each public method is a complete load-mutate-save, so callers
/// never see a torn document; multi-step flows must not assume anything
/// between two calls.
pub struct JsonStore {
  data_dir: PathBuf,
  lock:     Mutex<()>,
}

impl JsonStore {
  pub fn new(data_dir: impl Into<PathBuf>) -> Self {
    Self { data_dir: data_dir.into(), lock: Mutex::new(()) }
  }

  pub fn data_dir(&self) -> &Path { &self.data_dir }

  /// Whether either legacy document exists on disk.
  pub fn documents_present(&self) -> bool {
    self.inventories_path().exists() || self.prompts_path().exists()
  }

  fn inventories_path(&self) -> PathBuf { self.data_dir.join(INVENTORIES_FILE) }

  fn prompts_path(&self) -> PathBuf { self.data_dir.join(PROMPTS_FILE) }

  fn guard(&self) -> std::sync::MutexGuard<'_, ()> {
    self.lock.lock().unwrap_or_else(PoisonError::into_inner)
  }

  // ── Document IO ───────────────────────────────────────────────────────

  /// Read a whole document. A missing file is an empty document; keys are
  /// folded to the canonical uppercase form, whichever case the file used.
  fn read_doc<T: DeserializeOwned>(path: &Path) -> Result<BTreeMap<TributeId, T>> {
    let text = match fs::read_to_string(path) {
      Ok(text) => text,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
      Err(e) => return Err(e.into()),
    };
    let raw: BTreeMap<String, T> = serde_json::from_str(&text)?;
    Ok(raw.into_iter().map(|(k, v)| (TributeId::new(k), v)).collect())
  }

  fn write_doc<T: Serialize>(path: &Path, doc: &BTreeMap<TributeId, T>) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(doc)?)?;
    Ok(())
  }

  /// Load the inventories document, hand it to `f`, and rewrite it when `f`
  /// reports a mutation.
  fn mutate_inventories<T>(
    &self,
    f: impl FnOnce(&mut BTreeMap<TributeId, LegacyInventory>) -> Result<(T, bool)>,
  ) -> Result<T> {
    let _guard = self.guard();
    let path = self.inventories_path();
    let mut doc = Self::read_doc(&path)?;
    let (out, dirty) = f(&mut doc)?;
    if dirty {
      Self::write_doc(&path, &doc)?;
    }
    Ok(out)
  }

  fn mutate_prompts<T>(
    &self,
    f: impl FnOnce(&mut BTreeMap<TributeId, LegacyPrompt>) -> Result<(T, bool)>,
  ) -> Result<T> {
    let _guard = self.guard();
    let path = self.prompts_path();
    let mut doc = Self::read_doc(&path)?;
    let (out, dirty) = f(&mut doc)?;
    if dirty {
      Self::write_doc(&path, &doc)?;
    }
    Ok(out)
  }

  // ── Whole-document reads ──────────────────────────────────────────────

  pub fn load_inventories(&self) -> Result<BTreeMap<TributeId, LegacyInventory>> {
    let _guard = self.guard();
    Self::read_doc(&self.inventories_path())
  }

  pub fn load_prompts(&self) -> Result<BTreeMap<TributeId, LegacyPrompt>> {
    let _guard = self.guard();
    Self::read_doc(&self.prompts_path())
  }

  // ── Inventories ───────────────────────────────────────────────────────

  pub fn get_inventory(&self, id: &TributeId) -> Result<Option<InventorySnapshot>> {
    let _guard = self.guard();
    let doc: BTreeMap<TributeId, LegacyInventory> =
      Self::read_doc(&self.inventories_path())?;
    Ok(doc.get(id).map(LegacyInventory::snapshot))
  }

  /// Create the inventory, or update its capacities in place if it exists.
  /// Items are never touched by a resize.
  pub fn create_or_resize_inventory(
    &self,
    id: &TributeId,
    capacity: u32,
    equipped_capacity: u32,
  ) -> Result<InventorySnapshot> {
    self.mutate_inventories(|doc| {
      let inv = doc.entry(id.clone()).or_default();
      inv.capacity = capacity;
      inv.equipped_capacity = equipped_capacity;
      tracing::info!(%id, capacity, equipped_capacity, "legacy inventory written");
      Ok((inv.snapshot(), true))
    })
  }

  /// Append an item to the carried section. The document numbering strategy
  /// is `count + 1`; the carried capacity is advisory.
  pub fn add_item(&self, id: &TributeId, name: &str) -> Result<u32> {
    self.mutate_inventories(|doc| {
      let inv = doc
        .get_mut(id)
        .ok_or_else(|| CoreError::InventoryNotFound(id.clone()))?;
      let slot = inv.items.len() as u32 + 1;
      inv.items.insert(slot, name.to_owned());
      Ok((slot, true))
    })
  }

  /// Append an item directly to the equipped section, enforcing its hard
  /// capacity.
  pub fn add_equipped_item(&self, id: &TributeId, name: &str) -> Result<u32> {
    self.mutate_inventories(|doc| {
      let inv = doc
        .get_mut(id)
        .ok_or_else(|| CoreError::InventoryNotFound(id.clone()))?;
      if inv.equipped.len() as u32 >= inv.equipped_capacity {
        return Err(
          CoreError::SectionFull {
            tribute_id: id.clone(),
            section:    Section::Equipped,
            count:      inv.equipped.len() as u32,
            capacity:   inv.equipped_capacity,
          }
          .into(),
        );
      }
      let slot = inv.equipped.len() as u32 + 1;
      inv.equipped.insert(slot, name.to_owned());
      Ok((slot, true))
    })
  }

  /// Remove the first carried item whose name matches exactly, then re-key.
  /// This is the document-side removal semantics; the relational store
  /// removes by slot instead.
  pub fn remove_item_by_name(&self, id: &TributeId, name: &str) -> Result<bool> {
    self.mutate_inventories(|doc| {
      let Some(inv) = doc.get_mut(id) else {
        return Ok((false, false));
      };
      let Some(slot) = inv
        .items
        .iter()
        .find(|(_, v)| v.as_str() == name)
        .map(|(k, _)| *k)
      else {
        return Ok((false, false));
      };
      inv.items.remove(&slot);
      inv.items = rekey(&inv.items);
      Ok((true, true))
    })
  }

  /// Move a carried item into the equipped section; both sections come out
  /// densely keyed.
  pub fn equip(&self, id: &TributeId, slot: u32) -> Result<InventorySnapshot> {
    self.mutate_inventories(|doc| {
      let inv = doc
        .get_mut(id)
        .ok_or_else(|| CoreError::InventoryNotFound(id.clone()))?;
      if !inv.items.contains_key(&slot) {
        return Err(
          CoreError::SlotNotFound {
            tribute_id: id.clone(),
            section:    Section::Items,
            slot,
          }
          .into(),
        );
      }
      if inv.equipped.len() as u32 >= inv.equipped_capacity {
        return Err(
          CoreError::SectionFull {
            tribute_id: id.clone(),
            section:    Section::Equipped,
            count:      inv.equipped.len() as u32,
            capacity:   inv.equipped_capacity,
          }
          .into(),
        );
      }

      let name = inv.items.remove(&slot).unwrap_or_default();
      inv.items = rekey(&inv.items);
      let next = inv.equipped.len() as u32 + 1;
      inv.equipped.insert(next, name);
      Ok((inv.snapshot(), true))
    })
  }

  /// Move an equipped item back into the carried section, enforcing the
  /// carried capacity.
  pub fn unequip(&self, id: &TributeId, slot: u32) -> Result<InventorySnapshot> {
    self.mutate_inventories(|doc| {
      let inv = doc
        .get_mut(id)
        .ok_or_else(|| CoreError::InventoryNotFound(id.clone()))?;
      if !inv.equipped.contains_key(&slot) {
        return Err(
          CoreError::SlotNotFound {
            tribute_id: id.clone(),
            section:    Section::Equipped,
            slot,
          }
          .into(),
        );
      }
      if inv.items.len() as u32 >= inv.capacity {
        return Err(
          CoreError::SectionFull {
            tribute_id: id.clone(),
            section:    Section::Items,
            count:      inv.items.len() as u32,
            capacity:   inv.capacity,
          }
          .into(),
        );
      }

      let name = inv.equipped.remove(&slot).unwrap_or_default();
      inv.equipped = rekey(&inv.equipped);
      let next = inv.items.len() as u32 + 1;
      inv.items.insert(next, name);
      Ok((inv.snapshot(), true))
    })
  }

  /// Empty both sections, preserving the capacities.
  pub fn clear_inventory(&self, id: &TributeId) -> Result<bool> {
    self.mutate_inventories(|doc| {
      let Some(inv) = doc.get_mut(id) else {
        return Ok((false, false));
      };
      inv.items.clear();
      inv.equipped.clear();
      Ok((true, true))
    })
  }

  /// Drop the tribute's whole inventory entry.
  pub fn delete_inventory(&self, id: &TributeId) -> Result<bool> {
    self.mutate_inventories(|doc| {
      let existed = doc.remove(id).is_some();
      Ok((existed, existed))
    })
  }

  /// Case-insensitive substring search over both sections of every
  /// inventory. The document format has no tribute metadata to join, so
  /// hits are bare `(tribute_id, item_name)` pairs.
  pub fn search(&self, needle: &str) -> Result<Vec<(TributeId, String)>> {
    let _guard = self.guard();
    let doc: BTreeMap<TributeId, LegacyInventory> =
      Self::read_doc(&self.inventories_path())?;

    let needle = needle.to_lowercase();
    let mut hits = Vec::new();
    for (id, inv) in &doc {
      for name in inv.items.values().chain(inv.equipped.values()) {
        if name.to_lowercase().contains(&needle) {
          hits.push((id.clone(), name.clone()));
        }
      }
    }
    Ok(hits)
  }

  // ── Prompts ───────────────────────────────────────────────────────────

  pub fn get_prompt(&self, id: &TributeId) -> Result<Option<PromptView>> {
    let _guard = self.guard();
    let doc: BTreeMap<TributeId, LegacyPrompt> = Self::read_doc(&self.prompts_path())?;
    Ok(doc.get(id).map(LegacyPrompt::view))
  }

  pub fn get_all_prompts(&self) -> Result<BTreeMap<TributeId, PromptView>> {
    let _guard = self.guard();
    let doc: BTreeMap<TributeId, LegacyPrompt> = Self::read_doc(&self.prompts_path())?;
    Ok(doc.iter().map(|(id, p)| (id.clone(), p.view())).collect())
  }

  /// Write the tribute's prompt entry; an existing entry is replaced.
  pub fn create_prompt(&self, id: &TributeId, message: &str, channel: i64) -> Result<()> {
    self.mutate_prompts(|doc| {
      doc.insert(
        id.clone(),
        LegacyPrompt { message: message.to_owned(), channel, image: None },
      );
      Ok(((), true))
    })
  }

  pub fn update_prompt(&self, id: &TributeId, patch: PromptPatch) -> Result<bool> {
    self.mutate_prompts(|doc| {
      let Some(prompt) = doc.get_mut(id) else {
        return Ok((false, false));
      };
      if let Some(message) = patch.message {
        prompt.message = message;
      }
      if let Some(channel) = patch.channel_id {
        prompt.channel = channel;
      }
      Ok((true, true))
    })
  }

  pub fn delete_prompt(&self, id: &TributeId) -> Result<bool> {
    self.mutate_prompts(|doc| {
      let existed = doc.remove(id).is_some();
      Ok((existed, existed))
    })
  }
}

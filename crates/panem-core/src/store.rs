//! The `TributeStore` trait.
//!
//! The trait is implemented by the relational backend (`panem-store-sqlite`).
//! Higher layers (`panem-storage`, `panem-migrate`) depend on this
//! abstraction, not on any concrete backend. The legacy document adapter is
//! deliberately *not* an implementation: it is a frozen fallback with its own
//! narrower surface.

use std::future::Future;

use crate::{
  file::FileRecord,
  inventory::{Inventory, InventorySnapshot, ItemMatch},
  prompt::{Prompt, PromptPatch},
  tribute::{NewTribute, Tribute, TributeId, TributePatch, TributeProfile},
};

/// Abstraction over the primary tribute store backend.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes. Mutating operations are atomic: they either
/// fully apply or leave the store untouched.
pub trait TributeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tributes ──────────────────────────────────────────────────────────

  /// Create and persist a new tribute. Fails if the id is already taken.
  fn create_tribute(
    &self,
    input: NewTribute,
  ) -> impl Future<Output = Result<Tribute, Self::Error>> + Send + '_;

  /// Retrieve a tribute by id. Returns `None` if not found.
  fn get_tribute<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<Option<Tribute>, Self::Error>> + Send + 'a;

  /// List all tributes, optionally restricted to one guild, ordered by id.
  fn list_tributes(
    &self,
    guild_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Tribute>, Self::Error>> + Send + '_;

  /// Apply a field-level partial update. Returns the updated tribute, or
  /// `None` if the id does not exist.
  fn update_tribute<'a>(
    &'a self,
    id: &'a TributeId,
    patch: TributePatch,
  ) -> impl Future<Output = Result<Option<Tribute>, Self::Error>> + Send + 'a;

  /// Delete a tribute and everything that hangs off it (inventory, items,
  /// prompt, files). Returns whether a record existed.
  fn delete_tribute<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// One aggregate read: tribute + inventory snapshot + prompt + files.
  fn get_tribute_full<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<Option<TributeProfile>, Self::Error>> + Send + 'a;

  // ── Inventories ───────────────────────────────────────────────────────

  /// Create the tribute's inventory, or update its capacities in place if it
  /// already exists. Resizing never touches existing items; the capacities
  /// are ceilings applied to future operations.
  fn create_or_resize_inventory<'a>(
    &'a self,
    id: &'a TributeId,
    capacity: u32,
    equipped_capacity: u32,
  ) -> impl Future<Output = Result<Inventory, Self::Error>> + Send + 'a;

  /// Retrieve the inventory header. Returns `None` if not found.
  fn get_inventory<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<Option<Inventory>, Self::Error>> + Send + 'a;

  /// Materialise both sections as slot → name maps.
  fn snapshot_inventory<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<Option<InventorySnapshot>, Self::Error>> + Send + 'a;

  /// Append an item to the carried section and return its slot number.
  /// The carried capacity is advisory and not enforced here.
  fn add_inventory_item<'a>(
    &'a self,
    id: &'a TributeId,
    name: &'a str,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  /// Append an item directly to the equipped section and return its slot
  /// number. Fails when the equipped section is at capacity.
  fn add_equipped_item<'a>(
    &'a self,
    id: &'a TributeId,
    name: &'a str,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + 'a;

  /// Remove the carried item in `slot`, then re-key the survivors to a dense
  /// `1..=N` sequence. Returns `false` if the slot did not exist.
  fn remove_inventory_item<'a>(
    &'a self,
    id: &'a TributeId,
    slot: u32,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Move a carried item into the equipped section. Fails when the equipped
  /// section is at capacity. Both sections are re-keyed afterwards.
  fn equip_item<'a>(
    &'a self,
    id: &'a TributeId,
    slot: u32,
  ) -> impl Future<Output = Result<InventorySnapshot, Self::Error>> + Send + 'a;

  /// Move an equipped item back into the carried section. Fails when the
  /// carried section is at capacity. Both sections are re-keyed afterwards.
  fn unequip_item<'a>(
    &'a self,
    id: &'a TributeId,
    slot: u32,
  ) -> impl Future<Output = Result<InventorySnapshot, Self::Error>> + Send + 'a;

  /// Delete every item in both sections, preserving the capacities.
  /// Returns `false` if the tribute has no inventory.
  fn clear_inventory<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Case-insensitive substring search over item names in both sections of
  /// every inventory, joined with tribute metadata. Ordered by tribute id,
  /// then section, then slot.
  fn search_inventory_items<'a>(
    &'a self,
    needle: &'a str,
  ) -> impl Future<Output = Result<Vec<ItemMatch>, Self::Error>> + Send + 'a;

  // ── Prompts ───────────────────────────────────────────────────────────

  /// Create the tribute's prompt. Fails if one already exists — the 1:1
  /// relationship rejects a second create rather than replacing.
  fn create_prompt<'a>(
    &'a self,
    id: &'a TributeId,
    message: &'a str,
    channel_id: i64,
  ) -> impl Future<Output = Result<Prompt, Self::Error>> + Send + 'a;

  fn get_prompt<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<Option<Prompt>, Self::Error>> + Send + 'a;

  /// List all prompts, optionally restricted to one guild, ordered by
  /// tribute id.
  fn list_prompts(
    &self,
    guild_id: Option<i64>,
  ) -> impl Future<Output = Result<Vec<Prompt>, Self::Error>> + Send + '_;

  /// Apply a field-level partial update. Returns the updated prompt, or
  /// `None` if the tribute has no prompt.
  fn update_prompt<'a>(
    &'a self,
    id: &'a TributeId,
    patch: PromptPatch,
  ) -> impl Future<Output = Result<Option<Prompt>, Self::Error>> + Send + 'a;

  /// Returns whether a prompt existed.
  fn delete_prompt<'a>(
    &'a self,
    id: &'a TributeId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete every prompt in the store; returns how many were removed.
  fn delete_all_prompts(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Files ─────────────────────────────────────────────────────────────

  fn add_file<'a>(
    &'a self,
    id: &'a TributeId,
    kind: &'a str,
    path: &'a str,
  ) -> impl Future<Output = Result<FileRecord, Self::Error>> + Send + 'a;

  fn get_files<'a>(
    &'a self,
    id: &'a TributeId,
    kind: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<FileRecord>, Self::Error>> + Send + 'a;

  fn delete_file(
    &self,
    file_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

//! Tests for `JsonStore` against a temporary data directory.

use std::fs;

use panem_core::{
  Error as CoreError, inventory::Section, prompt::PromptPatch, tribute::TributeId,
};
use tempfile::TempDir;

use crate::{Error, JsonStore};

fn store() -> (TempDir, JsonStore) {
  let dir = tempfile::tempdir().expect("tempdir");
  let store = JsonStore::new(dir.path());
  (dir, store)
}

fn tid(s: &str) -> TributeId { TributeId::new(s) }

// ─── Documents ───────────────────────────────────────────────────────────────

#[test]
fn missing_files_read_as_empty() {
  let (_dir, s) = store();

  assert!(!s.documents_present());
  assert!(s.load_inventories().unwrap().is_empty());
  assert!(s.load_prompts().unwrap().is_empty());
  assert!(s.get_inventory(&tid("D1F")).unwrap().is_none());
  assert!(s.get_prompt(&tid("D1F")).unwrap().is_none());
}

#[test]
fn corrupt_document_errors() {
  let (dir, s) = store();
  let path = dir.path().join("inventories");
  fs::create_dir_all(&path).unwrap();
  fs::write(path.join("inventories.json"), "{not json").unwrap();

  let err = s.get_inventory(&tid("D1F")).unwrap_err();
  assert!(matches!(err, Error::Json(_)));
}

#[test]
fn document_keys_are_case_folded() {
  let (dir, s) = store();
  let path = dir.path().join("inventories");
  fs::create_dir_all(&path).unwrap();
  fs::write(
    path.join("inventories.json"),
    r#"{"d1f": {"capacity": 4, "items": {"1": "knife"}}}"#,
  )
  .unwrap();

  // Lowercase key on disk, canonical uppercase lookup.
  let snap = s.get_inventory(&tid("D1F")).unwrap().unwrap();
  assert_eq!(snap.capacity, 4);
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("knife"));
  // Absent equipped fields take their defaults.
  assert_eq!(snap.equipped_capacity, 5);
  assert!(snap.equipped.is_empty());
}

#[test]
fn slot_keys_parse_numerically() {
  let (dir, s) = store();
  let path = dir.path().join("inventories");
  fs::create_dir_all(&path).unwrap();
  fs::write(
    path.join("inventories.json"),
    r#"{"D1F": {"capacity": 12, "items": {"2": "b", "10": "j", "1": "a"}}}"#,
  )
  .unwrap();

  // Slot 10 orders after slot 2; removal re-keys in numeric order.
  assert!(s.remove_item_by_name(&tid("D1F"), "a").unwrap());
  let snap = s.get_inventory(&tid("D1F")).unwrap().unwrap();
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("b"));
  assert_eq!(snap.items.get(&2).map(String::as_str), Some("j"));
}

// ─── Inventories ─────────────────────────────────────────────────────────────

#[test]
fn create_add_and_snapshot() {
  let (_dir, s) = store();
  let id = tid("D1F");

  s.create_or_resize_inventory(&id, 3, 1).unwrap();
  assert_eq!(s.add_item(&id, "knife").unwrap(), 1);
  assert_eq!(s.add_item(&id, "rope").unwrap(), 2);

  let snap = s.get_inventory(&id).unwrap().unwrap();
  assert_eq!(snap.capacity, 3);
  assert_eq!(snap.items.len(), 2);
  assert!(s.documents_present());
}

#[test]
fn resize_keeps_items() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 3, 1).unwrap();
  s.add_item(&id, "knife").unwrap();

  let snap = s.create_or_resize_inventory(&id, 8, 2).unwrap();
  assert_eq!(snap.capacity, 8);
  assert_eq!(snap.equipped_capacity, 2);
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("knife"));
}

#[test]
fn add_item_without_inventory_errors() {
  let (_dir, s) = store();
  let err = s.add_item(&tid("D1F"), "knife").unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InventoryNotFound(_))));
}

#[test]
fn remove_by_name_takes_first_match_and_rekeys() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 5, 1).unwrap();
  s.add_item(&id, "bread").unwrap();
  s.add_item(&id, "knife").unwrap();
  s.add_item(&id, "bread").unwrap();

  assert!(s.remove_item_by_name(&id, "bread").unwrap());

  let snap = s.get_inventory(&id).unwrap().unwrap();
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("knife"));
  assert_eq!(snap.items.get(&2).map(String::as_str), Some("bread"));
  assert_eq!(snap.items.len(), 2);

  assert!(!s.remove_item_by_name(&id, "trident").unwrap());
}

#[test]
fn equip_and_unequip_move_between_sections() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 3, 1).unwrap();
  s.add_item(&id, "knife").unwrap();
  s.add_item(&id, "canteen").unwrap();

  let snap = s.equip(&id, 1).unwrap();
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("canteen"));
  assert_eq!(snap.equipped.get(&1).map(String::as_str), Some("knife"));

  // Equipped section is full now.
  let err = s.equip(&id, 1).unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SectionFull { section: Section::Equipped, .. })
  ));

  let snap = s.unequip(&id, 1).unwrap();
  assert!(snap.equipped.is_empty());
  assert_eq!(snap.items.len(), 2);
  // knife re-enters at the end of the carried section.
  assert_eq!(snap.items.get(&2).map(String::as_str), Some("knife"));
}

#[test]
fn unequip_respects_carried_capacity() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 1, 2).unwrap();
  s.add_item(&id, "knife").unwrap();
  s.equip(&id, 1).unwrap();
  s.add_item(&id, "rope").unwrap();

  let err = s.unequip(&id, 1).unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SectionFull { section: Section::Items, .. })
  ));
}

#[test]
fn equip_missing_slot_errors() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 3, 1).unwrap();

  let err = s.equip(&id, 2).unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::SlotNotFound { slot: 2, .. })));
}

#[test]
fn clear_and_delete_inventory() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_or_resize_inventory(&id, 3, 2).unwrap();
  s.add_item(&id, "knife").unwrap();
  s.add_equipped_item(&id, "boots").unwrap();

  assert!(s.clear_inventory(&id).unwrap());
  let snap = s.get_inventory(&id).unwrap().unwrap();
  assert!(snap.items.is_empty());
  assert!(snap.equipped.is_empty());
  assert_eq!(snap.capacity, 3);

  assert!(s.delete_inventory(&id).unwrap());
  assert!(s.get_inventory(&id).unwrap().is_none());
  assert!(!s.delete_inventory(&id).unwrap());
  assert!(!s.clear_inventory(&id).unwrap());
}

#[test]
fn search_spans_both_sections() {
  let (_dir, s) = store();
  let a = tid("D1F");
  let b = tid("D2M");
  s.create_or_resize_inventory(&a, 5, 2).unwrap();
  s.create_or_resize_inventory(&b, 5, 2).unwrap();
  s.add_item(&a, "Hunting Knife").unwrap();
  s.add_equipped_item(&b, "pocket knife").unwrap();
  s.add_item(&b, "rope").unwrap();

  let hits = s.search("KNIFE").unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0], (a.clone(), "Hunting Knife".to_owned()));
  assert_eq!(hits[1], (b.clone(), "pocket knife".to_owned()));
}

// ─── Prompts ─────────────────────────────────────────────────────────────────

#[test]
fn prompt_create_is_last_writer_wins() {
  let (_dir, s) = store();
  let id = tid("D1F");

  s.create_prompt(&id, "first", 7).unwrap();
  s.create_prompt(&id, "second", 8).unwrap();

  let view = s.get_prompt(&id).unwrap().unwrap();
  assert_eq!(view.message, "second");
  assert_eq!(view.channel_id, 8);
  assert!(view.image.is_none());
  assert_eq!(s.get_all_prompts().unwrap().len(), 1);
}

#[test]
fn prompt_update_and_delete() {
  let (_dir, s) = store();
  let id = tid("D1F");
  s.create_prompt(&id, "msg", 7).unwrap();

  let patch = PromptPatch { message: Some("edited".into()), channel_id: None };
  assert!(s.update_prompt(&id, patch).unwrap());
  let view = s.get_prompt(&id).unwrap().unwrap();
  assert_eq!(view.message, "edited");
  assert_eq!(view.channel_id, 7);

  assert!(s.delete_prompt(&id).unwrap());
  assert!(!s.delete_prompt(&id).unwrap());
  assert!(!s.update_prompt(&id, PromptPatch::default()).unwrap());
}

#[test]
fn legacy_prompt_image_survives_reads() {
  let (dir, s) = store();
  let path = dir.path().join("prompts");
  fs::create_dir_all(&path).unwrap();
  fs::write(
    path.join("prompt_info.json"),
    r#"{"d1f": {"message": "You wake in a forest.", "channel": 77, "image": "prompts/d1f.png"}}"#,
  )
  .unwrap();

  let view = s.get_prompt(&tid("D1F")).unwrap().unwrap();
  assert_eq!(view.message, "You wake in a forest.");
  assert_eq!(view.channel_id, 77);
  assert_eq!(view.image.as_deref(), Some("prompts/d1f.png"));
}

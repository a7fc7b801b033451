//! Integration tests for `SqliteStore` against an in-memory database.

use panem_core::{
  Error as CoreError,
  inventory::Section,
  prompt::PromptPatch,
  store::TributeStore,
  tribute::{NewTribute, TributeId, TributePatch},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn tid(s: &str) -> TributeId { TributeId::new(s) }

async fn seed_tribute(s: &SqliteStore, id: &str) -> TributeId {
  let id = tid(id);
  s.create_tribute(NewTribute::new(id.clone(), "Name", 42, "<@42>"))
    .await
    .expect("seed tribute");
  id
}

async fn seed_inventory(
  s: &SqliteStore,
  id: &TributeId,
  capacity: u32,
  equipped_capacity: u32,
) {
  s.create_or_resize_inventory(id, capacity, equipped_capacity)
    .await
    .expect("seed inventory");
}

// ─── Tributes ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_tribute() {
  let s = store().await;

  let mut input = NewTribute::new(tid("D1F"), "Finnick", 7, "<@7>");
  input.guild_id = Some(99);
  input.face_claim_url = Some("https://img.example/finnick.png".into());
  input.prompt_channel_id = Some(1234);
  let created = s.create_tribute(input).await.unwrap();

  let fetched = s.get_tribute(&tid("D1F")).await.unwrap().unwrap();
  assert_eq!(fetched.tribute_id, created.tribute_id);
  assert_eq!(fetched.name, "Finnick");
  assert_eq!(fetched.user_id, 7);
  assert_eq!(fetched.mention, "<@7>");
  assert_eq!(fetched.guild_id, Some(99));
  assert_eq!(
    fetched.face_claim_url.as_deref(),
    Some("https://img.example/finnick.png")
  );
  assert_eq!(fetched.prompt_channel_id, Some(1234));
}

#[tokio::test]
async fn tribute_id_is_case_folded() {
  let s = store().await;
  seed_tribute(&s, "d1f").await;

  let fetched = s.get_tribute(&tid("D1F")).await.unwrap();
  assert!(fetched.is_some());
  assert_eq!(fetched.unwrap().tribute_id.as_str(), "D1F");
}

#[tokio::test]
async fn duplicate_tribute_conflicts() {
  let s = store().await;
  seed_tribute(&s, "D1F").await;

  let err = s
    .create_tribute(NewTribute::new(tid("d1f"), "Other", 8, "<@8>"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TributeExists(_))));
  assert!(err.is_tribute_conflict());
}

#[tokio::test]
async fn get_missing_tribute_returns_none() {
  let s = store().await;
  assert!(s.get_tribute(&tid("D9M")).await.unwrap().is_none());
}

#[tokio::test]
async fn update_tribute_mutable_fields() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;

  let patch = TributePatch {
    name:     Some("Renamed".into()),
    mention:  Some("<@100>".into()),
    guild_id: Some(55),
  };
  let updated = s.update_tribute(&id, patch).await.unwrap().unwrap();
  assert_eq!(updated.name, "Renamed");
  assert_eq!(updated.mention, "<@100>");
  assert_eq!(updated.guild_id, Some(55));

  // An empty patch is a plain read-back.
  let same = s
    .update_tribute(&id, TributePatch::default())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(same.name, "Renamed");
}

#[tokio::test]
async fn update_missing_tribute_returns_none() {
  let s = store().await;
  let patch = TributePatch { name: Some("X".into()), ..Default::default() };
  assert!(s.update_tribute(&tid("D9M"), patch).await.unwrap().is_none());
}

#[tokio::test]
async fn list_tributes_filtered_by_guild() {
  let s = store().await;

  let mut a = NewTribute::new(tid("D1F"), "A", 1, "<@1>");
  a.guild_id = Some(10);
  let mut b = NewTribute::new(tid("D2M"), "B", 2, "<@2>");
  b.guild_id = Some(20);
  s.create_tribute(a).await.unwrap();
  s.create_tribute(b).await.unwrap();

  let all = s.list_tributes(None).await.unwrap();
  assert_eq!(all.len(), 2);
  // Ordered by tribute id.
  assert_eq!(all[0].tribute_id.as_str(), "D1F");

  let g10 = s.list_tributes(Some(10)).await.unwrap();
  assert_eq!(g10.len(), 1);
  assert_eq!(g10[0].tribute_id.as_str(), "D1F");
}

#[tokio::test]
async fn delete_tribute_cascades_to_all_dependents() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.add_equipped_item(&id, "boots").await.unwrap();
  s.create_prompt(&id, "You wake in a forest.", 77).await.unwrap();
  s.add_file(&id, "face_claim", "faces/d1f.png").await.unwrap();

  assert!(s.delete_tribute(&id).await.unwrap());

  assert!(s.get_inventory(&id).await.unwrap().is_none());
  assert!(s.snapshot_inventory(&id).await.unwrap().is_none());
  assert!(s.get_prompt(&id).await.unwrap().is_none());
  assert!(s.get_files(&id, None).await.unwrap().is_empty());
  assert!(s.search_inventory_items("knife").await.unwrap().is_empty());

  // Second delete is a no-op.
  assert!(!s.delete_tribute(&id).await.unwrap());
}

// ─── Inventory items ─────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_remove_items_keeps_slots_dense() {
  // Scenario A from the data-model notes.
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;

  assert_eq!(s.add_inventory_item(&id, "knife").await.unwrap(), 1);
  assert_eq!(s.add_inventory_item(&id, "rope").await.unwrap(), 2);
  assert_eq!(s.add_inventory_item(&id, "canteen").await.unwrap(), 3);

  assert!(s.remove_inventory_item(&id, 2).await.unwrap());

  let snap = s.snapshot_inventory(&id).await.unwrap().unwrap();
  assert_eq!(snap.items.len(), 2);
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("knife"));
  assert_eq!(snap.items.get(&2).map(String::as_str), Some("canteen"));
}

#[tokio::test]
async fn slots_stay_dense_after_arbitrary_removals() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 10, 5).await;

  for name in ["a", "b", "c", "d", "e"] {
    s.add_inventory_item(&id, name).await.unwrap();
  }
  s.remove_inventory_item(&id, 2).await.unwrap();
  s.remove_inventory_item(&id, 3).await.unwrap();
  s.add_inventory_item(&id, "f").await.unwrap();

  let snap = s.snapshot_inventory(&id).await.unwrap().unwrap();
  let slots: Vec<u32> = snap.items.keys().copied().collect();
  assert_eq!(slots, (1..=snap.items.len() as u32).collect::<Vec<_>>());
}

#[tokio::test]
async fn add_item_without_inventory_errors() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;

  let err = s.add_inventory_item(&id, "knife").await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InventoryNotFound(_))));
}

#[tokio::test]
async fn remove_missing_slot_returns_false() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;

  assert!(!s.remove_inventory_item(&id, 1).await.unwrap());
}

#[tokio::test]
async fn carried_capacity_is_advisory() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 1, 1).await;

  // Adding past the carried capacity is allowed; the ceiling is advisory.
  s.add_inventory_item(&id, "knife").await.unwrap();
  assert_eq!(s.add_inventory_item(&id, "rope").await.unwrap(), 2);
}

// ─── Equip / unequip ─────────────────────────────────────────────────────────

#[tokio::test]
async fn equip_moves_item_and_enforces_capacity() {
  // Scenario B.
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.add_inventory_item(&id, "canteen").await.unwrap();

  let snap = s.equip_item(&id, 1).await.unwrap();
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("canteen"));
  assert_eq!(snap.items.len(), 1);
  assert_eq!(snap.equipped.get(&1).map(String::as_str), Some("knife"));

  let err = s.equip_item(&id, 1).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SectionFull { section: Section::Equipped, .. })
  ));

  // The failed equip changed nothing.
  let snap = s.snapshot_inventory(&id).await.unwrap().unwrap();
  assert_eq!(snap.items.len(), 1);
  assert_eq!(snap.equipped.len(), 1);
}

#[tokio::test]
async fn unequip_respects_carried_capacity() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 1, 5).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.equip_item(&id, 1).await.unwrap();
  s.add_inventory_item(&id, "rope").await.unwrap();

  // Carried section is at its ceiling; unequip must refuse.
  let err = s.unequip_item(&id, 1).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SectionFull { section: Section::Items, .. })
  ));
}

#[tokio::test]
async fn unequip_rekeys_both_sections() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 10, 5).await;
  for name in ["knife", "rope"] {
    s.add_inventory_item(&id, name).await.unwrap();
  }
  s.equip_item(&id, 1).await.unwrap();
  s.equip_item(&id, 1).await.unwrap();

  // equipped: {1: knife, 2: rope}; carried empty.
  let snap = s.unequip_item(&id, 1).await.unwrap();
  assert_eq!(snap.items.get(&1).map(String::as_str), Some("knife"));
  assert_eq!(snap.equipped.get(&1).map(String::as_str), Some("rope"));
  assert_eq!(snap.equipped.len(), 1);
}

#[tokio::test]
async fn equip_missing_slot_errors() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;

  let err = s.equip_item(&id, 4).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SlotNotFound { section: Section::Items, slot: 4, .. })
  ));
}

#[tokio::test]
async fn add_equipped_item_enforces_capacity() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 10, 2).await;

  assert_eq!(s.add_equipped_item(&id, "boots").await.unwrap(), 1);
  assert_eq!(s.add_equipped_item(&id, "cloak").await.unwrap(), 2);

  let err = s.add_equipped_item(&id, "helmet").await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::SectionFull { section: Section::Equipped, .. })
  ));
}

#[tokio::test]
async fn clear_inventory_empties_both_sections() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 2).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.add_equipped_item(&id, "boots").await.unwrap();

  assert!(s.clear_inventory(&id).await.unwrap());

  let snap = s.snapshot_inventory(&id).await.unwrap().unwrap();
  assert!(snap.items.is_empty());
  assert!(snap.equipped.is_empty());
  assert_eq!(snap.capacity, 3);
  assert_eq!(snap.equipped_capacity, 2);

  assert!(!s.clear_inventory(&tid("D9M")).await.unwrap());
}

#[tokio::test]
async fn resize_changes_capacities_only() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 2).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.add_inventory_item(&id, "rope").await.unwrap();
  s.add_equipped_item(&id, "boots").await.unwrap();

  // Resizing down does not truncate existing items.
  let inv = s.create_or_resize_inventory(&id, 1, 1).await.unwrap();
  assert_eq!(inv.capacity, 1);
  assert_eq!(inv.equipped_capacity, 1);

  let snap = s.snapshot_inventory(&id).await.unwrap().unwrap();
  assert_eq!(snap.items.len(), 2);
  assert_eq!(snap.equipped.len(), 1);
  assert_eq!(snap.capacity, 1);
}

#[tokio::test]
async fn inventory_for_missing_tribute_errors() {
  let s = store().await;

  let err = s
    .create_or_resize_inventory(&tid("D9M"), 10, 5)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TributeNotFound(_))));
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_both_sections_case_insensitively() {
  let s = store().await;
  let a = seed_tribute(&s, "D1F").await;
  let b = seed_tribute(&s, "D2M").await;
  seed_inventory(&s, &a, 10, 5).await;
  seed_inventory(&s, &b, 10, 5).await;
  s.add_inventory_item(&a, "Hunting Knife").await.unwrap();
  s.add_inventory_item(&a, "rope").await.unwrap();
  s.add_equipped_item(&b, "pocket knife").await.unwrap();

  let hits = s.search_inventory_items("KNIFE").await.unwrap();
  assert_eq!(hits.len(), 2);
  assert_eq!(hits[0].tribute_id.as_str(), "D1F");
  assert_eq!(hits[0].name, "Hunting Knife");
  assert_eq!(hits[0].section, Section::Items);
  assert_eq!(hits[0].mention, "<@42>");
  assert_eq!(hits[1].tribute_id.as_str(), "D2M");
  assert_eq!(hits[1].section, Section::Equipped);

  assert!(s.search_inventory_items("trident").await.unwrap().is_empty());
}

// ─── Prompts ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn second_prompt_create_is_rejected() {
  // Scenario C.
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;

  s.create_prompt(&id, "You wake in a forest.", 77).await.unwrap();
  let err = s.create_prompt(&id, "Again?", 77).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::PromptExists(_))));
  assert!(err.is_prompt_conflict());

  let prompt = s.get_prompt(&id).await.unwrap().unwrap();
  assert_eq!(prompt.message, "You wake in a forest.");
  assert_eq!(s.list_prompts(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn prompt_for_missing_tribute_errors() {
  let s = store().await;

  let err = s.create_prompt(&tid("D9M"), "msg", 1).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TributeNotFound(_))));
}

#[tokio::test]
async fn update_prompt_fields() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  s.create_prompt(&id, "original", 77).await.unwrap();

  let patch = PromptPatch { message: Some("revised".into()), channel_id: Some(88) };
  let updated = s.update_prompt(&id, patch).await.unwrap().unwrap();
  assert_eq!(updated.message, "revised");
  assert_eq!(updated.channel_id, 88);

  assert!(
    s.update_prompt(&tid("D9M"), PromptPatch::default())
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn delete_prompts() {
  let s = store().await;
  let a = seed_tribute(&s, "D1F").await;
  let b = seed_tribute(&s, "D2M").await;
  s.create_prompt(&a, "a", 1).await.unwrap();
  s.create_prompt(&b, "b", 2).await.unwrap();

  assert!(s.delete_prompt(&a).await.unwrap());
  assert!(!s.delete_prompt(&a).await.unwrap());
  assert_eq!(s.delete_all_prompts().await.unwrap(), 1);
  assert!(s.list_prompts(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_prompts_filtered_by_guild() {
  let s = store().await;
  let mut a = NewTribute::new(tid("D1F"), "A", 1, "<@1>");
  a.guild_id = Some(10);
  let mut b = NewTribute::new(tid("D2M"), "B", 2, "<@2>");
  b.guild_id = Some(20);
  s.create_tribute(a).await.unwrap();
  s.create_tribute(b).await.unwrap();
  s.create_prompt(&tid("D1F"), "a", 1).await.unwrap();
  s.create_prompt(&tid("D2M"), "b", 2).await.unwrap();

  let g10 = s.list_prompts(Some(10)).await.unwrap();
  assert_eq!(g10.len(), 1);
  assert_eq!(g10[0].tribute_id.as_str(), "D1F");
}

// ─── Files ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_records_roundtrip() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;

  let face = s.add_file(&id, "face_claim", "faces/d1f.png").await.unwrap();
  s.add_file(&id, "prompt_image", "prompts/d1f-1.png").await.unwrap();

  let all = s.get_files(&id, None).await.unwrap();
  assert_eq!(all.len(), 2);

  let faces = s.get_files(&id, Some("face_claim")).await.unwrap();
  assert_eq!(faces.len(), 1);
  assert_eq!(faces[0].path, "faces/d1f.png");

  assert!(s.delete_file(face.file_id).await.unwrap());
  assert!(!s.delete_file(face.file_id).await.unwrap());
  assert_eq!(s.get_files(&id, None).await.unwrap().len(), 1);
}

// ─── Aggregate read ──────────────────────────────────────────────────────────

#[tokio::test]
async fn get_tribute_full_assembles_everything() {
  let s = store().await;
  let id = seed_tribute(&s, "D1F").await;
  seed_inventory(&s, &id, 3, 1).await;
  s.add_inventory_item(&id, "knife").await.unwrap();
  s.create_prompt(&id, "msg", 77).await.unwrap();
  s.add_file(&id, "face_claim", "faces/d1f.png").await.unwrap();

  let profile = s.get_tribute_full(&id).await.unwrap().unwrap();
  assert_eq!(profile.tribute.tribute_id, id);
  let inventory = profile.inventory.unwrap();
  assert_eq!(inventory.items.get(&1).map(String::as_str), Some("knife"));
  assert_eq!(profile.prompt.unwrap().message, "msg");
  assert_eq!(profile.files.len(), 1);

  assert!(s.get_tribute_full(&tid("D9M")).await.unwrap().is_none());
}

// ─── Startup migrations ──────────────────────────────────────────────────────

#[tokio::test]
async fn open_adds_missing_tribute_columns() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("panem.db");

  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE tributes (
             tribute_id   TEXT PRIMARY KEY,
             tribute_name TEXT NOT NULL,
             user_id      INTEGER NOT NULL,
             user_mention TEXT NOT NULL,
             guild_id     INTEGER,
             created_at   INTEGER NOT NULL
         );
         INSERT INTO tributes VALUES ('D1F', 'Old', 1, '<@1>', NULL, 0);",
      )
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();

  // Existing rows survive and the new columns are readable.
  let old = s.get_tribute(&tid("D1F")).await.unwrap().unwrap();
  assert_eq!(old.name, "Old");
  assert!(old.face_claim_url.is_none());
  assert!(old.prompt_channel_id.is_none());

  // And writable.
  let mut input = NewTribute::new(tid("D2M"), "New", 2, "<@2>");
  input.face_claim_url = Some("faces/d2m.png".into());
  input.prompt_channel_id = Some(5);
  s.create_tribute(input).await.unwrap();
  let new = s.get_tribute(&tid("D2M")).await.unwrap().unwrap();
  assert_eq!(new.face_claim_url.as_deref(), Some("faces/d2m.png"));
}

#[tokio::test]
async fn open_collapses_many_prompts_to_one_per_tribute() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("panem.db");

  {
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn
      .execute_batch(
        "CREATE TABLE tributes (
             tribute_id        TEXT PRIMARY KEY,
             tribute_name      TEXT NOT NULL,
             user_id           INTEGER NOT NULL,
             user_mention      TEXT NOT NULL,
             guild_id          INTEGER,
             created_at        INTEGER NOT NULL,
             face_claim_url    TEXT,
             prompt_channel_id INTEGER
         );
         INSERT INTO tributes VALUES ('D1F', 'A', 1, '<@1>', NULL, 0, NULL, NULL);
         INSERT INTO tributes VALUES ('D2M', 'B', 2, '<@2>', NULL, 0, NULL, NULL);
         CREATE TABLE prompts (
             id         INTEGER PRIMARY KEY AUTOINCREMENT,
             prompt_id  TEXT NOT NULL,
             tribute_id TEXT NOT NULL,
             message    TEXT NOT NULL,
             channel_id INTEGER,
             created_at INTEGER
         );
         INSERT INTO prompts (prompt_id, tribute_id, message, channel_id, created_at)
             VALUES ('p1', 'D1F', 'stale', 7, 100);
         INSERT INTO prompts (prompt_id, tribute_id, message, channel_id, created_at)
             VALUES ('p2', 'D1F', 'newest', 7, 200);
         INSERT INTO prompts (prompt_id, tribute_id, message, channel_id, created_at)
             VALUES ('p3', 'D2M', 'only', NULL, NULL);",
      )
      .unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();

  // The newest row per tribute survives the collapse.
  let p = s.get_prompt(&tid("D1F")).await.unwrap().unwrap();
  assert_eq!(p.message, "newest");
  assert_eq!(s.list_prompts(None).await.unwrap().len(), 2);

  // NULL channel/timestamp are backfilled, and the 1:1 constraint holds now.
  let p = s.get_prompt(&tid("D2M")).await.unwrap().unwrap();
  assert_eq!(p.channel_id, 0);
  let err = s.create_prompt(&tid("D2M"), "second", 1).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::PromptExists(_))));
}

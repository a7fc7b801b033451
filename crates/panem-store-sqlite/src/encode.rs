//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as epoch seconds (`INTEGER`). Tribute ids are stored
//! in their canonical uppercase form. Sections are stored as lowercase tags.

use chrono::{DateTime, Utc};
use panem_core::{
  file::FileRecord,
  inventory::{Inventory, InventorySnapshot, ItemMatch, Section},
  prompt::Prompt,
  tribute::{Tribute, TributeId},
};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0).ok_or(Error::Timestamp(secs))
}

// ─── Section ─────────────────────────────────────────────────────────────────

pub fn decode_section(s: &str) -> Result<Section> {
  match s {
    "items" => Ok(Section::Items),
    "equipped" => Ok(Section::Equipped),
    other => Err(Error::UnknownSection(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `tributes` row.
pub struct RawTribute {
  pub tribute_id:        String,
  pub name:              String,
  pub user_id:           i64,
  pub mention:           String,
  pub guild_id:          Option<i64>,
  pub created_at:        i64,
  pub face_claim_url:    Option<String>,
  pub prompt_channel_id: Option<i64>,
}

impl RawTribute {
  pub fn into_tribute(self) -> Result<Tribute> {
    Ok(Tribute {
      tribute_id:        TributeId::new(&self.tribute_id),
      name:              self.name,
      user_id:           self.user_id,
      mention:           self.mention,
      guild_id:          self.guild_id,
      created_at:        decode_ts(self.created_at)?,
      face_claim_url:    self.face_claim_url,
      prompt_channel_id: self.prompt_channel_id,
    })
  }
}

/// Raw values read directly from an `inventories` row.
pub struct RawInventory {
  pub tribute_id:        String,
  pub capacity:          i64,
  pub equipped_capacity: i64,
  pub created_at:        i64,
  pub updated_at:        i64,
}

impl RawInventory {
  pub fn into_inventory(self) -> Result<Inventory> {
    Ok(Inventory {
      tribute_id:        TributeId::new(&self.tribute_id),
      capacity:          self.capacity as u32,
      equipped_capacity: self.equipped_capacity as u32,
      created_at:        decode_ts(self.created_at)?,
      updated_at:        decode_ts(self.updated_at)?,
    })
  }

  /// Assemble a snapshot from this header plus its item rows.
  pub fn into_snapshot(self, items: Vec<RawItem>) -> Result<InventorySnapshot> {
    let mut snapshot = InventorySnapshot {
      capacity:          self.capacity as u32,
      items:             Default::default(),
      equipped_capacity: self.equipped_capacity as u32,
      equipped:          Default::default(),
    };
    for item in items {
      let slot = item.slot as u32;
      match decode_section(&item.section)? {
        Section::Items => snapshot.items.insert(slot, item.name),
        Section::Equipped => snapshot.equipped.insert(slot, item.name),
      };
    }
    Ok(snapshot)
  }
}

/// Raw values read directly from an `inventory_items` row.
pub struct RawItem {
  pub section: String,
  pub slot:    i64,
  pub name:    String,
}

/// Raw values from an `inventory_items` row joined with tribute metadata.
pub struct RawMatch {
  pub tribute_id:   String,
  pub tribute_name: String,
  pub mention:      String,
  pub section:      String,
  pub slot:         i64,
  pub name:         String,
}

impl RawMatch {
  pub fn into_match(self) -> Result<ItemMatch> {
    Ok(ItemMatch {
      tribute_id:   TributeId::new(&self.tribute_id),
      tribute_name: self.tribute_name,
      mention:      self.mention,
      section:      decode_section(&self.section)?,
      slot:         self.slot as u32,
      name:         self.name,
    })
  }
}

/// Raw values read directly from a `prompts` row.
pub struct RawPrompt {
  pub tribute_id: String,
  pub message:    String,
  pub channel_id: i64,
  pub created_at: i64,
}

impl RawPrompt {
  pub fn into_prompt(self) -> Result<Prompt> {
    Ok(Prompt {
      tribute_id: TributeId::new(&self.tribute_id),
      message:    self.message,
      channel_id: self.channel_id,
      created_at: decode_ts(self.created_at)?,
    })
  }
}

/// Raw values read directly from a `files` row.
pub struct RawFile {
  pub file_id:    i64,
  pub tribute_id: String,
  pub kind:       String,
  pub path:       String,
  pub created_at: i64,
}

impl RawFile {
  pub fn into_file(self) -> Result<FileRecord> {
    Ok(FileRecord {
      file_id:    self.file_id,
      tribute_id: TributeId::new(&self.tribute_id),
      kind:       self.kind,
      path:       self.path,
      created_at: decode_ts(self.created_at)?,
    })
  }
}

//! Inventory types — capacity-bounded, sequentially-keyed item collections.
//!
//! Every tribute has at most one inventory, split into two sections: the
//! carried items and the equipped items. Slot numbers within a section are
//! always a dense `1..=N` sequence; removals re-key the survivors.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tribute::TributeId;

/// Default soft capacity for the carried section.
pub const DEFAULT_CAPACITY: u32 = 10;

/// Default hard capacity for the equipped section.
pub const DEFAULT_EQUIPPED_CAPACITY: u32 = 5;

// ─── Section ─────────────────────────────────────────────────────────────────

/// Which of the two per-tribute collections an item sits in.
///
/// The carried section's capacity is advisory (display-time warning only);
/// the equipped section's capacity is a hard ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
  Items,
  Equipped,
}

impl Section {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Items => "items",
      Self::Equipped => "equipped",
    }
  }
}

impl std::fmt::Display for Section {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Inventory ───────────────────────────────────────────────────────────────

/// The per-tribute inventory header. Items live in their own rows and are
/// read through [`InventorySnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inventory {
  pub tribute_id:        TributeId,
  pub capacity:          u32,
  pub equipped_capacity: u32,
  pub created_at:        DateTime<Utc>,
  pub updated_at:        DateTime<Utc>,
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One inventory with both sections materialised as slot → name maps.
///
/// Every backend returns this exact shape, so callers never need to know
/// whether a record came from the relational store or a legacy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
  pub capacity:          u32,
  pub items:             BTreeMap<u32, String>,
  pub equipped_capacity: u32,
  pub equipped:          BTreeMap<u32, String>,
}

impl InventorySnapshot {
  pub fn item_count(&self) -> usize { self.items.len() }

  pub fn equipped_count(&self) -> usize { self.equipped.len() }
}

// ─── Search result ───────────────────────────────────────────────────────────

/// One hit from a store-wide item search, joined with tribute metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemMatch {
  pub tribute_id:   TributeId,
  pub tribute_name: String,
  pub mention:      String,
  pub section:      Section,
  pub slot:         u32,
  pub name:         String,
}

//! On-disk shapes of the two legacy documents.
//!
//! Slot keys are serialised as JSON object keys ("1", "2", ...) but parsed
//! as integers, so slot 10 orders after slot 2 rather than lexicographically.

use std::collections::BTreeMap;

use panem_core::{
  inventory::{DEFAULT_CAPACITY, DEFAULT_EQUIPPED_CAPACITY, InventorySnapshot},
  prompt::PromptView,
};
use serde::{Deserialize, Serialize};

fn default_capacity() -> u32 { DEFAULT_CAPACITY }

fn default_equipped_capacity() -> u32 { DEFAULT_EQUIPPED_CAPACITY }

// ─── Inventory document ──────────────────────────────────────────────────────

/// One entry of the inventories-by-tribute document.
///
/// Older files predate the equipped section; both it and its capacity
/// default when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyInventory {
  #[serde(default = "default_capacity")]
  pub capacity:          u32,
  #[serde(default)]
  pub items:             BTreeMap<u32, String>,
  #[serde(default = "default_equipped_capacity")]
  pub equipped_capacity: u32,
  #[serde(default)]
  pub equipped:          BTreeMap<u32, String>,
}

impl Default for LegacyInventory {
  fn default() -> Self {
    Self {
      capacity:          DEFAULT_CAPACITY,
      items:             BTreeMap::new(),
      equipped_capacity: DEFAULT_EQUIPPED_CAPACITY,
      equipped:          BTreeMap::new(),
    }
  }
}

impl LegacyInventory {
  /// The shared result shape; identical to what the relational store emits.
  pub fn snapshot(&self) -> InventorySnapshot {
    InventorySnapshot {
      capacity:          self.capacity,
      items:             self.items.clone(),
      equipped_capacity: self.equipped_capacity,
      equipped:          self.equipped.clone(),
    }
  }
}

/// Renumber a slot map to a dense `1..=N` sequence, preserving slot order.
pub(crate) fn rekey(map: &BTreeMap<u32, String>) -> BTreeMap<u32, String> {
  map
    .values()
    .cloned()
    .enumerate()
    .map(|(i, name)| (i as u32 + 1, name))
    .collect()
}

// ─── Prompt document ─────────────────────────────────────────────────────────

/// One entry of the prompts-by-tribute document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyPrompt {
  pub message: String,
  #[serde(default)]
  pub channel: i64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub image:   Option<String>,
}

impl LegacyPrompt {
  pub fn view(&self) -> PromptView {
    PromptView {
      message:    self.message.clone(),
      channel_id: self.channel,
      image:      self.image.clone(),
    }
  }
}

//! Tribute — the root entity every other record hangs off.
//!
//! A tribute owns its inventory, prompt, and file records; deleting the
//! tribute removes all of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{file::FileRecord, inventory::InventorySnapshot, prompt::Prompt};

// ─── Identifier ──────────────────────────────────────────────────────────────

/// Canonical tribute identifier: a short alphanumeric tag such as `D1F`.
///
/// Construction folds to ASCII uppercase, so lookups are insensitive to
/// whatever case a caller (or a legacy document) used.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TributeId(String);

impl TributeId {
  pub fn new(id: impl AsRef<str>) -> Self {
    Self(id.as_ref().trim().to_ascii_uppercase())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl std::fmt::Display for TributeId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for TributeId {
  fn from(s: &str) -> Self { Self::new(s) }
}

// ─── Tribute ─────────────────────────────────────────────────────────────────

/// A campaign character record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tribute {
  pub tribute_id:        TributeId,
  pub name:              String,
  /// Owning chat-platform user. Stored opaquely; never validated here.
  pub user_id:           i64,
  /// Denormalised mention string for the owning user (e.g. `<@1234>`).
  pub mention:           String,
  pub guild_id:          Option<i64>,
  pub created_at:        DateTime<Utc>,
  pub face_claim_url:    Option<String>,
  /// Channel the tribute's prompts are delivered to, when assigned.
  pub prompt_channel_id: Option<i64>,
}

// ─── NewTribute ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::TributeStore::create_tribute`].
/// `created_at` defaults to now when the caller leaves it unset.
#[derive(Debug, Clone)]
pub struct NewTribute {
  pub tribute_id:        TributeId,
  pub name:              String,
  pub user_id:           i64,
  pub mention:           String,
  pub guild_id:          Option<i64>,
  pub created_at:        Option<DateTime<Utc>>,
  pub face_claim_url:    Option<String>,
  pub prompt_channel_id: Option<i64>,
}

impl NewTribute {
  /// Convenience constructor with all optional fields unset.
  pub fn new(
    tribute_id: TributeId,
    name: impl Into<String>,
    user_id: i64,
    mention: impl Into<String>,
  ) -> Self {
    Self {
      tribute_id,
      name: name.into(),
      user_id,
      mention: mention.into(),
      guild_id: None,
      created_at: None,
      face_claim_url: None,
      prompt_channel_id: None,
    }
  }
}

// ─── TributePatch ────────────────────────────────────────────────────────────

/// Field-level partial update for a tribute. Only the fields listed here are
/// mutable after creation; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TributePatch {
  pub name:     Option<String>,
  pub mention:  Option<String>,
  pub guild_id: Option<i64>,
}

impl TributePatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none() && self.mention.is_none() && self.guild_id.is_none()
  }
}

// ─── Aggregate read ──────────────────────────────────────────────────────────

/// Everything known about one tribute, assembled in a single read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TributeProfile {
  pub tribute:   Tribute,
  pub inventory: Option<InventorySnapshot>,
  pub prompt:    Option<Prompt>,
  pub files:     Vec<FileRecord>,
}

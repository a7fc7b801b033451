//! Prompt — a narrative text block associated 1:1 with a tribute.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tribute::TributeId;

/// The stored prompt row. At most one exists per tribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
  pub tribute_id: TributeId,
  pub message:    String,
  /// Delivery channel, stored opaquely.
  pub channel_id: i64,
  pub created_at: DateTime<Utc>,
}

/// Field-level partial update for a prompt; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PromptPatch {
  pub message:    Option<String>,
  pub channel_id: Option<i64>,
}

impl PromptPatch {
  pub fn is_empty(&self) -> bool {
    self.message.is_none() && self.channel_id.is_none()
  }
}

/// The normalised prompt shape served by the storage facade.
///
/// Legacy documents can carry an inline image reference; relational rows
/// never do (images live in file records), so `image` is `None` for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptView {
  pub message:    String,
  pub channel_id: i64,
  pub image:      Option<String>,
}

impl From<Prompt> for PromptView {
  fn from(p: Prompt) -> Self {
    Self { message: p.message, channel_id: p.channel_id, image: None }
  }
}

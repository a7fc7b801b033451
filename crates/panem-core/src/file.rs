//! File records — references to media stored on disk for a tribute.
//!
//! Only paths are recorded here; the bytes are persisted by the caller's
//! file-save capability.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tribute::TributeId;

/// A reference to one stored file. Purely additive; no uniqueness constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
  pub file_id:    i64,
  pub tribute_id: TributeId,
  /// Free-text type tag, e.g. `face_claim` or `prompt_image`.
  pub kind:       String,
  pub path:       String,
  pub created_at: DateTime<Utc>,
}

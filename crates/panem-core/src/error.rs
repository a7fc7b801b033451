//! Error types for `panem-core`.

use thiserror::Error;

use crate::{inventory::Section, tribute::TributeId};

#[derive(Debug, Error)]
pub enum Error {
  #[error("tribute not found: {0}")]
  TributeNotFound(TributeId),

  #[error("tribute already exists: {0}")]
  TributeExists(TributeId),

  #[error("no inventory for tribute {0}")]
  InventoryNotFound(TributeId),

  #[error("no {section} slot {slot} for tribute {tribute_id}")]
  SlotNotFound {
    tribute_id: TributeId,
    section:    Section,
    slot:       u32,
  },

  #[error("prompt already exists for tribute {0}")]
  PromptExists(TributeId),

  #[error("{section} section of {tribute_id} is full ({count}/{capacity})")]
  SectionFull {
    tribute_id: TributeId,
    section:    Section,
    count:      u32,
    capacity:   u32,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

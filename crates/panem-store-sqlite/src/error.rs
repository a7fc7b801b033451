//! Error type for `panem-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] panem_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A mutating transaction failed and was rolled back. The operation was
  /// fully not-applied.
  #[error("transaction rolled back: {0}")]
  Transaction(#[from] rusqlite::Error),

  #[error("timestamp out of range: {0}")]
  Timestamp(i64),

  #[error("unknown inventory section: {0:?}")]
  UnknownSection(String),
}

impl Error {
  /// Whether this is a duplicate-tribute conflict. Used by the migration
  /// tool, for which re-running into existing rows is expected.
  pub fn is_tribute_conflict(&self) -> bool {
    matches!(self, Self::Core(panem_core::Error::TributeExists(_)))
  }

  /// Whether this is a duplicate-prompt conflict.
  pub fn is_prompt_conflict(&self) -> bool {
    matches!(self, Self::Core(panem_core::Error::PromptExists(_)))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `panem-store-json`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] panem_core::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed legacy document: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
